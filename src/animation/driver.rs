use crate::animation::ease::Ease;
use serde_json::{Map, Value as Json};
use std::collections::BTreeMap;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LoopMode {
    #[default]
    Once,
    Loop,
    PingPong,
}

impl LoopMode {
    pub const NAMES: &'static [&'static str] = &["once", "loop", "pingpong"];

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "once" | "" => Some(Self::Once),
            "loop" => Some(Self::Loop),
            "pingpong" | "pingPong" | "ping-pong" | "ping_pong" => Some(Self::PingPong),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnimState {
    Idle,
    Running,
    Completed,
}

/// Static description of one tween.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnimationSpec {
    pub start: f32,
    pub end: f32,
    /// Seconds for one leg; `<= 0` jumps straight to `end`.
    pub duration: f32,
    pub loop_mode: LoopMode,
    /// Curve for the start→end leg.
    pub approach: Ease,
    /// Curve for the end→start leg of a pingpong.
    pub ret: Ease,
}

impl Default for AnimationSpec {
    fn default() -> Self {
        Self {
            start: 0.0,
            end: 1.0,
            duration: 1.0,
            loop_mode: LoopMode::Once,
            approach: Ease::Linear,
            ret: Ease::Linear,
        }
    }
}

impl AnimationSpec {
    /// Read a spec from persisted node `values` (`startValue`, `endValue`, `duration`) and
    /// options (`loop_mode`, `tween`, `approach_curve`, `return_curve`).
    ///
    /// Unknown curve names fall back to linear; the loader has already reported them.
    pub fn from_node(values: &Map<String, Json>, options: &BTreeMap<String, String>) -> Self {
        let d = Self::default();
        let num = |key: &str, fallback: f32| -> f32 {
            match values.get(key) {
                Some(Json::Number(n)) => n.as_f64().map(|v| v as f32).unwrap_or(fallback),
                Some(Json::String(s)) => s.trim().parse().unwrap_or(fallback),
                _ => fallback,
            }
        };
        let curve = |key: &str| {
            options
                .get(key)
                .filter(|s| !s.is_empty())
                .and_then(|s| Ease::from_name(s))
        };
        let tween = curve("tween").unwrap_or(Ease::Linear);

        Self {
            start: num("startValue", d.start),
            end: num("endValue", d.end),
            duration: num("duration", d.duration),
            loop_mode: options
                .get("loop_mode")
                .and_then(|s| LoopMode::parse(s))
                .unwrap_or_default(),
            approach: curve("approach_curve").unwrap_or(tween),
            ret: curve("return_curve").unwrap_or(tween),
        }
    }
}

/// Per-node tween state machine: `Idle`, `Running`, `Completed`.
///
/// Phase is tracked in `f64` so long runs at small `dt` do not drift.
#[derive(Clone, Debug, PartialEq)]
pub struct Animator {
    spec: AnimationSpec,
    state: AnimState,
    phase: f64,
    reversed: bool,
}

impl Animator {
    pub fn new(spec: AnimationSpec, running: bool) -> Self {
        Self {
            spec,
            state: if running {
                AnimState::Running
            } else {
                AnimState::Idle
            },
            phase: 0.0,
            reversed: false,
        }
    }

    pub fn spec(&self) -> &AnimationSpec {
        &self.spec
    }

    /// Retarget the tween without touching its phase or state.
    pub fn set_range(&mut self, start: f32, end: f32, duration: f32) {
        self.spec.start = start;
        self.spec.end = end;
        self.spec.duration = duration;
    }

    pub fn state(&self) -> AnimState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == AnimState::Running
    }

    pub fn phase(&self) -> f64 {
        self.phase
    }

    /// Output for the current phase.
    pub fn value(&self) -> f32 {
        let s = &self.spec;
        let (from, to, ease) = if self.reversed {
            (s.end, s.start, s.ret)
        } else {
            (s.start, s.end, s.approach)
        };
        let (from, to) = (f64::from(from), f64::from(to));
        (from + (to - from) * ease.apply(self.phase)) as f32
    }

    /// Emit the value for the current phase, then advance by `dt` seconds when running.
    pub fn step(&mut self, dt: f32) -> f32 {
        let out = self.value();
        if self.state == AnimState::Running {
            self.advance(dt);
        }
        out
    }

    /// startStop pulse: Idle and Running swap; a completed tween restarts.
    pub fn toggle(&mut self) {
        self.state = match self.state {
            AnimState::Idle => AnimState::Running,
            AnimState::Running => AnimState::Idle,
            AnimState::Completed => {
                self.rewind();
                AnimState::Running
            }
        };
    }

    /// restart pulse: phase back to 0. A completed tween runs again; an idle one stays idle.
    pub fn restart(&mut self) {
        self.rewind();
        if self.state == AnimState::Completed {
            self.state = AnimState::Running;
        }
    }

    fn rewind(&mut self) {
        self.phase = 0.0;
        self.reversed = false;
    }

    fn advance(&mut self, dt: f32) {
        let dt = f64::from(dt);
        if !dt.is_finite() || dt <= 0.0 {
            return;
        }
        let duration = f64::from(self.spec.duration);
        if !(duration.is_finite() && duration > 0.0) {
            self.phase = 1.0;
            self.reversed = false;
            self.state = AnimState::Completed;
            return;
        }

        self.phase += dt / duration;
        if self.phase < 1.0 {
            return;
        }
        match self.spec.loop_mode {
            LoopMode::Once => {
                self.phase = 1.0;
                self.state = AnimState::Completed;
            }
            LoopMode::Loop => self.phase = self.phase.fract(),
            LoopMode::PingPong => {
                let legs = self.phase.floor();
                self.phase -= legs;
                if legs % 2.0 == 1.0 {
                    self.reversed = !self.reversed;
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/driver.rs"]
mod tests;
