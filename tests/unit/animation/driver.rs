use super::*;

fn spec(mode: LoopMode) -> AnimationSpec {
    AnimationSpec {
        loop_mode: mode,
        ..AnimationSpec::default()
    }
}

fn run(anim: &mut Animator, n: usize, dt: f32) -> Vec<f32> {
    (0..n).map(|_| anim.step(dt)).collect()
}

#[test]
fn once_emits_linear_steps_then_holds_end() {
    let mut a = Animator::new(spec(LoopMode::Once), true);
    assert_eq!(run(&mut a, 4, 0.25), vec![0.0, 0.25, 0.5, 0.75]);
    assert_eq!(a.state(), AnimState::Completed);
    assert_eq!(run(&mut a, 3, 0.25), vec![1.0, 1.0, 1.0]);
}

#[test]
fn eased_once_follows_curve() {
    let mut s = spec(LoopMode::Once);
    s.approach = Ease::EaseInQuad;
    let mut a = Animator::new(s, true);
    let out = run(&mut a, 5, 0.25);
    assert_eq!(out[0], 0.0);
    assert_eq!(out[1], Ease::EaseInQuad.apply(0.25) as f32);
    assert_eq!(out[2], Ease::EaseInQuad.apply(0.5) as f32);
    assert_eq!(out[4], 1.0);
}

#[test]
fn loop_wraps_to_start() {
    let mut a = Animator::new(spec(LoopMode::Loop), true);
    let out = run(&mut a, 6, 0.25);
    assert_eq!(out, vec![0.0, 0.25, 0.5, 0.75, 0.0, 0.25]);
    assert!(a.is_running());
}

#[test]
fn pingpong_swaps_direction() {
    let mut a = Animator::new(spec(LoopMode::PingPong), true);
    let out = run(&mut a, 9, 0.25);
    assert_eq!(out, vec![0.0, 0.25, 0.5, 0.75, 1.0, 0.75, 0.5, 0.25, 0.0]);
}

#[test]
fn idle_holds_start_until_toggled() {
    let mut a = Animator::new(spec(LoopMode::Once), false);
    assert_eq!(run(&mut a, 3, 0.25), vec![0.0, 0.0, 0.0]);
    a.toggle();
    assert_eq!(run(&mut a, 2, 0.25), vec![0.0, 0.25]);
    a.toggle();
    assert_eq!(a.state(), AnimState::Idle);
    assert_eq!(run(&mut a, 2, 0.25), vec![0.5, 0.5]);
}

#[test]
fn restart_rewinds_completed_tween() {
    let mut a = Animator::new(spec(LoopMode::Once), true);
    run(&mut a, 5, 0.25);
    assert_eq!(a.state(), AnimState::Completed);
    a.restart();
    assert!(a.is_running());
    assert_eq!(run(&mut a, 2, 0.25), vec![0.0, 0.25]);
}

#[test]
fn restart_keeps_idle_idle() {
    let mut a = Animator::new(spec(LoopMode::Once), false);
    a.restart();
    assert_eq!(a.state(), AnimState::Idle);
}

#[test]
fn zero_duration_jumps_to_end() {
    let mut s = spec(LoopMode::Loop);
    s.duration = 0.0;
    let mut a = Animator::new(s, true);
    assert_eq!(run(&mut a, 3, 0.1), vec![0.0, 1.0, 1.0]);
    assert_eq!(a.state(), AnimState::Completed);
}

#[test]
fn reads_spec_from_values_and_options() {
    let values: serde_json::Map<String, serde_json::Value> = serde_json::from_str(
        r#"{"startValue": 2, "endValue": "4", "duration": 0.5, "isRunning": true}"#,
    )
    .unwrap();
    let options: std::collections::BTreeMap<String, String> = [
        ("loop_mode", "pingpong"),
        ("tween", "smooth"),
        ("return_curve", "easeOutCubic"),
        ("approach_curve", "nonsense"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_owned(), v.to_owned()))
    .collect();

    let s = AnimationSpec::from_node(&values, &options);
    assert_eq!(s.start, 2.0);
    assert_eq!(s.end, 4.0);
    assert_eq!(s.duration, 0.5);
    assert_eq!(s.loop_mode, LoopMode::PingPong);
    assert_eq!(s.approach, Ease::Smooth);
    assert_eq!(s.ret, Ease::EaseOutCubic);
}
