use image::RgbaImage;
use std::fmt;
use std::sync::Arc;

/// Stable node identity, unique per patch and preserved across saves.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Absolute 0-based tick counter since the runtime was created.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

/// Size of every texture produced during a tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
        }
    }

    pub fn pixel_count(self) -> usize {
        self.width as usize * self.height as usize
    }
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new(64, 64)
    }
}

/// Straight-alpha RGBA color with components in `[0, 1]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const TRANSPARENT: Self = Self::new(0.0, 0.0, 0.0, 0.0);
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0, 1.0);
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn gray(v: f32) -> Self {
        Self::new(v, v, v, 1.0)
    }

    /// Parse `#rgb`, `#rrggbb` or `#rrggbbaa`.
    pub fn from_hex(s: &str) -> Option<Self> {
        let hex = s.trim().strip_prefix('#')?;
        let nibble = |i: usize| u8::from_str_radix(hex.get(i..i + 1)?, 16).ok();
        let byte = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
        let (r, g, b, a) = match hex.len() {
            3 => (nibble(0)? * 17, nibble(1)? * 17, nibble(2)? * 17, 255),
            6 => (byte(0)?, byte(2)?, byte(4)?, 255),
            8 => (byte(0)?, byte(2)?, byte(4)?, byte(6)?),
            _ => return None,
        };
        Some(Self::from_u8([r, g, b, a]))
    }

    pub fn from_u8(px: [u8; 4]) -> Self {
        Self::new(
            f32::from(px[0]) / 255.0,
            f32::from(px[1]) / 255.0,
            f32::from(px[2]) / 255.0,
            f32::from(px[3]) / 255.0,
        )
    }

    pub fn to_u8(self) -> [u8; 4] {
        fn q(v: f32) -> u8 {
            (v.clamp(0.0, 1.0) * 255.0).round() as u8
        }
        [q(self.r), q(self.g), q(self.b), q(self.a)]
    }

    pub fn to_hex(self) -> String {
        let [r, g, b, a] = self.to_u8();
        if a == 255 {
            format!("#{r:02x}{g:02x}{b:02x}")
        } else {
            format!("#{r:02x}{g:02x}{b:02x}{a:02x}")
        }
    }
}

/// Immutable RGBA8 frame buffer, cheap to clone.
///
/// Textures flow between nodes by value; a node that wants to change pixels builds a new one.
#[derive(Clone, PartialEq, Eq)]
pub struct Texture {
    image: Arc<RgbaImage>,
}

impl fmt::Debug for Texture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Texture")
            .field("width", &self.image.width())
            .field("height", &self.image.height())
            .finish()
    }
}

impl Texture {
    pub fn from_image(image: RgbaImage) -> Self {
        Self {
            image: Arc::new(image),
        }
    }

    /// Opaque black frame, the neutral texture.
    pub fn black(canvas: Canvas) -> Self {
        Self::solid(canvas, Rgba::BLACK)
    }

    pub fn solid(canvas: Canvas, color: Rgba) -> Self {
        let px = image::Rgba(color.to_u8());
        Self::from_image(RgbaImage::from_pixel(canvas.width, canvas.height, px))
    }

    pub fn from_fn(canvas: Canvas, mut f: impl FnMut(u32, u32) -> [u8; 4]) -> Self {
        Self::from_image(RgbaImage::from_fn(canvas.width, canvas.height, |x, y| {
            image::Rgba(f(x, y))
        }))
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn canvas(&self) -> Canvas {
        Canvas::new(self.width(), self.height())
    }

    /// Pixel at `(x, y)`, clamped to the texture bounds.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let x = x.min(self.width().saturating_sub(1));
        let y = y.min(self.height().saturating_sub(1));
        self.image.get_pixel(x, y).0
    }

    /// Sample with normalized coordinates, wrapping at the edges.
    pub fn sample_wrapped(&self, u: f32, v: f32) -> [u8; 4] {
        let u = u.rem_euclid(1.0);
        let v = v.rem_euclid(1.0);
        let x = (u * self.width() as f32) as u32;
        let y = (v * self.height() as f32) as u32;
        self.pixel(x, y)
    }

    /// Resample to `canvas` with nearest-neighbour lookup, or return `self` when sizes match.
    pub fn fit(&self, canvas: Canvas) -> Self {
        if self.width() == canvas.width && self.height() == canvas.height {
            return self.clone();
        }
        let (sw, sh) = (self.width(), self.height());
        Self::from_fn(canvas, |x, y| {
            let sx = (u64::from(x) * u64::from(sw) / u64::from(canvas.width)) as u32;
            let sy = (u64::from(y) * u64::from(sh) / u64::from(canvas.height)) as u32;
            self.pixel(sx, sy)
        })
    }

    /// Mean color over all pixels.
    pub fn average(&self) -> Rgba {
        let n = u64::from(self.width()) * u64::from(self.height());
        if n == 0 {
            return Rgba::TRANSPARENT;
        }
        let mut sum = [0u64; 4];
        for px in self.image.pixels() {
            for (s, c) in sum.iter_mut().zip(px.0) {
                *s += u64::from(c);
            }
        }
        let avg = sum.map(|s| ((s + n / 2) / n) as u8);
        Rgba::from_u8(avg)
    }

    pub fn as_image(&self) -> &RgbaImage {
        &self.image
    }

    /// Raw RGBA8 bytes, row-major.
    pub fn data(&self) -> &[u8] {
        self.image.as_raw()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
