//! Built-in node kinds. Each effect is an opaque CPU function of its inputs.

pub mod animation;
pub mod audio;
pub mod blend;
pub mod feedback;
pub mod filters;
pub mod generators;
pub mod output;
pub mod passthrough;
pub mod scalar;

use crate::foundation::core::Texture;
use crate::registry::NodeRegistry;

/// Register every built-in kind.
pub fn register_standard_kinds(reg: &mut NodeRegistry) {
    output::register(reg);
    scalar::register(reg);
    generators::register(reg);
    filters::register(reg);
    blend::register(reg);
    feedback::register(reg);
    animation::register(reg);
    audio::register(reg);
}

pub(crate) fn map_pixels(src: &Texture, mut f: impl FnMut([u8; 4]) -> [u8; 4]) -> Texture {
    Texture::from_fn(src.canvas(), |x, y| f(src.pixel(x, y)))
}

pub(crate) fn zip_pixels(
    a: &Texture,
    b: &Texture,
    mut f: impl FnMut([u8; 4], [u8; 4]) -> [u8; 4],
) -> Texture {
    Texture::from_fn(a.canvas(), |x, y| f(a.pixel(x, y), b.pixel(x, y)))
}

#[cfg(test)]
#[path = "../../../tests/unit/registry/kinds.rs"]
mod tests;
