mod aabb;
mod color;

pub use aabb::AABB;
pub use color::{hsl_to_rgb, parse_hex_color};
