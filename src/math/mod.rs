mod color;
mod random;

pub use color::{hsl_to_rgb, hsv_to_rgb, Color, ColorParseError};
pub use random::SeededRandom;
