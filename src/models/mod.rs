pub mod blog;
pub mod common;
pub mod image;
pub mod text;

pub use blog::*;
pub use common::*;
pub use image::*;
pub use text::*;
