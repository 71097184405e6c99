pub mod cache;
pub mod color;
pub mod orientation;
pub mod template;
