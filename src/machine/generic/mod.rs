pub mod encoder;
pub mod font;
pub mod framebuffer;
pub mod raster;
pub mod vsync;
