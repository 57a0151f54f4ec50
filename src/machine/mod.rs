pub mod generic;
pub mod ntsc;
