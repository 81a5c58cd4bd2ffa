pub mod entry;
pub mod slideshow;

pub use entry::{letterbox, load_dir, FitRect, IdleImage};
pub use slideshow::{IdleLayer, IdleSlideshow, DRIFT_DISTANCE};
