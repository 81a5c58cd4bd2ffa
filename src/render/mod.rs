pub mod surface;
pub mod transform;
pub mod window;

pub use surface::{blit, clear, fit_height, flip_horizontal, scale_to, DisplayFit};
pub use transform::{rotate_expand, scale_rotate, scaled_size};
pub use window::MinifbDisplay;
