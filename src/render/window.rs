use anyhow::Result;
use image::RgbaImage;
use minifb::{Key, ScaleMode, Window, WindowOptions};

use crate::config::DisplayConfig;

/// minifb window the composited frame is presented on
pub struct MinifbDisplay {
    window: Window,
    buffer: Vec<u32>,
    width: usize,
    height: usize,
}

impl MinifbDisplay {
    /// Open the window. Full screen is a borderless, topmost window stretched
    /// by the compositor; the frame buffer keeps the configured size.
    pub fn new(title: &str, config: &DisplayConfig) -> Result<Self> {
        let width = config.windowed_width;
        let height = config.windowed_height;
        let options = if config.full_screen {
            WindowOptions {
                borderless: true,
                title: false,
                topmost: true,
                resize: true,
                scale_mode: ScaleMode::AspectRatioStretch,
                ..WindowOptions::default()
            }
        } else {
            WindowOptions {
                resize: false,
                ..WindowOptions::default()
            }
        };

        let mut window = Window::new(title, width, height, options)?;
        window.set_cursor_visibility(false);

        Ok(Self {
            window,
            buffer: vec![0u32; width * height],
            width,
            height,
        })
    }

    /// False once the window is closed or ESC / Q is pressed
    pub fn is_open(&self) -> bool {
        self.window.is_open()
            && !self.window.is_key_down(Key::Escape)
            && !self.window.is_key_down(Key::Q)
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width as u32, self.height as u32)
    }

    /// Copy the frame into the window buffer and show it
    pub fn present(&mut self, frame: &RgbaImage) -> Result<()> {
        pack_rgb(frame, &mut self.buffer, self.width, self.height);
        self.window
            .update_with_buffer(&self.buffer, self.width, self.height)?;
        Ok(())
    }
}

/// RGBA -> 0RGB u32, cropping or leaving black where sizes differ
fn pack_rgb(frame: &RgbaImage, buffer: &mut [u32], width: usize, height: usize) {
    let fw = frame.width() as usize;
    let fh = frame.height() as usize;
    for y in 0..height {
        for x in 0..width {
            buffer[y * width + x] = if x < fw && y < fh {
                let p = frame.get_pixel(x as u32, y as u32);
                ((p[0] as u32) << 16) | ((p[1] as u32) << 8) | p[2] as u32
            } else {
                0
            };
        }
    }
}
