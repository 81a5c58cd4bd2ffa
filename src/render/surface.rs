use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};

/// Opaque black
pub const BACKGROUND: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Fill the whole surface with the background colour
pub fn clear(surface: &mut RgbaImage) {
    for pixel in surface.pixels_mut() {
        *pixel = BACKGROUND;
    }
}

/// Source-over blit of `src` at (x, y) with an extra global alpha,
/// clipped to the destination bounds
pub fn blit(dst: &mut RgbaImage, src: &RgbaImage, x: i32, y: i32, alpha: u8) {
    if alpha == 0 {
        return;
    }
    let (dw, dh) = (dst.width() as i64, dst.height() as i64);
    let (sw, sh) = (src.width() as i64, src.height() as i64);

    let x0 = (x as i64).max(0);
    let y0 = (y as i64).max(0);
    let x1 = (x as i64 + sw).min(dw);
    let y1 = (y as i64 + sh).min(dh);

    for dy in y0..y1 {
        for dx in x0..x1 {
            let s = src.get_pixel((dx - x as i64) as u32, (dy - y as i64) as u32);
            let d = dst.get_pixel_mut(dx as u32, dy as u32);
            blend(d, s, alpha);
        }
    }
}

fn blend(dst: &mut Rgba<u8>, src: &Rgba<u8>, alpha: u8) {
    let sa = src[3] as u32 * alpha as u32 / 255;
    if sa == 0 {
        return;
    }
    let inv = 255 - sa;
    for c in 0..3 {
        dst[c] = ((src[c] as u32 * sa + dst[c] as u32 * inv) / 255) as u8;
    }
    dst[3] = (sa + dst[3] as u32 * inv / 255) as u8;
}

/// Nearest-neighbour resize
pub fn scale_to(image: &RgbaImage, width: u32, height: u32) -> RgbaImage {
    if image.dimensions() == (width, height) {
        return image.clone();
    }
    imageops::resize(image, width.max(1), height.max(1), FilterType::Nearest)
}

pub fn flip_horizontal(image: &RgbaImage) -> RgbaImage {
    imageops::flip_horizontal(image)
}

/// Placement of a surface of aspect `ratio` on a display: full display height,
/// shifted right when the assumed display aspect is wider than `ratio`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayFit {
    pub width: u32,
    pub height: u32,
    pub margin_x: i32,
}

pub fn fit_height(ratio: f32, display: (u32, u32), display_aspect: f32) -> DisplayFit {
    let height = display.1;
    let width = (height as f32 * ratio).floor() as u32;
    let margin_x = if display_aspect > ratio {
        ((display_aspect * height as f32 - width as f32) / 2.0) as i32
    } else {
        0
    };
    DisplayFit {
        width,
        height,
        margin_x,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(w: u32, h: u32, color: [u8; 4]) -> RgbaImage {
        RgbaImage::from_pixel(w, h, Rgba(color))
    }

    #[test]
    fn test_clear() {
        let mut surface = solid(4, 4, [9, 9, 9, 9]);
        clear(&mut surface);
        assert!(surface.pixels().all(|p| *p == BACKGROUND));
    }

    #[test]
    fn test_blit_opaque() {
        let mut dst = solid(4, 4, [0, 0, 0, 255]);
        let src = solid(2, 2, [255, 0, 0, 255]);
        blit(&mut dst, &src, 1, 1, 255);
        assert_eq!(*dst.get_pixel(1, 1), Rgba([255, 0, 0, 255]));
        assert_eq!(*dst.get_pixel(2, 2), Rgba([255, 0, 0, 255]));
        assert_eq!(*dst.get_pixel(0, 0), Rgba([0, 0, 0, 255]));
        assert_eq!(*dst.get_pixel(3, 3), Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn test_blit_clips_negative_offset() {
        let mut dst = solid(3, 3, [0, 0, 0, 255]);
        let src = solid(2, 2, [0, 255, 0, 255]);
        blit(&mut dst, &src, -1, -1, 255);
        assert_eq!(*dst.get_pixel(0, 0), Rgba([0, 255, 0, 255]));
        assert_eq!(*dst.get_pixel(1, 1), Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn test_blit_fully_outside() {
        let mut dst = solid(3, 3, [0, 0, 0, 255]);
        let src = solid(2, 2, [0, 255, 0, 255]);
        blit(&mut dst, &src, 10, -10, 255);
        assert!(dst.pixels().all(|p| *p == BACKGROUND));
    }

    #[test]
    fn test_blit_global_alpha() {
        let mut dst = solid(1, 1, [0, 0, 0, 255]);
        let src = solid(1, 1, [255, 255, 255, 255]);
        blit(&mut dst, &src, 0, 0, 0);
        assert_eq!(*dst.get_pixel(0, 0), Rgba([0, 0, 0, 255]));
        blit(&mut dst, &src, 0, 0, 128);
        let v = dst.get_pixel(0, 0)[0];
        assert!((127..=129).contains(&v));
    }

    #[test]
    fn test_blit_transparent_source_pixels() {
        let mut dst = solid(1, 1, [10, 20, 30, 255]);
        let src = solid(1, 1, [255, 255, 255, 0]);
        blit(&mut dst, &src, 0, 0, 255);
        assert_eq!(*dst.get_pixel(0, 0), Rgba([10, 20, 30, 255]));
    }

    #[test]
    fn test_fit_height_square_on_wide_display() {
        let fit = fit_height(1.0, (1920, 1080), 16.0 / 9.0);
        assert_eq!(fit.width, 1080);
        assert_eq!(fit.height, 1080);
        assert_eq!(fit.margin_x, 420);
    }

    #[test]
    fn test_fit_height_no_margin_on_narrow_display() {
        let fit = fit_height(1.0, (800, 800), 1.0);
        assert_eq!(fit.margin_x, 0);
    }

    #[test]
    fn test_flip_horizontal() {
        let mut image = solid(2, 1, [0, 0, 0, 255]);
        image.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
        let flipped = flip_horizontal(&image);
        assert_eq!(*flipped.get_pixel(1, 0), Rgba([255, 0, 0, 255]));
    }
}
