use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use imageproc::geometric_transformations::{warp_into, Interpolation, Projection};

/// Scaled bone images beyond this size are treated as degenerate
const MAX_SCALED_DIM: i64 = 8192;

/// Truncated size after uniform scaling, or None when either side would be
/// empty or absurdly large
pub fn scaled_size(size: (u32, u32), scale: f32) -> Option<(u32, u32)> {
    let w = (size.0 as f32 * scale) as i64;
    let h = (size.1 as f32 * scale) as i64;
    if w > 0 && h > 0 && w <= MAX_SCALED_DIM && h <= MAX_SCALED_DIM {
        Some((w as u32, h as u32))
    } else {
        None
    }
}

/// Counter-clockwise rotation (screen space) into a canvas enlarged to the
/// rotated bounding box. Uncovered pixels are transparent.
pub fn rotate_expand(image: &RgbaImage, degrees: f32) -> RgbaImage {
    let (w, h) = (image.width() as f32, image.height() as f32);
    let theta = degrees.to_radians();
    let (sin, cos) = theta.sin_cos();
    let out_w = ((w * cos.abs() + h * sin.abs()).round() as u32).max(1);
    let out_h = ((w * sin.abs() + h * cos.abs()).round() as u32).max(1);

    let projection = Projection::translate(-w / 2.0, -h / 2.0)
        .and_then(Projection::rotate(-theta))
        .and_then(Projection::translate(out_w as f32 / 2.0, out_h as f32 / 2.0));

    let mut out = RgbaImage::new(out_w, out_h);
    warp_into(
        image,
        &projection,
        Interpolation::Bilinear,
        Rgba([0, 0, 0, 0]),
        &mut out,
    );
    out
}

/// Smooth uniform scale followed by rotation
pub fn scale_rotate(image: &RgbaImage, scale: f32, degrees: f32) -> Option<RgbaImage> {
    let (w, h) = scaled_size(image.dimensions(), scale)?;
    let scaled = imageops::resize(image, w, h, FilterType::Triangle);
    Some(rotate_expand(&scaled, degrees))
}
