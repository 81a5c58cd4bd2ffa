use std::sync::Arc;

use image::RgbaImage;

use crate::pose::{resolve, DepthProjection, Skeleton};
use crate::render::transform::{scale_rotate, scaled_size};
use crate::skeleton::bone::{angle_degrees, distance, BoneSpec};

/// Bone image ready to blit
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    pub image: RgbaImage,
    pub x: i32,
    pub y: i32,
}

/// Places one bone image of one user from the live endpoint positions
pub struct BonePlacement {
    spec: BoneSpec,
    reference_length: f32,
    reference_angle: f32,
    source: Arc<RgbaImage>,
    /// Last accepted endpoints (x1, y1), (x2, y2)
    endpoints: Option<[[f32; 2]; 2]>,
    scale: f32,
    rotation: f32,
    placement: Option<Placement>,
}

impl BonePlacement {
    pub fn new(spec: BoneSpec, source: Arc<RgbaImage>) -> Self {
        Self {
            reference_length: spec.reference_length(),
            reference_angle: spec.reference_angle(),
            spec,
            source,
            endpoints: None,
            scale: 1.0,
            rotation: 0.0,
            placement: None,
        }
    }

    /// Update from a skeleton snapshot. `offset` shifts the result into the
    /// render surface. Returns true when the placement changed.
    ///
    /// Nothing moves unless at least one endpoint is confident; when one is,
    /// both endpoints are taken as resolved this frame and stored, even if
    /// the scaled image turns out degenerate and the placement is kept.
    pub fn update<P: DepthProjection + ?Sized>(
        &mut self,
        skeleton: &Skeleton,
        projection: &P,
        offset: (i32, i32),
    ) -> bool {
        let s1 = resolve(skeleton, self.spec.endpoints[0], projection);
        let s2 = resolve(skeleton, self.spec.endpoints[1], projection);
        if !(s1.confident || s2.confident) {
            return false;
        }

        let p1 = [s1.x, s1.y];
        let p2 = [s2.x, s2.y];
        self.endpoints = Some([p1, p2]);

        let scale = distance(p1, p2) / self.reference_length;
        let rotation = angle_degrees(p1, p2) - self.reference_angle;

        let Some(scaled) = scaled_size(self.source.dimensions(), scale) else {
            return false;
        };
        let Some(image) = scale_rotate(&self.source, scale, rotation) else {
            return false;
        };

        let pivot = [self.spec.coords[0][0] * scale, self.spec.coords[0][1] * scale];
        let (x, y) = rotated_origin(scaled, p1, pivot, rotation);

        self.scale = scale;
        self.rotation = rotation;
        self.placement = Some(Placement {
            image,
            x: x + offset.0,
            y: y + offset.1,
        });
        true
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Degrees, counter-clockwise on screen
    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    pub fn endpoints(&self) -> Option<[[f32; 2]; 2]> {
        self.endpoints
    }

    /// None until the first successful update
    pub fn placement(&self) -> Option<&Placement> {
        self.placement.as_ref()
    }
}

/// Counter-clockwise rotation of a y-up vector
fn rotate_vec(v: [f32; 2], degrees: f32) -> [f32; 2] {
    let (sin, cos) = degrees.to_radians().sin_cos();
    [v[0] * cos - v[1] * sin, v[0] * sin + v[1] * cos]
}

/// Top-left corner at which an image of `size`, rotated by `degrees` about
/// `pivot` (image pixel coordinates), must be drawn so that the pivot lands
/// on `pos`. The rotated canvas is the bounding box of the rotated rectangle.
pub fn rotated_origin(size: (u32, u32), pos: [f32; 2], pivot: [f32; 2], degrees: f32) -> (i32, i32) {
    let (w, h) = (size.0 as f32, size.1 as f32);
    // y-up frame: the image occupies y in [-h, 0]
    let corners = [[0.0, 0.0], [w, 0.0], [w, -h], [0.0, -h]].map(|c| rotate_vec(c, degrees));
    let min_x = corners.iter().map(|c| c[0]).fold(f32::INFINITY, f32::min);
    let max_y = corners.iter().map(|c| c[1]).fold(f32::NEG_INFINITY, f32::max);

    let pivot_up = [pivot[0], -pivot[1]];
    let pivot_rot = rotate_vec(pivot_up, degrees);
    let moved = [pivot_rot[0] - pivot_up[0], pivot_rot[1] - pivot_up[1]];

    let x = pos[0] - pivot[0] + min_x - moved[0];
    let y = pos[1] - pivot[1] - max_y + moved[1];
    (x as i32, y as i32)
}
