/// World (mm) to depth-image pixel conversion provided by the tracker
pub trait DepthProjection {
    fn project(&self, position: [f32; 3]) -> [f32; 2];
}

/// Pinhole model of the depth camera
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinholeProjection {
    pub width: f32,
    pub height: f32,
    pub focal_x: f32,
    pub focal_y: f32,
}

impl PinholeProjection {
    /// Focal lengths from the field of view (degrees)
    pub fn from_fov(width: u32, height: u32, fov_x_deg: f32, fov_y_deg: f32) -> Self {
        let width = width as f32;
        let height = height as f32;
        Self {
            width,
            height,
            focal_x: (width / 2.0) / (fov_x_deg.to_radians() / 2.0).tan(),
            focal_y: (height / 2.0) / (fov_y_deg.to_radians() / 2.0).tan(),
        }
    }

    /// Depth stream of the given capture size; 512x424 is the Kinect v2,
    /// everything else is treated as a PrimeSense-class 640x480 sensor
    pub fn for_capture(width: u32, height: u32) -> Self {
        if (width, height) == (512, 424) {
            Self::from_fov(width, height, 70.6, 60.0)
        } else {
            Self::from_fov(width, height, 58.5, 45.6)
        }
    }
}

impl DepthProjection for PinholeProjection {
    fn project(&self, position: [f32; 3]) -> [f32; 2] {
        let [x, y, z] = position;
        if z <= 0.0 {
            return [self.width / 2.0, self.height / 2.0];
        }
        [
            self.width / 2.0 + x * self.focal_x / z,
            self.height / 2.0 - y * self.focal_y / z,
        ]
    }
}

/// Drops z. Used where positions are already in render space.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlanarProjection;

impl DepthProjection for PlanarProjection {
    fn project(&self, position: [f32; 3]) -> [f32; 2] {
        [position[0], position[1]]
    }
}
