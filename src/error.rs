use std::path::PathBuf;
use thiserror::Error;

/// Asset and authoring faults found at load time. All of them are fatal.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("cannot load image {}: {source}", .path.display())]
    MissingImage {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("cannot read image directory {}: {source}", .path.display())]
    UnreadableDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no png/jpg/jpeg images found in {}", .0.display())]
    EmptyIdleSet(PathBuf),

    #[error("idle slideshow needs at least one image")]
    NoIdleImages,

    #[error("timing.{field} = {value} is not a usable number of seconds")]
    InvalidTiming { field: &'static str, value: f32 },

    #[error("bone {0} has coincident reference coordinates")]
    DegenerateBone(&'static str),
}
