use std::path::Path;
use std::sync::Arc;

use image::RgbaImage;
use tracing::debug;

use crate::error::AssetError;
use crate::skeleton::bone::BoneId;

/// One loaded image per bone, shared by every user's placements
#[derive(Clone)]
pub struct BoneAtlas {
    images: Vec<Arc<RgbaImage>>,
}

impl BoneAtlas {
    /// Load `<dir>/<bone-name>.png` for every bone
    pub fn load<P: AsRef<Path>>(dir: P) -> Result<Self, AssetError> {
        let dir = dir.as_ref();
        let mut images = Vec::with_capacity(BoneId::COUNT);
        for bone in BoneId::ALL {
            if bone.spec().reference_length() <= 0.0 {
                return Err(AssetError::DegenerateBone(bone.name()));
            }
            let path = dir.join(format!("{}.png", bone.name()));
            let image = image::open(&path)
                .map_err(|source| AssetError::MissingImage {
                    path: path.clone(),
                    source,
                })?
                .to_rgba8();
            debug!("loaded {} ({}x{})", path.display(), image.width(), image.height());
            images.push(Arc::new(image));
        }
        Ok(Self { images })
    }

    /// Build from in-memory images
    pub fn from_fn<F: FnMut(BoneId) -> RgbaImage>(mut f: F) -> Self {
        Self {
            images: BoneId::ALL.iter().map(|&bone| Arc::new(f(bone))).collect(),
        }
    }

    pub fn image(&self, bone: BoneId) -> Arc<RgbaImage> {
        Arc::clone(&self.images[bone as usize])
    }
}
