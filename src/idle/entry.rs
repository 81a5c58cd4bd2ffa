use std::fs;
use std::path::{Path, PathBuf};

use image::RgbaImage;
use tracing::{debug, info};

use crate::error::AssetError;

const EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// One ambient image
#[derive(Debug, Clone)]
pub struct IdleImage {
    pub path: PathBuf,
    pub image: RgbaImage,
    pub width: u32,
    pub height: u32,
    pub aspect_ratio: f32,
}

impl IdleImage {
    pub fn new(path: PathBuf, image: RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            path,
            image,
            width,
            height,
            aspect_ratio: width as f32 / height.max(1) as f32,
        }
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, AssetError> {
        let path = path.as_ref().to_path_buf();
        let image = image::open(&path)
            .map_err(|source| AssetError::MissingImage {
                path: path.clone(),
                source,
            })?
            .to_rgba8();
        Ok(Self::new(path, image))
    }
}

/// Load every png/jpg/jpeg in `dir`, sorted by file name
pub fn load_dir<P: AsRef<Path>>(dir: P) -> Result<Vec<IdleImage>, AssetError> {
    let dir = dir.as_ref();
    let entries = fs::read_dir(dir).map_err(|source| AssetError::UnreadableDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut paths: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
                .unwrap_or(false)
        })
        .collect();
    paths.sort();

    if paths.is_empty() {
        return Err(AssetError::EmptyIdleSet(dir.to_path_buf()));
    }

    let mut images = Vec::with_capacity(paths.len());
    for path in paths {
        let image = IdleImage::open(&path)?;
        debug!("idle image {} ({}x{})", path.display(), image.width, image.height);
        images.push(image);
    }
    info!("loaded {} idle images from {}", images.len(), dir.display());
    Ok(images)
}

/// Scaled size and centring margins of an image fitted inside a surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FitRect {
    pub width: u32,
    pub height: u32,
    pub margin_x: i32,
    pub margin_y: i32,
}

/// Fill one surface dimension and centre the other, keeping the image aspect
pub fn letterbox(image: (u32, u32), surface: (u32, u32)) -> FitRect {
    let (iw, ih) = (image.0.max(1) as f32, image.1.max(1) as f32);
    let (sw, sh) = (surface.0 as f32, surface.1.max(1) as f32);
    if sw / sh > iw / ih {
        let width = (iw * sh / ih) as u32;
        FitRect {
            width,
            height: surface.1,
            margin_x: ((sw - width as f32) / 2.0) as i32,
            margin_y: 0,
        }
    } else {
        let height = (ih * sw / iw) as u32;
        FitRect {
            width: surface.0,
            height,
            margin_x: 0,
            margin_y: ((sh - height as f32) / 2.0) as i32,
        }
    }
}
