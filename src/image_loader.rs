use std::path::Path;

use crate::error::Error;

/// Decoded RGBA8 image, row-major.
#[derive(Clone, Debug, PartialEq)]
pub struct PixelGrid {
    width: usize,
    height: usize,
    rgba: Vec<u8>,
}

impl PixelGrid {
    #[cfg(test)]
    pub fn from_rgba(width: usize, height: usize, rgba: Vec<u8>) -> Option<Self> {
        if rgba.len() != width * height * 4 {
            return None;
        }
        Some(Self {
            width,
            height,
            rgba,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn size(&self) -> [usize; 2] {
        [self.width, self.height]
    }

    pub fn rgba(&self) -> &[u8] {
        &self.rgba
    }
}

pub fn load(path: &Path) -> Result<PixelGrid, Error> {
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }
    let img = image::open(path).map_err(|e| match e {
        image::ImageError::IoError(io) if io.kind() == std::io::ErrorKind::NotFound => {
            Error::FileNotFound(path.to_path_buf())
        }
        other => Error::UnsupportedFormat {
            path: path.to_path_buf(),
            reason: other.to_string(),
        },
    })?;

    let rgba = img.to_rgba8();
    let (w, h) = (rgba.width() as usize, rgba.height() as usize);
    log::info!("loaded {} ({w}x{h})", path.display());
    Ok(PixelGrid {
        width: w,
        height: h,
        rgba: rgba.into_raw(),
    })
}
