use bevy::{
    asset::RenderAssetUsages,
    prelude::*,
    render::render_resource::{Extent3d, TextureDimension, TextureFormat, TextureUsages},
};
use thiserror::Error;

use crate::catalog::{ParticleColor, ParticleShape};

const SUPERSAMPLES: u32 = 4;

/// Errors that can occur when rasterizing a particle bitmap.
#[non_exhaustive]
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RasterizeError {
    /// The requested bitmap has no pixels.
    #[error("Cannot rasterize an empty {width}x{height} bitmap")]
    Empty {
        /// Requested width in pixels.
        width: u32,
        /// Requested height in pixels.
        height: u32,
    },
    /// The requested bitmap does not fit in memory.
    #[error("Bitmap of {width}x{height} pixels is too large")]
    TooLarge {
        /// Requested width in pixels.
        width: u32,
        /// Requested height in pixels.
        height: u32,
    },
}

/// A small CPU-side RGBA8 image holding one confetti piece.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticleBitmap {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl ParticleBitmap {
    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Size in pixels.
    pub fn size(&self) -> UVec2 {
        UVec2::new(self.width, self.height)
    }

    /// Raw sRGB RGBA bytes, row-major from the top-left pixel.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Returns the RGBA value at `(x, y)`, or `None` outside the bitmap.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = ((y * self.width + x) * 4) as usize;
        let px = &self.data[offset..offset + 4];
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Copies the bitmap into a Bevy [`Image`] ready to be used as a sprite texture.
    pub fn to_image(&self) -> Image {
        let mut image = Image::new(
            Extent3d {
                width: self.width,
                height: self.height,
                depth_or_array_layers: 1,
            },
            TextureDimension::D2,
            self.data.clone(),
            TextureFormat::Rgba8UnormSrgb,
            RenderAssetUsages::default(),
        );
        image.texture_descriptor.usage = TextureUsages::TEXTURE_BINDING | TextureUsages::COPY_DST;
        image
    }
}

/// Rasterizes a borderless, filled confetti piece at its natural size.
pub fn rasterize(
    shape: ParticleShape,
    color: ParticleColor,
) -> Result<ParticleBitmap, RasterizeError> {
    rasterize_sized(shape, color, shape.size())
}

/// Rasterizes a borderless, filled confetti piece into a `size` pixel bitmap.
///
/// Rectangles fill every pixel. Circles fill the inscribed ellipse; edge pixels
/// get fractional alpha from a 4×4 supersample grid.
pub fn rasterize_sized(
    shape: ParticleShape,
    color: ParticleColor,
    size: UVec2,
) -> Result<ParticleBitmap, RasterizeError> {
    let (width, height) = (size.x, size.y);
    if width == 0 || height == 0 {
        return Err(RasterizeError::Empty { width, height });
    }
    let len = (width as usize)
        .checked_mul(height as usize)
        .and_then(|pixels| pixels.checked_mul(4))
        .ok_or(RasterizeError::TooLarge { width, height })?;

    let mut data = Vec::with_capacity(len);
    let [r, g, b, _] = color.rgba();

    for y in 0..height {
        for x in 0..width {
            let coverage = match shape {
                ParticleShape::Rectangle => 1.0,
                ParticleShape::Circle => ellipse_coverage(x, y, width, height),
            };
            data.extend_from_slice(&[r, g, b, (coverage * 255.0).round() as u8]);
        }
    }

    Ok(ParticleBitmap {
        width,
        height,
        data,
    })
}

fn ellipse_coverage(x: u32, y: u32, width: u32, height: u32) -> f32 {
    let rx = width as f32 * 0.5;
    let ry = height as f32 * 0.5;
    let step = 1.0 / SUPERSAMPLES as f32;

    let mut inside = 0;
    for sy in 0..SUPERSAMPLES {
        for sx in 0..SUPERSAMPLES {
            let px = x as f32 + (sx as f32 + 0.5) * step;
            let py = y as f32 + (sy as f32 + 0.5) * step;
            let dx = (px - rx) / rx;
            let dy = (py - ry) / ry;
            if dx * dx + dy * dy <= 1.0 {
                inside += 1;
            }
        }
    }

    inside as f32 / (SUPERSAMPLES * SUPERSAMPLES) as f32
}
