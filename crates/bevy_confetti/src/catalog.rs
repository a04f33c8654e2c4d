use std::sync::{Arc, OnceLock};

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::textures::{ParticleBitmap, RasterizeError, rasterize};

/// An opaque sRGB colour from the confetti palette, stored as 8-bit channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Reflect)]
pub struct ParticleColor {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl ParticleColor {
    /// Creates a colour from its 8-bit channels.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Returns the colour as straight (non-premultiplied) RGBA bytes, fully opaque.
    pub fn rgba(self) -> [u8; 4] {
        [self.r, self.g, self.b, 255]
    }
}

/// The nine fixed confetti colours, in catalog order.
pub const PALETTE: [ParticleColor; 9] = [
    ParticleColor::new(149, 58, 255),
    ParticleColor::new(255, 195, 41),
    ParticleColor::new(255, 101, 26),
    ParticleColor::new(123, 92, 255),
    ParticleColor::new(76, 126, 255),
    ParticleColor::new(71, 192, 255),
    ParticleColor::new(255, 47, 39),
    ParticleColor::new(255, 91, 134),
    ParticleColor::new(233, 122, 208),
];

/// The silhouette of a confetti piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Reflect)]
pub enum ParticleShape {
    /// A 20×13 filled rectangle.
    Rectangle,
    /// A 10×10 filled circle.
    Circle,
}

impl ParticleShape {
    /// Both shapes, in catalog order.
    pub const ALL: [ParticleShape; 2] = [ParticleShape::Rectangle, ParticleShape::Circle];

    /// Bitmap size in pixels.
    pub fn size(self) -> UVec2 {
        match self {
            Self::Rectangle => UVec2::new(20, 13),
            Self::Circle => UVec2::new(10, 10),
        }
    }
}

/// The depth layer a variant was generated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Reflect)]
pub enum DepthLayer {
    /// Near layer.
    Foreground,
    /// Far layer.
    Background,
}

impl DepthLayer {
    /// Both depth layers, in catalog order.
    pub const ALL: [DepthLayer; 2] = [DepthLayer::Foreground, DepthLayer::Background];
}

/// Stable identifier of a variant within its catalog.
///
/// Timeline entries that animate a single emitter cell address it by this id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VariantId(pub u16);

impl std::fmt::Display for VariantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "cell-{:02}", self.0)
    }
}

/// Lazily rasterized image shared by every variant with the same shape and colour.
#[derive(Debug)]
struct SharedImage {
    shape: ParticleShape,
    color: ParticleColor,
    bitmap: OnceLock<Arc<ParticleBitmap>>,
    texture: OnceLock<Handle<Image>>,
}

impl SharedImage {
    fn new(shape: ParticleShape, color: ParticleColor) -> Self {
        Self {
            shape,
            color,
            bitmap: OnceLock::new(),
            texture: OnceLock::new(),
        }
    }
}

/// One (depth layer, shape, colour) combination of the confetti catalog.
#[derive(Debug, Clone)]
pub struct ParticleVariant {
    /// Identifier, unique within the catalog.
    pub id: VariantId,
    /// Fill colour.
    pub color: ParticleColor,
    /// Silhouette.
    pub shape: ParticleShape,
    /// Depth layer the variant belongs to.
    pub depth_layer: DepthLayer,
    image: Arc<SharedImage>,
}

impl ParticleVariant {
    /// Returns the variant's bitmap, rasterizing it on first access.
    ///
    /// Every later call returns the same [`Arc`].
    pub fn bitmap(&self) -> Result<Arc<ParticleBitmap>, RasterizeError> {
        if let Some(bitmap) = self.image.bitmap.get() {
            return Ok(bitmap.clone());
        }
        let bitmap = Arc::new(rasterize(self.image.shape, self.image.color)?);
        Ok(self.image.bitmap.get_or_init(|| bitmap).clone())
    }

    /// Returns a handle to the variant's texture, uploading the bitmap into `images`
    /// on first access.
    pub fn texture(&self, images: &mut Assets<Image>) -> Result<Handle<Image>, RasterizeError> {
        if let Some(handle) = self.image.texture.get() {
            return Ok(handle.clone());
        }
        let handle = images.add(self.bitmap()?.to_image());
        Ok(self.image.texture.get_or_init(|| handle).clone())
    }

    /// Returns `true` if both variants draw from the same cached image.
    pub fn shares_image_with(&self, other: &ParticleVariant) -> bool {
        Arc::ptr_eq(&self.image, &other.image)
    }
}

/// The full set of confetti variants: 2 depth layers × 2 shapes × 9 colours.
#[derive(Debug, Clone)]
pub struct ParticleCatalog {
    variants: Vec<ParticleVariant>,
}

impl ParticleCatalog {
    /// Enumerates the catalog in a stable order: depth layer, then shape, then palette
    /// colour.
    ///
    /// Nothing is rasterized here; bitmaps are produced on first access and shared
    /// between the two depth layers of each (shape, colour) pair.
    pub fn generate() -> Self {
        let shared: Vec<Arc<SharedImage>> = ParticleShape::ALL
            .iter()
            .flat_map(|&shape| {
                PALETTE
                    .iter()
                    .map(move |&color| Arc::new(SharedImage::new(shape, color)))
            })
            .collect();

        let mut variants = Vec::with_capacity(DepthLayer::ALL.len() * shared.len());
        for depth_layer in DepthLayer::ALL {
            for image in &shared {
                variants.push(ParticleVariant {
                    id: VariantId(variants.len() as u16),
                    color: image.color,
                    shape: image.shape,
                    depth_layer,
                    image: image.clone(),
                });
            }
        }

        debug!("generated confetti catalog with {} variants", variants.len());
        Self { variants }
    }

    /// All variants in catalog order.
    pub fn variants(&self) -> &[ParticleVariant] {
        &self.variants
    }

    /// Number of variants.
    pub fn len(&self) -> usize {
        self.variants.len()
    }

    /// Returns `true` if the catalog holds no variants.
    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    /// Looks up a variant by id.
    pub fn get(&self, id: VariantId) -> Option<&ParticleVariant> {
        self.variants.iter().find(|variant| variant.id == id)
    }
}
