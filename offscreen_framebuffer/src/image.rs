//! Host-side image buffers for attachment readback
//!
//! `ImageBuffer` is the CPU-side destination for attachment readback:
//! typed texel storage plus the small set of conversions the readback
//! paths need (16-to-8-bit conversion, channel mixing, vertical flip).

use glam::Vec3;

use crate::error::{Error, Result};

/// Host-side pixel format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// Single-channel 16-bit unsigned integer
    Gray16,
    /// Single-channel 8-bit unsigned integer
    Gray8,
    /// 3-channel 8-bit unsigned integer
    Rgb8,
    /// 3-channel 32-bit float
    RgbF32,
}

impl PixelFormat {
    /// Number of channels per pixel
    pub fn channels(&self) -> usize {
        match self {
            PixelFormat::Gray16 | PixelFormat::Gray8 => 1,
            PixelFormat::Rgb8 | PixelFormat::RgbF32 => 3,
        }
    }

    /// Size of one channel in bytes
    pub fn bytes_per_channel(&self) -> usize {
        match self {
            PixelFormat::Gray16 => 2,
            PixelFormat::Gray8 | PixelFormat::Rgb8 => 1,
            PixelFormat::RgbF32 => 4,
        }
    }

    /// Size of one pixel in bytes
    pub fn bytes_per_pixel(&self) -> usize {
        self.channels() * self.bytes_per_channel()
    }
}

/// Typed texel storage
///
/// Storage is typed rather than raw bytes so that the `u16`/`f32` views
/// are alignment-safe.
#[derive(Debug, Clone)]
enum TexelStorage {
    U8(Vec<u8>),
    U16(Vec<u16>),
    F32(Vec<f32>),
}

/// Host-memory image with typed texel storage
///
/// Rows are stored top-to-bottom in whatever order the producer wrote
/// them; `flip_vertical()` converts between the graphics API's bottom-up
/// row order and the top-down display convention.
#[derive(Debug, Clone)]
pub struct ImageBuffer {
    width: u32,
    height: u32,
    format: PixelFormat,
    storage: TexelStorage,
}

impl ImageBuffer {
    /// Create a zero-filled image
    pub fn new(width: u32, height: u32, format: PixelFormat) -> Self {
        let len = width as usize * height as usize * format.channels();
        let storage = match format {
            PixelFormat::Gray8 | PixelFormat::Rgb8 => TexelStorage::U8(vec![0; len]),
            PixelFormat::Gray16 => TexelStorage::U16(vec![0; len]),
            PixelFormat::RgbF32 => TexelStorage::F32(vec![0.0; len]),
        };
        Self {
            width,
            height,
            format,
            storage,
        }
    }

    /// Width in pixels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Pixel format
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Size of one row in bytes
    pub fn row_bytes(&self) -> usize {
        self.width as usize * self.format.bytes_per_pixel()
    }

    /// True if the image already has the given shape
    pub fn has_shape(&self, width: u32, height: u32, format: PixelFormat) -> bool {
        self.width == width && self.height == height && self.format == format
    }

    /// Reallocate to the given shape unless it already matches
    ///
    /// Readback paths call this to lazily (re)allocate caller-supplied
    /// and scratch images, reusing the allocation across calls.
    pub fn ensure_shape(&mut self, width: u32, height: u32, format: PixelFormat) {
        if !self.has_shape(width, height, format) {
            *self = Self::new(width, height, format);
        }
    }

    // ===== BYTE VIEWS =====

    /// Texel data as raw bytes
    pub fn as_bytes(&self) -> &[u8] {
        match &self.storage {
            TexelStorage::U8(v) => v,
            TexelStorage::U16(v) => bytemuck::cast_slice(v),
            TexelStorage::F32(v) => bytemuck::cast_slice(v),
        }
    }

    /// Texel data as raw mutable bytes
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        match &mut self.storage {
            TexelStorage::U8(v) => v,
            TexelStorage::U16(v) => bytemuck::cast_slice_mut(v),
            TexelStorage::F32(v) => bytemuck::cast_slice_mut(v),
        }
    }

    // ===== TYPED VIEWS =====

    /// 8-bit channel view (Gray8, Rgb8)
    pub fn texels_u8(&self) -> Result<&[u8]> {
        match &self.storage {
            TexelStorage::U8(v) => Ok(v),
            _ => Err(Self::view_mismatch(self.format, "u8")),
        }
    }

    /// Mutable 8-bit channel view (Gray8, Rgb8)
    pub fn texels_u8_mut(&mut self) -> Result<&mut [u8]> {
        match &mut self.storage {
            TexelStorage::U8(v) => Ok(v),
            _ => Err(Self::view_mismatch(self.format, "u8")),
        }
    }

    /// 16-bit channel view (Gray16)
    pub fn texels_u16(&self) -> Result<&[u16]> {
        match &self.storage {
            TexelStorage::U16(v) => Ok(v),
            _ => Err(Self::view_mismatch(self.format, "u16")),
        }
    }

    /// Mutable 16-bit channel view (Gray16)
    pub fn texels_u16_mut(&mut self) -> Result<&mut [u16]> {
        match &mut self.storage {
            TexelStorage::U16(v) => Ok(v),
            _ => Err(Self::view_mismatch(self.format, "u16")),
        }
    }

    /// Float channel view (RgbF32)
    pub fn texels_f32(&self) -> Result<&[f32]> {
        match &self.storage {
            TexelStorage::F32(v) => Ok(v),
            _ => Err(Self::view_mismatch(self.format, "f32")),
        }
    }

    /// Mutable float channel view (RgbF32)
    pub fn texels_f32_mut(&mut self) -> Result<&mut [f32]> {
        match &mut self.storage {
            TexelStorage::F32(v) => Ok(v),
            _ => Err(Self::view_mismatch(self.format, "f32")),
        }
    }

    /// Per-pixel `Vec3` view (RgbF32), one vector per normals texel
    pub fn texels_vec3(&self) -> Result<&[Vec3]> {
        Ok(bytemuck::cast_slice(self.texels_f32()?))
    }

    fn view_mismatch(format: PixelFormat, requested: &str) -> Error {
        Error::InvalidResource(format!(
            "texel view: {} requested from a {:?} image",
            requested, format
        ))
    }

    // ===== CONVERSIONS =====

    /// Convert a Gray16 image into a Gray8 image, saturating at 255
    ///
    /// `dst` is reshaped to match. Mirrors the 16-to-8-bit step of the
    /// color readback path.
    pub fn convert_to_gray8(&self, dst: &mut ImageBuffer) -> Result<()> {
        let src = self.texels_u16()?;
        dst.ensure_shape(self.width, self.height, PixelFormat::Gray8);
        let out = dst.texels_u8_mut()?;
        for (d, &s) in out.iter_mut().zip(src.iter()) {
            *d = s.min(255) as u8;
        }
        Ok(())
    }

    /// Copy channels between same-sized 8-bit images
    ///
    /// Each `(src_channel, dst_channel)` pair copies one source channel
    /// into one destination channel; unlisted destination channels are
    /// left untouched.
    pub fn mix_channels(&self, dst: &mut ImageBuffer, pairs: &[(usize, usize)]) -> Result<()> {
        if self.width != dst.width || self.height != dst.height {
            return Err(Error::InvalidResource(format!(
                "mix_channels: {}x{} source into {}x{} destination",
                self.width, self.height, dst.width, dst.height
            )));
        }
        let src_channels = self.format.channels();
        let dst_channels = dst.format.channels();
        for &(src_ch, dst_ch) in pairs {
            if src_ch >= src_channels || dst_ch >= dst_channels {
                return Err(Error::InvalidResource(format!(
                    "mix_channels: pair ({}, {}) out of range",
                    src_ch, dst_ch
                )));
            }
        }

        let pixels = self.width as usize * self.height as usize;
        let src = self.texels_u8()?;
        let out = dst.texels_u8_mut()?;
        for &(src_ch, dst_ch) in pairs {
            for px in 0..pixels {
                out[px * dst_channels + dst_ch] = src[px * src_channels + src_ch];
            }
        }
        Ok(())
    }

    /// Flip rows in place (bottom-up GL order <-> top-down display order)
    pub fn flip_vertical(&mut self) {
        let row_bytes = self.row_bytes();
        let height = self.height as usize;
        let bytes = self.as_bytes_mut();
        for y in 0..height / 2 {
            let top = y * row_bytes;
            let bottom = (height - 1 - y) * row_bytes;
            for i in 0..row_bytes {
                bytes.swap(top + i, bottom + i);
            }
        }
    }
}

#[cfg(test)]
#[path = "image_tests.rs"]
mod tests;
