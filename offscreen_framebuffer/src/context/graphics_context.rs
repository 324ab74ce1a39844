/// GraphicsContext trait and texture/framebuffer descriptors
///
/// The trait covers exactly the primitives an off-screen render target
/// needs from the native graphics API: texture allocation, framebuffer
/// attachment, draw-buffer configuration, and blocking readback.
///
/// The caller must ensure the native context is current on the calling
/// thread for every method; this is an external precondition, not
/// enforced here.

use crate::error::Result;

// ===== OPAQUE HANDLES =====

/// Opaque handle to a GPU texture owned by a `GraphicsContext`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u64);

/// Opaque handle to a GPU framebuffer object owned by a `GraphicsContext`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FramebufferHandle(pub u64);

// ===== TEXTURE DESC =====

/// Texture format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(non_camel_case_types)]
pub enum TextureFormat {
    /// Single-channel 16-bit unsigned integer (color and depth attachments)
    R16_UINT,
    /// 3-channel 32-bit float (normals attachment)
    RGB32_FLOAT,
}

impl TextureFormat {
    /// Number of channels per texel
    pub fn channels(&self) -> u32 {
        match self {
            TextureFormat::R16_UINT => 1,
            TextureFormat::RGB32_FLOAT => 3,
        }
    }

    /// Size of one texel in bytes
    pub fn bytes_per_texel(&self) -> usize {
        match self {
            TextureFormat::R16_UINT => 2,
            TextureFormat::RGB32_FLOAT => 12,
        }
    }
}

/// Texture sampling filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureFilter {
    Nearest,
    Linear,
}

/// Texture wrap mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureWrap {
    ClampToEdge,
    Repeat,
}

/// Descriptor for creating a texture
#[derive(Debug, Clone)]
pub struct TextureDesc {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Texel format
    pub format: TextureFormat,
    /// Min/mag sampling filter
    pub filter: TextureFilter,
    /// Wrap mode (both axes)
    pub wrap: TextureWrap,
}

impl TextureDesc {
    /// Descriptor for a 16-bit single-channel attachment texture
    /// (nearest filtering, clamp-to-edge wrap)
    pub fn attachment_r16(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            format: TextureFormat::R16_UINT,
            filter: TextureFilter::Nearest,
            wrap: TextureWrap::ClampToEdge,
        }
    }

    /// Descriptor for a 3-channel float attachment texture
    /// (nearest filtering, clamp-to-edge wrap)
    pub fn attachment_rgb32f(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            format: TextureFormat::RGB32_FLOAT,
            filter: TextureFilter::Nearest,
            wrap: TextureWrap::ClampToEdge,
        }
    }

    /// Total byte size of the texture's texel data
    pub fn byte_len(&self) -> usize {
        self.width as usize * self.height as usize * self.format.bytes_per_texel()
    }
}

// ===== GRAPHICS CONTEXT TRAIT =====

/// Graphics context trait
///
/// Implemented by backend-specific contexts (e.g., `GlGraphicsContext`).
/// All calls are synchronous: readback blocks until the driver completes
/// the transfer. The context is single-threaded by contract; sharing
/// happens through `Arc<Mutex<dyn GraphicsContext>>`.
pub trait GraphicsContext {
    /// Allocate a texture sized and formatted per the descriptor
    fn create_texture(&mut self, desc: &TextureDesc) -> Result<TextureHandle>;

    /// Release a texture
    ///
    /// # Errors
    ///
    /// Returns an error if the handle does not name a live texture.
    fn delete_texture(&mut self, texture: TextureHandle) -> Result<()>;

    /// Create an empty framebuffer object
    fn create_framebuffer(&mut self) -> Result<FramebufferHandle>;

    /// Release a framebuffer object
    fn delete_framebuffer(&mut self, framebuffer: FramebufferHandle) -> Result<()>;

    /// Attach a texture to a framebuffer's draw-buffer slot
    ///
    /// Slot 0 is the color output, slot 1 the depth output, slot 2 the
    /// normals output. The framebuffer is left bound afterwards.
    fn attach_texture(
        &mut self,
        framebuffer: FramebufferHandle,
        slot: u32,
        texture: TextureHandle,
    ) -> Result<()>;

    /// Driver completeness check for a framebuffer's current attachments
    ///
    /// Leaves the framebuffer bound.
    fn framebuffer_complete(&self, framebuffer: FramebufferHandle) -> Result<bool>;

    /// Bind a framebuffer as the active render target
    ///
    /// `None` restores the default render target (the window/back buffer).
    fn bind_framebuffer(&mut self, framebuffer: Option<FramebufferHandle>) -> Result<()>;

    /// Configure which draw-buffer slots are active simultaneous outputs
    fn set_draw_slots(&mut self, slots: &[u32]) -> Result<()>;

    /// Copy a texture's texel data from GPU memory into `out`
    ///
    /// `out` must hold exactly `width * height * bytes_per_texel(format)`
    /// bytes for the texture being read. Blocks until the transfer
    /// completes.
    fn read_texture(
        &self,
        texture: TextureHandle,
        format: TextureFormat,
        out: &mut [u8],
    ) -> Result<()>;
}
