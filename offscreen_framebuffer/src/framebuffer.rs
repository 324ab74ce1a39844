/// OffscreenFramebuffer - off-screen render target with CPU readback
///
/// Allocates attachment textures, groups them in a framebuffer object,
/// exposes bind/unbind for rendering into it, and reads attachments back
/// into host-side image buffers.
///
/// Lifecycle: Uninitialized -> Initialized (init) -> Uninitialized
/// (cleanup). Every other operation requires the Initialized state and
/// errors with `NotInitialized` otherwise. Dropping an initialized
/// instance performs exactly one cleanup.

use std::sync::{Arc, Mutex, MutexGuard};

use bitflags::bitflags;

use crate::context::{
    FramebufferHandle, GraphicsContext, TextureDesc, TextureFormat, TextureHandle,
};
use crate::display::ImagePresenter;
use crate::error::{Error, Result};
use crate::image::{ImageBuffer, PixelFormat};
use crate::{fb_debug, fb_error, fb_warn};

/// Draw-buffer slot of the color attachment
const COLOR_SLOT: u32 = 0;
/// Draw-buffer slot of the depth attachment
const DEPTH_SLOT: u32 = 1;
/// Draw-buffer slot of the normals attachment
const NORMALS_SLOT: u32 = 2;

/// Preview window names
const COLOR_WINDOW: &str = "color_channel";
const DEPTH_WINDOW: &str = "depth_channel";
const NORMALS_WINDOW: &str = "normals_channel";

const LOG_SOURCE: &str = "offscreen::Framebuffer";

bitflags! {
    /// Set of attachments currently backed by a texture
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Attachments: u32 {
        const COLOR = 1 << 0;
        const DEPTH = 1 << 1;
        const NORMALS = 1 << 2;
    }
}

/// Off-screen render target wrapping a framebuffer object
///
/// Owns a color attachment (always), a depth attachment (when
/// `render_depth` is requested at init), and an optional normals
/// attachment created explicitly via `create_normals_attachment()`.
/// Color and depth are 16-bit single-channel; normals are 3-channel
/// float.
///
/// The graphics context is shared (`Arc<Mutex<_>>`) so that `Drop` can
/// release the GPU handles on every exit path. All operations are
/// synchronous and single-threaded by contract; the caller must keep the
/// native context current on the calling thread.
pub struct OffscreenFramebuffer {
    context: Arc<Mutex<dyn GraphicsContext>>,
    width: u32,
    height: u32,
    render_depth: bool,
    color: Option<TextureHandle>,
    depth: Option<TextureHandle>,
    normals: Option<TextureHandle>,
    framebuffer: Option<FramebufferHandle>,
    initialized: bool,
    /// Reusable 16-bit scratch for the color readback path
    scratch_gray16: Option<ImageBuffer>,
    /// Reusable scratch images for the display helpers
    display_color: Option<ImageBuffer>,
    display_depth: Option<ImageBuffer>,
    display_normals: Option<ImageBuffer>,
}

impl OffscreenFramebuffer {
    /// Create an uninitialized framebuffer (deferred init)
    pub fn new(context: Arc<Mutex<dyn GraphicsContext>>) -> Self {
        Self {
            context,
            width: 0,
            height: 0,
            render_depth: false,
            color: None,
            depth: None,
            normals: None,
            framebuffer: None,
            initialized: false,
            scratch_gray16: None,
            display_color: None,
            display_depth: None,
            display_normals: None,
        }
    }

    /// Create and immediately initialize a framebuffer
    pub fn with_size(
        context: Arc<Mutex<dyn GraphicsContext>>,
        width: u32,
        height: u32,
        render_depth: bool,
    ) -> Result<Self> {
        let mut framebuffer = Self::new(context);
        framebuffer.init(width, height, render_depth)?;
        Ok(framebuffer)
    }

    /// True after a successful init(), false after cleanup()
    pub fn ready(&self) -> bool {
        self.initialized
    }

    /// Width in pixels (0 before init)
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels (0 before init)
    pub fn height(&self) -> u32 {
        self.height
    }

    /// True if a depth attachment was requested at init
    pub fn render_depth(&self) -> bool {
        self.render_depth
    }

    /// Set of attachments currently backed by a texture
    pub fn attachments(&self) -> Attachments {
        let mut set = Attachments::empty();
        if self.color.is_some() {
            set |= Attachments::COLOR;
        }
        if self.depth.is_some() {
            set |= Attachments::DEPTH;
        }
        if self.normals.is_some() {
            set |= Attachments::NORMALS;
        }
        set
    }

    // ===== LIFECYCLE =====

    /// Allocate attachments and the framebuffer object
    ///
    /// Creates the color texture, the depth texture when `render_depth`
    /// is set, and the framebuffer with color on slot 0 and depth on
    /// slot 1. Driver-reported incompleteness is logged as a warning and
    /// is non-fatal; the framebuffer still becomes initialized.
    ///
    /// # Errors
    ///
    /// - `AlreadyInitialized` if init() already succeeded
    /// - `InvalidResource` for a zero-sized request
    /// - `BackendError` from the graphics context; partially created
    ///   resources are released before returning
    pub fn init(&mut self, width: u32, height: u32, render_depth: bool) -> Result<()> {
        if self.initialized {
            fb_error!(LOG_SOURCE, "init: framebuffer already initialized");
            return Err(Error::AlreadyInitialized);
        }
        if width == 0 || height == 0 {
            return Err(Error::InvalidResource(format!(
                "init: zero-sized framebuffer {}x{}",
                width, height
            )));
        }

        let mut ctx = self.lock_context()?;

        let color = ctx.create_texture(&TextureDesc::attachment_r16(width, height))?;

        let depth = if render_depth {
            match ctx.create_texture(&TextureDesc::attachment_r16(width, height)) {
                Ok(texture) => Some(texture),
                Err(err) => {
                    release_partial(&mut *ctx, &[color], None);
                    return Err(err);
                }
            }
        } else {
            None
        };

        let created: Vec<TextureHandle> = [Some(color), depth].into_iter().flatten().collect();

        let framebuffer = match ctx.create_framebuffer() {
            Ok(framebuffer) => framebuffer,
            Err(err) => {
                release_partial(&mut *ctx, &created, None);
                return Err(err);
            }
        };

        let attach_result = (|| -> Result<()> {
            ctx.bind_framebuffer(Some(framebuffer))?;
            ctx.attach_texture(framebuffer, COLOR_SLOT, color)?;
            if let Some(depth) = depth {
                ctx.attach_texture(framebuffer, DEPTH_SLOT, depth)?;
            }
            if !ctx.framebuffer_complete(framebuffer)? {
                fb_warn!(
                    LOG_SOURCE,
                    "framebuffer {}x{} incomplete after attachment",
                    width,
                    height
                );
            }
            // Unbind to avoid leaking the binding into caller state
            ctx.bind_framebuffer(None)
        })();
        if let Err(err) = attach_result {
            release_partial(&mut *ctx, &created, Some(framebuffer));
            return Err(err);
        }
        drop(ctx);

        self.width = width;
        self.height = height;
        self.render_depth = render_depth;
        self.color = Some(color);
        self.depth = depth;
        self.framebuffer = Some(framebuffer);
        self.initialized = true;
        fb_debug!(
            LOG_SOURCE,
            "initialized {}x{} (render_depth = {})",
            width,
            height,
            render_depth
        );
        Ok(())
    }

    /// Release all GPU resources
    ///
    /// Deletes every attachment that exists, restores the default render
    /// target, and deletes the framebuffer object. Deletion continues
    /// past individual failures; the first error is returned.
    ///
    /// # Errors
    ///
    /// Returns `NotInitialized` without a prior successful init().
    pub fn cleanup(&mut self) -> Result<()> {
        if !self.initialized {
            fb_error!(LOG_SOURCE, "cleanup: framebuffer not initialized");
            return Err(Error::NotInitialized);
        }

        let context = Arc::clone(&self.context);
        let mut ctx = context
            .lock()
            .map_err(|_| Error::BackendError("graphics context lock poisoned".to_string()))?;
        let mut first_err = None;

        let textures = [self.color.take(), self.depth.take(), self.normals.take()];
        for texture in textures.into_iter().flatten() {
            if let Err(err) = ctx.delete_texture(texture) {
                first_err.get_or_insert(err);
            }
        }

        // Bind 0, which means render to back buffer; the fb ends up unbound
        if let Err(err) = ctx.bind_framebuffer(None) {
            first_err.get_or_insert(err);
        }
        if let Some(framebuffer) = self.framebuffer.take() {
            if let Err(err) = ctx.delete_framebuffer(framebuffer) {
                first_err.get_or_insert(err);
            }
        }
        drop(ctx);

        self.initialized = false;
        match first_err {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    // ===== BIND / UNBIND =====

    /// Bind the framebuffer as the active render target
    ///
    /// When depth rendering is enabled, configures slots 0 and 1 as
    /// simultaneous draw targets; otherwise slot 0 alone is implied.
    pub fn bind(&self) -> Result<()> {
        let framebuffer = self.require_initialized()?;
        let mut ctx = self.lock_context()?;
        ctx.bind_framebuffer(Some(framebuffer))?;
        if self.render_depth {
            ctx.set_draw_slots(&[COLOR_SLOT, DEPTH_SLOT])?;
        }
        Ok(())
    }

    /// Restore the default render target (the window/back buffer)
    pub fn unbind(&self) -> Result<()> {
        self.require_initialized()?;
        let mut ctx = self.lock_context()?;
        ctx.bind_framebuffer(None)
    }

    // ===== NORMALS ATTACHMENT =====

    /// Create the 3-channel float normals attachment on slot 2
    ///
    /// The normals attachment is not part of init(); normals readback
    /// and display require this explicit call first and fail with
    /// `MissingAttachment` otherwise.
    pub fn create_normals_attachment(&mut self) -> Result<()> {
        let framebuffer = self.require_initialized()?;
        if self.normals.is_some() {
            return Err(Error::InvalidResource(
                "normals attachment already exists".to_string(),
            ));
        }

        let mut ctx = self.lock_context()?;
        let texture = ctx.create_texture(&TextureDesc::attachment_rgb32f(self.width, self.height))?;
        let attach_result = (|| -> Result<()> {
            ctx.bind_framebuffer(Some(framebuffer))?;
            ctx.attach_texture(framebuffer, NORMALS_SLOT, texture)?;
            if !ctx.framebuffer_complete(framebuffer)? {
                fb_warn!(LOG_SOURCE, "framebuffer incomplete after normals attachment");
            }
            ctx.bind_framebuffer(None)
        })();
        if let Err(err) = attach_result {
            release_partial(&mut *ctx, &[texture], None);
            return Err(err);
        }
        drop(ctx);

        self.normals = Some(texture);
        Ok(())
    }

    // ===== READBACK =====

    /// Read the color attachment into a 3-channel 8-bit image
    ///
    /// Copies the 16-bit texels into a reusable instance-owned scratch,
    /// converts them to 8-bit (saturating), and channel-mixes the result
    /// into channel 0 of `image`. The image is converted to 3 channels
    /// because it is afterwards used in a shader lookup that requires a
    /// 3-channel input; the remaining channels carry whatever the mixing
    /// copy leaves in place.
    ///
    /// `image` is lazily (re)allocated to `height x width` Rgb8.
    pub fn fetch_color_attachment(&mut self, image: &mut ImageBuffer) -> Result<()> {
        self.require_initialized()?;
        let color = self
            .color
            .ok_or_else(|| Error::MissingAttachment("color".to_string()))?;
        let (width, height) = (self.width, self.height);

        let mut gray16 = self
            .scratch_gray16
            .take()
            .unwrap_or_else(|| ImageBuffer::new(width, height, PixelFormat::Gray16));
        gray16.ensure_shape(width, height, PixelFormat::Gray16);
        image.ensure_shape(width, height, PixelFormat::Rgb8);

        let result = self
            .lock_context()
            .and_then(|ctx| ctx.read_texture(color, TextureFormat::R16_UINT, gray16.as_bytes_mut()))
            .and_then(|()| {
                let mut gray8 = ImageBuffer::new(width, height, PixelFormat::Gray8);
                gray16.convert_to_gray8(&mut gray8)?;
                gray8.mix_channels(image, &[(0, 0)])
            });

        self.scratch_gray16 = Some(gray16);
        result
    }

    /// Read the depth attachment into a 16-bit single-channel image
    ///
    /// No conversion is applied. `image` is lazily (re)allocated to
    /// `height x width` Gray16.
    ///
    /// # Errors
    ///
    /// `MissingAttachment` when init() ran with `render_depth = false`.
    pub fn fetch_depth_attachment(&self, image: &mut ImageBuffer) -> Result<()> {
        self.require_initialized()?;
        let depth = self.depth.ok_or_else(|| {
            Error::MissingAttachment(
                "depth attachment not allocated (render_depth was false)".to_string(),
            )
        })?;

        image.ensure_shape(self.width, self.height, PixelFormat::Gray16);
        let ctx = self.lock_context()?;
        ctx.read_texture(depth, TextureFormat::R16_UINT, image.as_bytes_mut())
    }

    /// Read the normals attachment into a 3-channel float image
    ///
    /// No conversion is applied. `image` is lazily (re)allocated to
    /// `height x width` RgbF32.
    ///
    /// # Errors
    ///
    /// `MissingAttachment` unless create_normals_attachment() ran.
    pub fn fetch_normals_attachment(&self, image: &mut ImageBuffer) -> Result<()> {
        self.require_initialized()?;
        let normals = self.normals.ok_or_else(|| {
            Error::MissingAttachment(
                "normals attachment not created; call create_normals_attachment() first"
                    .to_string(),
            )
        })?;

        image.ensure_shape(self.width, self.height, PixelFormat::RgbF32);
        let ctx = self.lock_context()?;
        ctx.read_texture(normals, TextureFormat::RGB32_FLOAT, image.as_bytes_mut())
    }

    // ===== DISPLAY HELPERS =====

    /// Fetch the color attachment, flip it upright, and present it in
    /// the "color_channel" window
    pub fn display_color_attachment(&mut self, presenter: &mut dyn ImagePresenter) -> Result<()> {
        let mut image = self
            .display_color
            .take()
            .unwrap_or_else(|| ImageBuffer::new(self.width, self.height, PixelFormat::Rgb8));
        let mut result = self.fetch_color_attachment(&mut image);
        if result.is_ok() {
            image.flip_vertical();
            result = presenter.present(COLOR_WINDOW, &image);
        }
        self.display_color = Some(image);
        result
    }

    /// Fetch the depth attachment, flip it upright, and present it in
    /// the "depth_channel" window
    pub fn display_depth_attachment(&mut self, presenter: &mut dyn ImagePresenter) -> Result<()> {
        let mut image = self
            .display_depth
            .take()
            .unwrap_or_else(|| ImageBuffer::new(self.width, self.height, PixelFormat::Gray16));
        let mut result = self.fetch_depth_attachment(&mut image);
        if result.is_ok() {
            image.flip_vertical();
            result = presenter.present(DEPTH_WINDOW, &image);
        }
        self.display_depth = Some(image);
        result
    }

    /// Fetch the normals attachment, flip it upright, and present it in
    /// the "normals_channel" window
    pub fn display_normals_attachment(&mut self, presenter: &mut dyn ImagePresenter) -> Result<()> {
        let mut image = self
            .display_normals
            .take()
            .unwrap_or_else(|| ImageBuffer::new(self.width, self.height, PixelFormat::RgbF32));
        let mut result = self.fetch_normals_attachment(&mut image);
        if result.is_ok() {
            image.flip_vertical();
            result = presenter.present(NORMALS_WINDOW, &image);
        }
        self.display_normals = Some(image);
        result
    }

    // ===== INTERNAL =====

    fn require_initialized(&self) -> Result<FramebufferHandle> {
        if !self.initialized {
            return Err(Error::NotInitialized);
        }
        self.framebuffer
            .ok_or_else(|| Error::InvalidResource("framebuffer handle missing".to_string()))
    }

    fn lock_context(&self) -> Result<MutexGuard<'_, dyn GraphicsContext + 'static>> {
        self.context
            .lock()
            .map_err(|_| Error::BackendError("graphics context lock poisoned".to_string()))
    }
}

impl Drop for OffscreenFramebuffer {
    fn drop(&mut self) {
        // Exactly one cleanup; nothing to do after an explicit cleanup()
        if self.initialized {
            self.cleanup().ok();
        }
    }
}

/// Best-effort release of partially created resources on an init error
/// path
fn release_partial(
    ctx: &mut dyn GraphicsContext,
    textures: &[TextureHandle],
    framebuffer: Option<FramebufferHandle>,
) {
    for &texture in textures {
        ctx.delete_texture(texture).ok();
    }
    if let Some(framebuffer) = framebuffer {
        ctx.bind_framebuffer(None).ok();
        ctx.delete_framebuffer(framebuffer).ok();
    }
}

#[cfg(test)]
#[path = "framebuffer_tests.rs"]
mod tests;
