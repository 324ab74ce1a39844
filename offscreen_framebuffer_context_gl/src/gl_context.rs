/// GlGraphicsContext - OpenGL implementation of GraphicsContext
///
/// Maps the portable texture/framebuffer handles onto GL object names
/// through glow. A GL context must be current on the calling thread for
/// every operation; nothing here can verify that.

use glow::HasContext;
use rustc_hash::FxHashMap;

use offscreen_framebuffer::fb_trace;
use offscreen_framebuffer::offscreen::context::{
    FramebufferHandle, GraphicsContext, TextureDesc, TextureFilter, TextureFormat, TextureHandle,
    TextureWrap,
};
use offscreen_framebuffer::offscreen::{Error, Result};

const LOG_SOURCE: &str = "offscreen::GlGraphicsContext";

// ============================================================================
// Format mapping
// ============================================================================

/// GL (internal format, pixel format, pixel type) triple for a texture
/// format
fn gl_format(format: TextureFormat) -> (i32, u32, u32) {
    match format {
        TextureFormat::R16_UINT => (
            glow::R16UI as i32,
            glow::RED_INTEGER,
            glow::UNSIGNED_SHORT,
        ),
        TextureFormat::RGB32_FLOAT => (glow::RGB32F as i32, glow::RGB, glow::FLOAT),
    }
}

fn gl_filter(filter: TextureFilter) -> i32 {
    match filter {
        TextureFilter::Nearest => glow::NEAREST as i32,
        TextureFilter::Linear => glow::LINEAR as i32,
    }
}

fn gl_wrap(wrap: TextureWrap) -> i32 {
    match wrap {
        TextureWrap::ClampToEdge => glow::CLAMP_TO_EDGE as i32,
        TextureWrap::Repeat => glow::REPEAT as i32,
    }
}

/// GL attachment point for a draw-buffer slot
fn gl_attachment(slot: u32) -> u32 {
    glow::COLOR_ATTACHMENT0 + slot
}

// ============================================================================
// GL texture record
// ============================================================================

struct GlTexture {
    raw: glow::Texture,
    desc: TextureDesc,
}

// ============================================================================
// GlGraphicsContext
// ============================================================================

/// OpenGL graphics context
///
/// Owns the glow context and every GL object created through it;
/// objects still alive when the context is dropped are deleted.
pub struct GlGraphicsContext {
    gl: glow::Context,
    textures: FxHashMap<TextureHandle, GlTexture>,
    framebuffers: FxHashMap<FramebufferHandle, glow::Framebuffer>,
    next_handle: u64,
}

impl GlGraphicsContext {
    /// Wrap a loaded glow context
    pub fn new(gl: glow::Context) -> Self {
        Self {
            gl,
            textures: FxHashMap::default(),
            framebuffers: FxHashMap::default(),
            next_handle: 0,
        }
    }

    /// Borrow the underlying glow context for rendering calls outside
    /// the attachment lifecycle
    pub fn gl(&self) -> &glow::Context {
        &self.gl
    }

    fn next_id(&mut self) -> u64 {
        self.next_handle += 1;
        self.next_handle
    }

    fn texture(&self, handle: TextureHandle) -> Result<&GlTexture> {
        self.textures.get(&handle).ok_or_else(|| {
            Error::InvalidResource(format!("unknown texture {:?}", handle))
        })
    }

    fn framebuffer(&self, handle: FramebufferHandle) -> Result<glow::Framebuffer> {
        self.framebuffers.get(&handle).copied().ok_or_else(|| {
            Error::InvalidResource(format!("unknown framebuffer {:?}", handle))
        })
    }
}

impl GraphicsContext for GlGraphicsContext {
    fn create_texture(&mut self, desc: &TextureDesc) -> Result<TextureHandle> {
        let (internal, format, ty) = gl_format(desc.format);

        // SAFETY: glow wraps raw GL calls as unsafe. We create and
        // configure a fresh texture object with no backing data.
        let raw = unsafe {
            let raw = self.gl.create_texture().map_err(Error::BackendError)?;
            self.gl.bind_texture(glow::TEXTURE_2D, Some(raw));
            self.gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_MIN_FILTER,
                gl_filter(desc.filter),
            );
            self.gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_MAG_FILTER,
                gl_filter(desc.filter),
            );
            self.gl
                .tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_S, gl_wrap(desc.wrap));
            self.gl
                .tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_T, gl_wrap(desc.wrap));
            self.gl.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                internal,
                desc.width as i32,
                desc.height as i32,
                0,
                format,
                ty,
                None,
            );
            self.gl.bind_texture(glow::TEXTURE_2D, None);
            raw
        };

        let handle = TextureHandle(self.next_id());
        self.textures.insert(
            handle,
            GlTexture {
                raw,
                desc: desc.clone(),
            },
        );
        fb_trace!(
            LOG_SOURCE,
            "created {:?} {}x{} {:?}",
            handle,
            desc.width,
            desc.height,
            desc.format
        );
        Ok(handle)
    }

    fn delete_texture(&mut self, texture: TextureHandle) -> Result<()> {
        let record = self.textures.remove(&texture).ok_or_else(|| {
            Error::InvalidResource(format!("delete_texture: unknown texture {:?}", texture))
        })?;
        unsafe {
            self.gl.delete_texture(record.raw);
        }
        fb_trace!(LOG_SOURCE, "deleted {:?}", texture);
        Ok(())
    }

    fn create_framebuffer(&mut self) -> Result<FramebufferHandle> {
        let raw = unsafe { self.gl.create_framebuffer().map_err(Error::BackendError)? };
        let handle = FramebufferHandle(self.next_id());
        self.framebuffers.insert(handle, raw);
        fb_trace!(LOG_SOURCE, "created {:?}", handle);
        Ok(handle)
    }

    fn delete_framebuffer(&mut self, framebuffer: FramebufferHandle) -> Result<()> {
        let raw = self.framebuffers.remove(&framebuffer).ok_or_else(|| {
            Error::InvalidResource(format!(
                "delete_framebuffer: unknown framebuffer {:?}",
                framebuffer
            ))
        })?;
        unsafe {
            self.gl.delete_framebuffer(raw);
        }
        fb_trace!(LOG_SOURCE, "deleted {:?}", framebuffer);
        Ok(())
    }

    fn attach_texture(
        &mut self,
        framebuffer: FramebufferHandle,
        slot: u32,
        texture: TextureHandle,
    ) -> Result<()> {
        let raw_fb = self.framebuffer(framebuffer)?;
        let raw_tex = self.texture(texture)?.raw;
        unsafe {
            self.gl.bind_framebuffer(glow::FRAMEBUFFER, Some(raw_fb));
            self.gl.framebuffer_texture_2d(
                glow::FRAMEBUFFER,
                gl_attachment(slot),
                glow::TEXTURE_2D,
                Some(raw_tex),
                0,
            );
        }
        Ok(())
    }

    fn framebuffer_complete(&self, framebuffer: FramebufferHandle) -> Result<bool> {
        let raw = self.framebuffer(framebuffer)?;
        let status = unsafe {
            self.gl.bind_framebuffer(glow::FRAMEBUFFER, Some(raw));
            self.gl.check_framebuffer_status(glow::FRAMEBUFFER)
        };
        Ok(status == glow::FRAMEBUFFER_COMPLETE)
    }

    fn bind_framebuffer(&mut self, framebuffer: Option<FramebufferHandle>) -> Result<()> {
        let raw = match framebuffer {
            Some(handle) => Some(self.framebuffer(handle)?),
            None => None,
        };
        unsafe {
            self.gl.bind_framebuffer(glow::FRAMEBUFFER, raw);
        }
        Ok(())
    }

    fn set_draw_slots(&mut self, slots: &[u32]) -> Result<()> {
        let buffers: Vec<u32> = slots.iter().map(|&slot| gl_attachment(slot)).collect();
        unsafe {
            self.gl.draw_buffers(&buffers);
        }
        Ok(())
    }

    fn read_texture(
        &self,
        texture: TextureHandle,
        format: TextureFormat,
        out: &mut [u8],
    ) -> Result<()> {
        let record = self.texture(texture)?;
        if format != record.desc.format {
            return Err(Error::InvalidResource(format!(
                "read_texture: format {:?} requested from a {:?} texture",
                format, record.desc.format
            )));
        }
        if out.len() != record.desc.byte_len() {
            return Err(Error::InvalidResource(format!(
                "read_texture: {}-byte buffer for a {}-byte texture",
                out.len(),
                record.desc.byte_len()
            )));
        }

        let (_, gl_pixel_format, gl_pixel_type) = gl_format(format);
        // SAFETY: the handle was validated above and `out` is exactly
        // the texture's byte size.
        unsafe {
            self.gl.bind_texture(glow::TEXTURE_2D, Some(record.raw));
            // Rows are tightly packed in ImageBuffer
            self.gl.pixel_store_i32(glow::PACK_ALIGNMENT, 1);
            self.gl.get_tex_image(
                glow::TEXTURE_2D,
                0,
                gl_pixel_format,
                gl_pixel_type,
                glow::PixelPackData::Slice(out),
            );
            self.gl.bind_texture(glow::TEXTURE_2D, None);
        }
        Ok(())
    }
}

impl Drop for GlGraphicsContext {
    fn drop(&mut self) {
        unsafe {
            for record in self.textures.values() {
                self.gl.delete_texture(record.raw);
            }
            for &raw in self.framebuffers.values() {
                self.gl.delete_framebuffer(raw);
            }
        }
    }
}

#[cfg(test)]
#[path = "gl_context_tests.rs"]
mod tests;
