/// Mock GraphicsContext for unit tests (no GPU required)
///
/// This mock context allows testing OffscreenFramebuffer and readback
/// paths without a real graphics driver. Textures store actual texel
/// bytes so readback round-trips can be asserted.

use std::collections::HashMap;

use crate::context::{
    FramebufferHandle, GraphicsContext, TextureDesc, TextureFormat, TextureHandle,
};
use crate::error::{Error, Result};

// ============================================================================
// Mock Texture
// ============================================================================

#[derive(Debug, Clone)]
pub struct MockTexture {
    pub desc: TextureDesc,
    pub data: Vec<u8>,
}

impl MockTexture {
    fn new(desc: TextureDesc) -> Self {
        let data = vec![0u8; desc.byte_len()];
        Self { desc, data }
    }
}

// ============================================================================
// Mock Framebuffer
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct MockFramebuffer {
    /// Slot -> attached texture
    pub attachments: HashMap<u32, TextureHandle>,
}

// ============================================================================
// Mock GraphicsContext
// ============================================================================

/// Mock context that tracks created resources and stores texel data
#[derive(Debug)]
pub struct MockGraphicsContext {
    textures: HashMap<TextureHandle, MockTexture>,
    framebuffers: HashMap<FramebufferHandle, MockFramebuffer>,
    bound: Option<FramebufferHandle>,
    draw_slots: Vec<u32>,
    next_handle: u64,
    /// Completeness result reported for every framebuffer
    complete: bool,
    /// Every texture handle passed to a successful delete_texture
    pub deleted_textures: Vec<TextureHandle>,
    /// Every framebuffer handle passed to a successful delete_framebuffer
    pub deleted_framebuffers: Vec<FramebufferHandle>,
    /// Every bind_framebuffer call, in order
    pub bind_history: Vec<Option<FramebufferHandle>>,
}

impl MockGraphicsContext {
    /// Create a new mock context reporting complete framebuffers
    pub fn new() -> Self {
        Self {
            textures: HashMap::new(),
            framebuffers: HashMap::new(),
            bound: None,
            draw_slots: Vec::new(),
            next_handle: 0,
            complete: true,
            deleted_textures: Vec::new(),
            deleted_framebuffers: Vec::new(),
            bind_history: Vec::new(),
        }
    }

    /// Control the completeness result reported by framebuffer_complete()
    pub fn set_complete(&mut self, complete: bool) {
        self.complete = complete;
    }

    /// Seed a texture with texel bytes (simulates rendering into it)
    pub fn write_texture(&mut self, texture: TextureHandle, data: &[u8]) -> Result<()> {
        let tex = self.textures.get_mut(&texture).ok_or_else(|| {
            Error::InvalidResource(format!("write_texture: unknown texture {:?}", texture))
        })?;
        if data.len() != tex.data.len() {
            return Err(Error::InvalidResource(format!(
                "write_texture: {} bytes for a {}-byte texture",
                data.len(),
                tex.data.len()
            )));
        }
        tex.data.copy_from_slice(data);
        Ok(())
    }

    /// Number of live textures
    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    /// Number of live framebuffers
    pub fn framebuffer_count(&self) -> usize {
        self.framebuffers.len()
    }

    /// Live texture handles in creation order
    pub fn texture_handles(&self) -> Vec<TextureHandle> {
        let mut handles: Vec<TextureHandle> = self.textures.keys().copied().collect();
        handles.sort_by_key(|h| h.0);
        handles
    }

    /// Descriptor of a live texture
    pub fn texture_desc(&self, texture: TextureHandle) -> Option<&TextureDesc> {
        self.textures.get(&texture).map(|t| &t.desc)
    }

    /// Texture attached to a framebuffer slot
    pub fn attachment(&self, framebuffer: FramebufferHandle, slot: u32) -> Option<TextureHandle> {
        self.framebuffers
            .get(&framebuffer)
            .and_then(|fb| fb.attachments.get(&slot))
            .copied()
    }

    /// Currently bound framebuffer (None = default target)
    pub fn bound(&self) -> Option<FramebufferHandle> {
        self.bound
    }

    /// Currently configured draw-buffer slots
    pub fn draw_slots(&self) -> &[u32] {
        &self.draw_slots
    }

    fn next_id(&mut self) -> u64 {
        self.next_handle += 1;
        self.next_handle
    }
}

impl Default for MockGraphicsContext {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphicsContext for MockGraphicsContext {
    fn create_texture(&mut self, desc: &TextureDesc) -> Result<TextureHandle> {
        let handle = TextureHandle(self.next_id());
        self.textures.insert(handle, MockTexture::new(desc.clone()));
        Ok(handle)
    }

    fn delete_texture(&mut self, texture: TextureHandle) -> Result<()> {
        if self.textures.remove(&texture).is_none() {
            return Err(Error::InvalidResource(format!(
                "delete_texture: unknown texture {:?}",
                texture
            )));
        }
        self.deleted_textures.push(texture);
        Ok(())
    }

    fn create_framebuffer(&mut self) -> Result<FramebufferHandle> {
        let handle = FramebufferHandle(self.next_id());
        self.framebuffers.insert(handle, MockFramebuffer::default());
        Ok(handle)
    }

    fn delete_framebuffer(&mut self, framebuffer: FramebufferHandle) -> Result<()> {
        if self.framebuffers.remove(&framebuffer).is_none() {
            return Err(Error::InvalidResource(format!(
                "delete_framebuffer: unknown framebuffer {:?}",
                framebuffer
            )));
        }
        self.deleted_framebuffers.push(framebuffer);
        if self.bound == Some(framebuffer) {
            self.bound = None;
        }
        Ok(())
    }

    fn attach_texture(
        &mut self,
        framebuffer: FramebufferHandle,
        slot: u32,
        texture: TextureHandle,
    ) -> Result<()> {
        if !self.textures.contains_key(&texture) {
            return Err(Error::InvalidResource(format!(
                "attach_texture: unknown texture {:?}",
                texture
            )));
        }
        let fb = self.framebuffers.get_mut(&framebuffer).ok_or_else(|| {
            Error::InvalidResource(format!(
                "attach_texture: unknown framebuffer {:?}",
                framebuffer
            ))
        })?;
        fb.attachments.insert(slot, texture);
        self.bound = Some(framebuffer);
        Ok(())
    }

    fn framebuffer_complete(&self, framebuffer: FramebufferHandle) -> Result<bool> {
        if !self.framebuffers.contains_key(&framebuffer) {
            return Err(Error::InvalidResource(format!(
                "framebuffer_complete: unknown framebuffer {:?}",
                framebuffer
            )));
        }
        Ok(self.complete)
    }

    fn bind_framebuffer(&mut self, framebuffer: Option<FramebufferHandle>) -> Result<()> {
        if let Some(fb) = framebuffer {
            if !self.framebuffers.contains_key(&fb) {
                return Err(Error::InvalidResource(format!(
                    "bind_framebuffer: unknown framebuffer {:?}",
                    fb
                )));
            }
        }
        self.bound = framebuffer;
        self.bind_history.push(framebuffer);
        Ok(())
    }

    fn set_draw_slots(&mut self, slots: &[u32]) -> Result<()> {
        self.draw_slots = slots.to_vec();
        Ok(())
    }

    fn read_texture(
        &self,
        texture: TextureHandle,
        format: TextureFormat,
        out: &mut [u8],
    ) -> Result<()> {
        let tex = self.textures.get(&texture).ok_or_else(|| {
            Error::InvalidResource(format!("read_texture: unknown texture {:?}", texture))
        })?;
        if format != tex.desc.format {
            return Err(Error::InvalidResource(format!(
                "read_texture: format {:?} requested from a {:?} texture",
                format, tex.desc.format
            )));
        }
        if out.len() != tex.data.len() {
            return Err(Error::InvalidResource(format!(
                "read_texture: {}-byte buffer for a {}-byte texture",
                out.len(),
                tex.data.len()
            )));
        }
        out.copy_from_slice(&tex.data);
        Ok(())
    }
}

#[cfg(test)]
#[path = "mock_context_tests.rs"]
mod tests;
