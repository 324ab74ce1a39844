/*!
# Offscreen Framebuffer

Core traits and types for off-screen render targets with CPU readback.

This crate wraps a graphics API's framebuffer object: it allocates
color/depth/normals attachment textures, binds the framebuffer for
rendering, and reads attachment contents back into host-side image
buffers for display or further processing.

The graphics API itself sits behind the `GraphicsContext` trait so that
backends (OpenGL, Vulkan, ...) plug in at runtime; the companion
`offscreen_framebuffer_context_gl` crate provides the OpenGL
implementation.

## Architecture

- **GraphicsContext**: trait seam over the native texture/framebuffer
  primitives
- **OffscreenFramebuffer**: attachment lifecycle, bind/unbind, readback
- **ImageBuffer**: host-side texel storage with conversion helpers
- **ImagePresenter**: seam for the on-screen preview facility
*/

// Internal modules
mod error;
pub mod context;
pub mod display;
pub mod framebuffer;
pub mod image;
pub mod log;

// Main offscreen namespace module
pub mod offscreen {
    // Error types
    pub use crate::error::{Error, Result};

    // Offscreen framebuffer component
    pub use crate::framebuffer::{Attachments, OffscreenFramebuffer};

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{DefaultLogger, LogEntry, LogSeverity, Logger};
    }

    // Graphics context sub-module (trait seam + descriptors)
    pub mod context {
        pub use crate::context::*;
    }

    // Host-side image sub-module
    pub mod image {
        pub use crate::image::{ImageBuffer, PixelFormat};
    }

    // Presenter sub-module
    pub mod display {
        pub use crate::display::ImagePresenter;
    }
}

// Re-export math library at crate root
pub use glam;
