/*!
# Offscreen Framebuffer - OpenGL Context Backend

OpenGL implementation of the `GraphicsContext` trait using the glow
bindings.

The backend owns a `glow::Context` and maps the portable texture and
framebuffer handles onto GL object names. Texture formats are limited to
what the attachment model needs: 16-bit unsigned single-channel
(`R16UI`) and 3-channel float (`RGB32F`).

The caller is responsible for making a GL context current on the thread
before invoking any operation; glow carries that requirement over from
raw OpenGL unchanged.

## Example

```no_run
use std::sync::{Arc, Mutex};
use offscreen_framebuffer::offscreen::OffscreenFramebuffer;
use offscreen_framebuffer_context_gl::GlGraphicsContext;

# fn load(_: &str) -> *const std::ffi::c_void { std::ptr::null() }
let gl = unsafe { glow::Context::from_loader_function(|s| load(s)) };
let context = Arc::new(Mutex::new(GlGraphicsContext::new(gl)));
let framebuffer = OffscreenFramebuffer::with_size(context, 640, 480, true)?;
# Ok::<(), offscreen_framebuffer::offscreen::Error>(())
```
*/

mod gl_context;

pub use gl_context::GlGraphicsContext;
