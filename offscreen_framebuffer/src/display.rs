//! Presenter seam for on-screen attachment preview
//!
//! The display facility (a window per attachment, keyed by name) is an
//! external collaborator. The display helpers on `OffscreenFramebuffer`
//! hand the flipped image to whatever `ImagePresenter` the caller wires
//! in; tests use a recording presenter.

use crate::error::Result;
use crate::image::ImageBuffer;

/// On-screen image display facility keyed by window name
pub trait ImagePresenter {
    /// Present an image in the named window
    fn present(&mut self, window_name: &str, image: &ImageBuffer) -> Result<()>;
}
