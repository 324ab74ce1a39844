//! Error types for the offscreen framebuffer crates
//!
//! This module defines the error types used throughout the crate,
//! covering lifecycle misuse, missing attachments, and backend failures.

use std::fmt;

/// Result type for offscreen framebuffer operations
pub type Result<T> = std::result::Result<T, Error>;

/// Offscreen framebuffer errors
#[derive(Debug, Clone)]
pub enum Error {
    /// Backend-specific error (OpenGL, Vulkan, etc.)
    BackendError(String),

    /// init() called on a framebuffer that is already initialized
    AlreadyInitialized,

    /// Operation requires a prior successful init()
    NotInitialized,

    /// Readback or display of an attachment that was never created
    MissingAttachment(String),

    /// Invalid resource (texture handle, framebuffer handle, image shape)
    InvalidResource(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::AlreadyInitialized => write!(f, "Framebuffer already initialized"),
            Error::NotInitialized => write!(f, "Framebuffer not initialized"),
            Error::MissingAttachment(msg) => write!(f, "Missing attachment: {}", msg),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
