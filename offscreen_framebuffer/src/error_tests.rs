//! Unit tests for error.rs
//!
//! Tests all Error variants and their implementations (Display, Debug, Clone, std::error::Error).

use crate::error::{Error, Result};

// ============================================================================
// ERROR DISPLAY TESTS
// ============================================================================

#[test]
fn test_backend_error_display() {
    let err = Error::BackendError("GL context lost".to_string());
    let display = format!("{}", err);
    assert!(display.contains("Backend error"));
    assert!(display.contains("GL context lost"));
}

#[test]
fn test_already_initialized_display() {
    let err = Error::AlreadyInitialized;
    let display = format!("{}", err);
    assert_eq!(display, "Framebuffer already initialized");
}

#[test]
fn test_not_initialized_display() {
    let err = Error::NotInitialized;
    let display = format!("{}", err);
    assert_eq!(display, "Framebuffer not initialized");
}

#[test]
fn test_missing_attachment_display() {
    let err = Error::MissingAttachment("normals".to_string());
    let display = format!("{}", err);
    assert!(display.contains("Missing attachment"));
    assert!(display.contains("normals"));
}

#[test]
fn test_invalid_resource_display() {
    let err = Error::InvalidResource("unknown texture".to_string());
    let display = format!("{}", err);
    assert!(display.contains("Invalid resource"));
    assert!(display.contains("unknown texture"));
}

// ============================================================================
// ERROR TRAIT IMPLEMENTATIONS
// ============================================================================

#[test]
fn test_error_is_std_error() {
    let err = Error::NotInitialized;
    // Verify Error implements std::error::Error trait
    let _: &dyn std::error::Error = &err;
}

#[test]
fn test_error_debug() {
    let err1 = Error::BackendError("test".to_string());
    let debug1 = format!("{:?}", err1);
    assert!(debug1.contains("BackendError"));

    let err2 = Error::AlreadyInitialized;
    let debug2 = format!("{:?}", err2);
    assert!(debug2.contains("AlreadyInitialized"));

    let err3 = Error::NotInitialized;
    let debug3 = format!("{:?}", err3);
    assert!(debug3.contains("NotInitialized"));

    let err4 = Error::MissingAttachment("depth".to_string());
    let debug4 = format!("{:?}", err4);
    assert!(debug4.contains("MissingAttachment"));

    let err5 = Error::InvalidResource("resource".to_string());
    let debug5 = format!("{:?}", err5);
    assert!(debug5.contains("InvalidResource"));
}

#[test]
fn test_error_clone() {
    let err1 = Error::BackendError("test".to_string());
    let err2 = err1.clone();
    assert_eq!(format!("{}", err1), format!("{}", err2));

    let err3 = Error::AlreadyInitialized;
    let err4 = err3.clone();
    assert_eq!(format!("{}", err3), format!("{}", err4));

    let err5 = Error::MissingAttachment("normals".to_string());
    let err6 = err5.clone();
    assert_eq!(format!("{}", err5), format!("{}", err6));
}

// ============================================================================
// RESULT TYPE TESTS
// ============================================================================

#[test]
fn test_result_type_ok() {
    fn returns_ok() -> Result<i32> {
        Ok(42)
    }

    let result = returns_ok();
    assert!(result.is_ok());
    assert_eq!(result.unwrap(), 42);
}

#[test]
fn test_result_type_err() {
    fn returns_error() -> Result<i32> {
        Err(Error::NotInitialized)
    }

    let result = returns_error();
    assert!(result.is_err());

    if let Err(e) = result {
        assert_eq!(format!("{}", e), "Framebuffer not initialized");
    }
}

// ============================================================================
// ERROR PROPAGATION TESTS
// ============================================================================

#[test]
fn test_error_propagation_with_question_mark() {
    fn inner() -> Result<i32> {
        Err(Error::AlreadyInitialized)
    }

    fn outer() -> Result<i32> {
        inner()?;
        Ok(42)
    }

    let result = outer();
    assert!(result.is_err());
}

#[test]
fn test_error_message_content() {
    // Error messages carry enough context to locate the failure
    let err1 = Error::BackendError("glCheckFramebufferStatus returned 0x8CD6".to_string());
    assert!(format!("{}", err1).contains("0x8CD6"));

    let err2 = Error::InvalidResource("delete_texture: unknown texture TextureHandle(7)".to_string());
    assert!(format!("{}", err2).contains("TextureHandle(7)"));
}
