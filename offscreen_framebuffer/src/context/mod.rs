/// Graphics context module - trait seam over the native graphics API

// Module declarations
pub mod graphics_context;

#[cfg(test)]
pub mod mock_context;

// Re-export everything from graphics_context.rs
pub use graphics_context::*;
