//! Subprocess bridge to the external renderer.

/// Renderer spawning and concurrent output draining.
pub mod renderer;
