//! Framewire incrementally decodes a stream of rendered image frames as the
//! data arrives, from a file, standard input, or a live renderer
//! subprocess, without waiting for the stream to complete.
//!
//! The pipeline: a block source feeds the [`wire::scanner::PayloadScanner`],
//! payloads decode into frames ([`wire::frame`]), frames materialize into
//! [`RgbImage`] values, and a background task pushes those through a
//! [`Channel`] to a polling consumer. The [`Engine`] hosts all streaming
//! work on one dedicated thread; [`RenderJob`] bridges a renderer
//! subprocess, draining its payload and diagnostic streams concurrently.
//!
//! The format supports exactly one pixel layout (24-bit RGB) and one framing
//! convention, consumed forward-only: it is not a general-purpose container
//! and offers no random access.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

/// Background execution engine and handoff channels.
pub mod engine;
/// Subprocess bridge to the external renderer.
pub mod process;
/// Block sources feeding the wire decoder.
pub mod source;
/// Wire format scanning, decoding and encoding.
pub mod wire;

pub use crate::engine::channel::{Channel, Collector, channel};
pub use crate::engine::worker::Engine;
pub use crate::foundation::config::{Config, DEFAULT_BLOCK_SIZE};
pub use crate::foundation::error::{FramewireError, FramewireResult};
pub use crate::process::renderer::RenderJob;
pub use crate::source::blocks::{Blocks, blocks_from_path, blocks_from_stdin};
pub use crate::wire::frame::{Frame, FrameRgb, decode_payload, encode_frame, encode_sentinel};
pub use crate::wire::iter::{Frames, Images};
pub use crate::wire::scanner::PayloadScanner;

pub use image::RgbImage;
