//! Wire format handling.
//!
//! The stream is a sequence of base64 payloads wrapped in `<<<`/`>>>`
//! markers, terminated by a reserved 4-byte sentinel payload. Each data
//! payload decodes to a width/height header (two little-endian u32) followed
//! by tightly packed RGB8 pixels, row-major, top row first.

/// Payload decode/encode and the image materializer.
pub mod frame;
/// Lazy frame/image iterators over block sequences.
pub mod iter;
/// Incremental marker-pair boundary scanner.
pub mod scanner;
