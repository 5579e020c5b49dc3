//! Block sources feeding the wire decoder.

/// Synchronous block sources over files, stdin, and arbitrary readers.
pub mod blocks;
