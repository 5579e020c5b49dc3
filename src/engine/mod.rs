//! Background execution engine and handoff channels.
//!
//! The engine bridges producer-side streaming decode work to a non-blocking,
//! periodically-polling consumer: tasks run on one dedicated worker thread
//! and hand results over through [`channel::Channel`]/[`channel::Collector`]
//! pairs.

/// Producer/consumer handoff channel with an explicit closed lifecycle.
pub mod channel;
pub(crate) mod pump;
/// The worker-thread engine itself.
pub mod worker;
