//! Filesystem utilities for promptmill.
//!
//! The session log is rewritten in full on every invocation, so writes go
//! through a temp file and a rename to never leave a half-written log behind.

pub mod atomic;

pub use atomic::atomic_write_file;
