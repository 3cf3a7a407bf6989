//! Shared helpers for the bundler: filesystem primitives and bounded polling.

pub mod fs;
pub mod retry;
