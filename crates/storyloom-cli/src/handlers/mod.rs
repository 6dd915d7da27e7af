//! Command handlers.
//!
//! Handlers take the composed [`CliContext`](crate::CliContext) and never
//! build infrastructure themselves.

pub mod session;
