//! CLI library components for dq.

pub mod logging;
