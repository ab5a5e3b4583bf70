pub mod client;
pub mod error;
pub mod generator;
pub mod sanitize;

pub use client::{ChatClient, ChatConfig, ChatProvider};
pub use error::GenerationError;
pub use generator::{RuleGenerator, build_instruction};
pub use sanitize::sanitize;
