//! piimask core: service configuration and the shared error type.

pub mod config;
pub mod error;

pub use config::{LlmSettings, ServiceConfig, UnresolvedPolicy};
pub use error::{Error, Result};
