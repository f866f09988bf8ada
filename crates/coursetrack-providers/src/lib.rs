//! coursetrack-providers — store and notifier implementations.
//!
//! Implements the `Store` and `Notifier` traits: the in-memory reference
//! store, the webhook and console notifier transports, and a recording
//! mock for scheduler tests.

pub mod config;
pub mod console;
pub mod error;
pub mod memory;
pub mod mock;
pub mod webhook;

pub use config::{create_notifier, load_config, CoursetrackConfig, NotifierConfig};
pub use error::NotifierError;
pub use memory::MemoryStore;
