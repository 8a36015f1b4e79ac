// Re-export types from the protocol crate so they are accessible via slotforge_core::*
pub use slotforge_protocol::config;

// Internal Modules
pub mod catalog;
pub mod constraints;
pub mod error;
pub mod job;
pub mod optimizer;
pub mod output;
pub mod schedule;
