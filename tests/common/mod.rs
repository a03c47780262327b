//! Integration test common infrastructure.
//!
//! Spawns the compiled exporter binary against a throwaway config.

pub mod server;

#[allow(unused_imports)]
pub use server::TestExporter;
