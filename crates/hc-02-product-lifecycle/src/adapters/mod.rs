//! Adapters connecting the engine's outbound ports to the registry and the
//! shared bus.

pub mod publisher;
pub mod registry;

pub use publisher::{BusEventSink, NoOpEventSink};
pub use registry::RegistryDirectory;
