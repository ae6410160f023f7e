//! Printer selection (component B) and wire transport (component C).

pub mod registry;
pub mod transport;

pub use registry::{PrinterRegistry, RoutingRuleSet};
pub use transport::{WireTransport, TransportConfig};
