//! Relay core between Discord and Fluxer.
//!
//! ## Module Structure
//!
//! - `router`: Channel routing table built from the mappings
//! - `filter`: Loop guard deciding which messages may be relayed
//! - `dispatcher`: Single-attempt hand-off to a platform sink
//! - `orchestrator`: Main bridge orchestrator (`Bridge` struct)

pub mod dispatcher;
pub mod filter;
pub mod orchestrator;
pub mod router;

pub use orchestrator::Bridge;
pub use router::RoutingTable;
