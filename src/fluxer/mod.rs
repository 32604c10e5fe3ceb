//! Fluxer integration.
//!
//! Fluxer exposes a Discord-compatible API, so the adapter is a thin REST
//! client plus a gateway session speaking the same opcodes.

pub mod gateway;
pub mod rest;
pub mod types;

pub use gateway::FluxerGateway;
pub use rest::FluxerRest;
