//! Common utilities and types shared across the application.

pub mod error;
pub mod messages;
pub mod sink;
pub mod types;

pub use messages::InboundMessage;
