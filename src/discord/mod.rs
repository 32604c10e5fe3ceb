//! Discord bot integration.
//!
//! Forwards guild messages to the bridge and delivers relayed payloads
//! through serenity's HTTP client.

pub mod client;
pub mod convert;

pub use client::DiscordBot;
