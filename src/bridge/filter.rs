//! Relay eligibility.
//!
//! Stops bot-authored messages so the two bridge bots can't echo each other
//! forever. Discord crossposts (followed announcement channels) are the one bot
//! case that may pass, and only when the mapping allows it.

use std::fmt;

use crate::bridge::router::Route;
use crate::common::messages::InboundMessage;
use crate::common::types::RelayDirection;

/// Why a message was not relayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// Author is a bot and no crosspost exemption applies.
    BotAuthor,
    /// No content, embeds or attachments.
    Empty,
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DropReason::BotAuthor => f.write_str("bot author"),
            DropReason::Empty => f.write_str("empty message"),
        }
    }
}

/// Check whether `message` may be relayed in `direction` over `route`.
pub fn check(
    direction: RelayDirection,
    message: &InboundMessage,
    route: &Route,
) -> Result<(), DropReason> {
    if message.author.bot {
        let exempt = match direction {
            RelayDirection::ToFluxer => message.is_crosspost && route.allow_crossposts,
            RelayDirection::ToDiscord => false,
        };
        if !exempt {
            return Err(DropReason::BotAuthor);
        }
    }

    if message.is_empty() {
        return Err(DropReason::Empty);
    }

    Ok(())
}
