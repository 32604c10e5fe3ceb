//! Message routing between Discord and Fluxer.
//!
//! Handles channel mapping and bidirectional lookup based on configuration.

use std::collections::HashMap;

use crate::common::types::RelayDirection;
use crate::config::types::{FormattingProfile, Mapping};

/// Resolved destination for messages from one channel.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    /// Destination channel id.
    pub channel_id: String,
    pub formatting: FormattingProfile,
    /// Let bot-authored crossposts through. Only ever set on routes toward
    /// Fluxer, since crossposts originate on Discord.
    pub allow_crossposts: bool,
}

/// Lookup tables built once from the mapping list.
#[derive(Debug, Default)]
pub struct RoutingTable {
    /// Discord channel id -> Fluxer route.
    to_fluxer: HashMap<String, Route>,
    /// Fluxer channel id -> Discord route.
    to_discord: HashMap<String, Route>,
}

impl RoutingTable {
    /// Build the table from configuration.
    ///
    /// When two mappings share a source channel the later one wins.
    pub fn build(mappings: &[Mapping]) -> Self {
        let mut to_fluxer = HashMap::new();
        let mut to_discord = HashMap::new();

        for mapping in mappings {
            if mapping.direction.allows_to_fluxer() {
                to_fluxer.insert(
                    mapping.discord_id.clone(),
                    Route {
                        channel_id: mapping.fluxer_id.clone(),
                        formatting: mapping.formatting,
                        allow_crossposts: mapping.allow_crossposts,
                    },
                );
            }

            if mapping.direction.allows_to_discord() {
                to_discord.insert(
                    mapping.fluxer_id.clone(),
                    Route {
                        channel_id: mapping.discord_id.clone(),
                        formatting: mapping.formatting,
                        allow_crossposts: false,
                    },
                );
            }
        }

        Self {
            to_fluxer,
            to_discord,
        }
    }

    /// Route for a message posted in `channel_id`, relayed in `direction`.
    pub fn route(&self, direction: RelayDirection, channel_id: &str) -> Option<&Route> {
        match direction {
            RelayDirection::ToFluxer => self.to_fluxer.get(channel_id),
            RelayDirection::ToDiscord => self.to_discord.get(channel_id),
        }
    }

    /// Number of routes in each direction, as `(to_fluxer, to_discord)`.
    pub fn counts(&self) -> (usize, usize) {
        (self.to_fluxer.len(), self.to_discord.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::{Direction, TimestampFormat};

    fn mapping(discord: &str, fluxer: &str, direction: Direction) -> Mapping {
        Mapping {
            discord_id: discord.to_string(),
            fluxer_id: fluxer.to_string(),
            direction,
            label: None,
            allow_crossposts: true,
            formatting: FormattingProfile::default(),
        }
    }

    #[test]
    fn test_discord_to_fluxer_only() {
        let table = RoutingTable::build(&[mapping("A", "X", Direction::DiscordToFluxer)]);

        let route = table.route(RelayDirection::ToFluxer, "A").unwrap();
        assert_eq!(route.channel_id, "X");
        assert!(route.allow_crossposts);

        assert!(table.route(RelayDirection::ToDiscord, "X").is_none());
        assert_eq!(table.counts(), (1, 0));
    }

    #[test]
    fn test_fluxer_to_discord_only() {
        let table = RoutingTable::build(&[mapping("A", "X", Direction::FluxerToDiscord)]);

        assert!(table.route(RelayDirection::ToFluxer, "A").is_none());
        let route = table.route(RelayDirection::ToDiscord, "X").unwrap();
        assert_eq!(route.channel_id, "A");
    }

    #[test]
    fn test_both_directions() {
        let table = RoutingTable::build(&[mapping("A", "X", Direction::Both)]);

        assert_eq!(
            table.route(RelayDirection::ToFluxer, "A").unwrap().channel_id,
            "X"
        );
        let back = table.route(RelayDirection::ToDiscord, "X").unwrap();
        assert_eq!(back.channel_id, "A");
        assert!(!back.allow_crossposts);
    }

    #[test]
    fn test_unknown_channel_has_no_route() {
        let table = RoutingTable::build(&[mapping("A", "X", Direction::Both)]);
        assert!(table.route(RelayDirection::ToFluxer, "B").is_none());
        // channel ids are looked up per side
        assert!(table.route(RelayDirection::ToFluxer, "X").is_none());
        assert!(table.route(RelayDirection::ToDiscord, "A").is_none());
    }

    #[test]
    fn test_last_mapping_wins() {
        let mut later = mapping("A", "Y", Direction::DiscordToFluxer);
        later.formatting.timestamp_format = TimestampFormat::Relative;

        let table = RoutingTable::build(&[mapping("A", "X", Direction::DiscordToFluxer), later]);

        let route = table.route(RelayDirection::ToFluxer, "A").unwrap();
        assert_eq!(route.channel_id, "Y");
        assert_eq!(route.formatting.timestamp_format, TimestampFormat::Relative);
        assert_eq!(table.counts(), (1, 0));
    }

    #[test]
    fn test_fan_in_to_discord() {
        let table = RoutingTable::build(&[
            mapping("A", "X", Direction::Both),
            mapping("B", "Y", Direction::FluxerToDiscord),
        ]);
        assert_eq!(table.counts(), (1, 2));
        assert_eq!(
            table.route(RelayDirection::ToDiscord, "Y").unwrap().channel_id,
            "B"
        );
    }
}
