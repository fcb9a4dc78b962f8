use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// A messaging-platform channel, referenced by the bot but never owned.
/// Identity is mutable over the bot's lifetime (archive and recreate can
/// change the id), so callers resolve by name instead of caching ids.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelModel {
    pub id: String,
    pub name: String,
    pub is_archived: bool,
    pub is_private: bool,
}

/// Visibility scope searched when resolving a channel by name.
/// Deployment configuration, not a hard-coded policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum ChannelScope {
    /// Private channels only
    Private,
    /// Public and private channels
    All,
}

impl ChannelScope {
    pub fn includes(&self, channel: &ChannelModel) -> bool {
        match self {
            ChannelScope::Private => channel.is_private,
            ChannelScope::All => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn channel(private: bool) -> ChannelModel {
        ChannelModel {
            id: "C1".to_string(),
            name: "wordle-answers".to_string(),
            is_archived: false,
            is_private: private,
        }
    }

    #[test]
    fn private_scope_excludes_public_channels() {
        assert!(ChannelScope::Private.includes(&channel(true)));
        assert!(!ChannelScope::Private.includes(&channel(false)));
    }

    #[test]
    fn all_scope_includes_everything() {
        assert!(ChannelScope::All.includes(&channel(true)));
        assert!(ChannelScope::All.includes(&channel(false)));
    }

    #[test]
    fn scope_parses_from_config_strings() {
        assert_eq!(ChannelScope::from_str("private").unwrap(), ChannelScope::Private);
        assert_eq!(ChannelScope::from_str("all").unwrap(), ChannelScope::All);
        assert!(ChannelScope::from_str("bogus").is_err());
    }
}
