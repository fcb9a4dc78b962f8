// Library crate for the wordle-royale bot backend
// This file exposes the public API for integration tests

pub mod channel;
pub mod entry;
pub mod shared;
pub mod stats;
pub mod user;

// Re-export commonly used types for easier access in tests
pub use channel::{ChannelProvisioner, ChannelScope, ChatClient, InMemoryChatClient, MembershipService};
pub use entry::{EntryService, InMemoryEntryRepository, RegisterEntryOutcome};
pub use shared::{AppError, AppState, BotConfig, BotReply};
pub use stats::StatsService;
pub use user::{InMemoryUserRepository, RegisterUserOutcome, UserDirectory};
