pub mod client;
pub mod membership;
pub mod models;
pub mod provisioner;
pub mod reset_task;

pub use client::{ChatClient, InMemoryChatClient};
pub use membership::MembershipService;
pub use models::{ChannelModel, ChannelScope};
pub use provisioner::ChannelProvisioner;
