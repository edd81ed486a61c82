//! # Domain Traits
//!
//! Abstract interfaces for the collaborators every plugin talks to (Chat, Directory, Brain).
//! Allows for pluggable implementations in the Infrastructure layer.

use crate::domain::error::BrainError;
use crate::domain::types::{Member, RoomInfo};
use async_trait::async_trait;
use serde_json::Value;

/// Abstract interface for a Chat Provider (e.g., Matrix, Slack, Console)
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Send a message to a room, returning the new event id
    async fn send_to_room(&self, room_id: &str, content: &str) -> Result<String, String>;

    /// Send a message to a user's direct-message room
    async fn send_direct(&self, user_id: &str, content: &str) -> Result<String, String>;

    /// Attach a reaction to an existing message
    async fn add_reaction(&self, room_id: &str, message_id: &str, key: &str)
    -> Result<(), String>;
}

/// Membership and identity lookups.
#[async_trait]
pub trait Directory: Send + Sync {
    /// Members of a room, or `None` when the room has no enumerable membership (a DM).
    async fn members(&self, room_id: &str) -> Result<Option<Vec<Member>>, String>;

    async fn is_bot(&self, user_id: &str) -> bool;

    async fn room_info(&self, room_id: &str) -> Result<RoomInfo, String>;
}

/// Raw key-value persistence behind the brain.
#[async_trait]
pub trait BrainStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Value>, BrainError>;

    async fn set(&self, key: &str, value: Value) -> Result<(), BrainError>;
}
