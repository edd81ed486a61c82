//! In-memory doubles for the chat, directory and brain collaborators.

use crate::domain::error::BrainError;
use crate::domain::traits::{BrainStore, ChatProvider, Directory};
use crate::domain::types::{Member, RoomInfo};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use tokio::sync::Mutex;

/// Records everything sent through it.
#[derive(Default)]
pub struct RecordingChat {
    rooms: Mutex<Vec<(String, String)>>,
    directs: Mutex<Vec<(String, String)>>,
    reactions: Mutex<Vec<(String, String, String)>>,
    failing_reactions: Mutex<usize>,
    unreachable_users: Mutex<HashSet<String>>,
}

impl RecordingChat {
    pub async fn room_messages(&self, room_id: &str) -> Vec<String> {
        self.rooms
            .lock()
            .await
            .iter()
            .filter(|(room, _)| room == room_id)
            .map(|(_, text)| text.clone())
            .collect()
    }

    pub async fn direct_messages(&self, user_id: &str) -> Vec<String> {
        self.directs
            .lock()
            .await
            .iter()
            .filter(|(user, _)| user == user_id)
            .map(|(_, text)| text.clone())
            .collect()
    }

    pub async fn reactions(&self) -> Vec<(String, String, String)> {
        self.reactions.lock().await.clone()
    }

    /// Makes the next `count` reaction requests fail.
    pub async fn fail_reactions(&self, count: usize) {
        *self.failing_reactions.lock().await = count;
    }

    /// Makes every direct message to `user_id` fail.
    pub async fn fail_directs_to(&self, user_id: &str) {
        self.unreachable_users
            .lock()
            .await
            .insert(user_id.to_string());
    }
}

#[async_trait]
impl ChatProvider for RecordingChat {
    async fn send_to_room(&self, room_id: &str, content: &str) -> Result<String, String> {
        let mut rooms = self.rooms.lock().await;
        rooms.push((room_id.to_string(), content.to_string()));
        Ok(format!("$sent{}", rooms.len()))
    }

    async fn send_direct(&self, user_id: &str, content: &str) -> Result<String, String> {
        if self.unreachable_users.lock().await.contains(user_id) {
            return Err(format!("no direct room with {user_id}"));
        }
        let mut directs = self.directs.lock().await;
        directs.push((user_id.to_string(), content.to_string()));
        Ok(format!("$dm{}", directs.len()))
    }

    async fn add_reaction(
        &self,
        room_id: &str,
        message_id: &str,
        key: &str,
    ) -> Result<(), String> {
        let mut failing = self.failing_reactions.lock().await;
        if *failing > 0 {
            *failing -= 1;
            return Err("reaction rejected".to_string());
        }
        self.reactions.lock().await.push((
            room_id.to_string(),
            message_id.to_string(),
            key.to_string(),
        ));
        Ok(())
    }
}

/// Directory with a fixed set of rooms. Unknown rooms are lookup failures.
#[derive(Default)]
pub struct FakeDirectory {
    rooms: HashMap<String, (RoomInfo, Option<Vec<Member>>)>,
}

impl FakeDirectory {
    pub const BOT: &'static str = "@brainbot:example.org";

    /// A shared room with `humans` eligible members plus the bot.
    pub fn with_humans(room_id: &str, humans: usize) -> Self {
        let mut members: Vec<Member> = (0..humans)
            .map(|i| Member {
                id: format!("@human{i}:example.org"),
                is_bot: false,
                is_deleted: false,
            })
            .collect();
        members.push(Member {
            id: Self::BOT.to_string(),
            is_bot: true,
            is_deleted: false,
        });
        Self::default().room(room_id, "general", true, Some(members))
    }

    pub fn with_direct_room(room_id: &str) -> Self {
        Self::default().room(room_id, "dm", false, None)
    }

    pub fn room(
        mut self,
        room_id: &str,
        name: &str,
        is_channel: bool,
        members: Option<Vec<Member>>,
    ) -> Self {
        let info = RoomInfo {
            name: name.to_string(),
            is_channel,
        };
        self.rooms.insert(room_id.to_string(), (info, members));
        self
    }
}

#[async_trait]
impl Directory for FakeDirectory {
    async fn members(&self, room_id: &str) -> Result<Option<Vec<Member>>, String> {
        self.rooms
            .get(room_id)
            .map(|(_, members)| members.clone())
            .ok_or_else(|| format!("unknown room {room_id}"))
    }

    async fn is_bot(&self, user_id: &str) -> bool {
        user_id == Self::BOT
    }

    async fn room_info(&self, room_id: &str) -> Result<RoomInfo, String> {
        self.rooms
            .get(room_id)
            .map(|(info, _)| info.clone())
            .ok_or_else(|| format!("unknown room {room_id}"))
    }
}

/// A store that is never reachable.
pub struct FailingBrain;

#[async_trait]
impl BrainStore for FailingBrain {
    async fn get(&self, _key: &str) -> Result<Option<Value>, BrainError> {
        Err(BrainError::Unavailable("offline".to_string()))
    }

    async fn set(&self, _key: &str, _value: Value) -> Result<(), BrainError> {
        Err(BrainError::Unavailable("offline".to_string()))
    }
}
