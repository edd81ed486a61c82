//! # Matrix Service Adapter
//!
//! Implements the `ChatProvider` and `Directory` traits for the Matrix protocol using `matrix_sdk`,
//! and converts raw Matrix events into the domain events the router understands.

use crate::domain::traits::{ChatProvider, Directory};
use crate::domain::types::{
    IncomingMessage, Member, Polarity, ReactionEvent, ReactionKind, ReactionTarget, RoomInfo,
};
use anyhow::Result;
use async_trait::async_trait;
use matrix_sdk::room::Room;
use matrix_sdk::ruma::events::reaction::{OriginalSyncReactionEvent, ReactionEventContent};
use matrix_sdk::ruma::events::relation::Annotation;
use matrix_sdk::ruma::events::room::message::{
    MessageType, OriginalSyncRoomMessageEvent, RoomMessageEventContent,
};
use matrix_sdk::ruma::events::room::redaction::OriginalSyncRoomRedactionEvent;
use matrix_sdk::ruma::{EventId, OwnedEventId, RoomId, UserId};
use matrix_sdk::{Client, RoomMemberships};
use std::collections::HashSet;

#[derive(Clone)]
pub struct MatrixService {
    client: Client,
    bots: HashSet<String>,
}

impl MatrixService {
    pub fn new(client: Client, bots: &[String]) -> Self {
        Self {
            client,
            bots: bots.iter().cloned().collect(),
        }
    }

    fn room(&self, room_id: &str) -> Result<Room> {
        let room_id = RoomId::parse(room_id)?;
        self.client
            .get_room(&room_id)
            .ok_or_else(|| anyhow::anyhow!("unknown room {room_id}"))
    }

    fn is_self(&self, user_id: &str) -> bool {
        self.client
            .user_id()
            .is_some_and(|own| own.as_str() == user_id)
    }

    async fn direct_room(&self, user_id: &str) -> Result<Room> {
        let user_id = UserId::parse(user_id)?;
        match self.client.get_dm_room(&user_id) {
            Some(room) => Ok(room),
            None => Ok(self.client.create_dm(&user_id).await?),
        }
    }

    async fn send_markdown(room: &Room, content: &str) -> Result<String> {
        let response = room
            .send(RoomMessageEventContent::text_markdown(content))
            .await?;
        Ok(response.event_id.to_string())
    }

    async fn react(&self, room_id: &str, message_id: &str, key: &str) -> Result<()> {
        let room = self.room(room_id)?;
        let event_id = EventId::parse(message_id)?;
        let content = ReactionEventContent::new(Annotation::new(event_id, key.to_string()));
        room.send(content).await?;
        Ok(())
    }

    async fn list_members(&self, room_id: &str) -> Result<Option<Vec<Member>>> {
        let room = self.room(room_id)?;
        if room.is_direct().await? {
            return Ok(None);
        }
        let members = room
            .members(RoomMemberships::JOIN)
            .await?
            .into_iter()
            .map(|m| {
                let id = m.user_id().to_string();
                Member {
                    is_bot: self.is_self(&id) || self.bots.contains(&id),
                    // Only joined members are listed; departed accounts never count.
                    is_deleted: false,
                    id,
                }
            })
            .collect();
        Ok(Some(members))
    }

    async fn describe(&self, room_id: &str) -> Result<RoomInfo> {
        let room = self.room(room_id)?;
        let is_direct = room.is_direct().await?;
        Ok(RoomInfo {
            name: room.name().unwrap_or_else(|| room_id.to_string()),
            is_channel: !is_direct,
        })
    }
}

#[async_trait]
impl ChatProvider for MatrixService {
    async fn send_to_room(&self, room_id: &str, content: &str) -> Result<String, String> {
        tracing::info!("Bot sending message to {}: {}", room_id, content);
        let room = self.room(room_id).map_err(|e| e.to_string())?;
        Self::send_markdown(&room, content)
            .await
            .map_err(|e| e.to_string())
    }

    async fn send_direct(&self, user_id: &str, content: &str) -> Result<String, String> {
        tracing::info!("Bot sending direct message to {}", user_id);
        let room = self.direct_room(user_id).await.map_err(|e| e.to_string())?;
        Self::send_markdown(&room, content)
            .await
            .map_err(|e| e.to_string())
    }

    async fn add_reaction(
        &self,
        room_id: &str,
        message_id: &str,
        key: &str,
    ) -> Result<(), String> {
        self.react(room_id, message_id, key)
            .await
            .map_err(|e| e.to_string())
    }
}

#[async_trait]
impl Directory for MatrixService {
    async fn members(&self, room_id: &str) -> Result<Option<Vec<Member>>, String> {
        self.list_members(room_id).await.map_err(|e| e.to_string())
    }

    async fn is_bot(&self, user_id: &str) -> bool {
        self.is_self(user_id) || self.bots.contains(user_id)
    }

    async fn room_info(&self, room_id: &str) -> Result<RoomInfo, String> {
        self.describe(room_id).await.map_err(|e| e.to_string())
    }
}

/// Text messages only; other message types are not routed.
pub async fn incoming_message(ev: &OriginalSyncRoomMessageEvent, room: &Room) -> Option<IncomingMessage> {
    let MessageType::Text(text) = &ev.content.msgtype else {
        return None;
    };
    Some(IncomingMessage {
        room_id: room.room_id().to_string(),
        message_id: ev.event_id.to_string(),
        sender_id: ev.sender.to_string(),
        sender_name: ev.sender.localpart().to_string(),
        body: text.body.clone(),
        is_direct: room.is_direct().await.unwrap_or(false),
    })
}

/// Thumbs reactions only; anything else is not a vote.
pub fn reaction_added(ev: &OriginalSyncReactionEvent, room: &Room) -> Option<ReactionEvent> {
    let annotation = &ev.content.relates_to;
    let polarity = Polarity::from_reaction(&annotation.key)?;
    Some(ReactionEvent {
        kind: ReactionKind::Added,
        polarity,
        target: ReactionTarget {
            room_id: room.room_id().to_string(),
            message_id: annotation.event_id.to_string(),
            author_id: None,
        },
        reactor_id: ev.sender.to_string(),
        reaction_id: Some(ev.event_id.to_string()),
    })
}

/// The event a redaction removes.
pub fn redacted_event(ev: &OriginalSyncRoomRedactionEvent) -> Option<OwnedEventId> {
    ev.redacts.clone().or_else(|| ev.content.redacts.clone())
}
