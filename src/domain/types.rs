//! # Domain Types
//!
//! Common data structures and enums used across the application logic.

use serde::{Deserialize, Serialize};

/// A room member as reported by the directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub id: String,
    pub is_bot: bool,
    pub is_deleted: bool,
}

impl Member {
    /// Neither a bot nor a deleted account.
    pub fn is_eligible(&self) -> bool {
        !self.is_bot && !self.is_deleted
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomInfo {
    pub name: String,
    /// A shared room rather than a direct message.
    pub is_channel: bool,
}

/// An inbound text message, already stripped of transport details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingMessage {
    pub room_id: String,
    pub message_id: String,
    pub sender_id: String,
    /// Short username used for mood bookkeeping.
    pub sender_name: String,
    pub body: String,
    pub is_direct: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactionKind {
    Added,
    Removed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Polarity {
    Up,
    Down,
}

impl Polarity {
    pub const UP_MARKER: &'static str = "👍";
    pub const DOWN_MARKER: &'static str = "👎";

    /// Maps a reaction key onto a vote direction.
    /// Accepts Slack-style names as well as the emoji with any skin tone.
    pub fn from_reaction(key: &str) -> Option<Self> {
        let base: String = key
            .chars()
            .filter(|c| !matches!(*c, '\u{fe0f}' | '\u{1f3fb}'..='\u{1f3ff}'))
            .collect();
        match base.trim_matches(':') {
            "+1" | "thumbsup" | "👍" => Some(Polarity::Up),
            "-1" | "thumbsdown" | "👎" => Some(Polarity::Down),
            _ => None,
        }
    }

    pub fn marker(&self) -> &'static str {
        match self {
            Polarity::Up => Self::UP_MARKER,
            Polarity::Down => Self::DOWN_MARKER,
        }
    }
}

/// The message a reaction was attached to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReactionTarget {
    pub room_id: String,
    pub message_id: String,
    /// Author of the reacted message, when the transport reports it.
    pub author_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReactionEvent {
    pub kind: ReactionKind,
    pub polarity: Polarity,
    pub target: ReactionTarget,
    pub reactor_id: String,
    /// Transport id of the reaction itself, used to resolve later retractions.
    pub reaction_id: Option<String>,
}
