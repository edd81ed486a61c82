//! # Mood Commands
//!
//! Handles `mood <name>`, `happiest` and `saddest`.
//! A brain that cannot be read is reported to the user instead of failing silently.

use crate::application::mood::{Extreme, Mood, MoodLedger};
use crate::domain::traits::ChatProvider;
use crate::strings::{logs, messages};
use anyhow::Result;

pub async fn handle_mood(
    moods: &MoodLedger,
    chat: &dyn ChatProvider,
    room_id: &str,
    target: &str,
) -> Result<()> {
    let target = target.trim().to_lowercase();
    let reply = match moods.query_mood(&target).await {
        Ok(Mood::Unknown) => messages::mood_emotionless(&target),
        Ok(Mood::Neutral) => messages::mood_neutral(&target),
        Ok(Mood::Happy) => messages::mood_happy(&target),
        Ok(Mood::Sad) => messages::mood_sad(&target),
        Err(e) => {
            tracing::warn!("{}", logs::brain_unavailable("mood", &e.to_string()));
            messages::BRAIN_NOT_LOADED.to_string()
        }
    };
    chat.send_to_room(room_id, &reply)
        .await
        .map(|_| ())
        .map_err(|e| anyhow::anyhow!(e))
}

pub async fn handle_extreme(
    moods: &MoodLedger,
    chat: &dyn ChatProvider,
    room_id: &str,
    kind: Extreme,
) -> Result<()> {
    let reply = match moods.query_extreme(kind).await {
        Ok(Some(name)) => match kind {
            Extreme::Happiest => messages::happiest(&name),
            Extreme::Saddest => messages::saddest(&name),
        },
        Ok(None) => messages::NO_MOODS.to_string(),
        Err(e) => {
            tracing::warn!("{}", logs::brain_unavailable("extreme", &e.to_string()));
            messages::BRAIN_NOT_LOADED.to_string()
        }
    };
    chat.send_to_room(room_id, &reply)
        .await
        .map(|_| ())
        .map_err(|e| anyhow::anyhow!(e))
}
