//! # Mood Ledger
//!
//! Per-user mood scores driven by emoticons. Scores live under the `moods` brain key,
//! keyed by lowercased username, and are wiped by the daily reset job.

use crate::application::brain::BrainHandle;
use crate::domain::error::BrainError;
use std::collections::BTreeMap;
use std::sync::Arc;

pub const MOODS_KEY: &str = "moods";

/// Username -> score. Ordered so superlative ties resolve deterministically.
pub type MoodTable = BTreeMap<String, i64>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mood {
    Unknown,
    Neutral,
    Happy,
    Sad,
}

impl Mood {
    pub fn from_score(score: Option<i64>) -> Self {
        match score {
            None => Mood::Unknown,
            Some(0) => Mood::Neutral,
            Some(s) if s > 0 => Mood::Happy,
            Some(_) => Mood::Sad,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extreme {
    Happiest,
    Saddest,
}

/// Highest (or lowest) scoring user. Ties go to the first user in key order.
pub fn extreme(table: &MoodTable, kind: Extreme) -> Option<(&str, i64)> {
    let mut best: Option<(&str, i64)> = None;
    for (name, &score) in table {
        let better = match (best, kind) {
            (None, _) => true,
            (Some((_, b)), Extreme::Happiest) => score > b,
            (Some((_, b)), Extreme::Saddest) => score < b,
        };
        if better {
            best = Some((name.as_str(), score));
        }
    }
    best
}

pub struct MoodLedger {
    brain: Arc<BrainHandle>,
}

impl MoodLedger {
    pub fn new(brain: Arc<BrainHandle>) -> Self {
        Self { brain }
    }

    /// Returns the user's new score.
    pub async fn record_positive(&self, user: &str) -> Result<i64, BrainError> {
        self.adjust(user, 1).await
    }

    pub async fn record_negative(&self, user: &str) -> Result<i64, BrainError> {
        self.adjust(user, -1).await
    }

    async fn adjust(&self, user: &str, delta: i64) -> Result<i64, BrainError> {
        let name = user.to_lowercase();
        self.brain
            .transact(MOODS_KEY, |moods: &mut MoodTable| {
                let score = moods.entry(name).or_insert(0);
                *score += delta;
                *score
            })
            .await
    }

    pub async fn query_mood(&self, user: &str) -> Result<Mood, BrainError> {
        let moods: MoodTable = self.brain.load(MOODS_KEY).await?;
        Ok(Mood::from_score(moods.get(&user.to_lowercase()).copied()))
    }

    pub async fn query_extreme(&self, kind: Extreme) -> Result<Option<String>, BrainError> {
        let moods: MoodTable = self.brain.load(MOODS_KEY).await?;
        Ok(extreme(&moods, kind).map(|(name, _)| name.to_string()))
    }

    pub async fn reset(&self) -> Result<(), BrainError> {
        self.brain.replace(MOODS_KEY, &MoodTable::new()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::brain::MemoryBrain;

    fn ledger() -> MoodLedger {
        MoodLedger::new(Arc::new(BrainHandle::new(Arc::new(MemoryBrain::new()))))
    }

    #[tokio::test]
    async fn test_score_is_positive_minus_negative() {
        let ledger = ledger();
        let events = [true, true, false, true, false, false, false];
        let mut last = 0;
        for positive in events {
            last = if positive {
                ledger.record_positive("Alice").await.unwrap()
            } else {
                ledger.record_negative("alice").await.unwrap()
            };
        }
        assert_eq!(last, 3 - 4);
        assert_eq!(ledger.query_mood("ALICE").await.unwrap(), Mood::Sad);
    }

    #[tokio::test]
    async fn test_first_event_initialises_score() {
        let ledger = ledger();
        assert_eq!(ledger.record_negative("bob").await.unwrap(), -1);
        assert_eq!(ledger.record_positive("carol").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_query_mood_states() {
        let ledger = ledger();
        assert_eq!(ledger.query_mood("nobody").await.unwrap(), Mood::Unknown);

        ledger.record_positive("dave").await.unwrap();
        assert_eq!(ledger.query_mood("dave").await.unwrap(), Mood::Happy);

        ledger.record_negative("dave").await.unwrap();
        assert_eq!(ledger.query_mood("dave").await.unwrap(), Mood::Neutral);
    }

    #[test]
    fn test_extreme_ties_go_to_first_in_order() {
        let mut table = MoodTable::new();
        table.insert("zed".into(), 2);
        table.insert("amy".into(), 2);
        table.insert("kim".into(), -2);
        table.insert("bea".into(), -2);

        assert_eq!(extreme(&table, Extreme::Happiest), Some(("amy", 2)));
        assert_eq!(extreme(&table, Extreme::Saddest), Some(("bea", -2)));
        assert_eq!(extreme(&MoodTable::new(), Extreme::Happiest), None);
    }

    #[tokio::test]
    async fn test_reset_clears_everyone() {
        let ledger = ledger();
        ledger.record_positive("erin").await.unwrap();
        ledger.reset().await.unwrap();
        assert_eq!(ledger.query_mood("erin").await.unwrap(), Mood::Unknown);
        assert_eq!(ledger.query_extreme(Extreme::Happiest).await.unwrap(), None);
    }
}
