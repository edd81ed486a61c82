//! # Stats Aggregator
//!
//! Counts messages per public room and invocations per command under the `stats` brain key.
//! Users may subscribe to individual stats; every week subscribers receive their reports
//! and the counters start over. Subscriptions survive the reset.

use crate::application::brain::BrainHandle;
use crate::domain::error::BrainError;
use crate::domain::traits::ChatProvider;
use crate::domain::types::RoomInfo;
use crate::strings::{logs, messages};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

pub const STATS_KEY: &str = "stats";

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsTable {
    #[serde(default)]
    pub rooms: BTreeMap<String, u64>,
    #[serde(default)]
    pub commands: BTreeMap<String, u64>,
    #[serde(default, rename = "_subscribers")]
    pub subscribers: BTreeMap<String, BTreeSet<String>>,
}

impl StatsTable {
    /// Finds a single counter by exact name, searching rooms before commands.
    pub fn lookup(&self, name: &str) -> Option<u64> {
        self.rooms
            .get(name)
            .or_else(|| self.commands.get(name))
            .copied()
    }

    pub fn query(&self, stat: &str) -> StatQuery {
        match StatName::parse(stat) {
            StatName::Rooms => StatQuery::Rooms(RankedReport::from_counts(&self.rooms)),
            StatName::Commands => StatQuery::Commands(RankedReport::from_counts(&self.commands)),
            StatName::Single(name) => match self.lookup(&name) {
                Some(value) => StatQuery::Single { name, value },
                None => StatQuery::NotFound(name),
            },
        }
    }

    fn subscriptions(&self, user: &str) -> Vec<String> {
        self.subscribers
            .get(user)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }
}

/// The stats a user can ask for or subscribe to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatName {
    Rooms,
    Commands,
    Single(String),
}

impl StatName {
    pub fn parse(stat: &str) -> Self {
        match stat.trim() {
            "rooms" => StatName::Rooms,
            "commands" => StatName::Commands,
            other => StatName::Single(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedEntry {
    pub name: String,
    pub count: u64,
    /// Share of the total in tenths of a percent, rounded half up.
    pub tenths: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedReport {
    pub entries: Vec<RankedEntry>,
    pub total: u64,
}

impl RankedReport {
    /// Sorts counts descending. Ties keep the map's key order.
    pub fn from_counts(counts: &BTreeMap<String, u64>) -> Self {
        let total: u64 = counts.values().sum();
        let mut entries: Vec<RankedEntry> = counts
            .iter()
            .map(|(name, &count)| RankedEntry {
                name: name.clone(),
                count,
                tenths: tenths_of_percent(count, total),
            })
            .collect();
        entries.sort_by(|a, b| b.count.cmp(&a.count));
        Self { entries, total }
    }
}

fn tenths_of_percent(count: u64, total: u64) -> u64 {
    if total == 0 {
        return 0;
    }
    (count * 2000 + total) / (2 * total)
}

/// Renders tenths of a percent with one decimal, dropping a trailing `.0`.
pub fn format_percent(tenths: u64) -> String {
    if tenths % 10 == 0 {
        format!("{}", tenths / 10)
    } else {
        format!("{}.{}", tenths / 10, tenths % 10)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatQuery {
    Rooms(RankedReport),
    Commands(RankedReport),
    Single { name: String, value: u64 },
    NotFound(String),
}

impl StatQuery {
    pub fn render(&self) -> String {
        match self {
            StatQuery::Rooms(report) => messages::rooms_report(report),
            StatQuery::Commands(report) => messages::commands_report(report),
            StatQuery::Single { name, value } => messages::single_stat(name, *value),
            StatQuery::NotFound(name) => messages::stat_not_found(name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionChange {
    pub stat: String,
    /// False when the call was a no-op (already subscribed / not subscribed).
    pub changed: bool,
    pub subscriptions: Vec<String>,
}

pub struct StatsAggregator {
    brain: Arc<BrainHandle>,
    command_prefix: String,
}

impl StatsAggregator {
    pub fn new(brain: Arc<BrainHandle>, command_prefix: &str) -> Self {
        Self {
            brain,
            command_prefix: command_prefix.to_string(),
        }
    }

    /// Counts a message. Only shared rooms are counted.
    pub async fn record_message(&self, room: &RoomInfo, text: &str) -> Result<(), BrainError> {
        if !room.is_channel {
            return Ok(());
        }
        let command = text
            .starts_with(&self.command_prefix)
            .then(|| text.split(' ').next().unwrap_or_default().to_string());

        self.brain
            .transact(STATS_KEY, |stats: &mut StatsTable| {
                *stats.rooms.entry(room.name.clone()).or_insert(0) += 1;
                if let Some(command) = command {
                    *stats.commands.entry(command).or_insert(0) += 1;
                }
            })
            .await
    }

    pub async fn query(&self, stat: &str) -> Result<StatQuery, BrainError> {
        let stats: StatsTable = self.brain.load(STATS_KEY).await?;
        Ok(stats.query(stat))
    }

    pub async fn subscribe(&self, user: &str, stat: &str) -> Result<SubscriptionChange, BrainError> {
        self.brain
            .transact(STATS_KEY, |stats: &mut StatsTable| {
                let changed = stats
                    .subscribers
                    .entry(user.to_string())
                    .or_default()
                    .insert(stat.to_string());
                SubscriptionChange {
                    stat: stat.to_string(),
                    changed,
                    subscriptions: stats.subscriptions(user),
                }
            })
            .await
    }

    pub async fn unsubscribe(
        &self,
        user: &str,
        stat: &str,
    ) -> Result<SubscriptionChange, BrainError> {
        self.brain
            .transact(STATS_KEY, |stats: &mut StatsTable| {
                let changed = match stats.subscribers.get_mut(user) {
                    Some(set) => {
                        let removed = set.remove(stat);
                        if set.is_empty() {
                            stats.subscribers.remove(user);
                        }
                        removed
                    }
                    None => false,
                };
                SubscriptionChange {
                    stat: stat.to_string(),
                    changed,
                    subscriptions: stats.subscriptions(user),
                }
            })
            .await
    }

    /// Sends every subscriber their reports, then clears the room and command counters.
    /// The snapshot and the reset happen in one transaction; reports are built from the
    /// snapshot. Returns the number of messages delivered.
    pub async fn weekly_cycle(&self, chat: &dyn ChatProvider) -> Result<usize, BrainError> {
        let snapshot = self
            .brain
            .transact(STATS_KEY, |stats: &mut StatsTable| {
                let snapshot = stats.clone();
                stats.rooms.clear();
                stats.commands.clear();
                snapshot
            })
            .await?;

        let mut delivered = 0;
        for (user, subscriptions) in &snapshot.subscribers {
            let names: Vec<String> = subscriptions.iter().cloned().collect();
            let mut outgoing = vec![messages::weekly_header(&names)];
            outgoing.extend(names.iter().map(|stat| snapshot.query(stat).render()));

            for message in outgoing {
                match chat.send_direct(user, &message).await {
                    Ok(_) => delivered += 1,
                    Err(e) => {
                        tracing::error!("{}", logs::send_failed(user, &e));
                        break;
                    }
                }
            }
        }
        tracing::info!("{}", logs::stats_reset(snapshot.subscribers.len()));
        Ok(delivered)
    }
}
