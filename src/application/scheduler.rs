//! # Scheduler
//!
//! Cron-style recurring triggers bound to a fixed UTC offset. Each job exposes a single
//! `on_tick` entry point; the scheduler only decides when to call it.

use crate::application::mood::MoodLedger;
use crate::application::stats::StatsAggregator;
use crate::application::vote::VoteTracker;
use crate::domain::config::ScheduleConfig;
use crate::domain::traits::ChatProvider;
use crate::strings::logs;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveTime, Utc, Weekday};
use std::sync::Arc;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schedule {
    Daily { at: NaiveTime },
    Weekly { weekday: Weekday, at: NaiveTime },
}

impl Schedule {
    pub fn daily(at: &str) -> Result<Self> {
        Ok(Schedule::Daily {
            at: parse_time(at)?,
        })
    }

    pub fn weekly(weekday: &str, at: &str) -> Result<Self> {
        let weekday = weekday
            .parse::<Weekday>()
            .map_err(|_| anyhow!("invalid weekday '{weekday}'"))?;
        Ok(Schedule::Weekly {
            weekday,
            at: parse_time(at)?,
        })
    }

    /// First fire instant strictly after `now`, evaluated in `offset`.
    pub fn next_after(&self, now: DateTime<Utc>, offset: FixedOffset) -> DateTime<Utc> {
        let local = now.with_timezone(&offset);
        let (at, weekday) = match *self {
            Schedule::Daily { at } => (at, None),
            Schedule::Weekly { weekday, at } => (at, Some(weekday)),
        };

        (0..=7)
            .filter_map(|days| {
                let date = local.date_naive() + Duration::days(days);
                if weekday.is_some_and(|w| date.weekday() != w) {
                    return None;
                }
                date.and_time(at).and_local_timezone(offset).single()
            })
            .map(|candidate| candidate.with_timezone(&Utc))
            .find(|candidate| *candidate > now)
            .unwrap_or(now + Duration::days(1))
    }
}

fn parse_time(at: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(at, "%H:%M").map_err(|e| anyhow!("invalid time '{at}': {e}"))
}

#[async_trait]
pub trait ScheduledJob: Send + Sync {
    fn name(&self) -> &'static str;

    async fn on_tick(&self) -> Result<()>;
}

pub struct Scheduler {
    timezone: String,
    offset: FixedOffset,
}

impl Scheduler {
    pub fn from_config(config: &ScheduleConfig) -> Result<Self> {
        let offset = FixedOffset::east_opt(config.utc_offset_minutes * 60)
            .ok_or_else(|| anyhow!("invalid utc offset {}", config.utc_offset_minutes))?;
        Ok(Self {
            timezone: config.timezone.clone(),
            offset,
        })
    }

    /// Runs `job` forever at every fire instant of `schedule`.
    pub fn spawn(&self, schedule: Schedule, job: Arc<dyn ScheduledJob>) -> JoinHandle<()> {
        let offset = self.offset;
        let timezone = self.timezone.clone();
        tokio::spawn(async move {
            loop {
                let now = Utc::now();
                let next = schedule.next_after(now, offset);
                let at = format!("{} ({timezone})", next.with_timezone(&offset).to_rfc3339());
                tracing::info!("{}", logs::job_scheduled(job.name(), &at));

                let wait = (next - now).to_std().unwrap_or_default();
                tokio::time::sleep(wait).await;

                if let Err(e) = job.on_tick().await {
                    tracing::error!("{}", logs::job_failed(job.name(), &e.to_string()));
                }
            }
        })
    }
}

/// Daily: forget everyone's mood and drop votes that already reached an outcome.
pub struct DailyReset {
    moods: Arc<MoodLedger>,
    votes: Arc<VoteTracker>,
}

impl DailyReset {
    pub fn new(moods: Arc<MoodLedger>, votes: Arc<VoteTracker>) -> Self {
        Self { moods, votes }
    }
}

#[async_trait]
impl ScheduledJob for DailyReset {
    fn name(&self) -> &'static str {
        "mood-reset"
    }

    async fn on_tick(&self) -> Result<()> {
        self.moods.reset().await?;
        let pruned = self.votes.prune_resolved().await?;
        tracing::info!("{}", logs::votes_pruned(pruned));
        Ok(())
    }
}

/// Weekly: deliver subscriber reports and reset the counters.
pub struct WeeklyStats {
    stats: Arc<StatsAggregator>,
    chat: Arc<dyn ChatProvider>,
}

impl WeeklyStats {
    pub fn new(stats: Arc<StatsAggregator>, chat: Arc<dyn ChatProvider>) -> Self {
        Self { stats, chat }
    }
}

#[async_trait]
impl ScheduledJob for WeeklyStats {
    fn name(&self) -> &'static str {
        "stats-weekly"
    }

    async fn on_tick(&self) -> Result<()> {
        self.stats.weekly_cycle(self.chat.as_ref()).await?;
        Ok(())
    }
}
