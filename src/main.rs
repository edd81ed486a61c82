//! # Main Entry Point
//!
//! Initializes the bot:
//! - Domain: Configuration and Types
//! - Infrastructure: Matrix, Brain backends
//! - Application: Router, Plugins, Scheduler
//! - Interface: Command Handlers
//!

mod application;
mod domain;
mod infrastructure;
mod interface;
mod strings;

use anyhow::{Context, Result};
use clap::Parser;
use matrix_sdk::{
    Client,
    config::SyncSettings,
    room::Room,
    ruma::events::{
        reaction::OriginalSyncReactionEvent,
        room::{
            member::{MembershipState, StrippedRoomMemberEvent},
            message::OriginalSyncRoomMessageEvent,
            redaction::OriginalSyncRoomRedactionEvent,
        },
    },
};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::application::brain::BrainHandle;
use crate::application::router::CommandRouter;
use crate::application::scheduler::{DailyReset, Schedule, Scheduler, WeeklyStats};
use crate::domain::config::AppConfig;
use crate::infrastructure::matrix::{self as matrix, MatrixService};
use crate::strings::logs;

#[derive(Parser, Debug)]
#[command(version, about = "Mood, voting and stats plugins for Matrix rooms")]
struct Cli {
    /// Path to the YAML configuration file
    #[arg(short, long, default_value = "data/config.yaml")]
    config: PathBuf,

    /// Directory for the brain file and session log
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1. Load Configuration
    let config = AppConfig::load(&cli.config)?;

    // 2. Logging Setup
    if !cli.data_dir.exists() {
        fs::create_dir_all(&cli.data_dir).context("Failed to create data directory")?;
    }

    let file_appender = tracing_appender::rolling::never(&cli.data_dir, "session.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(
            "info,matrix_sdk=warn,matrix_sdk_base=warn,matrix_sdk_crypto=error,ruma=warn,hyper=warn",
        )
    });

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false);
    let console_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stdout);

    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .init();

    tracing::info!("{}", logs::STARTING);
    tracing::info!("{}", logs::config_loaded(&config.services.matrix.username));

    // 3. Brain
    let store = infrastructure::brain::open(&config.brain, &cli.data_dir).await?;
    tracing::info!("{}", logs::brain_opened(&format!("{:?}", config.brain.backend)));
    let brain = Arc::new(BrainHandle::new(store));

    // 4. Matrix Setup
    let client = Client::builder()
        .homeserver_url(&config.services.matrix.homeserver)
        .build()
        .await?;

    client
        .matrix_auth()
        .login_username(
            &config.services.matrix.username,
            &config.services.matrix.password,
        )
        .send()
        .await?;

    tracing::info!("{}", logs::logged_in(&config.services.matrix.username));

    if let Some(name) = &config.services.matrix.display_name
        && let Err(e) = client.account().set_display_name(Some(name.as_str())).await
    {
        tracing::warn!("{}", logs::set_display_name_fail(&e.to_string()));
    }

    let service = Arc::new(MatrixService::new(client.clone(), &config.directory.bots));
    let bot_name = client
        .user_id()
        .map(|id| id.localpart().to_string())
        .unwrap_or_else(|| config.services.matrix.username.clone());

    let router = Arc::new(CommandRouter::new(
        &config.commands.prefix,
        &bot_name,
        brain.clone(),
        service.clone(),
        service.clone(),
    ));

    // 5. Scheduled Jobs
    let scheduler = Scheduler::from_config(&config.schedule)?;
    let daily = Schedule::daily(&config.schedule.mood_reset)?;
    let weekly = Schedule::weekly(&config.schedule.stats_weekday, &config.schedule.stats_time)?;
    scheduler.spawn(
        daily,
        Arc::new(DailyReset::new(router.moods(), router.votes())),
    );
    scheduler.spawn(
        weekly,
        Arc::new(WeeklyStats::new(router.stats(), service.clone())),
    );

    // 6. Event Handlers
    let start_time = SystemTime::now();
    let is_old = move |ts_millis: u64| UNIX_EPOCH + Duration::from_millis(ts_millis) < start_time;

    let message_router = router.clone();
    client.add_event_handler(move |ev: OriginalSyncRoomMessageEvent, room: Room| {
        let router = message_router.clone();
        async move {
            if is_old(ev.origin_server_ts.get().into()) || ev.sender == room.own_user_id() {
                return;
            }
            let Some(msg) = matrix::incoming_message(&ev, &room).await else {
                return;
            };
            tracing::info!("Received message from {}: \n{}", msg.sender_id, msg.body);
            if let Err(e) = router.route(&msg).await {
                tracing::error!("{}", logs::handler_failed("route", &e.to_string()));
            }
        }
    });

    let reaction_router = router.clone();
    client.add_event_handler(move |ev: OriginalSyncReactionEvent, room: Room| {
        let router = reaction_router.clone();
        async move {
            if is_old(ev.origin_server_ts.get().into()) {
                return;
            }
            if let Some(event) = matrix::reaction_added(&ev, &room) {
                router.react(&event).await;
            }
        }
    });

    let redaction_router = router.clone();
    client.add_event_handler(move |ev: OriginalSyncRoomRedactionEvent| {
        let router = redaction_router.clone();
        async move {
            if is_old(ev.origin_server_ts.get().into()) {
                return;
            }
            if let Some(redacted) = matrix::redacted_event(&ev) {
                router.retract(redacted.as_str(), ev.sender.as_str()).await;
            }
        }
    });

    // Handle Invites
    client.add_event_handler(|ev: StrippedRoomMemberEvent, room: Room| async move {
        if ev.content.membership == MembershipState::Invite {
            tracing::info!("{}", logs::invite_received(room.room_id().as_str()));
            if let Err(e) = room.join().await {
                tracing::warn!("{}", logs::join_failed(room.room_id().as_str(), &e.to_string()));
            }
        }
    });

    // 7. Sync until the process is stopped
    if let Err(e) = client.sync(SyncSettings::default()).await {
        tracing::error!("{}", logs::sync_loop_fail(&e.to_string()));
        return Err(e.into());
    }

    Ok(())
}
