use anyhow::{Context as _, Result};
use dotenvy::dotenv;
use log::{debug, error, info, warn};
use serenity::async_trait;
use serenity::model::channel::Message;
use serenity::model::gateway::Ready;
use serenity::prelude::*;
use std::sync::Arc;

use time_capsule::commands::{strip_bot_mention, CapsuleCommandHandler, CommandParser};
use time_capsule::core::Config;
use time_capsule::database::Database;
use time_capsule::features::capsules::CapsuleService;
use time_capsule::features::delivery::{CapsuleScheduler, DeliveryEngine, DiscordNotifier};
use time_capsule::features::rate_limiting::SubmissionLimiter;

struct Handler {
    commands: Arc<CapsuleCommandHandler>,
}

#[async_trait]
impl EventHandler for Handler {
    async fn message(&self, ctx: Context, msg: Message) {
        if msg.author.bot {
            return;
        }

        let recipient = msg.channel_id.0.to_string();

        // DMs are always addressed to us, guild messages only when they mention the bot
        let (text, addressed) = if msg.guild_id.is_none() {
            (msg.content.clone(), true)
        } else {
            match strip_bot_mention(&msg.content, ctx.cache.current_user_id().0) {
                Some(text) => (text, true),
                None => (msg.content.clone(), false),
            }
        };

        let Some(reply) = self.commands.handle_text(&recipient, &text, addressed).await else {
            debug!("Not replying to message in channel {recipient}");
            return;
        };

        if let Err(e) = msg.channel_id.say(&ctx.http, reply).await {
            warn!("Failed to reply in channel {recipient}: {e}");
        }
    }

    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!("🎉 {} is connected and ready!", ready.user.name);
        info!("📡 Connected to {} guilds", ready.guilds.len());
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    let config = Config::from_env()?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    info!("Starting Time Capsule Bot...");

    let database = Database::new(&config.database_path)
        .await
        .with_context(|| format!("Failed to open database at {}", config.database_path))?;
    match database.count_pending().await {
        Ok(pending) => info!("📦 {pending} capsule(s) waiting for delivery"),
        Err(e) => warn!("Could not count pending capsules: {e}"),
    }

    let store = Arc::new(database);
    let commands = CapsuleCommandHandler::new(
        CommandParser::new().context("Failed to compile command parser")?,
        CapsuleService::new(store.clone()),
        SubmissionLimiter::new(config.submit_rate_limit, config.submit_rate_window()),
    );

    let handler = Handler {
        commands: Arc::new(commands),
    };

    let intents = GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT;

    let mut client = Client::builder(&config.discord_token, intents)
        .event_handler(handler)
        .await
        .map_err(|e| {
            error!("Failed to create Discord client: {e}");
            anyhow::anyhow!("Client creation failed: {}", e)
        })?;

    // Start the capsule scheduler
    let notifier = DiscordNotifier::new(client.cache_and_http.http.clone(), config.notify_timeout());
    let engine = DeliveryEngine::new(store, Arc::new(notifier));
    let scheduler = CapsuleScheduler::new(engine, config.sweep_interval()).spawn();

    let shard_manager = client.shard_manager.clone();

    info!("Bot configured successfully. Connecting to Discord gateway...");

    let result = tokio::select! {
        started = client.start() => started.map_err(|why| {
            error!("Gateway connection failed: {why:?}");
            anyhow::anyhow!("Failed to establish gateway connection: {}", why)
        }),
        signal = tokio::signal::ctrl_c() => {
            match signal {
                Ok(()) => info!("Shutdown signal received"),
                Err(e) => error!("Failed to listen for shutdown signal: {e}"),
            }
            Ok(())
        }
    };

    scheduler.stop().await;
    shard_manager.lock().await.shutdown_all().await;

    info!("Time Capsule Bot stopped");
    result
}
