use anyhow::Result;
use dotenvy::dotenv;
use log::{error, info, warn};
use std::sync::Arc;
use std::time::Duration;

use yadavar::commands::CommandHandler;
use yadavar::core::Config;
use yadavar::database::GroupStore;
use yadavar::features::{NotificationDispatcher, ReminderScheduler};
use yadavar::transport::{ChatKind, ChatTransport, TelegramTransport};

/// Pause before retrying after a failed getUpdates call
const POLL_RETRY_DELAY: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    let config = Config::from_env()?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    info!("Starting reminder bot...");
    info!("📁 Data file: {}", config.data_file.display());
    match &config.required_channel {
        Some(channel) => info!("🔒 Reminder creation requires membership in {channel}"),
        None => info!("🔓 No required channel configured"),
    }

    let store = Arc::new(GroupStore::new(config.data_file.clone()));
    let telegram = Arc::new(TelegramTransport::new(&config.bot_token)?);
    let transport: Arc<dyn ChatTransport> = telegram.clone();

    // Start the reminder scheduler
    let dispatcher = Arc::new(NotificationDispatcher::new(
        transport.clone(),
        config.max_mentions,
        config.send_timeout(),
    ));
    let scheduler = ReminderScheduler::new(store.clone(), dispatcher, &config);
    tokio::spawn(async move {
        scheduler.run().await;
    });

    let handler = Arc::new(CommandHandler::new(store, transport, &config));

    info!("Bot configured successfully. Polling for updates...");

    tokio::select! {
        _ = poll_updates(telegram, handler) => {}
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                error!("Failed to listen for shutdown signal: {e}");
            }
            info!("Shutting down");
        }
    }

    Ok(())
}

async fn poll_updates(telegram: Arc<TelegramTransport>, handler: Arc<CommandHandler>) {
    let mut offset: Option<i64> = None;

    loop {
        let updates = match telegram.get_updates(offset).await {
            Ok(updates) => updates,
            Err(e) => {
                warn!("getUpdates failed: {e}");
                tokio::time::sleep(POLL_RETRY_DELAY).await;
                continue;
            }
        };

        for update in updates {
            offset = Some(update.update_id + 1);
            let Some(msg) = update.into_inbound() else {
                continue;
            };

            let telegram = telegram.clone();
            let handler = handler.clone();
            tokio::spawn(async move {
                let reply = match handler.handle_message(&msg).await {
                    Ok(reply) => reply,
                    Err(e) => {
                        error!("Error handling message in chat {}: {e:#}", msg.chat_id);
                        (msg.chat_kind == ChatKind::Private).then(|| {
                            "Sorry, I encountered an error processing your message.".to_string()
                        })
                    }
                };

                if let Some(reply) = reply {
                    if let Err(e) = telegram.send_message(msg.chat_id, &reply, false).await {
                        warn!("Failed to reply in chat {}: {e}", msg.chat_id);
                    }
                }
            });
        }
    }
}
