use teloxide::dispatching::Dispatcher;
use teloxide::error_handlers::LoggingErrorHandler;
use teloxide::prelude::*;
use teloxide::Bot;

use crate::command;
use crate::config::AppConfig;
use crate::error::{BotResult, HandlerResult};
use crate::handler::get_handler;
use crate::state::AppState;
use crate::utils::http;

pub struct BotService {
    pub bot: Bot,
    pub state: AppState,
}

impl BotService {
    pub fn new(config: AppConfig) -> BotResult<Self> {
        let bot = http::create_telegram_bot(
            config.telegram.token.clone(),
            config.telegram.timeout_secs,
            config.telegram.upload_timeout_secs,
        )?;

        info!("Initializing AppState...");
        let state = AppState::new(config)?;
        info!("AppState initialized");

        Ok(Self { bot, state })
    }

    pub async fn start(&self) -> HandlerResult<()> {
        info!("Testing connection to Telegram API...");
        match self.bot.get_me().await {
            Ok(me) => info!("Connected to Telegram API as @{}", me.username()),
            Err(e) => {
                error!("Failed to connect to Telegram API: {:?}", e);
                return Err(anyhow::anyhow!("Failed to connect to Telegram API: {}", e).into());
            }
        }

        let config = &self.state.config;

        if config.telegram.enable_commands {
            command::setup_user_commands(&self.bot).await?;
        } else {
            command::clear_commands(&self.bot).await?;
        }

        tokio::fs::create_dir_all(&config.dispatch.download_dir).await?;
        info!(
            "Downloads go to {} (link scope: {:?})",
            config.dispatch.download_dir.display(),
            config.dispatch.link_scope
        );

        Dispatcher::builder(self.bot.clone(), get_handler())
            .dependencies(dptree::deps![self.state.clone()])
            // Links from one chat run side by side; the pipeline's in-flight guard handles repeats
            .distribution_function(|_| None::<std::convert::Infallible>)
            .error_handler(LoggingErrorHandler::with_custom_text(
                "An error has occurred in the dispatcher",
            ))
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;

        Ok(())
    }
}
