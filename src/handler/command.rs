use teloxide::dispatching::{HandlerExt, UpdateFilterExt, UpdateHandler};
use teloxide::prelude::*;

use crate::command::Command;
use crate::error::HandlerResult;
use crate::state::AppState;

async fn handle_start(bot: Bot, msg: Message) -> HandlerResult<()> {
    let first_name = msg.from.as_ref().map(|user| user.first_name.clone()).unwrap_or_default();

    bot.send_message(msg.chat.id, t!("commands.start", first_name = first_name))
        .await?;

    Ok(())
}

async fn handle_help(bot: Bot, msg: Message) -> HandlerResult<()> {
    bot.send_message(msg.chat.id, t!("commands.help")).await?;

    Ok(())
}

async fn handle_command(bot: Bot, msg: Message, cmd: Command) -> HandlerResult<()> {
    info!("Command {:?} in chat {}", cmd, msg.chat.id);

    match cmd {
        Command::Start => handle_start(bot, msg).await?,
        Command::Help => handle_help(bot, msg).await?,
    }

    Ok(())
}

pub fn get_command_handler() -> UpdateHandler<Box<dyn std::error::Error + Send + Sync>> {
    Update::filter_message()
        .filter(|state: AppState| state.config.telegram.enable_commands)
        .filter_command::<Command>()
        .endpoint(handle_command)
}
