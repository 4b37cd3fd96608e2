use teloxide::{macros::BotCommands, prelude::Requester, types::BotCommand, Bot};

use crate::error::HandlerResult;

#[derive(BotCommands, Clone, Debug, PartialEq)]
#[command(rename_rule = "lowercase")]
pub enum Command {
    Start,
    Help,
}

impl Command {
    pub fn user_commands() -> Vec<BotCommand> {
        vec![
            BotCommand::new("start", t!("commands.description.start")),
            BotCommand::new("help", t!("commands.description.help")),
        ]
    }
}

pub async fn setup_user_commands(bot: &Bot) -> HandlerResult<()> {
    bot.delete_my_commands().await?;
    bot.set_my_commands(Command::user_commands()).await?;
    Ok(())
}

pub async fn clear_commands(bot: &Bot) -> HandlerResult<()> {
    bot.delete_my_commands().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use teloxide::utils::command::BotCommands as _;

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse("/start", "instarelay_bot").unwrap(), Command::Start);
        assert_eq!(Command::parse("/help@instarelay_bot", "instarelay_bot").unwrap(), Command::Help);
        assert!(Command::parse("/download", "instarelay_bot").is_err());
    }

    #[test]
    fn test_user_commands() {
        let commands = Command::user_commands();
        assert_eq!(commands.len(), 2);
        assert_eq!(commands[0].command, "start");
        assert_eq!(commands[1].description, "Show how to use the bot");
    }
}
