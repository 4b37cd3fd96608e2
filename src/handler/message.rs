use teloxide::dispatching::{UpdateFilterExt, UpdateHandler};
use teloxide::prelude::*;

use crate::error::HandlerResult;
use crate::platform::detect_links;
use crate::state::AppState;

async fn handle_message_links(bot: Bot, msg: Message, state: AppState) -> HandlerResult<()> {
    let Some(text) = msg.text() else {
        return Ok(());
    };

    let links = detect_links(text, state.config.dispatch.link_scope);

    if links.is_empty() {
        debug!("No Instagram links in message {} of chat {}", msg.id.0, msg.chat.id);
        return Ok(());
    }

    info!("Found {} Instagram link(s) in chat {}", links.len(), msg.chat.id);

    state.pipeline.dispatch_all(&bot, msg.chat.id, links).await;

    Ok(())
}

pub fn get_message_handler() -> UpdateHandler<Box<dyn std::error::Error + Send + Sync>> {
    Update::filter_message()
        .filter(|msg: Message| msg.text().is_some_and(|text| !text.starts_with('/')))
        .endpoint(handle_message_links)
}
