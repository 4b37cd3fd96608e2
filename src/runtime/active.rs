use std::sync::Arc;

use dashmap::DashSet;
use teloxide::types::ChatId;

use crate::platform::InstagramLink;

/// Links currently being processed, per chat. Nothing here outlives a request.
#[derive(Clone, Default)]
pub struct ActiveRequests {
    inner: Arc<DashSet<(ChatId, String)>>,
}

impl ActiveRequests {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the link as in flight, or returns `None` if the chat already has it running.
    pub fn try_acquire(&self, chat_id: ChatId, link: &InstagramLink) -> Option<ActiveGuard> {
        let key = (chat_id, link.key());

        if self.inner.insert(key.clone()) {
            Some(ActiveGuard {
                inner: Arc::clone(&self.inner),
                key,
            })
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }
}

pub struct ActiveGuard {
    inner: Arc<DashSet<(ChatId, String)>>,
    key: (ChatId, String),
}

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        self.inner.remove(&self.key);
    }
}
