//! Visitor messages and admin replies.

use super::product::new_id;
use super::store::KeyValueStore;
use crate::error::ShopError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Storage key for the message list.
pub const MESSAGES_KEY: &str = "mrflame_messages_v1";

/// One stored message. Visitor messages carry the product they are about;
/// admin replies carry the visitor they answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub from: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pid: Option<String>,
    /// Milliseconds since the epoch on disk.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub at: DateTime<Utc>,
}

impl Message {
    pub fn is_reply(&self) -> bool {
        self.to.is_some()
    }
}

/// The sender name stored on admin replies.
pub fn admin_sender(admin: &str) -> String {
    format!("admin({admin})")
}

/// Message list persisted in a [`KeyValueStore`], newest first.
pub struct Mailbox;

impl Mailbox {
    pub fn load(store: &dyn KeyValueStore) -> Result<Vec<Message>, ShopError> {
        match store.get(MESSAGES_KEY)? {
            Some(json) => {
                Ok(serde_json::from_str::<Option<Vec<Message>>>(&json)?.unwrap_or_default())
            }
            None => Ok(Vec::new()),
        }
    }

    pub fn save(store: &mut dyn KeyValueStore, messages: &[Message]) -> Result<(), ShopError> {
        store.set(MESSAGES_KEY, serde_json::to_string(messages)?)
    }

    pub fn find(store: &dyn KeyValueStore, id: &str) -> Result<Message, ShopError> {
        Self::load(store)?
            .into_iter()
            .find(|m| m.id == id)
            .ok_or_else(|| ShopError::MessageNotFound(id.to_string()))
    }

    /// Stores a visitor's message about product `pid`.
    pub fn send(
        store: &mut dyn KeyValueStore,
        from: &str,
        pid: &str,
        text: &str,
    ) -> Result<Message, ShopError> {
        let text = non_empty(text)?;
        Self::push(
            store,
            Message {
                id: new_id(),
                from: from.to_string(),
                to: None,
                text,
                pid: Some(pid.to_string()),
                at: Utc::now(),
            },
        )
    }

    /// Stores an admin reply to the sender of message `message_id`.
    pub fn reply(
        store: &mut dyn KeyValueStore,
        admin: &str,
        message_id: &str,
        text: &str,
    ) -> Result<Message, ShopError> {
        let text = non_empty(text)?;
        let original = Self::find(store, message_id)?;
        Self::push(
            store,
            Message {
                id: new_id(),
                from: admin_sender(admin),
                to: Some(original.from),
                text,
                pid: None,
                at: Utc::now(),
            },
        )
    }

    fn push(store: &mut dyn KeyValueStore, message: Message) -> Result<Message, ShopError> {
        let mut messages = Self::load(store)?;
        messages.insert(0, message.clone());
        Self::save(store, &messages)?;
        Ok(message)
    }
}

fn non_empty(text: &str) -> Result<String, ShopError> {
    match text.trim() {
        "" => Err(ShopError::EmptyMessage),
        text => Ok(text.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shop::store::MemoryStore;

    #[test]
    fn test_empty_mailbox() {
        let store = MemoryStore::new();
        assert!(Mailbox::load(&store).unwrap().is_empty());
    }

    #[test]
    fn test_send_then_reply_newest_first() {
        let mut store = MemoryStore::new();
        let sent = Mailbox::send(&mut store, "ravi", "p_abc1234", "  Size L? ").unwrap();
        assert_eq!(sent.text, "Size L?");
        assert_eq!(sent.pid.as_deref(), Some("p_abc1234"));

        let reply = Mailbox::reply(&mut store, "itszflame", &sent.id, "Yes").unwrap();
        assert_eq!(reply.from, "admin(itszflame)");
        assert_eq!(reply.to.as_deref(), Some("ravi"));
        assert!(reply.is_reply());

        let messages = Mailbox::load(&store).unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].id, reply.id);
        assert_eq!(messages[1].id, sent.id);
    }

    #[test]
    fn test_blank_message_rejected() {
        let mut store = MemoryStore::new();
        assert!(matches!(
            Mailbox::send(&mut store, "ravi", "p_1", "   "),
            Err(ShopError::EmptyMessage)
        ));
        assert!(matches!(
            Mailbox::reply(&mut store, "itszflame", "missing", "hi"),
            Err(ShopError::MessageNotFound(_))
        ));
    }

    #[test]
    fn test_timestamp_is_epoch_millis_on_disk() {
        let json = r#"[{"id":"p_1","from":"ravi","text":"hi","pid":"p_2","at":1700000000123}]"#;
        let messages: Vec<Message> = serde_json::from_str(json).unwrap();
        assert_eq!(messages[0].at.timestamp_millis(), 1_700_000_000_123);
        assert!(serde_json::to_string(&messages).unwrap().contains("1700000000123"));
    }
}
