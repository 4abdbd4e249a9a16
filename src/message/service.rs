use std::sync::Arc;

use crate::{chat, message};

use super::model::{Message, MessageDto};
use super::repository::MessageRepository;

#[derive(Clone)]
pub struct MessageService {
    repository: Arc<MessageRepository>,
    max_text_len: usize,
}

impl MessageService {
    pub fn new(repository: MessageRepository, max_text_len: usize) -> Self {
        Self {
            repository: Arc::new(repository),
            max_text_len,
        }
    }
}

impl MessageService {
    /// Validates and appends. The log is append-only; nothing in this crate
    /// ever mutates or deletes a persisted message.
    pub async fn create(&self, message: Message) -> super::Result<Message> {
        validate_text(&message.text, self.max_text_len)?;

        let id = self.repository.insert(&message).await?;

        Ok(message.with_id(id))
    }

    pub async fn find_by_chat_id_and_params(
        &self,
        chat_id: &chat::Id,
        limit: Option<usize>,
        before: Option<i64>,
    ) -> super::Result<Vec<MessageDto>> {
        let result = match (limit, before) {
            (None, None) => self.repository.find_by_chat_id(chat_id).await?,
            (Some(limit), None) => {
                self.repository
                    .find_by_chat_id_limited(chat_id, limit)
                    .await?
            }
            (None, Some(before)) => {
                self.repository
                    .find_by_chat_id_before(chat_id, before)
                    .await?
            }
            (Some(limit), Some(before)) => {
                self.repository
                    .find_by_chat_id_limited_before(chat_id, limit, before)
                    .await?
            }
        };

        Ok(result.into_iter().map(MessageDto::from).collect())
    }
}

fn validate_text(text: &str, max_len: usize) -> super::Result<()> {
    if text.trim().is_empty() {
        return Err(message::Error::Validation(
            "message text is empty".to_owned(),
        ));
    }

    if text.chars().count() > max_len {
        return Err(message::Error::Validation(format!(
            "message text exceeds {max_len} characters"
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::validate_text;

    #[test]
    fn accepts_normal_text() {
        assert!(validate_text("Hello", 2000).is_ok());
    }

    #[test]
    fn rejects_empty_and_whitespace_text() {
        assert!(validate_text("", 2000).is_err());
        assert!(validate_text("   \t\n", 2000).is_err());
    }

    #[test]
    fn rejects_oversized_text() {
        let text = "x".repeat(11);
        assert!(validate_text(&text, 10).is_err());
        assert!(validate_text(&"x".repeat(10), 10).is_ok());
    }
}
