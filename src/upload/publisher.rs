//! Publisher seam.

use async_trait::async_trait;

use crate::error::Result;
use crate::upload::staging::StagedMedia;

/// Identifier the chat platform assigns to a published message.
pub type MessageId = i64;

/// Sends messages to the target chat.
///
/// Media calls take staged files by value; their open handles are released
/// when the call returns, whatever the outcome.
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Send a plain text message.
    async fn send_text(&self, text: &str) -> Result<MessageId>;

    /// Send one file with its optional caption.
    async fn send_single(&self, media: StagedMedia) -> Result<MessageId>;

    /// Send several files as one grouped message.
    ///
    /// Returns one message id per file, in submission order. Callers treat
    /// any other length as a failure of the whole batch.
    async fn send_batch(&self, media: Vec<StagedMedia>) -> Result<Vec<MessageId>>;
}
