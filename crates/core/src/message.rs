use crate::errors::MentionError;
use crate::recognition::Recognition;
use crate::richtext::{extract, resolve_recipient, RichTextDocument};

pub const DEFAULT_LEAD_EMOJI: &str = "👏";

/// Fills the kudos template. Every field is always emitted; empty content
/// renders as an empty line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MessageComposer {
    lead_emoji: String,
}

impl Default for MessageComposer {
    fn default() -> Self {
        Self::new(DEFAULT_LEAD_EMOJI)
    }
}

impl MessageComposer {
    pub fn new(lead_emoji: impl Into<String>) -> Self {
        Self { lead_emoji: lead_emoji.into() }
    }

    pub fn compose(
        &self,
        recipient_id: &str,
        recognition: &Recognition,
        content: &str,
        sender_id: &str,
    ) -> String {
        let lead = &self.lead_emoji;
        format!(
            "{lead} *Thanks <@{recipient_id}> for being a {title} {emoji} * {lead}\n\n\
             *Message:*\n{content}\n\n\
             *From:* <@{sender_id}>\n",
            title = recognition.title,
            emoji = recognition.emoji,
        )
    }
}

/// [`MessageComposer::compose`] with the default lead emoji.
pub fn compose(
    recipient_id: &str,
    recognition: &Recognition,
    content: &str,
    sender_id: &str,
) -> String {
    MessageComposer::default().compose(recipient_id, recognition, content, sender_id)
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PreparedKudos {
    pub recipient_id: String,
    pub content: String,
    pub text: String,
}

/// Validates the recipient field, then extracts and composes the message.
/// The message document is never rendered when validation fails.
pub fn prepare_kudos(
    composer: &MessageComposer,
    recipient: &RichTextDocument,
    message: &RichTextDocument,
    recognition: &Recognition,
    sender_id: &str,
) -> Result<PreparedKudos, MentionError> {
    let recipient_id = resolve_recipient(recipient)?;
    let content = extract(message);
    let text = composer.compose(&recipient_id, recognition, &content, sender_id);
    Ok(PreparedKudos { recipient_id, content, text })
}
