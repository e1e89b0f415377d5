use super::document::{Block, InlineElement, RichTextDocument};
use crate::errors::MentionError;

/// User mentions found in a document's sections, in document order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MentionSummary {
    pub count: usize,
    pub first_id: Option<String>,
    pub all_ids: Vec<String>,
}

impl MentionSummary {
    /// Exactly one mention resolves to the recipient.
    pub fn into_recipient(self) -> Result<String, MentionError> {
        match (self.count, self.first_id) {
            (1, Some(user_id)) => Ok(user_id),
            (0, _) | (_, None) => Err(MentionError::MissingMention),
            (count, _) => Err(MentionError::TooManyMentions(count)),
        }
    }
}

/// Lists, quotes and preformatted blocks are not searched.
pub fn collect_mentions(document: &RichTextDocument) -> MentionSummary {
    let all_ids: Vec<String> = document
        .blocks
        .iter()
        .filter_map(|block| match block {
            Block::Section(section) => Some(section),
            _ => None,
        })
        .flat_map(|section| section.elements.iter())
        .filter_map(|element| match element {
            InlineElement::UserMention { user_id } => Some(user_id.clone()),
            _ => None,
        })
        .collect();

    MentionSummary { count: all_ids.len(), first_id: all_ids.first().cloned(), all_ids }
}

pub fn resolve_recipient(document: &RichTextDocument) -> Result<String, MentionError> {
    collect_mentions(document).into_recipient()
}
