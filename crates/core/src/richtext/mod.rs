//! Slack rich text to mrkdwn.
//!
//! The transformation is pure: a [`RichTextDocument`] goes in, a string (or a
//! validated recipient id) comes out. Unknown block and element tags are
//! skipped without error; malformed or absent documents read as empty.

mod block;
mod document;
mod inline;
mod mentions;

use serde_json::Value;

pub use block::{render_block, render_section};
pub use document::{
    Block, InlineElement, List, ListStyle, RichTextDocument, Section, TextStyle, MAX_LIST_INDENT,
};
pub use inline::format_inline;
pub use mentions::{collect_mentions, resolve_recipient, MentionSummary};

/// Renders every top-level block in order and trims the result.
pub fn extract(document: &RichTextDocument) -> String {
    let rendered: String = document.blocks.iter().map(render_block).collect();
    rendered.trim().to_owned()
}

/// [`extract`] over the raw state of a `rich_text_input` field.
pub fn extract_field(field: &Value) -> String {
    extract(&RichTextDocument::from_field(field))
}
