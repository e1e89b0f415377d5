use std::collections::BTreeMap;

use kudos_core::{
    prepare_kudos, MentionError, MessageComposer, Recognition, RecognitionCatalog,
    RichTextDocument,
};
use serde_json::{json, Value};
use tracing::debug;

use crate::blocks::{
    MESSAGE_BLOCK, MESSAGE_INPUT, RECIPIENT_BLOCK, RECIPIENT_INPUT, RECOGNITION_TYPE_BLOCK,
    RECOGNITION_TYPE_SELECT,
};

/// The parts of a `view_submission` payload the kudos flow reads. Missing
/// fields come through as empty strings or `Value::Null`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ViewSubmission {
    pub callback_id: String,
    pub user_id: String,
    pub channel_id: String,
    pub recipient: Value,
    pub recognition_key: Option<String>,
    pub message: Value,
}

impl ViewSubmission {
    pub fn from_payload(payload: &Value) -> Self {
        let view = payload.get("view").unwrap_or(&Value::Null);
        let values = view.pointer("/state/values").unwrap_or(&Value::Null);

        Self {
            callback_id: string_at(view, "/callback_id"),
            user_id: string_at(payload, "/user/id"),
            channel_id: string_at(view, "/private_metadata"),
            recipient: field(values, RECIPIENT_BLOCK, RECIPIENT_INPUT),
            recognition_key: field(values, RECOGNITION_TYPE_BLOCK, RECOGNITION_TYPE_SELECT)
                .pointer("/selected_option/value")
                .and_then(Value::as_str)
                .map(str::to_owned),
            message: field(values, MESSAGE_BLOCK, MESSAGE_INPUT),
        }
    }
}

fn string_at(value: &Value, pointer: &str) -> String {
    value.pointer(pointer).and_then(Value::as_str).unwrap_or_default().trim().to_owned()
}

fn field(values: &Value, block_id: &str, action_id: &str) -> Value {
    values.get(block_id).and_then(|block| block.get(action_id)).cloned().unwrap_or(Value::Null)
}

/// A validated kudos ready to be posted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KudosPost {
    pub channel_id: String,
    pub sender_id: String,
    pub recipient_id: String,
    pub recognition: Recognition,
    pub content: String,
    pub text: String,
}

pub struct SubmissionProcessor {
    composer: MessageComposer,
    catalog: RecognitionCatalog,
}

impl SubmissionProcessor {
    pub fn new(composer: MessageComposer, catalog: RecognitionCatalog) -> Self {
        Self { composer, catalog }
    }

    /// Validates the recipient, then renders and composes the post. The
    /// message field is only rendered once the recipient is accepted.
    pub fn process(&self, submission: &ViewSubmission) -> Result<KudosPost, MentionError> {
        let recipient = RichTextDocument::from_field(&submission.recipient);
        let message = RichTextDocument::from_field(&submission.message);
        let recognition = submission
            .recognition_key
            .as_deref()
            .map(|key| self.catalog.lookup(key))
            .unwrap_or_else(Recognition::fallback);

        let prepared =
            prepare_kudos(&self.composer, &recipient, &message, &recognition, &submission.user_id)?;

        if message.is_empty() {
            debug!(event_name = "slack.kudos.empty_message", "kudos submitted without a message");
        }
        let unknown_node_count = recipient.unknown_node_count() + message.unknown_node_count();
        if unknown_node_count > 0 {
            debug!(
                event_name = "slack.kudos.unknown_nodes_skipped",
                unknown_node_count, "skipped unrecognised rich text nodes"
            );
        }

        Ok(KudosPost {
            channel_id: submission.channel_id.clone(),
            sender_id: submission.user_id.clone(),
            recipient_id: prepared.recipient_id,
            recognition,
            content: prepared.content,
            text: prepared.text,
        })
    }
}

/// Field errors keyed by block id, shown inline by Slack.
pub fn field_errors(error: &MentionError) -> BTreeMap<String, String> {
    BTreeMap::from([(RECIPIENT_BLOCK.to_owned(), error.field_message())])
}

/// Response body that keeps the modal open and displays `errors`.
pub fn view_errors_response(errors: &BTreeMap<String, String>) -> Value {
    json!({ "response_action": "errors", "errors": errors })
}
