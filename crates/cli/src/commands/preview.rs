use kudos_core::config::{AppConfig, LoadOptions};
use kudos_core::{prepare_kudos, MessageComposer, Recognition, RichTextDocument};
use serde_json::Value;

use super::CommandResult;

const COMMAND: &str = "preview";

/// Raw inputs for a dry-run kudos render.
#[derive(Debug, Clone)]
pub struct PreviewRequest {
    pub recipient_json: String,
    pub message_json: String,
    pub recognition_type: Option<String>,
    pub sender_id: String,
}

pub fn run(request: &PreviewRequest) -> CommandResult {
    // Preview works without Slack credentials; an unloadable config only
    // costs the custom catalog.
    let config = AppConfig::load(LoadOptions::default()).unwrap_or_default();
    run_with_config(&config, request)
}

pub fn run_with_config(config: &AppConfig, request: &PreviewRequest) -> CommandResult {
    let recipient = match parse_document("recipient", &request.recipient_json) {
        Ok(document) => document,
        Err(failure) => return failure,
    };
    let message = match parse_document("message", &request.message_json) {
        Ok(document) => document,
        Err(failure) => return failure,
    };

    let recognition = request
        .recognition_type
        .as_deref()
        .map(|key| config.recognition.catalog.lookup(key))
        .unwrap_or_else(Recognition::fallback);
    let composer = MessageComposer::new(config.recognition.default_emoji.clone());

    match prepare_kudos(&composer, &recipient, &message, &recognition, &request.sender_id) {
        Ok(prepared) => CommandResult::success(COMMAND, prepared.text),
        Err(error) => CommandResult::failure(COMMAND, "mention_validation", error.field_message(), 5),
    }
}

fn parse_document(field: &str, raw: &str) -> Result<RichTextDocument, CommandResult> {
    serde_json::from_str::<Value>(raw)
        .map(|value| RichTextDocument::from_field(&value))
        .map_err(|error| {
            CommandResult::failure(
                COMMAND,
                "invalid_input",
                format!("{field} is not valid JSON: {error}"),
                2,
            )
        })
}
