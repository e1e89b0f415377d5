use std::{collections::BTreeMap, collections::HashMap, sync::Arc};

use async_trait::async_trait;
use kudos_core::{MessageComposer, RecognitionCatalog};
use serde_json::Value;
use thiserror::Error;
use tracing::info;

use crate::{
    api::SlackApi,
    blocks::KUDOS_CALLBACK_ID,
    commands::{
        parse_kudos_command, CommandParseError, CommandRouteError, CommandRouter,
        SlashCommandPayload,
    },
    submission::{field_errors, KudosPost, SubmissionProcessor, ViewSubmission},
};

#[derive(Clone, Debug, PartialEq)]
pub struct SlackEnvelope {
    pub envelope_id: String,
    pub event: SlackEvent,
}

#[derive(Clone, Debug, PartialEq)]
pub enum SlackEvent {
    SlashCommand(SlashCommandPayload),
    ViewSubmission(ViewSubmission),
    Unsupported { event_type: String },
}

impl SlackEvent {
    pub fn event_type(&self) -> SlackEventType {
        match self {
            Self::SlashCommand(_) => SlackEventType::SlashCommand,
            Self::ViewSubmission(_) => SlackEventType::ViewSubmission,
            Self::Unsupported { .. } => SlackEventType::Unsupported,
        }
    }

    /// Classifies the JSON `payload` field of an interaction request.
    pub fn from_interaction(payload: &Value) -> Self {
        match payload.get("type").and_then(Value::as_str) {
            Some("view_submission") => Self::ViewSubmission(ViewSubmission::from_payload(payload)),
            Some(other) => Self::Unsupported { event_type: other.to_owned() },
            None => Self::Unsupported { event_type: "unknown".to_owned() },
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum SlackEventType {
    SlashCommand,
    ViewSubmission,
    Unsupported,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventContext {
    pub correlation_id: String,
}

impl Default for EventContext {
    fn default() -> Self {
        Self { correlation_id: "unknown-correlation-id".to_owned() }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HandlerResult {
    /// Keep the modal open and show these errors, keyed by block id.
    ViewErrors(BTreeMap<String, String>),
    /// Close the modal; the post still has to be delivered.
    Accepted(KudosPost),
    Processed,
    Ignored,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EventHandlerError {
    #[error(transparent)]
    Parse(#[from] CommandParseError),
    #[error(transparent)]
    Route(#[from] CommandRouteError),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DispatchError {
    #[error(transparent)]
    Handler(#[from] EventHandlerError),
}

#[async_trait]
pub trait EventHandler: Send + Sync {
    fn event_type(&self) -> SlackEventType;
    async fn handle(
        &self,
        envelope: &SlackEnvelope,
        ctx: &EventContext,
    ) -> Result<HandlerResult, EventHandlerError>;
}

#[derive(Default)]
pub struct EventDispatcher {
    handlers: HashMap<SlackEventType, Arc<dyn EventHandler>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<H>(&mut self, handler: H)
    where
        H: EventHandler + 'static,
    {
        self.handlers.insert(handler.event_type(), Arc::new(handler));
    }

    pub async fn dispatch(
        &self,
        envelope: &SlackEnvelope,
        ctx: &EventContext,
    ) -> Result<HandlerResult, DispatchError> {
        let Some(handler) = self.handlers.get(&envelope.event.event_type()) else {
            return Ok(HandlerResult::Ignored);
        };

        handler.handle(envelope, ctx).await.map_err(DispatchError::from)
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }
}

pub fn kudos_dispatcher(
    api: Arc<dyn SlackApi>,
    composer: MessageComposer,
    catalog: RecognitionCatalog,
) -> EventDispatcher {
    let mut dispatcher = EventDispatcher::new();
    dispatcher.register(SlashCommandHandler::new(CommandRouter::new(api, catalog.clone())));
    dispatcher.register(ViewSubmissionHandler::new(SubmissionProcessor::new(composer, catalog)));
    dispatcher
}

pub struct SlashCommandHandler {
    router: CommandRouter,
}

impl SlashCommandHandler {
    pub fn new(router: CommandRouter) -> Self {
        Self { router }
    }
}

#[async_trait]
impl EventHandler for SlashCommandHandler {
    fn event_type(&self) -> SlackEventType {
        SlackEventType::SlashCommand
    }

    async fn handle(
        &self,
        envelope: &SlackEnvelope,
        ctx: &EventContext,
    ) -> Result<HandlerResult, EventHandlerError> {
        let SlackEvent::SlashCommand(payload) = &envelope.event else {
            return Ok(HandlerResult::Ignored);
        };

        let command = parse_kudos_command(payload)?;
        self.router.route(command, &ctx.correlation_id).await?;
        Ok(HandlerResult::Processed)
    }
}

pub struct ViewSubmissionHandler {
    processor: SubmissionProcessor,
}

impl ViewSubmissionHandler {
    pub fn new(processor: SubmissionProcessor) -> Self {
        Self { processor }
    }
}

#[async_trait]
impl EventHandler for ViewSubmissionHandler {
    fn event_type(&self) -> SlackEventType {
        SlackEventType::ViewSubmission
    }

    async fn handle(
        &self,
        envelope: &SlackEnvelope,
        ctx: &EventContext,
    ) -> Result<HandlerResult, EventHandlerError> {
        let SlackEvent::ViewSubmission(submission) = &envelope.event else {
            return Ok(HandlerResult::Ignored);
        };
        if submission.callback_id != KUDOS_CALLBACK_ID {
            return Ok(HandlerResult::Ignored);
        }

        match self.processor.process(submission) {
            Ok(post) => Ok(HandlerResult::Accepted(post)),
            Err(mention_error) => {
                info!(
                    event_name = "slack.kudos.recipient_rejected",
                    correlation_id = %ctx.correlation_id,
                    user_id = %submission.user_id,
                    reason = %mention_error,
                    "kudos submission re-prompted"
                );
                Ok(HandlerResult::ViewErrors(field_errors(&mention_error)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use kudos_core::{MessageComposer, RecognitionCatalog};
    use serde_json::json;

    use super::{
        kudos_dispatcher, EventContext, EventDispatcher, EventHandlerError, HandlerResult,
        SlackEnvelope, SlackEvent, SlackEventType,
    };
    use crate::{
        commands::{CommandParseError, SlashCommandPayload},
        submission::ViewSubmission,
        testing::FakeSlackApi,
    };

    fn dispatcher(api: Arc<FakeSlackApi>) -> super::EventDispatcher {
        kudos_dispatcher(api, MessageComposer::default(), RecognitionCatalog::default())
    }

    fn submission_payload(recipient_elements: serde_json::Value) -> serde_json::Value {
        json!({
            "type": "view_submission",
            "user": {"id": "U1"},
            "view": {
                "callback_id": "kudos_modal",
                "private_metadata": "C1",
                "state": {"values": {
                    "recipient_block": {"recipient_input": {
                        "type": "rich_text_input",
                        "rich_text_value": {"type": "rich_text", "elements": [
                            {"type": "rich_text_section", "elements": recipient_elements}
                        ]}
                    }},
                    "recognition_type_block": {"recognition_type_select": {
                        "selected_option": {"value": "silent_soldier"}
                    }}
                }}
            }
        })
    }

    fn envelope(event: SlackEvent) -> SlackEnvelope {
        SlackEnvelope { envelope_id: "env-1".to_owned(), event }
    }

    #[tokio::test]
    async fn dispatcher_routes_slash_commands() {
        let api = Arc::new(FakeSlackApi::default());
        let envelope = envelope(SlackEvent::SlashCommand(SlashCommandPayload {
            command: "/kudos".to_owned(),
            channel_id: "C1".to_owned(),
            user_id: "U1".to_owned(),
            trigger_id: "trigger".to_owned(),
            ..SlashCommandPayload::default()
        }));

        let result = dispatcher(api.clone())
            .dispatch(&envelope, &EventContext::default())
            .await
            .expect("dispatch");

        assert_eq!(result, HandlerResult::Processed);
        assert_eq!(api.calls().len(), 1);
    }

    #[tokio::test]
    async fn unsupported_slash_command_is_a_parse_error() {
        let envelope = envelope(SlackEvent::SlashCommand(SlashCommandPayload {
            command: "/quote".to_owned(),
            user_id: "U1".to_owned(),
            ..SlashCommandPayload::default()
        }));

        let error = dispatcher(Arc::new(FakeSlackApi::default()))
            .dispatch(&envelope, &EventContext::default())
            .await
            .expect_err("unsupported command");

        assert_eq!(
            error,
            super::DispatchError::Handler(EventHandlerError::Parse(
                CommandParseError::UnsupportedCommand("/quote".to_owned())
            ))
        );
    }

    #[tokio::test]
    async fn valid_submission_is_accepted() {
        let payload = submission_payload(json!([{"type": "user", "user_id": "U2"}]));
        let envelope = envelope(SlackEvent::from_interaction(&payload));

        let result = dispatcher(Arc::new(FakeSlackApi::default()))
            .dispatch(&envelope, &EventContext::default())
            .await
            .expect("dispatch");

        let HandlerResult::Accepted(post) = result else {
            panic!("expected accepted submission, got {result:?}");
        };
        assert_eq!(post.recipient_id, "U2");
        assert_eq!(post.channel_id, "C1");
        assert_eq!(post.recognition.title, "Silent Soldier");
    }

    #[tokio::test]
    async fn invalid_recipient_returns_view_errors() {
        let payload = submission_payload(json!([{"type": "text", "text": "nobody"}]));
        let envelope = envelope(SlackEvent::from_interaction(&payload));

        let result = dispatcher(Arc::new(FakeSlackApi::default()))
            .dispatch(&envelope, &EventContext::default())
            .await
            .expect("dispatch");

        let HandlerResult::ViewErrors(errors) = result else {
            panic!("expected view errors, got {result:?}");
        };
        assert_eq!(
            errors.get("recipient_block").map(String::as_str),
            Some("Please @mention the coworker you want to thank.")
        );
    }

    #[tokio::test]
    async fn submissions_for_other_modals_are_ignored() {
        let submission =
            ViewSubmission { callback_id: "other_modal".to_owned(), ..ViewSubmission::default() };

        let result = dispatcher(Arc::new(FakeSlackApi::default()))
            .dispatch(&envelope(SlackEvent::ViewSubmission(submission)), &EventContext::default())
            .await
            .expect("dispatch");

        assert_eq!(result, HandlerResult::Ignored);
    }

    #[tokio::test]
    async fn dispatcher_returns_ignored_when_no_handler_registered() {
        let event = SlackEvent::from_interaction(&json!({"type": "block_actions"}));
        assert_eq!(event.event_type(), SlackEventType::Unsupported);

        let result = EventDispatcher::new()
            .dispatch(&envelope(event), &EventContext::default())
            .await
            .expect("dispatch");

        assert_eq!(result, HandlerResult::Ignored);
    }

    #[test]
    fn kudos_dispatcher_registers_handlers() {
        assert_eq!(dispatcher(Arc::new(FakeSlackApi::default())).handler_count(), 2);
    }
}
