use std::sync::Arc;

use chrono::Local;
use kudos_core::{RecognitionLog, RecognitionRecord};
use tracing::{error, info, warn};

use crate::{api::SlackApi, events::EventContext, submission::KudosPost};

pub const NOT_IN_CHANNEL_ERROR: &str = "not_in_channel";
pub const MISSING_CHANNEL_MESSAGE: &str = "Please use the command in a channel to give kudos.";
pub const SUBMIT_FAILED_MESSAGE: &str =
    "Sorry, there was an error submitting your kudos. Please try again.";

pub fn not_in_channel_message(channel_id: &str) -> String {
    format!("I need to be invited to the channel first. Please invite me to <#{channel_id}> and try again.")
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Posted { logged: bool },
    MissingChannel,
    NotInChannel,
    Failed,
}

/// Posts accepted kudos and appends them to the recognition log. Runs after
/// the submission has been acknowledged, so every failure ends up as a DM.
pub struct KudosDelivery {
    api: Arc<dyn SlackApi>,
    log: Arc<dyn RecognitionLog>,
}

impl KudosDelivery {
    pub fn new(api: Arc<dyn SlackApi>, log: Arc<dyn RecognitionLog>) -> Self {
        Self { api, log }
    }

    pub async fn deliver(&self, post: &KudosPost, ctx: &EventContext) -> DeliveryOutcome {
        if post.channel_id.is_empty() {
            self.notify(&post.sender_id, MISSING_CHANNEL_MESSAGE, ctx).await;
            return DeliveryOutcome::MissingChannel;
        }

        if let Err(post_error) = self.api.post_message(&post.channel_id, &post.text).await {
            if post_error.slack_error() == Some(NOT_IN_CHANNEL_ERROR) {
                warn!(
                    event_name = "slack.kudos.not_in_channel",
                    correlation_id = %ctx.correlation_id,
                    channel_id = %post.channel_id,
                    "bot is not a member of the target channel"
                );
                self.notify(&post.sender_id, &not_in_channel_message(&post.channel_id), ctx).await;
                return DeliveryOutcome::NotInChannel;
            }

            error!(
                event_name = "slack.kudos.post_failed",
                correlation_id = %ctx.correlation_id,
                channel_id = %post.channel_id,
                error = %post_error,
                "failed to post kudos"
            );
            self.notify(&post.sender_id, SUBMIT_FAILED_MESSAGE, ctx).await;
            return DeliveryOutcome::Failed;
        }

        info!(
            event_name = "slack.kudos.posted",
            correlation_id = %ctx.correlation_id,
            channel_id = %post.channel_id,
            recipient_id = %post.recipient_id,
            recognition = %post.recognition.key,
            "posted kudos"
        );

        DeliveryOutcome::Posted { logged: self.record(post, ctx).await }
    }

    async fn record(&self, post: &KudosPost, ctx: &EventContext) -> bool {
        if !self.log.is_enabled() {
            return false;
        }

        let record = RecognitionRecord {
            recipient_name: self.lookup_name(&post.recipient_id, ctx).await,
            recipient_id: post.recipient_id.clone(),
            recognition_type: post.recognition.key.clone(),
            message: post.content.clone(),
            sender_name: self.lookup_name(&post.sender_id, ctx).await,
            sender_id: post.sender_id.clone(),
            channel_id: post.channel_id.clone(),
            recorded_at: Local::now(),
        };

        match self.log.record(&record).await {
            Ok(()) => true,
            Err(log_error) => {
                warn!(
                    event_name = "kudos.audit.record_failed",
                    correlation_id = %ctx.correlation_id,
                    error = %log_error,
                    "failed to log recognition"
                );
                false
            }
        }
    }

    async fn lookup_name(&self, user_id: &str, ctx: &EventContext) -> Option<String> {
        match self.api.user_name(user_id).await {
            Ok(name) => name,
            Err(lookup_error) => {
                warn!(
                    event_name = "slack.users.lookup_failed",
                    correlation_id = %ctx.correlation_id,
                    user_id,
                    error = %lookup_error,
                    "failed to resolve user name"
                );
                None
            }
        }
    }

    async fn notify(&self, user_id: &str, text: &str, ctx: &EventContext) {
        if let Err(notify_error) = self.api.post_message(user_id, text).await {
            error!(
                event_name = "slack.kudos.notify_failed",
                correlation_id = %ctx.correlation_id,
                user_id,
                error = %notify_error,
                "failed to DM the sender"
            );
        }
    }
}
