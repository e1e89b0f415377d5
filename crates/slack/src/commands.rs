use std::sync::Arc;

use kudos_core::RecognitionCatalog;
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::{
    api::{SlackApi, SlackApiError},
    blocks::kudos_modal,
};

pub const KUDOS_COMMAND: &str = "/kudos";
pub const NO_CHANNEL_MESSAGE: &str = "Please use this command in a channel to give kudos.";
pub const OPEN_FAILED_MESSAGE: &str =
    "Sorry, there was an error opening the kudos form. Please try again.";

/// Form fields Slack posts for a slash command. Only the ones the bot reads
/// are kept.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct SlashCommandPayload {
    pub command: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub channel_id: String,
    pub user_id: String,
    #[serde(default)]
    pub trigger_id: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KudosCommand {
    OpenForm { channel_id: String, user_id: String, trigger_id: String },
    OutsideChannel { user_id: String },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CommandOutcome {
    FormOpened,
    UserNotified(&'static str),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandParseError {
    #[error("unsupported slash command: {0}")]
    UnsupportedCommand(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandRouteError {
    #[error("could not notify the user: {0}")]
    Notify(#[from] SlackApiError),
}

pub fn parse_kudos_command(payload: &SlashCommandPayload) -> Result<KudosCommand, CommandParseError> {
    if payload.command.trim() != KUDOS_COMMAND {
        return Err(CommandParseError::UnsupportedCommand(payload.command.clone()));
    }

    let channel_id = payload.channel_id.trim();
    if channel_id.is_empty() {
        return Ok(KudosCommand::OutsideChannel { user_id: payload.user_id.clone() });
    }

    Ok(KudosCommand::OpenForm {
        channel_id: channel_id.to_owned(),
        user_id: payload.user_id.clone(),
        trigger_id: payload.trigger_id.clone(),
    })
}

pub struct CommandRouter {
    api: Arc<dyn SlackApi>,
    catalog: RecognitionCatalog,
}

impl CommandRouter {
    pub fn new(api: Arc<dyn SlackApi>, catalog: RecognitionCatalog) -> Self {
        Self { api, catalog }
    }

    pub async fn route(
        &self,
        command: KudosCommand,
        correlation_id: &str,
    ) -> Result<CommandOutcome, CommandRouteError> {
        match command {
            KudosCommand::OutsideChannel { user_id } => {
                self.api.post_message(&user_id, NO_CHANNEL_MESSAGE).await?;
                Ok(CommandOutcome::UserNotified(NO_CHANNEL_MESSAGE))
            }
            KudosCommand::OpenForm { channel_id, user_id, trigger_id } => {
                let view = kudos_modal(&channel_id, &self.catalog);
                match self.api.open_view(&trigger_id, &view).await {
                    Ok(()) => {
                        info!(
                            event_name = "slack.kudos.form_opened",
                            correlation_id,
                            channel_id = %channel_id,
                            user_id = %user_id,
                            "opened kudos form"
                        );
                        Ok(CommandOutcome::FormOpened)
                    }
                    Err(error) => {
                        warn!(
                            event_name = "slack.kudos.form_open_failed",
                            correlation_id,
                            error = %error,
                            "failed to open kudos form"
                        );
                        self.api.post_message(&user_id, OPEN_FAILED_MESSAGE).await?;
                        Ok(CommandOutcome::UserNotified(OPEN_FAILED_MESSAGE))
                    }
                }
            }
        }
    }
}
