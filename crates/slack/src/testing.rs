use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::api::{SlackApi, SlackApiError};
use crate::blocks::ModalView;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SentCall {
    PostMessage { channel: String, text: String },
    OpenView { trigger_id: String, private_metadata: String },
}

/// Records every call; failures are scripted per channel or for all views.
#[derive(Default)]
pub struct FakeSlackApi {
    calls: Mutex<Vec<SentCall>>,
    view_error: Option<String>,
    channel_errors: HashMap<String, String>,
    names: HashMap<String, String>,
}

impl FakeSlackApi {
    pub fn failing_views(mut self, error: &str) -> Self {
        self.view_error = Some(error.to_owned());
        self
    }

    pub fn failing_channel(mut self, channel: &str, error: &str) -> Self {
        self.channel_errors.insert(channel.to_owned(), error.to_owned());
        self
    }

    pub fn with_name(mut self, user_id: &str, name: &str) -> Self {
        self.names.insert(user_id.to_owned(), name.to_owned());
        self
    }

    pub fn calls(&self) -> Vec<SentCall> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }

    /// Successful and failed `chat.postMessage` calls as `(channel, text)`.
    pub fn messages(&self) -> Vec<(String, String)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                SentCall::PostMessage { channel, text } => Some((channel, text)),
                SentCall::OpenView { .. } => None,
            })
            .collect()
    }

    fn push(&self, call: SentCall) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }
}

#[async_trait]
impl SlackApi for FakeSlackApi {
    async fn post_message(&self, channel: &str, text: &str) -> Result<(), SlackApiError> {
        self.push(SentCall::PostMessage { channel: channel.to_owned(), text: text.to_owned() });
        match self.channel_errors.get(channel) {
            Some(error) => Err(SlackApiError::Api {
                method: "chat.postMessage".to_owned(),
                error: error.clone(),
            }),
            None => Ok(()),
        }
    }

    async fn open_view(&self, trigger_id: &str, view: &ModalView) -> Result<(), SlackApiError> {
        self.push(SentCall::OpenView {
            trigger_id: trigger_id.to_owned(),
            private_metadata: view.private_metadata.clone(),
        });
        match &self.view_error {
            Some(error) => {
                Err(SlackApiError::Api { method: "views.open".to_owned(), error: error.clone() })
            }
            None => Ok(()),
        }
    }

    async fn user_name(&self, user_id: &str) -> Result<Option<String>, SlackApiError> {
        Ok(self.names.get(user_id).cloned())
    }
}
