use std::sync::Mutex;

use async_trait::async_trait;
use kudos_slack::api::{SlackApi, SlackApiError};
use kudos_slack::blocks::ModalView;

/// Accepts every call and remembers posted messages and opened views.
#[derive(Default)]
pub struct RecordingSlackApi {
    messages: Mutex<Vec<(String, String)>>,
    views: Mutex<Vec<ModalView>>,
}

impl RecordingSlackApi {
    pub fn messages(&self) -> Vec<(String, String)> {
        self.messages.lock().map(|messages| messages.clone()).unwrap_or_default()
    }

    pub fn views(&self) -> Vec<ModalView> {
        self.views.lock().map(|views| views.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl SlackApi for RecordingSlackApi {
    async fn post_message(&self, channel: &str, text: &str) -> Result<(), SlackApiError> {
        if let Ok(mut messages) = self.messages.lock() {
            messages.push((channel.to_owned(), text.to_owned()));
        }
        Ok(())
    }

    async fn open_view(&self, _trigger_id: &str, view: &ModalView) -> Result<(), SlackApiError> {
        if let Ok(mut views) = self.views.lock() {
            views.push(view.clone());
        }
        Ok(())
    }

    async fn user_name(&self, _user_id: &str) -> Result<Option<String>, SlackApiError> {
        Ok(None)
    }
}
