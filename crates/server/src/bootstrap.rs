use std::sync::Arc;

use axum::Router;
use chrono::Utc;
use kudos_core::config::{AppConfig, ConfigError, LoadOptions};
use kudos_core::MessageComposer;
use kudos_slack::{
    api::{SlackApi, SlackApiError, WebApiClient},
    delivery::KudosDelivery,
    events::kudos_dispatcher,
    signature::RequestVerifier,
};
use thiserror::Error;
use tracing::info;

use crate::{
    deliveries::DeliveryQueue,
    health::{self, HealthState},
    ingress::{self, IngressState},
};

pub struct Application {
    pub config: AppConfig,
    pub deliveries: DeliveryQueue,
    ingress: IngressState,
    health: HealthState,
}

impl Application {
    pub fn router(&self) -> Router {
        ingress::router(self.ingress.clone()).merge(health::router(self.health.clone()))
    }

    pub fn sheets_enabled(&self) -> bool {
        self.health.sheets_enabled
    }
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("slack client setup failed: {0}")]
    Slack(#[from] SlackApiError),
}

pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let api: Arc<dyn SlackApi> = Arc::new(WebApiClient::new(config.slack.bot_token.clone())?);
    let recognition_log = kudos_sheets::recognition_log(&config.sheets).await;
    let sheets_enabled = recognition_log.is_enabled();
    info!(
        event_name = "system.bootstrap.recognition_log",
        correlation_id = "bootstrap",
        sheets_enabled,
        "recognition log initialized"
    );

    let dispatcher = kudos_dispatcher(
        api.clone(),
        MessageComposer::new(config.recognition.default_emoji.clone()),
        config.recognition.catalog.clone(),
    );
    let deliveries = DeliveryQueue::new(KudosDelivery::new(api, recognition_log));
    let ingress = IngressState::new(
        RequestVerifier::new(config.slack.signing_secret.clone()),
        dispatcher,
        deliveries.clone(),
    );

    Ok(Application {
        config,
        deliveries,
        ingress,
        health: HealthState { sheets_enabled, started_at: Utc::now() },
    })
}

#[cfg(test)]
mod tests {
    use kudos_core::config::{ConfigOverrides, LoadOptions};

    use crate::bootstrap::bootstrap;

    fn overrides() -> ConfigOverrides {
        ConfigOverrides {
            slack_bot_token: Some("xoxb-test".to_string()),
            slack_signing_secret: Some("signing-secret".to_string()),
            sheets_enabled: Some(false),
            ..ConfigOverrides::default()
        }
    }

    #[tokio::test]
    async fn bootstrap_fails_fast_without_signing_secret() {
        let result = bootstrap(LoadOptions {
            overrides: ConfigOverrides {
                slack_signing_secret: Some("   ".to_string()),
                ..overrides()
            },
            ..LoadOptions::default()
        })
        .await;

        let message = result.err().expect("bootstrap should fail").to_string();
        assert!(message.contains("slack.signing_secret"));
    }

    #[tokio::test]
    async fn bootstrap_with_sheets_disabled_runs_without_recognition_log() {
        let app = bootstrap(LoadOptions { overrides: overrides(), ..LoadOptions::default() })
            .await
            .expect("bootstrap should succeed with valid overrides");

        assert!(!app.sheets_enabled());
        assert_eq!(app.config.server.port, 3000);
        let _router = app.router();
    }
}
