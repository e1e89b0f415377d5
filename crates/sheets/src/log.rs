use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use kudos_core::config::SheetsConfig;
use kudos_core::{NoopRecognitionLog, RecognitionLog, RecognitionLogError, RecognitionRecord};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::client::{SheetValues, SheetsClient};
use crate::credentials::ServiceAccountKey;
use crate::error::SheetsError;
use crate::token::TokenProvider;

/// Appends recognitions to a Google Sheet, one row per kudos.
pub struct SheetsRecognitionLog<V> {
    values: V,
    headers: Vec<String>,
    timestamp_format: String,
    auto_create_headers: bool,
    headers_checked: Mutex<bool>,
}

impl<V> SheetsRecognitionLog<V>
where
    V: SheetValues,
{
    pub fn new(values: V, config: &SheetsConfig) -> Self {
        Self {
            values,
            headers: config.headers.clone(),
            timestamp_format: config.timestamp_format.clone(),
            auto_create_headers: config.auto_create_headers,
            headers_checked: Mutex::new(false),
        }
    }

    /// Writes the header row when row 1 is empty. Checked once per process;
    /// a failed check is retried on the next call.
    pub async fn ensure_headers(&self) -> Result<(), SheetsError> {
        if !self.auto_create_headers {
            return Ok(());
        }

        let mut checked = self.headers_checked.lock().await;
        if *checked {
            return Ok(());
        }

        let existing = self.values.first_row().await?;
        if existing.iter().all(|cell| cell.trim().is_empty()) {
            info!(
                event_name = "sheets.headers.created",
                columns = self.headers.len(),
                "adding header row to recognition sheet"
            );
            self.values.append_row(&self.headers).await?;
        }
        *checked = true;
        Ok(())
    }
}

#[async_trait]
impl<V> RecognitionLog for SheetsRecognitionLog<V>
where
    V: SheetValues,
{
    fn is_enabled(&self) -> bool {
        true
    }

    async fn record(&self, record: &RecognitionRecord) -> Result<(), RecognitionLogError> {
        self.ensure_headers().await?;
        let row = record.to_row(self.headers.as_slice(), &self.timestamp_format);
        self.values.append_row(&row).await?;
        info!(
            event_name = "sheets.recognition.logged",
            recipient_id = %record.recipient_id,
            recognition_type = %record.recognition_type,
            "logged recognition to sheet"
        );
        Ok(())
    }
}

/// Whether the configured sheet can be written to, judged without network
/// access.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SheetsReadiness {
    Disabled,
    MissingSpreadsheetId,
    MissingCredentials(PathBuf),
    InvalidCredentials(String),
    Ready { spreadsheet_id: String, client_email: String },
}

impl SheetsReadiness {
    pub fn check(config: &SheetsConfig) -> Self {
        if !config.enabled {
            return Self::Disabled;
        }
        let Some(spreadsheet_id) = config.active_spreadsheet_id() else {
            return Self::MissingSpreadsheetId;
        };
        if !config.credentials_path.exists() {
            return Self::MissingCredentials(config.credentials_path.clone());
        }

        match ServiceAccountKey::from_file(&config.credentials_path)
            .and_then(|key| key.signer().map(|_| key))
        {
            Ok(key) => Self::Ready {
                spreadsheet_id: spreadsheet_id.to_owned(),
                client_email: key.client_email,
            },
            Err(error) => Self::InvalidCredentials(error.to_string()),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready { .. })
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Disabled => "sheets logging is disabled".to_owned(),
            Self::MissingSpreadsheetId => {
                "GOOGLE_SHEET_ID / sheets.spreadsheet_id is not set".to_owned()
            }
            Self::MissingCredentials(path) => {
                format!("credentials file not found at {}", path.display())
            }
            Self::InvalidCredentials(reason) => format!("credentials are unusable: {reason}"),
            Self::Ready { spreadsheet_id, client_email } => {
                format!("logging to sheet {spreadsheet_id} as {client_email}")
            }
        }
    }
}

/// Builds a live sheets client for `config`.
pub fn connect(config: &SheetsConfig) -> Result<SheetsRecognitionLog<SheetsClient>, SheetsError> {
    let spreadsheet_id = config
        .active_spreadsheet_id()
        .ok_or_else(|| SheetsError::Credentials("spreadsheet id is not configured".to_owned()))?;
    let key = ServiceAccountKey::from_file(&config.credentials_path)?;
    let http = SheetsClient::http_client()?;
    let tokens = TokenProvider::new(http.clone(), key.signer()?);
    let client = SheetsClient::new(http, spreadsheet_id, tokens);
    Ok(SheetsRecognitionLog::new(client, config))
}

/// The recognition log the bot runs with. Falls back to a no-op log, with a
/// warning, whenever the sheet cannot be used.
pub async fn recognition_log(config: &SheetsConfig) -> Arc<dyn RecognitionLog> {
    let readiness = SheetsReadiness::check(config);
    match &readiness {
        SheetsReadiness::Ready { .. } => {}
        SheetsReadiness::Disabled => {
            info!(event_name = "sheets.disabled", "recognition logging disabled by config");
            return Arc::new(NoopRecognitionLog);
        }
        _ => {
            warn!(
                event_name = "sheets.disabled",
                reason = %readiness.describe(),
                "recognition logging disabled"
            );
            return Arc::new(NoopRecognitionLog);
        }
    }

    let log = match connect(config) {
        Ok(log) => log,
        Err(error) => {
            warn!(event_name = "sheets.disabled", error = %error, "recognition logging disabled");
            return Arc::new(NoopRecognitionLog);
        }
    };

    if let Err(error) = log.ensure_headers().await {
        warn!(
            event_name = "sheets.headers.check_failed",
            error = %error,
            "could not check the header row, will retry on first kudos"
        );
    }
    info!(event_name = "sheets.enabled", readiness = %readiness.describe(), "recognition logging enabled");
    Arc::new(log)
}
