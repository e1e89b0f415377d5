use kudos_core::RecognitionLogError;
use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SheetsError {
    #[error("service account credentials: {0}")]
    Credentials(String),
    #[error("token exchange failed: {0}")]
    Auth(String),
    #[error("sheets request failed: {0}")]
    Request(String),
    #[error("sheets API returned HTTP {status}: {body}")]
    Rejected { status: u16, body: String },
}

impl From<SheetsError> for RecognitionLogError {
    fn from(error: SheetsError) -> Self {
        match error {
            SheetsError::Credentials(_) | SheetsError::Auth(_) => Self::Auth(error.to_string()),
            SheetsError::Request(_) => Self::Request(error.to_string()),
            SheetsError::Rejected { .. } => Self::Rejected(error.to_string()),
        }
    }
}
