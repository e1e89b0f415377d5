//! Google Sheets recognition log.
//!
//! Authenticates as a service account (RS256 JWT bearer grant), keeps the
//! access token cached, and appends one row per kudos to the first worksheet.

pub mod client;
pub mod credentials;
pub mod error;
pub mod log;
pub mod token;

pub use client::{SheetValues, SheetsClient};
pub use credentials::ServiceAccountKey;
pub use error::SheetsError;
pub use log::{connect, recognition_log, SheetsReadiness, SheetsRecognitionLog};
