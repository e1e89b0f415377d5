use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_HEADERS: [&str; 8] = [
    "Timestamp",
    "Recipient",
    "Recipient ID",
    "Recognition Type",
    "Message",
    "Sender",
    "Sender ID",
    "Channel ID",
];

pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One kudos, as appended to the recognition log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecognitionRecord {
    pub recipient_name: Option<String>,
    pub recipient_id: String,
    pub recognition_type: String,
    pub message: String,
    pub sender_name: Option<String>,
    pub sender_id: String,
    pub channel_id: String,
    pub recorded_at: DateTime<Local>,
}

impl RecognitionRecord {
    /// Value of the named column. Unknown headers yield an empty cell.
    pub fn cell(&self, header: &str, timestamp_format: &str) -> String {
        match header {
            "Timestamp" => self.recorded_at.format(timestamp_format).to_string(),
            "Recipient" => self.recipient_name.clone().unwrap_or_else(|| "Unknown".to_owned()),
            "Recipient ID" => self.recipient_id.clone(),
            "Recognition Type" => self.recognition_type.clone(),
            "Message" => self.message.clone(),
            "Sender" => self.sender_name.clone().unwrap_or_else(|| "Unknown".to_owned()),
            "Sender ID" => self.sender_id.clone(),
            "Channel ID" => self.channel_id.clone(),
            _ => String::new(),
        }
    }

    /// Lays the record out in header order.
    pub fn to_row<S: AsRef<str>>(&self, headers: &[S], timestamp_format: &str) -> Vec<String> {
        headers.iter().map(|header| self.cell(header.as_ref(), timestamp_format)).collect()
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum RecognitionLogError {
    #[error("recognition log authentication failed: {0}")]
    Auth(String),
    #[error("recognition log request failed: {0}")]
    Request(String),
    #[error("recognition log rejected the row: {0}")]
    Rejected(String),
}

#[async_trait]
pub trait RecognitionLog: Send + Sync {
    fn is_enabled(&self) -> bool;
    async fn record(&self, record: &RecognitionRecord) -> Result<(), RecognitionLogError>;
}

/// Used when the sheet is disabled or not configured.
#[derive(Clone, Debug, Default)]
pub struct NoopRecognitionLog;

#[async_trait]
impl RecognitionLog for NoopRecognitionLog {
    fn is_enabled(&self) -> bool {
        false
    }

    async fn record(&self, _record: &RecognitionRecord) -> Result<(), RecognitionLogError> {
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct InMemoryRecognitionLog {
    records: Arc<Mutex<Vec<RecognitionRecord>>>,
}

impl InMemoryRecognitionLog {
    pub fn records(&self) -> Vec<RecognitionRecord> {
        match self.records.lock() {
            Ok(records) => records.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

#[async_trait]
impl RecognitionLog for InMemoryRecognitionLog {
    fn is_enabled(&self) -> bool {
        true
    }

    async fn record(&self, record: &RecognitionRecord) -> Result<(), RecognitionLogError> {
        match self.records.lock() {
            Ok(mut records) => records.push(record.clone()),
            Err(poisoned) => poisoned.into_inner().push(record.clone()),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Local, TimeZone};

    use super::{
        InMemoryRecognitionLog, RecognitionLog, RecognitionRecord, DEFAULT_HEADERS,
        DEFAULT_TIMESTAMP_FORMAT,
    };

    fn record() -> RecognitionRecord {
        RecognitionRecord {
            recipient_name: Some("Ada Lovelace".to_owned()),
            recipient_id: "U12345".to_owned(),
            recognition_type: "Helping Hand (helping_hand)".to_owned(),
            message: "Great job on the project!".to_owned(),
            sender_name: None,
            sender_id: "U67890".to_owned(),
            channel_id: "C12345".to_owned(),
            recorded_at: Local
                .with_ymd_and_hms(2026, 3, 4, 5, 6, 7)
                .single()
                .expect("unambiguous local time"),
        }
    }

    #[test]
    fn row_follows_default_header_order() {
        let row = record().to_row(DEFAULT_HEADERS.as_slice(), DEFAULT_TIMESTAMP_FORMAT);
        assert_eq!(
            row,
            vec![
                "2026-03-04 05:06:07",
                "Ada Lovelace",
                "U12345",
                "Helping Hand (helping_hand)",
                "Great job on the project!",
                "Unknown",
                "U67890",
                "C12345",
            ]
        );
    }

    #[test]
    fn custom_headers_reorder_and_blank_unknown_columns() {
        let headers = vec!["Sender ID".to_owned(), "Team".to_owned(), "Timestamp".to_owned()];
        let row = record().to_row(headers.as_slice(), "%d/%m/%Y");
        assert_eq!(row, vec!["U67890", "", "04/03/2026"]);
    }

    #[tokio::test]
    async fn in_memory_log_keeps_records() {
        let log = InMemoryRecognitionLog::default();
        log.record(&record()).await.expect("in-memory record");
        assert!(log.is_enabled());
        assert_eq!(log.records().len(), 1);
        assert_eq!(log.records()[0].recipient_id, "U12345");
    }
}
