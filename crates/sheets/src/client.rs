use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::SheetsError;
use crate::token::{bearer, TokenProvider};

pub const DEFAULT_SHEETS_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// Row-level access to the first worksheet of one spreadsheet.
#[async_trait]
pub trait SheetValues: Send + Sync {
    async fn first_row(&self) -> Result<Vec<String>, SheetsError>;
    async fn append_row(&self, row: &[String]) -> Result<(), SheetsError>;
}

pub struct SheetsClient {
    http: reqwest::Client,
    base_url: String,
    spreadsheet_id: String,
    tokens: TokenProvider,
}

impl SheetsClient {
    pub fn new(
        http: reqwest::Client,
        spreadsheet_id: impl Into<String>,
        tokens: TokenProvider,
    ) -> Self {
        Self {
            http,
            base_url: DEFAULT_SHEETS_BASE.to_owned(),
            spreadsheet_id: spreadsheet_id.into(),
            tokens,
        }
    }

    pub fn http_client() -> Result<reqwest::Client, SheetsError> {
        reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|error| SheetsError::Request(error.to_string()))
    }

    fn values_url(&self, range: &str) -> String {
        format!("{}/{}/values/{range}", self.base_url, self.spreadsheet_id)
    }
}

#[derive(Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

#[async_trait]
impl SheetValues for SheetsClient {
    async fn first_row(&self) -> Result<Vec<String>, SheetsError> {
        let token = self.tokens.access_token().await?;
        let response = self
            .http
            .get(self.values_url("A1:ZZ1"))
            .header(reqwest::header::AUTHORIZATION, bearer(&token))
            .send()
            .await
            .map_err(|error| SheetsError::Request(error.to_string()))?;

        let body = read_body(response).await?;
        let range: ValueRange = serde_json::from_str(&body)
            .map_err(|error| SheetsError::Request(format!("unreadable value range: {error}")))?;
        Ok(first_row_cells(range))
    }

    async fn append_row(&self, row: &[String]) -> Result<(), SheetsError> {
        let token = self.tokens.access_token().await?;
        let response = self
            .http
            .post(self.values_url("A1:append"))
            .query(&[("valueInputOption", "RAW"), ("insertDataOption", "INSERT_ROWS")])
            .header(reqwest::header::AUTHORIZATION, bearer(&token))
            .json(&json!({ "values": [row] }))
            .send()
            .await
            .map_err(|error| SheetsError::Request(error.to_string()))?;

        read_body(response).await.map(|_| ())
    }
}

async fn read_body(response: reqwest::Response) -> Result<String, SheetsError> {
    let status = response.status();
    let body = response.text().await.map_err(|error| SheetsError::Request(error.to_string()))?;
    if !status.is_success() {
        return Err(SheetsError::Rejected { status: status.as_u16(), body });
    }
    Ok(body)
}

fn first_row_cells(range: ValueRange) -> Vec<String> {
    range
        .values
        .into_iter()
        .next()
        .unwrap_or_default()
        .into_iter()
        .map(|cell| match cell {
            Value::String(text) => text,
            Value::Null => String::new(),
            other => other.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{first_row_cells, ValueRange};

    fn range(value: serde_json::Value) -> ValueRange {
        serde_json::from_value(value).expect("value range")
    }

    #[test]
    fn empty_sheet_has_no_first_row() {
        assert!(first_row_cells(range(json!({"range": "Sheet1!A1:ZZ1"}))).is_empty());
    }

    #[test]
    fn first_row_cells_are_stringified() {
        let cells = first_row_cells(range(json!({"values": [["Timestamp", 42, null]]})));
        assert_eq!(cells, vec!["Timestamp", "42", ""]);
    }
}
