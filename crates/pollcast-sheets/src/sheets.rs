//! Google Sheets API v4 client for the vote table.
//! Docs: <https://developers.google.com/sheets/api/reference/rest/v4/spreadsheets.values>

use async_trait::async_trait;
use pollcast_core::{
    config::SheetsConfig, error::PollcastError, event::VoteRecord, traits::VoteLedger,
};
use serde::Deserialize;
use tracing::{debug, info};

use crate::plan::{plan_write, SheetWrite};

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

/// Vote ledger backed by a Google spreadsheet.
pub struct GoogleSheetsLedger {
    config: SheetsConfig,
    client: reqwest::Client,
}

impl GoogleSheetsLedger {
    pub fn new(config: SheetsConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    /// `A1`-notation range, prefixed with the tab when one is configured.
    fn range(&self, cells: &str) -> String {
        match self.config.tab.as_deref() {
            Some(tab) if !tab.is_empty() => format!("{tab}!{cells}"),
            _ => cells.to_string(),
        }
    }

    fn values_url(&self, range: &str) -> String {
        format!(
            "{}/spreadsheets/{}/values/{}",
            self.config.api_base.trim_end_matches('/'),
            self.config.spreadsheet_id,
            urlencoding::encode(range)
        )
    }

    async fn read_table(&self) -> Result<Vec<Vec<String>>, PollcastError> {
        let url = self.values_url(&self.range("A:C"));
        let resp = self
            .client
            .get(&url)
            .bearer_auth(&self.config.access_token)
            .send()
            .await
            .map_err(|e| PollcastError::Ledger(format!("sheets read failed: {e}")))?;
        let resp = check_status(resp, "read").await?;

        let range: ValueRange = resp
            .json()
            .await
            .map_err(|e| PollcastError::Ledger(format!("sheets read parse failed: {e}")))?;
        Ok(range.values)
    }

    async fn write(&self, write: SheetWrite) -> Result<(), PollcastError> {
        let req = match write {
            SheetWrite::Update { row, values } => {
                let url = self.values_url(&self.range(&format!("A{row}:C{row}")));
                debug!("sheets: update row {row}");
                self.client
                    .put(url)
                    .query(&[("valueInputOption", "RAW")])
                    .json(&serde_json::json!({ "values": [values] }))
            }
            SheetWrite::Append { values } => {
                let url = format!("{}:append", self.values_url(&self.range("A:C")));
                debug!("sheets: append row for {}", values[1]);
                self.client
                    .post(url)
                    .query(&[
                        ("valueInputOption", "RAW"),
                        ("insertDataOption", "INSERT_ROWS"),
                    ])
                    .json(&serde_json::json!({ "values": [values] }))
            }
        };

        let resp = req
            .bearer_auth(&self.config.access_token)
            .send()
            .await
            .map_err(|e| PollcastError::Ledger(format!("sheets write failed: {e}")))?;
        check_status(resp, "write").await?;
        Ok(())
    }
}

async fn check_status(
    resp: reqwest::Response,
    action: &str,
) -> Result<reqwest::Response, PollcastError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(PollcastError::Ledger(format!(
        "sheets {action} returned {status}: {body}"
    )))
}

#[async_trait]
impl VoteLedger for GoogleSheetsLedger {
    fn name(&self) -> &str {
        "google-sheets"
    }

    async fn record(&self, record: &VoteRecord) -> Result<(), PollcastError> {
        let rows = self.read_table().await?;
        match plan_write(&rows, record) {
            Some(write) => {
                self.write(write).await?;
                info!(
                    "sheets: {} → {}",
                    record.voter,
                    record.choice.as_deref().unwrap_or("(cleared)")
                );
            }
            None => debug!("sheets: no row to clear for {}", record.voter),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(tab: Option<&str>) -> SheetsConfig {
        SheetsConfig {
            enabled: true,
            spreadsheet_id: "sheet-1".into(),
            access_token: "token".into(),
            tab: tab.map(str::to_string),
            api_base: "https://sheets.googleapis.com/v4/".into(),
        }
    }

    #[test]
    fn test_range_without_tab() {
        let ledger = GoogleSheetsLedger::new(config(None));
        assert_eq!(ledger.range("A:C"), "A:C");
        assert_eq!(
            ledger.values_url(&ledger.range("A:C")),
            "https://sheets.googleapis.com/v4/spreadsheets/sheet-1/values/A%3AC"
        );
    }

    #[test]
    fn test_range_with_tab() {
        let ledger = GoogleSheetsLedger::new(config(Some("Team Votes")));
        assert_eq!(ledger.range("A2:C2"), "Team Votes!A2:C2");
        assert!(ledger
            .values_url(&ledger.range("A2:C2"))
            .ends_with("/values/Team%20Votes%21A2%3AC2"));
    }

    #[test]
    fn test_empty_tab_is_ignored() {
        let ledger = GoogleSheetsLedger::new(config(Some("")));
        assert_eq!(ledger.range("A:C"), "A:C");
    }

    #[test]
    fn test_value_range_without_values() {
        let range: ValueRange =
            serde_json::from_str(r#"{"range": "Sheet1!A1:C1000", "majorDimension": "ROWS"}"#)
                .unwrap();
        assert!(range.values.is_empty());
    }

    #[test]
    fn test_value_range_ragged_rows() {
        let range: ValueRange = serde_json::from_str(
            r#"{"values": [["Timestamp", "Name", "Choice"], ["2024-05-01 09:00:00", "alice"]]}"#,
        )
        .unwrap();
        assert_eq!(range.values.len(), 2);
        assert_eq!(range.values[1].len(), 2);
    }
}
