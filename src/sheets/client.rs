#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};

use super::{SheetsError, api_error};

/// A value written into a single cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    /// Text, interpreted according to the value input option.
    Text(String),
    /// A whole number.
    Number(i64),
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Number(value)
    }
}

/// A `ValueRange` as returned by `spreadsheets.values.get`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ValueRangeResponse {
    /// rows of cells; omitted entirely for an empty range
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

/// A `ValueRange` sent to `spreadsheets.values.update`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ValueRangeRequest<'a> {
    /// A1 range being written
    range:           &'a str,
    /// always `ROWS`
    major_dimension: &'static str,
    /// rows of cells
    values:          &'a [Vec<CellValue>],
}

/// Summary returned by `spreadsheets.values.update`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateValuesResponse {
    /// spreadsheet that was written
    pub spreadsheet_id:  String,
    /// range actually written, in A1 notation
    pub updated_range:   String,
    /// rows with at least one updated cell
    pub updated_rows:    u32,
    /// columns with at least one updated cell
    pub updated_columns: u32,
    /// cells updated
    pub updated_cells:   u32,
}

/// Reads and writes value ranges of one spreadsheet.
#[derive(Debug, Clone)]
pub struct SheetsClient {
    /// shared HTTP client
    http:           Client,
    /// API root, e.g. `https://sheets.googleapis.com/v4`
    api_base:       Url,
    /// spreadsheet being worked on
    spreadsheet_id: String,
    /// bearer token sent with every request
    access_token:   String,
}

impl SheetsClient {
    /// Creates a client for `spreadsheet_id`.
    pub fn new(
        http: Client,
        api_base: &str,
        spreadsheet_id: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Result<Self, SheetsError> {
        let api_base =
            Url::parse(api_base).map_err(|_| SheetsError::BadBaseUrl(api_base.to_string()))?;
        if api_base.cannot_be_a_base() {
            return Err(SheetsError::BadBaseUrl(api_base.to_string()));
        }

        Ok(Self {
            http,
            api_base,
            spreadsheet_id: spreadsheet_id.into(),
            access_token: access_token.into(),
        })
    }

    /// Returns the spreadsheet id.
    pub fn spreadsheet_id(&self) -> &str {
        &self.spreadsheet_id
    }

    /// URL of `spreadsheets/{id}/values/{range}`, with each segment
    /// percent-encoded.
    fn values_url(&self, range: &str) -> Url {
        let mut url = self.api_base.clone();
        // checked in `new`
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["spreadsheets", self.spreadsheet_id.as_str(), "values", range]);
        }
        url
    }

    /// Reads `range` and returns its rows as text.
    ///
    /// Numbers and booleans are rendered as text; trailing empty cells and
    /// rows are absent, as the API omits them.
    pub async fn get_values(&self, range: &str) -> Result<Vec<Vec<String>>, SheetsError> {
        let url = self.values_url(range);
        tracing::debug!("GET {url}");

        let response = self
            .http
            .get(url.clone())
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|source| SheetsError::Http {
                url: url.to_string(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        let body: ValueRangeResponse = response.json().await.map_err(|source| SheetsError::Http {
            url: url.to_string(),
            source,
        })?;

        Ok(body
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_text).collect())
            .collect())
    }

    /// Overwrites `range` with `rows`.
    ///
    /// * `value_input_option`: `RAW` or `USER_ENTERED`
    pub async fn update_values(
        &self,
        range: &str,
        rows: &[Vec<CellValue>],
        value_input_option: &str,
    ) -> Result<UpdateValuesResponse, SheetsError> {
        let url = self.values_url(range);
        tracing::debug!("PUT {url} ({} rows)", rows.len());

        let body = ValueRangeRequest {
            range,
            major_dimension: "ROWS",
            values: rows,
        };
        let response = self
            .http
            .put(url.clone())
            .bearer_auth(&self.access_token)
            .query(&[("valueInputOption", value_input_option)])
            .json(&body)
            .send()
            .await
            .map_err(|source| SheetsError::Http {
                url: url.to_string(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        response.json().await.map_err(|source| SheetsError::Http {
            url: url.to_string(),
            source,
        })
    }
}

/// Renders a JSON cell as the text a spreadsheet would show.
fn cell_text(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}
