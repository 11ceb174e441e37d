//! OData response wrapper

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

/// Generic OData response with value array
#[derive(Debug, Deserialize)]
pub struct ODataResponse<T> {
    #[serde(rename = "value")]
    pub value: Vec<T>,

    #[serde(rename = "@odata.nextLink")]
    pub next_link: Option<String>,
}

impl<T: DeserializeOwned> ODataResponse<T> {
    /// Read the `value` rows out of a fetched envelope.
    ///
    /// A missing envelope (failed fetch) or one that does not match `T` yields
    /// no rows.
    pub fn rows(json: Option<JsonValue>) -> Vec<T> {
        let Some(json) = json else {
            return Vec::new();
        };

        match serde_json::from_value::<ODataResponse<T>>(json) {
            Ok(response) => {
                if response.next_link.is_some() {
                    tracing::debug!("Response was paged; only the first page is used");
                }
                response.value
            }
            Err(e) => {
                tracing::warn!("Unexpected response shape: {}", e);
                Vec::new()
            }
        }
    }
}
