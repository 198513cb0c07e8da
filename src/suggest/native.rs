use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;

use super::wire;
use super::{RequestContext, Suggestion, SuggestionSource};
use crate::error::SuggestError;
use crate::place::PlaceRecord;

const PLACES_API_BASE: &str = "https://places.googleapis.com/v1";

/// Suggestion source backed directly by the Google Places API (New).
///
/// The HTTP client is built lazily, once per widget lifetime. A missing
/// credential or a client build failure is permanent: every subsequent
/// request reports [`SuggestError::BackendUnavailable`], which the widget
/// treats as an empty result set.
pub struct GooglePlacesProvider {
    api_key: String,
    fields: Vec<String>,
    client: OnceCell<reqwest::Client>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AutocompleteBody<'a> {
    input: &'a str,
    language_code: &'a str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    included_region_codes: Vec<&'a str>,
    session_token: &'a str,
}

#[derive(Debug, Deserialize)]
struct AutocompleteResponse {
    #[serde(default)]
    suggestions: Vec<wire::WireSuggestion>,
}

impl GooglePlacesProvider {
    pub fn new(api_key: String, fields: Vec<String>) -> Self {
        Self {
            api_key,
            fields,
            client: OnceCell::new(),
        }
    }

    async fn client(&self) -> Result<&reqwest::Client, SuggestError> {
        if self.api_key.trim().is_empty() {
            return Err(SuggestError::BackendUnavailable(
                "missing API key".to_string(),
            ));
        }
        self.client
            .get_or_try_init(|| async {
                reqwest::Client::builder()
                    .timeout(Duration::from_secs(10))
                    .build()
                    .map_err(|e| SuggestError::BackendUnavailable(e.to_string()))
            })
            .await
    }

    fn field_mask(&self) -> String {
        field_mask_for(&self.fields)
    }
}

/// Field mask for the details fetch. The resource id is always requested so
/// the record keeps its place handle even with a narrowed field list.
fn field_mask_for(fields: &[String]) -> String {
    let mut mask: Vec<&str> = vec!["id"];
    for field in fields {
        if field != "id" {
            mask.push(field);
        }
    }
    mask.join(",")
}

#[async_trait]
impl SuggestionSource for GooglePlacesProvider {
    async fn fetch_suggestions(
        &self,
        ctx: &RequestContext,
    ) -> Result<Vec<Suggestion>, SuggestError> {
        let client = self.client().await?;

        let body = AutocompleteBody {
            input: &ctx.input,
            language_code: &ctx.language,
            included_region_codes: ctx.region.iter().map(String::as_str).collect(),
            session_token: &ctx.session_token,
        };

        let response = client
            .post(format!("{PLACES_API_BASE}/places:autocomplete"))
            .header("X-Goog-Api-Key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SuggestError::Http {
                status: response.status().as_u16(),
            });
        }

        let decoded: AutocompleteResponse = response.json().await?;
        Ok(wire::map_suggestions(decoded.suggestions))
    }

    async fn resolve_details(
        &self,
        place_id: &str,
        ctx: &RequestContext,
    ) -> Result<PlaceRecord, SuggestError> {
        let client = self.client().await?;

        let mut query: Vec<(&str, &str)> = vec![("languageCode", ctx.language.as_str())];
        if let Some(region) = &ctx.region {
            query.push(("regionCode", region));
        }

        let response = client
            .get(format!("{PLACES_API_BASE}/places/{place_id}"))
            .header("X-Goog-Api-Key", &self.api_key)
            .header("X-Goog-FieldMask", self.field_mask())
            .query(&query)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SuggestError::Http {
                status: response.status().as_u16(),
            });
        }

        let decoded: wire::WirePlace = response.json().await?;
        Ok(wire::map_place(decoded, place_id))
    }
}
