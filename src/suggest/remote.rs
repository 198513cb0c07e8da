use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use super::wire;
use super::{RequestContext, Suggestion, SuggestionSource};
use crate::error::SuggestError;
use crate::place::PlaceRecord;

/// Suggestion source backed by a self-hosted proxy exposing the
/// `autocomplete`/`details` endpoints.
///
/// The proxy answers either wrapped (`{success, data: [...]}`) or raw
/// payloads; both shapes are supported.
pub struct RemoteHttpProvider {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AutocompleteReply {
    Envelope {
        success: bool,
        #[serde(default)]
        data: Vec<SuggestionsPayload>,
    },
    Raw(SuggestionsPayload),
}

#[derive(Debug, Deserialize)]
struct SuggestionsPayload {
    #[serde(default)]
    suggestions: Vec<wire::WireSuggestion>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DetailsReply {
    Envelope {
        success: bool,
        #[serde(default)]
        data: Vec<DetailsPayload>,
    },
    Raw(DetailsPayload),
}

#[derive(Debug, Deserialize)]
struct DetailsPayload {
    result: Option<wire::WirePlace>,
}

impl RemoteHttpProvider {
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self { base_url, client }
    }

    /// The base URL is used verbatim; a trailing slash is the caller's
    /// contract, matching `{remoteUrl}autocomplete`.
    fn autocomplete_url(&self, ctx: &RequestContext) -> String {
        let mut url = format!(
            "{}autocomplete?input={}&languageCode={}",
            self.base_url,
            urlencoding::encode(&ctx.input),
            urlencoding::encode(&ctx.language),
        );
        if let Some(region) = &ctx.region {
            url.push_str(&format!("&regionCode={}", urlencoding::encode(region)));
        }
        url.push_str("&includeQueryPredictions=true");
        url
    }

    fn details_url(&self, place_id: &str, ctx: &RequestContext) -> String {
        let mut url = format!(
            "{}details?placeId={}&languageCode={}",
            self.base_url,
            urlencoding::encode(place_id),
            urlencoding::encode(&ctx.language),
        );
        if let Some(region) = &ctx.region {
            url.push_str(&format!("&regionCode={}", urlencoding::encode(region)));
        }
        url
    }
}

fn unwrap_suggestions(reply: AutocompleteReply) -> Vec<wire::WireSuggestion> {
    match reply {
        AutocompleteReply::Envelope { success, mut data } => {
            if success && !data.is_empty() {
                data.remove(0).suggestions
            } else {
                Vec::new()
            }
        }
        AutocompleteReply::Raw(payload) => payload.suggestions,
    }
}

fn unwrap_details(reply: DetailsReply) -> Option<wire::WirePlace> {
    match reply {
        DetailsReply::Envelope { success, mut data } => {
            if success && !data.is_empty() {
                data.remove(0).result
            } else {
                None
            }
        }
        DetailsReply::Raw(payload) => payload.result,
    }
}

#[async_trait]
impl SuggestionSource for RemoteHttpProvider {
    async fn fetch_suggestions(
        &self,
        ctx: &RequestContext,
    ) -> Result<Vec<Suggestion>, SuggestError> {
        let response = self.client.get(self.autocomplete_url(ctx)).send().await?;

        if !response.status().is_success() {
            return Err(SuggestError::Http {
                status: response.status().as_u16(),
            });
        }

        let reply: AutocompleteReply = response.json().await?;
        Ok(wire::map_suggestions(unwrap_suggestions(reply)))
    }

    async fn resolve_details(
        &self,
        place_id: &str,
        ctx: &RequestContext,
    ) -> Result<PlaceRecord, SuggestError> {
        let response = self
            .client
            .get(self.details_url(place_id, ctx))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SuggestError::Http {
                status: response.status().as_u16(),
            });
        }

        let reply: DetailsReply = response.json().await?;
        let place = unwrap_details(reply)
            .ok_or_else(|| SuggestError::Malformed("details response without result".to_string()))?;
        Ok(wire::map_place(place, place_id))
    }
}
