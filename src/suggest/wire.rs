//! Wire-format DTOs shared by both backends.
//!
//! The self-hosted proxy forwards the vendor's JSON shapes unchanged, so the
//! prediction and place payloads decode through one set of types here.

use serde::Deserialize;

use super::{PlacePrediction, QueryPrediction, Suggestion};
use crate::place::{AddressComponent, LatLng, PlaceRecord};

#[derive(Debug, Deserialize)]
pub(crate) struct WireText {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WireSuggestion {
    pub place_prediction: Option<WirePlacePrediction>,
    pub query_prediction: Option<WireQueryPrediction>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WirePlacePrediction {
    #[serde(default)]
    pub place_id: String,
    pub text: Option<WireText>,
    pub structured_format: Option<WireStructuredFormat>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WireStructuredFormat {
    pub main_text: Option<WireText>,
    pub secondary_text: Option<WireText>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireQueryPrediction {
    pub text: Option<WireText>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WirePlace {
    pub id: Option<String>,
    pub display_name: Option<WireText>,
    pub formatted_address: Option<String>,
    pub location: Option<WireLatLng>,
    #[serde(default)]
    pub address_components: Vec<WireAddressComponent>,
    #[serde(default)]
    pub types: Vec<String>,
    pub rating: Option<f64>,
    pub user_rating_count: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireLatLng {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WireAddressComponent {
    pub long_text: Option<String>,
    pub short_text: Option<String>,
    #[serde(default)]
    pub types: Vec<String>,
}

/// Map wire suggestions onto domain rows, dropping entries that carry
/// neither prediction kind.
pub(crate) fn map_suggestions(raw: Vec<WireSuggestion>) -> Vec<Suggestion> {
    raw.into_iter()
        .filter_map(|s| {
            if let Some(place) = s.place_prediction {
                let primary = place
                    .structured_format
                    .as_ref()
                    .and_then(|f| f.main_text.as_ref())
                    .or(place.text.as_ref())
                    .map(|t| t.text.clone())
                    .unwrap_or_default();
                let secondary = place
                    .structured_format
                    .and_then(|f| f.secondary_text)
                    .map(|t| t.text)
                    .filter(|t| !t.is_empty());
                Some(Suggestion::Place(PlacePrediction {
                    place_id: place.place_id,
                    primary_text: primary,
                    secondary_text: secondary,
                }))
            } else if let Some(query) = s.query_prediction {
                let text = query.text.map(|t| t.text).unwrap_or_default();
                Some(Suggestion::Query(QueryPrediction { text }))
            } else {
                None
            }
        })
        .collect()
}

/// Map a wire place onto the canonical record. `fallback_id` covers details
/// responses that omit the resource id.
pub(crate) fn map_place(place: WirePlace, fallback_id: &str) -> PlaceRecord {
    PlaceRecord {
        place_id: place.id.unwrap_or_else(|| fallback_id.to_string()),
        display_name: place.display_name.map(|t| t.text),
        formatted_address: place.formatted_address,
        location: place.location.map(|l| LatLng {
            latitude: l.latitude,
            longitude: l.longitude,
        }),
        address_components: place
            .address_components
            .into_iter()
            .map(|c| AddressComponent {
                long_text: c.long_text.unwrap_or_default(),
                short_text: c.short_text.unwrap_or_default(),
                types: c.types,
            })
            .collect(),
        types: place.types,
        rating: place.rating,
        user_rating_count: place.user_rating_count,
    }
}
