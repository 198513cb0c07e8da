use serde::{Deserialize, Serialize};

/// Geographic coordinates of a resolved place.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub latitude: f64,
    pub longitude: f64,
}

/// One component of a structured address (street, locality, country, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressComponent {
    pub long_text: String,
    pub short_text: String,
    pub types: Vec<String>,
}

/// Canonical, backend-agnostic representation of a resolved place.
///
/// Handed to the host `on_select` callback and otherwise not retained. The
/// `place_id` is passed through so the host can request additional fields
/// from the backend itself.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaceRecord {
    pub place_id: String,
    pub display_name: Option<String>,
    pub formatted_address: Option<String>,
    pub location: Option<LatLng>,
    pub address_components: Vec<AddressComponent>,
    pub types: Vec<String>,
    pub rating: Option<f64>,
    pub user_rating_count: Option<u64>,
}

impl PlaceRecord {
    /// Text written into the input after a selection: the formatted address,
    /// falling back to the display name.
    pub fn display_text(&self) -> &str {
        self.formatted_address
            .as_deref()
            .or(self.display_name.as_deref())
            .unwrap_or("")
    }
}

/// Payload delivered to the host `on_select` callback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Selection {
    /// A fully resolved place.
    Place(PlaceRecord),
    /// A query-type prediction: just the literal text, no place behind it.
    Query { query: String },
}
