//! An embeddable terminal place-autocomplete control.
//!
//! [`PlaceAutocomplete`] turns an input line into a place-search box: as the
//! user types, it queries a suggestion backend (Google Places or a
//! self-hosted proxy), shows a dropdown of candidate places, and on
//! selection resolves full place details and hands them to the host through
//! the `on_select` callback.
//!
//! Requests are debounced and race-resolved by a monotonic epoch, so a slow
//! response for an old keystroke can never overwrite a newer one. Errors on
//! the fetch path never reach the host; they are logged and the dropdown
//! simply closes.

pub mod config;
pub mod error;
pub mod place;
pub mod suggest;
pub mod widget;

pub use config::{AppConfig, Backend, WidgetConfig};
pub use error::{SuggestError, WidgetError};
pub use place::{AddressComponent, LatLng, PlaceRecord, Selection};
pub use suggest::{
    native::GooglePlacesProvider, remote::RemoteHttpProvider, PlacePrediction, QueryPrediction,
    RequestContext, Suggestion, SuggestionSource,
};
pub use widget::clicks::ClickRouter;
pub use widget::PlaceAutocomplete;
