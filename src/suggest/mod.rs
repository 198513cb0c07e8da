pub mod native;
pub mod remote;
pub(crate) mod wire;

use async_trait::async_trait;
use rand::Rng;

use crate::error::SuggestError;
use crate::place::PlaceRecord;

/// One candidate row returned by a suggestion source for a partial input.
#[derive(Debug, Clone, PartialEq)]
pub enum Suggestion {
    /// A concrete place, resolvable to a full [`PlaceRecord`].
    Place(PlacePrediction),
    /// A free-text query prediction with no place behind it.
    Query(QueryPrediction),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlacePrediction {
    /// Opaque backend handle used to resolve details.
    pub place_id: String,
    pub primary_text: String,
    pub secondary_text: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueryPrediction {
    pub text: String,
}

impl Suggestion {
    /// Main line shown in the results list.
    pub fn primary_text(&self) -> &str {
        match self {
            Suggestion::Place(p) => &p.primary_text,
            Suggestion::Query(q) => &q.text,
        }
    }

    /// Dimmed second line, when the backend provides one.
    pub fn secondary_text(&self) -> Option<&str> {
        match self {
            Suggestion::Place(p) => p.secondary_text.as_deref(),
            Suggestion::Query(_) => None,
        }
    }
}

/// In-flight query state carried by every request a widget issues.
///
/// The session token groups one widget lifetime of requests into a single
/// billable session on the native backend. It is refreshed once, when the
/// widget mounts, never per keystroke.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub input: String,
    pub region: Option<String>,
    pub language: String,
    pub session_token: String,
}

impl RequestContext {
    pub fn new(language: &str, region: &str) -> Self {
        Self {
            input: String::new(),
            region: normalize_region(region),
            language: language.to_string(),
            session_token: fresh_session_token(),
        }
    }

    /// Re-derive the region filter used by all subsequent requests.
    pub fn set_region(&mut self, iso2: &str) {
        self.region = normalize_region(iso2);
    }
}

/// Lowercased ISO-2 filter, or none when the code is empty.
pub(crate) fn normalize_region(iso2: &str) -> Option<String> {
    let trimmed = iso2.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

fn fresh_session_token() -> String {
    let bytes: [u8; 16] = rand::thread_rng().gen();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// A backend that turns partial input into suggestions and a chosen
/// suggestion into a full place record.
///
/// Zero matches come back as an empty vec, never as an error; the widget
/// treats empty and error identically (hide the results list).
#[async_trait]
pub trait SuggestionSource: Send + Sync {
    async fn fetch_suggestions(
        &self,
        ctx: &RequestContext,
    ) -> Result<Vec<Suggestion>, SuggestError>;

    async fn resolve_details(
        &self,
        place_id: &str,
        ctx: &RequestContext,
    ) -> Result<PlaceRecord, SuggestError>;
}
