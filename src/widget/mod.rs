pub mod clicks;
pub mod debounce;
pub mod epoch;

use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Alignment, Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::config::{Backend, WidgetConfig};
use crate::error::{SuggestError, WidgetError};
use crate::place::{PlaceRecord, Selection};
use crate::suggest::native::GooglePlacesProvider;
use crate::suggest::remote::RemoteHttpProvider;
use crate::suggest::{RequestContext, Suggestion, SuggestionSource};
use self::clicks::{ClickRouter, SubscriptionId};
use self::debounce::DebounceTimer;
use self::epoch::{Epoch, RequestEpoch};

/// Completion message sent back from a spawned fetch task.
enum SourceEvent {
    Suggestions {
        epoch: Epoch,
        outcome: Result<Vec<Suggestion>, SuggestError>,
    },
    Details {
        outcome: Result<PlaceRecord, SuggestError>,
    },
}

/// A place-autocomplete control: an input line plus a results dropdown,
/// backed by a pluggable suggestion source.
///
/// The control is single-threaded: all state lives on the UI thread, and
/// spawned fetch tasks only perform I/O, reporting back through a channel
/// drained by [`PlaceAutocomplete::pump`]. Drive it from the app loop:
///
/// - route key events to [`handle_key`](Self::handle_key) (or call the
///   granular `handle_*` methods directly),
/// - route mouse clicks to [`ClickRouter::dispatch`] and then
///   [`handle_click`](Self::handle_click),
/// - call [`tick`](Self::tick) and [`pump`](Self::pump) once per loop
///   iteration, and [`render`](Self::render) inside the draw closure.
pub struct PlaceAutocomplete {
    config: WidgetConfig,
    ctx: RequestContext,
    source: Option<Arc<dyn SuggestionSource>>,
    epoch: RequestEpoch,
    debounce: DebounceTimer,
    pending_input: Option<String>,
    value: String,
    suggestions: Vec<Suggestion>,
    list_state: ListState,
    loading: bool,
    open: Rc<Cell<bool>>,
    region: Rc<Cell<Rect>>,
    results_area: Option<Rect>,
    subscription: Option<SubscriptionId>,
    tx: UnboundedSender<SourceEvent>,
    rx: UnboundedReceiver<SourceEvent>,
    torn_down: bool,
}

impl PlaceAutocomplete {
    /// Mount a control into `host`, building the suggestion source the
    /// configured backend calls for.
    ///
    /// Fails with [`WidgetError::InvalidHost`] when the host region cannot
    /// hold the control. The session token is refreshed here, once per
    /// mount.
    pub fn mount(
        host: Rect,
        config: WidgetConfig,
        router: &mut ClickRouter,
    ) -> Result<Self, WidgetError> {
        let source: Arc<dyn SuggestionSource> = match &config.backend {
            Backend::Google => Arc::new(GooglePlacesProvider::new(
                config.api_key.clone(),
                config.fields.clone(),
            )),
            Backend::Remote { base_url } => Arc::new(RemoteHttpProvider::new(base_url.clone())),
        };
        Self::with_source(host, config, router, source)
    }

    /// Mount with a caller-provided suggestion source.
    pub fn with_source(
        host: Rect,
        config: WidgetConfig,
        router: &mut ClickRouter,
        source: Arc<dyn SuggestionSource>,
    ) -> Result<Self, WidgetError> {
        if host.width == 0 || host.height == 0 {
            return Err(WidgetError::InvalidHost);
        }

        let region = Rc::new(Cell::new(host));
        let open = Rc::new(Cell::new(false));
        let subscription = router.subscribe(Rc::clone(&region), Rc::clone(&open));
        let (tx, rx) = mpsc::unbounded_channel();
        let ctx = RequestContext::new(&config.language, &config.region);
        let debounce = DebounceTimer::new(config.debounce);

        Ok(Self {
            config,
            ctx,
            source: Some(source),
            epoch: RequestEpoch::new(),
            debounce,
            pending_input: None,
            value: String::new(),
            suggestions: Vec::new(),
            list_state: ListState::default(),
            loading: false,
            open,
            region,
            results_area: None,
            subscription: Some(subscription),
            tx,
            rx,
            torn_down: false,
        })
    }

    /// The input text changed to `raw`.
    ///
    /// Empty input hides the results synchronously without issuing a
    /// request. Non-empty input schedules a debounced request, replacing
    /// any pending schedule. `on_input` fires on every change.
    pub fn handle_input_change(&mut self, raw: &str) {
        if self.torn_down || self.config.disabled {
            return;
        }
        self.value = raw.to_string();

        if raw.is_empty() {
            self.debounce.cancel();
            self.pending_input = None;
            // Orphan any in-flight request so a late response cannot
            // reopen the list over a cleared input.
            self.epoch.issue();
            self.hide_results();
        } else {
            self.pending_input = Some(raw.to_string());
            self.debounce.schedule(Instant::now());
        }

        let value = self.value.clone();
        if let Some(hook) = self.config.callbacks.on_input.as_mut() {
            hook(&value);
        }
    }

    /// The control gained focus. Non-empty input triggers an immediate
    /// request (no debounce) under the same epoch protocol.
    pub fn handle_focus(&mut self) {
        if self.torn_down {
            return;
        }
        if let Some(hook) = self.config.callbacks.on_focus.as_mut() {
            hook();
        }
        if self.config.disabled {
            return;
        }
        if !self.value.trim().is_empty() {
            let text = self.value.clone();
            self.issue_request(text);
        }
    }

    pub fn handle_blur(&mut self) {
        if self.torn_down {
            return;
        }
        if let Some(hook) = self.config.callbacks.on_blur.as_mut() {
            hook();
        }
    }

    /// Hide the results. In-flight requests are not cancelled; orphaning
    /// the epoch makes their late results die on the staleness check.
    pub fn handle_escape(&mut self) {
        if self.torn_down {
            return;
        }
        self.debounce.cancel();
        self.pending_input = None;
        self.epoch.issue();
        self.hide_results();
    }

    /// Convenience key routing for hosts that forward raw key events.
    pub fn handle_key(&mut self, key: KeyEvent) {
        if self.torn_down || self.config.disabled {
            return;
        }
        match key.code {
            KeyCode::Esc => self.handle_escape(),
            KeyCode::Up => self.move_selection(-1),
            KeyCode::Down => self.move_selection(1),
            KeyCode::Enter => {
                if self.open.get() {
                    if let Some(index) = self.list_state.selected() {
                        self.select(index);
                    }
                } else {
                    let value = self.value.clone();
                    if let Some(hook) = self.config.callbacks.on_change.as_mut() {
                        hook(&value);
                    }
                }
            }
            KeyCode::Backspace => {
                let mut value = self.value.clone();
                value.pop();
                self.handle_input_change(&value);
            }
            KeyCode::Char(c) => {
                let mut value = self.value.clone();
                value.push(c);
                self.handle_input_change(&value);
            }
            _ => {}
        }
    }

    /// A click landed at (`column`, `row`). Clicks on a results row select
    /// it; everything else is left to [`ClickRouter::dispatch`].
    pub fn handle_click(&mut self, column: u16, row: u16) {
        if self.torn_down || !self.open.get() {
            return;
        }
        let Some(results) = self.results_area else {
            return;
        };
        let inner = Rect {
            x: results.x + 1,
            y: results.y + 1,
            width: results.width.saturating_sub(2),
            height: results.height.saturating_sub(2),
        };
        if inner.contains(Position::new(column, row)) {
            let index = (row - inner.y) as usize + self.list_state.offset();
            self.select(index);
        }
    }

    /// Select the suggestion at `index`.
    ///
    /// Query predictions resolve locally: the input becomes the query text
    /// and `on_select` fires with the query payload, no network call. Place
    /// predictions resolve through the backend; any failure is swallowed
    /// after hiding the results.
    pub fn select(&mut self, index: usize) {
        if self.torn_down {
            return;
        }
        let Some(suggestion) = self.suggestions.get(index).cloned() else {
            return;
        };

        match suggestion {
            Suggestion::Query(query) => {
                self.commit_value(query.text.clone());
                self.hide_results();
                let selection = Selection::Query { query: query.text };
                if let Some(hook) = self.config.callbacks.on_select.as_mut() {
                    hook(&selection);
                }
            }
            Suggestion::Place(place) => {
                let Some(source) = self.source.clone() else {
                    return;
                };
                self.loading = true;
                let ctx = self.ctx.clone();
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    let outcome = source.resolve_details(&place.place_id, &ctx).await;
                    let _ = tx.send(SourceEvent::Details { outcome });
                });
            }
        }
    }

    /// Fire a due debounce. Call once per app loop iteration.
    pub fn tick(&mut self, now: Instant) {
        if self.torn_down {
            return;
        }
        if self.debounce.fire(now) {
            if let Some(text) = self.pending_input.take() {
                self.issue_request(text);
            }
        }
    }

    /// Drain fetch completions. Call once per app loop iteration.
    pub fn pump(&mut self) {
        while let Ok(event) = self.rx.try_recv() {
            self.apply_event(event);
        }
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn set_placeholder(&mut self, placeholder: impl Into<String>) {
        self.config.placeholder = placeholder.into();
    }

    pub fn set_disabled(&mut self, disabled: bool) {
        self.config.disabled = disabled;
    }

    /// Re-derive the region filter used by all subsequent requests:
    /// lowercased ISO-2 code, or no filter when empty.
    pub fn update_region(&mut self, iso2: &str) {
        self.config.region = iso2.to_string();
        self.ctx.set_region(iso2);
    }

    pub fn set_input_style(&mut self, style: Style) {
        self.config.input_style = style;
    }

    pub fn set_results_style(&mut self, style: Style) {
        self.config.results_style = style;
    }

    pub fn is_open(&self) -> bool {
        self.open.get()
    }

    /// Release everything the control holds: the pending debounce, the
    /// click subscription, the rendered state, the backend handle.
    /// Idempotent.
    pub fn teardown(&mut self, router: &mut ClickRouter) {
        if let Some(id) = self.subscription.take() {
            router.unsubscribe(id);
        }
        self.debounce.cancel();
        self.pending_input = None;
        self.suggestions.clear();
        self.list_state.select(None);
        self.open.set(false);
        self.loading = false;
        self.source = None;
        self.torn_down = true;
    }

    /// Draw the control into `area`: a bordered input line, and the results
    /// list below while it is open.
    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        if self.torn_down {
            return;
        }

        let open = self.open.get() && !self.suggestions.is_empty();
        let input_height = area.height.min(3);
        let input_area = Rect::new(area.x, area.y, area.width, input_height);

        let results_height = if open {
            (self.suggestions.len() as u16 + 2).min(area.height.saturating_sub(input_height))
        } else {
            0
        };
        let results_area = Rect::new(area.x, area.y + input_height, area.width, results_height);

        self.region.set(if results_height > 0 {
            input_area.union(results_area)
        } else {
            input_area
        });
        self.results_area = (results_height > 0).then_some(results_area);

        let input_block = Block::default().borders(Borders::ALL);
        let input_inner = input_block.inner(input_area);
        let (text, text_style) = if self.value.is_empty() {
            (
                self.config.placeholder.as_str(),
                Style::default().fg(Color::DarkGray),
            )
        } else {
            (self.value.as_str(), self.config.input_style)
        };
        let text_style = if self.config.disabled {
            Style::default().fg(Color::DarkGray)
        } else {
            text_style
        };
        frame.render_widget(
            Paragraph::new(text).style(text_style).block(input_block),
            input_area,
        );

        // Suffix slot at the right edge of the input line.
        if self.loading {
            frame.render_widget(
                Paragraph::new("…")
                    .alignment(Alignment::Right)
                    .style(Style::default().fg(Color::DarkGray)),
                input_inner,
            );
        }

        if results_height > 0 {
            let items: Vec<ListItem> = self
                .suggestions
                .iter()
                .map(|suggestion| {
                    let mut spans = vec![Span::styled(
                        suggestion.primary_text().to_string(),
                        self.config.results_style,
                    )];
                    if let Some(secondary) = suggestion.secondary_text() {
                        spans.push(Span::styled(
                            format!("  {secondary}"),
                            Style::default().fg(Color::DarkGray),
                        ));
                    }
                    ListItem::new(Line::from(spans))
                })
                .collect();

            let list = List::new(items)
                .block(Block::default().borders(Borders::ALL))
                .highlight_style(
                    Style::default()
                        .bg(Color::DarkGray)
                        .add_modifier(Modifier::BOLD),
                );
            frame.render_stateful_widget(list, results_area, &mut self.list_state);
        }
    }

    fn move_selection(&mut self, delta: isize) {
        if !self.open.get() || self.suggestions.is_empty() {
            return;
        }
        let current = self.list_state.selected().unwrap_or(0) as isize;
        let last = self.suggestions.len() as isize - 1;
        let next = (current + delta).clamp(0, last);
        self.list_state.select(Some(next as usize));
    }

    /// Record the request in the shared context and capture its epoch.
    fn begin_request(&mut self, text: String) -> Epoch {
        self.ctx.input = text;
        self.loading = true;
        self.epoch.issue()
    }

    fn issue_request(&mut self, text: String) {
        let epoch = self.begin_request(text);
        let Some(source) = self.source.clone() else {
            return;
        };
        let ctx = self.ctx.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let outcome = source.fetch_suggestions(&ctx).await;
            let _ = tx.send(SourceEvent::Suggestions { epoch, outcome });
        });
    }

    fn apply_event(&mut self, event: SourceEvent) {
        match event {
            SourceEvent::Suggestions { epoch, outcome } => {
                if !self.epoch.is_current(epoch) {
                    tracing::debug!("discarding response from a superseded request");
                    return;
                }
                self.loading = false;
                match outcome {
                    Ok(suggestions) if !suggestions.is_empty() => {
                        self.suggestions = suggestions;
                        self.list_state.select(Some(0));
                        *self.list_state.offset_mut() = 0;
                        self.open.set(true);
                    }
                    Ok(_) => self.hide_results(),
                    Err(e) => {
                        tracing::warn!("suggestion fetch failed: {e}");
                        self.hide_results();
                    }
                }
            }
            SourceEvent::Details { outcome } => {
                self.loading = false;
                match outcome {
                    Ok(record) => {
                        self.commit_value(record.display_text().to_string());
                        self.hide_results();
                        let selection = Selection::Place(record);
                        if let Some(hook) = self.config.callbacks.on_select.as_mut() {
                            hook(&selection);
                        }
                    }
                    Err(e) => {
                        tracing::warn!("detail resolution failed: {e}");
                        self.hide_results();
                    }
                }
            }
        }
    }

    fn commit_value(&mut self, text: String) {
        self.value = text;
        let value = self.value.clone();
        if let Some(hook) = self.config.callbacks.on_change.as_mut() {
            hook(&value);
        }
    }

    fn hide_results(&mut self) {
        self.open.set(false);
        self.suggestions.clear();
        self.list_state.select(None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::suggest::{PlacePrediction, QueryPrediction};
    use async_trait::async_trait;
    use std::cell::RefCell;
    use std::sync::Mutex;
    use std::time::Duration;

    struct MockSource {
        suggest_calls: Mutex<Vec<RequestContext>>,
        detail_calls: Mutex<Vec<String>>,
        reply: Vec<Suggestion>,
        detail_reply: PlaceRecord,
        fail: bool,
    }

    impl MockSource {
        fn with_reply(reply: Vec<Suggestion>) -> Self {
            Self {
                suggest_calls: Mutex::new(Vec::new()),
                detail_calls: Mutex::new(Vec::new()),
                reply,
                detail_reply: PlaceRecord {
                    place_id: "pid-1".to_string(),
                    formatted_address: Some("1 Resolved Way".to_string()),
                    ..Default::default()
                },
                fail: false,
            }
        }

        fn failing() -> Self {
            let mut source = Self::with_reply(Vec::new());
            source.fail = true;
            source
        }

        fn suggest_call_count(&self) -> usize {
            self.suggest_calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl SuggestionSource for MockSource {
        async fn fetch_suggestions(
            &self,
            ctx: &RequestContext,
        ) -> Result<Vec<Suggestion>, SuggestError> {
            self.suggest_calls.lock().unwrap().push(ctx.clone());
            if self.fail {
                return Err(SuggestError::Http { status: 500 });
            }
            Ok(self.reply.clone())
        }

        async fn resolve_details(
            &self,
            place_id: &str,
            _ctx: &RequestContext,
        ) -> Result<PlaceRecord, SuggestError> {
            self.detail_calls.lock().unwrap().push(place_id.to_string());
            if self.fail {
                return Err(SuggestError::Http { status: 500 });
            }
            Ok(self.detail_reply.clone())
        }
    }

    fn place_row(id: &str, primary: &str) -> Suggestion {
        Suggestion::Place(PlacePrediction {
            place_id: id.to_string(),
            primary_text: primary.to_string(),
            secondary_text: None,
        })
    }

    fn query_row(text: &str) -> Suggestion {
        Suggestion::Query(QueryPrediction {
            text: text.to_string(),
        })
    }

    fn mounted(
        source: Arc<MockSource>,
        config: WidgetConfig,
    ) -> (PlaceAutocomplete, ClickRouter) {
        let mut router = ClickRouter::new();
        let widget = PlaceAutocomplete::with_source(
            Rect::new(0, 0, 40, 12),
            config,
            &mut router,
            source as Arc<dyn SuggestionSource>,
        )
        .unwrap();
        (widget, router)
    }

    fn open_with(widget: &mut PlaceAutocomplete, rows: Vec<Suggestion>) {
        let epoch = widget.begin_request("seed".to_string());
        widget.apply_event(SourceEvent::Suggestions {
            epoch,
            outcome: Ok(rows),
        });
    }

    #[test]
    fn test_mount_rejects_zero_sized_host() {
        let mut router = ClickRouter::new();
        let result = PlaceAutocomplete::mount(
            Rect::new(0, 0, 0, 0),
            WidgetConfig::new("key"),
            &mut router,
        );
        assert!(matches!(result, Err(WidgetError::InvalidHost)));
    }

    #[test]
    fn test_empty_input_hides_without_request() {
        let source = Arc::new(MockSource::with_reply(vec![query_row("a")]));
        let (mut widget, _router) = mounted(Arc::clone(&source), WidgetConfig::new("key"));
        open_with(&mut widget, vec![query_row("pizza")]);
        assert!(widget.is_open());

        widget.handle_input_change("");

        assert!(!widget.is_open());
        assert!(widget.suggestions.is_empty());
        assert!(!widget.debounce.is_pending());
        assert_eq!(source.suggest_call_count(), 0);
    }

    #[test]
    fn test_on_input_fires_on_every_change() {
        let count = Rc::new(RefCell::new(0));
        let seen = Rc::clone(&count);
        let config = WidgetConfig::new("key").on_input(move |_| *seen.borrow_mut() += 1);
        let source = Arc::new(MockSource::with_reply(Vec::new()));
        let (mut widget, _router) = mounted(source, config);

        widget.handle_input_change("a");
        widget.handle_input_change("ab");
        widget.handle_input_change("");

        assert_eq!(*count.borrow(), 3);
    }

    #[test]
    fn test_disabled_control_ignores_edits() {
        let count = Rc::new(RefCell::new(0));
        let seen = Rc::clone(&count);
        let config = WidgetConfig::new("key")
            .disabled(true)
            .on_input(move |_| *seen.borrow_mut() += 1);
        let source = Arc::new(MockSource::with_reply(Vec::new()));
        let (mut widget, _router) = mounted(source, config);

        widget.handle_input_change("a");

        assert_eq!(*count.borrow(), 0);
        assert!(!widget.debounce.is_pending());
        assert_eq!(widget.value(), "");
    }

    #[tokio::test]
    async fn test_debounce_coalesces_rapid_edits() {
        let source = Arc::new(MockSource::with_reply(vec![query_row("eiffel tower")]));
        let config = WidgetConfig::new("key").debounce_ms(30);
        let (mut widget, _router) = mounted(Arc::clone(&source), config);

        widget.handle_input_change("e");
        widget.handle_input_change("ei");
        widget.handle_input_change("eif");

        widget.tick(Instant::now() + Duration::from_millis(60));
        tokio::time::sleep(Duration::from_millis(100)).await;
        widget.pump();

        let calls = source.suggest_calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].input, "eif");
        drop(calls);
        assert!(widget.is_open());
    }

    #[tokio::test]
    async fn test_focus_with_text_issues_immediate_request() {
        let source = Arc::new(MockSource::with_reply(vec![query_row("paris")]));
        let (mut widget, _router) = mounted(Arc::clone(&source), WidgetConfig::new("key"));

        widget.set_value("paris");
        widget.handle_focus();
        tokio::time::sleep(Duration::from_millis(100)).await;
        widget.pump();

        assert_eq!(source.suggest_call_count(), 1);
        assert!(widget.is_open());
    }

    #[test]
    fn test_focus_with_empty_input_fires_callback_only() {
        let focused = Rc::new(RefCell::new(false));
        let seen = Rc::clone(&focused);
        let config = WidgetConfig::new("key").on_focus(move || *seen.borrow_mut() = true);
        let source = Arc::new(MockSource::with_reply(Vec::new()));
        let (mut widget, _router) = mounted(Arc::clone(&source), config);

        widget.handle_focus();

        assert!(*focused.borrow());
        assert_eq!(source.suggest_call_count(), 0);
    }

    #[test]
    fn test_stale_response_not_rendered() {
        let source = Arc::new(MockSource::with_reply(Vec::new()));
        let (mut widget, _router) = mounted(source, WidgetConfig::new("key"));

        let first = widget.begin_request("a".to_string());
        let second = widget.begin_request("ab".to_string());

        // Later request resolves first.
        widget.apply_event(SourceEvent::Suggestions {
            epoch: second,
            outcome: Ok(vec![query_row("ab results")]),
        });
        assert!(widget.is_open());

        // The superseded response must not overwrite the fresh one.
        widget.apply_event(SourceEvent::Suggestions {
            epoch: first,
            outcome: Ok(vec![query_row("a results")]),
        });
        assert_eq!(widget.suggestions, vec![query_row("ab results")]);
    }

    #[test]
    fn test_error_matches_empty_result_state() {
        let source = Arc::new(MockSource::with_reply(Vec::new()));
        let (mut widget, _router) = mounted(source, WidgetConfig::new("key"));

        let epoch = widget.begin_request("x".to_string());
        widget.apply_event(SourceEvent::Suggestions {
            epoch,
            outcome: Ok(Vec::new()),
        });
        let after_empty = (widget.is_open(), widget.suggestions.len(), widget.loading);

        let epoch = widget.begin_request("y".to_string());
        widget.apply_event(SourceEvent::Suggestions {
            epoch,
            outcome: Err(SuggestError::Http { status: 502 }),
        });
        let after_error = (widget.is_open(), widget.suggestions.len(), widget.loading);

        assert_eq!(after_empty, (false, 0, false));
        assert_eq!(after_error, after_empty);
    }

    #[test]
    fn test_update_region_normalizes() {
        let source = Arc::new(MockSource::with_reply(Vec::new()));
        let (mut widget, _router) = mounted(source, WidgetConfig::new("key"));

        widget.update_region("US");
        assert_eq!(widget.ctx.region.as_deref(), Some("us"));

        widget.update_region("");
        assert_eq!(widget.ctx.region, None);
    }

    #[test]
    fn test_query_selection_skips_network() {
        let selections = Rc::new(RefCell::new(Vec::new()));
        let seen = Rc::clone(&selections);
        let config =
            WidgetConfig::new("key").on_select(move |s| seen.borrow_mut().push(s.clone()));
        let source = Arc::new(MockSource::with_reply(Vec::new()));
        let (mut widget, _router) = mounted(Arc::clone(&source), config);

        open_with(&mut widget, vec![query_row("pizza near me")]);
        widget.select(0);

        assert_eq!(widget.value(), "pizza near me");
        assert!(!widget.is_open());
        assert_eq!(
            *selections.borrow(),
            vec![Selection::Query {
                query: "pizza near me".to_string()
            }]
        );
        assert!(source.detail_calls.lock().unwrap().is_empty());
        assert_eq!(source.suggest_call_count(), 0);
    }

    #[tokio::test]
    async fn test_place_selection_resolves_details() {
        let selections = Rc::new(RefCell::new(Vec::new()));
        let seen = Rc::clone(&selections);
        let config =
            WidgetConfig::new("key").on_select(move |s| seen.borrow_mut().push(s.clone()));
        let source = Arc::new(MockSource::with_reply(Vec::new()));
        let (mut widget, _router) = mounted(Arc::clone(&source), config);

        open_with(&mut widget, vec![place_row("pid-1", "Eiffel Tower")]);
        widget.select(0);
        tokio::time::sleep(Duration::from_millis(100)).await;
        widget.pump();

        assert_eq!(widget.value(), "1 Resolved Way");
        assert!(!widget.is_open());
        assert_eq!(*source.detail_calls.lock().unwrap(), vec!["pid-1"]);
        let selections_ref = selections.borrow();
        match &selections_ref[..] {
            [Selection::Place(record)] => assert_eq!(record.place_id, "pid-1"),
            other => panic!("expected one place selection, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_failed_detail_resolution_is_swallowed() {
        let selections = Rc::new(RefCell::new(Vec::new()));
        let seen = Rc::clone(&selections);
        let config =
            WidgetConfig::new("key").on_select(move |s| seen.borrow_mut().push(s.clone()));
        let source = Arc::new(MockSource::failing());
        let (mut widget, _router) = mounted(Arc::clone(&source), config);

        open_with(&mut widget, vec![place_row("pid-1", "Eiffel Tower")]);
        widget.select(0);
        tokio::time::sleep(Duration::from_millis(100)).await;
        widget.pump();

        assert!(!widget.is_open());
        assert!(selections.borrow().is_empty());
    }

    #[test]
    fn test_escape_orphans_inflight_request() {
        let source = Arc::new(MockSource::with_reply(Vec::new()));
        let (mut widget, _router) = mounted(source, WidgetConfig::new("key"));

        let epoch = widget.begin_request("x".to_string());
        widget.handle_escape();

        widget.apply_event(SourceEvent::Suggestions {
            epoch,
            outcome: Ok(vec![query_row("late")]),
        });
        assert!(!widget.is_open());
        assert!(widget.suggestions.is_empty());
    }

    #[test]
    fn test_teardown_is_idempotent() {
        let source = Arc::new(MockSource::with_reply(Vec::new()));
        let (mut widget, mut router) = mounted(source, WidgetConfig::new("key"));

        widget.teardown(&mut router);
        widget.teardown(&mut router);

        widget.handle_input_change("ignored");
        assert_eq!(widget.value(), "");
        assert!(!widget.debounce.is_pending());
    }

    #[test]
    fn test_teardown_releases_click_subscription() {
        let source = Arc::new(MockSource::with_reply(Vec::new()));
        let (mut widget, mut router) = mounted(source, WidgetConfig::new("key"));

        widget.open.set(true);
        router.dispatch(200, 200);
        assert!(!widget.open.get());

        widget.teardown(&mut router);
        widget.open.set(true);
        router.dispatch(200, 200);
        assert!(widget.open.get());
    }

    #[test]
    fn test_render_tracks_region_and_results_area() {
        use ratatui::{backend::TestBackend, Terminal};

        let source = Arc::new(MockSource::with_reply(Vec::new()));
        let (mut widget, _router) = mounted(source, WidgetConfig::new("key"));
        open_with(
            &mut widget,
            vec![query_row("first"), query_row("second")],
        );

        let mut terminal = Terminal::new(TestBackend::new(40, 12)).unwrap();
        terminal
            .draw(|frame| widget.render(frame, Rect::new(0, 0, 40, 12)))
            .unwrap();

        let results = widget.results_area.unwrap();
        assert_eq!(results.y, 3);
        assert_eq!(results.height, 4);
        assert_eq!(widget.region.get(), Rect::new(0, 0, 40, 7));

        // Closing collapses the tracked region back to the input line.
        widget.handle_escape();
        terminal
            .draw(|frame| widget.render(frame, Rect::new(0, 0, 40, 12)))
            .unwrap();
        assert_eq!(widget.region.get(), Rect::new(0, 0, 40, 3));
        assert!(widget.results_area.is_none());
    }

    #[test]
    fn test_keyboard_navigation_clamps() {
        let source = Arc::new(MockSource::with_reply(Vec::new()));
        let (mut widget, _router) = mounted(source, WidgetConfig::new("key"));
        open_with(&mut widget, vec![query_row("a"), query_row("b")]);

        widget.move_selection(1);
        assert_eq!(widget.list_state.selected(), Some(1));
        widget.move_selection(1);
        assert_eq!(widget.list_state.selected(), Some(1));
        widget.move_selection(-1);
        widget.move_selection(-1);
        assert_eq!(widget.list_state.selected(), Some(0));
    }
}
