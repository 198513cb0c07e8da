use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use ratatui::style::Style;
use serde::Deserialize;

use crate::place::Selection;

pub const DEFAULT_PLACEHOLDER: &str = "please enter a address";
pub const DEFAULT_LANGUAGE: &str = "en";
pub const DEFAULT_DEBOUNCE_MS: u64 = 300;
pub const DEFAULT_FIELDS: &[&str] = &[
    "displayName",
    "formattedAddress",
    "location",
    "addressComponents",
];

/// Which suggestion source the control talks to. Chosen once at mount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backend {
    /// Google Places API (New), keyed by the configured credential.
    Google,
    /// A self-hosted proxy exposing the `autocomplete`/`details` contract.
    /// The base URL is concatenated verbatim with the endpoint names, so it
    /// normally ends with a slash.
    Remote { base_url: String },
}

pub type TextCallback = Box<dyn FnMut(&str)>;
pub type EventCallback = Box<dyn FnMut()>;
pub type SelectCallback = Box<dyn FnMut(&Selection)>;

/// Host hooks. Missing hooks are no-ops.
#[derive(Default)]
pub struct Callbacks {
    pub(crate) on_input: Option<TextCallback>,
    pub(crate) on_change: Option<TextCallback>,
    pub(crate) on_focus: Option<EventCallback>,
    pub(crate) on_blur: Option<EventCallback>,
    pub(crate) on_select: Option<SelectCallback>,
}

/// Immutable-after-mount configuration for one control instance.
///
/// Only the region filter, the disabled flag, and the style overrides
/// mutate after mount, through the widget's explicit setters.
pub struct WidgetConfig {
    pub api_key: String,
    pub placeholder: String,
    pub region: String,
    pub language: String,
    pub fields: Vec<String>,
    pub debounce: Duration,
    pub backend: Backend,
    pub disabled: bool,
    pub input_style: Style,
    pub results_style: Style,
    pub(crate) callbacks: Callbacks,
}

impl WidgetConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
            region: String::new(),
            language: DEFAULT_LANGUAGE.to_string(),
            fields: DEFAULT_FIELDS.iter().map(|f| f.to_string()).collect(),
            debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
            backend: Backend::Google,
            disabled: false,
            input_style: Style::default(),
            results_style: Style::default(),
            callbacks: Callbacks::default(),
        }
    }

    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    /// ISO-2 region filter; an empty string means no filter.
    pub fn region(mut self, iso2: impl Into<String>) -> Self {
        self.region = iso2.into();
        self
    }

    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Field list fetched on selection (native backend field mask).
    pub fn fields(mut self, fields: Vec<String>) -> Self {
        self.fields = fields;
        self
    }

    pub fn debounce_ms(mut self, millis: u64) -> Self {
        self.debounce = Duration::from_millis(millis);
        self
    }

    pub fn backend(mut self, backend: Backend) -> Self {
        self.backend = backend;
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn input_style(mut self, style: Style) -> Self {
        self.input_style = style;
        self
    }

    pub fn results_style(mut self, style: Style) -> Self {
        self.results_style = style;
        self
    }

    pub fn on_input(mut self, hook: impl FnMut(&str) + 'static) -> Self {
        self.callbacks.on_input = Some(Box::new(hook));
        self
    }

    pub fn on_change(mut self, hook: impl FnMut(&str) + 'static) -> Self {
        self.callbacks.on_change = Some(Box::new(hook));
        self
    }

    pub fn on_focus(mut self, hook: impl FnMut() + 'static) -> Self {
        self.callbacks.on_focus = Some(Box::new(hook));
        self
    }

    pub fn on_blur(mut self, hook: impl FnMut() + 'static) -> Self {
        self.callbacks.on_blur = Some(Box::new(hook));
        self
    }

    pub fn on_select(mut self, hook: impl FnMut(&Selection) + 'static) -> Self {
        self.callbacks.on_select = Some(Box::new(hook));
        self
    }
}

/// File configuration for the demo binary, merged under the CLI flags.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    pub api_key: Option<String>,
    pub remote_url: Option<String>,
    pub language: Option<String>,
    pub region: Option<String>,
    pub debounce_ms: Option<u64>,
    pub placeholder: Option<String>,
}

impl AppConfig {
    /// Load `<config dir>/placetui/config.toml`, falling back to defaults
    /// when the file is missing or unreadable.
    pub fn load() -> Self {
        let Some(dir) = dirs::config_dir() else {
            return Self::default();
        };
        let path = dir.join("placetui").join("config.toml");
        if !path.exists() {
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("ignoring config file {}: {e:#}", path.display());
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
    }
}
