use std::cell::RefCell;
use std::io;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers, MouseButton,
        MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::Rect,
    style::{Color, Style},
    widgets::Paragraph,
    Terminal,
};
use tracing_subscriber::EnvFilter;

use placetui::{AppConfig, Backend, ClickRouter, PlaceAutocomplete, Selection, WidgetConfig};

#[derive(Debug, Parser)]
#[command(name = "placetui", about = "Terminal place-autocomplete demo")]
struct Cli {
    /// Google Places API key (overrides the config file)
    #[arg(long)]
    api_key: Option<String>,

    /// Base URL of a self-hosted proxy; selects the remote backend
    #[arg(long)]
    remote_url: Option<String>,

    /// BCP-47 language code for suggestions and details
    #[arg(long)]
    language: Option<String>,

    /// ISO-2 region filter, e.g. "us"
    #[arg(long)]
    region: Option<String>,

    /// Debounce delay in milliseconds
    #[arg(long)]
    debounce_ms: Option<u64>,

    /// Explicit config file path instead of the default location
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let file = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load(),
    };

    let backend = match cli.remote_url.or(file.remote_url) {
        Some(base_url) => Backend::Remote { base_url },
        None => Backend::Google,
    };

    let selected = Rc::new(RefCell::new(None::<Selection>));
    let sink = Rc::clone(&selected);

    let mut config = WidgetConfig::new(cli.api_key.or(file.api_key).unwrap_or_default())
        .backend(backend)
        .on_select(move |selection| {
            *sink.borrow_mut() = Some(selection.clone());
        });
    if let Some(language) = cli.language.or(file.language) {
        config = config.language(language);
    }
    if let Some(region) = cli.region.or(file.region) {
        config = config.region(region);
    }
    if let Some(debounce_ms) = cli.debounce_ms.or(file.debounce_ms) {
        config = config.debounce_ms(debounce_ms);
    }
    if let Some(placeholder) = file.placeholder {
        config = config.placeholder(placeholder);
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    let size = terminal.size()?;
    let host = Rect::new(
        2,
        1,
        size.width.saturating_sub(4).min(60),
        size.height.saturating_sub(3),
    );

    let mut router = ClickRouter::new();
    let mut widget = PlaceAutocomplete::mount(host, config, &mut router)?;
    widget.handle_focus();

    let outcome = run(&mut terminal, &mut widget, &mut router, host).await;

    widget.teardown(&mut router);
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;
    outcome?;

    match selected.borrow().as_ref() {
        Some(Selection::Place(record)) => {
            println!("selected: {} ({})", record.display_text(), record.place_id);
        }
        Some(Selection::Query { query }) => println!("selected query: {query}"),
        None => println!("nothing selected"),
    }
    Ok(())
}

async fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    widget: &mut PlaceAutocomplete,
    router: &mut ClickRouter,
    host: Rect,
) -> Result<()> {
    loop {
        terminal.draw(|frame| {
            widget.render(frame, host);

            let area = frame.area();
            let hint = Paragraph::new("Type to search | Enter: select | Esc: close | Ctrl+C: quit")
                .style(Style::default().fg(Color::DarkGray));
            frame.render_widget(
                hint,
                Rect::new(area.x, area.height.saturating_sub(1), area.width, 1),
            );
        })?;

        if event::poll(Duration::from_millis(50))? {
            match event::read()? {
                Event::Key(key) => {
                    if key.modifiers.contains(KeyModifiers::CONTROL)
                        && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('q'))
                    {
                        return Ok(());
                    }
                    widget.handle_key(key);
                }
                Event::Mouse(mouse) => {
                    if let MouseEventKind::Down(MouseButton::Left) = mouse.kind {
                        router.dispatch(mouse.column, mouse.row);
                        widget.handle_click(mouse.column, mouse.row);
                    }
                }
                _ => {}
            }
        }

        widget.tick(Instant::now());
        widget.pump();
    }
}
