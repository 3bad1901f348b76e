mod app;
mod config;
mod quote;
mod scheduler;
mod theme;
mod ui;
mod widget;

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use app::{App, Popup};
use config::AppConfig;
use quote::client::HttpQuoteSource;
use quote::QuoteSource;
use widget::Surface;

#[derive(Parser, Debug)]
#[command(name = "quoteline")]
#[command(author = "Sean Fournier")]
#[command(version = "0.1.0")]
#[command(about = "Motivational quotes in your terminal, refreshed on a timer")]
struct Args {
    /// Print one random quote and exit
    #[arg(short, long)]
    once: bool,

    /// Print the first quote matching TERM and exit
    #[arg(short, long, value_name = "TERM")]
    search: Option<String>,

    /// Output as JSON (with --once or --search)
    #[arg(short, long)]
    json: bool,

    /// Quote provider base URL (overrides config)
    #[arg(long)]
    base_url: Option<String>,

    /// Auto-refresh interval in seconds (overrides config)
    #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..))]
    interval: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let one_shot = args.once || args.search.is_some();

    // The TUI owns the terminal, so it logs to a file instead
    init_logging(!one_shot);

    let mut config = AppConfig::load().unwrap_or_default();
    if let Some(base_url) = args.base_url {
        config.base_url = base_url;
    }
    if let Some(interval) = args.interval {
        config.refresh_interval_secs = interval;
    }

    let source = Arc::new(HttpQuoteSource::new(config.base_url.clone(), config.request_timeout())?);

    if let Some(term) = args.search {
        return print_search(source.as_ref(), &config, &term, args.json).await;
    }

    if args.once {
        return print_random(source.as_ref(), &config, args.json).await;
    }

    run_tui(&config, source).await
}

fn init_logging(to_file: bool) {
    let filter = tracing_subscriber::EnvFilter::from_default_env();

    if to_file {
        let log_dir = dirs::cache_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("quoteline");
        let file_layer = tracing_appender::rolling::RollingFileAppender::builder()
            .rotation(tracing_appender::rolling::Rotation::NEVER)
            .filename_prefix("quoteline.log")
            .build(log_dir)
            .ok()
            .map(|appender| {
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(appender)
            });

        tracing_subscriber::registry()
            .with(file_layer)
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
            .with(filter)
            .init();
    }
}

async fn print_random(source: &dyn QuoteSource, config: &AppConfig, json: bool) -> Result<()> {
    let mut surface = Surface::default();

    match source.random(&config.tags).await {
        Ok(quote) => {
            surface.render_quote(&quote, &config.palette());
            print_surface(&surface, json)
        }
        Err(e) => {
            surface.render_error(&e);
            anyhow::bail!("{} ({})", surface.error.unwrap_or_default(), e)
        }
    }
}

async fn print_search(source: &dyn QuoteSource, config: &AppConfig, raw: &str, json: bool) -> Result<()> {
    let mut surface = Surface::default();

    let Some(term) = surface.validate_search(raw) else {
        anyhow::bail!("{}", surface.search_message.unwrap_or_default());
    };

    match source.search(&term).await {
        Ok(results) => match results.first() {
            Ok(Some(quote)) => {
                surface.render_quote(quote, &config.palette());
                print_surface(&surface, json)
            }
            Ok(None) => {
                surface.render_no_results();
                print_surface(&surface, json)
            }
            Err(e) => {
                surface.render_error(&e);
                anyhow::bail!("{} ({})", surface.error.unwrap_or_default(), e)
            }
        },
        Err(e) => {
            surface.render_error(&e);
            anyhow::bail!("{} ({})", surface.error.unwrap_or_default(), e)
        }
    }
}

fn print_surface(surface: &Surface, json: bool) -> Result<()> {
    if json {
        let output = serde_json::json!({
            "content": surface.quote,
            "author": surface.author,
            "length": surface.char_count,
            "long": surface.long_quote,
            "notice": surface.notice,
        });
        println!("{}", serde_json::to_string(&output)?);
        return Ok(());
    }

    if let Some(notice) = surface.notice {
        println!("{}", notice);
        return Ok(());
    }

    println!("\"{}\"", surface.quote);
    if let Some(author) = surface.author_line() {
        println!("  {}", author);
    }
    if let Some(annotation) = surface.annotation() {
        println!("  {}", annotation);
    }
    Ok(())
}

async fn run_tui(config: &AppConfig, source: Arc<dyn QuoteSource>) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(config, source);
    app.start();

    let result = run_app(&mut terminal, &mut app).await;

    app.stop_auto_refresh();

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(std::time::Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Char('q') if app.popup == Popup::None && app.focused_input_is_empty() => {
                            return Ok(())
                        }
                        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                            return Ok(())
                        }
                        _ => {
                            if let Err(e) = app.handle_key(key) {
                                tracing::warn!("Key handling failed: {}", e);
                            }
                        }
                    }
                }
            }
        }

        // Refresh ticks and finished fetches
        app.tick();
        tokio::task::yield_now().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_must_be_positive() {
        assert!(Args::try_parse_from(["quoteline", "--interval", "0"]).is_err());

        let args = Args::try_parse_from(["quoteline", "--interval", "45"]).unwrap();
        assert_eq!(args.interval, Some(45));
    }

    #[test]
    fn test_one_shot_flags() {
        let args = Args::try_parse_from(["quoteline", "--search", "life", "--json"]).unwrap();
        assert_eq!(args.search.as_deref(), Some("life"));
        assert!(args.json);
        assert!(!args.once);
    }
}
