use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::config::AppConfig;
use crate::quote::{FetchOutcome, QuoteSource};
use crate::scheduler::{RefreshScheduler, RefreshTick};
use crate::theme::Palette;
use crate::widget::Surface;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Feedback,
    Search,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Popup {
    None,
    Help,
}

pub struct App {
    pub focus: Focus,
    pub popup: Popup,

    // Everything the user sees about the current quote
    pub surface: Surface,

    // Input buffers
    pub feedback_input: String,
    pub search_input: String,

    // Requests spawned but not yet applied
    pub in_flight: usize,

    source: Arc<dyn QuoteSource>,
    tags: Vec<String>,
    palette: Palette,

    // Fetch results come back here; applied in arrival order
    outcome_tx: UnboundedSender<FetchOutcome>,
    outcome_rx: UnboundedReceiver<FetchOutcome>,

    refresh_tx: UnboundedSender<RefreshTick>,
    refresh_rx: UnboundedReceiver<RefreshTick>,
    scheduler: RefreshScheduler,

    // Set once the first random fetch has resolved, either way
    initialized: bool,
}

impl App {
    pub fn new(config: &AppConfig, source: Arc<dyn QuoteSource>) -> Self {
        let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();
        let (refresh_tx, refresh_rx) = mpsc::unbounded_channel();

        Self {
            focus: Focus::Search,
            popup: Popup::None,

            surface: Surface::default(),

            feedback_input: String::new(),
            search_input: String::new(),

            in_flight: 0,

            source,
            tags: config.tags.clone(),
            palette: config.palette(),

            outcome_tx,
            outcome_rx,

            refresh_tx,
            refresh_rx,
            scheduler: RefreshScheduler::new(config.refresh_delay(), config.refresh_interval()),

            initialized: false,
        }
    }

    /// Initial fetch. Auto-refresh begins once a random quote has loaded.
    pub fn start(&mut self) {
        self.fetch_random_quote();
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight > 0
    }

    pub fn auto_refresh_running(&self) -> bool {
        self.scheduler.is_running()
    }

    pub fn stop_auto_refresh(&mut self) {
        self.scheduler.stop();
    }

    pub fn fetch_random_quote(&mut self) {
        let source = Arc::clone(&self.source);
        let tags = self.tags.clone();
        let tx = self.outcome_tx.clone();

        self.in_flight += 1;
        tracing::debug!("Fetching random quote");
        tokio::spawn(async move {
            let result = source.random(&tags).await;
            let _ = tx.send(FetchOutcome::Random(result));
        });
    }

    /// Validate the search box and, if there is a term, search for it
    pub fn search_quote(&mut self) {
        let Some(term) = self.surface.validate_search(&self.search_input) else {
            return;
        };

        let source = Arc::clone(&self.source);
        let tx = self.outcome_tx.clone();

        self.in_flight += 1;
        tracing::debug!("Searching quotes for {:?}", term);
        tokio::spawn(async move {
            let result = source.search(&term).await;
            let _ = tx.send(FetchOutcome::Search(result));
        });
    }

    pub fn submit_feedback(&mut self) {
        if let Some(entry) = self.surface.submit_feedback(&mut self.feedback_input) {
            tracing::debug!("Feedback received ({} chars)", entry.text.chars().count());
        }
    }

    /// Write one fetch result to the surface. No ordering guard: whatever
    /// arrives last is what the user sees.
    pub fn apply(&mut self, outcome: FetchOutcome) {
        self.in_flight = self.in_flight.saturating_sub(1);

        match outcome {
            FetchOutcome::Random(Ok(quote)) => {
                self.surface.render_quote(&quote, &self.palette);
                self.initialized = true;
                if !self.scheduler.is_running() {
                    self.scheduler.start(self.refresh_tx.clone());
                }
            }
            FetchOutcome::Random(Err(e)) => {
                self.surface.render_error(&e);
                if !self.initialized {
                    self.initialized = true;
                    tracing::error!("Failed to initialize quotes: {}", e);
                }
            }
            FetchOutcome::Search(Ok(results)) => match results.first() {
                Ok(Some(quote)) => self.surface.render_quote(quote, &self.palette),
                Ok(None) => self.surface.render_no_results(),
                Err(e) => self.surface.render_error(&e),
            },
            FetchOutcome::Search(Err(e)) => self.surface.render_error(&e),
        }
    }

    /// Called from the UI loop: fire due refreshes, apply finished fetches
    pub fn tick(&mut self) {
        while self.refresh_rx.try_recv().is_ok() {
            self.fetch_random_quote();
        }

        while let Ok(outcome) = self.outcome_rx.try_recv() {
            self.apply(outcome);
        }
    }

    fn focused_input(&mut self) -> &mut String {
        match self.focus {
            Focus::Feedback => &mut self.feedback_input,
            Focus::Search => &mut self.search_input,
        }
    }

    pub fn focused_input_is_empty(&self) -> bool {
        match self.focus {
            Focus::Feedback => self.feedback_input.is_empty(),
            Focus::Search => self.search_input.is_empty(),
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        if self.popup == Popup::Help {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Enter | KeyCode::Char('q')) {
                self.popup = Popup::None;
            }
            return Ok(());
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) {
            if key.code == KeyCode::Char('r') {
                self.fetch_random_quote();
            }
            return Ok(());
        }

        match key.code {
            KeyCode::Tab | KeyCode::BackTab => {
                self.focus = match self.focus {
                    Focus::Feedback => Focus::Search,
                    Focus::Search => Focus::Feedback,
                };
            }
            KeyCode::Enter => match self.focus {
                Focus::Feedback => self.submit_feedback(),
                Focus::Search => self.search_quote(),
            },
            KeyCode::Esc => self.focused_input().clear(),
            KeyCode::Backspace => {
                self.focused_input().pop();
            }
            KeyCode::Char('?') if self.focused_input_is_empty() => self.popup = Popup::Help,
            KeyCode::Char(c) => self.focused_input().push(c),
            _ => {}
        }
        Ok(())
    }
}
