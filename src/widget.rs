//! The render surface and the operations that write to it
//!
//! Every render function is a full update of the regions it owns, so calling
//! it twice with the same input leaves the surface unchanged.

use ratatui::style::Color;

use crate::quote::{Quote, QuoteError};
use crate::theme::Palette;

pub const LOAD_ERROR_MESSAGE: &str = "Failed to load quote. Please try again later.";
pub const NO_RESULTS_MESSAGE: &str = "No quotes found.";
pub const FEEDBACK_EMPTY_MESSAGE: &str = "Please enter some feedback.";
pub const FEEDBACK_THANKS_MESSAGE: &str = "Thank you for your feedback!";
pub const SEARCH_EMPTY_MESSAGE: &str = "Please enter a search term.";

/// A piece of feedback that survived validation. Never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackEntry {
    pub text: String,
}

impl FeedbackEntry {
    pub fn parse(raw: &str) -> Option<Self> {
        let text = raw.trim();
        if text.is_empty() {
            None
        } else {
            Some(Self { text: text.to_string() })
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackMessage {
    pub text: &'static str,
    pub success: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Surface {
    pub quote: String,
    pub author: String,
    /// Shown in place of the quote when a search matched nothing
    pub notice: Option<&'static str>,
    pub error: Option<&'static str>,
    /// Character count annotation of the displayed quote
    pub char_count: Option<usize>,
    pub long_quote: bool,
    pub background: Option<Color>,
    pub feedback_message: Option<FeedbackMessage>,
    pub search_message: Option<&'static str>,
}

impl Surface {
    pub fn annotation(&self) -> Option<String> {
        self.char_count
            .map(|n| format!("Quote Length: {} characters", n))
    }

    pub fn author_line(&self) -> Option<String> {
        if self.author.is_empty() {
            None
        } else {
            Some(format!("by -- {}", self.author))
        }
    }

    pub fn render_quote(&mut self, quote: &Quote, palette: &Palette) {
        self.quote = quote.content.clone();
        self.author = quote.author.clone();
        self.notice = None;
        self.error = None;
        self.char_count = Some(quote.char_count());
        self.long_quote = quote.is_long();
        self.background = palette.pick();
    }

    /// Transport and status failures look the same to the user
    pub fn render_error(&mut self, err: &QuoteError) {
        tracing::error!("Error fetching the quote: {}", err);
        self.clear_quote();
        self.error = Some(LOAD_ERROR_MESSAGE);
    }

    /// A search that matched nothing; not an error
    pub fn render_no_results(&mut self) {
        self.clear_quote();
        self.error = None;
        self.notice = Some(NO_RESULTS_MESSAGE);
    }

    /// Validates feedback. On success the input is cleared; otherwise it is
    /// left exactly as typed.
    pub fn submit_feedback(&mut self, input: &mut String) -> Option<FeedbackEntry> {
        match FeedbackEntry::parse(input) {
            Some(entry) => {
                self.feedback_message = Some(FeedbackMessage {
                    text: FEEDBACK_THANKS_MESSAGE,
                    success: true,
                });
                input.clear();
                Some(entry)
            }
            None => {
                self.feedback_message = Some(FeedbackMessage {
                    text: FEEDBACK_EMPTY_MESSAGE,
                    success: false,
                });
                None
            }
        }
    }

    /// Returns the trimmed term when a search should be issued
    pub fn validate_search(&mut self, raw: &str) -> Option<String> {
        let term = raw.trim();
        if term.is_empty() {
            self.search_message = Some(SEARCH_EMPTY_MESSAGE);
            None
        } else {
            self.search_message = None;
            Some(term.to_string())
        }
    }

    fn clear_quote(&mut self) {
        self.quote.clear();
        self.author.clear();
        self.notice = None;
        self.char_count = None;
        self.long_quote = false;
    }
}
