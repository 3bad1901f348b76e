use std::sync::OnceLock;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, Focus, Popup};
use crate::theme::Theme;

static THEME: OnceLock<Theme> = OnceLock::new();

fn theme() -> &'static Theme {
    THEME.get_or_init(Theme::default)
}

fn accent() -> Color { theme().accent }
fn inactive() -> Color { theme().inactive }
fn success() -> Color { theme().success }
fn danger() -> Color { theme().danger }
fn text() -> Color { theme().text }
fn text_dim() -> Color { theme().text_dim }
fn highlight() -> Color { theme().highlight }

pub fn draw(f: &mut Frame, app: &App) {
    let area = f.area();

    // Page background follows the last rendered quote
    let page = match app.surface.background {
        Some(bg) => Block::default().style(Style::default().bg(bg)),
        None => Block::default(),
    };
    f.render_widget(page, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(0)
        .constraints([
            Constraint::Length(1),  // Info line
            Constraint::Min(6),     // Quote box
            Constraint::Length(3),  // Feedback input
            Constraint::Length(1),  // Feedback message
            Constraint::Length(3),  // Search input
            Constraint::Length(1),  // Search message
            Constraint::Length(1),  // Footer
        ])
        .split(area);

    draw_info_line(f, app, chunks[0]);
    draw_quote_box(f, app, chunks[1]);
    draw_input(f, " Feedback ", &app.feedback_input, app.focus == Focus::Feedback, chunks[2]);
    draw_feedback_message(f, app, chunks[3]);
    draw_input(f, " Search quotes ", &app.search_input, app.focus == Focus::Search, chunks[4]);
    draw_search_message(f, app, chunks[5]);
    draw_footer(f, app, chunks[6]);

    if app.popup == Popup::Help {
        draw_help_popup(f);
    }
}

fn draw_info_line(f: &mut Frame, app: &App, area: Rect) {
    let line = if app.is_loading() {
        Line::from(Span::styled("Loading quote…", Style::default().fg(accent())))
    } else if app.auto_refresh_running() {
        Line::from(Span::styled("Auto-refresh on", Style::default().fg(text_dim())))
    } else {
        Line::from(Span::styled("Ready", Style::default().fg(text_dim())))
    };

    f.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
}

fn draw_quote_box(f: &mut Frame, app: &App, area: Rect) {
    let surface = &app.surface;

    let block = Block::default()
        .title(Span::styled(" Quote of the moment ", Style::default().fg(accent()).add_modifier(Modifier::BOLD)))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(inactive()));

    let quote_style = if surface.long_quote {
        Style::default().fg(highlight()).add_modifier(Modifier::BOLD | Modifier::ITALIC)
    } else {
        Style::default().fg(text())
    };

    let mut lines = Vec::new();

    if let Some(notice) = surface.notice {
        lines.push(Line::styled(notice, Style::default().fg(text_dim())));
    } else if !surface.quote.is_empty() {
        lines.push(Line::styled(surface.quote.as_str(), quote_style));
    }

    if let Some(author) = surface.author_line() {
        lines.push(Line::from(""));
        lines.push(Line::styled(author, Style::default().fg(text()).add_modifier(Modifier::BOLD)));
    }

    if let Some(annotation) = surface.annotation() {
        lines.push(Line::from(""));
        lines.push(Line::styled(annotation, Style::default().fg(text_dim())));
    }

    if let Some(error) = surface.error {
        lines.push(Line::styled(error, Style::default().fg(danger())));
    }

    let content = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(block);

    f.render_widget(content, area);
}

fn draw_input(f: &mut Frame, title: &str, value: &str, focused: bool, area: Rect) {
    let border_color = if focused { accent() } else { inactive() };
    let cursor = if focused { "_" } else { "" };

    let input = Paragraph::new(format!("{}{}", value, cursor))
        .style(Style::default().fg(text()))
        .block(
            Block::default()
                .title(Span::styled(title, Style::default().fg(border_color)))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border_color)),
        );
    f.render_widget(input, area);
}

fn draw_feedback_message(f: &mut Frame, app: &App, area: Rect) {
    let line = match &app.surface.feedback_message {
        Some(msg) => {
            let color = if msg.success { success() } else { danger() };
            Line::styled(format!(" {}", msg.text), Style::default().fg(color))
        }
        None => Line::from(""),
    };
    f.render_widget(Paragraph::new(line), area);
}

fn draw_search_message(f: &mut Frame, app: &App, area: Rect) {
    let line = match app.surface.search_message {
        Some(msg) => Line::styled(format!(" {}", msg), Style::default().fg(danger())),
        None => Line::from(""),
    };
    f.render_widget(Paragraph::new(line), area);
}

fn draw_footer(f: &mut Frame, app: &App, area: Rect) {
    let submit = match app.focus {
        Focus::Feedback => "Send",
        Focus::Search => "Search",
    };
    let hints: Vec<(&str, &str)> = vec![
        ("Enter", submit),
        ("Tab", "Switch"),
        ("^R", "New quote"),
        ("Esc", "Clear"),
        ("?", "Help"),
        ("^C", "Quit"),
    ];

    // Responsive: show fewer hints on narrow terminals
    let max_hints = if area.width < 60 { 3 } else if area.width < 80 { 4 } else { hints.len() };

    let hint_spans: Vec<Span> = hints
        .iter()
        .take(max_hints)
        .flat_map(|(key, action)| {
            vec![
                Span::styled(*key, Style::default().fg(accent())),
                Span::styled(format!(" {} │ ", action), Style::default().fg(text_dim())),
            ]
        })
        .collect();

    let footer = Paragraph::new(Line::from(hint_spans)).alignment(Alignment::Center);
    f.render_widget(footer, area);
}

fn draw_help_popup(f: &mut Frame) {
    let area = f.area();
    let popup_area = centered_rect(
        if area.width < 80 { 95 } else { 60 },
        if area.height < 30 { 90 } else { 60 },
        area,
    );

    f.render_widget(Clear, popup_area);

    let key_line = |key: &'static str, what: &'static str| {
        Line::from(vec![
            Span::styled(key, Style::default().fg(accent())),
            Span::raw(what),
        ])
    };

    let help_text = vec![
        Line::from(Span::styled("═══ Quotes ═══", Style::default().fg(accent()).add_modifier(Modifier::BOLD))),
        key_line("  Ctrl-r    ", "Fetch a new random quote now"),
        Line::from(Span::raw("            A new one also arrives every refresh interval")),
        Line::from(""),
        Line::from(Span::styled("═══ Inputs ═══", Style::default().fg(accent()).add_modifier(Modifier::BOLD))),
        key_line("  Tab       ", "Switch between feedback and search"),
        key_line("  Enter     ", "Send feedback / search for the typed term"),
        key_line("  Esc       ", "Clear the focused input"),
        Line::from(""),
        Line::from(Span::styled("═══ Command line ═══", Style::default().fg(accent()).add_modifier(Modifier::BOLD))),
        key_line("  quoteline --once          ", "Print one quote and exit"),
        key_line("  quoteline --search TERM   ", "Print the first match"),
        key_line("  ... --json                ", "Machine-readable output"),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Press ", Style::default().fg(text_dim())),
            Span::styled("?", Style::default().fg(accent())),
            Span::styled("/", Style::default().fg(text_dim())),
            Span::styled("Esc", Style::default().fg(accent())),
            Span::styled(" to close", Style::default().fg(text_dim())),
        ]),
    ];

    let help = Paragraph::new(help_text)
        .block(
            Block::default()
                .title(Span::styled(" quoteline Help ", Style::default().fg(accent())))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(accent())),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::quote::{Quote, QuoteError, QuoteSource, SearchResults};
    use crate::theme::Palette;
    use async_trait::async_trait;
    use ratatui::{backend::TestBackend, Terminal};
    use std::sync::Arc;

    struct Offline;

    #[async_trait]
    impl QuoteSource for Offline {
        async fn random(&self, _tags: &[String]) -> Result<Quote, QuoteError> {
            Err(QuoteError::Status(503))
        }

        async fn search(&self, _term: &str) -> Result<SearchResults, QuoteError> {
            Err(QuoteError::Status(503))
        }
    }

    fn render(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 24)).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();

        let buffer = terminal.backend().buffer();
        let mut out = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                out.push_str(buffer[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    #[tokio::test]
    async fn test_draws_quote_author_and_annotation() {
        let mut app = App::new(&AppConfig::default(), Arc::new(Offline));
        app.surface.render_quote(&Quote::new("Keep going.", "Anon"), &Palette::default());

        let screen = render(&app);
        assert!(screen.contains("Keep going."));
        assert!(screen.contains("by -- Anon"));
        assert!(screen.contains("Quote Length: 11 characters"));
    }

    #[tokio::test]
    async fn test_draws_error_and_validation_messages() {
        let mut app = App::new(&AppConfig::default(), Arc::new(Offline));
        app.surface.render_error(&QuoteError::Status(500));
        app.search_quote();
        app.submit_feedback();

        let screen = render(&app);
        assert!(screen.contains("Failed to load quote. Please try again later."));
        assert!(screen.contains("Please enter a search term."));
        assert!(screen.contains("Please enter some feedback."));
    }

    #[tokio::test]
    async fn test_help_popup() {
        let mut app = App::new(&AppConfig::default(), Arc::new(Offline));
        app.popup = Popup::Help;
        assert!(render(&app).contains("quoteline Help"));
    }
}
