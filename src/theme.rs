//! Colors for the UI and the background palette quotes are painted on

use ratatui::style::Color;

pub const DEFAULT_PALETTE: [&str; 5] = ["#f0f8ff", "#faebd7", "#f5f5dc", "#e6e6fa", "#ffe4e1"];

/// Theme colors for the UI
#[derive(Debug, Clone)]
pub struct Theme {
    pub accent: Color,     // Focused borders, key hints
    pub danger: Color,     // Load errors, validation messages
    pub success: Color,    // Feedback accepted
    pub text: Color,       // Quote text on the pastel background
    pub text_dim: Color,   // Author, annotation, hints
    pub highlight: Color,  // Long quotes
    pub inactive: Color,   // Unfocused borders
}

impl Default for Theme {
    fn default() -> Self {
        // Dark inks, readable on every palette entry
        Self {
            accent: Color::Rgb(30, 102, 245),
            danger: Color::Rgb(210, 15, 57),
            success: Color::Rgb(64, 160, 43),
            text: Color::Rgb(76, 79, 105),
            text_dim: Color::Rgb(108, 111, 133),
            highlight: Color::Rgb(136, 57, 239),
            inactive: Color::Rgb(140, 143, 161),
        }
    }
}

/// Fixed set of background colors, one picked per rendered quote
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    colors: Vec<Color>,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            colors: DEFAULT_PALETTE
                .iter()
                .filter_map(|hex| parse_hex_color(hex))
                .collect(),
        }
    }
}

impl Palette {
    /// Build from hex strings, skipping anything unparsable.
    /// Falls back to the default palette when nothing is left.
    pub fn from_hex<S: AsRef<str>>(entries: &[S]) -> Self {
        let colors: Vec<Color> = entries
            .iter()
            .filter_map(|entry| {
                let parsed = parse_hex_color(entry.as_ref());
                if parsed.is_none() {
                    tracing::warn!("Ignoring invalid palette color: {}", entry.as_ref());
                }
                parsed
            })
            .collect();

        if colors.is_empty() {
            Self::default()
        } else {
            Self { colors }
        }
    }

    pub fn pick(&self) -> Option<Color> {
        if self.is_empty() {
            return None;
        }
        Some(self.colors[fastrand::usize(..self.colors.len())])
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

/// Parse a hex color string (#RRGGBB or #RGB)
pub fn parse_hex_color(s: &str) -> Option<Color> {
    let s = s.trim().trim_start_matches('#');

    if !s.is_ascii() {
        return None;
    }

    if s.len() == 6 {
        let r = u8::from_str_radix(&s[0..2], 16).ok()?;
        let g = u8::from_str_radix(&s[2..4], 16).ok()?;
        let b = u8::from_str_radix(&s[4..6], 16).ok()?;
        Some(Color::Rgb(r, g, b))
    } else if s.len() == 3 {
        let r = u8::from_str_radix(&s[0..1], 16).ok()? * 17;
        let g = u8::from_str_radix(&s[1..2], 16).ok()? * 17;
        let b = u8::from_str_radix(&s[2..3], 16).ok()? * 17;
        Some(Color::Rgb(r, g, b))
    } else {
        None
    }
}
