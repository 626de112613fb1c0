//! SGR (Select Graphic Rendition) rendering.
//!
//! A single left-to-right pass over normalized text. Every `ESC[...m`
//! sequence updates a [`StyleState`]; the text between sequences is written
//! twice, once HTML-escaped and wrapped in a styled `<span>` when the style
//! is not default, and once verbatim into the plain copy.

use once_cell::sync::Lazy;
use regex::Regex;

/// Any CSI sequence. Only those ending in `m` carry style; the rest are
/// dropped from both outputs.
static CSI: Lazy<Regex> = Lazy::new(|| Regex::new(r"\x1b\[[0-9;?]*[A-Za-z]").unwrap());

const FOREGROUND: [(u16, &str); 16] = [
    (30, "#1a1a1a"),
    (31, "#ff5c57"),
    (32, "#5af78e"),
    (33, "#f3f99d"),
    (34, "#57c7ff"),
    (35, "#ff6ac1"),
    (36, "#9aedfe"),
    (37, "#f1f1f0"),
    (90, "#808080"),
    (91, "#ff6e67"),
    (92, "#5af78e"),
    (93, "#f3f99d"),
    (94, "#57c7ff"),
    (95, "#ff6ac1"),
    (96, "#9aedfe"),
    (97, "#ffffff"),
];

const BACKGROUND: [(u16, &str); 16] = [
    (40, "#1a1a1a"),
    (41, "#ff5c57"),
    (42, "#5af78e"),
    (43, "#f3f99d"),
    (44, "#57c7ff"),
    (45, "#ff6ac1"),
    (46, "#9aedfe"),
    (47, "#f1f1f0"),
    (100, "#4d4d4d"),
    (101, "#ff6e67"),
    (102, "#5af78e"),
    (103, "#f3f99d"),
    (104, "#57c7ff"),
    (105, "#ff6ac1"),
    (106, "#9aedfe"),
    (107, "#ffffff"),
];

fn palette(table: &[(u16, &'static str)], code: u16) -> Option<&'static str> {
    table
        .iter()
        .find(|(entry, _)| *entry == code)
        .map(|(_, color)| *color)
}

/// Live display attributes while rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleState {
    pub foreground: Option<&'static str>,
    pub background: Option<&'static str>,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub dim: bool,
}

impl StyleState {
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    /// Apply the `;`-separated parameters of one SGR sequence, in order.
    ///
    /// An empty parameter counts as 0. Parameters that are not numbers, and
    /// codes without a mapping, are ignored. Every parameter is a code on its
    /// own; there is no extended-color operand parsing.
    pub fn apply(&mut self, params: &str) {
        let codes = params.split(';').filter_map(|param| {
            if param.is_empty() {
                Some(0)
            } else {
                param.parse::<u16>().ok()
            }
        });

        for code in codes {
            match code {
                0 => *self = Self::default(),
                1 => self.bold = true,
                2 => self.dim = true,
                3 => self.italic = true,
                4 => self.underline = true,
                22 => {
                    self.bold = false;
                    self.dim = false;
                }
                23 => self.italic = false,
                24 => self.underline = false,
                30..=37 | 90..=97 => self.foreground = palette(&FOREGROUND, code),
                39 => self.foreground = None,
                40..=47 | 100..=107 => self.background = palette(&BACKGROUND, code),
                49 => self.background = None,
                // Includes 38/48: their 256-color and truecolor operands are
                // read as codes of their own, like any other parameter
                _ => {}
            }
        }
    }

    /// Inline CSS for the active attributes, in a fixed order.
    fn css(&self) -> String {
        let mut rules = Vec::with_capacity(6);
        if let Some(color) = self.foreground {
            rules.push(format!("color:{color}"));
        }
        if let Some(color) = self.background {
            rules.push(format!("background-color:{color}"));
        }
        if self.bold {
            rules.push("font-weight:700".to_string());
        }
        if self.italic {
            rules.push("font-style:italic".to_string());
        }
        if self.underline {
            rules.push("text-decoration:underline".to_string());
        }
        if self.dim {
            rules.push("opacity:0.85".to_string());
        }
        rules.join(";")
    }
}

/// Output of one render pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rendered {
    /// HTML fragment, safe to embed inside `<pre>`
    pub html: String,
    /// Copyable transcript without any escape sequences
    pub plain: String,
}

impl Rendered {
    fn push_text(&mut self, text: &str, style: &StyleState) {
        if text.is_empty() {
            return;
        }
        self.plain.push_str(text);

        let escaped = escape_html(text);
        if style.is_default() {
            self.html.push_str(&escaped);
        } else {
            self.html.push_str("<span style=\"");
            self.html.push_str(&style.css());
            self.html.push_str("\">");
            self.html.push_str(&escaped);
            self.html.push_str("</span>");
        }
    }
}

/// Render normalized transcript text to HTML and plain text.
///
/// Each call starts from the default style.
pub fn render(text: &str) -> Rendered {
    let mut style = StyleState::default();
    let mut out = Rendered {
        html: String::with_capacity(text.len() * 2),
        plain: String::with_capacity(text.len()),
    };

    let mut last = 0;
    for sequence in CSI.find_iter(text) {
        out.push_text(&text[last..sequence.start()], &style);

        // ESC '[' params final, all ASCII
        let raw = sequence.as_str();
        if raw.ends_with('m') {
            style.apply(&raw[2..raw.len() - 1]);
        }
        last = sequence.end();
    }
    out.push_text(&text[last..], &style);

    out
}

/// Escape text for HTML element content and attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
