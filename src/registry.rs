use std::fmt;

/// Width of one glyph in the marquee font, in pixels.
pub const GLYPH_WIDTH: i32 = 6;

const ENTRY_SEPARATOR: &str = "   ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectedEntry {
    pub email: String,
    pub name: String,
}

impl fmt::Display for CollectedEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.email, self.name)
    }
}

/// Append-only list of form submissions plus the marquee text derived from it.
#[derive(Debug, Default)]
pub struct EntryRegistry {
    entries: Vec<CollectedEntry>,
    scroll_text: String,
    scroll_chars: usize,
}

impl EntryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accepts the values as-is: no dedup, no email check.
    pub fn register(&mut self, email: String, name: String) {
        let entry = CollectedEntry { email, name };

        let formatted = format!("{}{}", entry, ENTRY_SEPARATOR);
        self.scroll_chars += formatted.chars().count();
        self.scroll_text.push_str(&formatted);

        log::debug!("Registered {} ({} entries)", entry, self.entries.len() + 1);
        self.entries.push(entry);
    }

    pub fn scroll_text(&self) -> &str {
        &self.scroll_text
    }

    /// Leftmost cursor position before the marquee wraps around.
    pub fn scroll_min_x(&self) -> i32 {
        let chars = i32::try_from(self.scroll_chars).unwrap_or(i32::MAX);
        chars.saturating_mul(GLYPH_WIDTH).saturating_neg()
    }

    pub fn entries(&self) -> &[CollectedEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
