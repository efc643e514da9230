use crate::error::{Error, Result};

/// The passage a session is measured against.
///
/// Always holds at least one character and no control characters, so
/// every position can be typed with a single printable key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceText {
    content_id: String,
    title: String,
    chars: Vec<char>,
}

impl ReferenceText {
    pub fn new(content_id: impl Into<String>, text: &str) -> Result<Self> {
        let chars: Vec<char> = text.chars().collect();

        if chars.is_empty() {
            return Err(Error::InvalidInput("reference text is empty".into()));
        }

        if let Some((idx, c)) = chars.iter().enumerate().find(|(_, c)| c.is_control()) {
            return Err(Error::InvalidInput(format!(
                "reference text contains control character {c:?} at position {idx}"
            )));
        }

        Ok(Self {
            content_id: content_id.into(),
            title: String::new(),
            chars,
        })
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn content_id(&self) -> &str {
        &self.content_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    /// Never true for a constructed value; present for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn char_at(&self, idx: usize) -> Option<char> {
        self.chars.get(idx).copied()
    }

    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    pub fn as_string(&self) -> String {
        self.chars.iter().collect()
    }
}
