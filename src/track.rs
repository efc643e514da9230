use crate::error::Result;
use crate::reference::ReferenceText;

#[derive(Clone, Debug, Copy, PartialEq, Eq)]
pub enum CharStatus {
    Pending,
    Correct,
    Incorrect,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CharCell {
    pub expected: char,
    pub status: CharStatus,
}

/// Per-character correctness for one pass over a reference text.
///
/// Cells before `cursor` are always Correct or Incorrect, cells from
/// `cursor` on are always Pending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterTrack {
    cells: Vec<CharCell>,
    cursor: usize,
}

impl CharacterTrack {
    pub fn new(text: &ReferenceText) -> Self {
        Self {
            cells: text
                .chars()
                .iter()
                .map(|&expected| CharCell {
                    expected,
                    status: CharStatus::Pending,
                })
                .collect(),
            cursor: 0,
        }
    }

    /// Builds a track straight from a string, rejecting empty or malformed text.
    pub fn from_text(text: &str) -> Result<Self> {
        Ok(Self::new(&ReferenceText::new("", text)?))
    }

    /// Scores `c` against the expected character at the cursor and advances.
    /// Does nothing once the track is complete.
    pub fn apply_char(&mut self, c: char) {
        let Some(cell) = self.cells.get_mut(self.cursor) else {
            return;
        };

        cell.status = if c == cell.expected {
            CharStatus::Correct
        } else {
            CharStatus::Incorrect
        };
        self.cursor += 1;
    }

    pub fn apply_backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            self.cells[self.cursor].status = CharStatus::Pending;
        }
    }

    pub fn is_complete(&self) -> bool {
        self.cursor == self.cells.len()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[CharCell] {
        &self.cells
    }

    pub fn status_at(&self, idx: usize) -> Option<CharStatus> {
        self.cells.get(idx).map(|cell| cell.status)
    }

    pub fn correct_count(&self) -> usize {
        self.count(CharStatus::Correct)
    }

    pub fn incorrect_count(&self) -> usize {
        self.count(CharStatus::Incorrect)
    }

    /// Number of non-pending cells, which always equals the cursor.
    pub fn attempted_count(&self) -> usize {
        self.cursor
    }

    fn count(&self, status: CharStatus) -> usize {
        self.cells[..self.cursor]
            .iter()
            .filter(|cell| cell.status == status)
            .count()
    }
}
