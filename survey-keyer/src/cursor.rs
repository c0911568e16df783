//! Navigation cursor over the flattened question list.

use crate::QuestionList;

/// Where keyboard focus rests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Position {
    /// The record identifier input.
    #[default]
    IdEntry,

    /// A question, and the matrix row for matrix questions (0 otherwise).
    AtQuestion { index: usize, row: usize },
}

impl Position {
    /// The question index, if focus is on a question.
    pub fn index(&self) -> Option<usize> {
        match self {
            Self::IdEntry => None,
            Self::AtQuestion { index, .. } => Some(*index),
        }
    }

    /// The matrix row (0 when not on a question).
    pub fn row(&self) -> usize {
        match self {
            Self::IdEntry => 0,
            Self::AtQuestion { row, .. } => *row,
        }
    }
}

/// Outcome of a cursor request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// The cursor moved to a new position.
    Moved(Position),

    /// Forward movement ran off the end; the cursor stayed put.
    End,

    /// The request was a no-op.
    Unchanged,
}

/// The navigation cursor.
///
/// Visibility is supplied per call as a predicate over question indices, so
/// the cursor holds nothing but its position.
#[derive(Debug, Clone, Default)]
pub struct Cursor {
    position: Position,
}

impl Cursor {
    /// Create a cursor at identifier entry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current position.
    pub fn position(&self) -> Position {
        self.position
    }

    fn set(&mut self, position: Position) -> Step {
        if self.position == position {
            return Step::Unchanged;
        }
        tracing::debug!(?position, "cursor moved");
        self.position = position;
        Step::Moved(position)
    }

    /// Move to the next matrix row, or the next visible question.
    pub fn move_next(&mut self, list: &QuestionList, visible: impl Fn(usize) -> bool) -> Step {
        let start = match self.position {
            Position::IdEntry => 0,
            Position::AtQuestion { index, row } => {
                if let Some(entry) = list.get(index)
                    && row + 1 < entry.row_count()
                {
                    return self.set(Position::AtQuestion {
                        index,
                        row: row + 1,
                    });
                }
                index + 1
            }
        };
        match (start..list.len()).find(|&i| visible(i)) {
            Some(index) => self.set(Position::AtQuestion { index, row: 0 }),
            None => Step::End,
        }
    }

    /// Move to the previous matrix row, or the previous visible question.
    ///
    /// Entering a matrix from behind lands on its last row. Moving back from
    /// the first visible question returns to identifier entry.
    pub fn move_prev(&mut self, list: &QuestionList, visible: impl Fn(usize) -> bool) -> Step {
        let Position::AtQuestion { index, row } = self.position else {
            return Step::Unchanged;
        };
        if row > 0 {
            return self.set(Position::AtQuestion {
                index,
                row: row - 1,
            });
        }
        match (0..index.min(list.len())).rev().find(|&i| visible(i)) {
            Some(prev) => {
                let row = list
                    .get(prev)
                    .map(|e| e.row_count().saturating_sub(1))
                    .unwrap_or(0);
                self.set(Position::AtQuestion { index: prev, row })
            }
            None => self.set(Position::IdEntry),
        }
    }

    /// Jump directly to a question (first row). Hidden questions are not
    /// skipped; out-of-range indices are ignored.
    pub fn focus_question(&mut self, list: &QuestionList, index: usize) -> Step {
        self.focus_row(list, index, 0)
    }

    /// Jump directly to a matrix row.
    pub fn focus_row(&mut self, list: &QuestionList, index: usize, row: usize) -> Step {
        let Some(entry) = list.get(index) else {
            return Step::Unchanged;
        };
        let row = row.min(entry.row_count().saturating_sub(1));
        self.set(Position::AtQuestion { index, row })
    }

    /// Return to identifier entry.
    pub fn reset(&mut self) -> Step {
        self.set(Position::IdEntry)
    }

    /// Leave a question that became hidden: forward to the next visible
    /// question, else backward, else identifier entry.
    pub fn settle(&mut self, list: &QuestionList, visible: impl Fn(usize) -> bool) -> Step {
        let Position::AtQuestion { index, .. } = self.position else {
            return Step::Unchanged;
        };
        if index < list.len() && visible(index) {
            return Step::Unchanged;
        }
        if let Some(next) = (index + 1..list.len()).find(|&i| visible(i)) {
            return self.set(Position::AtQuestion {
                index: next,
                row: 0,
            });
        }
        match (0..index.min(list.len())).rev().find(|&i| visible(i)) {
            Some(prev) => self.set(Position::AtQuestion {
                index: prev,
                row: 0,
            }),
            None => self.set(Position::IdEntry),
        }
    }
}
