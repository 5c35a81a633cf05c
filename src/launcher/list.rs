//! List model and cursor state machine
//!
//! A `ListModel` is the resizable, cursor-tracked sequence behind one tab.
//! It never populates itself: catalog code resizes it and fills the slots.
//!
//! Cursor invariant: when the list is non-empty the cursor is always a valid
//! index. When the list is empty the cursor is inert and nothing is selected.

use core::cmp::Ordering;

use crate::bounded::Text;

// ============================================================================
// List Item
// ============================================================================

/// One row: display text plus an opaque reference into the owning catalog
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListItem {
    /// Display text (at most 63 characters)
    pub text: Text,
    /// Catalog index of the entry this row stands for
    pub payload: Option<usize>,
}

impl ListItem {
    pub fn new(text: &str, payload: usize) -> Self {
        Self {
            text: Text::truncate_from(text),
            payload: Some(payload),
        }
    }
}

// ============================================================================
// Scroll Modes
// ============================================================================

/// How a scroll request moves the cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollMode {
    /// Jump to the given index (out-of-range values wrap like line moves)
    Absolute(isize),
    LineUp,
    LineDown,
    /// Skip back over items sharing the current leading character
    PageUp,
    /// Skip forward over items sharing the current leading character
    PageDown,
}

/// Cursor positions before and after a scroll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scrolled {
    pub previous: usize,
    pub current: usize,
}

impl Scrolled {
    pub fn moved(&self) -> bool {
        self.previous != self.current
    }
}

// ============================================================================
// List Model
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct ListModel {
    items: Vec<ListItem>,
    cursor: usize,
}

impl ListModel {
    pub const fn new() -> Self {
        Self {
            items: Vec::new(),
            cursor: 0,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[inline]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn items(&self) -> &[ListItem] {
        &self.items
    }

    pub fn get(&self, index: usize) -> Option<&ListItem> {
        self.items.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut ListItem> {
        self.items.get_mut(index)
    }

    /// Item under the cursor, or `None` on an empty list
    pub fn selected(&self) -> Option<&ListItem> {
        self.items.get(self.cursor)
    }

    /// Store a cursor position restored from persistent settings.
    ///
    /// The value is not clamped here: the list is usually still empty at
    /// this point and gets populated before `clamp_cursor` runs.
    pub fn restore_cursor(&mut self, position: i32) {
        self.cursor = position.max(0) as usize;
    }

    /// Pull the cursor back into `[0, len - 1]` (0 for an empty list)
    pub fn clamp_cursor(&mut self) {
        self.cursor = self.cursor.min(self.items.len().saturating_sub(1));
    }

    /// Resize to `new_len` items.
    ///
    /// The overlapping prefix is preserved, new slots are blank, and a size
    /// of zero releases the backing storage. Returns false if the size was
    /// already `new_len`.
    pub fn resize(&mut self, new_len: usize) -> bool {
        if new_len == self.items.len() {
            return false;
        }

        if new_len == 0 {
            self.items = Vec::new();
        } else {
            self.items.resize_with(new_len, ListItem::default);
        }

        self.clamp_cursor();
        true
    }

    /// Sort by display text, ignoring ASCII case. Not stable.
    pub fn sort(&mut self) {
        self.items
            .sort_unstable_by(|a, b| compare_ignore_case(&a.text, &b.text));
    }

    /// Move the cursor according to `mode`.
    ///
    /// `visible_rows` bounds how far a page scroll may travel. Moving off
    /// either end wraps to the other. An empty list never moves.
    pub fn scroll(&mut self, mode: ScrollMode, visible_rows: usize) -> Scrolled {
        let previous = self.cursor;
        let len = self.items.len() as isize;

        if len == 0 {
            self.cursor = 0;
            return Scrolled {
                previous,
                current: 0,
            };
        }

        let mut cursor = (self.cursor as isize).min(len - 1);
        let budget = visible_rows.saturating_sub(2).max(1);

        match mode {
            ScrollMode::Absolute(index) => cursor = index,
            ScrollMode::LineUp => cursor -= 1,
            ScrollMode::LineDown => cursor += 1,
            ScrollMode::PageUp => {
                let anchor = self.leading_char(cursor);
                let mut steps = 0;
                loop {
                    cursor -= 1;
                    steps += 1;
                    if cursor <= 0 || steps >= budget || self.leading_char(cursor) != anchor {
                        break;
                    }
                }
            }
            ScrollMode::PageDown => {
                let anchor = self.leading_char(cursor);
                let mut steps = 0;
                loop {
                    cursor += 1;
                    steps += 1;
                    if cursor >= len - 1 || steps >= budget || self.leading_char(cursor) != anchor {
                        break;
                    }
                }
            }
        }

        if cursor < 0 {
            cursor = len - 1;
        }
        if cursor >= len {
            cursor = 0;
        }

        self.cursor = cursor as usize;
        Scrolled {
            previous,
            current: self.cursor,
        }
    }

    /// Overwrite slot `index`. Returns false when out of range.
    pub fn set(&mut self, index: usize, item: ListItem) -> bool {
        match self.items.get_mut(index) {
            Some(slot) => {
                *slot = item;
                true
            }
            None => false,
        }
    }

    fn leading_char(&self, index: isize) -> Option<char> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.items.get(i))
            .and_then(|item| item.text.leading_char())
    }
}

/// `strcasecmp`-style ordering: ASCII letters compare case-insensitively
fn compare_ignore_case(a: &str, b: &str) -> Ordering {
    a.bytes()
        .map(|c| c.to_ascii_lowercase())
        .cmp(b.bytes().map(|c| c.to_ascii_lowercase()))
}
