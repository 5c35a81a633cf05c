//! Bounded, truncating strings
//!
//! Tab names, list labels and status text all live in fixed-size slots on
//! the device. `BoundedString<N>` keeps at most `N` characters and silently
//! drops the rest, so the truncation point is part of the type.

use core::fmt;
use core::ops::Deref;

/// Maximum characters kept for names, labels and status text
pub const TEXT_CAPACITY: usize = 63;

/// Characters of a tab name used to build its settings key
pub const KEY_NAME_CHARS: usize = 11;

/// A string holding at most `N` characters
#[derive(Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BoundedString<const N: usize> {
    text: String,
}

/// The common 63-character text slot
pub type Text = BoundedString<TEXT_CAPACITY>;

impl<const N: usize> BoundedString<N> {
    /// Create an empty string
    pub const fn new() -> Self {
        Self { text: String::new() }
    }

    /// Copy `text`, keeping only its first `N` characters
    pub fn truncate_from(text: &str) -> Self {
        Self {
            text: prefix(text, N).to_owned(),
        }
    }

    /// Replace the contents, truncating to `N` characters
    pub fn set(&mut self, text: &str) {
        self.text.clear();
        self.text.push_str(prefix(text, N));
    }

    pub fn clear(&mut self) {
        self.text.clear();
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// First `count` characters (or everything, if shorter)
    pub fn prefix(&self, count: usize) -> &str {
        prefix(&self.text, count)
    }

    /// First character, used as the alphabetic fast-scroll anchor
    pub fn leading_char(&self) -> Option<char> {
        self.text.chars().next()
    }

    pub const fn capacity() -> usize {
        N
    }
}

impl<const N: usize> Deref for BoundedString<N> {
    type Target = str;

    fn deref(&self) -> &str {
        &self.text
    }
}

impl<const N: usize> From<&str> for BoundedString<N> {
    fn from(text: &str) -> Self {
        Self::truncate_from(text)
    }
}

impl<const N: usize> fmt::Display for BoundedString<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl<const N: usize> fmt::Debug for BoundedString<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.text, f)
    }
}

/// Slice `text` down to its first `count` characters on a char boundary
fn prefix(text: &str, count: usize) -> &str {
    match text.char_indices().nth(count) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncates_at_capacity() {
        let long = "x".repeat(100);
        let text = Text::truncate_from(&long);
        assert_eq!(text.chars().count(), 63);

        let exact = "y".repeat(63);
        assert_eq!(Text::truncate_from(&exact).as_str(), exact);
    }

    #[test]
    fn test_truncation_respects_char_boundaries() {
        let text = BoundedString::<3>::truncate_from("héllo");
        assert_eq!(text.as_str(), "hél");
    }

    #[test]
    fn test_key_prefix() {
        let name = Text::truncate_from("Nintendo Entertainment System");
        assert_eq!(name.prefix(KEY_NAME_CHARS), "Nintendo En");
        assert_eq!(Text::truncate_from("GB").prefix(KEY_NAME_CHARS), "GB");
    }

    #[test]
    fn test_set_and_leading_char() {
        let mut text = Text::new();
        assert_eq!(text.leading_char(), None);
        text.set("Zelda");
        assert_eq!(text.leading_char(), Some('Z'));
        text.clear();
        assert!(text.is_empty());
    }
}
