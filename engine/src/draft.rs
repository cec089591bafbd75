//! Single-line text drafts with grapheme-aware cursor handling.

use unicode_segmentation::UnicodeSegmentation;

/// An in-progress text entry. The cursor is a grapheme index, never a byte
/// offset, so emoji and combining characters edit as one unit.
#[derive(Debug, Default, Clone)]
pub struct Draft {
    text: String,
    cursor: usize,
}

impl Draft {
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Cursor position in graphemes, `0..=grapheme_count`.
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Byte offset of the cursor, for render-side slicing.
    #[must_use]
    pub fn byte_index(&self) -> usize {
        self.byte_index_at(self.cursor)
    }

    #[must_use]
    pub fn grapheme_count(&self) -> usize {
        self.text.graphemes(true).count()
    }

    /// Hand the text to the caller and leave an empty draft behind.
    pub fn take_text(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.text)
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    pub fn set_text(&mut self, text: String) {
        self.text = text;
        self.cursor = self.grapheme_count();
    }

    pub fn enter_char(&mut self, new_char: char) {
        let index = self.byte_index();
        self.text.insert(index, new_char);
        self.move_cursor_right();
    }

    pub fn enter_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let index = self.byte_index();
        self.text.insert_str(index, text);
        let inserted = text.graphemes(true).count();
        self.cursor = self.clamp_cursor(self.cursor.saturating_add(inserted));
    }

    /// Remove the grapheme before the cursor (backspace).
    pub fn delete_char(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let start = self.byte_index_at(self.cursor - 1);
        let end = self.byte_index_at(self.cursor);
        self.text.replace_range(start..end, "");
        self.move_cursor_left();
    }

    /// Remove the grapheme under the cursor (delete).
    pub fn delete_char_forward(&mut self) {
        if self.cursor >= self.grapheme_count() {
            return;
        }
        let start = self.byte_index_at(self.cursor);
        let end = self.byte_index_at(self.cursor + 1);
        self.text.replace_range(start..end, "");
    }

    /// Remove trailing whitespace, then one word, before the cursor.
    pub fn delete_word_backwards(&mut self) {
        while self.cursor > 0 && self.grapheme_is_whitespace(self.cursor - 1) {
            self.delete_char();
        }
        while self.cursor > 0 && !self.grapheme_is_whitespace(self.cursor - 1) {
            self.delete_char();
        }
    }

    pub fn move_cursor_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_cursor_right(&mut self) {
        self.cursor = self.clamp_cursor(self.cursor.saturating_add(1));
    }

    pub fn move_cursor_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_cursor_end(&mut self) {
        self.cursor = self.grapheme_count();
    }

    fn grapheme_is_whitespace(&self, index: usize) -> bool {
        self.text
            .graphemes(true)
            .nth(index)
            .is_some_and(|grapheme| grapheme.chars().all(char::is_whitespace))
    }

    fn byte_index_at(&self, grapheme_index: usize) -> usize {
        self.text
            .grapheme_indices(true)
            .nth(grapheme_index)
            .map_or(self.text.len(), |(i, _)| i)
    }

    fn clamp_cursor(&self, new_cursor: usize) -> usize {
        new_cursor.min(self.grapheme_count())
    }
}

#[cfg(test)]
mod tests {
    use super::Draft;

    fn draft(text: &str) -> Draft {
        let mut draft = Draft::default();
        draft.set_text(text.to_string());
        draft
    }

    #[test]
    fn set_text_moves_cursor_to_end() {
        let d = draft("remember the keys");
        assert_eq!(d.cursor(), 17);
        assert_eq!(d.byte_index(), d.text().len());
    }

    #[test]
    fn enter_char_in_middle() {
        let mut d = draft("hllo");
        d.move_cursor_home();
        d.move_cursor_right();
        d.enter_char('e');
        assert_eq!(d.text(), "hello");
        assert_eq!(d.cursor(), 2);
    }

    #[test]
    fn enter_text_advances_by_graphemes() {
        let mut d = Draft::default();
        d.enter_text("día 🦀");
        assert_eq!(d.cursor(), 5);
        assert_eq!(d.grapheme_count(), 5);
    }

    #[test]
    fn delete_char_at_start_is_a_no_op() {
        let mut d = draft("hola");
        d.move_cursor_home();
        d.delete_char();
        assert_eq!(d.text(), "hola");
        assert_eq!(d.cursor(), 0);
    }

    #[test]
    fn delete_removes_whole_emoji() {
        let mut d = draft("a🦀b");
        d.move_cursor_left(); // between 🦀 and b
        d.delete_char();
        assert_eq!(d.text(), "ab");
        assert_eq!(d.cursor(), 1);
    }

    #[test]
    fn delete_forward_at_end_is_a_no_op() {
        let mut d = draft("hola");
        d.delete_char_forward();
        assert_eq!(d.text(), "hola");
    }

    #[test]
    fn delete_forward_removes_under_cursor() {
        let mut d = draft("hxello");
        d.move_cursor_home();
        d.move_cursor_right();
        d.delete_char_forward();
        assert_eq!(d.text(), "hello");
        assert_eq!(d.cursor(), 1);
    }

    #[test]
    fn delete_word_backwards_eats_trailing_spaces_then_word() {
        let mut d = draft("call nurse   ");
        d.delete_word_backwards();
        assert_eq!(d.text(), "call ");
        assert_eq!(d.cursor(), 5);
    }

    #[test]
    fn delete_word_backwards_at_start_is_a_no_op() {
        let mut d = draft("hola");
        d.move_cursor_home();
        d.delete_word_backwards();
        assert_eq!(d.text(), "hola");
    }

    #[test]
    fn cursor_clamps_at_both_ends() {
        let mut d = draft("ab");
        d.move_cursor_right();
        assert_eq!(d.cursor(), 2);
        d.move_cursor_home();
        d.move_cursor_left();
        assert_eq!(d.cursor(), 0);
    }

    #[test]
    fn byte_index_accounts_for_multibyte_graphemes() {
        let mut d = draft("a🦀b");
        d.move_cursor_left();
        assert_eq!(d.byte_index(), 5); // 'a' is 1 byte, '🦀' is 4
    }

    #[test]
    fn take_text_resets_the_draft() {
        let mut d = draft("met Ana at the park");
        let text = d.take_text();
        assert_eq!(text, "met Ana at the park");
        assert!(d.is_empty());
        assert_eq!(d.cursor(), 0);
    }
}
