//! The text the user is composing before it is submitted.

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

/// Single-line editable draft with a character-based cursor
#[derive(Debug, Clone, Default)]
pub struct DraftInput {
    text: String,
    cursor: usize, // in chars, not bytes
}

impl DraftInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    pub fn insert(&mut self, c: char) {
        let byte_pos = char_to_byte_index(&self.text, self.cursor);
        self.text.insert(byte_pos, c);
        self.cursor += 1;
    }

    /// Remove the character before the cursor
    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let byte_pos = char_to_byte_index(&self.text, self.cursor);
            self.text.remove(byte_pos);
        }
    }

    /// Remove the character under the cursor
    pub fn delete(&mut self) {
        if self.cursor < self.char_count() {
            let byte_pos = char_to_byte_index(&self.text, self.cursor);
            self.text.remove(byte_pos);
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.char_count());
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.char_count();
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed(s: &str) -> DraftInput {
        let mut draft = DraftInput::new();
        for c in s.chars() {
            draft.insert(c);
        }
        draft
    }

    #[test]
    fn test_insert_appends_at_cursor() {
        let draft = typed("hello");
        assert_eq!(draft.text(), "hello");
        assert_eq!(draft.cursor(), 5);
    }

    #[test]
    fn test_insert_in_middle() {
        let mut draft = typed("hllo");
        draft.move_home();
        draft.move_right();
        draft.insert('e');
        assert_eq!(draft.text(), "hello");
        assert_eq!(draft.cursor(), 2);
    }

    #[test]
    fn test_backspace_and_delete_are_utf8_safe() {
        let mut draft = typed("añb€");
        draft.backspace();
        assert_eq!(draft.text(), "añb");

        draft.move_home();
        draft.move_right();
        draft.delete();
        assert_eq!(draft.text(), "ab");
        assert_eq!(draft.cursor(), 1);
    }

    #[test]
    fn test_cursor_is_clamped() {
        let mut draft = typed("ab");
        draft.move_right();
        draft.move_right();
        assert_eq!(draft.cursor(), 2);

        draft.move_home();
        draft.move_left();
        draft.backspace();
        assert_eq!(draft.cursor(), 0);
        assert_eq!(draft.text(), "ab");

        draft.move_end();
        draft.delete();
        assert_eq!(draft.text(), "ab");
    }

    #[test]
    fn test_clear_resets_text_and_cursor() {
        let mut draft = typed("some text");
        draft.move_left();
        draft.clear();
        assert_eq!(draft.text(), "");
        assert_eq!(draft.cursor(), 0);
    }
}
