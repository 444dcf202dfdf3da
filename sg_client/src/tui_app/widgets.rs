use ratatui::widgets::{ListItem, ListState, ScrollbarState};
use std::collections::VecDeque;

/// A bounded list of items with a selection and a matching scrollbar.
/// Newest items sit at index 0 so the list can be drawn bottom-to-top.
pub struct ScrollableList {
    max_items: usize,
    pub list_items: VecDeque<ListItem<'static>>,
    pub list_state: ListState,
    pub scroll_state: ScrollbarState,
}

impl ScrollableList {
    pub fn new(max_items: usize) -> Self {
        Self {
            max_items,
            list_items: VecDeque::new(),
            list_state: ListState::default(),
            scroll_state: ScrollbarState::default(),
        }
    }

    pub fn push(&mut self, item: ListItem<'static>) {
        if self.list_items.len() == self.max_items {
            self.list_items.pop_back();
        }
        self.list_items.push_front(item);
        self.scroll_state = self.scroll_state.content_length(self.list_items.len());
        self.jump_to_last();
    }

    /// Select the oldest item.
    pub fn jump_to_first(&mut self) {
        if let Some(idx) = self.list_items.len().checked_sub(1) {
            self.select(idx);
        }
    }

    /// Select the newest item.
    pub fn jump_to_last(&mut self) {
        if !self.list_items.is_empty() {
            self.select(0);
        }
    }

    pub fn move_up(&mut self) {
        let idx = self.list_state.selected().map_or(0, |idx| idx + 1);
        if idx < self.list_items.len() {
            self.select(idx);
        }
    }

    pub fn move_down(&mut self) {
        if let Some(idx) = self.list_state.selected().and_then(|idx| idx.checked_sub(1)) {
            self.select(idx);
        }
    }

    fn select(&mut self, idx: usize) {
        self.list_state.select(Some(idx));
        let position = self.list_items.len().saturating_sub(idx + 1);
        self.scroll_state = self.scroll_state.position(position);
    }
}

/// A single-line text input with a character cursor.
#[derive(Debug, Default)]
pub struct UserInput {
    pub value: String,
    /// Cursor position in characters, not bytes.
    pub char_idx: usize,
}

impl UserInput {
    pub fn new() -> Self {
        Self::default()
    }

    fn byte_idx(&self) -> usize {
        self.value
            .char_indices()
            .nth(self.char_idx)
            .map_or(self.value.len(), |(idx, _)| idx)
    }

    fn char_count(&self) -> usize {
        self.value.chars().count()
    }

    pub fn input(&mut self, c: char) {
        let idx = self.byte_idx();
        self.value.insert(idx, c);
        self.char_idx += 1;
    }

    pub fn backspace(&mut self) {
        if self.char_idx > 0 {
            self.char_idx -= 1;
            let idx = self.byte_idx();
            self.value.remove(idx);
        }
    }

    pub fn delete(&mut self) {
        if self.char_idx < self.char_count() {
            let idx = self.byte_idx();
            self.value.remove(idx);
        }
    }

    pub fn move_left(&mut self) {
        self.char_idx = self.char_idx.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.char_idx = (self.char_idx + 1).min(self.char_count());
    }

    pub fn jump_to_first(&mut self) {
        self.char_idx = 0;
    }

    pub fn jump_to_last(&mut self) {
        self.char_idx = self.char_count();
    }

    /// Take the current value, leaving the input empty.
    pub fn submit(&mut self) -> String {
        self.char_idx = 0;
        std::mem::take(&mut self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_input_editing() {
        let mut input = UserInput::new();
        for c in "shot".chars() {
            input.input(c);
        }
        input.move_left();
        input.input('o');
        assert_eq!(input.value, "shoot");
        input.jump_to_first();
        input.delete();
        input.jump_to_last();
        input.backspace();
        assert_eq!(input.value, "hoo");
        assert_eq!(input.submit(), "hoo");
        assert!(input.value.is_empty());
        assert_eq!(input.char_idx, 0);
    }

    #[test]
    fn test_user_input_multibyte() {
        let mut input = UserInput::new();
        input.input('é');
        input.input('x');
        input.move_left();
        input.backspace();
        assert_eq!(input.value, "x");
    }

    #[test]
    fn test_scrollable_list_is_bounded() {
        let mut list = ScrollableList::new(3);
        for i in 0..5 {
            list.push(format!("{i}").into());
        }
        assert_eq!(list.list_items.len(), 3);
        assert_eq!(list.list_state.selected(), Some(0));
        list.move_up();
        list.move_up();
        list.move_up();
        assert_eq!(list.list_state.selected(), Some(2));
        list.move_down();
        assert_eq!(list.list_state.selected(), Some(1));
        list.jump_to_last();
        assert_eq!(list.list_state.selected(), Some(0));
    }
}
