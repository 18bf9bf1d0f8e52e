//! Bridge between a block cell and the editable element it drives.
//!
//! A cell never touches a platform text widget directly. It reads the live
//! text and caret through `EditableSurface` / `SelectionBridge`, which keeps
//! the split, merge and navigation logic testable against `MemorySurface`.

/// Where a restored caret is anchored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaretTarget {
    /// Inside the element's text node
    TextNode,
    /// On the element itself, used when it holds no text node
    Container,
}

/// The editable element a cell renders into
pub trait EditableSurface {
    /// Live text as currently shown, including edits the cell has not seen yet
    fn text_content(&self) -> String;
    fn set_text_content(&mut self, text: &str);
    fn has_text_node(&self) -> bool {
        !self.text_content().is_empty()
    }
    /// Request input focus; returns true when focus was not held before
    fn focus(&mut self) -> bool;
    fn blur(&mut self);
    fn is_focused(&self) -> bool;
}

/// Platform text selection, reduced to a single caret offset
pub trait SelectionBridge {
    /// Start offset of the active range, `None` when there is no selection
    fn caret_offset(&self) -> Option<usize>;
    fn set_caret_offset(&mut self, target: CaretTarget, offset: usize);
    /// Whether the platform exposes a selection API at all
    fn is_available(&self) -> bool {
        true
    }
}

/// Surface the terminal host and tests use
///
/// Offsets are character offsets. The caret is `None` until the surface is
/// focused or clicked, mirroring a platform selection that does not exist
/// yet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemorySurface {
    text: String,
    caret: Option<usize>,
    focused: bool,
    caret_target: Option<CaretTarget>,
}

impl MemorySurface {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn caret(&self) -> Option<usize> {
        self.caret
    }

    /// Where the last restored caret was anchored
    pub fn caret_target(&self) -> Option<CaretTarget> {
        self.caret_target
    }

    fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    fn byte_index(&self, char_offset: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_offset)
            .map(|(idx, _)| idx)
            .unwrap_or(self.text.len())
    }

    /// Place the caret as a mouse click would
    pub fn click_at(&mut self, offset: usize) {
        self.caret = Some(offset.min(self.char_len()));
    }

    pub fn insert_char(&mut self, ch: char) {
        let caret = self.caret.unwrap_or(self.char_len()).min(self.char_len());
        let at = self.byte_index(caret);
        self.text.insert(at, ch);
        self.caret = Some(caret + 1);
    }

    pub fn insert_newline(&mut self) {
        self.insert_char('\n');
    }

    /// Default Backspace action; returns false when there was nothing to delete
    pub fn delete_backward(&mut self) -> bool {
        let caret = self.caret.unwrap_or(self.char_len()).min(self.char_len());
        if caret == 0 {
            return false;
        }
        let at = self.byte_index(caret - 1);
        self.text.remove(at);
        self.caret = Some(caret - 1);
        true
    }

    /// Default Delete action; returns false when there was nothing to delete
    pub fn delete_forward(&mut self) -> bool {
        let Some(caret) = self.caret else {
            return false;
        };
        if caret >= self.char_len() {
            return false;
        }
        let at = self.byte_index(caret);
        self.text.remove(at);
        true
    }

    pub fn move_left(&mut self) {
        if let Some(caret) = self.caret {
            self.caret = Some(caret.saturating_sub(1));
        }
    }

    pub fn move_right(&mut self) {
        if let Some(caret) = self.caret {
            self.caret = Some((caret + 1).min(self.char_len()));
        }
    }

    pub fn move_home(&mut self) {
        if self.caret.is_some() {
            self.caret = Some(0);
        }
    }

    pub fn move_end(&mut self) {
        if self.caret.is_some() {
            self.caret = Some(self.char_len());
        }
    }
}

impl EditableSurface for MemorySurface {
    fn text_content(&self) -> String {
        self.text.clone()
    }

    fn set_text_content(&mut self, text: &str) {
        self.text = text.to_string();
        let len = self.char_len();
        if let Some(caret) = self.caret {
            self.caret = Some(caret.min(len));
        }
    }

    fn focus(&mut self) -> bool {
        let gained = !self.focused;
        self.focused = true;
        gained
    }

    fn blur(&mut self) {
        self.focused = false;
        self.caret = None;
    }

    fn is_focused(&self) -> bool {
        self.focused
    }
}

impl SelectionBridge for MemorySurface {
    fn caret_offset(&self) -> Option<usize> {
        self.caret
    }

    fn set_caret_offset(&mut self, target: CaretTarget, offset: usize) {
        self.caret = Some(offset.min(self.char_len()));
        self.caret_target = Some(target);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_typing_inserts_at_caret() {
        let mut surface = MemorySurface::new("Hllo");
        surface.click_at(1);
        surface.insert_char('e');
        assert_eq!(surface.text_content(), "Hello");
        assert_eq!(surface.caret(), Some(2));
    }

    #[test]
    fn test_multibyte_editing_uses_char_offsets() {
        let mut surface = MemorySurface::new("añb");
        surface.click_at(2);
        assert!(surface.delete_backward());
        assert_eq!(surface.text_content(), "ab");
        assert_eq!(surface.caret(), Some(1));
    }

    #[test]
    fn test_delete_backward_at_start_is_a_no_op() {
        let mut surface = MemorySurface::new("abc");
        surface.click_at(0);
        assert!(!surface.delete_backward());
        assert_eq!(surface.text_content(), "abc");
    }

    #[test]
    fn test_delete_forward() {
        let mut surface = MemorySurface::new("abc");
        surface.click_at(1);
        assert!(surface.delete_forward());
        assert_eq!(surface.text_content(), "ac");
        surface.move_end();
        assert!(!surface.delete_forward());
    }

    #[test]
    fn test_caret_is_clamped_when_text_shrinks() {
        let mut surface = MemorySurface::new("Hello World");
        surface.click_at(11);
        surface.set_text_content("Hello");
        assert_eq!(surface.caret_offset(), Some(5));
    }

    #[test]
    fn test_focus_reports_only_gains() {
        let mut surface = MemorySurface::new("");
        assert!(surface.focus());
        assert!(!surface.focus());
        surface.blur();
        assert!(!surface.is_focused());
        assert_eq!(surface.caret_offset(), None);
    }

    #[test]
    fn test_set_caret_offset_records_target() {
        let mut surface = MemorySurface::new("");
        surface.set_caret_offset(CaretTarget::Container, 3);
        assert_eq!(surface.caret_offset(), Some(0));
        assert_eq!(surface.caret_target(), Some(CaretTarget::Container));
    }
}
