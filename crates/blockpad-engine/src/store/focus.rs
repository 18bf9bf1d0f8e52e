/// Process-wide editing focus: which block has focus and where its caret is
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FocusState {
    pub current_focus_block_idx: usize,
    /// Character offset within the focused block's text
    pub cursor_position: usize,
}

pub trait FocusStore {
    fn set_current_focus_block_idx(&mut self, idx: usize);
    fn set_cursor_position(&mut self, offset: usize);
    fn focus_state(&self) -> FocusState;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryFocusStore {
    state: FocusState,
}

impl MemoryFocusStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FocusStore for MemoryFocusStore {
    fn set_current_focus_block_idx(&mut self, idx: usize) {
        self.state.current_focus_block_idx = idx;
    }

    fn set_cursor_position(&mut self, offset: usize) {
        self.state.cursor_position = offset;
    }

    fn focus_state(&self) -> FocusState {
        self.state
    }
}

/// Clamp a possibly negative index into `[0, len - 1]`, or 0 for an empty page
pub fn clamp_focus_index(idx: isize, len: usize) -> usize {
    let max = len.saturating_sub(1);
    usize::try_from(idx.max(0)).unwrap_or(0).min(max)
}
