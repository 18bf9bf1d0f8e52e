use crate::editing::keymap::{ButtonAction, KeyAction, KeyEvent, Keymap};
use crate::editing::selection::{CaretTarget, EditableSurface, MemorySurface, SelectionBridge};
use crate::editing::{Cmd, InsertMode};
use crate::models::{Block, BlockId, BlockType, Page};
use crate::store::{Dispatch, StoreView, clamp_focus_index};

/// Result of a key handler: whether the surface's default action is suppressed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyOutcome {
    pub prevent_default: bool,
}

impl KeyOutcome {
    pub const PREVENTED: KeyOutcome = KeyOutcome {
        prevent_default: true,
    };
    pub const DEFAULT: KeyOutcome = KeyOutcome {
        prevent_default: false,
    };
}

/// Latest store values, refreshed by `reconcile` and read by the handlers
///
/// Handlers must read these instead of values captured when the cell was
/// last rendered: several keys can arrive before the host re-renders.
#[derive(Debug, Clone, Default)]
pub struct LatestRefs {
    /// Focus index clamped to the page length
    pub focus_idx: usize,
    pub cursor: usize,
    pub page: Option<Page>,
}

impl LatestRefs {
    fn page_len(&self) -> usize {
        self.page.as_ref().map_or(0, Page::len)
    }
}

/// Editor for a single block of a page
///
/// Only text-type blocks get a surface. Every handler of a cell without a
/// surface is a no-op, matching a block that renders nothing editable.
pub struct BlockCell<S> {
    block: Block,
    idx: usize,
    surface: Option<S>,
    /// Local copy of the text, flushed to the page store on blur
    block_text: String,
    latest: LatestRefs,
    /// Store focus index and cell index seen by the last focus effect
    focus_deps: Option<(usize, usize)>,
    keymap: Keymap<KeyAction>,
    button_keymap: Keymap<ButtonAction>,
}

impl<S: EditableSurface + SelectionBridge> BlockCell<S> {
    pub fn new(block: Block, idx: usize, surface: Option<S>) -> Self {
        let block_text = mirrored_text(&block);
        let mut cell = Self {
            block,
            idx,
            surface,
            block_text,
            latest: LatestRefs::default(),
            focus_deps: None,
            keymap: Keymap::block_editor(),
            button_keymap: Keymap::add_button(),
        };
        cell.render();
        cell
    }

    pub fn block(&self) -> &Block {
        &self.block
    }

    pub fn block_id(&self) -> BlockId {
        self.block.id
    }

    pub fn idx(&self) -> usize {
        self.idx
    }

    pub fn block_text(&self) -> &str {
        &self.block_text
    }

    pub fn latest(&self) -> &LatestRefs {
        &self.latest
    }

    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    pub fn surface_mut(&mut self) -> Option<&mut S> {
        self.surface.as_mut()
    }

    pub fn is_focused(&self) -> bool {
        self.surface.as_ref().is_some_and(|s| s.is_focused())
    }

    /// Add-button activation: alt inserts before this block, otherwise after
    pub fn handle_add_block(&self, alt: bool, dispatch: &mut impl Dispatch) {
        dispatch.dispatch(Cmd::InsertBlock {
            anchor: self.block.id,
            mode: InsertMode::from_alt(alt),
            content: None,
            kind: None,
        });
    }

    /// Keyboard activation of the add button, which also moves focus
    pub fn handle_add_button_keydown(
        &self,
        event: &KeyEvent,
        dispatch: &mut impl Dispatch,
    ) -> KeyOutcome {
        match self.button_keymap.resolve(event) {
            Some(ButtonAction::AddBlock) => {
                let Some(page) = &self.latest.page else {
                    return KeyOutcome::PREVENTED;
                };
                let alt = event.modifiers.alt;
                let step = if alt { -1 } else { 1 };
                dispatch.dispatch(Cmd::InsertBlock {
                    anchor: self.block.id,
                    mode: InsertMode::from_alt(alt),
                    content: None,
                    kind: None,
                });
                dispatch.dispatch(Cmd::SetCurrentFocusBlockIdx(clamp_focus_index(
                    self.latest.focus_idx as isize + step,
                    page.len(),
                )));
                KeyOutcome::PREVENTED
            }
            Some(ButtonAction::PassThrough) | None => KeyOutcome::DEFAULT,
        }
    }

    /// Commit the live text when it differs from the stored content
    pub fn handle_blur(&self, dispatch: &mut impl Dispatch) {
        let Some(surface) = &self.surface else {
            return;
        };
        let new_text = surface.text_content();
        if self.block.content != new_text {
            dispatch.dispatch(Cmd::UpdateBlock {
                id: self.block.id,
                content: new_text,
            });
        }
    }

    /// Text changed on the surface; only the local mirror follows
    pub fn handle_input(&mut self) {
        if let Some(surface) = &self.surface {
            self.block_text = surface.text_content();
        }
    }

    pub fn handle_key_up(&self, dispatch: &mut impl Dispatch) {
        if let Some(offset) = self.surface.as_ref().and_then(|s| s.caret_offset()) {
            dispatch.dispatch(Cmd::SetCursorPosition(offset));
        }
    }

    pub fn handle_key_down(
        &mut self,
        event: &KeyEvent,
        dispatch: &mut impl Dispatch,
    ) -> KeyOutcome {
        let Some(surface) = &self.surface else {
            return KeyOutcome::DEFAULT;
        };
        let live_text = surface.text_content();
        let Some(action) = self.keymap.resolve(event) else {
            return KeyOutcome::DEFAULT;
        };

        let alt = event.modifiers.alt;
        match action {
            KeyAction::Navigate(direction) => {
                let next = clamp_focus_index(
                    self.latest.focus_idx as isize + direction.step(),
                    self.latest.page_len(),
                );
                dispatch.dispatch(Cmd::SetCurrentFocusBlockIdx(next));
                KeyOutcome::PREVENTED
            }
            KeyAction::Split => {
                self.split(&live_text, alt, dispatch);
                KeyOutcome::PREVENTED
            }
            KeyAction::SoftNewline => {
                // Local only; the surface inserts the line break itself and
                // the text reaches the store on blur.
                self.block_text = live_text + "\n";
                KeyOutcome::DEFAULT
            }
            KeyAction::Backspace => self.backspace(&live_text, dispatch),
            KeyAction::InsertHeading(level) => {
                let step = if alt { 0 } else { 1 };
                dispatch.dispatch(Cmd::InsertBlock {
                    anchor: self.block.id,
                    mode: InsertMode::from_alt(alt),
                    content: Some(String::new()),
                    kind: BlockType::heading(level),
                });
                dispatch.dispatch(Cmd::SetCurrentFocusBlockIdx(self.idx + step));
                KeyOutcome::PREVENTED
            }
            KeyAction::RemoveBlock => {
                // Focus stays on the same index; reconciliation clamps it.
                dispatch.dispatch(Cmd::RemoveBlock { id: self.block.id });
                KeyOutcome::PREVENTED
            }
        }
    }

    fn split(&mut self, live_text: &str, alt: bool, dispatch: &mut impl Dispatch) {
        let (left, right) = split_at_char(live_text, self.latest.cursor);
        let mode = InsertMode::from_alt(alt);
        let step = if alt { 0 } else { 1 };
        let new_cursor = match mode {
            InsertMode::Before => 0,
            InsertMode::After => right.chars().count(),
        };

        self.block_text = left.to_string();
        dispatch.dispatch(Cmd::UpdateBlock {
            id: self.block.id,
            content: left.to_string(),
        });
        dispatch.dispatch(Cmd::InsertBlock {
            anchor: self.block.id,
            mode,
            content: Some(right.to_string()),
            kind: None,
        });
        dispatch.dispatch(Cmd::SetCurrentFocusBlockIdx(self.idx + step));
        dispatch.dispatch(Cmd::SetCursorPosition(new_cursor));
    }

    fn backspace(&self, live_text: &str, dispatch: &mut impl Dispatch) -> KeyOutcome {
        // The predecessor is taken from this cell's own position; the store's
        // focus index may sit on a non-text block the caret never entered.
        let preceding = self.idx.checked_sub(1).and_then(|idx| {
            let block = self.latest.page.as_ref()?.get(idx)?;
            Some((idx, block))
        });

        if live_text.is_empty() {
            dispatch.dispatch(Cmd::RemoveBlock { id: self.block.id });
            if let Some((preceding_idx, preceding)) = preceding {
                dispatch.dispatch(Cmd::SetCurrentFocusBlockIdx(preceding_idx));
                dispatch.dispatch(Cmd::SetCursorPosition(preceding.char_len()));
            }
            return KeyOutcome::PREVENTED;
        }

        match preceding {
            Some((preceding_idx, preceding))
                if self.latest.cursor == 0 && preceding.is_text_type() =>
            {
                let merged = format!("{}{}", preceding.content, live_text);
                let seam = preceding.char_len();
                dispatch.dispatch(Cmd::UpdateBlock {
                    id: preceding.id,
                    content: merged,
                });
                dispatch.dispatch(Cmd::RemoveBlock { id: self.block.id });
                dispatch.dispatch(Cmd::SetCurrentFocusBlockIdx(preceding_idx));
                dispatch.dispatch(Cmd::SetCursorPosition(seam));
                KeyOutcome::PREVENTED
            }
            _ => KeyOutcome::DEFAULT,
        }
    }

    /// Surface gained focus: put the caret back where the store says it was
    pub fn handle_focus(&mut self) {
        let cursor = self.latest.cursor;
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        if !surface.is_available() {
            return;
        }
        let len = surface.text_content().chars().count();
        if surface.has_text_node() {
            surface.set_caret_offset(CaretTarget::TextNode, cursor.min(len));
        } else {
            surface.set_caret_offset(CaretTarget::Container, len);
        }
    }

    /// A click is the one interaction that claims the focus index directly
    pub fn handle_click(&self, dispatch: &mut impl Dispatch) {
        if let Some(offset) = self.surface.as_ref().and_then(|s| s.caret_offset()) {
            dispatch.dispatch(Cmd::SetCursorPosition(offset));
            dispatch.dispatch(Cmd::SetCurrentFocusBlockIdx(self.idx));
        }
    }

    /// Refresh props and latest-value references after a store change
    ///
    /// Returns true when the focus effect fired and this cell should take
    /// surface focus. The effect only fires when the store's focus index or
    /// this cell's position changed since the previous call, so a cell that
    /// gave focus away is not pulled back on unrelated updates.
    pub fn reconcile(&mut self, block: &Block, idx: usize, view: &impl StoreView) -> bool {
        let focus = view.focus();
        self.latest.cursor = focus.cursor_position;

        if *block != self.block {
            self.block = block.clone();
            self.block_text = mirrored_text(block);
        }
        self.idx = idx;
        self.latest.page = view.current_page().cloned();
        self.latest.focus_idx = clamp_focus_index(
            focus.current_focus_block_idx as isize,
            self.latest.page_len(),
        );

        let deps = (focus.current_focus_block_idx, idx);
        if self.focus_deps == Some(deps) {
            return false;
        }
        self.focus_deps = Some(deps);
        self.latest.focus_idx == idx && self.surface.as_ref().is_some_and(|s| !s.is_focused())
    }

    /// Take surface focus, restoring the caret when focus was newly gained
    pub fn take_focus(&mut self) {
        if self.surface.as_mut().is_some_and(|s| s.focus()) {
            self.handle_focus();
        }
    }

    pub fn release_focus(&mut self) {
        if let Some(surface) = self.surface.as_mut() {
            surface.blur();
        }
    }

    /// Push the local mirror into the surface when they disagree
    pub fn render(&mut self) {
        if let Some(surface) = self.surface.as_mut()
            && surface.text_content() != self.block_text
        {
            surface.set_text_content(&self.block_text);
        }
    }
}

impl BlockCell<MemorySurface> {
    /// Cell with an in-memory surface for text-type blocks
    pub fn mount(block: Block, idx: usize) -> Self {
        let surface = block.is_text_type().then(MemorySurface::default);
        Self::new(block, idx, surface)
    }
}

fn mirrored_text(block: &Block) -> String {
    if block.is_text_type() {
        block.content.clone()
    } else {
        String::new()
    }
}

/// Split at a character offset, clamped to the text length
pub fn split_at_char(text: &str, offset: usize) -> (&str, &str) {
    let at = text
        .char_indices()
        .nth(offset)
        .map(|(idx, _)| idx)
        .unwrap_or(text.len());
    text.split_at(at)
}
