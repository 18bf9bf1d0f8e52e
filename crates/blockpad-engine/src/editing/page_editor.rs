use std::collections::HashMap;

use crate::editing::cell::{BlockCell, KeyOutcome};
use crate::editing::keymap::{Key, KeyEvent};
use crate::editing::selection::{EditableSurface, MemorySurface};
use crate::editing::Cmd;
use crate::models::{Block, BlockId, Page};
use crate::store::{FocusState, FocusStore, PageStore, Store, StoreView};

/// Upper bound on reconcile passes per event; blur commits need a second pass
const MAX_RECONCILE_PASSES: usize = 4;

/// Host for the cells of the current page
///
/// `PageEditor` is the rendering layer a block cell lives in. It keeps one
/// cell per block (keyed by `BlockId`, so cells survive reordering), routes
/// input to the cell whose surface has focus, performs a surface's default
/// action when a handler does not prevent it, and reconciles every cell
/// after each event.
pub struct PageEditor<P, F> {
    store: Store<P, F>,
    cells: Vec<BlockCell<MemorySurface>>,
    /// Cell whose surface holds input focus
    focused: Option<BlockId>,
    /// Block whose add button holds input focus
    add_button: Option<BlockId>,
}

impl<P: PageStore, F: FocusStore> PageEditor<P, F> {
    pub fn new(store: Store<P, F>) -> Self {
        let mut editor = Self {
            store,
            cells: Vec::new(),
            focused: None,
            add_button: None,
        };
        editor.reconcile();
        editor
    }

    pub fn store(&self) -> &Store<P, F> {
        &self.store
    }

    pub fn page(&self) -> Option<&Page> {
        self.store.current_page()
    }

    pub fn focus_state(&self) -> FocusState {
        self.store.focus()
    }

    pub fn cells(&self) -> &[BlockCell<MemorySurface>] {
        &self.cells
    }

    pub fn focused_index(&self) -> Option<usize> {
        let focused = self.focused?;
        self.position(focused)
    }

    pub fn focused_cell(&self) -> Option<&BlockCell<MemorySurface>> {
        self.focused_index().map(|idx| &self.cells[idx])
    }

    /// Index of the block whose add button has focus
    pub fn add_button_index(&self) -> Option<usize> {
        let id = self.add_button?;
        self.position(id)
    }

    fn position(&self, id: BlockId) -> Option<usize> {
        self.cells.iter().position(|cell| cell.block_id() == id)
    }

    /// Key press routed to whichever element has focus
    pub fn key_down(&mut self, event: KeyEvent) -> KeyOutcome {
        if self.add_button.is_some() {
            return self.add_button_key_down(event);
        }
        if self.focused.is_none() {
            self.focus_current();
        }
        let Some(idx) = self.focused_index() else {
            return KeyOutcome::DEFAULT;
        };

        let outcome = self.cells[idx].handle_key_down(&event, &mut self.store);
        if !outcome.prevent_default {
            self.apply_default_action(idx, &event);
        }
        self.reconcile();
        self.key_up();
        outcome
    }

    /// Key release on the focused cell; terminal hosts call this right after
    /// `key_down`, which does it already
    pub fn key_up(&mut self) {
        if let Some(idx) = self.focused_index() {
            self.cells[idx].handle_key_up(&mut self.store);
            self.reconcile();
        }
    }

    /// Mouse click inside block `idx` at character `offset`
    pub fn click(&mut self, idx: usize, offset: usize) {
        let Some(cell) = self.cells.get(idx) else {
            return;
        };
        if cell.surface().is_none() {
            return;
        }
        self.move_focus_to(idx);
        if let Some(surface) = self.cells[idx].surface_mut() {
            surface.click_at(offset);
        }
        self.cells[idx].handle_click(&mut self.store);
        self.reconcile();
    }

    /// Mouse activation of block `idx`'s add button
    pub fn click_add_button(&mut self, idx: usize, alt: bool) {
        let Some(cell) = self.cells.get(idx) else {
            return;
        };
        let id = cell.block_id();
        self.blur();
        self.add_button = Some(id);
        self.cells[idx].handle_add_block(alt, &mut self.store);
        self.reconcile();
    }

    /// Move input focus from the focused cell to its add button
    pub fn focus_add_button(&mut self) {
        let Some(id) = self.focused else {
            return;
        };
        self.blur();
        self.add_button = Some(id);
    }

    fn add_button_key_down(&mut self, event: KeyEvent) -> KeyOutcome {
        let Some(idx) = self.add_button_index() else {
            self.add_button = None;
            return KeyOutcome::DEFAULT;
        };
        let outcome = self.cells[idx].handle_add_button_keydown(&event, &mut self.store);
        if !outcome.prevent_default && event.key == Key::Tab {
            // Focus traversal: the button hands focus back to its editor
            self.move_focus_to(idx);
        }
        self.reconcile();
        outcome
    }

    /// Give focus back to the cell at the store's focus index
    pub fn focus_current(&mut self) {
        let len = self.cells.len();
        if len == 0 {
            return;
        }
        let idx = self.store.focus().current_focus_block_idx.min(len - 1);
        self.move_focus_to(idx);
        self.reconcile();
    }

    /// Remove input focus from the page, committing the focused cell's text
    pub fn blur(&mut self) {
        if let Some(idx) = self.focused_index() {
            self.cells[idx].handle_blur(&mut self.store);
            self.cells[idx].release_focus();
        }
        self.focused = None;
        self.add_button = None;
        self.reconcile();
    }

    /// What the surface does on its own for a key nobody prevented
    fn apply_default_action(&mut self, idx: usize, event: &KeyEvent) {
        let cell = &mut self.cells[idx];
        let Some(surface) = cell.surface_mut() else {
            return;
        };
        let modifiers = event.modifiers;
        let text_changed = match event.key {
            Key::Char(ch) if !modifiers.ctrl && !modifiers.alt => {
                surface.insert_char(ch);
                true
            }
            Key::Enter if modifiers.shift => {
                surface.insert_newline();
                true
            }
            Key::Backspace => surface.delete_backward(),
            Key::Delete => surface.delete_forward(),
            Key::ArrowLeft => {
                surface.move_left();
                false
            }
            Key::ArrowRight => {
                surface.move_right();
                false
            }
            Key::Home => {
                surface.move_home();
                false
            }
            Key::End => {
                surface.move_end();
                false
            }
            _ => false,
        };
        if text_changed {
            cell.handle_input();
        }
    }

    /// Blur the focused cell and focus cell `idx`, as a platform would
    fn move_focus_to(&mut self, idx: usize) {
        let target = self.cells[idx].block_id();
        if self.focused != Some(target)
            && let Some(previous) = self.focused_index()
        {
            self.cells[previous].handle_blur(&mut self.store);
            self.cells[previous].release_focus();
        }
        self.add_button = None;
        self.focused = Some(target);
        self.cells[idx].take_focus();
    }

    /// Run reconciliation until the stores stop changing
    fn reconcile(&mut self) {
        for _ in 0..MAX_RECONCILE_PASSES {
            let version = self.store.version();
            self.reconcile_pass();
            if self.store.version() == version {
                return;
            }
        }
        log::warn!("reconcile did not settle after {MAX_RECONCILE_PASSES} passes");
    }

    /// Live text of every block: the surface text for the focused cell,
    /// stored content elsewhere
    pub fn texts(&self) -> Vec<String> {
        self.cells
            .iter()
            .map(|cell| match cell.surface() {
                Some(surface) if surface.is_focused() => surface.text_content(),
                _ => cell.block().content.clone(),
            })
            .collect()
    }

    fn reconcile_pass(&mut self) {
        self.clamp_focus_index();
        let blocks: Vec<Block> = self
            .store
            .current_page()
            .map(|page| page.content.clone())
            .unwrap_or_default();
        self.sync_cells(&blocks);

        let mut claimant = None;
        for (idx, (cell, block)) in self.cells.iter_mut().zip(&blocks).enumerate() {
            if cell.reconcile(block, idx, &self.store) {
                claimant = Some(idx);
            }
        }
        for cell in &mut self.cells {
            cell.render();
        }
        if let Some(idx) = claimant {
            self.move_focus_to(idx);
        }
    }

    fn clamp_focus_index(&mut self) {
        let len = self.store.current_page().map_or(0, Page::len);
        let focus = self.store.focus().current_focus_block_idx;
        if len > 0 && focus > len - 1 {
            log::debug!("clamping focus index {focus} to {}", len - 1);
            self.store.apply(Cmd::SetCurrentFocusBlockIdx(len - 1));
        }
    }

    /// Create, reuse and drop cells so they line up with `blocks`
    fn sync_cells(&mut self, blocks: &[Block]) {
        let mut existing: HashMap<BlockId, BlockCell<MemorySurface>> = self
            .cells
            .drain(..)
            .map(|cell| (cell.block_id(), cell))
            .collect();

        self.cells = blocks
            .iter()
            .enumerate()
            .map(|(idx, block)| {
                existing.remove(&block.id).unwrap_or_else(|| {
                    log::trace!("mounting cell for block {} at {idx}", block.id);
                    BlockCell::mount(block.clone(), idx)
                })
            })
            .collect();

        // Dropped cells take their focus with them, without a blur commit.
        if self.focused.is_some_and(|id| existing.contains_key(&id)) {
            self.focused = None;
        }
        if self.add_button.is_some_and(|id| existing.contains_key(&id)) {
            self.add_button = None;
        }
    }
}
