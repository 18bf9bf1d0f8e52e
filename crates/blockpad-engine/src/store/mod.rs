//! Stores the editing layer reads from and issues commands to.
//!
//! The page store and the focus store are separate collaborators behind
//! traits. `Store` bundles one of each and applies `Cmd`s to them in the
//! order they are dispatched, so everything a handler issues is visible to
//! the next handler that runs.

pub mod focus;
pub mod page_store;

pub use focus::{FocusState, FocusStore, MemoryFocusStore, clamp_focus_index};
pub use page_store::{MemoryPageStore, PageStore};

use crate::editing::Cmd;
use crate::models::Page;

/// Sink for commands issued by event handlers
pub trait Dispatch {
    fn dispatch(&mut self, cmd: Cmd);
}

/// Records commands without applying them
impl Dispatch for Vec<Cmd> {
    fn dispatch(&mut self, cmd: Cmd) {
        self.push(cmd);
    }
}

/// Read side of the stores, observed during reconciliation
pub trait StoreView {
    fn current_page(&self) -> Option<&Page>;
    fn focus(&self) -> FocusState;
}

#[derive(Debug, Clone, Default)]
pub struct Store<P, F> {
    pub pages: P,
    pub focus: F,
    version: u64,
}

impl<P: PageStore, F: FocusStore> Store<P, F> {
    pub fn new(pages: P, focus: F) -> Self {
        Self {
            pages,
            focus,
            version: 0,
        }
    }

    /// Incremented on every applied command, lets hosts skip redundant work
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn apply(&mut self, cmd: Cmd) {
        log::debug!("dispatch {cmd:?}");
        match cmd {
            Cmd::InsertBlock {
                anchor,
                mode,
                content,
                kind,
            } => self.pages.insert_block(anchor, mode, content, kind),
            Cmd::UpdateBlock { id, content } => self.pages.update_block(id, content),
            Cmd::RemoveBlock { id } => self.pages.remove_block(id),
            Cmd::SetCurrentFocusBlockIdx(idx) => self.focus.set_current_focus_block_idx(idx),
            Cmd::SetCursorPosition(offset) => self.focus.set_cursor_position(offset),
        }
        self.version += 1;
    }
}

impl<P: PageStore, F: FocusStore> Dispatch for Store<P, F> {
    fn dispatch(&mut self, cmd: Cmd) {
        self.apply(cmd);
    }
}

impl<P: PageStore, F: FocusStore> StoreView for Store<P, F> {
    fn current_page(&self) -> Option<&Page> {
        self.pages.current_page()
    }

    fn focus(&self) -> FocusState {
        self.focus.focus_state()
    }
}

/// The store used by the terminal host and the tests
pub type MemoryStore = Store<MemoryPageStore, MemoryFocusStore>;

impl MemoryStore {
    pub fn with_page(page: Page) -> Self {
        Store::new(MemoryPageStore::with_page(page), MemoryFocusStore::new())
    }
}
