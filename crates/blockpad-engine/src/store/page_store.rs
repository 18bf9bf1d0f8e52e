use crate::editing::InsertMode;
use crate::models::{Block, BlockId, BlockType, Page, PageId};

/// Ordered block collection per page
///
/// Every operation is fire-and-forget: unknown ids are logged and ignored.
pub trait PageStore {
    fn insert_block(
        &mut self,
        anchor: BlockId,
        mode: InsertMode,
        content: Option<String>,
        kind: Option<BlockType>,
    );
    fn update_block(&mut self, id: BlockId, content: String);
    fn remove_block(&mut self, id: BlockId);
    fn current_page(&self) -> Option<&Page>;
}

/// In-memory page store holding any number of pages and a current page
#[derive(Debug, Clone, Default)]
pub struct MemoryPageStore {
    pages: Vec<Page>,
    current: Option<PageId>,
}

impl MemoryPageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store with a single page which becomes the current page
    pub fn with_page(page: Page) -> Self {
        let mut store = Self::new();
        store.add_page(page);
        store
    }

    /// Add a page; the first page added becomes current
    pub fn add_page(&mut self, page: Page) -> PageId {
        let id = page.id;
        self.pages.push(page);
        if self.current.is_none() {
            self.current = Some(id);
        }
        id
    }

    pub fn set_current_page(&mut self, id: PageId) -> bool {
        if self.pages.iter().any(|page| page.id == id) {
            self.current = Some(id);
            true
        } else {
            false
        }
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    fn current_page_mut(&mut self) -> Option<&mut Page> {
        let current = self.current?;
        self.pages.iter_mut().find(|page| page.id == current)
    }
}

impl PageStore for MemoryPageStore {
    fn insert_block(
        &mut self,
        anchor: BlockId,
        mode: InsertMode,
        content: Option<String>,
        kind: Option<BlockType>,
    ) {
        let Some(page) = self.current_page_mut() else {
            log::warn!("insert_block ignored: no current page");
            return;
        };
        let Some(anchor_idx) = page.position(anchor) else {
            log::warn!("insert_block ignored: anchor {anchor} not on current page");
            return;
        };

        let block = Block::new(kind.unwrap_or_default(), content.unwrap_or_default());
        let at = match mode {
            InsertMode::Before => anchor_idx,
            InsertMode::After => anchor_idx + 1,
        };
        log::debug!("inserting block {} at {at}", block.id);
        page.content.insert(at, block);
    }

    fn update_block(&mut self, id: BlockId, content: String) {
        match self.current_page_mut().and_then(|page| page.block_mut(id)) {
            Some(block) => block.content = content,
            None => log::warn!("update_block ignored: block {id} not on current page"),
        }
    }

    fn remove_block(&mut self, id: BlockId) {
        let Some(page) = self.current_page_mut() else {
            log::warn!("remove_block ignored: no current page");
            return;
        };
        // A page always keeps at least one block to type into.
        if page.len() <= 1 {
            log::debug!("remove_block ignored: {id} is the last block of the page");
            return;
        }
        if let Some(idx) = page.position(id) {
            page.content.remove(idx);
        } else {
            log::warn!("remove_block ignored: block {id} not on current page");
        }
    }

    fn current_page(&self) -> Option<&Page> {
        let current = self.current?;
        self.pages.iter().find(|page| page.id == current)
    }
}
