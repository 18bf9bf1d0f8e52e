use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Block, BlockId};

/// Identifier of a page within a `MemoryPageStore`
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
pub struct PageId(pub Uuid);

impl PageId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PageId {
    fn default() -> Self {
        Self::new()
    }
}

/// Ordered sequence of blocks
///
/// Order is document order and navigation order; the focus index used by
/// the editing layer is a position in `content`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub id: PageId,
    pub title: String,
    pub content: Vec<Block>,
}

impl Page {
    pub fn new(title: impl Into<String>, content: Vec<Block>) -> Self {
        Self {
            id: PageId::new(),
            title: title.into(),
            content,
        }
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&Block> {
        self.content.get(idx)
    }

    pub fn position(&self, id: BlockId) -> Option<usize> {
        self.content.iter().position(|block| block.id == id)
    }

    pub fn block(&self, id: BlockId) -> Option<&Block> {
        self.content.iter().find(|block| block.id == id)
    }

    pub(crate) fn block_mut(&mut self, id: BlockId) -> Option<&mut Block> {
        self.content.iter_mut().find(|block| block.id == id)
    }
}
