use crate::models::{BlockId, BlockType};

/// Where a new block goes relative to its anchor block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertMode {
    Before,
    After,
}

impl InsertMode {
    /// Alt selects `Before`, otherwise `After`
    pub fn from_alt(alt: bool) -> Self {
        if alt {
            InsertMode::Before
        } else {
            InsertMode::After
        }
    }
}

/// Commands a block cell issues against the page and focus stores
#[derive(Debug, Clone, PartialEq)]
pub enum Cmd {
    InsertBlock {
        anchor: BlockId,
        mode: InsertMode,
        content: Option<String>,
        kind: Option<BlockType>,
    },
    UpdateBlock {
        id: BlockId,
        content: String,
    },
    RemoveBlock {
        id: BlockId,
    },
    SetCurrentFocusBlockIdx(usize),
    SetCursorPosition(usize),
}
