use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a block, unchanged for the block's whole lifetime
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
pub struct BlockId(pub Uuid);

impl BlockId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for BlockId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for BlockId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of a block
///
/// Text-type kinds hold free text that a `BlockCell` can edit. `Divider`
/// and `Image` are rendered by the host but never edited.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BlockType {
    #[default]
    Paragraph,
    /// Heading level 1 to 3
    Heading(u8),
    ListItem,
    NumberedListItem,
    Quote,
    Divider,
    Image {
        src: String,
    },
}

impl BlockType {
    /// Heading of the given level, if the level is one of 1, 2 or 3
    pub fn heading(level: u8) -> Option<Self> {
        (1..=3).contains(&level).then_some(BlockType::Heading(level))
    }

    pub fn is_text_type(&self) -> bool {
        match self {
            BlockType::Paragraph
            | BlockType::ListItem
            | BlockType::NumberedListItem
            | BlockType::Quote => true,
            BlockType::Heading(level) => (1..=3).contains(level),
            BlockType::Divider | BlockType::Image { .. } => false,
        }
    }

    /// Hint shown by the host while a text block is empty
    pub fn placeholder(&self) -> &'static str {
        match self {
            BlockType::Paragraph => "Type something...",
            BlockType::Heading(1) => "Heading 1",
            BlockType::Heading(2) => "Heading 2",
            BlockType::Heading(_) => "Heading 3",
            BlockType::ListItem | BlockType::NumberedListItem => "List",
            BlockType::Quote => "Quote",
            BlockType::Divider | BlockType::Image { .. } => "",
        }
    }
}

/// Atomic unit of page content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub id: BlockId,
    pub kind: BlockType,
    pub content: String,
}

impl Block {
    pub fn new(kind: BlockType, content: impl Into<String>) -> Self {
        Self {
            id: BlockId::new(),
            kind,
            content: content.into(),
        }
    }

    pub fn paragraph(content: impl Into<String>) -> Self {
        Self::new(BlockType::Paragraph, content)
    }

    pub fn is_text_type(&self) -> bool {
        self.kind.is_text_type()
    }

    /// Length of the content in characters, the unit every cursor offset uses
    pub fn char_len(&self) -> usize {
        self.content.chars().count()
    }
}
