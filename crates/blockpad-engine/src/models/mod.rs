pub mod block;
pub mod page;

pub use block::{Block, BlockId, BlockType};
pub use page::{Page, PageId};
