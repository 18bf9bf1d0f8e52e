pub mod editing;
pub mod io;
pub mod models;
pub mod store;

// Re-export key types for easier usage
pub use editing::{BlockCell, Cmd, InsertMode, Key, KeyEvent, Modifiers, PageEditor};
pub use io::IoError;
pub use models::{Block, BlockId, BlockType, Page, PageId};
pub use store::{Dispatch, FocusState, MemoryStore, Store, StoreView};
