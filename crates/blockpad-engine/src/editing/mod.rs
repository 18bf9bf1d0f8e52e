/*!
 * # Block Editing
 *
 * Keyboard-driven editing of a page made of blocks: splitting a block at
 * the caret, merging a block into the one before it, creating and removing
 * blocks, and moving focus between them.
 *
 * ## Architecture Overview
 *
 * ### 1. Cells own nothing but a text mirror
 * - Each block is edited through a **`BlockCell`**, holding a local copy of
 *   the block's text so typing never round-trips through the page store
 * - The copy is flushed to the store when the cell loses focus
 * - Structural edits (split, merge, heading insert, removal) are issued as
 *   **commands** (`Cmd`) immediately
 *
 * ### 2. Commands go through one dispatcher
 * - Handlers issue `Cmd`s to a `Dispatch` sink; `Store` applies them to the
 *   page and focus stores in issuance order
 * - The focus store is shared by every cell of a page: one focus index and
 *   one cursor offset
 *
 * ### 3. Handlers read latest-value references
 * - After every store change the host calls `BlockCell::reconcile`, which
 *   refreshes `LatestRefs` (cursor, clamped focus index, page)
 * - Key handlers read those references, never values captured earlier
 * - Reconciliation also runs the focus effect: the cell whose index equals
 *   the focus index takes surface focus
 *
 * ### 4. Keys resolve through an ordered table
 * - `Keymap::block_editor` lists the rules in precedence order; the first
 *   match wins
 *
 * ### 5. Surfaces are abstract
 * - `EditableSurface` and `SelectionBridge` stand in for the platform's
 *   editable element and text selection; `MemorySurface` implements both
 *
 * ## Usage Pattern
 *
 * ```rust
 * use blockpad_engine::editing::{Key, KeyEvent, PageEditor};
 * use blockpad_engine::models::{Block, Page};
 * use blockpad_engine::store::MemoryStore;
 *
 * let page = Page::new("Notes", vec![Block::paragraph("Hello World")]);
 * let mut editor = PageEditor::new(MemoryStore::with_page(page));
 *
 * // Put the caret after "Hello" and split the block there
 * editor.click(0, 5);
 * editor.key_down(KeyEvent::plain(Key::Enter));
 *
 * let texts: Vec<_> = editor.page().unwrap().content.iter().map(|b| b.content.clone()).collect();
 * assert_eq!(texts, vec!["Hello", " World"]);
 * ```
 */

pub mod cell;
pub mod commands;
pub mod keymap;
pub mod page_editor;
pub mod selection;

pub use cell::{BlockCell, KeyOutcome, LatestRefs, split_at_char};
pub use commands::{Cmd, InsertMode};
pub use keymap::{ButtonAction, Direction, Key, KeyAction, KeyEvent, Keymap, Modifiers};
pub use page_editor::PageEditor;
pub use selection::{CaretTarget, EditableSurface, MemorySurface, SelectionBridge};
