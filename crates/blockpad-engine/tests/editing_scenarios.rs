//! End-to-end editing scenarios driven through `PageEditor`

use blockpad_engine::editing::{Key, KeyEvent, Modifiers, PageEditor};
use blockpad_engine::models::{Block, BlockType, Page};
use blockpad_engine::store::{FocusState, MemoryFocusStore, MemoryPageStore, MemoryStore};
use pretty_assertions::assert_eq;
use rstest::rstest;

type Editor = PageEditor<MemoryPageStore, MemoryFocusStore>;

fn editor(texts: &[&str]) -> Editor {
    let blocks = texts.iter().map(|t| Block::paragraph(*t)).collect();
    PageEditor::new(MemoryStore::with_page(Page::new("Scenario", blocks)))
}

fn stored(editor: &Editor) -> Vec<String> {
    editor
        .page()
        .map(|page| page.content.iter().map(|b| b.content.clone()).collect())
        .unwrap_or_default()
}

fn outline(editor: &Editor) -> String {
    let focus = editor.focus_state();
    let mut lines: Vec<String> = editor
        .page()
        .map(|page| {
            page.content
                .iter()
                .enumerate()
                .map(|(idx, block)| {
                    let marker = if idx == focus.current_focus_block_idx { '>' } else { ' ' };
                    format!("{idx}{marker} {:?} {:?}", block.kind, block.content)
                })
                .collect()
        })
        .unwrap_or_default();
    lines.push(format!("cursor {}", focus.cursor_position));
    lines.join("\n")
}

fn press(editor: &mut Editor, key: Key) {
    editor.key_down(KeyEvent::plain(key));
}

#[test]
fn split_at_boundary() {
    let mut editor = editor(&["Hello World"]);
    editor.click(0, 5);

    press(&mut editor, Key::Enter);

    assert_eq!(stored(&editor), vec!["Hello", " World"]);
    assert_eq!(editor.focused_index(), Some(1));
    assert_eq!(
        editor.focus_state(),
        FocusState {
            current_focus_block_idx: 1,
            cursor_position: 6
        }
    );
    assert_eq!(editor.cells()[1].surface().unwrap().caret(), Some(6));
}

#[test]
fn alt_split_places_remainder_before() {
    let mut editor = editor(&["Hello World"]);
    editor.click(0, 5);

    editor.key_down(KeyEvent::new(Key::Enter, Modifiers::ALT));

    assert_eq!(stored(&editor), vec![" World", "Hello"]);
    assert_eq!(editor.focus_state().current_focus_block_idx, 0);
    assert_eq!(editor.focused_index(), Some(0));
    assert_eq!(editor.cells()[0].surface().unwrap().caret(), Some(0));
}

#[rstest]
#[case("Hello World", 0)]
#[case("Hello World", 3)]
#[case("Hello World", 11)]
#[case("añb", 2)]
#[case("", 0)]
fn split_concatenates_back_to_original(#[case] text: &str, #[case] cursor: usize) {
    let mut editor = editor(&[text]);
    editor.click(0, cursor);

    press(&mut editor, Key::Enter);

    let texts = stored(&editor);
    assert_eq!(texts.len(), 2);
    assert_eq!(texts.concat(), text);
    assert_eq!(texts[0].chars().count(), cursor);
}

#[test]
fn split_commits_text_typed_before_enter() {
    let mut editor = editor(&[""]);
    for ch in "abcd".chars() {
        press(&mut editor, Key::Char(ch));
    }
    press(&mut editor, Key::ArrowLeft);

    press(&mut editor, Key::Enter);

    assert_eq!(stored(&editor), vec!["abc", "d"]);
}

#[test]
fn merge_at_start() {
    let mut editor = editor(&["Foo", "Bar"]);
    editor.click(1, 0);

    press(&mut editor, Key::Backspace);

    assert_eq!(stored(&editor), vec!["FooBar"]);
    assert_eq!(
        editor.focus_state(),
        FocusState {
            current_focus_block_idx: 0,
            cursor_position: 3
        }
    );
    assert_eq!(editor.focused_index(), Some(0));
    assert_eq!(editor.cells()[0].surface().unwrap().caret(), Some(3));
}

#[test]
fn merge_uses_live_text_of_the_merged_block() {
    let mut editor = editor(&["Foo", ""]);
    editor.click(1, 0);
    press(&mut editor, Key::Char('x'));
    press(&mut editor, Key::Home);

    press(&mut editor, Key::Backspace);

    assert_eq!(stored(&editor), vec!["Foox"]);
    assert_eq!(editor.focus_state().cursor_position, 3);
}

#[test]
fn split_then_merge_restores_block() {
    let mut editor = editor(&["Hello World"]);
    editor.click(0, 5);
    press(&mut editor, Key::Enter);
    editor.click(1, 0);

    press(&mut editor, Key::Backspace);

    assert_eq!(stored(&editor), vec!["Hello World"]);
    assert_eq!(editor.focus_state().cursor_position, 5);
}

#[test]
fn backspace_telescopes_through_empty_blocks() {
    let mut editor = editor(&["keep", "", "", ""]);
    editor.click(3, 0);

    press(&mut editor, Key::Backspace);
    assert_eq!(stored(&editor), vec!["keep", "", ""]);
    assert_eq!(editor.focused_index(), Some(2));

    press(&mut editor, Key::Backspace);
    press(&mut editor, Key::Backspace);
    assert_eq!(stored(&editor), vec!["keep"]);
    assert_eq!(editor.focused_index(), Some(0));
    assert_eq!(editor.focus_state().cursor_position, 4);

    // Now in a non-empty block with the caret at its end: plain deletion
    press(&mut editor, Key::Backspace);
    assert_eq!(editor.texts(), vec!["kee"]);
}

#[test]
fn backspace_never_removes_the_last_block() {
    let mut editor = editor(&["", ""]);
    editor.click(1, 0);

    for _ in 0..5 {
        press(&mut editor, Key::Backspace);
    }

    assert_eq!(stored(&editor), vec![""]);
    assert_eq!(editor.focus_state().current_focus_block_idx, 0);
    assert_eq!(editor.focused_index(), Some(0));
}

#[test]
fn ctrl_1_inserts_heading_after_and_advances_focus() {
    let mut editor = editor(&["para", "next"]);

    editor.key_down(KeyEvent::new(Key::Char('1'), Modifiers::CTRL));

    insta::assert_snapshot!(outline(&editor), @r#"
    0  Paragraph "para"
    1> Heading(1) ""
    2  Paragraph "next"
    cursor 0
    "#);
    assert_eq!(editor.focused_index(), Some(1));
}

#[test]
fn heading_block_is_typed_into() {
    let mut editor = editor(&["para"]);
    editor.key_down(KeyEvent::new(Key::Char('3'), Modifiers::CTRL));
    for ch in "Title".chars() {
        press(&mut editor, Key::Char(ch));
    }
    press(&mut editor, Key::ArrowUp);

    let page = editor.page().unwrap();
    assert_eq!(page.content[1].kind, BlockType::Heading(3));
    assert_eq!(page.content[1].content, "Title");
    assert_eq!(editor.focused_index(), Some(0));
}

#[test]
fn blur_is_idempotent() {
    let mut editor = editor(&["abc"]);
    editor.click(0, 3);
    press(&mut editor, Key::Char('d'));

    editor.blur();
    let after_first = editor.store().version();
    editor.blur();

    assert_eq!(stored(&editor), vec!["abcd"]);
    assert_eq!(editor.store().version(), after_first);
}

#[rstest]
#[case::remove_last(&["a", "b", "c"], 2)]
#[case::remove_middle(&["a", "b", "c"], 1)]
#[case::remove_first(&["a", "b", "c"], 0)]
#[case::single(&["a"], 0)]
fn focus_stays_in_range_across_removals(#[case] texts: &[&str], #[case] start: usize) {
    let mut editor = editor(texts);
    editor.click(start, 0);

    for _ in 0..texts.len() + 1 {
        editor.key_down(KeyEvent::new(Key::Char('d'), Modifiers::CTRL));
        let len = editor.page().map_or(0, Page::len);
        let focus = editor.focus_state().current_focus_block_idx;
        assert!(focus <= len.saturating_sub(1), "focus {focus} out of range for {len} blocks");
        assert_eq!(editor.focused_index(), Some(focus));
    }
}

#[test]
fn focus_stays_in_range_across_mixed_edits() {
    let mut editor = editor(&["one", "two"]);
    let script = [
        KeyEvent::plain(Key::ArrowDown),
        KeyEvent::plain(Key::Enter),
        KeyEvent::new(Key::Char('2'), Modifiers::CTRL),
        KeyEvent::plain(Key::ArrowDown),
        KeyEvent::plain(Key::ArrowDown),
        KeyEvent::plain(Key::ArrowDown),
        KeyEvent::new(Key::Char('d'), Modifiers::CTRL),
        KeyEvent::plain(Key::Backspace),
        KeyEvent::new(Key::Enter, Modifiers::ALT),
        KeyEvent::new(Key::Char('d'), Modifiers::CTRL),
        KeyEvent::plain(Key::ArrowUp),
        KeyEvent::plain(Key::ArrowUp),
        KeyEvent::plain(Key::ArrowUp),
        KeyEvent::plain(Key::ArrowUp),
    ];

    for event in script {
        editor.key_down(event);
        let len = editor.page().map_or(0, Page::len);
        let focus = editor.focus_state().current_focus_block_idx;
        assert!(len >= 1);
        assert!(focus < len, "focus {focus} out of range for {len} blocks after {event:?}");
        assert_eq!(editor.focused_index(), Some(focus));
    }
}

#[test]
fn arrow_navigation_restores_clamped_caret() {
    let mut editor = editor(&["a long first line", "ab"]);
    editor.click(0, 10);

    press(&mut editor, Key::ArrowDown);

    assert_eq!(editor.focused_index(), Some(1));
    assert_eq!(editor.cells()[1].surface().unwrap().caret(), Some(2));
    assert_eq!(editor.focus_state().cursor_position, 2);
}

#[test]
fn non_text_blocks_are_skipped_by_clicks() {
    let blocks = vec![
        Block::paragraph("above"),
        Block::new(BlockType::Divider, ""),
        Block::paragraph("below"),
    ];
    let mut editor = PageEditor::new(MemoryStore::with_page(Page::new("Mixed", blocks)));

    editor.click(1, 0);

    assert_eq!(editor.focused_index(), Some(0));
    assert!(editor.cells()[1].surface().is_none());
}

/// `["Foo", ---, "Bar"]` with the caret at the start of "Foo" and the focus
/// index moved down onto the divider, which has no surface to take focus
fn editor_with_focus_on_divider() -> Editor {
    let blocks = vec![
        Block::paragraph("Foo"),
        Block::new(BlockType::Divider, ""),
        Block::paragraph("Bar"),
    ];
    let mut editor = PageEditor::new(MemoryStore::with_page(Page::new("Mixed", blocks)));
    editor.click(0, 0);
    press(&mut editor, Key::ArrowDown);

    assert_eq!(editor.focus_state().current_focus_block_idx, 1);
    assert_eq!(editor.focused_index(), Some(0));
    editor
}

#[test]
fn backspace_after_navigating_onto_divider_keeps_first_block() {
    let mut editor = editor_with_focus_on_divider();

    press(&mut editor, Key::Backspace);

    assert_eq!(stored(&editor), vec!["Foo", "", "Bar"]);
    assert_eq!(editor.page().unwrap().content[1].kind, BlockType::Divider);
    assert_eq!(editor.focused_index(), Some(0));
    assert_eq!(editor.texts()[0], "Foo");
}

#[test]
fn enter_after_navigating_onto_divider_focuses_the_new_block() {
    let mut editor = editor_with_focus_on_divider();

    press(&mut editor, Key::Enter);

    assert_eq!(stored(&editor), vec!["", "Foo", "", "Bar"]);
    assert_eq!(editor.focus_state().current_focus_block_idx, 1);
    assert_eq!(editor.focused_index(), Some(1));
    assert_eq!(editor.cells()[1].surface().unwrap().caret(), Some(3));
}

#[test]
fn heading_shortcut_after_navigating_onto_divider_focuses_the_heading() {
    let mut editor = editor_with_focus_on_divider();

    editor.key_down(KeyEvent::new(Key::Char('1'), Modifiers::CTRL));

    insta::assert_snapshot!(outline(&editor), @r#"
    0  Paragraph "Foo"
    1> Heading(1) ""
    2  Divider ""
    3  Paragraph "Bar"
    cursor 0
    "#);
    assert_eq!(editor.focused_index(), Some(1));
}
