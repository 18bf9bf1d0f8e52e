//! Key handling as an ordered table of rules.
//!
//! Rules are tried in order and the first one that matches wins; nothing
//! falls through to a later rule. The order of `Keymap::block_editor` is
//! part of the editing contract: Enter is split before soft newline,
//! Backspace before the Ctrl shortcuts, and so on.

/// Keys the editing layer distinguishes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Enter,
    Backspace,
    Delete,
    Tab,
    Home,
    End,
    Char(char),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
    };
    pub const SHIFT: Modifiers = Modifiers {
        shift: true,
        ctrl: false,
        alt: false,
    };
    pub const CTRL: Modifiers = Modifiers {
        shift: false,
        ctrl: true,
        alt: false,
    };
    pub const ALT: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: true,
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    pub fn new(key: Key, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }

    pub fn plain(key: Key) -> Self {
        Self::new(key, Modifiers::NONE)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    pub fn step(self) -> isize {
        match self {
            Direction::Up => -1,
            Direction::Down => 1,
        }
    }
}

/// What a key press inside a text block asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Navigate(Direction),
    Split,
    SoftNewline,
    Backspace,
    InsertHeading(u8),
    RemoveBlock,
}

/// What a key press on a block's add button asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonAction {
    /// Let focus traversal proceed untouched
    PassThrough,
    AddBlock,
}

/// A named rule: returns the action when the event matches
pub struct Rule<A> {
    pub name: &'static str,
    pub matches: fn(&KeyEvent) -> Option<A>,
}

pub struct Keymap<A> {
    rules: Vec<Rule<A>>,
}

impl<A: Copy + std::fmt::Debug> Keymap<A> {
    pub fn new(rules: Vec<Rule<A>>) -> Self {
        Self { rules }
    }

    /// First matching rule's action
    pub fn resolve(&self, event: &KeyEvent) -> Option<A> {
        self.rules.iter().find_map(|rule| {
            let action = (rule.matches)(event)?;
            log::trace!("{event:?} matched rule '{}' -> {action:?}", rule.name);
            Some(action)
        })
    }

    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|rule| rule.name).collect()
    }
}

impl Keymap<KeyAction> {
    pub fn block_editor() -> Self {
        Self::new(vec![
            Rule {
                name: "navigate",
                matches: |ev| match ev.key {
                    Key::ArrowUp => Some(KeyAction::Navigate(Direction::Up)),
                    Key::ArrowDown => Some(KeyAction::Navigate(Direction::Down)),
                    _ => None,
                },
            },
            Rule {
                name: "split",
                matches: |ev| {
                    (ev.key == Key::Enter && !ev.modifiers.shift).then_some(KeyAction::Split)
                },
            },
            Rule {
                name: "soft-newline",
                matches: |ev| {
                    (ev.key == Key::Enter && ev.modifiers.shift).then_some(KeyAction::SoftNewline)
                },
            },
            Rule {
                name: "backspace",
                matches: |ev| (ev.key == Key::Backspace).then_some(KeyAction::Backspace),
            },
            Rule {
                name: "heading-shortcut",
                matches: |ev| match ev.key {
                    Key::Char(digit @ '1'..='3') if ev.modifiers.ctrl => {
                        Some(KeyAction::InsertHeading(digit as u8 - b'0'))
                    }
                    _ => None,
                },
            },
            Rule {
                name: "remove-block",
                matches: |ev| match ev.key {
                    Key::Char(c) if ev.modifiers.ctrl && c.eq_ignore_ascii_case(&'d') => {
                        Some(KeyAction::RemoveBlock)
                    }
                    _ => None,
                },
            },
        ])
    }
}

impl Keymap<ButtonAction> {
    pub fn add_button() -> Self {
        Self::new(vec![
            Rule {
                name: "tab",
                matches: |ev| (ev.key == Key::Tab).then_some(ButtonAction::PassThrough),
            },
            Rule {
                name: "add",
                matches: |ev| (ev.key == Key::Enter).then_some(ButtonAction::AddBlock),
            },
        ])
    }
}
