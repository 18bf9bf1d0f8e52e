use anyhow::Result;
use blockpad_config::Config;
use blockpad_engine::editing::{Key, KeyEvent, Modifiers, PageEditor};
use blockpad_engine::store::{MemoryFocusStore, MemoryPageStore, MemoryStore};
use blockpad_engine::{Block, BlockType, IoError, Page, io};
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind,
        KeyModifiers, KeyboardEnhancementFlags, MouseButton, MouseEventKind,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{
        EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
        supports_keyboard_enhancement,
    },
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block as Panel, Borders, Paragraph},
};
use std::{
    env,
    fs::OpenOptions,
    io::{Stdout, stdout},
    path::{Path, PathBuf},
    process,
};

/// Columns taken by the add-button gutter left of every block
const GUTTER: u16 = 2;

const HELP: &str = "Enter: split | Backspace: merge | Ctrl+1-3: heading | Ctrl+D: delete \
                    | Tab: + | Ctrl+S: save | Ctrl+Q: quit";

type Editor = PageEditor<MemoryPageStore, MemoryFocusStore>;

/// Screen row of the page, as laid out by the last draw
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RowHit {
    block: usize,
    /// Character offset of the row's first character within the block
    line_start: usize,
    line_len: usize,
    text_x: u16,
}

impl RowHit {
    /// Row of a divider or image: no text to place a caret in
    fn non_text(block: usize, text_x: u16) -> Self {
        Self {
            block,
            line_start: 0,
            line_len: 0,
            text_x,
        }
    }
}

struct App {
    page_path: PathBuf,
    editor: Editor,
    status: String,
    rows: Vec<RowHit>,
    page_area: Option<Rect>,
    scroll: usize,
}

impl App {
    fn new(page_path: PathBuf) -> Result<Self> {
        let page = load_page(&page_path)?;
        let status = format!("{} blocks", page.len());
        Ok(Self {
            page_path,
            editor: PageEditor::new(MemoryStore::with_page(page)),
            status,
            rows: Vec::new(),
            page_area: None,
            scroll: 0,
        })
    }

    /// Commit pending edits and write the page, keeping focus where it was
    fn save(&mut self) -> Result<()> {
        let refocus = self.editor.focused_index().is_some();
        self.editor.blur();
        if let Some(page) = self.editor.page() {
            io::write_page(&self.page_path, page)?;
            self.status = format!("Saved {}", self.page_path.display());
        }
        if refocus {
            self.editor.focus_current();
        }
        Ok(())
    }

    /// Returns false when the app should exit
    fn handle_key(&mut self, key: event::KeyEvent) -> Result<bool> {
        if key.kind != KeyEventKind::Press {
            return Ok(true);
        }
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('q') if ctrl => {
                self.save()?;
                return Ok(false);
            }
            KeyCode::Char('s') if ctrl => self.save()?,
            KeyCode::Esc => self.editor.blur(),
            KeyCode::Tab if self.editor.add_button_index().is_none() => {
                if self.editor.focused_index().is_none() {
                    self.editor.focus_current();
                }
                self.editor.focus_add_button();
            }
            _ => {
                if let Some(event) = to_engine_event(&key) {
                    self.editor.key_down(event);
                }
            }
        }
        Ok(true)
    }

    fn handle_click(&mut self, column: u16, row: u16, alt: bool) {
        let Some(area) = self.page_area else {
            return;
        };
        if row < area.y || column < area.x {
            return;
        }
        let Some(hit) = self.rows.get(usize::from(row - area.y) + self.scroll).copied() else {
            return;
        };
        if column < area.x + GUTTER {
            self.editor.click_add_button(hit.block, alt);
        } else {
            let col = usize::from(column.saturating_sub(hit.text_x));
            self.editor.click(hit.block, hit.line_start + col.min(hit.line_len));
        }
    }
}

fn load_page(path: &Path) -> Result<Page> {
    match io::read_page(path) {
        Ok(page) => Ok(page),
        Err(IoError::NotFound(_)) => {
            log::info!("{} does not exist yet, starting an empty page", path.display());
            let title = path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default();
            Ok(Page::new(title, vec![Block::paragraph("")]))
        }
        Err(e) => Err(e.into()),
    }
}

fn to_engine_event(key: &event::KeyEvent) -> Option<KeyEvent> {
    let key_code = match key.code {
        KeyCode::Up => Key::ArrowUp,
        KeyCode::Down => Key::ArrowDown,
        KeyCode::Left => Key::ArrowLeft,
        KeyCode::Right => Key::ArrowRight,
        KeyCode::Enter => Key::Enter,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Delete => Key::Delete,
        KeyCode::Tab => Key::Tab,
        KeyCode::Home => Key::Home,
        KeyCode::End => Key::End,
        KeyCode::Char(c) => Key::Char(c),
        _ => return None,
    };
    let modifiers = Modifiers {
        shift: key.modifiers.contains(KeyModifiers::SHIFT),
        ctrl: key.modifiers.contains(KeyModifiers::CONTROL),
        alt: key.modifiers.contains(KeyModifiers::ALT),
    };
    Some(KeyEvent::new(key_code, modifiers))
}

/// Logs go to the configured file; a TUI has no stderr to spare
fn init_logging(log_file: Option<&Path>) -> Result<()> {
    let Some(path) = log_file else {
        return Ok(());
    };
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

fn main() -> Result<()> {
    // Determine page path from CLI args or config file
    let args: Vec<String> = env::args().collect();
    let config_path = Config::config_path();

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: Failed to load config file: {e}");
            eprintln!("Usage: {} <page.md>", args[0]);
            process::exit(1);
        }
    };

    let page_path = match (args.len(), &config) {
        (2, _) => PathBuf::from(&args[1]),
        (1, Some(config)) => config.page_path.clone(),
        (1, None) => {
            eprintln!("Error: No page path provided and no config file found");
            eprintln!("Usage: {} <page.md>", args[0]);
            eprintln!("Or create a config file at {}", config_path.display());
            process::exit(1);
        }
        _ => {
            eprintln!("Usage: {} [page.md]", args[0]);
            process::exit(1);
        }
    };

    init_logging(config.as_ref().and_then(|c| c.log_file.as_deref()))?;
    log::info!("blockpad starting up, editing {}", page_path.display());

    let mut app = match App::new(page_path) {
        Ok(app) => app,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    // Shift+Enter is only distinguishable from Enter with enhanced key reporting
    let enhanced = matches!(supports_keyboard_enhancement(), Ok(true));
    if enhanced {
        execute!(
            stdout,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES)
        )?;
    }
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    if enhanced {
        execute!(terminal.backend_mut(), PopKeyboardEnhancementFlags)?;
    }
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        log::error!("exiting after error: {err:?}");
        println!("{err:?}");
    }

    Ok(())
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        match event::read()? {
            Event::Key(key) => {
                if !app.handle_key(key)? {
                    return Ok(());
                }
            }
            Event::Mouse(mouse) => {
                if let MouseEventKind::Down(MouseButton::Left) = mouse.kind {
                    let alt = mouse.modifiers.contains(KeyModifiers::ALT);
                    app.handle_click(mouse.column, mouse.row, alt);
                }
            }
            _ => {}
        }
    }
}

fn block_prefix(kind: &BlockType, number: usize) -> String {
    match kind {
        BlockType::Heading(level) => format!("{} ", "#".repeat(usize::from(*level))),
        BlockType::ListItem => "• ".to_string(),
        BlockType::NumberedListItem => format!("{number}. "),
        BlockType::Quote => "│ ".to_string(),
        BlockType::Paragraph | BlockType::Divider | BlockType::Image { .. } => String::new(),
    }
}

fn block_style(kind: &BlockType) -> Style {
    match kind {
        BlockType::Heading(_) => Style::default().add_modifier(Modifier::BOLD),
        BlockType::Quote => Style::default().add_modifier(Modifier::ITALIC),
        _ => Style::default(),
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)].as_ref())
        .split(f.area());

    let title = app.editor.page().map(|p| p.title.clone()).unwrap_or_default();
    let panel = Panel::default().borders(Borders::ALL).title(title);
    let area = panel.inner(chunks[0]);
    app.page_area = Some(area);

    let texts = app.editor.texts();
    let focused = app.editor.focused_index();
    let button = app.editor.add_button_index();
    let dim = Style::default().fg(Color::DarkGray);

    let mut lines: Vec<Line> = Vec::new();
    let mut rows: Vec<RowHit> = Vec::new();
    let mut caret: Option<(usize, u16)> = None;
    let mut number = 0;
    let mut previous_numbered = false;

    for (idx, cell) in app.editor.cells().iter().enumerate() {
        let kind = &cell.block().kind;
        let numbered = *kind == BlockType::NumberedListItem;
        number = if numbered && previous_numbered { number + 1 } else { 1 };
        previous_numbered = numbered;

        let gutter = if button == Some(idx) {
            Span::styled("+ ", Style::default().add_modifier(Modifier::REVERSED))
        } else {
            Span::styled("+ ", dim)
        };

        match kind {
            BlockType::Divider => {
                let width = usize::from(area.width.saturating_sub(GUTTER));
                lines.push(Line::from(vec![gutter, Span::styled("─".repeat(width), dim)]));
                rows.push(RowHit::non_text(idx, area.x + GUTTER));
            }
            BlockType::Image { src } => {
                let label = format!("[image {src}] {}", cell.block().content);
                lines.push(Line::from(vec![gutter, Span::styled(label, dim)]));
                rows.push(RowHit::non_text(idx, area.x + GUTTER));
            }
            _ => {
                let prefix = block_prefix(kind, number);
                let indent = " ".repeat(prefix.chars().count());
                let text_x = area.x + GUTTER + prefix.chars().count() as u16;
                let style = block_style(kind);
                let text = &texts[idx];
                let caret_at = match focused {
                    Some(i) if i == idx => cell.surface().and_then(|s| s.caret()),
                    _ => None,
                };

                let mut line_start = 0;
                for (line_no, line) in text.split('\n').enumerate() {
                    let line_len = line.chars().count();
                    let first = line_no == 0;
                    let body = if text.is_empty() {
                        Span::styled(kind.placeholder(), dim)
                    } else {
                        Span::styled(line.to_string(), style)
                    };
                    lines.push(Line::from(vec![
                        if first { gutter.clone() } else { Span::raw("  ") },
                        Span::styled(if first { prefix.clone() } else { indent.clone() }, dim),
                        body,
                    ]));
                    if let Some(offset) = caret_at
                        && offset >= line_start
                        && offset <= line_start + line_len
                        && caret.is_none()
                    {
                        caret = Some((rows.len(), text_x + (offset - line_start) as u16));
                    }
                    rows.push(RowHit {
                        block: idx,
                        line_start,
                        line_len,
                        text_x,
                    });
                    line_start += line_len + 1;
                }
            }
        }
    }

    // Keep the caret row in view
    let height = usize::from(area.height);
    if let Some((row, _)) = caret {
        if row < app.scroll {
            app.scroll = row;
        } else if height > 0 && row >= app.scroll + height {
            app.scroll = row + 1 - height;
        }
    }
    app.scroll = app.scroll.min(rows.len().saturating_sub(1));
    app.rows = rows;

    let page = Paragraph::new(lines)
        .block(panel)
        .scroll((app.scroll as u16, 0));
    f.render_widget(page, chunks[0]);

    if let Some((row, x)) = caret
        && row >= app.scroll
        && row < app.scroll + height
    {
        f.set_cursor_position((x, area.y + (row - app.scroll) as u16));
    }

    let help = Line::from(vec![
        Span::raw(format!("{} | ", app.status)),
        Span::styled(HELP, dim),
    ]);
    f.render_widget(Paragraph::new(vec![help]), chunks[1]);
}
