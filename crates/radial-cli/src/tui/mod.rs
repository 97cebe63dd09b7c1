//! Interactive TUI (Terminal User Interface) for Radial.
//!
//! Provides the launcher surface in a terminal:
//! - The curated menu while the query is empty
//! - Real-time search as you type
//! - Enter launches the selection; Ctrl+A / Delete edit the menu

use crate::app::App;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use radial_core::{search::SearchResult, AppEntry, Config, Locale, MatchTier};
use ratatui::{prelude::*, widgets::*};
use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// One displayed row.
struct Row {
    entry: Arc<AppEntry>,
    tier: Option<MatchTier>,
}

/// TUI application state.
struct TuiApp {
    /// The main application
    app: App,

    /// Current search query string
    query_string: String,

    /// Rows shown: the menu for an empty query, search results otherwise
    rows: Vec<Row>,

    /// Selected row index
    selected: usize,

    /// Vertical scroll offset
    scroll_offset: usize,

    /// Whether we should quit
    should_quit: bool,

    /// Last search time
    last_search_time: Duration,

    /// Status message
    status_message: Option<String>,
}

impl TuiApp {
    fn new(app: App) -> Self {
        TuiApp {
            app,
            query_string: String::new(),
            rows: Vec::new(),
            selected: 0,
            scroll_offset: 0,
            should_quit: false,
            last_search_time: Duration::ZERO,
            status_message: None,
        }
    }

    fn showing_menu(&self) -> bool {
        self.query_string.trim().is_empty()
    }

    /// Refresh rows for the current query.
    fn refresh(&mut self) {
        let start = Instant::now();

        self.rows = if self.showing_menu() {
            self.app
                .coordinator
                .menu_entries()
                .into_iter()
                .map(|entry| Row { entry, tier: None })
                .collect()
        } else {
            let limit = self.app.result_limit(None);
            self.app
                .coordinator
                .search_tiered(&self.query_string, &Locale::current())
                .into_iter()
                .take(limit)
                .map(|SearchResult { entry, tier }| Row { entry, tier })
                .collect()
        };
        self.last_search_time = start.elapsed();

        if self.selected >= self.rows.len() {
            self.selected = self.rows.len().saturating_sub(1);
        }
    }

    /// Re-read state after a background index finished.
    fn poll_updates(&mut self) {
        if self.app.updates.try_iter().count() > 0 {
            self.refresh();
        }
    }

    /// Handle input character.
    fn on_char(&mut self, c: char) {
        self.query_string.push(c);
        self.reset_selection();
        self.refresh();
    }

    /// Handle backspace.
    fn on_backspace(&mut self) {
        self.query_string.pop();
        self.reset_selection();
        self.refresh();
    }

    fn reset_selection(&mut self) {
        self.selected = 0;
        self.scroll_offset = 0;
        self.status_message = None;
    }

    /// Move selection up.
    fn select_previous(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
            if self.selected < self.scroll_offset {
                self.scroll_offset = self.selected;
            }
        }
    }

    /// Move selection down.
    fn select_next(&mut self) {
        if self.selected + 1 < self.rows.len() {
            self.selected += 1;
        }
    }

    /// Launch the selected row.
    fn launch_selected(&mut self) {
        let Some(row) = self.rows.get(self.selected) else {
            return;
        };
        let label = row.entry.label.clone();

        let launched = if self.showing_menu() {
            self.app
                .coordinator
                .launch_selected(Some(self.selected), Some(self.app.launcher()))
        } else {
            self.app.launcher().launch(&row.entry.identifier).is_ok()
        };

        if launched {
            self.should_quit = true;
        } else {
            self.status_message = Some(format!("Could not launch {}", label));
        }
    }

    /// Add the selected search result to the menu.
    fn add_selected(&mut self) {
        if self.showing_menu() {
            return;
        }
        let Some(row) = self.rows.get(self.selected) else {
            return;
        };
        let identifier = row.entry.identifier.clone();
        let label = row.entry.label.clone();

        let added = self
            .app
            .coordinator
            .edit_menu(|menu, _| menu.push(identifier));
        self.status_message = Some(if !added {
            format!("{} is already in the menu", label)
        } else if self.app.coordinator.store_menu() {
            format!("Added {} to the menu", label)
        } else {
            format!("Added {} (menu not saved)", label)
        });
    }

    /// Remove the selected menu entry.
    fn remove_selected(&mut self) {
        if !self.showing_menu() {
            return;
        }
        let selected = self.selected;
        let removed = self.app.coordinator.edit_menu(|menu, _| menu.remove(selected));
        if let Some(identifier) = removed {
            let saved = self.app.coordinator.store_menu();
            self.status_message = Some(if saved {
                format!("Removed {}", identifier)
            } else {
                format!("Removed {} (menu not saved)", identifier)
            });
            self.refresh();
        }
    }
}

/// Run the TUI application.
pub fn run(config: Config) -> anyhow::Result<()> {
    let app = App::new(config)?;

    // Index in the background; the first update fills the screen
    let _indexing = app.coordinator.index_all();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create app state
    let mut tui_app = TuiApp::new(app);
    tui_app.refresh();

    // Main loop
    let result = run_loop(&mut terminal, &mut tui_app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

/// Main event loop.
fn run_loop<B: Backend>(terminal: &mut Terminal<B>, app: &mut TuiApp) -> anyhow::Result<()> {
    loop {
        app.poll_updates();
        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Esc => {
                            app.should_quit = true;
                        }
                        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                            app.should_quit = true;
                        }
                        KeyCode::Char('a') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                            app.add_selected();
                        }
                        KeyCode::Char(c) => {
                            app.on_char(c);
                        }
                        KeyCode::Backspace => {
                            app.on_backspace();
                        }
                        KeyCode::Delete => {
                            app.remove_selected();
                        }
                        KeyCode::Up => {
                            app.select_previous();
                        }
                        KeyCode::Down => {
                            app.select_next();
                        }
                        KeyCode::Enter => {
                            app.launch_selected();
                        }
                        _ => {}
                    }
                }
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

mod ui {
    use super::*;

    /// Draw the UI.
    pub fn draw(f: &mut Frame, app: &mut TuiApp) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([
                Constraint::Length(3), // Search box
                Constraint::Min(10),   // Menu or results
                Constraint::Length(2), // Status bar
            ])
            .split(f.area());

        draw_search_box(f, app, chunks[0]);
        draw_rows(f, app, chunks[1]);
        draw_status_bar(f, app, chunks[2]);
    }

    /// Draw the search input box.
    fn draw_search_box(f: &mut Frame, app: &TuiApp, area: Rect) {
        let title = if app.app.coordinator.is_indexing() {
            " Search (indexing…) "
        } else {
            " Search (type to filter) "
        };
        let input = Paragraph::new(app.query_string.as_str())
            .style(Style::default().fg(Color::Yellow))
            .block(Block::default().borders(Borders::ALL).title(title));
        f.render_widget(input, area);

        // Show cursor
        f.set_cursor_position(Position::new(
            area.x + app.query_string.chars().count() as u16 + 1,
            area.y + 1,
        ));
    }

    /// Draw the menu or the search results.
    fn draw_rows(f: &mut Frame, app: &mut TuiApp, area: Rect) {
        let visible_height = area.height.saturating_sub(2) as usize;

        // Update scroll offset based on visible height
        if visible_height > 0 && app.selected >= app.scroll_offset + visible_height {
            app.scroll_offset = app.selected - visible_height + 1;
        }

        let items: Vec<ListItem> = app
            .rows
            .iter()
            .enumerate()
            .skip(app.scroll_offset)
            .take(visible_height)
            .map(|(i, row)| {
                let marker = match row.tier {
                    None => format!("{:>2}", i + 1),
                    Some(MatchTier::Prefix) => " ▸".to_string(),
                    Some(MatchTier::Substring) => " ·".to_string(),
                    Some(MatchTier::NearMiss) => " ~".to_string(),
                };
                let line = format!("{} {:<32} {}", marker, row.entry.label, row.entry.identifier);

                let style = if i == app.selected {
                    Style::default()
                        .bg(Color::Blue)
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };

                ListItem::new(line).style(style)
            })
            .collect();

        let title = if app.showing_menu() {
            format!(" Menu ({} apps) ", app.rows.len())
        } else {
            format!(
                " Results ({} found in {:.1}ms) ",
                app.rows.len(),
                app.last_search_time.as_secs_f64() * 1000.0
            )
        };

        let list = List::new(items).block(Block::default().borders(Borders::ALL).title(title));

        f.render_widget(list, area);
    }

    /// Draw the status bar.
    fn draw_status_bar(f: &mut Frame, app: &TuiApp, area: Rect) {
        let stats = app.app.coordinator.stats();

        let status = if let Some(ref msg) = app.status_message {
            msg.clone()
        } else {
            format!(
                "Apps: {} | Menu: {} | ↑↓:Navigate Enter:Launch Ctrl+A:Add Del:Remove Esc:Quit",
                stats.entries, stats.menu_entries
            )
        };

        let status_bar = Paragraph::new(status).style(Style::default().fg(Color::Gray));

        f.render_widget(status_bar, area);
    }
}
