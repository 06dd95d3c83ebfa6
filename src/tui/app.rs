//! Main application logic for the terminal user interface.
//!
//! This module contains the `App` struct which manages the TUI state,
//! handles user input, renders the task list with its live elapsed-time
//! column, and coordinates the add/edit form, delete confirmation, and the
//! Best Times panel.

use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyModifiers};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, List, ListItem, Paragraph, Row, Table, TableState},
    Frame, Terminal,
};

use crate::clock::{format_duration, format_local, now_ms, parse_when, split_duration};
use crate::color::elapsed_color;
use crate::store::TaskStore;
use crate::tui::{enums::AppState, form::TaskForm};

/// Redraw tick keeping the elapsed column current. The tick lives and dies
/// with the run loop, so nothing keeps firing after the UI exits.
const TICK: Duration = Duration::from_millis(13);

const DAY_MS: i64 = 1000 * 60 * 60 * 24;

/// Main application state for the terminal user interface.
pub struct App {
    store: TaskStore,
    state: AppState,
    task_list_state: TableState,
    visible_tasks: Vec<u64>,
    task_form: TaskForm,
    editing_task: Option<u64>,
    confirm_delete: Option<u64>,
    status_message: String,
}

impl App {
    pub fn new(store: TaskStore) -> Self {
        let mut app = App {
            store,
            state: AppState::TaskList,
            task_list_state: TableState::default(),
            visible_tasks: Vec::new(),
            task_form: TaskForm::new(),
            editing_task: None,
            confirm_delete: None,
            status_message: String::new(),
        };
        app.refresh_visible_tasks();
        app
    }

    /// Rebuild the sorted id list backing the table, keeping the selection
    /// on the same task when it still exists.
    fn refresh_visible_tasks(&mut self) {
        let old_selected_id = self
            .task_list_state
            .selected()
            .and_then(|idx| self.visible_tasks.get(idx))
            .copied();

        self.visible_tasks = self.store.main_list().iter().map(|t| t.id).collect();

        if let Some(old_id) = old_selected_id {
            if let Some(new_idx) = self.visible_tasks.iter().position(|&id| id == old_id) {
                self.task_list_state.select(Some(new_idx));
                return;
            }
        }
        self.task_list_state.select(if self.visible_tasks.is_empty() {
            None
        } else {
            Some(0)
        });
    }

    fn selected_task_id(&self) -> Option<u64> {
        self.task_list_state
            .selected()
            .and_then(|idx| self.visible_tasks.get(idx))
            .copied()
    }

    fn set_status_message(&mut self, msg: String) {
        self.status_message = msg;
    }

    /// Submit the form, committing an edit when a task is marked as being
    /// edited and creating a task otherwise.
    ///
    /// Invalid input (empty title, unparseable date) leaves the form exactly
    /// as it is: no reset, no error banner.
    fn submit_form(&mut self) {
        let title = self.task_form.title.value.trim().to_string();
        if title.is_empty() {
            return;
        }
        let start = if self.task_form.start.value.trim().is_empty() {
            Some(now_ms())
        } else {
            parse_when(&self.task_form.start.value)
        };
        let Some(start) = start else { return };
        let due = if self.task_form.due.value.trim().is_empty() {
            Some(start + DAY_MS)
        } else {
            parse_when(&self.task_form.due.value)
        };
        let Some(due) = due else { return };

        let result = match self.editing_task {
            Some(id) => self
                .store
                .update(id, &title, start, due)
                .map(|_| "Task updated"),
            None => self.store.add(&title, start, due).map(|_| "Task created"),
        };
        match result {
            Ok(msg) => {
                self.editing_task = None;
                self.task_form = TaskForm::new();
                self.state = AppState::TaskList;
                self.refresh_visible_tasks();
                self.set_status_message(msg.to_string());
            }
            Err(e) => self.set_status_message(format!("Error saving: {e}")),
        }
    }

    /// Handle keyboard input in the task list view.
    ///
    /// Returns true if the application should quit.
    fn handle_task_list_input(
        &mut self,
        key: KeyCode,
        modifiers: KeyModifiers,
    ) -> io::Result<bool> {
        match key {
            KeyCode::Char('q') if modifiers.contains(KeyModifiers::CONTROL) => return Ok(true),
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => return Ok(true),
            KeyCode::Esc | KeyCode::Char('q') => return Ok(true),
            KeyCode::Up => {
                if let Some(selected) = self.task_list_state.selected() {
                    if selected > 0 {
                        self.task_list_state.select(Some(selected - 1));
                    }
                } else if !self.visible_tasks.is_empty() {
                    self.task_list_state.select(Some(0));
                }
            }
            KeyCode::Down => {
                if let Some(selected) = self.task_list_state.selected() {
                    if selected + 1 < self.visible_tasks.len() {
                        self.task_list_state.select(Some(selected + 1));
                    }
                } else if !self.visible_tasks.is_empty() {
                    self.task_list_state.select(Some(0));
                }
            }
            KeyCode::Char('a') => {
                self.task_form = TaskForm::new();
                self.editing_task = None;
                self.state = AppState::TaskForm;
            }
            KeyCode::Char('e') => {
                if let Some(task_id) = self.selected_task_id() {
                    if let Some(task) = self.store.get(task_id) {
                        self.task_form = TaskForm::from_task(task);
                        self.editing_task = Some(task_id);
                        self.state = AppState::TaskForm;
                    }
                }
            }
            KeyCode::Char(' ') | KeyCode::Char('c') | KeyCode::Enter => {
                if let Some(task_id) = self.selected_task_id() {
                    match self.store.toggle(task_id) {
                        Ok(true) => {
                            self.refresh_visible_tasks();
                            let done = self
                                .store
                                .get(task_id)
                                .map(|t| t.is_completed())
                                .unwrap_or(false);
                            self.set_status_message(
                                if done {
                                    "Task completed"
                                } else {
                                    "Task reopened"
                                }
                                .to_string(),
                            );
                        }
                        Ok(false) => {}
                        Err(e) => self.set_status_message(format!("Error saving: {e}")),
                    }
                }
            }
            KeyCode::Char('d') => {
                if let Some(task_id) = self.selected_task_id() {
                    self.confirm_delete = Some(task_id);
                    self.state = AppState::Confirm;
                }
            }
            KeyCode::Char('h') => {
                self.state = AppState::Help;
            }
            _ => {}
        }
        Ok(false)
    }

    /// Handle keyboard input in the add/edit form.
    fn handle_form_input(&mut self, key: KeyCode) -> io::Result<bool> {
        match key {
            KeyCode::Esc => {
                self.editing_task = None;
                self.state = AppState::TaskList;
            }
            KeyCode::Tab | KeyCode::Down => self.task_form.next_field(),
            KeyCode::BackTab | KeyCode::Up => self.task_form.prev_field(),
            KeyCode::Left => self.task_form.handle_left(),
            KeyCode::Right => self.task_form.handle_right(),
            KeyCode::Backspace => self.task_form.handle_backspace(),
            KeyCode::Delete => self.task_form.handle_delete(),
            KeyCode::Enter => self.submit_form(),
            KeyCode::Char(c) => self.task_form.handle_char(c),
            _ => {}
        }
        Ok(false)
    }

    /// Handle keyboard input in the delete confirmation overlay.
    fn handle_confirm_input(&mut self, key: KeyCode) -> io::Result<bool> {
        match key {
            KeyCode::Char('y') | KeyCode::Enter => {
                if let Some(task_id) = self.confirm_delete.take() {
                    match self.store.remove(task_id) {
                        Ok(true) => {
                            self.refresh_visible_tasks();
                            self.set_status_message(format!("Deleted task #{task_id}"));
                        }
                        Ok(false) => {}
                        Err(e) => self.set_status_message(format!("Error saving: {e}")),
                    }
                }
                self.state = AppState::TaskList;
            }
            KeyCode::Char('n') | KeyCode::Esc => {
                self.confirm_delete = None;
                self.state = AppState::TaskList;
            }
            _ => {}
        }
        Ok(false)
    }

    fn handle_help_input(&mut self, key: KeyCode) -> io::Result<bool> {
        match key {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('h') => {
                self.state = AppState::TaskList;
            }
            _ => {}
        }
        Ok(false)
    }

    /// Poll for keyboard events based on current application state.
    ///
    /// The poll timeout doubles as the redraw tick for the elapsed column.
    /// Returns true if the application should quit.
    fn handle_input(&mut self) -> io::Result<bool> {
        if event::poll(TICK)? {
            if let Event::Key(key) = event::read()? {
                self.status_message.clear();

                let should_quit = match self.state {
                    AppState::TaskList => self.handle_task_list_input(key.code, key.modifiers)?,
                    AppState::TaskForm => self.handle_form_input(key.code)?,
                    AppState::Confirm => self.handle_confirm_input(key.code)?,
                    AppState::Help => self.handle_help_input(key.code)?,
                };
                if should_quit {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }

    /// Render the task table with checkbox, due, and live elapsed columns.
    fn render_task_table(&mut self, f: &mut Frame, area: Rect) {
        if self.visible_tasks.is_empty() {
            let empty = Paragraph::new("No tasks yet! Add one with 'a'")
                .block(Block::default().borders(Borders::ALL).title("Tasks"))
                .alignment(Alignment::Center);
            f.render_widget(empty, area);
            return;
        }

        let now = now_ms();
        let header_cells = ["", "ID", "Title", "Due", "Elapsed"]
            .iter()
            .map(|h| Cell::from(*h).style(Style::default().add_modifier(Modifier::BOLD)));
        let header = Row::new(header_cells).height(1);

        let rows: Vec<Row> = self
            .visible_tasks
            .iter()
            .filter_map(|&id| self.store.get(id))
            .map(|task| {
                let checkbox = if task.is_completed() { "[x]" } else { "[ ]" };
                let title_style = if task.is_completed() {
                    Style::default().fg(Color::DarkGray)
                } else {
                    Style::default()
                };
                let elapsed = task.elapsed_ms(now);
                let parts = split_duration(elapsed);
                let elapsed_line = Line::from(vec![
                    Span::styled(
                        parts.clock_string(),
                        Style::default().fg(elapsed_color(elapsed)),
                    ),
                    Span::styled(parts.millis_string(), Style::default().fg(Color::DarkGray)),
                ]);
                Row::new(vec![
                    Cell::from(checkbox),
                    Cell::from(task.id.to_string()),
                    Cell::from(task.title.clone()).style(title_style),
                    Cell::from(format_local(task.due_time)),
                    Cell::from(elapsed_line),
                ])
            })
            .collect();

        let widths = [
            Constraint::Length(3),
            Constraint::Length(5),
            Constraint::Min(20),
            Constraint::Length(16),
            Constraint::Length(19),
        ];
        let table = Table::new(rows, widths)
            .header(header)
            .block(Block::default().borders(Borders::ALL).title("Tasks"))
            .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");

        f.render_stateful_widget(table, area, &mut self.task_list_state);
    }

    /// Render the Best Times leaderboard: completed tasks, fastest first.
    fn render_best_times(&self, f: &mut Frame, area: Rect) {
        let items: Vec<ListItem> = self
            .store
            .best_times()
            .iter()
            .map(|task| {
                let duration = task.completion_duration_ms().unwrap_or(0);
                ListItem::new(Line::from(vec![
                    Span::styled(
                        format_duration(duration),
                        Style::default().fg(elapsed_color(duration)),
                    ),
                    Span::raw(format!(" / {}", task.title)),
                ]))
            })
            .collect();

        let list =
            List::new(items).block(Block::default().borders(Borders::ALL).title("Best Times"));
        f.render_widget(list, area);
    }

    /// Render the main two-column view: task table plus leaderboard.
    fn render_main(&mut self, f: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0)])
            .split(area);

        let header = Paragraph::new(Line::from(vec![
            Span::styled("TASK TIMER", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("  "),
            Span::styled(
                format!("{} tasks tracked", self.store.len()),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::ITALIC),
            ),
        ]))
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Center);
        f.render_widget(header, chunks[0]);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(64), Constraint::Percentage(36)])
            .split(chunks[1]);

        self.render_task_table(f, columns[0]);
        self.render_best_times(f, columns[1]);
    }

    /// Render the add/edit form.
    fn render_form(&self, f: &mut Frame, area: Rect) {
        let title = if self.editing_task.is_some() {
            "Editing task"
        } else {
            "Make a new task (name / start / due)"
        };

        let form_area = centered_rect(60, 60, area);
        f.render_widget(Clear, form_area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(0),
            ])
            .split(form_area);

        let heading = Paragraph::new(title)
            .style(Style::default().add_modifier(Modifier::BOLD))
            .block(Block::default().borders(Borders::ALL))
            .alignment(Alignment::Center);
        f.render_widget(heading, chunks[0]);

        let fields = [
            (&self.task_form.title, "Task name", 1usize),
            (&self.task_form.start, "Start (now | in 5m | 2024-03-05T14:30)", 2),
            (&self.task_form.due, "Due (defaults to start + 24h)", 3),
        ];
        for (field, label, idx) in fields {
            let border_style = if field.active {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default()
            };
            let widget = Paragraph::new(field.value.as_str()).block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(border_style)
                    .title(label),
            );
            f.render_widget(widget, chunks[idx]);
            if field.active {
                f.set_cursor_position((
                    chunks[idx].x + 1 + field.cursor as u16,
                    chunks[idx].y + 1,
                ));
            }
        }

        let hint = Paragraph::new("Tab next field | Enter save | Esc cancel")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center);
        f.render_widget(hint, chunks[4]);
    }

    /// Render the delete confirmation overlay on top of the task list.
    fn render_confirm(&self, f: &mut Frame, area: Rect) {
        let Some(task_id) = self.confirm_delete else {
            return;
        };
        let popup = centered_rect(40, 20, area);
        f.render_widget(Clear, popup);
        let text = format!("Delete task #{task_id}? (y/n)");
        let confirm = Paragraph::new(text)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Confirm")
                    .border_style(Style::default().fg(Color::Red)),
            )
            .alignment(Alignment::Center);
        f.render_widget(confirm, popup);
    }

    fn render_help(&self, f: &mut Frame, area: Rect) {
        let lines = vec![
            Line::from(""),
            Line::from("  Up/Down      select task"),
            Line::from("  a            add a new task"),
            Line::from("  e            edit selected task"),
            Line::from("  Space/Enter  toggle completion"),
            Line::from("  d            delete selected task"),
            Line::from("  h            toggle this help"),
            Line::from("  q / Esc      quit"),
            Line::from(""),
            Line::from("  The elapsed column runs live and shifts from green"),
            Line::from("  to red over five days. Best Times ranks completed"),
            Line::from("  tasks by completion duration, fastest first."),
        ];
        let help = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title("Help"));
        f.render_widget(help, area);
    }

    fn render_status_bar(&self, f: &mut Frame, area: Rect) {
        let status_text = if !self.status_message.is_empty() {
            self.status_message.clone()
        } else {
            match self.state {
                AppState::TaskList => format!(
                    "Tasks: {} | a add  e edit  Space toggle  d delete  h help  q quit",
                    self.visible_tasks.len()
                ),
                AppState::TaskForm => {
                    if self.editing_task.is_some() {
                        "Edit Task".to_string()
                    } else {
                        "Add New Task".to_string()
                    }
                }
                AppState::Confirm => "Confirm Action".to_string(),
                AppState::Help => "Help".to_string(),
            }
        };

        let status = Paragraph::new(status_text)
            .style(Style::default().bg(Color::DarkGray).fg(Color::White))
            .alignment(Alignment::Left);
        f.render_widget(status, area);
    }

    /// Main render function that dispatches to appropriate view renderers.
    fn render(&mut self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)].as_ref())
            .split(f.area());

        match self.state {
            AppState::TaskList => self.render_main(f, chunks[0]),
            AppState::TaskForm => {
                self.render_main(f, chunks[0]);
                self.render_form(f, chunks[0]);
            }
            AppState::Confirm => {
                self.render_main(f, chunks[0]);
                self.render_confirm(f, chunks[0]);
            }
            AppState::Help => self.render_help(f, chunks[0]),
        }

        self.render_status_bar(f, chunks[1]);
    }

    /// Main event loop for the TUI application.
    ///
    /// Redraws every tick so the elapsed column stays current, and processes
    /// input until the user exits.
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if self.handle_input()? {
                break;
            }
        }
        Ok(())
    }
}

/// Rect centered in `r`, sized as percentages of it.
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
