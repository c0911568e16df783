//! Ratatui entry form driving a [`Session`].
//!
//! The question list sits on the left, the focused question on the right.
//! Keys are mapped to [`Action`]s, actions are resolved against the session
//! into [`Event`]s, and the returned [`StateChange`]s update the status line.

use std::io::{self, Stdout};
use std::time::{Duration, Instant};

use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event as TermEvent, KeyCode, KeyEvent,
        KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    layout::{Constraint, Direction, Layout, Position as CellPosition, Rect},
    prelude::CrosstermBackend,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};
use survey_keyer::{
    AnswerValue, Event, ListEntry, OTHER_LABEL, Part, Position, QuestionKind, RecordStore,
    Session, StateChange, circle_number,
};
use thiserror::Error;

/// Poll interval while no digit is pending.
const IDLE_POLL: Duration = Duration::from_secs(1);

const HELP: &str = "0-9 answer  Tab/Enter next  Shift-Tab back  ←/→ Space pick  F2 override  \
                    F3/F4 branches  F5 show all  Ctrl-S save  Ctrl-N new  PgUp/PgDn records  Esc quit";

/// Error type for the terminal entry form.
#[derive(Debug, Error)]
pub enum TuiError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Terminal setup/restore error.
    #[error("Terminal error: {0}")]
    Terminal(String),
}

/// Color theme for the entry form.
#[derive(Debug, Clone)]
pub struct Theme {
    pub primary: Color,
    pub text: Color,
    pub muted: Color,
    pub highlight: Color,
    pub error: Color,
    pub warning: Color,
    pub success: Color,
    pub border: Color,
    pub selected_bg: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            primary: Color::Cyan,
            text: Color::White,
            muted: Color::DarkGray,
            highlight: Color::Yellow,
            error: Color::Red,
            warning: Color::Magenta,
            success: Color::Green,
            border: Color::Gray,
            selected_bg: Color::DarkGray,
        }
    }
}

/// Terminal entry form.
#[derive(Debug, Clone)]
pub struct EntryForm {
    /// Title shown at the top of the form.
    title: String,
    /// Color theme for the UI.
    theme: Theme,
}

impl Default for EntryForm {
    fn default() -> Self {
        Self::new()
    }
}

impl EntryForm {
    /// Create an entry form with default settings.
    pub fn new() -> Self {
        Self {
            title: "Entry".to_string(),
            theme: Theme::default(),
        }
    }

    /// Set the title shown at the top of the form.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set a custom color theme.
    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    /// Run the form until the operator quits.
    ///
    /// The terminal is restored even when the loop fails.
    pub fn run<S: RecordStore>(&self, session: &mut Session<S>) -> Result<(), TuiError> {
        let mut terminal = self.setup_terminal()?;
        let result = self.event_loop(&mut terminal, session);
        self.restore_terminal(&mut terminal)?;
        result
    }

    fn setup_terminal(&self) -> Result<Terminal<CrosstermBackend<Stdout>>, TuiError> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        Ok(terminal)
    }

    fn restore_terminal(
        &self,
        terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    ) -> Result<(), TuiError> {
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;
        Ok(())
    }

    fn event_loop<S: RecordStore>(
        &self,
        terminal: &mut Terminal<CrosstermBackend<Stdout>>,
        session: &mut Session<S>,
    ) -> Result<(), TuiError> {
        let mut view = FormView::new(self.theme.clone(), self.title.clone());
        loop {
            terminal.draw(|frame| draw_form(frame, &mut view, session))?;

            // Wake up in time to commit a pending digit.
            let timeout = session
                .next_deadline()
                .map(|deadline| deadline.saturating_duration_since(Instant::now()))
                .unwrap_or(IDLE_POLL);
            if !event::poll(timeout)? {
                let changes = session.handle(Event::Tick);
                view.absorb(&changes, session);
                continue;
            }

            let action = match event::read()? {
                TermEvent::Key(key) if key.kind == KeyEventKind::Press => key_action(key),
                TermEvent::Mouse(mouse) => view.mouse_action(mouse, session),
                _ => Action::None,
            };
            if action == Action::Quit {
                tracing::info!("entry form closed");
                break;
            }
            if let Some(event) = view.resolve(action, session) {
                let changes = session.handle(event);
                view.absorb(&changes, session);
            }
        }
        Ok(())
    }
}

/// What a key or click asks for, before looking at the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Action {
    Send(Event),
    HighlightLeft,
    HighlightRight,
    SelectHighlighted,
    ToggleManual,
    OpenBranches,
    CloseBranches,
    ToggleShowAll,
    PrevRecord,
    NextRecord,
    DeleteLoaded,
    Quit,
    None,
}

pub(crate) fn key_action(key: KeyEvent) -> Action {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('s') => Action::Send(Event::Save),
            KeyCode::Char('n') => Action::Send(Event::NewRecord),
            KeyCode::Char('d') => Action::DeleteLoaded,
            KeyCode::Char('c') => Action::Quit,
            _ => Action::None,
        };
    }
    match key.code {
        KeyCode::Esc => Action::Quit,
        KeyCode::BackTab | KeyCode::Up => Action::Send(Event::Prev),
        KeyCode::Tab if key.modifiers.contains(KeyModifiers::SHIFT) => Action::Send(Event::Prev),
        KeyCode::Tab | KeyCode::Enter | KeyCode::Down => Action::Send(Event::Next),
        KeyCode::Left => Action::HighlightLeft,
        KeyCode::Right => Action::HighlightRight,
        KeyCode::Char(' ') => Action::SelectHighlighted,
        KeyCode::Char(c) => match c.to_digit(10) {
            Some(d) => Action::Send(Event::Digit(d as u8)),
            None => Action::Send(Event::Char(c)),
        },
        KeyCode::Backspace => Action::Send(Event::Backspace),
        KeyCode::F(2) => Action::ToggleManual,
        KeyCode::F(3) => Action::OpenBranches,
        KeyCode::F(4) => Action::CloseBranches,
        KeyCode::F(5) => Action::ToggleShowAll,
        KeyCode::PageUp => Action::PrevRecord,
        KeyCode::PageDown => Action::NextRecord,
        _ => Action::None,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Status {
    Info(String),
    Warning(String),
    Error(String),
}

/// Display state that the session does not own.
#[derive(Debug)]
pub(crate) struct FormView {
    theme: Theme,
    title: String,
    /// Highlighted option for ←/→ and Space.
    highlight: usize,
    status: Option<Status>,
    /// Record awaiting a second Ctrl-D.
    confirm_delete: Option<usize>,
    list_state: ListState,
    list_area: Rect,
    id_area: Rect,
}

impl FormView {
    pub(crate) fn new(theme: Theme, title: String) -> Self {
        Self {
            theme,
            title,
            highlight: 0,
            status: None,
            confirm_delete: None,
            list_state: ListState::default(),
            list_area: Rect::default(),
            id_area: Rect::default(),
        }
    }

    fn on_choice_part<S: RecordStore>(session: &Session<S>) -> bool {
        session.parts().get(session.part()) == Some(&Part::Choice)
    }

    fn choice_values<S: RecordStore>(session: &Session<S>) -> Vec<u32> {
        session
            .focused()
            .map(|e| e.kind.selectable_values())
            .unwrap_or_default()
    }

    /// Turn an action into a session event, or handle it locally.
    pub(crate) fn resolve<S: RecordStore>(
        &mut self,
        action: Action,
        session: &Session<S>,
    ) -> Option<Event> {
        let confirm = self.confirm_delete.take();
        match action {
            Action::Send(event) => Some(event),
            Action::HighlightLeft => {
                self.highlight = self.highlight.saturating_sub(1);
                None
            }
            Action::HighlightRight => {
                let count = Self::choice_values(session).len();
                if self.highlight + 1 < count {
                    self.highlight += 1;
                }
                None
            }
            Action::SelectHighlighted => {
                if Self::on_choice_part(session) {
                    Self::choice_values(session)
                        .get(self.highlight)
                        .map(|v| Event::Select(*v))
                } else {
                    Some(Event::Char(' '))
                }
            }
            Action::ToggleManual => {
                let guard = session.focused().and_then(|e| e.guards.last().cloned());
                if guard.is_none() {
                    self.info("This question is not conditional");
                }
                guard.map(Event::ToggleManual)
            }
            Action::OpenBranches | Action::CloseBranches => {
                let row = session.position().row();
                let parent = session
                    .focused()
                    .and_then(|e| e.choice_field(row))
                    .map(|f| f.id.clone())
                    .filter(|id| session.table().is_parent(id));
                let Some(parent) = parent else {
                    self.info("No questions depend on this one");
                    return None;
                };
                if action == Action::OpenBranches {
                    Some(Event::OpenBranches(parent))
                } else {
                    Some(Event::CloseBranches(parent))
                }
            }
            Action::ToggleShowAll => Some(Event::SetShowAll(!session.visibility().show_all())),
            Action::PrevRecord => {
                let count = session.store().count();
                match session.editing() {
                    _ if count == 0 => {
                        self.info("No stored records");
                        None
                    }
                    Some(0) => {
                        self.info("Already at the first record");
                        None
                    }
                    Some(index) => Some(Event::LoadRecord(index - 1)),
                    None => Some(Event::LoadRecord(count - 1)),
                }
            }
            Action::NextRecord => match session.editing() {
                Some(index) if index + 1 < session.store().count() => {
                    Some(Event::LoadRecord(index + 1))
                }
                Some(_) => {
                    self.info("Already at the last record");
                    None
                }
                None => {
                    self.info("PgUp loads the most recent record");
                    None
                }
            },
            Action::DeleteLoaded => {
                let Some(index) = session.editing() else {
                    self.info("Load a record with PgUp/PgDn before deleting");
                    return None;
                };
                if confirm == Some(index) {
                    return Some(Event::DeleteRecord(index));
                }
                self.confirm_delete = Some(index);
                self.status = Some(Status::Warning(format!(
                    "Press Ctrl-D again to delete record {} ({})",
                    index + 1,
                    session.record_id()
                )));
                None
            }
            Action::Quit | Action::None => None,
        }
    }

    fn info(&mut self, message: impl Into<String>) {
        self.status = Some(Status::Info(message.into()));
    }

    /// Update the status line and highlight from session changes.
    pub(crate) fn absorb<S: RecordStore>(&mut self, changes: &[StateChange], session: &Session<S>) {
        for change in changes {
            match change {
                StateChange::CursorMoved(_) | StateChange::PartFocused(_) => {
                    self.highlight = selected_option_index(session).unwrap_or(0);
                }
                StateChange::Rejected(err) => {
                    self.status = Some(Status::Error(err.to_string()));
                }
                StateChange::Saved {
                    index,
                    id,
                    forced,
                    updated,
                } => {
                    let verb = if *updated { "Updated" } else { "Saved" };
                    self.status = Some(if forced.is_empty() {
                        Status::Info(format!("{verb} record {} ({id})", index + 1))
                    } else {
                        let fields: Vec<&str> = forced.iter().map(|f| f.as_str()).collect();
                        Status::Warning(format!(
                            "{verb} record {} ({id}) with forced answers: {}",
                            index + 1,
                            fields.join(", ")
                        ))
                    });
                }
                StateChange::Loaded { index, id } => {
                    self.info(format!("Editing record {} ({id})", index + 1));
                }
                StateChange::Deleted { index, id } => {
                    self.info(format!("Deleted record {} ({id})", index + 1));
                }
                StateChange::ReachedEnd => {
                    self.info("End of questionnaire; Ctrl-S saves the record");
                }
                StateChange::ShowAllChanged(on) => {
                    self.info(if *on {
                        "Show-all on: every question is displayed"
                    } else {
                        "Show-all off"
                    });
                }
                StateChange::OverrideChanged { target, open } => {
                    let state = if *open { "opened" } else { "closed" };
                    self.info(format!("Override {state} for {target}"));
                }
                _ => {}
            }
        }
    }

    /// Focus the clicked question or the ID box.
    pub(crate) fn mouse_action<S: RecordStore>(
        &self,
        mouse: MouseEvent,
        session: &Session<S>,
    ) -> Action {
        if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
            return Action::None;
        }
        let at = CellPosition::new(mouse.column, mouse.row);
        if self.id_area.contains(at) {
            return Action::Send(Event::FocusId);
        }
        let inner = Block::default().borders(Borders::ALL).inner(self.list_area);
        if !inner.contains(at) {
            return Action::None;
        }
        let index = self.list_state.offset() + usize::from(mouse.row - inner.y);
        if session.is_visible(index) {
            Action::Send(Event::Focus { index, row: 0 })
        } else {
            Action::None
        }
    }
}

/// Position of the first selected value among the focused options.
fn selected_option_index<S: RecordStore>(session: &Session<S>) -> Option<usize> {
    let entry = session.focused()?;
    let field = entry.choice_field(session.position().row())?;
    let first = session.answers().selected(&field.id).first()?;
    entry
        .kind
        .selectable_values()
        .iter()
        .position(|v| v == first)
}

/// Cell texts of an entry's answered fields.
fn answer_summary<S: RecordStore>(entry: &ListEntry, session: &Session<S>) -> String {
    entry
        .fields
        .iter()
        .filter_map(|f| session.answers().get(&f.id))
        .map(AnswerValue::to_cell)
        .collect::<Vec<_>>()
        .join(" / ")
}

pub(crate) fn draw_form<S: RecordStore>(frame: &mut Frame, view: &mut FormView, session: &Session<S>) {
    let area = frame.area();
    let theme = view.theme.clone();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Title
            Constraint::Length(3), // ID
            Constraint::Min(8),    // Questions
            Constraint::Length(1), // Status
            Constraint::Length(1), // Help bar
        ])
        .split(area);

    // Title with mode flags
    let mut flags = vec![format!("{} records", session.store().count())];
    if let Some(index) = session.editing() {
        flags.push(format!("editing #{}", index + 1));
    }
    if session.visibility().show_all() {
        flags.push("SHOW ALL".to_string());
    }
    let title = Paragraph::new(Line::from(vec![
        Span::styled(
            view.title.clone(),
            Style::default()
                .fg(theme.primary)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("  [{}]", flags.join(" | ")),
            Style::default().fg(theme.border),
        ),
    ]))
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(theme.border)),
    );
    frame.render_widget(title, chunks[0]);

    draw_id(frame, view, session, chunks[1]);

    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(chunks[2]);
    draw_question_list(frame, view, session, panes[0]);
    draw_detail(frame, view, session, panes[1]);

    if let Some(status) = &view.status {
        let (text, color) = match status {
            Status::Info(text) => (text, theme.success),
            Status::Warning(text) => (text, theme.warning),
            Status::Error(text) => (text, theme.error),
        };
        let prefix = if matches!(status, Status::Error(_)) {
            "⚠ "
        } else {
            ""
        };
        let line = Paragraph::new(format!("{prefix}{text}")).style(Style::default().fg(color));
        frame.render_widget(line, chunks[3]);
    }

    let help = Paragraph::new(HELP).style(Style::default().fg(theme.border));
    frame.render_widget(help, chunks[4]);
}

fn draw_id<S: RecordStore>(frame: &mut Frame, view: &mut FormView, session: &Session<S>, area: Rect) {
    let theme = &view.theme;
    let focused = session.position() == Position::IdEntry;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if focused {
            theme.primary
        } else {
            theme.border
        }))
        .title(" ID ");
    let inner = block.inner(area);
    let id = Paragraph::new(session.record_id().to_string())
        .style(Style::default().fg(theme.text))
        .block(block);
    frame.render_widget(id, area);
    if focused {
        let width = u16::try_from(session.record_id().chars().count()).unwrap_or(u16::MAX);
        let cursor_x = inner.x.saturating_add(width);
        if cursor_x < inner.x + inner.width {
            frame.set_cursor_position((cursor_x, inner.y));
        }
    }
    view.id_area = area;
}

fn draw_question_list<S: RecordStore>(
    frame: &mut Frame,
    view: &mut FormView,
    session: &Session<S>,
    area: Rect,
) {
    let theme = view.theme.clone();
    let focused = session.position().index();
    let items: Vec<ListItem> = session
        .list()
        .entries()
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            let indent = "  ".repeat(entry.depth);
            if !session.is_visible(index) {
                return ListItem::new(format!("{indent}{} ({})", entry.id, entry.title))
                    .style(Style::default().fg(theme.muted));
            }
            let summary = answer_summary(entry, session);
            let mut spans = vec![Span::styled(
                format!("{indent}{} ", entry.id),
                Style::default().fg(theme.primary),
            )];
            if summary.is_empty() {
                spans.push(Span::styled(
                    entry.title.clone(),
                    Style::default().fg(theme.text),
                ));
            } else {
                spans.push(Span::styled(
                    summary,
                    Style::default()
                        .fg(theme.highlight)
                        .add_modifier(Modifier::BOLD),
                ));
            }
            if session.visibility().is_overridden(&entry.id) {
                spans.push(Span::styled(" [override]", Style::default().fg(theme.warning)));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.border))
                .title(" Questions "),
        )
        .highlight_style(
            Style::default()
                .bg(theme.selected_bg)
                .add_modifier(Modifier::BOLD),
        );
    view.list_state.select(focused);
    frame.render_stateful_widget(list, area, &mut view.list_state);
    view.list_area = area;
}

fn draw_detail<S: RecordStore>(frame: &mut Frame, view: &FormView, session: &Session<S>, area: Rect) {
    let theme = &view.theme;
    let Some(index) = session.position().index() else {
        let hint = Paragraph::new("Type the record ID printed on the sheet, then press Enter.")
            .style(Style::default().fg(theme.text))
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(theme.border)),
            );
        frame.render_widget(hint, area);
        return;
    };
    let Some(entry) = session.list().get(index) else {
        return;
    };

    let row = session.position().row();
    let parts = session.parts();
    let part = parts.get(session.part());
    let on_choice = part == Some(&Part::Choice);
    let answers = session.answers();

    let mut lines = vec![Line::from(Span::styled(
        format!("{}  {}", entry.id, entry.title),
        Style::default()
            .fg(theme.highlight)
            .add_modifier(Modifier::BOLD),
    ))];
    lines.push(Line::default());

    let option_style = |highlighted: bool, selected: bool| {
        let style = if selected {
            Style::default().fg(theme.success).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.text)
        };
        if highlighted {
            style.bg(theme.selected_bg)
        } else {
            style
        }
    };

    match &entry.kind {
        QuestionKind::MatrixSingle(matrix) | QuestionKind::MatrixMulti(matrix) => {
            let header: String = matrix
                .columns
                .iter()
                .map(|c| format!(" {}", circle_number(c.value)))
                .collect();
            lines.push(Line::from(format!("{:20}{header}", "")));
            for (i, matrix_row) in matrix.rows.iter().enumerate() {
                let selected = entry
                    .choice_field(i)
                    .map(|f| answers.selected(&f.id))
                    .unwrap_or(&[]);
                let marker = if i == row { "▶ " } else { "  " };
                let mut spans = vec![Span::raw(format!("{marker}{:18}", matrix_row.label))];
                for (col, column) in matrix.columns.iter().enumerate() {
                    let is_selected = selected.contains(&column.value);
                    let cell = if is_selected { " ●" } else { " ·" };
                    spans.push(Span::styled(
                        cell,
                        option_style(i == row && on_choice && col == view.highlight, is_selected),
                    ));
                }
                lines.push(Line::from(spans));
            }
            for column in &matrix.columns {
                lines.push(Line::from(Span::styled(
                    format!("  {} {}", circle_number(column.value), column.label),
                    Style::default().fg(theme.muted),
                )));
            }
        }
        QuestionKind::Scale(scale) => {
            let selected = entry
                .choice_field(0)
                .map(|f| answers.selected(&f.id))
                .unwrap_or(&[]);
            let spans: Vec<Span> = (scale.min..=scale.max)
                .enumerate()
                .map(|(i, value)| {
                    Span::styled(
                        format!(" {value} "),
                        option_style(on_choice && i == view.highlight, selected.contains(&value)),
                    )
                })
                .collect();
            lines.push(Line::from(spans));
            let ends = format!(
                "{} … {}",
                scale.min_label.as_deref().unwrap_or(""),
                scale.max_label.as_deref().unwrap_or("")
            );
            lines.push(Line::from(Span::styled(ends, Style::default().fg(theme.muted))));
        }
        kind if kind.is_choice() => {
            let field = entry.choice_field(0);
            let selected = field.map(|f| answers.selected(&f.id)).unwrap_or(&[]);
            for (i, option) in kind.options().iter().enumerate() {
                let is_selected = selected.contains(&option.value);
                let marker = match (kind.is_multi(), is_selected) {
                    (true, true) => "[✓]",
                    (true, false) => "[ ]",
                    (false, true) => "(●)",
                    (false, false) => "( )",
                };
                lines.push(Line::from(Span::styled(
                    format!("{marker} {} {}", circle_number(option.value), option.label),
                    option_style(on_choice && i == view.highlight, is_selected),
                )));
                if option.has_other
                    && is_selected
                    && let Some(field) = field
                {
                    let other = field.id.other_for(option.value);
                    let text = answers.get_text(&other).unwrap_or("");
                    let active = part == Some(&Part::Other(other));
                    lines.push(Line::from(Span::styled(
                        format!("      {OTHER_LABEL}: {text}{}", if active { "▏" } else { "" }),
                        Style::default().fg(if active { theme.primary } else { theme.text }),
                    )));
                }
            }
        }
        _ => {
            for field in &entry.fields {
                let active = part == Some(&Part::Input(field.id.clone()));
                let value = answers
                    .get(&field.id)
                    .map(AnswerValue::to_cell)
                    .unwrap_or_default();
                let marker = if active { "▶ " } else { "  " };
                lines.push(Line::from(Span::styled(
                    format!("{marker}{}: {value}{}", field.title, if active { "▏" } else { "" }),
                    Style::default().fg(if active { theme.primary } else { theme.text }),
                )));
            }
        }
    }

    if let Some(digit) = session.pending_digit() {
        lines.push(Line::default());
        lines.push(Line::from(Span::styled(
            format!("{digit}_"),
            Style::default()
                .fg(theme.highlight)
                .add_modifier(Modifier::BOLD),
        )));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.primary))
        .title(format!(" {} ", session.list().section_title(index)));
    let detail = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(block);
    frame.render_widget(detail, area);
}
