// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use hoard_app::{
    ActionOutcome, AppCommand, AppState, EditTarget, ExportReceipt, FormPayload, ListAction,
    QuantityDelta, Scene, SceneState, SessionOutcome, SummaryRow, Transition, Variant,
};
use ratatui::Terminal;
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListState, Paragraph, Wrap};
use std::io::{self, Stdout};
use std::time::Duration;

const POLL_INTERVAL: Duration = Duration::from_millis(120);
const HIGHLIGHT_SYMBOL: &str = ">> ";
const FIELD_CURSOR: &str = "_";

/// A detail form loaded for editing. `target` is `Create` when the requested
/// record no longer exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailLoad {
    pub target: EditTarget,
    pub payload: FormPayload,
}

/// Storage-facing operations the UI needs. Implementations own the record
/// store and its cursor.
pub trait AppRuntime {
    fn variant(&self) -> Variant;
    fn load_summary(&mut self) -> Result<Vec<SummaryRow>>;
    fn open_detail(&mut self, target: EditTarget) -> Result<DetailLoad>;
    fn save_detail(&mut self, payload: &FormPayload) -> Result<i64>;
    fn adjust_quantity(&mut self, id: i64, delta: QuantityDelta) -> Result<()>;
    fn delete_record(&mut self, id: i64) -> Result<()>;
    fn export_records(&mut self) -> Result<ExportReceipt>;
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct ListUiState {
    rows: Vec<SummaryRow>,
    selected: Option<usize>,
}

impl ListUiState {
    fn selected_id(&self) -> Option<i64> {
        self.selected
            .and_then(|index| self.rows.get(index))
            .map(|row| row.id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct DetailUiState {
    target: EditTarget,
    payload: FormPayload,
    field_index: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct ViewData {
    list: ListUiState,
    detail: Option<DetailUiState>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListCommand {
    Action(ListAction),
    Next,
    Prev,
    First,
    Last,
}

/// Runs UI sessions until one completes, restarting at the reported scene
/// whenever a session ends with `ResumeAt`.
pub fn run_app<R: AppRuntime>(runtime: &mut R) -> Result<()> {
    drive_sessions(SceneState::default(), |scene| run_session(scene, runtime))
}

pub fn drive_sessions<F>(start: SceneState, mut session: F) -> Result<()>
where
    F: FnMut(SceneState) -> Result<SessionOutcome>,
{
    let mut scene = start;
    loop {
        match session(scene)? {
            SessionOutcome::Completed => return Ok(()),
            SessionOutcome::ResumeAt(next) => {
                tracing::info!(scene = next.scene().as_str(), "restarting ui session");
                scene = next;
            }
        }
    }
}

/// One terminal session starting at `start`. Raw mode and the alternate
/// screen are restored before returning, including on error.
pub fn run_session<R: AppRuntime>(start: SceneState, runtime: &mut R) -> Result<SessionOutcome> {
    let mut terminal = setup_terminal()?;
    let result = session_loop(&mut terminal, start, runtime);
    let restored = restore_terminal();
    let outcome = result?;
    restored?;
    Ok(outcome)
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    if let Err(error) = execute!(stdout, terminal::EnterAlternateScreen) {
        let _ = disable_raw_mode();
        return Err(error).context("enter alternate screen");
    }
    Terminal::new(CrosstermBackend::new(stdout)).context("create terminal")
}

fn restore_terminal() -> Result<()> {
    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    Ok(())
}

fn session_loop<B: Backend, R: AppRuntime>(
    terminal: &mut Terminal<B>,
    start: SceneState,
    runtime: &mut R,
) -> Result<SessionOutcome> {
    let mut state = AppState::new(runtime.variant(), start);
    let mut view_data = ViewData::default();
    enter_scene(&mut state, runtime, &mut view_data, start);

    loop {
        terminal
            .draw(|frame| render(frame, &state, &view_data))
            .context("draw frame")?;

        if !event::poll(POLL_INTERVAL).context("poll event")? {
            continue;
        }
        let event = event::read().context("read event")?;
        if let Some(outcome) = handle_event(&mut state, runtime, &mut view_data, event) {
            return Ok(outcome);
        }
    }
}

fn handle_event<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    event: Event,
) -> Option<SessionOutcome> {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => {
            if handle_key_event(state, runtime, view_data, key) {
                Some(SessionOutcome::Completed)
            } else {
                None
            }
        }
        Event::Resize(width, height) => {
            let resume = resume_scene(state, view_data);
            tracing::debug!(width, height, scene = resume.scene().as_str(), "terminal resized");
            Some(SessionOutcome::ResumeAt(resume))
        }
        _ => None,
    }
}

/// The scene a fresh session should open to reproduce the current one.
fn resume_scene(state: &AppState, view_data: &ViewData) -> SceneState {
    match state.scene {
        SceneState::List { .. } => SceneState::List {
            keep_selected: view_data.list.selected_id(),
        },
        SceneState::Detail { target } => SceneState::Detail {
            target: view_data
                .detail
                .as_ref()
                .map_or(target, |detail| detail.target),
        },
    }
}

/// Returns `true` when the session should end.
fn handle_key_event<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    key: KeyEvent,
) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL)
        && matches!(key.code, KeyCode::Char('q') | KeyCode::Char('c'))
    {
        return true;
    }

    let outcome = match state.scene.scene() {
        Scene::List => handle_list_key(state, runtime, view_data, key),
        Scene::Detail => handle_detail_key(state, runtime, view_data, key),
    };
    apply_outcome(state, runtime, view_data, outcome)
}

fn apply_outcome<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    outcome: ActionOutcome,
) -> bool {
    match outcome {
        ActionOutcome::Stay => false,
        ActionOutcome::Goto(transition) => {
            enter_scene(state, runtime, view_data, transition.destination());
            false
        }
        ActionOutcome::Quit => true,
    }
}

/// Loads whatever the scene displays. Detail always repopulates from the
/// store so stale form edits never survive a scene change.
fn enter_scene<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    scene: SceneState,
) {
    match scene {
        SceneState::List { keep_selected } => {
            view_data.detail = None;
            match runtime.load_summary() {
                Ok(rows) => {
                    let selected = keep_selected
                        .and_then(|id| rows.iter().position(|row| row.id == id))
                        .or(if rows.is_empty() { None } else { Some(0) });
                    view_data.list = ListUiState { rows, selected };
                }
                Err(error) => {
                    view_data.list = ListUiState::default();
                    state.dispatch(AppCommand::SetStatus(format!("load failed: {error}")));
                }
            }
            state.dispatch(AppCommand::Navigate(Transition::ToList { keep_selected }));
        }
        SceneState::Detail { target } => match runtime.open_detail(target) {
            Ok(load) => {
                if load.target != target
                    && let Some(id) = target.id()
                {
                    state.dispatch(AppCommand::SetStatus(format!(
                        "record {id} no longer exists; saving creates a new one"
                    )));
                }
                view_data.detail = Some(DetailUiState {
                    target: load.target,
                    payload: load.payload,
                    field_index: 0,
                });
                state.dispatch(AppCommand::Navigate(Transition::ToDetail(load.target)));
            }
            Err(error) => {
                state.dispatch(AppCommand::SetStatus(format!("open failed: {error}")));
                enter_scene(
                    state,
                    runtime,
                    view_data,
                    SceneState::List {
                        keep_selected: target.id(),
                    },
                );
                return;
            }
        },
    }
    tracing::debug!(scene = state.scene.scene().as_str(), "entered scene");
}

fn list_command_for_key(key: KeyEvent) -> Option<ListCommand> {
    if key
        .modifiers
        .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
    {
        return None;
    }
    let command = match key.code {
        KeyCode::Char('a') => ListCommand::Action(ListAction::Add),
        KeyCode::Char('e') | KeyCode::Enter => ListCommand::Action(ListAction::Edit),
        KeyCode::Char('+') => ListCommand::Action(ListAction::Increment),
        KeyCode::Char('-') => ListCommand::Action(ListAction::Decrement),
        KeyCode::Char('x') => ListCommand::Action(ListAction::Export),
        KeyCode::Char('d') => ListCommand::Action(ListAction::Delete),
        KeyCode::Char('q') => ListCommand::Action(ListAction::Quit),
        KeyCode::Char('j') | KeyCode::Down => ListCommand::Next,
        KeyCode::Char('k') | KeyCode::Up => ListCommand::Prev,
        KeyCode::Char('g') | KeyCode::Home => ListCommand::First,
        KeyCode::Char('G') | KeyCode::End => ListCommand::Last,
        _ => return None,
    };
    Some(command)
}

fn handle_list_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    key: KeyEvent,
) -> ActionOutcome {
    let Some(command) = list_command_for_key(key) else {
        return ActionOutcome::Stay;
    };
    let list = &mut view_data.list;
    let last = list.rows.len().checked_sub(1);
    match command {
        ListCommand::Next => {
            list.selected = match (list.selected, last) {
                (_, None) => None,
                (None, Some(_)) => Some(0),
                (Some(index), Some(last)) => Some((index + 1).min(last)),
            };
            ActionOutcome::Stay
        }
        ListCommand::Prev => {
            list.selected = match (list.selected, last) {
                (_, None) => None,
                (None, Some(_)) => Some(0),
                (Some(index), Some(_)) => Some(index.saturating_sub(1)),
            };
            ActionOutcome::Stay
        }
        ListCommand::First => {
            list.selected = last.map(|_| 0);
            ActionOutcome::Stay
        }
        ListCommand::Last => {
            list.selected = last;
            ActionOutcome::Stay
        }
        ListCommand::Action(action) => run_list_action(state, runtime, view_data, action),
    }
}

fn action_verb(action: ListAction) -> &'static str {
    match action {
        ListAction::Add => "add",
        ListAction::Edit => "edit",
        ListAction::Increment => "increment",
        ListAction::Decrement => "decrement",
        ListAction::Export => "export",
        ListAction::Delete => "delete",
        ListAction::Quit => "quit",
    }
}

fn run_list_action<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &ViewData,
    action: ListAction,
) -> ActionOutcome {
    if !state.variant.supports(action) {
        return ActionOutcome::Stay;
    }
    let selected = view_data.list.selected_id();
    if action.needs_selection() && selected.is_none() {
        state.dispatch(AppCommand::SetStatus("no row selected".to_owned()));
        return ActionOutcome::Stay;
    }

    let result = match (action, selected) {
        (ListAction::Add, _) => Ok(ActionOutcome::Goto(Transition::ToDetail(
            EditTarget::Create,
        ))),
        (ListAction::Quit, _) => Ok(ActionOutcome::Quit),
        (ListAction::Edit, Some(id)) => Ok(ActionOutcome::Goto(Transition::ToDetail(
            EditTarget::Existing(id),
        ))),
        (ListAction::Increment, Some(id)) => runtime
            .adjust_quantity(id, QuantityDelta::Increment)
            .map(|()| reload_keeping(Some(id))),
        (ListAction::Decrement, Some(id)) => runtime
            .adjust_quantity(id, QuantityDelta::Decrement)
            .map(|()| reload_keeping(Some(id))),
        (ListAction::Delete, Some(id)) => runtime.delete_record(id).map(|()| {
            state.dispatch(AppCommand::SetStatus(format!("deleted record {id}")));
            reload_keeping(None)
        }),
        (ListAction::Export, Some(_)) => runtime.export_records().map(|receipt| {
            state.dispatch(AppCommand::SetStatus(format!(
                "exported {} records to {} and {}",
                receipt.records,
                receipt.json_path.display(),
                receipt.report_path.display()
            )));
            ActionOutcome::Stay
        }),
        (_, None) => Ok(ActionOutcome::Stay),
    };

    match result {
        Ok(outcome) => outcome,
        Err(error) => {
            tracing::warn!(action = action_verb(action), error = %error, "list action failed");
            state.dispatch(AppCommand::SetStatus(format!(
                "{} failed: {error}",
                action_verb(action)
            )));
            ActionOutcome::Stay
        }
    }
}

fn reload_keeping(keep_selected: Option<i64>) -> ActionOutcome {
    ActionOutcome::Goto(Transition::ToList { keep_selected })
}

fn handle_detail_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    key: KeyEvent,
) -> ActionOutcome {
    let Some(detail) = view_data.detail.as_mut() else {
        return reload_keeping(None);
    };
    let field_count = detail.payload.field_specs().len();
    let multiline = detail
        .payload
        .field_specs()
        .get(detail.field_index)
        .is_some_and(|spec| spec.multiline);

    match (key.code, key.modifiers) {
        (KeyCode::Esc, _) => {
            state.dispatch(AppCommand::ClearStatus);
            reload_keeping(detail.target.id())
        }
        (KeyCode::Char('s'), modifiers) if modifiers.contains(KeyModifiers::CONTROL) => {
            save_detail(state, runtime, detail)
        }
        (KeyCode::Enter, _) if !multiline => save_detail(state, runtime, detail),
        (KeyCode::Enter, _) => {
            push_to_field(detail, '\n');
            ActionOutcome::Stay
        }
        (KeyCode::Tab | KeyCode::Down, _) => {
            detail.field_index = (detail.field_index + 1) % field_count.max(1);
            ActionOutcome::Stay
        }
        (KeyCode::BackTab | KeyCode::Up, _) => {
            detail.field_index = detail
                .field_index
                .checked_sub(1)
                .unwrap_or(field_count.saturating_sub(1));
            ActionOutcome::Stay
        }
        (KeyCode::Backspace, _) => {
            if let Some(value) = detail.payload.value_mut(detail.field_index) {
                value.pop();
            }
            ActionOutcome::Stay
        }
        (KeyCode::Char(ch), modifiers)
            if !modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
        {
            push_to_field(detail, ch);
            ActionOutcome::Stay
        }
        _ => ActionOutcome::Stay,
    }
}

fn push_to_field(detail: &mut DetailUiState, ch: char) {
    if let Some(value) = detail.payload.value_mut(detail.field_index) {
        value.push(ch);
    }
}

fn save_detail<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    detail: &DetailUiState,
) -> ActionOutcome {
    match runtime.save_detail(&detail.payload) {
        Ok(id) => {
            state.dispatch(AppCommand::SetStatus(format!("saved record {id}")));
            reload_keeping(Some(id))
        }
        Err(error) => {
            state.dispatch(AppCommand::SetStatus(format!("save failed: {error}")));
            ActionOutcome::Stay
        }
    }
}

fn render(frame: &mut ratatui::Frame<'_>, state: &AppState, view_data: &ViewData) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .split(frame.area());

    match (state.scene.scene(), view_data.detail.as_ref()) {
        (Scene::Detail, Some(detail)) => {
            render_detail(frame, layout[0], state.variant, detail);
            let hints = Paragraph::new(detail_hint_text(detail))
                .block(Block::default().borders(Borders::ALL));
            frame.render_widget(hints, layout[1]);
        }
        _ => {
            render_list(frame, layout[0], state.variant, &view_data.list);
            let buttons = Paragraph::new(button_row_line(
                state.variant,
                view_data.list.selected_id().is_some(),
            ))
            .block(Block::default().borders(Borders::ALL));
            frame.render_widget(buttons, layout[1]);
        }
    }

    let status = Paragraph::new(status_text(state)).style(Style::default().fg(Color::Yellow));
    frame.render_widget(status, layout[2]);
}

fn render_list(frame: &mut ratatui::Frame<'_>, area: Rect, variant: Variant, list: &ListUiState) {
    let area = centered_rect(66, 100, area);
    let items = list
        .rows
        .iter()
        .map(|row| row.label.as_str())
        .collect::<Vec<_>>();
    let widget = List::new(items)
        .block(
            Block::default()
                .title(variant.list_title())
                .borders(Borders::ALL),
        )
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol(HIGHLIGHT_SYMBOL);
    let mut list_state = ListState::default().with_selected(list.selected);
    frame.render_stateful_widget(widget, area, &mut list_state);
}

fn render_detail(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    variant: Variant,
    detail: &DetailUiState,
) {
    let form = Paragraph::new(render_detail_text(detail))
        .block(
            Block::default()
                .title(variant.detail_title())
                .borders(Borders::ALL),
        )
        .wrap(Wrap { trim: false });
    frame.render_widget(form, area);
}

/// Every action with its key; actions that need a highlighted row are dimmed
/// while nothing is selected.
fn button_row_line(variant: Variant, has_selection: bool) -> Line<'static> {
    let mut spans = Vec::new();
    for action in variant.list_actions() {
        if !spans.is_empty() {
            spans.push(Span::raw("  "));
        }
        let enabled = has_selection || !action.needs_selection();
        let style = if enabled {
            Style::default().fg(Color::White)
        } else {
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::DIM)
        };
        spans.push(Span::styled(
            format!("[{}] {}", action.key_hint(), action.label()),
            style,
        ));
    }
    Line::from(spans)
}

fn render_detail_text(detail: &DetailUiState) -> String {
    detail
        .payload
        .field_specs()
        .iter()
        .enumerate()
        .map(|(index, spec)| {
            let value = detail.payload.value(index).unwrap_or_default();
            let focused = index == detail.field_index;
            let marker = if focused { HIGHLIGHT_SYMBOL } else { "   " };
            let cursor = if focused { FIELD_CURSOR } else { "" };
            if spec.multiline {
                let body = value.replace('\n', "\n     ");
                format!("{marker}{}:\n     {body}{cursor}", spec.label)
            } else {
                format!("{marker}{}: {value}{cursor}", spec.label)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn detail_hint_text(detail: &DetailUiState) -> String {
    let specs = detail.payload.field_specs();
    let multiline = specs
        .get(detail.field_index)
        .is_some_and(|spec| spec.multiline);
    let enter_hint = if multiline { "newline" } else { "save" };
    format!(
        "field {}/{} | tab/shift+tab move | enter {enter_hint} | ctrl+s save | esc cancel",
        detail.field_index + 1,
        specs.len()
    )
}

fn status_text(state: &AppState) -> String {
    let badge = match state.scene.scene() {
        Scene::List => "LIST",
        Scene::Detail => "DETAIL",
    };
    let default = match state.scene.scene() {
        Scene::List => "j/k g/G | enter edit | ctrl+q",
        Scene::Detail => "ctrl+q",
    };
    match &state.status_line {
        Some(status) => format!("{badge} | {status} | {default}"),
        None => format!("{badge} | {default}"),
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::{
        AppRuntime, DetailLoad, ViewData, button_row_line, drive_sessions, enter_scene,
        handle_event, handle_key_event, render, render_detail_text, status_text,
    };
    use anyhow::{Result, anyhow, bail};
    use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
    use hoard_app::{
        AppState, EditTarget, ExportReceipt, FormPayload, ItemFields, QuantityDelta, Scene,
        SceneState, SessionOutcome, SummaryRow, Variant, WeaponFields,
    };
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;
    use ratatui::style::Modifier;
    use std::path::PathBuf;

    #[derive(Debug)]
    struct TestRuntime {
        variant: Variant,
        records: Vec<(i64, FormPayload)>,
        next_id: i64,
        current: Option<i64>,
        fail_next: Option<String>,
        exports: usize,
        summary_loads: usize,
    }

    impl TestRuntime {
        fn new(variant: Variant) -> Self {
            Self {
                variant,
                records: Vec::new(),
                next_id: 1,
                current: None,
                fail_next: None,
                exports: 0,
                summary_loads: 0,
            }
        }

        fn with_items(names: &[(&str, &str)]) -> Self {
            let mut runtime = Self::new(Variant::Items);
            for (name, quantity) in names {
                runtime.insert(FormPayload::Item(ItemFields {
                    name: (*name).to_owned(),
                    quantity: (*quantity).to_owned(),
                    ..ItemFields::default()
                }));
            }
            runtime
        }

        fn with_weapons(names: &[&str]) -> Self {
            let mut runtime = Self::new(Variant::Weapons);
            for name in names {
                runtime.insert(FormPayload::Weapon(WeaponFields {
                    name: (*name).to_owned(),
                    ..WeaponFields::default()
                }));
            }
            runtime
        }

        fn insert(&mut self, payload: FormPayload) -> i64 {
            let id = self.next_id;
            self.next_id += 1;
            self.records.push((id, payload));
            id
        }

        fn record(&self, id: i64) -> Option<&FormPayload> {
            self.records
                .iter()
                .find(|(record_id, _)| *record_id == id)
                .map(|(_, payload)| payload)
        }

        fn take_failure(&mut self) -> Result<()> {
            match self.fail_next.take() {
                Some(message) => Err(anyhow!(message)),
                None => Ok(()),
            }
        }
    }

    impl AppRuntime for TestRuntime {
        fn variant(&self) -> Variant {
            self.variant
        }

        fn load_summary(&mut self) -> Result<Vec<SummaryRow>> {
            self.summary_loads += 1;
            self.current = None;
            Ok(self
                .records
                .iter()
                .map(|(id, payload)| SummaryRow {
                    id: *id,
                    label: match payload {
                        FormPayload::Item(fields) => {
                            format!("{} -- {}", fields.name, fields.quantity)
                        }
                        FormPayload::Weapon(fields) => fields.name.clone(),
                    },
                })
                .collect())
        }

        fn open_detail(&mut self, target: EditTarget) -> Result<DetailLoad> {
            self.take_failure()?;
            let existing = target
                .id()
                .and_then(|id| self.record(id).cloned().map(|payload| (id, payload)));
            Ok(match existing {
                Some((id, payload)) => {
                    self.current = Some(id);
                    DetailLoad {
                        target: EditTarget::Existing(id),
                        payload,
                    }
                }
                None => {
                    self.current = None;
                    DetailLoad {
                        target: EditTarget::Create,
                        payload: FormPayload::blank_for(self.variant),
                    }
                }
            })
        }

        fn save_detail(&mut self, payload: &FormPayload) -> Result<i64> {
            self.take_failure()?;
            payload.validate()?;
            match self.current {
                Some(id) => {
                    let Some(slot) = self
                        .records
                        .iter_mut()
                        .find(|(record_id, _)| *record_id == id)
                    else {
                        bail!("record {id} no longer exists");
                    };
                    slot.1 = payload.clone();
                    Ok(id)
                }
                None => Ok(self.insert(payload.clone())),
            }
        }

        fn adjust_quantity(&mut self, id: i64, delta: QuantityDelta) -> Result<()> {
            self.take_failure()?;
            if let Some((_, FormPayload::Item(fields))) = self
                .records
                .iter_mut()
                .find(|(record_id, _)| *record_id == id)
            {
                let quantity: i64 = fields.quantity.parse()?;
                let next = match delta {
                    QuantityDelta::Increment => quantity + 1,
                    QuantityDelta::Decrement => quantity - 1,
                };
                fields.quantity = next.to_string();
            }
            Ok(())
        }

        fn delete_record(&mut self, id: i64) -> Result<()> {
            self.take_failure()?;
            self.current = None;
            self.records.retain(|(record_id, _)| *record_id != id);
            Ok(())
        }

        fn export_records(&mut self) -> Result<ExportReceipt> {
            self.take_failure()?;
            self.exports += 1;
            Ok(ExportReceipt {
                records: self.records.len(),
                json_path: PathBuf::from("items.json"),
                report_path: PathBuf::from("readable_items.txt"),
            })
        }
    }

    fn start(runtime: &mut TestRuntime, scene: SceneState) -> (AppState, ViewData) {
        let mut state = AppState::new(runtime.variant, scene);
        let mut view_data = ViewData::default();
        enter_scene(&mut state, runtime, &mut view_data, scene);
        (state, view_data)
    }

    fn press(
        state: &mut AppState,
        runtime: &mut TestRuntime,
        view_data: &mut ViewData,
        code: KeyCode,
    ) -> bool {
        handle_key_event(
            state,
            runtime,
            view_data,
            KeyEvent::new(code, KeyModifiers::NONE),
        )
    }

    fn type_str(
        state: &mut AppState,
        runtime: &mut TestRuntime,
        view_data: &mut ViewData,
        text: &str,
    ) {
        for ch in text.chars() {
            press(state, runtime, view_data, KeyCode::Char(ch));
        }
    }

    fn ctrl(code: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(code), KeyModifiers::CONTROL)
    }

    fn render_to_string(state: &AppState, view_data: &ViewData) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).expect("test terminal");
        terminal
            .draw(|frame| render(frame, state, view_data))
            .expect("draw");
        let buffer = terminal.backend().buffer();
        let width = usize::from(buffer.area.width);
        buffer
            .content()
            .chunks(width)
            .map(|row| {
                row.iter()
                    .map(|cell| cell.symbol())
                    .collect::<String>()
                    .trim_end()
                    .to_owned()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn list_load_selects_first_row() {
        let mut runtime = TestRuntime::with_items(&[("Arrows", "20"), ("Torch", "3")]);
        let (state, view_data) = start(&mut runtime, SceneState::default());

        assert_eq!(state.scene.scene(), Scene::List);
        assert_eq!(view_data.list.rows.len(), 2);
        assert_eq!(view_data.list.rows[0].label, "Arrows -- 20");
        assert_eq!(view_data.list.selected, Some(0));
    }

    #[test]
    fn empty_list_has_no_selection_and_disables_row_actions() {
        let mut runtime = TestRuntime::new(Variant::Items);
        let (mut state, mut view_data) = start(&mut runtime, SceneState::default());
        assert_eq!(view_data.list.selected, None);

        for code in [
            KeyCode::Char('e'),
            KeyCode::Enter,
            KeyCode::Char('+'),
            KeyCode::Char('-'),
            KeyCode::Char('d'),
        ] {
            state.status_line = None;
            assert!(!press(&mut state, &mut runtime, &mut view_data, code));
            assert_eq!(state.status_line.as_deref(), Some("no row selected"));
            assert_eq!(state.scene.scene(), Scene::List);
        }
    }

    #[test]
    fn list_navigation_clamps_at_edges() {
        let mut runtime = TestRuntime::with_items(&[("A", "1"), ("B", "1"), ("C", "1")]);
        let (mut state, mut view_data) = start(&mut runtime, SceneState::default());

        press(&mut state, &mut runtime, &mut view_data, KeyCode::Char('k'));
        assert_eq!(view_data.list.selected, Some(0));
        press(&mut state, &mut runtime, &mut view_data, KeyCode::Char('j'));
        press(&mut state, &mut runtime, &mut view_data, KeyCode::Down);
        press(&mut state, &mut runtime, &mut view_data, KeyCode::Down);
        assert_eq!(view_data.list.selected, Some(2));
        press(&mut state, &mut runtime, &mut view_data, KeyCode::Char('g'));
        assert_eq!(view_data.list.selected, Some(0));
        press(&mut state, &mut runtime, &mut view_data, KeyCode::End);
        assert_eq!(view_data.list.selected, Some(2));
        press(&mut state, &mut runtime, &mut view_data, KeyCode::Up);
        assert_eq!(view_data.list.selected, Some(1));
    }

    #[test]
    fn add_opens_blank_form_and_save_creates_record() {
        let mut runtime = TestRuntime::new(Variant::Items);
        let (mut state, mut view_data) = start(&mut runtime, SceneState::default());

        press(&mut state, &mut runtime, &mut view_data, KeyCode::Char('a'));
        assert_eq!(
            state.scene,
            SceneState::Detail {
                target: EditTarget::Create
            }
        );
        type_str(&mut state, &mut runtime, &mut view_data, "Rope");
        press(&mut state, &mut runtime, &mut view_data, KeyCode::Tab);
        type_str(&mut state, &mut runtime, &mut view_data, "1gp");
        press(&mut state, &mut runtime, &mut view_data, KeyCode::Tab);
        press(&mut state, &mut runtime, &mut view_data, KeyCode::Tab);
        type_str(&mut state, &mut runtime, &mut view_data, "2");
        press(&mut state, &mut runtime, &mut view_data, KeyCode::Enter);

        assert_eq!(runtime.records.len(), 1);
        let (id, payload) = &runtime.records[0];
        assert_eq!(
            payload,
            &FormPayload::Item(ItemFields {
                name: "Rope".to_owned(),
                price: "1gp".to_owned(),
                charges: String::new(),
                quantity: "2".to_owned(),
            })
        );
        assert_eq!(
            state.scene,
            SceneState::List {
                keep_selected: Some(*id)
            }
        );
        assert_eq!(view_data.list.selected_id(), Some(*id));
    }

    #[test]
    fn edit_updates_selected_record_in_place() {
        let mut runtime = TestRuntime::with_weapons(&["Club", "Dagger"]);
        let (mut state, mut view_data) = start(&mut runtime, SceneState::default());

        press(&mut state, &mut runtime, &mut view_data, KeyCode::Char('j'));
        press(&mut state, &mut runtime, &mut view_data, KeyCode::Char('e'));
        assert_eq!(
            state.scene,
            SceneState::Detail {
                target: EditTarget::Existing(2)
            }
        );
        press(&mut state, &mut runtime, &mut view_data, KeyCode::Backspace);
        type_str(&mut state, &mut runtime, &mut view_data, "r of Venom");
        handle_key_event(&mut state, &mut runtime, &mut view_data, ctrl('s'));

        assert_eq!(runtime.records.len(), 2);
        let Some(FormPayload::Weapon(fields)) = runtime.record(2) else {
            panic!("weapon 2 should exist");
        };
        assert_eq!(fields.name, "Dagger of Venom");
        assert_eq!(view_data.list.selected_id(), Some(2));
    }

    #[test]
    fn escape_discards_edits() {
        let mut runtime = TestRuntime::with_items(&[("Arrows", "20")]);
        let (mut state, mut view_data) = start(&mut runtime, SceneState::default());

        press(&mut state, &mut runtime, &mut view_data, KeyCode::Enter);
        type_str(&mut state, &mut runtime, &mut view_data, " of Slaying");
        press(&mut state, &mut runtime, &mut view_data, KeyCode::Esc);

        assert_eq!(state.scene.scene(), Scene::List);
        assert_eq!(view_data.list.rows[0].label, "Arrows -- 20");
        assert_eq!(view_data.list.selected_id(), Some(1));

        press(&mut state, &mut runtime, &mut view_data, KeyCode::Enter);
        let detail = view_data.detail.as_ref().expect("detail loaded");
        assert_eq!(detail.payload.value(0), Some("Arrows"));
    }

    #[test]
    fn failed_save_stays_in_detail_with_status() {
        let mut runtime = TestRuntime::new(Variant::Items);
        let (mut state, mut view_data) = start(&mut runtime, SceneState::default());

        press(&mut state, &mut runtime, &mut view_data, KeyCode::Char('a'));
        press(&mut state, &mut runtime, &mut view_data, KeyCode::Enter);

        assert_eq!(state.scene.scene(), Scene::Detail);
        let status = state.status_line.clone().unwrap_or_default();
        assert!(status.starts_with("save failed:"), "{status}");
        assert!(status.contains("name is required"));
        assert!(runtime.records.is_empty());
    }

    #[test]
    fn multiline_field_takes_newlines_instead_of_saving() {
        let mut runtime = TestRuntime::with_weapons(&["Dagger"]);
        let (mut state, mut view_data) = start(&mut runtime, SceneState::default());

        press(&mut state, &mut runtime, &mut view_data, KeyCode::Enter);
        press(&mut state, &mut runtime, &mut view_data, KeyCode::BackTab);
        assert_eq!(view_data.detail.as_ref().map(|d| d.field_index), Some(9));

        type_str(&mut state, &mut runtime, &mut view_data, "Sharp");
        press(&mut state, &mut runtime, &mut view_data, KeyCode::Enter);
        type_str(&mut state, &mut runtime, &mut view_data, "  Light");
        assert_eq!(state.scene.scene(), Scene::Detail);

        handle_key_event(&mut state, &mut runtime, &mut view_data, ctrl('s'));
        let Some(FormPayload::Weapon(fields)) = runtime.record(1) else {
            panic!("weapon 1 should exist");
        };
        assert_eq!(fields.description, "Sharp\n  Light");
        assert_eq!(state.scene.scene(), Scene::List);
    }

    #[test]
    fn quantity_keys_adjust_and_keep_selection() {
        let mut runtime = TestRuntime::with_items(&[("Arrows", "20"), ("Torch", "0")]);
        let (mut state, mut view_data) = start(&mut runtime, SceneState::default());

        press(&mut state, &mut runtime, &mut view_data, KeyCode::Char('j'));
        press(&mut state, &mut runtime, &mut view_data, KeyCode::Char('-'));
        press(&mut state, &mut runtime, &mut view_data, KeyCode::Char('-'));

        assert_eq!(view_data.list.selected_id(), Some(2));
        assert_eq!(view_data.list.rows[1].label, "Torch -- -2");

        press(&mut state, &mut runtime, &mut view_data, KeyCode::Char('+'));
        assert_eq!(view_data.list.rows[1].label, "Torch -- -1");
        assert_eq!(view_data.list.selected_id(), Some(2));
    }

    #[test]
    fn weapons_ignore_quantity_keys() {
        let mut runtime = TestRuntime::with_weapons(&["Dagger"]);
        let (mut state, mut view_data) = start(&mut runtime, SceneState::default());
        let loads = runtime.summary_loads;

        press(&mut state, &mut runtime, &mut view_data, KeyCode::Char('+'));
        assert_eq!(runtime.summary_loads, loads);
        assert_eq!(state.status_line, None);
    }

    #[test]
    fn delete_removes_row_and_resets_selection() {
        let mut runtime = TestRuntime::with_items(&[("A", "1"), ("B", "1")]);
        let (mut state, mut view_data) = start(&mut runtime, SceneState::default());

        press(&mut state, &mut runtime, &mut view_data, KeyCode::Char('j'));
        press(&mut state, &mut runtime, &mut view_data, KeyCode::Char('d'));

        assert_eq!(runtime.records.len(), 1);
        assert_eq!(view_data.list.rows.len(), 1);
        assert_eq!(view_data.list.selected_id(), Some(1));
    }

    #[test]
    fn runtime_errors_surface_on_status_line() {
        let mut runtime = TestRuntime::with_items(&[("A", "1")]);
        let (mut state, mut view_data) = start(&mut runtime, SceneState::default());

        runtime.fail_next = Some("database is locked".to_owned());
        press(&mut state, &mut runtime, &mut view_data, KeyCode::Char('d'));

        assert_eq!(
            state.status_line.as_deref(),
            Some("delete failed: database is locked")
        );
        assert_eq!(runtime.records.len(), 1);
    }

    #[test]
    fn export_reports_written_files() {
        let mut runtime = TestRuntime::with_weapons(&["Dagger"]);
        let (mut state, mut view_data) = start(&mut runtime, SceneState::default());

        press(&mut state, &mut runtime, &mut view_data, KeyCode::Char('x'));

        assert_eq!(runtime.exports, 1);
        let status = state.status_line.clone().unwrap_or_default();
        assert!(status.contains("exported 1 records"));
        assert!(status.contains("items.json"));
        assert!(status.contains("readable_items.txt"));
    }

    #[test]
    fn export_is_not_offered_for_items() {
        let mut runtime = TestRuntime::with_items(&[("A", "1")]);
        let (mut state, mut view_data) = start(&mut runtime, SceneState::default());

        press(&mut state, &mut runtime, &mut view_data, KeyCode::Char('x'));
        assert_eq!(runtime.exports, 0);
    }

    #[test]
    fn quit_keys_end_the_session() {
        let mut runtime = TestRuntime::new(Variant::Items);
        let (mut state, mut view_data) = start(&mut runtime, SceneState::default());
        assert!(press(&mut state, &mut runtime, &mut view_data, KeyCode::Char('q')));
        assert!(handle_key_event(
            &mut state,
            &mut runtime,
            &mut view_data,
            ctrl('c')
        ));

        press(&mut state, &mut runtime, &mut view_data, KeyCode::Char('a'));
        assert!(!press(&mut state, &mut runtime, &mut view_data, KeyCode::Char('q')));
        assert!(handle_key_event(
            &mut state,
            &mut runtime,
            &mut view_data,
            ctrl('q')
        ));
    }

    #[test]
    fn vanished_record_opens_as_create() {
        let mut runtime = TestRuntime::with_items(&[("A", "1")]);
        let (mut state, mut view_data) = start(&mut runtime, SceneState::default());
        runtime.records.clear();

        press(&mut state, &mut runtime, &mut view_data, KeyCode::Enter);

        assert_eq!(
            state.scene,
            SceneState::Detail {
                target: EditTarget::Create
            }
        );
        assert!(
            state
                .status_line
                .as_deref()
                .is_some_and(|status| status.contains("no longer exists"))
        );
        assert_eq!(
            view_data.detail.as_ref().and_then(|d| d.payload.value(0)),
            Some("")
        );
    }

    #[test]
    fn failed_detail_open_returns_to_list() {
        let mut runtime = TestRuntime::with_items(&[("A", "1")]);
        let (mut state, mut view_data) = start(&mut runtime, SceneState::default());

        runtime.fail_next = Some("disk I/O error".to_owned());
        press(&mut state, &mut runtime, &mut view_data, KeyCode::Enter);

        assert_eq!(state.scene.scene(), Scene::List);
        assert_eq!(
            state.status_line.as_deref(),
            Some("open failed: disk I/O error")
        );
        assert_eq!(view_data.list.selected_id(), Some(1));
    }

    #[test]
    fn resize_in_detail_resumes_in_detail() {
        let mut runtime = TestRuntime::with_weapons(&["Club", "Dagger"]);
        let (mut state, mut view_data) = start(&mut runtime, SceneState::default());
        press(&mut state, &mut runtime, &mut view_data, KeyCode::End);
        press(&mut state, &mut runtime, &mut view_data, KeyCode::Enter);

        let outcome = handle_event(
            &mut state,
            &mut runtime,
            &mut view_data,
            Event::Resize(120, 40),
        );
        let expected = SceneState::Detail {
            target: EditTarget::Existing(2),
        };
        assert_eq!(outcome, Some(SessionOutcome::ResumeAt(expected)));

        let (resumed, view_data) = start(&mut runtime, expected);
        assert_eq!(resumed.scene, expected);
        assert_eq!(
            view_data.detail.as_ref().and_then(|d| d.payload.value(0)),
            Some("Dagger")
        );
    }

    #[test]
    fn resize_in_list_keeps_highlighted_row() {
        let mut runtime = TestRuntime::with_items(&[("A", "1"), ("B", "2")]);
        let (mut state, mut view_data) = start(&mut runtime, SceneState::default());
        press(&mut state, &mut runtime, &mut view_data, KeyCode::Down);

        let outcome = handle_event(
            &mut state,
            &mut runtime,
            &mut view_data,
            Event::Resize(60, 20),
        );
        assert_eq!(
            outcome,
            Some(SessionOutcome::ResumeAt(SceneState::List {
                keep_selected: Some(2)
            }))
        );
    }

    #[test]
    fn drive_sessions_restarts_until_completed() -> Result<()> {
        let detail = SceneState::Detail {
            target: EditTarget::Existing(7),
        };
        let mut seen = Vec::new();
        drive_sessions(SceneState::default(), |scene| {
            seen.push(scene);
            Ok(if seen.len() < 3 {
                SessionOutcome::ResumeAt(detail)
            } else {
                SessionOutcome::Completed
            })
        })?;

        assert_eq!(seen, vec![SceneState::default(), detail, detail]);
        Ok(())
    }

    #[test]
    fn drive_sessions_propagates_session_errors() {
        let error = drive_sessions(SceneState::default(), |_| bail!("terminal gone"))
            .expect_err("session error should propagate");
        assert_eq!(error.to_string(), "terminal gone");
    }

    #[test]
    fn button_row_dims_row_actions_without_selection() {
        let line = button_row_line(Variant::Weapons, false);
        let rendered = line
            .spans
            .iter()
            .filter(|span| span.content.starts_with('['))
            .map(|span| {
                (
                    span.content.to_string(),
                    span.style.add_modifier.contains(Modifier::DIM),
                )
            })
            .collect::<Vec<_>>();

        assert_eq!(
            rendered,
            vec![
                ("[a] Add".to_owned(), false),
                ("[e] Edit".to_owned(), true),
                ("[x] Export".to_owned(), true),
                ("[d] Delete".to_owned(), true),
                ("[q] Quit".to_owned(), false),
            ]
        );

        let enabled = button_row_line(Variant::Items, true);
        assert!(
            enabled
                .spans
                .iter()
                .all(|span| !span.style.add_modifier.contains(Modifier::DIM))
        );
    }

    #[test]
    fn detail_text_marks_focused_field() {
        let mut runtime = TestRuntime::with_items(&[("Arrows", "20")]);
        let (mut state, mut view_data) = start(&mut runtime, SceneState::default());
        press(&mut state, &mut runtime, &mut view_data, KeyCode::Enter);
        press(&mut state, &mut runtime, &mut view_data, KeyCode::Down);

        let text = render_detail_text(view_data.detail.as_ref().expect("detail"));
        assert_eq!(
            text,
            "   Name: Arrows\n>> Price: _\n   Charges: \n   Quantity: 20"
        );
    }

    #[test]
    fn status_text_shows_scene_badge() {
        let mut state = AppState::new(Variant::Items, SceneState::default());
        assert!(status_text(&state).starts_with("LIST |"));

        state.status_line = Some("saved record 3".to_owned());
        state.scene = SceneState::Detail {
            target: EditTarget::Create,
        };
        assert!(status_text(&state).starts_with("DETAIL | saved record 3 |"));
    }

    #[test]
    fn list_renders_title_rows_and_buttons() {
        let mut runtime = TestRuntime::with_items(&[("Arrows", "20"), ("Torch", "3")]);
        let (state, view_data) = start(&mut runtime, SceneState::default());

        let screen = render_to_string(&state, &view_data);
        assert!(screen.contains("Inventory"));
        assert!(screen.contains(">> Arrows -- 20"));
        assert!(screen.contains("Torch -- 3"));
        assert!(screen.contains("[+] +1"));
        assert!(screen.contains("LIST"));
    }

    #[test]
    fn detail_renders_weapon_form() {
        let mut runtime = TestRuntime::with_weapons(&["Dagger"]);
        let (mut state, mut view_data) = start(&mut runtime, SceneState::default());
        press(&mut state, &mut runtime, &mut view_data, KeyCode::Enter);

        let screen = render_to_string(&state, &view_data);
        assert!(screen.contains("Weapon Details"));
        assert!(screen.contains(">> Name: Dagger_"));
        assert!(screen.contains("Damage Type:"));
        assert!(screen.contains("Description:"));
        assert!(screen.contains("field 1/10"));
    }
}
