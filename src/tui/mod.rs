// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Pageflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Pageflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Terminal UI.
//!
//! Two views over one form of the shared [`Workspace`]: the Condition Editor (a carousel of
//! condition cards) and the Condition Flow View (the projected navigation graph as text).
//! Every edit is applied through the workspace, so it is persisted and visible to the HTTP API
//! immediately.

use std::{
    error::Error,
    io,
    sync::Arc,
    time::{Duration, Instant},
};

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};
use tokio::sync::Mutex;

use crate::model::{Condition, ConditionId, FormDocument, FormId, Operator, Page};
use crate::ops::{ConditionField, FormOp};
use crate::projection::{condition_label, project_form, ProjectionOptions};
use crate::query::{
    condition_issues, dead_end_pages, element_title, issues_for, page_title, unreachable_pages,
};
use crate::render::render_flow_text;
use crate::ui::UiState;
use crate::workspace::{Workspace, WorkspaceError};

const FOCUS_COLOR: Color = Color::LightGreen;
const EDIT_COLOR: Color = Color::LightYellow;
const STALE_COLOR: Color = Color::Yellow;
const FOOTER_LABEL_COLOR: Color = Color::Gray;
const FOOTER_KEY_COLOR: Color = Color::Cyan;
const FOOTER_BRAND_COLOR: Color = Color::White;
const FOOTER_BRAND: &str = "pageflow";
const CARD_WIDTH: u16 = 34;
const DEFAULT_VISIBLE_CARDS: usize = 3;

/// Runs the interactive editor on `form_id` until the user quits.
pub fn run(workspace: Workspace, form_id: FormId) -> Result<(), Box<dyn Error>> {
    let mut app = App::new(workspace, form_id)?;
    let mut terminal = TerminalSession::new()?;
    app.publish_selection_to_ui_state();

    while !app.should_quit {
        app.sync_from_ui_state();
        terminal.draw(|frame| draw(frame, &mut app))?;

        if event::poll(Duration::from_millis(250))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => app.handle_key(key),
                _ => {}
            }
        }
    }

    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum View {
    Editor,
    Flow,
}

struct Toast {
    message: String,
    expires_at: Instant,
}

struct App {
    workspace: Workspace,
    form_id: FormId,
    form: FormDocument,
    view: View,
    selected: usize,
    carousel_offset: usize,
    visible_cards: usize,
    slot: ConditionField,
    editing_value: bool,
    projection: ProjectionOptions,
    ui_state: Option<Arc<Mutex<UiState>>>,
    ui_state_forms_rev: u64,
    show_help: bool,
    help_scroll: u16,
    flow_scroll: u16,
    toast: Option<Toast>,
    should_quit: bool,
}

impl App {
    fn new(workspace: Workspace, form_id: FormId) -> Result<Self, WorkspaceError> {
        let (form, projection) = {
            let mut state = workspace.blocking_lock();
            let projection = state.projection_options();
            (state.form(&form_id)?.clone(), projection)
        };
        let ui_state = workspace.ui_state().cloned();
        let ui_state_forms_rev =
            ui_state.as_ref().map_or(0, |ui_state| ui_state.blocking_lock().forms_rev());

        Ok(Self {
            workspace,
            form_id,
            form,
            view: View::Editor,
            selected: 0,
            carousel_offset: 0,
            visible_cards: DEFAULT_VISIBLE_CARDS,
            slot: ConditionField::SourcePageId,
            editing_value: false,
            projection,
            ui_state,
            ui_state_forms_rev,
            show_help: false,
            help_scroll: 0,
            flow_scroll: 0,
            toast: None,
            should_quit: false,
        })
    }

    fn selected_condition(&self) -> Option<&Condition> {
        self.form.conditions().get(self.selected)
    }

    fn selected_condition_id(&self) -> Option<&ConditionId> {
        self.selected_condition().map(Condition::id)
    }

    fn publish_selection_to_ui_state(&self) {
        let Some(ui_state) = self.ui_state.as_ref() else {
            return;
        };
        ui_state
            .blocking_lock()
            .set_selection(Some(self.form_id.clone()), self.selected_condition_id().cloned());
    }

    fn sync_from_ui_state(&mut self) {
        let Some(ui_state) = self.ui_state.as_ref() else {
            return;
        };
        let forms_rev = ui_state.blocking_lock().forms_rev();
        if forms_rev == self.ui_state_forms_rev {
            return;
        }

        self.ui_state_forms_rev = forms_rev;
        if let Err(err) = self.reload_form() {
            self.set_toast(format!("Reload failed: {err}"));
        }
    }

    fn reload_form(&mut self) -> Result<(), WorkspaceError> {
        let form = self.workspace.blocking_lock().form(&self.form_id)?.clone();
        self.replace_form(form);
        Ok(())
    }

    /// Swaps in a fresh snapshot, keeping the selected card by id when it still exists.
    fn replace_form(&mut self, form: FormDocument) {
        let previous = self.selected_condition_id().cloned();
        self.form = form;

        let count = self.form.conditions().len();
        self.selected = previous
            .and_then(|id| self.form.conditions().iter().position(|c| c.id() == &id))
            .unwrap_or(self.selected)
            .min(count.saturating_sub(1));
        if !self.slot_enabled(self.slot) {
            self.slot = ConditionField::SourcePageId;
        }
        self.ensure_selected_visible();
        self.publish_selection_to_ui_state();
    }

    /// Applies ops built from the latest document and refreshes the snapshot.
    fn commit(
        &mut self,
        build: impl FnOnce(&FormDocument) -> Result<Vec<FormOp>, WorkspaceError>,
    ) -> bool {
        let outcome = {
            let mut state = self.workspace.blocking_lock();
            state
                .apply_current(&self.form_id, build)
                .and_then(|_| state.form(&self.form_id).cloned())
        };

        match outcome {
            Ok(form) => {
                self.replace_form(form);
                self.workspace.blocking_notify_forms_changed();
                true
            }
            Err(WorkspaceError::NoPages { .. }) => {
                self.set_toast("Add a page before adding conditions");
                false
            }
            Err(err) => {
                tracing::warn!(form_id = %self.form_id, error = %err, "tui edit failed");
                self.set_toast(format!("Edit failed: {err}"));
                false
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if self.handle_key_code(key.code) {
            self.should_quit = true;
        }
    }

    fn handle_key_code(&mut self, code: KeyCode) -> bool {
        if self.show_help {
            match code {
                KeyCode::Esc | KeyCode::Char('?') => self.show_help = false,
                KeyCode::Char('q') => return true,
                KeyCode::Down | KeyCode::Char('j') => {
                    self.help_scroll = self.help_scroll.saturating_add(1);
                }
                KeyCode::Up | KeyCode::Char('k') => {
                    self.help_scroll = self.help_scroll.saturating_sub(1);
                }
                KeyCode::Home => self.help_scroll = 0,
                _ => {}
            }
            return false;
        }

        if self.editing_value {
            self.handle_value_edit_key(code);
            return false;
        }

        match code {
            KeyCode::Char('q') => return true,
            KeyCode::Char('?') => self.toggle_help(),
            KeyCode::Char('v') => self.toggle_view(),
            KeyCode::Char('f') => self.toggle_fallthrough(),
            KeyCode::Char('s') => self.save(),
            _ => match self.view {
                View::Editor => self.handle_editor_key(code),
                View::Flow => self.handle_flow_key(code),
            },
        }

        false
    }

    fn handle_editor_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('a') => self.add_condition(),
            KeyCode::Char('x') | KeyCode::Delete => self.delete_selected_condition(),
            KeyCode::Tab => self.focus_slot(1),
            KeyCode::BackTab => self.focus_slot(-1),
            KeyCode::Char('[') => self.select_card(-1),
            KeyCode::Char(']') => self.select_card(1),
            KeyCode::Home => self.select_card_at(0),
            KeyCode::End => self.select_card_at(self.form.conditions().len().saturating_sub(1)),
            KeyCode::Left | KeyCode::Char('h') => self.cycle_slot_value(-1),
            KeyCode::Right | KeyCode::Char('l') => self.cycle_slot_value(1),
            KeyCode::Enter if self.slot == ConditionField::Value => self.start_value_edit(),
            _ => {}
        }
    }

    fn handle_flow_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Down | KeyCode::Char('j') => {
                self.flow_scroll = self.flow_scroll.saturating_add(1);
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.flow_scroll = self.flow_scroll.saturating_sub(1);
            }
            KeyCode::Home => self.flow_scroll = 0,
            _ => {}
        }
    }

    fn handle_value_edit_key(&mut self, code: KeyCode) {
        let Some(value) = self.selected_condition().map(|c| c.value().to_owned()) else {
            self.editing_value = false;
            return;
        };

        match code {
            KeyCode::Esc | KeyCode::Enter => self.editing_value = false,
            KeyCode::Tab => {
                self.editing_value = false;
                self.focus_slot(1);
            }
            KeyCode::BackTab => {
                self.editing_value = false;
                self.focus_slot(-1);
            }
            KeyCode::Backspace => {
                let mut value = value;
                if value.pop().is_some() {
                    self.update_selected(ConditionField::Value, value);
                }
            }
            KeyCode::Char(ch) => {
                let mut value = value;
                value.push(ch);
                self.update_selected(ConditionField::Value, value);
            }
            _ => {}
        }
    }

    fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
        if self.show_help {
            self.help_scroll = 0;
        }
    }

    fn toggle_view(&mut self) {
        self.view = match self.view {
            View::Editor => View::Flow,
            View::Flow => View::Editor,
        };
        self.flow_scroll = 0;
    }

    fn toggle_fallthrough(&mut self) {
        self.projection.fallthrough_edges = !self.projection.fallthrough_edges;
        self.set_toast(if self.projection.fallthrough_edges {
            "Fall-through edges shown"
        } else {
            "Fall-through edges hidden"
        });
    }

    fn save(&mut self) {
        let outcome = {
            let mut state = self.workspace.blocking_lock();
            state
                .save(&self.form_id)
                .map(|()| state.folder().map(|folder| folder.form_json_path(&self.form_id)))
        };

        match outcome {
            Ok(Some(path)) => {
                tracing::info!(form_id = %self.form_id, path = %path.display(), "saved form");
                self.set_toast(format!("Saved {}", path.display()));
            }
            Ok(None) => self.set_toast("In-memory form, nothing written"),
            Err(err) => {
                tracing::warn!(form_id = %self.form_id, error = %err, "save failed");
                self.set_toast(format!("Save failed: {err}"));
            }
        }
    }

    fn add_condition(&mut self) {
        let form_id = self.form_id.clone();
        let mut added = None;
        let committed = self.commit(|form| {
            if form.pages().is_empty() {
                tracing::warn!(form_id = %form_id, "add condition refused: form has no pages");
                return Err(WorkspaceError::NoPages { form_id });
            }
            let condition_id = form.id_allocator().condition_id();
            added = Some(condition_id.clone());
            Ok(vec![FormOp::AddCondition { condition_id }])
        });
        if !committed {
            return;
        }

        if let Some(index) =
            added.and_then(|id| self.form.conditions().iter().position(|c| c.id() == &id))
        {
            self.select_card_at(index);
        }
        self.slot = ConditionField::SourcePageId;
        self.set_toast("Condition added");
    }

    fn delete_selected_condition(&mut self) {
        let Some(condition_id) = self.selected_condition_id().cloned() else {
            self.set_toast("No condition selected");
            return;
        };
        if self.commit(|_| Ok(vec![FormOp::RemoveCondition { condition_id }])) {
            self.set_toast("Condition deleted");
        }
    }

    fn select_card(&mut self, step: isize) {
        let count = self.form.conditions().len();
        if let Some(index) = cycle_index(Some(self.selected), count, step) {
            self.select_card_at(index);
        }
    }

    fn select_card_at(&mut self, index: usize) {
        let count = self.form.conditions().len();
        if count == 0 {
            return;
        }
        self.selected = index.min(count - 1);
        if !self.slot_enabled(self.slot) {
            self.slot = ConditionField::SourcePageId;
        }
        self.ensure_selected_visible();
        self.publish_selection_to_ui_state();
    }

    fn ensure_selected_visible(&mut self) {
        let visible = self.visible_cards.max(1);
        if self.selected < self.carousel_offset {
            self.carousel_offset = self.selected;
        } else if self.selected >= self.carousel_offset + visible {
            self.carousel_offset = self.selected + 1 - visible;
        }
        let max_offset = self.form.conditions().len().saturating_sub(visible);
        self.carousel_offset = self.carousel_offset.min(max_offset);
    }

    /// The field slot is disabled while the condition's source page does not exist.
    fn slot_enabled(&self, field: ConditionField) -> bool {
        match field {
            ConditionField::ElementId => self
                .selected_condition()
                .is_some_and(|c| self.form.page(c.source_page_id()).is_some()),
            _ => true,
        }
    }

    fn focus_slot(&mut self, step: isize) {
        let slots = ConditionField::ALL;
        let mut index = slots.iter().position(|s| *s == self.slot).unwrap_or(0);
        for _ in 0..slots.len() {
            index = cycle_index(Some(index), slots.len(), step).unwrap_or(0);
            if self.slot_enabled(slots[index]) {
                self.slot = slots[index];
                return;
            }
        }
    }

    fn start_value_edit(&mut self) {
        if self.selected_condition().is_none() {
            return;
        }
        self.editing_value = true;
        self.set_toast("Editing value, Enter or Esc to finish");
    }

    fn cycle_slot_value(&mut self, step: isize) {
        let Some(condition) = self.selected_condition().cloned() else {
            return;
        };
        let pages = self.form.pages();

        match self.slot {
            ConditionField::SourcePageId => {
                let current = self.form.page_index(condition.source_page_id());
                let Some(next) = cycle_index(current, pages.len(), step) else {
                    return;
                };
                let page_id = pages[next].id().clone();
                let condition_id = condition.id().clone();
                self.commit(|_| Ok(vec![FormOp::SetConditionSourcePage { condition_id, page_id }]));
            }
            ConditionField::ElementId => {
                let Some(page) = self.form.page(condition.source_page_id()) else {
                    self.set_toast("Source page is missing");
                    return;
                };
                let elements = page.elements();
                let current = condition
                    .element_id()
                    .and_then(|id| elements.iter().position(|e| e.id() == id));
                let Some(next) = cycle_index(current, elements.len(), step) else {
                    self.set_toast("Source page has no fields");
                    return;
                };
                let element_id = elements[next].id().to_string();
                self.update_selected(ConditionField::ElementId, element_id);
            }
            ConditionField::Operator => {
                let operator = condition.operator().cycle(step);
                self.update_selected(ConditionField::Operator, operator.as_str().to_owned());
            }
            ConditionField::Value => {}
            ConditionField::TargetPageId => {
                let current = self.form.page_index(condition.target_page_id());
                let Some(next) = cycle_index(current, pages.len(), step) else {
                    return;
                };
                let page_id = pages[next].id().to_string();
                self.update_selected(ConditionField::TargetPageId, page_id);
            }
        }
    }

    fn update_selected(&mut self, field: ConditionField, value: String) {
        let Some(condition_id) = self.selected_condition_id().cloned() else {
            return;
        };
        self.commit(|_| Ok(vec![FormOp::UpdateCondition { condition_id, field, value }]));
    }

    fn set_toast(&mut self, message: impl Into<String>) {
        self.toast = Some(Toast {
            message: message.into(),
            expires_at: Instant::now() + Duration::from_secs(2),
        });
    }

    fn active_toast(&self) -> Option<&str> {
        self.toast
            .as_ref()
            .filter(|toast| toast.expires_at > Instant::now())
            .map(|toast| toast.message.as_str())
    }

    fn flow_text(&self) -> Text<'static> {
        flow_view_text(&self.form, self.projection)
    }
}

/// Wraps `current + step` into `0..len`; a missing current value starts at either end.
fn cycle_index(current: Option<usize>, len: usize, step: isize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    let len = len as isize;
    let next = match current {
        Some(index) => (index as isize + step).rem_euclid(len),
        None if step >= 0 => 0,
        None => len - 1,
    };
    Some(next as usize)
}

fn draw(frame: &mut Frame<'_>, app: &mut App) {
    let area = frame.size();
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0), Constraint::Length(1)])
        .split(area);
    let (header_area, main_area, footer_area) = (layout[0], layout[1], layout[2]);

    frame.render_widget(Paragraph::new(header_line(app)), header_area);

    match app.view {
        View::Editor => draw_editor(frame, app, main_area),
        View::Flow => {
            let title = view_title("Condition Flow", Some(fallthrough_tag(app.projection)));
            let flow = Paragraph::new(app.flow_text())
                .block(Block::default().borders(Borders::ALL).title(title))
                .scroll((app.flow_scroll, 0));
            frame.render_widget(flow, main_area);
        }
    }

    frame.render_widget(Paragraph::new(footer_help_line(app)), footer_area);

    if app.show_help {
        render_help(frame, app, main_area);
    }
}

fn draw_editor(frame: &mut Frame<'_>, app: &mut App, area: Rect) {
    let panes = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3)])
        .split(area);
    let (cards_area, preview_area) = (panes[0], panes[1]);

    app.visible_cards = usize::from((cards_area.width / CARD_WIDTH).max(1));
    app.ensure_selected_visible();

    let conditions = app.form.conditions();
    if conditions.is_empty() {
        let message = if app.form.pages().is_empty() {
            "This form has no pages yet."
        } else {
            "No conditions yet. Press a to add one."
        };
        let empty = Paragraph::new(message)
            .block(Block::default().borders(Borders::ALL).title(view_title("Conditions", None)))
            .wrap(Wrap { trim: true });
        frame.render_widget(empty, cards_area);
    } else {
        let shown = conditions.iter().enumerate().skip(app.carousel_offset).take(app.visible_cards);
        let constraints =
            vec![Constraint::Length(CARD_WIDTH); app.visible_cards.min(conditions.len())];
        let slots = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(constraints)
            .split(cards_area);

        for ((index, condition), slot_area) in shown.zip(slots.iter()) {
            let focused = index == app.selected;
            let title = format!("Condition {}/{}", index + 1, conditions.len());
            let border_style =
                if focused { Style::default().fg(FOCUS_COLOR) } else { Style::default() };
            let lines = card_lines(
                app.form.pages(),
                condition,
                focused.then_some(app.slot),
                focused && app.editing_value,
            );
            let card = Paragraph::new(Text::from(lines))
                .block(
                    Block::default().borders(Borders::ALL).title(title).border_style(border_style),
                )
                .wrap(Wrap { trim: false });
            frame.render_widget(card, *slot_area);
        }
    }

    let preview = match app.selected_condition() {
        Some(condition) => condition_preview(app.form.pages(), condition),
        None => String::new(),
    };
    let preview = Paragraph::new(preview)
        .block(Block::default().borders(Borders::TOP).title(view_title("Rule", None)));
    frame.render_widget(preview, preview_area);
}

include!("chrome.rs");

struct TerminalSession {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

impl TerminalSession {
    fn new() -> Result<Self, Box<dyn Error>> {
        enable_raw_mode()?;

        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen).map_err(|err| {
            teardown_terminal();
            err
        })?;

        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).map_err(|err| {
            teardown_terminal();
            err
        })?;
        terminal.clear().map_err(|err| {
            teardown_terminal();
            err
        })?;

        Ok(Self { terminal })
    }

    fn draw(&mut self, draw_fn: impl FnOnce(&mut Frame<'_>)) -> io::Result<()> {
        self.terminal.draw(draw_fn)?;
        Ok(())
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let _ = self.terminal.show_cursor();
        teardown_terminal();
    }
}

fn teardown_terminal() {
    let _ = disable_raw_mode();
    let mut stdout = io::stdout();
    let _ = execute!(stdout, LeaveAlternateScreen);
}

#[cfg(test)]
pub(crate) mod testing {
    use super::{draw, App, View};
    use crate::model::{ConditionId, FormDocument, FormId};
    use crate::ops::ConditionField;
    use crate::workspace::{Workspace, WorkspaceError};
    use crossterm::event::KeyCode;
    use ratatui::{backend::TestBackend, Terminal};

    pub(crate) struct HeadlessTui {
        app: App,
    }

    impl HeadlessTui {
        pub(crate) fn new(workspace: Workspace, form_id: FormId) -> Result<Self, WorkspaceError> {
            let app = App::new(workspace, form_id)?;
            app.publish_selection_to_ui_state();
            Ok(Self { app })
        }

        pub(crate) fn press(&mut self, code: KeyCode) -> bool {
            self.app.handle_key_code(code)
        }

        pub(crate) fn press_all(&mut self, codes: impl IntoIterator<Item = KeyCode>) {
            for code in codes {
                self.press(code);
            }
        }

        pub(crate) fn type_text(&mut self, text: &str) {
            self.press_all(text.chars().map(KeyCode::Char));
        }

        pub(crate) fn sync_from_ui_state(&mut self) {
            self.app.sync_from_ui_state();
        }

        pub(crate) fn form(&self) -> &FormDocument {
            &self.app.form
        }

        pub(crate) fn selected_condition_id(&self) -> Option<ConditionId> {
            self.app.selected_condition_id().cloned()
        }

        pub(crate) fn slot(&self) -> ConditionField {
            self.app.slot
        }

        pub(crate) fn is_editing_value(&self) -> bool {
            self.app.editing_value
        }

        pub(crate) fn in_flow_view(&self) -> bool {
            self.app.view == View::Flow
        }

        pub(crate) fn fallthrough_edges(&self) -> bool {
            self.app.projection.fallthrough_edges
        }

        pub(crate) fn carousel_offset(&self) -> usize {
            self.app.carousel_offset
        }

        pub(crate) fn toast(&self) -> Option<String> {
            self.app.active_toast().map(ToOwned::to_owned)
        }

        pub(crate) fn flow_text(&self) -> String {
            super::text_to_string(&self.app.flow_text())
        }

        /// Draws one frame into an in-memory terminal and returns its rows.
        pub(crate) fn render(&mut self, width: u16, height: u16) -> Vec<String> {
            let backend = TestBackend::new(width, height);
            let mut terminal = Terminal::new(backend).expect("test terminal");
            terminal.draw(|frame| draw(frame, &mut self.app)).expect("draw");

            let buffer = terminal.backend().buffer();
            let width = usize::from(buffer.area.width);
            buffer
                .content
                .chunks(width)
                .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
                .collect()
        }
    }
}
