use std::io::{self, stdout};
use std::time::{Duration, Instant};

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph},
};

use crate::clipboard::ClipboardProbe;
use crate::config::Config;
use crate::controller::{Controller, Effect};
use crate::field::{FieldId, FieldKind, FieldState, Visibility};
use crate::output::OutputMode;
use crate::report::{render_report, Submission};
use crate::scope::{Checklist, CustomList, ScopeSelection};
use crate::validate::{validate_submission, validate_url, UrlStatus};

const TICK: Duration = Duration::from_millis(50);

const URL_PLACEHOLDERS: [&str; 4] = [
    "https://example.com",
    "https://yoursite.com",
    "https://myapp.io",
    "https://startup.co",
];

#[derive(Debug, Clone, Copy, PartialEq)]
enum Phase {
    Configure, // Page 1: URL and environment
    Scope,     // Page 2: what to test
    Confirm,   // Summary before hand-off
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum NoticeKind {
    Error,
    Info,
}

struct Notification {
    message: String,
    kind: NoticeKind,
    expires: Instant,
}

struct PendingReveal {
    field: FieldId,
    generation: u64,
    due: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum ScopeRow {
    Item(Checklist, usize),
    Name(CustomList, usize),
    Description(CustomList, usize),
}

pub enum Outcome {
    Quit,
    Submit(Submission, OutputMode),
}

pub struct Wizard {
    config: Config,
    controller: Controller,
    scope: ScopeSelection,
    phase: Phase,
    focus: FieldId,
    // Highlighted entry of the open dropdown
    option_cursor: usize,
    scope_cursor: usize,
    reveals: Vec<PendingReveal>,
    notification: Option<Notification>,
    clipboard: ClipboardProbe,
    clipboard_hint: Option<String>,
    placeholder_index: usize,
    placeholder_since: Instant,
}

impl Wizard {
    pub fn new(config: Config, clipboard: ClipboardProbe, today: &str) -> Self {
        let mut controller = Controller::new();
        if let Err(e) = controller.set_text(FieldId::TestDate, today) {
            log::warn!("could not prefill test date: {}", e);
        }
        Self {
            config,
            controller,
            scope: ScopeSelection::new(),
            phase: Phase::Configure,
            focus: FieldId::Url,
            option_cursor: 0,
            scope_cursor: 0,
            reveals: Vec::new(),
            notification: None,
            clipboard,
            clipboard_hint: None,
            placeholder_index: 0,
            placeholder_since: Instant::now(),
        }
    }

    pub fn prefill_url(&mut self, url: &str) {
        if let Err(e) = self.controller.set_text(FieldId::Url, url.trim()) {
            log::warn!("could not prefill url: {}", e);
        }
    }

    fn notify(&mut self, message: impl Into<String>, kind: NoticeKind, now: Instant) {
        self.notification = Some(Notification {
            message: message.into(),
            kind,
            expires: now + self.config.notification_ttl(),
        });
    }

    fn apply(&mut self, effects: Vec<Effect>, now: Instant) {
        for effect in effects {
            match effect {
                Effect::Reveal { field, generation } => self.reveals.push(PendingReveal {
                    field,
                    generation,
                    due: now + self.config.reveal_delay(),
                }),
                Effect::Focus(field) => self.focus = field,
            }
        }
    }

    /// Timers: reveals, notification expiry, placeholder rotation, clipboard.
    pub fn tick(&mut self, now: Instant) {
        let mut landed = Vec::new();
        self.reveals.retain(|r| {
            if r.due <= now {
                landed.push((r.field, r.generation));
                false
            } else {
                true
            }
        });
        for (field, generation) in landed {
            if !self.controller.finish_reveal(field, generation) {
                log::trace!("stale reveal of {} dropped", field);
            }
        }

        if self
            .notification
            .as_ref()
            .map(|n| n.expires <= now)
            .unwrap_or(false)
        {
            self.notification = None;
        }

        if now.duration_since(self.placeholder_since) >= self.config.placeholder_period() {
            self.placeholder_index = (self.placeholder_index + 1) % URL_PLACEHOLDERS.len();
            self.placeholder_since = now;
        }

        if !self.clipboard.is_pending() {
            return;
        }
        if let Some(url) = self.clipboard.poll() {
            if self.controller.value(FieldId::Url).trim().is_empty() {
                log::debug!("clipboard holds a url, offering it");
                self.clipboard_hint = Some(url);
            }
        }
    }

    fn accept_clipboard_hint(&mut self) {
        let Some(url) = self.clipboard_hint.take() else {
            return;
        };
        self.prefill_url(&url);
        self.focus = FieldId::Url;
    }

    fn focus_order(&self) -> Vec<FieldId> {
        self.controller.visible_fields().iter().map(|f| f.id).collect()
    }

    fn move_focus(&mut self, delta: isize) {
        self.controller.close_all();
        let order = self.focus_order();
        if order.is_empty() {
            return;
        }
        let pos = order.iter().position(|id| *id == self.focus).unwrap_or(0);
        let next = (pos as isize + delta).clamp(0, order.len() as isize - 1) as usize;
        self.focus = order[next];
    }

    fn ensure_focus_visible(&mut self) {
        if self.controller.is_visible(self.focus) {
            return;
        }
        let before = FieldId::ALL
            .iter()
            .take_while(|id| **id != self.focus)
            .filter(|id| self.controller.is_visible(**id))
            .last()
            .copied();
        self.focus = before.unwrap_or(FieldId::Url);
    }

    fn focused_is_select(&self) -> bool {
        self.controller
            .field(self.focus)
            .map(|f| f.is_select())
            .unwrap_or(false)
    }

    fn edit_text(&mut self, edit: impl FnOnce(&mut String)) {
        let mut text = self.controller.value(self.focus).to_string();
        edit(&mut text);
        if let Err(e) = self.controller.set_text(self.focus, &text) {
            log::warn!("edit ignored: {}", e);
        }
    }

    fn toggle_dropdown(&mut self) {
        if let Err(e) = self.controller.toggle(self.focus) {
            log::warn!("cannot open dropdown: {}", e);
            return;
        }
        self.option_cursor = self
            .controller
            .field(self.focus)
            .and_then(|f| f.selected_index())
            .unwrap_or(0);
    }

    fn choose(&mut self, field: FieldId, now: Instant) {
        let Some(choice) = self
            .controller
            .field(field)
            .and_then(|f| f.options.get(self.option_cursor))
            .cloned()
        else {
            return;
        };
        match self.controller.select(field, &choice.value, &choice.label) {
            Ok(effects) => self.apply(effects, now),
            Err(e) => log::warn!("selection rejected: {}", e),
        }
        self.ensure_focus_visible();
    }

    fn submit_configure(&mut self, now: Instant) {
        self.controller.close_all();
        match validate_submission(&self.controller.snapshot()) {
            Ok(()) => {
                log::info!("configuration accepted");
                self.notification = None;
                self.phase = Phase::Scope;
            }
            Err(e) => {
                log::info!("submission blocked: {}", e);
                if self.controller.is_visible(e.field()) {
                    self.focus = e.field();
                }
                self.notify(e.to_string(), NoticeKind::Error, now);
            }
        }
    }

    pub fn submission(&self) -> Submission {
        Submission {
            form: self.controller.snapshot(),
            scope: self.scope.snapshot(),
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent, now: Instant) -> Option<Outcome> {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Some(Outcome::Quit);
        }
        match self.phase {
            Phase::Configure => self.handle_configure_key(key, now),
            Phase::Scope => self.handle_scope_key(key, now),
            Phase::Confirm => self.handle_confirm_key(key),
        }
    }

    fn handle_configure_key(&mut self, key: KeyEvent, now: Instant) -> Option<Outcome> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('s') if ctrl => {
                self.submit_configure(now);
                return None;
            }
            KeyCode::Char('v') if ctrl => {
                self.accept_clipboard_hint();
                return None;
            }
            _ => {}
        }

        if let Some(open) = self.controller.open_field() {
            return self.handle_dropdown_key(open, key, now);
        }

        let is_select = self.focused_is_select();
        match key.code {
            KeyCode::Up | KeyCode::BackTab => self.move_focus(-1),
            KeyCode::Down | KeyCode::Tab => self.move_focus(1),
            KeyCode::Char('k') if is_select => self.move_focus(-1),
            KeyCode::Char('j') if is_select => self.move_focus(1),
            KeyCode::Char('q') if is_select => return Some(Outcome::Quit),
            KeyCode::Enter | KeyCode::Char(' ') if is_select => self.toggle_dropdown(),
            KeyCode::Enter => self.move_focus(1),
            KeyCode::Esc if self.focus == FieldId::Url => self.edit_text(|t| t.clear()),
            KeyCode::Char(c) if !is_select && !ctrl => self.edit_text(|t| t.push(c)),
            KeyCode::Backspace if !is_select => self.edit_text(|t| {
                t.pop();
            }),
            _ => {}
        }
        None
    }

    fn handle_dropdown_key(&mut self, open: FieldId, key: KeyEvent, now: Instant) -> Option<Outcome> {
        let len = self
            .controller
            .field(open)
            .map(|f| f.options.len())
            .unwrap_or(0);
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                if self.option_cursor > 0 {
                    self.option_cursor -= 1;
                }
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.option_cursor + 1 < len {
                    self.option_cursor += 1;
                }
            }
            KeyCode::Enter | KeyCode::Char(' ') => self.choose(open, now),
            KeyCode::Esc => self.controller.close_all(),
            KeyCode::Tab => self.move_focus(1),
            KeyCode::BackTab => self.move_focus(-1),
            KeyCode::Char('q') => return Some(Outcome::Quit),
            _ => {}
        }
        None
    }

    fn scope_rows(&self) -> Vec<ScopeRow> {
        let mut rows = Vec::new();
        let push_items = |rows: &mut Vec<ScopeRow>, list: Checklist| {
            for i in 0..list.items().len() {
                rows.push(ScopeRow::Item(list, i));
            }
        };
        push_items(&mut rows, Checklist::TestScope);
        push_items(&mut rows, Checklist::UiChecklist);
        for i in 0..self.scope.rows(CustomList::Ui).len() {
            rows.push(ScopeRow::Name(CustomList::Ui, i));
            rows.push(ScopeRow::Description(CustomList::Ui, i));
        }
        push_items(&mut rows, Checklist::UxFlows);
        for i in 0..self.scope.rows(CustomList::Ux).len() {
            rows.push(ScopeRow::Name(CustomList::Ux, i));
            rows.push(ScopeRow::Description(CustomList::Ux, i));
        }
        rows
    }

    fn edit_scope_row(&mut self, row: ScopeRow, edit: impl FnOnce(&mut String)) {
        match row {
            ScopeRow::Name(list, i) => {
                let mut text = self
                    .scope
                    .rows(list)
                    .rows()
                    .get(i)
                    .map(|r| r.name.clone())
                    .unwrap_or_default();
                edit(&mut text);
                self.scope.rows_mut(list).set_name(i, &text);
            }
            ScopeRow::Description(list, i) => {
                let mut text = self
                    .scope
                    .rows(list)
                    .rows()
                    .get(i)
                    .map(|r| r.description.clone())
                    .unwrap_or_default();
                edit(&mut text);
                self.scope.rows_mut(list).set_description(i, &text);
            }
            ScopeRow::Item(..) => {}
        }
    }

    fn move_scope_cursor(&mut self, delta: isize, len: usize) {
        if len == 0 {
            return;
        }
        let next = (self.scope_cursor as isize + delta).clamp(0, len as isize - 1);
        self.scope_cursor = next as usize;
    }

    fn handle_scope_key(&mut self, key: KeyEvent, now: Instant) -> Option<Outcome> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let rows = self.scope_rows();
        let current = rows.get(self.scope_cursor).copied();
        let editing = matches!(
            current,
            Some(ScopeRow::Name(..)) | Some(ScopeRow::Description(..))
        );

        match key.code {
            KeyCode::Char('s') if ctrl => match self.scope.validate() {
                Ok(()) => {
                    let total = self.scope.snapshot().total();
                    log::info!("scope accepted with {} items", total);
                    self.notification = None;
                    self.phase = Phase::Confirm;
                }
                Err(e) => self.notify(e.to_string(), NoticeKind::Error, now),
            },
            KeyCode::Char('d') if ctrl => {
                if let Some(ScopeRow::Name(list, i)) | Some(ScopeRow::Description(list, i)) =
                    current
                {
                    if self.scope.rows_mut(list).remove(i) {
                        let len = self.scope_rows().len();
                        self.move_scope_cursor(0, len);
                    } else {
                        self.notify("The last row cannot be removed", NoticeKind::Info, now);
                    }
                }
            }
            KeyCode::Esc => self.phase = Phase::Configure,
            KeyCode::Up | KeyCode::BackTab => self.move_scope_cursor(-1, rows.len()),
            KeyCode::Down | KeyCode::Tab | KeyCode::Enter => {
                self.move_scope_cursor(1, rows.len())
            }
            KeyCode::Char('k') if !editing => self.move_scope_cursor(-1, rows.len()),
            KeyCode::Char('j') if !editing => self.move_scope_cursor(1, rows.len()),
            KeyCode::Char('q') if !editing => return Some(Outcome::Quit),
            KeyCode::Char(' ') if !editing => {
                if let Some(ScopeRow::Item(list, i)) = current {
                    self.scope.toggle(list, i);
                }
            }
            KeyCode::Char(c) if editing && !ctrl => {
                if let Some(row) = current {
                    self.edit_scope_row(row, |t| t.push(c));
                }
            }
            KeyCode::Backspace if editing => {
                if let Some(row) = current {
                    self.edit_scope_row(row, |t| {
                        t.pop();
                    });
                }
            }
            _ => {}
        }
        None
    }

    fn handle_confirm_key(&mut self, key: KeyEvent) -> Option<Outcome> {
        let mode = match key.code {
            KeyCode::Esc => {
                self.phase = Phase::Scope;
                return None;
            }
            KeyCode::Char('q') => return Some(Outcome::Quit),
            KeyCode::Enter => self.config.output,
            KeyCode::Char('r') => OutputMode::Report,
            KeyCode::Char('j') => OutputMode::Json,
            KeyCode::Char('c') => OutputMode::Clipboard,
            _ => return None,
        };
        Some(Outcome::Submit(self.submission(), mode))
    }
}

pub fn run(
    config: Config,
    clipboard: ClipboardProbe,
    today: &str,
    url: Option<&str>,
) -> io::Result<Option<(Submission, OutputMode)>> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;

    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    let mut wizard = Wizard::new(config, clipboard, today);
    if let Some(url) = url {
        wizard.prefill_url(url);
    }

    let result = loop {
        wizard.tick(Instant::now());
        terminal.draw(|f| ui(f, &wizard))?;

        if !event::poll(TICK)? {
            continue;
        }
        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match wizard.handle_key(key, Instant::now()) {
                Some(Outcome::Quit) => break Ok(None),
                Some(Outcome::Submit(submission, mode)) => break Ok(Some((submission, mode))),
                None => {}
            }
        }
    };

    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(area.width), height.min(area.height))
}

/// Keeps `cursor_line` inside a bordered box of `area`.
fn scroll_for(cursor_line: usize, area: Rect) -> u16 {
    let visible = area.height.saturating_sub(2) as usize;
    cursor_line.saturating_sub(visible.saturating_sub(1)) as u16
}

fn ui(f: &mut Frame, wizard: &Wizard) {
    let centered = centered_rect(76, 32, f.area());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(3)])
        .split(centered);

    match wizard.phase {
        Phase::Configure => render_configure(f, chunks[0], wizard),
        Phase::Scope => render_scope(f, chunks[0], wizard),
        Phase::Confirm => render_confirm(f, chunks[0], wizard),
    }

    let bottom = match &wizard.notification {
        Some(notice) => {
            let style = match notice.kind {
                NoticeKind::Error => Style::default().fg(Color::Red).bold(),
                NoticeKind::Info => Style::default().fg(Color::Yellow),
            };
            Paragraph::new(notice.message.as_str())
                .style(style)
                .block(Block::default().borders(Borders::ALL))
        }
        None => {
            let help = match wizard.phase {
                Phase::Configure => "↑↓ move  Enter open/pick  ^S continue  ^V paste  ^C quit",
                Phase::Scope => "↑↓ move  Space check  ^D remove row  ^S continue  Esc back",
                Phase::Confirm => "Enter submit  r report  j json  c copy  Esc back  q quit",
            };
            Paragraph::new(help)
                .style(Style::default().fg(Color::DarkGray))
                .block(Block::default().borders(Borders::ALL))
        }
    };
    f.render_widget(bottom, chunks[1]);
}

fn text_span<'a>(field: &'a FieldState, focused: bool, placeholder: &'a str) -> Vec<Span<'a>> {
    let mut spans = Vec::new();
    if field.value.is_empty() {
        spans.push(Span::styled(placeholder, Style::default().fg(Color::DarkGray)));
    } else {
        let style = if field.id == FieldId::Url {
            match validate_url(&field.value) {
                UrlStatus::Valid => Style::default().fg(Color::Green),
                UrlStatus::Invalid => Style::default().fg(Color::Red),
                UrlStatus::Empty => Style::default(),
            }
        } else {
            Style::default()
        };
        spans.push(Span::styled(field.value.as_str(), style));
    }
    if focused {
        spans.push(Span::raw("█"));
    }
    spans
}

fn render_configure(f: &mut Frame, area: Rect, wizard: &Wizard) {
    let mut lines: Vec<Line> = Vec::new();
    let mut cursor_line = 0;

    if let Some(url) = &wizard.clipboard_hint {
        lines.push(Line::from(vec![
            Span::styled("URL detected in clipboard: ", Style::default().fg(Color::Yellow)),
            Span::raw(url.as_str()),
            Span::styled("  ^V paste", Style::default().fg(Color::DarkGray)),
        ]));
        lines.push(Line::from(""));
    }

    for field in wizard.controller.visible_fields() {
        let focused = field.id == wizard.focus;
        if focused {
            cursor_line = lines.len();
        }

        let title_style = if field.visibility == Visibility::Revealing {
            Style::default().fg(Color::DarkGray)
        } else if focused {
            Style::default().fg(Color::Cyan).bold()
        } else {
            Style::default()
        };
        let marker = if focused { "› " } else { "  " };
        let required = if field.required { "*" } else { "" };

        let mut spans = vec![Span::styled(
            format!("{}{}{}: ", marker, field.id.title(), required),
            title_style,
        )];
        match field.kind {
            FieldKind::Select => {
                let style = if field.is_unset() {
                    Style::default().fg(Color::DarkGray)
                } else {
                    Style::default()
                };
                let arrow = if wizard.controller.is_open(field.id) { " ▴" } else { " ▾" };
                spans.push(Span::styled(format!("{}{}", field.display(), arrow), style));
            }
            FieldKind::Text => {
                let placeholder = if field.id == FieldId::Url {
                    URL_PLACEHOLDERS[wizard.placeholder_index]
                } else {
                    field.id.placeholder()
                };
                spans.extend(text_span(field, focused, placeholder));
            }
        }
        lines.push(Line::from(spans));

        if wizard.controller.is_open(field.id) {
            let selected = field.selected_index();
            for (i, choice) in field.options.iter().enumerate() {
                let highlighted = i == wizard.option_cursor;
                if highlighted {
                    cursor_line = lines.len();
                }
                let marker = if selected == Some(i) { "● " } else { "○ " };
                let style = if highlighted {
                    Style::default().fg(Color::Cyan).bold()
                } else if selected == Some(i) {
                    Style::default().fg(Color::Green)
                } else {
                    Style::default()
                };
                lines.push(Line::from(Span::styled(
                    format!("      {}{}", marker, choice.label),
                    style,
                )));
            }
        }
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" QB Bot · Test Configuration ");
    let paragraph = Paragraph::new(lines)
        .block(block)
        .scroll((scroll_for(cursor_line, area), 0));
    f.render_widget(paragraph, area);
}

fn render_scope(f: &mut Frame, area: Rect, wizard: &Wizard) {
    let rows = wizard.scope_rows();
    let mut lines: Vec<Line> = Vec::new();
    let mut cursor_line = 0;
    let mut section: Option<&'static str> = None;

    for (index, row) in rows.iter().enumerate() {
        let title = match row {
            ScopeRow::Item(list, _) => list.title(),
            ScopeRow::Name(list, _) | ScopeRow::Description(list, _) => list.title(),
        };
        if section != Some(title) {
            if section.is_some() {
                lines.push(Line::from(""));
            }
            lines.push(Line::from(Span::styled(
                title,
                Style::default().fg(Color::DarkGray).bold(),
            )));
            section = Some(title);
        }

        let focused = index == wizard.scope_cursor;
        if focused {
            cursor_line = lines.len();
        }
        let style = if focused {
            Style::default().fg(Color::Cyan).bold()
        } else {
            Style::default()
        };

        let line = match *row {
            ScopeRow::Item(list, i) => {
                let checked = wizard.scope.is_checked(list, i);
                let checkbox = if checked { "[x] " } else { "[ ] " };
                let style = if !focused && checked {
                    Style::default().fg(Color::Green)
                } else {
                    style
                };
                Line::from(Span::styled(
                    format!("  {}{}", checkbox, list.items()[i]),
                    style,
                ))
            }
            ScopeRow::Name(list, i) | ScopeRow::Description(list, i) => {
                let custom = wizard.scope.rows(list);
                let entry = custom.rows().get(i).cloned().unwrap_or_default();
                let is_name = matches!(row, ScopeRow::Name(..));
                let (text, placeholder) = if is_name {
                    (entry.name, list.name_placeholder())
                } else {
                    (entry.description, list.description_placeholder())
                };
                let prefix = if is_name {
                    let remove = if custom.can_remove() { "×" } else { " " };
                    format!("  {} {}. ", remove, i + 1)
                } else {
                    "       ".to_string()
                };
                let mut spans = vec![Span::styled(prefix, style)];
                if text.is_empty() {
                    spans.push(Span::styled(
                        placeholder,
                        Style::default().fg(Color::DarkGray),
                    ));
                } else {
                    spans.push(Span::styled(text, style));
                }
                if focused {
                    spans.push(Span::raw("█"));
                }
                Line::from(spans)
            }
        };
        lines.push(line);
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" QB Bot · Test Scope ");
    let paragraph = Paragraph::new(lines)
        .block(block)
        .scroll((scroll_for(cursor_line, area), 0));
    f.render_widget(paragraph, area);
}

fn render_confirm(f: &mut Frame, area: Rect, wizard: &Wizard) {
    let report = render_report(&wizard.submission(), chrono::Local::now().naive_local());
    let lines: Vec<Line> = report.lines().map(|l| Line::from(l.to_string())).collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" QB Bot · Summary ");
    let paragraph = Paragraph::new(lines).block(block);
    f.render_widget(paragraph, area);
}
