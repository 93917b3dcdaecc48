// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use orcamento_app::{
    ClientField, DocumentVariant, ItemField, LoadingFlag, Notice, Notifier, Quote, Severity,
    SheetCommand, SheetState, WorkflowOutcome, format_brl, format_date, today_iso,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Paragraph};
use std::io;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

const SHEET_TITLE: &str = "PLANILHA DE SERVIÇOS";
const CLIENT_PANEL_TITLE: &str = "DADOS DO CLIENTE";
const FOCUS_MARK: &str = "›";
const OPEN_MARK: &str = "▾";
const CLOSED_MARK: &str = "▸";
const KEY_HINT: &str = "tab/↓ next · shift-tab/↑ prev · enter open/select · ctrl-g gerar · ctrl-q quit";

/// Side effects the sheet screen needs from its host.
pub trait SheetRuntime {
    fn run_generation(
        &mut self,
        quote: &Quote,
        variant: Option<DocumentVariant>,
        loading: &LoadingFlag,
        notifier: &dyn Notifier,
    ) -> WorkflowOutcome;

    /// Runs generation and reports notices and the outcome over `tx`. The
    /// default runs inline; hosts with slow services should override this
    /// to move the work off the UI thread.
    fn spawn_generation(
        &mut self,
        quote: Quote,
        variant: Option<DocumentVariant>,
        loading: LoadingFlag,
        tx: Sender<InternalEvent>,
    ) -> Result<()> {
        let notices = tx.clone();
        let notify = move |notice: Notice| {
            let _ = notices.send(InternalEvent::Notice(notice));
        };
        let outcome = self.run_generation(&quote, variant, &loading, &notify);
        tx.send(InternalEvent::GenerationFinished(outcome))
            .map_err(|_| anyhow!("generation event channel closed"))?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum InternalEvent {
    ClearStatus { token: u64 },
    Notice(Notice),
    GenerationFinished(WorkflowOutcome),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Focus {
    #[default]
    ClientHeader,
    Client(ClientField),
    Category(usize),
    Item {
        category: usize,
        item: usize,
        field: ItemField,
    },
    Variant(DocumentVariant),
    Generate,
}

/// Raw text typed into a numeric field. The quote only ever holds the
/// parsed number, so the text has to live here between keystrokes.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Draft {
    focus: Focus,
    text: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
struct ViewData {
    focus: Focus,
    draft: Option<Draft>,
    status_token: u64,
    generation_pending: bool,
    last_document: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineKind {
    Heading,
    Field,
    Placeholder,
    Detail,
    Total,
    Blank,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct SheetLine {
    text: String,
    kind: LineKind,
    focus: Option<Focus>,
}

impl SheetLine {
    fn new(text: impl Into<String>, kind: LineKind, focus: Option<Focus>) -> Self {
        Self {
            text: text.into(),
            kind,
            focus,
        }
    }

    fn blank() -> Self {
        Self::new(String::new(), LineKind::Blank, None)
    }
}

pub fn run_app<R: SheetRuntime>(
    state: &mut SheetState,
    quote: &mut Quote,
    runtime: &mut R,
) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut view_data = ViewData::default();
    let (internal_tx, internal_rx) = mpsc::channel();
    let today = format_date(&today_iso()).unwrap_or_default();

    let mut result = Ok(());
    loop {
        process_internal_events(state, &mut view_data, &internal_tx, &internal_rx);

        if let Err(error) =
            terminal.draw(|frame| render(frame, state, quote, &view_data, &today))
        {
            result = Err(error).context("draw frame");
            break;
        }

        let has_event = event::poll(Duration::from_millis(120)).context("poll event")?;
        if has_event {
            match event::read().context("read event")? {
                Event::Key(key) if key.kind != KeyEventKind::Release => {
                    if handle_key_event(state, quote, runtime, &mut view_data, &internal_tx, key)
                    {
                        break;
                    }
                }
                _ => {}
            }
        }
    }

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    result
}

fn process_internal_events(
    state: &mut SheetState,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    rx: &Receiver<InternalEvent>,
) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::ClearStatus { token } if token == view_data.status_token => {
                state.dispatch(SheetCommand::ClearStatus);
            }
            InternalEvent::ClearStatus { .. } => {}
            InternalEvent::Notice(notice) => emit_notice(state, view_data, tx, notice),
            InternalEvent::GenerationFinished(outcome) => {
                view_data.generation_pending = false;
                if let WorkflowOutcome::Succeeded(document) = outcome {
                    view_data.last_document = Some(document.path);
                }
            }
        }
    }
}

fn schedule_status_clear(internal_tx: &Sender<InternalEvent>, token: u64) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(Duration::from_secs(4));
        let _ = sender.send(InternalEvent::ClearStatus { token });
    });
}

fn emit_notice(
    state: &mut SheetState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    notice: Notice,
) {
    state.dispatch(SheetCommand::ShowNotice(notice));
    view_data.status_token = view_data.status_token.saturating_add(1);
    schedule_status_clear(internal_tx, view_data.status_token);
}

fn handle_key_event<R: SheetRuntime>(
    state: &mut SheetState,
    quote: &mut Quote,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('q' | 'c') if ctrl => return true,
        KeyCode::Char('g') if ctrl => {
            trigger_generation(state, quote, runtime, view_data, internal_tx);
            return false;
        }
        KeyCode::Tab | KeyCode::Down => {
            move_focus(state, quote, view_data, 1);
            return false;
        }
        KeyCode::BackTab | KeyCode::Up => {
            move_focus(state, quote, view_data, -1);
            return false;
        }
        _ => {}
    }

    match view_data.focus {
        Focus::Client(field) => edit_client_field(quote, field, key),
        Focus::Item {
            category,
            item,
            field,
        } => edit_item_field(quote, view_data, category, item, field, key),
        focus if matches!(key.code, KeyCode::Enter | KeyCode::Char(' ')) => {
            activate(state, quote, runtime, view_data, internal_tx, focus);
        }
        _ => {}
    }
    false
}

fn activate<R: SheetRuntime>(
    state: &mut SheetState,
    quote: &mut Quote,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    focus: Focus,
) {
    match focus {
        Focus::ClientHeader => {
            state.dispatch(SheetCommand::ToggleClientPanel);
        }
        Focus::Category(index) => {
            if let Some(category) = quote.categories.get(index) {
                state.dispatch(SheetCommand::ToggleCategory(category.name.clone()));
            }
        }
        Focus::Variant(variant) => {
            state.dispatch(SheetCommand::ToggleVariant(variant));
        }
        Focus::Generate => trigger_generation(state, quote, runtime, view_data, internal_tx),
        Focus::Client(_) | Focus::Item { .. } => {}
    }
}

fn edit_client_field(quote: &mut Quote, field: ClientField, key: KeyEvent) {
    let current = quote.client.field(field).to_owned();
    let next = match key.code {
        KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            format!("{current}{ch}")
        }
        // Popping the formatted phone would only remove a separator that the
        // formatter puts right back, so drop the last digit instead.
        KeyCode::Backspace if field == ClientField::Phone => {
            let mut digits: String = current.chars().filter(char::is_ascii_digit).collect();
            digits.pop();
            digits
        }
        KeyCode::Backspace => {
            let mut text = current;
            text.pop();
            text
        }
        _ => return,
    };
    quote.client.set_field(field, &next);
}

fn edit_item_field(
    quote: &mut Quote,
    view_data: &mut ViewData,
    category: usize,
    item: usize,
    field: ItemField,
    key: KeyEvent,
) {
    let Some(entry) = quote.categories.get(category) else {
        return;
    };
    let category_name = entry.name.clone();
    let current = entry.items.get(item).map_or(0.0, |entry| entry.field(field));
    let focus = view_data.focus;
    let mut text = match view_data.draft.take() {
        Some(draft) if draft.focus == focus => draft.text,
        _ => display_number(current),
    };

    match key.code {
        KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => text.push(ch),
        KeyCode::Backspace => {
            text.pop();
        }
        _ => {
            view_data.draft = Some(Draft { focus, text });
            return;
        }
    }

    quote.apply_item_edit(&category_name, item, field, &text);
    view_data.draft = Some(Draft { focus, text });
}

fn trigger_generation<R: SheetRuntime>(
    state: &mut SheetState,
    quote: &Quote,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    if view_data.generation_pending || state.is_generating() {
        return;
    }

    view_data.generation_pending = true;
    if let Err(error) = runtime.spawn_generation(
        quote.clone(),
        state.variant,
        state.generating.clone(),
        internal_tx.clone(),
    ) {
        tracing::error!(error = %format!("{error:#}"), "could not start document generation");
        view_data.generation_pending = false;
        emit_notice(
            state,
            view_data,
            internal_tx,
            Notice::generation_failed(&format!("{error:#}")),
        );
    }
}

fn focus_targets(state: &SheetState, quote: &Quote) -> Vec<Focus> {
    let mut targets = vec![Focus::ClientHeader];
    if state.client_panel_open {
        targets.extend(ClientField::ALL.map(Focus::Client));
    }
    for (index, category) in quote.categories.iter().enumerate() {
        targets.push(Focus::Category(index));
        if state.is_expanded(&category.name) {
            for item in 0..category.items.len() {
                for field in [ItemField::Value, ItemField::Quantity] {
                    targets.push(Focus::Item {
                        category: index,
                        item,
                        field,
                    });
                }
            }
        }
    }
    targets.extend(DocumentVariant::ALL.map(Focus::Variant));
    targets.push(Focus::Generate);
    targets
}

/// The focus a hidden field falls back to once its section collapses.
fn visible_anchor(focus: Focus) -> Focus {
    match focus {
        Focus::Client(_) => Focus::ClientHeader,
        Focus::Item { category, .. } => Focus::Category(category),
        other => other,
    }
}

fn move_focus(state: &SheetState, quote: &Quote, view_data: &mut ViewData, delta: isize) {
    let targets = focus_targets(state, quote);
    let anchor = if targets.contains(&view_data.focus) {
        view_data.focus
    } else {
        visible_anchor(view_data.focus)
    };
    let current = targets
        .iter()
        .position(|target| *target == anchor)
        .unwrap_or(0);
    let last = targets.len().saturating_sub(1);
    let next = current.saturating_add_signed(delta).min(last);
    view_data.focus = targets[next];
    view_data.draft = None;
}

fn display_number(value: f64) -> String {
    if value == 0.0 {
        String::new()
    } else {
        value.to_string()
    }
}

fn field_text(view_data: &ViewData, focus: Focus, value: f64) -> String {
    match &view_data.draft {
        Some(draft) if draft.focus == focus => draft.text.clone(),
        _ => display_number(value),
    }
}

fn sheet_lines(state: &SheetState, quote: &Quote, view_data: &ViewData) -> Vec<SheetLine> {
    let mut lines = Vec::new();

    let panel_mark = if state.client_panel_open {
        OPEN_MARK
    } else {
        CLOSED_MARK
    };
    lines.push(SheetLine::new(
        format!("{panel_mark} {CLIENT_PANEL_TITLE}"),
        LineKind::Heading,
        Some(Focus::ClientHeader),
    ));
    if state.client_panel_open {
        for field in ClientField::ALL {
            let value = quote.client.field(field);
            let (text, kind) = if value.is_empty() {
                (field.placeholder(), LineKind::Placeholder)
            } else {
                (value, LineKind::Field)
            };
            lines.push(SheetLine::new(
                format!("    {}: {text}", field.label()),
                kind,
                Some(Focus::Client(field)),
            ));
        }
    }

    for (index, category) in quote.categories.iter().enumerate() {
        lines.push(SheetLine::blank());
        let expanded = state.is_expanded(&category.name);
        let mark = if expanded { OPEN_MARK } else { CLOSED_MARK };
        lines.push(SheetLine::new(
            format!(
                "{mark} {}  {}",
                category.name,
                format_brl(category.subtotal())
            ),
            LineKind::Heading,
            Some(Focus::Category(index)),
        ));
        if !expanded {
            continue;
        }
        for (item_index, item) in category.items.iter().enumerate() {
            lines.push(SheetLine::new(
                format!("    {}", item.description),
                LineKind::Field,
                None,
            ));
            lines.push(SheetLine::new(
                format!("      Unidade: {}", item.unit),
                LineKind::Detail,
                None,
            ));
            lines.push(SheetLine::new(
                format!(
                    "      Valor mínimo: {} | Valor máximo: {}",
                    format_brl(item.min_value),
                    format_brl(item.max_value)
                ),
                LineKind::Detail,
                None,
            ));
            if !item.notes.trim().is_empty() {
                lines.push(SheetLine::new(
                    format!("      {}", item.notes.trim()),
                    LineKind::Detail,
                    None,
                ));
            }
            for field in [ItemField::Value, ItemField::Quantity] {
                let focus = Focus::Item {
                    category: index,
                    item: item_index,
                    field,
                };
                lines.push(SheetLine::new(
                    format!(
                        "      {}: {}",
                        field.label(),
                        field_text(view_data, focus, item.field(field))
                    ),
                    LineKind::Field,
                    Some(focus),
                ));
            }
            lines.push(SheetLine::new(
                format!("      Subtotal: {}", format_brl(item.subtotal())),
                LineKind::Detail,
                None,
            ));
        }
    }

    lines.push(SheetLine::blank());
    lines.push(SheetLine::new(
        format!("TOTAL GERAL: {}", format_brl(quote.total())),
        LineKind::Total,
        None,
    ));
    lines.push(SheetLine::blank());
    for variant in DocumentVariant::ALL {
        let checked = if state.variant == Some(variant) {
            "x"
        } else {
            " "
        };
        lines.push(SheetLine::new(
            format!("[{checked}] {}", variant.label()),
            LineKind::Field,
            Some(Focus::Variant(variant)),
        ));
    }
    lines.push(SheetLine::new(
        format!("[ {} ]", generate_label(state, view_data)),
        LineKind::Heading,
        Some(Focus::Generate),
    ));
    lines
}

fn generate_label(state: &SheetState, view_data: &ViewData) -> &'static str {
    if view_data.generation_pending || state.is_generating() {
        "Gerando..."
    } else {
        "Gerar PDF"
    }
}

/// Plain-text rendering of the sheet body, focus mark included.
#[cfg(test)]
fn render_sheet_text(state: &SheetState, quote: &Quote, view_data: &ViewData) -> String {
    sheet_lines(state, quote, view_data)
        .into_iter()
        .map(|line| {
            let mark = if line.focus == Some(view_data.focus) {
                FOCUS_MARK
            } else {
                " "
            };
            format!("{mark} {}", line.text).trim_end().to_owned()
        })
        .collect::<Vec<String>>()
        .join("\n")
}

fn status_text(state: &SheetState, view_data: &ViewData) -> String {
    if let Some(notice) = &state.status {
        return notice.text();
    }
    if view_data.generation_pending || state.is_generating() {
        return "gerando PDF...".to_owned();
    }
    if let Some(path) = &view_data.last_document {
        return format!("último PDF: {}", path.display());
    }
    KEY_HINT.to_owned()
}

fn status_style(state: &SheetState) -> Style {
    let color = match state.status.as_ref().map(|notice| notice.severity) {
        Some(Severity::Success) => Color::Green,
        Some(Severity::Error) => Color::Red,
        Some(Severity::Info) => Color::Yellow,
        None => Color::DarkGray,
    };
    Style::default().fg(color)
}

fn line_style(kind: LineKind, focused: bool) -> Style {
    let base = match kind {
        LineKind::Heading => Style::default().add_modifier(Modifier::BOLD),
        LineKind::Placeholder | LineKind::Detail => Style::default().fg(Color::DarkGray),
        LineKind::Total => Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD),
        LineKind::Field | LineKind::Blank => Style::default(),
    };
    if focused {
        base.fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
        base
    }
}

fn render(
    frame: &mut ratatui::Frame<'_>,
    state: &SheetState,
    quote: &Quote,
    view_data: &ViewData,
    today: &str,
) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let header = Paragraph::new(format!("{SHEET_TITLE}    {today}"))
        .style(Style::default().add_modifier(Modifier::BOLD))
        .block(Block::default().title("orcamento").borders(Borders::ALL));
    frame.render_widget(header, layout[0]);

    let lines = sheet_lines(state, quote, view_data);
    let focused_row = lines
        .iter()
        .position(|line| line.focus == Some(view_data.focus))
        .unwrap_or(0);
    let visible_rows = usize::from(layout[1].height.saturating_sub(2));
    let scroll = focused_row.saturating_sub(visible_rows / 2);
    let text = Text::from(
        lines
            .into_iter()
            .map(|line| {
                let focused = line.focus == Some(view_data.focus);
                let mark = if focused { FOCUS_MARK } else { " " };
                Line::from(vec![Span::styled(
                    format!("{mark} {}", line.text),
                    line_style(line.kind, focused),
                )])
            })
            .collect::<Vec<Line<'_>>>(),
    );
    let body = Paragraph::new(text)
        .scroll((u16::try_from(scroll).unwrap_or(u16::MAX), 0))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(body, layout[1]);

    let status = Paragraph::new(status_text(state, view_data))
        .style(status_style(state))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status, layout[2]);
}

#[cfg(test)]
mod tests {
    use super::{
        Focus, InternalEvent, SheetRuntime, ViewData, focus_targets, handle_key_event,
        process_internal_events, render_sheet_text, status_text,
    };
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use orcamento_app::{
        Base64Codec, ClientField, DocumentVariant, ItemField, LoadingFlag, Notice, Notifier,
        Quote, SheetState, Workflow, WorkflowOutcome,
    };
    use orcamento_testkit::{
        RecordingShare, SAMPLE_PDF, StubDocumentService, TempDocumentStore, single_item_quote,
    };
    use std::sync::mpsc::{self, Receiver, Sender};

    struct TestRuntime {
        service: StubDocumentService,
        store: TempDocumentStore,
        share: RecordingShare,
        codec: Base64Codec,
    }

    impl TestRuntime {
        fn new() -> Self {
            Self {
                service: StubDocumentService::returning(SAMPLE_PDF),
                store: TempDocumentStore::new().expect("temp store"),
                share: RecordingShare::default(),
                codec: Base64Codec::standard(),
            }
        }
    }

    impl SheetRuntime for TestRuntime {
        fn run_generation(
            &mut self,
            quote: &Quote,
            variant: Option<DocumentVariant>,
            loading: &LoadingFlag,
            notifier: &dyn Notifier,
        ) -> WorkflowOutcome {
            Workflow::new(
                &self.service,
                &self.store,
                &self.share,
                notifier,
                &self.codec,
            )
            .run(quote, variant, loading)
        }
    }

    struct Harness {
        state: SheetState,
        quote: Quote,
        runtime: TestRuntime,
        view_data: ViewData,
        tx: Sender<InternalEvent>,
        rx: Receiver<InternalEvent>,
    }

    impl Harness {
        fn new(quote: Quote) -> Self {
            let (tx, rx) = mpsc::channel();
            Self {
                state: SheetState::default(),
                quote,
                runtime: TestRuntime::new(),
                view_data: ViewData::default(),
                tx,
                rx,
            }
        }

        fn press(&mut self, code: KeyCode) -> bool {
            self.press_with(code, KeyModifiers::NONE)
        }

        fn press_with(&mut self, code: KeyCode, modifiers: KeyModifiers) -> bool {
            let quit = handle_key_event(
                &mut self.state,
                &mut self.quote,
                &mut self.runtime,
                &mut self.view_data,
                &self.tx,
                KeyEvent::new(code, modifiers),
            );
            process_internal_events(&mut self.state, &mut self.view_data, &self.tx, &self.rx);
            quit
        }

        fn type_text(&mut self, text: &str) {
            for ch in text.chars() {
                self.press(KeyCode::Char(ch));
            }
        }

        fn focus_on(&mut self, target: Focus) {
            for _ in 0..64 {
                if self.view_data.focus == target {
                    return;
                }
                self.press(KeyCode::Tab);
            }
            panic!("focus {target:?} not reachable");
        }
    }

    #[test]
    fn tab_walks_client_fields_then_categories() {
        let mut harness = Harness::new(single_item_quote("", 0.0, 0.0));
        assert_eq!(harness.view_data.focus, Focus::ClientHeader);

        harness.press(KeyCode::Tab);
        assert_eq!(harness.view_data.focus, Focus::Client(ClientField::Name));

        for _ in 0..3 {
            harness.press(KeyCode::Tab);
        }
        assert_eq!(harness.view_data.focus, Focus::Category(0));

        harness.press(KeyCode::BackTab);
        assert_eq!(harness.view_data.focus, Focus::Client(ClientField::Address));
    }

    #[test]
    fn focus_stays_within_bounds() {
        let mut harness = Harness::new(single_item_quote("", 0.0, 0.0));
        harness.press(KeyCode::Up);
        assert_eq!(harness.view_data.focus, Focus::ClientHeader);

        for _ in 0..20 {
            harness.press(KeyCode::Down);
        }
        assert_eq!(harness.view_data.focus, Focus::Generate);
    }

    #[test]
    fn typing_name_applies_title_case() {
        let mut harness = Harness::new(single_item_quote("", 0.0, 0.0));
        harness.focus_on(Focus::Client(ClientField::Name));
        harness.type_text("maria silva");
        assert_eq!(harness.quote.client.name, "Maria Silva");

        harness.press(KeyCode::Backspace);
        assert_eq!(harness.quote.client.name, "Maria Silv");
    }

    #[test]
    fn typing_phone_formats_and_backspace_drops_a_digit() {
        let mut harness = Harness::new(single_item_quote("", 0.0, 0.0));
        harness.focus_on(Focus::Client(ClientField::Phone));
        harness.type_text("11987654321");
        assert_eq!(harness.quote.client.phone, "(11) 98765-4321");

        harness.press(KeyCode::Backspace);
        assert_eq!(harness.quote.client.phone, "(11) 9876-5432");

        let mut harness = Harness::new(single_item_quote("", 0.0, 0.0));
        harness.focus_on(Focus::Client(ClientField::Phone));
        harness.type_text("119876");
        assert_eq!(harness.quote.client.phone, "(11) 9876-");
        harness.press(KeyCode::Backspace);
        assert_eq!(harness.quote.client.phone, "11987");
    }

    #[test]
    fn collapsing_client_panel_hides_its_fields() {
        let mut harness = Harness::new(single_item_quote("", 0.0, 0.0));
        harness.press(KeyCode::Enter);
        assert!(!harness.state.client_panel_open);

        let targets = focus_targets(&harness.state, &harness.quote);
        assert!(!targets.contains(&Focus::Client(ClientField::Name)));
        harness.press(KeyCode::Tab);
        assert_eq!(harness.view_data.focus, Focus::Category(0));
    }

    #[test]
    fn enter_on_category_expands_its_items() {
        let mut harness = Harness::new(single_item_quote("", 0.0, 0.0));
        harness.focus_on(Focus::Category(0));
        harness.press(KeyCode::Enter);
        assert!(harness.state.is_expanded("Alvenaria"));

        harness.press(KeyCode::Tab);
        assert_eq!(
            harness.view_data.focus,
            Focus::Item {
                category: 0,
                item: 0,
                field: ItemField::Value
            }
        );
    }

    #[test]
    fn typing_item_fields_updates_totals() {
        let mut harness = Harness::new(single_item_quote("", 0.0, 0.0));
        harness.focus_on(Focus::Category(0));
        harness.press(KeyCode::Enter);
        harness.press(KeyCode::Tab);
        harness.type_text("12.5");
        harness.press(KeyCode::Tab);
        harness.type_text("4");

        assert_eq!(harness.quote.categories[0].items[0].value, 12.5);
        assert_eq!(harness.quote.total(), 50.0);
        let text = render_sheet_text(&harness.state, &harness.quote, &harness.view_data);
        assert!(text.contains("TOTAL GERAL: R$ 50,00"), "{text}");
        assert!(text.contains("Subtotal: R$ 50,00"), "{text}");
    }

    #[test]
    fn garbage_in_item_field_counts_as_zero() {
        let mut harness = Harness::new(single_item_quote("", 10.0, 2.0));
        harness.focus_on(Focus::Category(0));
        harness.press(KeyCode::Enter);
        harness.press(KeyCode::Tab);
        for _ in 0..2 {
            harness.press(KeyCode::Backspace);
        }
        harness.type_text("x");
        assert_eq!(harness.quote.categories[0].items[0].value, 0.0);
        assert_eq!(harness.quote.total(), 0.0);
    }

    #[test]
    fn variants_toggle_from_the_sheet() {
        let mut harness = Harness::new(single_item_quote("", 0.0, 0.0));
        harness.focus_on(Focus::Variant(DocumentVariant::Construtor));
        harness.press(KeyCode::Char(' '));
        assert_eq!(harness.state.variant, Some(DocumentVariant::Construtor));
        let text = render_sheet_text(&harness.state, &harness.quote, &harness.view_data);
        assert!(text.contains("[x] Construtor"), "{text}");
        assert!(text.contains("[ ] Cliente"), "{text}");

        harness.press(KeyCode::Enter);
        assert_eq!(harness.state.variant, None);
    }

    #[test]
    fn generate_without_variant_shows_notice() {
        let mut harness = Harness::new(single_item_quote("Maria", 100.0, 2.0));
        harness.press_with(KeyCode::Char('g'), KeyModifiers::CONTROL);

        assert_eq!(harness.state.status, Some(Notice::missing_variant()));
        assert!(harness.runtime.service.requests().is_empty());
        assert!(!harness.view_data.generation_pending);
    }

    #[test]
    fn generate_button_saves_document_and_reports_success() {
        let mut harness = Harness::new(single_item_quote("Maria", 100.0, 2.0));
        harness.focus_on(Focus::Variant(DocumentVariant::Cliente));
        harness.press(KeyCode::Enter);
        harness.focus_on(Focus::Generate);
        harness.press(KeyCode::Enter);

        assert_eq!(harness.state.status, Some(Notice::generated()));
        assert_eq!(harness.runtime.service.requests().len(), 1);
        assert_eq!(
            harness.view_data.last_document,
            Some(
                harness
                    .runtime
                    .store
                    .path()
                    .join("Maria_Orcamento_Cliente.pdf")
            )
        );
        assert!(!harness.state.is_generating());
        assert!(!harness.view_data.generation_pending);
    }

    #[test]
    fn generate_is_ignored_while_a_run_is_in_flight() {
        let mut harness = Harness::new(single_item_quote("Maria", 100.0, 2.0));
        harness.state.variant = Some(DocumentVariant::Cliente);
        let flag = harness.state.generating.clone();
        let _guard = flag.begin();

        harness.press_with(KeyCode::Char('g'), KeyModifiers::CONTROL);
        assert!(harness.runtime.service.requests().is_empty());

        let text = render_sheet_text(&harness.state, &harness.quote, &harness.view_data);
        assert!(text.contains("[ Gerando... ]"), "{text}");
        assert_eq!(
            status_text(&harness.state, &harness.view_data),
            "gerando PDF..."
        );
    }

    #[test]
    fn stale_status_clear_is_ignored() {
        let mut harness = Harness::new(single_item_quote("Maria", 100.0, 2.0));
        harness.press_with(KeyCode::Char('g'), KeyModifiers::CONTROL);
        let token = harness.view_data.status_token;

        harness
            .tx
            .send(InternalEvent::ClearStatus { token: token - 1 })
            .expect("send");
        process_internal_events(
            &mut harness.state,
            &mut harness.view_data,
            &harness.tx,
            &harness.rx,
        );
        assert!(harness.state.status.is_some());

        harness
            .tx
            .send(InternalEvent::ClearStatus { token })
            .expect("send");
        process_internal_events(
            &mut harness.state,
            &mut harness.view_data,
            &harness.tx,
            &harness.rx,
        );
        assert_eq!(harness.state.status, None);
    }

    #[test]
    fn placeholders_show_for_empty_client_fields() {
        let harness = Harness::new(single_item_quote("", 0.0, 0.0));
        let text = render_sheet_text(&harness.state, &harness.quote, &harness.view_data);
        assert!(text.starts_with("› ▾ DADOS DO CLIENTE"), "{text}");
        assert!(text.contains("Telefone: (00) 00000-0000"), "{text}");
        assert!(text.contains("▸ Alvenaria  R$ 0,00"), "{text}");
        assert!(text.contains("[ Gerar PDF ]"), "{text}");
    }

    #[test]
    fn ctrl_q_quits() {
        let mut harness = Harness::new(single_item_quote("", 0.0, 0.0));
        assert!(!harness.press(KeyCode::Char('q')));
        assert!(harness.press_with(KeyCode::Char('q'), KeyModifiers::CONTROL));
    }
}
