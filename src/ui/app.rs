use std::mem;

use crossterm::event::KeyCode;
use open::that as open_link;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{info, warn};

use crate::catalog::{CatalogClient, Links};
use crate::config::Config;
use crate::models::{Book, SortMode};
use crate::search::{derive_visible_list, Phase, SearchRequest, SearchResponse, SearchState};

use super::forms::{FilterField, FilterPanel, QueryInput};
use super::helpers::{build_book_card_lines, surface_error};
use super::screens::ResultsScreen;

/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
/// Search box: one line of input plus borders.
const HEADER_HEIGHT: u16 = 3;
/// Filters panel: author, year, and sort lines plus borders.
const FILTER_PANEL_HEIGHT: u16 = 5;
/// Height allocation per result card.
const BOOK_CARD_HEIGHT: u16 = 6;
/// Rows moved by PageUp/PageDown.
const PAGE_STEP: isize = 5;

/// Which part of the screen receives typed keys.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
enum Focus {
    Query,
    Results,
    Filters,
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Central application state for the finder.
///
/// Searches run as tasks on the Tokio runtime behind `runtime`; their results
/// come back through an unbounded channel that the draw loop drains via
/// [`App::drain_responses`]. Every other transition happens synchronously on
/// the UI thread.
pub struct App {
    search: SearchState,
    input: QueryInput,
    panel: FilterPanel,
    results: ResultsScreen,
    focus: Focus,
    links: Links,
    client: CatalogClient,
    runtime: Handle,
    responses_tx: UnboundedSender<SearchResponse>,
    responses_rx: UnboundedReceiver<SearchResponse>,
    status: Option<StatusMessage>,
}

impl App {
    pub fn new(config: &Config, runtime: Handle) -> Self {
        let (responses_tx, responses_rx) = mpsc::unbounded_channel();
        Self {
            search: SearchState::with_limit(config.result_limit),
            input: QueryInput::default(),
            panel: FilterPanel::default(),
            results: ResultsScreen::default(),
            focus: Focus::Query,
            links: Links::from_config(config),
            client: CatalogClient::new(config.catalog_url.clone()),
            runtime,
            responses_tx,
            responses_rx,
            status: None,
        }
    }

    /// Current search controller state.
    pub fn search(&self) -> &SearchState {
        &self.search
    }

    /// The filtered and sorted list as it would be drawn right now.
    pub fn visible_books(&self) -> Vec<&Book> {
        derive_visible_list(self.search.books(), &self.panel.filters, self.panel.sort)
    }

    /// Fill the search box with `query` and submit it, as if typed.
    pub fn start_search(&mut self, query: &str) {
        self.input = QueryInput::with_text(query);
        if self.submit_search() {
            self.focus = Focus::Results;
        }
    }

    /// Fold every finished search into the state. Called once per tick.
    pub fn drain_responses(&mut self) {
        let mut received = false;
        while let Ok(response) = self.responses_rx.try_recv() {
            let state = mem::take(&mut self.search);
            self.search = state.resolve(response);
            received = true;
        }
        if received {
            self.clamp_selection();
        }
    }

    /// Route one key press. Returns `true` when the user asked to quit.
    pub fn handle_key(&mut self, code: KeyCode) -> bool {
        let mut exit = false;
        match self.focus {
            Focus::Query => self.handle_query_key(code),
            Focus::Results => self.handle_results_key(code, &mut exit),
            Focus::Filters => self.handle_filter_key(code),
        }
        exit
    }

    /// Ctrl+F shows or hides the filters panel from anywhere.
    pub(crate) fn handle_ctrl_f(&mut self) {
        self.toggle_filters();
    }

    fn handle_query_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => self.focus = Focus::Results,
            KeyCode::Enter => {
                if self.submit_search() {
                    self.focus = Focus::Results;
                }
            }
            KeyCode::Tab => {
                self.focus = if self.panel.open {
                    Focus::Filters
                } else {
                    Focus::Results
                };
            }
            KeyCode::Backspace => self.input.backspace(),
            KeyCode::Char(ch) => {
                self.input.push_char(ch);
            }
            other => self.navigate(other),
        }
    }

    fn handle_results_key(&mut self, code: KeyCode, exit: &mut bool) {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => *exit = true,
            KeyCode::Char('/') | KeyCode::Char('i') => self.focus = Focus::Query,
            KeyCode::Char('f') => self.toggle_filters(),
            KeyCode::Char('x') => {
                self.panel.reset();
                self.clamp_selection();
                self.set_status("Filters cleared.", StatusKind::Info);
            }
            KeyCode::Char('c') => self.open_selected_cover(),
            KeyCode::Enter => self.open_selected_details(),
            KeyCode::Left => {
                self.panel.previous_sort();
                self.clamp_selection();
            }
            KeyCode::Right => {
                self.panel.next_sort();
                self.clamp_selection();
            }
            KeyCode::Tab => {
                self.focus = if self.panel.open {
                    Focus::Filters
                } else {
                    Focus::Query
                };
            }
            other => self.navigate(other),
        }
    }

    fn handle_filter_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc | KeyCode::Enter => self.focus = Focus::Results,
            KeyCode::Tab => self.panel.next_field(),
            KeyCode::BackTab => self.panel.previous_field(),
            KeyCode::Left if self.panel.active == FilterField::Sort => {
                self.panel.previous_sort();
            }
            KeyCode::Right | KeyCode::Char(' ') if self.panel.active == FilterField::Sort => {
                self.panel.next_sort();
            }
            KeyCode::Backspace => self.panel.backspace(),
            KeyCode::Char(ch) => {
                self.panel.push_char(ch);
            }
            other => {
                self.navigate(other);
                return;
            }
        }
        self.clamp_selection();
    }

    /// Selection movement shared by every focus.
    fn navigate(&mut self, code: KeyCode) {
        let len = self.visible_books().len();
        match code {
            KeyCode::Up => self.results.move_selection(-1, len),
            KeyCode::Down => self.results.move_selection(1, len),
            KeyCode::PageUp => self.results.move_selection(-PAGE_STEP, len),
            KeyCode::PageDown => self.results.move_selection(PAGE_STEP, len),
            KeyCode::Home => self.results.select_first(),
            KeyCode::End => self.results.select_last(len),
            _ => {}
        }
    }

    /// Submit the search box. Returns whether a request went out.
    fn submit_search(&mut self) -> bool {
        let state = mem::take(&mut self.search);
        let (state, request) = state.submit_search(&self.input.text);
        self.search = state;

        match request {
            Some(request) => {
                self.results.select_first();
                self.clear_status();
                self.dispatch(request);
                true
            }
            None => false,
        }
    }

    fn dispatch(&self, request: SearchRequest) {
        let client = self.client.clone();
        let responses = self.responses_tx.clone();
        self.runtime.spawn(async move {
            let outcome = client.search(&request.query).await;
            let _ = responses.send(SearchResponse {
                seq: request.seq,
                outcome,
            });
        });
    }

    fn toggle_filters(&mut self) {
        if self.panel.toggle() {
            self.focus = Focus::Filters;
        } else if self.focus == Focus::Filters {
            self.focus = Focus::Results;
        }
    }

    fn clamp_selection(&mut self) {
        let len = self.visible_books().len();
        self.results.ensure_in_bounds(len);
    }

    fn selected_book(&self) -> Option<Book> {
        self.visible_books()
            .get(self.results.selected)
            .map(|book| (*book).clone())
    }

    fn open_selected_details(&mut self) {
        let Some(book) = self.selected_book() else {
            self.set_status("No book selected.", StatusKind::Error);
            return;
        };
        match self.links.detail_url(&book) {
            Some(url) => self.open_url(&url, &book),
            None => self.set_status("This book does not have a details link.", StatusKind::Error),
        }
    }

    fn open_selected_cover(&mut self) {
        let Some(book) = self.selected_book() else {
            self.set_status("No book selected.", StatusKind::Error);
            return;
        };
        let url = self.links.cover_url(&book);
        self.open_url(&url, &book);
    }

    fn open_url(&mut self, url: &str, book: &Book) {
        match open_link(url) {
            Ok(()) => {
                info!(%url, "opened link in browser");
                self.set_status(format!("Opened {}.", url), StatusKind::Info);
            }
            Err(err) => {
                warn!(%url, error = %err, title = %book, "failed to open link");
                self.set_status(
                    format!("Failed to open link: {}", surface_error(&err)),
                    StatusKind::Error,
                );
            }
        }
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let footer_height = FOOTER_HEIGHT.min(area.height);

        let (content_area, footer_area) = if area.height > footer_height {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(0), Constraint::Length(footer_height)])
                .split(area);
            (chunks[0], chunks[1])
        } else {
            (area, area)
        };

        let panel_height = if self.panel.open {
            FILTER_PANEL_HEIGHT
        } else {
            0
        };
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(HEADER_HEIGHT),
                Constraint::Length(panel_height),
                Constraint::Length(1),
                Constraint::Min(0),
            ])
            .split(content_area);

        self.draw_search_box(frame, chunks[0]);
        if self.panel.open {
            self.draw_filter_panel(frame, chunks[1]);
        }
        self.draw_message_line(frame, chunks[2]);
        self.draw_results(frame, chunks[3]);

        if area.height >= footer_height {
            self.draw_footer(frame, footer_area);
        }
    }

    fn draw_search_box(&self, frame: &mut Frame, area: Rect) {
        if area.height == 0 {
            return;
        }
        let mut block = Block::default().borders(Borders::ALL).title("Book Finder");
        if self.focus == Focus::Query {
            block = block.border_style(Style::default().fg(Color::Yellow));
        }
        let paragraph = Paragraph::new(self.input.build_line(self.focus == Focus::Query))
            .block(block.clone());
        frame.render_widget(paragraph, area);

        if self.focus == Focus::Query {
            let inner = block.inner(area);
            let cursor_x = (inner.x + self.input.cursor_offset()).min(inner.right());
            frame.set_cursor_position((cursor_x, inner.y));
        }
    }

    fn draw_filter_panel(&self, frame: &mut Frame, area: Rect) {
        if area.height == 0 {
            return;
        }
        let focused = self.focus == Focus::Filters;
        let mut block = Block::default().borders(Borders::ALL).title("Filters");
        if focused {
            block = block.border_style(Style::default().fg(Color::Yellow));
        }
        let lines = vec![
            self.panel.build_line(FilterField::Author, focused),
            self.panel.build_line(FilterField::Year, focused),
            self.panel.build_line(FilterField::Sort, focused),
        ];
        frame.render_widget(Paragraph::new(lines).block(block.clone()), area);

        if focused {
            if let Some(offset) = self.panel.cursor_offset() {
                let inner = block.inner(area);
                let row = match self.panel.active {
                    FilterField::Author => 0,
                    FilterField::Year => 1,
                    FilterField::Sort => 2,
                };
                let cursor_x = (inner.x + offset).min(inner.right());
                frame.set_cursor_position((cursor_x, inner.y + row));
            }
        }
    }

    /// One line between the inputs and the results: progress, the search
    /// error, or a result count.
    fn draw_message_line(&self, frame: &mut Frame, area: Rect) {
        if area.height == 0 {
            return;
        }
        let line = match self.search.phase() {
            Phase::Loading => Line::from(Span::styled(
                "Searching...",
                Style::default().fg(Color::Cyan),
            )),
            Phase::Settled => match self.search.error() {
                Some(message) => Line::from(Span::styled(
                    message.to_string(),
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                )),
                None => {
                    let visible = self.visible_books().len();
                    let total = self.search.books().len();
                    let mut spans = vec![Span::raw(format!(
                        "Showing {visible} of {total} books for \"{}\"",
                        self.search.query()
                    ))];
                    if self.panel.filters.is_active() || self.panel.sort != SortMode::None {
                        spans.push(Span::styled(
                            format!("  [{}]", self.panel.sort.label()),
                            Style::default().fg(Color::DarkGray),
                        ));
                    }
                    Line::from(spans)
                }
            },
            Phase::Idle => Line::from(""),
        };
        frame.render_widget(Paragraph::new(line), area);
    }

    fn draw_results(&self, frame: &mut Frame, area: Rect) {
        if area.height == 0 {
            return;
        }

        let visible = self.visible_books();
        if visible.is_empty() {
            let message = match self.search.phase() {
                Phase::Idle => "Type a title and press Enter to search the catalog.",
                Phase::Loading => "",
                Phase::Settled if self.search.books().is_empty() => "",
                Phase::Settled => "No books match the current filters.",
            };
            let paragraph = Paragraph::new(message)
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::NONE));
            frame.render_widget(paragraph, area);
            return;
        }

        self.render_book_cards(frame, area, &visible);
    }

    fn render_book_cards(&self, frame: &mut Frame, area: Rect, books: &[&Book]) {
        let selected = self.results.selected;
        let capacity = ((area.height / BOOK_CARD_HEIGHT) as usize).max(1);
        let start = self.results.window_start(capacity, books.len());
        let end = (start + capacity).min(books.len());

        let constraints: Vec<Constraint> = (start..end)
            .map(|_| Constraint::Length(BOOK_CARD_HEIGHT))
            .collect();
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(area);

        for (chunk, book_index) in rows.iter().zip(start..end) {
            if chunk.height == 0 {
                continue;
            }
            let is_selected = book_index == selected;
            let mut block = Block::default()
                .borders(Borders::ALL)
                .title(format!("{}/{}", book_index + 1, books.len()));
            if is_selected && self.focus != Focus::Query {
                block = block.style(Style::default().fg(Color::Yellow));
            }
            let lines = build_book_card_lines(books[book_index], &self.links, is_selected);
            let card = Paragraph::new(lines)
                .block(block)
                .wrap(Wrap { trim: true });
            frame.render_widget(card, *chunk);
        }
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from("")
        };

        let instructions = self.footer_instructions();

        let paragraph = Paragraph::new(vec![status_line, instructions]).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        let filters_label = if self.panel.open {
            " Close Filters   "
        } else {
            " Filters   "
        };
        match self.focus {
            Focus::Query => Line::from(vec![
                Span::styled("[Enter]", key_style),
                Span::raw(" Search   "),
                Span::styled("[↑↓]", key_style),
                Span::raw(" Select   "),
                Span::styled("[Tab]", key_style),
                Span::raw(" Next   "),
                Span::styled("[Ctrl+F]", key_style),
                Span::raw(filters_label),
                Span::styled("[Esc]", key_style),
                Span::raw(" Results   "),
                Span::styled("[Ctrl+C]", key_style),
                Span::raw(" Quit"),
            ]),
            Focus::Filters => Line::from(vec![
                Span::styled("[Tab]", key_style),
                Span::raw(" Next Field   "),
                Span::styled("[←→]", key_style),
                Span::raw(" Sort   "),
                Span::styled("[↑↓]", key_style),
                Span::raw(" Select   "),
                Span::styled("[Ctrl+F]", key_style),
                Span::raw(filters_label),
                Span::styled("[Esc]", key_style),
                Span::raw(" Results"),
            ]),
            Focus::Results => Line::from(vec![
                Span::styled("[↑↓]", key_style),
                Span::raw(" Select   "),
                Span::styled("[Enter]", key_style),
                Span::raw(" View Details   "),
                Span::styled("[c]", key_style),
                Span::raw(" Cover   "),
                Span::styled("[/]", key_style),
                Span::raw(" Search   "),
                Span::styled("[f]", key_style),
                Span::raw(filters_label),
                Span::styled("[←→]", key_style),
                Span::raw(" Sort   "),
                Span::styled("[x]", key_style),
                Span::raw(" Clear Filters   "),
                Span::styled("[q]", key_style),
                Span::raw(" Quit"),
            ]),
        }
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }
}
