use std::time::{Duration, Instant};

use ratatui::layout::Rect;
use ratatui::widgets::TableState;
use tokio::sync::mpsc::UnboundedSender;

use crate::config::Config;
use crate::filter::RowFilter;
use crate::pagination::Pagination;
use crate::theme::ColorScheme;
use crate::types::{AppEvent, PageRequest, Pokemon, TypeOption};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Search,
    Types,
}

const FPS_CHOICES: [u32; 3] = [15, 30, 60];
const SPINNER: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

pub struct App {
    quit: bool,

    // Current page as delivered by the fetcher
    rows: Vec<Pokemon>,
    loading: bool,
    total_items: u64,
    pagination: Pagination,
    // Request whose rows are on screen; paging falls back to it on failure
    shown: Option<PageRequest>,
    per_page_choices: Vec<u32>,
    last_error: Option<String>,
    fetch_tx: Option<UnboundedSender<PageRequest>>,

    // Client-side filtering
    filter: RowFilter,
    type_options: Vec<TypeOption>,
    types_error: Option<String>,
    type_cursor: usize,
    input_mode: InputMode,

    // Table cursor (index into visible rows) and the detail overlay
    cursor: usize,
    selected: Option<Pokemon>,
    table_state: TableState,
    table_area: Rect,

    fps: u32,
    spinner_idx: usize,
    colors: ColorScheme,

    toast_message: Option<(String, Instant, bool)>, // (message, shown at, is_error)
}

impl App {
    pub fn new(cfg: &Config, fetch_tx: Option<UnboundedSender<PageRequest>>) -> Self {
        Self {
            quit: false,
            rows: Vec::new(),
            loading: false,
            total_items: 0,
            pagination: Pagination::new(cfg.start_page, cfg.per_page),
            shown: None,
            per_page_choices: cfg.per_page_choices.clone(),
            last_error: None,
            fetch_tx,
            filter: RowFilter::new(&cfg.default_search, cfg.default_types.iter().cloned()),
            type_options: Vec::new(),
            types_error: None,
            type_cursor: 0,
            input_mode: InputMode::Normal,
            cursor: 0,
            selected: None,
            table_state: TableState::default(),
            table_area: Rect::default(),
            fps: cfg.render_fps,
            spinner_idx: 0,
            colors: cfg.theme.colors(),
            toast_message: None,
        }
    }

    // ----- getters -----
    pub fn quit_flag(&self) -> bool { self.quit }
    pub fn fps(&self) -> u32 { self.fps }
    pub fn theme(&self) -> &ColorScheme { &self.colors }
    pub fn loading(&self) -> bool { self.loading }
    pub fn total_items(&self) -> u64 { self.total_items }
    pub fn pagination(&self) -> Pagination { self.pagination }
    pub fn rows(&self) -> &[Pokemon] { &self.rows }
    pub fn filter(&self) -> &RowFilter { &self.filter }
    pub fn search_text(&self) -> &str { self.filter.text() }
    pub fn type_options(&self) -> &[TypeOption] { &self.type_options }
    pub fn types_error(&self) -> Option<&str> { self.types_error.as_deref() }
    pub fn type_cursor(&self) -> usize { self.type_cursor }
    pub fn input_mode(&self) -> InputMode { self.input_mode }
    pub fn cursor(&self) -> usize { self.cursor }
    pub fn selected(&self) -> Option<&Pokemon> { self.selected.as_ref() }
    pub fn last_error(&self) -> Option<&str> { self.last_error.as_deref() }

    /// Current page rows that pass the search text and type filter.
    pub fn visible_rows(&self) -> Vec<&Pokemon> {
        self.filter.apply(&self.rows)
    }

    pub fn current_row(&self) -> Option<&Pokemon> {
        self.visible_rows().get(self.cursor).copied()
    }

    pub fn total_pages(&self) -> u32 {
        self.pagination.total_pages(self.total_items)
    }

    // ----- fetching -----

    /// Ask the fetcher for the current page. Replies for any other page are dropped.
    pub fn request_page(&mut self) {
        let request = self.pagination.request();
        self.loading = true;
        self.last_error = None;
        match &self.fetch_tx {
            Some(tx) => {
                if tx.send(request).is_err() {
                    self.loading = false;
                    self.last_error = Some("fetcher is not running".into());
                    log::error!("[app] page request dropped, fetcher channel closed");
                } else {
                    log::debug!("[app] requested page {} ({} per page)", request.page, request.per_page);
                }
            }
            None => log::debug!("[app] no fetcher attached, request {request:?} ignored"),
        }
    }

    pub fn reload(&mut self) {
        self.request_page();
    }

    pub fn on_event(&mut self, ev: AppEvent) {
        match ev {
            AppEvent::Quit => self.quit = true,
            AppEvent::PageLoaded { request, total, rows } => {
                if request != self.pagination.request() {
                    log::debug!("[app] dropping stale page {request:?}");
                    return;
                }
                self.total_items = total;
                // Start page past the end: jump to the last page and fetch again
                if rows.is_empty() && total > 0 && self.pagination.set_page(request.page, total) {
                    log::info!("[app] page {} out of range, moving to {}", request.page, self.pagination.page());
                    self.request_page();
                    return;
                }
                self.rows = rows;
                self.shown = Some(request);
                self.loading = false;
                self.last_error = None;
                self.cursor = 0;
                self.table_state = TableState::default();
            }
            AppEvent::PageFailed { request, error } => {
                if request != self.pagination.request() {
                    return;
                }
                self.loading = false;
                if let Some(shown) = self.shown {
                    self.pagination = Pagination::new(shown.page, shown.per_page);
                }
                self.show_error_toast(format!("Failed to load page {}", request.page));
                self.last_error = Some(error);
            }
            AppEvent::TypesLoaded(options) => {
                self.type_options = options;
                self.types_error = None;
                self.clamp_type_cursor();
            }
            AppEvent::TypesFailed(error) => {
                self.show_error_toast("Failed to load types".to_string());
                self.types_error = Some(error);
            }
        }
    }

    // ----- paging -----
    pub fn next_page(&mut self) {
        if self.pagination.next(self.total_items) {
            self.request_page();
        }
    }

    pub fn prev_page(&mut self) {
        if self.pagination.prev() {
            self.request_page();
        }
    }

    pub fn first_page(&mut self) {
        if self.pagination.first() {
            self.request_page();
        }
    }

    pub fn last_page(&mut self) {
        if self.pagination.last(self.total_items) {
            self.request_page();
        }
    }

    /// Advance to the next rows-per-page choice and restart from page 1.
    pub fn cycle_per_page(&mut self) {
        if self.per_page_choices.is_empty() {
            return;
        }
        let idx = self
            .per_page_choices
            .iter()
            .position(|&v| v == self.pagination.per_page())
            .map(|i| (i + 1) % self.per_page_choices.len())
            .unwrap_or(0);
        self.pagination.set_per_page(self.per_page_choices[idx]);
        self.show_toast(format!("{} rows per page", self.pagination.per_page()));
        self.request_page();
    }

    // ----- table navigation -----
    pub fn up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn down(&mut self) {
        let len = self.visible_rows().len();
        if self.cursor + 1 < len {
            self.cursor += 1;
        }
    }

    pub fn home(&mut self) {
        self.cursor = 0;
    }

    pub fn end(&mut self) {
        self.cursor = self.visible_rows().len().saturating_sub(1);
    }

    /// Move the cursor to visible row `idx`. Returns false if there is no such row.
    pub fn select_row(&mut self, idx: usize) -> bool {
        if idx < self.visible_rows().len() {
            self.cursor = idx;
            true
        } else {
            false
        }
    }

    fn clamp_cursor(&mut self) {
        let len = self.visible_rows().len();
        if self.cursor >= len {
            self.cursor = len.saturating_sub(1);
        }
    }

    // ----- detail overlay -----
    pub fn open_selected(&mut self) {
        if let Some(row) = self.current_row().cloned() {
            log::debug!("[app] details for #{} {}", row.id, row.name);
            self.selected = Some(row);
        }
    }

    pub fn close_details(&mut self) {
        self.selected = None;
    }

    // ----- search -----
    pub fn start_search(&mut self) {
        self.input_mode = InputMode::Search;
    }

    pub fn search_add_char(&mut self, c: char) {
        self.filter.push_char(c);
        self.clamp_cursor();
    }

    pub fn search_backspace(&mut self) {
        self.filter.pop_char();
        self.clamp_cursor();
    }

    /// Leave search input, keeping the text.
    pub fn finish_search(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    pub fn clear_search(&mut self) {
        self.filter.clear_text();
        self.input_mode = InputMode::Normal;
        self.clamp_cursor();
    }

    // ----- type picker -----
    pub fn open_type_picker(&mut self) {
        self.input_mode = InputMode::Types;
        self.clamp_type_cursor();
    }

    pub fn close_type_picker(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    pub fn type_picker_up(&mut self) {
        self.type_cursor = self.type_cursor.saturating_sub(1);
    }

    pub fn type_picker_down(&mut self) {
        if self.type_cursor + 1 < self.type_options.len() {
            self.type_cursor += 1;
        }
    }

    pub fn toggle_type_at_cursor(&mut self) {
        let Some(value) = self.type_options.get(self.type_cursor).map(|o| o.value.clone()) else {
            return;
        };
        self.filter.toggle_type(&value);
        self.clamp_cursor();
    }

    pub fn clear_types(&mut self) {
        self.filter.clear_types();
        self.clamp_cursor();
    }

    fn clamp_type_cursor(&mut self) {
        if self.type_cursor >= self.type_options.len() {
            self.type_cursor = self.type_options.len().saturating_sub(1);
        }
    }

    // ----- mouse mapping -----

    /// Called by the UI after the table is drawn.
    pub fn set_table_area(&mut self, area: Rect) {
        self.table_area = area;
    }

    pub fn table_state_mut(&mut self) -> &mut TableState {
        &mut self.table_state
    }

    /// Visible row index under terminal cell (`col`, `row`), if any.
    /// The table has a top border and a header line above the first row.
    pub fn row_at(&self, col: u16, row: u16) -> Option<usize> {
        let a = self.table_area;
        let first_row_y = a.y + 2;
        let bottom = a.y + a.height.saturating_sub(1);
        if col <= a.x || col >= a.x + a.width.saturating_sub(1) || row < first_row_y || row >= bottom {
            return None;
        }
        let idx = self.table_state.offset() + (row - first_row_y) as usize;
        (idx < self.visible_rows().len()).then_some(idx)
    }

    /// Left click: closes the detail overlay, or opens the row under the pointer.
    pub fn click(&mut self, col: u16, row: u16) {
        if self.selected.is_some() {
            self.close_details();
            return;
        }
        if self.input_mode == InputMode::Types {
            return;
        }
        if let Some(idx) = self.row_at(col, row) {
            self.select_row(idx);
            self.open_selected();
        }
    }

    /// Mouse wheel. Ignored while the detail overlay is open.
    pub fn scroll(&mut self, down: bool) {
        if self.selected.is_some() {
            return;
        }
        match (self.input_mode, down) {
            (InputMode::Types, true) => self.type_picker_down(),
            (InputMode::Types, false) => self.type_picker_up(),
            (_, true) => self.down(),
            (_, false) => self.up(),
        }
    }

    // ----- toasts / knobs -----

    /// Show a toast notification for 2 seconds
    pub fn show_toast(&mut self, msg: String) {
        self.toast_message = Some((msg, Instant::now(), false));
    }

    pub fn show_error_toast(&mut self, msg: String) {
        self.toast_message = Some((msg, Instant::now(), true));
    }

    /// Current toast and whether it is an error, while still visible
    pub fn toast_message(&self) -> Option<(&str, bool)> {
        const TOAST_DURATION: Duration = Duration::from_secs(2);
        self.toast_message.as_ref().and_then(|(msg, time, is_error)| {
            if time.elapsed() < TOAST_DURATION {
                Some((msg.as_str(), *is_error))
            } else {
                None
            }
        })
    }

    pub fn cycle_fps(&mut self) {
        let idx = FPS_CHOICES
            .iter()
            .position(|&v| v == self.fps)
            .map(|i| (i + 1) % FPS_CHOICES.len())
            .unwrap_or(0);
        self.fps = FPS_CHOICES[idx];
        self.show_toast(format!("FPS {}", self.fps));
    }

    pub fn tick_spinner(&mut self) {
        self.spinner_idx = (self.spinner_idx + 1) % SPINNER.len();
    }

    pub fn spinner_char(&self) -> char {
        SPINNER[self.spinner_idx]
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::types::Stat;
    use std::path::PathBuf;

    pub fn config() -> Config {
        Config {
            api_url: "http://localhost".into(),
            start_page: 1,
            per_page: 10,
            per_page_choices: vec![10, 15, 20],
            http_timeout_ms: 8000,
            http_retries: 0,
            detail_concurrency: 4,
            render_fps: 30,
            default_search: String::new(),
            default_types: vec![],
            theme: Default::default(),
            log_file: PathBuf::from("pokedex.log"),
        }
    }

    pub fn mon(id: u32, name: &str, types: &[&str]) -> Pokemon {
        Pokemon {
            id,
            name: name.into(),
            image: Some(format!("https://img/{id}.png")),
            types: types.iter().map(|t| t.to_string()).collect(),
            stats: vec![
                Stat { name: "hp".into(), base_stat: 40 + id },
                Stat { name: "speed".into(), base_stat: 50 },
            ],
        }
    }

    pub fn starters() -> Vec<Pokemon> {
        vec![
            mon(1, "bulbasaur", &["grass", "poison"]),
            mon(2, "ivysaur", &["grass", "poison"]),
            mon(3, "venusaur", &["grass", "poison"]),
            mon(4, "charmander", &["fire"]),
            mon(5, "charmeleon", &["fire"]),
            mon(6, "charizard", &["fire", "flying"]),
            mon(7, "squirtle", &["water"]),
        ]
    }

    pub fn loaded(app: &mut App, total: u64, rows: Vec<Pokemon>) {
        let request = app.pagination().request();
        app.on_event(AppEvent::PageLoaded { request, total, rows });
    }
}
