//! Application state management for placedash.
//!
//! This module contains the core `App` struct that owns the data service, the
//! current route and the load state of the list and detail views. Fetches run
//! in spawned tasks and report back through an MPSC channel.

use std::sync::Arc;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use placedash_core::api::ApiError;
use placedash_core::filter::{clamp_page, filter_records, paginate, total_pages, Page};
use placedash_core::{
    ApiClient, CacheEntry, Config, DataService, Record, ResourceKind, Route, TtlCache, ViewState,
};

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the background fetch channel.
const CHANNEL_BUFFER_SIZE: usize = 32;

/// Maximum length for the search input.
const MAX_SEARCH_LENGTH: usize = 100;

/// Maximum digits for the user id input.
const MAX_USER_ID_LENGTH: usize = 10;

// ============================================================================
// UI State Types
// ============================================================================

/// One of the three visible states of a view.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadState<T> {
    Loading,
    Failed(String),
    Ready(T),
}

impl<T> LoadState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }
}

/// Which view fills the main area
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    List,
    /// Raw route input, resolved in the background.
    Detail { segment: String, id: String },
}

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    EditingSearch,
    EditingUserId,
    ShowingHelp,
    ConfirmingQuit,
    Quitting,
}

// ============================================================================
// Background Task Results
// ============================================================================

/// Results sent back from fetch tasks, tagged with the navigation generation
/// they were started for.
#[derive(Debug)]
enum FetchResult {
    Collection {
        generation: u64,
        kind: ResourceKind,
        result: Result<Arc<Vec<Record>>, ApiError>,
    },
    Detail {
        generation: u64,
        result: Result<Record, ApiError>,
    },
}

impl FetchResult {
    fn generation(&self) -> u64 {
        match self {
            FetchResult::Collection { generation, .. } | FetchResult::Detail { generation, .. } => {
                *generation
            }
        }
    }
}

/// API client plus a fresh cache for the configured base URL and token
pub fn build_service(config: &Config) -> Result<DataService> {
    let mut api = ApiClient::new(config.base_url())?;
    if let Some(ref token) = config.api_token {
        api.set_token(token.clone());
    }
    debug!(base_url = api.base_url(), "API client configured");

    Ok(DataService::new(Arc::new(api), TtlCache::<CacheEntry>::new()))
}

// ============================================================================
// Main Application Struct
// ============================================================================

/// Main application state container
pub struct App {
    // Core services
    pub config: Config,
    pub service: DataService,

    // UI State
    pub state: AppState,
    pub current_tab: ResourceKind,
    pub view: View,
    pub view_state: ViewState,
    /// Row selected within the visible page
    pub selection: usize,

    // Loaded data
    pub list: LoadState<Arc<Vec<Record>>>,
    /// Kind the `list` data belongs to
    list_kind: Option<ResourceKind>,
    pub detail: LoadState<Record>,

    // Status message
    pub status_message: Option<String>,

    // Background task channel
    fetch_rx: mpsc::Receiver<FetchResult>,
    fetch_tx: mpsc::Sender<FetchResult>,

    /// Bumped on every navigation; results from older generations are dropped.
    generation: u64,
}

impl App {
    /// Create a new application instance talking to the configured API
    pub fn new(config: Config) -> Result<Self> {
        let service = build_service(&config)?;
        Ok(Self::with_service(config, service))
    }

    /// Create an application around an existing data service
    pub fn with_service(config: Config, service: DataService) -> Self {
        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);

        Self {
            config,
            service,

            state: AppState::Normal,
            current_tab: ResourceKind::Users,
            view: View::List,
            view_state: ViewState::default(),
            selection: 0,

            list: LoadState::Loading,
            list_kind: None,
            detail: LoadState::Loading,

            status_message: None,

            fetch_rx: rx,
            fetch_tx: tx,

            generation: 0,
        }
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// The location currently shown, in query-string form
    pub fn current_route(&self) -> Route {
        match &self.view {
            View::List => Route::List {
                kind: self.current_tab,
                view: self.view_state.clone(),
            },
            View::Detail { segment, id } => Route::Detail {
                segment: segment.clone(),
                id: id.clone(),
            },
        }
    }

    /// Show `route`, starting whatever fetch it needs
    pub fn navigate(&mut self, route: Route) {
        info!(location = %route.to_location(), "Navigating");
        match route {
            Route::List { kind, view } => {
                // Shown data is only reused while the cache still holds it
                let reload = self.list_kind != Some(kind)
                    || !matches!(self.list, LoadState::Ready(_))
                    || self.service.collection_age(kind).is_none();
                self.current_tab = kind;
                self.view_state = view;
                self.view = View::List;
                self.selection = 0;
                if reload {
                    self.load_list();
                } else {
                    self.generation += 1;
                    self.correct_page();
                }
            }
            Route::Detail { segment, id } => {
                if let Some(kind) = ResourceKind::from_segment(&segment) {
                    self.current_tab = kind;
                }
                self.view = View::Detail { segment, id };
                self.load_detail();
            }
        }
    }

    /// Switch to another tab's list with fresh filters
    pub fn select_tab(&mut self, kind: ResourceKind) {
        if kind == self.current_tab && self.view == View::List {
            return;
        }
        self.navigate(Route::List {
            kind,
            view: ViewState::default(),
        });
    }

    /// Open the detail view for the selected row
    pub fn open_selected(&mut self) {
        let filtered = self.filtered();
        let page = paginate(&filtered, self.view_state.page);
        let id = page.items.get(self.selection).map(|r| r.id());
        if let Some(id) = id {
            self.navigate(Route::Detail {
                segment: self.current_tab.segment().to_string(),
                id: id.to_string(),
            });
        }
    }

    /// Return from the detail view, keeping the list filters
    pub fn back_to_list(&mut self) {
        if self.view == View::List {
            return;
        }
        let selection = self.selection;
        self.navigate(Route::List {
            kind: self.current_tab,
            view: self.view_state.clone(),
        });
        self.selection = selection;
        self.clamp_selection();
    }

    // =========================================================================
    // Filters and Paging
    // =========================================================================

    /// Records of the loaded list passing the current filters
    pub fn filtered(&self) -> Vec<&Record> {
        match &self.list {
            LoadState::Ready(records) => filter_records(records, &self.view_state.filters),
            _ => Vec::new(),
        }
    }

    /// The visible page of `filtered`
    pub fn visible_page<'a>(&self, filtered: &'a [&'a Record]) -> Page<'a, &'a Record> {
        paginate(filtered, self.view_state.page)
    }

    pub fn filtered_count(&self) -> usize {
        self.filtered().len()
    }

    pub fn total_pages(&self) -> usize {
        total_pages(self.filtered_count())
    }

    /// Replace an out-of-range requested page with the nearest valid one
    fn correct_page(&mut self) {
        if !matches!(self.list, LoadState::Ready(_)) {
            return;
        }
        let total = self.total_pages();
        let effective = clamp_page(self.view_state.page, total);
        if self.view_state.correct_page(effective, total) {
            debug!(page = effective, "Corrected out-of-range page");
        }
        self.clamp_selection();
    }

    fn clamp_selection(&mut self) {
        let filtered = self.filtered();
        let visible = self.visible_page(&filtered).items.len();
        self.selection = self.selection.min(visible.saturating_sub(1));
    }

    fn after_filter_change(&mut self) {
        self.selection = 0;
        self.correct_page();
    }

    pub fn push_search_char(&mut self, c: char) {
        if self.view_state.filters.search.chars().count() >= MAX_SEARCH_LENGTH {
            return;
        }
        let mut search = self.view_state.filters.search.clone();
        search.push(c);
        self.view_state.set_search(search);
        self.after_filter_change();
    }

    pub fn pop_search_char(&mut self) {
        let mut search = self.view_state.filters.search.clone();
        if search.pop().is_some() {
            self.view_state.set_search(search);
            self.after_filter_change();
        }
    }

    /// The user id filter only takes digits
    pub fn push_user_id_char(&mut self, c: char) {
        if !c.is_ascii_digit() || self.view_state.filters.user_id.len() >= MAX_USER_ID_LENGTH {
            return;
        }
        let mut user_id = self.view_state.filters.user_id.clone();
        user_id.push(c);
        self.view_state.set_user_id(user_id);
        self.after_filter_change();
    }

    pub fn pop_user_id_char(&mut self) {
        let mut user_id = self.view_state.filters.user_id.clone();
        if user_id.pop().is_some() {
            self.view_state.set_user_id(user_id);
            self.after_filter_change();
        }
    }

    pub fn clear_search(&mut self) {
        self.view_state.set_search(String::new());
        self.after_filter_change();
    }

    pub fn clear_user_id(&mut self) {
        self.view_state.set_user_id(String::new());
        self.after_filter_change();
    }

    pub fn reset_filters(&mut self) {
        self.view_state.reset_filters();
        self.after_filter_change();
    }

    pub fn next_page(&mut self) {
        let total = self.total_pages();
        if self.view_state.page < total {
            self.view_state.set_page(self.view_state.page + 1);
            self.selection = 0;
        }
    }

    pub fn prev_page(&mut self) {
        if self.view_state.page > 1 {
            self.view_state.set_page(self.view_state.page - 1);
            self.selection = 0;
        }
    }

    pub fn select_next(&mut self) {
        let filtered = self.filtered();
        let visible = self.visible_page(&filtered).items.len();
        if self.selection + 1 < visible {
            self.selection += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selection = self.selection.saturating_sub(1);
    }

    // =========================================================================
    // Background Data Fetching
    // =========================================================================

    /// Helper to send fetch results, logging any channel errors
    async fn send_result(tx: &mpsc::Sender<FetchResult>, result: FetchResult) {
        if let Err(e) = tx.send(result).await {
            error!(error = %e, "Failed to send fetch result - channel closed");
        }
    }

    /// Start loading the current tab's collection
    fn load_list(&mut self) {
        self.generation += 1;
        let generation = self.generation;
        let kind = self.current_tab;
        self.list = LoadState::Loading;
        self.list_kind = Some(kind);

        let service = self.service.clone();
        let tx = self.fetch_tx.clone();
        tokio::spawn(async move {
            let result = service.collection(kind).await;
            Self::send_result(&tx, FetchResult::Collection { generation, kind, result }).await;
        });
    }

    /// Start resolving the record named by the current detail route
    fn load_detail(&mut self) {
        let View::Detail { segment, id } = &self.view else {
            return;
        };
        self.generation += 1;
        let generation = self.generation;
        let segment = segment.clone();
        let id = id.clone();
        self.detail = LoadState::Loading;

        let service = self.service.clone();
        let tx = self.fetch_tx.clone();
        tokio::spawn(async move {
            let result = service.resolve(&segment, &id).await;
            Self::send_result(&tx, FetchResult::Detail { generation, result }).await;
        });
    }

    /// Drop all cached data and fetch the current view again
    pub fn refresh(&mut self) {
        info!("Clearing cache and reloading");
        self.service.clear_cache();
        match self.view {
            View::List => self.load_list(),
            View::Detail { .. } => {
                // The list behind the detail view is stale too
                self.list = LoadState::Loading;
                self.list_kind = None;
                self.load_detail();
            }
        }
        self.status_message = Some("Refreshing data...".to_string());
    }

    /// Apply any results that have arrived without blocking
    pub fn check_background_tasks(&mut self) {
        while let Ok(result) = self.fetch_rx.try_recv() {
            self.apply_result(result);
        }
    }

    fn apply_result(&mut self, result: FetchResult) {
        if result.generation() != self.generation {
            debug!(
                generation = result.generation(),
                current = self.generation,
                "Discarding result from superseded navigation"
            );
            return;
        }

        match result {
            FetchResult::Collection { kind, result, .. } => {
                if self.list_kind != Some(kind) {
                    warn!(%kind, "Collection result for a different tab");
                    return;
                }
                match result {
                    Ok(records) => {
                        info!(%kind, count = records.len(), "Collection loaded");
                        self.list = LoadState::Ready(records);
                        self.status_message = None;
                        self.correct_page();
                    }
                    Err(e) => {
                        self.list = LoadState::Failed(e.to_string());
                        self.status_message = Some(format!("Failed to load {}", kind));
                    }
                }
            }
            FetchResult::Detail { result, .. } => match result {
                Ok(record) => {
                    self.detail = LoadState::Ready(record);
                    self.status_message = None;
                }
                Err(e) => {
                    debug!(error = %e, "Detail resolution failed");
                    self.detail = LoadState::Failed("Item not found".to_string());
                    self.status_message = None;
                }
            },
        }
    }

    /// Wait for the next fetch result and apply it
    #[cfg(test)]
    async fn next_result(&mut self) {
        if let Some(result) = self.fetch_rx.recv().await {
            self.apply_result(result);
        }
    }

    /// "Updated 2m ago" text for the status bar
    pub fn cache_age(&self) -> String {
        self.service
            .collection_age(self.current_tab)
            .unwrap_or_else(|| "never".to_string())
    }
}

// ============================================================================
// Tests
// ============================================================================
