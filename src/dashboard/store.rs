//! The dashboard store: one explicit object owning everything a staff
//! member's view needs, shared with its views through an `Arc`.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::backend::{DashboardBackend, DashboardError};
use super::selection_store::SelectionStore;
use crate::applications::export::{export_csv, sanitize_filename, ExportMode, ShortlistData};
use crate::applications::filters::FilterState;
use crate::applications::models::Application;
use crate::applications::sorting::SortState;
use crate::applications::view::{shortlist_times, visible_applications};
use crate::common::config::DEFAULT_ROLL_NUMBER_PREFIX;

pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(30);
pub const DEFAULT_TOGGLE_DEBOUNCE: Duration = Duration::from_millis(500);

#[derive(Debug, Clone)]
pub struct DashboardSettings {
    /// Background refresh period
    pub refresh_interval: Duration,
    /// Quiet period after the last toggle before refreshing
    pub toggle_debounce: Duration,
    pub roll_number_prefix: String,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            toggle_debounce: DEFAULT_TOGGLE_DEBOUNCE,
            roll_number_prefix: DEFAULT_ROLL_NUMBER_PREFIX.to_string(),
        }
    }
}

#[derive(Debug, Default)]
pub struct DashboardState {
    pub applications: Vec<Application>,
    pub selections: SelectionStore,
    pub filters: FilterState,
    pub sort: SortState,
    /// Generation handed to the most recent fetch
    pub issued_generation: u64,
    /// Generation of the snapshot currently shown
    pub applied_generation: u64,
    pub last_error: Option<String>,
}

pub struct Dashboard<B> {
    backend: B,
    settings: DashboardSettings,
    state: RwLock<DashboardState>,
    /// Holds at most one pending request; further requests coalesce into it
    refresh_tx: mpsc::Sender<()>,
    refresh_rx: Mutex<Option<mpsc::Receiver<()>>>,
}

impl<B: DashboardBackend> Dashboard<B> {
    pub fn new(backend: B, settings: DashboardSettings) -> Arc<Self> {
        let (refresh_tx, refresh_rx) = mpsc::channel(1);
        Arc::new(Self {
            backend,
            settings,
            state: RwLock::new(DashboardState::default()),
            refresh_tx,
            refresh_rx: Mutex::new(Some(refresh_rx)),
        })
    }

    pub fn settings(&self) -> &DashboardSettings {
        &self.settings
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Receiver for debounced refresh requests; handed out once.
    pub(crate) fn take_refresh_signals(&self) -> Option<mpsc::Receiver<()>> {
        self.refresh_rx.lock().ok().and_then(|mut rx| rx.take())
    }

    /// Fetches a snapshot and applies it unless a newer one already landed.
    ///
    /// Returns whether the snapshot was applied. On failure the previous
    /// applications and selections stay in place.
    pub async fn refresh(&self) -> Result<bool, DashboardError> {
        let generation = {
            let mut state = self.state.write().await;
            state.issued_generation += 1;
            state.issued_generation
        };

        let result = self.backend.fetch_snapshot().await;

        let mut state = self.state.write().await;
        if generation <= state.applied_generation {
            debug!(
                generation,
                applied = state.applied_generation,
                "Discarding stale snapshot"
            );
            return result.map(|_| false);
        }

        match result {
            Ok(snapshot) => {
                state.applied_generation = generation;
                state.applications = snapshot.applications;
                state
                    .selections
                    .apply_snapshot(generation, snapshot.selections, snapshot.selection_data);
                state.last_error = None;
                debug!(
                    generation,
                    application_count = state.applications.len(),
                    selection_count = state.selections.selections().len(),
                    "Snapshot applied"
                );
                Ok(true)
            }
            Err(e) => {
                warn!(generation, error = %e, "Snapshot fetch failed, keeping previous data");
                state.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Optimistically flips one selection and sends the write.
    ///
    /// On failure the flip is reverted (unless a newer toggle of the same key
    /// took over) and the error is returned. On success a debounced refresh is
    /// requested. Returns the membership now shown. The subject is trimmed
    /// the same way the server stores it.
    pub async fn toggle(&self, application_id: &str, subject: &str) -> Result<bool, DashboardError> {
        let subject = subject.trim();
        let ticket = {
            let mut state = self.state.write().await;
            let generation = state.issued_generation;
            state.last_error = None;
            state
                .selections
                .begin_toggle(application_id, subject, generation)
        };

        let result = self.backend.toggle_selection(application_id, subject).await;

        let mut state = self.state.write().await;
        let generation = state.issued_generation;
        match result {
            Ok(server_selected) => {
                state.selections.complete(&ticket, true, generation);
                if server_selected != ticket.selected {
                    warn!(
                        key = %ticket.key,
                        optimistic = ticket.selected,
                        server = server_selected,
                        "Server membership differs from optimistic state, awaiting refresh"
                    );
                }
                drop(state);
                self.request_refresh();
                Ok(ticket.selected)
            }
            Err(e) => {
                let reverted = state.selections.complete(&ticket, false, generation);
                warn!(
                    key = %ticket.key,
                    reverted,
                    error = %e,
                    "Selection toggle failed"
                );
                state.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Asks the refresh worker for a refresh once toggles go quiet.
    pub fn request_refresh(&self) {
        match self.refresh_tx.try_send(()) {
            Ok(()) | Err(TrySendError::Full(())) => {}
            Err(TrySendError::Closed(())) => debug!("Refresh worker stopped"),
        }
    }

    pub async fn is_selected(&self, application_id: &str, subject: &str) -> bool {
        self.state
            .read()
            .await
            .selections
            .is_selected(application_id, subject.trim())
    }

    pub async fn last_error(&self) -> Option<String> {
        self.state.read().await.last_error.clone()
    }

    pub async fn selections(&self) -> Vec<String> {
        self.state.read().await.selections.selections().to_vec()
    }

    pub async fn application_count(&self) -> usize {
        self.state.read().await.applications.len()
    }

    pub async fn update_filters<F>(&self, update: F)
    where
        F: FnOnce(&mut FilterState),
    {
        update(&mut self.state.write().await.filters);
    }

    pub async fn set_sort(&self, sort: SortState) {
        self.state.write().await.sort = sort;
    }

    /// Applications under the current filters and sort
    pub async fn visible(&self) -> Vec<Application> {
        let state = self.state.read().await;
        let data = state.selections.selection_data();
        let times = shortlist_times(&data);
        visible_applications(
            &state.applications,
            &state.filters,
            state.sort,
            &self.settings.roll_number_prefix,
            &times,
        )
        .into_iter()
        .cloned()
        .collect()
    }

    /// CSV of the visible applications, with optimistic selections
    pub async fn export(&self, mode: ExportMode) -> String {
        let state = self.state.read().await;
        let data = state.selections.selection_data();
        let times = shortlist_times(&data);
        let visible = visible_applications(
            &state.applications,
            &state.filters,
            state.sort,
            &self.settings.roll_number_prefix,
            &times,
        );

        export_csv(
            mode,
            &visible,
            ShortlistData {
                selections: state.selections.selections(),
                selection_data: &data,
            },
        )
    }

    /// Writes the export into `dir` and returns the file path.
    pub async fn download_csv(
        &self,
        dir: &Path,
        filename: Option<&str>,
        mode: ExportMode,
    ) -> Result<PathBuf, DashboardError> {
        let content = self.export(mode).await;
        let path = dir.join(sanitize_filename(filename, mode.default_filename()));

        tokio::fs::write(&path, content).await?;
        info!(path = %path.display(), mode = ?mode, "CSV export written");

        Ok(path)
    }
}
