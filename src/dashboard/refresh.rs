//! Background refresh worker
//!
//! One task serves both triggers: the fixed interval and the debounced
//! refresh requested after successful toggles. A burst of toggles closer
//! together than the debounce window yields a single fetch.

use std::sync::{Arc, Weak};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::backend::DashboardBackend;
use super::store::Dashboard;

/// Starts the refresh worker. Returns `None` if one was already started.
///
/// The worker holds only a weak reference and exits once the dashboard is dropped.
pub fn spawn_refresh_loop<B>(dashboard: &Arc<Dashboard<B>>) -> Option<JoinHandle<()>>
where
    B: DashboardBackend + 'static,
{
    let signals = dashboard.take_refresh_signals()?;
    let weak = Arc::downgrade(dashboard);
    Some(tokio::spawn(run_refresh_loop(weak, signals)))
}

async fn run_refresh_loop<B>(dashboard: Weak<Dashboard<B>>, mut signals: mpsc::Receiver<()>)
where
    B: DashboardBackend + 'static,
{
    let (period, debounce) = match dashboard.upgrade() {
        Some(d) => (d.settings().refresh_interval, d.settings().toggle_debounce),
        None => return,
    };

    let mut interval = time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!(
        interval_ms = period.as_millis() as u64,
        debounce_ms = debounce.as_millis() as u64,
        "Dashboard refresh worker started"
    );

    loop {
        tokio::select! {
            _ = interval.tick() => {
                debug!("Interval refresh");
            }
            signal = signals.recv() => {
                if signal.is_none() {
                    break;
                }
                // Wait until no further request arrives within the debounce window
                loop {
                    match time::timeout(debounce, signals.recv()).await {
                        Ok(Some(())) => continue,
                        Ok(None) | Err(_) => break,
                    }
                }
                debug!("Debounced refresh after toggles");
                interval.reset();
            }
        }

        let Some(dashboard) = dashboard.upgrade() else {
            break;
        };
        if let Err(e) = dashboard.refresh().await {
            warn!(error = %e, "Background refresh failed");
        }
    }

    info!("Dashboard refresh worker stopped");
}
