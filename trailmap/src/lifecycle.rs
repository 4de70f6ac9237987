//! Foreground/background reactions.
//!
//! The host forwards app state transitions into an mpsc channel. On return
//! to the foreground the permission status is re-checked, since the user may
//! have changed it in system settings while away. Optionally the location
//! watch is suspended while in the background and resumed afterwards.
//!
//! ```text
//!   BecameActive ──► gate.check_status()
//!                      └─ Granted ──► tracker.resume_watching()
//!
//!   EnteredBackground ──► (suspend_on_background) tracker.suspend_watching()
//! ```
//!
//! The suspended options live in the tracker, so an owner that stops the
//! watch while the app is in the background (the map screen unmounting)
//! also cancels the resume.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::tracker::LocationTracker;

/// App state transition reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// App came to the foreground.
    BecameActive,
    /// App moved to the background.
    EnteredBackground,
}

/// Lifecycle policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LifecycleConfig {
    /// Stop the watch while backgrounded.
    pub suspend_on_background: bool,
}

/// Running lifecycle task.
#[derive(Debug)]
pub struct LifecycleMonitor {
    task: JoinHandle<()>,
    cancel: CancellationToken,
}

impl LifecycleMonitor {
    /// Spawn the monitor on the current runtime.
    ///
    /// Runs until `events` is closed or `cancel` fires.
    pub fn start(
        tracker: Arc<LocationTracker>,
        config: LifecycleConfig,
        events: mpsc::Receiver<LifecycleEvent>,
        cancel: CancellationToken,
    ) -> Self {
        let task = tokio::spawn(run(tracker, config, events, cancel.clone()));
        Self { task, cancel }
    }

    /// Wait for the task to end on its own (channel closed or cancelled).
    pub async fn join(self) {
        if let Err(e) = self.task.await {
            warn!(error = %e, "Lifecycle monitor task failed");
        }
    }

    /// Cancel the task and wait for it.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        self.join().await;
    }
}

async fn run(
    tracker: Arc<LocationTracker>,
    config: LifecycleConfig,
    mut events: mpsc::Receiver<LifecycleEvent>,
    cancel: CancellationToken,
) {
    loop {
        let event = tokio::select! {
            _ = cancel.cancelled() => break,
            event = events.recv() => match event {
                Some(event) => event,
                None => break,
            },
        };

        debug!(?event, "Lifecycle event");
        match event {
            LifecycleEvent::BecameActive => {
                let status = tracker.gate().check_status().await;
                if !status.is_granted() {
                    continue;
                }
                match tracker.resume_watching() {
                    Ok(true) => info!("Location watch resumed"),
                    Ok(false) => {}
                    Err(e) => warn!(error = %e, "Could not resume location watch"),
                }
            }
            LifecycleEvent::EnteredBackground => {
                if !config.suspend_on_background {
                    continue;
                }
                if tracker.suspend_watching() {
                    info!("Location watch suspended in background");
                }
            }
        }
    }

    debug!("Lifecycle monitor stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::Coordinate;
    use crate::permission::{PermissionGate, PermissionState};
    use crate::position::WatchOptions;
    use crate::session::{MapSession, MapSessionConfig};
    use crate::sim::{SimulatedPermissionService, SimulatedPositionService};
    use crate::tracker::TrackerConfig;
    use std::time::Duration;

    struct Fixture {
        permissions: Arc<SimulatedPermissionService>,
        positions: Arc<SimulatedPositionService>,
        tracker: Arc<LocationTracker>,
    }

    async fn fixture(status: PermissionState) -> Fixture {
        let permissions = Arc::new(SimulatedPermissionService::new(status));
        let positions = Arc::new(SimulatedPositionService::new());
        let gate = Arc::new(PermissionGate::new(permissions.clone()));
        gate.check_status().await;
        let tracker = Arc::new(LocationTracker::new(
            gate,
            positions.clone(),
            TrackerConfig::default(),
        ));
        Fixture {
            permissions,
            positions,
            tracker,
        }
    }

    async fn run_events(f: &Fixture, config: LifecycleConfig, events: &[LifecycleEvent]) {
        let (tx, rx) = mpsc::channel(8);
        let monitor =
            LifecycleMonitor::start(f.tracker.clone(), config, rx, CancellationToken::new());
        for event in events {
            tx.send(*event).await.unwrap();
        }
        drop(tx);
        monitor.join().await;
    }

    /// Wait until the monitor has suspended the tracker's watch.
    async fn wait_for_suspension(tracker: &LocationTracker) {
        tokio::time::timeout(Duration::from_secs(1), async {
            while tracker.suspended_options().is_none() {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("watch should be suspended");
    }

    fn suspending() -> LifecycleConfig {
        LifecycleConfig {
            suspend_on_background: true,
        }
    }

    #[tokio::test]
    async fn test_became_active_rechecks_permission() {
        let f = fixture(PermissionState::Granted).await;
        f.permissions.set_status(PermissionState::Denied);

        run_events(&f, LifecycleConfig::default(), &[LifecycleEvent::BecameActive]).await;

        assert_eq!(f.tracker.gate().status(), PermissionState::Denied);
    }

    #[tokio::test]
    async fn test_background_keeps_watch_by_default() {
        let f = fixture(PermissionState::Granted).await;
        f.tracker.start_watching(WatchOptions::default()).unwrap();

        run_events(
            &f,
            LifecycleConfig::default(),
            &[LifecycleEvent::EnteredBackground],
        )
        .await;

        assert!(f.tracker.is_watching());
        assert_eq!(f.positions.active_subscriptions(), 1);
    }

    #[tokio::test]
    async fn test_background_suspends_watch() {
        let f = fixture(PermissionState::Granted).await;
        f.tracker.start_watching(WatchOptions::default()).unwrap();
        let config = suspending();

        run_events(&f, config, &[LifecycleEvent::EnteredBackground]).await;

        assert!(!f.tracker.is_watching());
        assert_eq!(f.positions.active_subscriptions(), 0);
    }

    #[tokio::test]
    async fn test_foreground_resumes_with_same_options() {
        let f = fixture(PermissionState::Granted).await;
        let options = WatchOptions::default().with_min_interval(Duration::from_secs(1));
        f.tracker.start_watching(options).unwrap();
        let config = suspending();

        run_events(
            &f,
            config,
            &[LifecycleEvent::EnteredBackground, LifecycleEvent::BecameActive],
        )
        .await;

        assert_eq!(f.tracker.active_options(), Some(options));
        assert_eq!(f.positions.active_subscriptions(), 1);
        assert_eq!(f.positions.subscribe_calls(), 2);
    }

    #[tokio::test]
    async fn test_foreground_without_suspension_starts_nothing() {
        let f = fixture(PermissionState::Granted).await;

        run_events(
            &f,
            suspending(),
            &[LifecycleEvent::EnteredBackground, LifecycleEvent::BecameActive],
        )
        .await;

        assert!(!f.tracker.is_watching());
        assert_eq!(f.positions.subscribe_calls(), 0);
    }

    #[tokio::test]
    async fn test_no_resume_after_revocation() {
        let f = fixture(PermissionState::Granted).await;
        f.tracker.start_watching(WatchOptions::default()).unwrap();
        let config = suspending();

        let (tx, rx) = mpsc::channel(8);
        let monitor = LifecycleMonitor::start(f.tracker.clone(), config, rx, CancellationToken::new());
        tx.send(LifecycleEvent::EnteredBackground).await.unwrap();
        wait_for_suspension(&f.tracker).await;
        f.permissions.set_status(PermissionState::Denied);
        tx.send(LifecycleEvent::BecameActive).await.unwrap();
        drop(tx);
        monitor.join().await;

        assert!(!f.tracker.is_watching());
        assert_eq!(f.tracker.gate().status(), PermissionState::Denied);
        assert_eq!(f.tracker.suspended_options(), Some(WatchOptions::default()));
    }

    #[tokio::test]
    async fn test_shutdown_cancels() {
        let f = fixture(PermissionState::Granted).await;
        let (_tx, rx) = mpsc::channel(8);
        let monitor = LifecycleMonitor::start(
            f.tracker.clone(),
            LifecycleConfig::default(),
            rx,
            CancellationToken::new(),
        );

        tokio::time::timeout(Duration::from_secs(1), monitor.shutdown())
            .await
            .expect("monitor should stop on cancel");
    }

    #[tokio::test]
    async fn test_unmount_while_backgrounded_cancels_resume() {
        let f = fixture(PermissionState::Granted).await;
        let session = MapSession::mount(f.tracker.clone(), MapSessionConfig::default())
            .await
            .unwrap();
        let (tx, rx) = mpsc::channel(8);
        let monitor =
            LifecycleMonitor::start(f.tracker.clone(), suspending(), rx, CancellationToken::new());

        tx.send(LifecycleEvent::EnteredBackground).await.unwrap();
        wait_for_suspension(&f.tracker).await;
        session.unmount().await;
        tx.send(LifecycleEvent::BecameActive).await.unwrap();
        drop(tx);
        monitor.join().await;
        f.positions.emit(Coordinate::new(5.0, 5.0));

        assert!(!f.tracker.is_watching());
        assert_eq!(f.positions.active_subscriptions(), 0);
        assert_eq!(f.positions.subscribe_calls(), 1);
        assert!(f.tracker.trail().is_empty());
    }

    #[tokio::test]
    async fn test_stop_while_backgrounded_cancels_resume() {
        let f = fixture(PermissionState::Granted).await;
        f.tracker.start_watching(WatchOptions::default()).unwrap();
        let (tx, rx) = mpsc::channel(8);
        let monitor =
            LifecycleMonitor::start(f.tracker.clone(), suspending(), rx, CancellationToken::new());

        tx.send(LifecycleEvent::EnteredBackground).await.unwrap();
        wait_for_suspension(&f.tracker).await;
        f.tracker.stop_watching();
        tx.send(LifecycleEvent::BecameActive).await.unwrap();
        drop(tx);
        monitor.join().await;

        assert!(!f.tracker.is_watching());
        assert_eq!(f.positions.active_subscriptions(), 0);
        assert_eq!(f.positions.subscribe_calls(), 1);
    }
}
