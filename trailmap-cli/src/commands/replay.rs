//! Replay command: push a recorded track through the tracking core.
//!
//! The app is composed with simulated permission and position services. The
//! permission flow runs first, then a map session is mounted and every track
//! point is emitted as a platform position update. Camera events are printed
//! as they happen, followed by a summary.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Args;
use tokio::sync::broadcast;
use tracing::{info, warn};
use trailmap::app::{AppConfig, TrailmapApp};
use trailmap::camera::CameraEvent;
use trailmap::permission::PermissionState;
use trailmap::session::MapSession;
use trailmap::sim::{SimulatedPermissionService, SimulatedPositionService};
use trailmap::Coordinate;

use crate::error::CliError;

/// Number of scheduler turns given to the session pump after each point.
const PUMP_TURNS: usize = 8;

/// Arguments for `trailmap replay`.
#[derive(Debug, Args)]
pub struct ReplayArgs {
    /// CSV file with one `latitude,longitude` pair per line
    pub track: PathBuf,

    /// Permission status the simulated platform reports at start
    #[arg(long, default_value = "undetermined")]
    pub permission: PermissionState,

    /// Simulated user denies access when prompted (default: grants)
    #[arg(long)]
    pub deny: bool,

    /// Simulate a user pan just before the point with this index
    #[arg(long, value_name = "N")]
    pub pan_at: Option<usize>,

    /// Simulate a recenter tap just before the point with this index
    #[arg(long, value_name = "N")]
    pub recenter_at: Option<usize>,
}

/// Run the replay.
pub async fn run(args: ReplayArgs, config_path: Option<&Path>) -> Result<(), CliError> {
    let config = AppConfig::load(config_path)?;
    let _logging = config.init_logging()?;

    let track = read_track(&args.track)?;
    info!(points = track.len(), path = %args.track.display(), "Track loaded");

    let outcome = if args.deny {
        PermissionState::Denied
    } else {
        PermissionState::Granted
    };
    let permissions =
        Arc::new(SimulatedPermissionService::new(args.permission).with_request_outcome(outcome));
    let positions = Arc::new(SimulatedPositionService::new());
    if let Some(first) = track.first() {
        positions.set_fix(Some(*first));
    }

    let app = TrailmapApp::start(config, permissions, positions.clone()).await;
    println!("Route: {}", app.route());

    let status = app.request_permission().await;
    println!("Permission: {}", status);

    let session = match app.mount_map().await {
        Ok(session) => session,
        Err(e) => {
            app.shutdown().await;
            return Err(e.into());
        }
    };
    println!(
        "Camera starts at {}",
        session.controller().current_target().center
    );

    let mut camera = session.controller().subscribe();
    for (index, coord) in track.iter().enumerate() {
        if args.pan_at == Some(index) {
            println!("[{:>4}] user pan", index);
            session.on_user_pan();
        }
        if args.recenter_at == Some(index) {
            println!("[{:>4}] recenter", index);
            if let Some(pending) = session.on_recenter() {
                if let Err(e) = pending.await {
                    warn!(error = %e, "Recenter fix task failed");
                }
            }
        }

        positions.emit(*coord);
        for _ in 0..PUMP_TURNS {
            tokio::task::yield_now().await;
        }
        print_camera_events(index, &mut camera);
    }

    print_summary(&session, track.len());

    session.unmount().await;
    app.shutdown().await;
    Ok(())
}

fn print_camera_events(index: usize, camera: &mut broadcast::Receiver<CameraEvent>) {
    while let Ok(event) = camera.try_recv() {
        match event {
            CameraEvent::Target { target, reason } => {
                println!("[{:>4}] camera -> {} ({:?})", index, target.center, reason);
            }
            CameraEvent::FollowChanged(state) => {
                println!("[{:>4}] follow: {}", index, state);
            }
        }
    }
}

fn print_summary(session: &MapSession, points: usize) {
    let target = session.controller().current_target();
    println!();
    println!("Summary");
    println!("=======");
    println!("  Points replayed: {}", points);
    println!("  Trail length:    {}", session.trail().len());
    println!("  Follow state:    {}", session.follow_state());
    println!("  Camera target:   {}", target.center);
    if let Some(e) = session.last_error() {
        println!("  Last error:      {}", e);
    }
}

/// Read a track file.
fn read_track(path: &Path) -> Result<Vec<Coordinate>, CliError> {
    let content = std::fs::read_to_string(path).map_err(|error| CliError::TrackRead {
        path: path.to_path_buf(),
        error,
    })?;
    parse_track(&content)
}

/// Parse `latitude,longitude` lines.
///
/// Blank lines and `#` comments are skipped, as is a non-numeric header on
/// the first line. Extra columns (altitude, timestamp) are ignored.
fn parse_track(content: &str) -> Result<Vec<Coordinate>, CliError> {
    let mut track = Vec::new();

    for (index, raw) in content.lines().enumerate() {
        let line_no = index + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let mut fields = line.split(',').map(str::trim);
        let (lat, lon) = match (fields.next(), fields.next()) {
            (Some(lat), Some(lon)) => (lat, lon),
            _ => {
                return Err(CliError::TrackParse {
                    line: line_no,
                    reason: "expected latitude,longitude".to_string(),
                })
            }
        };

        let (lat, lon) = match (lat.parse::<f64>(), lon.parse::<f64>()) {
            (Ok(lat), Ok(lon)) => (lat, lon),
            _ if track.is_empty() && line_no == 1 => continue,
            _ => {
                return Err(CliError::TrackParse {
                    line: line_no,
                    reason: format!("'{}' is not a coordinate pair", line),
                })
            }
        };

        let coord = Coordinate::try_new(lat, lon).map_err(|e| CliError::TrackParse {
            line: line_no,
            reason: e.to_string(),
        })?;
        track.push(coord);
    }

    Ok(track)
}
