//! Scan counter kept on the device.

use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use treetag_core::result::AppResult;
use treetag_core::traits::local_store::LocalStore;
use treetag_local::keys::SCAN_COUNT;

/// Scan milestones, in order.
const MILESTONES: [(u64, &str); 4] = [
    (1, "First Scan"),
    (5, "Tree Spotter"),
    (10, "Grove Explorer"),
    (25, "Forest Ranger"),
];

/// One milestone and how close the user is to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Mission {
    /// Display title.
    pub title: &'static str,
    /// Scans needed.
    pub target: u64,
    /// Scans so far, capped at the target.
    pub progress: u64,
    /// Whether the target has been reached.
    pub completed: bool,
}

/// Counter, points, and missions at a point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanProgress {
    /// Total scans recorded.
    pub scans: u64,
    /// Points earned.
    pub points: u64,
    /// Every mission.
    pub missions: Vec<Mission>,
}

impl ScanProgress {
    fn new(scans: u64, points_per_scan: u64) -> Self {
        Self {
            scans,
            points: scans * points_per_scan,
            missions: MILESTONES
                .iter()
                .map(|&(target, title)| Mission {
                    title,
                    target,
                    progress: scans.min(target),
                    completed: scans >= target,
                })
                .collect(),
        }
    }

    /// Missions completed so far.
    pub fn completed(&self) -> impl Iterator<Item = &Mission> {
        self.missions.iter().filter(|m| m.completed)
    }
}

/// Records scans in local state and derives points and missions.
#[derive(Debug, Clone)]
pub struct ScanTracker {
    local: Arc<dyn LocalStore>,
    points_per_scan: u64,
}

impl ScanTracker {
    /// Tracker awarding `points_per_scan` for each scan.
    pub fn new(local: Arc<dyn LocalStore>, points_per_scan: u64) -> Self {
        Self {
            local,
            points_per_scan,
        }
    }

    /// Count one scan and return the new progress.
    pub async fn record_scan(&self) -> AppResult<ScanProgress> {
        let scans = self.local.incr(SCAN_COUNT).await?;
        let progress = ScanProgress::new(scans, self.points_per_scan);
        if let Some(mission) = progress.missions.iter().find(|m| m.target == scans) {
            info!(mission = mission.title, scans, "Mission completed");
        }
        Ok(progress)
    }

    /// Progress without recording a scan.
    pub async fn progress(&self) -> AppResult<ScanProgress> {
        let scans = self.local.get_counter(SCAN_COUNT).await?;
        Ok(ScanProgress::new(scans, self.points_per_scan))
    }
}
