//! Loader module for landmarks.
//!
//! Landmarks are named world positions that belong in the destinations list
//! even when the model contains no node for them (gates, lawns, meeting
//! spots). They live in RON files so a campus can be annotated without
//! touching the model, and a file watcher picks up edits while the viewer
//! is running.

use crate::ron_loader::{load_ron_files, setup_ron_watcher};
use bevy::prelude::{Res, ResMut, Resource};
use serde::{Deserialize, Serialize};

use super::RegistryRebuild;

/// Directory scanned for landmark RON files.
pub const LANDMARKS_DIR: &str = "data/landmarks";

#[derive(Resource)]
pub struct LandmarkWatcher(pub crate::ron::RonWatcher);

/// A named world position read from a landmark file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Landmark {
    pub label: String,
    pub position: [f32; 3],
}

/// Every landmark from every file in the landmarks directory.
#[derive(Resource, Debug, Clone, Serialize, Deserialize)]
pub struct LandmarkSet {
    pub landmarks: Vec<Landmark>,
}

impl Default for LandmarkSet {
    fn default() -> Self {
        LandmarkSet {
            landmarks: vec![Landmark {
                label: "Entrance".to_string(),
                position: [0.0, 0.0, 10.0],
            }],
        }
    }
}

/// Loads landmark data from RON files in the specified directory.
///
/// Files are read in sorted order and their landmark lists concatenated, so
/// a label claimed by an earlier file wins any later duplicate once the
/// registry normalizes it. An empty or missing directory falls back to the
/// built-in entrance landmark.
///
/// # Arguments
/// * `path` - The path to the directory containing landmark RON files.
///
/// # Example
/// ```no_run
/// let set = atrium::nav::load_landmarks_from_dir("data/landmarks");
/// ```
#[must_use]
pub fn load_landmarks_from_dir(path: &str) -> LandmarkSet {
    let sets: Vec<LandmarkSet> = load_ron_files(path);
    if sets.is_empty() {
        return LandmarkSet::default();
    }
    let mut merged = LandmarkSet { landmarks: Vec::new() };
    for set in sets {
        merged.landmarks.extend(set.landmarks);
    }
    merged
}

/// Set's up a file watcher for the data/landmarks directory.
///
/// # Errors
///
/// Returns `Err` if the watcher cannot be created — for example when the
/// path does not exist or is inaccessible, on permission / I/O failures,
/// or when the underlying filesystem-watcher backend fails to initialize.
/// The returned error is the underlying `notify::Error` from `setup_ron_watcher`.
pub fn setup_landmark_watcher(path: &str) -> Result<LandmarkWatcher, notify::Error> {
    setup_ron_watcher(path).map(LandmarkWatcher)
}

/// Checks the file-watcher and reloads landmark files that changed.
///
/// Reloading replaces the `LandmarkSet` resource and flags the target
/// registry for a rebuild so the destinations list follows the files.
///
/// # Arguments
/// * `watcher` - A resource containing the `LandmarkWatcher` that monitors file changes
/// * `landmarks` - The `LandmarkSet` to replace when changes are detected
/// * `rebuild` - Rebuild flag consumed by the registry build system
#[allow(clippy::needless_pass_by_value)]
pub fn check_landmark_changes(
    watcher: Res<LandmarkWatcher>,
    mut landmarks: ResMut<LandmarkSet>,
    mut rebuild: ResMut<RegistryRebuild>,
) {
    // Handle poisoned mutex instead of calling `unwrap()` so this function
    // does not panic if another thread panicked while holding the lock.
    match watcher.0.changed.lock() {
        Ok(mut flag) => {
            if *flag {
                println!("Landmarks changed, reloading...");
                *landmarks = load_landmarks_from_dir(LANDMARKS_DIR);
                rebuild.0 = true;
                *flag = false;
            }
        }
        Err(poisoned) => {
            // Recover the guard (best-effort) and continue; log so we can debug.
            eprintln!("warning: landmark watcher mutex poisoned — recovering");
            let mut flag = poisoned.into_inner();
            if *flag {
                println!("Landmarks changed, reloading...");
                *landmarks = load_landmarks_from_dir(LANDMARKS_DIR);
                rebuild.0 = true;
                *flag = false;
            }
        }
    }
}

impl LandmarkWatcher {
    /// Create a stub `LandmarkWatcher` that does not have an active OS watcher.
    #[must_use]
    pub fn stub() -> Self {
        LandmarkWatcher(crate::ron::RonWatcher::stub())
    }
}
