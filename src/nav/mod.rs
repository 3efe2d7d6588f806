//! Navigation targets and guidance.
//!
//! This module defines the `NavTarget` and `TargetRegistry` types used to
//! name places in the campus model, plus label normalization so scene node
//! names, landmark files and user queries all meet on the same key. Guidance
//! toward the selected target lives in `guidance`, landmark file loading in
//! `loader`.

pub mod guidance;
pub mod loader;

use bevy::prelude::*;
use std::collections::HashMap;

pub use guidance::*;
pub use loader::*;

/// Fold a human or asset-author label into a lookup key.
///
/// Lowercases and keeps alphabetic characters only, so `"Class_1"`,
/// `"class 1"` and `"CLASS-1"` all become `"class"`. Export suffixes and
/// numbering never break a lookup this way.
#[must_use]
pub fn normalize_label(label: &str) -> String {
    label
        .chars()
        .filter(|c| c.is_alphabetic())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Clean a raw node name up for display: separators become single spaces
/// and surrounding whitespace is dropped. Digits stay, so `"Class_1"` shows
/// as `"Class 1"`.
#[must_use]
pub fn display_label(label: &str) -> String {
    let spaced: String = label
        .chars()
        .map(|c| if matches!(c, '_' | '-' | '.') { ' ' } else { c })
        .collect();
    spaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Where a navigation target gets its position from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TargetKind {
    /// A fixed world-space point, e.g. a landmark from a data file.
    StaticPoint(Vec3),
    /// A node in the loaded model; the position follows its transform.
    MeshAnchor(Entity),
}

/// A named place the player can navigate to.
#[derive(Debug, Clone)]
pub struct NavTarget {
    /// Display name, cleaned up from the source label.
    pub label: String,
    /// Normalized lookup key.
    pub key: String,
    pub kind: TargetKind,
}

/// All known navigation targets plus the current selection.
///
/// Insertion order is preserved for menu listings. The first target to claim
/// a normalized key keeps it; later duplicates are dropped so repeated node
/// names in a model cannot reshuffle lookups.
#[derive(Resource, Default, Clone)]
pub struct TargetRegistry {
    pub targets: Vec<NavTarget>,
    index: HashMap<String, usize>,
    selected: Option<usize>,
}

impl TargetRegistry {
    /// Register a target under its normalized label. Labels that normalize
    /// to nothing (pure digits or punctuation) are ignored.
    pub fn insert(&mut self, label: &str, kind: TargetKind) {
        let key = normalize_label(label);
        if key.is_empty() || self.index.contains_key(&key) {
            return;
        }
        self.index.insert(key.clone(), self.targets.len());
        self.targets.push(NavTarget {
            label: display_label(label),
            key,
            kind,
        });
    }

    /// Look a target up by any spelling of its name.
    #[must_use]
    pub fn resolve(&self, query: &str) -> Option<&NavTarget> {
        let key = normalize_label(query);
        self.index.get(&key).map(|&i| &self.targets[i])
    }

    /// Select the target matching `query`. An unknown name leaves the
    /// current selection alone and returns `None`.
    pub fn select(&mut self, query: &str) -> Option<usize> {
        let key = normalize_label(query);
        let found = self.index.get(&key).copied();
        if found.is_some() {
            self.selected = found;
        }
        found
    }

    /// Select a target by its position in the listing.
    pub fn select_index(&mut self, index: usize) {
        if index < self.targets.len() {
            self.selected = Some(index);
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    #[must_use]
    pub fn selected_target(&self) -> Option<&NavTarget> {
        self.selected.map(|i| &self.targets[i])
    }

    /// Lookup key of the current selection, used to carry a selection across
    /// a registry rebuild.
    #[must_use]
    pub fn selected_key(&self) -> Option<&str> {
        self.selected_target().map(|t| t.key.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

/// Set when landmark files or the scene change so the registry gets rebuilt
/// from fresh data on the next update.
#[derive(Resource, Default)]
pub struct RegistryRebuild(pub bool);

/// Resolve a target to a world position. Mesh anchors follow their node's
/// current transform; a despawned anchor yields `None`.
#[must_use]
pub fn target_world_position(
    target: &NavTarget,
    transforms: &Query<&GlobalTransform>,
) -> Option<Vec3> {
    match target.kind {
        TargetKind::StaticPoint(point) => Some(point),
        TargetKind::MeshAnchor(entity) => {
            transforms.get(entity).ok().map(GlobalTransform::translation)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_strips_digits_and_separators() {
        assert_eq!(normalize_label("Class_1"), "class");
        assert_eq!(normalize_label("class 1"), "class");
        assert_eq!(normalize_label("CLASS-1"), "class");
        assert_eq!(normalize_label("  Main-Gate 2 "), "maingate");
        assert_eq!(normalize_label("42"), "");
    }

    #[test]
    fn display_labels_keep_digits_and_read_cleanly() {
        assert_eq!(display_label("Class_1"), "Class 1");
        assert_eq!(display_label("  Main--Gate.North "), "Main Gate North");
    }

    #[test]
    fn first_label_wins_a_contested_key() {
        let mut registry = TargetRegistry::default();
        registry.insert("Main Hall", TargetKind::StaticPoint(Vec3::ZERO));
        registry.insert("main-hall", TargetKind::StaticPoint(Vec3::ONE));

        assert_eq!(registry.len(), 1);
        let target = registry.resolve("MAIN HALL");
        assert!(target.is_some(), "either spelling resolves");
        assert_eq!(
            target.map(|t| t.kind),
            Some(TargetKind::StaticPoint(Vec3::ZERO)),
            "the first insertion keeps the key"
        );
    }

    #[test]
    fn queries_resolve_across_spellings_and_miss_silently() {
        let mut registry = TargetRegistry::default();
        registry.insert("Class_1", TargetKind::MeshAnchor(Entity::from_raw(7)));
        registry.insert("class1_Door", TargetKind::MeshAnchor(Entity::from_raw(8)));
        registry.insert("Gate", TargetKind::StaticPoint(Vec3::new(5.0, 0.0, 10.0)));

        let class = registry.resolve("Class");
        assert_eq!(
            class.map(|t| t.kind),
            Some(TargetKind::MeshAnchor(Entity::from_raw(7)))
        );

        let gate = registry.resolve("gate");
        assert_eq!(
            gate.map(|t| t.kind),
            Some(TargetKind::StaticPoint(Vec3::new(5.0, 0.0, 10.0)))
        );

        assert!(registry.resolve("Library").is_none());

        registry.select("Class");
        registry.select("Library");
        assert_eq!(
            registry.selected_key(),
            Some("class"),
            "a miss leaves the selection alone"
        );
    }

    #[test]
    fn unlabeled_nodes_never_enter_the_registry() {
        let mut registry = TargetRegistry::default();
        registry.insert("123", TargetKind::StaticPoint(Vec3::ZERO));
        registry.insert("", TargetKind::StaticPoint(Vec3::ZERO));
        assert!(registry.is_empty());
    }

    #[test]
    fn selection_helpers_stay_in_bounds() {
        let mut registry = TargetRegistry::default();
        registry.insert("Gate", TargetKind::StaticPoint(Vec3::ZERO));

        registry.select_index(5);
        assert!(registry.selected_target().is_none());

        registry.select_index(0);
        assert_eq!(registry.selected_key(), Some("gate"));

        registry.clear_selection();
        assert!(registry.selected_target().is_none());
    }
}
