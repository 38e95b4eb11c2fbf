use super::FlagBackend;
use crate::feature::Feature;
use fxhash::FxHashMap;
use parking_lot::RwLock;
use regex::Regex;
use std::sync::Arc;

#[derive(Debug, Default)]
struct Snapshot {
    features: Vec<Arc<Feature>>,
    index: FxHashMap<String, usize>,
}

impl Snapshot {
    fn build(features: impl IntoIterator<Item = Feature>) -> Self {
        let mut snapshot = Self::default();
        for feature in features {
            let feature = Arc::new(feature);
            if let Some(&slot) = snapshot.index.get(&feature.name) {
                snapshot.features[slot] = feature;
            } else {
                snapshot.index.insert(feature.name.clone(), snapshot.features.len());
                snapshot.features.push(feature);
            }
        }
        snapshot
    }
}

/// In-memory feature definitions, replaced wholesale on every sync.
///
/// Readers clone the current snapshot under a short read lock, so a refresh is
/// never observed half applied.
#[derive(Debug, Default)]
pub struct FeatureStore {
    snapshot: RwLock<Arc<Snapshot>>,
}

impl FeatureStore {
    pub fn new(features: impl IntoIterator<Item = Feature>) -> Self {
        Self { snapshot: RwLock::new(Arc::new(Snapshot::build(features))) }
    }

    /// Swaps in a new set of definitions. Later duplicates of a name win.
    pub fn replace(&self, features: impl IntoIterator<Item = Feature>) {
        let next = Arc::new(Snapshot::build(features));
        *self.snapshot.write() = next;
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.current().features.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn current(&self) -> Arc<Snapshot> {
        Arc::clone(&self.snapshot.read())
    }
}

impl FlagBackend for FeatureStore {
    fn feature(&self, name: &str) -> Option<Arc<Feature>> {
        let snapshot = self.current();
        snapshot.index.get(name).map(|&slot| Arc::clone(&snapshot.features[slot]))
    }

    fn features_matching(&self, pattern: &Regex) -> Vec<Arc<Feature>> {
        self.current()
            .features
            .iter()
            .filter(|feature| pattern.is_match(&feature.name))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_by_name() {
        let store = FeatureStore::new([Feature::new("foo", true), Feature::new("bar", false)]);
        assert_eq!(store.len(), 2);
        assert!(store.feature("foo").is_some_and(|f| f.enabled));
        assert!(store.feature("baz").is_none());
    }

    #[test]
    fn matching_keeps_backend_order() {
        let store = FeatureStore::new([
            Feature::new("b.one", true),
            Feature::new("a", true),
            Feature::new("b.two", true),
        ]);
        let pattern = Regex::new(r"^b\.").unwrap();
        let names: Vec<String> =
            store.features_matching(&pattern).iter().map(|f| f.name.clone()).collect();
        assert_eq!(names, ["b.one", "b.two"]);
    }

    #[test]
    fn replace_swaps_everything() {
        let store = FeatureStore::new([Feature::new("foo", true)]);
        let before = store.feature("foo").unwrap();

        store.replace([Feature::new("bar", true)]);
        assert!(store.feature("foo").is_none());
        assert!(store.feature("bar").is_some());
        assert_eq!(before.name, "foo");
    }

    #[test]
    fn later_duplicates_win() {
        let store = FeatureStore::new([Feature::new("foo", false), Feature::new("foo", true)]);
        assert_eq!(store.len(), 1);
        assert!(store.feature("foo").unwrap().enabled);
    }

    #[test]
    fn empty_store() {
        let store = FeatureStore::default();
        assert!(store.is_empty());
    }
}
