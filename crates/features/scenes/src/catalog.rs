//! Resolution of parcels to scene descriptors.

use fxhash::FxHashMap;
use plaza_domain::scene::{Parcel, SceneDescriptor};
use std::fmt::Debug;
use std::sync::Arc;

/// Resolves parcels to the scenes deployed on them.
pub trait SceneCatalog: Send + Sync + Debug {
    /// Spatial scenes covering any of `parcels`, each reported once, in first-hit order.
    fn scenes_at(&self, parcels: &[Parcel]) -> Vec<Arc<SceneDescriptor>>;

    /// Global scenes to start at boot.
    fn globals(&self) -> Vec<Arc<SceneDescriptor>> {
        Vec::new()
    }
}

/// Catalog over a fixed set of descriptors.
///
/// Global descriptors are kept apart and never returned by [`SceneCatalog::scenes_at`].
#[derive(Debug, Default, Clone)]
pub struct StaticCatalog {
    scenes: Vec<Arc<SceneDescriptor>>,
    by_parcel: FxHashMap<Parcel, usize>,
    globals: Vec<Arc<SceneDescriptor>>,
}

impl StaticCatalog {
    #[must_use]
    pub fn new(descriptors: impl IntoIterator<Item = SceneDescriptor>) -> Self {
        descriptors.into_iter().map(Arc::new).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.scenes.len() + self.globals.len()
    }

    fn insert(&mut self, scene: Arc<SceneDescriptor>) {
        if scene.is_global {
            self.globals.push(scene);
            return;
        }

        let index = self.scenes.len();
        for parcel in &scene.parcels {
            if let Some(previous) = self.by_parcel.insert(*parcel, index) {
                tracing::warn!(
                    parcel = %parcel,
                    kept = %scene.id,
                    replaced = %self.scenes[previous].id,
                    "Parcel claimed by two scenes"
                );
            }
        }
        self.scenes.push(scene);
    }
}

impl FromIterator<Arc<SceneDescriptor>> for StaticCatalog {
    fn from_iter<I: IntoIterator<Item = Arc<SceneDescriptor>>>(iter: I) -> Self {
        let mut catalog = Self::default();
        for scene in iter {
            catalog.insert(scene);
        }
        catalog
    }
}

impl SceneCatalog for StaticCatalog {
    fn scenes_at(&self, parcels: &[Parcel]) -> Vec<Arc<SceneDescriptor>> {
        let mut seen = Vec::new();
        for parcel in parcels {
            if let Some(&index) = self.by_parcel.get(parcel)
                && !seen.contains(&index)
            {
                seen.push(index);
            }
        }
        seen.into_iter().map(|index| Arc::clone(&self.scenes[index])).collect()
    }

    fn globals(&self) -> Vec<Arc<SceneDescriptor>> {
        self.globals.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scene(id: &str, parcels: &[(i32, i32)], is_global: bool) -> SceneDescriptor {
        SceneDescriptor {
            id: id.into(),
            parcels: parcels.iter().map(|(x, y)| Parcel::new(*x, *y)).collect(),
            main: "bin/game.js".into(),
            name: id.into(),
            base_url: String::new(),
            mappings: Vec::new(),
            is_global,
        }
    }

    #[test]
    fn scenes_are_reported_once() {
        let catalog = StaticCatalog::new([
            scene("plaza", &[(0, 0), (0, 1), (1, 0)], false),
            scene("park", &[(5, 5)], false),
            scene("dcl-gs-avatars", &[], true),
        ]);

        let hits = catalog.scenes_at(&[Parcel::new(0, 0), Parcel::new(1, 0), Parcel::new(5, 5)]);
        let ids: Vec<_> = hits.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["plaza", "park"]);
        let globals = catalog.globals();
        assert_eq!(globals.len(), 1);
        assert_eq!(globals[0].id.as_str(), "dcl-gs-avatars");
        assert_eq!(catalog.len(), 3);
    }

    #[test]
    fn empty_parcels_resolve_to_nothing() {
        let catalog = StaticCatalog::new([scene("plaza", &[(0, 0)], false)]);
        assert!(catalog.scenes_at(&[Parcel::new(9, 9)]).is_empty());
    }
}
