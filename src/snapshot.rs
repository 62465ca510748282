//! Serializable catalog snapshot for view communication.
//!
//! A [`CatalogSnapshot`] captures the full ordered catalog state (id, name,
//! asset reference, selection flag per layer) in a format that can be
//! serialized to JSON and handed to a view process. It is the payload of
//! every change notification fired by [`LayerSet`](crate::LayerSet),
//! so a view can re-render from a single message without querying each
//! field separately.
//!
//! # Example
//!
//! ```
//! use portrait_renderer::{CatalogSnapshot, LayerCatalog, LayerSet};
//!
//! let mut set = LayerSet::new(LayerCatalog::standard());
//! set.toggle(1);
//!
//! let snapshot = set.snapshot();
//! let json = snapshot.to_json().unwrap();
//!
//! // A view (or another process) can reconstruct the state
//! let restored = CatalogSnapshot::from_json(&json).unwrap();
//! assert!(restored.layers[0].selected);
//! ```

use serde::{Deserialize, Serialize};

use crate::catalog::LayerCatalog;

/// Serialized state of a single layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerState {
    /// Stable unique identifier.
    pub id: u32,

    /// Display name.
    pub name: String,

    /// Opaque asset reference (path or URL).
    pub asset_ref: String,

    /// Whether the layer participates in the composite.
    #[serde(default)]
    pub selected: bool,
}

/// The full ordered catalog state at one point in time.
///
/// Layer order matches catalog order, which is also stacking order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CatalogSnapshot {
    /// Per-layer state in catalog order.
    pub layers: Vec<LayerState>,
}

impl CatalogSnapshot {
    /// Captures the current state of a catalog.
    pub fn of(catalog: &LayerCatalog) -> Self {
        Self {
            layers: catalog
                .iter()
                .map(|layer| LayerState {
                    id: layer.id(),
                    name: layer.name().to_string(),
                    asset_ref: layer.asset().as_str().to_string(),
                    selected: layer.is_selected(),
                })
                .collect(),
        }
    }

    /// Iterates the ids of selected layers, in catalog order.
    pub fn selected_ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.layers.iter().filter(|l| l.selected).map(|l| l.id)
    }

    /// Serializes the snapshot to a JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serializes the snapshot to a pretty-printed JSON string.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserializes a snapshot from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_captures_catalog_order() {
        let catalog = LayerCatalog::standard();
        let snapshot = CatalogSnapshot::of(&catalog);

        assert_eq!(snapshot.layers.len(), 5);
        let ids: Vec<u32> = snapshot.layers.iter().map(|l| l.id).collect();
        assert_eq!(ids, [1, 2, 3, 4, 5]);
        assert!(snapshot.layers.iter().all(|l| !l.selected));
    }

    #[test]
    fn json_uses_camel_case_asset_ref() {
        let snapshot = CatalogSnapshot {
            layers: vec![LayerState {
                id: 1,
                name: "Background".into(),
                asset_ref: "assets/background.png".into(),
                selected: true,
            }],
        };

        let json = snapshot.to_json().unwrap();
        assert!(json.contains("\"assetRef\""));
        assert!(json.contains("\"selected\":true"));
    }

    #[test]
    fn json_roundtrip() {
        let catalog = LayerCatalog::standard();
        let snapshot = CatalogSnapshot::of(&catalog);

        let json = snapshot.to_json().unwrap();
        let restored = CatalogSnapshot::from_json(&json).unwrap();
        assert_eq!(restored, snapshot);
    }

    #[test]
    fn missing_selected_defaults_to_false() {
        let json = r#"{"layers":[{"id":1,"name":"Background","assetRef":"bg.png"}]}"#;
        let snapshot = CatalogSnapshot::from_json(json).unwrap();
        assert!(!snapshot.layers[0].selected);
    }

    #[test]
    fn selected_ids_in_catalog_order() {
        let snapshot = CatalogSnapshot {
            layers: vec![
                LayerState {
                    id: 1,
                    name: "Background".into(),
                    asset_ref: "bg.png".into(),
                    selected: true,
                },
                LayerState {
                    id: 2,
                    name: "Base".into(),
                    asset_ref: "base.png".into(),
                    selected: false,
                },
                LayerState {
                    id: 3,
                    name: "Sword".into(),
                    asset_ref: "sword.png".into(),
                    selected: true,
                },
            ],
        };
        let ids: Vec<u32> = snapshot.selected_ids().collect();
        assert_eq!(ids, [1, 3]);
    }
}
