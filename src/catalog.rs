//! Layer and catalog types for composite portrait assembly.
//!
//! A portrait is assembled from a fixed, ordered set of [`Layer`]s. The
//! catalog order is significant: it is the back-to-front visual role of
//! each layer and, for selected layers, the stacking order used by the
//! compositor.

use thiserror::Error;

/// Error raised when a catalog definition violates a construction invariant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// Two layer definitions share the same id.
    #[error("duplicate layer id {0} in catalog definition")]
    DuplicateId(u32),
}

// ============================================================================
// AssetRef
// ============================================================================

/// An opaque reference to a layer's visual asset (a path or URL).
///
/// The catalog never reads or validates asset contents; turning a reference
/// into pixels is the job of an [`AssetResolver`](crate::AssetResolver).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AssetRef(String);

impl AssetRef {
    /// Creates an asset reference from a path or URL string.
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    /// Returns the reference as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<S: Into<String>> From<S> for AssetRef {
    fn from(s: S) -> Self {
        Self(s.into())
    }
}

impl std::fmt::Display for AssetRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Layer
// ============================================================================

/// Definition of a single layer, used to construct a catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerDef {
    /// Stable unique identifier within the catalog.
    pub id: u32,
    /// Human-readable display name.
    pub name: String,
    /// Reference to the layer's visual asset.
    pub asset: AssetRef,
}

impl LayerDef {
    /// Creates a layer definition.
    pub fn new(id: u32, name: impl Into<String>, asset: impl Into<AssetRef>) -> Self {
        Self {
            id,
            name: name.into(),
            asset: asset.into(),
        }
    }
}

/// One togglable visual layer.
///
/// Identity fields (`id`, `name`, `asset`) are immutable after catalog
/// construction; `selected` is the only mutable field and starts `false`.
/// Selection is mutated exclusively through
/// [`LayerSet`](crate::LayerSet) commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layer {
    id: u32,
    name: String,
    asset: AssetRef,
    selected: bool,
}

impl Layer {
    fn from_def(def: LayerDef) -> Self {
        Self {
            id: def.id,
            name: def.name,
            asset: def.asset,
            selected: false,
        }
    }

    /// The layer's stable unique identifier.
    pub fn id(&self) -> u32 {
        self.id
    }

    /// The layer's display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The layer's asset reference.
    pub fn asset(&self) -> &AssetRef {
        &self.asset
    }

    /// Whether the layer currently participates in the composite.
    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub(crate) fn flip(&mut self) {
        self.selected = !self.selected;
    }

    pub(crate) fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }
}

// ============================================================================
// LayerCatalog
// ============================================================================

/// The fixed, ordered collection of all layers in a session.
///
/// Cardinality and identity set are fixed at construction; no layers are
/// added or removed at runtime. Catalog position is stacking order: the
/// first layer is the back-most visual role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerCatalog {
    layers: Vec<Layer>,
}

impl LayerCatalog {
    /// Builds a catalog from layer definitions, preserving their order.
    ///
    /// All layers start unselected. Fails with [`CatalogError::DuplicateId`]
    /// if two definitions share an id.
    pub fn from_defs(defs: Vec<LayerDef>) -> Result<Self, CatalogError> {
        let mut seen = std::collections::HashSet::with_capacity(defs.len());
        for def in &defs {
            if !seen.insert(def.id) {
                return Err(CatalogError::DuplicateId(def.id));
            }
        }
        Ok(Self {
            layers: defs.into_iter().map(Layer::from_def).collect(),
        })
    }

    /// The standard five-layer portrait catalog, all unselected.
    ///
    /// Ids are assigned in catalog order, so id doubles as the z-position
    /// of a selected layer in the composite.
    pub fn standard() -> Self {
        let defs = vec![
            LayerDef::new(1, "Background", "assets/background.png"),
            LayerDef::new(2, "Base", "assets/base.png"),
            LayerDef::new(3, "Sword", "assets/sword.png"),
            LayerDef::new(4, "Helmet", "assets/helmet.png"),
            LayerDef::new(5, "Star", "assets/star.png"),
        ];
        // Ids above are literal and distinct; construction cannot fail.
        Self {
            layers: defs.into_iter().map(Layer::from_def).collect(),
        }
    }

    /// Returns the number of layers in the catalog.
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Returns true if the catalog contains no layers.
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Looks up a layer by id.
    pub fn get(&self, id: u32) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id() == id)
    }

    pub(crate) fn get_mut(&mut self, id: u32) -> Option<&mut Layer> {
        self.layers.iter_mut().find(|l| l.id() == id)
    }

    pub(crate) fn layers_mut(&mut self) -> impl Iterator<Item = &mut Layer> {
        self.layers.iter_mut()
    }

    /// Returns the layers as an ordered slice.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Iterates the layers in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &Layer> {
        self.layers.iter()
    }

    /// Splits the catalog into two display groups at `mid`.
    ///
    /// The reference view shows the first group in one panel and the
    /// remainder in another; the split point is presentation policy.
    /// `mid` is clamped to the catalog length.
    pub fn split_at(&self, mid: usize) -> (&[Layer], &[Layer]) {
        self.layers.split_at(mid.min(self.layers.len()))
    }
}

impl<'a> IntoIterator for &'a LayerCatalog {
    type Item = &'a Layer;
    type IntoIter = std::slice::Iter<'a, Layer>;

    fn into_iter(self) -> Self::IntoIter {
        self.layers.iter()
    }
}
