//! Selection commands and change notification over a layer catalog.

use crate::catalog::{Layer, LayerCatalog};
use crate::snapshot::CatalogSnapshot;

/// Callback invoked with the full catalog state after each mutation.
pub type Observer = Box<dyn FnMut(&CatalogSnapshot)>;

// ============================================================================
// Stateful Trait
// ============================================================================

/// Trait for types whose selection state can be exchanged as a
/// [`CatalogSnapshot`].
pub trait Stateful {
    /// Applies a snapshot's selection flags to this instance.
    ///
    /// Only `selected` flags are applied; layer identity (id, name, asset
    /// reference) is fixed at construction and never overwritten. Snapshot
    /// entries whose id is not in the catalog are ignored, matching the
    /// [`toggle`](LayerSet::toggle) policy for unknown ids.
    fn apply_snapshot(&mut self, snapshot: &CatalogSnapshot);

    /// Exports the current state as a snapshot.
    fn export_snapshot(&self) -> CatalogSnapshot;
}

// ============================================================================
// LayerSet
// ============================================================================

/// The portrait assembly engine.
///
/// `LayerSet` owns a fixed [`LayerCatalog`] and applies selection commands
/// against it. Each layer is a two-state machine (`off`/`on`): [`toggle`]
/// flips one layer, [`reset`] forces every layer off. Both are total; no
/// operation here returns an error.
///
/// "Preview" is the pure read [`selected_layers`], which yields the
/// selected layers in catalog order — catalog position is stacking order,
/// so the result is already the back-to-front draw sequence.
///
/// [`toggle`]: Self::toggle
/// [`reset`]: Self::reset
/// [`selected_layers`]: Self::selected_layers
///
/// # Example
///
/// ```
/// use portrait_renderer::{LayerCatalog, LayerSet};
///
/// let mut set = LayerSet::new(LayerCatalog::standard());
///
/// set.toggle(3); // Sword
/// set.toggle(1); // Background
///
/// // Catalog order, not click order
/// let names: Vec<&str> = set.selected_layers().map(|l| l.name()).collect();
/// assert_eq!(names, ["Background", "Sword"]);
///
/// set.reset();
/// assert!(!set.is_any_selected());
/// ```
pub struct LayerSet {
    catalog: LayerCatalog,
    observers: Vec<Observer>,
}

impl LayerSet {
    /// Creates a layer set over the given catalog.
    pub fn new(catalog: LayerCatalog) -> Self {
        Self {
            catalog,
            observers: Vec::new(),
        }
    }

    /// Returns the owned catalog.
    pub fn catalog(&self) -> &LayerCatalog {
        &self.catalog
    }

    /// Flips the selection flag of the layer with the given id.
    ///
    /// All other layers are untouched. An id not present in the catalog is
    /// a silent no-op: no flag changes, no notification fires, and the
    /// return value is `false`. A matching id returns `true` after the
    /// mutation and notification.
    pub fn toggle(&mut self, id: u32) -> bool {
        let Some(layer) = self.catalog.get_mut(id) else {
            return false;
        };
        layer.flip();
        self.notify();
        true
    }

    /// Clears every selection flag, regardless of prior state.
    ///
    /// Idempotent: calling it twice in a row produces the same state as
    /// once. Fires one notification per call.
    pub fn reset(&mut self) {
        for layer in self.catalog.layers_mut() {
            layer.set_selected(false);
        }
        self.notify();
    }

    /// Iterates the currently selected layers in catalog order.
    ///
    /// Pure read with no side effects and no failure mode; the order is
    /// the back-to-front stacking order for compositing.
    pub fn selected_layers(&self) -> impl Iterator<Item = &Layer> {
        self.catalog.iter().filter(|l| l.is_selected())
    }

    /// Returns true if at least one layer is selected.
    ///
    /// The view uses this to choose between the composite stack and a
    /// placeholder.
    pub fn is_any_selected(&self) -> bool {
        self.catalog.iter().any(|l| l.is_selected())
    }

    /// Captures the full current catalog state.
    pub fn snapshot(&self) -> CatalogSnapshot {
        CatalogSnapshot::of(&self.catalog)
    }

    /// Registers an observer.
    ///
    /// After every mutating operation that goes through, each observer
    /// receives the full current ordered catalog state.
    pub fn observe(&mut self, observer: impl FnMut(&CatalogSnapshot) + 'static) {
        self.observers.push(Box::new(observer));
    }

    fn notify(&mut self) {
        if self.observers.is_empty() {
            return;
        }
        let snapshot = CatalogSnapshot::of(&self.catalog);
        for observer in &mut self.observers {
            observer(&snapshot);
        }
    }
}

impl std::fmt::Debug for LayerSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayerSet")
            .field("catalog", &self.catalog)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl Stateful for LayerSet {
    fn apply_snapshot(&mut self, snapshot: &CatalogSnapshot) {
        let mut changed = false;
        for state in &snapshot.layers {
            if let Some(layer) = self.catalog.get_mut(state.id) {
                if layer.is_selected() != state.selected {
                    layer.set_selected(state.selected);
                    changed = true;
                }
            }
        }
        if changed {
            self.notify();
        }
    }

    fn export_snapshot(&self) -> CatalogSnapshot {
        self.snapshot()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::LayerState;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn standard_set() -> LayerSet {
        LayerSet::new(LayerCatalog::standard())
    }

    fn selected_names(set: &LayerSet) -> Vec<&str> {
        set.selected_layers().map(|l| l.name()).collect()
    }

    #[test]
    fn toggle_flips_exactly_one_layer() {
        let mut set = standard_set();
        let before = set.snapshot();

        assert!(set.toggle(3));

        for (prior, current) in before.layers.iter().zip(set.snapshot().layers.iter()) {
            if prior.id == 3 {
                assert_eq!(current.selected, !prior.selected);
            } else {
                assert_eq!(current.selected, prior.selected);
            }
        }
    }

    #[test]
    fn double_toggle_restores_prior_state() {
        let mut set = standard_set();
        set.toggle(2);
        set.toggle(5);
        let before = set.snapshot();

        set.toggle(4);
        set.toggle(4);

        assert_eq!(set.snapshot(), before);
    }

    #[test]
    fn selected_layers_follow_catalog_order_not_click_order() {
        let mut set = standard_set();
        set.toggle(4);
        set.toggle(1);

        let ids: Vec<u32> = set.selected_layers().map(|l| l.id()).collect();
        assert_eq!(ids, [1, 4]);
    }

    #[test]
    fn preview_and_reset_scenario() {
        let mut set = standard_set();

        set.toggle(3);
        set.toggle(1);
        assert_eq!(selected_names(&set), ["Background", "Sword"]);
        assert!(set.is_any_selected());

        set.reset();
        assert!(selected_names(&set).is_empty());
        assert!(!set.is_any_selected());
    }

    #[test]
    fn reset_is_idempotent() {
        let mut set = standard_set();
        set.toggle(1);
        set.toggle(2);

        set.reset();
        let after_once = set.snapshot();
        set.reset();
        assert_eq!(set.snapshot(), after_once);
    }

    #[test]
    fn unknown_id_is_a_silent_no_op() {
        let mut set = standard_set();
        set.toggle(2);
        let before = set.snapshot();

        assert!(!set.toggle(99));
        assert_eq!(set.snapshot(), before);
    }

    #[test]
    fn unknown_id_fires_no_notification() {
        let mut set = standard_set();
        let count = Rc::new(RefCell::new(0));
        let seen = Rc::clone(&count);
        set.observe(move |_| *seen.borrow_mut() += 1);

        set.toggle(99);
        assert_eq!(*count.borrow(), 0);

        set.toggle(1);
        assert_eq!(*count.borrow(), 1);
    }

    #[test]
    fn observers_receive_full_catalog_state() {
        let mut set = standard_set();
        let received: Rc<RefCell<Vec<CatalogSnapshot>>> = Rc::default();
        let sink = Rc::clone(&received);
        set.observe(move |snap| sink.borrow_mut().push(snap.clone()));

        set.toggle(3);
        set.reset();

        let received = received.borrow();
        assert_eq!(received.len(), 2);
        assert_eq!(received[0].layers.len(), 5);
        assert_eq!(received[0].selected_ids().collect::<Vec<_>>(), [3]);
        assert_eq!(received[1].selected_ids().count(), 0);
    }

    #[test]
    fn apply_snapshot_restores_selection_only() {
        let mut source = standard_set();
        source.toggle(1);
        source.toggle(5);
        let snapshot = source.export_snapshot();

        let mut target = standard_set();
        target.apply_snapshot(&snapshot);

        assert_eq!(
            target.selected_layers().map(|l| l.id()).collect::<Vec<_>>(),
            [1, 5]
        );
        // Identity fields are untouched
        assert_eq!(target.catalog().get(1).unwrap().name(), "Background");
    }

    #[test]
    fn apply_snapshot_ignores_unknown_ids() {
        let mut set = standard_set();
        let snapshot = CatalogSnapshot {
            layers: vec![LayerState {
                id: 42,
                name: "Ghost".into(),
                asset_ref: "ghost.png".into(),
                selected: true,
            }],
        };

        set.apply_snapshot(&snapshot);
        assert!(!set.is_any_selected());
    }
}
