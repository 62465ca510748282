//! portrait-renderer: composite character portrait assembly
//!
//! This crate provides the layer-selection and composite-rendering model
//! behind a character portrait builder: a fixed ordered catalog of named
//! visual layers that can be toggled on and off, previewed as a stacked
//! image, and reset.
//!
//! # Example
//!
//! ```
//! use portrait_renderer::{LayerCatalog, LayerSet};
//!
//! let mut set = LayerSet::new(LayerCatalog::standard());
//!
//! // Toggle layers on; clicking again toggles them off
//! set.toggle(3); // Sword
//! set.toggle(1); // Background
//!
//! // Preview: selected layers in catalog order (back-to-front)
//! let names: Vec<&str> = set.selected_layers().map(|l| l.name()).collect();
//! assert_eq!(names, ["Background", "Sword"]);
//! assert!(set.is_any_selected());
//!
//! // Reset clears every selection
//! set.reset();
//! assert!(!set.is_any_selected());
//! ```
//!
//! # Change Notification
//!
//! Views subscribe to the [`LayerSet`] and receive the full ordered catalog
//! state after every mutation, so a re-render needs no per-field queries:
//!
//! ```
//! use portrait_renderer::{LayerCatalog, LayerSet};
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! let mut set = LayerSet::new(LayerCatalog::standard());
//!
//! let latest = Rc::new(RefCell::new(None));
//! let sink = Rc::clone(&latest);
//! set.observe(move |snapshot| *sink.borrow_mut() = Some(snapshot.clone()));
//!
//! set.toggle(5);
//! let snapshot = latest.borrow().clone().unwrap();
//! assert_eq!(snapshot.selected_ids().collect::<Vec<_>>(), [5]);
//! ```
//!
//! # Compositing
//!
//! Stack order is deterministic: the catalog is iterated in its fixed order
//! and each selected layer draws at a z-position equal to its id. Asset
//! resolution (turning an [`AssetRef`] into pixels) lives behind the
//! [`AssetResolver`] seam; [`Compositor`] alpha-blends the resolved images
//! back-to-front and caches the result per selection and canvas size. See
//! the [`Compositor`] docs for a full rendering example.

mod catalog;
mod compose;
mod layer_set;
mod snapshot;

pub use catalog::{AssetRef, CatalogError, Layer, LayerCatalog, LayerDef};
pub use compose::{
    composite_over, AssetResolver, Compositor, FileResolver, FnResolver, SizePx, StackEntry,
    StackPlan,
};
pub use layer_set::{LayerSet, Observer, Stateful};
pub use snapshot::{CatalogSnapshot, LayerState};
