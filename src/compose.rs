//! Stack-order derivation and composite rendering.
//!
//! The visual stack is built by iterating the catalog in its fixed order
//! and, for each selected layer, drawing its asset at a z-position equal to
//! its id. Ids are assigned in catalog order, so this is exactly
//! "draw selected layers back-to-front in catalog order": there is no
//! independent z-index concept, and ids being unique integers guarantees a
//! total order with no ties.
//!
//! Turning an [`AssetRef`] into pixels is the caller's side of the
//! [`AssetResolver`] seam; the model itself never reads asset contents.

use std::collections::HashMap;
use std::path::PathBuf;

use image::{imageops, Rgba, RgbaImage};

use crate::catalog::{AssetRef, LayerCatalog};

// ============================================================================
// SizePx
// ============================================================================

/// A 2D size in pixel units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SizePx {
    pub width: u32,
    pub height: u32,
}

impl SizePx {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Returns true if width equals height.
    pub fn is_square(&self) -> bool {
        self.width == self.height
    }
}

// ============================================================================
// Stack Plan
// ============================================================================

/// One selected layer's slot in the composite stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackEntry {
    /// Z-position in the stack, equal to the layer's id.
    pub z: u32,
    /// Display name of the contributing layer.
    pub name: String,
    /// Asset to draw at this position.
    pub asset: AssetRef,
}

/// The deterministic back-to-front draw sequence for the current selection.
///
/// Entries appear in catalog order with `z` equal to the layer id; a view
/// that manages its own drawing (e.g. absolutely-positioned elements) can
/// consume the plan directly instead of using [`Compositor`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StackPlan {
    entries: Vec<StackEntry>,
}

impl StackPlan {
    /// Derives the stack plan from a catalog's current selection.
    pub fn for_catalog(catalog: &LayerCatalog) -> Self {
        Self {
            entries: catalog
                .iter()
                .filter(|l| l.is_selected())
                .map(|l| StackEntry {
                    z: l.id(),
                    name: l.name().to_string(),
                    asset: l.asset().clone(),
                })
                .collect(),
        }
    }

    /// Returns the entries back-to-front.
    pub fn entries(&self) -> &[StackEntry] {
        &self.entries
    }

    /// Returns the number of layers in the stack.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no layer is selected.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a StackPlan {
    type Item = &'a StackEntry;
    type IntoIter = std::slice::Iter<'a, StackEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

// ============================================================================
// Asset Resolution
// ============================================================================

/// Resolves an opaque [`AssetRef`] into pixels at a requested canvas size.
///
/// Resolution failure is reported as `None`; the compositor skips the layer
/// so one missing asset cannot poison the rest of the stack.
pub trait AssetResolver {
    fn resolve(&mut self, asset: &AssetRef, size: SizePx) -> Option<RgbaImage>;
}

/// Adapts a closure into an [`AssetResolver`].
///
/// Handy for tests and for views that already have an asset lookup
/// function.
pub struct FnResolver<F>(pub F);

impl<F> AssetResolver for FnResolver<F>
where
    F: FnMut(&AssetRef, SizePx) -> Option<RgbaImage>,
{
    fn resolve(&mut self, asset: &AssetRef, size: SizePx) -> Option<RgbaImage> {
        (self.0)(asset, size)
    }
}

/// Resolves asset references as image files relative to a root directory.
///
/// Loaded images are scaled to fit within the requested canvas while
/// preserving aspect ratio, mirroring how the reference view letterboxes
/// each layer image into its square preview.
#[derive(Debug, Clone)]
pub struct FileResolver {
    root: PathBuf,
}

impl FileResolver {
    /// Creates a resolver rooted at the given directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl AssetResolver for FileResolver {
    fn resolve(&mut self, asset: &AssetRef, size: SizePx) -> Option<RgbaImage> {
        let img = image::open(self.root.join(asset.as_str())).ok()?.to_rgba8();
        Some(scale_to_fit(&img, size))
    }
}

/// Scales an image to fit within `size`, preserving aspect ratio.
fn scale_to_fit(img: &RgbaImage, size: SizePx) -> RgbaImage {
    if img.width() == 0 || img.height() == 0 || size.width == 0 || size.height == 0 {
        return img.clone();
    }
    let scale = (size.width as f32 / img.width() as f32)
        .min(size.height as f32 / img.height() as f32);
    let width = ((img.width() as f32 * scale).round() as u32).max(1);
    let height = ((img.height() as f32 * scale).round() as u32).max(1);
    if width == img.width() && height == img.height() {
        return img.clone();
    }
    imageops::resize(img, width, height, imageops::FilterType::Lanczos3)
}

// ============================================================================
// CacheKey
// ============================================================================

/// Key for cached composites: the selected ids in catalog order plus the
/// canvas dimensions. Identical selections at the same size render the same
/// image, so the key fully captures the output.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    selected: Vec<u32>,
    width: u32,
    height: u32,
}

impl CacheKey {
    fn new(catalog: &LayerCatalog, size: SizePx) -> Self {
        Self {
            selected: catalog
                .iter()
                .filter(|l| l.is_selected())
                .map(|l| l.id())
                .collect(),
            width: size.width,
            height: size.height,
        }
    }
}

// ============================================================================
// Compositor
// ============================================================================

/// Renders the selected layers of a catalog into a single RGBA image.
///
/// Composites are cached by selection and canvas size, so re-rendering the
/// same preview is a lookup rather than a resolve-and-blend pass.
///
/// # Example
///
/// ```
/// use image::{Rgba, RgbaImage};
/// use portrait_renderer::{AssetRef, Compositor, FnResolver, LayerCatalog, LayerSet, SizePx};
///
/// let mut set = LayerSet::new(LayerCatalog::standard());
/// set.toggle(1);
/// set.toggle(3);
///
/// let mut resolver = FnResolver(|_: &AssetRef, size: SizePx| {
///     Some(RgbaImage::from_pixel(size.width, size.height, Rgba([0, 0, 255, 255])))
/// });
///
/// let mut compositor = Compositor::new();
/// let preview = compositor
///     .render(set.catalog(), SizePx::new(64, 64), &mut resolver)
///     .unwrap();
/// assert_eq!(preview.get_pixel(0, 0).0, [0, 0, 255, 255]);
/// ```
#[derive(Default)]
pub struct Compositor {
    cache: HashMap<CacheKey, RgbaImage>,
}

impl Compositor {
    /// Creates a compositor with an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Renders the current selection onto a transparent canvas of the
    /// given size.
    ///
    /// Selected layers are resolved through `resolver` and alpha-blended
    /// back-to-front in catalog order, each centered on the canvas. Layers
    /// whose asset fails to resolve are skipped. Returns `None` when no
    /// layer is selected (the caller shows its placeholder instead).
    pub fn render(
        &mut self,
        catalog: &LayerCatalog,
        size: SizePx,
        resolver: &mut dyn AssetResolver,
    ) -> Option<RgbaImage> {
        if !catalog.iter().any(|l| l.is_selected()) {
            return None;
        }

        let key = CacheKey::new(catalog, size);
        if let Some(cached) = self.cache.get(&key) {
            return Some(cached.clone());
        }

        let mut canvas = RgbaImage::new(size.width, size.height);
        for layer in catalog.iter().filter(|l| l.is_selected()) {
            let Some(img) = resolver.resolve(layer.asset(), size) else {
                continue;
            };
            let x = (size.width as i32 - img.width() as i32) / 2;
            let y = (size.height as i32 - img.height() as i32) / 2;
            composite_over(&mut canvas, &img, x, y);
        }

        self.cache.insert(key, canvas.clone());
        Some(canvas)
    }

    /// Drops all cached composites.
    pub fn invalidate(&mut self) {
        self.cache.clear();
    }
}

// ============================================================================
// Compositing
// ============================================================================

/// Composites a source image onto a destination at the given position.
///
/// Uses standard alpha blending (source over destination). Source pixels
/// falling outside the destination bounds are clipped.
pub fn composite_over(dest: &mut RgbaImage, src: &RgbaImage, x: i32, y: i32) {
    let (dest_width, dest_height) = (dest.width() as i32, dest.height() as i32);

    for (sx, sy, src_pixel) in src.enumerate_pixels() {
        let dx = x + sx as i32;
        let dy = y + sy as i32;
        if dx < 0 || dy < 0 || dx >= dest_width || dy >= dest_height {
            continue;
        }

        let dst_pixel = dest.get_pixel(dx as u32, dy as u32);
        let blended = blend_over(*src_pixel, *dst_pixel);
        dest.put_pixel(dx as u32, dy as u32, blended);
    }
}

/// Source-over blend of two straight-alpha RGBA pixels.
fn blend_over(src: Rgba<u8>, dst: Rgba<u8>) -> Rgba<u8> {
    let sa = src[3] as f32 / 255.0;
    let da = dst[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);

    if out_a == 0.0 {
        return Rgba([0, 0, 0, 0]);
    }

    let channel = |s: u8, d: u8| -> u8 {
        let sf = s as f32 / 255.0;
        let df = d as f32 / 255.0;
        (((sf * sa + df * da * (1.0 - sa)) / out_a) * 255.0).round() as u8
    };

    Rgba([
        channel(src[0], dst[0]),
        channel(src[1], dst[1]),
        channel(src[2], dst[2]),
        (out_a * 255.0).round() as u8,
    ])
}

// ============================================================================
// Tests
// ============================================================================
