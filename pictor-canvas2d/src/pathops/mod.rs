//! Path geometry engine: boolean operations, stroke outlining,
//! simplification, trimming, dashing, hit testing, and SVG serialization.
//!
//! tiny-skia only rasterizes paths; the geometric path algebra the Canvas
//! API exposes on `Path2D` lives here. Curves are flattened (kurbo) to
//! polyline contours for the planar algorithms; builder verbs are kept
//! intact for serialization and bounds so curve shapes survive round trips.

mod boolean;
mod bounds;
mod flatten;
mod hit;
mod measure;
mod stroke;
mod svg;

pub use stroke::StrokeOptions;

pub(crate) use boolean::{boolean_op, resolve_region};
pub(crate) use bounds::compute_tight_bounds;
pub(crate) use flatten::{flatten_path, poly_to_path, Contour, PolyPath};
pub(crate) use hit::{point_in_path, point_in_stroke};
pub(crate) use measure::{dash_path, trim_path};
pub(crate) use stroke::stroke_path;
pub(crate) use svg::path_to_svg_string;

/// Boolean path combination operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathOp {
    /// Subtract the op path from the first path.
    Difference,
    /// Intersect the two paths.
    Intersect,
    /// Union (inclusive-or) the two paths.
    Union,
    /// Exclusive-or the two paths.
    Xor,
    /// Subtract the first path from the op path.
    ReverseDifference,
}

/// Tolerance used when flattening curves for the planar algorithms.
pub(crate) const FLATTEN_TOLERANCE: f64 = 0.05;
