//! **Constructive Solid Geometry (CSG)** on polygon soups, built around Boolean
//! operations (*union*, *difference*, *intersection*, *merge*) on polygons stored in
//! [BSP](mesh::bsp) trees.
//!
//! Every operation takes an explicit [`GeometryEnvironment`] carrying the precision
//! mode, tolerances and the BSP depth limit. Degenerate geometry is dropped or repaired
//! locally and reported through the `log` facade and [`BooleanReport`]; only misuse of
//! the API returns a [`CsgError`].
//!
//! ```
//! use bspcsg::{GeometryEnvironment, Mesh, mesh::boolean::BooleanOp, traits::CSGOps};
//!
//! let env = GeometryEnvironment::default();
//! let a = Mesh::cube(1.0, 0);
//! let b = Mesh::cube(1.0, 1).translate(0.5, 0.5, 0.5);
//!
//! let (union, report) = a.boolean(BooleanOp::Union, &b, &env).unwrap();
//! assert!(report.is_valid());
//! assert_eq!(union.bounding_box().maxs.x, 1.5);
//! ```
//!
//! # Features
//! #### Default
//! - **f64**: use f64 as Real
//! - **hashmap**: enables use of hashbrown for `is_manifold`
//!
//! #### Optional
//! - **f32**: use f32 as Real, this conflicts with f64
//! - **parallel**: use rayon to evaluate batches of Boolean operations

#![forbid(unsafe_code)]
#![warn(clippy::missing_const_for_fn, clippy::approx_constant, clippy::all)]

pub mod environment;
pub mod errors;
pub mod float_types;
pub mod mesh;
pub mod scratch;
pub mod traits;

#[cfg(any(all(feature = "f64", feature = "f32"), not(any(feature = "f64", feature = "f32"))))]
compile_error!("Either 'f64' or 'f32' feature must be specified, but not both");

pub use environment::{DebugFlags, GeometryEnvironment, Precision, Tolerances};
pub use errors::CsgError;
pub use mesh::Mesh;
pub use mesh::boolean::{BooleanEngine, BooleanOp, BooleanReport, BooleanResult};
pub use mesh::bsp::{Node, TreeStatus};
pub use mesh::plane::Plane;
pub use mesh::polygon::Polygon;
pub use mesh::vertex::Vertex;
