#![warn(clippy::all, rust_2018_idioms)]

pub mod delaunay;
pub mod error;

pub use delaunay::{triangulate, DelaunayMesh, Voronoi, VoronoiOptions};
pub use error::VoronoiError;
