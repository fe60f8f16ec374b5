//! Delaunay 三角剖分与 Voronoi 图模块
//!
//! 本模块提供平面点集的两个核心算法：
//! - **Delaunay 三角剖分**: 扫描凸包增量算法，输出半边网格
//! - **Voronoi 图**: Delaunay 的对偶图，支持裁剪、邻接查询、点定位与 Lloyd 松弛
//!
//! # 架构概览
//!
//! ```text
//! 输入点集 (&[Pos2])
//!        │
//!        ▼
//! ┌──────────────────┐
//! │   triangulate()  │  ── Delaunay 三角剖分
//! └────────┬─────────┘
//!          │
//!          ▼
//!   DelaunayMesh (triangles / halfedges / hull)
//!          │
//!          ▼
//! ┌──────────────────────────┐
//! │ Voronoi::from_mesh()     │  ── 外心、入边、凸包射线、裁剪矩形
//! └────────────┬─────────────┘
//!              │
//!              ▼
//!   clipped_polygon / neighbors / find / relaxed_points
//! ```
//!
//! # 使用示例
//!
//! ```ignore
//! use planar_voronoi::delaunay::{triangulate, Voronoi};
//! use egui::{Pos2, Rect};
//!
//! let points = vec![
//!     Pos2::new(0.0, 0.0),
//!     Pos2::new(100.0, 0.0),
//!     Pos2::new(50.0, 100.0),
//! ];
//!
//! let mesh = triangulate(&points);
//! let clip = Rect::from_min_max(Pos2::new(-10.0, -10.0), Pos2::new(110.0, 110.0));
//! let voronoi = Voronoi::from_mesh(mesh, Some(clip))?;
//!
//! let cell = voronoi.clipped_polygon(0);
//! let nearest = voronoi.find(Pos2::new(60.0, 40.0), 0);
//! ```
//!
//! # 模块结构
//!
//! - `predicates`: 几何谓词（`f64`）
//! - `delaunay`: 三角剖分算法实现
//! - `half_edge`: 半边网格
//! - `triangle`: 三角形数据结构
//! - `clip`: 矩形裁剪
//! - `voronoi`: Voronoi 图
//! - `relax`: Lloyd 松弛
//! - `utils`: 验证和辅助工具

mod clip;
mod delaunay;
mod half_edge;
pub mod predicates;
mod relax;
mod triangle;
pub mod utils;
mod voronoi;

#[cfg(test)]
mod tests;

// ============================================================================
// 公开 API
// ============================================================================

/// Delaunay 三角剖分函数
pub use delaunay::triangulate;

/// 半边网格
pub use half_edge::DelaunayMesh;

/// 三角形数据结构
pub use triangle::{Triangle, Triple};

/// 矩形裁剪
pub use clip::ClipRect;

/// Voronoi 图
pub use voronoi::{CellMode, CellPolygon, PolygonStatus, Voronoi};

/// Lloyd 松弛
pub use relax::{build_voronoi, relax_points, BorderRelaxation, VoronoiOptions};

/// 验证函数
pub use utils::{validate_delaunay, validate_halfedges, validate_hull};
