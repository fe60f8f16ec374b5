//! Voronoi 图
//!
//! Voronoi 图是 Delaunay 三角剖分的对偶图：每个三角形的外心成为
//! Voronoi 顶点，绕一个点的所有三角形外心按顺序连起来就是该点的单元格。
//!
//! # 单元格模式
//!
//! 构建时根据三角剖分结果一次性决定 [`CellMode`]：
//! - [`CellMode::Standard`]：正常三角剖分，单元格由外心环构成，凸包点的单元格带两条射线
//! - [`CellMode::Collinear`]：所有点共线，没有三角形，单元格是垂直于该直线的条带
//! - [`CellMode::Solo`]：只有一个不同的点，它独占整个裁剪矩形
//!
//! # 使用示例
//! ```ignore
//! use planar_voronoi::delaunay::Voronoi;
//!
//! let voronoi = Voronoi::with_clip(&points, rect)?;
//! for i in 0..points.len() as u32 {
//!     if let Some(cell) = voronoi.clipped_polygon(i) {
//!         // 填充渲染
//!     }
//! }
//! ```

use crate::delaunay::clip::ClipRect;
use crate::delaunay::delaunay::triangulate;
use crate::delaunay::half_edge::DelaunayMesh;
use crate::delaunay::utils;
use crate::error::VoronoiError;
use egui::{Pos2, Rect, Vec2};
use std::time::Instant;

// ============================================================================
// 公开类型定义
// ============================================================================

/// 单元格计算模式，构建时决定，之后不变
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CellMode {
    /// 正常的 Delaunay 对偶
    Standard,
    /// 所有点共线，`normal` 为垂直于该直线的单位向量
    Collinear { normal: Vec2 },
    /// 只有一个不同的点
    Solo { site: u32 },
}

/// 单元格的形态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PolygonStatus {
    /// 有界多边形
    Normal,
    /// 凸包上的点，单元格向外无限延伸
    Infinite,
    /// 唯一的点占据整个平面
    Solo,
    /// 共线点集中间的点，单元格是两端无限的条带
    Collinear,
    /// 没有单元格（例如被去重的重复点）
    Error,
}

/// 未裁剪的单元格
#[derive(Debug, Clone, PartialEq)]
pub struct CellPolygon {
    /// 外心环，按逆时针（y 轴向上）排列
    pub vertices: Vec<Pos2>,
    /// 无界单元格的两条射线：`[0]` 从第一个顶点射出，`[1]` 从最后一个顶点射出
    pub rays: Option<[Vec2; 2]>,
}

/// Voronoi 图
///
/// 从 [`DelaunayMesh`] 构建，之后只读。所有单元格索引与输入点索引一致。
#[derive(Debug, Clone)]
pub struct Voronoi {
    mesh: DelaunayMesh,
    mode: CellMode,
    /// 每个三角形的外心
    circumcenters: Vec<Pos2>,
    /// 每个点的起始入边，凸包点优先取边界半边
    inedges: Vec<Option<u32>>,
    /// 点在凸包数组中的位置
    hull_index: Vec<Option<u32>>,
    /// 凸包点的两条外射线
    rays: Vec<Option<[Vec2; 2]>>,
    clip: ClipRect,
}

// ============================================================================
// 构建
// ============================================================================

impl Voronoi {
    /// 三角剖分并以点和外心的包围盒（略微外扩）作为裁剪矩形
    pub fn new(points: &[Pos2]) -> Self {
        Self::build(triangulate(points), None)
    }

    /// 三角剖分并使用给定裁剪矩形
    pub fn with_clip(points: &[Pos2], clip: Rect) -> Result<Self, VoronoiError> {
        validate_clip_rect(clip)?;
        Ok(Self::build(triangulate(points), Some(clip)))
    }

    /// 从已有的三角剖分构建
    pub fn from_mesh(mesh: DelaunayMesh, clip: Option<Rect>) -> Result<Self, VoronoiError> {
        if let Some(rect) = clip {
            validate_clip_rect(rect)?;
        }
        Ok(Self::build(mesh, clip))
    }

    fn build(mesh: DelaunayMesh, clip: Option<Rect>) -> Self {
        let start_time = Instant::now();
        let n = mesh.point_count();

        let mode = match mesh.hull() {
            [site] => CellMode::Solo { site: *site },
            [first, .., last] if mesh.is_empty() => {
                let l = mesh.points[*last as usize] - mesh.points[*first as usize];
                CellMode::Collinear {
                    normal: Vec2::new(l.y, -l.x).normalized(),
                }
            }
            _ => CellMode::Standard,
        };

        let mut hull_index = vec![None; n];
        for (k, &h) in mesh.hull().iter().enumerate() {
            hull_index[h as usize] = Some(k as u32);
        }

        let circumcenters: Vec<Pos2> = mesh.iter_triangles().map(|t| t.circumcenter()).collect();

        // 每个点的入边：边界半边优先，否则取第一条
        let mut inedges: Vec<Option<u32>> = vec![None; n];
        for e in 0..mesh.halfedge_count() as u32 {
            let p = mesh.halfedge_end(e) as usize;
            if mesh.is_boundary(e) || inedges[p].is_none() {
                inedges[p] = Some(e);
            }
        }

        // 凸包点的外射线：相邻两条凸包边各自旋转 90°
        let mut rays: Vec<Option<[Vec2; 2]>> = vec![None; n];
        if mode == CellMode::Standard {
            let hull = mesh.hull();
            for (k, &h) in hull.iter().enumerate() {
                let prev = mesh.points[hull[(k + hull.len() - 1) % hull.len()] as usize];
                let here = mesh.points[h as usize];
                let next = mesh.points[hull[(k + 1) % hull.len()] as usize];
                rays[h as usize] = Some([outward_normal(prev, here), outward_normal(here, next)]);
            }
        }

        let clip = ClipRect::new(clip.unwrap_or_else(|| bounding_rect(&mesh.points, &circumcenters)));

        log::debug!(
            "Voronoi 构建完成：{} 个单元格，模式 {:?}，裁剪矩形 {:?}，耗时 {:.2?}",
            n,
            mode,
            clip.rect(),
            start_time.elapsed()
        );

        Self {
            mesh,
            mode,
            circumcenters,
            inedges,
            hull_index,
            rays,
            clip,
        }
    }
}

/// 逐个单元格计算，原生平台用 rayon 并行
#[cfg(not(target_arch = "wasm32"))]
fn map_cells<T: Send>(n: u32, f: impl Fn(u32) -> T + Sync + Send) -> Vec<T> {
    use rayon::prelude::*;
    (0..n).into_par_iter().map(f).collect()
}

#[cfg(target_arch = "wasm32")]
fn map_cells<T>(n: u32, f: impl Fn(u32) -> T) -> Vec<T> {
    (0..n).map(f).collect()
}

/// 有向边 `v0 -> v1` 的外法向（未归一化）
#[inline]
fn outward_normal(v0: Pos2, v1: Pos2) -> Vec2 {
    Vec2::new(v0.y - v1.y, v1.x - v0.x)
}

#[inline]
fn midpoint(a: Pos2, b: Pos2) -> Pos2 {
    Pos2::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0)
}

pub(crate) fn validate_clip_rect(rect: Rect) -> Result<(), VoronoiError> {
    let (min, max) = (rect.min, rect.max);
    if min.is_finite() && max.is_finite() && min.x <= max.x && min.y <= max.y {
        Ok(())
    } else {
        Err(VoronoiError::InvalidClipRect { min, max })
    }
}

/// 所有点与外心的包围盒，按尺寸的 1e-6 外扩
///
/// 外扩保证无界单元格裁剪后仍然共享边界。
fn bounding_rect(points: &[Pos2], circumcenters: &[Pos2]) -> Rect {
    let mut min = Pos2::new(f32::INFINITY, f32::INFINITY);
    let mut max = Pos2::new(f32::NEG_INFINITY, f32::NEG_INFINITY);

    for &p in points.iter().chain(circumcenters).filter(|p| p.is_finite()) {
        min = min.min(p);
        max = max.max(p);
    }

    if min.x > max.x || min.y > max.y {
        return Rect::from_min_max(Pos2::ZERO, Pos2::ZERO);
    }

    let expand = (max - min) * 1e-6;
    Rect::from_min_max(min - expand, max + expand)
}

// ============================================================================
// 访问器
// ============================================================================

impl Voronoi {
    pub fn mesh(&self) -> &DelaunayMesh {
        &self.mesh
    }

    pub fn points(&self) -> &[Pos2] {
        self.mesh.points()
    }

    pub fn mode(&self) -> CellMode {
        self.mode
    }

    pub fn clip_rect(&self) -> Rect {
        self.clip.rect()
    }

    /// 每个三角形的外心（Voronoi 顶点）
    pub fn circumcenters(&self) -> &[Pos2] {
        &self.circumcenters
    }

    /// 每个点的起始入边
    pub fn inedges(&self) -> &[Option<u32>] {
        &self.inedges
    }

    /// 单元格数量（等于输入点数）
    pub fn cell_count(&self) -> usize {
        self.mesh.point_count()
    }

    /// 有限 Voronoi 边：每条内部 Delaunay 边对应一对外心索引
    pub fn voronoi_edges(&self) -> Vec<(u32, u32)> {
        (0..self.mesh.halfedge_count() as u32)
            .filter_map(|e| {
                let twin = self.mesh.twin(e)?;
                (e < twin).then(|| {
                    (
                        DelaunayMesh::triangle_of_halfedge(e),
                        DelaunayMesh::triangle_of_halfedge(twin),
                    )
                })
            })
            .collect()
    }
}

// ============================================================================
// 单元格多边形
// ============================================================================

impl Voronoi {
    /// 未裁剪的单元格
    ///
    /// 只在 [`CellMode::Standard`] 下有意义；没有被三角剖分的点返回 `None`。
    /// 凸包点的单元格是开放的，顶点可能少于 3 个，两端由 `rays` 延伸。
    pub fn polygon(&self, i: u32) -> Option<CellPolygon> {
        if self.mode != CellMode::Standard {
            return None;
        }

        let e0 = (*self.inedges.get(i as usize)?)?;
        let mut vertices = Vec::new();
        let mut e = e0;
        loop {
            vertices.push(self.circumcenters[DelaunayMesh::triangle_of_halfedge(e) as usize]);
            match self.mesh.twin(DelaunayMesh::next_halfedge(e)) {
                Some(twin) if twin != e0 => e = twin,
                _ => break,
            }
        }

        Some(CellPolygon {
            vertices,
            rays: self.rays[i as usize],
        })
    }

    /// 裁剪到矩形后的单元格
    ///
    /// 没有单元格或单元格完全在矩形外时返回 `None`。
    pub fn clipped_polygon(&self, i: u32) -> Option<Vec<Pos2>> {
        if i as usize >= self.cell_count() {
            return None;
        }

        let inside = |u: Pos2| self.contains(i, u);

        match self.mode {
            CellMode::Solo { site } => (i == site).then(|| self.clip.corners()),
            CellMode::Collinear { normal } => self.clip_collinear(i, normal),
            CellMode::Standard => {
                let cell = self.polygon(i)?;
                match cell.rays {
                    None => self.clip.clip_finite(&cell.vertices, &inside),
                    Some([ray_start, ray_end]) => {
                        self.clip
                            .clip_infinite(&cell.vertices, ray_start, ray_end, &inside)
                    }
                }
            }
        }
    }

    /// 所有单元格的裁剪多边形
    pub fn clipped_polygons(&self) -> Vec<Option<Vec<Pos2>>> {
        map_cells(self.cell_count() as u32, |i| self.clipped_polygon(i))
    }

    /// 共线点集的条带单元格
    fn clip_collinear(&self, i: u32, normal: Vec2) -> Option<Vec<Pos2>> {
        let hi = self.hull_index[i as usize]? as usize;
        let hull = self.mesh.hull();
        let site = |k: usize| self.mesh.points[hull[k] as usize];
        let inside = |u: Pos2| self.contains(i, u);

        // 两端的点：半无限条带
        if hi == 0 {
            let m = midpoint(site(0), site(1));
            return self.clip.clip_infinite(&[m], normal, -normal, &inside);
        }
        if hi == hull.len() - 1 {
            let m = midpoint(site(hi - 1), site(hi));
            return self.clip.clip_infinite(&[m], -normal, normal, &inside);
        }

        // 中间的点：两条平行线之间的条带
        let m1 = midpoint(site(hi - 1), site(hi));
        let m2 = midpoint(site(hi), site(hi + 1));

        let projected = [
            self.clip.project(m1, -normal),
            self.clip.project(m1, normal),
            self.clip.project(m2, normal),
            self.clip.project(m2, -normal),
        ];

        if let [Some(a), Some(b), Some(c), Some(d)] = projected {
            let mut polygon = vec![a, b, c];
            let j = polygon.len() - 1;
            let (e0, e1) = (self.clip.edge_code(b), self.clip.edge_code(c));
            self.clip.walk_corners(e0, e1, &mut polygon, j, &inside);

            polygon.push(d);
            let e0 = self.clip.edge_code(d);
            let e1 = self.clip.edge_code(polygon[0]);
            let j = polygon.len();
            self.clip.walk_corners(e0, e1, &mut polygon, j, &inside);
            return Some(polygon);
        }

        // 中点在矩形外：用足够大的四边形代替条带再裁剪
        let center = self.clip.center();
        let reach = self.clip.rect().size().length() + (m1 - center).length() + (m2 - center).length();
        let strip = [
            m1 - normal * reach,
            m1 + normal * reach,
            m2 + normal * reach,
            m2 - normal * reach,
        ];
        self.clip.clip_finite(&strip, &inside)
    }

    /// 单元格形态
    pub fn polygon_status(&self, i: u32) -> PolygonStatus {
        if i as usize >= self.cell_count() {
            return PolygonStatus::Error;
        }

        match self.mode {
            CellMode::Solo { site } if site == i => PolygonStatus::Solo,
            CellMode::Solo { .. } => PolygonStatus::Error,
            CellMode::Collinear { .. } => match self.hull_index[i as usize] {
                None => PolygonStatus::Error,
                Some(0) => PolygonStatus::Infinite,
                Some(hi) if hi as usize == self.mesh.hull().len() - 1 => PolygonStatus::Infinite,
                Some(_) => PolygonStatus::Collinear,
            },
            CellMode::Standard => {
                if self.inedges[i as usize].is_none() {
                    PolygonStatus::Error
                } else if self.rays[i as usize].is_some() {
                    PolygonStatus::Infinite
                } else {
                    PolygonStatus::Normal
                }
            }
        }
    }
}

// ============================================================================
// 邻接与点定位
// ============================================================================

impl Voronoi {
    /// 拓扑相邻的单元格（不考虑裁剪）
    ///
    /// 多于 3 个单元格交于一点的退化情况下，只共享一个顶点的单元格也会被列出。
    pub fn neighbors(&self, i: u32) -> Vec<u32> {
        let mut result = Vec::new();
        if i as usize >= self.cell_count() {
            return result;
        }

        match self.mode {
            CellMode::Solo { .. } => {}
            CellMode::Collinear { .. } => {
                if let Some(hi) = self.hull_index[i as usize] {
                    let hull = self.mesh.hull();
                    if hi > 0 {
                        result.push(hull[hi as usize - 1]);
                    }
                    if (hi as usize) < hull.len() - 1 {
                        result.push(hull[hi as usize + 1]);
                    }
                }
            }
            CellMode::Standard => {
                let Some(e0) = self.inedges[i as usize] else {
                    return result;
                };
                let mut e = e0;
                loop {
                    result.push(self.mesh.halfedge_start(e));
                    let outgoing = DelaunayMesh::next_halfedge(e);
                    debug_assert_eq!(self.mesh.halfedge_start(outgoing), i);
                    match self.mesh.twin(outgoing) {
                        Some(twin) if twin != e0 => e = twin,
                        Some(_) => break,
                        None => {
                            // 凸包点：扇形最后一条出边的终点还没有列出
                            result.push(self.mesh.halfedge_end(outgoing));
                            break;
                        }
                    }
                }
            }
        }

        result
    }

    /// 裁剪后仍共享一条边的相邻单元格
    pub fn clipped_neighbors(&self, i: u32) -> Vec<u32> {
        let Some(ci) = self.clipped_polygon(i) else {
            return Vec::new();
        };

        self.neighbors(i)
            .into_iter()
            .filter(|&j| {
                self.clipped_polygon(j)
                    .is_some_and(|cj| shares_edge(&ci, &cj))
            })
            .collect()
    }

    /// 找到离 `u` 最近的点（即包含 `u` 的单元格），不考虑裁剪
    ///
    /// 从 `start` 出发沿 Delaunay 邻接贪心前进。点集为空或 `start` 越界时返回 `None`。
    pub fn find(&self, u: Pos2, start: u32) -> Option<u32> {
        if start as usize >= self.cell_count() {
            return None;
        }

        let mut i = start;
        loop {
            let c = self.step(i, u);
            if c == i || c == start {
                return Some(c);
            }
            i = c;
        }
    }

    /// `u` 是否在单元格 `i` 内（不考虑裁剪）
    pub fn contains(&self, i: u32, u: Pos2) -> bool {
        (i as usize) < self.cell_count() && !u.any_nan() && self.step(i, u) == i
    }

    /// 返回比 `i` 更接近 `u` 的相邻点，没有则返回 `i`
    fn step(&self, i: u32, u: Pos2) -> u32 {
        let points = self.mesh.points();
        let dist = |k: u32| points[k as usize].distance_sq(u);

        match self.mode {
            CellMode::Solo { site } => site,
            CellMode::Collinear { .. } => {
                let hull = self.mesh.hull();
                let Some(hi) = self.hull_index[i as usize] else {
                    // 不在凸包上的重复点，从凸包起点重新开始
                    return hull.first().copied().unwrap_or(i);
                };
                let hi = hi as usize;

                let mut c = i;
                let mut dc = dist(i);
                let candidates = [hi.checked_sub(1), Some(hi + 1).filter(|&k| k < hull.len())];
                for k in candidates.into_iter().flatten() {
                    let t = hull[k];
                    let dt = dist(t);
                    if dt < dc {
                        dc = dt;
                        c = t;
                    }
                }
                c
            }
            CellMode::Standard => {
                let Some(e0) = self.inedges[i as usize] else {
                    // 未参与剖分的点，顺序跳到下一个点
                    return (i + 1) % self.cell_count() as u32;
                };

                let mut c = i;
                let mut dc = dist(i);
                let mut e = e0;
                loop {
                    let t = self.mesh.halfedge_start(e);
                    let dt = dist(t);
                    if dt < dc {
                        dc = dt;
                        c = t;
                    }

                    let outgoing = DelaunayMesh::next_halfedge(e);
                    match self.mesh.twin(outgoing) {
                        Some(twin) if twin != e0 => e = twin,
                        Some(_) => break,
                        None => {
                            let last = self.mesh.halfedge_end(outgoing);
                            if dist(last) < dc {
                                return last;
                            }
                            break;
                        }
                    }
                }
                c
            }
        }
    }
}

/// 两个多边形是否有一条反向共享的边（长度为零的边不算）
fn shares_edge(ci: &[Pos2], cj: &[Pos2]) -> bool {
    let (li, lj) = (ci.len(), cj.len());
    (0..li).any(|ai| {
        let (a, b) = (ci[ai], ci[(ai + 1) % li]);
        a != b && (0..lj).any(|aj| cj[aj] == a && cj[(aj + lj - 1) % lj] == b)
    })
}

// ============================================================================
// Lloyd 松弛
// ============================================================================

impl Voronoi {
    /// 每个单元格裁剪后多边形的质心，用于 Lloyd 松弛
    ///
    /// 无界单元格先被裁剪到矩形内，避免点向无穷远漂移。
    /// 没有单元格或面积退化的点保持原位。
    pub fn relaxed_points(&self) -> Vec<Pos2> {
        self.clipped_polygons()
            .into_iter()
            .zip(self.points())
            .map(|(cell, &site)| {
                cell.and_then(|polygon| Self::centroid(&polygon))
                    .unwrap_or(site)
            })
            .collect()
    }

    /// 多边形的面积加权质心；面积接近零时返回 `None`
    pub fn centroid(polygon: &[Pos2]) -> Option<Pos2> {
        utils::polygon_centroid(polygon)
    }
}
