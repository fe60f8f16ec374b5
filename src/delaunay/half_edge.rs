//! 半边数据结构 (Half-Edge / DCEL)
//!
//! 本模块提供三角剖分结果的拓扑表示，支持：
//! - O(1) 邻接三角形查询
//! - O(k) 顶点周围遍历（k = 相邻边数）
//! - Voronoi 单元格顶点自然有序
//!
//! # 核心概念
//!
//! 半边数据结构将每条边拆分为两个有方向的"半边"：
//!
//! ```text
//!        传统边                    半边表示
//!
//!     A ←──────→ B           A ─────→ B   (半边 e1)
//!                            A ←───── B   (半边 e2，e1 的 twin)
//! ```
//!
//! # 存储布局
//!
//! - `triangles[i]` = 半边 i 的起点
//! - `halfedges[i]` = 半边 i 的对偶半边（twin），凸包边界上为 `None`
//! - 三角形 t 的三条半边索引为 `3*t`, `3*t+1`, `3*t+2`

use crate::delaunay::triangle::{Triangle, Triple};
use egui::Pos2;
use serde::{Deserialize, Serialize};

// ============================================================================
// 核心数据结构
// ============================================================================

/// Delaunay 网格（半边表示）
///
/// 由 [`triangulate`](super::triangulate) 一次性构建，之后只读。
///
/// 全部点共线（或不足 3 个不同点）时 `triangles` 为空，
/// `hull` 按投影坐标顺序列出去重后的点。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DelaunayMesh {
    /// 所有顶点坐标（与输入顺序一致）
    pub(crate) points: Vec<Pos2>,

    /// 三角形顶点索引：triangles[i] 是半边 i 的起点
    /// 每3个连续索引构成一个三角形
    pub(crate) triangles: Vec<u32>,

    /// 半边数组：halfedges[i] 存储半边 i 的对偶半边索引
    pub(crate) halfedges: Vec<Option<u32>>,

    /// 凸包顶点索引
    pub(crate) hull: Vec<u32>,
}

impl DelaunayMesh {
    // ========================================================================
    // 基本查询
    // ========================================================================

    /// 所有顶点坐标
    pub fn points(&self) -> &[Pos2] {
        &self.points
    }

    /// 每个半边的起点
    pub fn triangles(&self) -> &[u32] {
        &self.triangles
    }

    /// 每个半边的对偶半边
    pub fn halfedges(&self) -> &[Option<u32>] {
        &self.halfedges
    }

    /// 凸包顶点索引
    pub fn hull(&self) -> &[u32] {
        &self.hull
    }

    /// 获取三角形数量
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len() / 3
    }

    /// 获取半边数量
    #[inline]
    pub fn halfedge_count(&self) -> usize {
        self.triangles.len()
    }

    /// 获取顶点数量
    #[inline]
    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    /// 没有生成任何三角形（退化输入）
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// 获取半边的起点索引
    #[inline]
    pub fn halfedge_start(&self, he: u32) -> u32 {
        self.triangles[he as usize]
    }

    /// 获取半边的终点索引
    #[inline]
    pub fn halfedge_end(&self, he: u32) -> u32 {
        self.triangles[Self::next_halfedge(he) as usize]
    }

    /// 获取半边的对偶半边
    #[inline]
    pub fn twin(&self, he: u32) -> Option<u32> {
        self.halfedges[he as usize]
    }

    /// 获取同一三角形内的下一条半边
    #[inline]
    pub fn next_halfedge(he: u32) -> u32 {
        if he % 3 == 2 {
            he - 2
        } else {
            he + 1
        }
    }

    /// 获取同一三角形内的上一条半边
    #[inline]
    pub fn prev_halfedge(he: u32) -> u32 {
        if he % 3 == 0 {
            he + 2
        } else {
            he - 1
        }
    }

    /// 获取半边所属的三角形索引
    #[inline]
    pub fn triangle_of_halfedge(he: u32) -> u32 {
        he / 3
    }

    /// 三角形的三条半边
    #[inline]
    pub fn halfedges_of_triangle(tri: u32) -> Triple<u32> {
        Triple(3 * tri, 3 * tri + 1, 3 * tri + 2)
    }

    /// 检查半边是否在凸包边界上
    #[inline]
    pub fn is_boundary(&self, he: u32) -> bool {
        self.halfedges[he as usize].is_none()
    }

    // ========================================================================
    // 三角形操作
    // ========================================================================

    /// 获取三角形的三个顶点索引
    pub fn triangle_vertices(&self, tri: u32) -> Triple<u32> {
        Self::halfedges_of_triangle(tri).map(|he| self.triangles[he as usize])
    }

    /// 获取三角形的三个顶点坐标
    pub fn triangle_points(&self, tri: u32) -> Triple<Pos2> {
        self.triangle_vertices(tri)
            .map(|i| self.points[i as usize])
    }

    /// 获取带编号的三角形
    pub fn triangle(&self, tri: u32) -> Triangle {
        Triangle::with_index(tri, self.triangle_points(tri).into_array())
    }

    /// 按编号顺序遍历所有三角形
    pub fn iter_triangles(&self) -> impl Iterator<Item = Triangle> + '_ {
        (0..self.triangle_count() as u32).map(|tri| self.triangle(tri))
    }

    /// 计算三角形的外心（Voronoi 顶点）
    pub fn circumcenter(&self, tri: u32) -> Pos2 {
        self.triangle(tri).circumcenter()
    }

    /// 计算三角形的重心
    pub fn centroid(&self, tri: u32) -> Pos2 {
        self.triangle(tri).centroid()
    }

    /// 获取三角形的邻接三角形
    ///
    /// 返回与该三角形共享边的三角形索引列表（最多3个）
    pub fn adjacent_triangles(&self, tri: u32) -> Vec<u32> {
        Self::halfedges_of_triangle(tri)
            .into_iter()
            .filter_map(|he| self.twin(he))
            .map(Self::triangle_of_halfedge)
            .collect()
    }

    // ========================================================================
    // 边与凸包
    // ========================================================================

    /// 半边两端的坐标
    pub fn edge(&self, he: u32) -> (Pos2, Pos2) {
        (
            self.points[self.halfedge_start(he) as usize],
            self.points[self.halfedge_end(he) as usize],
        )
    }

    /// 遍历所有无向边，每条边只出现一次
    ///
    /// 内部边取索引较大的那条半边，边界边直接取唯一的半边。
    pub fn edges(&self) -> impl Iterator<Item = (Pos2, Pos2)> + '_ {
        (0..self.halfedge_count() as u32)
            .filter(|&he| self.twin(he).is_none_or(|twin| he > twin))
            .map(|he| self.edge(he))
    }

    /// 凸包顶点坐标
    pub fn hull_points(&self) -> impl Iterator<Item = Pos2> + '_ {
        self.hull.iter().map(|&i| self.points[i as usize])
    }

    /// 凸包边（包含首尾相连的闭合边）
    ///
    /// 共线退化情况下同样首尾相连。
    pub fn hull_edges(&self) -> Vec<(Pos2, Pos2)> {
        let n = self.hull.len();
        if n < 2 {
            return Vec::new();
        }
        (0..n)
            .map(|k| {
                (
                    self.points[self.hull[k] as usize],
                    self.points[self.hull[(k + 1) % n] as usize],
                )
            })
            .collect()
    }

    // ========================================================================
    // 顶点周围遍历
    // ========================================================================

    /// 遍历与给定半边终点相同的所有入边
    ///
    /// 从 `he` 开始，依次取 `next` 再取 `twin`，直到回到起点或遇到边界。
    /// 若 `he` 是终点处的边界入边，则得到该点全部入边。
    pub fn edges_around_point(&self, he: u32) -> Vec<u32> {
        let mut edges = Vec::new();
        let mut incoming = he;

        loop {
            edges.push(incoming);
            let outgoing = Self::next_halfedge(incoming);
            match self.twin(outgoing) {
                Some(twin) if twin != he => incoming = twin,
                _ => break,
            }
        }

        edges
    }

    /// 生成 Delaunay 三角形的边索引（用于线框渲染）
    ///
    /// 返回边索引列表，每2个索引构成一条边。
    pub fn edge_indices(&self) -> Vec<u32> {
        let mut edges = Vec::with_capacity(self.halfedge_count());

        for he in 0..self.halfedge_count() as u32 {
            if self.twin(he).is_some_and(|twin| twin < he) {
                continue;
            }

            edges.push(self.halfedge_start(he));
            edges.push(self.halfedge_end(he));
        }

        edges
    }
}

// ============================================================================
// 测试
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delaunay::triangulate;

    fn create_test_mesh() -> DelaunayMesh {
        // 创建一个简单的正方形点集
        let points = vec![
            Pos2::new(0.0, 0.0),
            Pos2::new(10.0, 0.0),
            Pos2::new(10.0, 10.0),
            Pos2::new(0.0, 10.0),
        ];

        triangulate(&points)
    }

    #[test]
    fn test_mesh_creation() {
        let mesh = create_test_mesh();

        assert_eq!(mesh.point_count(), 4);
        assert_eq!(mesh.triangle_count(), 2); // 正方形分成2个三角形
        assert_eq!(mesh.halfedge_count(), 6); // 2 个三角形 × 3 条边
        assert_eq!(mesh.hull().len(), 4);
    }

    #[test]
    fn test_halfedge_navigation() {
        // 测试 next_halfedge
        assert_eq!(DelaunayMesh::next_halfedge(0), 1);
        assert_eq!(DelaunayMesh::next_halfedge(1), 2);
        assert_eq!(DelaunayMesh::next_halfedge(2), 0);
        assert_eq!(DelaunayMesh::next_halfedge(3), 4);

        // 测试 prev_halfedge
        assert_eq!(DelaunayMesh::prev_halfedge(0), 2);
        assert_eq!(DelaunayMesh::prev_halfedge(1), 0);
        assert_eq!(DelaunayMesh::prev_halfedge(2), 1);

        assert_eq!(DelaunayMesh::halfedges_of_triangle(2), Triple(6, 7, 8));
    }

    #[test]
    fn test_triangle_of_halfedge() {
        assert_eq!(DelaunayMesh::triangle_of_halfedge(0), 0);
        assert_eq!(DelaunayMesh::triangle_of_halfedge(2), 0);
        assert_eq!(DelaunayMesh::triangle_of_halfedge(3), 1);
        assert_eq!(DelaunayMesh::triangle_of_halfedge(5), 1);
    }

    #[test]
    fn test_twin_is_involution() {
        let mesh = create_test_mesh();

        let internal: Vec<u32> = (0..mesh.halfedge_count() as u32)
            .filter(|&he| !mesh.is_boundary(he))
            .collect();
        // 正方形只有一条对角线
        assert_eq!(internal.len(), 2);

        for he in internal {
            let twin = mesh.twin(he).unwrap();
            assert_eq!(mesh.twin(twin), Some(he));
            assert_eq!(mesh.halfedge_start(he), mesh.halfedge_end(twin));
            assert_eq!(mesh.halfedge_end(he), mesh.halfedge_start(twin));
        }
    }

    #[test]
    fn test_adjacent_triangles() {
        let mesh = create_test_mesh();
        assert_eq!(mesh.adjacent_triangles(0), vec![1]);
        assert_eq!(mesh.adjacent_triangles(1), vec![0]);
    }

    #[test]
    fn test_edges_and_hull_edges() {
        let mesh = create_test_mesh();

        // 4 条外边 + 1 条对角线
        assert_eq!(mesh.edges().count(), 5);
        assert_eq!(mesh.edge_indices().len(), 10);
        assert_eq!(mesh.hull_edges().len(), 4);
        assert_eq!(mesh.hull_points().count(), 4);
    }

    #[test]
    fn test_edges_around_point() {
        let mesh = create_test_mesh();

        // 从边界入边出发可以绕完整个扇形
        for he in 0..mesh.halfedge_count() as u32 {
            if !mesh.is_boundary(he) {
                continue;
            }
            let end = mesh.halfedge_end(he);
            let edges = mesh.edges_around_point(he);
            assert!(!edges.is_empty());
            for &e in &edges {
                assert_eq!(mesh.halfedge_end(e), end, "半边 {} 的终点应该是 {}", e, end);
            }
        }
    }

    #[test]
    fn test_larger_mesh() {
        // 创建更大的测试网格
        let mut points = Vec::new();
        for i in 0..5 {
            for j in 0..5 {
                points.push(Pos2::new(i as f32 * 10.0 + j as f32 * 0.1, j as f32 * 10.0));
            }
        }

        let mesh = triangulate(&points);
        assert_eq!(mesh.point_count(), 25);
        assert!(mesh.triangle_count() > 0);

        // 每个三角形的外心都是有限值
        for tri in 0..mesh.triangle_count() as u32 {
            let c = mesh.circumcenter(tri);
            assert!(c.x.is_finite() && c.y.is_finite(), "三角形 {} 外心无效", tri);
            assert_eq!(mesh.triangle(tri).index, Some(tri));
        }
        assert_eq!(mesh.iter_triangles().count(), mesh.triangle_count());
    }
}
