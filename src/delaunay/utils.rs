//! Delaunay 三角剖分工具函数模块
//!
//! 提供网格验证和多边形辅助计算功能。

use crate::delaunay::half_edge::DelaunayMesh;
use crate::delaunay::predicates::{coord, orient};
use egui::{Pos2, Rect};
use rand::Rng;

// ============================================================================
// 网格验证
// ============================================================================

/// 验证半边结构：对偶关系是对合，且两条半边方向相反
pub fn validate_halfedges(mesh: &DelaunayMesh) -> bool {
    (0..mesh.halfedge_count() as u32).all(|he| match mesh.twin(he) {
        None => true,
        Some(twin) => {
            mesh.twin(twin) == Some(he)
                && mesh.halfedge_start(he) == mesh.halfedge_end(twin)
                && mesh.halfedge_end(he) == mesh.halfedge_start(twin)
        }
    })
}

/// 验证三角剖分是否满足 Delaunay 性质
///
/// 对每条内部边，检查对面三角形的第三个顶点不严格位于本三角形的外接圆内。
/// 局部条件对所有内部边成立即等价于全局 Delaunay 性质。
pub fn validate_delaunay(mesh: &DelaunayMesh) -> bool {
    (0..mesh.halfedge_count() as u32).all(|he| {
        let Some(twin) = mesh.twin(he) else {
            return true;
        };
        let triangle = mesh.triangle(DelaunayMesh::triangle_of_halfedge(he));
        let opposite = mesh.points()[mesh.halfedge_start(DelaunayMesh::prev_halfedge(twin)) as usize];
        !triangle.contains_in_circumcircle(opposite)
    })
}

/// 暴力验证 Delaunay 性质：任意三角形的外接圆内不包含任何输入点
///
/// 复杂度 O(n·m)，只适合小规模点集。
pub fn validate_delaunay_brute_force(mesh: &DelaunayMesh) -> bool {
    let unique_points = deduplicate_points(mesh.points());

    mesh.iter_triangles().all(|triangle| {
        unique_points
            .iter()
            .filter(|&&p| !is_triangle_vertex(&triangle.points, p))
            .all(|&p| !triangle.contains_in_circumcircle(p))
    })
}

/// 验证凸包：没有向内的转角，且所有输入点都在凸包内或边界上
///
/// 凸包方向与三角形方向一致，因此每条凸包边 `(a, b)` 都满足 `orient(a, b, p) == false`。
pub fn validate_hull(mesh: &DelaunayMesh) -> bool {
    let hull = mesh.hull();
    if hull.len() < 3 || mesh.is_empty() {
        return true;
    }

    let points = mesh.points();
    let n = hull.len();
    (0..n).all(|k| {
        let a = coord(points[hull[k] as usize]);
        let b = coord(points[hull[(k + 1) % n] as usize]);
        let c = coord(points[hull[(k + 2) % n] as usize]);

        !orient(a, b, c) && points.iter().all(|&p| !orient(a, b, coord(p)))
    })
}

/// Graham 扫描计算严格凸包的顶点数量（共线的边界点不计入）
///
/// 与三角剖分无关的独立实现，用于交叉验证。
/// 理论上，n 个点（其中 k 个在凸包边界上）的 Delaunay 三角剖分有 `2n - 2 - k` 个三角形。
pub fn convex_hull_size(points: &[Pos2]) -> usize {
    let unique = deduplicate_points(points);
    if unique.len() < 3 {
        return unique.len();
    }

    // 找到最左下角的点作为参考点
    let mut reference = unique[0];
    for &p in &unique[1..] {
        if p.y < reference.y || (p.y == reference.y && p.x < reference.x) {
            reference = p;
        }
    }

    // 其他点按相对于参考点的极角排序，同角度按距离
    let mut others: Vec<Pos2> = unique.into_iter().filter(|&p| p != reference).collect();
    others.sort_by(|a, b| {
        let angle_a = (a.y - reference.y).atan2(a.x - reference.x);
        let angle_b = (b.y - reference.y).atan2(b.x - reference.x);
        angle_a
            .total_cmp(&angle_b)
            .then(reference.distance_sq(*a).total_cmp(&reference.distance_sq(*b)))
    });

    let mut hull = vec![reference];
    for p in others {
        while hull.len() >= 2 {
            let n = hull.len();
            let (p1, p2) = (hull[n - 2], hull[n - 1]);

            // 左转才保留
            let cross = (p2.x - p1.x) * (p.y - p1.y) - (p2.y - p1.y) * (p.x - p1.x);
            if cross > 0.0 {
                break;
            }
            hull.pop();
        }
        hull.push(p);
    }

    hull.len()
}

// ============================================================================
// 点集生成
// ============================================================================

/// 在矩形内均匀生成随机点
pub fn random_points<R: Rng>(rng: &mut R, count: usize, bounds: Rect) -> Vec<Pos2> {
    (0..count)
        .map(|_| {
            Pos2::new(
                rng.random_range(bounds.min.x..=bounds.max.x),
                rng.random_range(bounds.min.y..=bounds.max.y),
            )
        })
        .collect()
}

// ============================================================================
// 多边形
// ============================================================================

/// 有向面积（y 轴向上时逆时针为正）
pub fn polygon_area(polygon: &[Pos2]) -> f32 {
    let n = polygon.len();
    let twice: f64 = (0..n)
        .map(|i| {
            let (a, b) = (polygon[i], polygon[(i + 1) % n]);
            a.x as f64 * b.y as f64 - b.x as f64 * a.y as f64
        })
        .sum();
    (twice / 2.0) as f32
}

/// 面积加权质心（鞋带公式），面积接近零时返回 `None`
pub fn polygon_centroid(polygon: &[Pos2]) -> Option<Pos2> {
    let n = polygon.len();
    let mut twice_area = 0.0f64;
    let mut cx = 0.0f64;
    let mut cy = 0.0f64;

    for i in 0..n {
        let (a, b) = (polygon[i], polygon[(i + 1) % n]);
        let (ax, ay, bx, by) = (a.x as f64, a.y as f64, b.x as f64, b.y as f64);
        let cross = ax * by - bx * ay;
        twice_area += cross;
        cx += (ax + bx) * cross;
        cy += (ay + by) * cross;
    }

    if twice_area.abs() < 1e-7 {
        return None;
    }

    let scale = 3.0 * twice_area;
    Some(Pos2::new((cx / scale) as f32, (cy / scale) as f32))
}

// ============================================================================
// 内部辅助函数
// ============================================================================

/// 容差值，用于浮点数比较
const EPSILON: f32 = 1e-6;

/// 去除重复点
fn deduplicate_points(points: &[Pos2]) -> Vec<Pos2> {
    let mut unique_points: Vec<Pos2> = Vec::new();

    for &point in points {
        let is_duplicate = unique_points
            .iter()
            .any(|&p| (p.x - point.x).abs() < EPSILON && (p.y - point.y).abs() < EPSILON);

        if !is_duplicate {
            unique_points.push(point);
        }
    }

    unique_points
}

/// 判断点是否是三角形的顶点之一
fn is_triangle_vertex(vertices: &[Pos2; 3], point: Pos2) -> bool {
    vertices
        .iter()
        .any(|&p| (p.x - point.x).abs() < EPSILON && (p.y - point.y).abs() < EPSILON)
}
