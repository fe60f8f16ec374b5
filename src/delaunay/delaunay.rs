//! 增量式 Delaunay 三角剖分
//!
//! 扫描凸包（sweep-hull）算法：
//! 1. 以包围盒中心附近的点为种子，选出外接圆最小的种子三角形
//! 2. 其余点按到种子外心的距离排序，由近及远逐个插入
//! 3. 每个新点与可见的凸包边相连形成新三角形，再通过翻转边恢复 Delaunay 性质
//!
//! 凸包用双向链表维护，并用按伪角度分桶的哈希表加速可见边查找，
//! 期望复杂度 O(n log n)。

use crate::delaunay::half_edge::DelaunayMesh;
use crate::delaunay::predicates::{
    circumcenter, circumradius, coord, dist2, in_circle, orient, pseudo_angle, Coord, EPSILON,
};
use egui::Pos2;
use std::time::Instant;

/// 构建期间表示"无对偶半边"的标记
const EMPTY: u32 = u32::MAX;

/// 执行 Delaunay 三角剖分
///
/// 任何输入都不会失败：
/// - 0/1/2 个点或全部共线时，`triangles` 为空，`hull` 为按主轴投影排序、去重后的点
/// - 近重复点（两个坐标差都不超过 [`EPSILON`]）只保留一个参与剖分
pub fn triangulate(points: &[Pos2]) -> DelaunayMesh {
    let start_time = Instant::now();
    let coords: Vec<Coord> = points.iter().map(|&p| coord(p)).collect();

    let Some((i0, i1, i2)) = find_seed_triangle(&coords) else {
        let hull = collinear_hull(&coords);
        log::debug!(
            "三角剖分退化：{} 个点共线或不足 3 个不同点，凸包 {} 个点",
            points.len(),
            hull.len()
        );
        return DelaunayMesh {
            points: points.to_vec(),
            triangles: Vec::new(),
            halfedges: Vec::new(),
            hull,
        };
    };

    let n = coords.len();
    let center = circumcenter(coords[i0 as usize], coords[i1 as usize], coords[i2 as usize]);

    // 按到种子外心的距离排序
    let mut ids: Vec<u32> = (0..n as u32).collect();
    let dists: Vec<f64> = coords.iter().map(|&p| dist2(p, center)).collect();
    ids.sort_unstable_by(|&a, &b| dists[a as usize].total_cmp(&dists[b as usize]));

    let mut builder = Builder::new(n);
    let mut hull = Hull::new(n, center, [i0, i1, i2], &coords);
    builder.add_triangle(i0, i1, i2, EMPTY, EMPTY, EMPTY);

    let mut prev: Option<Coord> = None;
    for &i in &ids {
        let p = coords[i as usize];

        // 跳过近重复点
        if prev.is_some_and(|q| is_near_duplicate(p, q)) {
            continue;
        }
        prev = Some(p);

        // 跳过种子三角形顶点
        if i == i0 || i == i1 || i == i2 {
            continue;
        }

        // 通过哈希表找到一条可见的凸包边
        let Some((mut e, walk_back)) = hull.find_visible_edge(p, &coords) else {
            // 大概率是近重复点，跳过
            continue;
        };

        // 新点与可见边构成第一个三角形
        let t = builder.add_triangle(
            e,
            i,
            hull.next[e as usize],
            EMPTY,
            EMPTY,
            hull.tri[e as usize],
        );

        // 递归翻转直到满足 Delaunay 条件
        hull.tri[i as usize] = builder.legalize(t + 2, &coords, &mut hull);
        hull.tri[e as usize] = t;

        // 向前沿凸包添加三角形
        let mut next = hull.next[e as usize];
        loop {
            let q = hull.next[next as usize];
            if !orient(p, coords[next as usize], coords[q as usize]) {
                break;
            }
            let t = builder.add_triangle(
                next,
                i,
                q,
                hull.tri[i as usize],
                EMPTY,
                hull.tri[next as usize],
            );
            hull.tri[i as usize] = builder.legalize(t + 2, &coords, &mut hull);
            hull.remove(next);
            next = q;
        }

        // 可见边是凸包起点时，还需要向后添加三角形
        if walk_back {
            loop {
                let q = hull.prev[e as usize];
                if !orient(p, coords[q as usize], coords[e as usize]) {
                    break;
                }
                let t = builder.add_triangle(
                    q,
                    i,
                    e,
                    EMPTY,
                    hull.tri[e as usize],
                    hull.tri[q as usize],
                );
                builder.legalize(t + 2, &coords, &mut hull);
                hull.tri[q as usize] = t;
                hull.remove(e);
                e = q;
            }
        }

        // 把新点接入凸包链表
        hull.insert(e, i, next);

        // 更新哈希表
        hull.hash_point(p, i);
        hull.hash_point(coords[e as usize], e);
    }

    let hull = hull.into_vec();
    let mesh = builder.finish(points.to_vec(), hull);

    log::debug!(
        "三角剖分完成：{} 个点，{} 个三角形，凸包 {} 个点，耗时 {:.2?}",
        points.len(),
        mesh.triangle_count(),
        mesh.hull().len(),
        start_time.elapsed()
    );

    mesh
}

// ============================================================================
// 种子选择与退化处理
// ============================================================================

#[inline]
fn is_near_duplicate(p: Coord, q: Coord) -> bool {
    (p[0] - q[0]).abs() <= EPSILON && (p[1] - q[1]).abs() <= EPSILON
}

/// 包围盒中心
fn bbox_center(coords: &[Coord]) -> Coord {
    let mut min = [f64::INFINITY; 2];
    let mut max = [f64::NEG_INFINITY; 2];

    for p in coords {
        min[0] = min[0].min(p[0]);
        min[1] = min[1].min(p[1]);
        max[0] = max[0].max(p[0]);
        max[1] = max[1].max(p[1]);
    }

    [(min[0] + max[0]) / 2.0, (min[1] + max[1]) / 2.0]
}

/// 距 `target` 最近的点，`skip` 指定的点和重合点不参与
fn find_closest_point(coords: &[Coord], target: Coord, skip: Option<u32>) -> Option<u32> {
    let mut min_dist = f64::INFINITY;
    let mut closest = None;

    for (i, &p) in coords.iter().enumerate() {
        if Some(i as u32) == skip {
            continue;
        }
        let d = dist2(target, p);
        if skip.is_some() && d <= 0.0 {
            continue;
        }
        if d < min_dist {
            closest = Some(i as u32);
            min_dist = d;
        }
    }

    closest
}

/// 选择种子三角形，返回的三个顶点满足 `orient == false`
///
/// 找不到有限外接圆时（不足 3 个不同点或全部共线）返回 `None`。
fn find_seed_triangle(coords: &[Coord]) -> Option<(u32, u32, u32)> {
    // 离包围盒中心最近的点
    let i0 = find_closest_point(coords, bbox_center(coords), None)?;
    let p0 = coords[i0 as usize];

    // 离种子最近的点
    let i1 = find_closest_point(coords, p0, Some(i0))?;
    let p1 = coords[i1 as usize];

    // 与前两点构成最小外接圆的第三个点
    let mut min_radius = f64::INFINITY;
    let mut i2 = None;
    for (i, &p) in coords.iter().enumerate() {
        let i = i as u32;
        if i == i0 || i == i1 {
            continue;
        }
        let r = circumradius(p0, p1, p);
        if r < min_radius {
            i2 = Some(i);
            min_radius = r;
        }
    }
    let i2 = i2?;

    if orient(p0, p1, coords[i2 as usize]) {
        Some((i0, i2, i1))
    } else {
        Some((i0, i1, i2))
    }
}

/// 退化情况：按 x 差（x 全相同则按 y 差）排序，去掉投影不严格递增的点
fn collinear_hull(coords: &[Coord]) -> Vec<u32> {
    let Some(&[x0, y0]) = coords.first() else {
        return Vec::new();
    };

    let projections: Vec<f64> = coords
        .iter()
        .map(|p| {
            let dx = p[0] - x0;
            if dx == 0.0 {
                p[1] - y0
            } else {
                dx
            }
        })
        .collect();

    let mut ids: Vec<u32> = (0..coords.len() as u32).collect();
    ids.sort_by(|&a, &b| projections[a as usize].total_cmp(&projections[b as usize]));

    let mut hull = Vec::with_capacity(ids.len());
    let mut last = f64::NEG_INFINITY;
    for id in ids {
        let d = projections[id as usize];
        if d > last {
            hull.push(id);
            last = d;
        }
    }

    hull
}

// ============================================================================
// 三角形缓冲区
// ============================================================================

/// 构建中的三角形与半边数组
struct Builder {
    triangles: Vec<u32>,
    halfedges: Vec<u32>,
    /// 翻转待检查的边，容量不设上限
    edge_stack: Vec<u32>,
}

impl Builder {
    fn new(n: usize) -> Self {
        let max_triangles = (2 * n).saturating_sub(5);
        Self {
            triangles: Vec::with_capacity(max_triangles * 3),
            halfedges: Vec::with_capacity(max_triangles * 3),
            edge_stack: Vec::new(),
        }
    }

    fn link(&mut self, a: u32, b: u32) {
        self.halfedges[a as usize] = b;
        if b != EMPTY {
            self.halfedges[b as usize] = a;
        }
    }

    /// 添加三角形并连接三条边的对偶半边，返回第一条半边的索引
    fn add_triangle(&mut self, i0: u32, i1: u32, i2: u32, a: u32, b: u32, c: u32) -> u32 {
        let t = self.triangles.len() as u32;

        self.triangles.extend([i0, i1, i2]);
        self.halfedges.extend([EMPTY; 3]);

        self.link(t, a);
        self.link(t + 1, b);
        self.link(t + 2, c);

        t
    }

    /// 从半边 `a` 开始翻转非法边，返回最后检查的边所在三角形中 `a` 的前一条半边
    fn legalize(&mut self, mut a: u32, coords: &[Coord], hull: &mut Hull) -> u32 {
        let mut ar;

        loop {
            let b = self.halfedges[a as usize];

            // 若两个三角形不满足 Delaunay 条件（p1 在 [p0, pl, pr] 的外接圆内），
            // 翻转对角线，然后继续检查新产生的两条外边
            //
            //           pl                    pl
            //          /||\                  /  \
            //       al/ || \bl            al/    \a
            //        /  ||  \              /      \
            //       /  a||b  \    flip    /___ar___\
            //     p0\   ||   /p1   =>   p0\---bl---/p1
            //        \  ||  /              \      /
            //       ar\ || /br             b\    /br
            //          \||/                  \  /
            //           pr                    pr
            //
            ar = DelaunayMesh::prev_halfedge(a);

            if b == EMPTY {
                // 凸包边
                match self.edge_stack.pop() {
                    Some(next) => {
                        a = next;
                        continue;
                    }
                    None => break,
                }
            }

            let al = DelaunayMesh::next_halfedge(a);
            let bl = DelaunayMesh::prev_halfedge(b);

            let p0 = self.triangles[ar as usize];
            let pr = self.triangles[a as usize];
            let pl = self.triangles[al as usize];
            let p1 = self.triangles[bl as usize];

            let illegal = in_circle(
                coords[p0 as usize],
                coords[pr as usize],
                coords[pl as usize],
                coords[p1 as usize],
            );

            if illegal {
                self.triangles[a as usize] = p1;
                self.triangles[b as usize] = p0;

                let hbl = self.halfedges[bl as usize];
                let har = self.halfedges[ar as usize];

                // 翻转的边另一侧在凸包上（罕见），修正凸包记录的半边
                if hbl == EMPTY {
                    hull.replace_tri(bl, a);
                }

                self.link(a, hbl);
                self.link(b, har);
                self.link(ar, bl);

                let br = DelaunayMesh::next_halfedge(b);
                self.edge_stack.push(br);
            } else {
                match self.edge_stack.pop() {
                    Some(next) => a = next,
                    None => break,
                }
            }
        }

        ar
    }

    /// 转换为只读网格
    fn finish(self, points: Vec<Pos2>, hull: Vec<u32>) -> DelaunayMesh {
        let halfedges = self
            .halfedges
            .into_iter()
            .map(|he| (he != EMPTY).then_some(he))
            .collect();

        let mut triangles = self.triangles;
        triangles.shrink_to_fit();

        DelaunayMesh {
            points,
            triangles,
            halfedges,
            hull,
        }
    }
}

// ============================================================================
// 推进中的凸包
// ============================================================================

/// 凸包双向链表与伪角度哈希表，仅在构建期间存在
struct Hull {
    prev: Vec<u32>,
    next: Vec<u32>,
    /// 每个凸包顶点对应的边界半边
    tri: Vec<u32>,
    hash: Vec<u32>,
    start: u32,
    center: Coord,
}

impl Hull {
    fn new(n: usize, center: Coord, [i0, i1, i2]: [u32; 3], coords: &[Coord]) -> Self {
        let hash_len = ((n as f64).sqrt().ceil() as usize).max(1);

        let mut hull = Self {
            prev: vec![0; n],
            next: vec![0; n],
            tri: vec![0; n],
            hash: vec![EMPTY; hash_len],
            start: i0,
            center,
        };

        hull.next[i0 as usize] = i1;
        hull.prev[i2 as usize] = i1;
        hull.next[i1 as usize] = i2;
        hull.prev[i0 as usize] = i2;
        hull.next[i2 as usize] = i0;
        hull.prev[i1 as usize] = i0;

        hull.tri[i0 as usize] = 0;
        hull.tri[i1 as usize] = 1;
        hull.tri[i2 as usize] = 2;

        hull.hash_point(coords[i0 as usize], i0);
        hull.hash_point(coords[i1 as usize], i1);
        hull.hash_point(coords[i2 as usize], i2);

        hull
    }

    fn hash_key(&self, p: Coord) -> usize {
        let len = self.hash.len();
        let angle = pseudo_angle(p[0] - self.center[0], p[1] - self.center[1]);
        // 与外心重合时伪角度为 NaN，`as` 转换得到 0
        ((angle * len as f64).floor() as usize) % len
    }

    fn hash_point(&mut self, p: Coord, i: u32) {
        let key = self.hash_key(p);
        self.hash[key] = i;
    }

    /// 顶点仍在凸包上
    #[inline]
    fn is_live(&self, i: u32) -> bool {
        self.next[i as usize] != i
    }

    /// 标记顶点已从凸包移除
    #[inline]
    fn remove(&mut self, i: u32) {
        self.next[i as usize] = i;
    }

    /// 在 `e` 与 `next` 之间接入 `i`，并以 `e` 作为新的起点
    fn insert(&mut self, e: u32, i: u32, next: u32) {
        self.start = e;
        self.prev[i as usize] = e;
        self.next[e as usize] = i;
        self.prev[next as usize] = i;
        self.next[i as usize] = next;
    }

    /// 找到从 `p` 可见的凸包边 `(e, next[e])`
    ///
    /// 第二个返回值表示是否需要向后继续添加三角形。
    fn find_visible_edge(&self, p: Coord, coords: &[Coord]) -> Option<(u32, bool)> {
        let len = self.hash.len();
        let key = self.hash_key(p);

        let mut start = self.start;
        for j in 0..len {
            let candidate = self.hash[(key + j) % len];
            if candidate != EMPTY && self.is_live(candidate) {
                start = candidate;
                break;
            }
        }

        let start = self.prev[start as usize];
        let mut e = start;
        loop {
            let q = self.next[e as usize];
            if orient(p, coords[e as usize], coords[q as usize]) {
                break;
            }
            e = q;
            if e == start {
                return None;
            }
        }

        Some((e, e == start))
    }

    /// 凸包边界半边 `from` 被翻转到 `to` 时更新记录
    fn replace_tri(&mut self, from: u32, to: u32) {
        let mut e = self.start;
        loop {
            if self.tri[e as usize] == from {
                self.tri[e as usize] = to;
                break;
            }
            e = self.prev[e as usize];
            if e == self.start {
                break;
            }
        }
    }

    /// 从起点开始展开为点索引列表
    fn into_vec(self) -> Vec<u32> {
        let mut hull = Vec::new();
        let mut e = self.start;
        loop {
            hull.push(e);
            e = self.next[e as usize];
            if e == self.start {
                break;
            }
        }
        hull
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 四边形 `p0 p1 pr pl`，对角线 `pr-pl` 非法
    ///
    /// 半边 0..3 为 `[pr, pl, p0]`，3..6 为 `[pl, pr, p1]`，0 与 3 互为对偶。
    fn illegal_quad() -> (Vec<Coord>, Builder) {
        let coords = vec![[-1.0, 0.0], [1.0, 0.0], [0.0, 2.0], [0.0, -2.0]];
        let mut builder = Builder::new(coords.len());
        let t = builder.add_triangle(2, 3, 0, EMPTY, EMPTY, EMPTY);
        builder.add_triangle(3, 2, 1, t, EMPTY, EMPTY);
        (coords, builder)
    }

    #[test]
    fn test_legalize_flips_diagonal() {
        let (coords, mut builder) = illegal_quad();
        let mut hull = Hull::new(coords.len(), [0.0, 0.0], [1, 3, 0], &coords);
        // p1 -> pl 的边界半边
        hull.tri[1] = 5;

        builder.legalize(0, &coords, &mut hull);

        assert_eq!(builder.triangles, vec![1, 3, 0, 0, 2, 1]);
        assert_eq!(builder.halfedges[2], 5);
        assert_eq!(builder.halfedges[5], 2);
        assert!([0, 1, 3, 4].iter().all(|&e| builder.halfedges[e] == EMPTY));
        // 翻转后 p1 -> pl 由半边 0 表示
        assert_eq!(hull.tri[1], 0);
        assert!(builder.edge_stack.is_empty());
    }

    #[test]
    fn test_legalize_drains_deep_stack() {
        // 预先压入远超常见深度的待检查边，必须全部处理完且不丢失翻转
        let (coords, mut builder) = illegal_quad();
        let mut hull = Hull::new(coords.len(), [0.0, 0.0], [1, 3, 0], &coords);
        hull.tri[1] = 5;

        let pending = 4096;
        for _ in 0..pending {
            builder.edge_stack.extend([1, 2, 4, 5]);
        }
        assert_eq!(builder.edge_stack.len(), 4 * pending);

        builder.legalize(0, &coords, &mut hull);

        assert!(builder.edge_stack.is_empty());
        assert_eq!(builder.triangles, vec![1, 3, 0, 0, 2, 1]);
        assert_eq!(builder.halfedges[2], 5);
        assert_eq!(builder.halfedges[5], 2);
        for t in builder.triangles.chunks(3) {
            let [a, b, c] = [t[0], t[1], t[2]].map(|i| coords[i as usize]);
            assert!(!orient(a, b, c), "翻转后三角形方向应保持一致");
        }
    }

    #[test]
    fn test_legalize_keeps_legal_edge() {
        // 对角线 p0-p1 已合法时不翻转
        let coords = vec![[-1.0, 0.0], [1.0, 0.0], [0.0, 2.0], [0.0, -2.0]];
        let mut builder = Builder::new(coords.len());
        let t = builder.add_triangle(1, 3, 0, EMPTY, EMPTY, EMPTY);
        builder.add_triangle(0, 2, 1, EMPTY, EMPTY, t + 2);
        let mut hull = Hull::new(coords.len(), [0.0, 0.0], [1, 3, 0], &coords);

        builder.legalize(t + 2, &coords, &mut hull);

        assert_eq!(builder.triangles, vec![1, 3, 0, 0, 2, 1]);
        assert_eq!(builder.halfedges[2], 5);
        assert!(builder.edge_stack.is_empty());
    }
}
