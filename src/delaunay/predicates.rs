//! 几何谓词
//!
//! 三角剖分与 Voronoi 构建共用的基础判定，全部在 `f64` 下计算。
//! 外部坐标是 `f32`（`Pos2`），进入谓词前先提升精度。
//!
//! 方向约定：[`orient`] 返回 `true` 表示 `(p, q, r)` 在 y 轴向上的坐标系中
//! 为逆时针。三角剖分把种子三角形翻转成 `orient == false` 的方向，之后
//! 所有三角形都保持这一方向，凸包可见性和边翻转都依赖同一个判定。

use egui::Pos2;

/// 近重复点阈值：两个坐标分量都在此范围内的相邻点只插入一次
pub const EPSILON: f64 = f64::EPSILON;

/// `f64` 坐标对
pub type Coord = [f64; 2];

/// 将 `Pos2` 提升为 `f64` 坐标
#[inline]
pub fn coord(p: Pos2) -> Coord {
    [p.x as f64, p.y as f64]
}

/// 两点距离的平方
#[inline]
pub fn dist2(a: Coord, b: Coord) -> f64 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    dx * dx + dy * dy
}

/// 有向面积符号测试
#[inline]
pub fn orient(p: Coord, q: Coord, r: Coord) -> bool {
    (q[1] - p[1]) * (r[0] - q[0]) - (q[0] - p[0]) * (r[1] - q[1]) < 0.0
}

/// 外心相对 `a` 的偏移
///
/// 三点共线时分母为零，结果为无穷或 NaN，由调用方处理。
#[inline]
fn circumdelta(a: Coord, b: Coord, c: Coord) -> Coord {
    let dx = b[0] - a[0];
    let dy = b[1] - a[1];
    let ex = c[0] - a[0];
    let ey = c[1] - a[1];

    let bl = dx * dx + dy * dy;
    let cl = ex * ex + ey * ey;
    let d = 0.5 / (dx * ey - dy * ex);

    [(ey * bl - dy * cl) * d, (dx * cl - ex * bl) * d]
}

/// 外接圆半径的平方
///
/// 共线三点返回 `+inf`（或 NaN），种子选择时不会被选中。
#[inline]
pub fn circumradius(a: Coord, b: Coord, c: Coord) -> f64 {
    let [x, y] = circumdelta(a, b, c);
    x * x + y * y
}

/// 外心坐标
#[inline]
pub fn circumcenter(a: Coord, b: Coord, c: Coord) -> Coord {
    let [x, y] = circumdelta(a, b, c);
    [a[0] + x, a[1] + y]
}

/// `p` 是否严格位于 `(a, b, c)` 的外接圆内
///
/// 恰好落在圆上视为合法，不触发翻转。
#[inline]
pub fn in_circle(a: Coord, b: Coord, c: Coord, p: Coord) -> bool {
    let dx = a[0] - p[0];
    let dy = a[1] - p[1];
    let ex = b[0] - p[0];
    let ey = b[1] - p[1];
    let fx = c[0] - p[0];
    let fy = c[1] - p[1];

    let ap = dx * dx + dy * dy;
    let bp = ex * ex + ey * ey;
    let cp = fx * fx + fy * fy;

    dx * (ey * cp - bp * fy) - dy * (ex * cp - bp * fx) + ap * (ex * fy - ey * fx) < 0.0
}

/// 伪角度：单调替代 `atan2`，归一化到 `[0, 1]`
#[inline]
pub fn pseudo_angle(dx: f64, dy: f64) -> f64 {
    let p = dx / (dx.abs() + dy.abs());
    if dy > 0.0 {
        (3.0 - p) / 4.0
    } else {
        (1.0 + p) / 4.0
    }
}
