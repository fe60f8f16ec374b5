use crate::delaunay::predicates::{self, coord};
use egui::Pos2;

/// 三元组，按顺序保存三角形的三个角（点索引、半边索引或坐标）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Triple<T>(pub T, pub T, pub T);

impl<T> Triple<T> {
    pub fn new(a: T, b: T, c: T) -> Self {
        Self(a, b, c)
    }

    /// 对三个分量逐一映射
    pub fn map<U>(self, mut f: impl FnMut(T) -> U) -> Triple<U> {
        Triple(f(self.0), f(self.1), f(self.2))
    }

    pub fn into_array(self) -> [T; 3] {
        [self.0, self.1, self.2]
    }
}

impl<T> From<(T, T, T)> for Triple<T> {
    fn from((a, b, c): (T, T, T)) -> Self {
        Self(a, b, c)
    }
}

impl<T> From<Triple<T>> for (T, T, T) {
    fn from(t: Triple<T>) -> Self {
        (t.0, t.1, t.2)
    }
}

impl<T> From<[T; 3]> for Triple<T> {
    fn from([a, b, c]: [T; 3]) -> Self {
        Self(a, b, c)
    }
}

impl<T> IntoIterator for Triple<T> {
    type Item = T;
    type IntoIter = std::array::IntoIter<T, 3>;

    fn into_iter(self) -> Self::IntoIter {
        self.into_array().into_iter()
    }
}

/// 三角形结构，存储三个顶点坐标
///
/// `index` 是三角形在 [`DelaunayMesh`](super::DelaunayMesh) 中的编号，
/// 独立构造的三角形为 `None`。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub index: Option<u32>,
    pub points: [Pos2; 3],
}

impl Triangle {
    /// 创建新的三角形
    pub fn new(points: [Pos2; 3]) -> Self {
        Self {
            index: None,
            points,
        }
    }

    pub(crate) fn with_index(index: u32, points: [Pos2; 3]) -> Self {
        Self {
            index: Some(index),
            points,
        }
    }

    /// 有向面积（y 轴向上时逆时针为正）
    pub fn signed_area(&self) -> f32 {
        let [a, b, c] = self.points;
        0.5 * ((b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x))
    }

    /// 重心
    pub fn centroid(&self) -> Pos2 {
        let [a, b, c] = self.points;
        Pos2::new((a.x + b.x + c.x) / 3.0, (a.y + b.y + c.y) / 3.0)
    }

    /// 外心（Voronoi 顶点）
    ///
    /// 退化三角形的外心不是有限值。
    pub fn circumcenter(&self) -> Pos2 {
        let [a, b, c] = self.points.map(coord);
        let [x, y] = predicates::circumcenter(a, b, c);
        Pos2::new(x as f32, y as f32)
    }

    /// 判断一个点是否严格在三角形的外接圆内
    ///
    /// 与顶点顺序无关；退化三角形没有外接圆，返回 `false`。
    pub fn contains_in_circumcircle(&self, point: Pos2) -> bool {
        let [a, b, c] = self.points.map(coord);
        let p = coord(point);

        if predicates::orient(a, b, c) {
            predicates::in_circle(a, c, b, p)
        } else if predicates::orient(a, c, b) {
            predicates::in_circle(a, b, c, p)
        } else {
            false
        }
    }

    /// 检查点是否在三角形内部（含边界）
    pub fn contains_point(&self, point: Pos2) -> bool {
        let a = self.points[0];
        let b = self.points[1];
        let c = self.points[2];

        // 使用重心坐标判断
        let area = 0.5 * ((b.x - a.x) * (c.y - a.y) - (c.x - a.x) * (b.y - a.y));

        // 处理面积接近零的情况（即三角形退化的情况）
        if area.abs() < 1e-10 {
            return false;
        }

        let s = 1.0 / (2.0 * area)
            * (a.y * c.x - a.x * c.y + (c.y - a.y) * point.x + (a.x - c.x) * point.y);
        let t = 1.0 / (2.0 * area)
            * (a.x * b.y - a.y * b.x + (a.y - b.y) * point.x + (b.x - a.x) * point.y);

        let u = 1.0 - s - t;

        s >= 0.0 && t >= 0.0 && u >= 0.0
    }
}

impl IntoIterator for Triangle {
    type Item = Pos2;
    type IntoIter = std::array::IntoIter<Pos2, 3>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.into_iter()
    }
}
