//! 矩形裁剪
//!
//! Voronoi 单元格裁剪用到的全部矩形运算：
//! - 区域码（点在矩形哪一侧）与边码（点落在矩形哪条边上）
//! - Cohen–Sutherland 线段裁剪
//! - 射线与矩形边界求交
//! - 沿矩形边界按固定循环顺序补角点
//!
//! 边码循环顺序在 y 轴向上的坐标系中为逆时针，与单元格顶点顺序一致。

use egui::{Pos2, Rect, Vec2};

/// x 小于 min.x / 位于左边
const X_MIN: u8 = 0b0001;
/// x 大于 max.x / 位于右边
const X_MAX: u8 = 0b0010;
/// y 小于 min.y / 位于下边
const Y_MIN: u8 = 0b0100;
/// y 大于 max.y / 位于上边
const Y_MAX: u8 = 0b1000;

/// 裁剪矩形
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipRect {
    rect: Rect,
}

impl ClipRect {
    pub fn new(rect: Rect) -> Self {
        Self { rect }
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    #[inline]
    pub fn min(&self) -> Pos2 {
        self.rect.min
    }

    #[inline]
    pub fn max(&self) -> Pos2 {
        self.rect.max
    }

    pub fn center(&self) -> Pos2 {
        self.rect.center()
    }

    /// 四个角，从 `min` 开始逆时针
    pub fn corners(&self) -> Vec<Pos2> {
        let (min, max) = (self.min(), self.max());
        vec![
            min,
            Pos2::new(max.x, min.y),
            max,
            Pos2::new(min.x, max.y),
        ]
    }

    /// 点是否在矩形内（含边界）
    pub fn contains(&self, p: Pos2) -> bool {
        self.region_code(p) == 0
    }

    /// 区域码：矩形内为 0
    pub fn region_code(&self, p: Pos2) -> u8 {
        let (min, max) = (self.min(), self.max());
        let x = if p.x < min.x {
            X_MIN
        } else if p.x > max.x {
            X_MAX
        } else {
            0
        };
        let y = if p.y < min.y {
            Y_MIN
        } else if p.y > max.y {
            Y_MAX
        } else {
            0
        };
        x | y
    }

    /// 边码：不在任何边上为 0，角点同时带两个位
    pub fn edge_code(&self, p: Pos2) -> u8 {
        let (min, max) = (self.min(), self.max());
        let x = if p.x == min.x {
            X_MIN
        } else if p.x == max.x {
            X_MAX
        } else {
            0
        };
        let y = if p.y == min.y {
            Y_MIN
        } else if p.y == max.y {
            Y_MAX
        } else {
            0
        };
        x | y
    }

    /// Cohen–Sutherland 线段裁剪
    ///
    /// `c0`/`c1` 必须是两端点的区域码。线段完全在矩形外时返回 `None`。
    pub fn clip_segment(
        &self,
        mut v0: Pos2,
        mut v1: Pos2,
        mut c0: u8,
        mut c1: u8,
    ) -> Option<(Pos2, Pos2)> {
        let (min, max) = (self.min(), self.max());

        // 每轮至少清掉一个端点的一个区域位，舍入误差下也不会无限循环
        for _ in 0..16 {
            if c0 == 0 && c1 == 0 {
                return Some((v0, v1));
            }
            if c0 & c1 != 0 {
                return None;
            }

            // 两端点在该轴上不同侧，分母不为零
            let c = if c0 != 0 { c0 } else { c1 };
            let v = if c & Y_MAX != 0 {
                Pos2::new(v0.x + (v1.x - v0.x) * (max.y - v0.y) / (v1.y - v0.y), max.y)
            } else if c & Y_MIN != 0 {
                Pos2::new(v0.x + (v1.x - v0.x) * (min.y - v0.y) / (v1.y - v0.y), min.y)
            } else if c & X_MAX != 0 {
                Pos2::new(max.x, v0.y + (v1.y - v0.y) * (max.x - v0.x) / (v1.x - v0.x))
            } else {
                Pos2::new(min.x, v0.y + (v1.y - v0.y) * (min.x - v0.x) / (v1.x - v0.x))
            };

            if c0 != 0 {
                v0 = v;
                c0 = self.region_code(v0);
            } else {
                v1 = v;
                c1 = self.region_code(v1);
            }
        }

        None
    }

    /// 从 `u` 出发沿 `v` 方向的射线与矩形边界的交点
    ///
    /// 起点已在射线指向一侧的边界之外、或方向为零向量时返回 `None`。
    /// 方向分量为零的轴不参与求交。
    pub fn project(&self, u: Pos2, v: Vec2) -> Option<Pos2> {
        let (min, max) = (self.min(), self.max());
        let mut t = f32::INFINITY;
        let mut hit = None;

        if v.y < 0.0 {
            if u.y <= min.y {
                return None;
            }
            let c = (min.y - u.y) / v.y;
            if c < t {
                t = c;
                hit = Some(Pos2::new(u.x + c * v.x, min.y));
            }
        } else if v.y > 0.0 {
            if u.y >= max.y {
                return None;
            }
            let c = (max.y - u.y) / v.y;
            if c < t {
                t = c;
                hit = Some(Pos2::new(u.x + c * v.x, max.y));
            }
        }

        if v.x > 0.0 {
            if u.x >= max.x {
                return None;
            }
            let c = (max.x - u.x) / v.x;
            if c < t {
                hit = Some(Pos2::new(max.x, u.y + c * v.y));
            }
        } else if v.x < 0.0 {
            if u.x <= min.x {
                return None;
            }
            let c = (min.x - u.x) / v.x;
            if c < t {
                hit = Some(Pos2::new(min.x, u.y + c * v.y));
            }
        }

        hit
    }

    /// 从边码 `e0` 沿矩形边界走到 `e1`，把途经且被 `inside` 接受的角点插入 `polygon[j]`
    ///
    /// 之后删除三点同 x 或同 y 的中间点。返回插入后原第 `j` 个点的新位置。
    pub fn walk_corners(
        &self,
        mut e0: u8,
        e1: u8,
        polygon: &mut Vec<Pos2>,
        mut j: usize,
        inside: &dyn Fn(Pos2) -> bool,
    ) -> usize {
        let (min, max) = (self.min(), self.max());

        while e0 != e1 {
            let corner = match e0 {
                0b0101 => {
                    e0 = Y_MIN;
                    continue;
                }
                Y_MIN => {
                    e0 = Y_MIN | X_MAX;
                    Pos2::new(max.x, min.y)
                }
                0b0110 => {
                    e0 = X_MAX;
                    continue;
                }
                X_MAX => {
                    e0 = X_MAX | Y_MAX;
                    max
                }
                0b1010 => {
                    e0 = Y_MAX;
                    continue;
                }
                Y_MAX => {
                    e0 = Y_MAX | X_MIN;
                    Pos2::new(min.x, max.y)
                }
                0b1001 => {
                    e0 = X_MIN;
                    continue;
                }
                X_MIN => {
                    e0 = X_MIN | Y_MIN;
                    min
                }
                _ => unreachable!("边码 {e0:#06b} 不在矩形边界上"),
            };

            if polygon.get(j) != Some(&corner) && inside(corner) {
                polygon.insert(j, corner);
                j += 1;
            }
        }

        remove_axis_collinear(polygon);
        j
    }

    /// 裁剪闭合多边形
    ///
    /// 多边形与矩形不相交时，若 `inside` 接受矩形中心则返回整个矩形，否则返回 `None`。
    pub fn clip_finite(
        &self,
        points: &[Pos2],
        inside: &dyn Fn(Pos2) -> bool,
    ) -> Option<Vec<Pos2>> {
        let &last = points.last()?;

        let mut polygon: Vec<Pos2> = Vec::new();
        let mut v1 = last;
        let mut c1 = self.region_code(v1);
        let mut e1 = 0u8;

        for &v in points {
            let v0 = v1;
            let c0 = c1;
            v1 = v;
            c1 = self.region_code(v1);

            if c0 == 0 && c1 == 0 {
                e1 = 0;
                polygon.push(v1);
                continue;
            }

            let s1 = if c0 == 0 {
                match self.clip_segment(v0, v1, c0, c1) {
                    Some((_, s1)) => s1,
                    None => continue,
                }
            } else {
                let Some((s1, s0)) = self.clip_segment(v1, v0, c1, c0) else {
                    continue;
                };
                let e0 = e1;
                e1 = self.edge_code(s0);
                if e0 != 0 && e1 != 0 {
                    let j = polygon.len();
                    self.walk_corners(e0, e1, &mut polygon, j, inside);
                }
                polygon.push(s0);
                s1
            };

            let e0 = e1;
            e1 = self.edge_code(s1);
            if e0 != 0 && e1 != 0 {
                let j = polygon.len();
                self.walk_corners(e0, e1, &mut polygon, j, inside);
            }
            polygon.push(s1);
        }

        if let Some(&first) = polygon.first() {
            let e0 = e1;
            e1 = self.edge_code(first);
            if e0 != 0 && e1 != 0 {
                let j = polygon.len();
                self.walk_corners(e0, e1, &mut polygon, j, inside);
            }
            Some(polygon)
        } else if inside(self.center()) {
            Some(self.corners())
        } else {
            None
        }
    }

    /// 裁剪两端延伸为射线的开放折线
    ///
    /// `ray_start` 从第一个顶点射出，`ray_end` 从最后一个顶点射出。
    pub fn clip_infinite(
        &self,
        points: &[Pos2],
        ray_start: Vec2,
        ray_end: Vec2,
        inside: &dyn Fn(Pos2) -> bool,
    ) -> Option<Vec<Pos2>> {
        let (&first, &last) = (points.first()?, points.last()?);

        let mut open = Vec::with_capacity(points.len() + 2);
        open.extend(self.project(first, ray_start));
        open.extend_from_slice(points);
        open.extend(self.project(last, ray_end));

        let mut polygon = self.clip_finite(&open, inside)?;

        // 两条射线的投影点之间可能还缺角点
        let mut c1 = polygon.last().map_or(0, |&p| self.edge_code(p));
        let mut j = 0;
        while j < polygon.len() {
            let c0 = c1;
            c1 = self.edge_code(polygon[j]);
            if c0 != 0 && c1 != 0 {
                j = self.walk_corners(c0, c1, &mut polygon, j, inside);
            }
            j += 1;
        }

        Some(polygon)
    }
}

/// 删除连续三点同 x 或同 y 时的中间点，至少保留两个点
fn remove_axis_collinear(polygon: &mut Vec<Pos2>) {
    let mut i = 0;
    while polygon.len() > 2 && i < polygon.len() {
        let n = polygon.len();
        let a = polygon[i];
        let b = polygon[(i + 1) % n];
        let c = polygon[(i + 2) % n];
        if (a.x == b.x && b.x == c.x) || (a.y == b.y && b.y == c.y) {
            polygon.remove((i + 1) % n);
        } else {
            i += 1;
        }
    }
}
