//! Lloyd 松弛
//!
//! 反复把每个点移到其 Voronoi 单元格的质心，使点分布更均匀、单元格大小更接近。

use crate::delaunay::voronoi::{validate_clip_rect, PolygonStatus, Voronoi};
use crate::error::VoronoiError;
use egui::{Pos2, Rect};
use serde::{Deserialize, Serialize};

/// 凸包上（无界单元格）的点如何参与松弛
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BorderRelaxation {
    /// 只移动有界单元格的点，边界点固定，避免整个点集每轮向内收缩
    #[default]
    Pin,
    /// 所有能求出质心的点都移动
    Relax,
}

/// Voronoi 构建与松弛配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoronoiOptions {
    /// 裁剪矩形，`None` 时使用点与外心的包围盒
    pub clip: Option<Rect>,

    /// Lloyd 松弛迭代次数
    pub lloyd_relaxation_iterations: u32,

    /// 边界点的松弛方式
    pub border_relaxation: BorderRelaxation,
}

impl Default for VoronoiOptions {
    fn default() -> Self {
        Self {
            clip: None,
            lloyd_relaxation_iterations: 0,
            border_relaxation: BorderRelaxation::Pin,
        }
    }
}

impl VoronoiOptions {
    pub fn with_clip(mut self, clip: Rect) -> Self {
        self.clip = Some(clip);
        self
    }

    pub fn with_iterations(mut self, iterations: u32) -> Self {
        self.lloyd_relaxation_iterations = iterations;
        self
    }

    pub fn with_border_relaxation(mut self, border_relaxation: BorderRelaxation) -> Self {
        self.border_relaxation = border_relaxation;
        self
    }

    /// 检查配置是否有效
    pub fn validate(&self) -> Result<(), VoronoiError> {
        match self.clip {
            Some(rect) => validate_clip_rect(rect),
            None => Ok(()),
        }
    }

    fn voronoi(&self, points: &[Pos2]) -> Result<Voronoi, VoronoiError> {
        match self.clip {
            Some(rect) => Voronoi::with_clip(points, rect),
            None => Ok(Voronoi::new(points)),
        }
    }
}

/// 按配置松弛点集并返回最终的 Voronoi 图
///
/// 每轮都用松弛后的点重新三角剖分。
pub fn build_voronoi(points: &[Pos2], options: &VoronoiOptions) -> Result<Voronoi, VoronoiError> {
    options.validate()?;
    let mut voronoi = options.voronoi(points)?;

    for iteration in 0..options.lloyd_relaxation_iterations {
        let relaxed = voronoi.relaxed_points();
        let current = voronoi.points();

        let next: Vec<Pos2> = match options.border_relaxation {
            BorderRelaxation::Pin => relaxed
                .into_iter()
                .zip(current)
                .enumerate()
                .map(|(i, (moved, &site))| {
                    if voronoi.polygon_status(i as u32) == PolygonStatus::Normal {
                        moved
                    } else {
                        site
                    }
                })
                .collect(),
            BorderRelaxation::Relax => relaxed,
        };

        let max_shift = next
            .iter()
            .zip(current)
            .map(|(a, b)| a.distance(*b))
            .fold(0.0f32, f32::max);
        log::trace!(
            "Lloyd 松弛第 {} 轮，最大位移 {:.4}",
            iteration + 1,
            max_shift
        );

        voronoi = options.voronoi(&next)?;
    }

    Ok(voronoi)
}

/// 按配置松弛点集，只返回松弛后的点
pub fn relax_points(points: &[Pos2], options: &VoronoiOptions) -> Result<Vec<Pos2>, VoronoiError> {
    Ok(build_voronoi(points, options)?.points().to_vec())
}
