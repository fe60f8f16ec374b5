use egui::Pos2;
use thiserror::Error;

/// Voronoi 构建配置错误
///
/// 点集本身永远不会导致错误，只有外部提供的裁剪矩形可能无效。
#[derive(Clone, Debug, Error, PartialEq)]
pub enum VoronoiError {
    /// 裁剪矩形含非有限值，或某个轴上 `min > max`
    #[error("Invalid clip rect: min ({}, {}) max ({}, {})", min.x, min.y, max.x, max.y)]
    InvalidClipRect { min: Pos2, max: Pos2 },
}
