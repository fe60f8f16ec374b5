//! 生成随机点集，输出三角剖分与 Voronoi 单元格统计
//!
//! 用法：`voronoi_stats [点数] [松弛轮数] [种子]`，日志级别由 `RUST_LOG` 控制。

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use egui::{Pos2, Rect};
    use planar_voronoi::delaunay::utils::{polygon_area, random_points};
    use planar_voronoi::delaunay::{build_voronoi, BorderRelaxation, PolygonStatus};
    use planar_voronoi::VoronoiOptions;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::time::Instant;

    env_logger::init(); // Log to stderr (if you run with `RUST_LOG=debug`).

    let args: Vec<String> = std::env::args().skip(1).collect();
    let arg = |k: usize, default: u64| -> u64 {
        args.get(k).and_then(|s| s.parse().ok()).unwrap_or(default)
    };
    let count = arg(0, 10_000) as usize;
    let iterations = arg(1, 2) as u32;
    let seed = arg(2, 42);

    let bounds = Rect::from_min_max(Pos2::ZERO, Pos2::new(1000.0, 1000.0));
    let mut rng = StdRng::seed_from_u64(seed);
    let points = random_points(&mut rng, count, bounds);

    let options = VoronoiOptions::default()
        .with_clip(bounds)
        .with_iterations(iterations)
        .with_border_relaxation(BorderRelaxation::Pin);

    let start = Instant::now();
    let voronoi = match build_voronoi(&points, &options) {
        Ok(voronoi) => voronoi,
        Err(err) => {
            log::error!("构建 Voronoi 失败: {}", err);
            std::process::exit(1);
        }
    };
    log::info!("{} 个点，{} 轮松弛，耗时 {:.2?}", count, iterations, start.elapsed());

    let mesh = voronoi.mesh();
    let cells = voronoi.clipped_polygons();
    let areas: Vec<f64> = cells
        .iter()
        .flatten()
        .map(|cell| polygon_area(cell) as f64)
        .collect();

    let mean = areas.iter().sum::<f64>() / areas.len().max(1) as f64;
    let variance =
        areas.iter().map(|a| (a - mean).powi(2)).sum::<f64>() / areas.len().max(1) as f64;
    let min = areas.iter().copied().fold(f64::INFINITY, f64::min);
    let max = areas.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let status_count = |status: PolygonStatus| {
        (0..voronoi.cell_count() as u32)
            .filter(|&i| voronoi.polygon_status(i) == status)
            .count()
    };
    let edges_per_cell = (0..voronoi.cell_count() as u32)
        .map(|i| voronoi.neighbors(i).len())
        .sum::<usize>() as f32
        / voronoi.cell_count().max(1) as f32;

    println!("Triangulation:");
    println!("  Points: {}", mesh.point_count());
    println!("  Triangles: {}", mesh.triangle_count());
    println!("  Hull size: {}", mesh.hull().len());
    println!("Voronoi cells:");
    println!("  Bounded: {}", status_count(PolygonStatus::Normal));
    println!("  Unbounded: {}", status_count(PolygonStatus::Infinite));
    println!("  Without cell: {}", status_count(PolygonStatus::Error));
    println!("  Clipped: {} / {}", areas.len(), cells.len());
    println!("  Avg neighbors: {:.2}", edges_per_cell);
    println!("Cell area:");
    println!("  Min: {:.2}", min);
    println!("  Max: {:.2}", max);
    println!("  Mean: {:.2}", mean);
    println!("  Std Dev: {:.2}", variance.sqrt());
}

#[cfg(target_arch = "wasm32")]
fn main() {}
