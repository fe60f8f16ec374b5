use super::utils::{
    convex_hull_size, random_points, validate_delaunay, validate_delaunay_brute_force,
    validate_halfedges, validate_hull,
};
use super::{triangulate, DelaunayMesh};
use egui::{Pos2, Rect};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// 所有结构性质一起检查
fn assert_valid(mesh: &DelaunayMesh) {
    assert_eq!(mesh.triangles().len() % 3, 0);
    assert_eq!(mesh.triangles().len(), mesh.halfedges().len());
    assert!(validate_halfedges(mesh), "半边对偶关系错误");
    assert!(validate_delaunay(mesh), "不满足 Delaunay 性质");
    assert!(validate_hull(mesh), "凸包不凸或没有包含所有点");

    // 凸包没有重复点
    let mut hull = mesh.hull().to_vec();
    hull.sort_unstable();
    hull.dedup();
    assert_eq!(hull.len(), mesh.hull().len(), "凸包中有重复点");
}

fn seeded_points(seed: u64, count: usize) -> Vec<Pos2> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let bounds = Rect::from_min_max(Pos2::new(0.0, 0.0), Pos2::new(1000.0, 1000.0));
    random_points(&mut rng, count, bounds)
}

#[test]
fn test_simple_triangle() {
    let points = vec![
        Pos2::new(0.0, 0.0),
        Pos2::new(1.0, 0.0),
        Pos2::new(0.0, 1.0),
    ];

    let mesh = triangulate(&points);
    // 对于一个三角形，应该有3个索引
    assert_eq!(mesh.triangles().len(), 3);
    assert_eq!(mesh.hull().len(), 3);

    let mut corners = mesh.triangles().to_vec();
    corners.sort_unstable();
    assert_eq!(corners, vec![0, 1, 2]);

    let mut hull = mesh.hull().to_vec();
    hull.sort_unstable();
    assert_eq!(hull, vec![0, 1, 2]);

    assert!(mesh.halfedges().iter().all(Option::is_none));
    assert_valid(&mesh);
}

#[test]
fn test_square() {
    // 共圆的正方形：两条对角线都可以，但必须满足 Delaunay 性质
    let points = vec![
        Pos2::new(0.0, 0.0),
        Pos2::new(1.0, 0.0),
        Pos2::new(1.0, 1.0),
        Pos2::new(0.0, 1.0),
    ];

    let mesh = triangulate(&points);
    assert_eq!(mesh.triangle_count(), 2);
    assert_eq!(mesh.hull().len(), 4);
    assert_valid(&mesh);
    assert!(validate_delaunay_brute_force(&mesh));
}

#[test]
fn test_pentagon() {
    // 凸多边形中，三角形数 = 顶点数 - 2
    let points = vec![
        Pos2::new(0.0, 0.0),
        Pos2::new(1.0, 0.0),
        Pos2::new(1.5, 0.5),
        Pos2::new(0.5, 1.0),
        Pos2::new(0.0, 0.5),
    ];

    let mesh = triangulate(&points);
    assert_eq!(mesh.triangle_count(), 3);
    assert_eq!(mesh.hull().len(), 5);
    assert_valid(&mesh);
}

#[test]
fn test_collinear_points() {
    let points = vec![
        Pos2::new(0.0, 0.0),
        Pos2::new(1.0, 0.0),
        Pos2::new(2.0, 0.0),
    ];

    let mesh = triangulate(&points);
    assert!(mesh.is_empty());
    assert!(mesh.halfedges().is_empty());
    assert_eq!(mesh.hull(), &[0, 1, 2]);
}

#[test]
fn test_collinear_unordered_and_duplicated() {
    // 凸包按 x 排序，重复点只保留一个
    let points = vec![
        Pos2::new(2.0, 0.0),
        Pos2::new(0.0, 0.0),
        Pos2::new(3.0, 0.0),
        Pos2::new(1.0, 0.0),
        Pos2::new(2.0, 0.0),
    ];

    let mesh = triangulate(&points);
    assert!(mesh.is_empty());
    assert_eq!(mesh.hull().len(), 4);

    let xs: Vec<f32> = mesh.hull_points().map(|p| p.x).collect();
    assert_eq!(xs, vec![0.0, 1.0, 2.0, 3.0]);
}

#[test]
fn test_vertical_collinear() {
    // x 全相同时按 y 排序
    let points = vec![
        Pos2::new(5.0, 3.0),
        Pos2::new(5.0, -1.0),
        Pos2::new(5.0, 1.0),
    ];

    let mesh = triangulate(&points);
    assert!(mesh.is_empty());
    assert_eq!(mesh.hull(), &[1, 2, 0]);
}

#[test]
fn test_one_extra_point_off_the_line() {
    let points = vec![
        Pos2::new(0.0, 0.0),
        Pos2::new(1.0, 0.0),
        Pos2::new(2.0, 0.0),
        Pos2::new(1.0, 1.0),
    ];

    let mesh = triangulate(&points);
    assert_eq!(mesh.triangle_count(), 2);
    assert_valid(&mesh);
}

#[test]
fn test_duplicate_points() {
    // 重复点应该不会导致问题
    let points = vec![
        Pos2::new(0.0, 0.0),
        Pos2::new(0.0, 0.0), // 重复点
        Pos2::new(1.0, 0.0),
        Pos2::new(0.0, 1.0),
    ];

    let mesh = triangulate(&points);
    // 去重后应该只有3个点，形成1个三角形
    assert_eq!(mesh.triangle_count(), 1);
    assert_eq!(mesh.hull().len(), 3);
    assert_eq!(mesh.point_count(), 4);
    assert_valid(&mesh);
}

#[test]
fn test_all_points_coincide() {
    let points = vec![Pos2::new(3.0, 4.0); 5];
    let mesh = triangulate(&points);
    assert!(mesh.is_empty());
    assert_eq!(mesh.hull().len(), 1);
}

#[test]
fn test_empty_points() {
    // 空点集应该返回空结果
    let points: Vec<Pos2> = Vec::new();
    let mesh = triangulate(&points);
    assert!(mesh.is_empty());
    assert!(mesh.hull().is_empty());
}

#[test]
fn test_single_point() {
    let points = vec![Pos2::new(0.0, 0.0)];
    let mesh = triangulate(&points);
    assert!(mesh.is_empty());
    assert_eq!(mesh.hull(), &[0]);
}

#[test]
fn test_two_points() {
    let points = vec![Pos2::new(1.0, 1.0), Pos2::new(0.0, 0.0)];
    let mesh = triangulate(&points);
    assert!(mesh.is_empty());
    assert_eq!(mesh.hull(), &[1, 0]);
    assert_eq!(mesh.hull_edges().len(), 2);
}

#[test]
fn test_close_points() {
    // 非常接近的点应该也能处理
    let points = vec![
        Pos2::new(0.0, 0.0),
        Pos2::new(1.0, 0.0),
        Pos2::new(0.0, 1.0),
        Pos2::new(0.0000001, 0.0000001), // 非常接近第一个点
    ];

    let mesh = triangulate(&points);
    assert!(mesh.triangle_count() >= 1);
    assert_valid(&mesh);
}

#[test]
fn test_cocircular_fan() {
    // 圆心加圆周上的点：圆心的度数很高，所有外圈点共圆
    let n = 32;
    let mut points = vec![Pos2::new(0.0, 0.0)];
    for k in 0..n {
        let angle = k as f32 / n as f32 * std::f32::consts::TAU;
        points.push(Pos2::new(1000.0 * angle.cos(), 1000.0 * angle.sin()));
    }

    let mesh = triangulate(&points);
    assert_eq!(mesh.hull().len(), n);
    // 2n - 2 - k
    assert_eq!(mesh.triangle_count(), 2 * (n + 1) - 2 - n);
    assert_valid(&mesh);
}

#[test]
fn test_grid_points() {
    // 规则网格上大量共圆的四点组
    let mut points = Vec::new();
    for i in 0..10 {
        for j in 0..10 {
            points.push(Pos2::new(i as f32, j as f32));
        }
    }

    let mesh = triangulate(&points);
    assert!(mesh.triangle_count() > 0);
    assert_valid(&mesh);
    assert!(validate_delaunay_brute_force(&mesh));
}

#[test]
fn test_random_points() {
    let points = seeded_points(42, 1000);
    let mesh = triangulate(&points);

    assert_valid(&mesh);

    // 一般位置下三角形数 = 2n - 2 - k
    let n = points.len();
    let k = mesh.hull().len();
    assert_eq!(mesh.triangle_count(), 2 * n - 2 - k);
    assert!(mesh.triangle_count() <= 2 * n - 5);
    assert_eq!(k, convex_hull_size(&points));
}

#[test]
fn test_random_points_brute_force() {
    for seed in 0..5 {
        let points = seeded_points(seed, 150);
        let mesh = triangulate(&points);
        assert!(
            validate_delaunay_brute_force(&mesh),
            "种子 {} 的剖分不满足 Delaunay 性质",
            seed
        );
    }
}

#[test]
fn test_matches_delaunator() {
    // 与 delaunator 库交叉验证三角形数和凸包大小
    for seed in [1, 7, 2024] {
        let points = seeded_points(seed, 500);
        let mesh = triangulate(&points);

        let reference: Vec<delaunator::Point> = points
            .iter()
            .map(|p| delaunator::Point {
                x: p.x as f64,
                y: p.y as f64,
            })
            .collect();
        let expected = delaunator::triangulate(&reference);

        assert_eq!(mesh.triangle_count(), expected.len(), "种子 {} 三角形数不一致", seed);
        assert_eq!(mesh.hull().len(), expected.hull.len(), "种子 {} 凸包大小不一致", seed);
    }
}

#[test]
fn test_edges_around_every_point() {
    let points = seeded_points(3, 200);
    let mesh = triangulate(&points);

    // 每个点取一条入边，凸包点取边界入边
    let mut inedges: Vec<Option<u32>> = vec![None; points.len()];
    for e in 0..mesh.halfedge_count() as u32 {
        let p = mesh.halfedge_end(e) as usize;
        if mesh.is_boundary(e) || inedges[p].is_none() {
            inedges[p] = Some(e);
        }
    }

    // 度数之和 = 边数 × 2；凸包点的扇形少一条出边
    let degree_sum: usize = inedges
        .iter()
        .flatten()
        .map(|&e| {
            let fan = mesh.edges_around_point(e);
            if mesh.is_boundary(e) {
                fan.len() + 1
            } else {
                fan.len()
            }
        })
        .sum();
    assert_eq!(degree_sum, mesh.edges().count() * 2);
}
