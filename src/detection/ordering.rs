use imageproc::point::Point;

use crate::models::OrderedCorners;

/// Label four unordered points by corner role.
///
/// top-left minimises `x + y`, bottom-right maximises it; top-right minimises
/// `y - x`, bottom-left maximises it. Exact ties go to the earliest point in
/// `points`.
pub fn order_points(points: [Point<f32>; 4]) -> OrderedCorners {
    let sum = |p: &Point<f32>| p.x + p.y;
    let diff = |p: &Point<f32>| p.y - p.x;

    OrderedCorners {
        top_left: points[arg_extreme(&points, sum, Extreme::Min)],
        top_right: points[arg_extreme(&points, diff, Extreme::Min)],
        bottom_right: points[arg_extreme(&points, sum, Extreme::Max)],
        bottom_left: points[arg_extreme(&points, diff, Extreme::Max)],
    }
}

#[derive(Clone, Copy)]
enum Extreme {
    Min,
    Max,
}

fn arg_extreme(points: &[Point<f32>; 4], key: impl Fn(&Point<f32>) -> f32, extreme: Extreme) -> usize {
    let mut best = 0;
    let mut best_key = key(&points[0]);
    for (i, p) in points.iter().enumerate().skip(1) {
        let k = key(p);
        let better = match extreme {
            Extreme::Min => k < best_key,
            Extreme::Max => k > best_key,
        };
        if better {
            best = i;
            best_key = k;
        }
    }
    best
}
