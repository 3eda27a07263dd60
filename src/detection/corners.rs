use image::GrayImage;
use imageproc::geometry::contour_area;
use imageproc::point::Point;
use tracing::{debug, instrument};

use crate::detection::contours::{find_outlines, perimeter};
use crate::models::{CandidateQuad, Curve, QuadSearch};

/// Look for the document's four corners in a stabilized binary image.
///
/// Outlines are ranked by enclosed area and only the `candidate_cap` largest
/// are tried, in order. Each is simplified with a closed Douglas-Peucker pass
/// at `tolerance * perimeter`; the first one that comes out with exactly four
/// vertices wins. There is no retry at another tolerance.
#[instrument(skip(stabilized), fields(width = stabilized.width(), height = stabilized.height()))]
pub fn find_quad(stabilized: &GrayImage, tolerance: f64, candidate_cap: usize) -> QuadSearch {
    let ranked = rank_by_area(find_outlines(stabilized), candidate_cap);
    let candidates = ranked.len();

    let found = ranked.iter().enumerate().find_map(|(rank, (area, curve))| {
        let epsilon = tolerance * perimeter(curve);
        let simplified = approximate_closed(curve, epsilon);
        debug!(rank, area, epsilon, vertices = simplified.len(), "candidate simplified");

        <[Point<i32>; 4]>::try_from(simplified)
            .ok()
            .map(|points| CandidateQuad { points, rank })
    });

    match found {
        Some(quad) => QuadSearch::Found(quad),
        None => QuadSearch::NotFound { candidates },
    }
}

/// Largest-area outlines first, at most `cap` of them. Equal areas keep trace order.
pub fn rank_by_area(outlines: Vec<Curve>, cap: usize) -> Vec<(f64, Curve)> {
    let mut ranked: Vec<(f64, Curve)> = outlines
        .into_iter()
        .map(|curve| (contour_area(&curve), curve))
        .collect();
    ranked.sort_by(|a, b| b.0.total_cmp(&a.0));
    ranked.truncate(cap);
    ranked
}

/// Douglas-Peucker simplification of a closed curve.
///
/// The curve is cut at two mutually distant points (the point farthest from
/// the first sample, then the point farthest from that one); both chains are
/// simplified independently and joined. No vertex is repeated at the end.
pub fn approximate_closed(curve: &[Point<i32>], epsilon: f64) -> Vec<Point<i32>> {
    let n = curve.len();
    if n < 3 {
        return curve.to_vec();
    }

    let a = farthest_from(curve, 0);
    let b = farthest_from(curve, a);
    if curve[a] == curve[b] {
        return vec![curve[a]];
    }

    let rotated: Vec<Point<i32>> = curve[a..].iter().chain(&curve[..a]).copied().collect();
    let split = (b + n - a) % n;

    let mut forward = simplify_open(&rotated[..=split], epsilon);
    let mut back_chain = rotated[split..].to_vec();
    back_chain.push(rotated[0]);
    let mut back = simplify_open(&back_chain, epsilon);

    forward.pop();
    back.pop();
    forward.append(&mut back);
    forward
}

/// Douglas-Peucker on an open chain; both endpoints are always kept.
fn simplify_open(chain: &[Point<i32>], epsilon: f64) -> Vec<Point<i32>> {
    let n = chain.len();
    if n < 3 {
        return chain.to_vec();
    }

    let mut keep = vec![false; n];
    keep[0] = true;
    keep[n - 1] = true;

    let mut stack = vec![(0usize, n - 1)];
    while let Some((start, end)) = stack.pop() {
        if end <= start + 1 {
            continue;
        }
        let (index, dmax) = ((start + 1)..end)
            .map(|i| (i, distance_to_line(chain[i], chain[start], chain[end])))
            .fold((start, 0.0), |best, cur| if cur.1 > best.1 { cur } else { best });

        if dmax > epsilon {
            keep[index] = true;
            stack.push((start, index));
            stack.push((index, end));
        }
    }

    chain
        .iter()
        .zip(keep)
        .filter_map(|(p, k)| k.then_some(*p))
        .collect()
}

fn farthest_from(curve: &[Point<i32>], from: usize) -> usize {
    let origin = curve[from];
    let mut best = from;
    let mut best_dist = 0i64;
    for (i, p) in curve.iter().enumerate() {
        let dx = (p.x - origin.x) as i64;
        let dy = (p.y - origin.y) as i64;
        let dist = dx * dx + dy * dy;
        if dist > best_dist {
            best = i;
            best_dist = dist;
        }
    }
    best
}

/// Perpendicular distance from `p` to the line through `a` and `b`
/// (plain distance to `a` when the two coincide).
fn distance_to_line(p: Point<i32>, a: Point<i32>, b: Point<i32>) -> f64 {
    let (px, py) = (p.x as f64, p.y as f64);
    let (ax, ay) = (a.x as f64, a.y as f64);
    let (bx, by) = (b.x as f64, b.y as f64);
    let (dx, dy) = (bx - ax, by - ay);
    let len = dx.hypot(dy);
    if len == 0.0 {
        return (px - ax).hypot(py - ay);
    }
    ((px - ax) * dy - (py - ay) * dx).abs() / len
}
