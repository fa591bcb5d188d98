// src/geometry.rs - Palm orientation and convex hull outlines
use crate::landmarks::{Keypoint, Side, INDEX_MCP, PINKY_MCP, WRIST};
use nalgebra::Vector2;

/// Below this |sin| of the wrist angle the palm triangle counts as collinear.
const DEGENERATE_SINE: f64 = 1e-9;

/// Returns true when the palm faces the viewer.
///
/// Uses the winding of the (wrist, index MCP, pinky MCP) triangle in y-down
/// image space. A right palm facing the camera winds negative, a left palm
/// positive. Degenerate triangles and short poses are reported as back-facing.
pub fn is_front(pose: &[Keypoint], side: Side) -> bool {
    if pose.len() <= PINKY_MCP {
        return false;
    }

    let wrist = pose[WRIST].xy();
    let to_index = pose[INDEX_MCP].xy() - wrist;
    let to_pinky = pose[PINKY_MCP].xy() - wrist;

    let cross = to_index.perp(&to_pinky);
    let scale = to_index.norm() * to_pinky.norm();
    if !(scale > 0.0) || (cross / scale).abs() < DEGENERATE_SINE {
        return false;
    }

    match side {
        Side::Right => cross < 0.0,
        Side::Left => cross > 0.0,
    }
}

/// Below this |sin| of the turn angle hull candidates count as collinear.
const COLLINEAR_SINE: f64 = 1e-9;

/// Gift-wrapping (Jarvis march) convex hull.
///
/// Returns indices into `points` in wrapping order, each index at most once.
/// Inputs with fewer than three points, or whose points are all (nearly)
/// collinear, come back as every index in input order.
pub fn giftwrap(points: &[Keypoint]) -> Vec<usize> {
    let n = points.len();
    if n < 3 {
        return (0..n).collect();
    }

    let xy: Vec<Vector2<f64>> = points.iter().map(Keypoint::xy).collect();

    // Lowest y, then lowest x
    let start = (1..n).fold(0, |best, i| {
        if xy[i].y < xy[best].y || (xy[i].y == xy[best].y && xy[i].x < xy[best].x) {
            i
        } else {
            best
        }
    });

    let mut hull = vec![start];
    let mut on_hull = vec![false; n];
    on_hull[start] = true;
    let mut current = start;

    // Every step claims a new index, so this ends within n steps
    loop {
        let mut candidate: Option<usize> = None;

        for i in 0..n {
            if xy[i] == xy[current] || (on_hull[i] && i != start) {
                continue;
            }
            let Some(c) = candidate else {
                candidate = Some(i);
                continue;
            };

            let edge = xy[c] - xy[current];
            let other = xy[i] - xy[current];
            let turn = edge.perp(&other);
            let tolerance = COLLINEAR_SINE * edge.norm() * other.norm();

            // Keep everything on the left; near-collinear ties take the farthest point
            if turn < -tolerance || (turn.abs() <= tolerance && other.norm_squared() > edge.norm_squared()) {
                candidate = Some(i);
            }
        }

        let Some(next) = candidate else {
            // All points coincide
            break;
        };
        if next == start || xy[next] == xy[start] {
            break;
        }

        on_hull[next] = true;
        hull.push(next);
        current = next;
    }

    drop_flat_vertices(&xy, &mut hull);

    if hull.len() < 3 {
        return (0..n).collect();
    }
    hull
}

/// Removes hull vertices whose turn is not strictly convex.
fn drop_flat_vertices(xy: &[Vector2<f64>], hull: &mut Vec<usize>) {
    while hull.len() >= 3 {
        let len = hull.len();
        let flat = (0..len).find(|&k| {
            let prev = xy[hull[(k + len - 1) % len]];
            let here = xy[hull[k]];
            let next = xy[hull[(k + 1) % len]];
            let incoming = here - prev;
            let outgoing = next - here;
            incoming.perp(&outgoing) <= COLLINEAR_SINE * incoming.norm() * outgoing.norm()
        });

        match flat {
            Some(k) => {
                hull.remove(k);
            }
            None => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pts(coords: &[(f64, f64)]) -> Vec<Keypoint> {
        coords.iter().map(|&(x, y)| Keypoint::new(x, y)).collect()
    }

    fn palm(wrist: (f64, f64), index: (f64, f64), pinky: (f64, f64)) -> Vec<Keypoint> {
        let mut pose = vec![Keypoint::new(0.0, 0.0); 21];
        pose[WRIST] = Keypoint::new(wrist.0, wrist.1);
        pose[INDEX_MCP] = Keypoint::new(index.0, index.1);
        pose[PINKY_MCP] = Keypoint::new(pinky.0, pinky.1);
        pose
    }

    #[test]
    fn test_right_palm_facing_camera() {
        // Fingers up, thumb side on the image right
        let pose = palm((0.0, 10.0), (2.0, 0.0), (-2.0, 0.0));
        assert!(is_front(&pose, Side::Right));
        assert!(!is_front(&pose, Side::Left));
    }

    #[test]
    fn test_right_back_of_hand() {
        let pose = palm((0.0, 10.0), (-2.0, 0.0), (2.0, 0.0));
        assert!(!is_front(&pose, Side::Right));
        assert!(is_front(&pose, Side::Left));
    }

    #[test]
    fn test_collinear_palm_is_back() {
        let pose = palm((0.0, 0.0), (1.0, 1.0), (2.0, 2.0));
        assert!(!is_front(&pose, Side::Right));
        assert!(!is_front(&pose, Side::Left));

        let coincident = palm((3.0, 3.0), (3.0, 3.0), (3.0, 3.0));
        assert!(!is_front(&coincident, Side::Right));
    }

    #[test]
    fn test_short_pose_is_back() {
        assert!(!is_front(&[], Side::Right));
        assert!(!is_front(&pts(&[(0.0, 0.0), (1.0, 0.0), (0.0, 1.0)]), Side::Left));
    }

    #[test]
    fn test_square_with_interior_point() {
        let points = pts(&[(0.0, 0.0), (4.0, 0.0), (2.0, 2.0), (4.0, 4.0), (0.0, 4.0)]);
        let hull = giftwrap(&points);
        assert_eq!(hull, vec![0, 1, 3, 4]);
    }

    #[test]
    fn test_start_is_lowest_y_then_lowest_x() {
        let points = pts(&[(5.0, 1.0), (3.0, 0.0), (1.0, 0.0), (2.0, 5.0)]);
        let hull = giftwrap(&points);
        assert_eq!(hull[0], 2);
        assert_eq!(hull.len(), 4);
    }

    #[test]
    fn test_collinear_edge_point_skipped() {
        let points = pts(&[(0.0, 0.0), (2.0, 0.0), (4.0, 0.0), (2.0, 3.0)]);
        assert_eq!(giftwrap(&points), vec![0, 2, 3]);
    }

    #[test]
    fn test_fewer_than_three_points() {
        assert!(giftwrap(&[]).is_empty());
        assert_eq!(giftwrap(&pts(&[(1.0, 1.0)])), vec![0]);
        assert_eq!(giftwrap(&pts(&[(1.0, 1.0), (0.0, 0.0)])), vec![0, 1]);
    }

    #[test]
    fn test_three_collinear_points() {
        let points = pts(&[(0.0, 0.0), (1.0, 1.0), (2.0, 2.0)]);
        assert_eq!(giftwrap(&points), vec![0, 1, 2]);
    }

    #[test]
    fn test_duplicates_terminate() {
        let points = pts(&[
            (0.0, 0.0),
            (0.0, 0.0),
            (3.0, 0.0),
            (3.0, 0.0),
            (0.0, 3.0),
            (0.0, 3.0),
            (1.0, 1.0),
        ]);
        let hull = giftwrap(&points);
        assert_eq!(hull.len(), 3);
        assert_eq!(hull[0], 0);
    }

    #[test]
    fn test_near_collinear_run_gives_triangle() {
        // Slope 7 with 0.1 steps is not exact in binary
        let mut points: Vec<Keypoint> = (0..9)
            .map(|t| {
                let t = t as f64 * 1.3;
                Keypoint::new(0.1 * t + 0.3, 0.7 * t + 0.1)
            })
            .collect();
        points.swap(2, 8);
        points.push(Keypoint::new(5.0, 1.0));

        let hull = giftwrap(&points);
        let mut sorted = hull.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, vec![0, 2, 9]);
    }

    #[test]
    fn test_all_points_coincident() {
        let points = pts(&[(2.0, 2.0); 5]);
        assert_eq!(giftwrap(&points), vec![0, 1, 2, 3, 4]);
    }
}
