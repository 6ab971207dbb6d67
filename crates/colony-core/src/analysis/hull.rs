//! Convex hull of a pixel region, used for solidity.
//!
//! Coordinates are doubled so pixel corners and pixel centers are both
//! integers: pixel `(r, c)` covers `[2r, 2r+2] x [2c, 2c+2]` and has its
//! center at `(2r+1, 2c+1)`. All predicates are exact.

type Point = (i64, i64);

/// Area of a region divided by the number of pixels whose centers lie in the
/// convex hull of the region's pixel corners.
///
/// `rows` lists, for each occupied row, `(row, min_col, max_col)`. Only the
/// extreme pixels of each row can contribute hull vertices.
pub fn solidity(area: usize, rows: &[(usize, usize, usize)]) -> f64 {
    let hull_area = hull_pixel_count(rows);
    if hull_area == 0 {
        return 0.0;
    }
    area as f64 / hull_area as f64
}

/// Count pixels whose centers fall inside or on the convex hull.
pub fn hull_pixel_count(rows: &[(usize, usize, usize)]) -> usize {
    let mut points: Vec<Point> = Vec::with_capacity(rows.len() * 4);
    for &(row, min_col, max_col) in rows {
        let (r, c0, c1) = (row as i64, min_col as i64, max_col as i64);
        points.push((2 * r, 2 * c0));
        points.push((2 * r + 2, 2 * c0));
        points.push((2 * r, 2 * c1 + 2));
        points.push((2 * r + 2, 2 * c1 + 2));
    }
    let hull = convex_hull(points);
    if hull.len() < 3 {
        return 0;
    }

    let r_min = rows.iter().map(|r| r.0).min().unwrap_or(0);
    let r_max = rows.iter().map(|r| r.0).max().unwrap_or(0);
    let c_min = rows.iter().map(|r| r.1).min().unwrap_or(0);
    let c_max = rows.iter().map(|r| r.2).max().unwrap_or(0);

    let mut count = 0;
    for row in r_min..=r_max {
        for col in c_min..=c_max {
            let center = (2 * row as i64 + 1, 2 * col as i64 + 1);
            if contains(&hull, center) {
                count += 1;
            }
        }
    }
    count
}

fn cross(o: Point, a: Point, b: Point) -> i64 {
    (a.0 - o.0) * (b.1 - o.1) - (a.1 - o.1) * (b.0 - o.0)
}

/// Andrew's monotone chain; returns the hull counter-clockwise without
/// collinear points.
fn convex_hull(mut points: Vec<Point>) -> Vec<Point> {
    points.sort_unstable();
    points.dedup();
    if points.len() < 3 {
        return points;
    }

    let mut lower: Vec<Point> = Vec::new();
    for &p in &points {
        while lower.len() >= 2 && cross(lower[lower.len() - 2], lower[lower.len() - 1], p) <= 0 {
            lower.pop();
        }
        lower.push(p);
    }
    let mut upper: Vec<Point> = Vec::new();
    for &p in points.iter().rev() {
        while upper.len() >= 2 && cross(upper[upper.len() - 2], upper[upper.len() - 1], p) <= 0 {
            upper.pop();
        }
        upper.push(p);
    }
    lower.pop();
    upper.pop();
    lower.extend(upper);
    lower
}

fn contains(hull: &[Point], p: Point) -> bool {
    let n = hull.len();
    (0..n).all(|i| cross(hull[i], hull[(i + 1) % n], p) >= 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rectangle_is_fully_solid() {
        let rows: Vec<_> = (0..4).map(|r| (r, 2, 8)).collect();
        assert_eq!(hull_pixel_count(&rows), 4 * 7);
        assert_eq!(solidity(28, &rows), 1.0);
    }

    #[test]
    fn test_l_shape_is_not_solid() {
        // Vertical bar of 5 plus a foot of 4 extra pixels.
        let mut rows: Vec<_> = (0..4).map(|r| (r, 0, 0)).collect();
        rows.push((4, 0, 4));
        let s = solidity(9, &rows);
        assert!(s < 0.8, "solidity {s}");
    }
}
