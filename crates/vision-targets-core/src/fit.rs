//! Shape fitting: contour -> canonical primitive.
//!
//! Both fitters are total over valid contours. Collinear or repeated points
//! produce a zero-area rectangle or a zero-radius circle instead of failing.

use crate::geometry::{Circle, Contour, RotatedRect};
use nalgebra::{Point2, Vector2};

#[cfg(feature = "tracing")]
use tracing::instrument;

const EPS: f64 = 1e-9;

/// Fit the minimum-area rotated rectangle (rotating calipers on the hull).
#[cfg_attr(feature = "tracing", instrument(level = "trace", skip(contour), fields(points = contour.len())))]
pub fn fit_rotated_rect(contour: &Contour) -> RotatedRect {
    min_area_rect(contour.points())
}

/// Fit the minimum enclosing circle (Welzl, iterative form).
#[cfg_attr(feature = "tracing", instrument(level = "trace", skip(contour), fields(points = contour.len())))]
pub fn fit_enclosing_circle(contour: &Contour) -> Circle {
    min_enclosing_circle(contour.points())
}

/// Convex hull in counter-clockwise order (Andrew's monotone chain).
///
/// Collinear points are dropped, so a degenerate input yields one or two
/// vertices.
pub fn convex_hull(points: &[Point2<f32>]) -> Vec<Point2<f64>> {
    let mut pts: Vec<Point2<f64>> = points.iter().map(|p| p.cast::<f64>()).collect();
    pts.sort_by(|a, b| {
        a.x.partial_cmp(&b.x)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.y.partial_cmp(&b.y).unwrap_or(std::cmp::Ordering::Equal))
    });
    pts.dedup();
    if pts.len() < 3 {
        return pts;
    }

    let mut hull: Vec<Point2<f64>> = Vec::with_capacity(pts.len() * 2);
    for &p in &pts {
        while hull.len() >= 2 && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= EPS {
            hull.pop();
        }
        hull.push(p);
    }
    let lower_len = hull.len() + 1;
    for &p in pts.iter().rev().skip(1) {
        while hull.len() >= lower_len && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= EPS
        {
            hull.pop();
        }
        hull.push(p);
    }
    hull.pop();
    hull
}

#[inline]
fn cross(o: Point2<f64>, a: Point2<f64>, b: Point2<f64>) -> f64 {
    (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
}

/// Minimum-area bounding rectangle of a point set.
pub fn min_area_rect(points: &[Point2<f32>]) -> RotatedRect {
    let hull = convex_hull(points);
    match hull.len() {
        0 => RotatedRect {
            center: Point2::origin(),
            width: 0.0,
            height: 0.0,
            angle: -90.0,
        },
        1 => RotatedRect {
            center: hull[0].cast::<f32>(),
            width: 0.0,
            height: 0.0,
            angle: -90.0,
        },
        _ => calipers(&hull),
    }
}

fn calipers(hull: &[Point2<f64>]) -> RotatedRect {
    let n = hull.len();
    // (area, u, extent along u, extent along v, center)
    let mut best: Option<(f64, Vector2<f64>, f64, f64, Point2<f64>)> = None;

    for i in 0..n {
        let edge = hull[(i + 1) % n] - hull[i];
        let len = edge.norm();
        if len < EPS {
            continue;
        }
        let u = edge / len;
        let v = Vector2::new(-u.y, u.x);

        let (mut min_u, mut max_u) = (f64::INFINITY, f64::NEG_INFINITY);
        let (mut min_v, mut max_v) = (f64::INFINITY, f64::NEG_INFINITY);
        for p in hull {
            let d = p.coords;
            let pu = d.dot(&u);
            let pv = d.dot(&v);
            min_u = min_u.min(pu);
            max_u = max_u.max(pu);
            min_v = min_v.min(pv);
            max_v = max_v.max(pv);
        }

        let ext_u = max_u - min_u;
        let ext_v = max_v - min_v;
        let area = ext_u * ext_v;
        if best.as_ref().is_none_or(|b| area < b.0 - EPS) {
            let c = u * ((min_u + max_u) * 0.5) + v * ((min_v + max_v) * 0.5);
            best = Some((area, u, ext_u, ext_v, Point2::from(c)));
        }
    }

    let Some((_, u, ext_u, ext_v, center)) = best else {
        return RotatedRect {
            center: hull[0].cast::<f32>(),
            width: 0.0,
            height: 0.0,
            angle: -90.0,
        };
    };

    // Pick whichever side direction lands in [-90, 0) mod 180 as the width.
    let mut t = u.y.atan2(u.x).to_degrees();
    while t >= 90.0 {
        t -= 180.0;
    }
    while t < -90.0 {
        t += 180.0;
    }
    let (angle, width, height) = if t < 0.0 {
        (t, ext_u, ext_v)
    } else {
        (t - 90.0, ext_v, ext_u)
    };

    RotatedRect {
        center: center.cast::<f32>(),
        width: width as f32,
        height: height as f32,
        angle: angle as f32,
    }
}

/// Smallest circle containing every point.
pub fn min_enclosing_circle(points: &[Point2<f32>]) -> Circle {
    let pts: Vec<Point2<f64>> = points.iter().map(|p| p.cast::<f64>()).collect();
    let Some(&first) = pts.first() else {
        return Circle {
            center: Point2::origin(),
            radius: 0.0,
        };
    };

    let mut c = first;
    let mut r = 0.0_f64;
    for i in 1..pts.len() {
        if contains(c, r, pts[i]) {
            continue;
        }
        c = pts[i];
        r = 0.0;
        for j in 0..i {
            if contains(c, r, pts[j]) {
                continue;
            }
            (c, r) = circle_from_two(pts[i], pts[j]);
            for k in 0..j {
                if contains(c, r, pts[k]) {
                    continue;
                }
                (c, r) = circle_from_three(pts[i], pts[j], pts[k]);
            }
        }
    }

    Circle {
        center: c.cast::<f32>(),
        radius: r as f32,
    }
}

#[inline]
fn contains(c: Point2<f64>, r: f64, p: Point2<f64>) -> bool {
    (p - c).norm() <= r + 1e-7 * (1.0 + r)
}

fn circle_from_two(a: Point2<f64>, b: Point2<f64>) -> (Point2<f64>, f64) {
    let c = nalgebra::center(&a, &b);
    (c, (a - b).norm() * 0.5)
}

/// Circumcircle, or the widest two-point circle when the points are collinear.
fn circle_from_three(a: Point2<f64>, b: Point2<f64>, c: Point2<f64>) -> (Point2<f64>, f64) {
    let ab = b - a;
    let ac = c - a;
    let d = 2.0 * (ab.x * ac.y - ab.y * ac.x);
    if d.abs() < EPS {
        let pairs = [(a, b), (a, c), (b, c)];
        let mut best = circle_from_two(a, b);
        for (p, q) in pairs {
            let cand = circle_from_two(p, q);
            if cand.1 > best.1 {
                best = cand;
            }
        }
        return best;
    }
    let ab2 = ab.norm_squared();
    let ac2 = ac.norm_squared();
    let ux = (ac.y * ab2 - ab.y * ac2) / d;
    let uy = (ab.x * ac2 - ac.x * ab2) / d;
    let offset = Vector2::new(ux, uy);
    (a + offset, offset.norm())
}
