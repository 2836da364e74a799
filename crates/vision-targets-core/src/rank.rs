use crate::geometry::Centered;
use nalgebra::Point2;

/// Order primitives by distance from `reference` (nearest first).
///
/// The sort is stable, so equal distances keep their input order. The input
/// slice is left untouched.
pub fn rank_by_proximity<T: Centered + Clone>(items: &[T], reference: Point2<f32>) -> Vec<T> {
    let mut keyed: Vec<(f32, &T)> = items
        .iter()
        .map(|it| ((it.center() - reference).norm(), it))
        .collect();
    keyed.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
    keyed.into_iter().map(|(_, it)| it.clone()).collect()
}

/// Same ordering as [`rank_by_proximity`], returned as input indices.
pub fn proximity_order<T: Centered>(items: &[T], reference: Point2<f32>) -> Vec<usize> {
    let mut idx: Vec<usize> = (0..items.len()).collect();
    idx.sort_by(|&a, &b| {
        let da = (items[a].center() - reference).norm();
        let db = (items[b].center() - reference).norm();
        da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
    });
    idx
}
