//! Left/right stripe pairing.
//!
//! Each side is the candidate whose rotation best matches that side's
//! expected angle. The two searches run independently over the full
//! candidate list, so one rectangle can win both; the gate rejects that case
//! rather than falling back to a runner-up.

use serde::{Deserialize, Serialize};
use vision_targets_core::RotatedRect;

use crate::params::HatchParams;

/// Accepted left/right correlation for one frame.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TargetPair {
    pub left: RotatedRect,
    pub right: RotatedRect,
}

/// Why a candidate set did not yield a pair.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PairRejection {
    NoCandidates,
    TooFewCandidates { count: usize },
    /// The same rectangle was the best match for both sides.
    SameCandidate { index: usize },
    AngleOutOfTolerance { left_diff: f32, right_diff: f32 },
}

impl std::fmt::Display for PairRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PairRejection::NoCandidates => write!(f, "no candidates"),
            PairRejection::TooFewCandidates { count } => write!(f, "{count} candidate(s), need 2"),
            PairRejection::SameCandidate { index } => {
                write!(f, "candidate {index} best for both sides")
            }
            PairRejection::AngleOutOfTolerance {
                left_diff,
                right_diff,
            } => write!(f, "angle gate failed (left {left_diff:.1}, right {right_diff:.1})"),
        }
    }
}

/// `| |angle| - |expected| |`, degrees.
#[inline]
pub fn angle_diff(angle: f32, expected: f32) -> f32 {
    (angle.abs() - expected.abs()).abs()
}

/// Index and diff of the first rectangle with the smallest [`angle_diff`].
pub fn best_angle_match(rects: &[RotatedRect], expected: f32) -> Option<(usize, f32)> {
    let mut best: Option<(usize, f32)> = None;
    for (i, r) in rects.iter().enumerate() {
        let d = angle_diff(r.angle, expected);
        if best.is_none_or(|(_, bd)| d < bd) {
            best = Some((i, d));
        }
    }
    best
}

/// Pick the left/right pair from candidates already in ranked order.
pub fn evaluate_pair(
    rects: &[RotatedRect],
    params: &HatchParams,
) -> Result<TargetPair, PairRejection> {
    let (Some((left, left_diff)), Some((right, right_diff))) = (
        best_angle_match(rects, params.expected_left_angle_deg),
        best_angle_match(rects, params.expected_right_angle_deg),
    ) else {
        return Err(PairRejection::NoCandidates);
    };
    if rects.len() < 2 {
        return Err(PairRejection::TooFewCandidates { count: rects.len() });
    }
    if left == right {
        return Err(PairRejection::SameCandidate { index: left });
    }
    let tol = params.angle_tolerance_deg;
    if !(left_diff < tol && right_diff < tol) {
        return Err(PairRejection::AngleOutOfTolerance {
            left_diff,
            right_diff,
        });
    }
    Ok(TargetPair {
        left: rects[left],
        right: rects[right],
    })
}

/// [`evaluate_pair`] without the rejection detail.
pub fn select_pair(rects: &[RotatedRect], params: &HatchParams) -> Option<TargetPair> {
    evaluate_pair(rects, params).ok()
}
