use log::debug;
use vision_targets_core::{fit_rotated_rect, rank_by_proximity, Contour, RotatedRect};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::params::HatchParams;
use crate::record::{HatchOutcome, ResetReason, TargetRecord};
use crate::select::evaluate_pair;

/// Per-frame hatch pipeline: fit -> drop degenerate -> rank -> pair -> range.
///
/// Holds no state between frames.
#[derive(Clone, Debug, Default)]
pub struct HatchDetector {
    params: HatchParams,
}

impl HatchDetector {
    pub fn new(params: HatchParams) -> Self {
        Self { params }
    }

    #[inline]
    pub fn params(&self) -> &HatchParams {
        &self.params
    }

    /// Fitted, non-degenerate rectangles in proximity order.
    pub fn candidates(&self, contours: &[Contour]) -> Vec<RotatedRect> {
        let rects: Vec<RotatedRect> = contours.iter().map(fit_rotated_rect).collect();
        self.rank_rects(&rects)
    }

    fn rank_rects(&self, rects: &[RotatedRect]) -> Vec<RotatedRect> {
        let min_side = self.params.min_side_px;
        let kept: Vec<RotatedRect> = rects
            .iter()
            .filter(|r| r.width > min_side && r.height > min_side)
            .copied()
            .collect();
        if kept.len() < rects.len() {
            debug!(
                "dropped {} degenerate rectangle(s)",
                rects.len() - kept.len()
            );
        }
        rank_by_proximity(&kept, self.params.reference_point)
    }

    /// Run the full pipeline on one frame's contours.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip(self, contours), fields(contours = contours.len()))
    )]
    pub fn detect(&self, contours: &[Contour]) -> HatchOutcome {
        let ranked = self.candidates(contours);
        self.pair_and_range(&ranked)
    }

    /// Same as [`detect`](Self::detect) for rectangles fitted elsewhere.
    pub fn detect_rects(&self, rects: &[RotatedRect]) -> HatchOutcome {
        let ranked = self.rank_rects(rects);
        self.pair_and_range(&ranked)
    }

    fn pair_and_range(&self, ranked: &[RotatedRect]) -> HatchOutcome {
        let pair = match evaluate_pair(ranked, &self.params) {
            Ok(pair) => pair,
            Err(rejection) => {
                debug!("hatch reset: {rejection}");
                return HatchOutcome::Reset(ResetReason::Rejected(rejection));
            }
        };

        let cam = &self.params.camera;
        let records = TargetRecord::from_rect(&pair.left, cam)
            .and_then(|l| TargetRecord::from_rect(&pair.right, cam).map(|r| (l, r)));
        match records {
            Ok((left, right)) => {
                debug!(
                    "hatch pair: left d={:.2} a={:.1}, right d={:.2} a={:.1}",
                    left.distance, left.angle, right.distance, right.angle
                );
                HatchOutcome::Published { pair, left, right }
            }
            Err(e) => {
                debug!("hatch reset: {e}");
                HatchOutcome::Reset(ResetReason::DegenerateGeometry(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::select::PairRejection;
    use nalgebra::Point2;

    fn stripe(cx: f32, cy: f32, angle: f32) -> Contour {
        let r = RotatedRect {
            center: Point2::new(cx, cy),
            width: 6.0,
            height: 18.0,
            angle,
        };
        Contour::new(r.points().to_vec()).expect("contour")
    }

    #[test]
    fn no_contours_resets() {
        let det = HatchDetector::default();
        assert_eq!(
            det.detect(&[]),
            HatchOutcome::Reset(ResetReason::Rejected(PairRejection::NoCandidates))
        );
    }

    #[test]
    fn publishes_tilted_pair() {
        let det = HatchDetector::default();
        let contours = [stripe(190.0, 120.0, -75.5), stripe(226.0, 120.0, -14.5)];
        let out = det.detect(&contours);
        let HatchOutcome::Published { pair, left, right } = out else {
            panic!("expected a pair, got {out:?}");
        };
        assert!((pair.left.center.x - 190.0).abs() < 1e-3);
        assert!((pair.right.center.x - 226.0).abs() < 1e-3);
        assert!(left.distance > 0.0 && right.distance > 0.0);
        assert!((left.angle + 75.5).abs() < 1e-3);
    }

    #[test]
    fn collinear_contours_never_pair() {
        let det = HatchDetector::default();
        let flat = Contour::from_xy(&[(0.0, 0.0), (5.0, 5.0), (10.0, 10.0)]).unwrap();
        let out = det.detect(&[flat.clone(), flat, stripe(200.0, 120.0, -14.5)]);
        assert_eq!(
            out,
            HatchOutcome::Reset(ResetReason::Rejected(PairRejection::TooFewCandidates {
                count: 1
            }))
        );
    }

    fn rect(cx: f32, cy: f32, w: f32, h: f32, angle: f32) -> RotatedRect {
        RotatedRect {
            center: Point2::new(cx, cy),
            width: w,
            height: h,
            angle,
        }
    }

    #[test]
    fn closer_stripes_win_exact_ties() {
        let det = HatchDetector::default();
        let rects = [
            rect(20.0, 20.0, 6.0, 18.0, -75.5),
            rect(20.0, 200.0, 6.0, 18.0, -14.5),
            rect(200.0, 120.0, 6.0, 18.0, -75.5),
            rect(216.0, 120.0, 6.0, 18.0, -14.5),
        ];
        let HatchOutcome::Published { pair, .. } = det.detect_rects(&rects) else {
            panic!("expected pair");
        };
        assert_eq!(pair.left.center, Point2::new(200.0, 120.0));
        assert_eq!(pair.right.center, Point2::new(216.0, 120.0));
    }

    #[test]
    fn closer_stripe_ranks_first_after_fitting() {
        let det = HatchDetector::default();
        let contours = [stripe(20.0, 20.0, -75.5), stripe(200.0, 120.0, -75.5)];
        let ranked = det.candidates(&contours);
        assert!((ranked[0].center.x - 200.0).abs() < 1e-3);
    }

    #[test]
    fn smaller_angle_diff_beats_proximity() {
        // Ranking only breaks exact ties; a far stripe with a marginally
        // better angle still wins.
        let det = HatchDetector::default();
        let rects = [
            rect(200.0, 120.0, 6.0, 18.0, -75.50002),
            rect(20.0, 20.0, 6.0, 18.0, -75.5),
            rect(216.0, 120.0, 6.0, 18.0, -14.5),
        ];
        let HatchOutcome::Published { pair, .. } = det.detect_rects(&rects) else {
            panic!("expected pair");
        };
        assert_eq!(pair.left.center, Point2::new(20.0, 20.0));
    }

    #[test]
    fn min_side_drops_thin_rects() {
        let params = HatchParams {
            min_side_px: 3.0,
            ..HatchParams::default()
        };
        let det = HatchDetector::new(params);
        let rects = [
            rect(200.0, 120.0, 2.0, 18.0, -75.5),
            rect(216.0, 120.0, 6.0, 18.0, -14.5),
        ];
        assert_eq!(
            det.detect_rects(&rects),
            HatchOutcome::Reset(ResetReason::Rejected(PairRejection::TooFewCandidates {
                count: 1
            }))
        );
        // Same input passes with the default threshold.
        assert!(HatchDetector::default().detect_rects(&rects).is_published());
    }

    #[test]
    fn zero_side_rects_never_reach_ranging() {
        let det = HatchDetector::default();
        let rects = [
            rect(200.0, 120.0, 0.0, 18.0, -75.5),
            rect(216.0, 120.0, 6.0, 0.0, -14.5),
        ];
        assert_eq!(
            det.detect_rects(&rects),
            HatchOutcome::Reset(ResetReason::Rejected(PairRejection::NoCandidates))
        );
    }

    #[test]
    fn huge_stripes_do_not_overflow() {
        let det = HatchDetector::default();
        let rects = [
            rect(0.0, 0.0, 2e9, 4e9, -75.5),
            rect(1e9, 0.0, 2e9, 4e9, -14.5),
        ];
        let HatchOutcome::Published { left, right, .. } = det.detect_rects(&rects) else {
            panic!("expected pair");
        };
        assert!(left.width > 0.0 && left.distance.is_finite());
        assert!(right.height > 0.0 && right.distance.is_finite());
    }
}
