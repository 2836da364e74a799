use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};

/// Errors raised when building a [`Contour`] from raw points.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ContourError {
    #[error("contour needs at least 3 points, got {got}")]
    TooFewPoints { got: usize },
    #[error("contour point {index} is not finite")]
    NonFinitePoint { index: usize },
}

/// Closed polygon approximation of one thresholded blob, in pixel coordinates.
///
/// Always holds at least three finite points. Serialized as a plain array of
/// `[x, y]` pairs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Point2<f32>>", into = "Vec<Point2<f32>>")]
pub struct Contour {
    points: Vec<Point2<f32>>,
}

impl Contour {
    pub const MIN_POINTS: usize = 3;

    pub fn new(points: Vec<Point2<f32>>) -> Result<Self, ContourError> {
        if points.len() < Self::MIN_POINTS {
            return Err(ContourError::TooFewPoints { got: points.len() });
        }
        if let Some(index) = points
            .iter()
            .position(|p| !p.x.is_finite() || !p.y.is_finite())
        {
            return Err(ContourError::NonFinitePoint { index });
        }
        Ok(Self { points })
    }

    /// Convenience constructor from `(x, y)` tuples.
    pub fn from_xy(points: &[(f32, f32)]) -> Result<Self, ContourError> {
        Self::new(points.iter().map(|&(x, y)| Point2::new(x, y)).collect())
    }

    #[inline]
    pub fn points(&self) -> &[Point2<f32>] {
        &self.points
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl TryFrom<Vec<Point2<f32>>> for Contour {
    type Error = ContourError;

    fn try_from(points: Vec<Point2<f32>>) -> Result<Self, Self::Error> {
        Self::new(points)
    }
}

impl From<Contour> for Vec<Point2<f32>> {
    fn from(c: Contour) -> Self {
        c.points
    }
}

/// Upright integer box, `x`/`y` is the top-left pixel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

/// Minimum-area oriented box of a contour.
///
/// `angle` is in degrees within `[-90, 0)`: it is the rotation of the
/// `width` side from the image x axis (image y points down).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RotatedRect {
    pub center: Point2<f32>,
    pub width: f32,
    pub height: f32,
    pub angle: f32,
}

impl RotatedRect {
    /// Four corners: bottom-left, top-left, top-right, bottom-right relative
    /// to the rectangle's own frame.
    pub fn points(&self) -> [Point2<f32>; 4] {
        let (s, c) = self.angle.to_radians().sin_cos();
        let u = Vector2::new(c, s) * (self.width * 0.5);
        let v = Vector2::new(-s, c) * (self.height * 0.5);
        [
            self.center - u + v,
            self.center - u - v,
            self.center + u - v,
            self.center + u + v,
        ]
    }

    /// Smallest upright integer box containing all four corners.
    ///
    /// Width and height are inclusive pixel counts, so even a zero-size
    /// rectangle yields a 1x1 box.
    pub fn bounding_box(&self) -> BoundingBox {
        let pts = self.points();
        let mut min_x = f32::INFINITY;
        let mut min_y = f32::INFINITY;
        let mut max_x = f32::NEG_INFINITY;
        let mut max_y = f32::NEG_INFINITY;
        for p in &pts {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        // f64 math; spans past i32::MAX saturate.
        let x = (min_x as f64).floor();
        let y = (min_y as f64).floor();
        BoundingBox {
            x: x as i32,
            y: y as i32,
            width: ((max_x as f64).ceil() - x + 1.0) as i32,
            height: ((max_y as f64).ceil() - y + 1.0) as i32,
        }
    }

    #[inline]
    pub fn area(&self) -> f32 {
        self.width * self.height
    }
}

/// Minimum enclosing circle of a contour.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub center: Point2<f32>,
    pub radius: f32,
}

/// Anything with an image-space center that can be ranked by position.
pub trait Centered {
    fn center(&self) -> Point2<f32>;
}

impl Centered for RotatedRect {
    #[inline]
    fn center(&self) -> Point2<f32> {
        self.center
    }
}

impl Centered for Circle {
    #[inline]
    fn center(&self) -> Point2<f32> {
        self.center
    }
}

impl<T: Centered> Centered for &T {
    #[inline]
    fn center(&self) -> Point2<f32> {
        (*self).center()
    }
}
