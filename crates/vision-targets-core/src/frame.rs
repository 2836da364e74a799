/// Pixel layout of a [`Frame`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PixelFormat {
    Gray8,
    /// Interleaved 8-bit B, G, R (camera-native order).
    Bgr8,
    Rgb8,
}

impl PixelFormat {
    #[inline]
    pub fn channels(self) -> usize {
        match self {
            PixelFormat::Gray8 => 1,
            PixelFormat::Bgr8 | PixelFormat::Rgb8 => 3,
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    #[error("invalid frame dimensions (width={width}, height={height})")]
    InvalidDimensions { width: usize, height: usize },
    #[error("invalid frame buffer length (expected {expected} bytes, got {got})")]
    InvalidBuffer { expected: usize, got: usize },
}

/// One captured camera image, row-major, immutable once built.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    width: usize,
    height: usize,
    format: PixelFormat,
    data: Vec<u8>,
}

impl Frame {
    pub fn new(
        width: usize,
        height: usize,
        format: PixelFormat,
        data: Vec<u8>,
    ) -> Result<Self, FrameError> {
        let expected = width
            .checked_mul(height)
            .and_then(|n| n.checked_mul(format.channels()))
            .ok_or(FrameError::InvalidDimensions { width, height })?;
        if data.len() != expected {
            return Err(FrameError::InvalidBuffer {
                expected,
                got: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            format,
            data,
        })
    }

    /// All-zero frame, handy as a placeholder before the first grab.
    pub fn blank(width: usize, height: usize, format: PixelFormat) -> Self {
        Self {
            width,
            height,
            format,
            data: vec![0; width * height * format.channels()],
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Channel values at `(x, y)`, `None` outside the image.
    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> Option<&[u8]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let ch = self.format.channels();
        let start = (y * self.width + x) * ch;
        self.data.get(start..start + ch)
    }
}

#[cfg(feature = "image")]
impl From<::image::GrayImage> for Frame {
    fn from(img: ::image::GrayImage) -> Self {
        let (w, h) = img.dimensions();
        Self {
            width: w as usize,
            height: h as usize,
            format: PixelFormat::Gray8,
            data: img.into_raw(),
        }
    }
}

#[cfg(feature = "image")]
impl From<::image::RgbImage> for Frame {
    fn from(img: ::image::RgbImage) -> Self {
        let (w, h) = img.dimensions();
        Self {
            width: w as usize,
            height: h as usize,
            format: PixelFormat::Rgb8,
            data: img.into_raw(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_short_buffer() {
        let err = Frame::new(4, 2, PixelFormat::Bgr8, vec![0; 10]).unwrap_err();
        assert_eq!(
            err,
            FrameError::InvalidBuffer {
                expected: 24,
                got: 10
            }
        );
    }

    #[test]
    fn pixel_lookup() {
        let data: Vec<u8> = (0..12).collect();
        let f = Frame::new(2, 2, PixelFormat::Rgb8, data).unwrap();
        assert_eq!(f.pixel(1, 1), Some(&[9u8, 10, 11][..]));
        assert_eq!(f.pixel(2, 0), None);
    }

    #[cfg(feature = "image")]
    #[test]
    fn from_gray_image_keeps_layout() {
        let img = ::image::GrayImage::from_fn(3, 2, |x, y| ::image::Luma([(y * 3 + x) as u8]));
        let f = Frame::from(img);
        assert_eq!((f.width(), f.height(), f.format()), (3, 2, PixelFormat::Gray8));
        assert_eq!(f.pixel(2, 1), Some(&[5u8][..]));
    }

    #[cfg(feature = "image")]
    #[test]
    fn from_rgb_image_keeps_channels() {
        let img = ::image::RgbImage::from_pixel(2, 2, ::image::Rgb([1, 2, 3]));
        let f = Frame::from(img);
        assert_eq!(f.format(), PixelFormat::Rgb8);
        assert_eq!(f.data().len(), 12);
        assert_eq!(f.pixel(1, 1), Some(&[1u8, 2, 3][..]));
    }
}
