use thiserror::Error;

#[cfg(feature = "screen")]
pub mod screen;

#[cfg(test)]
pub(crate) mod mock;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CaptureError {
    #[error("no display available to capture")]
    NoDisplay,

    #[error("invalid frame: {0}")]
    InvalidFrame(String),

    #[error("{0}")]
    Backend(String),
}

/// Something that can hand us a picture of the screen.
///
/// Implementations own whatever temporary state the capture needs;
/// `cleanup` is called once when a continuous session is cancelled.
pub trait ScreenCapture {
    fn capture(&mut self) -> Result<Frame, CaptureError>;

    fn cleanup(&mut self) -> Result<(), CaptureError> {
        Ok(())
    }
}

/// A raw, row-major pixel buffer. Each pixel has `channels` bytes, the
/// first three of which are red, green and blue. Anything after that
/// (usually alpha) is ignored.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    width: u32,
    height: u32,
    channels: usize,
    data: Vec<u8>,
}

impl Frame {
    pub fn new(
        width: u32,
        height: u32,
        channels: usize,
        data: Vec<u8>,
    ) -> Result<Self, CaptureError> {
        if width == 0 || height == 0 {
            return Err(CaptureError::InvalidFrame(format!(
                "empty frame ({width}x{height})"
            )));
        }

        if channels < 3 {
            return Err(CaptureError::InvalidFrame(format!(
                "{channels} channels per pixel, need at least 3"
            )));
        }

        let expected = width as usize * height as usize * channels;
        if data.len() != expected {
            return Err(CaptureError::InvalidFrame(format!(
                "{} bytes of pixel data, expected {expected} for {width}x{height}x{channels}",
                data.len()
            )));
        }

        Ok(Self {
            width,
            height,
            channels,
            data,
        })
    }

    /// A frame filled with a single RGB color.
    pub fn solid(width: u32, height: u32, rgb: [u8; 3]) -> Result<Self, CaptureError> {
        let pixels = width as usize * height as usize;
        Self::new(width, height, 3, rgb.repeat(pixels))
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// The RGB part of every pixel, in scan order.
    pub fn pixels(&self) -> impl Iterator<Item = [u8; 3]> + '_ {
        self.data
            .chunks_exact(self.channels)
            .map(|pixel| [pixel[0], pixel[1], pixel[2]])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_rejects_bad_sizes() {
        assert!(Frame::new(0, 4, 3, vec![]).is_err());
        assert!(Frame::new(2, 2, 2, vec![0; 8]).is_err());
        assert!(Frame::new(2, 2, 3, vec![0; 11]).is_err());
        assert!(Frame::new(2, 2, 4, vec![0; 16]).is_ok());
    }

    #[test]
    fn test_pixels_drop_extra_channels() {
        let frame = Frame::new(2, 1, 4, vec![1, 2, 3, 255, 4, 5, 6, 128]).unwrap();

        assert_eq!(2, frame.pixel_count());
        assert_eq!(vec![[1, 2, 3], [4, 5, 6]], frame.pixels().collect::<Vec<_>>());
    }

    #[test]
    fn test_solid_frame() {
        let frame = Frame::solid(3, 2, [9, 8, 7]).unwrap();

        assert_eq!(6, frame.pixels().filter(|p| *p == [9, 8, 7]).count());
    }
}
