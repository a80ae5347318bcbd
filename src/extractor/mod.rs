//! Dominant color extraction.
//!
//! Every pixel is mapped onto a single index in a 3D color cube
//! (`red * green_size * blue_size + green * blue_size + blue`) and counted.
//! The most common index wins. When several colors share the top count the
//! one with the lowest index is returned, which means lowest red, then green,
//! then blue. This falls out of scanning the cube in index order; it is not a
//! brightness or perceptual preference.

use std::collections::HashMap;

use log::debug;
use thiserror::Error;

use crate::{capture::Frame, color::Color};

/// Smallest size per channel that can hold every `u8` value.
pub const MIN_CUBE_SIDE: u32 = 256;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CubeError {
    #[error("cube side {side} is too small, every channel needs at least {MIN_CUBE_SIDE}")]
    TooSmall { side: u32 },

    #[error("cube of {red}x{green}x{blue} has more cells than a u32 index can address")]
    TooLarge { red: u32, green: u32, blue: u32 },
}

/// Dimensions of the histogram cube, one size per channel.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ColorCube {
    red: u32,
    green: u32,
    blue: u32,
}

impl Default for ColorCube {
    fn default() -> Self {
        Self {
            red: 256,
            green: 256,
            blue: 256,
        }
    }
}

impl ColorCube {
    /// A cube of `red * green * blue` cells. Each side must fit a whole `u8`
    /// channel and the whole cube must be addressable with a `u32` index.
    pub fn new(red: u32, green: u32, blue: u32) -> Result<Self, CubeError> {
        if let Some(&side) = [red, green, blue].iter().find(|&&s| s < MIN_CUBE_SIDE) {
            return Err(CubeError::TooSmall { side });
        }

        red.checked_mul(green)
            .and_then(|rg| rg.checked_mul(blue))
            .ok_or(CubeError::TooLarge { red, green, blue })?;

        Ok(Self { red, green, blue })
    }

    fn index(&self, [r, g, b]: [u8; 3]) -> u32 {
        (u32::from(r) * self.green + u32::from(g)) * self.blue + u32::from(b)
    }

    fn color(&self, index: u32) -> Color {
        let blue = index % self.blue;
        let green = (index / self.blue) % self.green;
        let red = index / (self.blue * self.green);

        // Channels never exceed 255 for any cube built from u8 pixels
        Color::new(red as u8, green as u8, blue as u8)
    }
}

#[derive(Copy, Clone, Debug, Default)]
pub struct ColorExtractor {
    cube: ColorCube,
}

impl ColorExtractor {
    pub fn new(cube: ColorCube) -> Self {
        Self { cube }
    }

    /// The most common color in `frame`.
    ///
    /// With `min_floor` set, a pure black result is lifted to
    /// `(min_floor, min_floor, min_floor)` so black screenshots don't turn the
    /// strip off. Without it, black is returned as is.
    pub fn dominant_color(&self, frame: &Frame, min_floor: Option<u8>) -> Color {
        // Wide counts, screenshots can have many millions of pixels
        let mut histogram: HashMap<u32, u64> = HashMap::new();
        for pixel in frame.pixels() {
            *histogram.entry(self.cube.index(pixel)).or_insert(0) += 1;
        }

        let (index, count) = histogram
            .into_iter()
            .fold((0, 0), |best, (index, count)| {
                if count > best.1 || (count == best.1 && index < best.0) {
                    (index, count)
                } else {
                    best
                }
            });

        let color = self.cube.color(index);
        debug!(
            "Dominant color {} covers {}/{} pixels",
            color,
            count,
            frame.pixel_count()
        );

        match min_floor {
            Some(floor) if color == Color::BLACK => Color::gray(floor),
            _ => color,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame_from(pixels: &[[u8; 3]]) -> Frame {
        let data = pixels.iter().flatten().copied().collect();
        Frame::new(pixels.len() as u32, 1, 3, data).unwrap()
    }

    #[test]
    fn test_majority_color_wins() {
        let mut pixels = vec![[10, 20, 30]; 90];
        pixels.extend(vec![[0, 0, 0]; 10]);

        let extractor = ColorExtractor::default();
        assert_eq!(
            Color::new(10, 20, 30),
            extractor.dominant_color(&frame_from(&pixels), None)
        );
        assert_eq!(
            Color::new(10, 20, 30),
            extractor.dominant_color(&frame_from(&pixels), Some(30))
        );
    }

    #[test]
    fn test_black_floor() {
        let frame = Frame::solid(16, 9, [0, 0, 0]).unwrap();
        let extractor = ColorExtractor::default();

        assert_eq!(Color::gray(30), extractor.dominant_color(&frame, Some(30)));
        assert_eq!(Color::BLACK, extractor.dominant_color(&frame, None));
    }

    #[test]
    fn test_floor_only_touches_pure_black() {
        let frame = Frame::solid(4, 4, [0, 0, 1]).unwrap();

        assert_eq!(
            Color::new(0, 0, 1),
            ColorExtractor::default().dominant_color(&frame, Some(30))
        );
    }

    #[test]
    fn test_ties_pick_lowest_index() {
        let pixels = [[200, 0, 0], [0, 5, 9], [0, 5, 3], [200, 0, 0], [0, 5, 9], [0, 5, 3]];

        assert_eq!(
            Color::new(0, 5, 3),
            ColorExtractor::default().dominant_color(&frame_from(&pixels), None)
        );
    }

    #[test]
    fn test_alpha_is_ignored() {
        let frame = Frame::new(
            3,
            1,
            4,
            vec![50, 60, 70, 0, 50, 60, 70, 255, 1, 2, 3, 255],
        )
        .unwrap();

        assert_eq!(
            Color::new(50, 60, 70),
            ColorExtractor::default().dominant_color(&frame, None)
        );
    }

    #[test]
    fn test_cube_index_round_trip() {
        let cube = ColorCube::default();

        assert_eq!(0x0A141E, cube.index([10, 20, 30]));
        assert_eq!(Color::new(255, 0, 128), cube.color(cube.index([255, 0, 128])));
    }

    #[test]
    fn test_cube_rejects_sides_smaller_than_a_channel() {
        assert_eq!(Err(CubeError::TooSmall { side: 16 }), ColorCube::new(16, 16, 16));
        assert_eq!(Err(CubeError::TooSmall { side: 255 }), ColorCube::new(256, 255, 256));
        assert_eq!(Ok(ColorCube::default()), ColorCube::new(256, 256, 256));
    }

    #[test]
    fn test_cube_rejects_index_overflow() {
        assert_eq!(
            Err(CubeError::TooLarge {
                red: 65536,
                green: 65536,
                blue: 65536
            }),
            ColorCube::new(65536, 65536, 65536)
        );
        // 2^24 * 256 = 2^32, one cell too many
        assert!(ColorCube::new(1 << 16, 256, 256).is_err());
        assert!(ColorCube::new(1 << 15, 256, 256).is_ok());
    }

    #[test]
    fn test_larger_cube_keeps_colors_exact() {
        let cube = ColorCube::new(300, 512, 1024).unwrap();
        let extractor = ColorExtractor::new(cube);
        let frame = Frame::solid(4, 4, [200, 10, 20]).unwrap();

        assert_eq!(Color::new(200, 10, 20), extractor.dominant_color(&frame, None));
        assert_eq!(Color::new(255, 255, 255), cube.color(cube.index([255, 255, 255])));
    }
}
