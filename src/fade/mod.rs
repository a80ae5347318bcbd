use std::num::NonZeroU32;

use crate::color::Color;

/// Linear fade between two colors, sampled at `steps` evenly spaced points.
///
/// Both ends are on the path: the first sample is `from` and, with more than
/// one step, the last is `to`. A single step only yields `from`. Channels are
/// interpolated independently and floored, with no gamma correction.
///
/// The iterator is consumed once; build a new one to fade again.
#[derive(Clone, Debug)]
pub struct Fade {
    from: Color,
    to: Color,
    steps: u32,
    next: u32,
}

impl Fade {
    pub fn new(from: Color, to: Color, steps: NonZeroU32) -> Self {
        Self {
            from,
            to,
            steps: steps.get(),
            next: 0,
        }
    }

    fn sample(&self, index: u32) -> Color {
        if index + 1 == self.steps && self.steps > 1 {
            return self.to;
        }

        let from = self.from.channels();
        let to = self.to.channels();
        let out: [u8; 3] =
            std::array::from_fn(|channel| lerp(from[channel], to[channel], index, self.steps));

        out.into()
    }
}

/// Value at position `index` of `steps` evenly spaced points from `from` to
/// `to` inclusive.
fn lerp(from: u8, to: u8, index: u32, steps: u32) -> u8 {
    if steps < 2 {
        return from;
    }

    let delta = (f64::from(to) - f64::from(from)) / f64::from(steps - 1);
    let value = f64::from(from) + f64::from(index) * delta;

    value.floor().clamp(0.0, 255.0) as u8
}

impl Iterator for Fade {
    type Item = Color;

    fn next(&mut self) -> Option<Color> {
        if self.next >= self.steps {
            return None;
        }

        let color = self.sample(self.next);
        self.next += 1;
        Some(color)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.steps - self.next) as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Fade {}
