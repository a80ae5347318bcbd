use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

/// A single 8-bit-per-channel RGB value, as the strip understands it.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Color {
    pub const BLACK: Color = Color::new(0, 0, 0);

    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// A grey where every channel has the same value.
    pub const fn gray(value: u8) -> Self {
        Self::new(value, value, value)
    }

    pub fn channels(&self) -> [u8; 3] {
        [self.red, self.green, self.blue]
    }
}

impl From<(u8, u8, u8)> for Color {
    fn from((red, green, blue): (u8, u8, u8)) -> Self {
        Self::new(red, green, blue)
    }
}

impl From<[u8; 3]> for Color {
    fn from([red, green, blue]: [u8; 3]) -> Self {
        Self::new(red, green, blue)
    }
}

impl Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R={} G={} B={}", self.red, self.green, self.blue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_matches_log_format() {
        assert_eq!("R=10 G=20 B=30", Color::new(10, 20, 30).to_string());
    }

    #[test]
    fn test_conversions() {
        assert_eq!(Color::new(1, 2, 3), (1, 2, 3).into());
        assert_eq!(Color::new(1, 2, 3), [1, 2, 3].into());
        assert_eq!([7, 7, 7], Color::gray(7).channels());
        assert_eq!(Color::default(), Color::BLACK);
    }
}
