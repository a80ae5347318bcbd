//! Drive a Bluetooth LE RGB strip from the command line: set a fixed color,
//! or follow the dominant color of the screen.

pub mod ambilight;
pub mod capture;
pub mod color;
pub mod config;
pub mod device;
pub mod error;
pub mod extractor;
pub mod fade;
pub mod transport;

pub use error::{Error, Result};

pub mod prelude {
    pub use crate::{
        ambilight::*,
        capture::{CaptureError, Frame, ScreenCapture},
        color::Color,
        config::*,
        device::{DeviceAddress, DeviceSession},
        extractor::{ColorCube, ColorExtractor, CubeError},
        fade::Fade,
        transport::{BleTransport, TransportError},
    };
}
