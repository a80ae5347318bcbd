use packed_struct::PackingError;
use thiserror::Error;

use crate::{capture::CaptureError, color::Color, device::DeviceAddress};

/// Everything that can go wrong between the screen and the strip.
#[derive(Error, Debug)]
pub enum Error {
    /// The BLE link to the strip could not be opened.
    #[error("could not connect to {address}: {reason}")]
    Connection {
        address: DeviceAddress,
        reason: String,
    },

    /// The device was reached but does not look like the strip we expect,
    /// usually because the write characteristic is missing.
    #[error("protocol failure: {0}")]
    Protocol(String),

    /// A single color frame could not be written. The caller may retry the
    /// same color if `link_closed` is false.
    #[error("failed to send {color}: {reason}")]
    Write {
        color: Color,
        link_closed: bool,
        reason: String,
    },

    /// The screen could not be sampled.
    #[error("capture failed: {0}")]
    Capture(#[from] CaptureError),

    /// An operation that needs a live link was called on a disconnected
    /// session.
    #[error("the session is not connected")]
    NotConnected,

    #[error("could not pack the command frame: {0}")]
    Packing(#[from] PackingError),
}

impl Error {
    /// Errors after which it makes no sense to keep talking to the strip.
    pub fn is_fatal(&self) -> bool {
        match self {
            Error::Write { link_closed, .. } => *link_closed,
            Error::Capture(_) => false,
            _ => true,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
