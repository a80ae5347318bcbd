use log::{debug, info};
use xcap::Monitor;

use super::{CaptureError, Frame, ScreenCapture};

/// Captures the primary monitor (or the first one if none is marked
/// primary) with `xcap`. Screenshots stay in memory, so nothing is left
/// behind on disk.
pub struct PrimaryScreen {
    monitor: Monitor,
}

impl PrimaryScreen {
    pub fn open() -> Result<Self, CaptureError> {
        let monitors = Monitor::all().map_err(|e| CaptureError::Backend(e.to_string()))?;

        let index = monitors.iter().position(|m| m.is_primary()).unwrap_or(0);
        let monitor = monitors
            .into_iter()
            .nth(index)
            .ok_or(CaptureError::NoDisplay)?;

        info!(
            "Capturing monitor {} ({}x{})",
            monitor.name(),
            monitor.width(),
            monitor.height()
        );

        Ok(Self { monitor })
    }
}

impl ScreenCapture for PrimaryScreen {
    fn capture(&mut self) -> Result<Frame, CaptureError> {
        let image = self
            .monitor
            .capture_image()
            .map_err(|e| CaptureError::Backend(e.to_string()))?;

        let (width, height) = (image.width(), image.height());
        debug!("Captured {}x{} screenshot", width, height);

        // RGBA
        Frame::new(width, height, 4, image.into_raw())
    }

    fn cleanup(&mut self) -> Result<(), CaptureError> {
        debug!("Nothing to clean up for in-memory captures");
        Ok(())
    }
}
