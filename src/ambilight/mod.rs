use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use log::{error, info, warn};

use crate::{
    capture::{CaptureError, Frame, ScreenCapture},
    color::Color,
    config::AmbilightConfig,
    device::DeviceSession,
    error::{Error, Result},
    extractor::ColorExtractor,
    transport::BleTransport,
};

/// What a run of the controller should do.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Mode {
    /// Set one fixed color.
    SetStatic(Color),
    /// Match the strip to the screen once.
    OneShotAmbilight,
    /// Keep matching the strip to the screen until stopped.
    ContinuousAmbilight,
}

impl Mode {
    /// Whether the mode reads the screen.
    pub fn needs_capture(&self) -> bool {
        !matches!(self, Mode::SetStatic(_))
    }
}

/// Cooperative cancellation for continuous mode. Checked between frames,
/// never in the middle of a capture or a fade.
#[derive(Clone, Debug, Default)]
pub struct StopFlag(Arc<AtomicBool>);

impl StopFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the flag. Returns `true` if it was already raised, i.e. this is
    /// a repeated request.
    pub fn stop(&self) -> bool {
        self.0.swap(true, Ordering::SeqCst)
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Ties the screen, the extractor and the strip together.
///
/// The capture is optional: a controller built with
/// [`AmbilightController::without_capture`] can only run
/// [`Mode::SetStatic`] and never touches the display.
///
/// Everything happens in sequence on the calling task: a frame is captured,
/// reduced to one color and fully written (every step of a fade) before the
/// next frame is taken.
pub struct AmbilightController<T: BleTransport, C: ScreenCapture> {
    session: DeviceSession<T>,
    capture: Option<C>,
    extractor: ColorExtractor,
    min_floor: u8,
    max_consecutive_capture_failures: u32,
}

impl<T: BleTransport, C: ScreenCapture> AmbilightController<T, C> {
    pub fn new(session: DeviceSession<T>, capture: C, config: &AmbilightConfig) -> Self {
        Self {
            capture: Some(capture),
            ..Self::without_capture(session, config)
        }
    }

    pub fn without_capture(session: DeviceSession<T>, config: &AmbilightConfig) -> Self {
        Self {
            session,
            capture: None,
            extractor: ColorExtractor::default(),
            min_floor: config.min_floor,
            max_consecutive_capture_failures: config.max_consecutive_capture_failures,
        }
    }

    pub fn with_extractor(mut self, extractor: ColorExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn session(&self) -> &DeviceSession<T> {
        &self.session
    }

    pub fn capture(&self) -> Option<&C> {
        self.capture.as_ref()
    }

    /// Connect, do what `mode` asks, then disconnect.
    ///
    /// The session is disconnected even when the mode fails; the mode's error
    /// takes precedence over a failed disconnect.
    pub async fn run(&mut self, mode: Mode, stop: &StopFlag) -> Result<()> {
        if mode.needs_capture() && self.capture.is_none() {
            error!("{:?} needs a screen capture, none was given", mode);
            return Err(CaptureError::NoDisplay.into());
        }

        self.session.connect().await?;

        let result = match mode {
            Mode::SetStatic(color) => {
                info!("Setting RGB to {}", color);
                self.session.set_color(color).await
            }
            Mode::OneShotAmbilight => {
                info!("Setting RGB to dominant color of the screen");
                self.ambilight_frame().await
            }
            Mode::ContinuousAmbilight => {
                info!("Setting RGB to dominant color of the screen until stopped");
                self.ambilight_until(stop).await
            }
        };

        info!("Disconnecting...");
        let disconnected = self.session.disconnect().await;

        if let Err(e) = &result {
            error!("{:?} failed: {}", mode, e);
            if let Err(d) = &disconnected {
                warn!("{}", d);
            }
        }

        result?;
        disconnected
    }

    /// The color to send for `frame`. The black floor only applies when
    /// fading; direct sets send black as is.
    fn target_color(&self, frame: &Frame) -> Color {
        let floor = self.session.fade_mode().then_some(self.min_floor);
        self.extractor.dominant_color(frame, floor)
    }

    async fn ambilight_frame(&mut self) -> Result<()> {
        let capture = self.capture.as_mut().ok_or(CaptureError::NoDisplay)?;
        let frame = capture.capture()?;
        let color = self.target_color(&frame);

        info!("Sending {}", color);
        self.session.send(color).await
    }

    /// Failure policy per frame:
    /// - capture failures skip the frame, until too many happen in a row
    /// - write failures that leave the link up skip the frame
    /// - anything else stops the loop
    async fn ambilight_until(&mut self, stop: &StopFlag) -> Result<()> {
        let mut capture_failures = 0;

        let result = loop {
            if stop.is_stopped() {
                info!("Process interrupted");
                break Ok(());
            }

            match self.ambilight_frame().await {
                Ok(()) => capture_failures = 0,
                Err(Error::Capture(e)) => {
                    capture_failures += 1;
                    if capture_failures >= self.max_consecutive_capture_failures {
                        break Err(Error::Capture(e));
                    }
                    warn!(
                        "Skipping frame, capture failed ({}/{}): {}",
                        capture_failures, self.max_consecutive_capture_failures, e
                    );
                }
                Err(e) if !e.is_fatal() => warn!("Skipping frame: {}", e),
                Err(e) => break Err(e),
            }
        };

        if let Some(Err(e)) = self.capture.as_mut().map(|c| c.cleanup()) {
            warn!("Capture cleanup failed: {}", e);
        }

        result
    }
}
