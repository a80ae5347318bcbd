use std::collections::VecDeque;

use super::{CaptureError, Frame, ScreenCapture};
use crate::ambilight::StopFlag;

/// Replays a scripted list of capture results, then keeps returning the
/// fallback frame (if any) forever.
#[derive(Default)]
pub(crate) struct MockCapture {
    script: VecDeque<Result<Frame, CaptureError>>,
    fallback: Option<Frame>,
    stop_after: Option<(usize, StopFlag)>,
    pub(crate) captures: usize,
    pub(crate) cleanups: usize,
}

impl MockCapture {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn then_frame(mut self, frame: Frame) -> Self {
        self.script.push_back(Ok(frame));
        self
    }

    pub(crate) fn then_error(mut self, error: CaptureError) -> Self {
        self.script.push_back(Err(error));
        self
    }

    pub(crate) fn repeating(mut self, frame: Frame) -> Self {
        self.fallback = Some(frame);
        self
    }

    /// Raise `stop` once `captures` frames have been taken, like a Ctrl-C
    /// arriving while the last one is being processed.
    pub(crate) fn stop_after(mut self, captures: usize, stop: StopFlag) -> Self {
        self.stop_after = Some((captures, stop));
        self
    }
}

impl ScreenCapture for MockCapture {
    fn capture(&mut self) -> Result<Frame, CaptureError> {
        self.captures += 1;

        if let Some((limit, stop)) = &self.stop_after {
            if self.captures >= *limit {
                stop.stop();
            }
        }

        match self.script.pop_front() {
            Some(result) => result,
            None => self.fallback.clone().ok_or(CaptureError::NoDisplay),
        }
    }

    fn cleanup(&mut self) -> Result<(), CaptureError> {
        self.cleanups += 1;
        Ok(())
    }
}
