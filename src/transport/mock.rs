use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use uuid::Uuid;

use super::{BleTransport, TransportError};
use crate::device::DeviceAddress;

/// What the mock radio has seen so far. Shared so a test can keep looking
/// after the transport has been moved into a session.
#[derive(Default, Debug)]
pub(crate) struct MockLog {
    pub(crate) connects: usize,
    pub(crate) disconnects: usize,
    pub(crate) writes: Vec<Vec<u8>>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum WriteFault {
    /// The write fails but the link stays up.
    Transient,
    /// The write fails and the link goes down with it.
    LinkDrop,
}

#[derive(Default)]
pub(crate) struct MockTransport {
    log: Arc<Mutex<MockLog>>,
    unreachable: bool,
    missing_characteristic: bool,
    /// Fail the write with this zero-based index (counted over the whole
    /// lifetime of the mock).
    fault_at: Option<(usize, WriteFault)>,
    link_up: bool,
}

pub(crate) struct MockLink;

pub(crate) struct MockCharacteristic;

impl MockTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn unreachable(mut self) -> Self {
        self.unreachable = true;
        self
    }

    pub(crate) fn without_characteristic(mut self) -> Self {
        self.missing_characteristic = true;
        self
    }

    pub(crate) fn failing_write(mut self, index: usize, fault: WriteFault) -> Self {
        self.fault_at = Some((index, fault));
        self
    }

    pub(crate) fn log_handle(&self) -> Arc<Mutex<MockLog>> {
        self.log.clone()
    }

    fn log(&self) -> MutexGuard<'_, MockLog> {
        self.log.lock().unwrap()
    }
}

#[async_trait]
impl BleTransport for MockTransport {
    type Link = MockLink;
    type Characteristic = MockCharacteristic;

    async fn connect(&mut self, _address: DeviceAddress) -> Result<MockLink, TransportError> {
        self.log().connects += 1;

        if self.unreachable {
            return Err(TransportError::new("device not found"));
        }

        self.link_up = true;
        Ok(MockLink)
    }

    async fn discover_write_characteristic(
        &mut self,
        _link: &MockLink,
        _service: Uuid,
    ) -> Result<Option<MockCharacteristic>, TransportError> {
        if self.missing_characteristic {
            Ok(None)
        } else {
            Ok(Some(MockCharacteristic))
        }
    }

    async fn write(
        &mut self,
        _link: &MockLink,
        _characteristic: &MockCharacteristic,
        data: &[u8],
    ) -> Result<(), TransportError> {
        if !self.link_up {
            return Err(TransportError::new("not connected"));
        }

        let attempt = {
            let log = self.log();
            log.writes.len()
        };

        match self.fault_at {
            Some((index, fault)) if index == attempt => {
                // Consume the fault so the same index isn't hit forever
                self.fault_at = None;
                if fault == WriteFault::LinkDrop {
                    self.link_up = false;
                }
                Err(TransportError::new("write rejected"))
            }
            _ => {
                self.log().writes.push(data.to_vec());
                Ok(())
            }
        }
    }

    async fn is_connected(&self, _link: &MockLink) -> bool {
        self.link_up
    }

    async fn disconnect(&mut self, _link: MockLink) -> Result<(), TransportError> {
        self.log().disconnects += 1;
        self.link_up = false;
        Ok(())
    }
}
