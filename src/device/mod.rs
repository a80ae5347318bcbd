use std::{
    fmt::{self, Display},
    num::NonZeroU32,
    str::FromStr,
};

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    color::Color,
    error::{Error, Result},
    fade::Fade,
    transport::BleTransport,
};

pub mod pack;

/// Service that holds the strip's color characteristic.
pub const WRITE_SERVICE: Uuid = Uuid::from_u128(0x0000ffd5_0000_1000_8000_00805f9b34fb);

/// A Bluetooth device address, written `AA:BB:CC:DD:EE:FF`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DeviceAddress([u8; 6]);

#[derive(thiserror::Error, Debug, PartialEq)]
#[error("invalid device address {0:?}, expected six hex octets like AA:BB:CC:DD:EE:FF")]
pub struct AddressParseError(String);

impl DeviceAddress {
    pub const fn new(octets: [u8; 6]) -> Self {
        Self(octets)
    }

    pub fn octets(&self) -> [u8; 6] {
        self.0
    }
}

impl FromStr for DeviceAddress {
    type Err = AddressParseError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let invalid = || AddressParseError(s.to_string());

        let mut octets = [0u8; 6];
        let mut parts = s.trim().split([':', '-']);
        for octet in octets.iter_mut() {
            let part = parts.next().ok_or_else(invalid)?;
            if part.len() != 2 {
                return Err(invalid());
            }
            *octet = u8::from_str_radix(part, 16).map_err(|_| invalid())?;
        }

        if parts.next().is_some() {
            return Err(invalid());
        }

        Ok(Self(octets))
    }
}

impl TryFrom<String> for DeviceAddress {
    type Error = AddressParseError;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DeviceAddress> for String {
    fn from(address: DeviceAddress) -> Self {
        address.to_string()
    }
}

impl Display for DeviceAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02X}:{b:02X}:{c:02X}:{d:02X}:{e:02X}:{g:02X}")
    }
}

enum SessionState<T: BleTransport> {
    Disconnected,
    Connected {
        link: T::Link,
        characteristic: T::Characteristic,
    },
}

/// The connection to one LED strip.
///
/// A session starts disconnected and remembers the last color it managed to
/// send, which is where the next fade starts from. It is driven from a
/// single task; every call finishes its writes before returning.
pub struct DeviceSession<T: BleTransport> {
    transport: T,
    address: DeviceAddress,
    write_service: Uuid,
    state: SessionState<T>,
    last_color: Color,
    fade_mode: bool,
    fade_steps: NonZeroU32,
}

impl<T: BleTransport> DeviceSession<T> {
    pub fn new(transport: T, address: DeviceAddress) -> Self {
        Self {
            transport,
            address,
            write_service: WRITE_SERVICE,
            state: SessionState::Disconnected,
            last_color: Color::BLACK,
            fade_mode: false,
            fade_steps: NonZeroU32::MIN,
        }
    }

    pub fn with_write_service(mut self, service: Uuid) -> Self {
        self.write_service = service;
        self
    }

    /// Send every color change as a fade of `steps` writes.
    pub fn with_fade(mut self, enabled: bool, steps: NonZeroU32) -> Self {
        self.fade_mode = enabled;
        self.fade_steps = steps;
        self
    }

    pub fn address(&self) -> DeviceAddress {
        self.address
    }

    pub fn is_connected(&self) -> bool {
        matches!(self.state, SessionState::Connected { .. })
    }

    pub fn last_color(&self) -> Color {
        self.last_color
    }

    pub fn fade_mode(&self) -> bool {
        self.fade_mode
    }

    /// Open the link and find the characteristic to write colors to.
    /// Does nothing if already connected.
    pub async fn connect(&mut self) -> Result<()> {
        if self.is_connected() {
            return Ok(());
        }

        info!("Connecting to {}", self.address);
        let link = self
            .transport
            .connect(self.address)
            .await
            .map_err(|e| Error::Connection {
                address: self.address,
                reason: e.to_string(),
            })?;

        let discovered = self
            .transport
            .discover_write_characteristic(&link, self.write_service)
            .await;

        let characteristic = match discovered {
            Ok(Some(characteristic)) => characteristic,
            Ok(None) => {
                self.abandon(link).await;
                return Err(Error::Protocol(format!(
                    "{} has no writable characteristic under service {}",
                    self.address, self.write_service
                )));
            }
            Err(e) => {
                self.abandon(link).await;
                return Err(Error::Connection {
                    address: self.address,
                    reason: format!("service discovery failed: {e}"),
                });
            }
        };

        info!("Connected to {}", self.address);
        self.state = SessionState::Connected {
            link,
            characteristic,
        };

        Ok(())
    }

    async fn abandon(&mut self, link: T::Link) {
        if let Err(e) = self.transport.disconnect(link).await {
            warn!("Failed to close half-open link to {}: {}", self.address, e);
        }
    }

    /// Write `color` to the strip in one frame.
    pub async fn set_color(&mut self, color: Color) -> Result<()> {
        let SessionState::Connected {
            link,
            characteristic,
        } = &self.state
        else {
            return Err(Error::NotConnected);
        };

        let frame = pack::encode(color)?;
        debug!("Writing frame {}", pack::hex(&frame));

        let written = self.transport.write(link, characteristic, &frame).await;
        if let Err(e) = written {
            let link_closed = !self.transport.is_connected(link).await;
            if link_closed {
                warn!("Link to {} closed while sending {}", self.address, color);
                self.state = SessionState::Disconnected;
            }

            return Err(Error::Write {
                color,
                link_closed,
                reason: e.to_string(),
            });
        }

        self.last_color = color;
        Ok(())
    }

    /// Walk from the last color sent to `target` in `fade_steps` writes.
    ///
    /// The first failed write stops the fade; the steps already written stay
    /// on the strip and `last_color` is the last one that made it.
    pub async fn fade_to_color(&mut self, target: Color) -> Result<()> {
        let fade = Fade::new(self.last_color, target, self.fade_steps);
        debug!(
            "Fading from {} to {} in {} steps",
            self.last_color,
            target,
            fade.len()
        );

        for color in fade {
            self.set_color(color).await?;
        }

        Ok(())
    }

    /// Fade or jump to `color` depending on the session's fade mode.
    pub async fn send(&mut self, color: Color) -> Result<()> {
        if self.fade_mode {
            self.fade_to_color(color).await
        } else {
            self.set_color(color).await
        }
    }

    /// Close the link. Calling this while disconnected is a no-op.
    pub async fn disconnect(&mut self) -> Result<()> {
        let SessionState::Connected { link, .. } =
            std::mem::replace(&mut self.state, SessionState::Disconnected)
        else {
            debug!("Already disconnected from {}", self.address);
            return Ok(());
        };

        info!("Disconnecting from {}", self.address);
        self.transport
            .disconnect(link)
            .await
            .map_err(|e| Error::Connection {
                address: self.address,
                reason: format!("disconnect failed: {e}"),
            })
    }
}
