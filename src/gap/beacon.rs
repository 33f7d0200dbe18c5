//! iBeacon manufacturer-specific advertising payload.

use std::fmt::{Debug, Formatter};

use structbuf::{Pack, StructBuf};

use crate::gap::Uuid;
use crate::name_of;

/// iBeacon identification fields that do not change between pucks.
#[derive(Clone, Copy, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct BeaconConfig {
    /// Company identifier (0x004C is Apple).
    pub company_id: u16,
    /// Location UUID shared by all pucks of one deployment.
    pub uuid: Uuid,
    /// Major value. The companion app expects 0x1337.
    pub major: u16,
    /// Calibrated TX power at 1 m in dBm.
    pub tx_power: i8,
}

impl Default for BeaconConfig {
    fn default() -> Self {
        Self {
            company_id: 0x0000,
            // SAFETY: Non-zero
            uuid: unsafe { Uuid::new(0xE20A39F4_73F5_4BC4_A12F_17D1AD07A961).unwrap_unchecked() },
            major: 0x1337,
            tx_power: -56,
        }
    }
}

/// Beacon payload carried in the manufacturer-specific AD structure:
///
/// | Offset | Length | Field                         |
/// |--------|--------|-------------------------------|
/// | 0      | 2      | Company identifier (LE)       |
/// | 2      | 1      | Beacon type (0x02)            |
/// | 3      | 1      | Remaining length (0x15)       |
/// | 4      | 16     | UUID (BE)                     |
/// | 20     | 2      | Major (BE)                    |
/// | 22     | 2      | Minor (BE)                    |
/// | 24     | 1      | TX power                      |
#[derive(Clone, Copy, Eq, PartialEq)]
#[repr(transparent)]
pub struct BeaconPayload([u8; Self::LEN]);

impl BeaconPayload {
    /// Payload length.
    pub const LEN: usize = 25;
    const TYPE: u8 = 0x02;
    const DATA_LEN: u8 = (Self::LEN - 4) as u8;

    /// Packs the payload for the puck identified by `minor`.
    #[must_use]
    pub fn new(cfg: &BeaconConfig, minor: u16) -> Self {
        let mut b = StructBuf::new(Self::LEN);
        b.append()
            .u16(cfg.company_id)
            .u8(Self::TYPE)
            .u8(Self::DATA_LEN)
            .put(cfg.uuid.to_be_bytes())
            .put(cfg.major.to_be_bytes())
            .put(minor.to_be_bytes())
            .i8(cfg.tx_power);
        let mut v = [0; Self::LEN];
        v.copy_from_slice(b.as_ref());
        Self(v)
    }

    /// Returns the minor value.
    #[inline]
    #[must_use]
    pub const fn minor(&self) -> u16 {
        u16::from_be_bytes([self.0[22], self.0[23]])
    }
}

impl AsRef<[u8]> for BeaconPayload {
    #[inline]
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Debug for BeaconPayload {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({:02X?})", name_of!(BeaconPayload), self.0)
    }
}

/// Returns the GAP device name of the puck identified by `minor`, such as
/// `"Puck 00FF"`.
#[inline]
#[must_use]
pub fn device_name(prefix: &str, minor: u16) -> String {
    format!("{prefix} {minor:04X}")
}
