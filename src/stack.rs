use std::time::Duration;

use crate::att::Handle;
use crate::gap::{AdvType, Uuid};
use crate::gatt::CharProps;

/// Bluetooth LE radio stack used by the puck controller.
///
/// Implementations wrap the platform's link layer and GATT server. All methods
/// are called from the single thread that runs [`Puck::drive`](crate::Puck),
/// and [`Stack::wait_for_event`] is the only one allowed to block.
pub trait Stack {
    /// Error type returned by the stack.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Initializes the radio.
    fn init(&mut self) -> Result<(), Self::Error>;

    /// Sets the GAP device name.
    fn set_device_name(&mut self, name: &str) -> Result<(), Self::Error>;

    /// Replaces the advertising data with `ad`, which is a sequence of
    /// length-type-value structures.
    fn set_advertising_data(&mut self, ad: &[u8]) -> Result<(), Self::Error>;

    /// Sets advertising parameters.
    fn set_advertising_params(&mut self, p: AdvParams) -> Result<(), Self::Error>;

    /// Starts advertising.
    fn start_advertising(&mut self) -> Result<(), Self::Error>;

    /// Stops advertising.
    fn stop_advertising(&mut self) -> Result<(), Self::Error>;

    /// Terminates the current connection. Completion is reported by an
    /// [`Event::Disconnected`] event.
    fn disconnect(&mut self, reason: DisconnectReason) -> Result<(), Self::Error>;

    /// Attaches a service and returns the value handles of its
    /// characteristics in declaration order.
    fn add_service(&mut self, svc: &ServiceDecl<'_>) -> Result<Vec<Handle>, Self::Error>;

    /// Updates a characteristic value, notifying any subscribed peer.
    fn update_value(&mut self, hdl: Handle, v: &[u8]) -> Result<(), Self::Error>;

    /// Blocks until the next stack event.
    fn wait_for_event(&mut self) -> Result<Event, Self::Error>;
}

/// Stack event reported by [`Stack::wait_for_event`].
#[derive(Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum Event {
    /// A central connected.
    Connected,
    /// The connection was terminated.
    Disconnected(DisconnectReason),
    /// A peer wrote a characteristic value.
    DataWritten { hdl: Handle, data: Vec<u8> },
    /// Internal stack wakeup with nothing for the controller to do.
    Timer,
}

/// Connection termination reason ([Vol 1] Part F, Section 1.3).
#[derive(Clone, Copy, Debug, Eq, PartialEq, num_enum::IntoPrimitive, num_enum::TryFromPrimitive)]
#[non_exhaustive]
#[repr(u8)]
pub enum DisconnectReason {
    ConnectionTimeout = 0x08,
    RemoteUserTerminatedConnection = 0x13,
    LocalHostTerminatedConnection = 0x16,
    ConnectionFailedToBeEstablished = 0x3E,
}

impl Default for DisconnectReason {
    #[inline]
    fn default() -> Self {
        Self::LocalHostTerminatedConnection
    }
}

/// Advertising parameters.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct AdvParams {
    pub typ: AdvType,
    pub interval: Duration,
}

impl AdvParams {
    /// Returns the advertising interval as a count of 625 us units
    /// ([Vol 4] Part E, Section 7.8.5), or `None` if it does not fit in 16 bits.
    #[must_use]
    pub fn interval_ticks(&self) -> Option<u16> {
        u16::try_from(self.interval.as_micros() / 625).ok()
    }
}

/// Characteristic declaration passed to [`Stack::add_service`].
#[derive(Clone, Copy, Debug)]
pub struct CharDecl<'a> {
    pub uuid: Uuid,
    pub props: CharProps,
    pub max_len: usize,
    pub value: &'a [u8],
}

/// Service declaration passed to [`Stack::add_service`].
#[derive(Clone, Debug)]
pub struct ServiceDecl<'a> {
    pub uuid: Uuid,
    pub chars: Vec<CharDecl<'a>>,
}
