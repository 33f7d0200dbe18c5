//! Simulated radio stack for host-side tests and demos.

use std::collections::{BTreeMap, VecDeque};

use tracing::debug;

use crate::att::Handle;
use crate::gap::Uuid;
use crate::gatt::CharProps;
use crate::{AdvParams, DisconnectReason, Event, ServiceDecl, Stack};

/// Error returned by [`SimStack`].
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum SimError {
    #[error("stack is not initialized")]
    NotInitialized,
    #[error("invalid state for {0}")]
    InvalidState(&'static str),
    #[error("invalid attribute handle {0}")]
    InvalidHandle(Handle),
    #[error("value too long for {hdl} ({len} > {max})")]
    InvalidLength { hdl: Handle, len: usize, max: usize },
    #[error("attribute handles exhausted")]
    HandlesExhausted,
}

type Result<T> = std::result::Result<T, SimError>;

/// Service attached to the simulated stack.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SimService {
    pub uuid: Uuid,
    pub chars: Vec<(Uuid, Handle)>,
}

/// Radio stack that replays scripted events and records everything the
/// controller asks of it.
#[derive(Debug)]
pub struct SimStack {
    initialized: bool,
    advertising: bool,
    connected: bool,
    name: String,
    adv_data: Vec<u8>,
    adv_params: Option<AdvParams>,
    services: Vec<SimService>,
    values: BTreeMap<Handle, (usize, Vec<u8>)>,
    notified: Vec<(Handle, Vec<u8>)>,
    disconnects: Vec<DisconnectReason>,
    events: VecDeque<Event>,
    next_hdl: Option<Handle>,
}

impl SimStack {
    /// Creates an uninitialized stack with no scripted events.
    #[must_use]
    pub fn new() -> Self {
        Self {
            initialized: false,
            advertising: false,
            connected: false,
            name: String::new(),
            adv_data: Vec::new(),
            adv_params: None,
            services: Vec::new(),
            values: BTreeMap::new(),
            notified: Vec::new(),
            disconnects: Vec::new(),
            events: VecDeque::new(),
            next_hdl: Some(Handle::MIN),
        }
    }

    /// Queues an event to be returned by [`Stack::wait_for_event`].
    pub fn push_event(&mut self, e: Event) -> &mut Self {
        self.events.push_back(e);
        self
    }

    /// Queues a remote write of `data` to handle `hdl`.
    pub fn write(&mut self, hdl: Handle, data: impl Into<Vec<u8>>) -> &mut Self {
        self.push_event(Event::DataWritten {
            hdl,
            data: data.into(),
        })
    }

    /// Returns the number of events that have not been delivered.
    #[inline]
    #[must_use]
    pub fn pending_events(&self) -> usize {
        self.events.len()
    }

    /// Returns whether the stack was initialized.
    #[inline]
    #[must_use]
    pub const fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Returns whether the stack is advertising.
    #[inline]
    #[must_use]
    pub const fn is_advertising(&self) -> bool {
        self.advertising
    }

    /// Returns whether a central is connected.
    #[inline]
    #[must_use]
    pub const fn is_connected(&self) -> bool {
        self.connected
    }

    /// Returns the GAP device name.
    #[inline]
    #[must_use]
    pub fn device_name(&self) -> &str {
        &self.name
    }

    /// Returns the advertising data.
    #[inline]
    #[must_use]
    pub fn advertising_data(&self) -> &[u8] {
        &self.adv_data
    }

    /// Returns the advertising parameters.
    #[inline]
    #[must_use]
    pub const fn advertising_params(&self) -> Option<AdvParams> {
        self.adv_params
    }

    /// Returns attached services in attachment order.
    #[inline]
    #[must_use]
    pub fn services(&self) -> &[SimService] {
        &self.services
    }

    /// Returns the value stored for handle `hdl`.
    #[must_use]
    pub fn value(&self, hdl: Handle) -> Option<&[u8]> {
        self.values.get(&hdl).map(|(_, v)| v.as_slice())
    }

    /// Returns all value updates in the order they were made.
    #[inline]
    #[must_use]
    pub fn notified(&self) -> &[(Handle, Vec<u8>)] {
        &self.notified
    }

    /// Returns locally requested disconnections.
    #[inline]
    #[must_use]
    pub fn disconnects(&self) -> &[DisconnectReason] {
        &self.disconnects
    }

    fn check_init(&self) -> Result<()> {
        if self.initialized {
            Ok(())
        } else {
            Err(SimError::NotInitialized)
        }
    }

    /// Allocates the next attribute handle.
    fn alloc(&mut self) -> Result<Handle> {
        let h = self.next_hdl.ok_or(SimError::HandlesExhausted)?;
        self.next_hdl = h.next();
        Ok(h)
    }
}

impl Default for SimStack {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl Stack for SimStack {
    type Error = SimError;

    fn init(&mut self) -> Result<()> {
        self.initialized = true;
        Ok(())
    }

    fn set_device_name(&mut self, name: &str) -> Result<()> {
        self.check_init()?;
        self.name = name.to_owned();
        Ok(())
    }

    fn set_advertising_data(&mut self, ad: &[u8]) -> Result<()> {
        self.check_init()?;
        self.adv_data = ad.to_vec();
        Ok(())
    }

    fn set_advertising_params(&mut self, p: AdvParams) -> Result<()> {
        self.check_init()?;
        self.adv_params = Some(p);
        Ok(())
    }

    fn start_advertising(&mut self) -> Result<()> {
        self.check_init()?;
        if self.advertising || self.connected {
            return Err(SimError::InvalidState("start_advertising"));
        }
        self.advertising = true;
        Ok(())
    }

    fn stop_advertising(&mut self) -> Result<()> {
        self.check_init()?;
        if !self.advertising {
            return Err(SimError::InvalidState("stop_advertising"));
        }
        self.advertising = false;
        Ok(())
    }

    fn disconnect(&mut self, reason: DisconnectReason) -> Result<()> {
        self.check_init()?;
        if !self.connected {
            return Err(SimError::InvalidState("disconnect"));
        }
        self.disconnects.push(reason);
        self.events.push_back(Event::Disconnected(reason));
        Ok(())
    }

    fn add_service(&mut self, svc: &ServiceDecl<'_>) -> Result<Vec<Handle>> {
        self.check_init()?;
        self.alloc()?;
        let mut hdls = Vec::with_capacity(svc.chars.len());
        let mut chars = Vec::with_capacity(svc.chars.len());
        for c in &svc.chars {
            self.alloc()?; // Declaration
            let hdl = self.alloc()?;
            if c.props.intersects(CharProps::NOTIFY | CharProps::INDICATE) {
                self.alloc()?; // CCCD
            }
            self.values.insert(hdl, (c.max_len, c.value.to_vec()));
            hdls.push(hdl);
            chars.push((c.uuid, hdl));
        }
        debug!("Attached service {} with handles {hdls:?}", svc.uuid);
        self.services.push(SimService {
            uuid: svc.uuid,
            chars,
        });
        Ok(hdls)
    }

    fn update_value(&mut self, hdl: Handle, v: &[u8]) -> Result<()> {
        self.check_init()?;
        let (max, val) = (self.values.get_mut(&hdl)).ok_or(SimError::InvalidHandle(hdl))?;
        if v.len() > *max {
            return Err(SimError::InvalidLength {
                hdl,
                len: v.len(),
                max: *max,
            });
        }
        *val = v.to_vec();
        self.notified.push((hdl, v.to_vec()));
        Ok(())
    }

    fn wait_for_event(&mut self) -> Result<Event> {
        self.check_init()?;
        let e = self.events.pop_front().unwrap_or(Event::Timer);
        match e {
            Event::Connected => {
                self.connected = true;
                self.advertising = false;
            }
            Event::Disconnected(_) => self.connected = false,
            Event::DataWritten { hdl, ref data } => {
                let (max, val) =
                    (self.values.get_mut(&hdl)).ok_or(SimError::InvalidHandle(hdl))?;
                let n = data.len().min(*max);
                *val = data[..n].to_vec();
            }
            Event::Timer => {}
        }
        Ok(e)
    }
}
