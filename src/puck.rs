use std::fmt::{Debug, Formatter};

use tracing::{debug, info, trace, warn};

use crate::att::Handle;
use crate::gap::{device_name, AdvFlag, AdvType, BeaconPayload, ResponseDataMut, Uuid};
use crate::gatt::{
    CallbackRegistry, CharId, CharProps, CharacteristicTable, PendingQueue, ServiceTable,
    WriteCallback,
};
use crate::{
    AdvParams, CharDecl, Config, DisconnectReason, Error, Event, Result, ServiceDecl, Stack,
};

#[cfg(test)]
mod tests;

/// Puck connection state.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum DeviceState {
    /// Value before [`Puck::init`] is called.
    #[default]
    Connecting,
    Connected,
    Advertising,
    Disconnected,
}

/// Puck controller.
///
/// The controller owns the radio stack, the GATT tables, and the write
/// callbacks. There should be exactly one per radio. Services and
/// characteristics are declared before [`Puck::init`], after which the
/// application calls [`Puck::drive`] in a loop:
///
/// ```no_run
/// # fn run(mut puck: puck::Puck<puck::sim::SimStack>) -> puck::Result<()> {
/// puck.init(0x0001)?;
/// while puck.drive()? {
///     // Application work
/// }
/// # Ok(())
/// # }
/// ```
///
/// Write callbacks are not executed from the stack's event context. They are
/// queued when the write event is handled and run by `drive` once the event
/// wait returns, so they may freely call back into the controller (for
/// example, to update other characteristics).
pub struct Puck<S: Stack> {
    stack: S,
    cfg: Config,
    state: DeviceState,
    beacon: Option<BeaconPayload>,
    chars: CharacteristicTable,
    services: ServiceTable,
    callbacks: CallbackRegistry<Self>,
    pending: PendingQueue<Self>,
    attached: bool,
}

impl<S: Stack> Puck<S> {
    /// Creates a new controller for radio `stack`.
    #[must_use]
    pub fn new(stack: S, cfg: Config) -> Self {
        Self {
            stack,
            cfg,
            state: DeviceState::default(),
            beacon: None,
            chars: CharacteristicTable::new(),
            services: ServiceTable::new(),
            callbacks: CallbackRegistry::new(),
            pending: PendingQueue::new(),
            attached: false,
        }
    }

    /// Initializes the radio, configures iBeacon advertising for `minor`,
    /// and attaches all declared services. Call once, after declaring services
    /// and callbacks. Advertising starts on the first [`Puck::drive`] call.
    pub fn init(&mut self, minor: u16) -> Result<()> {
        let beacon = BeaconPayload::new(&self.cfg.beacon, minor);
        self.stack.init().map_err(Error::stack)?;
        debug!("Initialized radio stack");
        self.set_state(DeviceState::Disconnected);

        let name = device_name(&self.cfg.name_prefix, minor);
        self.stack.set_device_name(&name).map_err(Error::stack)?;
        debug!("Set device name: {name:?}");

        let mut ad = ResponseDataMut::new();
        ad.flags(AdvFlag::LE_GENERAL | AdvFlag::NO_BREDR)
            .manufacturer_data(beacon.as_ref());
        (self.stack.set_advertising_data(ad.get().as_ref())).map_err(Error::stack)?;
        debug!("Set advertising data: flags and {beacon:?}");

        let p = AdvParams {
            typ: AdvType::ConnectableUndirected,
            interval: self.cfg.adv_interval(),
        };
        self.stack.set_advertising_params(p).map_err(Error::stack)?;
        debug!("Set advertising parameters: {p:?}");

        self.attach_services()?;
        self.beacon = Some(beacon);
        info!("Initialized puck as {minor:#06X}");
        Ok(())
    }

    /// Starts advertising. The stack may reject this if the puck is already
    /// advertising or connected.
    pub fn start_advertising(&mut self) -> Result<()> {
        self.stack.start_advertising().map_err(Error::stack)?;
        info!("Started advertising");
        self.set_state(DeviceState::Advertising);
        Ok(())
    }

    /// Stops advertising. Does nothing unless the puck is advertising.
    pub fn stop_advertising(&mut self) -> Result<()> {
        if self.state != DeviceState::Advertising {
            warn!("Tried to stop advertising, but advertising is already stopped");
            return Ok(());
        }
        self.stack.stop_advertising().map_err(Error::stack)?;
        info!("Stopped advertising");
        self.set_state(DeviceState::Disconnected);
        Ok(())
    }

    /// Requests termination of the current connection. The state changes when
    /// the stack reports the disconnection.
    pub fn disconnect(&mut self) -> Result<()> {
        (self.stack.disconnect(DisconnectReason::LocalHostTerminatedConnection))
            .map_err(Error::stack)
    }

    /// Runs one iteration of the main loop: restarts advertising if
    /// disconnected, blocks until the next stack event, handles it, and then
    /// runs all queued write callbacks. Always returns `true` on success so
    /// that it can be used as a `while` condition.
    pub fn drive(&mut self) -> Result<bool> {
        if self.state == DeviceState::Disconnected {
            self.start_advertising()?;
        }
        let e = self.stack.wait_for_event().map_err(Error::stack)?;
        self.handle_event(e);
        self.run_pending();
        Ok(true)
    }

    /// Handles a stack event. Write callbacks are queued, not executed.
    pub fn handle_event(&mut self, e: Event) {
        match e {
            Event::Connected => {
                info!("Connected");
                self.set_state(DeviceState::Connected);
            }
            Event::Disconnected(reason) => {
                info!("Disconnected ({reason:?})");
                self.set_state(DeviceState::Disconnected);
            }
            Event::DataWritten { hdl, data } => self.on_data_written(hdl, &data),
            Event::Timer => trace!("Timer event"),
        }
    }

    /// Queues the write callbacks of the characteristic with value handle
    /// `hdl`. Writes to unknown handles or to characteristics without
    /// callbacks are dropped.
    pub fn on_data_written(&mut self, hdl: Handle, data: &[u8]) {
        let Some(id) = self.chars.find_handle(hdl) else {
            trace!("Write to unknown handle {hdl}");
            return;
        };
        self.chars.set_value(id, data);
        let uuid = self.chars.get(id).uuid();
        if let Some(cbs) = self.callbacks.get(uuid) {
            self.pending.push_all(cbs, data);
            trace!("Queued {} callbacks for {uuid}", cbs.len());
        }
    }

    /// Runs queued write callbacks, most recent first, until the queue is
    /// empty.
    fn run_pending(&mut self) {
        while let Some(p) = self.pending.pop() {
            p.run(self);
        }
    }

    /// Adds a characteristic with a zero-filled value of `len` bytes to
    /// service `svc`, creating the service if needed. The service is rebuilt
    /// with the new characteristic appended after all existing ones.
    ///
    /// Characteristic UUIDs are not required to be unique. Lookups by UUID
    /// always resolve to the first characteristic added with that UUID.
    ///
    /// # Panics
    ///
    /// Panics if `len` exceeds [`MAX_VALUE_LEN`](crate::gatt::MAX_VALUE_LEN).
    #[track_caller]
    pub fn add_characteristic(
        &mut self,
        svc: Uuid,
        chr: Uuid,
        len: usize,
        props: CharProps,
    ) -> CharId {
        let id = self.chars.add(chr, len, props);
        self.services.add(svc, id);
        if self.attached {
            warn!("Characteristic {chr} added after init will not be attached");
        }
        debug!("Added characteristic {chr} to service {svc}");
        id
    }

    /// Adds a characteristic with the configured default properties.
    #[track_caller]
    pub fn add_default_characteristic(&mut self, svc: Uuid, chr: Uuid, len: usize) -> CharId {
        self.add_characteristic(svc, chr, len, self.cfg.default_props)
    }

    /// Registers a callback to run after each write to characteristic `uuid`.
    /// Callbacks of the same characteristic accumulate.
    pub fn on_characteristic_write(
        &mut self,
        uuid: Uuid,
        f: impl Fn(&mut Self, &[u8]) + 'static,
    ) {
        self.callbacks.bind(uuid, WriteCallback::from(f));
    }

    /// Updates the value of characteristic `uuid`, notifying any subscribed
    /// peer. Unknown characteristics are ignored with a warning.
    pub fn update_characteristic_value(&mut self, uuid: Uuid, v: &[u8]) -> Result<()> {
        let Some(id) = self.chars.find(uuid) else {
            warn!("Tried to update an unknown characteristic {uuid}");
            return Ok(());
        };
        if let Some(hdl) = self.chars.get(id).handle() {
            self.stack.update_value(hdl, v).map_err(Error::stack)?;
            trace!("Updated characteristic value of {uuid}");
        }
        self.chars.set_value(id, v);
        Ok(())
    }

    /// Returns the current value of characteristic `uuid`.
    #[must_use]
    pub fn characteristic_value(&self, uuid: Uuid) -> Option<&[u8]> {
        trace!("Reading characteristic value of {uuid}");
        let v = self.chars.value(uuid);
        if v.is_none() {
            warn!("Tried to read an unknown characteristic {uuid}");
        }
        v
    }

    /// Returns the current state.
    #[inline(always)]
    #[must_use]
    pub const fn state(&self) -> DeviceState {
        self.state
    }

    /// Sets the current state.
    pub fn set_state(&mut self, state: DeviceState) {
        debug!("Changed state to {state:?}");
        self.state = state;
    }

    /// Returns the radio stack.
    #[inline(always)]
    #[must_use]
    pub const fn stack(&self) -> &S {
        &self.stack
    }

    /// Returns the radio stack.
    #[inline(always)]
    #[must_use]
    pub fn stack_mut(&mut self) -> &mut S {
        &mut self.stack
    }

    /// Returns the configuration.
    #[inline(always)]
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.cfg
    }

    /// Returns the beacon payload or `None` before [`Puck::init`].
    #[inline]
    #[must_use]
    pub const fn beacon(&self) -> Option<&BeaconPayload> {
        self.beacon.as_ref()
    }

    /// Returns all characteristics.
    #[inline(always)]
    #[must_use]
    pub const fn characteristics(&self) -> &CharacteristicTable {
        &self.chars
    }

    /// Returns all services.
    #[inline(always)]
    #[must_use]
    pub const fn services(&self) -> &ServiceTable {
        &self.services
    }

    /// Returns the number of queued write callbacks.
    #[inline]
    #[must_use]
    pub fn pending_callbacks(&self) -> usize {
        self.pending.len()
    }

    /// Attaches every service to the radio stack and records the assigned
    /// value handles.
    fn attach_services(&mut self) -> Result<()> {
        for svc in self.services.iter() {
            let hdls = {
                let decl = ServiceDecl {
                    uuid: svc.uuid(),
                    chars: (svc.chars().iter())
                        .map(|&id| {
                            let c = self.chars.get(id);
                            CharDecl {
                                uuid: c.uuid(),
                                props: c.props(),
                                max_len: c.max_len(),
                                value: c.value(),
                            }
                        })
                        .collect(),
                };
                self.stack.add_service(&decl).map_err(Error::stack)?
            };
            if hdls.len() != svc.chars().len() {
                warn!(
                    "Stack returned {} handles for {} characteristics of {}",
                    hdls.len(),
                    svc.chars().len(),
                    svc.uuid()
                );
            }
            for (&id, hdl) in svc.chars().iter().zip(hdls) {
                self.chars.set_handle(id, hdl);
            }
            debug!("Attached service {}", svc.uuid());
        }
        self.attached = true;
        Ok(())
    }
}

impl<S: Stack + Debug> Debug for Puck<S> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Puck")
            .field("stack", &self.stack)
            .field("state", &self.state)
            .field("beacon", &self.beacon)
            .field("chars", &self.chars)
            .field("services", &self.services)
            .field("callbacks", &self.callbacks)
            .field("pending", &self.pending)
            .finish_non_exhaustive()
    }
}
