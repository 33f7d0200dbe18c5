use std::fmt::{Debug, Formatter};
use std::rc::Rc;

use smallvec::SmallVec;
use tracing::trace;

use crate::gap::Uuid;

/// Characteristic write callback. The callback receives a context, which is
/// the controller that dispatched it, and the bytes written by the peer.
pub struct WriteCallback<C: ?Sized>(Rc<dyn Fn(&mut C, &[u8])>);

impl<C: ?Sized> WriteCallback<C> {
    /// Calls the callback.
    #[inline(always)]
    pub fn call(&self, cx: &mut C, v: &[u8]) {
        (self.0)(cx, v);
    }
}

impl<C: ?Sized> Clone for WriteCallback<C> {
    #[inline]
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<C: ?Sized> Debug for WriteCallback<C> {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        (f.debug_tuple("WriteCallback")).field(&Rc::as_ptr(&self.0)).finish()
    }
}

impl<C: ?Sized, T: Fn(&mut C, &[u8]) + 'static> From<T> for WriteCallback<C> {
    #[inline(always)]
    fn from(f: T) -> Self {
        Self(Rc::new(f))
    }
}

/// Callbacks bound to one characteristic UUID in registration order.
struct Binding<C: ?Sized> {
    uuid: Uuid,
    cbs: SmallVec<[WriteCallback<C>; 2]>,
}

/// Map of characteristic UUIDs to their write callbacks.
pub struct CallbackRegistry<C: ?Sized>(Vec<Binding<C>>);

impl<C: ?Sized> CallbackRegistry<C> {
    /// Creates an empty registry.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Appends `cb` to the callbacks of `uuid`. The same callback may be
    /// registered more than once.
    pub fn bind(&mut self, uuid: Uuid, cb: WriteCallback<C>) {
        let i = match self.0.iter().position(|b| b.uuid == uuid) {
            Some(i) => i,
            None => {
                self.0.push(Binding {
                    uuid,
                    cbs: SmallVec::new(),
                });
                self.0.len() - 1
            }
        };
        trace!("Bound write callback {cb:?} to {uuid}");
        self.0[i].cbs.push(cb);
    }

    /// Returns the callbacks bound to `uuid` in registration order.
    #[must_use]
    pub fn get(&self, uuid: Uuid) -> Option<&[WriteCallback<C>]> {
        (self.0.iter().find(|b| b.uuid == uuid)).map(|b| b.cbs.as_slice())
    }

    /// Returns the number of distinct UUIDs with callbacks.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns whether the registry is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<C: ?Sized> Debug for CallbackRegistry<C> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(self.0.iter().map(|b| (b.uuid, &b.cbs)))
            .finish()
    }
}

impl<C: ?Sized> Default for CallbackRegistry<C> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

/// Callback waiting to be executed with a copy of the written bytes.
pub struct PendingCallback<C: ?Sized> {
    cb: WriteCallback<C>,
    data: Rc<[u8]>,
}

impl<C: ?Sized> PendingCallback<C> {
    /// Executes the callback.
    #[inline]
    pub fn run(self, cx: &mut C) {
        self.cb.call(cx, &self.data);
    }

    /// Returns the bytes that will be passed to the callback.
    #[inline(always)]
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

impl<C: ?Sized> Debug for PendingCallback<C> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        (f.debug_struct("PendingCallback"))
            .field("cb", &self.cb)
            .field("data", &format_args!("{:02X?}", self.data))
            .finish()
    }
}

/// Stack of callbacks queued by write events. Callbacks are executed in
/// last-in-first-out order, so the callbacks of a single write run in reverse
/// registration order.
pub struct PendingQueue<C: ?Sized>(Vec<PendingCallback<C>>);

impl<C: ?Sized> PendingQueue<C> {
    /// Creates an empty queue.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Queues all callbacks in `cbs` with one shared copy of `data`. The copy
    /// keeps the bytes valid after the radio stack reuses its event buffer.
    pub fn push_all(&mut self, cbs: &[WriteCallback<C>], data: &[u8]) {
        let data: Rc<[u8]> = Rc::from(data);
        self.0.extend(cbs.iter().map(|cb| PendingCallback {
            cb: cb.clone(),
            data: Rc::clone(&data),
        }));
    }

    /// Removes the most recently queued callback.
    #[inline]
    pub fn pop(&mut self) -> Option<PendingCallback<C>> {
        self.0.pop()
    }

    /// Returns the number of queued callbacks.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns whether the queue is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<C: ?Sized> Debug for PendingQueue<C> {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(&self.0).finish()
    }
}

impl<C: ?Sized> Default for PendingQueue<C> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}
