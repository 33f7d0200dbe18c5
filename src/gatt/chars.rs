use std::fmt::{Debug, Display, Formatter};

use tracing::{trace, warn};

use crate::att::Handle;
use crate::gap::Uuid;
use crate::name_of;

use super::*;

/// Stable index of a characteristic in its [`CharacteristicTable`].
#[derive(Clone, Copy, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[repr(transparent)]
pub struct CharId(u16);

impl CharId {
    /// Returns the table index.
    #[inline(always)]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl Debug for CharId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", name_of!(CharId), self.0)
    }
}

impl Display for CharId {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Debug::fmt(self, f)
    }
}

/// Characteristic record with its own fixed-length value buffer.
#[derive(Clone, Debug)]
pub struct Characteristic {
    uuid: Uuid,
    props: CharProps,
    val: Box<[u8]>,
    len: usize,
    hdl: Option<Handle>,
}

impl Characteristic {
    /// Creates a characteristic with a zero-filled value of `len` bytes.
    fn new(uuid: Uuid, len: usize, props: CharProps) -> Self {
        Self {
            uuid,
            props,
            val: vec![0; len].into_boxed_slice(),
            len,
            hdl: None,
        }
    }

    /// Returns the characteristic UUID.
    #[inline(always)]
    #[must_use]
    pub const fn uuid(&self) -> Uuid {
        self.uuid
    }

    /// Returns the characteristic properties.
    #[inline(always)]
    #[must_use]
    pub const fn props(&self) -> CharProps {
        self.props
    }

    /// Returns the value handle, which is only assigned once the owning
    /// service is attached to the radio stack.
    #[inline(always)]
    #[must_use]
    pub const fn handle(&self) -> Option<Handle> {
        self.hdl
    }

    /// Returns the fixed value buffer length.
    #[inline(always)]
    #[must_use]
    pub fn max_len(&self) -> usize {
        self.val.len()
    }

    /// Returns the current value.
    #[inline]
    #[must_use]
    pub fn value(&self) -> &[u8] {
        &self.val[..self.len]
    }

    /// Replaces the current value. Values longer than the buffer are
    /// truncated.
    fn set_value(&mut self, v: &[u8]) {
        if v.len() > self.max_len() {
            warn!(
                "Truncating {} byte value of {} to {} bytes",
                v.len(),
                self.uuid,
                self.max_len()
            );
        }
        self.len = v.len().min(self.max_len());
        self.val[..self.len].copy_from_slice(&v[..self.len]);
    }
}

/// Arena of all characteristics ever added. Records are never removed, so a
/// [`CharId`] and the value buffer behind it stay valid while services are
/// rebuilt.
#[derive(Clone, Debug, Default)]
pub struct CharacteristicTable(Vec<Characteristic>);

impl CharacteristicTable {
    /// Creates an empty table.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Adds a characteristic with a zero-filled value of `len` bytes.
    ///
    /// # Panics
    ///
    /// Panics if `len` exceeds [`MAX_VALUE_LEN`].
    #[track_caller]
    pub fn add(&mut self, uuid: Uuid, len: usize, props: CharProps) -> CharId {
        assert!(
            len <= MAX_VALUE_LEN,
            "characteristic value length {len} exceeds {MAX_VALUE_LEN} bytes"
        );
        let id = CharId(u16::try_from(self.0.len()).expect("characteristic table overflow"));
        self.0.push(Characteristic::new(uuid, len, props));
        id
    }

    /// Returns the characteristic with the specified id.
    #[inline]
    #[must_use]
    pub fn get(&self, id: CharId) -> &Characteristic {
        &self.0[id.index()]
    }

    /// Returns the id of the first characteristic matching `uuid`.
    #[must_use]
    pub fn find(&self, uuid: Uuid) -> Option<CharId> {
        let i = self.0.iter().position(|c| c.uuid == uuid)?;
        Some(CharId(i as u16))
    }

    /// Returns the id of the characteristic with the value handle `hdl`.
    #[must_use]
    pub fn find_handle(&self, hdl: Handle) -> Option<CharId> {
        let i = self.0.iter().position(|c| c.hdl == Some(hdl))?;
        Some(CharId(i as u16))
    }

    /// Returns the current value of the first characteristic matching `uuid`.
    #[must_use]
    pub fn value(&self, uuid: Uuid) -> Option<&[u8]> {
        self.find(uuid).map(|id| self.get(id).value())
    }

    /// Replaces the value of characteristic `id`.
    #[inline]
    pub fn set_value(&mut self, id: CharId, v: &[u8]) {
        trace!("{id} <- {v:02X?}");
        self.0[id.index()].set_value(v);
    }

    /// Records the value handle assigned by the radio stack.
    #[inline]
    pub(crate) fn set_handle(&mut self, id: CharId, hdl: Handle) {
        self.0[id.index()].hdl = Some(hdl);
    }

    /// Returns the number of characteristics.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns whether the table is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns an iterator over all characteristics in insertion order.
    #[inline]
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &Characteristic> {
        self.0.iter()
    }
}
