use tracing::debug;

use crate::gap::Uuid;

use super::*;

/// Service grouping characteristics in the order they were added.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Service {
    uuid: Uuid,
    chars: Box<[CharId]>,
}

impl Service {
    /// Returns the service UUID.
    #[inline(always)]
    #[must_use]
    pub const fn uuid(&self) -> Uuid {
        self.uuid
    }

    /// Returns the service characteristics.
    #[inline(always)]
    #[must_use]
    pub fn chars(&self) -> &[CharId] {
        &self.chars
    }
}

/// Table of services, each defined by a fixed characteristic array.
///
/// The radio stack cannot append to an attached service, so services are
/// treated as immutable: adding a characteristic removes the old service and
/// pushes a rebuilt one at the end of the table. That is O(n) per addition,
/// which is fine for the dozen or so characteristics of a typical puck. Only
/// the [`CharId`] array is copied; characteristic records stay in place.
#[derive(Clone, Debug, Default)]
pub struct ServiceTable(Vec<Service>);

impl ServiceTable {
    /// Creates an empty table.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Appends characteristic `id` to service `uuid`, creating the service if
    /// it does not exist. Returns the rebuilt service.
    pub fn add(&mut self, uuid: Uuid, id: CharId) -> &Service {
        let chars = match self.0.iter().position(|s| s.uuid == uuid) {
            Some(i) => {
                let old = self.0.remove(i);
                let mut chars = Vec::with_capacity(old.chars.len() + 1);
                chars.extend_from_slice(&old.chars);
                chars.push(id);
                debug!("Rebuilt service {uuid} with {} characteristics", chars.len());
                chars
            }
            None => {
                debug!("Created service {uuid}");
                vec![id]
            }
        };
        self.0.push(Service {
            uuid,
            chars: chars.into_boxed_slice(),
        });
        // SAFETY: Non-empty after push
        unsafe { self.0.last().unwrap_unchecked() }
    }

    /// Returns the service matching `uuid`.
    #[must_use]
    pub fn get(&self, uuid: Uuid) -> Option<&Service> {
        self.0.iter().find(|s| s.uuid == uuid)
    }

    /// Returns the number of services.
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

    /// Returns an iterator over all services. A service moves to the end
    /// whenever it is rebuilt.
    #[inline]
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &Service> {
        self.0.iter()
    }
}
