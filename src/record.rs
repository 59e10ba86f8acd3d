// Copyright 2022 Colin Finck <colin@reactos.org>
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::collections::TryReserveError;
use std::fmt;
use std::rc::Rc;

use bitflags::bitflags;
use selfloc_list::head_list::SlHeadList;
use selfloc_list::{ElementId, Link, SlListElement};

use crate::block::{BlockTable, BlockUntil};
use crate::clock::Timestamp;
use crate::driver::DriverBinding;
use crate::ident::{HostId, HwDevIdent, IdentHandler, ModuleId};

/// The single list type records are linked through.
///
/// A record is part of either the actual or the removed list of its registry, never both.
#[derive(SlHeadList)]
pub enum DevList {}

/// Handle of a [`HwDevRecord`] inside its [`HwDevRegistry`](crate::HwDevRegistry).
pub type RecordId = ElementId;

bitflags! {
    /// State bits of a [`HwDevRecord`].
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct RecordFlags: u8 {
        /// Driver search is exhausted for this record. Skipped by every scan until the record
        /// is updated.
        const BLOCKED = 1 << 0;
        /// The detector deleted this device, but a driver still holds it.
        const REMOVED = 1 << 1;
    }
}

/// A locally attached hardware device tracked by the registry.
#[derive(SlListElement)]
pub struct HwDevRecord {
    entry: Link<Self, DevList>,
    ident: HwDevIdent,
    host: HostId,
    handler: Rc<dyn IdentHandler>,
    payload: Box<[u8]>,
    payload_len: usize,
    driver: Option<DriverBinding>,
    blocks: BlockTable,
    flags: RecordFlags,
}

impl HwDevRecord {
    /// Creates an unbound record with an empty block table.
    /// The payload buffer is allocated exactly as large as `payload`.
    pub(crate) fn try_new(
        ident: &HwDevIdent,
        host: HostId,
        handler: Rc<dyn IdentHandler>,
        payload: &[u8],
    ) -> Result<Self, TryReserveError> {
        Ok(Self {
            entry: Link::new(),
            ident: ident.clone(),
            host,
            handler,
            payload: alloc_payload(payload)?,
            payload_len: payload.len(),
            driver: None,
            blocks: BlockTable::new(),
            flags: RecordFlags::empty(),
        })
    }

    pub fn ident(&self) -> &HwDevIdent {
        &self.ident
    }

    pub fn host(&self) -> HostId {
        self.host
    }

    /// Returns the device-type specific data last reported by the detector.
    pub fn payload(&self) -> &[u8] {
        &self.payload[..self.payload_len]
    }

    /// Returns the size of the payload buffer, which may exceed the current payload.
    pub fn capacity(&self) -> usize {
        self.payload.len()
    }

    pub fn driver(&self) -> Option<&DriverBinding> {
        self.driver.as_ref()
    }

    pub fn is_bound(&self) -> bool {
        self.driver.is_some()
    }

    pub fn is_blocked(&self) -> bool {
        self.flags.contains(RecordFlags::BLOCKED)
    }

    pub fn is_removed(&self) -> bool {
        self.flags.contains(RecordFlags::REMOVED)
    }

    pub fn flags(&self) -> RecordFlags {
        self.flags
    }

    pub fn blocks(&self) -> &BlockTable {
        &self.blocks
    }

    /// Returns a human-readable description of the device identity.
    pub fn describe(&self) -> String {
        self.handler.describe(&self.ident)
    }

    pub(crate) fn handler(&self) -> &dyn IdentHandler {
        &*self.handler
    }

    /// Returns `true` if `module_id` must not be tried for this record at `now`.
    pub fn is_module_blocked(&mut self, module_id: ModuleId, now: Timestamp) -> bool {
        self.blocks.is_module_blocked(module_id, now)
    }

    /// Removes the block of `module_id`, or all blocks for [`ModuleId::ANY`].
    pub fn clear_block(&mut self, module_id: ModuleId) {
        self.blocks.clear_block(module_id);
    }

    /// Blocks `module_id` for this record.
    /// If the block table has no room left, the whole record is flagged [`RecordFlags::BLOCKED`]
    /// instead and `false` is returned.
    pub fn block_module(&mut self, module_id: ModuleId, until: BlockUntil, now: Timestamp) -> bool {
        if self.blocks.block_module(module_id, until, now) {
            true
        } else {
            self.flags.insert(RecordFlags::BLOCKED);
            false
        }
    }

    /// Overwrites the identity and payload of an unbound record whose buffer is large enough.
    /// The record becomes eligible for driver search again.
    pub(crate) fn refresh(&mut self, ident: &HwDevIdent, payload: &[u8]) {
        debug_assert!(payload.len() <= self.capacity());
        debug_assert!(self.driver.is_none());

        self.ident.clone_from(ident);
        self.payload[..payload.len()].copy_from_slice(payload);
        self.payload_len = payload.len();
        self.blocks.clear_block(ModuleId::ANY);
        self.flags.remove(RecordFlags::BLOCKED);
    }

    pub(crate) fn bind(&mut self, binding: DriverBinding) {
        debug_assert!(self.driver.is_none());
        self.driver = Some(binding);
    }

    pub(crate) fn take_driver(&mut self) -> Option<DriverBinding> {
        self.driver.take()
    }

    pub(crate) fn set_removed(&mut self) {
        self.flags.insert(RecordFlags::REMOVED);
    }
}

impl fmt::Debug for HwDevRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HwDevRecord")
            .field("ident", &self.ident)
            .field("host", &self.host)
            .field("payload_len", &self.payload_len)
            .field("capacity", &self.capacity())
            .field("driver", &self.driver)
            .field("flags", &self.flags)
            .finish()
    }
}

fn alloc_payload(payload: &[u8]) -> Result<Box<[u8]>, TryReserveError> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(payload.len())?;
    buf.extend_from_slice(payload);
    Ok(buf.into_boxed_slice())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MAX_BLOCKED_MODULES;
    use crate::ident::{ByteIdentHandler, DevConType};

    fn record(payload: &[u8]) -> HwDevRecord {
        let ident = HwDevIdent {
            contype: DevConType(1),
            detector_module_id: ModuleId(5),
            address: vec![1],
            hwid: vec![2],
        };
        let handler = Rc::new(ByteIdentHandler::new(DevConType(1), "usb"));
        HwDevRecord::try_new(&ident, HostId(3), handler, payload).unwrap()
    }

    #[test]
    fn refresh_reuses_buffer() {
        let mut rec = record(&[0; 16]);
        let buffer = rec.payload.as_ptr();
        let ident = rec.ident().clone();

        rec.block_module(ModuleId(9), BlockUntil::Forever, Timestamp(0));
        rec.refresh(&ident, &[7; 4]);

        assert_eq!(rec.payload(), &[7; 4]);
        assert_eq!(rec.capacity(), 16);
        assert_eq!(rec.payload.as_ptr(), buffer);
        assert!(rec.blocks().is_empty());
    }

    #[test]
    fn full_block_table_flags_record() {
        let mut rec = record(&[]);
        let now = Timestamp(0);

        for i in 1..=MAX_BLOCKED_MODULES as u32 {
            assert!(rec.block_module(ModuleId(i), BlockUntil::Forever, now));
        }
        assert!(!rec.is_blocked());

        assert!(!rec.block_module(ModuleId(99), BlockUntil::Forever, now));
        assert!(rec.is_blocked());
        assert!(!rec.is_module_blocked(ModuleId(99), now));
    }
}
