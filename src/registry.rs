// Copyright 2022 Colin Finck <colin@reactos.org>
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::cell::Cell;
use std::marker::PhantomData;
use std::rc::Rc;
use std::sync::mpsc::{self, Receiver, Sender};

use selfloc_list::head_list::SlHeadListHead;
use selfloc_list::SlArena;

use crate::clock::{Clock, MonotonicClock};
use crate::config::RegistryConfig;
use crate::driver::{BindingToken, DriverBinding, DriverInstance, ModuleRegistry, ReleaseHandle};
use crate::ident::{HandlerTable, HwDevIdent, IdentHandler, ModuleId};
use crate::record::{DevList, HwDevRecord, RecordId};
use crate::shutdown::ShutdownFlag;

/// What a device detector reports about a hardware device.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HwDevAction {
    /// A device appeared.
    Add,
    /// A device disappeared.
    Remove,
    /// The data of a device changed.
    Replace,
}

/// Why a detector report was refused without touching the registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RejectReason {
    /// No [`IdentHandler`] is registered for the connection type.
    UnknownHandler,
    /// The identity is a template instead of a concrete device.
    Template,
}

/// Result of [`HwDevRegistry::apply_action`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActionOutcome {
    /// A new record was allocated.
    Added(RecordId),
    /// An existing unbound record was updated in place.
    Updated(RecordId),
    /// The record was freed right away.
    Removed,
    /// The record is bound, so it was moved to the removed list and its driver was asked to
    /// stop. It is freed once the driver releases it.
    SoftRemoved(RecordId),
    /// Nothing matched the report.
    Ignored,
    Rejected(RejectReason),
    /// Memory ran out. The registry is unchanged.
    Dropped,
}

/// Registry of the hardware devices attached to this host and of the drivers bound to them.
///
/// The registry lives on the thread that created it (it is neither `Send` nor `Sync`).
/// Drivers on other threads hand records back through [`ReleaseHandle`]s.
pub struct HwDevRegistry<C: Clock = MonotonicClock> {
    pub(crate) arena: SlArena<HwDevRecord>,
    pub(crate) actual: SlHeadListHead<HwDevRecord, DevList>,
    pub(crate) removed: SlHeadListHead<HwDevRecord, DevList>,
    pub(crate) handlers: HandlerTable,
    pub(crate) config: RegistryConfig,
    pub(crate) clock: C,
    pub(crate) shutdown: ShutdownFlag,
    next_token: Cell<u64>,
    release_tx: Sender<(RecordId, BindingToken)>,
    release_rx: Receiver<(RecordId, BindingToken)>,
    _not_send: PhantomData<*const ()>,
}

impl HwDevRegistry<MonotonicClock> {
    pub fn new(config: RegistryConfig, handlers: HandlerTable) -> Self {
        Self::with_clock(config, handlers, MonotonicClock::new())
    }
}

impl<C: Clock> HwDevRegistry<C> {
    pub fn with_clock(config: RegistryConfig, handlers: HandlerTable, clock: C) -> Self {
        let mut arena = SlArena::new();
        let actual = SlHeadListHead::new(&mut arena);
        let removed = SlHeadListHead::new(&mut arena);
        let (release_tx, release_rx) = mpsc::channel();

        Self {
            arena,
            actual,
            removed,
            handlers,
            config,
            clock,
            shutdown: ShutdownFlag::new(),
            next_token: Cell::new(0),
            release_tx,
            release_rx,
            _not_send: PhantomData,
        }
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Returns a shared handle of the flag that stops all driver search and local connections.
    pub fn shutdown_flag(&self) -> ShutdownFlag {
        self.shutdown.clone()
    }

    /// Applies a detector report.
    ///
    /// Reports for unknown connection types and template identities are logged and refused.
    /// An `Add` for a device already present replaces it, and a `Replace` for an unknown device
    /// adds it.
    /// After adding or replacing, driver search runs for the affected record.
    pub fn apply_action(
        &mut self,
        action: HwDevAction,
        ident: &HwDevIdent,
        payload: &[u8],
        modules: &mut dyn ModuleRegistry,
    ) -> ActionOutcome {
        let handler = match self.handlers.find_handler(ident) {
            Some(handler) => handler,
            None => {
                log::error!(
                    "Cannot find device connection handler for device from detector {}, contype={}",
                    ident.detector_module_id,
                    ident.contype.0
                );
                return ActionOutcome::Rejected(RejectReason::UnknownHandler);
            }
        };

        if handler.is_template(ident) {
            log::error!(
                "Got incomplete device data from detector {}",
                ident.detector_module_id
            );
            return ActionOutcome::Rejected(RejectReason::Template);
        }

        let existing = self.find_by_address_with(&*handler, ident);

        match action {
            HwDevAction::Remove => {
                let id = match existing {
                    Some(id) if handler.matches_hwid(self.record(id).ident(), ident) => id,
                    _ => return ActionOutcome::Ignored,
                };

                log::debug!(
                    "Removing device from detector {}: {}",
                    ident.detector_module_id,
                    self.record(id).describe()
                );
                return self.detach(id);
            }
            HwDevAction::Add => {
                if let Some(id) = existing {
                    log::debug!(
                        "Replacing duplicate device instead of adding from detector {}: {}",
                        ident.detector_module_id,
                        self.record(id).describe()
                    );
                }
            }
            HwDevAction::Replace => {
                if existing.is_none() {
                    log::debug!(
                        "Adding new device instead of replacing from detector {}: {}",
                        ident.detector_module_id,
                        handler.describe(ident)
                    );
                }
            }
        }

        let outcome = match existing {
            Some(id) if !self.record(id).is_bound() && self.record(id).capacity() >= payload.len() => {
                self.record_mut(id).refresh(ident, payload);
                ActionOutcome::Updated(id)
            }
            _ => {
                // Allocate first, so that running out of memory leaves the old record alone.
                let id = match self.try_alloc(action, handler, ident, payload) {
                    Some(id) => id,
                    None => return ActionOutcome::Dropped,
                };

                if let Some(old) = existing {
                    self.detach(old);
                }

                self.actual.push_front(&mut self.arena, id);
                ActionOutcome::Added(id)
            }
        };

        if let ActionOutcome::Added(id) | ActionOutcome::Updated(id) = outcome {
            self.try_find_driver_for_hwdev(id, modules);
        }

        outcome
    }

    /// Returns the record at the same device location as `ident`.
    pub fn find_by_address(&self, ident: &HwDevIdent) -> Option<RecordId> {
        let handler = self.handlers.find_handler(ident)?;
        self.find_by_address_with(&*handler, ident)
    }

    /// Returns the first record satisfying the template `tmpl`.
    pub fn find_by_template(&self, tmpl: &HwDevIdent) -> Option<RecordId> {
        self.records()
            .find(|(_, record)| {
                record.ident().contype == tmpl.contype
                    && record.handler().matches(record.ident(), tmpl)
            })
            .map(|(id, _)| id)
    }

    pub fn get(&self, id: RecordId) -> Option<&HwDevRecord> {
        self.arena.get(id)
    }

    pub fn get_mut(&mut self, id: RecordId) -> Option<&mut HwDevRecord> {
        self.arena.get_mut(id)
    }

    /// Iterates over the present devices, most recently added first.
    pub fn records(&self) -> impl Iterator<Item = (RecordId, &HwDevRecord)> + '_ {
        self.actual.iter(&self.arena)
    }

    /// Iterates over the devices gone from the detectors but still held by a driver.
    pub fn removed_records(&self) -> impl Iterator<Item = (RecordId, &HwDevRecord)> + '_ {
        self.removed.iter(&self.arena)
    }

    /// Returns the number of present devices.
    pub fn len(&self) -> usize {
        self.actual.len(&self.arena)
    }

    pub fn is_empty(&self) -> bool {
        self.actual.is_empty(&self.arena)
    }

    /// Returns the number of soft-removed devices.
    pub fn removed_len(&self) -> usize {
        self.removed.len(&self.arena)
    }

    /// Returns `true` if some present device has no driver yet, but a later scan may still
    /// find one because a driver module is only blocked for a while.
    pub fn has_unconnected_devs(&self) -> bool {
        self.records().any(|(_, record)| {
            !record.is_bound() && !record.is_blocked() && record.blocks().has_timed_block()
        })
    }

    /// Creates the handle a driver for record `id` uses to give it back.
    /// Each handle belongs to a single creation attempt.
    pub fn release_handle(&self, id: RecordId) -> ReleaseHandle {
        let token = BindingToken(self.next_token.get());
        self.next_token.set(token.0.wrapping_add(1));
        ReleaseHandle::new(id, token, self.release_tx.clone())
    }

    /// Acts on all releases queued through [`ReleaseHandle`]s so far.
    /// Returns the number of processed releases.
    pub fn process_releases(&mut self) -> usize {
        let mut count = 0;

        while let Ok((id, token)) = self.release_rx.try_recv() {
            self.release_driver(id, token);
            count += 1;
        }

        count
    }

    /// Drops the driver binding of record `id` if it was created under `token`.
    /// A soft-removed record is freed right away.
    ///
    /// Releases of any other attempt (a refused late driver, a module that failed) leave the
    /// record alone.
    pub fn release_driver(&mut self, id: RecordId, token: BindingToken) {
        let record = match self.arena.get_mut(id) {
            Some(record) => record,
            None => {
                log::warn!("Ignoring release of unknown record {}", id);
                return;
            }
        };

        match record.driver() {
            Some(binding) if binding.token == token => {}
            Some(binding) => {
                log::warn!(
                    "Ignoring release {:?} of {} held by driver module {} under {:?}",
                    token,
                    record.describe(),
                    binding.module_id,
                    binding.token
                );
                return;
            }
            None => {
                log::warn!("Ignoring release of unbound {}", record.describe());
                return;
            }
        }

        let binding = match record.take_driver() {
            Some(binding) => binding,
            None => return,
        };

        log::debug!(
            "Driver module {} released {}",
            binding.module_id,
            record.describe()
        );

        if record.is_removed() {
            self.finish_removal(id);
        }
    }

    /// Frees a soft-removed record whose driver is gone.
    /// An unknown `id` is ignored.
    ///
    /// # Panics
    ///
    /// Panics if the record is not soft-removed or still bound.
    pub fn finish_removal(&mut self, id: RecordId) {
        let record = match self.arena.get(id) {
            Some(record) => record,
            None => {
                log::warn!("Ignoring removal of unknown record {}", id);
                return;
            }
        };
        assert!(
            record.is_removed() && !record.is_bound(),
            "record {} is not ready to be freed: {:?}",
            id,
            record
        );

        log::debug!("Freeing removed {}", record.describe());
        self.arena.unlink::<DevList>(id);
        self.arena.take(id);
    }

    /// Binds the driver a module finished creating after having answered
    /// [`IotError::NotReady`](crate::IotError::NotReady), and lifts that module's block.
    /// `release` is the handle the module got for that attempt.
    ///
    /// If the record is gone or got another driver meanwhile, `instance` is stopped and `false`
    /// is returned.
    pub fn complete_driver_create(
        &mut self,
        release: &ReleaseHandle,
        module_id: ModuleId,
        instance: Rc<dyn DriverInstance>,
    ) -> bool {
        let id = release.record();

        match self.arena.get_mut(id) {
            Some(record) if !record.is_bound() && !record.is_removed() => {
                record.clear_block(module_id);
                log::debug!(
                    "Driver module {} bound to {}",
                    module_id,
                    record.describe()
                );
                record.bind(DriverBinding {
                    module_id,
                    instance,
                    token: release.token(),
                });
                true
            }
            _ => {
                log::warn!(
                    "Dropping late driver of module {} for record {}",
                    module_id,
                    id
                );
                instance.stop(false);
                false
            }
        }
    }

    pub(crate) fn record(&self, id: RecordId) -> &HwDevRecord {
        match self.arena.get(id) {
            Some(record) => record,
            None => panic!("stale record id {}", id),
        }
    }

    pub(crate) fn record_mut(&mut self, id: RecordId) -> &mut HwDevRecord {
        match self.arena.get_mut(id) {
            Some(record) => record,
            None => panic!("stale record id {}", id),
        }
    }

    fn find_by_address_with(&self, handler: &dyn IdentHandler, ident: &HwDevIdent) -> Option<RecordId> {
        self.records()
            .find(|(_, record)| {
                record.ident().contype == ident.contype
                    && handler.matches_address(record.ident(), ident)
            })
            .map(|(id, _)| id)
    }

    /// Takes record `id` out of the actual list.
    /// A bound record is moved to the removed list and its driver is asked to stop, an
    /// unbound one is freed.
    fn detach(&mut self, id: RecordId) -> ActionOutcome {
        self.arena.unlink_no_clear::<DevList>(id);

        let instance = self
            .record(id)
            .driver()
            .map(|binding| Rc::clone(&binding.instance));

        match instance {
            Some(instance) => {
                self.removed.push_front(&mut self.arena, id);
                self.record_mut(id).set_removed();
                instance.stop(false);
                ActionOutcome::SoftRemoved(id)
            }
            None => {
                self.arena.take(id);
                ActionOutcome::Removed
            }
        }
    }

    fn try_alloc(
        &mut self,
        action: HwDevAction,
        handler: Rc<dyn IdentHandler>,
        ident: &HwDevIdent,
        payload: &[u8],
    ) -> Option<RecordId> {
        let description = handler.describe(ident);

        let record = HwDevRecord::try_new(ident, self.config.host_id, handler, payload)
            .and_then(|record| self.arena.try_insert(record));

        match record {
            Ok(id) => Some(id),
            Err(e) => {
                log::error!(
                    "No memory for device ({})! {:?} dropped for detector {}, {}",
                    e,
                    action,
                    ident.detector_module_id,
                    description
                );
                None
            }
        }
    }
}
