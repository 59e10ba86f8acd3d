// Copyright 2022 Colin Finck <colin@reactos.org>
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::rc::Rc;

use crate::block::BlockUntil;
use crate::clock::{Clock, Timestamp};
use crate::driver::{BindingToken, DriverBinding, DriverInstance, DriverModule, ModuleRegistry};
use crate::error::IotError;
use crate::record::{DevList, RecordId};
use crate::registry::HwDevRegistry;

/// Result of a driver search.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScanOutcome {
    /// A driver was bound to this record.
    Bound(RecordId),
    /// The search was cut short by the module answering this.
    Aborted(IotError),
    /// Every candidate was tried without binding a driver.
    Exhausted,
    /// Shutdown is in progress, nothing was tried.
    Skipped,
}

impl<C: Clock> HwDevRegistry<C> {
    /// Offers every unbound record to `module` until it takes one.
    /// Does nothing during shutdown.
    ///
    /// Records that are flagged [`BLOCKED`](crate::RecordFlags::BLOCKED) or currently block
    /// the module are skipped.
    pub fn scan_for_driver(&mut self, module: &mut dyn DriverModule) -> ScanOutcome {
        if self.shutdown.is_requested() {
            return ScanOutcome::Skipped;
        }

        let module_id = module.module_id();
        let now = self.clock.now();
        let mut current = self.actual.front_id(&self.arena);

        while let Some(id) = current {
            current = self.arena.next::<DevList>(id);

            let record = self.record_mut(id);
            if record.is_bound() || record.is_blocked() {
                continue;
            }

            if record.is_module_blocked(module_id, now) {
                log::trace!(
                    "Skipping {} for blocked driver module {}",
                    record.describe(),
                    module_id
                );
                continue;
            }

            let release = self.release_handle(id);
            let token = release.token();
            let result = module.try_driver_create(self.record(id), release);

            match self.apply_create_result(id, module, token, result, now) {
                Ok(()) => return ScanOutcome::Bound(id),
                Err(err @ (IotError::ModuleBlocked | IotError::NotReady)) => {
                    return ScanOutcome::Aborted(err)
                }
                Err(_) => {}
            }
        }

        ScanOutcome::Exhausted
    }

    /// Searches a device for a freshly loaded driver module.
    /// Does nothing during shutdown.
    pub fn scan_all_unbound(&mut self, module: &mut dyn DriverModule) -> ScanOutcome {
        self.scan_for_driver(module)
    }

    /// Lets every ready driver module take as many unbound devices as it wants.
    /// Returns the number of new bindings.
    pub fn rescan_all(&mut self, modules: &mut dyn ModuleRegistry) -> usize {
        let mut bound = 0;

        for module in modules.ready_driver_modules() {
            while let ScanOutcome::Bound(_) = self.scan_all_unbound(module) {
                bound += 1;
            }
        }

        bound
    }

    /// Offers record `id` to every ready driver module until one takes it.
    ///
    /// A module answering [`IotError::ModuleBlocked`] is passed over, while
    /// [`IotError::NotReady`] ends the search, as a driver is on its way.
    /// An unknown `id` finds nothing.
    pub fn try_find_driver_for_hwdev(
        &mut self,
        id: RecordId,
        modules: &mut dyn ModuleRegistry,
    ) -> ScanOutcome {
        if self.shutdown.is_requested() {
            return ScanOutcome::Skipped;
        }

        match self.arena.get(id) {
            Some(record) if !record.is_removed() => {}
            _ => {
                log::warn!("Not searching a driver for unknown or removed record {}", id);
                return ScanOutcome::Exhausted;
            }
        }

        let now = self.clock.now();

        for module in modules.ready_driver_modules() {
            let module_id = module.module_id();
            let record = self.record_mut(id);

            if record.is_bound() || record.is_blocked() {
                break;
            }

            if record.is_module_blocked(module_id, now) {
                log::trace!(
                    "Skipping blocked driver module {} for {}",
                    module_id,
                    record.describe()
                );
                continue;
            }

            let release = self.release_handle(id);
            let token = release.token();
            let result = module.try_driver_create(self.record(id), release);

            match self.apply_create_result(id, module, token, result, now) {
                Ok(()) => return ScanOutcome::Bound(id),
                Err(IotError::NotReady) => return ScanOutcome::Aborted(IotError::NotReady),
                Err(_) => {}
            }
        }

        ScanOutcome::Exhausted
    }

    /// Binds the created driver or records the failure in the block table of record `id`.
    /// Failures are handed back for the caller to decide whether to go on.
    fn apply_create_result(
        &mut self,
        id: RecordId,
        module: &dyn DriverModule,
        token: BindingToken,
        result: Result<Rc<dyn DriverInstance>, IotError>,
        now: Timestamp,
    ) -> Result<(), IotError> {
        let module_id = module.module_id();
        let retry_at = now.saturating_add(self.config.retry_cooldown);
        let record = self.record_mut(id);

        let err = match result {
            Ok(instance) => {
                log::debug!(
                    "Driver module {} ({}) bound to {}",
                    module_id,
                    module.name(),
                    record.describe()
                );
                record.bind(DriverBinding {
                    module_id,
                    instance,
                    token,
                });
                return Ok(());
            }
            Err(err) => err,
        };

        // NOT_READY blocks like a temporary error until the driver confirms its creation.
        let until = match err {
            IotError::DeviceNotSupported | IotError::ModuleBlocked => return Err(err),
            IotError::TemporaryError | IotError::NotReady => BlockUntil::At(retry_at),
            IotError::CriticalError => BlockUntil::Forever,
            _ => panic!(
                "driver module {} ({}) returned unexpected error {} for {}",
                module_id,
                module.name(),
                err.name(),
                record.describe()
            ),
        };

        if !record.block_module(module_id, until, now) {
            log::error!(
                "Device used all module-blocking slots and was blocked: {}",
                record.describe()
            );
        }

        Err(err)
    }
}
