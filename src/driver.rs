// Copyright 2022 Colin Finck <colin@reactos.org>
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::fmt;
use std::rc::Rc;
use std::sync::mpsc::Sender;

use crate::error::IotError;
use crate::ident::ModuleId;
use crate::record::{HwDevRecord, RecordId};

/// A running driver created by a [`DriverModule`] for one hardware device.
pub trait DriverInstance {
    /// Asks the driver to stop.
    /// The driver answers by eventually calling [`ReleaseHandle::release`].
    fn stop(&self, graceful: bool);

    /// Returns `true` if the driver is up and not on its way down.
    fn is_working_not_stopping(&self) -> bool;
}

/// Identifies a single driver creation attempt.
///
/// Every [`ReleaseHandle`] carries a fresh token, and a binding keeps the token of the attempt
/// that created it. A release only affects the binding with the same token.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BindingToken(pub(crate) u64);

/// The driver currently holding a record.
#[derive(Clone)]
pub struct DriverBinding {
    pub module_id: ModuleId,
    pub instance: Rc<dyn DriverInstance>,
    pub token: BindingToken,
}

impl fmt::Debug for DriverBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DriverBinding")
            .field("module_id", &self.module_id)
            .field("token", &self.token)
            .finish_non_exhaustive()
    }
}

/// Token through which a driver gives a record back to the registry.
///
/// The handle may be moved to any thread. Releasing only queues the record. The registry acts
/// on it in [`HwDevRegistry::process_releases`](crate::HwDevRegistry::process_releases) on its
/// own thread.
#[derive(Debug)]
pub struct ReleaseHandle {
    record: RecordId,
    token: BindingToken,
    tx: Sender<(RecordId, BindingToken)>,
}

impl ReleaseHandle {
    pub(crate) fn new(
        record: RecordId,
        token: BindingToken,
        tx: Sender<(RecordId, BindingToken)>,
    ) -> Self {
        Self { record, token, tx }
    }

    pub fn record(&self) -> RecordId {
        self.record
    }

    pub fn token(&self) -> BindingToken {
        self.token
    }

    pub fn release(self) {
        if self.tx.send((self.record, self.token)).is_err() {
            log::warn!("Registry is gone, dropping release of record {}", self.record);
        }
    }
}

/// A loaded module able to create drivers for hardware devices.
pub trait DriverModule {
    fn module_id(&self) -> ModuleId;

    fn name(&self) -> &str {
        "unnamed"
    }

    /// Tries to create a driver for `record`.
    ///
    /// Expected failures are [`IotError::DeviceNotSupported`], [`IotError::TemporaryError`],
    /// [`IotError::CriticalError`], [`IotError::NotReady`] and [`IotError::ModuleBlocked`].
    /// Anything else is treated as a broken module.
    fn try_driver_create(
        &mut self,
        record: &HwDevRecord,
        release: ReleaseHandle,
    ) -> Result<Rc<dyn DriverInstance>, IotError>;
}

/// Source of the driver modules that are currently loaded and willing to take devices.
pub trait ModuleRegistry {
    fn ready_driver_modules(&mut self) -> Vec<&mut dyn DriverModule>;
}

/// A local peer that wants to talk to a hardware device through its driver.
pub trait DeviceConnection {
    /// Returns `true` if no connection attempt has been made yet.
    fn is_initial(&self) -> bool;

    /// Tries to attach to the driver `instance`.
    ///
    /// Expected failures are [`IotError::NotReady`], [`IotError::NoMemory`],
    /// [`IotError::TemporaryError`], [`IotError::HardLimitReached`] and
    /// [`IotError::DeviceNotSupported`].
    fn connect_local(&mut self, instance: &Rc<dyn DriverInstance>) -> Result<(), IotError>;
}
