// Copyright 2022 Colin Finck <colin@reactos.org>
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::clock::Clock;
use crate::driver::DeviceConnection;
use crate::error::IotError;
use crate::record::RecordId;
use crate::registry::HwDevRegistry;

impl<C: Clock> HwDevRegistry<C> {
    /// Finds a running local driver accepting `conn`.
    ///
    /// Returns the record whose driver took the connection.
    /// [`IotError::NotReady`] means a driver accepted and the connection is still being set up,
    /// [`IotError::NoMemory`] ends the search early.
    /// If no driver accepted, [`IotError::TemporaryError`] is returned when some driver may
    /// accept later, [`IotError::NotFound`] otherwise (and always during shutdown).
    ///
    /// # Panics
    ///
    /// Panics if `conn` is not in its initial state or a driver answers with an error outside
    /// the ones listed for [`DeviceConnection::connect_local`].
    pub fn connect_local(&self, conn: &mut dyn DeviceConnection) -> Result<RecordId, IotError> {
        assert!(conn.is_initial(), "connection is not in its initial state");

        if self.shutdown.is_requested() {
            return Err(IotError::NotFound);
        }

        let mut was_temporary = false;

        for (id, record) in self.records() {
            let binding = match record.driver() {
                Some(binding) if binding.instance.is_working_not_stopping() => binding,
                _ => continue,
            };

            match conn.connect_local(&binding.instance) {
                Ok(()) => return Ok(id),
                Err(err @ (IotError::NotReady | IotError::NoMemory)) => return Err(err),
                Err(IotError::TemporaryError | IotError::HardLimitReached) => was_temporary = true,
                Err(IotError::DeviceNotSupported) => {}
                Err(err) => panic!(
                    "driver of module {} returned unexpected error {} for local connection to {}",
                    binding.module_id,
                    err.name(),
                    record.describe()
                ),
            }
        }

        Err(if was_temporary {
            IotError::TemporaryError
        } else {
            IotError::NotFound
        })
    }
}
