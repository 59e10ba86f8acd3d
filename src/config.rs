// Copyright 2022 Colin Finck <colin@reactos.org>
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::time::Duration;

use crate::ident::HostId;

/// Number of driver modules a single record can block at once before the whole record is
/// excluded from driver search.
pub const MAX_BLOCKED_MODULES: usize = 8;

/// Default time a driver module is kept away from a record after a temporary failure.
pub const DEFAULT_RETRY_COOLDOWN: Duration = Duration::from_secs(2 * 60);

/// Tunables of a [`HwDevRegistry`](crate::HwDevRegistry).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegistryConfig {
    /// Host stamped on every newly tracked device.
    pub host_id: HostId,
    /// How long a driver module is skipped for a record after `TEMPORARY_ERROR` or `NOT_READY`.
    pub retry_cooldown: Duration,
}

impl RegistryConfig {
    pub fn new(host_id: HostId) -> Self {
        Self {
            host_id,
            ..Self::default()
        }
    }

    pub fn with_retry_cooldown(mut self, retry_cooldown: Duration) -> Self {
        self.retry_cooldown = retry_cooldown;
        self
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            host_id: HostId::default(),
            retry_cooldown: DEFAULT_RETRY_COOLDOWN,
        }
    }
}
