// Copyright 2022 Colin Finck <colin@reactos.org>
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Process-wide "we are going down" flag.
///
/// Clones share the flag and may be moved to any thread.
/// Once requested, no new driver bindings or local connections are attempted.
#[derive(Clone, Debug, Default)]
pub struct ShutdownFlag(Arc<AtomicBool>);

impl ShutdownFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    pub fn request(&self) {
        self.0.store(true, Ordering::Release);
    }
}
