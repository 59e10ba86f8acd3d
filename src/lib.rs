// Copyright 2022 Colin Finck <colin@reactos.org>
// SPDX-License-Identifier: MIT OR Apache-2.0
//
//! Registry of the hardware devices attached to the local host and the engine binding driver
//! modules to them.
//!
//! Device detectors report devices through [`HwDevRegistry::apply_action`].
//! Every present device is kept as a [`HwDevRecord`] and offered to the loaded
//! [`DriverModule`]s until one of them creates a driver for it.
//! Modules failing for a device are kept away from it for a while (or forever) through its
//! [`BlockTable`].
//! Local peers find a running driver through [`HwDevRegistry::connect_local`].
//!
//! A device removed while a driver still holds it stays around in the removed list until the
//! driver gives it back via its [`ReleaseHandle`].

mod block;
mod clock;
mod config;
mod connect;
mod driver;
mod error;
mod ident;
mod record;
mod registry;
mod search;
mod shutdown;
#[cfg(test)]
mod test_support;

pub use block::*;
pub use clock::*;
pub use config::*;
pub use driver::*;
pub use error::*;
pub use ident::*;
pub use record::*;
pub use registry::*;
pub use search::*;
pub use shutdown::*;
