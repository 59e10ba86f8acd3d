// Copyright 2022 Colin Finck <colin@reactos.org>
// SPDX-License-Identifier: MIT OR Apache-2.0
//
//! A doubly linked list with only a head slot.
//!
//! Declare the list type via:
//!
//! ```ignore
//! #[derive(SlHeadList)]
//! enum MyList {}
//! ```
//!
//! Elements embed a [`Link`] field exactly like for [`list`](crate::list).
//! The first element references the head slot through [`Neighbor::Boundary`] in its `prev` slot,
//! while the last element simply has an empty `next` slot.
//! This makes the list a bit cheaper than the tailed variant at the cost of only growing at the
//! front. Any element can still leave the list in *O*(*1*) time via [`SlArena::unlink`].
//!
//! [`Link`]: crate::Link
//! [`Neighbor::Boundary`]: crate::Neighbor::Boundary
//! [`SlArena::unlink`]: crate::SlArena::unlink

mod base;
mod traits;

pub use base::*;
pub use traits::*;
