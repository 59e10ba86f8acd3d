// Copyright 2022 Colin Finck <colin@reactos.org>
// SPDX-License-Identifier: MIT OR Apache-2.0
//
//! Doubly linked lists whose elements carry enough information to leave their list in *O*(*1*)
//! time, without the caller naming the list they are part of.
//!
//! Elements are owned by an [`SlArena`] and addressed by generation-checked [`ElementId`]s.
//! Every element embeds one [`Link`] per list type it can be part of.
//! A link slot either references a sibling element or, at the boundary of a list, the head or
//! tail slot of the list itself ([`Neighbor::Boundary`]).
//! This tagged back-reference is what makes [`SlArena::unlink`] list-agnostic.
//!
//! Two list flavors exist:
//! * [`list::SlListHead`] keeps a head and a tail and can grow at both ends.
//! * [`head_list::SlHeadListHead`] only keeps a head. Its last element has an empty `next` slot.

#![no_std]

extern crate alloc;

// Required for deriving our traits when testing.
#[cfg(test)]
extern crate self as selfloc_list;

mod arena;
pub mod head_list;
mod link;
pub mod list;
mod private;
mod traits;

pub use arena::*;
pub use link::*;
pub use traits::*;
