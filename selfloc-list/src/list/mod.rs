// Copyright 2022 Colin Finck <colin@reactos.org>
// SPDX-License-Identifier: MIT OR Apache-2.0
//
//! A doubly linked list with both a head and a tail slot.
//!
//! To make this list type-safe, `selfloc-list` first asks you to declare an empty enum, which then
//! serves as the `L` type parameter to distinguish different lists.
//! A list element can be part of multiple lists by having multiple link fields in the element
//! structure.
//!
//! The empty enum is designated as a tailed list via:
//!
//! ```ignore
//! #[derive(SlList)]
//! enum MyList {}
//! ```
//!
//! Next you define your element structure, adding a [`Link`] field for each list type you want
//! your element to be part of:
//!
//! ```ignore
//! #[derive(Default, SlListElement)]
//! struct MyElement {
//!     entry: Link<Self, MyList>,
//!     value: i32,
//! }
//! ```
//!
//! Elements are stored in an [`SlArena`] and lists are created inside that arena:
//!
//! ```ignore
//! let mut arena = SlArena::new();
//! let list = SlListHead::<MyElement, MyList>::new(&mut arena);
//!
//! let id = arena.insert(MyElement { value: 42, ..Default::default() });
//! list.push_back(&mut arena, id);
//!
//! // Any holder of `id` can take the element out of the list again.
//! arena.unlink::<MyList>(id);
//! assert!(list.is_empty(&arena));
//! ```
//!
//! Both boundary elements keep a [`Neighbor::Boundary`] reference to the list: the first one in
//! its `prev` slot, the last one in its `next` slot.
//! Hence, a connected element of a tailed list always has both slots filled.
//!
//! [`Link`]: crate::Link
//! [`Neighbor::Boundary`]: crate::Neighbor::Boundary
//! [`SlArena`]: crate::SlArena

mod base;
mod traits;

pub use base::*;
pub use traits::*;
