// Copyright 2022 Colin Finck <colin@reactos.org>
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::link::Link;
use crate::private::Sealed;

/// Implemented by the list flavors of this crate ([`SlList`] and [`SlHeadList`]).
///
/// [`SlList`]: crate::list::SlList
/// [`SlHeadList`]: crate::head_list::SlHeadList
pub trait SlListType: Sealed {}

/// Designates an empty enum as a list of a specific flavor (tailed or head-only).
/// You are supposed to define an empty enum and implement this trait for every link field
/// of every list element type in your program.
///
/// This is required, because a single element may be part of multiple lists, and henceforth
/// its element structure then contains multiple [`Link`] fields.
/// To make all list functions insert and remove elements via the correct link field,
/// lists need to be uniquely identified, and this is what the empty enum types are for.
///
/// The easiest way to implement this trait is to use `derive` with the appropriate list flavor
/// ([`SlList`] or [`SlHeadList`]):
///
/// ```ignore
/// #[derive(SlList)]
/// enum MyList {}
/// ```
///
/// Note that several lists of the same type may exist at once (e.g. two [`SlListHead`]s in the
/// same arena). An element can then be part of at most one of them at a time, and moving it
/// between them is just an unlink followed by an insert.
///
/// [`SlList`]: crate::list::SlList
/// [`SlHeadList`]: crate::head_list::SlHeadList
/// [`SlListHead`]: crate::list::SlListHead
pub trait SlTypedList {
    type T: SlListType;
}

/// Designates a structure as a list element with a [`Link`] field of a particular list
/// (identified via the enum that implements [`SlTypedList`]).
///
/// You can implement this trait multiple times for a structure if it is part of multiple
/// lists (and therefore contains multiple link fields).
///
/// The easiest way to implement this trait for all link fields of a structure is to use
/// `derive` on the structure:
///
/// ```ignore
/// #[derive(SlListElement)]
/// struct MyElement {
///     entry: Link<Self, MyList>,
///     value: i32,
/// }
/// ```
pub trait SlListElement<L: SlTypedList>: Sized {
    /// Returns the link field for list type `L`.
    fn link(&self) -> &Link<Self, L>;

    /// Returns the link field for list type `L` mutably.
    fn link_mut(&mut self) -> &mut Link<Self, L>;
}
pub use selfloc_list_macros::SlListElement;
