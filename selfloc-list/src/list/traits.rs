// Copyright 2022 Colin Finck <colin@reactos.org>
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::private::Sealed;
use crate::traits::SlListType;

/// Designates a list as a tailed doubly linked list.
///
/// You usually want to use `#[derive(SlList)]` to implement [`SlTypedList`] with type set to `SlList`.
///
/// [`SlTypedList`]: crate::traits::SlTypedList
pub enum SlList {}

impl SlListType for SlList {}
impl Sealed for SlList {}

/// Designates an empty enum as a tailed doubly linked list.
///
/// Technically, this macro implements [`SlTypedList`] with type set to [`enum@SlList`].
///
/// [`SlTypedList`]: crate::traits::SlTypedList
pub use selfloc_list_macros::SlList;
