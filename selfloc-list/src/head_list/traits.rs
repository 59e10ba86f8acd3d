// Copyright 2022 Colin Finck <colin@reactos.org>
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::private::Sealed;
use crate::traits::SlListType;

/// Designates a list as a head-only doubly linked list.
///
/// You usually want to use `#[derive(SlHeadList)]` to implement [`SlTypedList`] with type set to `SlHeadList`.
///
/// [`SlTypedList`]: crate::traits::SlTypedList
pub enum SlHeadList {}

impl SlListType for SlHeadList {}
impl Sealed for SlHeadList {}

/// Designates an empty enum as a head-only doubly linked list.
///
/// Technically, this macro implements [`SlTypedList`] with type set to [`enum@SlHeadList`].
///
/// [`SlTypedList`]: crate::traits::SlTypedList
pub use selfloc_list_macros::SlHeadList;
