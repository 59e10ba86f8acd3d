// Copyright 2022 Colin Finck <colin@reactos.org>
// SPDX-License-Identifier: MIT OR Apache-2.0

use core::fmt;
use core::marker::PhantomData;

/// Stable handle of an element inside an [`SlArena`].
///
/// A handle stays valid until its element is taken out of the arena.
/// Afterwards, the slot may be reused, but the old handle is rejected thanks to the generation
/// counter.
///
/// [`SlArena`]: crate::SlArena
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ElementId {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

impl ElementId {
    /// Returns the slot index of this element inside its arena.
    pub fn index(self) -> usize {
        self.index as usize
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}.{}", self.index, self.generation)
    }
}

/// Identifies the head/tail storage of a single list inside an [`SlArena`].
///
/// [`SlArena`]: crate::SlArena
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListId(pub(crate) u32);

/// Content of a non-empty [`Link`] slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Neighbor {
    /// Another element of the same list.
    Sibling(ElementId),
    /// The head slot (when found in `prev`) or the tail slot (when found in `next`) of a list.
    /// Only boundary elements carry this.
    Boundary(ListId),
}

impl Neighbor {
    pub(crate) fn sibling(this: Option<Self>) -> Option<ElementId> {
        match this {
            Some(Neighbor::Sibling(id)) => Some(id),
            _ => None,
        }
    }
}

/// The per-list link field embedded in every list element.
///
/// A link is disconnected iff both of its slots are empty.
pub struct Link<E, L> {
    pub(crate) next: Option<Neighbor>,
    pub(crate) prev: Option<Neighbor>,
    marker: PhantomData<(fn() -> E, fn() -> L)>,
}

impl<E, L> Link<E, L> {
    /// Creates a disconnected link.
    ///
    /// Its slots are only filled when the element is inserted into a list.
    pub const fn new() -> Self {
        Self {
            next: None,
            prev: None,
            marker: PhantomData,
        }
    }

    /// Returns `true` if this link is part of a list.
    pub fn is_connected(&self) -> bool {
        self.next.is_some() || self.prev.is_some()
    }

    /// Returns the raw `next` slot.
    pub fn next(&self) -> Option<Neighbor> {
        self.next
    }

    /// Returns the raw `prev` slot.
    pub fn prev(&self) -> Option<Neighbor> {
        self.prev
    }

    pub(crate) fn clear(&mut self) {
        self.next = None;
        self.prev = None;
    }
}

impl<E, L> Default for Link<E, L> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E, L> fmt::Debug for Link<E, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Link")
            .field("next", &self.next)
            .field("prev", &self.prev)
            .finish()
    }
}
