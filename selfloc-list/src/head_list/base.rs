// Copyright 2022 Colin Finck <colin@reactos.org>
// SPDX-License-Identifier: MIT OR Apache-2.0

use core::fmt;
use core::iter::FusedIterator;
use core::marker::PhantomData;

use super::traits::SlHeadList;
use crate::arena::SlArena;
use crate::link::{ElementId, ListId};
use crate::traits::{SlListElement, SlTypedList};

/// Handle of a head-only doubly linked list living in an [`SlArena`].
///
/// See the [module-level documentation](crate::head_list) for more details.
pub struct SlHeadListHead<E, L> {
    list: ListId,
    marker: PhantomData<(fn() -> E, fn() -> L)>,
}

impl<E, L> SlHeadListHead<E, L>
where
    E: SlListElement<L>,
    L: SlTypedList<T = SlHeadList>,
{
    /// Creates a new empty list inside `arena`.
    pub fn new(arena: &mut SlArena<E>) -> Self {
        Self {
            list: arena.new_list(),
            marker: PhantomData,
        }
    }

    /// Unlinks all elements from the list.
    /// The elements stay in the arena.
    ///
    /// This operation computes in *O*(*n*) time.
    pub fn clear(&self, arena: &mut SlArena<E>) {
        while self.pop_front(arena).is_some() {}
    }

    /// Provides a reference to the first element, or `None` if the list is empty.
    ///
    /// This operation computes in *O*(*1*) time.
    pub fn front<'a>(&self, arena: &'a SlArena<E>) -> Option<&'a E> {
        self.front_id(arena).map(|id| arena.element(id))
    }

    /// Returns the handle of the first element, or `None` if the list is empty.
    ///
    /// This operation computes in *O*(*1*) time.
    pub fn front_id(&self, arena: &SlArena<E>) -> Option<ElementId> {
        arena.ends(self.list).head
    }

    /// Provides a mutable reference to the first element, or `None` if the list is empty.
    ///
    /// This operation computes in *O*(*1*) time.
    pub fn front_mut<'a>(&self, arena: &'a mut SlArena<E>) -> Option<&'a mut E> {
        self.front_id(arena).map(move |id| arena.element_mut(id))
    }

    /// Returns the identifier of the head storage of this list.
    pub fn id(&self) -> ListId {
        self.list
    }

    /// Returns `true` if the list is empty.
    ///
    /// This operation computes in *O*(*1*) time.
    pub fn is_empty(&self, arena: &SlArena<E>) -> bool {
        arena.ends(self.list).head.is_none()
    }

    /// Returns an iterator yielding handles and references to each element of the list.
    pub fn iter<'a>(&self, arena: &'a SlArena<E>) -> Iter<'a, E, L> {
        Iter {
            arena,
            current: self.front_id(arena),
            marker: PhantomData,
        }
    }

    /// Counts all elements and returns the length of the list.
    ///
    /// This operation computes in *O*(*n*) time.
    pub fn len(&self, arena: &SlArena<E>) -> usize {
        self.iter(arena).count()
    }

    /// Unlinks the first element from the list and returns its handle, or `None` if the list is
    /// empty.
    ///
    /// This operation computes in *O*(*1*) time.
    pub fn pop_front(&self, arena: &mut SlArena<E>) -> Option<ElementId> {
        let id = self.front_id(arena)?;
        arena.unlink::<L>(id);
        Some(id)
    }

    /// Prepends a disconnected element to the front of the list.
    ///
    /// This operation computes in *O*(*1*) time.
    pub fn push_front(&self, arena: &mut SlArena<E>, id: ElementId) {
        arena.link_front::<L>(self.list, id, false);
    }

    /// Retains only the elements specified by the predicate, passing a mutable reference to it.
    ///
    /// In other words, unlink all elements `e` for which `f(&mut e)` returns `false`.
    /// This method operates in place, visiting each element exactly once in the original order,
    /// and preserves the order of the retained elements.
    ///
    /// This operation computes in *O*(*n*) time.
    pub fn retain<F>(&self, arena: &mut SlArena<E>, mut f: F)
    where
        F: FnMut(&mut E) -> bool,
    {
        let mut current = self.front_id(arena);

        while let Some(id) = current {
            current = arena.next::<L>(id);

            if !f(arena.element_mut(id)) {
                arena.unlink::<L>(id);
            }
        }
    }
}

impl<E, L> fmt::Debug for SlHeadListHead<E, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SlHeadListHead").field(&self.list).finish()
    }
}

/// Iterator over the elements of a head-only doubly linked list.
///
/// This iterator is returned from the [`SlHeadListHead::iter`] function.
pub struct Iter<'a, E, L> {
    arena: &'a SlArena<E>,
    current: Option<ElementId>,
    marker: PhantomData<fn() -> L>,
}

impl<'a, E, L> Iterator for Iter<'a, E, L>
where
    E: SlListElement<L>,
    L: SlTypedList<T = SlHeadList>,
{
    type Item = (ElementId, &'a E);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = self.arena.next::<L>(id);
        Some((id, self.arena.element(id)))
    }
}

impl<'a, E, L> FusedIterator for Iter<'a, E, L>
where
    E: SlListElement<L>,
    L: SlTypedList<T = SlHeadList>,
{
}
