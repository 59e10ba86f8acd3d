// Copyright 2022 Colin Finck <colin@reactos.org>
// SPDX-License-Identifier: MIT OR Apache-2.0

use core::fmt;
use core::iter::FusedIterator;
use core::marker::PhantomData;

use super::traits::SlList;
use crate::arena::SlArena;
use crate::link::{ElementId, ListId, Neighbor};
use crate::traits::{SlListElement, SlTypedList};

/// Handle of a tailed doubly linked list living in an [`SlArena`].
///
/// The head and tail slots themselves are stored in the arena, which is why every operation takes
/// the arena as parameter.
/// The handle is deliberately not `Clone`: a list has a single owner, even though any holder of an
/// [`ElementId`] may unlink that element through [`SlArena::unlink`].
///
/// See the [module-level documentation](crate::list) for more details.
pub struct SlListHead<E, L> {
    list: ListId,
    marker: PhantomData<(fn() -> E, fn() -> L)>,
}

impl<E, L> SlListHead<E, L>
where
    E: SlListElement<L>,
    L: SlTypedList<T = SlList>,
{
    /// Creates a new empty list inside `arena`.
    pub fn new(arena: &mut SlArena<E>) -> Self {
        Self {
            list: arena.new_list(),
            marker: PhantomData,
        }
    }

    /// Moves all elements from `other` to the end of the list.
    ///
    /// This reuses all the links from `other` and moves them into `self`.
    /// After this operation, `other` becomes empty.
    /// Appending a list to itself does nothing.
    ///
    /// This operation computes in *O*(*1*) time.
    pub fn append(&self, arena: &mut SlArena<E>, other: &Self) {
        if self.list == other.list {
            return;
        }

        let other_ends = arena.ends(other.list);
        let (other_head, other_tail) = match (other_ends.head, other_ends.tail) {
            (Some(head), Some(tail)) => (head, tail),
            _ => return,
        };

        // The first element of `other` is preceded by our last element, or by our head slot if
        // we are empty.
        // The last element of `other` now references our tail slot.
        match arena.ends(self.list).tail {
            Some(tail) => {
                arena.link_mut::<L>(tail).next = Some(Neighbor::Sibling(other_head));
                arena.link_mut::<L>(other_head).prev = Some(Neighbor::Sibling(tail));
            }
            None => {
                arena.ends_mut(self.list).head = Some(other_head);
                arena.link_mut::<L>(other_head).prev = Some(Neighbor::Boundary(self.list));
            }
        }
        arena.link_mut::<L>(other_tail).next = Some(Neighbor::Boundary(self.list));
        arena.ends_mut(self.list).tail = Some(other_tail);

        // Clear `other` without touching any of its former elements.
        let other_ends = arena.ends_mut(other.list);
        other_ends.head = None;
        other_ends.tail = None;
    }

    /// Provides a reference to the last element, or `None` if the list is empty.
    ///
    /// This operation computes in *O*(*1*) time.
    pub fn back<'a>(&self, arena: &'a SlArena<E>) -> Option<&'a E> {
        self.back_id(arena).map(|id| arena.element(id))
    }

    /// Returns the handle of the last element, or `None` if the list is empty.
    ///
    /// This operation computes in *O*(*1*) time.
    pub fn back_id(&self, arena: &SlArena<E>) -> Option<ElementId> {
        arena.ends(self.list).tail
    }

    /// Provides a mutable reference to the last element, or `None` if the list is empty.
    ///
    /// This operation computes in *O*(*1*) time.
    pub fn back_mut<'a>(&self, arena: &'a mut SlArena<E>) -> Option<&'a mut E> {
        self.back_id(arena).map(move |id| arena.element_mut(id))
    }

    /// Unlinks all elements from the list.
    /// The elements stay in the arena.
    ///
    /// This operation computes in *O*(*n*) time, because every element needs to be marked
    /// disconnected.
    pub fn clear(&self, arena: &mut SlArena<E>) {
        while self.pop_front(arena).is_some() {}
    }

    /// Returns `true` if `id` is part of this very list.
    ///
    /// This operation computes in *O*(*n*) time, because it walks to the tail slot referenced by
    /// the last element.
    pub fn contains(&self, arena: &SlArena<E>, id: ElementId) -> bool {
        let mut current = id;

        loop {
            match arena.link::<L>(current).next {
                Some(Neighbor::Sibling(next)) => current = next,
                Some(Neighbor::Boundary(list)) => return list == self.list,
                None => return false,
            }
        }
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

    /// Returns the identifier of the head/tail storage of this list.
    pub fn id(&self) -> ListId {
        self.list
    }

    /// Returns `true` if the list is empty.
    ///
    /// This operation computes in *O*(*1*) time.
    pub fn is_empty(&self, arena: &SlArena<E>) -> bool {
        let ends = arena.ends(self.list);
        debug_assert_eq!(ends.head.is_none(), ends.tail.is_none());
        ends.head.is_none()
    }

    /// Returns an iterator yielding handles and references to each element of the list.
    pub fn iter<'a>(&self, arena: &'a SlArena<E>) -> Iter<'a, E, L> {
        let ends = arena.ends(self.list);

        Iter {
            arena,
            front: ends.head,
            back: ends.tail,
            marker: PhantomData,
        }
    }

    /// Counts all elements and returns the length of the list.
    ///
    /// This operation computes in *O*(*n*) time.
    pub fn len(&self, arena: &SlArena<E>) -> usize {
        self.iter(arena).count()
    }

    /// Unlinks the last element from the list and returns its handle, or `None` if the list is
    /// empty.
    ///
    /// This operation computes in *O*(*1*) time.
    pub fn pop_back(&self, arena: &mut SlArena<E>) -> Option<ElementId> {
        let id = self.back_id(arena)?;
        arena.unlink::<L>(id);
        Some(id)
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

    /// Appends a disconnected element to the back of the list.
    ///
    /// This operation computes in *O*(*1*) time.
    pub fn push_back(&self, arena: &mut SlArena<E>, id: ElementId) {
        arena.link_back::<L>(self.list, id);
    }

    /// Prepends a disconnected element to the front of the list.
    ///
    /// This operation computes in *O*(*1*) time.
    pub fn push_front(&self, arena: &mut SlArena<E>, id: ElementId) {
        arena.link_front::<L>(self.list, id, true);
    }

    /// Retains only the elements specified by the predicate, passing a mutable reference to it.
    ///
    /// In other words, unlink all elements `e` for which `f(&mut e)` returns `false`.
    /// This method operates in place, visiting each element exactly once in the original order,
    /// and preserves the order of the retained elements.
    /// Unlinked elements stay in the arena.
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

impl<E, L> fmt::Debug for SlListHead<E, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SlListHead").field(&self.list).finish()
    }
}

/// Iterator over the elements of a tailed doubly linked list.
///
/// This iterator is returned from the [`SlListHead::iter`] function.
pub struct Iter<'a, E, L> {
    arena: &'a SlArena<E>,
    front: Option<ElementId>,
    back: Option<ElementId>,
    marker: PhantomData<fn() -> L>,
}

impl<'a, E, L> Iter<'a, E, L> {
    fn terminate(&mut self) {
        self.front = None;
        self.back = None;
    }
}

impl<'a, E, L> Iterator for Iter<'a, E, L>
where
    E: SlListElement<L>,
    L: SlTypedList<T = SlList>,
{
    type Item = (ElementId, &'a E);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.front?;

        if self.front == self.back {
            // We are crossing the other end of the iterator and must not iterate any further.
            self.terminate();
        } else {
            self.front = self.arena.next::<L>(id);
        }

        Some((id, self.arena.element(id)))
    }

    fn last(mut self) -> Option<Self::Item> {
        self.next_back()
    }
}

impl<'a, E, L> DoubleEndedIterator for Iter<'a, E, L>
where
    E: SlListElement<L>,
    L: SlTypedList<T = SlList>,
{
    fn next_back(&mut self) -> Option<Self::Item> {
        let id = self.back?;

        if self.back == self.front {
            // We are crossing the other end of the iterator and must not iterate any further.
            self.terminate();
        } else {
            self.back = self.arena.prev::<L>(id);
        }

        Some((id, self.arena.element(id)))
    }
}

impl<'a, E, L> FusedIterator for Iter<'a, E, L>
where
    E: SlListElement<L>,
    L: SlTypedList<T = SlList>,
{
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::Link;
    use alloc::vec::Vec;

    #[derive(SlList)]
    enum MyList {}

    #[derive(Default, SlListElement)]
    struct MyElement {
        value: i32,
        entry: Link<Self, MyList>,
    }

    impl MyElement {
        fn new(value: i32) -> Self {
            Self {
                value,
                ..Default::default()
            }
        }
    }

    fn filled(arena: &mut SlArena<MyElement>, values: core::ops::Range<i32>) -> SlListHead<MyElement, MyList> {
        let list = SlListHead::new(arena);

        for i in values {
            let id = arena.insert(MyElement::new(i));
            list.push_back(arena, id);
        }

        list
    }

    #[test]
    fn test_append() {
        // Append two lists of equal size.
        let mut arena = SlArena::new();
        let list1 = filled(&mut arena, 0..10);
        let list2 = filled(&mut arena, 0..10);

        list1.append(&mut arena, &list2);

        assert_eq!(list1.len(&arena), 20);
        assert_eq!(list2.len(&arena), 0);
        assert!(list2.is_empty(&arena));

        for (i, (_, element)) in (0..10).chain(0..10).zip(list1.iter(&arena)) {
            assert_eq!(i, element.value);
        }

        verify_all_links(&arena, &list1);

        // Append the final list to an empty list.
        let list3 = SlListHead::<MyElement, MyList>::new(&mut arena);
        list3.append(&mut arena, &list1);

        assert_eq!(list3.len(&arena), 20);
        assert_eq!(list1.len(&arena), 0);

        verify_all_links(&arena, &list3);
        verify_all_links(&arena, &list1);
    }

    #[test]
    fn test_append_to_itself() {
        let mut arena = SlArena::new();
        let list = filled(&mut arena, 0..2);

        list.append(&mut arena, &list);

        assert_eq!(list.len(&arena), 2);
        assert!(list.iter(&arena).map(|(_, e)| e.value).eq(0..2));
        assert!(list.iter(&arena).rev().map(|(_, e)| e.value).eq((0..2).rev()));
        verify_all_links(&arena, &list);
    }

    #[test]
    fn test_back_and_front() {
        let mut arena = SlArena::new();
        let list = filled(&mut arena, 0..4);

        assert_eq!(list.back(&arena).unwrap().value, 3);
        assert_eq!(list.back_mut(&mut arena).unwrap().value, 3);
        assert_eq!(list.front(&arena).unwrap().value, 0);
        assert_eq!(list.front_mut(&mut arena).unwrap().value, 0);
    }

    #[test]
    fn test_clear() {
        let mut arena = SlArena::new();
        let list = filled(&mut arena, 0..5);
        let ids = list.iter(&arena).map(|(id, _)| id).collect::<Vec<_>>();

        list.clear(&mut arena);

        assert!(list.is_empty(&arena));
        assert_eq!(arena.len(), 5);
        assert!(ids.iter().all(|id| !arena.is_linked::<MyList>(*id)));
    }

    #[test]
    fn test_contains() {
        let mut arena = SlArena::new();
        let list1 = filled(&mut arena, 0..3);
        let list2 = filled(&mut arena, 0..3);
        let first = list1.front_id(&arena).unwrap();
        let loose = arena.insert(MyElement::new(9));

        assert!(list1.contains(&arena, first));
        assert!(!list2.contains(&arena, first));
        assert!(!list1.contains(&arena, loose));
    }

    #[test]
    fn test_pop_back() {
        let mut arena = SlArena::new();
        let list = filled(&mut arena, 0..10);

        for i in (0..10).rev() {
            let id = list.pop_back(&mut arena).unwrap();
            assert_eq!(i, arena.get(id).unwrap().value);
            assert!(!arena.is_linked::<MyList>(id));
            verify_all_links(&arena, &list);
        }

        assert!(list.is_empty(&arena));
    }

    #[test]
    fn test_pop_front() {
        let mut arena = SlArena::new();
        let list = filled(&mut arena, 0..10);

        for i in 0..10 {
            let id = list.pop_front(&mut arena).unwrap();
            assert_eq!(i, arena.get(id).unwrap().value);
            verify_all_links(&arena, &list);
        }

        assert!(list.is_empty(&arena));
    }

    #[test]
    fn test_push_back() {
        let mut arena = SlArena::new();
        let list = filled(&mut arena, 0..10);

        assert_eq!(list.len(&arena), 10);

        for (i, (_, element)) in (0..10).zip(list.iter(&arena)) {
            assert_eq!(i, element.value);
        }

        verify_all_links(&arena, &list);
    }

    #[test]
    fn test_push_front() {
        let mut arena = SlArena::new();
        let list = SlListHead::<MyElement, MyList>::new(&mut arena);

        for i in 0..10 {
            let id = arena.insert(MyElement::new(i));
            list.push_front(&mut arena, id);
        }

        assert_eq!(list.len(&arena), 10);

        for (i, (_, element)) in (0..10).rev().zip(list.iter(&arena)) {
            assert_eq!(i, element.value);
        }

        verify_all_links(&arena, &list);
    }

    #[test]
    fn test_remove_anywhere() {
        let mut arena = SlArena::new();
        let list = filled(&mut arena, 0..8);
        let ids = list.iter(&arena).map(|(id, _)| id).collect::<Vec<_>>();

        // Middle, head, tail, then everything that is left.
        for &index in &[4usize, 0, 7, 1, 6, 2, 5, 3] {
            arena.unlink::<MyList>(ids[index]);
            assert!(!arena.is_linked::<MyList>(ids[index]));
            verify_all_links(&arena, &list);
        }

        assert!(list.is_empty(&arena));
        assert_eq!(list.front_id(&arena), None);
        assert_eq!(list.back_id(&arena), None);
    }

    #[test]
    fn test_remove_sole_element() {
        let mut arena = SlArena::new();
        let list = filled(&mut arena, 0..1);
        let id = list.front_id(&arena).unwrap();

        // A single element references the list on both sides.
        let link = &arena.get(id).unwrap().entry;
        assert_eq!(link.prev(), Some(Neighbor::Boundary(list.id())));
        assert_eq!(link.next(), Some(Neighbor::Boundary(list.id())));

        arena.unlink::<MyList>(id);

        assert!(list.is_empty(&arena));
        assert!(!arena.is_linked::<MyList>(id));
    }

    #[test]
    fn test_retain() {
        let mut arena = SlArena::new();
        let list = filled(&mut arena, 0..10);

        // Keep only the even elements.
        list.retain(&mut arena, |element| element.value % 2 == 0);

        assert_eq!(list.len(&arena), 5);
        assert_eq!(arena.len(), 10);

        for (i, (_, element)) in (0..10).step_by(2).zip(list.iter(&arena)) {
            assert_eq!(i, element.value);
        }

        verify_all_links(&arena, &list);

        // Keep only the first and last of the remaining elements.
        list.retain(&mut arena, |element| element.value == 0 || element.value == 8);

        let mut iter = list.iter(&arena);
        assert_eq!(iter.next().unwrap().1.value, 0);
        assert_eq!(iter.next().unwrap().1.value, 8);
        assert!(matches!(iter.next(), None));
    }

    #[test]
    fn test_reverse_iteration_meets_in_the_middle() {
        let mut arena = SlArena::new();
        let list = filled(&mut arena, 0..5);
        let mut iter = list.iter(&arena);

        assert_eq!(iter.next().unwrap().1.value, 0);
        assert_eq!(iter.next_back().unwrap().1.value, 4);
        assert_eq!(iter.next().unwrap().1.value, 1);
        assert_eq!(iter.next_back().unwrap().1.value, 3);
        assert_eq!(iter.next().unwrap().1.value, 2);
        assert!(iter.next_back().is_none());
        assert!(iter.next().is_none());
    }

    fn verify_all_links<E, L>(arena: &SlArena<E>, list: &SlListHead<E, L>)
    where
        E: SlListElement<L>,
        L: SlTypedList<T = SlList>,
    {
        let ends = arena.ends(list.id());
        let boundary = Some(Neighbor::Boundary(list.id()));

        // Traverse the list in forward direction and collect all entries.
        let mut current = ends.head;
        let mut forward_entries = Vec::<ElementId>::new();

        while let Some(id) = current {
            let link = arena.link::<L>(id);

            // Verify that the previous entry is referenced by this entry's `prev`, or the head
            // slot for the first entry.
            match forward_entries.last() {
                Some(&last) => assert_eq!(link.prev(), Some(Neighbor::Sibling(last))),
                None => assert_eq!(link.prev(), boundary),
            }

            forward_entries.push(id);
            current = Neighbor::sibling(link.next());

            if current.is_none() {
                assert_eq!(link.next(), boundary);
            }
        }

        assert_eq!(forward_entries.last().copied(), ends.tail);

        // Traverse the list in backward direction and collect all entries.
        let mut current = ends.tail;
        let mut backward_entries = Vec::<ElementId>::with_capacity(forward_entries.len());

        while let Some(id) = current {
            let link = arena.link::<L>(id);

            match backward_entries.last() {
                Some(&last) => assert_eq!(link.next(), Some(Neighbor::Sibling(last))),
                None => assert_eq!(link.next(), boundary),
            }

            backward_entries.push(id);
            current = Neighbor::sibling(link.prev());
        }

        // Verify that `backward_entries` is the exact reverse of `forward_entries`.
        assert_eq!(forward_entries.len(), backward_entries.len());

        for (fe, be) in forward_entries.iter().zip(backward_entries.iter().rev()) {
            assert_eq!(fe, be);
        }
    }
}
