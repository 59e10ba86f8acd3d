// Copyright 2022 Colin Finck <colin@reactos.org>
// SPDX-License-Identifier: MIT OR Apache-2.0

use alloc::collections::TryReserveError;
use alloc::vec::Vec;
use core::iter::FusedIterator;

use crate::link::{ElementId, Link, ListId, Neighbor};
use crate::traits::{SlListElement, SlTypedList};

/// Head and tail slots of a single list.
///
/// Head-only lists never fill `tail`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Ends {
    pub(crate) head: Option<ElementId>,
    pub(crate) tail: Option<ElementId>,
}

enum Slot<E> {
    Occupied { generation: u32, element: E },
    Vacant { generation: u32, next_free: Option<u32> },
}

/// Owner of all list elements and of the head/tail storage of all lists built over them.
///
/// Keeping the list ends inside the arena is what allows any element to be unlinked from its
/// list in *O*(*1*) time with nothing but its [`ElementId`]: a boundary element references
/// the list storage through [`Neighbor::Boundary`] and can patch it directly.
///
/// Elements are inserted disconnected and stay in the arena until [`take`](Self::take)n,
/// regardless of their list membership.
pub struct SlArena<E> {
    slots: Vec<Slot<E>>,
    free_head: Option<u32>,
    ends: Vec<Ends>,
    len: usize,
}

impl<E> SlArena<E> {
    /// Creates an empty arena.
    pub const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_head: None,
            ends: Vec::new(),
            len: 0,
        }
    }

    /// Returns `true` if `id` refers to a live element.
    pub fn contains(&self, id: ElementId) -> bool {
        self.get(id).is_some()
    }

    /// Provides a reference to the element behind `id`, or `None` if it has been taken.
    pub fn get(&self, id: ElementId) -> Option<&E> {
        match self.slots.get(id.index as usize)? {
            Slot::Occupied {
                generation,
                element,
            } if *generation == id.generation => Some(element),
            _ => None,
        }
    }

    /// Provides a mutable reference to the element behind `id`, or `None` if it has been taken.
    pub fn get_mut(&mut self, id: ElementId) -> Option<&mut E> {
        match self.slots.get_mut(id.index as usize)? {
            Slot::Occupied {
                generation,
                element,
            } if *generation == id.generation => Some(element),
            _ => None,
        }
    }

    /// Stores a new, disconnected element and returns its handle.
    ///
    /// # Panics
    ///
    /// Panics if the slot storage cannot grow. Use [`try_insert`](Self::try_insert) to handle
    /// that case.
    pub fn insert(&mut self, element: E) -> ElementId {
        match self.try_insert(element) {
            Ok(id) => id,
            Err(e) => panic!("cannot grow element arena: {}", e),
        }
    }

    /// Returns `true` if the arena holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns an iterator over all live elements in slot order, regardless of list membership.
    pub fn iter(&self) -> Iter<'_, E> {
        Iter {
            slots: self.slots.iter().enumerate(),
            remaining: self.len,
        }
    }

    /// Returns the number of live elements.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Removes the element behind `id` from the arena and returns it.
    ///
    /// The element must have been unlinked from every list beforehand. Taking a linked element
    /// leaves its neighbors referencing a dead handle.
    ///
    /// Returns `None` if `id` is stale.
    pub fn take(&mut self, id: ElementId) -> Option<E> {
        self.get(id)?;

        let vacant = Slot::Vacant {
            generation: id.generation.wrapping_add(1),
            next_free: self.free_head,
        };
        let old = core::mem::replace(&mut self.slots[id.index as usize], vacant);
        self.free_head = Some(id.index);
        self.len -= 1;

        match old {
            Slot::Occupied { element, .. } => Some(element),
            Slot::Vacant { .. } => None,
        }
    }

    /// Stores a new, disconnected element and returns its handle, or reports an allocation
    /// failure without touching the arena.
    ///
    /// A vacant slot is reused before the storage grows.
    pub fn try_insert(&mut self, element: E) -> Result<ElementId, TryReserveError> {
        if let Some(index) = self.free_head {
            let slot = &mut self.slots[index as usize];
            let (generation, next_free) = match slot {
                Slot::Vacant {
                    generation,
                    next_free,
                } => (*generation, *next_free),
                Slot::Occupied { .. } => unreachable!("free list points to an occupied slot"),
            };

            *slot = Slot::Occupied {
                generation,
                element,
            };
            self.free_head = next_free;
            self.len += 1;

            return Ok(ElementId { index, generation });
        }

        self.slots.try_reserve(1)?;
        let index = self.slots.len() as u32;
        self.slots.push(Slot::Occupied {
            generation: 0,
            element,
        });
        self.len += 1;

        Ok(ElementId {
            index,
            generation: 0,
        })
    }

    pub(crate) fn element(&self, id: ElementId) -> &E {
        match self.get(id) {
            Some(element) => element,
            None => panic!("stale element id {}", id),
        }
    }

    pub(crate) fn element_mut(&mut self, id: ElementId) -> &mut E {
        match self.get_mut(id) {
            Some(element) => element,
            None => panic!("stale element id {}", id),
        }
    }

    pub(crate) fn ends(&self, list: ListId) -> Ends {
        self.ends[list.0 as usize]
    }

    pub(crate) fn ends_mut(&mut self, list: ListId) -> &mut Ends {
        &mut self.ends[list.0 as usize]
    }

    pub(crate) fn new_list(&mut self) -> ListId {
        let id = ListId(self.ends.len() as u32);
        self.ends.push(Ends::default());
        id
    }
}

/// Link operations.
///
/// All of them panic if an [`ElementId`] passed in is stale.
impl<E> SlArena<E> {
    /// Inserts `id` right after `anchor`, which must be part of a list of type `L`.
    /// `id` must not be part of a list, but may still carry the stale slots left by
    /// [`unlink_no_clear`](Self::unlink_no_clear).
    ///
    /// If `anchor` is the tail of a tailed list, `id` becomes the new tail.
    ///
    /// This operation computes in *O*(*1*) time.
    pub fn insert_after<L>(&mut self, anchor: ElementId, id: ElementId)
    where
        E: SlListElement<L>,
        L: SlTypedList,
    {
        debug_assert!(self.is_linked::<L>(anchor), "anchor {} is not linked", anchor);

        let old_next = self.link::<L>(anchor).next;
        match old_next {
            Some(Neighbor::Sibling(next)) => self.link_mut::<L>(next).prev = Some(Neighbor::Sibling(id)),
            Some(Neighbor::Boundary(list)) => self.ends_mut(list).tail = Some(id),
            None => {}
        }

        let link = self.link_mut::<L>(id);
        link.next = old_next;
        link.prev = Some(Neighbor::Sibling(anchor));
        self.link_mut::<L>(anchor).next = Some(Neighbor::Sibling(id));
    }

    /// Returns `true` if the element is part of a list of type `L`.
    ///
    /// This operation computes in *O*(*1*) time.
    pub fn is_linked<L>(&self, id: ElementId) -> bool
    where
        E: SlListElement<L>,
        L: SlTypedList,
    {
        self.link::<L>(id).is_connected()
    }

    /// Returns the element following `id` in its list of type `L`, if any.
    pub fn next<L>(&self, id: ElementId) -> Option<ElementId>
    where
        E: SlListElement<L>,
        L: SlTypedList,
    {
        Neighbor::sibling(self.link::<L>(id).next)
    }

    /// Returns the element preceding `id` in its list of type `L`, if any.
    pub fn prev<L>(&self, id: ElementId) -> Option<ElementId>
    where
        E: SlListElement<L>,
        L: SlTypedList,
    {
        Neighbor::sibling(self.link::<L>(id).prev)
    }

    /// Removes the element from whatever list of type `L` it is part of and marks it
    /// disconnected. Does nothing if it is already disconnected.
    ///
    /// This operation computes in *O*(*1*) time.
    pub fn unlink<L>(&mut self, id: ElementId)
    where
        E: SlListElement<L>,
        L: SlTypedList,
    {
        self.unlink_no_clear::<L>(id);
        self.link_mut::<L>(id).clear();
    }

    /// Removes the element from whatever list of type `L` it is part of, but leaves its own
    /// link slots untouched.
    ///
    /// Use this only right before inserting the element into another list or taking it out of
    /// the arena, as the stale slots still make it look connected.
    ///
    /// This operation computes in *O*(*1*) time.
    pub fn unlink_no_clear<L>(&mut self, id: ElementId)
    where
        E: SlListElement<L>,
        L: SlTypedList,
    {
        let link = self.link::<L>(id);
        let (next, prev) = (link.next, link.prev);

        if next.is_none() && prev.is_none() {
            return;
        }

        match next {
            Some(Neighbor::Sibling(next_id)) => self.link_mut::<L>(next_id).prev = prev,
            Some(Neighbor::Boundary(list)) => {
                // Last element of a tailed list: the tail moves back to our predecessor.
                debug_assert_eq!(self.ends(list).tail, Some(id));
                self.ends_mut(list).tail = Neighbor::sibling(prev);
            }
            None => {}
        }

        match prev {
            Some(Neighbor::Sibling(prev_id)) => self.link_mut::<L>(prev_id).next = next,
            Some(Neighbor::Boundary(list)) => {
                // First element: the head moves on to our successor.
                debug_assert_eq!(self.ends(list).head, Some(id));
                self.ends_mut(list).head = Neighbor::sibling(next);
            }
            None => debug_assert!(false, "element {} has a next but no prev slot", id),
        }
    }

    pub(crate) fn link<L>(&self, id: ElementId) -> &Link<E, L>
    where
        E: SlListElement<L>,
        L: SlTypedList,
    {
        self.element(id).link()
    }

    pub(crate) fn link_mut<L>(&mut self, id: ElementId) -> &mut Link<E, L>
    where
        E: SlListElement<L>,
        L: SlTypedList,
    {
        self.element_mut(id).link_mut()
    }

    /// Links `id` as the new head of `list`.
    /// For a head-only list (`tailed == false`), the tail slot is never touched.
    pub(crate) fn link_front<L>(&mut self, list: ListId, id: ElementId, tailed: bool)
    where
        E: SlListElement<L>,
        L: SlTypedList,
    {
        let next = match self.ends(list).head {
            Some(old_head) => {
                self.link_mut::<L>(old_head).prev = Some(Neighbor::Sibling(id));
                Some(Neighbor::Sibling(old_head))
            }
            None if tailed => {
                self.ends_mut(list).tail = Some(id);
                Some(Neighbor::Boundary(list))
            }
            None => None,
        };

        let link = self.link_mut::<L>(id);
        link.next = next;
        link.prev = Some(Neighbor::Boundary(list));
        self.ends_mut(list).head = Some(id);
    }

    /// Links `id` as the new tail of the tailed `list`.
    pub(crate) fn link_back<L>(&mut self, list: ListId, id: ElementId)
    where
        E: SlListElement<L>,
        L: SlTypedList,
    {
        let prev = match self.ends(list).tail {
            Some(old_tail) => {
                self.link_mut::<L>(old_tail).next = Some(Neighbor::Sibling(id));
                Some(Neighbor::Sibling(old_tail))
            }
            None => {
                self.ends_mut(list).head = Some(id);
                Some(Neighbor::Boundary(list))
            }
        };

        let link = self.link_mut::<L>(id);
        link.next = Some(Neighbor::Boundary(list));
        link.prev = prev;
        self.ends_mut(list).tail = Some(id);
    }
}

impl<E> Default for SlArena<E> {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over all live elements of an [`SlArena`] in slot order.
///
/// This iterator is returned from the [`SlArena::iter`] function.
pub struct Iter<'a, E> {
    slots: core::iter::Enumerate<core::slice::Iter<'a, Slot<E>>>,
    remaining: usize,
}

impl<'a, E> Iterator for Iter<'a, E> {
    type Item = (ElementId, &'a E);

    fn next(&mut self) -> Option<Self::Item> {
        for (index, slot) in self.slots.by_ref() {
            if let Slot::Occupied {
                generation,
                element,
            } = slot
            {
                self.remaining -= 1;
                let id = ElementId {
                    index: index as u32,
                    generation: *generation,
                };
                return Some((id, element));
            }
        }

        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, E> ExactSizeIterator for Iter<'a, E> {}

impl<'a, E> FusedIterator for Iter<'a, E> {}
