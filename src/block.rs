// Copyright 2022 Colin Finck <colin@reactos.org>
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::clock::Timestamp;
use crate::config::MAX_BLOCKED_MODULES;
use crate::ident::ModuleId;

/// Expiry of a module block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlockUntil {
    At(Timestamp),
    Forever,
}

impl BlockUntil {
    fn is_live(self, now: Timestamp) -> bool {
        match self {
            BlockUntil::At(until) => until > now,
            BlockUntil::Forever => true,
        }
    }
}

/// A single occupied slot of a [`BlockTable`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ModuleBlock {
    pub module_id: ModuleId,
    pub until: BlockUntil,
}

/// Fixed-capacity table of driver modules that must not be tried for a record (for now).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BlockTable {
    slots: [Option<ModuleBlock>; MAX_BLOCKED_MODULES],
}

impl BlockTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or refreshes a block for `module_id`.
    ///
    /// An existing slot of the same module is reused first, then a free slot, then a slot whose
    /// block has expired at `now`.
    /// Returns `false` without touching the table if every slot holds a live block of another
    /// module.
    pub fn block_module(&mut self, module_id: ModuleId, until: BlockUntil, now: Timestamp) -> bool {
        debug_assert_ne!(module_id, ModuleId::ANY);

        let index = self
            .position(module_id)
            .or_else(|| self.slots.iter().position(Option::is_none))
            .or_else(|| {
                self.slots
                    .iter()
                    .position(|slot| matches!(slot, Some(block) if !block.until.is_live(now)))
            });

        match index {
            Some(index) => {
                self.slots[index] = Some(ModuleBlock { module_id, until });
                true
            }
            None => false,
        }
    }

    /// Removes the block of `module_id`, or every block for [`ModuleId::ANY`].
    pub fn clear_block(&mut self, module_id: ModuleId) {
        if module_id == ModuleId::ANY {
            self.slots = Default::default();
        } else if let Some(index) = self.position(module_id) {
            self.slots[index] = None;
        }
    }

    /// Returns `true` if `module_id` is blocked at `now`.
    /// An expired block found on the way is dropped.
    pub fn is_module_blocked(&mut self, module_id: ModuleId, now: Timestamp) -> bool {
        let index = match self.position(module_id) {
            Some(index) => index,
            None => return false,
        };

        match self.slots[index] {
            Some(block) if block.until.is_live(now) => true,
            _ => {
                self.slots[index] = None;
                false
            }
        }
    }

    /// Returns `true` if no slot is occupied.
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Iterates over the occupied slots, including expired ones that were not evicted yet.
    pub fn iter(&self) -> impl Iterator<Item = &ModuleBlock> + '_ {
        self.slots.iter().flatten()
    }

    /// Returns `true` if some block has an expiry time.
    pub(crate) fn has_timed_block(&self) -> bool {
        self.iter().any(|block| matches!(block.until, BlockUntil::At(_)))
    }

    fn position(&self, module_id: ModuleId) -> Option<usize> {
        self.slots
            .iter()
            .position(|slot| matches!(slot, Some(block) if block.module_id == module_id))
    }
}
