//! Lock tokens.
//!
//! A [`LockSet`] carries the write guards its holder already owns.  Lock-aware
//! entry points take it by value, acquire only what is missing, and hand it
//! back with exactly the guards it came in with:
//!
//! ```text
//!   let locks = map.lock_blocks();                 // caller holds blocks
//!   let (locks, out) = map.apply(op, locks);       // apply adds grid, drops it again
//!   drop(locks);                                   // caller releases blocks
//! ```
//!
//! Acquisition order is fixed: caches → blocks → grid.  The dispatcher and
//! RNG mutexes come after the grid.  Asking for a lock earlier in the order
//! than one already held is an invariant violation rather than a potential
//! deadlock.

use std::ops::BitOr;
use std::sync::RwLockWriteGuard;

use swarm_core::invariant;
use swarm_core::sync::write;
use swarm_grid::ArenaGrid;

use crate::caching::CacheStore;
use crate::map::ArenaMap;
use crate::store::BlockStore;

/// Which of the three arena locks a `LockSet` holds (or should hold).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub struct Held {
    pub caches: bool,
    pub blocks: bool,
    pub grid: bool,
}

impl Held {
    pub const NONE: Held = Held { caches: false, blocks: false, grid: false };
    pub const CACHES: Held = Held { caches: true, blocks: false, grid: false };
    pub const BLOCKS: Held = Held { caches: false, blocks: true, grid: false };
    pub const GRID: Held = Held { caches: false, blocks: false, grid: true };
    pub const BLOCKS_GRID: Held = Held { caches: false, blocks: true, grid: true };
    pub const ALL: Held = Held { caches: true, blocks: true, grid: true };

    /// Locks in `self` that `other` lacks.
    #[inline]
    pub fn minus(self, other: Held) -> Held {
        Held {
            caches: self.caches && !other.caches,
            blocks: self.blocks && !other.blocks,
            grid: self.grid && !other.grid,
        }
    }
}

impl BitOr for Held {
    type Output = Held;
    fn bitor(self, rhs: Held) -> Held {
        Held {
            caches: self.caches || rhs.caches,
            blocks: self.blocks || rhs.blocks,
            grid: self.grid || rhs.grid,
        }
    }
}

/// Write guards over the arena's shared state.
#[derive(Default)]
pub struct LockSet<'a> {
    caches: Option<RwLockWriteGuard<'a, CacheStore>>,
    blocks: Option<RwLockWriteGuard<'a, BlockStore>>,
    grid: Option<RwLockWriteGuard<'a, ArenaGrid>>,
}

impl<'a> LockSet<'a> {
    /// A token holding nothing.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn held(&self) -> Held {
        Held {
            caches: self.caches.is_some(),
            blocks: self.blocks.is_some(),
            grid: self.grid.is_some(),
        }
    }

    /// Take the locks in `need` that are not yet held.  Returns the set
    /// actually acquired so the caller can [`release`](Self::release) exactly
    /// those.
    pub fn acquire(&mut self, map: &'a ArenaMap, need: Held) -> Held {
        let held = self.held();
        let missing = need.minus(held);
        invariant!(
            !(missing.caches && (held.blocks || held.grid)) && !(missing.blocks && held.grid),
            "lock order violated: holding {held:?}, asked for {missing:?}"
        );
        if missing.caches {
            self.caches = Some(write(&map.caches, "cache store"));
        }
        if missing.blocks {
            self.blocks = Some(write(&map.blocks, "block store"));
        }
        if missing.grid {
            self.grid = Some(write(&map.grid, "grid"));
        }
        missing
    }

    /// Drop the guards in `which`, in reverse acquisition order.
    pub fn release(&mut self, which: Held) {
        if which.grid {
            self.grid = None;
        }
        if which.blocks {
            self.blocks = None;
        }
        if which.caches {
            self.caches = None;
        }
    }

    // ── Access ────────────────────────────────────────────────────────────

    pub fn caches(&self) -> &CacheStore {
        let Some(c) = self.caches.as_deref() else {
            invariant_unheld("cache store")
        };
        c
    }

    pub fn caches_mut(&mut self) -> &mut CacheStore {
        let Some(c) = self.caches.as_deref_mut() else {
            invariant_unheld("cache store")
        };
        c
    }

    pub fn blocks(&self) -> &BlockStore {
        let Some(b) = self.blocks.as_deref() else {
            invariant_unheld("block store")
        };
        b
    }

    pub fn blocks_mut(&mut self) -> &mut BlockStore {
        let Some(b) = self.blocks.as_deref_mut() else {
            invariant_unheld("block store")
        };
        b
    }

    pub fn grid(&self) -> &ArenaGrid {
        let Some(g) = self.grid.as_deref() else {
            invariant_unheld("grid")
        };
        g
    }

    pub fn grid_mut(&mut self) -> &mut ArenaGrid {
        let Some(g) = self.grid.as_deref_mut() else {
            invariant_unheld("grid")
        };
        g
    }

    /// Blocks and grid at once.
    pub fn blocks_grid_mut(&mut self) -> (&mut BlockStore, &mut ArenaGrid) {
        match (self.blocks.as_deref_mut(), self.grid.as_deref_mut()) {
            (Some(b), Some(g)) => (b, g),
            _ => invariant_unheld("block store and grid"),
        }
    }

    /// All three stores at once.
    pub fn all_mut(&mut self) -> (&mut CacheStore, &mut BlockStore, &mut ArenaGrid) {
        match (
            self.caches.as_deref_mut(),
            self.blocks.as_deref_mut(),
            self.grid.as_deref_mut(),
        ) {
            (Some(c), Some(b), Some(g)) => (c, b, g),
            _ => invariant_unheld("cache store, block store and grid"),
        }
    }
}

#[cold]
fn invariant_unheld(what: &str) -> ! {
    swarm_core::invariant_failed!("{what} accessed without holding its lock")
}
