//! Strongly typed identifiers and entity handles.
//!
//! Dense IDs (`BlockId`, `CacheId`, …) are `Copy + Ord + Hash` wrappers
//! around a `u32`.  The inner integer is `pub` so stores can index `Vec`s via
//! `id.index()`.
//!
//! Cells never hold pointers to entities.  They hold an [`EntityRef`]: block
//! and nest references are plain dense indices (blocks and nests live for the
//! whole run), while cache references carry a generational [`CacheKey`] so a
//! cell can never resolve to a cache that has since been removed.

use std::fmt;

/// Generate a typed ID wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub $inner);

        impl $name {
            /// Sentinel meaning "no valid ID", equal to `u32::MAX`.
            pub const INVALID: $name = $name(<$inner>::MAX);

            /// Cast to `usize` for direct use as a `Vec` index.
            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl Default for $name {
            /// Returns the `INVALID` sentinel so uninitialized IDs are visibly invalid.
            #[inline(always)]
            fn default() -> Self {
                Self::INVALID
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl From<$name> for usize {
            #[inline(always)]
            fn from(id: $name) -> usize {
                id.0 as usize
            }
        }

        impl TryFrom<usize> for $name {
            type Error = std::num::TryFromIntError;
            fn try_from(n: usize) -> Result<$name, Self::Error> {
                <$inner>::try_from(n).map($name)
            }
        }
    };
}

typed_id! {
    /// Index of a block in the arena's owning block store.  Fixed at
    /// construction from the block manifest.
    pub struct BlockId(u32);
}

typed_id! {
    /// Dense cache identifier.  Recycled only after the cache has left the
    /// zombie collection.
    pub struct CacheId(u32);
}

typed_id! {
    /// Index of a nest.  Nests are created once at initialisation.
    pub struct NestId(u32);
}

typed_id! {
    /// Identifier of an actor (robot) interacting with the arena.
    pub struct ActorId(u32);
}

typed_id! {
    /// Identifier of a block cluster managed by a cluster distributor.
    pub struct ClusterId(u32);
}

slotmap::new_key_type! {
    /// Generational handle to an active cache.  Goes stale the moment the
    /// cache is removed, even if its slot is later reused.
    pub struct CacheKey;
}

// ── EntityRef ─────────────────────────────────────────────────────────────────

/// Non-owning reference from a grid cell to the entity occupying it.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EntityRef {
    Block(BlockId),
    Cache(CacheKey),
    Nest(NestId),
}

impl EntityRef {
    #[inline]
    pub fn block(self) -> Option<BlockId> {
        match self {
            EntityRef::Block(id) => Some(id),
            _ => None,
        }
    }

    #[inline]
    pub fn cache(self) -> Option<CacheKey> {
        match self {
            EntityRef::Cache(key) => Some(key),
            _ => None,
        }
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityRef::Block(id) => write!(f, "{id}"),
            EntityRef::Cache(key) => write!(f, "CacheKey({key:?})"),
            EntityRef::Nest(id) => write!(f, "{id}"),
        }
    }
}

// ── EntityId ──────────────────────────────────────────────────────────────────

/// Public identity of an entity, as seen by actors and penalty records.
///
/// Unlike [`EntityRef`] this is stable across cache removal: a penalty issued
/// for `Cache(CacheId(3))` still names cache 3 after it becomes a zombie.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EntityId {
    Block(BlockId),
    Cache(CacheId),
    Nest(NestId),
}

impl EntityId {
    #[inline]
    pub fn block(self) -> Option<BlockId> {
        match self {
            EntityId::Block(id) => Some(id),
            _ => None,
        }
    }

    #[inline]
    pub fn cache(self) -> Option<CacheId> {
        match self {
            EntityId::Cache(id) => Some(id),
            _ => None,
        }
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityId::Block(id) => write!(f, "{id}"),
            EntityId::Cache(id) => write!(f, "{id}"),
            EntityId::Nest(id) => write!(f, "{id}"),
        }
    }
}
