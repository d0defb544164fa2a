//! Interfaces to the collaborators the arena does not own.
//!
//! The host simulation engine renders and physically registers entities; the
//! robot controller layer supplies position and intent.  Both are reached
//! only through these traits.

use swarm_core::{ActorId, BlockId, CacheId, EntityId, EntityRef, Tick, Vec2d};

/// Host-side registration of spatial entities (visual/physical
/// representation).  Called with the cache store locked; implementations must
/// not call back into the arena.
pub trait HostRegistry: Send + Sync {
    fn register(&self, entity: EntityRef);
    fn deregister(&self, entity: EntityRef);
}

/// A host with nothing to register.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoopHost;

impl HostRegistry for NoopHost {
    fn register(&self, _entity: EntityRef) {}
    fn deregister(&self, _entity: EntityRef) {}
}

/// The operation classes an actor can request.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OpKind {
    FreeBlockPickup,
    FreeBlockDrop,
    NestBlockDrop,
    CachedBlockPickup,
    CacheBlockDrop,
}

impl OpKind {
    pub const ALL: [OpKind; 5] = [
        OpKind::FreeBlockPickup,
        OpKind::FreeBlockDrop,
        OpKind::NestBlockDrop,
        OpKind::CachedBlockPickup,
        OpKind::CacheBlockDrop,
    ];

    /// Name of the penalty handler serving this class.
    pub fn name(self) -> &'static str {
        match self {
            OpKind::FreeBlockPickup => "free_block_pickup",
            OpKind::FreeBlockDrop => "free_block_drop",
            OpKind::NestBlockDrop => "nest_block_drop",
            OpKind::CachedBlockPickup => "cached_block_pickup",
            OpKind::CacheBlockDrop => "cache_block_drop",
        }
    }
}

/// The controller-side view of a robot.
///
/// Arena-side mutation always completes before any of the `on_*` callbacks
/// runs.
pub trait ForagingActor {
    fn id(&self) -> ActorId;

    /// Current real-space position.
    fn position(&self) -> Vec2d;

    /// The entity the actor believes it is on.  May be stale.
    fn acquired_entity(&self) -> Option<EntityId>;

    fn carried_block(&self) -> Option<BlockId>;

    /// Does the actor want to start `op` now?
    fn wants(&self, op: OpKind) -> bool;

    /// Does the actor want to give up a pending `op`?
    fn wants_abort(&self, _op: OpKind) -> bool {
        false
    }

    fn on_block_pickup(&mut self, block: BlockId, t: Tick);

    fn on_block_drop(&mut self, block: BlockId, t: Tick);

    /// The block the actor waited for is gone.
    fn on_block_vanished(&mut self, _block: BlockId) {}

    /// The cache the actor waited at is gone.
    fn on_cache_vanished(&mut self, _cache: CacheId) {}

    /// The drop location turned out to be occupied; the actor keeps the block.
    fn on_drop_conflict(&mut self, _block: BlockId) {}
}
