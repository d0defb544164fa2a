//! Nests: static drop-off regions, created once at initialisation.

use swarm_core::{EntityId, EntityRef, NestId, Vec2d};

use crate::entity::{Footprint, SpatialEntity};

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Nest {
    id: NestId,
    rdims: Vec2d,
    footprint: Footprint,
}

impl Nest {
    pub fn new(id: NestId, center: Vec2d, rdims: Vec2d, resolution: f64) -> Self {
        Self {
            id,
            rdims,
            footprint: Footprint::centered(center, rdims, resolution),
        }
    }

    #[inline]
    pub fn id(&self) -> NestId {
        self.id
    }

    #[inline]
    pub fn extent(&self) -> &Footprint {
        &self.footprint
    }
}

impl SpatialEntity for Nest {
    #[inline]
    fn entity_ref(&self) -> EntityRef {
        EntityRef::Nest(self.id)
    }

    #[inline]
    fn entity_id(&self) -> EntityId {
        EntityId::Nest(self.id)
    }

    #[inline]
    fn footprint(&self) -> Option<&Footprint> {
        Some(&self.footprint)
    }

    #[inline]
    fn rdims(&self) -> Vec2d {
        self.rdims
    }
}
