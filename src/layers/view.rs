//! Derived objects and the derived view.
//!
//! A [`DerivedView`] is the result of one layer computation: every object
//! in every zone with its characteristics after all applicable effects.
//! It is recomputed on every query and never stored in the game state.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::cards::{Characteristics, FilterContext, ObjectFilter};
use crate::core::entity::{ObjectId, ObjectRef, Timestamp};
use crate::core::player::PlayerId;
use crate::zones::{Zone, ZoneKey};

/// An object with its derived characteristics.
///
/// Also serves as last-known information: a zone-change event carries the
/// `DerivedObject` as it was just before the object left.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DerivedObject {
    pub id: ObjectId,
    pub zcc: u32,
    pub zone: ZoneKey,
    pub owner: PlayerId,
    pub controller: PlayerId,
    pub token: bool,
    pub timestamp: Timestamp,
    pub characteristics: Characteristics,
}

impl DerivedObject {
    /// A derived object owned and controlled by `controller`.
    #[must_use]
    pub fn new(id: ObjectId, controller: PlayerId, zone: ZoneKey, characteristics: Characteristics) -> Self {
        Self {
            id,
            zcc: 0,
            zone,
            owner: controller,
            controller,
            token: false,
            timestamp: Timestamp::default(),
            characteristics,
        }
    }

    #[must_use]
    pub fn object_ref(&self) -> ObjectRef {
        ObjectRef::new(self.id, self.zcc)
    }

    #[must_use]
    pub fn is_on_battlefield(&self) -> bool {
        self.zone.zone == Zone::Battlefield
    }

    #[must_use]
    pub fn power(&self) -> i32 {
        self.characteristics.power.unwrap_or(0)
    }

    #[must_use]
    pub fn toughness(&self) -> i32 {
        self.characteristics.toughness.unwrap_or(0)
    }
}

/// Derived characteristics of every object.
#[derive(Clone, Debug, Default)]
pub struct DerivedView {
    objects: FxHashMap<ObjectId, DerivedObject>,
    /// Battlefield objects in entry order.
    battlefield: Vec<ObjectId>,
}

impl DerivedView {
    pub(crate) fn from_parts(objects: FxHashMap<ObjectId, DerivedObject>, battlefield: Vec<ObjectId>) -> Self {
        Self { objects, battlefield }
    }

    #[must_use]
    pub fn get(&self, id: ObjectId) -> Option<&DerivedObject> {
        self.objects.get(&id)
    }

    /// The object if the reference is still current.
    #[must_use]
    pub fn get_ref(&self, r: ObjectRef) -> Option<&DerivedObject> {
        self.objects.get(&r.id).filter(|o| o.zcc == r.zcc)
    }

    pub(crate) fn get_mut(&mut self, id: ObjectId) -> Option<&mut DerivedObject> {
        self.objects.get_mut(&id)
    }

    /// Battlefield objects in entry order.
    pub fn battlefield(&self) -> impl Iterator<Item = &DerivedObject> + '_ {
        self.battlefield.iter().filter_map(move |id| self.objects.get(id))
    }

    /// Ids of battlefield objects in entry order.
    #[must_use]
    pub fn battlefield_ids(&self) -> &[ObjectId] {
        &self.battlefield
    }

    /// Every object, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &DerivedObject> + '_ {
        self.objects.values()
    }

    /// Battlefield objects matching a filter.
    pub fn matching<'a>(
        &'a self,
        filter: &'a ObjectFilter,
        ctx: &'a FilterContext,
    ) -> impl Iterator<Item = &'a DerivedObject> + 'a {
        self.battlefield().filter(move |o| filter.matches(o, ctx))
    }

    #[must_use]
    pub fn count_matching(&self, filter: &ObjectFilter, ctx: &FilterContext) -> usize {
        self.matching(filter, ctx).count()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}
