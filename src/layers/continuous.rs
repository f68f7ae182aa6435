//! Stored continuous effects.
//!
//! Effects created by resolving spells and abilities ("target creature
//! gets +3/+3 until end of turn") live in the [`EffectStore`] until their
//! duration ends. Static abilities are not stored here; the layer system
//! reads them from the battlefield on every computation.
//!
//! A stored effect locks in the objects it affects when it is created.

use im::Vector;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::entity::{ObjectId, ObjectRef, Timestamp};
use crate::core::player::PlayerId;

use super::modification::Modification;

/// Identifier of a stored continuous effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EffectId(pub u32);

/// How long an effect lasts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Duration {
    /// Until the cleanup step of this turn.
    EndOfTurn,
    /// Until the end-of-combat step.
    EndOfCombat,
    /// As long as the referenced object stays on the battlefield.
    WhileOnBattlefield(ObjectRef),
    /// Until something removes it.
    Indefinite,
}

/// A continuous effect created by a resolved spell or ability.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContinuousEffect {
    pub id: EffectId,
    pub source: ObjectId,
    pub controller: PlayerId,
    pub timestamp: Timestamp,
    pub duration: Duration,
    pub affected: SmallVec<[ObjectRef; 4]>,
    pub modification: Modification,
}

impl ContinuousEffect {
    /// Build an effect; the store assigns its id.
    #[must_use]
    pub fn new(
        source: ObjectId,
        controller: PlayerId,
        timestamp: Timestamp,
        duration: Duration,
        affected: &[ObjectRef],
        modification: Modification,
    ) -> Self {
        Self {
            id: EffectId(0),
            source,
            controller,
            timestamp,
            duration,
            affected: SmallVec::from_slice(affected),
            modification,
        }
    }
}

/// All stored continuous effects of a game.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EffectStore {
    effects: Vector<ContinuousEffect>,
    next_id: u32,
}

impl EffectStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an effect, assigning it a fresh id.
    pub fn add(&mut self, mut effect: ContinuousEffect) -> EffectId {
        let id = EffectId(self.next_id);
        self.next_id += 1;
        effect.id = id;
        log::debug!(
            "continuous effect {:?} from {} ({:?}, {:?})",
            id,
            effect.source,
            effect.modification,
            effect.duration
        );
        self.effects.push_back(effect);
        id
    }

    pub fn remove(&mut self, id: EffectId) -> Option<ContinuousEffect> {
        let idx = self.effects.iter().position(|e| e.id == id)?;
        Some(self.effects.remove(idx))
    }

    #[must_use]
    pub fn get(&self, id: EffectId) -> Option<&ContinuousEffect> {
        self.effects.iter().find(|e| e.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ContinuousEffect> {
        self.effects.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.effects.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    /// Remove effects whose duration satisfies `pred`. Returns how many.
    pub fn expire_where(&mut self, pred: impl Fn(&Duration) -> bool) -> usize {
        let before = self.effects.len();
        self.effects.retain(|e| !pred(&e.duration));
        before - self.effects.len()
    }

    /// Cleanup: "until end of turn" effects end.
    pub fn end_turn(&mut self) -> usize {
        self.expire_where(|d| matches!(d, Duration::EndOfTurn | Duration::EndOfCombat))
    }

    pub fn end_combat(&mut self) -> usize {
        self.expire_where(|d| matches!(d, Duration::EndOfCombat))
    }

    /// Drop effects that can never apply again: their duration was tied to
    /// an object that has left the battlefield, or every object they
    /// affect has changed zones.
    pub fn prune(
        &mut self,
        on_battlefield: impl Fn(ObjectRef) -> bool,
        is_current: impl Fn(ObjectRef) -> bool,
    ) -> usize {
        let before = self.effects.len();
        self.effects.retain(|e| {
            let duration_ok = match e.duration {
                Duration::WhileOnBattlefield(r) => on_battlefield(r),
                _ => true,
            };
            duration_ok && e.affected.iter().any(|r| is_current(*r))
        });
        before - self.effects.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn effect(duration: Duration, affected: &[ObjectRef]) -> ContinuousEffect {
        ContinuousEffect::new(
            ObjectId(1),
            PlayerId::new(0),
            Timestamp(1),
            duration,
            affected,
            Modification::pump(1, 1),
        )
    }

    #[test]
    fn test_add_assigns_ids() {
        let mut store = EffectStore::new();
        let a = store.add(effect(Duration::EndOfTurn, &[]));
        let b = store.add(effect(Duration::EndOfTurn, &[]));
        assert_ne!(a, b);
        assert_eq!(store.get(b).map(|e| e.id), Some(b));
        assert!(store.remove(a).is_some());
        assert!(store.remove(a).is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_end_turn_and_combat() {
        let mut store = EffectStore::new();
        store.add(effect(Duration::EndOfTurn, &[]));
        store.add(effect(Duration::EndOfCombat, &[]));
        store.add(effect(Duration::Indefinite, &[]));

        assert_eq!(store.end_combat(), 1);
        assert_eq!(store.end_turn(), 1);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_prune() {
        let alive = ObjectRef::new(ObjectId(2), 0);
        let gone = ObjectRef::new(ObjectId(3), 0);
        let mut store = EffectStore::new();
        store.add(effect(Duration::Indefinite, &[alive]));
        store.add(effect(Duration::Indefinite, &[gone]));
        store.add(effect(Duration::WhileOnBattlefield(gone), &[alive]));

        let removed = store.prune(|r| r == alive, |r| r == alive);
        assert_eq!(removed, 2);
        assert_eq!(store.len(), 1);
    }
}
