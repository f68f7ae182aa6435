//! Targeting.
//!
//! A [`TargetSpec`] describes one target slot of a spell or ability. Legality
//! is judged against the derived view, both when the target is chosen and
//! again on resolution.

use serde::{Deserialize, Serialize};

use crate::cards::{ControllerFilter, FilterContext, Keyword, ObjectFilter};
use crate::core::entity::{ObjectId, Target};
use crate::core::player::PlayerId;
use crate::layers::{DerivedObject, DerivedView};
use crate::zones::Zone;

/// What a target slot accepts.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetKind {
    /// A creature or a player.
    AnyTarget,
    Player(ControllerFilter),
    /// A permanent on the battlefield.
    Permanent(ObjectFilter),
    /// A spell on the stack.
    Spell(ObjectFilter),
}

/// One target slot.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TargetSpec {
    pub kind: TargetKind,
}

impl TargetSpec {
    #[must_use]
    pub fn new(kind: TargetKind) -> Self {
        Self { kind }
    }

    /// "any target": creature or player.
    #[must_use]
    pub fn any_target() -> Self {
        Self::new(TargetKind::AnyTarget)
    }

    #[must_use]
    pub fn creature() -> Self {
        Self::new(TargetKind::Permanent(ObjectFilter::creature()))
    }

    #[must_use]
    pub fn permanent(filter: ObjectFilter) -> Self {
        Self::new(TargetKind::Permanent(filter))
    }

    #[must_use]
    pub fn player() -> Self {
        Self::new(TargetKind::Player(ControllerFilter::Any))
    }

    #[must_use]
    pub fn opponent() -> Self {
        Self::new(TargetKind::Player(ControllerFilter::Opponent))
    }

    #[must_use]
    pub fn spell() -> Self {
        Self::new(TargetKind::Spell(ObjectFilter::any()))
    }

    /// Whether `target` is legal for this slot.
    #[must_use]
    pub fn is_legal(&self, target: &Target, ctx: &TargetContext<'_>) -> bool {
        match (target, &self.kind) {
            (Target::Player(player), TargetKind::AnyTarget) => ctx.is_live(*player),
            (Target::Player(player), TargetKind::Player(filter)) => {
                ctx.is_live(*player) && filter.matches(*player, ctx.controller)
            }
            (Target::Player(_), _) => false,
            (Target::Object(r), kind) => {
                let Some(object) = ctx.view.get_ref(*r) else {
                    return false;
                };
                ctx.object_matches(kind, object)
            }
        }
    }

    /// Every legal target for this slot, players first then objects in
    /// battlefield or stack order.
    #[must_use]
    pub fn candidates(&self, ctx: &TargetContext<'_>) -> Vec<Target> {
        let mut out: Vec<Target> = Vec::new();
        if matches!(self.kind, TargetKind::AnyTarget | TargetKind::Player(_)) {
            out.extend(
                ctx.players
                    .iter()
                    .map(|p| Target::Player(*p))
                    .filter(|t| self.is_legal(t, ctx)),
            );
        }
        match &self.kind {
            TargetKind::AnyTarget | TargetKind::Permanent(_) => out.extend(
                ctx.view
                    .battlefield()
                    .filter(|o| ctx.object_matches(&self.kind, o))
                    .map(|o| Target::Object(o.object_ref())),
            ),
            TargetKind::Spell(_) => out.extend(
                ctx.stack
                    .iter()
                    .filter_map(|id| ctx.view.get(*id))
                    .filter(|o| ctx.object_matches(&self.kind, o))
                    .map(|o| Target::Object(o.object_ref())),
            ),
            TargetKind::Player(_) => {}
        }
        out
    }
}

/// What target legality is judged against.
pub struct TargetContext<'a> {
    pub view: &'a DerivedView,
    /// The player choosing targets.
    pub controller: PlayerId,
    /// The spell or ability's source.
    pub source: Option<ObjectId>,
    /// Players still in the game.
    pub players: &'a [PlayerId],
    /// Spell objects on the stack, bottom first.
    pub stack: &'a [ObjectId],
}

impl TargetContext<'_> {
    fn is_live(&self, player: PlayerId) -> bool {
        self.players.contains(&player)
    }

    fn object_matches(&self, kind: &TargetKind, object: &DerivedObject) -> bool {
        let filter_ctx = FilterContext::new(self.controller, self.source);
        let in_zone = match kind {
            TargetKind::AnyTarget => {
                object.is_on_battlefield() && object.characteristics.is_creature()
            }
            TargetKind::Permanent(filter) => {
                object.is_on_battlefield() && filter.matches(object, &filter_ctx)
            }
            TargetKind::Spell(filter) => {
                object.zone.zone == Zone::Stack && filter.matches(object, &filter_ctx)
            }
            TargetKind::Player(_) => false,
        };
        // Hexproof: can't be the target of opponents' spells and abilities.
        in_zone
            && !(object.is_on_battlefield()
                && object.characteristics.has_keyword(Keyword::Hexproof)
                && object.controller != self.controller)
    }
}
