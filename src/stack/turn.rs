//! Turn structure.

use serde::{Deserialize, Serialize};

/// Phases of a turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    Beginning,
    PrecombatMain,
    Combat,
    PostcombatMain,
    Ending,
}

/// Steps of a turn, in order. Main phases count as a single step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Step {
    Untap,
    Upkeep,
    Draw,
    PrecombatMain,
    BeginCombat,
    DeclareAttackers,
    DeclareBlockers,
    CombatDamage,
    EndCombat,
    PostcombatMain,
    End,
    Cleanup,
}

impl Step {
    pub const ALL: [Step; 12] = [
        Step::Untap,
        Step::Upkeep,
        Step::Draw,
        Step::PrecombatMain,
        Step::BeginCombat,
        Step::DeclareAttackers,
        Step::DeclareBlockers,
        Step::CombatDamage,
        Step::EndCombat,
        Step::PostcombatMain,
        Step::End,
        Step::Cleanup,
    ];

    /// The following step, or `None` after cleanup.
    #[must_use]
    pub fn next(self) -> Option<Step> {
        let idx = Self::ALL.iter().position(|s| *s == self)?;
        Self::ALL.get(idx + 1).copied()
    }

    #[must_use]
    pub fn phase(self) -> Phase {
        match self {
            Step::Untap | Step::Upkeep | Step::Draw => Phase::Beginning,
            Step::PrecombatMain => Phase::PrecombatMain,
            Step::BeginCombat
            | Step::DeclareAttackers
            | Step::DeclareBlockers
            | Step::CombatDamage
            | Step::EndCombat => Phase::Combat,
            Step::PostcombatMain => Phase::PostcombatMain,
            Step::End | Step::Cleanup => Phase::Ending,
        }
    }

    /// Whether players receive priority during this step.
    #[must_use]
    pub fn grants_priority(self) -> bool {
        !matches!(self, Step::Untap | Step::Cleanup)
    }

    #[must_use]
    pub fn is_main(self) -> bool {
        matches!(self, Step::PrecombatMain | Step::PostcombatMain)
    }

    /// Steps skipped when no creature attacks.
    #[must_use]
    pub fn needs_attackers(self) -> bool {
        matches!(self, Step::DeclareBlockers | Step::CombatDamage)
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_order() {
        assert_eq!(Step::Untap.next(), Some(Step::Upkeep));
        assert_eq!(Step::PrecombatMain.next(), Some(Step::BeginCombat));
        assert_eq!(Step::Cleanup.next(), None);
    }

    #[test]
    fn test_priority_steps() {
        assert!(!Step::Untap.grants_priority());
        assert!(!Step::Cleanup.grants_priority());
        assert!(Step::Upkeep.grants_priority());
        assert!(Step::CombatDamage.grants_priority());
        assert_eq!(Step::DeclareBlockers.phase(), Phase::Combat);
    }
}
