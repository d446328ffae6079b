//! Combat resolution between a roll and a defending pawn

use super::Roll;

/// Result of attacking an occupied enemy tile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombatOutcome {
    /// Defender removed, attacker takes the tile
    AttackerWins,
    /// Both pawns removed, both owners score
    MutualElimination,
    /// Defender holds; the action is rejected
    Repelled,
}

/// Combat system for comparing rolls against pawn values
pub struct CombatSystem;

impl CombatSystem {
    /// Compare an attacking roll against the defender's value
    pub fn resolve(roll: Roll, defender_value: u8) -> CombatOutcome {
        let attack = roll.value();
        if attack > defender_value {
            CombatOutcome::AttackerWins
        } else if attack == defender_value {
            CombatOutcome::MutualElimination
        } else {
            CombatOutcome::Repelled
        }
    }

    /// Entering the center on the matching roll beats any defender there
    pub fn center_entry_overrides(roll: Roll, entering_center: bool) -> bool {
        entering_center && roll.value() == Roll::CENTER_ENTRY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roll(v: u8) -> Roll {
        Roll::new(v).expect("valid roll")
    }

    #[test]
    fn test_outcome_table() {
        for d in 1..=6u8 {
            for v in 1..=6u8 {
                let outcome = CombatSystem::resolve(roll(d), v);
                let expected = match d.cmp(&v) {
                    std::cmp::Ordering::Greater => CombatOutcome::AttackerWins,
                    std::cmp::Ordering::Equal => CombatOutcome::MutualElimination,
                    std::cmp::Ordering::Less => CombatOutcome::Repelled,
                };
                assert_eq!(outcome, expected, "roll {d} vs value {v}");
            }
        }
    }

    #[test]
    fn test_center_entry_override() {
        assert!(CombatSystem::center_entry_overrides(roll(4), true));
        assert!(!CombatSystem::center_entry_overrides(roll(4), false));
        assert!(!CombatSystem::center_entry_overrides(roll(5), true));
    }
}
