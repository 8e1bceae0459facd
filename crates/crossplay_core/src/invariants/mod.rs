//! Load-time puzzle invariants.
//!
//! The reducer assumes clue data is consistent with the grid. These checks
//! run once when a session is loaded so that malformed provider data fails
//! initialization instead of surfacing mid-session.

mod coverage;

pub use coverage::{CluesCoverPlayableCells, PlayableCellsCovered, SingleCluePerOrientation};

use crate::error::CoreError;
use crate::types::Puzzle;
use tracing::{instrument, warn};

/// A logical property that must hold for a given state.
pub trait Invariant<S> {
    /// Checks if the invariant holds for the given state.
    fn holds(state: &S) -> bool;

    /// Human-readable description of the invariant.
    fn description() -> &'static str;
}

/// Violation of an invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub description: String,
}

impl InvariantViolation {
    /// Creates a new invariant violation.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
        }
    }
}

/// A set of invariants that can be checked together.
///
/// Implemented for tuples of invariants.
pub trait InvariantSet<S> {
    /// Checks all invariants in the set, collecting every violation.
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>>;
}

impl<S, I1, I2> InvariantSet<S> for (I1, I2)
where
    I1: Invariant<S>,
    I2: Invariant<S>,
{
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>> {
        let mut violations = Vec::new();
        if !I1::holds(state) {
            violations.push(InvariantViolation::new(I1::description()));
        }
        if !I2::holds(state) {
            violations.push(InvariantViolation::new(I2::description()));
        }
        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }
}

impl<S, I1, I2, I3> InvariantSet<S> for (I1, I2, I3)
where
    I1: Invariant<S>,
    I2: Invariant<S>,
    I3: Invariant<S>,
{
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>> {
        let mut violations = match <(I1, I2) as InvariantSet<S>>::check_all(state) {
            Ok(()) => Vec::new(),
            Err(violations) => violations,
        };
        if !I3::holds(state) {
            violations.push(InvariantViolation::new(I3::description()));
        }
        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }
}

/// Every structural puzzle invariant.
pub type PuzzleInvariants = (
    CluesCoverPlayableCells,
    PlayableCellsCovered,
    SingleCluePerOrientation,
);

/// Validates a puzzle before a session is built on it.
///
/// # Errors
///
/// Returns [`CoreError::NoSelectableCellFound`] for a puzzle without playable
/// cells and [`CoreError::InvalidPuzzle`] listing every violated invariant.
#[instrument(skip(puzzle), fields(puzzle_id = %puzzle.puzzle_id))]
pub fn validate_puzzle(puzzle: &Puzzle) -> Result<(), CoreError> {
    if puzzle.playable_keys().next().is_none() {
        warn!("Puzzle has no playable cells");
        return Err(CoreError::NoSelectableCellFound);
    }

    PuzzleInvariants::check_all(puzzle).map_err(|violations| {
        let reason = violations
            .iter()
            .map(|v| v.description.as_str())
            .collect::<Vec<_>>()
            .join("; ");
        warn!(%reason, "Puzzle failed validation");
        CoreError::InvalidPuzzle { reason }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::CellKey;
    use crate::test_support::{cat_web_puzzle, hello_puzzle, rebus_puzzle};
    use crate::types::{Clue, Solution};

    #[test]
    fn test_fixtures_validate() {
        assert!(validate_puzzle(&cat_web_puzzle()).is_ok());
        assert!(validate_puzzle(&hello_puzzle()).is_ok());
        assert!(validate_puzzle(&rebus_puzzle()).is_ok());
    }

    #[test]
    fn test_all_blocked_puzzle_has_no_selectable_cell() {
        let mut puzzle = cat_web_puzzle();
        for solution in puzzle.solutions.values_mut() {
            *solution = Solution::Blocked;
        }
        assert_eq!(validate_puzzle(&puzzle), Err(CoreError::NoSelectableCellFound));
    }

    #[test]
    fn test_violations_are_collected() {
        let mut puzzle = cat_web_puzzle();
        // Drop 3-Across: W and B stay covered by the downs, E is orphaned.
        puzzle.clues.horizontal.pop();
        // Stretch 1-Down over the edge of the grid.
        puzzle.clues.vertical[0].length = 4;

        let violations = PuzzleInvariants::check_all(&puzzle).unwrap_err();
        assert_eq!(violations.len(), 2);
        assert!(matches!(
            validate_puzzle(&puzzle),
            Err(CoreError::InvalidPuzzle { .. })
        ));
    }

    #[test]
    fn test_clue_at_coordinate_limit_is_rejected() {
        let mut puzzle = cat_web_puzzle();
        puzzle
            .clues
            .horizontal
            .push(Clue::new(9, u32::MAX, 0, "x".to_string(), 2));
        puzzle
            .clues
            .vertical
            .push(Clue::new(10, 0, u32::MAX - 1, "y".to_string(), 3));
        assert!(matches!(
            validate_puzzle(&puzzle),
            Err(CoreError::InvalidPuzzle { .. })
        ));
    }

    #[test]
    fn test_two_invariants_as_set() {
        let mut puzzle = cat_web_puzzle();
        puzzle.solutions.insert(CellKey::new(1, 1), Solution::Single("X".to_string()));

        type Coverage = (CluesCoverPlayableCells, PlayableCellsCovered);
        assert!(Coverage::check_all(&puzzle).is_err());
    }
}
