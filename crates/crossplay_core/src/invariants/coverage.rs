//! Coverage invariants: how clues and playable cells relate.

use super::Invariant;
use crate::geometry::{cell_keys_for_clue, clue_in_bounds};
use crate::types::{Orientation, Puzzle};
use strum::IntoEnumIterator;

/// Invariant: every clue cell lies on the grid and is playable.
pub struct CluesCoverPlayableCells;

impl Invariant<Puzzle> for CluesCoverPlayableCells {
    fn holds(puzzle: &Puzzle) -> bool {
        let (width, height) = puzzle.size();
        Orientation::iter().all(|orientation| {
            puzzle.clues.for_orientation(orientation).iter().all(|clue| {
                clue.length > 0
                    && clue_in_bounds(clue, orientation, width, height)
                    && cell_keys_for_clue(clue, orientation)
                        .into_iter()
                        .all(|key| puzzle.is_playable(key))
            })
        })
    }

    fn description() -> &'static str {
        "Clues cover only playable cells inside the grid"
    }
}

/// Invariant: every playable cell belongs to at least one clue.
pub struct PlayableCellsCovered;

impl Invariant<Puzzle> for PlayableCellsCovered {
    fn holds(puzzle: &Puzzle) -> bool {
        puzzle.playable_keys().all(|key| {
            Orientation::iter().any(|orientation| {
                puzzle
                    .clues
                    .for_orientation(orientation)
                    .iter()
                    .any(|clue| clue.covers(key, orientation))
            })
        })
    }

    fn description() -> &'static str {
        "Every playable cell belongs to a clue"
    }
}

/// Invariant: no cell belongs to two clues of the same orientation.
pub struct SingleCluePerOrientation;

impl Invariant<Puzzle> for SingleCluePerOrientation {
    fn holds(puzzle: &Puzzle) -> bool {
        puzzle.playable_keys().all(|key| {
            Orientation::iter().all(|orientation| {
                puzzle
                    .clues
                    .for_orientation(orientation)
                    .iter()
                    .filter(|clue| clue.covers(key, orientation))
                    .count()
                    <= 1
            })
        })
    }

    fn description() -> &'static str {
        "Each cell belongs to at most one clue per orientation"
    }
}
