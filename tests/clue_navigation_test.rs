//! Tests for clue lookup and clue-to-clue traversal on the fixture puzzles.

use crossplay_core::{
    CellKey, Orientation, Puzzle, cell_keys_for_clue, clue_for_cell, clue_number_for_cell,
    coordinates_from_key, key_from_coordinates, next_clue, previous_clue, size_from_keys,
    sorted_keys,
};

fn fixtures() -> Vec<Puzzle> {
    [
        include_str!("../puzzles/cat_web.json"),
        include_str!("../puzzles/hello.json"),
        include_str!("../puzzles/rebus.json"),
    ]
    .into_iter()
    .map(|json| Puzzle::from_json_str(json).unwrap())
    .collect()
}

const ORIENTATIONS: [Orientation; 2] = [Orientation::Horizontal, Orientation::Vertical];

#[test]
fn test_every_playable_cell_has_one_clue_per_covered_orientation() {
    for puzzle in fixtures() {
        for key in puzzle.playable_keys() {
            let mut found = 0;
            for orientation in ORIENTATIONS {
                let covering: Vec<_> = puzzle
                    .clues
                    .for_orientation(orientation)
                    .iter()
                    .filter(|clue| clue.covers(key, orientation))
                    .collect();
                assert!(covering.len() <= 1, "{key} has two {orientation} clues");
                match clue_for_cell(key, orientation, &puzzle) {
                    Ok(clue) => {
                        assert_eq!(Some(&clue), covering.first());
                        assert!(cell_keys_for_clue(clue, orientation).contains(&key));
                        found += 1;
                    }
                    Err(_) => assert!(covering.is_empty()),
                }
            }
            assert!(found > 0, "{key} in {} has no clue", puzzle.puzzle_id);
        }
    }
}

#[test]
fn test_blocked_cells_have_no_clue() {
    let puzzle = &fixtures()[0];
    for orientation in ORIENTATIONS {
        assert!(clue_for_cell(CellKey::new(1, 1), orientation, puzzle).is_err());
    }
    assert!(clue_for_cell(CellKey::new(9, 9), Orientation::Horizontal, puzzle).is_err());
}

#[test]
fn test_next_and_previous_are_inverse() {
    for puzzle in fixtures() {
        for orientation in ORIENTATIONS {
            for clue in puzzle.clues.for_orientation(orientation) {
                let next = next_clue(&puzzle, clue, orientation).unwrap();
                let back = previous_clue(&puzzle, next.clue, next.orientation).unwrap();
                assert_eq!(back.clue, clue);
                assert_eq!(back.orientation, orientation);
                assert_eq!(back.did_loop_puzzle, next.did_loop_puzzle);
                // Orientation flips exactly when the ring seam is crossed.
                assert_eq!(next.did_loop_puzzle, next.orientation != orientation);
            }
        }
    }
}

#[test]
fn test_ring_visits_every_clue_once() {
    for puzzle in fixtures() {
        let total = puzzle.clues.horizontal.len() + puzzle.clues.vertical.len();
        let mut clue = &puzzle.clues.horizontal[0];
        let mut orientation = Orientation::Horizontal;
        let mut seen = Vec::new();
        for _ in 0..total {
            seen.push((clue.number, orientation));
            let step = next_clue(&puzzle, clue, orientation).unwrap();
            clue = step.clue;
            orientation = step.orientation;
        }
        seen.sort_by_key(|(number, orientation)| (*orientation == Orientation::Vertical, *number));
        seen.dedup();
        assert_eq!(seen.len(), total);
        assert_eq!(
            (clue.number, orientation),
            (puzzle.clues.horizontal[0].number, Orientation::Horizontal)
        );
    }
}

#[test]
fn test_grid_numbers_only_on_clue_starts() {
    let puzzle = &fixtures()[0];
    assert_eq!(clue_number_for_cell(CellKey::new(0, 0), puzzle), Some(1));
    assert_eq!(clue_number_for_cell(CellKey::new(2, 0), puzzle), Some(2));
    assert_eq!(clue_number_for_cell(CellKey::new(0, 2), puzzle), Some(3));
    assert_eq!(clue_number_for_cell(CellKey::new(1, 0), puzzle), None);
}

#[test]
fn test_key_geometry() {
    let puzzle = &fixtures()[1];
    assert_eq!(puzzle.size(), (5, 5));
    assert_eq!(size_from_keys(&Vec::<CellKey>::new()), (0, 0));

    let key = key_from_coordinates(4, 2);
    assert_eq!(coordinates_from_key(&key.to_string()).unwrap(), (4, 2));
    assert!(coordinates_from_key("4;2").is_err());

    let keys = [CellKey::new(1, 1), CellKey::new(2, 0), CellKey::new(0, 1)];
    assert_eq!(
        sorted_keys(&keys),
        vec![CellKey::new(2, 0), CellKey::new(0, 1), CellKey::new(1, 1)]
    );
}
