//! Grid geometry: cell keys, grid size and clue spans.
//!
//! Cells are addressed by a [`CellKey`] value rather than a dense array so
//! that puzzles of any width/height can be patched one cell at a time.

use crate::error::CoreError;
use crate::types::{Clue, Orientation};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::str::FromStr;
use tracing::instrument;

/// Zero-based cell coordinate (`x` = column, `y` = row).
///
/// Keys order row-major (`y` first, then `x`), so any ordered map keyed by
/// `CellKey` iterates in canonical scan order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
#[serde(try_from = "String", into = "String")]
#[display("{x},{y}")]
pub struct CellKey {
    /// Column.
    pub x: u32,
    /// Row.
    pub y: u32,
}

impl CellKey {
    /// Creates a key from coordinates.
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

impl Ord for CellKey {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.y, self.x).cmp(&(other.y, other.x))
    }
}

impl PartialOrd for CellKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl FromStr for CellKey {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (x, y) = coordinates_from_key(s)?;
        Ok(Self { x, y })
    }
}

impl TryFrom<String> for CellKey {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CellKey> for String {
    fn from(key: CellKey) -> Self {
        key.to_string()
    }
}

/// Direction of a single grid step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Towards larger `x`.
    Right,
    /// Towards smaller `x`.
    Left,
    /// Towards smaller `y`.
    Up,
    /// Towards larger `y`.
    Down,
}

impl Direction {
    /// The orientation this direction travels along.
    pub fn orientation(self) -> Orientation {
        match self {
            Direction::Right | Direction::Left => Orientation::Horizontal,
            Direction::Up | Direction::Down => Orientation::Vertical,
        }
    }
}

/// Parses an `"x,y"` key into coordinates.
///
/// # Errors
///
/// Returns [`CoreError::InvalidKey`] if the text is not two comma-separated
/// unsigned integers.
pub fn coordinates_from_key(key: &str) -> Result<(u32, u32), CoreError> {
    let invalid = || CoreError::InvalidKey {
        raw: key.to_string(),
    };
    let (x, y) = key.split_once(',').ok_or_else(invalid)?;
    let x = x.trim().parse::<u32>().map_err(|_| invalid())?;
    let y = y.trim().parse::<u32>().map_err(|_| invalid())?;
    Ok((x, y))
}

/// Builds a key from coordinates. Inverse of [`coordinates_from_key`].
pub fn key_from_coordinates(x: u32, y: u32) -> CellKey {
    CellKey::new(x, y)
}

/// Returns `(width, height)` covering every key: `max(x) + 1`, `max(y) + 1`.
///
/// An empty key set has size `(0, 0)`.
pub fn size_from_keys<'a>(keys: impl IntoIterator<Item = &'a CellKey>) -> (u32, u32) {
    keys.into_iter().fold((0, 0), |(width, height), key| {
        (
            width.max(key.x.saturating_add(1)),
            height.max(key.y.saturating_add(1)),
        )
    })
}

/// Whether a clue of this length fits inside a `width` x `height` grid.
pub fn clue_in_bounds(clue: &Clue, orientation: Orientation, width: u32, height: u32) -> bool {
    let (start, across, limit, other_limit) = match orientation {
        Orientation::Horizontal => (clue.x, clue.y, width, height),
        Orientation::Vertical => (clue.y, clue.x, height, width),
    };
    across < other_limit && start.checked_add(clue.length).is_some_and(|end| end <= limit)
}

/// Keys covered by a clue, in reading order from its start cell.
///
/// The span stops early rather than wrap if it would run past `u32::MAX`.
#[instrument(skip(clue), fields(number = clue.number, length = clue.length))]
pub fn cell_keys_for_clue(clue: &Clue, orientation: Orientation) -> Vec<CellKey> {
    (0..clue.length)
        .map_while(|offset| match orientation {
            Orientation::Horizontal => clue.x.checked_add(offset).map(|x| CellKey::new(x, clue.y)),
            Orientation::Vertical => clue.y.checked_add(offset).map(|y| CellKey::new(clue.x, y)),
        })
        .collect()
}

/// Sorts keys into canonical row-major scan order.
pub fn sorted_keys<'a>(keys: impl IntoIterator<Item = &'a CellKey>) -> Vec<CellKey> {
    let mut sorted: Vec<CellKey> = keys.into_iter().copied().collect();
    sorted.sort();
    sorted
}

/// The neighbouring key one step in `direction`, or `None` past the grid edge.
pub fn step(key: CellKey, direction: Direction, width: u32, height: u32) -> Option<CellKey> {
    match direction {
        Direction::Right => key
            .x
            .checked_add(1)
            .filter(|&x| x < width)
            .map(|x| CellKey::new(x, key.y)),
        Direction::Left => key.x.checked_sub(1).map(|x| CellKey::new(x, key.y)),
        Direction::Down => key
            .y
            .checked_add(1)
            .filter(|&y| y < height)
            .map(|y| CellKey::new(key.x, y)),
        Direction::Up => key.y.checked_sub(1).map(|y| CellKey::new(key.x, y)),
    }
}
