//! Grid coordinates and the storage/display y flip.
//!
//! The index keys cells as `"{x}_{y_stored}"` where `y_stored = N - 1 - y`.
//! Only the functions here know about that; everything else works in display
//! coordinates (row 0 at the top of the screen).

use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct GridCoord {
    pub x: i32,
    pub y: i32,
}

impl GridCoord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Centre cell of an N×N grid (integer division).
    pub const fn center(grid_size: u32) -> Self {
        let c = (grid_size / 2) as i32;
        Self { x: c, y: c }
    }

    pub fn in_bounds(self, grid_size: u32) -> bool {
        let n = grid_size as i32;
        (0..n).contains(&self.x) && (0..n).contains(&self.y)
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self { x: self.x + dx, y: self.y + dy }
    }

    pub fn chebyshev(self, other: Self) -> u32 {
        self.x.abs_diff(other.x).max(self.y.abs_diff(other.y))
    }
}

impl fmt::Display for GridCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

pub fn display_to_storage(y: i32, grid_size: u32) -> i32 {
    grid_size as i32 - 1 - y
}

pub fn storage_to_display(y: i32, grid_size: u32) -> i32 {
    grid_size as i32 - 1 - y
}

/// Index key for a display coordinate.
pub fn storage_key(coord: GridCoord, grid_size: u32) -> String {
    format!("{}_{}", coord.x, display_to_storage(coord.y, grid_size))
}

/// Parse an index key back into a display coordinate. Returns `None` for
/// anything that is not two `_`-separated integers.
pub fn parse_storage_key(key: &str, grid_size: u32) -> Option<GridCoord> {
    let (x, y) = key.split_once('_')?;
    let x: i32 = x.trim().parse().ok()?;
    let y_stored: i32 = y.trim().parse().ok()?;
    Some(GridCoord::new(x, storage_to_display(y_stored, grid_size)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flip_round_trip() {
        for n in [1u32, 3, 143, 144] {
            for y in -2..(n as i32 + 2) {
                assert_eq!(display_to_storage(storage_to_display(y, n), n), y);
                assert_eq!(storage_to_display(display_to_storage(y, n), n), y);
            }
        }
    }

    #[test]
    fn test_flip_maps_top_row_to_last_stored_row() {
        assert_eq!(display_to_storage(0, 144), 143);
        assert_eq!(display_to_storage(143, 144), 0);
    }

    #[test]
    fn test_key_round_trip() {
        let c = GridCoord::new(12, 30);
        let key = storage_key(c, 144);
        assert_eq!(key, "12_113");
        assert_eq!(parse_storage_key(&key, 144), Some(c));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse_storage_key("12", 144), None);
        assert_eq!(parse_storage_key("a_3", 144), None);
        assert_eq!(parse_storage_key("3_b", 144), None);
        assert_eq!(parse_storage_key("", 144), None);
    }

    #[test]
    fn test_bounds_and_distance() {
        assert!(GridCoord::new(0, 0).in_bounds(3));
        assert!(!GridCoord::new(3, 0).in_bounds(3));
        assert!(!GridCoord::new(0, -1).in_bounds(3));
        assert_eq!(GridCoord::new(0, 0).chebyshev(GridCoord::new(2, -1)), 2);
        assert_eq!(GridCoord::center(144), GridCoord::new(72, 72));
        assert_eq!(GridCoord::center(143), GridCoord::new(71, 71));
    }
}
