use serde::{Deserialize, Serialize};

use crate::{CellKind, PickupKind, map::Grid};

/// Errors raised while turning a text layout into a [`Maze`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    #[error("Layout is empty.")]
    Empty,
    #[error("Inconsistent width at row {row}: expected {expected}, found {found}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("Unknown layout glyph '{glyph}' at position ({col}, {row}).")]
    UnknownGlyph { glyph: char, col: usize, row: usize },
}

/// The maze: static walls plus the pickups still left to eat.
///
/// The count of remaining pickups is kept in step with every [`Maze::consume`]
/// so callers never rescan the grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Maze {
    cells: Grid<CellKind>,
    remaining: usize,
}

impl Maze {
    /// Builds a maze from rows of glyphs: `#` wall, `.` pickup, `o` power pickup,
    /// space for an empty corridor.
    ///
    /// Every row must have the same number of glyphs. Empty lines before the
    /// first row and after the last are ignored; spaces are always significant.
    pub fn parse(layout: &str) -> Result<Self, LayoutError> {
        let mut rows: Vec<Vec<char>> = layout
            .lines()
            .skip_while(|line| line.is_empty())
            .map(|line| line.chars().collect())
            .collect();
        while rows.last().is_some_and(Vec::is_empty) {
            rows.pop();
        }

        let width = rows.first().map(Vec::len).ok_or(LayoutError::Empty)?;
        if width == 0 {
            return Err(LayoutError::Empty);
        }

        let mut kinds = Vec::with_capacity(width * rows.len());
        for (row, glyphs) in rows.iter().enumerate() {
            if glyphs.len() != width {
                return Err(LayoutError::RaggedRow {
                    row,
                    expected: width,
                    found: glyphs.len(),
                });
            }
            for (col, glyph) in glyphs.iter().enumerate() {
                let kind = match glyph {
                    '#' => CellKind::Wall,
                    '.' => CellKind::Pickup,
                    'o' => CellKind::PowerPickup,
                    ' ' => CellKind::Empty,
                    other => {
                        return Err(LayoutError::UnknownGlyph {
                            glyph: *other,
                            col,
                            row,
                        });
                    }
                };
                kinds.push(kind);
            }
        }

        let cells = Grid::from_generator(width, rows.len(), |x, y| kinds[y * width + x]);
        Ok(Self::from_grid(cells))
    }

    /// Wraps an existing grid, counting its pickups.
    pub fn from_grid(cells: Grid<CellKind>) -> Self {
        let remaining = cells
            .iter()
            .filter(|kind| matches!(kind, CellKind::Pickup | CellKind::PowerPickup))
            .count();
        Maze { cells, remaining }
    }

    /// Number of columns.
    #[inline]
    pub fn width(&self) -> usize {
        self.cells.width()
    }

    /// Number of rows.
    #[inline]
    pub fn height(&self) -> usize {
        self.cells.height()
    }

    /// Returns the cell at `(col, row)`, or `None` when out of bounds.
    ///
    /// Callers treat `None` exactly like a wall.
    pub fn cell_at(&self, col: i32, row: i32) -> Option<CellKind> {
        self.cells.get_signed(col, row).copied()
    }

    /// Whether an entity may not occupy any part of `(col, row)`.
    #[inline]
    pub fn is_blocked(&self, col: i32, row: i32) -> bool {
        !matches!(
            self.cell_at(col, row),
            Some(CellKind::Pickup | CellKind::PowerPickup | CellKind::Empty)
        )
    }

    /// Eats whatever pickup lies at `(col, row)`, leaving the cell empty.
    ///
    /// Returns `None` if there is nothing to eat, so repeated calls are harmless.
    pub fn consume(&mut self, col: i32, row: i32) -> Option<PickupKind> {
        let cell = self.cells.get_signed_mut(col, row)?;
        let eaten = match *cell {
            CellKind::Pickup => PickupKind::Pickup,
            CellKind::PowerPickup => PickupKind::PowerPickup,
            CellKind::Wall | CellKind::Empty => return None,
        };
        *cell = CellKind::Empty;
        self.remaining -= 1;
        Some(eaten)
    }

    /// Pickups of either kind not yet eaten.
    #[inline]
    pub fn remaining_pickups(&self) -> usize {
        self.remaining
    }

    /// Returns the underlying grid, for renderers walking it row by row.
    pub fn cells(&self) -> &Grid<CellKind> {
        &self.cells
    }
}
