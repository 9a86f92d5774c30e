use serde::{Deserialize, Serialize};

/// A fixed-size 2D grid stored row-major in a flat vector.
///
/// Dimensions never change after construction; only cell values do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid<T> {
    width: usize,
    height: usize,
    cells: Vec<T>,
}

impl<T> Grid<T> {
    /// Creates a grid whose cells are produced by `f(x, y)` in row-major order.
    ///
    /// # Panics
    ///
    /// Panics if `width * height` overflows `usize`.
    pub fn from_generator<F>(width: usize, height: usize, mut f: F) -> Self
    where
        F: FnMut(usize, usize) -> T,
    {
        let size = width.checked_mul(height).expect("Grid size overflow");
        let mut cells = Vec::with_capacity(size);
        for y in 0..height {
            for x in 0..width {
                cells.push(f(x, y));
            }
        }
        Grid {
            width,
            height,
            cells,
        }
    }

    /// Number of columns.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of rows.
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Converts (x, y) coordinates to a flat vector index.
    ///
    /// Returns `None` if the coordinates are out of bounds.
    #[inline]
    fn coords_to_index(&self, x: usize, y: usize) -> Option<usize> {
        if x < self.width && y < self.height {
            Some(y * self.width + x)
        } else {
            None
        }
    }

    /// Converts signed coordinates to a flat index; negative values are out of bounds.
    #[inline]
    fn signed_to_index(&self, x: i32, y: i32) -> Option<usize> {
        let x = usize::try_from(x).ok()?;
        let y = usize::try_from(y).ok()?;
        self.coords_to_index(x, y)
    }

    /// Gets the cell at the given coordinates, or `None` if out of bounds.
    ///
    /// Coordinates are signed, as produced by flooring continuous positions
    /// that may sit left of or above the origin.
    pub fn get_signed(&self, x: i32, y: i32) -> Option<&T> {
        self.signed_to_index(x, y).map(|index| &self.cells[index])
    }

    /// Mutable counterpart of [`Grid::get_signed`].
    pub fn get_signed_mut(&mut self, x: i32, y: i32) -> Option<&mut T> {
        self.signed_to_index(x, y).map(|index| &mut self.cells[index])
    }

    /// Returns an iterator over the cells of the grid in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.cells.iter()
    }

    /// Returns an iterator over the rows of the grid, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[T]> {
        self.cells.chunks(self.width.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered(width: usize, height: usize) -> Grid<usize> {
        Grid::from_generator(width, height, |x, y| y * 10 + x)
    }

    #[test]
    fn generator_fills_row_major() {
        let grid = numbered(3, 2);
        assert_eq!(grid.iter().copied().collect::<Vec<_>>(), vec![0, 1, 2, 10, 11, 12]);
        assert_eq!(grid.get_signed(2, 1), Some(&12));
        let rows: Vec<&[usize]> = grid.rows().collect();
        assert_eq!(rows, vec![&[0, 1, 2][..], &[10, 11, 12][..]]);
    }

    #[test]
    fn signed_access_rejects_negative_coordinates() {
        let grid = numbered(3, 2);
        assert_eq!(grid.get_signed(-1, 0), None);
        assert_eq!(grid.get_signed(0, -1), None);
        assert_eq!(grid.get_signed(3, 0), None);
        assert_eq!(grid.get_signed(1, 1), Some(&11));
    }

    #[test]
    fn writes_through_signed_access_stick() {
        let mut grid = numbered(3, 2);
        if let Some(cell) = grid.get_signed_mut(0, 1) {
            *cell = 99;
        }
        assert_eq!(grid.get_signed(0, 1), Some(&99));
        assert!(grid.get_signed_mut(0, 2).is_none());
    }
}
