// grid.rs

use crate::config::LayoutOrder;
use crate::error::{Error, Result};
use crate::frame::{Frame, Rgb};
use log::debug;

/// Position of one clip on the output canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridCell {
    pub col: usize,
    pub row: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridLayout {
    pub columns: usize,
    pub rows: usize,
    pub order: LayoutOrder,
}

impl GridLayout {
    /// Near-square grid for `clip_count` clips:
    /// `rows = floor(sqrt(n))`, `columns = ceil(n / rows)`.
    pub fn for_count(clip_count: usize, order: LayoutOrder) -> Self {
        let n = clip_count.max(1);
        let rows = ((n as f64).sqrt().floor() as usize).max(1);
        let columns = n.div_ceil(rows);
        Self {
            columns,
            rows,
            order,
        }
    }

    /// A 1x1 canvas shared by every clip, used for exclusive playback.
    pub fn single() -> Self {
        Self {
            columns: 1,
            rows: 1,
            order: LayoutOrder::ColumnMajor,
        }
    }

    /// Builds a grid from optional explicit dimensions, deriving whichever
    /// is missing. Fails when the grid cannot hold every clip.
    pub fn resolve(
        clip_count: usize,
        columns: Option<usize>,
        rows: Option<usize>,
        order: LayoutOrder,
    ) -> Result<Self> {
        let derived = Self::for_count(clip_count, order);
        let n = clip_count.max(1);
        let (columns, rows) = match (columns, rows) {
            (None, None) => return Ok(derived),
            (Some(c), None) => (c, n.div_ceil(c.max(1))),
            (None, Some(r)) => (n.div_ceil(r.max(1)), r),
            (Some(c), Some(r)) => (c, r),
        };
        if columns == 0 || rows == 0 || columns * rows < clip_count {
            return Err(Error::Config(format!(
                "a {}x{} grid cannot hold {} clips",
                columns, rows, clip_count
            )));
        }
        Ok(Self {
            columns,
            rows,
            order,
        })
    }

    pub fn capacity(&self) -> usize {
        self.columns * self.rows
    }

    /// Cell for clip `index`. Indices beyond capacity wrap, which is what
    /// lets every clip share the single cell of [`GridLayout::single`].
    pub fn cell_for(&self, index: usize) -> GridCell {
        let i = index % self.capacity();
        match self.order {
            LayoutOrder::ColumnMajor => GridCell {
                col: i / self.rows,
                row: i % self.rows,
            },
            LayoutOrder::RowMajor => GridCell {
                col: i % self.columns,
                row: i / self.columns,
            },
        }
    }
}

/// Merges per-clip frames into one canvas of
/// `(columns * cell_width, rows * cell_height)`.
#[derive(Debug, Clone)]
pub struct GridCompositor {
    layout: GridLayout,
    cell_size: (u32, u32),
    background: Rgb,
}

impl GridCompositor {
    pub fn new(layout: GridLayout, cell_size: (u32, u32), background: Rgb) -> Self {
        debug!(
            "Compositor: {}x{} cells of {}x{}",
            layout.columns, layout.rows, cell_size.0, cell_size.1
        );
        Self {
            layout,
            cell_size,
            background,
        }
    }

    pub fn layout(&self) -> &GridLayout {
        &self.layout
    }

    pub fn cell_size(&self) -> (u32, u32) {
        self.cell_size
    }

    pub fn canvas_size(&self) -> (u32, u32) {
        (
            self.layout.columns as u32 * self.cell_size.0,
            self.layout.rows as u32 * self.cell_size.1,
        )
    }

    pub fn cell_for(&self, index: usize) -> GridCell {
        self.layout.cell_for(index)
    }

    pub fn cell_origin(&self, cell: GridCell) -> (u32, u32) {
        (
            cell.col as u32 * self.cell_size.0,
            cell.row as u32 * self.cell_size.1,
        )
    }

    /// Background-only canvas.
    pub fn blank(&self) -> Frame {
        let (w, h) = self.canvas_size();
        Frame::filled(w, h, self.background)
    }

    /// Centered square crop of `frame`, scaled to one cell.
    pub fn fit_to_cell(&self, frame: &Frame) -> Frame {
        frame
            .crop_center_square()
            .resize(self.cell_size.0, self.cell_size.1)
    }

    /// Overlays every layer at its cell; cells without a layer keep the
    /// background color. Later layers win where cells coincide.
    pub fn compose<'a, I>(&self, layers: I) -> Frame
    where
        I: IntoIterator<Item = (GridCell, &'a Frame)>,
    {
        let mut canvas = self.blank();
        for (cell, frame) in layers {
            let (x, y) = self.cell_origin(cell);
            canvas.blit(&self.fit_to_cell(frame), x, y);
        }
        canvas
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_dimensions() {
        let layout = GridLayout::for_count(9, LayoutOrder::ColumnMajor);
        assert_eq!((layout.columns, layout.rows), (3, 3));
        let layout = GridLayout::for_count(5, LayoutOrder::ColumnMajor);
        assert_eq!((layout.columns, layout.rows), (3, 2));
        let layout = GridLayout::for_count(1, LayoutOrder::ColumnMajor);
        assert_eq!((layout.columns, layout.rows), (1, 1));
    }

    #[test]
    fn test_column_major_fills_columns_first() {
        let layout = GridLayout::for_count(4, LayoutOrder::ColumnMajor);
        assert_eq!(layout.cell_for(1), GridCell { col: 0, row: 1 });
        assert_eq!(layout.cell_for(2), GridCell { col: 1, row: 0 });
    }

    #[test]
    fn test_row_major_fills_rows_first() {
        let layout = GridLayout::for_count(4, LayoutOrder::RowMajor);
        assert_eq!(layout.cell_for(1), GridCell { col: 1, row: 0 });
        assert_eq!(layout.cell_for(2), GridCell { col: 0, row: 1 });
    }

    #[test]
    fn test_single_layout_shares_one_cell() {
        let layout = GridLayout::single();
        assert_eq!(layout.cell_for(5), GridCell { col: 0, row: 0 });
    }

    #[test]
    fn test_explicit_grid_too_small() {
        let result = GridLayout::resolve(10, Some(3), Some(3), LayoutOrder::RowMajor);
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_partial_override_derives_the_other_dimension() {
        let layout = GridLayout::resolve(10, Some(4), None, LayoutOrder::RowMajor).unwrap();
        assert_eq!((layout.columns, layout.rows), (4, 3));
    }
}
