use grid::Grid;
use pcgeom::bbox::BoundBox;
use pcgeom::transform::Translate;
use pcgeom::{Dims, Point, Rect};

use crate::layout::cell::Instance;
use crate::layout::group::Group;
use crate::layout::{Draw, DrawRef};

/// Packs instances into a near-square matrix.
///
/// Instances fill the matrix row by row, starting at the top-left.
/// Each column is as wide as its widest instance and each row as tall
/// as its tallest one. Every instance sits at the lower-left corner of
/// its slot.
#[derive(Debug, Clone)]
pub struct GridPacker {
    tiles: Grid<Option<Instance>>,
    spacing: i64,

    /// The x coordinate of the lower left of each column.
    ///
    /// `pos_ll_x[0]` represents the position of the **left-most** column.
    pos_ll_x: Vec<i64>,

    /// The y coordinate of the lower left of each row.
    ///
    /// `pos_ll_y[0]` represents the position of the **top-most** row.
    pos_ll_y: Vec<i64>,

    row_heights: Vec<i64>,
    col_widths: Vec<i64>,
}

impl GridPacker {
    /// Lays out `insts` with `spacing` between adjacent columns and rows.
    ///
    /// The matrix has `ceil(sqrt(n))` columns.
    pub fn new(insts: impl IntoIterator<Item = Instance>, spacing: i64) -> Self {
        let insts: Vec<Instance> = insts.into_iter().collect();
        let n = insts.len();
        let cols = columns_for(n);
        let rows = if n == 0 { 0 } else { (n + cols - 1) / cols };

        let mut tiles: Grid<Option<Instance>> = Grid::new(rows, cols);
        for (idx, inst) in insts.into_iter().enumerate() {
            if let Some(slot) = tiles.get_mut(idx / cols, idx % cols) {
                *slot = Some(inst);
            }
        }

        let mut row_heights = vec![0; rows];
        let mut col_widths = vec![0; cols];
        for (i, height) in row_heights.iter_mut().enumerate() {
            for (j, width) in col_widths.iter_mut().enumerate() {
                if let Some(Some(inst)) = tiles.get(i, j) {
                    let bbox = inst.bbox();
                    if !bbox.is_empty() {
                        *height = (*height).max(bbox.height());
                        *width = (*width).max(bbox.width());
                    }
                }
            }
        }

        let mut pos_ll_x = vec![0; cols];
        for j in 1..cols {
            pos_ll_x[j] = pos_ll_x[j - 1] + col_widths[j - 1] + spacing;
        }
        let mut pos_ll_y = vec![0; rows];
        for i in (0..rows.saturating_sub(1)).rev() {
            pos_ll_y[i] = pos_ll_y[i + 1] + row_heights[i + 1] + spacing;
        }

        Self {
            tiles,
            spacing,
            pos_ll_x,
            pos_ll_y,
            row_heights,
            col_widths,
        }
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.tiles.rows()
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.tiles.cols()
    }

    #[inline]
    pub fn spacing(&self) -> i64 {
        self.spacing
    }

    /// Gets the [`Rect`] representing the slot in row `i`, column `j`.
    ///
    /// # Panics
    ///
    /// This function panics if `i` or `j` are out of bounds.
    pub fn cell(&self, i: usize, j: usize) -> Rect {
        let p0 = self.pos_ll(i, j);
        let dims = Dims::new(self.col_widths[j], self.row_heights[i]);
        Rect::from_corner_and_dims(p0, dims)
    }

    /// The offset that moves the instance in row `i`, column `j` into its slot.
    ///
    /// Returns [`None`] for empty slots.
    pub fn translation(&self, i: usize, j: usize) -> Option<Point> {
        let inst = self.tiles.get(i, j)?.as_ref()?;
        let pos = self.pos_ll(i, j);
        let bbox = inst.bbox();
        Some(if bbox.is_empty() { pos } else { pos - bbox.p0 })
    }

    /// The dimensions of the whole matrix, spacing included.
    pub fn dims(&self) -> Dims {
        let gaps = |n: usize| self.spacing * n.saturating_sub(1) as i64;
        Dims::new(
            self.col_widths.iter().sum::<i64>() + gaps(self.cols()),
            self.row_heights.iter().sum::<i64>() + gaps(self.rows()),
        )
    }

    /// The region occupied by the matrix, with its lower-left corner at the origin.
    pub fn brect(&self) -> Rect {
        Rect::with_dims(self.dims())
    }

    /// Returns the packed instances, in fill order.
    pub fn placed(&self) -> Vec<Instance> {
        let mut placed = Vec::new();
        for i in 0..self.rows() {
            for j in 0..self.cols() {
                if let (Some(Some(inst)), Some(pt)) = (self.tiles.get(i, j), self.translation(i, j))
                {
                    let mut inst = inst.clone();
                    inst.translate(pt);
                    placed.push(inst);
                }
            }
        }
        placed
    }

    fn pos_ll(&self, i: usize, j: usize) -> Point {
        Point::new(self.pos_ll_x[j], self.pos_ll_y[i])
    }
}

fn columns_for(n: usize) -> usize {
    let mut cols = (n as f64).sqrt().ceil() as usize;
    while cols * cols < n {
        cols += 1;
    }
    cols.max(1)
}

impl Draw for GridPacker {
    fn draw(self) -> crate::error::Result<Group> {
        self.draw_ref()
    }
}

impl DrawRef for GridPacker {
    fn draw_ref(&self) -> crate::error::Result<Group> {
        let mut group = Group::new();
        for inst in self.placed() {
            group.add_instance(inst);
        }
        Ok(group)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use pcgeom::bbox::BoundBox;

    use super::*;
    use crate::layout::cell::{Cell, CellKey};
    use crate::layout::layers::{LayerKey, LayerSpec};

    fn block(w: i64, h: i64, offset: Point) -> Instance {
        let mut cell = Cell::new(CellKey::default());
        cell.draw_shape(
            LayerSpec::drawing(LayerKey::default()),
            Rect::from_corner_and_dims(offset, Dims::new(w, h)),
        );
        Instance::new(Arc::new(cell))
    }

    #[test]
    fn test_columns_for() {
        assert_eq!(columns_for(0), 1);
        assert_eq!(columns_for(1), 1);
        assert_eq!(columns_for(4), 2);
        assert_eq!(columns_for(5), 3);
        assert_eq!(columns_for(7), 3);
    }

    #[test]
    fn test_grid_packer_layout() {
        let insts = vec![
            block(100, 50, Point::new(-20, -30)),
            block(40, 80, Point::zero()),
            block(60, 20, Point::new(500, 500)),
        ];
        let packer = GridPacker::new(insts, 10);
        assert_eq!(packer.rows(), 2);
        assert_eq!(packer.cols(), 2);

        // Row 0 is on top of row 1.
        assert_eq!(packer.cell(1, 0), Rect::new(Point::new(0, 0), Point::new(100, 20)));
        assert_eq!(packer.cell(0, 1), Rect::new(Point::new(110, 30), Point::new(150, 110)));
        assert_eq!(packer.dims(), Dims::new(150, 110));

        let placed = packer.placed();
        assert_eq!(placed.len(), 3);
        assert_eq!(placed[0].bbox().p0, Point::new(0, 30));
        assert_eq!(placed[1].bbox().p0, Point::new(110, 30));
        assert_eq!(placed[2].bbox().p0, Point::new(0, 0));
        assert!(packer.translation(1, 1).is_none());
    }

    #[test]
    fn test_grid_packer_no_overlap() {
        let insts = (1..=10).map(|i| block(i * 10, 100 - i * 5, Point::zero()));
        let packer = GridPacker::new(insts, 7);
        let placed = packer.placed();
        let outline = packer.brect();
        for (k, a) in placed.iter().enumerate() {
            let a = a.brect().expect("instance is not empty");
            assert!(outline.contains_rect(&a));
            for b in placed.iter().skip(k + 1) {
                let b = b.brect().expect("instance is not empty");
                assert!(a.intersection(b.bbox()).is_empty());
            }
        }
    }
}
