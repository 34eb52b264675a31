// Copyright 2025 NeuraEdge Contributors
// SPDX-License-Identifier: Apache-2.0

//! Row-major 2D mesh topology with dimension-order routing.

use serde::Serialize;

use crate::error::{Result, RoutingError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MeshNetwork {
    rows: usize,
    cols: usize,
}

impl MeshNetwork {
    pub fn new(rows: usize, cols: usize) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(RoutingError::InvalidMesh { rows, cols });
        }
        Ok(Self { rows, cols })
    }

    /// Nearest-to-square grid holding exactly `num_tiles` tiles.
    ///
    /// The column count is the smallest divisor of `num_tiles` that is at
    /// least `ceil(sqrt(num_tiles))`, so 4 -> 2x2, 6 -> 2x3, 7 -> 1x7.
    pub fn for_tiles(num_tiles: usize) -> Result<Self> {
        if num_tiles == 0 {
            return Err(RoutingError::InvalidMesh { rows: 0, cols: 0 });
        }
        let mut min_cols = 1;
        while min_cols * min_cols < num_tiles {
            min_cols += 1;
        }
        let cols = (min_cols..=num_tiles)
            .find(|c| num_tiles % c == 0)
            .unwrap_or(num_tiles);
        Self::new(num_tiles / cols, cols)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn num_tiles(&self) -> usize {
        self.rows * self.cols
    }

    pub fn contains(&self, tile_id: usize) -> bool {
        tile_id < self.num_tiles()
    }

    fn check(&self, tile_id: usize) -> Result<()> {
        if !self.contains(tile_id) {
            return Err(RoutingError::InvalidTile {
                tile_id,
                num_tiles: self.num_tiles(),
            });
        }
        Ok(())
    }

    /// `(row, col)` of a tile id
    pub fn coordinates(&self, tile_id: usize) -> (usize, usize) {
        (tile_id / self.cols, tile_id % self.cols)
    }

    pub fn tile_id(&self, row: usize, col: usize) -> usize {
        row * self.cols + col
    }

    /// Orthogonal neighbours in N, S, E, W order, omitting grid edges.
    pub fn neighbors(&self, tile_id: usize) -> Result<Vec<usize>> {
        self.check(tile_id)?;
        let (row, col) = self.coordinates(tile_id);
        let mut out = Vec::with_capacity(4);
        if row > 0 {
            out.push(self.tile_id(row - 1, col));
        }
        if row + 1 < self.rows {
            out.push(self.tile_id(row + 1, col));
        }
        if col + 1 < self.cols {
            out.push(self.tile_id(row, col + 1));
        }
        if col > 0 {
            out.push(self.tile_id(row, col - 1));
        }
        Ok(out)
    }

    pub fn manhattan_distance(&self, a: usize, b: usize) -> usize {
        let (ra, ca) = self.coordinates(a);
        let (rb, cb) = self.coordinates(b);
        ra.abs_diff(rb) + ca.abs_diff(cb)
    }

    /// Dimension-order path: rows first, then columns. Includes both ends.
    pub fn route_path(&self, source: usize, dest: usize) -> Result<Vec<usize>> {
        self.check(source)?;
        self.check(dest)?;
        let (mut row, mut col) = self.coordinates(source);
        let (dst_row, dst_col) = self.coordinates(dest);

        let mut path = Vec::with_capacity(self.manhattan_distance(source, dest) + 1);
        path.push(source);
        while row != dst_row {
            if row < dst_row {
                row += 1;
            } else {
                row -= 1;
            }
            path.push(self.tile_id(row, col));
        }
        while col != dst_col {
            if col < dst_col {
                col += 1;
            } else {
                col -= 1;
            }
            path.push(self.tile_id(row, col));
        }
        Ok(path)
    }

    /// Links traversed between two tiles
    pub fn hop_count(&self, source: usize, dest: usize) -> Result<usize> {
        Ok(self.route_path(source, dest)?.len() - 1)
    }
}
