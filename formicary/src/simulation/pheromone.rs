use glam::Vec2;
use shared::bearing;

use super::PHEROMONE_EPSILON;
use super::map::TileIndex;

/// Strongest detectable trail cell seen from a sampling position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Signal {
    /// Bearing from the sampling position to the centre of the cell, in [0, 2π).
    pub direction: f32,
    pub intensity: f32,
    pub tile: TileIndex,
}

/// Anything an ant can lay pheromone into.
pub trait PheromoneSink {
    fn deposit(&mut self, pos: Vec2, amount: f32);
}

/// Deposits recorded during a tick and merged into the field afterwards, so
/// every ant senses the field as it was at the start of the tick.
#[derive(Debug, Clone, Default)]
pub struct StagedDeposits {
    entries: Vec<(Vec2, f32)>,
}

impl StagedDeposits {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &(Vec2, f32)> {
        self.entries.iter()
    }

    pub fn append(&mut self, other: &mut StagedDeposits) {
        self.entries.append(&mut other.entries);
    }
}

impl PheromoneSink for StagedDeposits {
    fn deposit(&mut self, pos: Vec2, amount: f32) {
        self.entries.push((pos, amount));
    }
}

/// Decaying scalar grid, one cell per tile, stored row-major.
///
/// Every cell stays within `[0, max_intensity]`. Both buffers are allocated
/// in `new`; later operations only mutate in place.
#[derive(Debug, Clone)]
pub struct PheromoneField {
    pub width: u32,
    pub height: u32,
    tile_size: f32,
    max_intensity: f32,
    detection_threshold: f32,
    data: Vec<f32>,
    scratch: Vec<f32>,
}

impl PheromoneField {
    pub fn new(
        width: u32,
        height: u32,
        tile_size: f32,
        max_intensity: f32,
        detection_threshold: f32,
    ) -> Self {
        let len = width as usize * height as usize;
        Self {
            width,
            height,
            tile_size,
            max_intensity,
            detection_threshold,
            data: vec![0.0; len],
            scratch: vec![0.0; len],
        }
    }

    pub fn max_intensity(&self) -> f32 {
        self.max_intensity
    }

    /// Row-major view of every cell.
    pub fn cells(&self) -> &[f32] {
        &self.data
    }

    pub fn total_intensity(&self) -> f32 {
        self.data.iter().sum()
    }

    #[inline(always)]
    fn idx(&self, col: u32, row: u32) -> usize {
        row as usize * self.width as usize + col as usize
    }

    /// Cell containing `pos`, or `None` outside the field. Positions on the
    /// far edge belong to the last row/column.
    pub fn tile_of(&self, pos: Vec2) -> Option<TileIndex> {
        let col = Self::axis_cell(pos.x, self.tile_size, self.width)?;
        let row = Self::axis_cell(pos.y, self.tile_size, self.height)?;
        Some(TileIndex::new(col, row))
    }

    #[inline(always)]
    fn axis_cell(coord: f32, tile_size: f32, cells: u32) -> Option<u32> {
        if !coord.is_finite() || coord < 0.0 || cells == 0 {
            return None;
        }
        let cell = (coord / tile_size).floor();
        if cell < cells as f32 {
            Some(cell as u32)
        } else if coord <= cells as f32 * tile_size {
            Some(cells - 1)
        } else {
            None
        }
    }

    pub fn intensity(&self, tile: TileIndex) -> Option<f32> {
        if tile.col < self.width && tile.row < self.height {
            Some(self.data[self.idx(tile.col, tile.row)])
        } else {
            None
        }
    }

    /// Intensity of the cell containing `pos`; zero outside the field.
    pub fn intensity_at(&self, pos: Vec2) -> f32 {
        self.tile_of(pos)
            .and_then(|tile| self.intensity(tile))
            .unwrap_or(0.0)
    }

    #[inline(always)]
    fn lay(&mut self, index: usize, amount: f32) {
        let cell = &mut self.data[index];
        *cell = (*cell + amount).min(self.max_intensity);
    }

    /// Add `amount` to the cell containing `pos`, clamped to the maximum.
    /// Positions outside the field and non-positive amounts are ignored.
    pub fn deposit(&mut self, pos: Vec2, amount: f32) {
        if !(amount > 0.0) {
            return;
        }
        if let Some(tile) = self.tile_of(pos) {
            let index = self.idx(tile.col, tile.row);
            self.lay(index, amount);
        }
    }

    /// Merge staged deposits. Addition is commutative, so merge order does not matter.
    pub fn apply(&mut self, staged: &StagedDeposits) {
        for &(pos, amount) in staged.iter() {
            self.deposit(pos, amount);
        }
    }

    /// Strongest detectable cell overlapping the circle of `radius` around
    /// `pos`, excluding the cell `pos` itself lies in.
    ///
    /// Ties on intensity go to the cell nearest to `pos`, then to the lowest
    /// tile index. Returns `None` when no candidate reaches the detection
    /// threshold or `pos` is outside the field.
    pub fn sample(&self, pos: Vec2, radius: f32) -> Option<Signal> {
        let origin = self.tile_of(pos)?;
        if !(radius > 0.0) {
            return None;
        }

        let ts = self.tile_size;
        let min_col = ((pos.x - radius) / ts).floor().max(0.0) as u32;
        let max_col = (((pos.x + radius) / ts).floor() as u32).min(self.width - 1);
        let min_row = ((pos.y - radius) / ts).floor().max(0.0) as u32;
        let max_row = (((pos.y + radius) / ts).floor() as u32).min(self.height - 1);

        let mut best: Option<(TileIndex, f32, f32)> = None; // tile, intensity, distance
        for col in min_col..=max_col {
            for row in min_row..=max_row {
                let tile = TileIndex::new(col, row);
                if tile == origin {
                    continue;
                }
                let intensity = self.data[self.idx(col, row)];
                if intensity <= 0.0 || intensity < self.detection_threshold {
                    continue;
                }

                // Nearest point of the cell to `pos`
                let left = col as f32 * ts;
                let top = row as f32 * ts;
                let nearest = Vec2::new(pos.x.clamp(left, left + ts), pos.y.clamp(top, top + ts));
                let distance = nearest.distance(pos);
                if distance > radius {
                    continue;
                }

                let better = match best {
                    None => true,
                    Some((best_tile, best_intensity, best_distance)) => {
                        intensity > best_intensity
                            || (intensity == best_intensity
                                && (distance < best_distance
                                    || (distance == best_distance && tile < best_tile)))
                    }
                };
                if better {
                    best = Some((tile, intensity, distance));
                }
            }
        }

        best.map(|(tile, intensity, _)| {
            let centre_x = (tile.col as f32 + 0.5) * ts;
            let centre_y = (tile.row as f32 + 0.5) * ts;
            Signal {
                direction: bearing(pos.x, pos.y, centre_x, centre_y),
                intensity,
                tile,
            }
        })
    }

    /// Multiply every cell by `factor`. Values falling below the epsilon snap to zero.
    pub fn decay(&mut self, factor: f32) {
        if !factor.is_finite() {
            return;
        }
        let factor = factor.clamp(0.0, 1.0);
        for cell in self.data.iter_mut() {
            if *cell > 0.0 {
                *cell *= factor;
            }
            if *cell < PHEROMONE_EPSILON {
                *cell = 0.0;
            }
        }
    }

    /// Spread `rate` of every cell evenly over its in-bounds 8-neighbourhood.
    /// Total intensity is conserved up to the maximum clamp.
    pub fn diffuse(&mut self, rate: f32) {
        if !(rate > 0.0) {
            return;
        }
        let rate = rate.min(1.0);
        let width = self.width as i64;
        let height = self.height as i64;

        self.scratch.fill(0.0);
        for row in 0..height {
            for col in 0..width {
                let value = self.data[(row * width + col) as usize];
                if value <= 0.0 {
                    continue;
                }

                let mut neighbours = 0;
                for dy in -1..=1 {
                    for dx in -1..=1 {
                        let (nx, ny) = (col + dx, row + dy);
                        if (dx, dy) != (0, 0) && nx >= 0 && ny >= 0 && nx < width && ny < height {
                            neighbours += 1;
                        }
                    }
                }
                if neighbours == 0 {
                    self.scratch[(row * width + col) as usize] += value;
                    continue;
                }

                let share = value * rate / neighbours as f32;
                self.scratch[(row * width + col) as usize] += value * (1.0 - rate);
                for dy in -1..=1 {
                    for dx in -1..=1 {
                        let (nx, ny) = (col + dx, row + dy);
                        if (dx, dy) != (0, 0) && nx >= 0 && ny >= 0 && nx < width && ny < height {
                            self.scratch[(ny * width + nx) as usize] += share;
                        }
                    }
                }
            }
        }

        let max = self.max_intensity;
        for cell in self.scratch.iter_mut() {
            *cell = cell.min(max);
        }
        std::mem::swap(&mut self.data, &mut self.scratch);
    }

    /// Reset every cell to zero.
    pub fn clear(&mut self) {
        self.data.fill(0.0);
    }
}

impl PheromoneSink for PheromoneField {
    fn deposit(&mut self, pos: Vec2, amount: f32) {
        PheromoneField::deposit(self, pos, amount);
    }
}
