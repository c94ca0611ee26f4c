use rnoise_core::frame::Frame;

use crate::config::CoordinateSubset;

/// Pairwise distances between the points of two frames.
///
/// Row `m` belongs to point `m` of the current frame, column `n` to point `n`
/// of the historical frame.
#[derive(Debug, Clone)]
pub struct CostMatrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl CostMatrix {
    pub fn between(current: &Frame, history: &Frame, subset: CoordinateSubset) -> Self {
        let mut data = Vec::with_capacity(current.len() * history.len());
        for m in current.iter() {
            for n in history.iter() {
                data.push(subset.distance(m, n));
            }
        }
        Self {
            rows: current.len(),
            cols: history.len(),
            data,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.cols + col]
    }

    pub fn row(&self, row: usize) -> &[f64] {
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    /// Smallest distance in `row`, `None` when the matrix has no columns.
    ///
    /// Classification answers this through `NeighborGrid`; the full scan is
    /// kept as the reference the grid is checked against.
    #[cfg(test)]
    pub fn row_minimum(&self, row: usize) -> Option<f64> {
        self.row(row).iter().copied().min_by(|a, b| a.total_cmp(b))
    }

    /// Minimum total cost one-to-one pairing of rows and columns.
    ///
    /// Returns the assigned column for every row; with more rows than columns
    /// the surplus rows stay unassigned. Non-finite entries are priced like
    /// padding, so they are only chosen when nothing else is left.
    pub fn assign(&self) -> Vec<Option<usize>> {
        if self.rows == 0 || self.cols == 0 {
            return vec![None; self.rows];
        }

        // shortest augmenting path with row/column potentials, on a square
        // matrix padded with a cost larger than any real entry
        let n = self.rows.max(self.cols);
        let largest = self
            .data
            .iter()
            .filter(|c| c.is_finite())
            .fold(0.0f64, |acc, &c| acc.max(c));
        let padding = (largest * n as f64 + 1.0).min(f64::MAX);
        let cost = |i: usize, j: usize| -> f64 {
            if i < self.rows && j < self.cols {
                let c = self.get(i, j);
                if c.is_finite() {
                    c
                } else {
                    padding
                }
            } else {
                padding
            }
        };

        // 1-based; column 0 is the virtual source of each augmentation
        let mut row_potential = vec![0.0f64; n + 1];
        let mut col_potential = vec![0.0f64; n + 1];
        let mut row_of_col = vec![0usize; n + 1];
        let mut previous_col = vec![0usize; n + 1];

        for row in 1..=n {
            row_of_col[0] = row;
            let mut col = 0usize;
            let mut slack = vec![f64::INFINITY; n + 1];
            let mut visited = vec![false; n + 1];

            loop {
                visited[col] = true;
                let current_row = row_of_col[col];
                let mut delta = f64::INFINITY;
                let mut next_col = 0usize;

                for j in 1..=n {
                    if visited[j] {
                        continue;
                    }
                    let reduced =
                        cost(current_row - 1, j - 1) - row_potential[current_row] - col_potential[j];
                    if reduced < slack[j] {
                        slack[j] = reduced;
                        previous_col[j] = col;
                    }
                    if slack[j] < delta {
                        delta = slack[j];
                        next_col = j;
                    }
                }

                // potentials ran out of range; keep the pairs found so far
                if !delta.is_finite() {
                    log::warn!(
                        "assignment stopped at row {} of {}: non-finite reduced cost",
                        row,
                        self.rows
                    );
                    return self.assignment_from(&row_of_col);
                }

                for j in 0..=n {
                    if visited[j] {
                        row_potential[row_of_col[j]] += delta;
                        col_potential[j] -= delta;
                    } else {
                        slack[j] -= delta;
                    }
                }

                col = next_col;
                if row_of_col[col] == 0 {
                    break;
                }
            }

            while col != 0 {
                let previous = previous_col[col];
                row_of_col[col] = row_of_col[previous];
                col = previous;
            }
        }

        self.assignment_from(&row_of_col)
    }

    fn assignment_from(&self, row_of_col: &[usize]) -> Vec<Option<usize>> {
        let mut assignment = vec![None; self.rows];
        for (j, &row) in row_of_col.iter().enumerate().skip(1) {
            if row != 0 && row <= self.rows && j <= self.cols {
                assignment[row - 1] = Some(j - 1);
            }
        }
        assignment
    }
}
