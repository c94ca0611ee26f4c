use rnoise_core::Real;

/// A point whose label sum reaches this score is noise.
pub const NOISE_SCORE_LIMIT: i32 = -4;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatchLabel {
    Matched,
    Unmatched,
}

impl MatchLabel {
    pub fn from_distance(distance: Option<f64>, threshold: Real) -> Self {
        match distance {
            Some(d) if d < threshold as f64 => MatchLabel::Matched,
            _ => MatchLabel::Unmatched,
        }
    }

    pub fn value(&self) -> i32 {
        match self {
            MatchLabel::Matched => 0,
            MatchLabel::Unmatched => -1,
        }
    }
}

/// Labels of every current point against every historical frame.
///
/// Stored column by column: column `i` holds the comparison against the
/// `i`-th historical frame, oldest first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MatchLabels {
    rows: usize,
    columns: Vec<Vec<MatchLabel>>,
}

impl MatchLabels {
    pub fn new(rows: usize) -> Self {
        Self {
            rows,
            columns: Vec::new(),
        }
    }

    pub fn push_column(&mut self, column: Vec<MatchLabel>) {
        debug_assert_eq!(column.len(), self.rows);
        self.columns.push(column);
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.columns.len()
    }

    pub fn get(&self, row: usize, col: usize) -> MatchLabel {
        self.columns[col][row]
    }

    pub fn row_sum(&self, row: usize) -> i32 {
        self.columns.iter().map(|c| c[row].value()).sum()
    }

    /// Row sums, one per current point.
    pub fn scores(&self) -> Vec<i32> {
        (0..self.rows).map(|row| self.row_sum(row)).collect()
    }

    pub fn as_values(&self) -> Vec<Vec<i32>> {
        (0..self.rows)
            .map(|row| self.columns.iter().map(|c| c[row].value()).collect())
            .collect()
    }
}

pub fn is_noise(score: i32) -> bool {
    score <= NOISE_SCORE_LIMIT
}
