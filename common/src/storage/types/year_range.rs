use serde::{Deserialize, Serialize};

/// Inclusive year interval. Open bounds and unknown years always pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearRange {
    pub from: Option<i32>,
    pub to: Option<i32>,
}

impl YearRange {
    pub fn new(from: Option<i32>, to: Option<i32>) -> Self {
        Self { from, to }
    }

    pub fn contains(&self, year: Option<i32>) -> bool {
        let Some(year) = year else {
            return true;
        };
        self.from.map_or(true, |from| year >= from) && self.to.map_or(true, |to| year <= to)
    }

    /// Fills open bounds from the corpus year bounds.
    pub fn with_defaults(self, bounds: Option<(i32, i32)>) -> Self {
        match bounds {
            Some((lo, hi)) => Self {
                from: self.from.or(Some(lo)),
                to: self.to.or(Some(hi)),
            },
            None => self,
        }
    }
}
