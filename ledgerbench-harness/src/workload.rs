use crate::error::{HarnessError, Result};

/// The query shapes the harness times, one sample set each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// Point lookup on `transactionHash` (unique).
    Hash,
    /// All transfers sent from an address.
    From,
    /// All transfers received by an address.
    To,
    /// All transfers in a block.
    Block,
}

impl Category {
    pub const ALL: [Category; 4] = [Category::Hash, Category::From, Category::To, Category::Block];

    pub fn as_name(&self) -> &'static str {
        match self {
            Category::Hash => "hash",
            Category::From => "from",
            Category::To => "to",
            Category::Block => "block",
        }
    }

    /// Human-readable heading used in reports.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Hash => "Hash Query",
            Category::From => "FROM Query",
            Category::To => "TO Query",
            Category::Block => "Block Query",
        }
    }
}

/// Read mix for the explorer-style workload, as fractions of the total reads.
///
/// | Category | Default |
/// |----------|---------|
/// | Hash     |   40%   |
/// | From     |   25%   |
/// | To       |   25%   |
/// | Block    | rest (10%) |
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QueryMix {
    pub hash: f64,
    pub from: f64,
    pub to: f64,
}

impl Default for QueryMix {
    fn default() -> Self {
        Self { hash: 0.40, from: 0.25, to: 0.25 }
    }
}

impl QueryMix {
    pub fn validate(&self) -> Result<()> {
        for (name, ratio) in [("hash", self.hash), ("from", self.from), ("to", self.to)] {
            if !(0.0..=1.0).contains(&ratio) {
                return Err(HarnessError::Config(format!(
                    "{name} ratio {ratio} is outside 0.0..=1.0"
                )));
            }
        }
        if self.hash + self.from + self.to > 1.0 + f64::EPSILON {
            return Err(HarnessError::Config(
                "hash, from and to ratios add up to more than 1.0".to_string(),
            ));
        }
        Ok(())
    }

    /// Per-category query counts for `total` reads: `floor(total * ratio)` for
    /// hash, from and to; block queries take whatever remains.
    pub fn split(&self, total: usize) -> [(Category, usize); 4] {
        let share = |ratio: f64| ((total as f64 * ratio).floor() as usize).min(total);
        let hash = share(self.hash);
        let from = share(self.from).min(total - hash);
        let to = share(self.to).min(total - hash - from);
        let block = total - hash - from - to;
        [
            (Category::Hash, hash),
            (Category::From, from),
            (Category::To, to),
            (Category::Block, block),
        ]
    }
}
