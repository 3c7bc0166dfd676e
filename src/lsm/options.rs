use crate::error::{Error, Result};

/// Tuning knobs for [`LsmIndex`](crate::lsm::LsmIndex).
///
/// Defaults: delegate new keys once a sorted layer holds 100 keys (or 1% of
/// the whole chain, whichever is larger), and compact a layer when everything
/// below it exceeds 5% of its own key count.
#[derive(Debug, Clone, PartialEq)]
pub struct Options {
    /// Minimum key count a sorted layer must reach before new keys are
    /// pushed into a fresh inner layer instead of invalidating its sort.
    pub min_delegation_size: usize,
    /// Inner-to-local key count ratio above which a range scan first folds
    /// the inner layers back into the local one.
    pub compaction_ratio: f64,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            min_delegation_size: 100,
            compaction_ratio: 0.05,
        }
    }
}

impl Options {
    pub fn with_min_delegation_size(mut self, size: usize) -> Self {
        self.min_delegation_size = size;
        self
    }

    pub fn with_compaction_ratio(mut self, ratio: f64) -> Self {
        self.compaction_ratio = ratio;
        self
    }

    /// Reject settings that would make the layer policy degenerate.
    pub fn validate(&self) -> Result<()> {
        if self.min_delegation_size == 0 {
            return Err(Error::InvalidOptions(
                "min_delegation_size must be at least 1".to_string(),
            ));
        }
        if !self.compaction_ratio.is_finite() || self.compaction_ratio < 0.0 {
            return Err(Error::InvalidOptions(format!(
                "compaction_ratio must be finite and non-negative, got {}",
                self.compaction_ratio
            )));
        }
        Ok(())
    }

    /// Key count a sorted layer needs before it starts delegating, given the
    /// number of keys in the whole chain.
    pub(crate) fn delegation_threshold(&self, total_keys: usize) -> usize {
        self.min_delegation_size.max(total_keys / 100)
    }

    /// Whether `inner_keys` below a layer of `local_keys` warrants compaction.
    pub(crate) fn should_compact(&self, local_keys: usize, inner_keys: usize) -> bool {
        inner_keys as f64 > self.compaction_ratio * local_keys as f64
    }
}
