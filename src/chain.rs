//! Chain context for lock-time evaluation
//!
//! Median time-past (BIP113) is the median timestamp of a block and up to
//! ten of its ancestors. It gives relative time locks a monotonic clock that
//! a single miner cannot skew.

use crate::types::{BlockHeader, Natural};

/// Number of blocks to consider for median time-past calculation
pub const MEDIAN_TIME_BLOCKS: usize = 11;

/// Scalars supplied by the block index
pub trait ChainContext {
    /// Height of the block the transaction is evaluated for
    fn height(&self) -> i64;

    /// Median time-past of the ancestor at `height`
    fn ancestor_median_time_past(&self, height: Natural) -> i64;

    /// Median time-past of the parent block
    fn parent_median_time_past(&self) -> i64 {
        let parent = self.height().saturating_sub(1).max(0) as Natural;
        self.ancestor_median_time_past(parent)
    }
}

/// Median time-past of a window of headers ordered oldest to newest
///
/// Uses the last `MEDIAN_TIME_BLOCKS` headers. With an even count the upper
/// middle value is taken. Returns 0 for an empty slice.
pub fn get_median_time_past(headers: &[BlockHeader]) -> i64 {
    if headers.is_empty() {
        return 0;
    }

    let start_idx = headers.len().saturating_sub(MEDIAN_TIME_BLOCKS);
    let mut timestamps: Vec<u64> = headers[start_idx..].iter().map(|h| h.timestamp).collect();
    timestamps.sort_unstable();

    timestamps[timestamps.len() / 2] as i64
}

/// Header chain from genesis up to and including the block being evaluated
#[derive(Debug, Clone, Default)]
pub struct HeaderChain {
    headers: Vec<BlockHeader>,
}

impl HeaderChain {
    /// `headers[i]` is the header at height `i`
    pub fn new(headers: Vec<BlockHeader>) -> Self {
        Self { headers }
    }

    pub fn push(&mut self, header: BlockHeader) {
        self.headers.push(header);
    }

    pub fn headers(&self) -> &[BlockHeader] {
        &self.headers
    }
}

impl ChainContext for HeaderChain {
    fn height(&self) -> i64 {
        self.headers.len() as i64 - 1
    }

    fn ancestor_median_time_past(&self, height: Natural) -> i64 {
        if self.headers.is_empty() {
            return 0;
        }
        let last = (height as usize).min(self.headers.len() - 1);
        get_median_time_past(&self.headers[..=last])
    }
}

impl<T: ChainContext + ?Sized> ChainContext for &T {
    fn height(&self) -> i64 {
        (**self).height()
    }

    fn ancestor_median_time_past(&self, height: Natural) -> i64 {
        (**self).ancestor_median_time_past(height)
    }

    fn parent_median_time_past(&self) -> i64 {
        (**self).parent_median_time_past()
    }
}
