//! Configuration types for walkers

/// Configuration for a walk.
#[derive(Debug, Clone, Default)]
pub struct WalkerConfig {
    /// Maximum number of nodes processed at the same time.
    /// 0 or negative = unlimited
    /// 1 = one node at a time
    /// N = at most N nodes at a time
    pub max_parallel: isize,
    /// Expected number of results, used to size the result buffer.
    pub buffer_size: usize,
}

impl WalkerConfig {
    /// The concurrency limit, or `None` when unlimited.
    pub fn limit(&self) -> Option<usize> {
        usize::try_from(self.max_parallel).ok().filter(|&n| n > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit() {
        let mut config = WalkerConfig::default();
        assert_eq!(config.limit(), None);

        config.max_parallel = -3;
        assert_eq!(config.limit(), None);

        config.max_parallel = 1;
        assert_eq!(config.limit(), Some(1));

        config.max_parallel = 8;
        assert_eq!(config.limit(), Some(8));
    }
}
