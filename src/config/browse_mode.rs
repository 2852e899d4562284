use std::fmt;

use clap::ValueEnum;

/// The two browsing modes are mutually exclusive: either the reviewer walks
/// pages in order, or every fetch is followed by a uniform random page jump
/// for ad-hoc sampling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum BrowseMode {
    #[default]
    Sequential,
    RandomSample,
}

impl fmt::Display for BrowseMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Sequential => write!(f, "sequential"),
            Self::RandomSample => write!(f, "random-sample"),
        }
    }
}
