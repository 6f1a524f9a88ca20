use serde::{Deserialize, Serialize};

pub const MAX_RESULTS_RANGE: std::ops::RangeInclusive<usize> = 1..=50;

fn default_max_results() -> usize {
    16
}

fn default_scan_length() -> usize {
    16
}

fn default_max_deinflection_depth() -> usize {
    10
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupConfig {
    /// Entries returned per lookup
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    /// Longest window, in characters, tried at the cursor
    #[serde(default = "default_scan_length")]
    pub scan_length: usize,
    #[serde(default = "default_max_deinflection_depth")]
    pub max_deinflection_depth: usize,
}

impl LookupConfig {
    /// Clamp user-provided values into their supported ranges
    pub fn sanitized(mut self) -> Self {
        self.max_results = self
            .max_results
            .clamp(*MAX_RESULTS_RANGE.start(), *MAX_RESULTS_RANGE.end());
        self.scan_length = self.scan_length.max(1);
        self
    }
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            max_results: default_max_results(),
            scan_length: default_scan_length(),
            max_deinflection_depth: default_max_deinflection_depth(),
        }
    }
}
