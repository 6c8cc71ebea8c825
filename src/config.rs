use std::time::Duration;

use crate::loader::ScanLimits;
use crate::source::RetryPolicy;

pub const DEFAULT_CATEGORY: &str = "events";
pub const DEFAULT_BATCH_SIZE: usize = 3;
pub const DEFAULT_EXT: &str = "md";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
const BASE_BACKOFF_MS: u64 = 500;
/// Retries beyond this only repeat the capped backoff.
pub const MAX_RETRIES: u32 = 10;

/// Where documents come from and how hard to try.
#[derive(Debug, Clone)]
pub struct Config {
    pub source: String,
    pub ext: String,
    pub timeout: Duration,
    pub retry: RetryPolicy,
    pub limits: ScanLimits,
}

impl Config {
    pub fn new(
        source: String,
        ext: String,
        timeout_secs: u64,
        retries: u32,
        max_documents: Option<u32>,
    ) -> Self {
        Self {
            source,
            ext: ext.trim_start_matches('.').to_string(),
            timeout: Duration::from_secs(timeout_secs),
            retry: RetryPolicy {
                max_retries: retries.min(MAX_RETRIES),
                base_backoff_ms: BASE_BACKOFF_MS,
            },
            limits: ScanLimits { max_documents },
        }
    }
}

/// Requested categories in first-seen order, or the default one.
pub fn categories(requested: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for name in requested {
        let name = name.trim().trim_matches('/').to_string();
        if !name.is_empty() && !out.contains(&name) {
            out.push(name);
        }
    }
    if out.is_empty() {
        out.push(DEFAULT_CATEGORY.to_string());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_dedup_and_default() {
        assert_eq!(categories(vec![]), vec!["events"]);
        assert_eq!(
            categories(vec!["news/".into(), "events".into(), "news".into(), " ".into()]),
            vec!["news", "events"]
        );
    }

    #[test]
    fn extension_dot_is_optional() {
        let cfg = Config::new(".".into(), ".md".into(), 5, 2, Some(10));
        assert_eq!(cfg.ext, "md");
        assert_eq!(cfg.timeout, Duration::from_secs(5));
        assert_eq!(cfg.retry.max_retries, 2);
        assert_eq!(cfg.limits.max_documents, Some(10));
    }

    #[test]
    fn retries_are_clamped() {
        let cfg = Config::new(".".into(), "md".into(), 5, u32::MAX, None);
        assert_eq!(cfg.retry.max_retries, MAX_RETRIES);
    }
}
