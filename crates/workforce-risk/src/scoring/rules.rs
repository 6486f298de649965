//! Ordered threshold rules shared by every scorer.
//!
//! Severity buckets, AFR ladders and contamination caps all reduce to "walk a
//! list of rules in order and take the first one the observed value satisfies".

/// A rule that either admits or rejects an observed value.
pub trait ThresholdRule {
    fn admits(&self, value: f64) -> bool;
}

/// Half-open interval. Only `max` means `value < max`, only `min` means
/// `value >= min`, both mean `[min, max)`. Neither bound admits nothing.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bounds {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl Bounds {
    pub const fn new(min: Option<f64>, max: Option<f64>) -> Self {
        Self { min, max }
    }
}

impl ThresholdRule for Bounds {
    fn admits(&self, value: f64) -> bool {
        match (self.min, self.max) {
            (Some(min), Some(max)) => min <= value && value < max,
            (Some(min), None) => value >= min,
            (None, Some(max)) => value < max,
            (None, None) => false,
        }
    }
}

/// First rule admitting `value`, in list order.
pub fn first_admitting<'a, R, I>(rules: I, value: f64) -> Option<&'a R>
where
    R: ThresholdRule + 'a,
    I: IntoIterator<Item = &'a R>,
{
    first_satisfied(rules, |_| value)
}

/// First rule admitting the value `observe` reports for it. Used when each
/// rule watches a different counter, e.g. D-grade versus C-grade caps.
pub fn first_satisfied<'a, R, I, F>(rules: I, mut observe: F) -> Option<&'a R>
where
    R: ThresholdRule + 'a,
    I: IntoIterator<Item = &'a R>,
    F: FnMut(&R) -> f64,
{
    rules.into_iter().find(|rule| rule.admits(observe(rule)))
}

/// Borrowed view of `rules` ordered by `key` descending, so a ladder can be
/// scanned highest threshold first regardless of how it was configured.
pub fn descending_by<R, F>(rules: &[R], mut key: F) -> Vec<&R>
where
    F: FnMut(&R) -> f64,
{
    let mut ordered: Vec<&R> = rules.iter().collect();
    ordered.sort_by(|left, right| key(right).total_cmp(&key(left)));
    ordered
}
