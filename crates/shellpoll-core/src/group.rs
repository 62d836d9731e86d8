//! Partitioning metrics into groups that share a polling interval.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use crate::metric::Metric;

/// Metrics polled together every `interval`.
#[derive(Debug, Clone)]
pub struct Group {
    pub interval: Duration,
    pub members: Vec<Arc<Metric>>,
}

impl Group {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Member names in configuration order.
    pub fn names(&self) -> Vec<&str> {
        self.members.iter().map(|m| m.name()).collect()
    }
}

/// Group metrics by interval, shortest interval first.
///
/// Members keep the order in which they appear in `metrics`.
pub fn group_by_interval(metrics: &[Arc<Metric>]) -> Vec<Group> {
    let mut by_interval: BTreeMap<Duration, Vec<Arc<Metric>>> = BTreeMap::new();
    for metric in metrics {
        by_interval
            .entry(metric.interval())
            .or_default()
            .push(Arc::clone(metric));
    }

    by_interval
        .into_iter()
        .map(|(interval, members)| Group { interval, members })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metric(name: &str, secs: u64) -> Arc<Metric> {
        Arc::new(Metric::new(name, "true", Duration::from_secs(secs)))
    }

    #[test]
    fn test_two_intervals_make_two_groups() {
        let metrics = vec![metric("a", 10), metric("b", 30), metric("c", 10)];
        let groups = group_by_interval(&metrics);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].interval, Duration::from_secs(10));
        assert_eq!(groups[0].len(), 2);
        assert_eq!(groups[1].interval, Duration::from_secs(30));
        assert_eq!(groups[1].len(), 1);
    }

    #[test]
    fn test_members_keep_configuration_order() {
        let metrics = vec![metric("z", 5), metric("a", 5), metric("m", 5)];
        let groups = group_by_interval(&metrics);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].names(), vec!["z", "a", "m"]);
    }

    #[test]
    fn test_groups_share_metrics_with_caller() {
        let metrics = vec![metric("a", 1)];
        let groups = group_by_interval(&metrics);
        assert!(Arc::ptr_eq(&groups[0].members[0], &metrics[0]));
    }

    #[test]
    fn test_no_metrics_no_groups() {
        assert!(group_by_interval(&[]).is_empty());
    }
}
