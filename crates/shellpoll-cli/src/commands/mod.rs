pub mod check;
pub mod poll;
pub mod summarize;

use std::path::Path;

use shellpoll_core::{Group, MetricDefinition, load_definitions};

/// Load and validate the metric definitions, exiting with status 1 on failure.
pub fn load_config_or_exit(path: &str) -> Vec<MetricDefinition> {
    match load_definitions(Path::new(path)) {
        Ok(definitions) => definitions,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

/// One-line description of the groups, e.g. `every 10s (2), every 30s (1)`.
pub fn describe_groups(groups: &[Group]) -> String {
    if groups.is_empty() {
        return "none".to_string();
    }
    groups
        .iter()
        .map(|g| format!("every {}s ({})", g.interval.as_secs(), g.len()))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use shellpoll_core::{Metric, group_by_interval};

    use super::*;

    fn metric(name: &str, secs: u64) -> Arc<Metric> {
        Arc::new(Metric::new(name, "true", Duration::from_secs(secs)))
    }

    #[test]
    fn test_describe_groups() {
        let groups = group_by_interval(&[metric("a", 10), metric("b", 30), metric("c", 10)]);
        assert_eq!(describe_groups(&groups), "every 10s (2), every 30s (1)");
    }

    #[test]
    fn test_describe_no_groups() {
        assert_eq!(describe_groups(&[]), "none");
    }
}
