//! `shellpoll check`: validate a configuration without running anything.

use shellpoll_core::{PollOptions, Session};

pub fn run(config_path: &str, frequency: u64) {
    let definitions = super::load_config_or_exit(config_path);
    let session = Session::new(
        &definitions,
        PollOptions {
            frequency,
            ..Default::default()
        },
    );
    let groups = session.groups();

    println!("Config: {config_path}");
    println!();
    println!(
        "Found {} metric(s) in {} group(s):",
        session.metrics().len(),
        groups.len()
    );

    for group in &groups {
        println!();
        println!("  every {}s", group.interval.as_secs());
        for metric in &group.members {
            println!("    \u{2705} {:<25} {}", metric.name(), metric.command());
        }
    }
}
