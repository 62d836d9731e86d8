//! `shellpoll poll`: run every configured probe on its schedule.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use shellpoll_core::{PollOptions, Session, SessionOutcome, ShellRunner};
use tokio::sync::watch;

use super::describe_groups;

/// Arguments for the poll command.
pub struct PollCommandConfig<'a> {
    pub config_path: &'a str,
    pub frequency: u64,
    pub samples: Option<u32>,
    pub out_path: Option<&'a str>,
    pub verbose: bool,
}

/// Run the poll command.
pub fn run(cfg: PollCommandConfig<'_>) {
    let definitions = super::load_config_or_exit(cfg.config_path);

    let options = PollOptions {
        frequency: cfg.frequency,
        samples: cfg.samples,
        verbose: cfg.verbose,
        out: cfg.out_path.map(PathBuf::from),
    };
    let session = Session::new(&definitions, options);

    // Set up Ctrl+C handler. Every press lands in the same watch slot, so a
    // second press while finalizing has nothing left to trigger.
    let (interrupt_tx, interrupt_rx) = watch::channel(false);
    if let Err(e) = ctrlc::set_handler(move || {
        interrupt_tx.send_replace(true);
    }) {
        eprintln!("Error setting Ctrl+C handler: {e}");
        std::process::exit(1);
    }

    print_banner(&session, cfg.config_path);

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error starting runtime: {e}");
            std::process::exit(1);
        }
    };
    let outcome = rt.block_on(session.run(Arc::new(ShellRunner), interrupt_rx));

    let mut exit_code = 0;
    if let SessionOutcome::Failed(e) = &outcome {
        eprintln!("Error: {e}");
        exit_code = 1;
    }

    let mut stdout = std::io::stdout().lock();
    if !finish(&session, &outcome, &mut stdout) {
        exit_code = 1;
    }
    drop(stdout);

    // Probes abandoned by an interrupt keep running; don't wait for them.
    rt.shutdown_background();
    std::process::exit(exit_code);
}

/// Print the summary and where the snapshot went. Returns `false` when the
/// snapshot could not be written.
fn finish<W: Write>(session: &Session, outcome: &SessionOutcome, console: &mut W) -> bool {
    let mut written = true;
    if let Some(done) = session.finalize(outcome, &mut *console) {
        match done.snapshot {
            Some(Ok(path)) => {
                if let Err(e) = writeln!(console, "\nWrote results to {}", path.display()) {
                    log::warn!("could not print output path: {e}");
                }
            }
            Some(Err(e)) => {
                eprintln!("Error: {e}");
                written = false;
            }
            None => {}
        }
    }
    if let Err(e) = console.flush() {
        log::warn!("could not flush stdout: {e}");
    }
    written
}

fn print_banner(session: &Session, config_path: &str) {
    let options = session.options();
    println!("Starting run...");
    println!("  Config:    {config_path}");
    println!("  Metrics:   {}", session.metrics().len());
    println!("  Groups:    {}", describe_groups(&session.groups()));
    match options.samples {
        Some(n) => println!("  Samples:   {n} per group"),
        None => println!("  Samples:   until Ctrl+C"),
    }
    match &options.out {
        Some(path) => println!("  Output:    {}", path.display()),
        None => println!("  Output:    none"),
    }
    println!(
        "  Verbose:   {}",
        if options.verbose { "enabled" } else { "disabled" }
    );
    println!();
    log::debug!("default frequency {}s", options.frequency);
}
