//! Replay a scripted unlock cycle against the dialog coordinator

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args as ClapArgs;
use comfy_table::{Cell, Color};

use oxcrypt_unlock::{DialogConfig, Intent};

use crate::exit_code;
use crate::output::{create_table, format_optional};
use crate::session::{run_script, SessionEvent, SessionReport, Step};

#[derive(ClapArgs)]
pub struct Args {
    /// Vault paths to register, one tab each, in order
    #[arg(value_name = "VAULT", required = true)]
    pub vaults: Vec<PathBuf>,

    /// Purpose of the cycle
    #[arg(long, default_value = "open", value_parser = parse_intent)]
    pub intent: Intent,

    /// Step to replay (repeatable): select:N, next, prev, key:CHORD, accept, reject
    #[arg(short, long = "step", value_name = "STEP", value_parser = parse_step)]
    pub steps: Vec<Step>,

    /// Emit one JSON object per event instead of a table
    #[arg(long)]
    pub json: bool,
}

fn parse_intent(s: &str) -> Result<Intent, String> {
    s.parse()
}

fn parse_step(s: &str) -> Result<Step, String> {
    s.parse().map_err(|e: crate::session::ScriptError| e.to_string())
}

/// Run the script and print the event log.
///
/// Returns the exit code: success for an accepted unlock, cancelled
/// otherwise. `quiet` leaves out the closing summary.
pub fn execute(args: &Args, config: &DialogConfig, quiet: bool) -> Result<u8> {
    let report = run_script(config, args.intent, &args.vaults, &args.steps)
        .context("Failed to replay unlock script")?;

    if args.json {
        print_json(&report, quiet)?;
    } else {
        print_table(&report, quiet);
    }

    Ok(if report.accepted {
        exit_code::SUCCESS
    } else {
        exit_code::CANCELLED
    })
}

fn print_json(report: &SessionReport, quiet: bool) -> Result<()> {
    for event in &report.events {
        println!("{}", serde_json::to_string(event)?);
    }
    if quiet {
        return Ok(());
    }
    println!(
        "{}",
        serde_json::json!({
            "event": "summary",
            "intent": report.intent,
            "accepted": report.accepted,
            "target": report.target,
            "unlocked": report.unlocked,
            "closed_without_submit": report.closed_without_submit,
        })
    );
    Ok(())
}

fn print_table(report: &SessionReport, quiet: bool) {
    let mut table = create_table();
    table.set_header(vec!["#", "Event", "Detail"]);

    for (i, event) in report.events.iter().enumerate() {
        let name = Cell::new(event.name());
        let name = match event {
            SessionEvent::Accepted => name.fg(Color::Green),
            SessionEvent::Rejected => name.fg(Color::Red),
            SessionEvent::CycleFinished { .. } => name.fg(Color::Cyan),
            _ => name,
        };
        table.add_row(vec![Cell::new(i + 1), name, Cell::new(event.detail())]);
    }
    println!("{table}");

    if quiet {
        return;
    }
    if report.closed_without_submit {
        println!("Script ended without a submission; dialog closed as rejected.");
    }
    println!("Intent:   {}", report.intent);
    println!("Target:   {}", format_optional(report.target.as_deref()));
    println!("Unlocked: {}", format_optional(report.unlocked.as_deref()));
}
