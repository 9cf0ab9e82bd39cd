// Terminal rendering for change set summaries

use changeset_core::application::{PollExit, WorkflowSummary};
use changeset_core::domain::{ChangeSetHandle, ChangeSetStatus, ErrorRecord};
use colored::{ColoredString, Colorize};
use tabled::{Table, Tabled};

#[derive(Tabled)]
struct HandleRow {
    #[tabled(rename = "Change set")]
    id: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Results")]
    results_url: String,
    #[tabled(rename = "Errors")]
    errors_url: String,
}

#[derive(Tabled)]
struct ErrorRow {
    #[tabled(rename = "Code")]
    code: String,
    #[tabled(rename = "Message")]
    message: String,
    #[tabled(rename = "Item")]
    item: String,
}

fn colored_status(status: &ChangeSetStatus) -> ColoredString {
    match status {
        ChangeSetStatus::Done => status.as_str().green(),
        ChangeSetStatus::Failed => status.as_str().red(),
        s if s.is_in_flight() => s.as_str().yellow(),
        s => s.as_str().magenta(),
    }
}

fn present(url: &Option<String>) -> String {
    if url.is_some() { "yes" } else { "-" }.to_string()
}

pub fn print_handle(handle: &ChangeSetHandle) {
    println!("  {} {}", "Status:".bold(), colored_status(&handle.status));
    let row = HandleRow {
        id: handle.id.clone(),
        status: handle.status.to_string(),
        results_url: present(&handle.results_url),
        errors_url: present(&handle.errors_url),
    };
    println!("{}", Table::new(vec![row]));

    if let Some(url) = &handle.results_url {
        println!("  {} {}", "Results URL:".bold(), url);
    }
    if let Some(url) = &handle.errors_url {
        println!("  {} {}", "Errors URL:".bold(), url);
    }
}

pub fn print_errors(errors: &[ErrorRecord]) {
    if errors.is_empty() {
        println!("{}", "✓ No unprocessed records".green().bold());
        return;
    }

    println!("{}", format!("✗ {} unprocessed records", errors.len()).red().bold());
    let rows: Vec<ErrorRow> = errors
        .iter()
        .map(|e| ErrorRow {
            code: e.code.clone(),
            message: e.message.clone(),
            item: e
                .item
                .as_ref()
                .and_then(|item| item.get("id").or_else(|| item.get("link")))
                .and_then(|v| v.as_str())
                .unwrap_or("-")
                .to_string(),
        })
        .collect();
    println!("{}", Table::new(rows));
}

pub fn print_summary(summary: &WorkflowSummary) {
    let report = &summary.report;
    println!();

    match report.exit {
        PollExit::NotAwaitingUpload => println!(
            "{}",
            format!(
                "○ Change set {} was {} on creation, nothing uploaded",
                summary.created.id, summary.created.status
            )
            .yellow()
        ),
        PollExit::TimedOut => println!(
            "{}",
            format!("⏱ Gave up waiting after {} ms", report.elapsed_ms).yellow().bold()
        ),
        PollExit::Cancelled => println!("{}", "○ Status polling cancelled".yellow().bold()),
        PollExit::Terminal => {}
    }

    print_handle(&report.handle);
    println!(
        "  {} {} in {} ms",
        "Status checks:".bold(),
        report.status_checks,
        report.elapsed_ms
    );

    if report.is_done() {
        println!();
        println!("{}", format!("✓ {} results", summary.results.len()).green().bold());
        for result in &summary.results {
            println!("  • {}", result.identity().unwrap_or("<unnamed>"));
        }
        println!();
        print_errors(&summary.errors);
    }
}
