//! Output formatting for batch results

use colorful::Colorful;

use crate::core::BatchSummary;

/// Plain-text summary of a batch run
pub fn format_summary(summary: &BatchSummary, verbose: bool) -> String {
    let mut output = String::new();

    output.push_str(&format!("{} track(s) in batch\n", summary.total()));
    output.push_str(&format!("  processed: {}\n", summary.processed.len()));
    output.push_str(&format!("  skipped:   {}\n", summary.skipped.len()));
    output.push_str(&format!("  failed:    {}\n", summary.failed.len()));

    if verbose {
        for track in &summary.skipped {
            output.push_str(&format!("    - {} (record kept)\n", track));
        }
    }

    if !summary.failed.is_empty() {
        output.push_str("\n  Failed tracks:\n");
        for (track, err) in &summary.failed {
            output.push_str(&format!("    ✗ {} [{}]: {}\n", track, err.kind(), err));
        }
    }

    output
}

/// Print the summary, colored by outcome
pub fn print_summary(summary: &BatchSummary, verbose: bool) {
    let text = format_summary(summary, verbose);
    if summary.is_complete() {
        println!("{}", text.green());
    } else {
        println!("{}", text.yellow());
    }
}
