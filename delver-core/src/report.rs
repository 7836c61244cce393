//! Final report assembly.

use crate::state::ResearchState;
use std::collections::HashSet;

/// Assemble the final report from a finished run's state.
///
/// Walks `sources_gathered` in accumulation order, splits each block into
/// lines, and deduplicates lines globally by exact match (first occurrence
/// wins, order preserved, blank lines skipped). The unique citation lines
/// are appended to the running summary. Pure: calling it twice on the same
/// state yields byte-identical output, and no backend is invoked.
pub fn finalize_summary(state: &ResearchState) -> String {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut unique_lines: Vec<&str> = Vec::new();

    for block in &state.sources_gathered {
        for line in block.lines() {
            if !line.trim().is_empty() && seen.insert(line) {
                unique_lines.push(line);
            }
        }
    }

    format!(
        "## Summary\n{}\n\n ### Sources:\n{}",
        state.running_summary,
        unique_lines.join("\n")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn state_with(sources: &[&str], summary: &str) -> ResearchState {
        let mut state = ResearchState::new("topic");
        state.sources_gathered = sources.iter().map(|s| s.to_string()).collect();
        state.running_summary = summary.to_string();
        state
    }

    #[test]
    fn test_dedup_across_iterations_preserves_order() {
        let state = state_with(&["* A : u1\n* B : u2", "* A : u1\n* C : u3"], "sum");
        let report = finalize_summary(&state);
        let sources_block = report.split(" ### Sources:\n").nth(1).unwrap();
        assert_eq!(sources_block, "* A : u1\n* B : u2\n* C : u3");
        assert_eq!(report.matches("* A : u1").count(), 1);
    }

    #[test]
    fn test_report_shape() {
        let state = state_with(&["* A : u1"], "the summary");
        let report = finalize_summary(&state);
        assert_eq!(report, "## Summary\nthe summary\n\n ### Sources:\n* A : u1");
    }

    #[test]
    fn test_blank_lines_skipped() {
        let state = state_with(&["* A : u1\n\n* B : u2", "   \n* C : u3"], "s");
        let report = finalize_summary(&state);
        let sources_block = report.split(" ### Sources:\n").nth(1).unwrap();
        assert_eq!(sources_block, "* A : u1\n* B : u2\n* C : u3");
    }

    #[test]
    fn test_pure_and_idempotent() {
        let state = state_with(&["* A : u1\n* B : u2", "* B : u2"], "stable");
        assert_eq!(finalize_summary(&state), finalize_summary(&state));
    }

    #[test]
    fn test_empty_sources() {
        let state = state_with(&[], "only a summary");
        let report = finalize_summary(&state);
        assert_eq!(report, "## Summary\nonly a summary\n\n ### Sources:\n");
    }
}
