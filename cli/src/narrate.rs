//! Plain-text rendering of a [`RunReport`].

use std::fmt;

use silently_driver::{ExpectedOutcome, Observation, RunReport, ScenarioRecord};

const RULE: &str = "============";

/// Displays a report as one line per scenario, grouped by phase.
pub struct Narration<'a>(pub &'a RunReport);

impl fmt::Display for Narration<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.0;

        for phase in &report.phases {
            let mut records = report.records_in(*phase).peekable();
            if records.peek().is_none() {
                continue;
            }
            writeln!(f, "{RULE} {}", phase.title())?;
            for record in records {
                write_record(f, record)?;
            }
        }

        if !report.orphans.is_empty() {
            writeln!(
                f,
                "{RULE} Orphaned failures (policy: {})",
                report.orphan_policy.as_str()
            )?;
            for orphan in &report.orphans {
                writeln!(f, "  {} {}: {}", orphan.id, orphan.label, orphan.failure)?;
            }
        }

        let passed = report.records.iter().filter(|record| record.passed).count();
        write!(
            f,
            "{RULE} {passed}/{} scenarios behaved as documented",
            report.records.len()
        )?;
        if report.escalated {
            write!(f, "; an orphaned failure was escalated")?;
        }
        writeln!(f)
    }
}

fn write_record(f: &mut fmt::Formatter<'_>, record: &ScenarioRecord) -> fmt::Result {
    let mark = if record.passed { "[ok]  " } else { "[FAIL]" };
    write!(
        f,
        "{mark} {}: {} -> {}",
        record.scenario.name(),
        record.scenario.description(),
        ObservedText(&record.observed)
    )?;
    if let Some(failure) = &record.suppressed {
        write!(f, " (suppressed: {failure})")?;
    }
    if !record.passed {
        write!(f, " [expected {}]", ExpectedText(record.expected.outcome))?;
    }
    writeln!(f)
}

struct ObservedText<'a>(&'a Observation);

impl fmt::Display for ObservedText<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Observation::Value(value) => write!(f, "{value}"),
            Observation::Unit => f.write_str("done"),
            Observation::Failed(failure) => write!(f, "raised {failure}"),
            Observation::Dropped => f.write_str("dropped unobserved"),
        }
    }
}

struct ExpectedText(ExpectedOutcome);

impl fmt::Display for ExpectedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            ExpectedOutcome::Value(value) => write!(f, "{value}"),
            ExpectedOutcome::Unit => f.write_str("done"),
            ExpectedOutcome::Propagates(kind) => write!(f, "raises {kind}"),
            ExpectedOutcome::Orphaned => f.write_str("dropped unobserved"),
        }
    }
}
