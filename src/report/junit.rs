//! JUnit XML rendering.
//!
//! One `<testsuite>` per run, one `<testcase>` per executed step. Suite
//! failure and error counts follow the aggregate status, so a failed run
//! reports exactly one failure however many steps ran.

use std::fmt::Write as _;

use super::json::EXECUTION_TIME_FORMAT;
use crate::domain::{Status, TaskResult};

const CLASSNAME: &str = "gepetto.task";

pub fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn render(result: &TaskResult) -> String {
    let (failures, errors) = match result.status() {
        Some(Status::Failed) => (1, 0),
        Some(Status::Error) => (0, 1),
        _ => (0, 0),
    };
    let name = escape_xml(&result.task.name);

    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    let _ = writeln!(
        xml,
        "<testsuite name=\"{}\" tests=\"{}\" failures=\"{}\" errors=\"{}\" skipped=\"0\" hostname=\"gepetto\" time=\"{:.3}\" timestamp=\"{}\">",
        name,
        result.step_results.len(),
        failures,
        errors,
        result.execution_duration_ms as f64 / 1000.0,
        result.execution_time.format(EXECUTION_TIME_FORMAT)
    );

    xml.push_str("  <properties>\n");
    let _ = writeln!(xml, "    <property name=\"testName\" value=\"{}\"/>", name);
    let _ = writeln!(
        xml,
        "    <property name=\"testDescription\" value=\"{}\"/>",
        escape_xml(&result.task.description)
    );
    xml.push_str("  </properties>\n");

    for step in &result.step_results {
        let details = step.details.as_deref().map(escape_xml).unwrap_or_default();
        let _ = writeln!(
            xml,
            "  <testcase name=\"{}\" classname=\"{}\">",
            escape_xml(&step.step),
            CLASSNAME
        );
        match step.status {
            Status::Failed => {
                let _ = writeln!(
                    xml,
                    "    <failure message=\"Step failed\" type=\"StepFailure\">{}</failure>",
                    details
                );
            }
            Status::Error => {
                let _ = writeln!(xml, "    <error message=\"Step error\" type=\"StepError\">{}</error>", details);
            }
            Status::Success => {}
        }
        if step.details.is_some() {
            let _ = writeln!(xml, "    <system-out>{}</system-out>", details);
        }
        xml.push_str("  </testcase>\n");
    }

    if let Some(message) = &result.error_message {
        let _ = writeln!(xml, "  <system-err>{}</system-err>", escape_xml(message));
    }

    xml.push_str("</testsuite>\n");
    xml
}
