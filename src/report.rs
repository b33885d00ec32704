//! JUnit XML rendering of an outcome report
//!
//! Each outcome record becomes one test case: failures carry a `<failure>`
//! element, both skip kinds a `<skipped>` element.

use std::fmt::Display;
use std::path::Path;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::error::CheckError;
use crate::outcome::{OutcomeKind, OutcomeRecord, OutcomeReport};

pub const DEFAULT_SUITE_NAME: &str = "cluster-operator-health";

/// Three-state result of one test case
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaseResult {
    Passed,
    Failed { message: String },
    Skipped { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCase {
    pub name: String,
    pub result: CaseResult,
}

impl From<&OutcomeRecord> for TestCase {
    fn from(record: &OutcomeRecord) -> Self {
        let message = record.diagnostic().unwrap_or_default().to_string();
        let result = match record.kind() {
            OutcomeKind::Passed => CaseResult::Passed,
            OutcomeKind::Failed => CaseResult::Failed { message },
            OutcomeKind::SkippedMissing | OutcomeKind::SkippedDependencyFailed => {
                CaseResult::Skipped { message }
            }
        };
        Self {
            name: format!("operator {} should be healthy", record.component()),
            result,
        }
    }
}

/// A single JUnit test suite
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JunitReport {
    pub suite_name: String,
    pub cases: Vec<TestCase>,
}

impl JunitReport {
    pub fn from_outcomes(suite_name: impl Into<String>, report: &OutcomeReport) -> Self {
        Self {
            suite_name: suite_name.into(),
            cases: report.records().iter().map(TestCase::from).collect(),
        }
    }

    pub fn failures(&self) -> usize {
        self.cases.iter().filter(|c| matches!(c.result, CaseResult::Failed { .. })).count()
    }

    pub fn skipped(&self) -> usize {
        self.cases.iter().filter(|c| matches!(c.result, CaseResult::Skipped { .. })).count()
    }

    pub fn to_xml(&self) -> Result<String, CheckError> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(report_error)?;

        let tests = self.cases.len().to_string();
        let failures = self.failures().to_string();
        let skipped = self.skipped().to_string();
        let mut suite = BytesStart::new("testsuite");
        suite.push_attribute(("name", self.suite_name.as_str()));
        suite.push_attribute(("tests", tests.as_str()));
        suite.push_attribute(("failures", failures.as_str()));
        suite.push_attribute(("skipped", skipped.as_str()));
        writer.write_event(Event::Start(suite)).map_err(report_error)?;

        for case in &self.cases {
            let mut start = BytesStart::new("testcase");
            start.push_attribute(("name", case.name.as_str()));
            start.push_attribute(("classname", self.suite_name.as_str()));

            match &case.result {
                CaseResult::Passed => {
                    writer.write_event(Event::Empty(start)).map_err(report_error)?;
                }
                CaseResult::Failed { message } => {
                    writer.write_event(Event::Start(start)).map_err(report_error)?;
                    let mut failure = BytesStart::new("failure");
                    failure.push_attribute(("message", message.as_str()));
                    writer.write_event(Event::Start(failure)).map_err(report_error)?;
                    writer
                        .write_event(Event::Text(BytesText::new(message)))
                        .map_err(report_error)?;
                    writer
                        .write_event(Event::End(BytesEnd::new("failure")))
                        .map_err(report_error)?;
                    writer
                        .write_event(Event::End(BytesEnd::new("testcase")))
                        .map_err(report_error)?;
                }
                CaseResult::Skipped { message } => {
                    writer.write_event(Event::Start(start)).map_err(report_error)?;
                    let mut skip = BytesStart::new("skipped");
                    skip.push_attribute(("message", message.as_str()));
                    writer.write_event(Event::Empty(skip)).map_err(report_error)?;
                    writer
                        .write_event(Event::End(BytesEnd::new("testcase")))
                        .map_err(report_error)?;
                }
            }
        }

        writer
            .write_event(Event::End(BytesEnd::new("testsuite")))
            .map_err(report_error)?;

        String::from_utf8(writer.into_inner()).map_err(report_error)
    }

    pub fn write_to_file(&self, path: &Path) -> Result<(), CheckError> {
        let xml = self.to_xml()?;
        std::fs::write(path, xml)?;
        Ok(())
    }
}

fn report_error(e: impl Display) -> CheckError {
    CheckError::Report(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> OutcomeReport {
        let mut report = OutcomeReport::new();
        report.push(OutcomeRecord::passed("etcd".into()));
        report.push(OutcomeRecord::failed(
            "kube-apiserver".into(),
            "Degraded=True (reason: <NodeInstaller> & friends)",
        ));
        report.push(OutcomeRecord::new(
            "console".into(),
            OutcomeKind::SkippedDependencyFailed,
            Some("dependency 'kube-apiserver' failed, skipping".to_string()),
        ));
        report.push(OutcomeRecord::new(
            "baremetal".into(),
            OutcomeKind::SkippedMissing,
            Some("component not found, skipping".to_string()),
        ));
        report
    }

    #[test]
    fn maps_records_one_to_one() {
        let junit = JunitReport::from_outcomes(DEFAULT_SUITE_NAME, &sample());
        assert_eq!(junit.cases.len(), 4);
        assert_eq!(junit.failures(), 1);
        assert_eq!(junit.skipped(), 2);
        assert_eq!(junit.cases[0].name, "operator etcd should be healthy");
        assert_eq!(junit.cases[0].result, CaseResult::Passed);
    }

    #[test]
    fn xml_has_suite_counts() {
        let xml = JunitReport::from_outcomes("co", &sample()).to_xml().unwrap();
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains(r#"<testsuite name="co" tests="4" failures="1" skipped="2">"#));
        assert!(xml.contains(r#"<testcase name="operator etcd should be healthy" classname="co"/>"#));
        assert!(xml.contains("<skipped message=\"component not found, skipping\"/>"));
        assert!(xml.trim_end().ends_with("</testsuite>"));
    }

    #[test]
    fn xml_escapes_diagnostics() {
        let xml = JunitReport::from_outcomes("co", &sample()).to_xml().unwrap();
        assert!(xml.contains("&lt;NodeInstaller&gt; &amp; friends"));
        assert!(!xml.contains("<NodeInstaller>"));
    }

    #[test]
    fn empty_report_is_valid_suite() {
        let xml = JunitReport::from_outcomes("empty", &OutcomeReport::new()).to_xml().unwrap();
        assert!(xml.contains(r#"tests="0" failures="0" skipped="0""#));
    }

    #[test]
    fn writes_file() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("junit.xml");
        JunitReport::from_outcomes("co", &sample()).write_to_file(&path).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("<failure message="));
    }
}
