//! Fixture suites: cases of input and expected output, run against a handler.
//!
//! A suite file is a JSON array:
//!
//! ```json
//! [{"name": "ada", "input": {"name": "Ada"}, "outputExpected": {"greeting": "Hello Ada!"}}]
//! ```
//!
//! `outputExpected` may also be `"@path/to/file.json"`, resolved against the
//! directory of the suite file. A case carrying an `error` object is reported
//! as errored without being run. `type` is optional; only `EXACT_MATCH` is
//! understood.

use std::path::Path;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::errors::{Result, SuiteError};
use crate::record::Record;

const INPUT_KEY: &str = "input";
const EXPECTED_KEY: &str = "outputExpected";
const TYPE_KEY: &str = "type";
const ERROR_KEY: &str = "error";
const EXACT_MATCH: &str = "EXACT_MATCH";

#[derive(Debug, Clone)]
pub struct Suite {
    entries: Vec<SuiteEntry>,
}

#[derive(Debug, Clone)]
enum SuiteEntry {
    Case(Case),
    /// An element that could not be read as a case. Reported, never run.
    Malformed { name: Option<String>, error: String },
}

#[derive(Debug, Clone)]
pub struct Case {
    pub name: Option<String>,
    pub input: Record,
    pub expected: Record,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum CaseOutcome {
    Passed,
    Failed {
        #[serde(rename = "outputReturned")]
        returned: Record,
        #[serde(rename = "outputExpected")]
        expected: Record,
    },
    Errored {
        message: String,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct CaseReport {
    pub index: usize,
    pub name: Option<String>,
    #[serde(flatten)]
    pub outcome: CaseOutcome,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SuiteReport {
    pub cases: Vec<CaseReport>,
}

impl Suite {
    /// Parses a suite; `@` references resolve against the working directory.
    pub fn from_json(content: &str) -> Result<Self> {
        Self::parse(content, Path::new("."))
    }

    pub fn from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let base_dir = Path::new(path)
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        Self::parse(&content, base_dir)
    }

    fn parse(content: &str, base_dir: &Path) -> Result<Self> {
        let Value::Array(items) = serde_json::from_str::<Value>(content)? else {
            return Err(SuiteError::NotAnArray.into());
        };
        let entries = items
            .into_iter()
            .enumerate()
            .map(|(index, item)| match parse_case(index, item, base_dir) {
                Ok(case) => SuiteEntry::Case(case),
                Err((name, error)) => SuiteEntry::Malformed {
                    name,
                    error: error.to_string(),
                },
            })
            .collect();
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn run<F>(&self, handler: F) -> SuiteReport
    where
        F: Fn(&Record) -> Record,
    {
        let cases = self
            .entries
            .iter()
            .enumerate()
            .map(|(index, entry)| match entry {
                SuiteEntry::Case(case) => {
                    let returned = handler(&case.input);
                    let outcome = if same_record(&returned, &case.expected) {
                        CaseOutcome::Passed
                    } else {
                        warn!(index, name = ?case.name, "case output differs from expected");
                        CaseOutcome::Failed {
                            returned,
                            expected: case.expected.clone(),
                        }
                    };
                    CaseReport {
                        index,
                        name: case.name.clone(),
                        outcome,
                    }
                }
                SuiteEntry::Malformed { name, error } => {
                    warn!(index, error = %error, "skipping malformed case");
                    CaseReport {
                        index,
                        name: name.clone(),
                        outcome: CaseOutcome::Errored {
                            message: error.clone(),
                        },
                    }
                }
            })
            .collect();

        let report = SuiteReport { cases };
        info!(
            passed = report.passed(),
            failed = report.failed(),
            errored = report.errored(),
            "suite finished"
        );
        report
    }
}

fn parse_case(
    index: usize,
    item: Value,
    base_dir: &Path,
) -> std::result::Result<Case, (Option<String>, SuiteError)> {
    let Value::Object(mut fields) = item else {
        return Err((None, SuiteError::CaseNotObject { index }));
    };
    let name = fields
        .get("name")
        .and_then(Value::as_str)
        .map(str::to_string);

    if let Some(error) = fields.get(ERROR_KEY) {
        return Err((name, reported_error(error)));
    }

    let input = match fields.remove(INPUT_KEY) {
        Some(Value::Object(record)) => record,
        _ => return Err((name, missing(index, INPUT_KEY))),
    };
    let expected = match fields.remove(EXPECTED_KEY) {
        Some(Value::Object(record)) => record,
        Some(Value::String(reference)) if reference.starts_with('@') => {
            match load_expected(&base_dir.join(&reference[1..])) {
                Ok(record) => record,
                Err(e) => return Err((name, e)),
            }
        }
        _ => return Err((name, missing(index, EXPECTED_KEY))),
    };

    match fields.get(TYPE_KEY) {
        None => {}
        Some(Value::String(kind)) if kind == EXACT_MATCH => {}
        Some(Value::String(kind)) => {
            return Err((name, SuiteError::UnknownType { kind: kind.clone() }));
        }
        Some(other) => {
            return Err((
                name,
                SuiteError::UnknownType {
                    kind: other.to_string(),
                },
            ));
        }
    }

    Ok(Case {
        name,
        input,
        expected,
    })
}

fn missing(index: usize, field: &str) -> SuiteError {
    SuiteError::MissingField {
        index,
        field: field.to_string(),
    }
}

/// An `error` object recorded by whoever produced the case, e.g.
/// `{"type": "IOError", "message": "timeout"}`.
fn reported_error(error: &Value) -> SuiteError {
    let field = |key: &str| error.get(key).and_then(Value::as_str).unwrap_or_default();
    let message = match (field("type"), field("message")) {
        ("", message) => message.to_string(),
        (kind, "") => kind.to_string(),
        (kind, message) => format!("{kind}: {message}"),
    };
    SuiteError::Reported { message }
}

fn load_expected(path: &Path) -> std::result::Result<Record, SuiteError> {
    debug!(path = %path.display(), "loading expected output");
    let display = path.display().to_string();
    let content = std::fs::read_to_string(path).map_err(|e| SuiteError::ExpectedUnreadable {
        path: display.clone(),
        reason: e.to_string(),
    })?;
    match serde_json::from_str::<Value>(&content) {
        Ok(Value::Object(record)) => Ok(record),
        Ok(_) => Err(SuiteError::ExpectedUndecodable {
            path: display,
            reason: "not a JSON object".to_string(),
        }),
        Err(e) => Err(SuiteError::ExpectedUndecodable {
            path: display,
            reason: e.to_string(),
        }),
    }
}

/// Object key order and array element order are both ignored.
fn same_record(returned: &Record, expected: &Record) -> bool {
    returned.len() == expected.len()
        && returned
            .iter()
            .all(|(key, value)| expected.get(key).is_some_and(|other| same_value(value, other)))
}

fn same_value(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Object(left), Value::Object(right)) => same_record(left, right),
        (Value::Array(left), Value::Array(right)) => {
            if left.len() != right.len() {
                return false;
            }
            let mut used = vec![false; right.len()];
            left.iter().all(|item| {
                let found = right
                    .iter()
                    .enumerate()
                    .find(|(i, candidate)| !used[*i] && same_value(item, candidate));
                match found {
                    Some((i, _)) => {
                        used[i] = true;
                        true
                    }
                    None => false,
                }
            })
        }
        _ => left == right,
    }
}

impl SuiteReport {
    fn count(&self, pred: impl Fn(&CaseOutcome) -> bool) -> usize {
        self.cases.iter().filter(|c| pred(&c.outcome)).count()
    }

    pub fn passed(&self) -> usize {
        self.count(|o| matches!(o, CaseOutcome::Passed))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, CaseOutcome::Failed { .. }))
    }

    pub fn errored(&self) -> usize {
        self.count(|o| matches!(o, CaseOutcome::Errored { .. }))
    }

    pub fn is_success(&self) -> bool {
        self.passed() == self.cases.len()
    }
}
