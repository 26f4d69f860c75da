//! End-to-end parser conformance harness.
//!
//! Cases are grouped by category and run through the strict grammar. Each
//! case either parses or fails with an exact message. Every case must also
//! survive the loose grammar, and a case that parses strictly must produce
//! the same tree loosely.

use bumpalo::Bump;
use rqml_ast::serialize::AstSerializer;
use rqml_options::ParseOptions;
use rqml_parser::parse;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Parse `source` and serialize the tree, or return the error message.
pub fn parse_json(source: &str, options: &ParseOptions) -> Result<Value, String> {
    let arena = Bump::new();
    parse(source, options, &arena)
        .map(|program| AstSerializer::new().program(program))
        .map_err(|err| err.to_string())
}

/// Path of a file under `fixtures/`.
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures").join(name)
}

pub fn load_fixture(name: &str) -> String {
    let path = fixture_path(name);
    match std::fs::read_to_string(&path) {
        Ok(text) => text,
        Err(err) => panic!("cannot read fixture {}: {}", path.display(), err),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expectation {
    Parses,
    /// The strict grammar fails with exactly this message.
    Fails(&'static str),
}

/// Result of a single conformance case.
#[derive(Debug, Clone)]
pub struct CaseResult {
    pub name: String,
    pub category: String,
    pub source: String,
    pub passed: bool,
    pub failure: Option<String>,
}

fn run_case(name: &str, category: &str, source: &str, expected: &Expectation) -> CaseResult {
    let strict = parse_json(source, &ParseOptions::default());
    let loose = parse_json(source, &ParseOptions::loose());
    let failure = match (expected, &strict, &loose) {
        (_, _, Err(err)) => Some(format!("loose grammar failed: {}", err)),
        (Expectation::Parses, Err(err), _) => Some(format!("unexpected error: {}", err)),
        (Expectation::Parses, Ok(strict), Ok(loose)) if strict != loose => {
            Some("loose tree differs from strict tree".to_string())
        }
        (Expectation::Parses, Ok(_), Ok(_)) => None,
        (Expectation::Fails(message), Err(err), _) if err != message => {
            Some(format!("expected {:?}, got {:?}", message, err))
        }
        (Expectation::Fails(_), Err(_), _) => None,
        (Expectation::Fails(message), Ok(_), _) => Some(format!("expected {:?}, but it parsed", message)),
    };
    CaseResult {
        name: name.to_string(),
        category: category.to_string(),
        source: source.to_string(),
        passed: failure.is_none(),
        failure,
    }
}

/// Conformance suite runner.
#[derive(Debug, Default)]
pub struct ConformanceSuite {
    results: Vec<CaseResult>,
}

impl ConformanceSuite {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parses(&mut self, name: &str, category: &str, source: &str) {
        self.add(name, category, source, Expectation::Parses);
    }

    pub fn fails(&mut self, name: &str, category: &str, source: &str, message: &'static str) {
        self.add(name, category, source, Expectation::Fails(message));
    }

    pub fn add(&mut self, name: &str, category: &str, source: &str, expected: Expectation) {
        self.results.push(run_case(name, category, source, &expected));
    }

    pub fn results(&self) -> &[CaseResult] {
        &self.results
    }

    pub fn failures(&self) -> Vec<&CaseResult> {
        self.results.iter().filter(|r| !r.passed).collect()
    }

    /// Passed and total counts per category.
    pub fn by_category(&self) -> BTreeMap<&str, (usize, usize)> {
        let mut categories = BTreeMap::new();
        for result in &self.results {
            let entry = categories.entry(result.category.as_str()).or_insert((0, 0));
            if result.passed {
                entry.0 += 1;
            }
            entry.1 += 1;
        }
        categories
    }

    pub fn print_summary(&self) {
        let total = self.results.len();
        let failures = self.failures();
        println!("\n=== QML Conformance Summary ===");
        println!("Total: {}  Passed: {}  Failed: {}", total, total - failures.len(), failures.len());
        for (category, (passed, count)) in self.by_category() {
            println!("  {}: {}/{}", category, passed, count);
        }
        for failure in failures.iter().take(10) {
            println!(
                "  [{}] {}: {}\n    {:?}",
                failure.category,
                failure.name,
                failure.failure.as_deref().unwrap_or("unknown failure"),
                failure.source
            );
        }
        if failures.len() > 10 {
            println!("  ... and {} more failures", failures.len() - 10);
        }
    }
}
