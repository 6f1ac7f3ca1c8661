use std::{
    fs::{read_dir, read_to_string},
    path::Path,
};

use color_eyre::{eyre::Context, Result};
use xper::{
    interpreter::{context::BufferedContext, TreeWalkInterpreter},
    parser::{
        formatter::{ExpressionFormatter, SExpressionFormatter},
        Parser,
    },
    value::formatter::{BasicFormatter, ValueFormatter},
};

#[test]
fn test_assignment() -> Result<()> {
    test_engine(Path::new("./test_data/interpreter/assignment"))
}

#[test]
fn test_block() -> Result<()> {
    test_engine(Path::new("./test_data/interpreter/block"))
}

#[test]
fn test_closure() -> Result<()> {
    test_engine(Path::new("./test_data/interpreter/closure"))
}

#[test]
fn test_control() -> Result<()> {
    test_engine(Path::new("./test_data/interpreter/control"))
}

#[test]
fn test_function() -> Result<()> {
    test_engine(Path::new("./test_data/interpreter/function"))
}

#[test]
fn test_list() -> Result<()> {
    test_engine(Path::new("./test_data/interpreter/list"))
}

#[test]
fn test_loop() -> Result<()> {
    test_engine(Path::new("./test_data/interpreter/loop"))
}

#[test]
fn test_method() -> Result<()> {
    test_engine(Path::new("./test_data/interpreter/method"))
}

#[test]
fn test_operator() -> Result<()> {
    test_engine(Path::new("./test_data/interpreter/operator"))
}

#[test]
fn test_range() -> Result<()> {
    test_engine(Path::new("./test_data/interpreter/range"))
}

#[test]
fn test_shift() -> Result<()> {
    test_engine(Path::new("./test_data/interpreter/shift"))
}

struct TestCase {
    name: String,
    source: String,
    output: String,
    parse_errors: String,
    runtime_errors: String,
}

impl TestCase {
    pub fn check(&self) {
        let program = match Parser::new(&self.source).parse() {
            Ok(program) => program,
            Err(e) => {
                let msg = SExpressionFormatter::new(&self.source).format_error(&e);
                assert_eq!(
                    self.parse_errors, msg,
                    "Failed test {} at parse stage.",
                    self.name,
                );
                return;
            }
        };

        let value_formatter = BasicFormatter::new(&self.source);
        let mut interpreter = TreeWalkInterpreter::new(BufferedContext::new());
        let errors = match interpreter.run(&program) {
            Ok(_) => String::new(),
            Err(e) => value_formatter.format_error(&e),
        };
        assert_eq!(
            self.runtime_errors, errors,
            "Failed test {} at runtime.",
            self.name,
        );

        let msg = interpreter.into_context().into_data();
        assert_eq!(self.output, msg, "Failed test {} at print.", self.name);
    }
}

fn test_engine(input_dir: &Path) -> Result<()> {
    let mut succeeded = true;
    for entry in read_dir(input_dir).context("Failed to open input test data folder")? {
        let entry = entry?;
        let path = entry.path();

        let Some(extension) = path.extension() else {
            continue;
        };

        if extension != "xp" {
            continue;
        }

        let test_case = parse_test_case(&path)?;
        println!("Checking {}", test_case.name);

        let res = std::panic::catch_unwind(|| {
            test_case.check();
        });
        if res.is_err() {
            println!("\tFails test case {}", test_case.name);
            succeeded = false;
        }
    }

    assert!(succeeded, "Some test cases in {input_dir:?} failed");
    Ok(())
}

fn expectation<'a>(line: &'a str, marker: &str) -> Option<&'a str> {
    let index = line.find(marker)?;
    line[index..].strip_prefix(marker).map(str::trim)
}

fn parse_test_case(input_path: &Path) -> Result<TestCase> {
    let test_name = input_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    let input = read_to_string(input_path).context("Failed to open input test data file")?;

    let mut expected_outputs = Vec::new();
    let mut expected_parse_errors = Vec::new();
    let mut expected_runtime_errors = Vec::new();

    for (line_index, line) in input.lines().enumerate() {
        let line_number = line_index + 1;
        if let Some(expected) = expectation(line, "// expect:") {
            expected_outputs.push(expected.to_string());
        } else if let Some(expected) = expectation(line, "// expect parse error:") {
            expected_parse_errors.push(format!("({line_number}) {expected}"));
        } else if let Some(expected) = expectation(line, "// expect runtime error:") {
            expected_runtime_errors.push(format!("({line_number}) {expected}"));
        }
    }

    // Printed lines end with a newline
    expected_outputs.push(String::new());
    Ok(TestCase {
        name: test_name,
        source: input,
        output: expected_outputs.join("\n"),
        parse_errors: expected_parse_errors.join("\n"),
        runtime_errors: expected_runtime_errors.join("\n"),
    })
}
