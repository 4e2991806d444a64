use std::io::Write;
use std::path::PathBuf;

use code_query::{QueryError, QueryMode, QueryOptions, QueryResult};

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn fixture(name: &str) -> String {
    fixtures_dir().join(name).to_string_lossy().to_string()
}

fn cwd() -> String {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .to_string_lossy()
        .to_string()
}

/// `FILE:OFFSET` of the first occurrence of `needle` in a fixture.
fn pos_of(name: &str, needle: &str) -> String {
    let content = std::fs::read_to_string(fixtures_dir().join(name)).unwrap();
    let offset = content.find(needle).unwrap();
    format!("{}:{}", fixture(name), offset)
}

fn run(
    paths: &[&str],
    mode: QueryMode,
    pos: Option<String>,
    depth: u32,
) -> Result<QueryResult, QueryError> {
    let paths: Vec<String> = paths.iter().map(|p| p.to_string()).collect();
    let opts = QueryOptions {
        mode,
        pos,
        depth,
        max_depth: 0,
    };
    code_query::query(&paths, &opts, None, &cwd())
}

fn plain(result: &QueryResult) -> String {
    let mut buf = Vec::new();
    result.write_plain(&mut buf).unwrap();
    String::from_utf8(buf).unwrap()
}

fn assert_line_protocol(output: &str) {
    for line in output.lines() {
        let (head, _) = line
            .split_once(": ")
            .unwrap_or_else(|| panic!("line without pos prefix: {line}"));
        assert!(
            head == "-"
                || head
                    .rsplit_once(':')
                    .is_some_and(|(_, l)| l.parse::<usize>().is_ok()),
            "bad pos in line: {line}"
        );
    }
}

// ── callers ────────────────────────────────────────────────────────────

#[test]
fn callers_of_go_helper() {
    let result = run(
        &["tests/fixtures/sample.go"],
        QueryMode::Callers,
        Some(pos_of("sample.go", "func helper")),
        1,
    )
    .unwrap();
    let out = plain(&result);
    assert!(out.contains("callers of helper"), "{out}");
    assert!(out.contains("main calls helper"), "{out}");
    assert_line_protocol(&out);
}

#[test]
fn callers_transitive_at_depth_two() {
    let result = run(
        &["tests/fixtures/sample.go"],
        QueryMode::Callers,
        Some(pos_of("sample.go", "func (g Greeter) Greet")),
        2,
    )
    .unwrap();
    let out = plain(&result);
    assert!(out.contains("helper calls Greet"), "{out}");
    assert!(out.contains("main calls helper"), "{out}");
}

#[test]
fn callers_of_uncalled_function_is_empty() {
    let result = run(
        &["tests/fixtures/sample.go"],
        QueryMode::Callers,
        Some(pos_of("sample.go", "func main")),
        1,
    )
    .unwrap();
    let out = plain(&result);
    assert!(
        out.contains("main is not called within the analysis scope"),
        "{out}"
    );
}

#[test]
fn module_level_calls_count_as_callers() {
    let result = run(
        &["tests/fixtures/sample.py"],
        QueryMode::Callers,
        Some(pos_of("sample.py", "def main")),
        1,
    )
    .unwrap();
    let out = plain(&result);
    assert!(out.contains("<module> calls main"), "{out}");
}

// ── callees ────────────────────────────────────────────────────────────

#[test]
fn callees_of_rust_main() {
    let result = run(
        &["tests/fixtures/sample.rs"],
        QueryMode::Callees,
        Some(pos_of("sample.rs", "fn main")),
        1,
    )
    .unwrap();
    let out = plain(&result);
    assert!(out.contains("calls made by main"), "{out}");
    assert!(out.contains("main calls helper"), "{out}");
    assert!(out.contains("main calls println"), "{out}");
}

#[test]
fn callees_transitive_at_depth_two() {
    let result = run(
        &["tests/fixtures/sample.rs"],
        QueryMode::Callees,
        Some(pos_of("sample.rs", "fn main")),
        2,
    )
    .unwrap();
    let out = plain(&result);
    assert!(out.contains("helper calls write"), "{out}");
}

#[test]
fn callees_of_leaf_function_is_empty() {
    let result = run(
        &["tests/fixtures/sample.py"],
        QueryMode::Callees,
        Some(pos_of("sample.py", "def helper")),
        1,
    )
    .unwrap();
    let out = plain(&result);
    assert!(
        out.contains("helper makes no calls within the analysis scope"),
        "{out}"
    );
}

// ── callstack ──────────────────────────────────────────────────────────

#[test]
fn callstack_reaches_a_root() {
    let result = run(
        &["tests/fixtures/sample.go"],
        QueryMode::Callstack,
        Some(pos_of("sample.go", "func (g Greeter) Greet")),
        1,
    )
    .unwrap();
    let out = plain(&result);
    assert!(out.starts_with("-: call path from main to Greet\n"), "{out}");
    assert!(out.contains("Greet"), "{out}");
    assert!(out.contains("helper"), "{out}");
    assert_line_protocol(&out);

    let QueryResult::Callstack { frames, .. } = &result else {
        panic!("expected a callstack result");
    };
    assert_eq!(frames.first().unwrap().func, "Greet");
    assert_eq!(frames.last().unwrap().func, "main");
}

#[test]
fn callstack_of_root_is_single_frame() {
    let result = run(
        &["tests/fixtures/sample.rs"],
        QueryMode::Callstack,
        Some(pos_of("sample.rs", "fn main")),
        1,
    )
    .unwrap();
    let out = plain(&result);
    assert!(out.starts_with("-: call path from main to main\n"), "{out}");
    let QueryResult::Callstack { frames, .. } = &result else {
        panic!("expected a callstack result");
    };
    assert_eq!(frames.len(), 1);
}

// ── callgraph ──────────────────────────────────────────────────────────

#[test]
fn callgraph_of_one_file() {
    let result = run(&["tests/fixtures/sample.go"], QueryMode::Callgraph, None, 1).unwrap();
    let out = plain(&result);
    assert!(out.contains("call graph of the analysis scope"), "{out}");
    assert!(out.contains("main calls helper"), "{out}");
    assert!(out.contains("helper calls Greet"), "{out}");
    assert!(out.contains("helper calls Println"), "{out}");
    assert_line_protocol(&out);
}

#[test]
fn callgraph_nodes_are_sorted() {
    let result = run(&["tests/fixtures/sample.go"], QueryMode::Callgraph, None, 1).unwrap();
    let QueryResult::Callgraph { functions } = &result else {
        panic!("expected a callgraph result");
    };
    let names: Vec<&str> = functions.iter().map(|n| n.func.as_str()).collect();
    assert_eq!(names, vec!["Greet", "helper", "main"]);
}

#[test]
fn callgraph_over_directory() {
    let result = run(&["tests/fixtures"], QueryMode::Callgraph, None, 1).unwrap();
    let out = plain(&result);
    // every fixture defines a helper; the graph merges them by name
    assert!(out.contains("main calls helper"), "{out}");
    assert!(out.contains("log calls log"), "{out}");
    assert_line_protocol(&out);
}

#[test]
fn callgraph_is_deterministic() {
    let a = plain(&run(&["tests/fixtures"], QueryMode::Callgraph, None, 1).unwrap());
    let b = plain(&run(&["tests/fixtures"], QueryMode::Callgraph, None, 1).unwrap());
    assert_eq!(a, b);
}

// ── describe ───────────────────────────────────────────────────────────

#[test]
fn describe_function_definition() {
    let result = run(
        &["tests/fixtures/sample.go"],
        QueryMode::Describe,
        Some(pos_of("sample.go", "func helper")),
        1,
    )
    .unwrap();
    let out = plain(&result);
    assert!(
        out.contains("definition of function helper (2 outgoing calls)"),
        "{out}"
    );
}

#[test]
fn describe_call_site() {
    let result = run(
        &["tests/fixtures/sample.go"],
        QueryMode::Describe,
        Some(pos_of("sample.go", "helper(g)")),
        1,
    )
    .unwrap();
    let out = plain(&result);
    assert!(out.contains("call to helper from main"), "{out}");
}

#[test]
fn describe_type_definition() {
    let result = run(
        &["tests/fixtures/sample.go"],
        QueryMode::Describe,
        Some(pos_of("sample.go", "type Greeter")),
        1,
    )
    .unwrap();
    let out = plain(&result);
    assert!(out.contains("definition of type Greeter"), "{out}");
}

#[test]
fn describe_import() {
    let result = run(
        &["tests/fixtures/sample.go"],
        QueryMode::Describe,
        Some(pos_of("sample.go", "\"fmt\"")),
        1,
    )
    .unwrap();
    let out = plain(&result);
    assert!(out.contains("import \"fmt\""), "{out}");
}

// ── errors ─────────────────────────────────────────────────────────────

#[test]
fn position_required_for_callers() {
    let err = run(&["tests/fixtures/sample.go"], QueryMode::Callers, None, 1).unwrap_err();
    assert!(err.to_string().contains("requires the --pos flag"), "{err}");
}

#[test]
fn invalid_position_is_rejected() {
    let err = run(
        &["tests/fixtures/sample.go"],
        QueryMode::Callers,
        Some("nonsense".to_string()),
        1,
    )
    .unwrap_err();
    assert!(err.to_string().contains("invalid position"), "{err}");
}

#[test]
fn missing_scope_path_is_rejected() {
    let err = run(
        &["/tmp/does_not_exist_xyz_123"],
        QueryMode::Callgraph,
        None,
        1,
    )
    .unwrap_err();
    assert!(err.to_string().contains("does not exist"), "{err}");
}

#[test]
fn empty_scope_is_rejected() {
    let err = run(&[], QueryMode::Callgraph, None, 1).unwrap_err();
    assert!(err.to_string().contains("no source paths"), "{err}");
}

#[test]
fn no_function_at_position() {
    let err = run(
        &["tests/fixtures/sample.go"],
        QueryMode::Callers,
        Some(pos_of("sample.go", "package main")),
        1,
    )
    .unwrap_err();
    assert!(err.to_string().contains("no function found at"), "{err}");
}

#[test]
fn no_element_past_end_of_file() {
    let err = run(
        &["tests/fixtures/sample.go"],
        QueryMode::Describe,
        Some(format!("{}:99999", fixture("sample.go"))),
        1,
    )
    .unwrap_err();
    assert!(err.to_string().contains("no syntax element"), "{err}");
}

// ── scope handling ─────────────────────────────────────────────────────

#[test]
fn pos_file_outside_scope_is_indexed() {
    // scope only names the python file; the queried go file still resolves
    let result = run(
        &["tests/fixtures/sample.py"],
        QueryMode::Callers,
        Some(pos_of("sample.go", "func helper")),
        1,
    )
    .unwrap();
    let out = plain(&result);
    assert!(out.contains("callers of helper"), "{out}");
    assert!(out.contains("main calls helper"), "{out}");
}

#[test]
fn max_depth_limits_directory_recursion() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("top.rs"), "fn top() { deep(); }\n").unwrap();
    let sub = dir.path().join("sub");
    std::fs::create_dir(&sub).unwrap();
    std::fs::write(sub.join("deep.rs"), "fn deep() {}\n").unwrap();

    let opts = QueryOptions {
        mode: QueryMode::Callgraph,
        pos: None,
        depth: 1,
        max_depth: 1,
    };
    let result = code_query::query(
        &[dir.path().to_string_lossy().to_string()],
        &opts,
        None,
        &cwd(),
    )
    .unwrap();
    let out = plain(&result);
    assert!(out.contains("top"), "{out}");
    assert!(!out.contains("deep makes no calls"), "{out}");
}

// ── output formats ─────────────────────────────────────────────────────

#[test]
fn json_output_is_mode_tagged() {
    let result = run(&["tests/fixtures/sample.go"], QueryMode::Callgraph, None, 1).unwrap();
    let value = serde_json::to_value(&result).unwrap();
    assert_eq!(value["mode"], "callgraph");
    assert!(value["functions"].is_array());
}

#[test]
fn json_callers_carry_chains() {
    let result = run(
        &["tests/fixtures/sample.go"],
        QueryMode::Callers,
        Some(pos_of("sample.go", "func helper")),
        1,
    )
    .unwrap();
    let value = serde_json::to_value(&result).unwrap();
    assert_eq!(value["mode"], "callers");
    assert_eq!(value["target"], "helper");
    assert_eq!(value["chains"][0]["links"][0]["from"], "main");
}

// ── analysis log ───────────────────────────────────────────────────────

#[test]
fn analysis_log_records_the_run() {
    let mut buf: Vec<u8> = Vec::new();
    let opts = QueryOptions {
        mode: QueryMode::Callgraph,
        pos: None,
        depth: 1,
        max_depth: 0,
    };
    let paths = vec![fixture("sample.go")];
    code_query::query(&paths, &opts, Some(&mut buf as &mut dyn Write), &cwd()).unwrap();

    let log = String::from_utf8(buf).unwrap();
    assert!(log.contains("analysis scope: 1 files"), "{log}");
    assert!(log.contains("sample.go: 3 functions, 4 calls"), "{log}");
    assert!(log.contains("call graph:"), "{log}");
}

#[test]
fn analysis_log_records_position_resolution() {
    let mut buf: Vec<u8> = Vec::new();
    let opts = QueryOptions {
        mode: QueryMode::Callers,
        pos: Some(pos_of("sample.go", "func helper")),
        depth: 1,
        max_depth: 0,
    };
    let paths = vec![fixture("sample.go")];
    code_query::query(&paths, &opts, Some(&mut buf as &mut dyn Write), &cwd()).unwrap();

    let log = String::from_utf8(buf).unwrap();
    assert!(log.contains("to function 'helper'"), "{log}");
}
