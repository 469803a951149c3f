//! End-to-end tests for the Manaknight compiler.
//!
//! Each test writes `.mk` sources into a temp directory, invokes the real
//! `mkc` binary, and asserts on exit status, diagnostics, and emitted
//! artifacts.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn mkc() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_mkc"))
}

/// Write sources into a fresh project dir and run `mkc compile` on
/// `main.mk` with extra args. Returns the project dir and the output.
fn run_compile(sources: &[(&str, &str)], extra_args: &[&str]) -> (tempfile::TempDir, Output) {
    let dir = tempfile::tempdir().expect("create temp dir");
    for (name, content) in sources {
        let path = dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create source dirs");
        }
        std::fs::write(&path, content).expect("write source");
    }
    let main = dir.path().join("main.mk");
    let output = Command::new(mkc())
        .arg("compile")
        .arg(&main)
        .args(extra_args)
        .output()
        .expect("invoke mkc");
    (dir, output)
}

fn stderr_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn emitted_js(dir: &Path) -> String {
    std::fs::read_to_string(dir.join("main.js")).expect("emitted main.js")
}

// ── Scenario: hello ────────────────────────────────────────────────────

#[test]
fn hello_emits_a_js_module() {
    let (dir, output) = run_compile(&[("main.mk", "fn main() : String { \"hi\" }")], &[]);
    assert!(output.status.success(), "stderr: {}", stderr_of(&output));

    let js = emitted_js(dir.path());
    assert!(js.starts_with("\"use strict\";\n"));
    assert!(js.contains("function main() {\n  return \"hi\";\n}"));
    // Pure module: no manifest alongside.
    assert!(!dir.path().join("main.manifest.json").exists());
}

// ── Scenario: effect escalation ────────────────────────────────────────

#[test]
fn effect_escalation_is_exactly_e3002() {
    let source = "fn now2() : Int uses { time } { now() }\nfn pure() : Int { now2() }";
    let (_dir, output) = run_compile(&[("main.mk", source)], &[]);
    assert!(!output.status.success());

    let stderr = stderr_of(&output);
    assert_eq!(
        stderr.lines().count(),
        1,
        "expected exactly one diagnostic, got:\n{stderr}"
    );
    assert!(stderr.contains("Error E3002:"), "{stderr}");
    assert!(stderr.contains("main.mk:2:"), "{stderr}");
}

// ── Scenario: non-exhaustive match ─────────────────────────────────────

#[test]
fn non_exhaustive_match_names_the_missing_constructor() {
    let source = "fn f(o: Option<Int>) : Int { match o { Some(x) => x } }";
    let (_dir, output) = run_compile(&[("main.mk", source)], &[]);
    assert!(!output.status.success());

    let stderr = stderr_of(&output);
    assert!(stderr.contains("Error E4001:"), "{stderr}");
    assert!(stderr.contains("None"), "{stderr}");
}

// ── Scenario: shadowing ────────────────────────────────────────────────

#[test]
fn shadowing_is_exactly_e2006() {
    let source = "fn f() : Int { let x = 1; if true { let x = 2; x } else { 0 } }";
    let (_dir, output) = run_compile(&[("main.mk", source)], &[]);
    assert!(!output.status.success());

    let stderr = stderr_of(&output);
    assert_eq!(stderr.lines().count(), 1, "{stderr}");
    assert!(stderr.contains("Error E2006:"), "{stderr}");
}

// ── Scenario: pipeline typing ──────────────────────────────────────────

#[test]
fn pipeline_lowers_to_a_direct_call() {
    let source = "fn inc(x: Int) : Int { x + 1 }\nfn main() : Int { 1 |> inc }";
    let (dir, output) = run_compile(&[("main.mk", source)], &[]);
    assert!(output.status.success(), "stderr: {}", stderr_of(&output));
    assert!(emitted_js(dir.path()).contains("return inc(1);"));
}

// ── Scenario: API route ────────────────────────────────────────────────

#[test]
fn api_route_emits_registration_and_openapi() {
    let source = "api GET \"/u/:id\" (id: String) -> String { \"ok: \" + id }";
    let (dir, first) = run_compile(&[("main.mk", source)], &[]);
    assert!(first.status.success(), "stderr: {}", stderr_of(&first));
    let openapi = dir.path().join("openapi.json");
    let output = Command::new(mkc())
        .arg("compile")
        .arg(dir.path().join("main.mk"))
        .arg("-a")
        .arg(&openapi)
        .output()
        .expect("invoke mkc");
    assert!(output.status.success(), "stderr: {}", stderr_of(&output));

    let js = emitted_js(dir.path());
    assert!(js.contains(
        "__router.register(\"GET\", \"/u/:id\", function get_u_id(id, __effects) {"
    ));

    let doc: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&openapi).expect("openapi.json"))
            .expect("valid JSON");
    assert_eq!(doc["openapi"], "3.0.0");
    assert_eq!(
        doc["paths"]["/u/:id"]["get"]["responses"]["200"]["content"]["application/json"]
            ["schema"]["type"],
        "string"
    );
}

// ── Modules ────────────────────────────────────────────────────────────

#[test]
fn imports_resolve_across_files() {
    let util = "pub fn double(x: Int) : Int { x * 2 }";
    let main = "import util.math as m\nfn main() : Int { m.double(21) }";
    let (dir, output) = run_compile(
        &[("main.mk", main), ("util/math.mk", util)],
        &[],
    );
    assert!(output.status.success(), "stderr: {}", stderr_of(&output));
    assert!(emitted_js(dir.path()).contains("return double(21);"));
}

#[test]
fn missing_module_is_e5001() {
    let main = "import util.nope\nfn main() : Int { 0 }";
    let (_dir, output) = run_compile(&[("main.mk", main)], &[]);
    assert!(!output.status.success());
    assert!(stderr_of(&output).contains("Error E5001:"));
}

#[test]
fn import_cycle_is_e5004() {
    let a = "import b\npub fn fa() : Int { 1 }";
    let b = "import a\npub fn fb() : Int { 2 }";
    let main = "import a\nfn main() : Int { 0 }";
    let (_dir, output) = run_compile(
        &[("main.mk", main), ("a.mk", a), ("b.mk", b)],
        &[],
    );
    assert!(!output.status.success());
    assert!(stderr_of(&output).contains("Error E5004:"), "{}", stderr_of(&output));
}

#[test]
fn importing_a_private_function_is_e5003() {
    let util = "fn secret(x: Int) : Int { x }";
    let main = "import util.math as m\nfn main() : Int { m.secret(1) }";
    let (_dir, output) = run_compile(
        &[("main.mk", main), ("util/math.mk", util)],
        &[],
    );
    assert!(!output.status.success());
    assert!(stderr_of(&output).contains("Error E5003:"));
}

// ── Driver behavior ────────────────────────────────────────────────────

#[test]
fn diagnostics_are_sorted_and_maximal() {
    // Two independent errors in one file: both must be reported, in
    // position order.
    let source = "fn a() : Int { \"s\" }\nfn b() : Int { let x = 1; let x = 2; x }";
    let (_dir, output) = run_compile(&[("main.mk", source)], &[]);
    assert!(!output.status.success());

    let stderr = stderr_of(&output);
    let lines: Vec<&str> = stderr.lines().collect();
    assert_eq!(lines.len(), 2, "{stderr}");
    assert!(lines[0].contains("E2004"), "{stderr}");
    assert!(lines[1].contains("E2006"), "{stderr}");
}

#[test]
fn parse_errors_gate_only_the_affected_module() {
    // The imported module is broken; main's own semantic error must still
    // surface alongside it.
    let broken = "pub fn oops( { }";
    let main = "import util.broken\nfn main() : Int { undefined_name }";
    let (_dir, output) = run_compile(
        &[("main.mk", main), ("util/broken.mk", broken)],
        &[],
    );
    assert!(!output.status.success());

    let stderr = stderr_of(&output);
    assert!(stderr.contains("E1004"), "{stderr}");
    assert!(stderr.contains("E2001"), "{stderr}");
}

#[test]
fn check_mode_emits_nothing() {
    let (dir, output) = run_compile(&[("main.mk", "fn main() : Int { 0 }")], &["-c"]);
    assert!(output.status.success(), "stderr: {}", stderr_of(&output));
    assert!(!dir.path().join("main.js").exists());
}

#[test]
fn format_mode_prints_canonical_source() {
    let (_dir, output) = run_compile(
        &[("main.mk", "fn   main( )   :Int{   0   }")],
        &["-f"],
    );
    assert!(output.status.success(), "stderr: {}", stderr_of(&output));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout, "fn main() : Int {\n    0\n}\n");
}

#[test]
fn json_mode_emits_structured_diagnostics() {
    let (_dir, output) = run_compile(
        &[("main.mk", "fn f() : Int { y }")],
        &["--json"],
    );
    assert!(!output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let diags: serde_json::Value = serde_json::from_str(&stdout).expect("valid JSON");
    assert_eq!(diags[0]["code"], "E2001");
    assert_eq!(diags[0]["category"], "type");
    assert_eq!(diags[0]["file"], "main.mk");
}

#[test]
fn arguments_after_double_dash_are_ignored() {
    let (dir, output) = run_compile(
        &[("main.mk", "fn main() : Int { 0 }")],
        &["--", "--host-flag", "whatever"],
    );
    assert!(output.status.success(), "stderr: {}", stderr_of(&output));
    assert!(dir.path().join("main.js").exists());
}

#[test]
fn manifest_is_written_for_effectful_modules() {
    let source = "pub fn tick() : Int uses { time } { now() }";
    let (dir, output) = run_compile(&[("main.mk", source)], &[]);
    assert!(output.status.success(), "stderr: {}", stderr_of(&output));

    let manifest: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(dir.path().join("main.manifest.json")).expect("manifest"),
    )
    .expect("valid JSON");
    assert_eq!(manifest["entries"][0]["name"], "tick");
    assert_eq!(manifest["entries"][0]["effects"][0], "time");
    assert_eq!(manifest["effectsList"][0], "time");
}

#[test]
fn emitted_js_is_byte_identical_across_runs() {
    let source = "type Shape { Circle(radius: Int) | Dot }\n\
                  fn area(s: Shape) : Int { match s { Circle(r) => r * r * 3, Dot => 0 } }\n\
                  fn main() : Int { area(Dot) }";
    let (dir_a, output_a) = run_compile(&[("main.mk", source)], &[]);
    let (dir_b, output_b) = run_compile(&[("main.mk", source)], &[]);
    assert!(output_a.status.success() && output_b.status.success());
    assert_eq!(emitted_js(dir_a.path()), emitted_js(dir_b.path()));
}
