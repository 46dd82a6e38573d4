//! End-to-end tests for the `pkgdeck` binary.

mod common;

use common::{Fixture, TYPESCRIPT, run, summarize};
use std::ffi::OsStr;

#[test]
fn test_default_summary() {
    let fixture = Fixture::new();
    let doc = fixture.file("typescript.json", TYPESCRIPT);

    let summary = summarize(&[doc.as_os_str()]);

    assert_eq!(summary["name"], "typescript");
    assert_eq!(summary["version"], "5.3.3");
    assert_eq!(summary["package_manager"], "npm");
    assert_eq!(summary["commands"]["install"], "npm install typescript");
    assert_eq!(summary["commands"]["execute"], "npx tsc");
    assert_eq!(summary["executable"]["primaryCommand"], "tsc");
    assert_eq!(summary["can_view_all"], true);

    let lines = summary["release_lines"]["lines"].as_array().unwrap();
    let keys: Vec<&str> = lines.iter().map(|l| l["key"].as_str().unwrap()).collect();
    assert_eq!(keys, ["5", "4"]);
    assert_eq!(lines[0]["versions"][0]["version"], "5.4.0-beta");
    assert_eq!(lines[0]["versions"][0]["tags"][0], "beta");
    assert_eq!(lines[0]["versions"][1]["tags"][0], "latest");

    let readme = summary["readme_html"].as_str().unwrap();
    assert!(readme.starts_with("<h3 id=\"typescript\" data-level=\"1\">TypeScript</h3>"));
    assert!(readme.contains("https://cdn.jsdelivr.net/npm/typescript/docs/handbook.md"));
}

#[test]
fn test_package_manager_and_version() {
    let fixture = Fixture::new();
    let doc = fixture.file("typescript.json", TYPESCRIPT);

    let summary = summarize(&[
        doc.as_os_str(),
        OsStr::new("--package-manager"),
        OsStr::new("pnpm"),
        OsStr::new("--version"),
        OsStr::new("4.9.5"),
        OsStr::new("--command"),
        OsStr::new("tsserver"),
    ]);

    assert_eq!(summary["version"], "4.9.5");
    assert_eq!(summary["commands"]["install"], "pnpm add typescript@4.9.5");
    assert_eq!(summary["commands"]["run"], "pnpm exec tsserver");
}

#[test]
fn test_readme_file_and_config() {
    let fixture = Fixture::new();
    let doc = fixture.file("typescript.json", TYPESCRIPT);
    let readme = fixture.file(
        "README.md",
        "![logo](./logo.png)\n\n<script>alert(1)</script>\n",
    );
    let config = fixture.file(
        "pkgdeck.json",
        r#"{"readme": {"cdn_base": "https://unpkg.com"}, "install": {"default_package_manager": "deno"}}"#,
    );

    let summary = summarize(&[
        doc.as_os_str(),
        OsStr::new("--readme"),
        readme.as_os_str(),
        OsStr::new("--config"),
        config.as_os_str(),
    ]);

    let html = summary["readme_html"].as_str().unwrap();
    assert!(html.contains("https://unpkg.com/typescript/logo.png"));
    assert!(!html.contains("<script"));
    assert_eq!(summary["commands"]["install"], "deno add npm:typescript");
}

#[test]
fn test_jsr_specifier() {
    let fixture = Fixture::new();
    let doc = fixture.file(
        "path.json",
        r#"{"name": "@std/path", "versions": {"1.0.8": {"exports": "./mod.js"}}, "dist-tags": {"latest": "1.0.8"}}"#,
    );

    let summary = summarize(&[
        doc.as_os_str(),
        OsStr::new("-p"),
        OsStr::new("deno"),
        OsStr::new("--jsr"),
        OsStr::new("@std/path"),
    ]);
    assert_eq!(summary["commands"]["install"], "deno add jsr:@std/path");
}

#[test]
fn test_full_history() {
    let fixture = Fixture::new();
    let doc = fixture.file("typescript.json", TYPESCRIPT);
    let history = fixture.file(
        "typescript-full.json",
        r#"{"name": "typescript", "versions": {"3.9.7": {}, "4.9.5": {}, "5.3.3": {}, "5.4.0-beta": {}}}"#,
    );

    let summary = summarize(&[
        doc.as_os_str(),
        OsStr::new("--history"),
        history.as_os_str(),
    ]);

    let lines = summary["release_lines"]["lines"].as_array().unwrap();
    let keys: Vec<&str> = lines.iter().map(|l| l["key"].as_str().unwrap()).collect();
    assert_eq!(keys, ["5", "4", "3"]);
    assert!(lines.iter().all(|l| l["fully_loaded"] == true));
}

#[test]
fn test_unreadable_history_degrades() {
    let fixture = Fixture::new();
    let doc = fixture.file("typescript.json", TYPESCRIPT);
    let missing = fixture.path("missing.json");

    let summary = summarize(&[
        doc.as_os_str(),
        OsStr::new("--history"),
        missing.as_os_str(),
    ]);

    let lines = summary["release_lines"]["lines"].as_array().unwrap();
    assert_eq!(lines.len(), 2);
    assert!(lines.iter().all(|l| l["fully_loaded"] == false));
}

#[test]
fn test_unknown_package_manager_fails() {
    let fixture = Fixture::new();
    let doc = fixture.file("typescript.json", TYPESCRIPT);

    let output = run(&[
        doc.as_os_str(),
        OsStr::new("--package-manager"),
        OsStr::new("pip"),
    ]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("unknown package manager: pip"));
}

#[test]
fn test_missing_document_fails() {
    let fixture = Fixture::new();
    let missing = fixture.path("nope.json");

    let output = run(&[missing.as_os_str()]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("failed to read"));
}

#[test]
fn test_invalid_document_fails() {
    let fixture = Fixture::new();
    let doc = fixture.file("broken.json", r#"{"name": ""}"#);

    let output = run(&[doc.as_os_str()]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("invalid document"));
}
