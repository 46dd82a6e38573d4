//! Common test utilities for integration tests.
//!
//! Provides a scratch directory for fixture files and a runner for the
//! `pkgdeck` binary.

use serde_json::Value;
use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

pub(crate) const TYPESCRIPT: &str = r##"{
    "name": "typescript",
    "description": "TypeScript is a language for application scale JavaScript development",
    "readme": "# TypeScript\n\nSee [the handbook](./docs/handbook.md).\n",
    "versions": {
        "5.3.3": { "main": "./lib/typescript.js", "bin": { "tsc": "./bin/tsc", "tsserver": "./bin/tsserver" } },
        "5.4.0-beta": { "main": "./lib/typescript.js", "bin": { "tsc": "./bin/tsc", "tsserver": "./bin/tsserver" } },
        "4.9.5": { "main": "./lib/typescript.js", "bin": { "tsc": "./bin/tsc", "tsserver": "./bin/tsserver" } }
    },
    "dist-tags": { "latest": "5.3.3", "beta": "5.4.0-beta" },
    "time": { "5.3.3": "2023-12-05T21:42:03.000Z" }
}"##;

/// Scratch directory holding fixture files for one test.
pub(crate) struct Fixture {
    dir: TempDir,
}

impl Fixture {
    pub(crate) fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    /// Writes `contents` to `name` inside the fixture and returns its path.
    pub(crate) fn file(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, contents).expect("Failed to write fixture");
        path
    }

    pub(crate) fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }
}

/// Runs the pkgdeck binary with `args`.
pub(crate) fn run(args: &[&std::ffi::OsStr]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_pkgdeck"))
        .args(args)
        .env("RUST_LOG", "warn")
        .output()
        .expect("Failed to run pkgdeck binary")
}

/// Runs the binary and parses the JSON summary it prints.
pub(crate) fn summarize(args: &[&std::ffi::OsStr]) -> Value {
    let output = run(args);
    assert!(
        output.status.success(),
        "pkgdeck failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout is not JSON")
}
