//! Package-manager dialects.
//!
//! The set of supported package managers is closed; each one is described
//! by a static [`Dialect`] entry.

use pkgdeck_core::DeckError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A supported JavaScript package manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageManager {
    Npm,
    Pnpm,
    Yarn,
    Bun,
    Deno,
    Vlt,
}

/// Command tokens of one package manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Dialect {
    /// Program name as typed on the command line.
    pub label: &'static str,
    /// Subcommand that adds a dependency.
    pub install_verb: &'static str,
    /// Runs a binary of an installed package.
    pub local_execute: &'static [&'static str],
    /// Downloads a package and runs its binary without installing it.
    pub remote_execute: &'static [&'static str],
    /// Shorthand for running `create-*` scaffolding packages.
    pub create: Option<&'static [&'static str]>,
}

const NPM: Dialect = Dialect {
    label: "npm",
    install_verb: "install",
    local_execute: &["npx"],
    remote_execute: &["npx"],
    create: Some(&["npm", "create"]),
};

const PNPM: Dialect = Dialect {
    label: "pnpm",
    install_verb: "add",
    local_execute: &["pnpm", "exec"],
    remote_execute: &["pnpm", "dlx"],
    create: Some(&["pnpm", "create"]),
};

// Yarn classic has no local exec, so installed binaries go through npx.
const YARN: Dialect = Dialect {
    label: "yarn",
    install_verb: "add",
    local_execute: &["npx"],
    remote_execute: &["yarn", "dlx"],
    create: Some(&["yarn", "create"]),
};

const BUN: Dialect = Dialect {
    label: "bun",
    install_verb: "add",
    local_execute: &["bunx"],
    remote_execute: &["bunx"],
    create: Some(&["bun", "create"]),
};

const DENO: Dialect = Dialect {
    label: "deno",
    install_verb: "add",
    local_execute: &["deno", "run"],
    remote_execute: &["deno", "run"],
    create: Some(&["deno", "init", "--npm"]),
};

const VLT: Dialect = Dialect {
    label: "vlt",
    install_verb: "install",
    local_execute: &["vlt", "exec"],
    remote_execute: &["vlx"],
    create: None,
};

impl PackageManager {
    /// Every supported package manager, in display order.
    pub const ALL: [PackageManager; 6] = [
        Self::Npm,
        Self::Pnpm,
        Self::Yarn,
        Self::Bun,
        Self::Deno,
        Self::Vlt,
    ];

    /// Parses a lowercase id such as `"pnpm"`.
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|pm| pm.id() == id)
    }

    pub fn id(self) -> &'static str {
        self.dialect().label
    }

    pub fn dialect(self) -> &'static Dialect {
        match self {
            Self::Npm => &NPM,
            Self::Pnpm => &PNPM,
            Self::Yarn => &YARN,
            Self::Bun => &BUN,
            Self::Deno => &DENO,
            Self::Vlt => &VLT,
        }
    }
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for PackageManager {
    type Err = DeckError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_id(s).ok_or_else(|| DeckError::UnknownPackageManager(s.to_string()))
    }
}
