//! Install, execute and run command synthesis.
//!
//! Every function takes the same [`CommandOptions`] and returns command
//! tokens. An unknown package-manager id yields an empty result so callers
//! can hide the command instead of handling an error.

use pkgdeck_core::JsrInfo;

use crate::dialect::{Dialect, PackageManager};
use crate::executable::{create_short_name, package_base_name};

/// Inputs shared by all command builders.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandOptions<'a> {
    pub package_name: &'a str,
    /// Package-manager id, e.g. `"pnpm"`.
    pub package_manager: &'a str,
    pub version: Option<&'a str>,
    pub jsr: Option<&'a JsrInfo>,
    pub is_binary_only: bool,
    pub is_create_package: bool,
    /// Binary the user picked for a multi-command package.
    pub command: Option<&'a str>,
}

impl<'a> CommandOptions<'a> {
    pub fn new(package_name: &'a str, package_manager: &'a str) -> Self {
        Self {
            package_name,
            package_manager,
            ..Self::default()
        }
    }

    pub fn with_version(mut self, version: &'a str) -> Self {
        self.version = Some(version);
        self
    }

    pub fn with_jsr(mut self, jsr: &'a JsrInfo) -> Self {
        self.jsr = Some(jsr);
        self
    }

    pub fn with_command(mut self, command: &'a str) -> Self {
        self.command = Some(command);
        self
    }

    pub fn binary_only(mut self, is_binary_only: bool) -> Self {
        self.is_binary_only = is_binary_only;
        self
    }

    pub fn create_package(mut self, is_create_package: bool) -> Self {
        self.is_create_package = is_create_package;
        self
    }

    fn dialect(&self) -> Option<&'static Dialect> {
        PackageManager::from_id(self.package_manager).map(PackageManager::dialect)
    }

    fn versioned_specifier(&self) -> String {
        let specifier = package_specifier(self);
        match self.version.filter(|v| !v.is_empty()) {
            Some(version) => format!("{specifier}@{version}"),
            None => specifier,
        }
    }

    /// Target for local execution: the picked command, unless it is the
    /// package's own name.
    fn local_target(&self) -> String {
        match self.command.filter(|c| !c.is_empty()) {
            Some(command) if command != package_base_name(self.package_name) => {
                command.to_string()
            }
            _ => package_specifier(self),
        }
    }
}

/// Package reference in the dialect's syntax.
///
/// Deno uses `jsr:@scope/name` when the package is on JSR and `npm:<name>`
/// otherwise; every other package manager takes the plain name.
///
/// # Examples
///
/// ```
/// use pkgdeck_core::JsrInfo;
/// use pkgdeck_install::{CommandOptions, package_specifier};
///
/// let jsr = JsrInfo {
///     exists: true,
///     scope: Some("trpc".into()),
///     name: Some("server".into()),
///     ..JsrInfo::default()
/// };
/// let opts = CommandOptions::new("@trpc/server", "deno").with_jsr(&jsr);
/// assert_eq!(package_specifier(&opts), "jsr:@trpc/server");
///
/// let missing = JsrInfo::default();
/// let opts = CommandOptions::new("@trpc/server", "deno").with_jsr(&missing);
/// assert_eq!(package_specifier(&opts), "npm:@trpc/server");
/// ```
pub fn package_specifier(opts: &CommandOptions<'_>) -> String {
    if PackageManager::from_id(opts.package_manager) != Some(PackageManager::Deno) {
        return opts.package_name.to_string();
    }
    match opts.jsr.and_then(JsrInfo::package_id) {
        Some(jsr_id) => format!("jsr:{jsr_id}"),
        None => format!("npm:{}", opts.package_name),
    }
}

/// `[label, verb, specifier[@version]]`.
pub fn install_command_parts(opts: &CommandOptions<'_>) -> Vec<String> {
    let Some(dialect) = opts.dialect() else {
        return Vec::new();
    };
    vec![
        dialect.label.to_string(),
        dialect.install_verb.to_string(),
        opts.versioned_specifier(),
    ]
}

/// Install command as a single line, e.g. `npm install lodash`.
pub fn install_command(opts: &CommandOptions<'_>) -> String {
    install_command_parts(opts).join(" ")
}

/// Command that runs the package's binary.
///
/// Create packages use the dialect's create shorthand when it exists and
/// the short name differs from the package name. Binary-only packages are
/// downloaded and run (`@version` appended); anything else runs the
/// installed binary.
pub fn execute_command_parts(opts: &CommandOptions<'_>) -> Vec<String> {
    let Some(dialect) = opts.dialect() else {
        return Vec::new();
    };

    if opts.is_create_package
        && let Some(create) = dialect.create
    {
        let short = create_short_name(opts.package_name);
        if short != opts.package_name {
            return create
                .iter()
                .map(|token| (*token).to_string())
                .chain(std::iter::once(short))
                .collect();
        }
    }

    let (tokens, target) = if opts.is_binary_only {
        (dialect.remote_execute, opts.versioned_specifier())
    } else {
        (dialect.local_execute, opts.local_target())
    };

    tokens
        .iter()
        .map(|token| (*token).to_string())
        .chain(std::iter::once(target))
        .collect()
}

pub fn execute_command(opts: &CommandOptions<'_>) -> String {
    execute_command_parts(opts).join(" ")
}

/// Command that runs an installed binary.
pub fn run_command_parts(opts: &CommandOptions<'_>) -> Vec<String> {
    let Some(dialect) = opts.dialect() else {
        return Vec::new();
    };
    dialect
        .local_execute
        .iter()
        .map(|token| (*token).to_string())
        .chain(std::iter::once(opts.local_target()))
        .collect()
}

pub fn run_command(opts: &CommandOptions<'_>) -> String {
    run_command_parts(opts).join(" ")
}
