//! Package shape: binaries, create packages, base names.

use pkgdeck_core::BinField;
use serde::Serialize;

/// Commands a package installs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutableInfo {
    pub has_executable: bool,
    /// Declared commands, in declaration order.
    pub commands: Vec<String>,
    /// The command to suggest first; empty when there is none.
    pub primary_command: String,
}

/// Name without its scope: `@scope/name` -> `name`.
pub fn package_base_name(package_name: &str) -> &str {
    match package_name.strip_prefix('@') {
        Some(scoped) => scoped.split_once('/').map_or(package_name, |(_, name)| name),
        None => package_name,
    }
}

/// Returns `true` for `create-*` and `@scope/create-*` packages.
pub fn is_create_package(package_name: &str) -> bool {
    package_base_name(package_name)
        .strip_prefix("create-")
        .is_some_and(|rest| !rest.is_empty())
}

/// Name used with a package manager's `create` shorthand.
///
/// `create-vite` -> `vite`, `@scope/create-app` -> `@scope/app`. Names
/// without the prefix are returned unchanged.
pub fn create_short_name(package_name: &str) -> String {
    let base = package_base_name(package_name);
    let Some(short) = base.strip_prefix("create-").filter(|rest| !rest.is_empty()) else {
        return package_name.to_string();
    };
    match package_name.len().checked_sub(base.len()) {
        Some(scope_len) if scope_len > 0 => format!("{}{short}", &package_name[..scope_len]),
        _ => short.to_string(),
    }
}

/// Lists the commands declared by `bin`.
///
/// A single-path `bin` installs one command named after the package base
/// name. The primary command is the one matching the base name, or the
/// first declared.
///
/// # Examples
///
/// ```
/// use indexmap::IndexMap;
/// use pkgdeck_core::BinField;
/// use pkgdeck_install::executable_info;
///
/// let bin = BinField::Commands(IndexMap::from([
///     ("tsc".to_string(), "./bin/tsc".to_string()),
///     ("tsserver".to_string(), "./bin/tsserver".to_string()),
/// ]));
/// let info = executable_info("typescript", Some(&bin));
/// assert_eq!(info.primary_command, "tsc");
/// assert_eq!(info.commands, ["tsc", "tsserver"]);
/// ```
pub fn executable_info(package_name: &str, bin: Option<&BinField>) -> ExecutableInfo {
    let base = package_base_name(package_name);
    let commands: Vec<String> = match bin {
        Some(BinField::Single(path)) if !path.trim().is_empty() => vec![base.to_string()],
        Some(BinField::Commands(commands)) => commands.keys().cloned().collect(),
        _ => Vec::new(),
    };

    let primary_command = commands
        .iter()
        .find(|command| command.as_str() == base)
        .or_else(|| commands.first())
        .cloned()
        .unwrap_or_default();

    ExecutableInfo {
        has_executable: !commands.is_empty(),
        commands,
        primary_command,
    }
}

/// Returns `true` if the package is only useful as a command.
///
/// `create-*` packages always are. Otherwise a package must declare a `bin`
/// and no library entry point (`main` or `exports`).
pub fn is_binary_only_package(
    package_name: &str,
    bin: Option<&BinField>,
    has_main: bool,
    has_exports: bool,
) -> bool {
    if is_create_package(package_name) {
        return true;
    }
    let has_bin = bin.is_some_and(|bin| !bin.is_empty());
    has_bin && !has_main && !has_exports
}
