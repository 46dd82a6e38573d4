//! Command synthesis for pkgdeck.
//!
//! Builds the install, execute and run commands shown next to a package for
//! each supported JavaScript package manager.
//!
//! # Examples
//!
//! ```
//! use pkgdeck_install::{CommandOptions, execute_command_parts, install_command};
//!
//! assert_eq!(install_command(&CommandOptions::new("lodash", "npm")), "npm install lodash");
//!
//! let opts = CommandOptions::new("create-vite", "npm").create_package(true);
//! assert_eq!(execute_command_parts(&opts), ["npm", "create", "vite"]);
//! ```

pub mod command;
pub mod dialect;
pub mod executable;

pub use command::{
    CommandOptions, execute_command, execute_command_parts, install_command,
    install_command_parts, package_specifier, run_command, run_command_parts,
};
pub use dialect::{Dialect, PackageManager};
pub use executable::{
    ExecutableInfo, create_short_name, executable_info, is_binary_only_package, is_create_package,
    package_base_name,
};
