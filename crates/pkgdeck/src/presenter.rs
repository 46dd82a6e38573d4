//! Everything a package page shows, computed from one registry document.

use pkgdeck_core::{DeckError, JsrInfo, PackageDocument, Result};
use pkgdeck_install::{
    CommandOptions, ExecutableInfo, PackageManager, execute_command, executable_info,
    install_command, is_binary_only_package, is_create_package, run_command,
};
use pkgdeck_readme::ReadmeRenderer;
use pkgdeck_versions::{HistorySource, ReleaseLines, VersionHistory};
use serde::Serialize;
use std::sync::Arc;

use crate::config::DeckConfig;

/// What to present and how.
#[derive(Debug, Clone, Copy, Default)]
pub struct SummaryRequest<'a> {
    /// Exact version or dist-tag; defaults to `latest`. Commands are pinned
    /// to the version unless it is the latest one.
    pub version: Option<&'a str>,
    /// Package-manager id; defaults to the configured one.
    pub package_manager: Option<&'a str>,
    /// README Markdown overriding the one embedded in the document.
    pub readme: Option<&'a str>,
    pub jsr: Option<&'a JsrInfo>,
    /// Binary to run for packages with several commands.
    pub command: Option<&'a str>,
}

/// Commands for the selected package manager.
///
/// `execute` and `run` are only present for packages that install a
/// command.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CommandSet {
    pub install: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execute: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run: Option<String>,
}

/// Presentation summary of one package.
#[derive(Debug, Clone, Serialize)]
pub struct PackageSummary {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// The version the page is about.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<String>,
    pub package_manager: PackageManager,
    pub executable: ExecutableInfo,
    pub binary_only: bool,
    pub create_package: bool,
    pub commands: CommandSet,
    pub release_lines: ReleaseLines,
    pub can_view_all: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub readme_html: Option<String>,
}

/// Combines the version grouper, the README renderer and the command
/// synthesizer behind one configuration.
///
/// # Examples
///
/// ```
/// use pkgdeck::{DeckConfig, PackagePresenter, SummaryRequest};
/// use pkgdeck_core::PackageDocument;
///
/// let doc = PackageDocument::from_json(r#"{
///     "name": "create-vite",
///     "versions": { "5.2.0": { "bin": { "create-vite": "index.js" } } },
///     "dist-tags": { "latest": "5.2.0" }
/// }"#).unwrap();
///
/// let presenter = PackagePresenter::new(DeckConfig::default());
/// let summary = presenter.summarize(&doc, SummaryRequest::default()).unwrap();
/// assert_eq!(summary.commands.install, "npm install create-vite");
/// assert_eq!(summary.commands.execute.as_deref(), Some("npm create vite"));
/// ```
pub struct PackagePresenter {
    config: DeckConfig,
    history: Option<VersionHistory>,
}

impl PackagePresenter {
    pub fn new(config: DeckConfig) -> Self {
        Self {
            config,
            history: None,
        }
    }

    /// Attaches a source for the full version history.
    pub fn with_history_source(mut self, source: Arc<dyn HistorySource>) -> Self {
        self.history = Some(VersionHistory::with_capacity(
            source,
            self.config.history.max_packages,
        ));
        self
    }

    pub fn config(&self) -> &DeckConfig {
        &self.config
    }

    pub fn history(&self) -> Option<&VersionHistory> {
        self.history.as_ref()
    }

    /// Builds the summary of `doc`.
    ///
    /// # Errors
    ///
    /// Returns [`DeckError::UnknownPackageManager`] if the request names a
    /// package manager that is not supported.
    pub fn summarize(
        &self,
        doc: &PackageDocument,
        request: SummaryRequest<'_>,
    ) -> Result<PackageSummary> {
        let package_manager = match request.package_manager {
            Some(id) => id.parse::<PackageManager>()?,
            None => self.config.install.default_package_manager,
        };

        let version = doc.resolve_version(request.version);
        let detail = version.and_then(|v| doc.version_detail(v));
        let bin = detail.and_then(|d| d.bin_field());

        let executable = executable_info(&doc.name, bin.as_ref());
        let binary_only = is_binary_only_package(
            &doc.name,
            bin.as_ref(),
            detail.is_some_and(|d| d.has_main()),
            detail.is_some_and(|d| d.has_exports()),
        );
        let create_package = is_create_package(&doc.name);

        let mut opts = CommandOptions::new(&doc.name, package_manager.id())
            .binary_only(binary_only)
            .create_package(create_package);
        if let Some(version) = version.filter(|v| Some(*v) != doc.latest_version()) {
            opts = opts.with_version(version);
        }
        if let Some(jsr) = request.jsr {
            opts = opts.with_jsr(jsr);
        }
        let picked = request
            .command
            .filter(|c| executable.commands.iter().any(|known| known == c));
        match picked {
            Some(command) => opts = opts.with_command(command),
            None if executable.has_executable => {
                opts = opts.with_command(&executable.primary_command);
            }
            None => {}
        }

        let commands = CommandSet {
            install: install_command(&opts),
            execute: (executable.has_executable || create_package)
                .then(|| execute_command(&opts)),
            run: executable.has_executable.then(|| run_command(&opts)),
        };

        let release_lines = ReleaseLines::from_document(doc);
        let readme_html = request
            .readme
            .or(doc.readme.as_deref())
            .filter(|markdown| !markdown.trim().is_empty())
            .map(|markdown| ReadmeRenderer::new(&self.config.readme).render(markdown, &doc.name));

        tracing::debug!(
            package = %doc.name,
            version = version.unwrap_or_default(),
            %package_manager,
            lines = release_lines.lines().len(),
            "summarized package"
        );

        Ok(PackageSummary {
            name: doc.name.clone(),
            description: doc.description.clone(),
            version: version.map(str::to_string),
            latest: doc.latest_version().map(str::to_string),
            deprecated: detail.and_then(|d| d.deprecation()),
            package_manager,
            executable,
            binary_only,
            create_package,
            can_view_all: release_lines.can_view_all(),
            commands,
            release_lines,
            readme_html,
        })
    }

    /// Replaces the abbreviated version list of `summary` with the full
    /// history, if a history source is attached.
    ///
    /// A failed fetch leaves the summary untouched.
    pub async fn expand_history(&self, summary: &mut PackageSummary) {
        let Some(history) = &self.history else {
            return;
        };
        history
            .expand_all(&summary.name, &mut summary.release_lines)
            .await;
        summary.can_view_all = summary.release_lines.can_view_all();
    }
}

/// Interprets a JSR package id such as `@std/path`.
///
/// # Errors
///
/// Returns [`DeckError::InvalidDocument`] for ids without a scope and name.
pub fn jsr_from_id(id: &str) -> Result<JsrInfo> {
    let (scope, name) = id
        .strip_prefix('@')
        .and_then(|rest| rest.split_once('/'))
        .filter(|(scope, name)| !scope.is_empty() && !name.is_empty() && !name.contains('/'))
        .ok_or_else(|| DeckError::InvalidDocument(format!("invalid JSR package id: {id}")))?;

    Ok(JsrInfo {
        exists: true,
        scope: Some(scope.to_string()),
        name: Some(name.to_string()),
        ..JsrInfo::default()
    })
}
