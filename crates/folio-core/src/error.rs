//! Unified error types for the folio toolkit.

use std::path::PathBuf;
use thiserror::Error;

/// All errors that can occur while loading, validating, or rendering a site.
#[derive(Error, Debug)]
pub enum FolioError {
    // --- Configuration ---

    /// The site configuration file (`folio.config.json`) was not found.
    #[error("config file not found at {path}")]
    ConfigNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file exists but contains invalid JSON.
    #[error("failed to parse config at {path}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The configuration parsed but describes an impossible site.
    #[error("invalid site config: {0}")]
    InvalidConfig(String),

    // --- Templates ---

    /// A template file is structurally invalid (unclosed block, bad expression).
    #[error(
        "malformed template '{name}' ({}{}): {message}",
        .path.display(),
        location(.line, .column)
    )]
    TemplateSyntax {
        name: String,
        path: PathBuf,
        line: Option<usize>,
        column: Option<usize>,
        message: String,
    },

    /// A template includes another template that is not registered.
    #[error("template '{template}' (line {line}) includes unknown template '{include}'")]
    UnknownInclude {
        template: String,
        include: String,
        line: usize,
    },

    /// Templates include each other in a loop.
    #[error("include cycle: {0}")]
    IncludeCycle(String),

    /// A page or layout names a template that is not registered.
    #[error("unknown template: {0}")]
    UnknownTemplate(String),

    /// Rendering failed after the template compiled (e.g. a helper received bad arguments).
    #[error("rendering template '{name}' failed: {message}")]
    TemplateRender { name: String, message: String },

    // --- Data ---

    /// A YAML data file could not be parsed. The data provider downgrades this to a warning.
    #[error("failed to parse data file {path}")]
    DataParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    // --- Project ---

    /// Attempted to scaffold a site in a directory that already exists.
    #[error("site directory already exists: {0}")]
    ProjectExists(PathBuf),

    /// The directory is not a folio site (missing config file).
    #[error("not a folio site (missing {0})")]
    NotAProject(PathBuf),

    // --- General ---

    /// A filesystem I/O error.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A catch-all for errors from dependencies.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

fn location(line: &Option<usize>, column: &Option<usize>) -> String {
    match (*line, *column) {
        (Some(line), Some(column)) => format!(":{line}:{column}"),
        (Some(line), None) => format!(":{line}"),
        _ => String::new(),
    }
}

/// Alias for `Result<T, FolioError>`.
pub type Result<T> = std::result::Result<T, FolioError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_syntax_message_carries_location() {
        let err = FolioError::TemplateSyntax {
            name: "pages/about".into(),
            path: PathBuf::from("templates/pages/about.html"),
            line: Some(3),
            column: Some(7),
            message: "unclosed block".into(),
        };
        assert_eq!(
            err.to_string(),
            "malformed template 'pages/about' (templates/pages/about.html:3:7): unclosed block"
        );
    }

    #[test]
    fn test_template_syntax_message_without_position() {
        let err = FolioError::TemplateSyntax {
            name: "inline".into(),
            path: PathBuf::from("<inline>"),
            line: None,
            column: None,
            message: "bad".into(),
        };
        assert_eq!(err.to_string(), "malformed template 'inline' (<inline>): bad");
    }
}
