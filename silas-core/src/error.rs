use std::path::PathBuf;

/// Everything that can stop a build.
///
/// None of these are retried. The first one raised aborts the build and is
/// handed back to the caller unchanged.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("site config not found: {}", path.display())]
    ConfigNotFound { path: PathBuf },

    #[error("could not read config {}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed JSON in site config {}", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid site config {}: {message}", path.display())]
    ConfigSchema { path: PathBuf, message: String },

    #[error("invalid category config {}", path.display())]
    CategoryConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("could not prepare output directory {}", path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("output directory {} already exists and overwrite is disabled", path.display())]
    OutputExists { path: PathBuf },

    #[error("failed to render template '{template}'")]
    TemplateRender {
        template: String,
        #[source]
        source: tera::Error,
    },

    #[error("could not write {}", path.display())]
    IoWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
