use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};
use tera::{Context, Tera};
use tracing::debug;
use walkdir::WalkDir;

use crate::error::{Error, Result};

/// Templates compiled into the binary. Consulted before the content root.
pub const BUILTIN_THEME: &[(&str, &str)] = &[
    ("base.html", include_str!("../theme/base.html")),
    ("category.html", include_str!("../theme/category.html")),
];

/// `extends`, `include` and `import` tags.
static DEPENDENCY_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{%-?\s*(?:extends|include|import)\s+((?s:.)*?)-?%\}").unwrap()
});

/// String literal inside a tag, in any of tera's three quote styles.
static QUOTED_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""([^"]+)"|'([^']+)'|`([^`]+)`"#).unwrap());

/// A template the engine has located and can render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateHandle(String);

impl TemplateHandle {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

pub trait TemplateEngine {
    /// Locate `name`, loading it if this is the first time it is asked for.
    fn resolve(&mut self, name: &str) -> Result<TemplateHandle>;

    fn render(&self, handle: &TemplateHandle, args: &Map<String, Value>) -> Result<String>;
}

/// Tera backed engine.
///
/// Lookup order is the theme override directory (if any), then the built-in
/// theme, then the content root. Content templates are loaded lazily under
/// their content-root-relative name, together with every template they
/// extend, include or import, each looked up in that same order.
pub struct TeraEngine {
    tera: Tera,
    content_root: PathBuf,
}

impl TeraEngine {
    pub fn new<P: AsRef<Path>>(content_root: P, theme_dir: Option<&Path>) -> Result<Self> {
        let mut tera = Tera::default();
        tera.add_raw_templates(BUILTIN_THEME.to_vec())
            .map_err(|source| Error::TemplateRender {
                template: "<builtin theme>".to_string(),
                source,
            })?;

        if let Some(theme_dir) = theme_dir {
            let files = theme_templates(theme_dir);
            debug!(
                "Loading {} templates from theme {}",
                files.len(),
                theme_dir.display()
            );
            tera.add_template_files(
                files
                    .iter()
                    .map(|(path, name)| (path.as_path(), Some(name.as_str())))
                    .collect::<Vec<_>>(),
            )
            .map_err(|source| Error::TemplateRender {
                template: theme_dir.display().to_string(),
                source,
            })?;
        }

        Ok(Self {
            tera,
            content_root: content_root.as_ref().to_path_buf(),
        })
    }

    fn is_loaded(&self, name: &str) -> bool {
        self.tera.get_template_names().any(|n| n == name)
    }

    /// Add `name` from the content root, after the templates it refers to.
    ///
    /// References found nowhere are skipped here. Tera reports them when the
    /// template is added (parents) or rendered (includes).
    fn load_from_content_root(
        &mut self,
        name: &str,
        loading: &mut Vec<String>,
    ) -> tera::Result<()> {
        if self.is_loaded(name) || loading.iter().any(|n| n == name) {
            return Ok(());
        }
        let path = self.content_root.join(name);
        if !path.is_file() {
            return Ok(());
        }

        let source = std::fs::read_to_string(&path)
            .map_err(|e| tera::Error::chain(format!("could not read {}", path.display()), e))?;

        loading.push(name.to_string());
        for dependency in referenced_templates(&source) {
            self.load_from_content_root(&dependency, loading)?;
        }

        debug!("Loading template {} from {}", name, path.display());
        self.tera.add_raw_template(name, &source)
    }
}

impl TemplateEngine for TeraEngine {
    fn resolve(&mut self, name: &str) -> Result<TemplateHandle> {
        if self.is_loaded(name) {
            return Ok(TemplateHandle::new(name));
        }

        if !self.content_root.join(name).is_file() {
            return Err(Error::TemplateRender {
                template: name.to_string(),
                source: tera::Error::msg(format!(
                    "template '{}' not found in theme or {}",
                    name,
                    self.content_root.display()
                )),
            });
        }

        let mut loading = Vec::new();
        self.load_from_content_root(name, &mut loading)
            .map_err(|source| Error::TemplateRender {
                template: name.to_string(),
                source,
            })?;

        Ok(TemplateHandle::new(name))
    }

    fn render(&self, handle: &TemplateHandle, args: &Map<String, Value>) -> Result<String> {
        let to_error = |source| Error::TemplateRender {
            template: handle.name().to_string(),
            source,
        };
        let context = Context::from_serialize(args).map_err(to_error)?;
        self.tera.render(handle.name(), &context).map_err(to_error)
    }
}

/// Names of the templates `source` extends, includes or imports.
fn referenced_templates(source: &str) -> Vec<String> {
    DEPENDENCY_TAG_RE
        .captures_iter(source)
        .flat_map(|tag| {
            let args = tag.get(1).map_or("", |m| m.as_str());
            QUOTED_NAME_RE
                .captures_iter(args)
                .filter_map(|quoted| {
                    quoted
                        .iter()
                        .skip(1)
                        .flatten()
                        .next()
                        .map(|m| m.as_str().to_string())
                })
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Every `.html` file below `dir`, named by its `/`-separated relative path.
fn theme_templates(dir: &Path) -> Vec<(PathBuf, String)> {
    WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| {
            e.path().is_file() && e.path().extension().map(|ext| ext == "html").unwrap_or(false)
        })
        .filter_map(|e| {
            let name = e
                .path()
                .strip_prefix(dir)
                .ok()?
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            Some((e.path().to_path_buf(), name))
        })
        .collect()
}
