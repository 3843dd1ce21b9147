use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::config;
use crate::error::{Error, Result};
use crate::link::{UrlObject, depth_of, link_for};
use crate::renderer::Renderer;
use crate::site::{CATEGORY_URL_PREFIX, Site};
use crate::template::{TemplateEngine, TeraEngine};

pub const DEFAULT_EXPORT_PATH: &str = "generated";
pub const INDEX_FILE: &str = "index.html";

/// Where to read content from and where to put the result.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    content_root: PathBuf,
    export_path: PathBuf,
    theme_dir: Option<PathBuf>,
    overwrite: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self::new(".")
    }
}

impl BuildOptions {
    pub fn new<P: AsRef<Path>>(content_root: P) -> Self {
        Self {
            content_root: content_root.as_ref().to_path_buf(),
            export_path: PathBuf::from(DEFAULT_EXPORT_PATH),
            theme_dir: None,
            overwrite: true,
        }
    }

    pub fn export_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.export_path = path.as_ref().to_path_buf();
        self
    }

    pub fn theme_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.theme_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// When off, an existing export directory makes the build fail instead
    /// of being replaced.
    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }
}

/// Everything a single build run needs, fixed before the first write.
#[derive(Debug, Clone, Copy)]
pub struct BuildContext<'a> {
    pub content_root: &'a Path,
    pub export_path: &'a Path,
    pub overwrite: bool,
    pub site: &'a Site,
}

#[derive(Debug, Default)]
pub struct BuildReport {
    /// Written `index.html` files, in the order they were written.
    pub files: Vec<PathBuf>,
}

/// Load the site under `options.content_root` and render it with tera.
pub fn build_site(options: &BuildOptions) -> Result<BuildReport> {
    let site = config::load(&options.content_root)?;

    let engine = TeraEngine::new(&options.content_root, options.theme_dir.as_deref())?;
    let mut renderer = Renderer::new(engine);

    let context = BuildContext {
        content_root: &options.content_root,
        export_path: &options.export_path,
        overwrite: options.overwrite,
        site: &site,
    };
    build(&context, &mut renderer)
}

/// Render every entity of `context.site` below `context.export_path`.
///
/// Categories come first, each followed by its posts, then the top-level
/// pages. The first error stops the build. Files written before it are left
/// in place.
pub fn build<E: TemplateEngine>(
    context: &BuildContext<'_>,
    renderer: &mut Renderer<E>,
) -> Result<BuildReport> {
    prepare_export_dir(context.export_path, context.overwrite)?;

    let mut report = BuildReport::default();
    for entity in context.site.entities() {
        let depth = depth_of(entity.url());
        let categories = context
            .site
            .categories
            .iter()
            .map(|category| link_for(category, depth))
            .collect::<Vec<_>>();

        let html = renderer.render(entity.template(), entity.args(), &categories)?;
        let path = write_index(context.export_path, entity.url(), &html)?;
        report.files.push(path);
    }

    info!(
        "Wrote {} pages to {}",
        report.files.len(),
        context.export_path.display()
    );
    Ok(report)
}

/// Leave an empty `path` with its `category` directory in place.
pub fn prepare_export_dir(path: &Path, overwrite: bool) -> Result<()> {
    if path.exists() {
        if !overwrite {
            return Err(Error::OutputExists {
                path: path.to_path_buf(),
            });
        }
        warn!("Removing previous output {}", path.display());
        std::fs::remove_dir_all(path).map_err(|source| Error::OutputDir {
            path: path.to_path_buf(),
            source,
        })?;
    }

    for dir in [path.to_path_buf(), path.join(CATEGORY_URL_PREFIX)] {
        std::fs::create_dir_all(&dir).map_err(|source| Error::OutputDir { path: dir, source })?;
    }

    Ok(())
}

fn write_index(export_path: &Path, url: &str, html: &str) -> Result<PathBuf> {
    let dir = export_path.join(url);
    std::fs::create_dir_all(&dir).map_err(|source| Error::OutputDir {
        path: dir.clone(),
        source,
    })?;

    let path = dir.join(INDEX_FILE);
    std::fs::write(&path, html).map_err(|source| Error::IoWrite {
        path: path.clone(),
        source,
    })?;

    info!("Wrote {}", path.display());
    Ok(path)
}
