pub mod builder;
pub mod config;
pub mod error;
pub mod link;
pub mod renderer;
pub mod site;
pub mod template;

// Re-export main types
pub use builder::{BuildContext, BuildOptions, BuildReport, build, build_site};
pub use config::load;
pub use error::{Error, Result};
pub use link::{Link, UrlObject, link_for, relative_prefix};
pub use renderer::Renderer;
pub use site::{Category, Entity, Page, Post, Site};
pub use template::{TemplateEngine, TemplateHandle, TeraEngine};
