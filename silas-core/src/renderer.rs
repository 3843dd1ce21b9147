use serde_json::{Map, Value};

use crate::error::Result;
use crate::link::Link;
use crate::template::TemplateEngine;

pub const CATEGORIES_KEY: &str = "categories";

/// Binds entity arguments and navigation links into a template.
pub struct Renderer<E> {
    engine: E,
}

impl<E: TemplateEngine> Renderer<E> {
    pub fn new(engine: E) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Render `template` with `args` plus the `categories` navigation list.
    /// Nothing is cached, every call goes through the engine.
    pub fn render(
        &mut self,
        template: &str,
        mut args: Map<String, Value>,
        categories: &[Link],
    ) -> Result<String> {
        args.insert(CATEGORIES_KEY.to_string(), serde_json::json!(categories));

        let handle = self.engine.resolve(template)?;
        self.engine.render(&handle, &args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::template::TemplateHandle;
    use serde_json::json;

    #[derive(Default)]
    struct EchoEngine {
        resolved: Vec<String>,
    }

    impl TemplateEngine for EchoEngine {
        fn resolve(&mut self, name: &str) -> Result<TemplateHandle> {
            if name == "missing.html" {
                return Err(Error::TemplateRender {
                    template: name.to_string(),
                    source: tera::Error::msg("not found"),
                });
            }
            self.resolved.push(name.to_string());
            Ok(TemplateHandle::new(name))
        }

        fn render(&self, handle: &TemplateHandle, args: &Map<String, Value>) -> Result<String> {
            Ok(format!("{}:{}", handle.name(), Value::Object(args.clone())))
        }
    }

    #[test]
    fn test_categories_merged_into_args() {
        let mut renderer = Renderer::new(EchoEngine::default());
        let mut args = Map::new();
        args.insert("title".into(), json!("Hello"));
        let links = vec![Link {
            url: "../../../category/tech".into(),
            name: "Tech".into(),
        }];

        let out = renderer.render("tech/a.html", args, &links).unwrap();
        let (template, json) = out.split_once(':').unwrap();
        let json: Value = serde_json::from_str(json).unwrap();

        assert_eq!(template, "tech/a.html");
        assert_eq!(
            json,
            json!({
                "title": "Hello",
                "categories": [{"url": "../../../category/tech", "name": "Tech"}],
            })
        );
    }

    #[test]
    fn test_every_call_resolves_again() {
        let mut renderer = Renderer::new(EchoEngine::default());
        renderer.render("a.html", Map::new(), &[]).unwrap();
        renderer.render("a.html", Map::new(), &[]).unwrap();
        assert_eq!(renderer.engine().resolved, vec!["a.html", "a.html"]);
    }

    #[test]
    fn test_engine_errors_propagate() {
        let mut renderer = Renderer::new(EchoEngine::default());
        let err = renderer.render("missing.html", Map::new(), &[]).unwrap_err();
        assert!(matches!(err, Error::TemplateRender { .. }));
    }
}
