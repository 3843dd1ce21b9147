use serde::Serialize;
use serde_json::{Map, Value, json};

use crate::link::UrlObject;

pub const CATEGORY_URL_PREFIX: &str = "category";
pub const CATEGORY_TEMPLATE: &str = "category.html";
pub const INDEX_PAGE: &str = "index";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Post {
    pub url: String,
    pub title: String,
    /// Template reference, relative to the content root.
    pub template: String,
    /// Handed to templates as-is. Drafts are still rendered.
    pub draft: bool,
}

impl Post {
    pub fn args(&self) -> Map<String, Value> {
        into_map(json!({ "title": self.title }))
    }
}

impl UrlObject for Post {
    fn url(&self) -> &str {
        &self.url
    }

    fn name(&self) -> &str {
        &self.title
    }
}

/// Top-level pages are posts that live outside any category.
pub type Page = Post;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Category {
    pub key: String,
    pub url: String,
    pub name: String,
    pub posts: Vec<Post>,
}

impl Category {
    pub fn url_for(key: &str) -> String {
        format!("{CATEGORY_URL_PREFIX}/{key}")
    }

    pub fn args(&self) -> Map<String, Value> {
        into_map(json!({
            "title": format!("Category - {}", self.name),
            "name": self.name,
            "posts": self.posts,
        }))
    }
}

impl UrlObject for Category {
    fn url(&self) -> &str {
        &self.url
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Everything one build renders. Built fresh from the descriptors on every
/// run and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Site {
    pub title: String,
    pub categories: Vec<Category>,
    /// Declaration order, `index` first.
    pub pages: Vec<(String, Page)>,
}

impl Site {
    pub fn page(&self, key: &str) -> Option<&Page> {
        self.pages.iter().find(|(k, _)| k == key).map(|(_, page)| page)
    }

    /// Every renderable node in build order: each category followed by its
    /// posts, then the top-level pages.
    pub fn entities(&self) -> Vec<Entity<'_>> {
        let mut entities = Vec::new();
        for category in &self.categories {
            entities.push(Entity::Category(category));
            entities.extend(category.posts.iter().map(Entity::Post));
        }
        entities.extend(self.pages.iter().map(|(_, page)| Entity::Page(page)));
        entities
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Entity<'a> {
    Category(&'a Category),
    Post(&'a Post),
    Page(&'a Page),
}

impl Entity<'_> {
    pub fn template(&self) -> &str {
        match self {
            Entity::Category(_) => CATEGORY_TEMPLATE,
            Entity::Post(post) | Entity::Page(post) => &post.template,
        }
    }

    pub fn args(&self) -> Map<String, Value> {
        match self {
            Entity::Category(category) => category.args(),
            Entity::Post(post) | Entity::Page(post) => post.args(),
        }
    }
}

impl UrlObject for Entity<'_> {
    fn url(&self) -> &str {
        match self {
            Entity::Category(category) => category.url(),
            Entity::Post(post) | Entity::Page(post) => post.url(),
        }
    }

    fn name(&self) -> &str {
        match self {
            Entity::Category(category) => category.name(),
            Entity::Post(post) | Entity::Page(post) => post.name(),
        }
    }
}

fn into_map(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(url: &str, title: &str) -> Post {
        Post {
            url: url.to_string(),
            title: title.to_string(),
            template: format!("tech/{title}.html"),
            draft: false,
        }
    }

    fn site() -> Site {
        Site {
            title: "Blog".into(),
            categories: vec![
                Category {
                    key: "tech".into(),
                    url: Category::url_for("tech"),
                    name: "Tech".into(),
                    posts: vec![post("category/tech/a", "a"), post("category/tech/b", "b")],
                },
                Category {
                    key: "life".into(),
                    url: Category::url_for("life"),
                    name: "Life".into(),
                    posts: vec![],
                },
            ],
            pages: vec![(INDEX_PAGE.into(), post("", "home"))],
        }
    }

    #[test]
    fn test_entities_follow_build_order() {
        let site = site();
        let entities = site.entities();
        let urls: Vec<&str> = entities.iter().map(|e| e.url()).collect();
        assert_eq!(
            urls,
            vec!["category/tech", "category/tech/a", "category/tech/b", "category/life", ""]
        );
    }

    #[test]
    fn test_category_args() {
        let site = site();
        let args = site.categories[0].args();
        assert_eq!(args["title"], "Category - Tech");
        assert_eq!(args["name"], "Tech");
        assert_eq!(args["posts"][1]["url"], "category/tech/b");
        assert_eq!(args["posts"][1]["draft"], false);
    }

    #[test]
    fn test_post_args_and_template() {
        let site = site();
        let entity = Entity::Post(&site.categories[0].posts[0]);
        assert_eq!(entity.template(), "tech/a.html");
        assert_eq!(entity.args().len(), 1);
        assert_eq!(entity.args()["title"], "a");
        assert_eq!(Entity::Category(&site.categories[1]).template(), CATEGORY_TEMPLATE);
    }

    #[test]
    fn test_page_lookup() {
        let site = site();
        assert_eq!(site.page(INDEX_PAGE).map(|p| p.url.as_str()), Some(""));
        assert!(site.page("about").is_none());
    }
}
