use std::fmt;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::de::{DeserializeOwned, MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::site::{Category, INDEX_PAGE, Page, Post, Site};

pub const CONFIG_FILE: &str = "config.json";
const EMPTY_CATEGORY_CONFIG: &str = "{}";

/// Root descriptor, `config.json` at the content root.
#[derive(Deserialize, Debug)]
pub struct SiteConfig {
    pub title: String,
    #[serde(deserialize_with = "ordered_map")]
    pub pages: Vec<(String, String)>,
    #[serde(deserialize_with = "ordered_map")]
    pub categories: Vec<(String, CategoryConfig)>,
}

impl SiteConfig {
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                Error::ConfigNotFound {
                    path: path.to_path_buf(),
                }
            } else {
                Error::ConfigRead {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;

        // Syntax is checked on its own so that a missing key is reported as
        // a schema problem. `Value` sorts keys, hence the second pass over
        // the raw text.
        serde_json::from_str::<serde::de::IgnoredAny>(&data).map_err(|source| {
            Error::ConfigParse {
                path: path.to_path_buf(),
                source,
            }
        })?;
        let config: SiteConfig = serde_json::from_str(&data).map_err(|e| Error::ConfigSchema {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let keys = config.categories.iter().map(|(key, _)| key);
        for key in keys.chain(config.pages.iter().map(|(key, _)| key)) {
            if let Some(message) = invalid_key(key) {
                return Err(Error::ConfigSchema {
                    path: path.to_path_buf(),
                    message,
                });
            }
        }

        if !config.pages.iter().any(|(key, _)| key == INDEX_PAGE) {
            return Err(Error::ConfigSchema {
                path: path.to_path_buf(),
                message: format!("missing field `pages.{INDEX_PAGE}`"),
            });
        }

        Ok(config)
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct CategoryConfig {
    pub name: String,
    pub path: String,
}

/// One entry of a category descriptor.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct PostConfig {
    pub path: String,
    pub title: String,
    #[serde(default)]
    pub draft: bool,
}

/// Posts declared in `dir/config.json`, in file order.
///
/// When the descriptor does not exist yet it is created as `{}` first, so a
/// freshly declared category builds with no posts. An existing file is never
/// touched.
pub fn read_or_init_category_config(dir: &Path) -> Result<Vec<(String, PostConfig)>> {
    let path = dir.join(CONFIG_FILE);
    if !path.is_file() {
        debug!("Creating empty category config {}", path.display());
        std::fs::write(&path, EMPTY_CATEGORY_CONFIG).map_err(|source| Error::IoWrite {
            path: path.clone(),
            source,
        })?;
    }

    let data = std::fs::read_to_string(&path).map_err(|source| Error::ConfigRead {
        path: path.clone(),
        source,
    })?;

    let posts: OrderedMap<PostConfig> =
        serde_json::from_str(&data).map_err(|source| Error::CategoryConfigParse {
            path: path.clone(),
            source,
        })?;

    if let Some(message) = posts.0.iter().find_map(|(key, _)| invalid_key(key)) {
        return Err(Error::CategoryConfigParse {
            path,
            source: serde::de::Error::custom(message),
        });
    }

    Ok(posts.0)
}

/// Read every descriptor under `root` and assemble the site.
pub fn load<P: AsRef<Path>>(root: P) -> Result<Site> {
    let root = root.as_ref();
    let config = SiteConfig::read(root.join(CONFIG_FILE))?;

    let mut categories = Vec::with_capacity(config.categories.len());
    for (key, category) in &config.categories {
        categories.push(load_category(root, key, category)?);
    }

    let pages = config
        .pages
        .iter()
        .map(|(key, template)| {
            let url = if key == INDEX_PAGE {
                String::new()
            } else {
                key.clone()
            };
            let page = Page {
                url,
                title: config.title.clone(),
                template: template.clone(),
                draft: false,
            };
            (key.clone(), page)
        })
        .collect::<Vec<_>>();

    Ok(Site {
        title: config.title,
        categories,
        pages: index_first(pages),
    })
}

fn load_category(root: &Path, key: &str, config: &CategoryConfig) -> Result<Category> {
    let content_path: PathBuf = root.join(&config.path);
    let url = Category::url_for(key);

    let posts = read_or_init_category_config(&content_path)?
        .into_iter()
        .map(|(post_key, post)| Post {
            url: format!("{url}/{post_key}"),
            title: post.title,
            template: template_ref(&config.path, &post.path),
            draft: post.draft,
        })
        .collect::<Vec<_>>();

    info!("Loaded category '{}' with {} posts", key, posts.len());

    Ok(Category {
        key: key.to_string(),
        url,
        name: config.name.clone(),
        posts,
    })
}

/// Keys become output directory names, so each must be one plain path
/// segment that stays inside the export directory.
fn invalid_key(key: &str) -> Option<String> {
    if key.is_empty() || key == "." || key == ".." || key.contains(['/', '\\', ':']) {
        Some(format!("`{key}` is not a valid key, expected a single path segment"))
    } else {
        None
    }
}

/// Template names always use `/`, whatever the host separator is.
fn template_ref(dir: &str, file: &str) -> String {
    let dir = dir.trim_end_matches(['/', '\\']);
    if dir.is_empty() || dir == "." {
        file.to_string()
    } else {
        format!("{dir}/{file}")
    }
}

fn index_first(mut pages: Vec<(String, Page)>) -> Vec<(String, Page)> {
    if let Some(pos) = pages.iter().position(|(key, _)| key == INDEX_PAGE) {
        let index = pages.remove(pos);
        pages.insert(0, index);
    }
    pages
}

/// JSON object decoded as `(key, value)` pairs in document order.
struct OrderedMap<T>(Vec<(String, T)>);

impl<'de, T: DeserializeOwned> Deserialize<'de> for OrderedMap<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct OrderedMapVisitor<T>(PhantomData<T>);

        impl<'de, T: DeserializeOwned> Visitor<'de> for OrderedMapVisitor<T> {
            type Value = OrderedMap<T>;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a JSON object")
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                mut access: A,
            ) -> std::result::Result<Self::Value, A::Error> {
                let mut entries: Vec<(String, T)> =
                    Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((key, value)) = access.next_entry::<String, T>()? {
                    // A repeated key keeps its first position and its last value.
                    match entries.iter_mut().find(|(existing, _)| *existing == key) {
                        Some(entry) => entry.1 = value,
                        None => entries.push((key, value)),
                    }
                }
                Ok(OrderedMap(entries))
            }
        }

        deserializer.deserialize_map(OrderedMapVisitor(PhantomData))
    }
}

fn ordered_map<'de, D, T>(deserializer: D) -> std::result::Result<Vec<(String, T)>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    OrderedMap::<T>::deserialize(deserializer).map(|map| map.0)
}
