use serde::Serialize;

pub const PARENT_DIR: &str = "../";

/// Anything that ends up with its own directory in the output and can be
/// linked to from other pages.
pub trait UrlObject {
    /// Root-relative path, also used as the output directory.
    fn url(&self) -> &str;

    /// Label used for navigation links.
    fn name(&self) -> &str;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    pub url: String,
    pub name: String,
}

/// `../` repeated `depth` times.
pub fn relative_prefix(depth: usize) -> String {
    PARENT_DIR.repeat(depth)
}

/// Link to `node` as seen from a page sitting `depth` directories below the
/// site root.
pub fn link_for<N: UrlObject + ?Sized>(node: &N, depth: usize) -> Link {
    Link {
        url: format!("{}{}", relative_prefix(depth), node.url()),
        name: node.name().to_string(),
    }
}

/// How many directories below the site root a node's `index.html` lands.
pub fn depth_of(url: &str) -> usize {
    url.split('/').filter(|segment| !segment.is_empty()).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Node(&'static str, &'static str);

    impl UrlObject for Node {
        fn url(&self) -> &str {
            self.0
        }

        fn name(&self) -> &str {
            self.1
        }
    }

    #[test]
    fn test_relative_prefix_repeats_parent_dir() {
        for depth in 0..8 {
            let prefix = relative_prefix(depth);
            assert_eq!(prefix.len(), 3 * depth);
            assert_eq!(prefix.matches(PARENT_DIR).count(), depth);
        }
        assert_eq!(relative_prefix(0), "");
        assert_eq!(relative_prefix(2), "../../");
    }

    #[test]
    fn test_link_for_prefixes_url_and_keeps_name() {
        let node = Node("category/tech", "Tech");
        for depth in 0..5 {
            let link = link_for(&node, depth);
            assert_eq!(link.url, relative_prefix(depth) + node.url());
            assert_eq!(link.name, "Tech");
        }
        assert_eq!(link_for(&node, 3).url, "../../../category/tech");
    }

    #[test]
    fn test_depth_of_matches_output_layout() {
        assert_eq!(depth_of(""), 0);
        assert_eq!(depth_of("about"), 1);
        assert_eq!(depth_of("category/tech"), 2);
        assert_eq!(depth_of("category/tech/hello"), 3);
        assert_eq!(depth_of("/category/tech/"), 2);
    }
}
