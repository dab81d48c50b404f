use std::fmt::{self, Display};

use crate::consts::URI_SEPARATOR;

///
/// A store address: a path on disk plus an internal node, written
/// `path/to/matrix.cool::/resolutions/10000`. The node defaults to the root `/`.
///
#[derive(Eq, PartialEq, Hash, Debug, Clone)]
pub struct StoreUri {
    pub path: String,
    pub node: String,
}

///
/// Normalize a node path to `/a/b` form; the root is `/`
///
pub fn normalize_node(node: &str) -> String {
    let parts: Vec<&str> = node.split('/').filter(|p| !p.is_empty()).collect();
    format!("/{}", parts.join("/"))
}

impl StoreUri {
    pub fn parse(uri: &str) -> Self {
        match uri.split_once(URI_SEPARATOR) {
            Some((path, node)) => StoreUri {
                path: path.to_string(),
                node: normalize_node(node),
            },
            None => StoreUri {
                path: uri.to_string(),
                node: "/".to_string(),
            },
        }
    }

    pub fn is_root(&self) -> bool {
        self.node == "/"
    }

    ///
    /// Node path relative to the store root, e.g. `resolutions/10000`
    ///
    pub fn relative_node(&self) -> &str {
        self.node.trim_start_matches('/')
    }
}

impl Display for StoreUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            write!(f, "{}", self.path)
        } else {
            write!(f, "{}{}{}", self.path, URI_SEPARATOR, self.node)
        }
    }
}
