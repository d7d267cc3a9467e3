//! Flat-list and directory-tree renderings of a change set.

use std::collections::BTreeMap;

use crate::core::{ChangeSet, ChangeStatus, RelPath};

/// How the changed-file dialog lays out its entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    /// One row per file, labelled with the full path.
    #[default]
    List,
    /// Files grouped under their directories.
    Tree,
}

impl ViewMode {
    /// The other mode.
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            ViewMode::List => ViewMode::Tree,
            ViewMode::Tree => ViewMode::List,
        }
    }
}

/// A node of the rendered change set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeNode {
    /// A changed file.
    File {
        /// Full repository-relative path.
        path: RelPath,
        /// Text shown for the node.
        name: String,
        /// Kind of change.
        status: ChangeStatus,
    },
    /// A directory grouping changed files.
    Folder {
        /// Directory path, without trailing slash.
        path: String,
        /// Text shown for the node (may span several segments, e.g. `src/core`).
        name: String,
        /// Sub-folders first, then files, each sorted by name.
        children: Vec<ChangeNode>,
        /// Whether children are shown.
        expanded: bool,
    },
}

impl ChangeNode {
    /// Only files can be opened in a compare.
    pub fn is_comparable(&self) -> bool {
        matches!(self, ChangeNode::File { .. })
    }

    /// Text shown for the node.
    pub fn name(&self) -> &str {
        match self {
            ChangeNode::File { name, .. } | ChangeNode::Folder { name, .. } => name,
        }
    }

    fn set_expanded_recursive(&mut self, value: bool) {
        if let ChangeNode::Folder {
            children, expanded, ..
        } = self
        {
            *expanded = value;
            for child in children {
                child.set_expanded_recursive(value);
            }
        }
    }
}

/// A node flattened for display, with its nesting depth.
#[derive(Debug, Clone, Copy)]
pub struct NodeRow<'a> {
    /// Nesting depth, zero for top-level nodes.
    pub depth: usize,
    /// The node itself.
    pub node: &'a ChangeNode,
}

/// Render a change set in the given mode.
pub fn render_nodes(changes: &ChangeSet, mode: ViewMode) -> Vec<ChangeNode> {
    match mode {
        ViewMode::List => list_nodes(changes),
        ViewMode::Tree => tree_nodes(changes),
    }
}

/// One file node per change, in path order.
pub fn list_nodes(changes: &ChangeSet) -> Vec<ChangeNode> {
    changes
        .iter()
        .map(|(path, status)| ChangeNode::File {
            path: path.clone(),
            name: path.as_str().to_string(),
            status: *status,
        })
        .collect()
}

#[derive(Default)]
struct DirBuilder {
    dirs: BTreeMap<String, DirBuilder>,
    files: Vec<(RelPath, ChangeStatus)>,
}

impl DirBuilder {
    fn insert(&mut self, path: &RelPath, status: ChangeStatus) {
        let segments: Vec<&str> = path.segments().collect();
        let Some((_, dirs)) = segments.split_last() else {
            return;
        };
        let mut node = self;
        for dir in dirs {
            node = node.dirs.entry((*dir).to_string()).or_default();
        }
        node.files.push((path.clone(), status));
    }

    fn into_nodes(self, prefix: &str) -> Vec<ChangeNode> {
        let mut nodes = Vec::with_capacity(self.dirs.len() + self.files.len());

        for (name, mut dir) in self.dirs {
            let mut name = name;
            let mut path = join(prefix, &name);
            // Fold chains of single-directory folders into one node.
            while dir.files.is_empty() && dir.dirs.len() == 1 {
                let Some((child_name, child)) = dir.dirs.pop_first() else {
                    break;
                };
                name = format!("{name}/{child_name}");
                path = join(prefix, &name);
                dir = child;
            }
            nodes.push(ChangeNode::Folder {
                children: dir.into_nodes(&path),
                path,
                name,
                expanded: true,
            });
        }

        let mut files = self.files;
        files.sort_by(|a, b| a.0.cmp(&b.0));
        nodes.extend(files.into_iter().map(|(path, status)| ChangeNode::File {
            name: path.file_name().to_string(),
            path,
            status,
        }));
        nodes
    }
}

fn join(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}/{name}")
    }
}

/// Group changes under their directories.
pub fn tree_nodes(changes: &ChangeSet) -> Vec<ChangeNode> {
    let mut root = DirBuilder::default();
    for (path, status) in changes {
        root.insert(path, *status);
    }
    root.into_nodes("")
}

/// Expand or collapse every folder.
pub fn set_all_expanded(nodes: &mut [ChangeNode], expanded: bool) {
    for node in nodes {
        node.set_expanded_recursive(expanded);
    }
}

/// Flatten visible nodes depth-first. Children of collapsed folders are skipped.
pub fn visible_rows(nodes: &[ChangeNode]) -> Vec<NodeRow<'_>> {
    fn walk<'a>(nodes: &'a [ChangeNode], depth: usize, out: &mut Vec<NodeRow<'a>>) {
        for node in nodes {
            out.push(NodeRow { depth, node });
            if let ChangeNode::Folder {
                children,
                expanded: true,
                ..
            } = node
            {
                walk(children, depth + 1, out);
            }
        }
    }

    let mut rows = Vec::new();
    walk(nodes, 0, &mut rows);
    rows
}

/// Find the file node for a path anywhere in the rendering.
pub fn find_file<'a>(nodes: &'a [ChangeNode], target: &RelPath) -> Option<&'a ChangeNode> {
    nodes.iter().find_map(|node| match node {
        ChangeNode::File { path, .. } if path == target => Some(node),
        ChangeNode::File { .. } => None,
        ChangeNode::Folder { children, .. } => find_file(children, target),
    })
}
