//! Group discovery inside an HDF5 file.
//!
//! Target groups are selected by a name prefix at the file root; the
//! source group is found by a depth-first search of the whole tree.
//!
//! Traversal order: at every visited group its direct child groups are
//! checked for a name match first, then the search descends into each
//! child group. Children are identified by the name of the link that
//! reaches them, so soft links and extra hard links match under their
//! own names. They are visited in ascending byte-wise order of those
//! link names, so the first match is deterministic even when several
//! groups share the searched name.

use crate::error::{LcmvError, Result};
use hdf5::Group;
use tracing::debug;

/// Deepest link path the search follows before giving up. Only reachable
/// through links that loop back onto an ancestor.
pub const MAX_SEARCH_DEPTH: usize = 1000;

/// A group together with the link path it was reached through.
#[derive(Debug, Clone)]
pub struct FoundGroup {
    /// Link path from the file root, e.g. `/ens_B/spatial_position`.
    pub path: String,
    pub group: Group,
}

/// Keep the names that start with `prefix`, preserving input order.
pub fn filter_by_prefix<I, S>(names: I, prefix: &str) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    names
        .into_iter()
        .map(Into::into)
        .filter(|name: &String| name.starts_with(prefix))
        .collect()
}

fn join_path(parent: &str, name: &str) -> String {
    if parent.ends_with('/') {
        format!("{}{}", parent, name)
    } else {
        format!("{}/{}", parent, name)
    }
}

/// Direct child groups of `group`, keyed and ordered by link name.
///
/// Links that do not open as a group (datasets, dangling soft links) are
/// skipped.
fn child_groups(group: &Group) -> Result<Vec<(String, Group)>> {
    let mut children: Vec<(String, Group)> = group
        .member_names()?
        .into_iter()
        .filter_map(|name| group.group(&name).ok().map(|child| (name, child)))
        .collect();
    children.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(children)
}

/// Search below `start` for the first group linked as `name`.
///
/// Returns `Ok(None)` when no group in the subtree is reachable under
/// that name. Datasets with a matching name are not considered.
pub fn find_group(start: &Group, name: &str) -> Result<Option<FoundGroup>> {
    let start_path = start.name();
    let mut stack = vec![(start_path.clone(), start.clone(), 0usize)];

    while let Some((path, current, depth)) = stack.pop() {
        if depth >= MAX_SEARCH_DEPTH {
            return Err(LcmvError::SearchTooDeep {
                name: name.to_string(),
                path,
            });
        }

        let children = child_groups(&current)?;

        if let Some((link, found)) = children.iter().find(|(link, _)| link == name) {
            let path = join_path(&path, link);
            debug!("Found group '{}' at {}", name, path);
            return Ok(Some(FoundGroup {
                path,
                group: found.clone(),
            }));
        }

        // Reverse so the smallest name is popped next
        stack.extend(
            children
                .into_iter()
                .rev()
                .map(|(link, child)| (join_path(&path, &link), child, depth + 1)),
        );
    }

    debug!("Group '{}' not found below {}", name, start_path);
    Ok(None)
}
