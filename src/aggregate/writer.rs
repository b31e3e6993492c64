//! Replace-or-create write-back of derived datasets.

use super::concat::VertexArray;
use crate::error::Result;
use hdf5::Group;
use tracing::debug;

/// Suffix of the link a new dataset is written under before it takes
/// over the final name.
const STAGING_SUFFIX: &str = ".staging";

/// First free staging name for `name` in `group`: `<name>.staging`, then
/// `<name>.staging.1`, `<name>.staging.2`, ... Existing links are never
/// reused, so members that happen to carry these names are left alone.
fn staging_name(group: &Group, name: &str) -> String {
    let base = format!("{}{}", name, STAGING_SUFFIX);
    let mut candidate = base.clone();
    let mut counter = 1;
    while group.link_exists(&candidate) {
        candidate = format!("{}.{}", base, counter);
        counter += 1;
    }
    candidate
}

/// Store `data` under `name` in `group`, replacing any existing member.
///
/// The array is written under a staging link first; the previous member
/// is only unlinked once the new data is complete. Returns whether an
/// existing member was replaced.
pub fn replace_or_create(group: &Group, name: &str, data: &VertexArray) -> Result<bool> {
    let staging = staging_name(group, name);
    debug!("Staging {}/{}", group.name(), staging);

    data.create_in(group, &staging)?;

    let replaced = group.link_exists(name);
    if replaced {
        debug!("Replacing existing {}/{}", group.name(), name);
        group.unlink(name)?;
    }

    group.relink(&staging, name)?;
    Ok(replaced)
}
