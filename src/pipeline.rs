//! Per-file run: select targets, build vertices once, write each target.
//!
//! The concatenation happens before any target is touched, so lookup,
//! naming, and shape failures leave the file unmodified. Targets written
//! before a later write failure stay committed.

use crate::aggregate::{concatenate_members, replace_or_create, SortKey, VertexArray};
use crate::config::LayoutConfig;
use crate::error::{LcmvError, Result};
use crate::locator::{filter_by_prefix, find_group};
use crate::models::{RunSummary, TargetOutcome};
use hdf5::Group;
use tracing::{debug, info};

/// Source members stacked in index order.
#[derive(Debug, Clone)]
pub struct Aggregation {
    /// Full path of the source group.
    pub source_path: String,
    /// Member names in concatenation order.
    pub members: Vec<String>,
    /// The stacked array.
    pub vertices: VertexArray,
}

/// Top-level member names starting with `prefix`.
pub fn resolve_targets(root: &Group, prefix: &str) -> Result<Vec<String>> {
    Ok(filter_by_prefix(root.member_names()?, prefix))
}

/// Locate the source group anywhere below `root` and stack its members.
pub fn aggregate_source(root: &Group, layout: &LayoutConfig) -> Result<Aggregation> {
    let source = find_group(root, &layout.source_group)?.ok_or_else(|| {
        LcmvError::GroupNotFound {
            name: layout.source_group.clone(),
            start: root.name(),
        }
    })?;
    let source_path = source.path;
    info!("Source group: {}", source_path);

    let members = SortKey::from(layout).order(source.group.member_names()?)?;
    debug!("Concatenation order: {:?}", members);

    let vertices = concatenate_members(&source.group, &members)?;
    info!(
        "Concatenated {} datasets into {} ({})",
        members.len(),
        vertices.shape(),
        vertices.element_type()
    );

    Ok(Aggregation {
        source_path,
        members,
        vertices,
    })
}

/// Write the aggregation into one target group.
///
/// With `dry_run` the target is resolved but nothing is written.
pub fn write_target(
    root: &Group,
    target: &str,
    aggregation: &Aggregation,
    layout: &LayoutConfig,
    dry_run: bool,
) -> Result<TargetOutcome> {
    let found = find_group(root, target)?.ok_or_else(|| LcmvError::GroupNotFound {
        name: target.to_string(),
        start: root.name(),
    })?;
    let (group_path, group) = (found.path, found.group);
    let name = layout.output_dataset.as_str();

    let (replaced, written) = if dry_run {
        (group.link_exists(name), false)
    } else {
        (replace_or_create(&group, name, &aggregation.vertices)?, true)
    };

    Ok(TargetOutcome {
        group_path,
        dataset_name: name.to_string(),
        shape: aggregation.vertices.shape(),
        replaced,
        written,
    })
}

/// Process every target group of an open file.
///
/// `on_target` is called after each target so results are reported even
/// when a later target fails.
pub fn process<F>(
    root: &Group,
    prefix: &str,
    layout: &LayoutConfig,
    dry_run: bool,
    mut on_target: F,
) -> Result<RunSummary>
where
    F: FnMut(&TargetOutcome),
{
    layout.validate()?;

    let targets = resolve_targets(root, prefix)?;
    if targets.is_empty() {
        info!("No groups starting with '{}' in {}", prefix, root.name());
        return Ok(RunSummary::default());
    }
    info!("Found {} ensemble groups: {:?}", targets.len(), targets);

    let aggregation = aggregate_source(root, layout)?;

    let mut summary = RunSummary {
        source_path: Some(aggregation.source_path.clone()),
        members: aggregation.members.clone(),
        targets: Vec::with_capacity(targets.len()),
    };

    for target in &targets {
        let outcome = write_target(root, target, &aggregation, layout, dry_run)?;
        on_target(&outcome);
        summary.targets.push(outcome);
    }

    Ok(summary)
}
