//! Launch merge orchestration.
//!
//! An orchestrator variant builds the merged launch header (time range,
//! name, description, mode), persists and refreshes it, applies the
//! attribute policy, adopts every source launch's item tree, hands the
//! assembled tree to its item-merge variant, and finally re-aggregates
//! statistics. Log and attachment references are rewritten in bulk while
//! items are adopted.

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::error::MergeError;
use crate::identity::{self, UniqueIdGenerator};
use crate::merge::attributes::merge_attributes;
use crate::merge::statistics::aggregate;
use crate::merge::suite::{BasicItemMerge, DeepItemMerge, ItemMergeStrategy};
use crate::merge::{MergeLaunchesRequest, ProjectContext, UserContext};
use crate::model::launch::Launch;
use crate::model::statistics::Statistics;
use crate::store::Repositories;

/// One orchestrator variant of the launch merge.
pub trait LaunchMergeStrategy {
    /// Merge `sources` into a new launch owned by `user` in `project`.
    ///
    /// # Errors
    ///
    /// Returns a typed business error for violated merge rules, or a store
    /// error if a backend fails. Partial writes committed before a failure
    /// are not rolled back here; transactional scope belongs to the
    /// persistence layer.
    fn merge_launches(
        &self,
        project: &ProjectContext,
        user: &UserContext,
        request: &MergeLaunchesRequest,
        sources: &[Launch],
    ) -> Result<Launch, MergeError>;
}

// ---------------------------------------------------------------------------
// Shared orchestration steps
// ---------------------------------------------------------------------------

pub(crate) struct LaunchMerger<'a> {
    pub(crate) repos: Repositories<'a>,
    identity: &'a dyn UniqueIdGenerator,
}

impl<'a> LaunchMerger<'a> {
    pub(crate) const fn new(repos: Repositories<'a>, identity: &'a dyn UniqueIdGenerator) -> Self {
        Self { repos, identity }
    }

    /// Create the resulting launch, apply the attribute policy, and adopt
    /// every source launch's items (reparent, re-fingerprint, re-describe).
    pub(crate) fn create_merged_launch(
        &self,
        project: &ProjectContext,
        user: &UserContext,
        request: &MergeLaunchesRequest,
        sources: &[Launch],
    ) -> Result<Launch, MergeError> {
        if sources.is_empty() {
            return Err(MergeError::EmptySources);
        }
        let (start_time, end_time) = resolve_time_range(request, sources)?;

        let name = request
            .name
            .clone()
            .unwrap_or_else(|| merged_name(sources));
        let mut launch = Launch::begin(name, project.id, user.id, start_time);
        launch.description = request
            .description
            .clone()
            .or_else(|| merged_description(sources));
        launch.end_time = Some(end_time);
        launch.mode = request.mode.unwrap_or_default();
        launch.has_retries = sources.iter().any(|source| source.has_retries);

        self.repos.launches.save(&mut launch)?;
        // Reload so generated id/number are authoritative before anything
        // references them.
        self.repos.launches.refresh(&mut launch)?;

        launch.attributes = merge_attributes(request.attributes.as_deref(), sources);
        self.repos.launches.save(&mut launch)?;

        info!(
            launch = %launch.id,
            name = %launch.name,
            sources = sources.len(),
            "created merge target launch"
        );

        let name_changed = sources
            .first()
            .is_some_and(|first| first.name != launch.name);
        self.adopt_source_items(&launch, request, sources, name_changed)?;

        Ok(launch)
    }

    /// Rewrite every source item's launch reference (and, where needed, its
    /// identity fingerprint and suite description), then move logs and
    /// attachments over.
    fn adopt_source_items(
        &self,
        launch: &Launch,
        request: &MergeLaunchesRequest,
        sources: &[Launch],
        name_changed: bool,
    ) -> Result<(), MergeError> {
        for source in sources {
            // The source could have vanished between validation and now.
            let source = self
                .repos
                .launches
                .find_by_id(source.id)?
                .ok_or(MergeError::LaunchNotFound(source.id))?;

            let mut items = self.repos.items.find_by_launch(source.id)?;
            for item in &mut items {
                item.launch_id = launch.id;
                if name_changed
                    && item
                        .unique_id
                        .as_deref()
                        .is_some_and(|unique_id| self.identity.validate(unique_id))
                {
                    let ancestors = identity::ancestor_names(self.repos.items, item)?;
                    item.unique_id = Some(self.identity.generate(item, &ancestors, launch));
                }
                if item.item_type.is_suite_level() && request.extend_suites_description {
                    let fragment = format!("@launch '{} #{}'", source.name, source.number);
                    item.description = Some(match item.description.take() {
                        Some(existing) if !existing.is_empty() => format!("{existing}\n{fragment}"),
                        _ => fragment,
                    });
                }
            }
            self.repos.items.save_all(&items)?;

            let moved_logs = self.repos.logs.reassign_launch(source.id, launch.id)?;
            let moved_attachments = self
                .repos
                .attachments
                .reassign_launch(source.id, launch.id)?;
            debug!(
                source = %source.id,
                items = items.len(),
                logs = moved_logs,
                attachments = moved_attachments,
                "adopted source launch"
            );
        }
        Ok(())
    }

    /// Re-aggregate statistics from the sources' rollups onto the merged
    /// launch, replacing any existing rows wholesale.
    pub(crate) fn aggregate_statistics(
        &self,
        launch: &Launch,
        sources: &[Launch],
    ) -> Result<Vec<Statistics>, MergeError> {
        let mut rows = Vec::new();
        for source in sources {
            rows.extend(self.repos.statistics.find_by_launch(source.id)?);
        }
        let aggregated = aggregate(launch.id, &rows);
        self.repos
            .statistics
            .replace_for_launch(launch.id, &aggregated)?;
        Ok(aggregated)
    }
}

fn resolve_time_range(
    request: &MergeLaunchesRequest,
    sources: &[Launch],
) -> Result<(DateTime<Utc>, DateTime<Utc>), MergeError> {
    let mut earliest_start: Option<DateTime<Utc>> = None;
    let mut latest_end: Option<DateTime<Utc>> = None;
    for source in sources {
        let end = source
            .end_time
            .ok_or(MergeError::InvalidSourceLaunch { id: source.id })?;
        earliest_start = Some(match earliest_start {
            Some(current) => current.min(source.start_time),
            None => source.start_time,
        });
        latest_end = Some(match latest_end {
            Some(current) => current.max(end),
            None => end,
        });
    }
    let (Some(earliest_start), Some(latest_end)) = (earliest_start, latest_end) else {
        return Err(MergeError::EmptySources);
    };

    let start = request.start_time.unwrap_or(earliest_start);
    let end = request.end_time.unwrap_or(latest_end);
    if end < start {
        return Err(MergeError::FinishTimeEarlierThanStartTime { start, end });
    }
    Ok((start, end))
}

fn merged_name(sources: &[Launch]) -> String {
    let mut distinct: Vec<&str> = Vec::new();
    for source in sources {
        if !distinct.contains(&source.name.as_str()) {
            distinct.push(&source.name);
        }
    }
    format!("Merged: {}", distinct.join(", "))
}

fn merged_description(sources: &[Launch]) -> Option<String> {
    let parts: Vec<&str> = sources
        .iter()
        .filter_map(|source| source.description.as_deref())
        .filter(|description| !description.is_empty())
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("\n\n"))
    }
}

// ---------------------------------------------------------------------------
// Variants
// ---------------------------------------------------------------------------

/// Orchestrator for [`crate::merge::MergeStrategyType::Basic`]: assemble the
/// launch and fold same-named suites scope-by-scope.
pub struct BasicLaunchMerge<'a> {
    merger: LaunchMerger<'a>,
}

impl<'a> BasicLaunchMerge<'a> {
    #[must_use]
    pub const fn new(repos: Repositories<'a>, identity: &'a dyn UniqueIdGenerator) -> Self {
        Self {
            merger: LaunchMerger::new(repos, identity),
        }
    }
}

impl LaunchMergeStrategy for BasicLaunchMerge<'_> {
    fn merge_launches(
        &self,
        project: &ProjectContext,
        user: &UserContext,
        request: &MergeLaunchesRequest,
        sources: &[Launch],
    ) -> Result<Launch, MergeError> {
        let launch = self
            .merger
            .create_merged_launch(project, user, request, sources)?;
        BasicItemMerge::new(self.merger.repos.items).merge_items(&launch)?;
        self.merger.aggregate_statistics(&launch, sources)?;
        info!(launch = %launch.id, "basic launch merge finished");
        Ok(launch)
    }
}

/// Orchestrator for [`crate::merge::MergeStrategyType::Deep`]: assemble the
/// launch and fold duplicates across all descendants by unique id.
pub struct DeepLaunchMerge<'a> {
    merger: LaunchMerger<'a>,
}

impl<'a> DeepLaunchMerge<'a> {
    #[must_use]
    pub const fn new(repos: Repositories<'a>, identity: &'a dyn UniqueIdGenerator) -> Self {
        Self {
            merger: LaunchMerger::new(repos, identity),
        }
    }
}

impl LaunchMergeStrategy for DeepLaunchMerge<'_> {
    fn merge_launches(
        &self,
        project: &ProjectContext,
        user: &UserContext,
        request: &MergeLaunchesRequest,
        sources: &[Launch],
    ) -> Result<Launch, MergeError> {
        let launch = self
            .merger
            .create_merged_launch(project, user, request, sources)?;
        DeepItemMerge::new(self.merger.repos.items).merge_items(&launch)?;
        self.merger.aggregate_statistics(&launch, sources)?;
        info!(launch = %launch.id, "deep launch merge finished");
        Ok(launch)
    }
}

#[cfg(test)]
mod tests {
    use super::{merged_description, merged_name, resolve_time_range};
    use crate::error::{MergeError, MergeErrorCode};
    use crate::merge::{MergeLaunchesRequest, MergeStrategyType};
    use crate::model::ids::LaunchId;
    use crate::model::launch::{Launch, LaunchStatus};
    use chrono::{Duration, Utc};

    fn finished(name: &str, offset_minutes: i64, length_minutes: i64) -> Launch {
        let start = Utc::now() + Duration::minutes(offset_minutes);
        let mut launch = Launch::begin(name, 1, 1, start);
        launch.id = LaunchId(offset_minutes + 100);
        launch.status = LaunchStatus::Passed;
        launch.end_time = Some(start + Duration::minutes(length_minutes));
        launch
    }

    fn request() -> MergeLaunchesRequest {
        MergeLaunchesRequest::new(vec![], MergeStrategyType::Deep)
    }

    #[test]
    fn time_range_spans_all_sources() {
        let sources = [finished("a", 10, 30), finished("b", 0, 5), finished("c", 20, 60)];
        let (start, end) = resolve_time_range(&request(), &sources).unwrap();
        assert_eq!(start, sources[1].start_time);
        assert_eq!(end, sources[2].end_time.unwrap());
    }

    #[test]
    fn explicit_overrides_replace_the_computed_range() {
        let sources = [finished("a", 0, 30)];
        let mut rq = request();
        rq.start_time = Some(sources[0].start_time - Duration::hours(1));
        rq.end_time = Some(sources[0].start_time + Duration::hours(2));
        let (start, end) = resolve_time_range(&rq, &sources).unwrap();
        assert_eq!(start, rq.start_time.unwrap());
        assert_eq!(end, rq.end_time.unwrap());
    }

    #[test]
    fn inverted_range_is_rejected() {
        let sources = [finished("a", 0, 30)];
        let mut rq = request();
        rq.start_time = Some(sources[0].start_time);
        rq.end_time = Some(sources[0].start_time - Duration::seconds(1));
        let err = resolve_time_range(&rq, &sources).unwrap_err();
        assert_eq!(err.code(), MergeErrorCode::FinishTimeEarlierThanStartTime);
    }

    #[test]
    fn unfinished_source_is_rejected_even_with_overrides() {
        let mut unfinished = finished("a", 0, 30);
        unfinished.end_time = None;
        let mut rq = request();
        rq.start_time = Some(unfinished.start_time);
        rq.end_time = Some(unfinished.start_time + Duration::hours(1));
        let err = resolve_time_range(&rq, &[unfinished]).unwrap_err();
        assert!(matches!(err, MergeError::InvalidSourceLaunch { .. }));
    }

    #[test]
    fn merged_name_joins_distinct_source_names() {
        let sources = [finished("smoke", 0, 1), finished("smoke", 1, 1), finished("full", 2, 1)];
        assert_eq!(merged_name(&sources), "Merged: smoke, full");
    }

    #[test]
    fn merged_description_skips_empty_sources() {
        let mut a = finished("a", 0, 1);
        a.description = Some("first".to_string());
        let b = finished("b", 1, 1);
        let mut c = finished("c", 2, 1);
        c.description = Some("third".to_string());
        assert_eq!(
            merged_description(&[a, b, c]).as_deref(),
            Some("first\n\nthird")
        );

        let bare = [finished("a", 0, 1)];
        assert_eq!(merged_description(&bare), None);
    }
}
