//! Validation and finalization shell around the merge orchestrators.
//!
//! The service is what request handlers call: it checks the request against
//! the stored launches, resolves the strategy, runs the merge, derives the
//! final status from the aggregated counters, and deletes the emptied
//! source launches.

use tracing::info;

use crate::error::MergeError;
use crate::identity::UniqueIdGenerator;
use crate::merge::statistics::status_from_statistics;
use crate::merge::{MergeLaunchesRequest, MergeStrategyRegistry, ProjectContext, UserContext};
use crate::model::launch::Launch;
use crate::store::Repositories;

/// Entry point for merging launches.
pub struct MergeService<'a> {
    repos: Repositories<'a>,
    registry: MergeStrategyRegistry<'a>,
}

impl<'a> MergeService<'a> {
    #[must_use]
    pub const fn new(repos: Repositories<'a>, identity: &'a dyn UniqueIdGenerator) -> Self {
        Self {
            repos,
            registry: MergeStrategyRegistry::new(repos, identity),
        }
    }

    /// Merge the launches named by `request` into a new launch.
    ///
    /// Validations, in order: the request names at least one launch; every
    /// named launch exists; every source is finished and belongs to
    /// `project`. After the merge the launch status is derived from the
    /// aggregated statistics and the source launches are deleted.
    ///
    /// # Errors
    ///
    /// Returns a typed [`MergeError`] for each violated rule; store failures
    /// surface as [`MergeError::Store`]. A failure can leave already
    /// committed writes behind; callers must inspect before retrying.
    pub fn merge_launches(
        &self,
        project: &ProjectContext,
        user: &UserContext,
        request: &MergeLaunchesRequest,
    ) -> Result<Launch, MergeError> {
        if request.launches.is_empty() {
            return Err(MergeError::EmptySources);
        }
        let sources = self.repos.launches.find_all_by_ids(&request.launches)?;
        if sources.len() != request.launches.len() {
            return Err(MergeError::LaunchesNotFound {
                requested: request.launches.len(),
                found: sources.len(),
            });
        }
        for source in &sources {
            if !source.status.is_finished() {
                return Err(MergeError::LaunchNotFinished {
                    id: source.id,
                    status: source.status,
                });
            }
            if source.project_id != project.id {
                return Err(MergeError::ProjectMismatch {
                    id: source.id,
                    actual: source.project_id,
                    expected: project.id,
                });
            }
        }

        info!(
            project = project.id,
            user = user.id,
            merge_type = %request.merge_type,
            sources = sources.len(),
            "merging launches"
        );

        let strategy = self.registry.resolve(request.merge_type);
        let mut merged = strategy.merge_launches(project, user, request, &sources)?;

        let rows = self.repos.statistics.find_by_launch(merged.id)?;
        merged.status = status_from_statistics(&rows);
        self.repos.launches.save(&mut merged)?;

        for source in &sources {
            self.repos.launches.delete(source.id)?;
        }

        info!(
            launch = %merged.id,
            status = %merged.status,
            "launch merge complete"
        );
        Ok(merged)
    }
}
