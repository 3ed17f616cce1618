use braid_core::identity::FingerprintGenerator;
use braid_core::merge::service::MergeService;
use braid_core::merge::{MergeLaunchesRequest, MergeStrategyType, ProjectContext, UserContext};
use braid_core::model::ids::TestItemId;
use braid_core::model::item::{ItemResults, ItemStatus, TestItem, TestItemType};
use braid_core::model::launch::{Launch, LaunchStatus};
use braid_core::model::statistics::{EXECUTIONS_PASSED, EXECUTIONS_TOTAL, Statistics};
use braid_core::store::memory::InMemoryStore;
use chrono::{DateTime, Duration, Utc};
use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use std::collections::BTreeSet;

const SUITES: usize = 8;
const STEPS_PER_SUITE: usize = 16;

fn t(minutes: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_micros(1_700_000_000_000_000).unwrap() + Duration::minutes(minutes)
}

/// Two launches with identical suite/step layout, ids and uids disjoint per
/// launch except for matching fingerprints across launches.
fn seed_store(launch_count: usize) -> (InMemoryStore, Vec<Launch>) {
    let store = InMemoryStore::new();
    let repos = store.repositories();
    let mut launches = Vec::new();
    for launch_index in 0..launch_count {
        let offset = launch_index as i64 * 60;
        let mut launch = Launch::begin("nightly", 1, 1, t(offset));
        launch.status = LaunchStatus::Passed;
        launch.end_time = Some(t(offset + 45));
        repos.launches.save(&mut launch).unwrap();

        for suite_index in 0..SUITES {
            let mut suite = blank_item(
                &launch,
                &format!("Suite {suite_index}"),
                TestItemType::Suite,
                None,
            );
            suite.unique_id = Some(format!("auto:{:064x}", suite_index));
            repos.items.save(&mut suite).unwrap();
            for step_index in 0..STEPS_PER_SUITE {
                let mut step = blank_item(
                    &launch,
                    &format!("step {step_index}"),
                    TestItemType::Step,
                    Some(suite.id),
                );
                step.unique_id =
                    Some(format!("auto:{:064x}", (suite_index + 1) * 1000 + step_index));
                repos.items.save(&mut step).unwrap();
            }
        }
        let total = (SUITES * STEPS_PER_SUITE) as u64;
        repos
            .statistics
            .replace_for_launch(
                launch.id,
                &[
                    Statistics::new(launch.id, EXECUTIONS_TOTAL, total),
                    Statistics::new(launch.id, EXECUTIONS_PASSED, total),
                ],
            )
            .unwrap();
        launches.push(launch);
    }
    (store, launches)
}

fn blank_item(
    launch: &Launch,
    name: &str,
    item_type: TestItemType,
    parent: Option<TestItemId>,
) -> TestItem {
    TestItem {
        id: TestItemId::default(),
        name: name.to_string(),
        item_type,
        parent_id: parent,
        launch_id: launch.id,
        unique_id: None,
        description: None,
        start_time: launch.start_time,
        last_modified: launch.start_time,
        tags: BTreeSet::new(),
        parameters: Vec::new(),
        results: ItemResults::finished(ItemStatus::Passed, launch.start_time),
    }
}

fn run_merge(merge_type: MergeStrategyType, launch_count: usize) -> i64 {
    let (store, launches) = seed_store(launch_count);
    let repos = store.repositories();
    let generator = FingerprintGenerator::new();
    let service = MergeService::new(repos, &generator);
    let mut request = MergeLaunchesRequest::new(
        launches.iter().map(|launch| launch.id).collect(),
        merge_type,
    );
    request.name = Some("nightly".to_string());
    let merged = service
        .merge_launches(
            &ProjectContext::new(1, "bench"),
            &UserContext::new(1, "bench"),
            &request,
        )
        .unwrap();
    merged.id.0
}

fn bench_merge(c: &mut Criterion) {
    let mut group = c.benchmark_group("merge.launches");
    for launch_count in [2usize, 4] {
        group.bench_with_input(
            BenchmarkId::new("basic", launch_count),
            &launch_count,
            |b, &count| b.iter(|| black_box(run_merge(MergeStrategyType::Basic, count))),
        );
        group.bench_with_input(
            BenchmarkId::new("deep", launch_count),
            &launch_count,
            |b, &count| b.iter(|| black_box(run_merge(MergeStrategyType::Deep, count))),
        );
    }
    group.finish();
}

criterion_group!(benches, bench_merge);
criterion_main!(benches);
