// tests/prev_dagrun.rs

mod common;
use crate::common::*;

use tideps::dag::TaskInstance;
use tideps::deps::{DepContext, PrevDagrunDep, TiDep};
use tideps::errors::TidepsError;
use tideps::store::{HistoryStore, InMemoryHistory, PAST_DEPENDS_MET};
use tideps::types::{DagRunState, TaskInstanceState};

const FIRST_TI: &str = "This task instance was the first task instance for its task.";

fn single_status(snap: &tideps::engine::Snapshot) -> tideps::deps::DepStatus {
    let mut statuses = prev_statuses(snap);
    assert_eq!(statuses.len(), 1, "expected exactly one status, got {statuses:?}");
    statuses.remove(0)
}

#[test]
fn ignore_depends_on_past_passes_without_touching_history() {
    init_tracing();
    let cfg = with_runs(daily_dag(), 2)
        .with_ti("extract", "run_0", TaskInstanceState::Failed)
        .build();
    let ctx = DepContext {
        ignore_depends_on_past: true,
        ..DepContext::default()
    };
    let snap = snapshot_with(&cfg, "extract", "run_1", ctx);
    let store = CountingStore::new(InMemoryHistory::from_config(&cfg).unwrap());

    let statuses = prev_statuses_in(&snap, &store).unwrap();

    assert_eq!(statuses.len(), 1);
    assert!(statuses[0].passed());
    assert_eq!(
        statuses[0].reason(),
        "The context specified that the state of past DAGs could be ignored."
    );
    assert_eq!(store.reads(), 0);
}

#[test]
fn task_without_depends_on_past_passes_without_touching_history() {
    let cfg = with_runs(daily_dag(), 2)
        .with_ti("load", "run_0", TaskInstanceState::Failed)
        .build();
    let snap = snapshot(&cfg, "load", "run_1");
    let store = CountingStore::new(InMemoryHistory::from_config(&cfg).unwrap());

    let statuses = prev_statuses_in(&snap, &store).unwrap();

    assert_eq!(statuses.len(), 1);
    assert!(statuses[0].passed());
    assert_eq!(statuses[0].reason(), "The task did not have depends_on_past set.");
    assert_eq!(store.reads(), 0);
}

#[test]
fn instance_without_dag_run_is_let_through() {
    let cfg = with_runs(daily_dag(), 1).build();
    let snap = snapshot(&cfg, "extract", "run_0");
    let orphan = TaskInstance::new("daily", "extract", "ghost", day(5), TaskInstanceState::None);
    let target = snap.dag.ti_ref(&orphan).unwrap();

    let statuses: Vec<_> = PrevDagrunDep
        .get_dep_statuses(target, &snap.store, &snap.ctx)
        .collect::<Result<_, _>>()
        .unwrap();

    assert_eq!(statuses.len(), 1);
    assert!(statuses[0].passed());
    assert_eq!(statuses[0].reason(), "This task instance does not belong to a DAG.");
}

#[test]
fn first_run_passes() {
    let cfg = with_runs(daily_dag(), 1).build();
    let snap = snapshot(&cfg, "extract", "run_0");

    let status = single_status(&snap);

    assert!(status.passed());
    assert_eq!(status.reason(), FIRST_TI);
    assert_eq!(status.dep_name(), "Previous Dagrun State");
    assert!(status.ignorable());
}

#[test]
fn previous_run_before_task_start_date_counts_as_first_run() {
    let cfg = with_runs(
        daily_dag_with(TaskConfigBuilder::new().depends_on_past(true).start_date(day(1))),
        2,
    )
    .build();
    let snap = snapshot(&cfg, "extract", "run_1");

    let status = single_status(&snap);

    assert!(status.passed());
    assert_eq!(status.reason(), FIRST_TI);
}

#[test]
fn start_date_is_not_consulted_without_catchup() {
    let cfg = with_runs(
        daily_dag_with(TaskConfigBuilder::new().depends_on_past(true).start_date(day(1))),
        2,
    )
    .catchup(false)
    .build();
    let snap = snapshot(&cfg, "extract", "run_1");

    let status = single_status(&snap);

    assert!(!status.passed());
    assert!(status.reason().contains("has not run yet"));
}

#[test]
fn dag_start_date_applies_to_tasks_without_their_own() {
    let cfg = with_runs(daily_dag(), 3).start_date(day(2)).build();
    let snap = snapshot(&cfg, "extract", "run_2");

    let status = single_status(&snap);

    assert!(status.passed());
    assert_eq!(status.reason(), FIRST_TI);
}

#[test]
fn missing_previous_instance_fails_and_names_task_and_run() {
    let cfg = with_runs(daily_dag(), 2).build();
    let snap = snapshot(&cfg, "extract", "run_1");

    let status = single_status(&snap);

    assert!(!status.passed());
    assert!(status.reason().starts_with(
        "depends_on_past is true for this task's DAG, but the previous task instance has not run yet"
    ));
    assert!(status.reason().contains("'extract'"));
    assert!(status.reason().contains("'run_0'"));
}

#[test]
fn ignore_first_depends_on_past_passes_when_no_earlier_instance_exists() {
    let cfg = with_runs(
        daily_dag_with(
            TaskConfigBuilder::new()
                .depends_on_past(true)
                .ignore_first_depends_on_past(true),
        ),
        2,
    )
    .build();
    let snap = snapshot(&cfg, "extract", "run_1");

    let status = single_status(&snap);

    assert!(status.passed());
    assert_eq!(
        status.reason(),
        "ignore_first_depends_on_past is true for this task and it is the first task instance for its task."
    );
}

#[test]
fn ignore_first_depends_on_past_does_not_cover_gaps_in_history() {
    // run_0 has an extract instance, run_1 does not: run_2 is not a first run.
    let cfg = with_runs(
        daily_dag_with(
            TaskConfigBuilder::new()
                .depends_on_past(true)
                .ignore_first_depends_on_past(true),
        ),
        3,
    )
    .with_ti("extract", "run_0", TaskInstanceState::Success)
    .build();
    let snap = snapshot(&cfg, "extract", "run_2");

    let status = single_status(&snap);

    assert!(!status.passed());
    assert!(status.reason().contains("has not run yet"));
    assert!(status.reason().contains("'run_1'"));
}

#[test]
fn failed_previous_instance_blocks_with_rendered_instance() {
    let cfg = with_runs(daily_dag(), 2)
        .with_ti("extract", "run_0", TaskInstanceState::Failed)
        .build();
    let snap = snapshot(&cfg, "extract", "run_1");

    let status = single_status(&snap);

    assert!(!status.passed());
    assert_eq!(
        status.reason(),
        "depends_on_past is true for this task, but the previous task instance(s) \
         <TaskInstance: daily.extract run_0 [failed]> are not in a successful state."
    );
}

#[test]
fn successful_or_skipped_previous_instance_yields_nothing() {
    for state in [TaskInstanceState::Success, TaskInstanceState::Skipped] {
        let cfg = with_runs(daily_dag(), 2)
            .with_ti("extract", "run_0", state)
            .build();
        let snap = snapshot(&cfg, "extract", "run_1");

        assert!(prev_statuses(&snap).is_empty(), "state {state} should pass");
    }
}

#[test]
fn mapped_previous_instances_list_every_unsuccessful_one() {
    let cfg = with_runs(daily_dag(), 2)
        .with_mapped_ti("extract", "run_0", 2, TaskInstanceState::UpstreamFailed)
        .with_mapped_ti("extract", "run_0", 0, TaskInstanceState::Success)
        .with_mapped_ti("extract", "run_0", 1, TaskInstanceState::Failed)
        .build();
    let snap = snapshot(&cfg, "extract", "run_1");

    let status = single_status(&snap);

    assert!(!status.passed());
    assert!(status.reason().contains(
        "<TaskInstance: daily.extract run_0 map_index=1 [failed]>,\
         <TaskInstance: daily.extract run_0 map_index=2 [upstream_failed]>"
    ));
    assert!(!status.reason().contains("map_index=0"));
}

#[test]
fn wait_for_downstream_blocks_until_downstream_finishes() {
    let builder = with_runs(
        daily_dag_with(TaskConfigBuilder::new().wait_for_downstream(true)),
        2,
    )
    .with_ti("extract", "run_0", TaskInstanceState::Success);

    let cfg = builder
        .with_ti("load", "run_0", TaskInstanceState::Running)
        .build();
    let snap = snapshot(&cfg, "extract", "run_1");

    let status = single_status(&snap);
    assert!(!status.passed());
    assert_eq!(
        status.reason(),
        "The tasks downstream of the previous task instance(s) \
         <TaskInstance: daily.extract run_0 [success]> haven't completed \
         (and wait_for_downstream is True)."
    );

    // Downstream catches up.
    let key = tideps::dag::TaskInstanceKey {
        dag_id: "daily".into(),
        task_id: "load".into(),
        run_id: "run_0".into(),
        map_index: -1,
    };
    snap.store.set_state(&key, TaskInstanceState::Success).unwrap();
    assert!(prev_statuses(&snap).is_empty());
}

#[test]
fn passing_records_past_depends_met_when_asked() {
    let cfg = with_runs(daily_dag(), 2)
        .with_ti("extract", "run_0", TaskInstanceState::Success)
        .build();
    let ctx = DepContext {
        wait_for_past_depends_before_skipping: true,
        ..DepContext::default()
    };
    let snap = snapshot_with(&cfg, "extract", "run_1", ctx);

    assert!(prev_statuses(&snap).is_empty());
    assert_eq!(
        snap.store.get_flag(&snap.ti.key(), PAST_DEPENDS_MET).unwrap(),
        Some(true)
    );

    // Re-evaluating is idempotent.
    assert!(prev_statuses(&snap).is_empty());
    assert_eq!(
        snap.store.get_flag(&snap.ti.key(), PAST_DEPENDS_MET).unwrap(),
        Some(true)
    );
}

#[test]
fn passing_early_exits_also_record_the_flag() {
    let cfg = with_runs(daily_dag(), 1).build();
    let ctx = DepContext {
        wait_for_past_depends_before_skipping: true,
        ..DepContext::default()
    };
    let snap = snapshot_with(&cfg, "extract", "run_0", ctx);
    let store = CountingStore::new(InMemoryHistory::from_config(&cfg).unwrap());

    let statuses = prev_statuses_in(&snap, &store).unwrap();

    assert_eq!(statuses[0].reason(), FIRST_TI);
    assert_eq!(store.flag_writes(), 1);
    assert_eq!(
        store.get_flag(&snap.ti.key(), PAST_DEPENDS_MET).unwrap(),
        Some(true)
    );
}

#[test]
fn flag_is_not_recorded_on_failure_or_when_not_asked() {
    let cfg = with_runs(daily_dag(), 2)
        .with_ti("extract", "run_0", TaskInstanceState::Failed)
        .build();
    let ctx = DepContext {
        wait_for_past_depends_before_skipping: true,
        ..DepContext::default()
    };
    let failing = snapshot_with(&cfg, "extract", "run_1", ctx);
    assert!(!prev_statuses(&failing)[0].passed());
    assert_eq!(
        failing.store.get_flag(&failing.ti.key(), PAST_DEPENDS_MET).unwrap(),
        None
    );

    let cfg = with_runs(daily_dag(), 1).build();
    let not_asked = snapshot(&cfg, "extract", "run_0");
    assert!(prev_statuses(&not_asked)[0].passed());
    assert_eq!(
        not_asked.store.get_flag(&not_asked.ti.key(), PAST_DEPENDS_MET).unwrap(),
        None
    );
}

#[test]
fn context_waivers_short_circuit_the_predicate() {
    let cfg = with_runs(daily_dag(), 2)
        .with_ti("extract", "run_0", TaskInstanceState::Failed)
        .build();

    let all = snapshot_with(
        &cfg,
        "extract",
        "run_1",
        DepContext {
            ignore_all_deps: true,
            ..DepContext::default()
        },
    );
    let store = CountingStore::new(InMemoryHistory::from_config(&cfg).unwrap());
    let statuses = prev_statuses_in(&all, &store).unwrap();
    assert_eq!(
        statuses[0].reason(),
        "Context specified all dependencies should be ignored."
    );
    assert!(statuses[0].passed());

    let task = snapshot_with(
        &cfg,
        "extract",
        "run_1",
        DepContext {
            ignore_task_deps: true,
            ..DepContext::default()
        },
    );
    let statuses = prev_statuses_in(&task, &store).unwrap();
    assert_eq!(
        statuses[0].reason(),
        "Context specified all task dependencies should be ignored."
    );

    assert_eq!(store.reads(), 0);
}

#[test]
fn statuses_are_lazy_and_restartable() {
    let cfg = with_runs(daily_dag(), 2)
        .with_ti("extract", "run_0", TaskInstanceState::Failed)
        .build();
    let snap = snapshot(&cfg, "extract", "run_1");
    let store = CountingStore::new(InMemoryHistory::from_config(&cfg).unwrap());
    let target = snap.dag.ti_ref(&snap.ti).unwrap();

    let pending = PrevDagrunDep.get_dep_statuses(target, &store, &snap.ctx);
    assert_eq!(store.reads(), 0);
    drop(pending);

    let first = prev_statuses_in(&snap, &store).unwrap();
    let second = prev_statuses_in(&snap, &store).unwrap();
    assert_eq!(first, second);
    assert!(store.reads() > 0);
}

#[test]
fn store_errors_propagate_unchanged() {
    let cfg = with_runs(daily_dag(), 2).build();
    let snap = snapshot(&cfg, "extract", "run_1");
    let store = CountingStore::new(InMemoryHistory::from_config(&cfg).unwrap());
    store.fail_reads(true);

    let err = prev_statuses_in(&snap, &store).unwrap_err();

    match err {
        TidepsError::Store(msg) => assert!(msg.contains("connection refused")),
        other => panic!("Expected Store error, got: {other:?}"),
    }
}

#[test]
fn is_met_and_failure_reasons_agree_with_statuses() {
    let cfg = with_runs(daily_dag(), 2)
        .with_ti("extract", "run_0", TaskInstanceState::UpForRetry)
        .build();
    let snap = snapshot(&cfg, "extract", "run_1");
    let target = snap.dag.ti_ref(&snap.ti).unwrap();

    assert!(!PrevDagrunDep.is_met(target, &snap.store, &snap.ctx).unwrap());
    let reasons = PrevDagrunDep
        .failure_reasons(target, &snap.store, &snap.ctx)
        .unwrap();
    assert_eq!(reasons.len(), 1);
    assert!(reasons[0].contains("[up_for_retry]"));
}

// Named scenario: daily DAG where yesterday's run succeeded and its
// downstream finished, so today's run may start.
#[test]
fn daily_run_after_clean_day_is_admitted() {
    let cfg = with_runs(
        daily_dag_with(TaskConfigBuilder::new().wait_for_downstream(true)),
        2,
    )
    .with_ti("extract", "run_0", TaskInstanceState::Success)
    .with_ti("load", "run_0", TaskInstanceState::Skipped)
    .build();
    let snap = snapshot(&cfg, "extract", "run_1");

    assert!(prev_statuses(&snap).is_empty());
}

// Named scenario: runs created out of schedule order. Without catchup the
// previous run is whichever was created last, not the previous date.
#[test]
fn previous_run_follows_creation_order_without_catchup() {
    let cfg = daily_dag()
        .catchup(false)
        .with_dag_run("backfill_day3", day(3), DagRunState::Success)
        .with_dag_run("manual_day1", day(1), DagRunState::Running)
        .with_dag_run("today", day(2), DagRunState::Running)
        .with_ti("extract", "backfill_day3", TaskInstanceState::Success)
        .with_ti("extract", "manual_day1", TaskInstanceState::Failed)
        .build();
    let snap = snapshot(&cfg, "extract", "today");

    let status = single_status(&snap);
    assert!(!status.passed());
    assert!(status.reason().contains("manual_day1"));

    // With catchup the schedule order applies: day(1) is still the
    // previous run for day(2).
    let cfg = daily_dag()
        .with_dag_run("today", day(2), DagRunState::Running)
        .with_dag_run("manual_day1", day(1), DagRunState::Running)
        .with_dag_run("backfill_day0", day(0), DagRunState::Success)
        .with_ti("extract", "manual_day1", TaskInstanceState::Success)
        .with_ti("extract", "backfill_day0", TaskInstanceState::Failed)
        .build();
    let snap = snapshot(&cfg, "extract", "today");
    assert!(prev_statuses(&snap).is_empty());
}

// With ignore_first_depends_on_past set and no earlier run at all, the
// first-run branch answers before the ignore-first branch is reached.
#[test]
fn scenario_ignore_first_without_previous_run_passes_via_first_run() {
    let cfg = with_runs(
        daily_dag_with(
            TaskConfigBuilder::new()
                .depends_on_past(true)
                .ignore_first_depends_on_past(true),
        ),
        1,
    )
    .build();
    let snap = snapshot(&cfg, "extract", "run_0");
    let store = CountingStore::new(InMemoryHistory::from_config(&cfg).unwrap());

    let statuses = prev_statuses_in(&snap, &store).unwrap();

    assert_eq!(statuses.len(), 1);
    assert!(statuses[0].passed());
    assert_eq!(statuses[0].reason(), FIRST_TI);
    // get_dagrun + get_previous_dagrun; no instance lookup or prior count.
    assert_eq!(store.reads(), 2);
}

// run_0 has no extract instance, run_1 has it failed: evaluating run_2 only
// looks at run_1.
#[test]
fn scenario_failed_instance_two_runs_back_is_not_consulted_but_previous_failed_blocks() {
    let cfg = with_runs(daily_dag(), 3)
        .with_ti("extract", "run_1", TaskInstanceState::Failed)
        .build();

    let snap = snapshot(&cfg, "extract", "run_2");
    let status = single_status(&snap);
    assert!(!status.passed());
    assert_eq!(
        status.reason(),
        "depends_on_past is true for this task, but the previous task instance(s) \
         <TaskInstance: daily.extract run_1 [failed]> are not in a successful state."
    );

    // run_1 itself only looks one run back, where nothing ran.
    let snap = snapshot(&cfg, "extract", "run_1");
    let status = single_status(&snap);
    assert!(!status.passed());
    assert_eq!(
        status.reason(),
        "depends_on_past is true for this task's DAG, but the previous task instance \
         has not run yet (no instance of task 'extract' in DAG run 'run_0')."
    );
}

// Two runs that tie on execution_date would make schedule order ambiguous;
// the store refuses the second one.
#[test]
fn tied_execution_dates_cannot_enter_history() {
    let store = InMemoryHistory::new();
    store
        .create_dagrun("daily", "a", day(1), DagRunState::Running)
        .unwrap();

    let err = store
        .create_dagrun("daily", "b", day(1), DagRunState::Running)
        .unwrap_err();

    assert!(matches!(err, TidepsError::Store(_)));
}
