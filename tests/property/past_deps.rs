use std::collections::BTreeSet;

use proptest::prelude::*;
use proptest::sample::select;
use tideps::dag::DagRun;
use tideps::store::{HistoryStore, InMemoryHistory};
use tideps::types::{DagRunState, TaskInstanceState};

use crate::common::{day, daily_dag, prev_statuses, snapshot, with_runs};

fn state_strategy() -> impl Strategy<Value = TaskInstanceState> {
    select(TaskInstanceState::ALL.to_vec())
}

proptest! {
    // Mapped previous instances: the check passes exactly when every one of
    // them is success or skipped, and the failure lists only the others.
    #[test]
    fn past_check_matches_previous_states(
        states in proptest::collection::vec(state_strategy(), 1..6),
    ) {
        let mut builder = with_runs(daily_dag(), 2);
        for (i, state) in states.iter().enumerate() {
            builder = builder.with_mapped_ti("extract", "run_0", i as i32, *state);
        }
        let cfg = builder.build();
        let snap = snapshot(&cfg, "extract", "run_1");

        let statuses = prev_statuses(&snap);
        let unsuccessful: Vec<usize> = states
            .iter()
            .enumerate()
            .filter(|(_, s)| !s.is_successful_for_past_deps())
            .map(|(i, _)| i)
            .collect();

        if unsuccessful.is_empty() {
            prop_assert!(statuses.is_empty());
        } else {
            prop_assert_eq!(statuses.len(), 1);
            prop_assert!(!statuses[0].passed());
            let reason = statuses[0].reason();
            for i in 0..states.len() {
                let listed = reason.contains(&format!("map_index={i} "));
                prop_assert_eq!(listed, unsuccessful.contains(&i));
            }
        }
    }

    // By schedule order the previous run is the latest strictly earlier
    // execution date, whatever order the runs were created in.
    #[test]
    fn previous_run_by_schedule_is_latest_earlier_date(
        days in proptest::collection::btree_set(0i64..60, 1..10),
        pick in any::<proptest::sample::Index>(),
    ) {
        let days: Vec<i64> = days.into_iter().rev().collect();
        let store = InMemoryHistory::new();
        let runs: Vec<DagRun> = days
            .iter()
            .map(|d| {
                store
                    .create_dagrun("daily", &format!("run_{d}"), day(*d), DagRunState::Success)
                    .unwrap()
            })
            .collect();

        let current = pick.get(&runs);
        let expected = days
            .iter()
            .copied()
            .filter(|d| day(*d) < current.execution_date)
            .collect::<BTreeSet<_>>()
            .last()
            .copied();

        let previous = store.get_previous_dagrun(current, true).unwrap();
        prop_assert_eq!(previous.map(|dr| dr.execution_date), expected.map(day));
    }
}
