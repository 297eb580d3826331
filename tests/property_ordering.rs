mod common;

use std::collections::BTreeSet;

use common::{position, Recorder};
use proptest::prelude::*;
use taskgraph::task::Task;
use taskgraph::TaskManager;

// Strategy to generate a random DAG plus a registration order.
// We ensure acyclicity by only allowing task N to depend on tasks 0..N-1.
fn dag_strategy(max_tasks: usize) -> impl Strategy<Value = (Vec<Vec<usize>>, Vec<usize>)> {
    (1..=max_tasks).prop_flat_map(|num_tasks| {
        let deps_strat = proptest::collection::vec(
            proptest::collection::vec(any::<usize>(), 0..num_tasks),
            num_tasks,
        )
        .prop_map(|raw_deps| {
            raw_deps
                .into_iter()
                .enumerate()
                .map(|(i, potential)| {
                    // Sanitize dependencies: only allow deps < i
                    let valid: BTreeSet<usize> = if i == 0 {
                        BTreeSet::new()
                    } else {
                        potential.into_iter().map(|d| d % i).collect()
                    };
                    valid.into_iter().collect()
                })
                .collect::<Vec<Vec<usize>>>()
        });

        let registration = Just((0..num_tasks).collect::<Vec<_>>()).prop_shuffle();
        (deps_strat, registration)
    })
}

fn build_tasks(rec: &Recorder, deps: &[Vec<usize>]) -> Vec<Task<()>> {
    let mut tasks: Vec<Task<()>> = Vec::with_capacity(deps.len());
    for (i, task_deps) in deps.iter().enumerate() {
        let prerequisites: Vec<_> = task_deps.iter().map(|&d| tasks[d].handle()).collect();
        tasks.push(rec.task(&format!("task_{i}"), &prerequisites));
    }
    tasks
}

proptest! {
    #[test]
    fn every_task_runs_once_after_its_prerequisites(
        (deps, registration) in dag_strategy(12)
    ) {
        let rec = Recorder::new();
        let tasks = build_tasks(&rec, &deps);

        let mut manager = TaskManager::new();
        for &i in &registration {
            manager.add(&tasks[i]);
        }
        let report = manager.run().unwrap();

        prop_assert_eq!(report.len(), tasks.len());
        for task in &tasks {
            prop_assert!(task.is_complete());
            prop_assert_eq!(task.invocations(), 1);
        }

        let order = rec.finished();
        for (i, task_deps) in deps.iter().enumerate() {
            let me = position(&order, &format!("task_{i}"));
            for &d in task_deps {
                prop_assert!(
                    position(&order, &format!("task_{d}")) < me,
                    "task_{} ran before its prerequisite task_{}", i, d
                );
            }
        }
    }

    #[test]
    fn concurrent_run_reaches_the_same_final_state(
        (deps, registration) in dag_strategy(8),
        max_parallel in 1..4usize,
    ) {
        let rec = Recorder::new();
        let tasks = build_tasks(&rec, &deps);

        let mut manager = TaskManager::new();
        for &i in &registration {
            manager.add(&tasks[i]);
        }

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let report = runtime.block_on(manager.run_concurrent(max_parallel)).unwrap();

        prop_assert_eq!(report.len(), tasks.len());
        prop_assert!(tasks.iter().all(|t| t.is_complete() && t.invocations() == 1));

        let order = rec.finished();
        for (i, task_deps) in deps.iter().enumerate() {
            let me = position(&order, &format!("task_{i}"));
            for &d in task_deps {
                let dep_name = format!("task_{d}");
                prop_assert!(position(&order, &dep_name) < me);
            }
        }
    }
}
