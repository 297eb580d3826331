mod common;

use common::{init_tracing, position, Recorder};
use taskgraph::task::Task;
use taskgraph::TaskManager;

#[test]
fn chain_runs_in_dependency_order_exactly_once() {
    init_tracing();
    let rec = Recorder::new();

    let a = rec.task("a", &[]);
    let b = rec.task("b", &[a.handle()]);
    let c = rec.task("c", &[b.handle()]);

    let mut manager = TaskManager::new();
    manager.add(&a).add(&b).add(&c);
    let report = manager.run().unwrap();

    assert_eq!(rec.finished(), ["a", "b", "c"]);
    assert_eq!(report.names(), ["a", "b", "c"]);
    for task in [&a, &b, &c] {
        assert!(task.is_complete());
        assert_eq!(task.invocations(), 1);
    }

    // Prerequisites are complete now, so direct invocation is allowed.
    c.invoke().unwrap();
    assert_eq!(c.invocations(), 2);
}

#[test]
fn registration_order_does_not_change_outcome() {
    init_tracing();

    let orders: [[usize; 3]; 3] = [[0, 1, 2], [2, 1, 0], [1, 2, 0]];
    for order in orders {
        let rec = Recorder::new();
        let a = rec.task("a", &[]);
        let b = rec.task("b", &[a.handle()]);
        let c = rec.task("c", &[b.handle()]);
        let all = [a.clone(), b.clone(), c.clone()];

        let mut manager = TaskManager::new();
        for i in order {
            manager.add(&all[i]);
        }
        manager.run().unwrap();

        assert_eq!(rec.finished(), ["a", "b", "c"], "registration order {order:?}");
        assert!(all.iter().all(|t| t.is_complete() && t.invocations() == 1));
    }
}

#[test]
fn diamond_respects_transitive_prerequisites() {
    init_tracing();
    let rec = Recorder::new();

    let root = rec.task("root", &[]);
    let left = rec.task("left", &[root.handle()]);
    let right = rec.task("right", &[root.handle()]);
    let join = rec.task("join", &[left.handle(), right.handle()]);
    let tail = rec.task("tail", &[join.handle()]);

    let mut manager = TaskManager::new();
    manager.add_all([&tail, &join, &right, &left, &root]);
    manager.run().unwrap();

    let order = rec.finished();
    assert_eq!(order.len(), 5);
    assert!(position(&order, "root") < position(&order, "left"));
    assert!(position(&order, "root") < position(&order, "right"));
    assert!(position(&order, "left") < position(&order, "join"));
    assert!(position(&order, "right") < position(&order, "join"));
    assert!(position(&order, "join") < position(&order, "tail"));
}

#[test]
fn independent_tasks_run_in_registration_order() {
    let rec = Recorder::new();
    let x = rec.task("x", &[]);
    let y = rec.task("y", &[]);
    let z = rec.task("z", &[]);

    let mut manager = TaskManager::new();
    manager.add(&z).add(&x).add(&y);
    manager.run().unwrap();

    assert_eq!(rec.finished(), ["z", "x", "y"]);
}

#[test]
fn duplicate_registration_runs_once() {
    let rec = Recorder::new();
    let a = rec.task("a", &[]);

    let mut manager = TaskManager::new();
    manager.add(&a).add(&a).add(a.handle());
    assert_eq!(manager.len(), 3);

    let report = manager.run().unwrap();
    assert_eq!(report.len(), 1);
    assert_eq!(a.invocations(), 1);
}

#[test]
fn tasks_with_different_outputs_share_a_graph() {
    let number = Task::new(|| 42_u32);
    let text = Task::with_prerequisites([&number], || "done".to_string());
    let unit = Task::with_prerequisites([text.handle(), number.handle()], || ());

    let mut manager = TaskManager::new();
    manager.add(&unit).add(&text).add(&number);
    let report = manager.run().unwrap();

    assert_eq!(report.ids(), vec![number.id(), text.id(), unit.id()]);
    assert!(unit.is_complete());
}
