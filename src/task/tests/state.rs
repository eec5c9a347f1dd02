use super::*;

fn succeeded(value: i64) -> TaskResult {
    TaskResult::succeeded(Arc::new(value) as crate::types::TaskOutput)
}

#[test]
fn get_without_record_is_not_attempted() {
    let state = TaskSetState::new();
    let task = TaskRef::new(TestTask::succeeding("a.csv", 1));
    assert_eq!(state.get(&task).state(), TaskState::NotAttempted);
    assert!(state.is_empty());
}

#[test]
fn record_then_get_round_trips() {
    let state = TaskSetState::new();
    let task = TaskRef::new(TestTask::succeeding("a.csv", 1));
    state.record(&task, succeeded(7));
    let result = state.get(&task);
    assert_eq!(result.state(), TaskState::Succeeded);
    assert_eq!(*result.value_as::<i64>().unwrap(), 7);
}

#[test]
fn rerun_replaces_prior_entry() {
    let state = TaskSetState::new();
    let task = TaskRef::new(TestTask::succeeding("a.csv", 1));
    state.record(&task, TaskResult::failed(Error::Other("boom".to_string())));
    state.record(&task, succeeded(2));
    assert_eq!(state.len(), 1);
    assert_eq!(state.get(&task).state(), TaskState::Succeeded);
}

#[test]
fn equal_target_paths_stay_distinct_keys() {
    let state = TaskSetState::new();
    let a = TaskRef::new(TestTask::succeeding("same.csv", 1));
    let b = TaskRef::new(TestTask::succeeding("same.csv", 2));
    state.record(&a, succeeded(1));
    state.record(&b, succeeded(2));
    assert_eq!(state.len(), 2);
}

#[test]
fn concurrent_insertions_lose_no_updates() {
    // Two workers each insert 2^16 distinct tasks; every insertion must
    // survive. This is the failure mode an unguarded map exhibits.
    const PER_WORKER: usize = 1 << 16;

    let state = Arc::new(TaskSetState::new());
    let tasks: Vec<Vec<TaskRef>> = (0..2)
        .map(|worker| {
            (0..PER_WORKER)
                .map(|i| TaskRef::new(TestTask::succeeding(&format!("w{worker}/t{i}.csv"), i as i64)))
                .collect()
        })
        .collect();

    let workers: Vec<_> = tasks
        .into_iter()
        .map(|batch| {
            let state = state.clone();
            std::thread::spawn(move || {
                for (i, task) in batch.iter().enumerate() {
                    state.record(task, succeeded(i as i64));
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    assert_eq!(state.len(), 2 * PER_WORKER);
}

#[test]
fn snapshot_is_safe_against_concurrent_writers() {
    const TOTAL: usize = 10_000;

    let state = Arc::new(TaskSetState::new());
    let writer_state = state.clone();
    let writer = std::thread::spawn(move || {
        for i in 0..TOTAL {
            let task = TaskRef::new(TestTask::succeeding(&format!("t{i}.csv"), i as i64));
            writer_state.record(&task, succeeded(i as i64));
        }
    });

    // Reader iterates while the writer inserts; every observed entry must be
    // fully formed.
    let mut last_len = 0;
    while !writer.is_finished() {
        let snapshot = state.snapshot();
        assert!(snapshot.len() >= last_len, "snapshot went backwards");
        last_len = snapshot.len();
        for (task, result) in &snapshot {
            assert!(!task.target_path().is_empty());
            assert_eq!(result.state(), TaskState::Succeeded);
            assert!(result.value_as::<i64>().is_some(), "torn entry observed");
        }
    }
    writer.join().unwrap();
    assert_eq!(state.len(), TOTAL);
    assert_eq!(state.count_in_state(TaskState::Succeeded), TOTAL);
}
