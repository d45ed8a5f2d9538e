use super::*;
use ac_core::JobStatus;
use std::sync::Arc;

fn queue() -> (tempfile::TempDir, JobQueue) {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = Arc::new(Store::open(dir.path()).expect("open store"));
    (dir, JobQueue::new(store))
}

#[test]
fn pull_next_claims_highest_priority_job_first() {
    let (_dir, q) = queue();
    q.enqueue("low", serde_json::json!({}), 0, 3).expect("enqueue low");
    let high = q.enqueue("high", serde_json::json!({}), 10, 3).expect("enqueue high");

    let pulled = q.pull_next().expect("pull").expect("some job");
    assert_eq!(pulled.id, high.id);
    assert_eq!(pulled.status, JobStatus::Processing);
    assert_eq!(pulled.attempts, 1);
}

#[test]
fn pull_next_is_none_when_queue_is_empty() {
    let (_dir, q) = queue();
    assert!(q.pull_next().expect("pull").is_none());
}

#[test]
fn failing_with_retries_remaining_reschedules_as_pending() {
    let (_dir, q) = queue();
    let job = q.enqueue("work", serde_json::json!({}), 0, 3).expect("enqueue");
    q.pull_next().expect("pull");
    let failed = q.fail(&job.id, "boom").expect("fail");
    assert_eq!(failed.status, JobStatus::Pending);
    assert!(failed.next_retry_at.is_some());
    assert_eq!(failed.last_error.as_deref(), Some("boom"));
}

#[test]
fn failing_with_no_retries_remaining_stalls() {
    let (_dir, q) = queue();
    let job = q.enqueue("work", serde_json::json!({}), 0, 1).expect("enqueue");
    q.pull_next().expect("pull");
    let failed = q.fail(&job.id, "boom").expect("fail");
    assert_eq!(failed.status, JobStatus::Stalled);
}

#[test]
fn retry_on_non_stalled_job_is_wrong_status() {
    let (_dir, q) = queue();
    let job = q.enqueue("work", serde_json::json!({}), 0, 3).expect("enqueue");
    let err = q.retry(&job.id).unwrap_err();
    assert!(matches!(err, JobsError::WrongStatus { .. }));
}

#[test]
fn retry_on_stalled_job_resets_attempts_and_requeues() {
    let (_dir, q) = queue();
    let job = q.enqueue("work", serde_json::json!({}), 0, 1).expect("enqueue");
    q.pull_next().expect("pull");
    q.fail(&job.id, "boom").expect("fail");

    let retried = q.retry(&job.id).expect("retry");
    assert_eq!(retried.status, JobStatus::Pending);
    assert_eq!(retried.attempts, 0);
    assert!(retried.last_error.is_none());
}

#[test]
fn cancel_missing_job_is_not_found() {
    let (_dir, q) = queue();
    let err = q.cancel(&ac_core::JobId::new()).unwrap_err();
    assert!(matches!(err, JobsError::NotFound(_)));
}

#[test]
fn cancel_on_a_processing_job_is_wrong_status() {
    let (_dir, q) = queue();
    let job = q.enqueue("work", serde_json::json!({}), 0, 3).expect("enqueue");
    q.pull_next().expect("pull").expect("a job was due");
    let err = q.cancel(&job.id).unwrap_err();
    assert!(matches!(err, JobsError::WrongStatus { .. }));
    assert!(q.get(&job.id).is_ok(), "the job must survive a rejected cancel");
}

#[test]
fn cancel_on_a_pending_job_deletes_it() {
    let (_dir, q) = queue();
    let job = q.enqueue("work", serde_json::json!({}), 0, 3).expect("enqueue");
    q.cancel(&job.id).expect("cancel");
    assert!(matches!(q.get(&job.id).unwrap_err(), JobsError::NotFound(_)));
}

#[test]
fn cancel_on_a_stalled_job_deletes_it() {
    let (_dir, q) = queue();
    let job = q.enqueue("work", serde_json::json!({}), 0, 1).expect("enqueue");
    q.pull_next().expect("pull").expect("a job was due");
    q.fail(&job.id, "boom").expect("fail exhausts the single retry");
    q.cancel(&job.id).expect("cancel");
    assert!(matches!(q.get(&job.id).unwrap_err(), JobsError::NotFound(_)));
}

#[test]
fn stats_count_by_status() {
    let (_dir, q) = queue();
    q.enqueue("a", serde_json::json!({}), 0, 3).expect("enqueue a");
    let b = q.enqueue("b", serde_json::json!({}), 0, 3).expect("enqueue b");
    q.complete(&b.id).expect("complete b");

    let stats = q.stats();
    assert_eq!(stats.pending, 1);
    assert_eq!(stats.completed, 1);
}

#[test]
fn list_rejects_limit_out_of_range() {
    let (_dir, q) = queue();
    let err = q.list(JobListQuery { limit: 0, ..Default::default() }).unwrap_err();
    assert!(matches!(err, JobsError::InvalidQuery(_)));
    let err = q.list(JobListQuery { limit: 1001, ..Default::default() }).unwrap_err();
    assert!(matches!(err, JobsError::InvalidQuery(_)));
}

#[test]
fn list_filters_by_status_and_type_and_reports_total() {
    let (_dir, q) = queue();
    q.enqueue("spawn", serde_json::json!({}), 0, 3).expect("enqueue");
    let other = q.enqueue("cleanup", serde_json::json!({}), 0, 3).expect("enqueue");
    q.complete(&other.id).expect("complete");

    let (page, total) =
        q.list(JobListQuery { status: Some(JobStatus::Pending), limit: 10, offset: 0, job_type: None }).expect("list");
    assert_eq!(total, 1);
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].job_type, "spawn");
}

#[test]
fn list_paginates_with_offset() {
    let (_dir, q) = queue();
    for i in 0..5 {
        q.enqueue(format!("job-{i}"), serde_json::json!({}), 0, 3).expect("enqueue");
    }
    let (page, total) = q.list(JobListQuery { limit: 2, offset: 2, ..Default::default() }).expect("list");
    assert_eq!(total, 5);
    assert_eq!(page.len(), 2);
}
