use super::*;
use crate::context::{AGENT_ACTIVE, AGENT_WAITING};
use crate::handler::FakeWebhookHandler;
use ac_core::{ActivityState, AgentDefinition, JobId, Repository, Worktree};
use ac_session::{CreateSessionRequest, SessionManager};
use std::path::PathBuf;
use std::time::Duration;

fn cat_agent_definition() -> AgentDefinition {
    AgentDefinition::new("agent_test-cat", "Test Cat", "/bin/cat", vec![], vec![])
}

struct Fixture {
    _dir: tempfile::TempDir,
    store: Arc<Store>,
    sessions: Arc<SessionManager>,
    session_id: SessionId,
    worker_id: WorkerId,
}

/// A worktree session (so its session carries a `repository_id`), backed
/// by a single `Store` handle shared with the dispatcher under test.
fn fixture() -> Fixture {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = Arc::new(Store::open(dir.path()).expect("open store"));
    let repo = Repository::new("demo", PathBuf::from("/tmp"));
    store.save_repository(repo.clone()).expect("save repo");
    let worktree = Worktree::new(repo.id.clone(), std::env::temp_dir(), 1);
    store.save_worktree(worktree.clone()).expect("save worktree");

    let sessions = Arc::new(SessionManager::with_agent_definitions(Arc::clone(&store), vec![cat_agent_definition()]));
    let session = sessions
        .create_session(CreateSessionRequest::Worktree {
            repository_id: repo.id.clone(),
            worktree_id: worktree.id.clone(),
            agent_definition_id: ac_core::AgentDefinitionId::from_string("agent_test-cat".to_string()),
            title: None,
            initial_prompt: None,
        })
        .expect("create worktree session");
    let worker = sessions
        .list_workers(&session.id)
        .into_iter()
        .find(|w| matches!(w.kind, ac_core::WorkerKind::Agent { .. }))
        .expect("agent worker");

    Fixture { _dir: dir, store, sessions, session_id: session.id, worker_id: worker.id }
}

fn dispatcher_with_fake(fx: &Fixture, window: Duration) -> (Arc<Dispatcher>, Arc<FakeWebhookHandler>) {
    let fake = Arc::new(FakeWebhookHandler::new("slack"));
    let handlers: Vec<Arc<dyn WebhookHandler>> = vec![Arc::clone(&fake) as Arc<dyn WebhookHandler>];
    let dispatcher = Dispatcher::with_debounce_window(Arc::clone(&fx.store), Arc::clone(&fx.sessions), handlers, window);
    (dispatcher, fake)
}

#[tokio::test]
async fn waiting_to_idle_transition_is_suppressed_but_waiting_itself_still_sends() {
    let fx = fixture();
    let (dispatcher, fake) = dispatcher_with_fake(&fx, Duration::from_millis(30));

    dispatcher.simulate_activity(fx.session_id.clone(), fx.worker_id.clone(), ActivityState::Asking).await;
    dispatcher.simulate_activity(fx.session_id.clone(), fx.worker_id.clone(), ActivityState::Idle).await;
    tokio::time::sleep(Duration::from_millis(100)).await;

    let calls = fake.calls();
    assert_eq!(calls.len(), 1, "only the waiting event should have been sent");
    assert_eq!(calls[0].context.event_type, AGENT_WAITING);
}

#[tokio::test]
async fn active_transitions_are_dropped_by_the_default_trigger_filter() {
    let fx = fixture();
    let (dispatcher, fake) = dispatcher_with_fake(&fx, Duration::from_millis(30));

    dispatcher.simulate_activity(fx.session_id.clone(), fx.worker_id.clone(), ActivityState::Active).await;
    tokio::time::sleep(Duration::from_millis(80)).await;

    assert!(fake.calls().is_empty());
}

#[tokio::test]
async fn unknown_activity_never_sends() {
    let fx = fixture();
    let (dispatcher, fake) = dispatcher_with_fake(&fx, Duration::from_millis(30));

    dispatcher.simulate_activity(fx.session_id.clone(), fx.worker_id.clone(), ActivityState::Unknown).await;
    tokio::time::sleep(Duration::from_millis(80)).await;

    assert!(fake.calls().is_empty());
}

#[tokio::test]
async fn rapid_debounced_transitions_collapse_to_the_last_state() {
    let fx = fixture();
    let (dispatcher, fake) = dispatcher_with_fake(&fx, Duration::from_millis(80));
    dispatcher.set_trigger(AGENT_ACTIVE, true);

    dispatcher.simulate_activity(fx.session_id.clone(), fx.worker_id.clone(), ActivityState::Idle).await;
    dispatcher.simulate_activity(fx.session_id.clone(), fx.worker_id.clone(), ActivityState::Active).await;
    tokio::time::sleep(Duration::from_millis(150)).await;

    let calls = fake.calls();
    assert_eq!(calls.len(), 1, "the earlier idle timer should have been cancelled, not fired alongside the new one");
    assert_eq!(calls[0].context.event_type, AGENT_ACTIVE);
}

#[tokio::test]
async fn worker_exit_bypasses_debouncing_and_sends_immediately() {
    let fx = fixture();
    let (dispatcher, fake) = dispatcher_with_fake(&fx, Duration::from_secs(30));

    dispatcher.simulate_exit(fx.session_id.clone(), fx.worker_id.clone()).await;
    tokio::time::sleep(Duration::from_millis(30)).await;

    let calls = fake.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].context.event_type, WORKER_EXITED);
}

#[tokio::test]
async fn handler_that_cannot_handle_the_repository_receives_no_delivery() {
    let fx = fixture();
    let (dispatcher, fake) = dispatcher_with_fake(&fx, Duration::from_millis(10));
    fake.set_can_handle(false);

    dispatcher.simulate_exit(fx.session_id.clone(), fx.worker_id.clone()).await;
    tokio::time::sleep(Duration::from_millis(30)).await;

    assert!(fake.calls().is_empty());
}

#[tokio::test]
async fn job_driven_deliveries_dedup_via_the_store() {
    let fx = fixture();
    let (dispatcher, fake) = dispatcher_with_fake(&fx, Duration::from_millis(10));

    let context = NotificationContext {
        event_type: WORKER_ERROR,
        summary: "handler raised".to_string(),
        session_id: fx.session_id.clone(),
        worker_id: fx.worker_id.clone(),
        job_id: Some(JobId::new()),
    };
    dispatcher.notify(context.clone());
    tokio::time::sleep(Duration::from_millis(30)).await;
    dispatcher.notify(context);
    tokio::time::sleep(Duration::from_millis(30)).await;

    assert_eq!(fake.calls().len(), 1, "the second delivery attempt for the same target must be a no-op");
}

#[tokio::test]
async fn dispose_cancels_outstanding_debounce_timers() {
    let fx = fixture();
    let (dispatcher, fake) = dispatcher_with_fake(&fx, Duration::from_millis(50));

    dispatcher.simulate_activity(fx.session_id.clone(), fx.worker_id.clone(), ActivityState::Idle).await;
    dispatcher.dispose();
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert!(fake.calls().is_empty(), "disposing must drop pending, undebounced deliveries");
}
