//! End-to-end negotiation behaviour against in-memory authorities.

use std::sync::Arc;

use persist_negotiator::{
    AuthorityError, Availability, InMemoryPermissionAuthority, InMemoryPersistenceAuthority,
    NegotiationError, NegotiationOutcome, PermissionState, PersistenceNegotiator,
    PersistenceStatus,
};

fn with_both(
    persistence: &Arc<InMemoryPersistenceAuthority>,
    permissions: &Arc<InMemoryPermissionAuthority>,
) -> PersistenceNegotiator {
    PersistenceNegotiator::new(Some(persistence.clone()), Some(permissions.clone()))
}

fn granted() -> Arc<InMemoryPermissionAuthority> {
    Arc::new(InMemoryPermissionAuthority::with_persistent_storage(
        PermissionState::Granted,
    ))
}

#[tokio::test]
async fn absent_persistence_authority_is_never() {
    let alone = PersistenceNegotiator::new(None, None);
    assert_eq!(alone.negotiate().await, Ok(NegotiationOutcome::Never));

    let permissions = granted();
    let with_permissions = PersistenceNegotiator::new(None, Some(permissions.clone()));
    assert_eq!(with_permissions.negotiate().await, Ok(NegotiationOutcome::Never));
    assert_eq!(permissions.query_calls(), 0);
}

#[tokio::test]
async fn unreadable_status_is_never() {
    for err in [
        AuthorityError::Unsupported("persisted".into()),
        AuthorityError::Host("storage service crashed".into()),
    ] {
        let persistence = Arc::new(InMemoryPersistenceAuthority::new().with_status_error(err));
        let permissions = granted();

        let outcome = with_both(&persistence, &permissions).negotiate().await;
        assert_eq!(outcome, Ok(NegotiationOutcome::Never));
        assert_eq!(persistence.persist_calls(), 0);
        assert_eq!(permissions.query_calls(), 0);
    }
}

#[tokio::test]
async fn already_persisted_touches_nothing_else() {
    let persistence = Arc::new(InMemoryPersistenceAuthority::persisted());
    let permissions = granted();
    let negotiator = with_both(&persistence, &permissions);

    for _ in 0..3 {
        assert_eq!(negotiator.negotiate().await, Ok(NegotiationOutcome::Persisted));
    }
    assert_eq!(persistence.status_calls(), 3);
    assert_eq!(persistence.persist_calls(), 0);
    assert_eq!(permissions.query_calls(), 0);
}

#[tokio::test]
async fn absent_permission_authority_is_prompt() {
    let persistence = Arc::new(InMemoryPersistenceAuthority::new());
    let negotiator = PersistenceNegotiator::new(Some(persistence.clone()), None);

    assert_eq!(negotiator.negotiate().await, Ok(NegotiationOutcome::Prompt));
    assert_eq!(persistence.persist_calls(), 0);
}

#[tokio::test]
async fn unqueryable_permission_is_prompt() {
    let persistence = Arc::new(InMemoryPersistenceAuthority::new());

    // Capability unknown to the host
    let unknown = Arc::new(InMemoryPermissionAuthority::new());
    assert_eq!(
        with_both(&persistence, &unknown).negotiate().await,
        Ok(NegotiationOutcome::Prompt)
    );

    // Transient host failure
    let failing = Arc::new(
        InMemoryPermissionAuthority::with_persistent_storage(PermissionState::Granted)
            .with_query_error(AuthorityError::Host("permission service restarting".into())),
    );
    assert_eq!(
        with_both(&persistence, &failing).negotiate().await,
        Ok(NegotiationOutcome::Prompt)
    );
    assert_eq!(persistence.persist_calls(), 0);
}

#[tokio::test]
async fn denied_is_never_without_upgrade() {
    let persistence = Arc::new(InMemoryPersistenceAuthority::new());
    let permissions = Arc::new(InMemoryPermissionAuthority::with_persistent_storage(
        PermissionState::Denied,
    ));

    let outcome = with_both(&persistence, &permissions).negotiate().await;
    assert_eq!(outcome, Ok(NegotiationOutcome::Never));
    assert_eq!(persistence.persist_calls(), 0);
    assert_eq!(persistence.current_status(), PersistenceStatus::BestEffort);
}

#[tokio::test]
async fn unrecognized_permission_state_is_never_without_upgrade() {
    let persistence = Arc::new(InMemoryPersistenceAuthority::new());
    let permissions = Arc::new(
        InMemoryPermissionAuthority::new()
            .with_host_state(persist_negotiator::PERSISTENT_STORAGE, "default"),
    );

    let outcome = with_both(&persistence, &permissions).negotiate().await;
    assert_eq!(outcome, Ok(NegotiationOutcome::Never));
    assert_eq!(persistence.persist_calls(), 0);
    assert_eq!(persistence.current_status(), PersistenceStatus::BestEffort);
}

#[tokio::test]
async fn host_errors_stay_prompt_while_unrecognized_state_is_never() {
    let persistence = Arc::new(InMemoryPersistenceAuthority::new());

    for (err, expected) in [
        (AuthorityError::Unsupported("persistent-storage".into()), NegotiationOutcome::Prompt),
        (AuthorityError::Host("permission service restarting".into()), NegotiationOutcome::Prompt),
        (AuthorityError::UnrecognizedState("default".into()), NegotiationOutcome::Never),
    ] {
        let permissions = Arc::new(InMemoryPermissionAuthority::new().with_query_error(err));
        assert_eq!(
            with_both(&persistence, &permissions).negotiate().await,
            Ok(expected)
        );
    }
    assert_eq!(persistence.persist_calls(), 0);
}

#[tokio::test]
async fn prompt_is_prompt_without_upgrade() {
    let persistence = Arc::new(InMemoryPersistenceAuthority::new());
    let permissions = Arc::new(InMemoryPermissionAuthority::with_persistent_storage(
        PermissionState::Prompt,
    ));

    let outcome = with_both(&persistence, &permissions).negotiate().await;
    assert_eq!(outcome, Ok(NegotiationOutcome::Prompt));
    assert_eq!(persistence.persist_calls(), 0);
}

#[tokio::test]
async fn granted_upgrades_silently() {
    let persistence = Arc::new(InMemoryPersistenceAuthority::new());
    let permissions = granted();
    let negotiator = with_both(&persistence, &permissions);

    assert_eq!(negotiator.negotiate().await, Ok(NegotiationOutcome::Persisted));
    assert_eq!(persistence.persist_calls(), 1);
    assert_eq!(persistence.current_status(), PersistenceStatus::Persisted);

    // Second round short-circuits on the now-durable status
    assert_eq!(negotiator.negotiate().await, Ok(NegotiationOutcome::Persisted));
    assert_eq!(persistence.persist_calls(), 1);
    assert_eq!(permissions.query_calls(), 1);
}

#[tokio::test]
async fn granted_but_declined_raises_upgrade_failed() {
    let persistence = Arc::new(InMemoryPersistenceAuthority::new().with_upgrade_result(false));
    let permissions = granted();

    let result = with_both(&persistence, &permissions).negotiate().await;
    assert!(matches!(result, Err(NegotiationError::UpgradeFailed { .. })));
    assert_eq!(persistence.persist_calls(), 1);
}

#[tokio::test]
async fn granted_but_host_error_raises_upgrade_failed() {
    let persistence = Arc::new(
        InMemoryPersistenceAuthority::new()
            .with_persist_error(AuthorityError::Host("disk quota exhausted".into())),
    );
    let permissions = granted();

    let err = with_both(&persistence, &permissions)
        .negotiate_with_report()
        .await
        .unwrap_err();
    assert!(err.to_string().contains("disk quota exhausted"));

    // The audit trail survives the failure
    let steps = err.steps();
    assert_eq!(steps.len(), 3);
    assert_eq!(steps[1].observation, "granted");
    assert!(steps[2].observation.contains("disk quota exhausted"));
}

#[tokio::test]
async fn auxiliary_calls_leave_no_hidden_state() {
    let persistence = Arc::new(InMemoryPersistenceAuthority::new());
    let permissions = Arc::new(InMemoryPermissionAuthority::with_persistent_storage(
        PermissionState::Prompt,
    ));
    let negotiator = with_both(&persistence, &permissions);

    // Status reads do not change the decision
    assert_eq!(
        negotiator.query_status().await,
        Availability::Available(PersistenceStatus::BestEffort)
    );
    assert_eq!(negotiator.negotiate().await, Ok(NegotiationOutcome::Prompt));

    // An explicit upgrade only matters through the store's new status
    assert_eq!(negotiator.request_upgrade().await, Availability::Available(true));
    assert_eq!(negotiator.negotiate().await, Ok(NegotiationOutcome::Persisted));

    // Host eviction back to best-effort is picked up immediately
    persistence.set_status(PersistenceStatus::BestEffort);
    assert_eq!(negotiator.negotiate().await, Ok(NegotiationOutcome::Prompt));
}

#[tokio::test]
async fn permission_changes_are_seen_on_next_negotiation() {
    let persistence = Arc::new(InMemoryPersistenceAuthority::new());
    let permissions = Arc::new(InMemoryPermissionAuthority::with_persistent_storage(
        PermissionState::Denied,
    ));
    let negotiator = with_both(&persistence, &permissions);

    assert_eq!(negotiator.negotiate().await, Ok(NegotiationOutcome::Never));

    permissions.set_state(persist_negotiator::PERSISTENT_STORAGE, PermissionState::Granted);
    assert_eq!(negotiator.negotiate().await, Ok(NegotiationOutcome::Persisted));
}

#[tokio::test]
async fn query_status_sentinels() {
    let absent = PersistenceNegotiator::new(None, None);
    assert_eq!(absent.query_status().await, Availability::Unavailable);

    let unsupported = PersistenceNegotiator::new(
        Some(Arc::new(
            InMemoryPersistenceAuthority::new()
                .with_status_error(AuthorityError::Unsupported("persisted".into())),
        )),
        None,
    );
    assert_eq!(unsupported.query_status().await, Availability::Unavailable);

    let durable = PersistenceNegotiator::new(
        Some(Arc::new(InMemoryPersistenceAuthority::persisted())),
        None,
    );
    assert_eq!(
        durable.query_status().await,
        Availability::Available(PersistenceStatus::Persisted)
    );
}

#[tokio::test]
async fn concurrent_negotiations_are_independent() {
    let persistence = Arc::new(InMemoryPersistenceAuthority::new());
    let permissions = Arc::new(InMemoryPermissionAuthority::with_persistent_storage(
        PermissionState::Prompt,
    ));
    let negotiator = with_both(&persistence, &permissions);

    let rounds = (0..16).map(|_| negotiator.negotiate());
    let outcomes = futures::future::join_all(rounds).await;

    assert!(outcomes
        .iter()
        .all(|o| *o == Ok(NegotiationOutcome::Prompt)));
    assert_eq!(permissions.query_calls(), 16);
    assert_eq!(persistence.persist_calls(), 0);
}

#[tokio::test]
async fn report_serializes_for_audit() {
    let persistence = Arc::new(InMemoryPersistenceAuthority::new());
    let permissions = granted();

    let report = with_both(&persistence, &permissions)
        .negotiate_with_report()
        .await
        .unwrap();
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["outcome"], "persisted");
    assert_eq!(json["capability"], "persistent-storage");
    assert_eq!(json["steps"].as_array().unwrap().len(), 3);
    assert_eq!(json["steps"][2]["step"], "upgrade");
}
