/*!
 * Notification Tests
 * Change listeners, cascading grants and the cascade depth guard
 */

use object_permissions::permissions::{
    ChangeEvent, ChangeKind, Group, PermissionManager, Principal, PrincipalKey, TargetRef, User,
};
use object_permissions::{AuthzError, EngineConfig, ListenerFailurePolicy};
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use std::sync::Arc;

const PERMS: [&str; 3] = ["view", "edit", "share"];

fn setup(config: EngineConfig) -> PermissionManager {
    let manager = PermissionManager::with_config(config);
    manager.register("folder", PERMS).unwrap();
    manager.register("doc", PERMS).unwrap();
    manager
}

fn record_events(manager: &PermissionManager) -> Arc<Mutex<Vec<ChangeEvent>>> {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    manager.subscribe(move |_, event| {
        sink.lock().push(event.clone());
        Ok(())
    });
    events
}

#[test]
fn test_events_for_create_and_update() {
    let manager = setup(EngineConfig::default());
    let events = record_events(&manager);
    let user = User::new(1);
    let folder = TargetRef::new("folder", 1);

    manager.grant(&user, &folder, "view").unwrap();
    manager.grant(&user, &folder, "edit").unwrap();
    manager.revoke(&user, &folder, "share").unwrap();
    manager.revoke_all(&user, &folder).unwrap();

    let events = events.lock();
    let kinds: Vec<ChangeKind> = events.iter().map(|e| e.kind).collect();
    assert_eq!(kinds, vec![ChangeKind::Created, ChangeKind::Updated]);
    assert_eq!(events[1].record.mask, 3);
    assert_eq!(events[1].principal, PrincipalKey::User(1));
    assert_eq!(events[1].target, folder);
    assert!(events.iter().all(|e| e.depth == 0));
}

#[test]
fn test_listeners_run_in_subscription_order() {
    let manager = setup(EngineConfig::default());
    let order = Arc::new(Mutex::new(Vec::new()));
    for tag in ["first", "second", "third"] {
        let order = order.clone();
        manager.subscribe(move |_, _| {
            order.lock().push(tag);
            Ok(())
        });
    }

    manager.grant(&Group::new(1), &TargetRef::new("folder", 1), "view").unwrap();
    assert_eq!(*order.lock(), vec!["first", "second", "third"]);
}

#[test]
fn test_unsubscribed_listener_not_called() {
    let manager = setup(EngineConfig::default());
    let events = Arc::new(Mutex::new(0usize));
    let counter = events.clone();
    let id = manager.subscribe(move |_, _| {
        *counter.lock() += 1;
        Ok(())
    });

    manager.grant(&User::new(1), &TargetRef::new("doc", 1), "view").unwrap();
    assert!(manager.unsubscribe(id));
    manager.grant(&User::new(1), &TargetRef::new("doc", 2), "view").unwrap();
    assert_eq!(*events.lock(), 1);
}

#[test]
fn test_folder_grants_cascade_to_documents() {
    let manager = setup(EngineConfig::default());
    let children: Arc<Vec<u64>> = Arc::new(vec![10, 11, 12]);

    let contents = children.clone();
    manager.subscribe(move |manager, event| {
        if event.target.target_type.as_str() != "folder" {
            return Ok(());
        }
        let caps = manager.capabilities(&event.target.target_type)?;
        let names = caps.as_string_list(event.record.mask);
        for child in contents.iter() {
            let doc = TargetRef::new("doc", *child);
            match event.principal {
                PrincipalKey::User(id) => manager.set(&User::new(id), &doc, names.clone())?,
                PrincipalKey::Group(id) => manager.set(Principal::Group(id), &doc, names.clone())?,
            };
        }
        Ok(())
    });
    let events = record_events(&manager);

    let folder = TargetRef::new("folder", 1);
    manager.grant(&Group::new(4), &folder, ["view", "share"]).unwrap();

    for child in children.iter() {
        let doc = TargetRef::new("doc", *child);
        assert!(manager.has_all_permissions(&Group::new(4), &doc, ["view", "share"]).unwrap());
    }

    // The folder event is seen at depth 0, the documents at depth 1
    let depths: Vec<(String, usize)> = events
        .lock()
        .iter()
        .map(|e| (e.target.to_string(), e.depth))
        .collect();
    assert_eq!(
        depths,
        vec![
            ("doc#10".to_string(), 1),
            ("doc#11".to_string(), 1),
            ("doc#12".to_string(), 1),
            ("folder#1".to_string(), 0),
        ]
    );
}

#[test]
fn test_cascade_depth_guard() {
    let manager = setup(EngineConfig::default().with_max_cascade_depth(3));
    // Every grant on doc n grants doc n + 1
    manager.subscribe(|manager, event| {
        let next = TargetRef::new("doc", event.target.object_id + 1);
        manager.grant(Principal::Group(1), &next, "view")?;
        Ok(())
    });

    let err = manager
        .grant(Principal::Group(1), &TargetRef::new("doc", 0), "view")
        .unwrap_err();
    assert_eq!(err, AuthzError::CascadeDepthExceeded { depth: 4, max: 3 });

    // Mutations up to the limit were kept
    assert_eq!(manager.store().len(), 4);
    assert_eq!(manager.stats().cascade_rejections, 1);
}

#[test]
fn test_cascade_guard_resets_after_failure() {
    let manager = setup(EngineConfig::default().with_max_cascade_depth(0));
    manager.subscribe(|manager, event| {
        if event.target.target_type.as_str() == "folder" {
            manager.grant(Principal::Group(1), &TargetRef::new("doc", 1), "view")?;
        }
        Ok(())
    });

    assert!(manager
        .grant(Principal::Group(1), &TargetRef::new("folder", 1), "view")
        .is_err());
    // Depth returned to zero, so a direct mutation still succeeds
    assert!(manager
        .grant(Principal::Group(2), &TargetRef::new("doc", 2), "view")
        .is_ok());
}

#[test]
fn test_failing_listener_skips_the_rest() {
    let manager = setup(EngineConfig::default());
    manager.subscribe(|_, _| Err(AuthzError::Store("index offline".into())));
    let events = record_events(&manager);

    let err = manager
        .grant(&User::new(1), &TargetRef::new("doc", 1), "view")
        .unwrap_err();
    match err {
        AuthzError::ListenerFailed { reason, .. } => assert!(reason.contains("index offline")),
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(events.lock().is_empty());
    assert!(manager.has_permission(&User::new(1), &TargetRef::new("doc", 1), "view", false).unwrap());
}

#[test]
fn test_failing_listener_logged_and_skipped() {
    let manager = setup(EngineConfig::default().with_listener_failure(ListenerFailurePolicy::LogAndContinue));
    manager.subscribe(|_, _| Err(AuthzError::Store("index offline".into())));
    let events = record_events(&manager);

    manager.grant(&User::new(1), &TargetRef::new("doc", 1), "view").unwrap();
    assert_eq!(events.lock().len(), 1);
    assert_eq!(manager.stats().listener_failures, 1);
}
