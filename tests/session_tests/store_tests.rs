//! Session Store Tests
//!
//! Tests verify:
//! - Create / get / destroy life cycle
//! - Login info and last fix updates
//! - Unknown session errors
//! - Independent concurrent handlers

use std::net::SocketAddr;
use std::sync::Arc;
use std::thread;

use chrono::{Local, Utc};
use trackwire::{ConnectionId, GpsFix, SessionState, SessionStore, TrackerError};

fn addr(port: u16) -> SocketAddr {
    SocketAddr::from(([10, 0, 0, 7], port))
}

fn sample_fix(latitude: f64) -> GpsFix {
    let now = Utc::now();
    GpsFix {
        timestamp_utc: now,
        timestamp_local: now.with_timezone(&Local),
        time_from_device: true,
        valid: true,
        satellites: 7,
        latitude,
        longitude: 2.35,
        speed: 0,
        heading: 0,
        accuracy: 0.0,
    }
}

// =============================================================================
// Life cycle
// =============================================================================

#[test]
fn test_new_store_is_empty() {
    let store = SessionStore::new();
    assert!(store.is_empty());
    assert_eq!(store.len(), 0);
}

#[test]
fn test_create_and_get() {
    let store = SessionStore::new();
    let id = ConnectionId::new(1);
    store.create(id, addr(4000)).unwrap();

    let session = store.get(id).unwrap();
    assert_eq!(session.connection_id, id);
    assert_eq!(session.remote_addr, addr(4000));
    assert_eq!(session.imei, None);
    assert_eq!(session.software_version, None);
    assert_eq!(session.last_fix, None);
    assert_eq!(session.state, SessionState::Connected);
    assert_eq!(session.device_id(), "-");
}

#[test]
fn test_create_twice_fails() {
    let store = SessionStore::new();
    let id = ConnectionId::new(1);
    store.create(id, addr(4000)).unwrap();
    assert!(matches!(
        store.create(id, addr(4001)),
        Err(TrackerError::SessionExists(_))
    ));
}

#[test]
fn test_destroy_removes_session() {
    let store = SessionStore::new();
    let id = ConnectionId::new(3);
    store.create(id, addr(4000)).unwrap();

    store.set_login_info(id, "639355201084827", 1).unwrap();

    let removed = store.destroy(id).unwrap();
    assert_eq!(removed.connection_id, id);
    assert_eq!(removed.state, SessionState::Closed);
    assert_eq!(removed.imei.as_deref(), Some("639355201084827"));
    assert!(!store.contains(id));
    assert!(store.destroy(id).is_none());
    assert!(matches!(store.get(id), Err(TrackerError::UnknownSession(_))));
}

#[test]
fn test_get_unknown_session() {
    let store = SessionStore::new();
    let err = store.get(ConnectionId::new(99)).unwrap_err();
    assert!(matches!(err, TrackerError::UnknownSession(id) if id == ConnectionId::new(99)));
}

// =============================================================================
// Updates
// =============================================================================

#[test]
fn test_login_info_authenticates() {
    let store = SessionStore::new();
    let id = ConnectionId::new(1);
    store.create(id, addr(4000)).unwrap();

    store.set_login_info(id, "639355201084827", 2).unwrap();
    let session = store.get(id).unwrap();
    assert_eq!(session.imei.as_deref(), Some("639355201084827"));
    assert_eq!(session.software_version, Some(2));
    assert_eq!(session.state, SessionState::Authenticated);
    assert_eq!(session.device_id(), "639355201084827");
}

#[test]
fn test_repeated_login_same_value() {
    let store = SessionStore::new();
    let id = ConnectionId::new(1);
    store.create(id, addr(4000)).unwrap();

    store.set_login_info(id, "639355201084827", 2).unwrap();
    let first = store.get(id).unwrap();
    store.set_login_info(id, "639355201084827", 2).unwrap();
    let second = store.get(id).unwrap();

    assert_eq!(first.imei, second.imei);
    assert_eq!(first.software_version, second.software_version);
}

#[test]
fn test_last_fix_is_overwritten() {
    let store = SessionStore::new();
    let id = ConnectionId::new(1);
    store.create(id, addr(4000)).unwrap();

    store.set_last_fix(id, sample_fix(48.0)).unwrap();
    store.set_last_fix(id, sample_fix(49.0)).unwrap();
    assert_eq!(store.get(id).unwrap().last_fix.unwrap().latitude, 49.0);
}

#[test]
fn test_setters_on_unknown_session() {
    let store = SessionStore::new();
    let id = ConnectionId::new(5);
    assert!(matches!(
        store.set_login_info(id, "1", 1),
        Err(TrackerError::UnknownSession(_))
    ));
    assert!(matches!(
        store.set_last_fix(id, sample_fix(1.0)),
        Err(TrackerError::UnknownSession(_))
    ));
    assert!(matches!(store.record_frame(id), Err(TrackerError::UnknownSession(_))));
}

#[test]
fn test_record_frame_counts() {
    let store = SessionStore::new();
    let id = ConnectionId::new(1);
    store.create(id, addr(4000)).unwrap();
    for _ in 0..3 {
        store.record_frame(id).unwrap();
    }
    assert_eq!(store.get(id).unwrap().frames_received, 3);
}

// =============================================================================
// Concurrency
// =============================================================================

#[test]
fn test_handlers_touch_only_their_own_key() {
    let store = Arc::new(SessionStore::new());

    let handles: Vec<_> = (0..8u64)
        .map(|n| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                let id = ConnectionId::new(n);
                store.create(id, addr(5000 + n as u16)).unwrap();
                for _ in 0..100 {
                    store.record_frame(id).unwrap();
                }
                store.set_login_info(id, format!("imei-{}", n), n as u8).unwrap();
                store.get(id).unwrap()
            })
        })
        .collect();

    for (n, handle) in handles.into_iter().enumerate() {
        let session = handle.join().unwrap();
        assert_eq!(session.frames_received, 100);
        assert_eq!(session.imei, Some(format!("imei-{}", n)));
    }
    assert_eq!(store.len(), 8);
}
