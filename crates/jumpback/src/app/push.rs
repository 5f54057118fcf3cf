//! The push command: capture the current position and stack it.

use time::OffsetDateTime;
use tracing::info;

use crate::domain::errors::JumpError;
use crate::domain::model::JumpPoint;
use crate::infra::editor::EditorBridge;
use crate::infra::store::StackStore;

/// Capture the editor's current position and append it to the stack.
///
/// Capture runs before the lock is taken; if it fails, the stack is left
/// untouched and the error is returned — a placeholder entry is never
/// persisted. When `max_point_age` is set, points older than that are
/// discarded in the same transaction, so the file cannot grow unbounded
/// from abandoned sessions.
pub fn run(
    bridge: &impl EditorBridge,
    store: &StackStore,
    max_point_age: Option<time::Duration>,
) -> Result<JumpPoint, JumpError> {
    let point = bridge.capture()?;
    info!(
        file = %point.file_path,
        start = point.selection.0,
        end = point.selection.1,
        "pushing jump point"
    );

    let pushed = point.clone();
    store.with_lock(move |stack| {
        if let Some(max_age) = max_point_age {
            stack.prune_older_than(OffsetDateTime::now_utc(), max_age);
        }
        stack.push(pushed);
    })?;
    Ok(point)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    use crate::infra::editor::testing::{FakeBridge, FakeCapture};

    fn store_in(dir: &std::path::Path) -> StackStore {
        StackStore::new(dir.join("stack.json"), Duration::from_millis(500))
    }

    #[test]
    fn appends_captured_point_to_the_stack() {
        let temp = tempfile::tempdir().unwrap();
        let store = store_in(temp.path());
        let bridge = FakeBridge::returning(JumpPoint::new("/tmp/a.py", (10, 20)));

        let pushed = run(&bridge, &store, None).unwrap();

        assert_eq!(pushed.file_path, "/tmp/a.py");
        let stack = store.load().unwrap();
        assert_eq!(stack.len(), 1);
        assert_eq!(stack.points()[0], pushed);
    }

    #[test]
    fn capture_failure_leaves_the_stack_untouched() {
        let temp = tempfile::tempdir().unwrap();
        let store = store_in(temp.path());
        let bridge = FakeBridge {
            capture: FakeCapture::NoDocument,
            ..FakeBridge::navigator()
        };

        let err = run(&bridge, &store, None).unwrap_err();

        assert!(matches!(err, JumpError::NoActiveDocument));
        assert!(!store.path().exists());
    }

    #[test]
    fn push_prunes_expired_points_when_configured() {
        let temp = tempfile::tempdir().unwrap();
        let store = store_in(temp.path());
        store
            .with_lock(|stack| {
                stack.push(JumpPoint {
                    file_path: "/tmp/stale.py".into(),
                    selection: (0, 0),
                    captured_at: "2020-01-01T00:00:00Z".into(),
                })
            })
            .unwrap();

        let bridge = FakeBridge::returning(JumpPoint::new("/tmp/fresh.py", (1, 2)));
        run(&bridge, &store, Some(time::Duration::hours(1))).unwrap();

        let stack = store.load().unwrap();
        assert_eq!(stack.len(), 1);
        assert_eq!(stack.points()[0].file_path, "/tmp/fresh.py");
    }

    #[test]
    fn push_keeps_unexpired_points_when_pruning() {
        let temp = tempfile::tempdir().unwrap();
        let store = store_in(temp.path());
        let bridge = FakeBridge::returning(JumpPoint::new("/tmp/second.py", (3, 9)));

        store
            .with_lock(|stack| stack.push(JumpPoint::new("/tmp/first.py", (0, 4))))
            .unwrap();
        run(&bridge, &store, Some(time::Duration::hours(1))).unwrap();

        let stack = store.load().unwrap();
        assert_eq!(stack.len(), 2);
        assert_eq!(stack.points()[0].file_path, "/tmp/first.py");
        assert_eq!(stack.points()[1].file_path, "/tmp/second.py");
    }
}
