//! The pop command: consume the most recent jump point and return to it.

use tracing::info;

use crate::domain::errors::JumpError;
use crate::domain::model::PopOutcome;
use crate::infra::editor::EditorBridge;
use crate::infra::store::StackStore;

/// Remove the tail point from the stack and navigate the editor to it.
///
/// An empty stack is a successful no-op, not an error. The stack is
/// durably shortened and the lock released before navigation is attempted,
/// so a slow or hung editor never holds the stack file — and a point whose
/// target vanished stays consumed rather than blocking every later pop.
pub fn run(bridge: &impl EditorBridge, store: &StackStore) -> Result<PopOutcome, JumpError> {
    let Some(point) = store.with_lock(|stack| stack.pop())? else {
        return Ok(PopOutcome::Empty);
    };

    info!(
        file = %point.file_path,
        start = point.selection.0,
        end = point.selection.1,
        "returning to jump point"
    );
    bridge.open_at(&point)?;
    Ok(PopOutcome::Popped(point))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    use crate::domain::model::JumpPoint;
    use crate::infra::editor::testing::FakeBridge;

    fn store_in(dir: &std::path::Path) -> StackStore {
        StackStore::new(dir.join("stack.json"), Duration::from_millis(500))
    }

    #[test]
    fn empty_stack_is_a_noop() {
        let temp = tempfile::tempdir().unwrap();
        let store = store_in(temp.path());
        let bridge = FakeBridge::navigator();

        let outcome = run(&bridge, &store).unwrap();

        assert_eq!(outcome, PopOutcome::Empty);
        assert!(bridge.opened.borrow().is_empty());
        assert!(!store.path().exists());
    }

    #[test]
    fn pops_navigate_in_reverse_push_order() {
        let temp = tempfile::tempdir().unwrap();
        let store = store_in(temp.path());
        let bridge = FakeBridge::navigator();

        let a = JumpPoint::new("/tmp/a.py", (10, 20));
        let b = JumpPoint::new("/tmp/b.py", (0, 5));
        store
            .with_lock(|stack| {
                stack.push(a.clone());
                stack.push(b.clone());
            })
            .unwrap();

        assert_eq!(run(&bridge, &store).unwrap(), PopOutcome::Popped(b.clone()));
        assert_eq!(store.load().unwrap().len(), 1);

        assert_eq!(run(&bridge, &store).unwrap(), PopOutcome::Popped(a.clone()));
        assert!(store.load().unwrap().is_empty());

        assert_eq!(run(&bridge, &store).unwrap(), PopOutcome::Empty);
        assert_eq!(*bridge.opened.borrow(), vec![b, a]);
    }

    #[test]
    fn missing_target_still_consumes_the_point() {
        let temp = tempfile::tempdir().unwrap();
        let store = store_in(temp.path());
        let bridge = FakeBridge {
            missing_targets: vec!["/tmp/deleted.py".into()],
            ..FakeBridge::navigator()
        };

        store
            .with_lock(|stack| {
                stack.push(JumpPoint::new("/tmp/kept.py", (1, 2)));
                stack.push(JumpPoint::new("/tmp/deleted.py", (3, 4)));
            })
            .unwrap();

        let err = run(&bridge, &store).unwrap_err();

        assert!(matches!(err, JumpError::TargetMissing { .. }));
        let stack = store.load().unwrap();
        assert_eq!(stack.len(), 1);
        assert_eq!(stack.points()[0].file_path, "/tmp/kept.py");
    }
}
