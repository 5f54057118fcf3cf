//! Domain models for saved positions and the LIFO stack.

use serde::{Deserialize, Serialize};
use time::Duration;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// One saved location a user can jump back to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JumpPoint {
    /// Absolute path of the document the point was captured in.
    pub file_path: String,
    /// Character offsets of the saved selection. Equal offsets mark a bare
    /// cursor with no extent.
    pub selection: (u64, u64),
    /// RFC 3339 timestamp of the capture. Diagnostics only; ordering comes
    /// from position in the stack, never from this field.
    pub captured_at: String,
}

impl JumpPoint {
    /// Build a point stamped with the current UTC time.
    pub fn new(file_path: impl Into<String>, selection: (u64, u64)) -> Self {
        let captured_at = OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .unwrap_or_default();
        Self {
            file_path: file_path.into(),
            selection,
            captured_at,
        }
    }
}

/// Ordered collection of jump points, oldest first. The tail is the most
/// recently pushed, unpopped point.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Stack {
    points: Vec<JumpPoint>,
}

impl Stack {
    /// Create an empty stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of saved points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns whether any points are saved.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Access the saved points in insertion order.
    pub fn points(&self) -> &[JumpPoint] {
        &self.points
    }

    /// Append a point at the tail.
    pub fn push(&mut self, point: JumpPoint) {
        self.points.push(point);
    }

    /// Remove and return the tail point, if any.
    pub fn pop(&mut self) -> Option<JumpPoint> {
        self.points.pop()
    }

    /// Discard points captured more than `max_age` before `now`.
    ///
    /// Points whose timestamp does not parse are retained: `captured_at`
    /// is informational and a malformed stamp is no reason to drop a
    /// location the user saved.
    pub fn prune_older_than(&mut self, now: OffsetDateTime, max_age: Duration) {
        let cutoff = now - max_age;
        self.points.retain(|point| {
            OffsetDateTime::parse(&point.captured_at, &Rfc3339)
                .map(|added| added >= cutoff)
                .unwrap_or(true)
        });
    }
}

/// Result of a pop transaction, resolved before any navigation happens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PopOutcome {
    /// The tail point was removed from the stack.
    Popped(JumpPoint),
    /// The stack was empty; nothing to return to.
    Empty,
}
