//! Editor bridge: query the current position, navigate to a saved one.

use std::env;
use std::path::Path;
use std::process::{Command, Stdio};

use tracing::debug;

use crate::domain::errors::JumpError;
use crate::domain::model::JumpPoint;

/// Narrow capability interface onto the editor's automation surface.
///
/// The commands depend only on these two methods, so unit tests drive
/// push/pop against an in-memory double and never need a real editor.
pub trait EditorBridge {
    /// Identify the focused document and its selection range.
    fn capture(&self) -> Result<JumpPoint, JumpError>;

    /// Open a document and restore a saved selection range.
    fn open_at(&self, point: &JumpPoint) -> Result<(), JumpError>;
}

/// Bridge onto BBEdit.
///
/// Capture reads the `BB_DOC_*` variables BBEdit exports to the
/// environment of `#!`-menu and Scripts-menu invocations. Navigation goes
/// through BBEdit's AppleScript interface via `osascript` (or whatever
/// `automation_command` is configured, which is how tests stub it out).
pub struct BbeditBridge {
    automation_command: String,
}

impl BbeditBridge {
    pub fn new(automation_command: impl Into<String>) -> Self {
        Self {
            automation_command: automation_command.into(),
        }
    }
}

impl EditorBridge for BbeditBridge {
    fn capture(&self) -> Result<JumpPoint, JumpError> {
        let file_path = env::var("BB_DOC_PATH").map_err(|_| {
            JumpError::EditorUnavailable(
                "BB_DOC_PATH is not set; run this from a BBEdit script".into(),
            )
        })?;
        // BBEdit leaves the path empty for documents never saved to disk.
        if file_path.is_empty() {
            return Err(JumpError::NoActiveDocument);
        }

        let start = offset_var("BB_DOC_SELSTART")?;
        let end = offset_var("BB_DOC_SELEND").unwrap_or(start);
        Ok(JumpPoint::new(file_path, (start.min(end), start.max(end))))
    }

    fn open_at(&self, point: &JumpPoint) -> Result<(), JumpError> {
        let target = Path::new(&point.file_path);
        if !target.exists() {
            return Err(JumpError::TargetMissing {
                path: target.to_path_buf(),
            });
        }

        let script = navigate_script(&point.file_path, point.selection);
        debug!(command = %self.automation_command, %script, "navigating");

        let status = Command::new(&self.automation_command)
            .arg("-e")
            .arg(&script)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|err| {
                JumpError::EditorUnavailable(format!(
                    "failed to run {}: {err}",
                    self.automation_command
                ))
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(JumpError::EditorUnavailable(format!(
                "{} exited with {status}",
                self.automation_command
            )))
        }
    }
}

fn offset_var(name: &str) -> Result<u64, JumpError> {
    let raw = env::var(name)
        .map_err(|_| JumpError::EditorUnavailable(format!("{name} is not set")))?;
    raw.parse().map_err(|_| {
        JumpError::EditorUnavailable(format!("{name} is not a character offset: {raw:?}"))
    })
}

/// Build the AppleScript that opens the document and restores the range.
///
/// AppleScript characters are 1-based and inclusive; the captured offsets
/// are 0-based `[start, end)`. An empty range becomes an insertion point.
fn navigate_script(file_path: &str, (start, end): (u64, u64)) -> String {
    let select = if end > start {
        format!("select characters {} thru {} of doc", start + 1, end)
    } else {
        format!("select insertion point before character {} of doc", start + 1)
    };
    format!(
        "tell application \"BBEdit\"\n\
         \tactivate\n\
         \tset doc to open (POSIX file \"{}\")\n\
         \t{select}\n\
         end tell",
        applescript_escape(file_path)
    )
}

fn applescript_escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranged_selection_becomes_a_character_range() {
        let script = navigate_script("/tmp/a.py", (10, 20));
        assert!(script.contains("select characters 11 thru 20 of doc"));
        assert!(script.contains("POSIX file \"/tmp/a.py\""));
    }

    #[test]
    fn empty_selection_becomes_an_insertion_point() {
        let script = navigate_script("/tmp/a.py", (7, 7));
        assert!(script.contains("select insertion point before character 8 of doc"));
    }

    #[test]
    fn paths_with_quotes_are_escaped() {
        let script = navigate_script("/tmp/od\"d.py", (0, 0));
        assert!(script.contains("POSIX file \"/tmp/od\\\"d.py\""));
    }
}
