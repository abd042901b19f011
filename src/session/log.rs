//! Terminal persistence of the finished session.
//!
//! One plain-text file per session, named from the session timestamp,
//! created atomically and never appended to. Section order is fixed:
//! header, analysis, transcript, tomorrow's focus.

use chrono::{DateTime, Local};
use std::fmt::Write as _;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use super::SessionState;
use crate::errors::SessionError;

/// Marker written when the session never committed a plan.
const NO_PLAN_MARKER: &str = "(none)";

/// File name for a session recorded at `now`.
pub fn log_file_name(now: &DateTime<Local>) -> String {
    format!("vesper_log_{}.txt", now.format("%Y%m%d_%H%M"))
}

/// Serialize `state` and create the log file under `dir`.
///
/// The body is fully rendered in memory first; a failed write leaves no
/// partially-built state behind, only a possibly truncated file the caller
/// is told about via the error.
pub fn write_session_log(
    dir: &Path,
    state: &SessionState,
    now: &DateTime<Local>,
) -> Result<PathBuf, SessionError> {
    let path = dir.join(log_file_name(now));
    let body = render(state, now);

    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&path)
        .map_err(|source| SessionError::Persist {
            path: path.clone(),
            source,
        })?;

    file.write_all(body.as_bytes())
        .map_err(|source| SessionError::Persist {
            path: path.clone(),
            source,
        })?;

    Ok(path)
}

fn render(state: &SessionState, now: &DateTime<Local>) -> String {
    let mut out = String::new();

    out.push_str("=== Vesper Session Log ===\n");
    let _ = writeln!(out, "Mode: {}", state.input_mode());
    let _ = writeln!(out, "Recorded: {}", now.to_rfc3339());

    out.push_str("\n--- Analysis ---\n");
    out.push_str(state.analysis_summary().unwrap_or(NO_PLAN_MARKER));
    out.push('\n');

    out.push_str("\n--- Transcript ---\n");
    for message in state.transcript.iter() {
        let _ = writeln!(out, "[{}] {}", message.role, message.text);
    }

    out.push_str("\n--- Tomorrow's Focus ---\n");
    out.push_str(state.committed_plan().unwrap_or(NO_PLAN_MARKER));
    out.push('\n');

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::InputMode;
    use crate::transcript::Role;
    use chrono::TimeZone;
    use tempfile::tempdir;

    fn fixed_time() -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 8, 6, 22, 14, 0).unwrap()
    }

    fn populated_state() -> SessionState {
        let mut state = SessionState::new();
        state.set_input_mode(InputMode::Conversational);
        state.set_analysis_summary("wins: sent the report");
        state.set_committed_plan("rest, then outline slides");
        state.transcript.push(Role::Agent, "how was today?");
        state.transcript.push(Role::Human, "long but fine");
        state
    }

    #[test]
    fn file_name_derives_from_timestamp() {
        assert_eq!(log_file_name(&fixed_time()), "vesper_log_20260806_2214.txt");
    }

    #[test]
    fn sections_appear_in_fixed_order() {
        let body = render(&populated_state(), &fixed_time());

        let header = body.find("=== Vesper Session Log ===").unwrap();
        let analysis = body.find("--- Analysis ---").unwrap();
        let transcript = body.find("--- Transcript ---").unwrap();
        let plan = body.find("--- Tomorrow's Focus ---").unwrap();

        assert!(header < analysis);
        assert!(analysis < transcript);
        assert!(transcript < plan);
    }

    #[test]
    fn transcript_lines_keep_original_order_and_tags() {
        let body = render(&populated_state(), &fixed_time());
        let agent = body.find("[vesper] how was today?").unwrap();
        let human = body.find("[you] long but fine").unwrap();
        assert!(agent < human);
    }

    #[test]
    fn unset_fields_get_none_markers() {
        let state = SessionState::new();
        let body = render(&state, &fixed_time());
        assert!(body.contains("--- Analysis ---\n(none)"));
        assert!(body.contains("--- Tomorrow's Focus ---\n(none)"));
        assert!(body.contains("Mode: none"));
    }

    #[test]
    fn write_creates_the_file_once() {
        let dir = tempdir().unwrap();
        let state = populated_state();
        let now = fixed_time();

        let path = write_session_log(dir.path(), &state, &now).unwrap();
        assert!(path.exists());
        let body = std::fs::read_to_string(&path).unwrap();
        assert!(body.contains("rest, then outline slides"));

        // Second creation with the same timestamp must fail, not append.
        let again = write_session_log(dir.path(), &state, &now);
        assert!(matches!(again, Err(SessionError::Persist { .. })));
    }

    #[test]
    fn write_into_missing_directory_is_a_persist_error() {
        let state = populated_state();
        let result = write_session_log(Path::new("/nonexistent/dir"), &state, &fixed_time());
        match result {
            Err(SessionError::Persist { path, .. }) => {
                assert!(path.starts_with("/nonexistent/dir"));
            }
            other => panic!("Expected Persist error, got {:?}", other),
        }
    }
}
