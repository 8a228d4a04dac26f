//! MIDI learn assignment workflow
//!
//! State machine for binding camera functions and custom buttons to
//! controls. At most one session is in flight; the next decoded MIDI event
//! is consumed exclusively by the session instead of being routed. Timers
//! live outside this type: the manager schedules the timeout and calls back
//! with the session token, so a stale timer can never cancel a newer
//! session.

use camdeck_core::{CameraFunction, ControlKey};
use std::time::Duration;

use crate::events::LearnTarget;

/// Wall-clock window a session waits for input before auto-cancelling.
pub const LEARN_TIMEOUT: Duration = Duration::from_secs(10);

/// An in-flight learn session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LearnSession {
    /// What will be bound when input arrives
    pub target: LearnTarget,
    /// Monotonic token identifying this session
    pub token: u64,
}

/// What a captured MIDI event resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// Simple mode: bind `key` to `function` in the store now.
    Commit {
        /// Function the session was started for
        function: CameraFunction,
        /// Captured control identity
        key: ControlKey,
    },
    /// Custom mode: `key` is parked on the button edit until saved.
    Park {
        /// Button edit the capture belongs to
        target: LearnTarget,
        /// Captured control identity
        key: ControlKey,
    },
}

/// A controller captured for a specific button edit, waiting for that
/// edit's save.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ParkedCapture {
    button_id: Option<String>,
    key: ControlKey,
}

/// Single-session learn state.
#[derive(Debug, Default)]
pub struct AssignmentWorkflow {
    session: Option<LearnSession>,
    next_token: u64,
    pending_capture: Option<ParkedCapture>,
}

impl AssignmentWorkflow {
    /// Create an idle workflow.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a session for `target`. Returns the new session's token and the
    /// superseded session, if one was pending.
    pub fn begin(&mut self, target: LearnTarget) -> (u64, Option<LearnSession>) {
        let superseded = self.session.take();
        // Starting a new session abandons a capture an earlier edit never saved.
        self.pending_capture = None;
        self.next_token += 1;
        let token = self.next_token;
        self.session = Some(LearnSession { target, token });
        (token, superseded)
    }

    /// Cancel the pending session unconditionally. Also discards a parked
    /// capture, since the operator is abandoning the edit.
    pub fn cancel(&mut self) -> Option<LearnSession> {
        self.pending_capture = None;
        self.session.take()
    }

    /// Cancel only if `token` still identifies the pending session. Stale
    /// timeout timers call this and find nothing to do.
    pub fn cancel_if_token(&mut self, token: u64) -> Option<LearnSession> {
        if self.session.as_ref().map(|s| s.token) == Some(token) {
            self.session.take()
        } else {
            None
        }
    }

    /// Offer a decoded control to the workflow. Consumes the session and
    /// returns the outcome when one is pending; `None` means the event
    /// should be routed normally.
    pub fn capture(&mut self, key: ControlKey) -> Option<CaptureOutcome> {
        let session = self.session.take()?;
        match session.target {
            LearnTarget::Function { function } => Some(CaptureOutcome::Commit { function, key }),
            LearnTarget::Button { button_id } => {
                self.pending_capture = Some(ParkedCapture {
                    button_id: button_id.clone(),
                    key,
                });
                Some(CaptureOutcome::Park {
                    target: LearnTarget::Button { button_id },
                    key,
                })
            }
        }
    }

    /// Take the control parked by a custom-mode capture, but only when it
    /// belongs to the button edit identified by `button_id` (`None` for a
    /// new, unsaved button). A save of any other button leaves it alone.
    pub fn take_pending_capture(&mut self, button_id: Option<&str>) -> Option<ControlKey> {
        match &self.pending_capture {
            Some(parked) if parked.button_id.as_deref() == button_id => {
                self.pending_capture.take().map(|parked| parked.key)
            }
            _ => None,
        }
    }

    /// Target of the pending session, if any.
    pub fn active_target(&self) -> Option<&LearnTarget> {
        self.session.as_ref().map(|s| &s.target)
    }

    /// Whether a session is waiting for input.
    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn function_target(function: CameraFunction) -> LearnTarget {
        LearnTarget::Function { function }
    }

    #[test]
    fn test_simple_capture_commits() {
        let mut workflow = AssignmentWorkflow::new();
        let (_, superseded) = workflow.begin(function_target(CameraFunction::RecordStart));
        assert!(superseded.is_none());

        let key = ControlKey::new(0x90, 36);
        let outcome = workflow.capture(key).unwrap();
        assert_eq!(
            outcome,
            CaptureOutcome::Commit {
                function: CameraFunction::RecordStart,
                key,
            }
        );
        assert!(!workflow.is_active());
        // Session is consumed; the next event routes normally.
        assert!(workflow.capture(key).is_none());
    }

    #[test]
    fn test_custom_capture_parks_key() {
        let mut workflow = AssignmentWorkflow::new();
        workflow.begin(LearnTarget::Button { button_id: None });

        let key = ControlKey::new(0xB0, 20);
        let outcome = workflow.capture(key).unwrap();
        assert!(matches!(outcome, CaptureOutcome::Park { .. }));
        assert_eq!(workflow.take_pending_capture(None), Some(key));
        assert_eq!(workflow.take_pending_capture(None), None);
    }

    #[test]
    fn test_parked_capture_scoped_to_its_edit() {
        let mut workflow = AssignmentWorkflow::new();
        workflow.begin(LearnTarget::Button {
            button_id: Some("custom-a".into()),
        });
        let key = ControlKey::new(0xB0, 22);
        workflow.capture(key).unwrap();

        // Saving a new button or a different button must not consume it.
        assert_eq!(workflow.take_pending_capture(None), None);
        assert_eq!(workflow.take_pending_capture(Some("custom-b")), None);
        // The edit it was captured for still gets it.
        assert_eq!(workflow.take_pending_capture(Some("custom-a")), Some(key));
        assert_eq!(workflow.take_pending_capture(Some("custom-a")), None);
    }

    #[test]
    fn test_new_session_abandons_parked_capture() {
        let mut workflow = AssignmentWorkflow::new();
        workflow.begin(LearnTarget::Button { button_id: None });
        workflow.capture(ControlKey::new(0xB0, 22)).unwrap();

        workflow.begin(LearnTarget::Button {
            button_id: Some("custom-b".into()),
        });
        assert_eq!(workflow.take_pending_capture(None), None);
    }

    #[test]
    fn test_cancel_abandons_parked_capture() {
        let mut workflow = AssignmentWorkflow::new();
        workflow.begin(LearnTarget::Button { button_id: None });
        workflow.capture(ControlKey::new(0xB0, 22)).unwrap();

        workflow.cancel();
        assert_eq!(workflow.take_pending_capture(None), None);
    }

    #[test]
    fn test_begin_supersedes_previous_session() {
        let mut workflow = AssignmentWorkflow::new();
        let (first, _) = workflow.begin(function_target(CameraFunction::Gain));
        let (second, superseded) = workflow.begin(function_target(CameraFunction::Tint));

        assert!(second > first);
        assert_eq!(
            superseded.unwrap().target,
            function_target(CameraFunction::Gain)
        );

        // The capture binds the newer target.
        let outcome = workflow.capture(ControlKey::new(0xB0, 7)).unwrap();
        assert!(matches!(
            outcome,
            CaptureOutcome::Commit {
                function: CameraFunction::Tint,
                ..
            }
        ));
    }

    #[test]
    fn test_stale_token_does_not_cancel() {
        let mut workflow = AssignmentWorkflow::new();
        let (stale, _) = workflow.begin(function_target(CameraFunction::Focus));
        let (current, _) = workflow.begin(function_target(CameraFunction::Iris));

        assert!(workflow.cancel_if_token(stale).is_none());
        assert!(workflow.is_active());

        let cancelled = workflow.cancel_if_token(current).unwrap();
        assert_eq!(cancelled.target, function_target(CameraFunction::Iris));
        assert!(!workflow.is_active());
    }

    #[test]
    fn test_explicit_cancel() {
        let mut workflow = AssignmentWorkflow::new();
        workflow.begin(function_target(CameraFunction::Shutter));
        assert!(workflow.cancel().is_some());
        assert!(workflow.cancel().is_none());
    }
}
