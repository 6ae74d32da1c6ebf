//! The fetch / edit / save workflow for one selected path.
//!
//! [`EditSession`] is a plain state machine with no I/O. Each load or save is
//! represented by a ticket; results are handed back together with their
//! ticket, and results whose ticket has been superseded are ignored. The
//! async wiring lives in [`crate::driver`].

use crate::error::{ConsoleError, Result};
use serde_json::Value;
use tracing::debug;

pub const SAVED_MESSAGE: &str = "Saved successfully";

/// Where the session is in its workflow.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Idle,
    Loading {
        path: String,
    },
    Ready {
        path: String,
        content: Value,
        buffer: String,
        message: Option<String>,
    },
    Saving {
        path: String,
        content: Value,
        buffer: String,
    },
    Error {
        path: String,
        message: String,
    },
}

/// Identifies one load started by [`EditSession::select_path`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
    path: String,
}

impl LoadTicket {
    pub fn path(&self) -> &str {
        &self.path
    }
}

/// Identifies one write started by [`EditSession::begin_save`].
#[derive(Debug, Clone, PartialEq)]
pub struct SaveTicket {
    generation: u64,
    save: u64,
    path: String,
    payload: Value,
}

impl SaveTicket {
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The parsed buffer to write.
    pub fn payload(&self) -> &Value {
        &self.payload
    }
}

/// State machine `Idle → Loading → Ready → Saving → Ready`, with `Error`
/// reached from a failed load.
///
/// # Example
///
/// ```rust
/// use confpath_restconf::{EditSession, SessionState};
/// use serde_json::json;
///
/// let mut session = EditSession::new();
/// let first = session.select_path("system");
/// let second = session.select_path("interfaces");
///
/// // The late answer for "system" is ignored.
/// assert!(session.complete_load(second, Ok(json!({"interface": []}))));
/// assert!(!session.complete_load(first, Ok(json!({"hostname": "r1"}))));
/// assert_eq!(session.current_path(), Some("interfaces"));
/// assert!(matches!(session.state(), SessionState::Ready { .. }));
/// ```
#[derive(Debug)]
pub struct EditSession {
    state: SessionState,
    generation: u64,
    saves: u64,
    /// The write in flight, if any. At most one at a time, across selections.
    pending_save: Option<u64>,
    /// Outcome of a write that finished while another path was loading.
    deferred_message: Option<String>,
}

impl Default for EditSession {
    fn default() -> Self {
        Self::new()
    }
}

impl EditSession {
    pub fn new() -> Self {
        Self {
            state: SessionState::Idle,
            generation: 0,
            saves: 0,
            pending_save: None,
            deferred_message: None,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_saving(&self) -> bool {
        self.pending_save.is_some()
    }

    /// The most recently selected path.
    pub fn current_path(&self) -> Option<&str> {
        match &self.state {
            SessionState::Idle => None,
            SessionState::Loading { path }
            | SessionState::Ready { path, .. }
            | SessionState::Saving { path, .. }
            | SessionState::Error { path, .. } => Some(path),
        }
    }

    pub fn buffer(&self) -> Option<&str> {
        match &self.state {
            SessionState::Ready { buffer, .. } | SessionState::Saving { buffer, .. } => {
                Some(buffer)
            }
            _ => None,
        }
    }

    /// The user-facing status line, if any.
    pub fn message(&self) -> Option<&str> {
        match &self.state {
            SessionState::Ready { message, .. } => message.as_deref(),
            SessionState::Error { message, .. } => Some(message),
            _ => None,
        }
    }

    /// Start loading `path`, superseding any load in flight.
    pub fn select_path<S: Into<String>>(&mut self, path: S) -> LoadTicket {
        let path = path.into();
        self.generation += 1;
        self.state = SessionState::Loading { path: path.clone() };
        LoadTicket {
            generation: self.generation,
            path,
        }
    }

    /// Whether `ticket` belongs to the load the session is waiting for.
    pub fn is_current(&self, ticket: &LoadTicket) -> bool {
        ticket.generation == self.generation
            && matches!(&self.state, SessionState::Loading { path } if *path == ticket.path)
    }

    /// Apply the outcome of a load.
    ///
    /// Returns false, leaving the session untouched, when the ticket has been
    /// superseded.
    pub fn complete_load(&mut self, ticket: LoadTicket, result: Result<Value>) -> bool {
        if !self.is_current(&ticket) {
            debug!(path = %ticket.path, "discarding response for superseded selection");
            return false;
        }

        let deferred = self.deferred_message.take();
        self.state = match result {
            Ok(content) => SessionState::Ready {
                buffer: pretty(&content),
                path: ticket.path,
                content,
                message: deferred,
            },
            Err(e) => SessionState::Error {
                path: ticket.path,
                message: match deferred {
                    Some(saved) => format!("Failed to load: {}; {}", e, saved),
                    None => format!("Failed to load: {}", e),
                },
            },
        };
        true
    }

    /// Fail the load the session is waiting for without a response, e.g.
    /// when the task fetching it died.
    pub fn fail_load(&mut self, reason: &str) -> bool {
        let SessionState::Loading { path } = &self.state else {
            return false;
        };
        self.state = SessionState::Error {
            path: path.clone(),
            message: format!("Failed to load: {}", reason),
        };
        true
    }

    /// Replace the edit buffer. Only allowed in `Ready`.
    pub fn set_buffer<S: Into<String>>(&mut self, text: S) -> Result<()> {
        match &mut self.state {
            SessionState::Ready { buffer, .. } => {
                *buffer = text.into();
                Ok(())
            }
            SessionState::Saving { .. } => Err(ConsoleError::SaveInProgress),
            _ => Err(ConsoleError::NotReady),
        }
    }

    /// Validate the buffer and move to `Saving`.
    ///
    /// On invalid JSON the session stays `Ready` with the buffer untouched and
    /// the parse error as its message. A save is rejected until the previous
    /// one has completed, even if another path has been selected since.
    pub fn begin_save(&mut self) -> Result<SaveTicket> {
        if self.pending_save.is_some() {
            return Err(ConsoleError::SaveInProgress);
        }
        let payload = match &mut self.state {
            SessionState::Saving { .. } => return Err(ConsoleError::SaveInProgress),
            SessionState::Ready {
                buffer, message, ..
            } => match serde_json::from_str::<Value>(buffer) {
                Ok(payload) => payload,
                Err(e) => {
                    *message = Some(format!("Invalid JSON: {}", e));
                    return Err(ConsoleError::Parse(e));
                }
            },
            _ => return Err(ConsoleError::NotReady),
        };

        match std::mem::replace(&mut self.state, SessionState::Idle) {
            SessionState::Ready {
                path,
                content,
                buffer,
                ..
            } => {
                self.saves += 1;
                self.pending_save = Some(self.saves);
                let ticket = SaveTicket {
                    generation: self.generation,
                    save: self.saves,
                    path: path.clone(),
                    payload,
                };
                self.state = SessionState::Saving {
                    path,
                    content,
                    buffer,
                };
                Ok(ticket)
            }
            other => {
                self.state = other;
                Err(ConsoleError::NotReady)
            }
        }
    }

    /// Apply the outcome of a write and return to `Ready`.
    ///
    /// The buffer is kept as it was either way. When another path has been
    /// selected since the save began, the outcome becomes the message of that
    /// selection instead. Returns false for a ticket that is not the write in
    /// flight.
    pub fn complete_save(&mut self, ticket: SaveTicket, result: &Result<()>) -> bool {
        if self.pending_save != Some(ticket.save) {
            debug!(path = %ticket.path, "discarding result for a save that is not in flight");
            return false;
        }
        self.pending_save = None;

        if ticket.generation != self.generation {
            let outcome = match result {
                Ok(()) => format!("Saved {}", ticket.path),
                Err(e) => format!("Save of {} failed: {}", ticket.path, e),
            };
            debug!(path = %ticket.path, "save finished after reselection: {}", outcome);
            match &mut self.state {
                SessionState::Ready { message, .. } => *message = Some(outcome),
                SessionState::Error { message, .. } => {
                    message.push_str("; ");
                    message.push_str(&outcome);
                }
                _ => self.deferred_message = Some(outcome),
            }
            return true;
        }

        match std::mem::replace(&mut self.state, SessionState::Idle) {
            SessionState::Saving {
                path,
                content,
                buffer,
            } if path == ticket.path => {
                self.state = match result {
                    Ok(()) => SessionState::Ready {
                        path,
                        content: ticket.payload,
                        buffer,
                        message: Some(SAVED_MESSAGE.to_string()),
                    },
                    Err(e) => SessionState::Ready {
                        path,
                        content,
                        buffer,
                        message: Some(format!("Save failed: {}", e)),
                    },
                };
                true
            }
            other => {
                self.state = other;
                false
            }
        }
    }
}

/// Two-space indented JSON, the canonical buffer form.
pub fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}
