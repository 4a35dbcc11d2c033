use thiserror::Error;

/// Probe-wide error model. Every failure of the connectivity probe is one of
/// these kinds; remediation text is selected from the kind, not from the
/// message wording.
#[derive(Debug, Error)]
pub enum EnvError {
    /// Probe configuration or rendezvous construction failed before any
    /// connection was attempted.
    #[error("setup failed: {0}")]
    Setup(String),

    /// The editor never attached within the wait window.
    #[error("timed out after {0} seconds waiting for the Unity editor to attach")]
    Timeout(u64),

    /// The rendezvous port could not be claimed.
    #[error("port {port} unavailable: {reason}")]
    Address { port: u16, reason: String },

    /// The editor speaks an incompatible communicator version.
    #[error("communicator version mismatch: editor speaks {editor}, probe speaks {probe}")]
    Incompatible { editor: String, probe: String },

    /// The editor session broke mid-conversation.
    #[error("rpc failure: {0}")]
    Rpc(String),

    /// Anything else, including errors surfaced from foreign code whose only
    /// structure is the message text.
    #[error("{0}")]
    Other(String),
}

/// Remediation category for a failed probe run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Setup,
    Timeout,
    Address,
    Unknown,
}

impl EnvError {
    pub fn kind(&self) -> FailureKind {
        match self {
            EnvError::Setup(_) => FailureKind::Setup,
            EnvError::Timeout(_) => FailureKind::Timeout,
            EnvError::Address { .. } => FailureKind::Address,
            EnvError::Incompatible { .. } => FailureKind::Unknown,
            // Foreign error text carries no structure; fall back to keyword
            // matching. Known limitation: wording changes upstream break it.
            EnvError::Rpc(msg) | EnvError::Other(msg) => classify_message(msg),
        }
    }
}

/// Last-resort classifier for error text from code that does not expose a
/// structured kind.
pub fn classify_message(message: &str) -> FailureKind {
    let lower = message.to_lowercase();
    if lower.contains("timeout") || lower.contains("took too long") {
        FailureKind::Timeout
    } else if lower.contains("port") || lower.contains("address") {
        FailureKind::Address
    } else {
        FailureKind::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structured_kinds_win_over_message_text() {
        // A timeout stays a timeout even though its message mentions no keyword,
        // and an Address error is never reclassified by its reason text.
        assert_eq!(EnvError::Timeout(60).kind(), FailureKind::Timeout);
        let addr = EnvError::Address {
            port: 5004,
            reason: "already bound".into(),
        };
        assert_eq!(addr.kind(), FailureKind::Address);
        assert_eq!(EnvError::Setup("bad config".into()).kind(), FailureKind::Setup);
    }

    #[test]
    fn foreign_timeout_text_classifies_as_timeout() {
        let e = EnvError::Other("the editor took too long to respond".into());
        assert_eq!(e.kind(), FailureKind::Timeout);
        let e = EnvError::Rpc("Timeout while awaiting handshake".into());
        assert_eq!(e.kind(), FailureKind::Timeout);
    }

    #[test]
    fn foreign_address_text_classifies_as_address() {
        let e = EnvError::Other("Address already in use (os error 98)".into());
        assert_eq!(e.kind(), FailureKind::Address);
        let e = EnvError::Other("port 5004 is blocked".into());
        assert_eq!(e.kind(), FailureKind::Address);
    }

    #[test]
    fn unmatched_text_is_unknown() {
        let e = EnvError::Other("editor went away".into());
        assert_eq!(e.kind(), FailureKind::Unknown);
    }

    #[test]
    fn incompatible_reports_both_versions() {
        let e = EnvError::Incompatible {
            editor: "0.9.0".into(),
            probe: "1.5.0".into(),
        };
        assert!(e.to_string().contains("0.9.0"));
        assert!(e.to_string().contains("1.5.0"));
    }
}
