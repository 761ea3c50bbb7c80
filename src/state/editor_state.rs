/// Lifecycle of one editing session.
///
/// ```text
///  Uninitialized ──(source resolved)──► Loading ──(load settles)──► Ready ─┐
///        ▲   └────────(no source)───────────────────────────────►  ▲  └──┘
///        └───────────────(close / source changed)──────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditorPhase {
    #[default]
    Uninitialized,
    /// Waiting for the load stamped with `epoch`
    Loading { epoch: u64 },
    Ready,
}

impl EditorPhase {
    /// Validates whether a transition to the new phase is allowed
    pub fn can_transition_to(&self, next: &EditorPhase) -> bool {
        match (self, next) {
            (EditorPhase::Uninitialized, EditorPhase::Loading { .. }) => true,
            (EditorPhase::Uninitialized, EditorPhase::Ready) => true,

            (EditorPhase::Loading { .. }, EditorPhase::Ready) => true,
            (EditorPhase::Loading { .. }, EditorPhase::Uninitialized) => true,

            // toolbar actions
            (EditorPhase::Ready, EditorPhase::Ready) => true,
            (EditorPhase::Ready, EditorPhase::Uninitialized) => true,

            _ => false,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, EditorPhase::Loading { .. })
    }

    pub fn is_mounted(&self) -> bool {
        !matches!(self, EditorPhase::Uninitialized)
    }

    pub fn label(&self) -> &'static str {
        match self {
            EditorPhase::Uninitialized => "uninitialized",
            EditorPhase::Loading { .. } => "loading",
            EditorPhase::Ready => "ready",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_path() {
        let loading = EditorPhase::Loading { epoch: 3 };
        assert!(EditorPhase::Uninitialized.can_transition_to(&loading));
        assert!(loading.can_transition_to(&EditorPhase::Ready));
        assert!(EditorPhase::Ready.can_transition_to(&EditorPhase::Ready));
        assert!(EditorPhase::Ready.can_transition_to(&EditorPhase::Uninitialized));
    }

    #[test]
    fn test_reload_must_pass_through_uninitialized() {
        let loading = EditorPhase::Loading { epoch: 1 };
        assert!(!EditorPhase::Ready.can_transition_to(&loading));
        assert!(!loading.can_transition_to(&EditorPhase::Loading { epoch: 2 }));
        assert!(!EditorPhase::Uninitialized.can_transition_to(&EditorPhase::Uninitialized));
    }
}
