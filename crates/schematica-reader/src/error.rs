//! Error type for the incremental reader.

use std::fmt;

use schematica_common::{Span, TokenKind};

/// Everything that can go wrong while feeding tokens to a [`crate::Parser`].
///
/// Every variant is fatal to the translation unit: the reader has no local
/// recovery. A caller that gets one of these back should discard the
/// `Parser` rather than keep feeding it tokens.
#[derive(Debug, Clone, PartialEq)]
pub enum ReaderError {
    /// A token arrived that the state on top of the stack does not accept.
    UnexpectedToken {
        /// Name of the rejecting state, e.g. `"Define(D1)"`.
        state: &'static str,
        kind: TokenKind,
        span: Span,
    },
    /// A `:` ascription or formal parameter named a type the registry has no
    /// entry for.
    UnknownType { name: String, span: Span },
    /// A token arrived with nothing on the stack to receive it. Only
    /// possible before `begin_translation_unit` or after a prior fatal error
    /// left the stack empty.
    EmptyStack { kind: TokenKind, span: Span },
}

impl fmt::Display for ReaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReaderError::UnexpectedToken { state, kind, span } => write!(
                f,
                "unexpected {kind:?} at {}..{} for state {state}",
                span.start, span.end
            ),
            ReaderError::UnknownType { name, span } => write!(
                f,
                "unknown type name {name:?} at {}..{}",
                span.start, span.end
            ),
            ReaderError::EmptyStack { kind, span } => write!(
                f,
                "{kind:?} at {}..{} arrived with an empty state stack",
                span.start, span.end
            ),
        }
    }
}

impl std::error::Error for ReaderError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unexpected_token_message_names_kind_and_state() {
        let err = ReaderError::UnexpectedToken {
            state: "TopLevelSeq",
            kind: TokenKind::Colon,
            span: Span::new(0, 1),
        };
        let msg = err.to_string();
        assert!(msg.contains("Colon"));
        assert!(msg.contains("TopLevelSeq"));
    }

    #[test]
    fn unknown_type_message_names_the_type() {
        let err = ReaderError::UnknownType {
            name: "bogus".to_string(),
            span: Span::new(3, 8),
        };
        assert!(err.to_string().contains("bogus"));
    }
}
