//! The public facade: [`Parser`].

use std::fmt;

use schematica_ast::{Expression, TypeRegistry};
use schematica_common::Token;

use crate::error::ReaderError;
use crate::psm::ParserStateMachine;
use crate::state::{self, ExprState};

/// Drives the pushdown state machine one token at a time.
///
/// A `Parser` owns its state stack and environment stack outright (spec
/// section 5: no shared resources, two instances never need to coordinate).
/// Feed it tokens with [`Parser::include_token`]; a top-level expression
/// comes back out as soon as its terminator arrives.
pub struct Parser {
    psm: ParserStateMachine,
}

impl Parser {
    /// A parser with no translation unit started yet. `include_token` will
    /// return [`ReaderError::EmptyStack`] until [`Parser::begin_translation_unit`]
    /// is called.
    pub fn new(registry: TypeRegistry) -> Self {
        Self {
            psm: ParserStateMachine::new(registry),
        }
    }

    /// A parser pre-loaded with the built-in type registry (`f64, f32, i64,
    /// i32, i16`) and an open translation unit, ready for tokens.
    pub fn with_builtins() -> Self {
        let mut parser = Self::new(TypeRegistry::with_builtins());
        parser.begin_translation_unit();
        parser
    }

    /// Push the initial `TopLevelSeq` state. Between tokens the stack is
    /// either empty or bottomed out on this state; this is the only way to
    /// establish that bottom.
    pub fn begin_translation_unit(&mut self) {
        self.psm.push(ExprState::TopLevelSeq);
    }

    /// Feed one token to the machine. Returns `Some(expr)` exactly when a
    /// top-level expression completed on this token.
    pub fn include_token(&mut self, tk: &Token) -> Result<Option<Expression>, ReaderError> {
        state::on_input(&mut self.psm, tk)?;
        Ok(self.psm.take_output())
    }

    /// True iff some sub-state is active above the top-level sequence --
    /// i.e. the last token fed left a construct unfinished.
    pub fn has_incomplete_expr(&self) -> bool {
        self.psm.stack.depth() > 1
    }

    /// Diagnostic: current stack depth (1 means only `TopLevelSeq` remains).
    pub fn stack_depth(&self) -> usize {
        self.psm.stack.depth()
    }

    /// Dump the stack, top first, for diagnostics. Does not mutate state.
    pub fn print(&self, out: &mut impl fmt::Write) -> fmt::Result {
        for (idx, state) in self.psm.stack.iter_from_top().enumerate() {
            writeln!(out, "#{idx}: {}", state.name())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use schematica_common::{Span, TokenKind};

    fn tok(kind: TokenKind, span: (u32, u32)) -> Token {
        Token::bare(kind, Span::new(span.0, span.1))
    }

    fn symbol(text: &str, span: (u32, u32)) -> Token {
        Token::with_text(TokenKind::Symbol, text, Span::new(span.0, span.1))
    }

    fn f64_lit(value: f64, span: (u32, u32)) -> Token {
        Token::f64_literal(value, Span::new(span.0, span.1))
    }

    #[test]
    fn bare_literal_completes_on_semicolon() {
        let mut p = Parser::with_builtins();
        assert_eq!(p.include_token(&f64_lit(3.14, (0, 4))).unwrap(), None);
        let out = p.include_token(&tok(TokenKind::Semicolon, (4, 5))).unwrap();
        assert!(out.is_some());
        assert_eq!(p.stack_depth(), 1);
    }

    #[test]
    fn include_token_before_begin_translation_unit_is_empty_stack() {
        let mut p = Parser::new(TypeRegistry::with_builtins());
        let err = p.include_token(&tok(TokenKind::Semicolon, (0, 1))).unwrap_err();
        assert!(matches!(err, ReaderError::EmptyStack { .. }));
    }

    #[test]
    fn unexpected_colon_at_top_level_is_reported() {
        let mut p = Parser::with_builtins();
        let err = p.include_token(&tok(TokenKind::Colon, (0, 1))).unwrap_err();
        match err {
            ReaderError::UnexpectedToken { state, kind, .. } => {
                assert_eq!(kind, TokenKind::Colon);
                assert_eq!(state, "TopLevelSeq");
            }
            other => panic!("expected UnexpectedToken, got {other:?}"),
        }
    }

    #[test]
    fn has_incomplete_expr_tracks_mid_definition_state() {
        let mut p = Parser::with_builtins();
        assert!(!p.has_incomplete_expr());
        p.include_token(&tok(TokenKind::Def, (0, 3))).unwrap();
        assert!(p.has_incomplete_expr());
        p.include_token(&symbol("pi", (4, 6))).unwrap();
        assert!(p.has_incomplete_expr());
    }

    #[test]
    fn print_does_not_mutate_state() {
        let mut p = Parser::with_builtins();
        p.include_token(&tok(TokenKind::Def, (0, 3))).unwrap();
        let depth_before = p.stack_depth();
        let mut buf = String::new();
        p.print(&mut buf).unwrap();
        p.print(&mut buf).unwrap();
        assert_eq!(p.stack_depth(), depth_before);
        assert!(buf.contains("Define"));
    }
}
