//! Grammar states and the token/event dispatch that drives them.
//!
//! This is a tagged-variant replacement for the virtual `exprstate` class
//! hierarchy the reader was originally built on: one `on_input` match
//! instead of a vtable, one `ExprState` enum instead of a family of
//! subclasses. Dispatch within a variant is still split into its own
//! function per variant so "what does this state accept" stays answerable
//! without reading the whole match.

use schematica_ast::{Constant, ConvertExpr, DefineExpr, Expression, Lambda as LambdaExpr, TypeDescr, Variable};
use schematica_common::{Token, TokenKind};

use crate::env::EnvFrame;
use crate::error::ReaderError;
use crate::psm::ParserStateMachine;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefinePhase {
    /// awaiting the bound name
    D0,
    /// name bound, awaiting `:` or `=`
    D1,
    /// awaiting the ascribed type name
    D2,
    /// type bound, awaiting `=`
    D3,
    /// awaiting the rhs expression
    D4,
    /// rhs bound, awaiting `;`
    D5,
}

#[derive(Debug)]
pub struct DefineState {
    pub phase: DefinePhase,
    pub lhs_name: Option<String>,
    pub cvt_dest: Option<TypeDescr>,
    pub rhs: Option<Expression>,
}

impl DefineState {
    fn new() -> Self {
        Self {
            phase: DefinePhase::D0,
            lhs_name: None,
            cvt_dest: None,
            rhs: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParenPhase {
    /// awaiting the inner expression
    P0,
    /// inner bound, awaiting `)`
    P1,
}

#[derive(Debug)]
pub struct ParenState {
    pub phase: ParenPhase,
    pub inner: Option<Expression>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LambdaPhase {
    /// just entered, awaiting `(`
    L0,
    /// awaiting the closed formal arglist
    L1,
    /// arglist bound, awaiting the body expression
    L2,
    /// body bound, awaiting `;`
    L3,
}

#[derive(Debug)]
pub struct LambdaState {
    pub phase: LambdaPhase,
    pub args: Vec<Variable>,
    pub body: Option<Expression>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgListPhase {
    /// awaiting `(`
    Open,
    /// inside the list, awaiting a formal, `,`, or `)`
    Item,
}

#[derive(Debug)]
pub struct FormalArgListState {
    pub phase: ArgListPhase,
    pub args: Vec<Variable>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormalPhase {
    /// awaiting the formal's name
    F0,
    /// name bound, awaiting `:`
    F1,
    /// awaiting the formal's type name
    F2,
}

#[derive(Debug)]
pub struct FormalState {
    pub phase: FormalPhase,
    pub name: Option<String>,
}

/// One frame of the pushdown stack: a single grammar construct's sub-parser,
/// mid-recognition.
#[derive(Debug)]
pub enum ExprState {
    /// The translation unit. Bottom of every non-empty stack.
    TopLevelSeq,
    Define(DefineState),
    Paren(ParenState),
    Lambda(LambdaState),
    FormalArgList(FormalArgListState),
    Formal(FormalState),
    /// Transparent: routes `Lambda`/`LParen`/literal/`Symbol` tokens into a
    /// freshly-started sub-state, and gates any expression it ends up
    /// holding behind an [`ExprState::ExprProgress`] (see that variant).
    ExpectExpr,
    /// One-shot: the next `Symbol` token is delivered to the state below as
    /// a name, then this frame is gone.
    ExpectSymbol,
    /// One-shot: the next `Symbol` token is resolved against the type
    /// registry and delivered to the state below as a `TypeDescr`.
    ExpectType,
    /// A just-completed expression waiting for its terminator (`;` or `)`)
    /// before it is allowed to bubble further up the stack.
    ExprProgress(Expression),
}

impl ExprState {
    /// Name used in diagnostics; not load-bearing for parsing itself.
    pub fn name(&self) -> &'static str {
        match self {
            ExprState::TopLevelSeq => "TopLevelSeq",
            ExprState::Define(st) => match st.phase {
                DefinePhase::D0 => "Define(D0)",
                DefinePhase::D1 => "Define(D1)",
                DefinePhase::D2 => "Define(D2)",
                DefinePhase::D3 => "Define(D3)",
                DefinePhase::D4 => "Define(D4)",
                DefinePhase::D5 => "Define(D5)",
            },
            ExprState::Paren(st) => match st.phase {
                ParenPhase::P0 => "Paren(P0)",
                ParenPhase::P1 => "Paren(P1)",
            },
            ExprState::Lambda(st) => match st.phase {
                LambdaPhase::L0 => "Lambda(L0)",
                LambdaPhase::L1 => "Lambda(L1)",
                LambdaPhase::L2 => "Lambda(L2)",
                LambdaPhase::L3 => "Lambda(L3)",
            },
            ExprState::FormalArgList(st) => match st.phase {
                ArgListPhase::Open => "FormalArgList(Open)",
                ArgListPhase::Item => "FormalArgList(Item)",
            },
            ExprState::Formal(st) => match st.phase {
                FormalPhase::F0 => "Formal(F0)",
                FormalPhase::F1 => "Formal(F1)",
                FormalPhase::F2 => "Formal(F2)",
            },
            ExprState::ExpectExpr => "ExpectExpr",
            ExprState::ExpectSymbol => "ExpectSymbol",
            ExprState::ExpectType => "ExpectType",
            ExprState::ExprProgress(_) => "ExprProgress",
        }
    }
}

fn unexpected(psm: &ParserStateMachine, tk: &Token) -> ReaderError {
    let state = psm.top().map(ExprState::name).unwrap_or("<empty>");
    ReaderError::UnexpectedToken {
        state,
        kind: tk.kind,
        span: tk.span,
    }
}

/// Entry point: route `tk` to whatever is on top of the stack.
pub fn on_input(psm: &mut ParserStateMachine, tk: &Token) -> Result<(), ReaderError> {
    let Some(top) = psm.top() else {
        return Err(ReaderError::EmptyStack {
            kind: tk.kind,
            span: tk.span,
        });
    };

    match top {
        ExprState::TopLevelSeq => on_input_toplevel(psm, tk),
        ExprState::Define(_) => on_input_define(psm, tk),
        ExprState::Paren(_) => on_input_paren(psm, tk),
        ExprState::Lambda(_) => on_input_lambda(psm, tk),
        ExprState::FormalArgList(_) => on_input_arglist(psm, tk),
        ExprState::Formal(_) => on_input_formal(psm, tk),
        ExprState::ExpectExpr => on_input_expect_expr(psm, tk),
        ExprState::ExpectSymbol => on_input_expect_symbol(psm, tk),
        ExprState::ExpectType => on_input_expect_type(psm, tk),
        ExprState::ExprProgress(_) => on_input_progress(psm, tk),
    }
}

fn on_input_toplevel(psm: &mut ParserStateMachine, tk: &Token) -> Result<(), ReaderError> {
    match tk.kind {
        TokenKind::Def => {
            psm.push(ExprState::Define(DefineState::new()));
            psm.push(ExprState::ExpectSymbol);
            Ok(())
        }
        TokenKind::Lambda | TokenKind::LParen | TokenKind::Symbol | TokenKind::F64 | TokenKind::I64 => {
            psm.push(ExprState::ExpectExpr);
            on_input(psm, tk)
        }
        TokenKind::Semicolon => Ok(()),
        _ => Err(unexpected(psm, tk)),
    }
}

fn on_input_define(psm: &mut ParserStateMachine, tk: &Token) -> Result<(), ReaderError> {
    let phase = match psm.top() {
        Some(ExprState::Define(st)) => st.phase,
        _ => unreachable!("dispatched to on_input_define with a non-Define top"),
    };

    match (phase, tk.kind) {
        (DefinePhase::D1, TokenKind::Colon) => {
            set_define_phase(psm, DefinePhase::D2);
            psm.push(ExprState::ExpectType);
            Ok(())
        }
        (DefinePhase::D1, TokenKind::SingleAssign) | (DefinePhase::D3, TokenKind::SingleAssign) => {
            set_define_phase(psm, DefinePhase::D4);
            psm.push(ExprState::ExpectExpr);
            Ok(())
        }
        (DefinePhase::D5, TokenKind::Semicolon) => {
            let Some(ExprState::Define(st)) = psm.pop() else {
                unreachable!()
            };
            let define_expr = DefineExpr::new(
                st.lhs_name.expect("D5 implies lhs_name is bound"),
                st.rhs.expect("D5 implies rhs is bound"),
            );
            // Define's own `;` terminates the construct outright; unlike
            // ExprProgress and Lambda's L3, there is nothing left to
            // re-deliver it to.
            deliver_expr(psm, define_expr)
        }
        _ => Err(unexpected(psm, tk)),
    }
}

fn set_define_phase(psm: &mut ParserStateMachine, phase: DefinePhase) {
    if let Some(ExprState::Define(st)) = psm.top_mut() {
        st.phase = phase;
    }
}

fn on_input_paren(psm: &mut ParserStateMachine, tk: &Token) -> Result<(), ReaderError> {
    let phase = match psm.top() {
        Some(ExprState::Paren(st)) => st.phase,
        _ => unreachable!("dispatched to on_input_paren with a non-Paren top"),
    };

    match (phase, tk.kind) {
        (ParenPhase::P1, TokenKind::RParen) => {
            let Some(ExprState::Paren(st)) = psm.pop() else {
                unreachable!()
            };
            deliver_expr(psm, st.inner.expect("P1 implies inner is bound"))
        }
        _ => Err(unexpected(psm, tk)),
    }
}

fn on_input_lambda(psm: &mut ParserStateMachine, tk: &Token) -> Result<(), ReaderError> {
    let phase = match psm.top() {
        Some(ExprState::Lambda(st)) => st.phase,
        _ => unreachable!("dispatched to on_input_lambda with a non-Lambda top"),
    };

    match (phase, tk.kind) {
        (LambdaPhase::L0, TokenKind::Lambda) => {
            if let Some(ExprState::Lambda(st)) = psm.top_mut() {
                st.phase = LambdaPhase::L1;
            }
            psm.push(ExprState::FormalArgList(FormalArgListState {
                phase: ArgListPhase::Open,
                args: Vec::new(),
            }));
            Ok(())
        }
        (LambdaPhase::L3, TokenKind::Semicolon) => {
            let Some(ExprState::Lambda(st)) = psm.pop() else {
                unreachable!()
            };
            psm.pop_env();
            let lambda_expr = LambdaExpr::new(
                "<anonymous>",
                st.args,
                st.body.expect("L3 implies body is bound"),
            );
            deliver_expr(psm, lambda_expr)?;
            // The `;` that closed this lambda's body was consumed to get
            // here, but whatever it bubbled into (typically a `Define` at
            // D4->D5) still needs to see it.
            on_input(psm, tk)
        }
        _ => Err(unexpected(psm, tk)),
    }
}

fn on_input_arglist(psm: &mut ParserStateMachine, tk: &Token) -> Result<(), ReaderError> {
    let phase = match psm.top() {
        Some(ExprState::FormalArgList(st)) => st.phase,
        _ => unreachable!("dispatched to on_input_arglist with a non-FormalArgList top"),
    };

    match (phase, tk.kind) {
        (ArgListPhase::Open, TokenKind::LParen) => {
            if let Some(ExprState::FormalArgList(st)) = psm.top_mut() {
                st.phase = ArgListPhase::Item;
            }
            start_formal(psm);
            Ok(())
        }
        (ArgListPhase::Item, TokenKind::Comma) => {
            start_formal(psm);
            Ok(())
        }
        (ArgListPhase::Item, TokenKind::RParen) => {
            let Some(ExprState::FormalArgList(st)) = psm.pop() else {
                unreachable!()
            };
            deliver_formal_arglist(psm, st.args)
        }
        _ => Err(unexpected(psm, tk)),
    }
}

fn start_formal(psm: &mut ParserStateMachine) {
    psm.push(ExprState::Formal(FormalState {
        phase: FormalPhase::F0,
        name: None,
    }));
    psm.push(ExprState::ExpectSymbol);
}

fn on_input_formal(psm: &mut ParserStateMachine, tk: &Token) -> Result<(), ReaderError> {
    let phase = match psm.top() {
        Some(ExprState::Formal(st)) => st.phase,
        _ => unreachable!("dispatched to on_input_formal with a non-Formal top"),
    };

    match (phase, tk.kind) {
        (FormalPhase::F1, TokenKind::Colon) => {
            if let Some(ExprState::Formal(st)) = psm.top_mut() {
                st.phase = FormalPhase::F2;
            }
            psm.push(ExprState::ExpectType);
            Ok(())
        }
        _ => Err(unexpected(psm, tk)),
    }
}

fn on_input_expect_expr(psm: &mut ParserStateMachine, tk: &Token) -> Result<(), ReaderError> {
    match tk.kind {
        TokenKind::Lambda => {
            psm.push(ExprState::Lambda(LambdaState {
                phase: LambdaPhase::L0,
                args: Vec::new(),
                body: None,
            }));
            on_input(psm, tk)
        }
        TokenKind::LParen => {
            psm.push(ExprState::Paren(ParenState {
                phase: ParenPhase::P0,
                inner: None,
            }));
            psm.push(ExprState::ExpectExpr);
            Ok(())
        }
        TokenKind::Symbol => {
            let var = match psm.lookup_var(&tk.text) {
                Some(v) => v.clone(),
                None => Variable::unresolved(tk.text.clone()),
            };
            replace_expect_expr_with_progress(psm, var.into_expression())
        }
        TokenKind::F64 => {
            let ty = psm.registry.resolve("f64");
            let expr = match ty {
                Some(ty) => Constant::f64(ty, tk.f64_value),
                None => return Err(ReaderError::UnknownType {
                    name: "f64".to_string(),
                    span: tk.span,
                }),
            };
            replace_expect_expr_with_progress(psm, expr)
        }
        TokenKind::I64 => {
            let ty = psm.registry.resolve("i64");
            let expr = match ty {
                Some(ty) => Constant::i64(ty, tk.i64_value),
                None => return Err(ReaderError::UnknownType {
                    name: "i64".to_string(),
                    span: tk.span,
                }),
            };
            replace_expect_expr_with_progress(psm, expr)
        }
        _ => Err(unexpected(psm, tk)),
    }
}

fn replace_expect_expr_with_progress(psm: &mut ParserStateMachine, expr: Expression) -> Result<(), ReaderError> {
    psm.pop();
    psm.push(ExprState::ExprProgress(expr));
    Ok(())
}

fn on_input_expect_symbol(psm: &mut ParserStateMachine, tk: &Token) -> Result<(), ReaderError> {
    match tk.kind {
        TokenKind::Symbol => {
            psm.pop();
            deliver_symbol(psm, tk.text.clone())
        }
        _ => Err(unexpected(psm, tk)),
    }
}

fn on_input_expect_type(psm: &mut ParserStateMachine, tk: &Token) -> Result<(), ReaderError> {
    match tk.kind {
        TokenKind::Symbol => {
            let Some(td) = psm.registry.resolve(&tk.text) else {
                return Err(ReaderError::UnknownType {
                    name: tk.text.clone(),
                    span: tk.span,
                });
            };
            psm.pop();
            deliver_typedescr(psm, td)
        }
        _ => Err(unexpected(psm, tk)),
    }
}

fn on_input_progress(psm: &mut ParserStateMachine, tk: &Token) -> Result<(), ReaderError> {
    match tk.kind {
        TokenKind::Semicolon | TokenKind::RParen => {
            let Some(ExprState::ExprProgress(expr)) = psm.pop() else {
                unreachable!()
            };
            deliver_expr(psm, expr)?;
            // Re-deliver the terminator: whatever is now on top (possibly
            // several frames up from where `ExprProgress` sat) still needs
            // to see it, e.g. a `Paren` waiting for its own `)`, or a
            // `Define` waiting for its own `;`.
            on_input(psm, tk)
        }
        _ => Err(unexpected(psm, tk)),
    }
}

/// Deliver a completed expression to whatever is on top of the stack.
///
/// This is the "on_expr" half of the upward-callback protocol: the popping
/// state has already happened (or, for `ExpectExpr`, is about to happen
/// here) and calls into the new top synchronously.
fn deliver_expr(psm: &mut ParserStateMachine, expr: Expression) -> Result<(), ReaderError> {
    match psm.top_mut() {
        Some(ExprState::TopLevelSeq) => {
            psm.emit(expr);
            Ok(())
        }
        Some(ExprState::Define(st)) if st.phase == DefinePhase::D4 => {
            st.rhs = Some(match st.cvt_dest.clone() {
                Some(dest) => ConvertExpr::new(dest, expr),
                None => expr,
            });
            st.phase = DefinePhase::D5;
            Ok(())
        }
        Some(ExprState::Paren(st)) if st.phase == ParenPhase::P0 => {
            st.inner = Some(expr);
            st.phase = ParenPhase::P1;
            Ok(())
        }
        Some(ExprState::Lambda(st)) if st.phase == LambdaPhase::L2 => {
            st.body = Some(expr);
            st.phase = LambdaPhase::L3;
            Ok(())
        }
        Some(ExprState::ExpectExpr) => {
            psm.pop();
            psm.push(ExprState::ExprProgress(expr));
            Ok(())
        }
        other => Err(ReaderError::UnexpectedToken {
            state: other.map(|s| s.name()).unwrap_or("<empty>"),
            kind: TokenKind::Eof,
            span: schematica_common::Span::new(0, 0),
        }),
    }
}

fn deliver_symbol(psm: &mut ParserStateMachine, name: String) -> Result<(), ReaderError> {
    match psm.top_mut() {
        Some(ExprState::Define(st)) if st.phase == DefinePhase::D0 => {
            st.lhs_name = Some(name);
            st.phase = DefinePhase::D1;
            Ok(())
        }
        Some(ExprState::Formal(st)) if st.phase == FormalPhase::F0 => {
            st.name = Some(name);
            st.phase = FormalPhase::F1;
            Ok(())
        }
        other => Err(ReaderError::UnexpectedToken {
            state: other.map(|s| s.name()).unwrap_or("<empty>"),
            kind: TokenKind::Symbol,
            span: schematica_common::Span::new(0, 0),
        }),
    }
}

fn deliver_typedescr(psm: &mut ParserStateMachine, td: TypeDescr) -> Result<(), ReaderError> {
    match psm.top_mut() {
        Some(ExprState::Define(st)) if st.phase == DefinePhase::D2 => {
            st.cvt_dest = Some(td);
            st.phase = DefinePhase::D3;
            Ok(())
        }
        Some(ExprState::Formal(st)) if st.phase == FormalPhase::F2 => {
            let name = st.name.take().expect("F2 implies name is bound");
            psm.pop();
            deliver_formal(psm, Variable::typed(name, td))
        }
        other => Err(ReaderError::UnexpectedToken {
            state: other.map(|s| s.name()).unwrap_or("<empty>"),
            kind: TokenKind::Symbol,
            span: schematica_common::Span::new(0, 0),
        }),
    }
}

fn deliver_formal(psm: &mut ParserStateMachine, var: Variable) -> Result<(), ReaderError> {
    match psm.top_mut() {
        Some(ExprState::FormalArgList(st)) => {
            st.args.push(var);
            Ok(())
        }
        other => Err(ReaderError::UnexpectedToken {
            state: other.map(|s| s.name()).unwrap_or("<empty>"),
            kind: TokenKind::Symbol,
            span: schematica_common::Span::new(0, 0),
        }),
    }
}

fn deliver_formal_arglist(psm: &mut ParserStateMachine, args: Vec<Variable>) -> Result<(), ReaderError> {
    match psm.top_mut() {
        Some(ExprState::Lambda(st)) if st.phase == LambdaPhase::L1 => {
            st.args = args.clone();
            st.phase = LambdaPhase::L2;
            psm.push_env(EnvFrame::from_vars(&args));
            psm.push(ExprState::ExpectExpr);
            Ok(())
        }
        other => Err(ReaderError::UnexpectedToken {
            state: other.map(|s| s.name()).unwrap_or("<empty>"),
            kind: TokenKind::RParen,
            span: schematica_common::Span::new(0, 0),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::psm::ParserStateMachine;
    use schematica_ast::TypeRegistry;
    use schematica_common::Span;

    fn bare(kind: TokenKind) -> Token {
        Token::bare(kind, Span::new(0, 0))
    }

    #[test]
    fn define_d0_rejects_anything_but_a_symbol() {
        let mut psm = ParserStateMachine::new(TypeRegistry::with_builtins());
        psm.push(ExprState::TopLevelSeq);
        on_input(&mut psm, &bare(TokenKind::Def)).unwrap();
        // `ExpectSymbol` is on top now, not `Define` directly -- a `Colon`
        // here is unexpected regardless of which of the two rejects it.
        let err = on_input(&mut psm, &bare(TokenKind::Colon)).unwrap_err();
        assert!(matches!(err, ReaderError::UnexpectedToken { .. }));
    }

    #[test]
    fn expr_progress_re_delivers_its_terminator() {
        let mut psm = ParserStateMachine::new(TypeRegistry::with_builtins());
        psm.push(ExprState::TopLevelSeq);
        on_input(&mut psm, &Token::f64_literal(1.0, Span::new(0, 1))).unwrap();
        assert!(matches!(psm.top(), Some(ExprState::ExprProgress(_))));
        on_input(&mut psm, &bare(TokenKind::Semicolon)).unwrap();
        // the `;` both closed the literal and was re-fed to TopLevelSeq,
        // which ignores a semicolon arriving between expressions.
        assert_eq!(psm.stack.depth(), 1);
        assert!(psm.take_output().is_some());
    }
}
