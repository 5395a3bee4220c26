//! `ParserStateMachine`: the single bundle passed to every state transition.
//!
//! Bundles the state stack, the environment stack, and the output slot so
//! that a sub-state never needs more than `(tk, psm)` to push/pop other
//! sub-states, emit a completed top-level expression, or consult the
//! enclosing lexical scope. Transitions go through the helpers below rather
//! than reaching into `stack`/`env` directly, so this struct stays the one
//! seam every sub-state's behavior is visible through.

use schematica_ast::{Expression, TypeRegistry, Variable};

use crate::env::{EnvFrame, EnvFrameStack};
use crate::stack::ExprStateStack;
use crate::state::ExprState;

pub struct ParserStateMachine {
    pub stack: ExprStateStack,
    pub env: EnvFrameStack,
    pub registry: TypeRegistry,
    out: Option<Expression>,
}

impl ParserStateMachine {
    pub fn new(registry: TypeRegistry) -> Self {
        Self {
            stack: ExprStateStack::new(),
            env: EnvFrameStack::new(),
            registry,
            out: None,
        }
    }

    /// Push a new sub-state onto the top of the stack.
    pub fn push(&mut self, state: ExprState) {
        self.stack.push(state);
    }

    /// Pop the active sub-state off the stack, handing it back to the caller
    /// so it can extract whatever it needs to forward before it's dropped.
    pub fn pop(&mut self) -> Option<ExprState> {
        self.stack.pop()
    }

    /// Borrow the active sub-state.
    pub fn top(&self) -> Option<&ExprState> {
        self.stack.top()
    }

    /// Mutably borrow the active sub-state, for in-place phase advances.
    pub fn top_mut(&mut self) -> Option<&mut ExprState> {
        self.stack.top_mut()
    }

    /// Resolve a name against the innermost enclosing lambda scope that
    /// binds it. `None` means either the name is genuinely unbound or no
    /// enclosing scope binds it; either way the caller builds an unresolved
    /// variable rather than failing the parse.
    pub fn lookup_var(&self, name: &str) -> Option<&Variable> {
        self.env.lookup(name)
    }

    /// Open a new lexical scope, binding a lambda's formals.
    pub fn push_env(&mut self, frame: EnvFrame) {
        self.env.push(frame);
    }

    /// Close the innermost lexical scope once its lambda's body is done.
    pub fn pop_env(&mut self) -> Option<EnvFrame> {
        self.env.pop()
    }

    /// Write a completed top-level expression to the output slot.
    ///
    /// Called only by `TopLevelSeq` when it receives a finished expression;
    /// overwriting a prior value would mean two top-level expressions
    /// completed on the same token, which the grammar never produces.
    pub fn emit(&mut self, expr: Expression) {
        debug_assert!(self.out.is_none(), "two top-level expressions completed on one token");
        self.out = Some(expr);
    }

    /// Take whatever was emitted during the last `include_token` call.
    pub fn take_output(&mut self) -> Option<Expression> {
        self.out.take()
    }
}
