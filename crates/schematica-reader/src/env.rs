//! Lexical environment for resolving variable references.

use rustc_hash::FxHashMap;
use schematica_ast::Variable;

/// One binding scope. `Lambda` pushes a frame for its formals once its
/// argument list closes; the frame is popped when the lambda's body
/// completes.
#[derive(Debug, Default)]
pub struct EnvFrame {
    vars: FxHashMap<String, Variable>,
}

impl EnvFrame {
    pub fn from_vars(vars: &[Variable]) -> Self {
        let mut frame = Self::default();
        for v in vars {
            frame.vars.insert(v.name.clone(), v.clone());
        }
        frame
    }

    fn get(&self, name: &str) -> Option<&Variable> {
        self.vars.get(name)
    }
}

/// Stack of [`EnvFrame`]s, innermost last.
#[derive(Debug, Default)]
pub struct EnvFrameStack {
    frames: Vec<EnvFrame>,
}

impl EnvFrameStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, frame: EnvFrame) {
        self.frames.push(frame);
    }

    pub fn pop(&mut self) -> Option<EnvFrame> {
        self.frames.pop()
    }

    /// Resolve `name` searching from the innermost frame outward.
    ///
    /// Returns `None` both when `name` is genuinely unbound and when this
    /// reader instance simply isn't tracking an enclosing scope for it --
    /// either way the caller builds an unresolved [`Variable`] instead of
    /// failing the parse; name resolution proper isn't this core's job.
    pub fn lookup(&self, name: &str) -> Option<&Variable> {
        self.frames.iter().rev().find_map(|frame| frame.get(name))
    }
}
