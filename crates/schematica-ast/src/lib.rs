//! AST node library and type registry for schematica.
//!
//! The reader core treats this crate as an external collaborator: it calls
//! these constructors and field accessors but does not decide the shape of
//! the tree. It's a plain `Rc`-shared owned tree rather than a lossless CST,
//! since nodes here are handed back one at a time as soon as they're
//! complete rather than built in one pass over a whole token slice.

pub mod expr;
pub mod typedescr;

pub use expr::{Apply, Constant, ConstantValue, ConvertExpr, DefineExpr, ExprKind, Expression, If, Lambda, Variable};
pub use typedescr::{TypeDescr, TypeRegistry};
