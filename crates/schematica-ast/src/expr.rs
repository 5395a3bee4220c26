use std::rc::Rc;

use crate::typedescr::TypeDescr;

/// Shared handle to a fully-built AST node.
///
/// `Expression` values are reference-counted: a node may simultaneously be
/// the rhs of a [`DefineExpr`], the arg of a [`ConvertExpr`], the body of a
/// [`Lambda`], and the reader's own output slot. `Rc` (not `Arc`) is correct
/// here — a reader instance, and everything it produces, lives and dies on
/// one thread, never shared across parser instances.
#[derive(Debug, Clone, PartialEq)]
pub struct Expression(Rc<ExprKind>);

impl Expression {
    pub fn new(kind: ExprKind) -> Self {
        Self(Rc::new(kind))
    }

    pub fn kind(&self) -> &ExprKind {
        &self.0
    }
}

/// The AST sum type.
///
/// `Apply` and `If` are constructible, belonging to the AST node library
/// proper, but the reader never produces them today -- `if` and application
/// syntax are reserved keywords/operators, not yet wired into any
/// `ExprState`.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Constant(Constant),
    Variable(Variable),
    Define(DefineExpr),
    Convert(ConvertExpr),
    Lambda(Lambda),
    Apply(Apply),
    If(If),
}

/// A literal value annotated with its type.
#[derive(Debug, Clone, PartialEq)]
pub struct Constant {
    pub ty: TypeDescr,
    pub value: ConstantValue,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConstantValue {
    F64(f64),
    I64(i64),
}

impl Constant {
    pub fn f64(ty: TypeDescr, value: f64) -> Expression {
        Expression::new(ExprKind::Constant(Constant {
            ty,
            value: ConstantValue::F64(value),
        }))
    }

    pub fn i64(ty: TypeDescr, value: i64) -> Expression {
        Expression::new(ExprKind::Constant(Constant {
            ty,
            value: ConstantValue::I64(value),
        }))
    }
}

/// A reference to a named binding.
///
/// The reader does not fail parsing when a symbol can't be resolved in the
/// current lexical scope -- name resolution is a semantic-analysis concern,
/// out of this core's scope. An unresolved variable simply carries
/// `ty: None`.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub name: String,
    pub ty: Option<TypeDescr>,
}

impl Variable {
    pub fn unresolved(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: None,
        }
    }

    pub fn typed(name: impl Into<String>, ty: TypeDescr) -> Self {
        Self {
            name: name.into(),
            ty: Some(ty),
        }
    }

    pub fn into_expression(self) -> Expression {
        Expression::new(ExprKind::Variable(self))
    }
}

/// `def NAME [: TYPE] = RHS ;`
#[derive(Debug, Clone, PartialEq)]
pub struct DefineExpr {
    pub lhs_name: String,
    pub rhs: Expression,
}

impl DefineExpr {
    pub fn new(lhs_name: impl Into<String>, rhs: Expression) -> Expression {
        Expression::new(ExprKind::Define(DefineExpr {
            lhs_name: lhs_name.into(),
            rhs,
        }))
    }
}

/// A type-ascribed conversion: `dest := TYPE`, `arg` the value being
/// converted. Produced when a `def` carries an explicit `: TYPE` ascription.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertExpr {
    pub dest: TypeDescr,
    pub arg: Expression,
}

impl ConvertExpr {
    pub fn new(dest: TypeDescr, arg: Expression) -> Expression {
        Expression::new(ExprKind::Convert(ConvertExpr { dest, arg }))
    }
}

/// `lambda ( arglist ) body`
#[derive(Debug, Clone, PartialEq)]
pub struct Lambda {
    pub name: String,
    pub args: Vec<Variable>,
    pub body: Expression,
}

impl Lambda {
    pub fn new(name: impl Into<String>, args: Vec<Variable>, body: Expression) -> Expression {
        Expression::new(ExprKind::Lambda(Lambda {
            name: name.into(),
            args,
            body,
        }))
    }
}

/// Function application: `fn_expr(arg_expr, ...)`. Not produced by the
/// reader specified here; reserved for a later grammar extension.
#[derive(Debug, Clone, PartialEq)]
pub struct Apply {
    pub function: Expression,
    pub args: Vec<Expression>,
}

/// `if (test) then_expr else else_expr`. Not produced by the reader
/// specified here; reserved for a later grammar extension.
#[derive(Debug, Clone, PartialEq)]
pub struct If {
    pub test: Expression,
    pub then_branch: Expression,
    pub else_branch: Expression,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::typedescr::TypeRegistry;

    #[test]
    fn constant_roundtrips_value() {
        let reg = TypeRegistry::with_builtins();
        let c = Constant::f64(reg.resolve("f64").unwrap(), 3.14);
        match c.kind() {
            ExprKind::Constant(Constant {
                value: ConstantValue::F64(v),
                ..
            }) => assert_eq!(*v, 3.14),
            _ => panic!("expected constant"),
        }
    }

    #[test]
    fn define_expr_wraps_rhs() {
        let reg = TypeRegistry::with_builtins();
        let rhs = Constant::f64(reg.resolve("f64").unwrap(), 1.0);
        let def = DefineExpr::new("pi", rhs.clone());
        match def.kind() {
            ExprKind::Define(d) => {
                assert_eq!(d.lhs_name, "pi");
                assert_eq!(d.rhs, rhs);
            }
            _ => panic!("expected define"),
        }
    }

    #[test]
    fn unresolved_variable_has_no_type() {
        let v = Variable::unresolved("x");
        assert!(v.ty.is_none());
    }
}
