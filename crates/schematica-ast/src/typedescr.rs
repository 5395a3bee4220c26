use std::rc::Rc;

use rustc_hash::FxHashMap;

/// Opaque handle to a type's metadata, as resolved by the type registry.
///
/// The reader never inspects the contents of a `TypeDescr`; it only asks
/// the registry to resolve a name and threads the result through
/// [`crate::expr::ConvertExpr`] / [`crate::expr::Variable`].
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDescr(Rc<TypeDescrInner>);

#[derive(Debug, PartialEq)]
struct TypeDescrInner {
    name: String,
    size: usize,
}

impl TypeDescr {
    fn new(name: impl Into<String>, size: usize) -> Self {
        Self(Rc::new(TypeDescrInner {
            name: name.into(),
            size,
        }))
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn size(&self) -> usize {
        self.0.size
    }
}

/// Resolves type names (as they appear after `:` in a definition or formal
/// parameter) to a [`TypeDescr`].
///
/// Built-in names are pre-registered by [`TypeRegistry::with_builtins`];
/// additional aliases can be layered on with [`TypeRegistry::register`].
#[derive(Debug, Default)]
pub struct TypeRegistry {
    types: FxHashMap<String, TypeDescr>,
}

impl TypeRegistry {
    /// An empty registry with no names resolvable.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A registry pre-populated with `f64, f32, i64, i32, i16`.
    pub fn with_builtins() -> Self {
        let mut reg = Self::empty();
        reg.register("f64", 8);
        reg.register("f32", 4);
        reg.register("i64", 8);
        reg.register("i32", 4);
        reg.register("i16", 2);
        reg
    }

    /// Register a user-defined (or built-in) type alias.
    pub fn register(&mut self, name: impl Into<String>, size: usize) -> TypeDescr {
        let name = name.into();
        let td = TypeDescr::new(name.clone(), size);
        self.types.insert(name, td.clone());
        td
    }

    /// Resolve a type name. `None` if the registry has no such alias.
    pub fn resolve(&self, name: &str) -> Option<TypeDescr> {
        self.types.get(name).cloned()
    }
}
