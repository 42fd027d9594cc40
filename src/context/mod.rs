//! Declaration context: named constants and host function bindings.
//!
//! A [`Context`] is an ordered, append-only list of declarations. Lookup is
//! a linear scan, first match wins; compile-time argument names shadow
//! context constants (the parser checks arguments first). The reverse lookup
//! [`Context::funct_name_of`] exists for the disassembler only and scans by
//! callback pointer identity.

mod builtins;

use crate::core::error::Error;
use crate::core::value::{Type, Value};
use crate::{REGS_MAX, codegen, optimizer, parser, program::CompiledFunction};

/// Host callback bound into a context.
///
/// Receives exactly `sig.argc()` values (a window of the evaluation frame)
/// and returns the result. It may record a math error in the thread-local
/// status; it must not retain the slice.
pub type NativeFn = fn(&[Value]) -> Value;

/// Declared shape of a host function: argument types and return type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    /// One entry per argument.
    pub argtypes: Vec<Type>,
    /// Type of the returned value.
    pub rettype: Type,
}

impl Signature {
    /// A signature from explicit parts.
    pub fn new(argtypes: Vec<Type>, rettype: Type) -> Self {
        Signature { argtypes, rettype }
    }

    /// `argc` numeric arguments returning a number.
    pub fn numeric(argc: usize) -> Self {
        Signature {
            argtypes: vec![Type::Number; argc],
            rettype: Type::Number,
        }
    }

    /// One numeric argument returning a boolean.
    pub fn predicate() -> Self {
        Signature {
            argtypes: vec![Type::Number],
            rettype: Type::Boolean,
        }
    }

    /// Number of arguments.
    pub fn argc(&self) -> usize {
        self.argtypes.len()
    }
}

/// One entry of a [`Context`].
#[derive(Debug, Clone)]
pub enum Decl {
    /// A named numeric constant.
    Const {
        /// Declared name.
        name: String,
        /// Its value.
        value: Value,
    },
    /// A named host function.
    Funct {
        /// Declared name.
        name: String,
        /// The callback.
        funct: NativeFn,
        /// Its signature.
        sig: Signature,
    },
}

impl Decl {
    /// The declared name.
    pub fn name(&self) -> &str {
        match self {
            Decl::Const { name, .. } | Decl::Funct { name, .. } => name,
        }
    }
}

/// Ordered collection of constant and function declarations.
#[derive(Debug, Clone, Default)]
pub struct Context {
    decls: Vec<Decl>,
}

const RESERVED: [&str; 5] = ["inf", "nan", "true", "false", "in"];

/// Test whether `name` is usable as an argument, constant or function name.
///
/// Valid names start with a letter or `_` followed by letters, digits or
/// `_`. The words `inf`, `nan`, `true`, `false` and `in` are reserved
/// case-insensitively.
pub fn valid_name(name: &str) -> bool {
    let bytes = name.as_bytes();
    let Some(&first) = bytes.first() else {
        return false;
    };
    if !(first.is_ascii_alphabetic() || first == b'_') {
        return false;
    }
    if !bytes[1..]
        .iter()
        .all(|&b| b.is_ascii_alphanumeric() || b == b'_')
    {
        return false;
    }
    !RESERVED.iter().any(|r| name.eq_ignore_ascii_case(r))
}

pub(crate) fn validate_argnames(argnames: &[&str]) -> Result<(), Error> {
    for (i, argname) in argnames.iter().enumerate() {
        if !valid_name(argname) {
            return Err(Error::IllegalName {
                name: (*argname).to_string(),
            });
        }
        if argnames[..i].contains(argname) {
            return Err(Error::DuplicateArgument {
                name: (*argname).to_string(),
            });
        }
    }
    Ok(())
}

impl Context {
    /// An empty context.
    pub fn new() -> Self {
        Context { decls: Vec::new() }
    }

    /// A context pre-populated with the default constants and functions.
    pub fn with_defaults() -> Self {
        let mut ctx = Context::new();
        ctx.define_defaults()
            .expect("default declarations are valid and unique");
        ctx
    }

    /// Define the default set of constants (`e`, `pi`, `tau`, ...) and math
    /// functions (`sin`, `atan2`, `gamma`, ...; see the crate docs for the
    /// full list).
    ///
    /// Fails with [`Error::NameExists`] if any of the names is already
    /// declared.
    pub fn define_defaults(&mut self) -> Result<(), Error> {
        builtins::define_defaults(self)
    }

    /// Define a named numeric constant.
    pub fn define_const(&mut self, name: &str, value: f64) -> Result<(), Error> {
        self.check_new_name(name)?;
        self.decls.push(Decl::Const {
            name: name.to_string(),
            value: Value::Number(value),
        });
        Ok(())
    }

    /// Define a named host function with its signature.
    pub fn define_funct(
        &mut self,
        name: &str,
        funct: NativeFn,
        sig: Signature,
    ) -> Result<(), Error> {
        if sig.argc() > REGS_MAX {
            return Err(Error::TooManyArguments);
        }
        self.check_new_name(name)?;
        self.decls.push(Decl::Funct {
            name: name.to_string(),
            funct,
            sig,
        });
        Ok(())
    }

    /// Remove a declaration by name, shifting successors left.
    pub fn undefine(&mut self, name: &str) -> Result<(), Error> {
        match self.decls.iter().position(|d| d.name() == name) {
            Some(i) => {
                self.decls.remove(i);
                Ok(())
            }
            None => Err(Error::NoSuchName {
                name: name.to_string(),
            }),
        }
    }

    /// Find a declaration by name. First match wins.
    pub fn lookup(&self, name: &str) -> Option<&Decl> {
        self.decls.iter().find(|d| d.name() == name)
    }

    /// Reverse lookup of a callback's declared name, by pointer identity.
    /// Linear and debug-only by design (used by the disassembler).
    pub fn funct_name_of(&self, funct: NativeFn) -> Option<&str> {
        self.decls.iter().find_map(|d| match d {
            Decl::Funct { name, funct: f, .. } if std::ptr::fn_addr_eq(*f, funct) => {
                Some(name.as_str())
            }
            _ => None,
        })
    }

    /// Number of declarations.
    pub fn len(&self) -> usize {
        self.decls.len()
    }

    /// True if nothing is declared.
    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }

    /// Compile an expression function against this context.
    ///
    /// Validates the argument names, parses and type-checks the source,
    /// runs the optimizer once and generates bytecode.
    pub fn compile(&self, argnames: &[&str], source: &str) -> Result<CompiledFunction, Error> {
        validate_argnames(argnames)?;
        if argnames.len() > REGS_MAX {
            return Err(Error::TooManyArguments);
        }
        let expr = parser::parse(self, argnames, source)?;
        let expr = optimizer::optimize(expr)?;
        codegen::generate(&expr, argnames.len())
    }

    fn check_new_name(&self, name: &str) -> Result<(), Error> {
        if !valid_name(name) {
            return Err(Error::IllegalName {
                name: name.to_string(),
            });
        }
        if self.lookup(name).is_some() {
            return Err(Error::NameExists {
                name: name.to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nop(_args: &[Value]) -> Value {
        Value::Number(0.0)
    }

    #[test]
    fn name_validation() {
        assert!(valid_name("x"));
        assert!(valid_name("_tmp2"));
        assert!(valid_name("Abc_def"));
        assert!(!valid_name(""));
        assert!(!valid_name("2x"));
        assert!(!valid_name("a-b"));
        assert!(!valid_name("in"));
        assert!(!valid_name("TRUE"));
        assert!(!valid_name("NaN"));
        assert!(!valid_name("Inf"));
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut ctx = Context::new();
        ctx.define_const("a", 1.0).unwrap();
        assert!(matches!(
            ctx.define_const("a", 2.0),
            Err(Error::NameExists { .. })
        ));
        assert!(matches!(
            ctx.define_funct("a", nop, Signature::numeric(1)),
            Err(Error::NameExists { .. })
        ));
    }

    #[test]
    fn undefine_shifts_successors() {
        let mut ctx = Context::new();
        ctx.define_const("a", 1.0).unwrap();
        ctx.define_const("b", 2.0).unwrap();
        ctx.define_const("c", 3.0).unwrap();
        ctx.undefine("b").unwrap();
        assert_eq!(ctx.len(), 2);
        assert!(ctx.lookup("b").is_none());
        assert!(ctx.lookup("a").is_some());
        assert!(ctx.lookup("c").is_some());
        assert!(matches!(
            ctx.undefine("b"),
            Err(Error::NoSuchName { .. })
        ));
    }

    #[test]
    fn first_match_wins() {
        let mut ctx = Context::new();
        ctx.define_const("a", 1.0).unwrap();
        match ctx.lookup("a") {
            Some(Decl::Const { value, .. }) => assert_eq!(value.number(), 1.0),
            other => panic!("unexpected lookup result: {other:?}"),
        }
    }

    #[test]
    fn funct_reverse_lookup() {
        let mut ctx = Context::new();
        ctx.define_funct("f", nop, Signature::numeric(1)).unwrap();
        assert_eq!(ctx.funct_name_of(nop), Some("f"));
        fn other(_args: &[Value]) -> Value {
            Value::Number(1.0)
        }
        assert_eq!(ctx.funct_name_of(other), None);
    }

    #[test]
    fn defining_oversized_signature_fails() {
        let mut ctx = Context::new();
        let sig = Signature::numeric(REGS_MAX + 1);
        assert!(matches!(
            ctx.define_funct("f", nop, sig),
            Err(Error::TooManyArguments)
        ));
    }

    #[test]
    fn default_context_has_expected_entries() {
        let ctx = Context::with_defaults();
        assert!(matches!(ctx.lookup("pi"), Some(Decl::Const { .. })));
        assert!(matches!(ctx.lookup("sin"), Some(Decl::Funct { .. })));
        assert!(matches!(ctx.lookup("atan2"), Some(Decl::Funct { .. })));
        match ctx.lookup("fma") {
            Some(Decl::Funct { sig, .. }) => assert_eq!(sig.argc(), 3),
            other => panic!("unexpected fma declaration: {other:?}"),
        }
        match ctx.lookup("isnan") {
            Some(Decl::Funct { sig, .. }) => assert_eq!(sig.rettype, Type::Boolean),
            other => panic!("unexpected isnan declaration: {other:?}"),
        }
    }
}
