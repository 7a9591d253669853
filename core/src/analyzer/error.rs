use miette::Diagnostic;
use thiserror::Error;

/// Errors found while checking an expression against its environment.
#[derive(Debug, Clone, PartialEq, Error, Diagnostic)]
pub enum CheckError {
    #[error("undeclared reference to '{0}'")]
    #[diagnostic(
        code(hostbind::check::undeclared_reference),
        help("register a value or declare a variable with this name")
    )]
    UndeclaredReference(String),

    #[error("undeclared function '{0}'")]
    #[diagnostic(code(hostbind::check::unknown_function))]
    UnknownFunction(String),

    #[error("found no matching overload for '{function}' applied to ({args})")]
    #[diagnostic(code(hostbind::check::no_matching_overload))]
    NoMatchingOverload { function: String, args: String },

    #[error("undefined field '{field}' on type '{type_name}'")]
    #[diagnostic(code(hostbind::check::undefined_field))]
    UndefinedField { type_name: String, field: String },

    #[error("type '{type_name}' does not support field selection")]
    #[diagnostic(code(hostbind::check::not_selectable))]
    NotSelectable { type_name: String },

    #[error("unknown type '{0}'")]
    #[diagnostic(
        code(hostbind::check::unknown_type),
        help("object types must be registered before they can be constructed")
    )]
    UnknownType(String),

    #[error("expected '{expected}' but found '{found}'")]
    #[diagnostic(code(hostbind::check::type_mismatch))]
    TypeMismatch { expected: String, found: String },
}
