use crate::evaluator::EvalError;
use miette::Diagnostic;
use thiserror::Error;

/// Errors returned by the `register*` family. Each aborts only the item
/// being registered.
#[derive(Debug, Clone, PartialEq, Error, Diagnostic)]
pub enum RegistrationError {
    #[error("unsupported type: {0}")]
    #[diagnostic(
        code(hostbind::register::unsupported_type),
        help("channels, functions and raw pointers have no engine representation")
    )]
    UnsupportedType(String),

    /// The type maps to the engine's null type.
    #[error("unspecified type: {0}")]
    #[diagnostic(code(hostbind::register::unspecified_type))]
    UnspecifiedType(String),

    #[error("type '{0}' is not a struct")]
    #[diagnostic(
        code(hostbind::register::not_a_struct),
        help("derive `Native` on the struct to make it registrable")
    )]
    NotAStruct(String),

    #[error("value of type '{0}' is not an object")]
    #[diagnostic(code(hostbind::register::not_an_object))]
    NotAnObject(String),

    #[error("result is required")]
    #[diagnostic(code(hostbind::register::missing_result))]
    MissingResult,

    #[error("too many results")]
    #[diagnostic(code(hostbind::register::too_many_results))]
    TooManyResults,

    #[error("last result must be an error: {0}")]
    #[diagnostic(
        code(hostbind::register::last_result_not_error),
        help("return `Result<T, E>` to report per-call failures")
    )]
    LastResultNotError(String),

    #[error("method must have at least one argument")]
    #[diagnostic(code(hostbind::register::missing_receiver))]
    MissingReceiver,

    #[error("conversion for type '{0}' already registered")]
    #[diagnostic(code(hostbind::register::duplicate_conversion))]
    DuplicateConversion(String),

    #[error("invalid conversion: {0}")]
    #[diagnostic(code(hostbind::register::invalid_conversion))]
    InvalidConversion(String),

    #[error("variable {0} already registered")]
    #[diagnostic(code(hostbind::register::duplicate_variable))]
    DuplicateVariable(String),

    #[error("cannot adapt value: {0}")]
    #[diagnostic(code(hostbind::register::adaptation))]
    Adaptation(EvalError),
}
