//! Error reports using miette
//!
//! Registration and check errors carry diagnostic codes and help text;
//! evaluation errors are reported with their message only.

use crate::{CheckError, EvalError, RegistrationError};
use miette::{Diagnostic, GraphicalReportHandler, GraphicalTheme};
use thiserror::Error;

/// Any error produced while registering, checking or evaluating.
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Registration(#[from] RegistrationError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Check(#[from] CheckError),

    #[error(transparent)]
    #[diagnostic(code(hostbind::eval))]
    Eval(#[from] EvalError),
}

/// Render an error to stderr
pub fn render_error(error: &Error) {
    eprintln!("{}", render_error_to_string(error));
}

/// Render an error to a String, with colors
///
/// # Example
/// ```
/// use hostbind::{Env, EnvOptions, Error, Expr, render_error_to_string_no_color};
///
/// let env = Env::new(EnvOptions::default());
/// let Err(err) = env.compile(&Expr::ident("missing")) else {
///     panic!("`missing` is not declared");
/// };
/// let report = render_error_to_string_no_color(&Error::from(err));
/// assert!(report.contains("undeclared reference to 'missing'"));
/// ```
pub fn render_error_to_string(error: &Error) -> String {
    render_with(error, GraphicalTheme::unicode())
}

/// Render an error to a String without color codes (useful for tests)
pub fn render_error_to_string_no_color(error: &Error) -> String {
    render_with(error, GraphicalTheme::unicode_nocolor())
}

fn render_with(error: &Error, theme: GraphicalTheme) -> String {
    let mut out = String::new();
    let handler = GraphicalReportHandler::new_themed(theme);
    if handler.render_report(&mut out, error).is_err() {
        return error.to_string();
    }
    out
}
