use super::operators;
use crate::values::Value;

/// Expression tree consumed by the checker and evaluator.
///
/// There is no text syntax; trees are built with the constructors below.
///
/// ```
/// use hostbind_core::syntax::Expr;
///
/// // p.x + p.y
/// let e = Expr::add(Expr::ident("p").field("x"), Expr::ident("p").field("y"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Value),
    Ident(String),
    /// Field selection; with `test_only` it is a presence test (`has(a.b)`).
    Select {
        operand: Box<Expr>,
        field: String,
        test_only: bool,
    },
    /// Global call, or member call when `target` is set.
    Call {
        function: String,
        target: Option<Box<Expr>>,
        args: Vec<Expr>,
    },
    List(Vec<Expr>),
    Map(Vec<(Expr, Expr)>),
    /// Construction of a named object type.
    Struct {
        type_name: String,
        fields: Vec<(String, Expr)>,
    },
}

impl Expr {
    pub fn null() -> Expr {
        Expr::Literal(Value::Null)
    }

    pub fn bool(b: bool) -> Expr {
        Expr::Literal(Value::Bool(b))
    }

    pub fn int(i: i64) -> Expr {
        Expr::Literal(Value::Int(i))
    }

    pub fn uint(u: u64) -> Expr {
        Expr::Literal(Value::Uint(u))
    }

    pub fn double(d: f64) -> Expr {
        Expr::Literal(Value::Double(d))
    }

    pub fn string(s: &str) -> Expr {
        Expr::Literal(Value::string(s))
    }

    pub fn bytes(b: &[u8]) -> Expr {
        Expr::Literal(Value::bytes(b))
    }

    pub fn ident(name: &str) -> Expr {
        Expr::Ident(name.to_string())
    }

    pub fn field(self, name: &str) -> Expr {
        Expr::Select {
            operand: Box::new(self),
            field: name.to_string(),
            test_only: false,
        }
    }

    pub fn has(self, name: &str) -> Expr {
        Expr::Select {
            operand: Box::new(self),
            field: name.to_string(),
            test_only: true,
        }
    }

    pub fn call(function: &str, args: Vec<Expr>) -> Expr {
        Expr::Call {
            function: function.to_string(),
            target: None,
            args,
        }
    }

    pub fn method(self, function: &str, args: Vec<Expr>) -> Expr {
        Expr::Call {
            function: function.to_string(),
            target: Some(Box::new(self)),
            args,
        }
    }

    pub fn list(items: Vec<Expr>) -> Expr {
        Expr::List(items)
    }

    pub fn map(entries: Vec<(Expr, Expr)>) -> Expr {
        Expr::Map(entries)
    }

    pub fn new_struct(type_name: &str, fields: Vec<(&str, Expr)>) -> Expr {
        Expr::Struct {
            type_name: type_name.to_string(),
            fields: fields
                .into_iter()
                .map(|(name, e)| (name.to_string(), e))
                .collect(),
        }
    }

    fn binary(op: &str, lhs: Expr, rhs: Expr) -> Expr {
        Expr::call(op, vec![lhs, rhs])
    }

    pub fn add(lhs: Expr, rhs: Expr) -> Expr {
        Expr::binary(operators::ADD, lhs, rhs)
    }

    pub fn sub(lhs: Expr, rhs: Expr) -> Expr {
        Expr::binary(operators::SUBTRACT, lhs, rhs)
    }

    pub fn mul(lhs: Expr, rhs: Expr) -> Expr {
        Expr::binary(operators::MULTIPLY, lhs, rhs)
    }

    pub fn div(lhs: Expr, rhs: Expr) -> Expr {
        Expr::binary(operators::DIVIDE, lhs, rhs)
    }

    pub fn rem(lhs: Expr, rhs: Expr) -> Expr {
        Expr::binary(operators::MODULO, lhs, rhs)
    }

    pub fn neg(operand: Expr) -> Expr {
        Expr::call(operators::NEGATE, vec![operand])
    }

    pub fn not(operand: Expr) -> Expr {
        Expr::call(operators::NOT, vec![operand])
    }

    pub fn eq(lhs: Expr, rhs: Expr) -> Expr {
        Expr::binary(operators::EQUALS, lhs, rhs)
    }

    pub fn ne(lhs: Expr, rhs: Expr) -> Expr {
        Expr::binary(operators::NOT_EQUALS, lhs, rhs)
    }

    pub fn lt(lhs: Expr, rhs: Expr) -> Expr {
        Expr::binary(operators::LESS, lhs, rhs)
    }

    pub fn le(lhs: Expr, rhs: Expr) -> Expr {
        Expr::binary(operators::LESS_EQUALS, lhs, rhs)
    }

    pub fn gt(lhs: Expr, rhs: Expr) -> Expr {
        Expr::binary(operators::GREATER, lhs, rhs)
    }

    pub fn ge(lhs: Expr, rhs: Expr) -> Expr {
        Expr::binary(operators::GREATER_EQUALS, lhs, rhs)
    }

    pub fn and(lhs: Expr, rhs: Expr) -> Expr {
        Expr::binary(operators::LOGICAL_AND, lhs, rhs)
    }

    pub fn or(lhs: Expr, rhs: Expr) -> Expr {
        Expr::binary(operators::LOGICAL_OR, lhs, rhs)
    }

    pub fn index(operand: Expr, index: Expr) -> Expr {
        Expr::binary(operators::INDEX, operand, index)
    }

    /// `needle in haystack`
    pub fn in_(needle: Expr, haystack: Expr) -> Expr {
        Expr::binary(operators::IN, needle, haystack)
    }

    pub fn size(operand: Expr) -> Expr {
        Expr::call(operators::SIZE, vec![operand])
    }

    pub fn cond(condition: Expr, then: Expr, otherwise: Expr) -> Expr {
        Expr::call(operators::CONDITIONAL, vec![condition, then, otherwise])
    }

    /// Dotted name of an identifier/selection chain, e.g. `vars.int`.
    pub fn qualified_name(&self) -> Option<String> {
        match self {
            Expr::Ident(name) => Some(name.clone()),
            Expr::Select {
                operand,
                field,
                test_only: false,
            } => operand
                .qualified_name()
                .map(|prefix| format!("{prefix}.{field}")),
            _ => None,
        }
    }
}
