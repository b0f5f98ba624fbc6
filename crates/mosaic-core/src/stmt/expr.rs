use super::*;
use crate::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// AND a set of binary expressions
    And(ExprAnd),

    /// Binary expression
    BinaryOp(ExprBinaryOp),

    /// Reference a selectable through a table alias
    Column(ExprColumn),

    /// Whether an expression is (or is not) null.
    IsNull(ExprIsNull),

    /// Evaluates to a constant value
    Value(Value),
}

impl Expr {
    pub fn null() -> Expr {
        Expr::Value(Value::Null)
    }

    pub fn is_true(&self) -> bool {
        matches!(self, Expr::Value(Value::Bool(true)))
    }

    pub fn is_value(&self) -> bool {
        matches!(self, Expr::Value(_))
    }

    pub fn as_column(&self) -> Option<&ExprColumn> {
        match self {
            Expr::Column(column) => Some(column),
            _ => None,
        }
    }

    /// Visits every column reference in the expression, depth first.
    pub fn columns(&self) -> Vec<&ExprColumn> {
        let mut out = vec![];
        self.collect_columns(&mut out);
        out
    }

    fn collect_columns<'a>(&'a self, out: &mut Vec<&'a ExprColumn>) {
        match self {
            Expr::And(expr) => {
                for operand in &expr.operands {
                    operand.collect_columns(out);
                }
            }
            Expr::BinaryOp(expr) => {
                expr.lhs.collect_columns(out);
                expr.rhs.collect_columns(out);
            }
            Expr::Column(column) => out.push(column),
            Expr::IsNull(expr) => expr.expr.collect_columns(out),
            Expr::Value(_) => {}
        }
    }
}

impl From<bool> for Expr {
    fn from(value: bool) -> Expr {
        Expr::Value(Value::Bool(value))
    }
}

impl From<Value> for Expr {
    fn from(value: Value) -> Expr {
        Expr::Value(value)
    }
}
