use super::{Delimited, Params, ToSql};

use crate::stmt;

impl ToSql for &stmt::Expr {
    fn to_sql<P: Params>(self, f: &mut super::Formatter<'_, P>) {
        use stmt::Expr::*;

        match self {
            And(expr) => {
                fmt!(f, Delimited(&expr.operands, " AND "));
            }
            BinaryOp(expr) => {
                let (lhs, rhs) = (&*expr.lhs, &*expr.rhs);
                fmt!(f, lhs " " expr.op " " rhs);
            }
            Column(expr) => expr.to_sql(f),
            IsNull(expr) => {
                let operand = &*expr.expr;

                if expr.negate {
                    fmt!(f, operand " IS NOT NULL");
                } else {
                    fmt!(f, operand " IS NULL");
                }
            }
            Value(value) => value.to_sql(f),
        }
    }
}

impl ToSql for stmt::BinaryOp {
    fn to_sql<P: Params>(self, f: &mut super::Formatter<'_, P>) {
        f.dst.push_str(match self {
            stmt::BinaryOp::Eq => "=",
            stmt::BinaryOp::Ne => "<>",
        })
    }
}

/// A column read through its table alias.
///
/// A custom read fragment replaces `?` with the qualified column, a formula
/// replaces `{alias}` with the alias.
impl ToSql for &stmt::ExprColumn {
    fn to_sql<P: Params>(self, f: &mut super::Formatter<'_, P>) {
        if self.is_formula {
            let formula = self.expression.replace("{alias}", &self.alias);
            fmt!(f, &formula);
            return;
        }

        let column = if f.alias {
            format!("{}.{}", self.alias, self.expression)
        } else {
            self.expression.clone()
        };

        match &self.custom_read {
            Some(fragment) => fmt!(f, &fragment.replace('?', &column)),
            None => fmt!(f, &column),
        }
    }
}
