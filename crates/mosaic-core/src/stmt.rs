//! Minimal expression tree produced by the metamodel for a SQL-building
//! layer: equi-join predicates and null checks over selectables.

mod expr;
pub use expr::Expr;

mod expr_and;
pub use expr_and::ExprAnd;

mod expr_binary_op;
pub use expr_binary_op::ExprBinaryOp;

mod expr_column;
pub use expr_column::ExprColumn;

mod expr_is_null;
pub use expr_is_null::ExprIsNull;

mod op_binary;
pub use op_binary::BinaryOp;
