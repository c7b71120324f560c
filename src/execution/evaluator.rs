use rand::rngs::SmallRng;
use rand::SeedableRng;

use super::{EvalError, FunctionTable, Scope, Value};
use crate::ast::{Ast, AstKind, StringSpan};
use crate::parser::parse_expr_string;

/// Per-pass state shared by every function call: the number of rows that
/// generators produce and the random source they draw from.
pub struct CallContext {
    pub rows: usize,
    pub rng: SmallRng,
}

impl CallContext {
    pub fn new(rows: usize, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        Self { rows, rng }
    }
}

/// Parses and evaluates expressions against one function table.
#[derive(Debug, Clone)]
pub struct Evaluator {
    functions: FunctionTable,
}

impl Evaluator {
    pub fn new(functions: FunctionTable) -> Self {
        Self { functions }
    }

    pub fn standard() -> Self {
        Self::new(FunctionTable::standard())
    }

    pub fn auxiliary() -> Self {
        Self::new(FunctionTable::auxiliary())
    }

    pub fn output() -> Self {
        Self::new(FunctionTable::output())
    }

    pub fn functions(&self) -> &FunctionTable {
        &self.functions
    }

    pub fn evaluate(
        &self,
        expr: &str,
        scope: &Scope,
        ctx: &mut CallContext,
    ) -> Result<Value, EvalError> {
        let ast = parse_expr_string(expr).map_err(|e| EvalError::Syntax(e.to_string()))?;
        self.eval_ast(&ast, scope, ctx)
    }

    pub fn eval_ast(
        &self,
        ast: &Ast,
        scope: &Scope,
        ctx: &mut CallContext,
    ) -> Result<Value, EvalError> {
        match &ast.kind {
            AstKind::Number(v) => Ok(Value::Scalar(*v)),
            AstKind::Str(s) => Ok(Value::Text(s.to_string())),
            AstKind::Name(name) => self.lookup(name, ast.span, scope),
            AstKind::Monop(monop) => {
                let child = self.eval_ast(&monop.child, scope, ctx)?;
                match monop.op {
                    '-' => child.map(|v| -v),
                    _ => child.map(|v| v),
                }
            }
            AstKind::Binop(binop) => {
                let left = self.eval_ast(&binop.left, scope, ctx)?;
                let right = self.eval_ast(&binop.right, scope, ctx)?;
                left.binary_op(binop.op, right)
            }
            AstKind::Index(index) => {
                let target = self.eval_ast(&index.target, scope, ctx)?;
                let index = self.eval_ast(&index.index, scope, ctx)?;
                target.index(index)
            }
            AstKind::Call(call) => {
                let mut positional = Vec::new();
                let mut named = Vec::new();
                for arg in &call.args {
                    let value = self.eval_ast(&arg.expression, scope, ctx)?;
                    match arg.name {
                        Some(name) => named.push((name, value)),
                        None => {
                            if !named.is_empty() {
                                return Err(EvalError::Syntax(format!(
                                    "positional argument follows named argument in call to {}()",
                                    call.fn_name
                                )));
                            }
                            positional.push(value)
                        }
                    }
                }
                // function values bound in scope shadow the table
                if let Some(Value::Func(func)) = scope.get(call.fn_name) {
                    if let Some((name, _)) = named.first() {
                        return Err(EvalError::type_err(format!(
                            "{}() does not take named argument '{}'",
                            call.fn_name, name
                        )));
                    }
                    return func.call(ctx, positional);
                }
                let def = self.functions.get(call.fn_name).ok_or_else(|| {
                    EvalError::name(located(
                        format!("unknown function '{}'", call.fn_name),
                        ast.span,
                    ))
                })?;
                let args = def.bind_args(positional, named)?;
                def.invoke(ctx, args)
            }
        }
    }

    fn lookup(
        &self,
        name: &str,
        span: Option<StringSpan>,
        scope: &Scope,
    ) -> Result<Value, EvalError> {
        if let Some(value) = scope.get(name) {
            return Ok(value.clone());
        }
        if self.functions.functions_as_values() {
            if let Some(def) = self.functions.get(name) {
                return Ok(Value::Func(super::Func::Native(def)));
            }
        }
        Err(EvalError::name(located(
            format!("name '{}' is not defined", name),
            span,
        )))
    }
}

fn located(msg: String, span: Option<StringSpan>) -> String {
    match span {
        Some(span) => format!("{} at {}", msg, span),
        None => msg,
    }
}

/// Evaluates `expr` with `functions` against `scope`.
pub fn evaluate(
    expr: &str,
    functions: &FunctionTable,
    scope: &Scope,
    ctx: &mut CallContext,
) -> Result<Value, EvalError> {
    Evaluator::new(functions.clone()).evaluate(expr, scope, ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Table;
    use ndarray::array;

    fn eval(expr: &str, scope: &Scope) -> Result<Value, EvalError> {
        Evaluator::standard().evaluate(expr, scope, &mut CallContext::new(3, Some(1)))
    }

    #[test]
    fn arithmetic_with_scope() {
        let mut scope = Scope::new();
        scope.insert("x", Value::Scalar(5.0));
        scope.insert("c", Value::Column(array![1.0, 2.0, 3.0]));
        assert_eq!(eval("x + 1", &scope).unwrap().as_scalar().unwrap(), 6.0);
        assert_eq!(eval("-x ^ 2", &scope).unwrap().as_scalar().unwrap(), -25.0);
        assert_eq!(eval("2 ** 3", &scope).unwrap().as_scalar().unwrap(), 8.0);
        let v = eval("c * x - 1", &scope).unwrap();
        assert_eq!(v.to_values().unwrap(), array![4.0, 9.0, 14.0]);
        assert_eq!(eval("c[-1]", &scope).unwrap().as_scalar().unwrap(), 3.0);
        assert_eq!(eval("sum(c) / len(c)", &scope).unwrap().as_scalar().unwrap(), 2.0);
    }

    #[test]
    fn error_kinds() {
        let mut scope = Scope::new();
        scope.insert("t", Value::Table(Table::from_columns([("a", array![1.0])]).unwrap()));
        assert!(matches!(eval("y + 1", &scope), Err(EvalError::Name(_))));
        assert!(matches!(eval("nosuch(1)", &scope), Err(EvalError::Name(_))));
        assert!(matches!(eval("t['b']", &scope), Err(EvalError::Name(_))));
        assert!(matches!(eval("t + 1", &scope), Err(EvalError::Type(_))));
        assert!(matches!(eval("'a' * 2", &scope), Err(EvalError::Type(_))));
        assert!(matches!(eval("sqrt(1, 2)", &scope), Err(EvalError::Type(_))));
        assert!(matches!(eval("1 +", &scope), Err(EvalError::Syntax(_))));
        assert!(matches!(eval("normal(std=1, 0)", &scope), Err(EvalError::Syntax(_))));
    }

    #[test]
    fn name_errors_carry_position() {
        let err = eval("1 + yy", &Scope::new()).unwrap_err();
        assert_eq!(err, EvalError::Name("name 'yy' is not defined at (4, 6)".to_string()));
        let err = eval("2 * nosuch(1)", &Scope::new()).unwrap_err();
        assert_eq!(err, EvalError::Name("unknown function 'nosuch' at (4, 13)".to_string()));
    }

    #[test]
    fn every_standard_function_is_callable() {
        let mut scope = Scope::new();
        scope.insert("c", Value::Column(array![1.0, 2.0, 3.0]));
        let table =
            Table::from_columns([("a", array![1.0, 2.0, 3.0]), ("b", array![3.0, 2.0, 1.0])])
                .unwrap();
        scope.insert("t", Value::Table(table));
        let unary = [
            "sin", "cos", "tan", "exp", "log", "log10", "sqrt", "abs", "sigmoid", "arcsinh",
            "arccosh", "heaviside", "tanh", "sinh", "cosh", "round", "floor", "ceil",
        ];
        let reductions = [
            "sum", "mean", "std", "var", "min_of", "max_of", "len", "norm", "cumsum",
        ];
        let mut exprs = unary
            .iter()
            .chain(reductions.iter())
            .map(|name| format!("{}(c)", name))
            .collect::<Vec<_>>();
        for name in ["copysign", "pow", "min", "max"] {
            exprs.push(format!("{}(c, 2)", name));
        }
        exprs.extend(
            [
                "clip(c, 1, 2)",
                "uniform()",
                "normal()",
                "randint(0, 3)",
                "choice(1, 2)",
                "range()",
                "linspace(0, 1)",
                "constant(5)",
                "column(t, 'a')",
                "select(t, 'a')",
                "drop(t, 'a')",
                "normalize(t)",
                "standardize(t)",
                "minmax(t)",
                "head(t, 1)",
                "shuffle(t)",
                "with_column(t, 'z', 1)",
            ]
            .map(str::to_string),
        );
        for expr in &exprs {
            assert!(eval(expr, &scope).is_ok(), "{}", expr);
        }
        assert_eq!(eval("min_of(c)", &scope).unwrap().as_scalar().unwrap(), 1.0);
        assert_eq!(eval("max_of(c)", &scope).unwrap().as_scalar().unwrap(), 3.0);
    }

    #[test]
    fn generators_and_table_functions() {
        let scope = Scope::new();
        let v = eval("range(1) * 2", &scope).unwrap();
        assert_eq!(v.to_values().unwrap(), array![2.0, 4.0, 6.0]);
        let v = eval("normal(10, std=0)", &scope).unwrap();
        assert_eq!(v.to_values().unwrap(), array![10.0, 10.0, 10.0]);
    }

    #[test]
    fn bare_function_names_only_in_auxiliary() {
        let scope = Scope::new();
        assert!(matches!(eval("sqrt", &scope), Err(EvalError::Name(_))));
        let mut ctx = CallContext::new(1, None);
        let v = Evaluator::auxiliary()
            .evaluate("compose(sqrt, abs)", &scope, &mut ctx)
            .unwrap();
        assert!(matches!(v, Value::Func(_)));

        // a function value in scope is callable from the standard language
        let mut scope = Scope::new();
        scope.insert("f", v);
        assert_eq!(eval("f(-9) + 1", &scope).unwrap().as_scalar().unwrap(), 4.0);
    }

    #[test]
    fn free_function_matches_evaluator() {
        let mut scope = Scope::new();
        scope.insert("x", Value::Scalar(2.0));
        let mut ctx = CallContext::new(1, None);
        let v = evaluate("pow(x, 3)", &FunctionTable::standard(), &scope, &mut ctx).unwrap();
        assert_eq!(v.as_scalar().unwrap(), 8.0);
    }
}
