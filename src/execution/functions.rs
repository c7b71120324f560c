#![allow(clippy::type_complexity)]
use indexmap::IndexMap;
use ndarray::Array1;
use rand::seq::SliceRandom;
use rand::Rng;

use super::value::Func;
use super::{CallContext, EvalError, Value};
use crate::table::Table;

pub type NativeFn = fn(&mut CallContext, Vec<Value>) -> Result<Value, EvalError>;

#[derive(Clone, Copy)]
pub enum FunctionKind {
    /// elementwise over a scalar or column
    Unary(fn(f64) -> f64),
    /// elementwise with scalar broadcasting
    Binary(fn(f64, f64) -> f64),
    Native(NativeFn),
}

/// A function callable from expressions. `params` lists parameter names with
/// optional defaults; variadic functions take any number of positional
/// arguments and no named ones.
pub struct FunctionDef {
    pub name: &'static str,
    pub params: &'static [(&'static str, Option<f64>)],
    pub variadic: bool,
    pub kind: FunctionKind,
}

impl std::fmt::Debug for FunctionDef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionDef")
            .field("name", &self.name)
            .field("variadic", &self.variadic)
            .finish()
    }
}

impl FunctionDef {
    pub const fn unary(name: &'static str, f: fn(f64) -> f64) -> Self {
        Self {
            name,
            params: &[("x", None)],
            variadic: false,
            kind: FunctionKind::Unary(f),
        }
    }

    pub const fn binary(name: &'static str, f: fn(f64, f64) -> f64) -> Self {
        Self {
            name,
            params: &[("x", None), ("y", None)],
            variadic: false,
            kind: FunctionKind::Binary(f),
        }
    }

    pub const fn native(
        name: &'static str,
        params: &'static [(&'static str, Option<f64>)],
        f: NativeFn,
    ) -> Self {
        Self {
            name,
            params,
            variadic: false,
            kind: FunctionKind::Native(f),
        }
    }

    pub const fn variadic(name: &'static str, f: NativeFn) -> Self {
        Self {
            name,
            params: &[],
            variadic: true,
            kind: FunctionKind::Native(f),
        }
    }

    /// Matches positional and named arguments against the parameter list,
    /// filling defaults.
    pub fn bind_args(
        &self,
        positional: Vec<Value>,
        named: Vec<(&str, Value)>,
    ) -> Result<Vec<Value>, EvalError> {
        if self.variadic {
            if let Some((name, _)) = named.first() {
                return Err(EvalError::type_err(format!(
                    "{}() does not take named argument '{}'",
                    self.name, name
                )));
            }
            return Ok(positional);
        }
        if positional.len() > self.params.len() {
            return Err(EvalError::type_err(format!(
                "{}() takes {} arguments but {} were given",
                self.name,
                self.params.len(),
                positional.len()
            )));
        }
        let mut slots: Vec<Option<Value>> = positional.into_iter().map(Some).collect();
        slots.resize(self.params.len(), None);
        for (name, value) in named {
            let pos = self
                .params
                .iter()
                .position(|(p, _)| *p == name)
                .ok_or_else(|| {
                    EvalError::type_err(format!(
                        "{}() got an unexpected argument '{}'",
                        self.name, name
                    ))
                })?;
            if slots[pos].is_some() {
                return Err(EvalError::type_err(format!(
                    "{}() got multiple values for argument '{}'",
                    self.name, name
                )));
            }
            slots[pos] = Some(value);
        }
        slots
            .into_iter()
            .zip(self.params.iter())
            .map(|(slot, (name, default))| match (slot, default) {
                (Some(value), _) => Ok(value),
                (None, Some(default)) => Ok(Value::Scalar(*default)),
                (None, None) => Err(EvalError::type_err(format!(
                    "{}() missing argument '{}'",
                    self.name, name
                ))),
            })
            .collect()
    }

    pub fn invoke(&self, ctx: &mut CallContext, args: Vec<Value>) -> Result<Value, EvalError> {
        match self.kind {
            FunctionKind::Unary(f) => {
                let [x]: [Value; 1] = self.arity(args)?;
                x.map(f)
            }
            FunctionKind::Binary(f) => {
                let [x, y]: [Value; 2] = self.arity(args)?;
                x.zip_with(y, self.name, f)
            }
            FunctionKind::Native(f) => f(ctx, args),
        }
    }

    fn arity<const N: usize>(&self, args: Vec<Value>) -> Result<[Value; N], EvalError> {
        let given = args.len();
        args.try_into().map_err(|_| {
            EvalError::type_err(format!(
                "{}() takes {} arguments but {} were given",
                self.name, N, given
            ))
        })
    }
}

impl Func {
    pub fn call(&self, ctx: &mut CallContext, args: Vec<Value>) -> Result<Value, EvalError> {
        match self {
            Func::Native(def) => {
                let args = def.bind_args(args, vec![])?;
                def.invoke(ctx, args)
            }
            Func::Compose(funcs) => {
                let mut funcs = funcs.iter().rev();
                let innermost = funcs
                    .next()
                    .ok_or_else(|| EvalError::type_err("compose() of no functions"))?;
                let mut value = innermost.call(ctx, args)?;
                for func in funcs {
                    value = func.call(ctx, vec![value])?;
                }
                Ok(value)
            }
            Func::Partial(func, bound) => {
                let mut all = bound.clone();
                all.extend(args);
                func.call(ctx, all)
            }
        }
    }
}

/// The set of functions one evaluator can call. Tables differ between the
/// attribute language, the binding language and output composition.
#[derive(Debug, Clone)]
pub struct FunctionTable {
    functions: IndexMap<&'static str, &'static FunctionDef>,
    functions_as_values: bool,
}

impl FunctionTable {
    pub fn empty() -> Self {
        Self {
            functions: IndexMap::new(),
            functions_as_values: false,
        }
    }

    /// Functions for attribute, target, variable and postprocess expressions.
    pub fn standard() -> Self {
        Self::empty()
            .with(UNARY_FUNCTIONS)
            .with(TWO_ARG_FUNCTIONS)
            .with(GENERATORS)
            .with(REDUCTIONS)
            .with(TABLE_FUNCTIONS)
    }

    /// Functions for pre- and post-bindings: the standard set plus
    /// composition helpers, with bare function names evaluating to
    /// function values.
    pub fn auxiliary() -> Self {
        let mut table = Self::standard().with(COMPOSITION_FUNCTIONS);
        table.functions_as_values = true;
        table
    }

    /// Functions for output expressions.
    pub fn output() -> Self {
        Self::standard().with(OUTPUT_FUNCTIONS)
    }

    pub fn with(mut self, defs: &'static [FunctionDef]) -> Self {
        for def in defs {
            self.functions.insert(def.name, def);
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&'static FunctionDef> {
        self.functions.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    pub fn functions_as_values(&self) -> bool {
        self.functions_as_values
    }
}

pub const UNARY_FUNCTIONS: &[FunctionDef] = &[
    FunctionDef::unary("sin", f64::sin),
    FunctionDef::unary("cos", f64::cos),
    FunctionDef::unary("tan", f64::tan),
    FunctionDef::unary("exp", f64::exp),
    FunctionDef::unary("log", f64::ln),
    FunctionDef::unary("log10", f64::log10),
    FunctionDef::unary("sqrt", f64::sqrt),
    FunctionDef::unary("abs", f64::abs),
    FunctionDef::unary("sigmoid", sigmoid),
    FunctionDef::unary("arcsinh", f64::asinh),
    FunctionDef::unary("arccosh", f64::acosh),
    FunctionDef::unary("heaviside", heaviside),
    FunctionDef::unary("tanh", f64::tanh),
    FunctionDef::unary("sinh", f64::sinh),
    FunctionDef::unary("cosh", f64::cosh),
    FunctionDef::unary("round", f64::round),
    FunctionDef::unary("floor", f64::floor),
    FunctionDef::unary("ceil", f64::ceil),
];

pub const TWO_ARG_FUNCTIONS: &[FunctionDef] = &[
    FunctionDef::binary("copysign", f64::copysign),
    FunctionDef::binary("pow", f64::powf),
    FunctionDef::binary("min", f64::min),
    FunctionDef::binary("max", f64::max),
];

pub const GENERATORS: &[FunctionDef] = &[
    FunctionDef::native("uniform", &[("low", Some(0.0)), ("high", Some(1.0))], uniform),
    FunctionDef::native("normal", &[("mean", Some(0.0)), ("std", Some(1.0))], normal),
    FunctionDef::native("randint", &[("low", None), ("high", None)], randint),
    FunctionDef::variadic("choice", choice),
    FunctionDef::native("range", &[("start", Some(0.0)), ("step", Some(1.0))], range),
    FunctionDef::native("linspace", &[("start", None), ("stop", None)], linspace),
    FunctionDef::native("constant", &[("value", None)], constant),
];

pub const REDUCTIONS: &[FunctionDef] = &[
    FunctionDef::native("sum", &[("x", None)], sum),
    FunctionDef::native("mean", &[("x", None)], mean),
    FunctionDef::native("std", &[("x", None)], std_dev),
    FunctionDef::native("var", &[("x", None)], var),
    FunctionDef::native("min_of", &[("x", None)], min_of),
    FunctionDef::native("max_of", &[("x", None)], max_of),
    FunctionDef::native("len", &[("x", None)], len),
    FunctionDef::native("norm", &[("x", None)], norm),
    FunctionDef::native("cumsum", &[("x", None)], cumsum),
    FunctionDef::native("clip", &[("x", None), ("low", None), ("high", None)], clip),
];

pub const TABLE_FUNCTIONS: &[FunctionDef] = &[
    FunctionDef::native("column", &[("table", None), ("name", None)], column),
    FunctionDef::variadic("select", select),
    FunctionDef::variadic("drop", drop_columns),
    FunctionDef::native("normalize", &[("table", None)], normalize),
    FunctionDef::native("standardize", &[("table", None)], standardize),
    FunctionDef::native("minmax", &[("table", None)], minmax),
    FunctionDef::native("head", &[("table", None), ("n", None)], head),
    FunctionDef::native("shuffle", &[("table", None)], shuffle),
    FunctionDef::native(
        "with_column",
        &[("table", None), ("name", None), ("value", None)],
        with_column,
    ),
];

pub const COMPOSITION_FUNCTIONS: &[FunctionDef] = &[
    FunctionDef::variadic("compose", compose),
    FunctionDef::variadic("partial", partial),
    FunctionDef::variadic("apply", apply),
];

pub const OUTPUT_FUNCTIONS: &[FunctionDef] = &[FunctionDef::variadic("merge", merge)];

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

fn heaviside(x: f64) -> f64 {
    if x >= 0.0 {
        1.0
    } else {
        0.0
    }
}

fn scalars<const N: usize>(args: &[Value]) -> Result<[f64; N], EvalError> {
    let mut out = [0.0; N];
    for (o, arg) in out.iter_mut().zip(args) {
        *o = arg.as_scalar()?;
    }
    Ok(out)
}

fn uniform(ctx: &mut CallContext, args: Vec<Value>) -> Result<Value, EvalError> {
    let [low, high] = scalars(&args)?;
    let rng = &mut ctx.rng;
    let values = (0..ctx.rows)
        .map(|_| low + (high - low) * rng.gen::<f64>())
        .collect();
    Ok(Value::Column(values))
}

fn normal(ctx: &mut CallContext, args: Vec<Value>) -> Result<Value, EvalError> {
    let [mean, std] = scalars(&args)?;
    if std < 0.0 {
        return Err(EvalError::type_err("normal() std must be non-negative"));
    }
    let rng = &mut ctx.rng;
    // Box-Muller
    let values = (0..ctx.rows)
        .map(|_| {
            let u1 = 1.0 - rng.gen::<f64>();
            let u2 = rng.gen::<f64>();
            let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
            mean + std * z
        })
        .collect();
    Ok(Value::Column(values))
}

fn randint(ctx: &mut CallContext, args: Vec<Value>) -> Result<Value, EvalError> {
    let low = args[0].as_integer()?;
    let high = args[1].as_integer()?;
    if low >= high {
        return Err(EvalError::type_err(format!(
            "randint() needs low < high, got {} and {}",
            low, high
        )));
    }
    let rng = &mut ctx.rng;
    let values = (0..ctx.rows).map(|_| rng.gen_range(low..high) as f64).collect();
    Ok(Value::Column(values))
}

fn choice(ctx: &mut CallContext, args: Vec<Value>) -> Result<Value, EvalError> {
    if args.is_empty() {
        return Err(EvalError::type_err("choice() needs at least one option"));
    }
    let options = args.iter().map(|a| a.as_scalar()).collect::<Result<Vec<_>, _>>()?;
    let rng = &mut ctx.rng;
    let values = (0..ctx.rows)
        .map(|_| options[rng.gen_range(0..options.len())])
        .collect();
    Ok(Value::Column(values))
}

fn range(ctx: &mut CallContext, args: Vec<Value>) -> Result<Value, EvalError> {
    let [start, step] = scalars(&args)?;
    Ok(Value::Column(
        (0..ctx.rows).map(|i| start + step * i as f64).collect(),
    ))
}

fn linspace(ctx: &mut CallContext, args: Vec<Value>) -> Result<Value, EvalError> {
    let [start, stop] = scalars(&args)?;
    Ok(Value::Column(Array1::linspace(start, stop, ctx.rows)))
}

fn constant(ctx: &mut CallContext, args: Vec<Value>) -> Result<Value, EvalError> {
    let [value] = scalars(&args)?;
    Ok(Value::Column(Array1::from_elem(ctx.rows, value)))
}

fn reduce(args: &[Value], f: impl Fn(&Array1<f64>) -> f64) -> Result<Value, EvalError> {
    let values = args[0].to_values()?;
    Ok(Value::Scalar(f(&values)))
}

fn sum(_ctx: &mut CallContext, args: Vec<Value>) -> Result<Value, EvalError> {
    reduce(&args, |v| v.sum())
}

fn mean(_ctx: &mut CallContext, args: Vec<Value>) -> Result<Value, EvalError> {
    reduce(&args, |v| v.mean().unwrap_or(f64::NAN))
}

fn var(_ctx: &mut CallContext, args: Vec<Value>) -> Result<Value, EvalError> {
    reduce(&args, population_var)
}

fn std_dev(_ctx: &mut CallContext, args: Vec<Value>) -> Result<Value, EvalError> {
    reduce(&args, |v| population_var(v).sqrt())
}

fn population_var(v: &Array1<f64>) -> f64 {
    if v.is_empty() {
        return f64::NAN;
    }
    v.var(0.0)
}

fn min_of(_ctx: &mut CallContext, args: Vec<Value>) -> Result<Value, EvalError> {
    reduce(&args, |v| v.iter().copied().fold(f64::NAN, f64::min))
}

fn max_of(_ctx: &mut CallContext, args: Vec<Value>) -> Result<Value, EvalError> {
    reduce(&args, |v| v.iter().copied().fold(f64::NAN, f64::max))
}

fn len(_ctx: &mut CallContext, args: Vec<Value>) -> Result<Value, EvalError> {
    match &args[0] {
        Value::Table(t) => Ok(Value::Scalar(t.nrows() as f64)),
        Value::Text(s) => Ok(Value::Scalar(s.chars().count() as f64)),
        other => Ok(Value::Scalar(other.to_values()?.len() as f64)),
    }
}

fn norm(_ctx: &mut CallContext, args: Vec<Value>) -> Result<Value, EvalError> {
    reduce(&args, l2_norm)
}

fn l2_norm(v: &Array1<f64>) -> f64 {
    v.dot(v).sqrt()
}

fn cumsum(_ctx: &mut CallContext, args: Vec<Value>) -> Result<Value, EvalError> {
    let mut values = args[0].to_values()?;
    values.accumulate_axis_inplace(ndarray::Axis(0), |&prev, curr| *curr += prev);
    Ok(Value::Column(values))
}

fn clip(_ctx: &mut CallContext, args: Vec<Value>) -> Result<Value, EvalError> {
    let mut args = args.into_iter();
    let x = args.next().unwrap();
    let [low, high] = scalars(&args.collect::<Vec<_>>())?;
    x.map(|v| v.max(low).min(high))
}

fn column(_ctx: &mut CallContext, args: Vec<Value>) -> Result<Value, EvalError> {
    let mut args = args.into_iter();
    let table = args.next().unwrap();
    table.index(args.next().unwrap())
}

fn table_and_names(args: Vec<Value>, fn_name: &str) -> Result<(Table, Vec<String>), EvalError> {
    let mut args = args.into_iter();
    let table = args
        .next()
        .ok_or_else(|| EvalError::type_err(format!("{}() needs a table argument", fn_name)))?
        .into_table()?;
    let names = args
        .map(|a| a.as_text().map(str::to_string))
        .collect::<Result<Vec<_>, _>>()?;
    Ok((table, names))
}

fn select(_ctx: &mut CallContext, args: Vec<Value>) -> Result<Value, EvalError> {
    let (table, names) = table_and_names(args, "select")?;
    let names = names.iter().map(String::as_str).collect::<Vec<_>>();
    Ok(Value::Table(table.select(&names)?))
}

fn drop_columns(_ctx: &mut CallContext, args: Vec<Value>) -> Result<Value, EvalError> {
    let (mut table, names) = table_and_names(args, "drop")?;
    for name in names {
        if table.remove_column(&name).is_none() {
            return Err(EvalError::name(format!("no column named '{}'", name)));
        }
    }
    Ok(Value::Table(table))
}

fn map_columns(
    args: Vec<Value>,
    f: impl Fn(&Array1<f64>) -> Array1<f64>,
) -> Result<Value, EvalError> {
    let mut table = args.into_iter().next().unwrap().into_table()?;
    let names = table.column_names().map(str::to_string).collect::<Vec<_>>();
    for name in names {
        table.map_column(&name, &f)?;
    }
    Ok(Value::Table(table))
}

fn normalize(_ctx: &mut CallContext, args: Vec<Value>) -> Result<Value, EvalError> {
    map_columns(args, |c| {
        let n = l2_norm(c);
        if n == 0.0 {
            c.clone()
        } else {
            c / n
        }
    })
}

fn standardize(_ctx: &mut CallContext, args: Vec<Value>) -> Result<Value, EvalError> {
    map_columns(args, |c| {
        let mean = c.mean().unwrap_or(0.0);
        let std = population_var(c).sqrt();
        if std == 0.0 || std.is_nan() {
            c - mean
        } else {
            (c - mean) / std
        }
    })
}

fn minmax(_ctx: &mut CallContext, args: Vec<Value>) -> Result<Value, EvalError> {
    map_columns(args, |c| {
        let lo = c.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = c.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if hi > lo {
            (c - lo) / (hi - lo)
        } else {
            c.mapv(|_| 0.0)
        }
    })
}

fn head(_ctx: &mut CallContext, args: Vec<Value>) -> Result<Value, EvalError> {
    let n = args[1].as_integer()?;
    if n < 0 {
        return Err(EvalError::type_err("head() needs a non-negative row count"));
    }
    let table = args[0].as_table()?;
    Ok(Value::Table(table.slice_rows(0, n as usize)))
}

fn shuffle(ctx: &mut CallContext, args: Vec<Value>) -> Result<Value, EvalError> {
    let table = args[0].as_table()?;
    let mut rows = (0..table.nrows()).collect::<Vec<_>>();
    rows.shuffle(&mut ctx.rng);
    Ok(Value::Table(table.take_rows(&rows)))
}

fn with_column(_ctx: &mut CallContext, args: Vec<Value>) -> Result<Value, EvalError> {
    let mut args = args.into_iter();
    let mut table = args.next().unwrap().into_table()?;
    let name = args.next().unwrap().as_text()?.to_string();
    let rows = table.nrows();
    let column = args.next().unwrap().into_column(rows)?;
    table.insert_column(name, column)?;
    Ok(Value::Table(table))
}

fn compose(_ctx: &mut CallContext, args: Vec<Value>) -> Result<Value, EvalError> {
    if args.is_empty() {
        return Err(EvalError::type_err("compose() needs at least one function"));
    }
    let funcs = args
        .into_iter()
        .map(Value::into_func)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Value::Func(Func::Compose(funcs)))
}

fn partial(_ctx: &mut CallContext, args: Vec<Value>) -> Result<Value, EvalError> {
    let mut args = args.into_iter();
    let func = args
        .next()
        .ok_or_else(|| EvalError::type_err("partial() needs a function"))?
        .into_func()?;
    Ok(Value::Func(Func::Partial(Box::new(func), args.collect())))
}

fn apply(ctx: &mut CallContext, args: Vec<Value>) -> Result<Value, EvalError> {
    let mut args = args.into_iter();
    let func = args
        .next()
        .ok_or_else(|| EvalError::type_err("apply() needs a function"))?
        .into_func()?;
    func.call(ctx, args.collect())
}

fn merge(_ctx: &mut CallContext, args: Vec<Value>) -> Result<Value, EvalError> {
    let tables = args
        .iter()
        .map(Value::as_table)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Value::Table(Table::concat_rows(tables)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    fn ctx(rows: usize) -> CallContext {
        CallContext::new(rows, Some(7))
    }

    #[test]
    fn named_args_and_defaults() {
        let def = FunctionTable::standard().get("normal").unwrap();
        let args = def
            .bind_args(vec![Value::Scalar(3.0)], vec![("std", Value::Scalar(0.5))])
            .unwrap();
        assert_eq!(args[0].as_scalar().unwrap(), 3.0);
        assert_eq!(args[1].as_scalar().unwrap(), 0.5);

        let args = def.bind_args(vec![], vec![]).unwrap();
        assert_eq!(args[1].as_scalar().unwrap(), 1.0);

        let err = def
            .bind_args(vec![Value::Scalar(1.0)], vec![("mean", Value::Scalar(2.0))])
            .unwrap_err();
        assert!(matches!(err, EvalError::Type(_)));
        let err = def.bind_args(vec![], vec![("sigma", Value::Scalar(2.0))]).unwrap_err();
        assert!(matches!(err, EvalError::Type(_)));
    }

    #[test]
    fn generators_use_row_count() {
        let table = FunctionTable::standard();
        let mut ctx = ctx(5);
        for name in ["uniform", "normal", "range"] {
            let def = table.get(name).unwrap();
            let args = def.bind_args(vec![], vec![]).unwrap();
            let v = def.invoke(&mut ctx, args).unwrap();
            assert_eq!(v.to_values().unwrap().len(), 5, "{}", name);
        }
        let v = uniform(&mut ctx, vec![Value::Scalar(2.0), Value::Scalar(3.0)]).unwrap();
        assert!(v.to_values().unwrap().iter().all(|&x| (2.0..3.0).contains(&x)));
        let v = linspace(&mut ctx, vec![Value::Scalar(0.0), Value::Scalar(1.0)]).unwrap();
        assert_relative_eq!(v.to_values().unwrap(), array![0.0, 0.25, 0.5, 0.75, 1.0]);
        let v = randint(&mut ctx, vec![Value::Scalar(1.0), Value::Scalar(3.0)]).unwrap();
        assert!(v.to_values().unwrap().iter().all(|&x| x == 1.0 || x == 2.0));
        assert!(randint(&mut ctx, vec![Value::Scalar(3.0), Value::Scalar(3.0)]).is_err());
    }

    #[test]
    fn seeded_generators_repeat() {
        let a = normal(&mut ctx(4), vec![Value::Scalar(0.0), Value::Scalar(1.0)]).unwrap();
        let b = normal(&mut ctx(4), vec![Value::Scalar(0.0), Value::Scalar(1.0)]).unwrap();
        assert_eq!(a.to_values().unwrap(), b.to_values().unwrap());
    }

    #[test]
    fn reductions() {
        let x = Value::Column(array![1.0, 2.0, 3.0, 4.0]);
        let mut ctx = ctx(0);
        assert_eq!(sum(&mut ctx, vec![x.clone()]).unwrap().as_scalar().unwrap(), 10.0);
        assert_eq!(mean(&mut ctx, vec![x.clone()]).unwrap().as_scalar().unwrap(), 2.5);
        assert_relative_eq!(var(&mut ctx, vec![x.clone()]).unwrap().as_scalar().unwrap(), 1.25);
        assert_eq!(max_of(&mut ctx, vec![x.clone()]).unwrap().as_scalar().unwrap(), 4.0);
        assert_eq!(min_of(&mut ctx, vec![x.clone()]).unwrap().as_scalar().unwrap(), 1.0);
        let c = cumsum(&mut ctx, vec![x]).unwrap();
        assert_eq!(c.to_values().unwrap(), array![1.0, 3.0, 6.0, 10.0]);
    }

    #[test]
    fn normalize_gives_unit_columns() {
        let table =
            Table::from_columns([("a", array![3.0, 4.0]), ("b", array![0.0, 0.0])]).unwrap();
        let out = normalize(&mut ctx(0), vec![Value::Table(table)]).unwrap().into_table().unwrap();
        assert_relative_eq!(out.column("a").unwrap(), &array![0.6, 0.8]);
        assert_eq!(out.column("b").unwrap(), &array![0.0, 0.0]);
    }

    #[test]
    fn composition() {
        let table = FunctionTable::auxiliary();
        let sqrt = Value::Func(Func::Native(table.get("sqrt").unwrap()));
        let abs = Value::Func(Func::Native(table.get("abs").unwrap()));
        let mut ctx = ctx(0);
        let f = compose(&mut ctx, vec![sqrt, abs]).unwrap();
        let out = apply(&mut ctx, vec![f, Value::Scalar(-16.0)]).unwrap();
        assert_eq!(out.as_scalar().unwrap(), 4.0);

        let pow = Value::Func(Func::Native(table.get("pow").unwrap()));
        let two_to = partial(&mut ctx, vec![pow, Value::Scalar(2.0)]).unwrap();
        let out = two_to.into_func().unwrap().call(&mut ctx, vec![Value::Scalar(3.0)]).unwrap();
        assert_eq!(out.as_scalar().unwrap(), 8.0);
    }

    #[test]
    fn merge_only_in_output_table() {
        assert!(FunctionTable::output().contains("merge"));
        assert!(!FunctionTable::standard().contains("merge"));
        assert!(!FunctionTable::standard().contains("compose"));
        assert!(FunctionTable::auxiliary().functions_as_values());
    }
}
