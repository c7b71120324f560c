use std::boxed::Box;
use std::fmt;

use itertools::Itertools;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StringSpan {
    pub pos_start: usize,
    pub pos_end: usize,
}

impl fmt::Display for StringSpan {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({}, {})", self.pos_start, self.pos_end)
    }
}

#[derive(Debug, Clone)]
pub struct Binop<'a> {
    pub op: char,
    pub left: Box<Ast<'a>>,
    pub right: Box<Ast<'a>>,
}

#[derive(Debug, Clone)]
pub struct Monop<'a> {
    pub op: char,
    pub child: Box<Ast<'a>>,
}

#[derive(Debug, Clone)]
pub struct CallArg<'a> {
    pub name: Option<&'a str>,
    pub expression: Box<Ast<'a>>,
}

#[derive(Debug, Clone)]
pub struct Call<'a> {
    pub fn_name: &'a str,
    pub args: Vec<CallArg<'a>>,
}

#[derive(Debug, Clone)]
pub struct Index<'a> {
    pub target: Box<Ast<'a>>,
    pub index: Box<Ast<'a>>,
}

#[derive(Debug, Clone)]
pub enum AstKind<'a> {
    Binop(Binop<'a>),
    Monop(Monop<'a>),
    Call(Call<'a>),
    Index(Index<'a>),
    Number(f64),
    Str(&'a str),
    Name(&'a str),
}

impl<'a> AstKind<'a> {
    pub fn as_call(&self) -> Option<&Call<'a>> {
        match self {
            AstKind::Call(c) => Some(c),
            _ => None,
        }
    }
    pub fn as_real(&self) -> Option<f64> {
        match self {
            AstKind::Number(v) => Some(*v),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Ast<'a> {
    pub kind: AstKind<'a>,
    pub span: Option<StringSpan>,
}

impl<'a> Ast<'a> {
    /// names this expression reads from the scope, in order of first appearance.
    /// Call targets are not included.
    pub fn get_dependents(&self) -> Vec<&'a str> {
        let mut deps = Vec::new();
        self.collect_deps(&mut deps);
        deps
    }

    fn collect_deps(&self, deps: &mut Vec<&'a str>) {
        match &self.kind {
            AstKind::Binop(binop) => {
                binop.left.collect_deps(deps);
                binop.right.collect_deps(deps);
            }
            AstKind::Monop(monop) => monop.child.collect_deps(deps),
            AstKind::Call(call) => {
                for arg in &call.args {
                    arg.expression.collect_deps(deps);
                }
            }
            AstKind::Index(index) => {
                index.target.collect_deps(deps);
                index.index.collect_deps(deps);
            }
            AstKind::Name(name) => {
                if !deps.contains(name) {
                    deps.push(*name);
                }
            }
            AstKind::Number(_) | AstKind::Str(_) => (),
        }
    }
}

impl<'a> fmt::Display for Ast<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.kind {
            AstKind::Binop(binop) => {
                // parenthesise nested binops so the printed form keeps its grouping
                let fmt_child = |child: &Ast| match child.kind {
                    AstKind::Binop(_) => format!("({})", child),
                    _ => child.to_string(),
                };
                write!(
                    f,
                    "{} {} {}",
                    fmt_child(&binop.left),
                    binop.op,
                    fmt_child(&binop.right)
                )
            }
            AstKind::Monop(monop) => write!(f, "{}{}", monop.op, monop.child),
            AstKind::Call(call) => {
                let args = call.args.iter().format_with(", ", |arg, g| match arg.name {
                    Some(name) => g(&format_args!("{}={}", name, arg.expression)),
                    None => g(&arg.expression),
                });
                write!(f, "{}({})", call.fn_name, args)
            }
            AstKind::Index(index) => write!(f, "{}[{}]", index.target, index.index),
            AstKind::Number(num) => write!(f, "{}", num),
            AstKind::Str(s) => write!(f, "'{}'", s),
            AstKind::Name(name) => write!(f, "{}", name),
        }
    }
}
