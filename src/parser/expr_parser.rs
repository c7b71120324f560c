#![allow(clippy::empty_docs)]
#[derive(Parser)]
#[grammar = "parser/expr_grammar.pest"] // relative to src
pub struct ExprParser;

use pest::error::Error;
use pest::iterators::Pair;
use pest::Parser;
use std::boxed::Box;

use crate::ast;
use crate::ast::Ast;
use crate::ast::AstKind;
use crate::ast::StringSpan;

//sign       = @{ "-" | "+" }
//factor_op  = @{ ("*" ~ !"*") | "/" }
fn parse_sign(pair: Pair<Rule>) -> char {
    match pair.as_rule() {
        Rule::pow_op => '^',
        _ => pair.as_str().chars().next().unwrap(),
    }
}

//name       = @{ (ASCII_ALPHA | "_") ~ (ASCII_ALPHANUMERIC | "_")* }
fn parse_name(pair: Pair<Rule>) -> &str {
    pair.as_str()
}

fn span_of(pair: &Pair<Rule>) -> Option<StringSpan> {
    Some(StringSpan {
        pos_start: pair.as_span().start(),
        pos_end: pair.as_span().end(),
    })
}

fn join_spans(left: &Ast, right: &Ast) -> Option<StringSpan> {
    match (left.span, right.span) {
        (Some(l), Some(r)) => Some(StringSpan {
            pos_start: l.pos_start,
            pos_end: r.pos_end,
        }),
        _ => None,
    }
}

fn fold_binops<'a>(mut inner: pest::iterators::Pairs<'a, Rule>) -> Ast<'a> {
    let mut head = parse_value(inner.next().unwrap());
    while inner.peek().is_some() {
        let op = parse_sign(inner.next().unwrap());
        let rhs = parse_value(inner.next().unwrap());
        let span = join_spans(&head, &rhs);
        head = Ast {
            kind: AstKind::Binop(ast::Binop {
                op,
                left: Box::new(head),
                right: Box::new(rhs),
            }),
            span,
        };
    }
    head
}

fn parse_value(pair: Pair<'_, Rule>) -> Ast<'_> {
    let span = span_of(&pair);
    match pair.as_rule() {
        Rule::name => Ast {
            kind: AstKind::Name(parse_name(pair)),
            span,
        },

        // real       = @{ digits ~ ("." ~ digits)? ~ exponent? }
        Rule::real => Ast {
            kind: AstKind::Number(pair.as_str().parse().unwrap()),
            span,
        },

        // string     = @{ "\"" ~ .. ~ "\"" | "'" ~ .. ~ "'" }
        Rule::string => {
            let quoted = pair.as_str();
            Ast {
                kind: AstKind::Str(&quoted[1..quoted.len() - 1]),
                span,
            }
        }

        // call       = { name ~ "(" ~ (call_arg ~ ("," ~ call_arg)*)? ~ ")" }
        Rule::call => {
            let mut inner = pair.into_inner();
            let fn_name = parse_name(inner.next().unwrap());
            let args = inner
                .map(|arg| {
                    //call_arg   = { (name ~ "=")? ~ expression }
                    let mut arg_inner = arg.into_inner();
                    let name = if arg_inner.peek().unwrap().as_rule() == Rule::name {
                        Some(parse_name(arg_inner.next().unwrap()))
                    } else {
                        None
                    };
                    ast::CallArg {
                        name,
                        expression: Box::new(parse_value(arg_inner.next().unwrap())),
                    }
                })
                .collect();
            Ast {
                kind: AstKind::Call(ast::Call { fn_name, args }),
                span,
            }
        }

        // expression = { term ~ (term_op ~ term)* }
        // term       = { factor ~ (factor_op ~ factor)* }
        Rule::expression | Rule::term => fold_binops(pair.into_inner()),

        // factor     = { sign ~ factor | power }
        Rule::factor => {
            let mut inner = pair.into_inner();
            let first = inner.next().unwrap();
            if first.as_rule() == Rule::sign {
                let op = parse_sign(first);
                let child = parse_value(inner.next().unwrap());
                Ast {
                    kind: AstKind::Monop(ast::Monop {
                        op,
                        child: Box::new(child),
                    }),
                    span,
                }
            } else {
                parse_value(first)
            }
        }

        // power      = { postfix ~ (pow_op ~ factor)? }
        Rule::power => fold_binops(pair.into_inner()),

        // postfix    = { primary ~ index* }
        Rule::postfix => {
            let mut inner = pair.into_inner();
            let mut head = parse_value(inner.next().unwrap());
            for index in inner {
                let index_span = span_of(&index);
                let index = parse_value(index.into_inner().next().unwrap());
                let span = match (head.span, index_span) {
                    (Some(l), Some(r)) => Some(StringSpan {
                        pos_start: l.pos_start,
                        pos_end: r.pos_end,
                    }),
                    _ => None,
                };
                head = Ast {
                    kind: AstKind::Index(ast::Index {
                        target: Box::new(head),
                        index: Box::new(index),
                    }),
                    span,
                };
            }
            head
        }

        // primary    = { call | string | real | name | "(" ~ expression ~ ")" }
        Rule::primary => parse_value(pair.into_inner().next().unwrap()),

        _ => unreachable!("{:?}", pair.to_string()),
    }
}

pub fn parse_string(text: &str) -> Result<Ast<'_>, Box<Error<Rule>>> {
    let main = ExprParser::parse(Rule::main, text)?.next().unwrap();
    Ok(parse_value(main.into_inner().next().unwrap()))
}
