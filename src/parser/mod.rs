pub mod expr_parser;
pub use expr_parser::ExprParser;
pub use expr_parser::Rule;

use pest::error::Error;

use crate::ast;

pub fn parse_expr_string(text: &str) -> Result<ast::Ast<'_>, Box<Error<Rule>>> {
    expr_parser::parse_string(text)
}
