//! The XMLUI scripting language: tokens, lexer, AST and parser.

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod token;

pub use lexer::{tokenize, ScriptLexer, StartingPhase};
pub use parser::{parse_expression, parse_script, ExpressionParseResult, ScriptParseResult, ScriptParser};
pub use token::{Token, TokenKind};
