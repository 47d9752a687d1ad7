extern crate cpphlsl_shared;
extern crate cpphlsl_lang_symbols;
extern crate nom;

mod lexer;

pub use lexer::lex;
