extern crate cpphlsl_shared;
extern crate cpphlsl_lang_symbols;
extern crate cpphlsl_lang_meta;
#[cfg(test)]
extern crate cpphlsl_transform_lexer;

mod kernel;
mod grammar;

pub use kernel::ErrorMessage;
pub use kernel::ErrorType;
pub use kernel::GrouperMatch;
pub use kernel::ParserKernel;
pub use grammar::parse;
pub use grammar::derive_semantic_name;
pub use grammar::ParseOutput;
