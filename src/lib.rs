//! Turns annotated C++ struct declarations into HLSL definitions and type
//! metadata
//!
//! The stages are separate crates, re-exported here under one name. Most
//! users only need [`Interpreter`].

pub mod shared {
    pub use cpphlsl_shared::*;
}

pub mod symbols {
    pub use cpphlsl_lang_symbols::*;
}

pub mod meta {
    pub use cpphlsl_lang_meta::*;
}

pub mod lexer {
    pub use cpphlsl_transform_lexer::*;
}

pub mod parser {
    pub use cpphlsl_transform_parser::*;
}

pub mod hlsl_printer {
    pub use cpphlsl_transform_hlsl_printer::*;
}

pub use cpphlsl_sequence_interpreter::*;

#[cfg(test)]
mod tests;
