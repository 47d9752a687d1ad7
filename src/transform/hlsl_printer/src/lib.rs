extern crate cpphlsl_lang_meta;

mod printer;

pub use printer::HlslPrinter;
