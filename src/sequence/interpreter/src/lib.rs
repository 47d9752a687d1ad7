//! Reads annotated C++ struct declarations and turns them into HLSL source
//! and type metadata for building vertex layouts and binding buffers

use std::any::TypeId;
use std::error;
use std::fmt;
use cpphlsl_shared::{File, FileLocation, LineMap, ReadError};
use cpphlsl_lang_symbols::Symbols;
use cpphlsl_transform_hlsl_printer::HlslPrinter;
use cpphlsl_transform_parser::ParseOutput;

pub use cpphlsl_shared::{FileSystemReader, NullSourceReader, SourceReader};
pub use cpphlsl_lang_meta::{InputElement, SyntaxTree, TypeMetaData, TypeTables};
pub use cpphlsl_transform_parser::{ErrorMessage, ErrorType};

#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum HlslFileType {
    StreamData,
    ConstantBuffers,
    StructuredBuffers,
}

#[derive(PartialEq, Debug, Clone)]
pub enum InterpretError {
    FailedToOpen(ReadError),
    UnknownType(String),
}

impl error::Error for InterpretError {}

impl fmt::Display for InterpretError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            InterpretError::FailedToOpen(ref read_error) => write!(f, "{}", read_error),
            InterpretError::UnknownType(ref name) => write!(f, "unknown type '{}'", name),
        }
    }
}

impl From<ReadError> for InterpretError {
    fn from(err: ReadError) -> InterpretError {
        InterpretError::FailedToOpen(err)
    }
}

/// Errors found while parsing a source
#[must_use]
#[derive(PartialEq, Debug, Clone)]
pub struct ParseReport {
    pub errors: Vec<ErrorMessage>,
    pub type_count: usize,
}

impl ParseReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// A Rust type mirroring a struct declared in a parsed source
pub trait CppHlslType: 'static {
    const DECLARED_NAME: &'static str;
}

struct Parsed {
    line_map: LineMap,
    symbols: Symbols,
    output: ParseOutput,
}

pub struct Interpreter {
    reader: Box<dyn SourceReader>,
    tables: TypeTables,
    parsed: Option<Parsed>,
    identities: Vec<(TypeId, String)>,
    hlsl_string: String,
}

impl Interpreter {
    pub fn new(reader: Box<dyn SourceReader>) -> Interpreter {
        Interpreter::with_tables(reader, TypeTables::default())
    }

    pub fn with_tables(reader: Box<dyn SourceReader>, tables: TypeTables) -> Interpreter {
        Interpreter {
            reader: reader,
            tables: tables,
            parsed: None,
            identities: vec![],
            hlsl_string: String::new(),
        }
    }

    pub fn tables(&self) -> &TypeTables {
        &self.tables
    }

    /// Load, lex and parse a file, replacing everything from earlier parses.
    /// When the file can not be read nothing is replaced.
    pub fn parse_file(&mut self, path: &str) -> Result<ParseReport, InterpretError> {
        let source = match self.reader.read(path) {
            Ok(source) => source,
            Err(err) => {
                log::error!("{}", err);
                return Err(InterpretError::from(err));
            }
        };
        Ok(self.parse_source(path, &source))
    }

    /// Lex and parse source text, replacing everything from earlier parses
    pub fn parse_source(&mut self, name: &str, source: &str) -> ParseReport {
        let symbols = cpphlsl_transform_lexer::lex(source);
        let mut output = cpphlsl_transform_parser::parse(&symbols);
        for &(identity, ref declared_name) in &self.identities {
            output.types.bind_identity(declared_name, identity);
        }
        let line_map = LineMap::new(File::Name(name.to_string()), source);
        for error in &output.errors {
            match line_map.get_file_location(&error.offset) {
                Ok(location) => log::warn!("{}: {}", location, error),
                Err(()) => log::warn!("{}: {}", name, error),
            }
        }
        log::debug!("{}: {} symbols, {} types", name, symbols.len(), output.types.len());

        let report = ParseReport {
            errors: output.errors.clone(),
            type_count: output.types.len(),
        };
        self.parsed = Some(Parsed {
            line_map: line_map,
            symbols: symbols,
            output: output,
        });
        report
    }

    /// Errors from the last parse
    pub fn errors(&self) -> &[ErrorMessage] {
        match self.parsed {
            Some(ref parsed) => &parsed.output.errors,
            None => &[],
        }
    }

    pub fn error_location(&self, error: &ErrorMessage) -> Option<FileLocation> {
        self.parsed.as_ref().and_then(|parsed| parsed.line_map.get_file_location(&error.offset).ok())
    }

    pub fn symbols(&self) -> Option<&Symbols> {
        self.parsed.as_ref().map(|parsed| &parsed.symbols)
    }

    pub fn syntax_tree(&self) -> Option<&SyntaxTree> {
        self.parsed.as_ref().map(|parsed| &parsed.output.tree)
    }

    fn user_types(&self) -> Vec<&TypeMetaData> {
        match self.parsed {
            Some(ref parsed) => {
                parsed.output.types.iter().filter(|ty| !self.tables.is_built_in(&ty.name)).collect()
            }
            None => vec![],
        }
    }

    /// Emit every parsed type, except ones named in the type table, in the
    /// order they were found. Constant buffers take registers in that order.
    pub fn generate_hlsl_string(&mut self, kind: HlslFileType) -> &str {
        let printer = HlslPrinter::new(&self.tables);
        let definitions = self.user_types()
            .iter()
            .enumerate()
            .map(|(index, ty)| {
                match kind {
                    HlslFileType::StreamData => printer.to_stream_datum(ty),
                    HlslFileType::ConstantBuffers => printer.to_constant_buffer(ty, index as u32),
                    HlslFileType::StructuredBuffers => printer.to_structured_buffer_definition(ty),
                }
            })
            .collect::<Vec<_>>();
        self.hlsl_string = definitions.join("\n");
        &self.hlsl_string
    }

    /// Emit the named types as constant buffers with registers `b0..` given
    /// in request order
    pub fn generate_constant_buffers<S: AsRef<str>>(&mut self, names: &[S]) -> Result<&str, InterpretError> {
        let mut definitions = Vec::with_capacity(names.len());
        {
            let printer = HlslPrinter::new(&self.tables);
            for (index, name) in names.iter().enumerate() {
                let ty = match self.type_meta_data_by_name(name.as_ref()) {
                    Some(ty) => ty,
                    None => return Err(InterpretError::UnknownType(name.as_ref().to_string())),
                };
                definitions.push(printer.to_constant_buffer(ty, index as u32));
            }
        }
        self.hlsl_string = definitions.join("\n");
        Ok(&self.hlsl_string)
    }

    /// The string built by the last generate call
    pub fn hlsl_string(&self) -> &str {
        &self.hlsl_string
    }

    pub fn type_meta_data_count(&self) -> usize {
        match self.parsed {
            Some(ref parsed) => parsed.output.types.len(),
            None => 0,
        }
    }

    pub fn type_meta_data(&self, index: usize) -> Option<&TypeMetaData> {
        self.parsed.as_ref().and_then(|parsed| parsed.output.types.get(index))
    }

    pub fn type_meta_data_by_name(&self, name: &str) -> Option<&TypeMetaData> {
        self.parsed.as_ref().and_then(|parsed| parsed.output.types.get_by_name(name))
    }

    pub fn type_meta_data_of<T: 'static>(&self) -> Option<&TypeMetaData> {
        let identity = TypeId::of::<T>();
        self.parsed.as_ref().and_then(|parsed| parsed.output.types.get_by_identity(identity))
    }

    /// Tie a Rust type to the struct declared under a name. Kept across
    /// parses.
    pub fn register_type<T: 'static>(&mut self, declared_name: &str) {
        let identity = TypeId::of::<T>();
        self.identities.retain(|&(registered, _)| registered != identity);
        self.identities.push((identity, declared_name.to_string()));
        if let Some(ref mut parsed) = self.parsed {
            parsed.output.types.bind_identity(declared_name, identity);
        }
    }

    pub fn register<T: CppHlslType>(&mut self) {
        self.register_type::<T>(T::DECLARED_NAME)
    }

    /// Vertex layout elements of a stream data type, including its slotted
    /// streams
    pub fn input_layout(&self, name: &str) -> Option<Vec<InputElement>> {
        self.type_meta_data_by_name(name).map(|ty| ty.input_elements(&self.tables))
    }
}

#[cfg(test)]
mod tests;
