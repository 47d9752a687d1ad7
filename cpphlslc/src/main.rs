use std::error;
use std::fmt;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use std::process;
use docopt::Docopt;
use serde::Deserialize;
use cpphlsl_shared::FileSystemReader;
use cpphlsl_sequence_interpreter::{HlslFileType, InterpretError, Interpreter, TypeTables};

const USAGE: &'static str = "
CppHlsl C++ to HLSL type generator

Usage:
  cpphlslc [options] [--cbuffer <name>...] [--type <mapping>...] [--semantic <mapping>...] [-I <include_path>...] <source-file>
  cpphlslc --help

Options:
  -h --help              Show help.
  --kind <kind>          Output kind, one of stream, cbuffer or structured [default: stream].
  --cbuffer <name>       Emit only the named types as constant buffers, registers in the order given.
  --type <mapping>       Extra type mapping written as CppType=hlsltype.
  --semantic <mapping>   Extra semantic alias written as SEMANTIC=ALIAS.
  --layout               Print the input layout of every type instead of HLSL.
  -o <output_file>       Output file.
  -I <include_path>      Path to search for the source file in.
";

#[derive(Debug, Deserialize)]
#[allow(non_snake_case)]
struct Args {
    flag_kind: String,
    flag_cbuffer: Vec<String>,
    flag_type: Vec<String>,
    flag_semantic: Vec<String>,
    flag_layout: bool,
    flag_o: Option<String>,
    flag_I: Vec<String>,
    arg_source_file: String,
}

#[derive(Debug)]
enum CliError {
    UnknownKind(String),
    BadMapping(String),
    IncludePathNotDirectory(String),
    Interpret(InterpretError),
    FailedToWrite(String),
}

impl error::Error for CliError {}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            CliError::UnknownKind(ref kind) => write!(f, "unknown output kind '{}'", kind),
            CliError::BadMapping(ref mapping) => write!(f, "mapping '{}' is not of the form from=to", mapping),
            CliError::IncludePathNotDirectory(ref path) => write!(f, "include path '{}' is not a directory", path),
            CliError::Interpret(ref err) => write!(f, "{}", err),
            CliError::FailedToWrite(ref path) => write!(f, "failed to write output file '{}'", path),
        }
    }
}

impl From<InterpretError> for CliError {
    fn from(err: InterpretError) -> CliError {
        CliError::Interpret(err)
    }
}

fn parse_kind(kind: &str) -> Result<HlslFileType, CliError> {
    match kind {
        "stream" => Ok(HlslFileType::StreamData),
        "cbuffer" => Ok(HlslFileType::ConstantBuffers),
        "structured" => Ok(HlslFileType::StructuredBuffers),
        _ => Err(CliError::UnknownKind(kind.to_string())),
    }
}

fn split_mapping(mapping: &str) -> Result<(&str, &str), CliError> {
    match mapping.split_once('=') {
        Some((from, to)) if !from.is_empty() && !to.is_empty() => Ok((from, to)),
        _ => Err(CliError::BadMapping(mapping.to_string())),
    }
}

fn build_tables(types: &[String], semantics: &[String]) -> Result<TypeTables, CliError> {
    let mut tables = TypeTables::default();
    for mapping in types {
        let (from, to) = split_mapping(mapping)?;
        tables = tables.with_type(from, to);
    }
    for mapping in semantics {
        let (from, to) = split_mapping(mapping)?;
        tables = tables.with_semantic_alias(from, to);
    }
    Ok(tables)
}

fn layout_string(interpreter: &Interpreter) -> String {
    let mut output = String::new();
    for index in 0..interpreter.type_meta_data_count() {
        let ty = match interpreter.type_meta_data(index) {
            Some(ty) => ty,
            None => continue,
        };
        if interpreter.tables().is_built_in(&ty.name) {
            continue;
        }
        output.push_str(&ty.qualified_name());
        output.push('\n');
        for element in ty.input_elements(interpreter.tables()) {
            output.push_str(&format!("\t{} {} slot {} step {}\n",
                                     element.semantic_name,
                                     element.type_name,
                                     element.input_slot,
                                     element.instance_data_step_rate));
        }
    }
    output
}

fn run(args: Args) -> Result<(), CliError> {
    let Args {
        flag_kind,
        flag_cbuffer: flag_cbuffers,
        flag_type: flag_types,
        flag_semantic: flag_semantics,
        flag_layout,
        flag_o: flag_output_file,
        flag_I: flag_include_paths,
        arg_source_file,
    } = args;

    let kind = parse_kind(&flag_kind)?;
    let tables = build_tables(&flag_types, &flag_semantics)?;

    for path in &flag_include_paths {
        if !PathBuf::from(path).is_dir() {
            return Err(CliError::IncludePathNotDirectory(path.clone()));
        }
    }
    let mut reader = FileSystemReader::new();
    reader.search_paths = flag_include_paths;

    let mut interpreter = Interpreter::with_tables(Box::new(reader), tables);
    let report = interpreter.parse_file(&arg_source_file)?;
    for error in &report.errors {
        match interpreter.error_location(error) {
            Some(location) => eprintln!("{}: {}", location, error),
            None => eprintln!("{}: {}", arg_source_file, error),
        }
    }

    let output = if flag_layout {
        layout_string(&interpreter)
    } else if !flag_cbuffers.is_empty() {
        interpreter.generate_constant_buffers(&flag_cbuffers)?.to_string()
    } else {
        interpreter.generate_hlsl_string(kind).to_string()
    };

    match flag_output_file {
        Some(output_file) => {
            let mut file = File::create(&output_file).map_err(|_| CliError::FailedToWrite(output_file.clone()))?;
            file.write_all(output.as_bytes()).map_err(|_| CliError::FailedToWrite(output_file.clone()))?;
            log::info!("wrote {} bytes to {}", output.len(), output_file);
        }
        None => print!("{}", output),
    }
    Ok(())
}

fn main() {
    env_logger::init();

    let args: Args = Docopt::new(USAGE).and_then(|d| d.deserialize()).unwrap_or_else(|e| e.exit());
    if let Err(err) = run(args) {
        eprintln!("Error: {}", err);
        process::exit(1);
    }
}

#[test]
fn test_parse_kind() {
    assert_eq!(parse_kind("stream").ok(), Some(HlslFileType::StreamData));
    assert_eq!(parse_kind("cbuffer").ok(), Some(HlslFileType::ConstantBuffers));
    assert_eq!(parse_kind("structured").ok(), Some(HlslFileType::StructuredBuffers));
    assert!(matches!(parse_kind("Stream"), Err(CliError::UnknownKind(ref kind)) if kind == "Stream"));
    assert!(matches!(parse_kind(""), Err(CliError::UnknownKind(_))));
}

#[test]
fn test_split_mapping() {
    assert_eq!(split_mapping("Vec4=float4").ok(), Some(("Vec4", "float4")));
    assert_eq!(split_mapping("A=B=C").ok(), Some(("A", "B=C")));
    for mapping in &["Vec4", "=float4", "Vec4=", "="] {
        assert!(matches!(split_mapping(mapping), Err(CliError::BadMapping(ref m)) if m == *mapping),
                "accepted '{}'", mapping);
    }
}

#[test]
fn test_build_tables() {
    let types = vec!["Vec4=float4".to_string()];
    let semantics = vec!["COLOR=COLOR0".to_string()];
    let tables = build_tables(&types, &semantics).unwrap();
    assert_eq!(tables.hlsl_type("Vec4"), "float4");
    assert_eq!(tables.hlsl_type("Float3"), "float3");
    assert_eq!(tables.semantic("COLOR"), "COLOR0");
    assert_eq!(tables.semantic("POSITION"), "SV_POSITION");

    let bad = vec!["COLOR".to_string()];
    assert!(matches!(build_tables(&types, &bad), Err(CliError::BadMapping(_))));
}
