use std::collections::HashMap;
use super::*;

struct MemoryReader {
    files: HashMap<String, String>,
}

impl MemoryReader {
    fn with(files: &[(&str, &str)]) -> Box<MemoryReader> {
        Box::new(MemoryReader {
            files: files.iter().map(|&(path, text)| (path.to_string(), text.to_string())).collect(),
        })
    }
}

impl SourceReader for MemoryReader {
    fn read(&self, path: &str) -> Result<String, ReadError> {
        match self.files.get(path) {
            Some(text) => Ok(text.clone()),
            None => Err(ReadError::NotFound(path.to_string())),
        }
    }
}

const SHADER_TYPES: &str = "#pragma once
namespace Shaders
{
    struct Float3 { float _x; float _y; float _z; };

    struct VS_INPUT
    {
        Float3 _position;
        Float2 _uv CPP_HLSL_SEMANTIC_NAME(TEXCOORD0);
    };

    struct PerFrame
    {
        Float4x4 _viewProjection;
        Float4 _time;
    };

    struct PerObject
    {
        Float4x4 _world;
    };
}
";

struct VsInput;

impl CppHlslType for VsInput {
    const DECLARED_NAME: &'static str = "VS_INPUT";
}

struct PerFrame;

fn loaded() -> Interpreter {
    let mut interpreter = Interpreter::new(MemoryReader::with(&[("shader_types.h", SHADER_TYPES)]));
    let report = interpreter.parse_file("shader_types.h").expect("file is in memory");
    assert!(report.is_clean(), "{:?}", report.errors);
    interpreter
}

#[test_log::test]
fn test_parse_file_records_types() {
    let interpreter = loaded();
    assert_eq!(interpreter.type_meta_data_count(), 4);
    let names = (0..interpreter.type_meta_data_count())
        .map(|index| interpreter.type_meta_data(index).unwrap().name.clone())
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["Float3", "VS_INPUT", "PerFrame", "PerObject"]);
    assert!(interpreter.type_meta_data(4).is_none());
    assert_eq!(interpreter.type_meta_data_by_name("PerFrame").unwrap().members.len(), 2);
    assert!(interpreter.type_meta_data_by_name("Missing").is_none());
}

#[test_log::test]
fn test_missing_file_keeps_state() {
    let mut interpreter = loaded();
    let result = interpreter.parse_file("missing.h");
    assert_eq!(result, Err(InterpretError::FailedToOpen(ReadError::NotFound("missing.h".to_string()))));
    assert_eq!(interpreter.type_meta_data_count(), 4);

    let mut empty = Interpreter::new(Box::new(NullSourceReader));
    assert!(empty.parse_file("shader_types.h").is_err());
    assert_eq!(empty.type_meta_data_count(), 0);
    assert!(empty.errors().is_empty());
}

#[test_log::test]
fn test_stream_data() {
    let mut interpreter = loaded();
    let hlsl = interpreter.generate_hlsl_string(HlslFileType::StreamData).to_string();
    assert_eq!(hlsl, "struct VS_INPUT\n{\n\tfloat3 _position : SV_POSITION;\n\tfloat2 _uv : TEXCOORD0;\n};\n\
                      \nstruct PerFrame\n{\n\tfloat4x4 _viewProjection : VIEWPROJECTION;\n\tfloat4 _time : TIME;\n};\n\
                      \nstruct PerObject\n{\n\tfloat4x4 _world : WORLD;\n};\n");
    assert_eq!(interpreter.hlsl_string(), hlsl);
}

#[test_log::test]
fn test_constant_buffers_in_discovery_order() {
    let mut interpreter = loaded();
    let hlsl = interpreter.generate_hlsl_string(HlslFileType::ConstantBuffers).to_string();
    assert!(hlsl.starts_with("cbuffer VS_INPUT : register(b0)\n{\n\tfloat3 _position;\n"));
    assert!(hlsl.contains("cbuffer PerFrame : register(b1)\n"));
    assert!(hlsl.contains("cbuffer PerObject : register(b2)\n"));
    assert!(!hlsl.contains("Float3"));
}

#[test_log::test]
fn test_structured_buffers() {
    let mut interpreter = loaded();
    let hlsl = interpreter.generate_hlsl_string(HlslFileType::StructuredBuffers).to_string();
    assert!(hlsl.contains("struct PerObject\n{\n\tfloat4x4 _world;\n};\n"));
    assert!(!hlsl.contains("register"));
    assert!(!hlsl.contains(" : "));
}

#[test_log::test]
fn test_generation_is_repeatable() {
    let mut interpreter = loaded();
    let first = interpreter.generate_hlsl_string(HlslFileType::StreamData).to_string();
    let second = interpreter.generate_hlsl_string(HlslFileType::StreamData).to_string();
    assert_eq!(first, second);
}

#[test_log::test]
fn test_selected_constant_buffers() {
    let mut interpreter = loaded();
    let hlsl = interpreter.generate_constant_buffers(&["PerObject", "PerFrame"]).unwrap().to_string();
    assert!(hlsl.starts_with("cbuffer PerObject : register(b0)\n"));
    assert!(hlsl.contains("\ncbuffer PerFrame : register(b1)\n"));
    assert!(!hlsl.contains("VS_INPUT"));

    let error = interpreter.generate_constant_buffers(&["PerFrame", "Lights"]);
    assert_eq!(error, Err(InterpretError::UnknownType("Lights".to_string())));
    // The failed request leaves the last string in place
    assert_eq!(interpreter.hlsl_string(), hlsl);
}

#[test_log::test]
fn test_registration() {
    let mut interpreter = loaded();
    assert!(interpreter.type_meta_data_of::<VsInput>().is_none());
    interpreter.register::<VsInput>();
    interpreter.register_type::<PerFrame>("PerFrame");
    assert_eq!(interpreter.type_meta_data_of::<VsInput>().unwrap().name, "VS_INPUT");
    assert_eq!(interpreter.type_meta_data_of::<PerFrame>().unwrap().name, "PerFrame");

    // Survives parsing again
    let report = interpreter.parse_file("shader_types.h").unwrap();
    assert!(report.is_clean());
    assert_eq!(interpreter.type_meta_data_of::<VsInput>().unwrap().name, "VS_INPUT");

    // Moving a registration replaces the old binding
    interpreter.register_type::<PerFrame>("PerObject");
    assert_eq!(interpreter.type_meta_data_of::<PerFrame>().unwrap().name, "PerObject");
    assert_eq!(interpreter.type_meta_data_by_name("PerFrame").unwrap().identity, None);
    let report = interpreter.parse_source("shader_types.h", SHADER_TYPES);
    assert!(report.is_clean());
    assert_eq!(interpreter.type_meta_data_of::<PerFrame>().unwrap().name, "PerObject");
}

#[test_log::test]
fn test_registration_before_parse() {
    let mut interpreter = Interpreter::new(MemoryReader::with(&[("shader_types.h", SHADER_TYPES)]));
    interpreter.register::<VsInput>();
    assert!(interpreter.type_meta_data_of::<VsInput>().is_none());
    let _ = interpreter.parse_file("shader_types.h").unwrap();
    assert_eq!(interpreter.type_meta_data_of::<VsInput>().unwrap().name, "VS_INPUT");
}

#[test_log::test]
fn test_parse_errors_are_located() {
    let mut interpreter = Interpreter::new(Box::new(NullSourceReader));
    let report = interpreter.parse_source("broken.h", "namespace N\n{\n    struct S { float _x };\n}\n");
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].kind, ErrorType::WrongSuccessor);
    assert_eq!(interpreter.errors(), &report.errors[..]);
    let location = interpreter.error_location(&report.errors[0]).unwrap();
    assert_eq!(location.0, File::Name("broken.h".to_string()));
    assert_eq!((location.1).0, 3);
}

#[test_log::test]
fn test_reparse_replaces_types() {
    let mut interpreter = loaded();
    let report = interpreter.parse_source("other.h", "namespace N { struct Only { Float4 _color; }; }");
    assert_eq!(report.type_count, 1);
    assert_eq!(interpreter.type_meta_data_count(), 1);
    assert!(interpreter.type_meta_data_by_name("PerFrame").is_none());
}

#[test_log::test]
fn test_input_layout() {
    let mut interpreter = Interpreter::new(Box::new(NullSourceReader));
    let report = interpreter.parse_source("layout.h", "namespace N {
        struct Vertex CPP_HLSL_SLOTTED_STREAM(Instance) { Float3 _position; Float2 _uv; };
        struct Instance CPP_HLSL_INPUT_SLOT(1) CPP_HLSL_INSTANCE_DATA(1) { Float4x4 _world; };
    }");
    assert!(report.is_clean());
    let layout = interpreter.input_layout("Vertex").unwrap();
    let summary = layout.iter()
        .map(|e| (&e.semantic_name[..], &e.type_name[..], e.input_slot, e.instance_data_step_rate))
        .collect::<Vec<_>>();
    assert_eq!(summary, vec![
        ("SV_POSITION", "float3", 0, 0),
        ("UV", "float2", 0, 0),
        ("WORLD", "float4x4", 1, 1),
    ]);
    assert!(interpreter.input_layout("Missing").is_none());

    let hlsl = interpreter.generate_hlsl_string(HlslFileType::StreamData).to_string();
    assert!(hlsl.starts_with("struct Vertex\n{\n\tfloat3 _position : SV_POSITION;\n\tfloat2 _uv : UV;\n\tfloat4x4 _world : WORLD;\n};\n"));
}

#[test_log::test]
fn test_custom_tables() {
    let tables = TypeTables::empty().with_type("Vec4", "float4").with_semantic_alias("COLOR", "COLOR0");
    let mut interpreter = Interpreter::with_tables(Box::new(NullSourceReader), tables);
    let _ = interpreter.parse_source("custom.h", "namespace N { struct Vec4 { float x; }; struct Pixel { Vec4 _color; Float2 _uv; }; }");
    let hlsl = interpreter.generate_hlsl_string(HlslFileType::StreamData).to_string();
    assert_eq!(hlsl, "struct Pixel\n{\n\tfloat4 _color : COLOR0;\n\tFloat2 _uv : UV;\n};\n");
}

#[test]
fn test_nothing_parsed() {
    let mut interpreter = Interpreter::new(Box::new(NullSourceReader));
    assert_eq!(interpreter.type_meta_data_count(), 0);
    assert_eq!(interpreter.generate_hlsl_string(HlslFileType::ConstantBuffers), "");
    assert!(interpreter.symbols().is_none());
    assert!(interpreter.syntax_tree().is_none());
}
