use crate::{HlslFileType, Interpreter, NullSourceReader};

const RENDER_TYPES: &'static str = include_str!("render_types.h");

fn assert_hlsl(generated: &str, expected: &'static str) {
    let expected = expected.replace("\r\n", "\n");
    for (line, expected_line) in generated.lines().zip(expected.lines()) {
        assert_eq!(line, expected_line);
    }
    assert_eq!(generated, expected);
}

fn run_full(source: &'static str, kind: HlslFileType, hlsl: &'static str) {
    let mut interpreter = Interpreter::new(Box::new(NullSourceReader));
    let report = interpreter.parse_source("render_types.h", source);
    assert!(report.is_clean(), "{:?}", report.errors);
    assert_hlsl(interpreter.generate_hlsl_string(kind), hlsl);
}

#[test]
fn render_types_stream_data() {
    const HLSL: &'static str = include_str!("render_types_stream.hlsl");
    run_full(RENDER_TYPES, HlslFileType::StreamData, HLSL);
}

#[test]
fn render_types_constant_buffers() {
    const HLSL: &'static str = include_str!("render_types_cbuffer.hlsl");
    run_full(RENDER_TYPES, HlslFileType::ConstantBuffers, HLSL);
}

#[test]
fn render_types_structured_buffers() {
    const HLSL: &'static str = include_str!("render_types_structured.hlsl");
    run_full(RENDER_TYPES, HlslFileType::StructuredBuffers, HLSL);
}

#[test]
fn render_types_metadata() {
    let mut interpreter = Interpreter::new(Box::new(NullSourceReader));
    let _ = interpreter.parse_source("render_types.h", RENDER_TYPES);
    assert_eq!(interpreter.type_meta_data_count(), 3);

    let frame = interpreter.type_meta_data_by_name("FrameConstants").unwrap();
    assert_eq!(frame.qualified_name(), "Render::Shaders::FrameConstants");
    assert_eq!(frame.custom.register_index, Some(0));

    let instance = interpreter.type_meta_data_by_name("PerInstance").unwrap();
    assert!(instance.is_instance_data());
    assert_eq!(instance.custom.input_slot, 1);

    let layout = interpreter.input_layout("Vertex").unwrap();
    let slots = layout.iter().map(|e| (&e.semantic_name[..], e.input_slot)).collect::<Vec<_>>();
    assert_eq!(slots, vec![
        ("SV_POSITION", 0),
        ("NORMAL", 0),
        ("TEXCOORD0", 0),
        ("BONEINDICES", 0),
        ("WORLD", 1),
        ("COLOR", 1),
    ]);
}

#[test]
fn requested_constant_buffers_follow_request_order() {
    let mut interpreter = Interpreter::new(Box::new(NullSourceReader));
    let _ = interpreter.parse_source("render_types.h", RENDER_TYPES);
    let hlsl = interpreter.generate_constant_buffers(&["FrameConstants", "PerInstance"]).unwrap();
    assert_hlsl(hlsl, "cbuffer FrameConstants : register(b0)\n{\n\tfloat4x4 _viewProjection;\n\t\
                       float3 _cameraPosition;\n\tfloat _time;\n};\n\n\
                       cbuffer PerInstance : register(b1)\n{\n\tfloat4x4 _world;\n\tfloat4 _tint;\n};\n");
}

#[test]
fn field_order_follows_declarations() {
    let mut interpreter = Interpreter::new(Box::new(NullSourceReader));
    let _ = interpreter.parse_source("a.h", "namespace N { struct S { Float4 _c; Float2 _a; Float3 _b; }; }");
    assert_hlsl(interpreter.generate_hlsl_string(HlslFileType::StructuredBuffers),
                "struct S\n{\n\tfloat4 _c;\n\tfloat2 _a;\n\tfloat3 _b;\n};\n");
    let _ = interpreter.parse_source("b.h", "namespace N { struct S { Float3 _b; Float4 _c; Float2 _a; }; }");
    assert_hlsl(interpreter.generate_hlsl_string(HlslFileType::StructuredBuffers),
                "struct S\n{\n\tfloat3 _b;\n\tfloat4 _c;\n\tfloat2 _a;\n};\n");
}

#[test]
fn annotated_semantic_is_kept() {
    let mut interpreter = Interpreter::new(Box::new(NullSourceReader));
    let report = interpreter.parse_source("vs.h",
                                          "namespace NS { struct VS_INPUT { float4 _pos CPP_HLSL_SEMANTIC_NAME(SV_POSITION); uint _id; }; }");
    assert!(report.is_clean());
    assert_hlsl(interpreter.generate_hlsl_string(HlslFileType::StreamData),
                "struct VS_INPUT\n{\n\tfloat4 _pos : SV_POSITION;\n\tuint _id : ID;\n};\n");
}
