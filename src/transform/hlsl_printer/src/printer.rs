use cpphlsl_lang_meta::*;

struct Printer {
    indent: u32,
    buffer: String,
}

impl Printer {
    fn new() -> Printer {
        Printer {
            indent: 0,
            buffer: String::new(),
        }
    }

    fn print(&mut self, string: &str) {
        self.buffer.push_str(string);
    }

    fn space(&mut self) {
        self.buffer.push_str(" ");
    }

    fn indent(&mut self) {
        self.indent = self.indent + 1;
    }

    fn unindent(&mut self) {
        assert!(self.indent > 0);
        self.indent = self.indent - 1;
    }

    fn line(&mut self) {
        self.buffer.push_str("\n");
        for _ in 0..self.indent {
            self.buffer.push_str("\t");
        }
    }

    fn into_string(self) -> String {
        self.buffer
    }
}

/// Emits HLSL definitions from type metadata
pub struct HlslPrinter<'t> {
    tables: &'t TypeTables,
}

impl<'t> HlslPrinter<'t> {
    pub fn new(tables: &'t TypeTables) -> HlslPrinter<'t> {
        HlslPrinter { tables: tables }
    }

    /// Vertex shader input struct, one `type name : SEMANTIC;` line per field
    /// followed by the fields of any slotted streams
    pub fn to_stream_datum(&self, ty: &TypeMetaData) -> String {
        let mut printer = Printer::new();
        printer.print("struct ");
        printer.print(&ty.name);
        self.print_body(ty, true, &mut printer);
        printer.into_string()
    }

    pub fn to_constant_buffer(&self, ty: &TypeMetaData, buffer_index: u32) -> String {
        let mut printer = Printer::new();
        printer.print("cbuffer ");
        printer.print(&ty.name);
        printer.print(&format!(" : register(b{})", buffer_index));
        self.print_body(ty, false, &mut printer);
        printer.into_string()
    }

    /// Element type of a structured buffer. The buffer is bound by the
    /// runtime so no register is written.
    pub fn to_structured_buffer_definition(&self, ty: &TypeMetaData) -> String {
        let mut printer = Printer::new();
        printer.print("struct ");
        printer.print(&ty.name);
        self.print_body(ty, false, &mut printer);
        printer.into_string()
    }

    fn print_body(&self, ty: &TypeMetaData, semantics: bool, printer: &mut Printer) {
        printer.line();
        printer.print("{");
        printer.indent();
        for member in &ty.members {
            self.print_field(member, semantics, printer);
        }
        if semantics {
            for slotted in &ty.custom.slotted_stream_data {
                for member in &slotted.members {
                    self.print_field(member, semantics, printer);
                }
            }
        }
        printer.unindent();
        printer.line();
        printer.print("};");
        printer.line();
    }

    fn print_field(&self, field: &TypeMetaData, semantic: bool, printer: &mut Printer) {
        printer.line();
        printer.print(self.tables.hlsl_type(&field.type_name));
        printer.space();
        printer.print(&field.name);
        if let Some(len) = field.array_len {
            printer.print(&format!("[{}]", len));
        }
        if semantic {
            printer.print(" : ");
            printer.print(self.tables.semantic(field.semantic_name()));
        }
        printer.print(";");
    }
}

#[cfg(test)]
fn vs_input() -> TypeMetaData {
    let mut ty = TypeMetaData::new_struct("VS_INPUT", vec![]);
    ty.members.push(TypeMetaData::new_field("Float3", "_position", "POSITION"));
    ty.members.push(TypeMetaData::new_field("Float2", "_uv", "UV"));
    ty.members.push(TypeMetaData::new_field("unsigned int", "_id", "ID"));
    ty
}

#[test]
fn test_stream_datum() {
    let tables = TypeTables::default();
    let printer = HlslPrinter::new(&tables);
    assert_eq!(printer.to_stream_datum(&vs_input()),
               "struct VS_INPUT\n{\n\tfloat3 _position : SV_POSITION;\n\tfloat2 _uv : UV;\n\tuint _id : ID;\n};\n");
}

#[test]
fn test_stream_datum_field_lines() {
    let tables = TypeTables::default();
    let printer = HlslPrinter::new(&tables);
    let ty = vs_input();
    let text = printer.to_stream_datum(&ty);
    let field_lines = text.lines().filter(|line| line.starts_with('\t')).collect::<Vec<_>>();
    assert_eq!(field_lines.len(), ty.members.len());
    for (line, member) in field_lines.iter().zip(ty.members.iter()) {
        assert!(line.ends_with(&format!(": {};", tables.semantic(member.semantic_name()))), "{}", line);
    }
}

#[test]
fn test_stream_datum_with_slotted_stream() {
    let mut instance = TypeMetaData::new_struct("PerInstance", vec![]);
    instance.custom.input_slot = 1;
    instance.custom.instance_data_step_rate = 1;
    instance.members.push(TypeMetaData::new_field("Float4x4", "_world", "WORLD"));
    let mut ty = vs_input();
    ty.custom.slotted_stream_data.push(instance);

    let tables = TypeTables::default();
    let printer = HlslPrinter::new(&tables);
    assert_eq!(printer.to_stream_datum(&ty),
               "struct VS_INPUT\n{\n\tfloat3 _position : SV_POSITION;\n\tfloat2 _uv : UV;\n\tuint _id : ID;\n\tfloat4x4 _world : WORLD;\n};\n");
}

#[test]
fn test_constant_buffer() {
    let mut ty = TypeMetaData::new_struct("Camera", vec![]);
    ty.members.push(TypeMetaData::new_field("Float4x4", "_viewProjection", "VIEWPROJECTION"));
    let mut bones = TypeMetaData::new_field("Float4x4", "_bones", "BONES");
    bones.array_len = Some(4);
    ty.members.push(bones);

    let tables = TypeTables::default();
    let printer = HlslPrinter::new(&tables);
    assert_eq!(printer.to_constant_buffer(&ty, 2),
               "cbuffer Camera : register(b2)\n{\n\tfloat4x4 _viewProjection;\n\tfloat4x4 _bones[4];\n};\n");
}

#[test]
fn test_structured_buffer_definition() {
    let tables = TypeTables::default();
    let printer = HlslPrinter::new(&tables);
    let text = printer.to_structured_buffer_definition(&vs_input());
    assert_eq!(text, "struct VS_INPUT\n{\n\tfloat3 _position;\n\tfloat2 _uv;\n\tuint _id;\n};\n");
    assert!(!text.contains("register"));
}

#[test]
fn test_injected_tables() {
    let tables = TypeTables::empty().with_type("Vec3", "half3").with_semantic_alias("UV", "TEXCOORD0");
    let printer = HlslPrinter::new(&tables);
    let mut ty = TypeMetaData::new_struct("V", vec![]);
    ty.members.push(TypeMetaData::new_field("Vec3", "_normal", "NORMAL"));
    ty.members.push(TypeMetaData::new_field("Float2", "_uv", "UV"));
    assert_eq!(printer.to_stream_datum(&ty),
               "struct V\n{\n\thalf3 _normal : NORMAL;\n\tFloat2 _uv : TEXCOORD0;\n};\n");
}
