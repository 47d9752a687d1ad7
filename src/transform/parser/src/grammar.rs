use std::mem;
use cpphlsl_lang_symbols::*;
use cpphlsl_lang_meta::*;
use crate::kernel::*;

const SEMANTIC_NAME: &str = "CPP_HLSL_SEMANTIC_NAME";
const REGISTER_INDEX: &str = "CPP_HLSL_REGISTER_INDEX";
const INPUT_SLOT: &str = "CPP_HLSL_INPUT_SLOT";
const INSTANCE_DATA: &str = "CPP_HLSL_INSTANCE_DATA";
const SLOTTED_STREAM: &str = "CPP_HLSL_SLOTTED_STREAM";

fn is_annotation(symbol: &Symbol) -> bool {
    symbol.classifier == SymbolClassifier::Identifier && symbol.text.starts_with("CPP_HLSL_")
}

/// Default semantic of a field: drop the leading underscore and upper case
/// the rest, so `_worldPosition` becomes `WORLDPOSITION`
pub fn derive_semantic_name(field_name: &str) -> String {
    let stripped = match field_name.strip_prefix('_') {
        Some(rest) => rest,
        None => field_name,
    };
    stripped.to_uppercase()
}

/// Everything built by one parse
#[derive(PartialEq, Debug, Clone)]
pub struct ParseOutput {
    pub tree: SyntaxTree,
    pub types: TypeRegistry,
    pub errors: Vec<ErrorMessage>,
}

/// Outcome of a grammar rule: whether it matched and how many symbols it
/// consumed from the position it was given
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
struct Step {
    success: bool,
    advance: usize,
}

impl Step {
    fn matched(advance: usize) -> Step {
        Step { success: true, advance: advance }
    }

    fn failed(advance: usize) -> Step {
        Step { success: false, advance: advance }
    }
}

/// Slotted stream requests of one struct waiting for their types
struct PendingSlots {
    owner: usize,
    names: Vec<String>,
}

struct CppHlslParser<'a> {
    kernel: ParserKernel<'a>,
    types: TypeRegistry,
    pending: Vec<PendingSlots>,
    /// Types whose `{` has been seen but not their `}`, innermost last
    open_structs: Vec<usize>,
}

/// Parse namespace and struct declarations out of a symbol stream
///
/// Errors do not stop the parse; everything that could be built is returned
/// alongside them.
pub fn parse(symbols: &Symbols) -> ParseOutput {
    let mut parser = CppHlslParser {
        kernel: ParserKernel::new(symbols),
        types: TypeRegistry::new(),
        pending: vec![],
        open_structs: vec![],
    };
    parser.parse_code();
    let CppHlslParser { kernel, types, .. } = parser;
    let (tree, errors) = kernel.finish();
    log::debug!("parsed {} types with {} errors", types.len(), errors.len());
    ParseOutput {
        tree: tree,
        types: types,
        errors: errors,
    }
}

impl<'a> CppHlslParser<'a> {
    fn parse_code(&mut self) {
        let root = self.kernel.root();
        while self.kernel.need_to_continue_parsing() {
            let position = self.kernel.position();
            let step = if self.kernel.current().is_keyword("namespace") {
                self.parse_namespace(position, root, &[])
            } else {
                Step::matched(1)
            };
            assert!(step.advance > 0, "rule at symbol {} did not advance", position);
            if !self.kernel.advance(step.advance) {
                let end = self.kernel.symbol_count();
                self.kernel.advance_to(end);
            }
        }
        self.resolve_pending_slots();
    }

    fn at(&self, position: usize, text: &str) -> bool {
        position < self.kernel.symbol_count() && self.kernel.symbol_at(position).is(text)
    }

    fn classifier_at(&self, position: usize) -> Option<SymbolClassifier> {
        if position < self.kernel.symbol_count() {
            Some(self.kernel.symbol_at(position).classifier)
        } else {
            None
        }
    }

    fn wrong_successor(&mut self, position: usize, expected: &str) {
        let found = self.kernel.describe(position);
        self.kernel.report_error(position,
                                 ErrorType::WrongSuccessor,
                                 Some(format!("expected {} but found {}", expected, found)));
    }

    /// `namespace A[::B...] { ... }`
    fn parse_namespace(&mut self, position: usize, parent: NodeId, namespace: &[String]) -> Step {
        let mut path = namespace.to_vec();
        let mut next = position + 1;
        let name_index = next;
        loop {
            if self.classifier_at(next) != Some(SymbolClassifier::Identifier) {
                self.wrong_successor(next, "namespace name");
                return Step::failed(1);
            }
            path.push(self.kernel.symbol_at(next).text.clone());
            next += 1;
            if self.at(next, "::") {
                next += 1;
            } else {
                break;
            }
        }
        if !self.at(next, "{") {
            self.wrong_successor(next, "'{'");
            return Step::failed(1);
        }
        let open = next;
        let node = self.kernel.add_node(parent, SyntaxClassifier::Namespace, name_index);

        let mut current = open + 1;
        loop {
            if current >= self.kernel.symbol_count() {
                self.kernel.report_error(open,
                                         ErrorType::NoMatchingGrouper,
                                         Some(format!("namespace {} is never closed", path.join("::"))));
                return Step::failed(current - position);
            }
            let symbol = self.kernel.symbol_at(current);
            let step = if symbol.is("}") {
                return Step::matched(current + 1 - position);
            } else if symbol.is_keyword("namespace") {
                self.parse_namespace(current, node, &path)
            } else if symbol.is_keyword("struct") {
                self.parse_struct(current, node, &path)
            } else if symbol.classifier == SymbolClassifier::GrouperOpen {
                self.skip_group(current)
            } else if symbol.classifier == SymbolClassifier::GrouperClose {
                self.kernel.report_error(current,
                                         ErrorType::GrouperMismatch,
                                         Some(format!("expected '}}' but found '{}'", symbol.text)));
                Step::failed(1)
            } else {
                Step::matched(1)
            };
            current += step.advance;
        }
    }

    /// Step over a balanced group that the grammar has no interest in
    fn skip_group(&mut self, open: usize) -> Step {
        match self.kernel.find_matching_grouper(open) {
            GrouperMatch::Matched(close) => Step::matched(close + 1 - open),
            GrouperMatch::Mismatch(close) => {
                let expected = closing_grouper(&self.kernel.symbol_at(open).text).unwrap_or("?");
                let found = self.kernel.symbol_at(close).text.clone();
                self.kernel.report_error(close,
                                         ErrorType::GrouperMismatch,
                                         Some(format!("expected '{}' but found '{}'", expected, found)));
                // A stray `}` is left for the enclosing scope to close itself with
                if found == "}" {
                    Step::failed(close - open)
                } else {
                    Step::failed(close + 1 - open)
                }
            }
            GrouperMatch::Unmatched => {
                let open_text = self.kernel.symbol_at(open).text.clone();
                self.kernel.report_error(open,
                                         ErrorType::NoMatchingGrouper,
                                         Some(format!("'{}' is never closed", open_text)));
                Step::failed(self.kernel.symbol_count() - open)
            }
        }
    }

    /// `struct Name [annotations] { members } ;`
    fn parse_struct(&mut self, position: usize, parent: NodeId, namespace: &[String]) -> Step {
        let name_index = position + 1;
        if self.classifier_at(name_index) != Some(SymbolClassifier::Identifier) {
            self.wrong_successor(name_index, "struct name");
            return Step::failed(1);
        }
        let name = self.kernel.symbol_at(name_index).text.clone();

        // Forward declaration
        if self.at(name_index + 1, ";") {
            return Step::matched(3);
        }

        let node = self.kernel.add_node(parent, SyntaxClassifier::Struct, name_index);
        let mut meta = TypeMetaData::new_struct(&name, namespace.to_vec());
        let mut slot_names = vec![];

        let mut current = name_index + 1;
        while current < self.kernel.symbol_count() && is_annotation(self.kernel.symbol_at(current)) {
            let step = self.parse_custom_syntax(current, node, &mut meta, &mut slot_names);
            if !step.success {
                return Step::failed(current - position);
            }
            current += step.advance;
        }
        if !self.at(current, "{") {
            self.wrong_successor(current, &format!("'{{' to open struct {}", name));
            return Step::failed(current - position);
        }
        let open = current;
        let owner = self.types.insert(meta);
        self.open_structs.push(owner);

        let mut nested = namespace.to_vec();
        nested.push(name.clone());

        current = open + 1;
        let close = loop {
            if current >= self.kernel.symbol_count() {
                self.kernel.report_error(open,
                                         ErrorType::NoMatchingGrouper,
                                         Some(format!("struct {} is never closed", name)));
                self.open_structs.pop();
                self.build_type_meta_data(owner, slot_names);
                return Step::failed(current - position);
            }
            let symbol = self.kernel.symbol_at(current);
            let step = if symbol.is("}") {
                break current;
            } else if symbol.is_keyword("struct") {
                self.parse_struct(current, node, &nested)
            } else if symbol.classifier == SymbolClassifier::GrouperClose {
                self.kernel.report_error(current,
                                         ErrorType::GrouperMismatch,
                                         Some(format!("expected '}}' but found '{}'", symbol.text)));
                Step::failed(1)
            } else if symbol.is(";") {
                Step::matched(1)
            } else if (symbol.is_keyword("public") || symbol.is_keyword("private") ||
                       symbol.is_keyword("protected")) && self.at(current + 1, ":") {
                Step::matched(2)
            } else {
                self.parse_struct_member(current, node, owner)
            };
            current += step.advance;
        };

        self.open_structs.pop();
        self.build_type_meta_data(owner, slot_names);

        if self.at(close + 1, ";") {
            Step::matched(close + 2 - position)
        } else {
            self.wrong_successor(close + 1, &format!("';' after struct {}", name));
            Step::failed(close + 1 - position)
        }
    }

    /// `Type _name [ '[' N ']' ] [CPP_HLSL_SEMANTIC_NAME(SEMANTIC)] ;`
    fn parse_struct_member(&mut self, position: usize, parent: NodeId, owner: usize) -> Step {
        // Words of the type followed by the field name. `scoped[i]` is set
        // when word i is joined to the one before it by `::`.
        let mut words = vec![];
        let mut scoped = vec![];
        let mut after_scope = false;
        let mut current = position;
        while current < self.kernel.symbol_count() {
            let symbol = self.kernel.symbol_at(current);
            if symbol.classifier.is_word() && !is_annotation(symbol) {
                words.push(current);
                scoped.push(after_scope);
                after_scope = false;
            } else if symbol.is("::") && !words.is_empty() && !after_scope {
                after_scope = true;
            } else {
                break;
            }
            current += 1;
        }
        if words.len() < 2 || after_scope || scoped[words.len() - 1] {
            self.wrong_successor(current, "a member declaration");
            return self.recover_member(position, current);
        }
        let name_index = words[words.len() - 1];
        if self.kernel.symbol_at(name_index).classifier != SymbolClassifier::Identifier {
            self.wrong_successor(name_index, "a field name");
            return self.recover_member(position, name_index + 1);
        }
        let mut type_name = String::new();
        for (word, &index) in words[..words.len() - 1].iter().enumerate() {
            if word > 0 {
                type_name.push_str(if scoped[word] { "::" } else { " " });
            }
            type_name.push_str(&self.kernel.symbol_at(index).text);
        }
        let field_name = self.kernel.symbol_at(name_index).text.clone();

        let mut array_len = None;
        if self.at(current, "[") {
            let length = if self.classifier_at(current + 1) == Some(SymbolClassifier::NumberLiteral) {
                self.kernel.symbol_at(current + 1).text.parse::<u32>().ok()
            } else {
                None
            };
            match length {
                Some(length) if self.at(current + 2, "]") => {
                    array_len = Some(length);
                    current += 3;
                }
                _ => {
                    self.wrong_successor(current + 1, &format!("an array length for {}", field_name));
                    return self.recover_member(position, current + 1);
                }
            }
        }

        let mut semantic_index = None;
        if current < self.kernel.symbol_count() && is_annotation(self.kernel.symbol_at(current)) {
            if !self.kernel.symbol_at(current).is(SEMANTIC_NAME) {
                self.wrong_successor(current, &format!("{} on field {}", SEMANTIC_NAME, field_name));
                return self.recover_member(position, current + 1);
            }
            if !self.at(current + 1, "(") ||
               self.classifier_at(current + 2) != Some(SymbolClassifier::Identifier) ||
               !self.at(current + 3, ")") {
                self.wrong_successor(current + 1, &format!("({}) around a semantic name", SEMANTIC_NAME));
                return self.recover_member(position, current + 1);
            }
            semantic_index = Some(current + 2);
            current += 4;
        }

        if !self.at(current, ";") {
            self.wrong_successor(current, &format!("';' after member {}", field_name));
            return self.recover_member(position, current);
        }
        if semantic_index.is_none() && derive_semantic_name(&field_name).is_empty() {
            self.wrong_successor(name_index, &format!("{} on field {}", SEMANTIC_NAME, field_name));
            return self.recover_member(position, current);
        }

        let variable = self.kernel.add_node(parent, SyntaxClassifier::Variable, name_index);
        self.kernel.add_node(variable, SyntaxClassifier::DataType, words[0]);
        let semantic_name = match semantic_index {
            Some(index) => {
                self.kernel.add_node(variable, SyntaxClassifier::SemanticName, index);
                self.kernel.symbol_at(index).text.clone()
            }
            None => derive_semantic_name(&field_name),
        };

        let mut field = TypeMetaData::new_field(&type_name, &field_name, &semantic_name);
        field.array_len = array_len;
        if let Some(meta) = self.types.get_mut(owner) {
            meta.members.push(field);
        }
        Step::matched(current + 1 - position)
    }

    /// Skip a broken member up to its `;`, up to the end of an inline body,
    /// or up to the `}` closing the struct
    fn recover_member(&mut self, position: usize, from: usize) -> Step {
        let mut current = from;
        loop {
            let end = self.kernel.find_forward_either(current, ";", "}");
            let group = self.kernel.find_forward_either(current, "{", "(");
            match (end, group) {
                (Some(end), Some(group)) if group < end => {
                    let close = match self.kernel.find_matching_grouper(group) {
                        GrouperMatch::Matched(close) => close,
                        GrouperMatch::Mismatch(close) => return Step::failed((close - position).max(1)),
                        GrouperMatch::Unmatched => return Step::failed(self.kernel.symbol_count() - position),
                    };
                    if self.kernel.symbol_at(group).is("{") {
                        let consumed = if self.at(close + 1, ";") { close + 2 } else { close + 1 };
                        return Step::failed(consumed - position);
                    }
                    current = close + 1;
                }
                (Some(end), _) => {
                    let consumed = if self.kernel.symbol_at(end).is(";") { end + 1 } else { end };
                    return Step::failed((consumed - position).max(1));
                }
                (None, _) => return Step::failed(self.kernel.symbol_count() - position),
            }
        }
    }

    /// Struct level annotations, written between the struct name and `{`:
    ///
    /// ```text
    /// CPP_HLSL_REGISTER_INDEX(<number>)
    /// CPP_HLSL_INPUT_SLOT(<number>)
    /// CPP_HLSL_INSTANCE_DATA(<step rate>)
    /// CPP_HLSL_SLOTTED_STREAM(<struct name>)
    /// ```
    fn parse_custom_syntax(&mut self,
                           position: usize,
                           parent: NodeId,
                           meta: &mut TypeMetaData,
                           slot_names: &mut Vec<String>)
                           -> Step {
        let annotation = self.kernel.symbol_at(position).text.clone();
        let argument = position + 2;
        if !self.at(position + 1, "(") || argument >= self.kernel.symbol_count() ||
           !self.at(argument + 1, ")") {
            self.wrong_successor(position + 1, &format!("a single argument to {}", annotation));
            return Step::failed(1);
        }
        let argument_symbol = self.kernel.symbol_at(argument);
        let number = match argument_symbol.classifier {
            SymbolClassifier::NumberLiteral => argument_symbol.text.parse::<u32>().ok(),
            _ => None,
        };

        let classifier = match (&annotation[..], number) {
            (REGISTER_INDEX, Some(index)) => {
                meta.custom.register_index = Some(index);
                SyntaxClassifier::RegisterIndex
            }
            (INPUT_SLOT, Some(slot)) => {
                meta.custom.input_slot = slot;
                SyntaxClassifier::InputSlot
            }
            (INSTANCE_DATA, Some(rate)) => {
                meta.custom.instance_data_step_rate = rate;
                SyntaxClassifier::InstanceData
            }
            (SLOTTED_STREAM, None) if argument_symbol.classifier == SymbolClassifier::Identifier => {
                slot_names.push(argument_symbol.text.clone());
                SyntaxClassifier::SlottedStream
            }
            (REGISTER_INDEX, None) | (INPUT_SLOT, None) | (INSTANCE_DATA, None) => {
                self.wrong_successor(argument, &format!("an unsigned integer in {}", annotation));
                return Step::failed(1);
            }
            (SLOTTED_STREAM, _) => {
                self.wrong_successor(argument, &format!("a struct name in {}", annotation));
                return Step::failed(1);
            }
            _ => {
                self.wrong_successor(position, "a struct annotation or '{'");
                return Step::failed(1);
            }
        };
        self.kernel.add_node(parent, classifier, argument);
        Step::matched(4)
    }

    /// Attach slotted stream types to a struct that has just been closed.
    /// Requests naming types not declared yet, or still open around this
    /// one, wait for the end of the parse.
    fn build_type_meta_data(&mut self, owner: usize, slot_names: Vec<String>) {
        if slot_names.is_empty() {
            return;
        }
        let complete = |name: &String| match self.types.index_of(name) {
            Some(target) => !self.open_structs.contains(&target),
            None => false,
        };
        if slot_names.iter().all(complete) {
            self.resolve_slots(owner, slot_names);
        } else {
            self.pending.push(PendingSlots {
                owner: owner,
                names: slot_names,
            });
        }
    }

    fn resolve_pending_slots(&mut self) {
        for pending in mem::take(&mut self.pending) {
            self.resolve_slots(pending.owner, pending.names);
        }
    }

    fn resolve_slots(&mut self, owner: usize, slot_names: Vec<String>) {
        let owner_name = match self.types.get(owner) {
            Some(meta) => meta.name.clone(),
            None => return,
        };
        for name in slot_names {
            let slotted = match self.types.index_of(&name) {
                Some(target) if target == owner => {
                    log::warn!("struct {} lists itself as slotted stream data, ignored", owner_name);
                    continue;
                }
                Some(target) => self.types.get(target).cloned(),
                None => {
                    log::warn!("slotted stream {} of struct {} was never declared, ignored", name, owner_name);
                    continue;
                }
            };
            if let (Some(slotted), Some(meta)) = (slotted, self.types.get_mut(owner)) {
                meta.custom.slotted_stream_data.push(slotted);
            }
        }
    }
}

#[cfg(test)]
fn parse_str(source: &str) -> ParseOutput {
    parse(&cpphlsl_transform_lexer::lex(source))
}

#[cfg(test)]
fn fields(ty: &TypeMetaData) -> Vec<(&str, &str, &str)> {
    ty.members.iter().map(|m| (&m.type_name[..], &m.name[..], m.semantic_name())).collect()
}

#[test]
fn test_derive_semantic_name() {
    assert_eq!(derive_semantic_name("_worldPosition"), "WORLDPOSITION");
    assert_eq!(derive_semantic_name("_pos"), "POS");
    assert_eq!(derive_semantic_name("color"), "COLOR");
    assert_eq!(derive_semantic_name("_uv0"), "UV0");
}

#[test]
fn test_parse_struct_members() {
    let output = parse_str("namespace NS { struct VS_INPUT { float4 _pos CPP_HLSL_SEMANTIC_NAME(SV_POSITION); uint _id; }; }");
    assert_eq!(output.errors, vec![]);
    assert_eq!(output.types.len(), 1);
    let ty = output.types.get(0).unwrap();
    assert_eq!(ty.name, "VS_INPUT");
    assert_eq!(ty.namespace, vec!["NS".to_string()]);
    assert_eq!(fields(ty), vec![("float4", "_pos", "SV_POSITION"), ("uint", "_id", "ID")]);
}

#[test]
fn test_parse_multi_word_types() {
    let output = parse_str("namespace A::B { struct S { unsigned int _count; Math::Float4 _color; Float4x4 _bones[64]; }; }");
    assert_eq!(output.errors, vec![]);
    let ty = output.types.get_by_name("S").unwrap();
    assert_eq!(ty.namespace, vec!["A".to_string(), "B".to_string()]);
    assert_eq!(fields(ty), vec![
        ("unsigned int", "_count", "COUNT"),
        ("Math::Float4", "_color", "COLOR"),
        ("Float4x4", "_bones", "BONES"),
    ]);
    assert_eq!(ty.members[2].array_len, Some(64));
    assert_eq!(ty.members[0].array_len, None);
}

#[test]
fn test_parse_keeps_declaration_order() {
    let forward = parse_str("namespace N { struct S { Float2 _b; Float3 _a; Float4 _c; }; }");
    let reversed = parse_str("namespace N { struct S { Float4 _c; Float3 _a; Float2 _b; }; }");
    let names = |output: &ParseOutput| {
        output.types.get(0).unwrap().members.iter().map(|m| m.name.clone()).collect::<Vec<_>>()
    };
    assert_eq!(names(&forward), vec!["_b", "_a", "_c"]);
    assert_eq!(names(&reversed), vec!["_c", "_a", "_b"]);
}

#[test]
fn test_top_level_is_permissive() {
    let output = parse_str("#pragma once\n#include \"Math.h\"\nstruct Outside { float _x; };\nstatic int value = 3;\nnamespace N { struct Inside { float _y; }; }");
    assert_eq!(output.errors, vec![]);
    assert_eq!(output.types.len(), 1);
    assert_eq!(output.types.get(0).unwrap().name, "Inside");
}

#[test]
fn test_namespace_skips_other_declarations() {
    let output = parse_str("namespace N { struct Fwd; void f(int a) { if (a) { return; } } static const int k[2] = { 1, 2 }; struct S { float _x; }; }");
    assert_eq!(output.errors, vec![]);
    assert_eq!(output.types.len(), 1);
    assert_eq!(output.types.get(0).unwrap().name, "S");
}

#[test]
fn test_unmatched_namespace_brace() {
    let output = parse_str("namespace NS { struct A { float4 _a; };");
    assert_eq!(output.errors.len(), 1);
    assert_eq!(output.errors[0].kind, ErrorType::NoMatchingGrouper);
    assert_eq!(output.errors[0].offset.0, 13);
    // Metadata built before the failure is kept
    assert_eq!(output.types.len(), 1);
    assert_eq!(output.types.get(0).unwrap().members.len(), 1);
}

#[test]
fn test_unmatched_struct_brace() {
    let output = parse_str("namespace NS { struct A { float4 _a; }");
    let kinds = output.errors.iter().map(|e| e.kind).collect::<Vec<_>>();
    assert_eq!(kinds, vec![ErrorType::WrongSuccessor, ErrorType::NoMatchingGrouper]);
}

#[test]
fn test_member_wrong_successor() {
    let output = parse_str("namespace N { struct S { float4 _a, _b; Float2 _uv; float4 Get() const { return _a; } float _c }; }");
    let kinds = output.errors.iter().map(|e| e.kind).collect::<Vec<_>>();
    assert_eq!(kinds, vec![ErrorType::WrongSuccessor, ErrorType::WrongSuccessor, ErrorType::WrongSuccessor]);
    let ty = output.types.get(0).unwrap();
    assert_eq!(fields(ty), vec![("Float2", "_uv", "UV")]);
}

#[test]
fn test_grouper_mismatch() {
    let output = parse_str("namespace N { ) struct S { float _x; ] }; void f( ]; }");
    let kinds = output.errors.iter().map(|e| e.kind).collect::<Vec<_>>();
    assert_eq!(kinds, vec![ErrorType::GrouperMismatch, ErrorType::GrouperMismatch, ErrorType::GrouperMismatch]);
    assert_eq!(output.types.len(), 1);
    assert_eq!(output.types.get(0).unwrap().members.len(), 1);
}

#[test]
fn test_custom_syntax() {
    let output = parse_str("namespace N {
        struct PerInstance CPP_HLSL_INPUT_SLOT(1) CPP_HLSL_INSTANCE_DATA(1) { Float4x4 _world; };
        struct Vertex CPP_HLSL_SLOTTED_STREAM(PerInstance) { Float3 _position; };
        struct Constants CPP_HLSL_REGISTER_INDEX(3) { Float4x4 _viewProjection; };
    }");
    assert_eq!(output.errors, vec![]);

    let instance = output.types.get_by_name("PerInstance").unwrap();
    assert_eq!(instance.custom.input_slot, 1);
    assert_eq!(instance.custom.instance_data_step_rate, 1);
    assert!(instance.is_instance_data());

    let vertex = output.types.get_by_name("Vertex").unwrap();
    assert_eq!(vertex.custom.input_slot, 0);
    assert_eq!(vertex.custom.slotted_stream_data.len(), 1);
    assert_eq!(vertex.custom.slotted_stream_data[0].name, "PerInstance");
    assert_eq!(vertex.custom.slotted_stream_data[0].members[0].name, "_world");

    let constants = output.types.get_by_name("Constants").unwrap();
    assert_eq!(constants.custom.register_index, Some(3));

    assert_eq!(output.tree.find_all(SyntaxClassifier::InputSlot).len(), 1);
    assert_eq!(output.tree.find_all(SyntaxClassifier::InstanceData).len(), 1);
    assert_eq!(output.tree.find_all(SyntaxClassifier::SlottedStream).len(), 1);
    assert_eq!(output.tree.find_all(SyntaxClassifier::RegisterIndex).len(), 1);
}

#[test]
fn test_slotted_stream_declared_later() {
    let output = parse_str("namespace N {
        struct Vertex CPP_HLSL_SLOTTED_STREAM(Missing) CPP_HLSL_SLOTTED_STREAM(PerInstance) { Float3 _position; };
        struct PerInstance CPP_HLSL_INPUT_SLOT(1) { Float4 _tint; };
    }");
    assert_eq!(output.errors, vec![]);
    let vertex = output.types.get_by_name("Vertex").unwrap();
    let slotted = vertex.custom.slotted_stream_data.iter().map(|s| &s.name[..]).collect::<Vec<_>>();
    assert_eq!(slotted, vec!["PerInstance"]);
}

#[test]
fn test_slotted_stream_of_enclosing_struct() {
    let output = parse_str("namespace N {
        struct Outer { struct Inner CPP_HLSL_SLOTTED_STREAM(Outer) { float _i; }; Float4 _o; };
    }");
    assert_eq!(output.errors, vec![]);
    let inner = output.types.get_by_name("Inner").unwrap();
    assert_eq!(inner.custom.slotted_stream_data.len(), 1);
    assert_eq!(fields(&inner.custom.slotted_stream_data[0]), vec![("Float4", "_o", "O")]);
    assert_eq!(fields(output.types.get_by_name("Outer").unwrap()), vec![("Float4", "_o", "O")]);
}

#[test]
fn test_field_without_semantic() {
    let output = parse_str("namespace N { struct S { float _; float __x; float _ CPP_HLSL_SEMANTIC_NAME(PAD); }; }");
    let kinds = output.errors.iter().map(|e| e.kind).collect::<Vec<_>>();
    assert_eq!(kinds, vec![ErrorType::WrongSuccessor]);
    assert_eq!(output.errors[0].offset.0, 31);
    let ty = output.types.get(0).unwrap();
    assert_eq!(fields(ty), vec![("float", "__x", "_X"), ("float", "_", "PAD")]);
}

#[test]
fn test_bad_custom_syntax() {
    let output = parse_str("namespace N { struct A CPP_HLSL_INPUT_SLOT(one) { float _x; }; struct B CPP_HLSL_UNKNOWN(1) { float _y; }; struct C { float _z; }; }");
    let kinds = output.errors.iter().map(|e| e.kind).collect::<Vec<_>>();
    assert_eq!(kinds, vec![ErrorType::WrongSuccessor, ErrorType::WrongSuccessor]);
    let names = output.types.iter().map(|t| &t.name[..]).collect::<Vec<_>>();
    assert_eq!(names, vec!["C"]);
}

#[test]
fn test_syntax_tree_shape() {
    let output = parse_str("namespace NS { struct S { float4 _pos CPP_HLSL_SEMANTIC_NAME(SV_POSITION); }; }");
    let tree = &output.tree;
    let namespaces = tree.children(tree.root());
    assert_eq!(namespaces.len(), 1);
    assert_eq!(tree.node(namespaces[0]).classifier, SyntaxClassifier::Namespace);
    assert_eq!(tree.node(namespaces[0]).symbol_index, Some(1));

    let structs = tree.children(namespaces[0]);
    assert_eq!(tree.node(structs[0]).classifier, SyntaxClassifier::Struct);

    let variables = tree.children(structs[0]);
    assert_eq!(tree.node(variables[0]).classifier, SyntaxClassifier::Variable);
    let parts = tree.children(variables[0]).iter().map(|&id| tree.node(id).classifier).collect::<Vec<_>>();
    assert_eq!(parts, vec![SyntaxClassifier::DataType, SyntaxClassifier::SemanticName]);
}

#[test]
fn test_parse_terminates_on_truncated_input() {
    for source in &["namespace", "namespace N", "namespace N {", "namespace N { struct", "namespace N { struct S",
                    "namespace N { struct S {", "namespace N { struct S { float", "namespace N { struct S { float _x",
                    "namespace N { struct S CPP_HLSL_INPUT_SLOT(", "namespace N { struct S { float _x[", "namespace N { ("] {
        let output = parse_str(source);
        assert!(!output.errors.is_empty(), "no error for `{}`", source);
    }
}
