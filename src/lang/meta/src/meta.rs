use std::any::TypeId;
use std::collections::HashMap;
use std::slice;
use crate::tables::TypeTables;

/// Annotation data attached to a type or field
#[derive(PartialEq, Debug, Clone, Default)]
pub struct CustomData {
    pub semantic_name: String,
    pub register_index: Option<u32>,
    /// Vertex buffer slot the fields are read from
    pub input_slot: u32,
    /// Instances drawn per element step, 0 for per-vertex data
    pub instance_data_step_rate: u32,
    /// Types whose fields are read from other input slots
    pub slotted_stream_data: Vec<TypeMetaData>,
}

/// Record of a struct or of one field of a struct
#[derive(PartialEq, Debug, Clone)]
pub struct TypeMetaData {
    pub name: String,
    /// Declared C++ type name, the struct name itself for struct records
    pub type_name: String,
    /// Enclosing namespaces, outermost first
    pub namespace: Vec<String>,
    /// Runtime identity bound by registration
    pub identity: Option<TypeId>,
    pub array_len: Option<u32>,
    /// Fields in declaration order
    pub members: Vec<TypeMetaData>,
    pub custom: CustomData,
}

/// One element of a flattened vertex input layout
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct InputElement {
    pub semantic_name: String,
    pub type_name: String,
    pub input_slot: u32,
    pub instance_data_step_rate: u32,
}

impl TypeMetaData {
    pub fn new_struct(name: &str, namespace: Vec<String>) -> TypeMetaData {
        TypeMetaData {
            name: name.to_string(),
            type_name: name.to_string(),
            namespace: namespace,
            identity: None,
            array_len: None,
            members: vec![],
            custom: CustomData::default(),
        }
    }

    pub fn new_field(type_name: &str, name: &str, semantic_name: &str) -> TypeMetaData {
        TypeMetaData {
            name: name.to_string(),
            type_name: type_name.to_string(),
            namespace: vec![],
            identity: None,
            array_len: None,
            members: vec![],
            custom: CustomData {
                semantic_name: semantic_name.to_string(),
                ..CustomData::default()
            },
        }
    }

    /// Name including the namespace path, joined with `::`
    pub fn qualified_name(&self) -> String {
        let mut parts = self.namespace.clone();
        parts.push(self.name.clone());
        parts.join("::")
    }

    pub fn semantic_name(&self) -> &str {
        &self.custom.semantic_name
    }

    pub fn is_instance_data(&self) -> bool {
        self.custom.instance_data_step_rate > 0
    }

    /// Flatten the fields of this type and its slotted streams into the
    /// element order the vertex layout is built in
    pub fn input_elements(&self, tables: &TypeTables) -> Vec<InputElement> {
        let mut elements = Vec::with_capacity(self.members.len());
        let streams = Some(self).into_iter().chain(self.custom.slotted_stream_data.iter());
        for stream in streams {
            for member in &stream.members {
                elements.push(InputElement {
                    semantic_name: tables.semantic(member.semantic_name()).to_string(),
                    type_name: tables.hlsl_type(&member.type_name).to_string(),
                    input_slot: stream.custom.input_slot,
                    instance_data_step_rate: stream.custom.instance_data_step_rate,
                });
            }
        }
        elements
    }
}

/// Every struct found in a parse, in discovery order
#[derive(PartialEq, Debug, Clone)]
pub struct TypeRegistry {
    types: Vec<TypeMetaData>,
    by_name: HashMap<String, usize>,
}

impl TypeRegistry {
    pub fn new() -> TypeRegistry {
        TypeRegistry {
            types: vec![],
            by_name: HashMap::new(),
        }
    }

    /// Add a type, returning its index. Name lookups keep resolving to the
    /// first type registered under a name.
    pub fn insert(&mut self, ty: TypeMetaData) -> usize {
        let index = self.types.len();
        if self.by_name.contains_key(&ty.name) {
            log::warn!("type {} declared more than once, lookups by name use the first declaration",
                       ty.qualified_name());
        } else {
            self.by_name.insert(ty.name.clone(), index);
        }
        self.types.push(ty);
        index
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&TypeMetaData> {
        self.types.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut TypeMetaData> {
        self.types.get_mut(index)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).cloned()
    }

    pub fn get_by_name(&self, name: &str) -> Option<&TypeMetaData> {
        self.index_of(name).map(|index| &self.types[index])
    }

    pub fn get_by_identity(&self, identity: TypeId) -> Option<&TypeMetaData> {
        self.types.iter().find(|ty| ty.identity == Some(identity))
    }

    /// Attach a runtime identity to the type declared under a name, moving
    /// it off any type it was attached to before
    pub fn bind_identity(&mut self, name: &str, identity: TypeId) -> bool {
        let index = match self.index_of(name) {
            Some(index) => index,
            None => return false,
        };
        for ty in self.types.iter_mut().filter(|ty| ty.identity == Some(identity)) {
            ty.identity = None;
        }
        self.types[index].identity = Some(identity);
        true
    }

    pub fn iter(&self) -> slice::Iter<'_, TypeMetaData> {
        self.types.iter()
    }
}

#[cfg(test)]
fn vertex_type() -> TypeMetaData {
    let mut ty = TypeMetaData::new_struct("Vertex", vec!["Render".to_string()]);
    ty.members.push(TypeMetaData::new_field("Float3", "_position", "POSITION"));
    ty.members.push(TypeMetaData::new_field("Float2", "_uv", "UV"));
    ty
}

#[test]
fn test_qualified_name() {
    assert_eq!(vertex_type().qualified_name(), "Render::Vertex");
    assert_eq!(TypeMetaData::new_struct("Free", vec![]).qualified_name(), "Free");
}

#[test]
fn test_input_elements() {
    let mut instance = TypeMetaData::new_struct("Instance", vec![]);
    instance.custom.input_slot = 1;
    instance.custom.instance_data_step_rate = 1;
    instance.members.push(TypeMetaData::new_field("Float4x4", "_world", "WORLD"));

    let mut vertex = vertex_type();
    vertex.custom.slotted_stream_data.push(instance);

    let elements = vertex.input_elements(&TypeTables::default());
    let summary = elements.iter()
        .map(|e| (&e.semantic_name[..], &e.type_name[..], e.input_slot, e.instance_data_step_rate))
        .collect::<Vec<_>>();
    assert_eq!(summary, vec![
        ("SV_POSITION", "float3", 0, 0),
        ("UV", "float2", 0, 0),
        ("WORLD", "float4x4", 1, 1),
    ]);
}

#[test]
fn test_registry_lookup() {
    struct Marker;

    let mut registry = TypeRegistry::new();
    assert_eq!(registry.insert(vertex_type()), 0);
    assert_eq!(registry.insert(TypeMetaData::new_struct("Other", vec![])), 1);
    assert_eq!(registry.insert(TypeMetaData::new_struct("Vertex", vec![])), 2);

    assert_eq!(registry.len(), 3);
    assert_eq!(registry.index_of("Vertex"), Some(0));
    assert_eq!(registry.get_by_name("Vertex").map(|ty| ty.members.len()), Some(2));
    assert!(registry.get_by_name("Missing").is_none());

    assert!(registry.bind_identity("Other", TypeId::of::<Marker>()));
    assert!(!registry.bind_identity("Missing", TypeId::of::<Marker>()));
    assert_eq!(registry.get_by_identity(TypeId::of::<Marker>()).map(|ty| &ty.name[..]), Some("Other"));
    assert!(registry.bind_identity("Vertex", TypeId::of::<Marker>()));
    assert_eq!(registry.get(1).unwrap().identity, None);
    assert_eq!(registry.get_by_identity(TypeId::of::<Marker>()).map(|ty| ty.members.len()), Some(2));
}
