use std::collections::HashMap;

/// Name translation tables used when emitting HLSL
///
/// Built once and handed to whatever needs them. Lookups that miss return the
/// input unchanged.
#[derive(PartialEq, Debug, Clone)]
pub struct TypeTables {
    type_names: HashMap<String, String>,
    semantic_aliases: HashMap<String, String>,
}

impl TypeTables {
    /// Tables with no entries
    pub fn empty() -> TypeTables {
        TypeTables {
            type_names: HashMap::new(),
            semantic_aliases: HashMap::new(),
        }
    }

    pub fn with_type(mut self, cpp_name: &str, hlsl_name: &str) -> TypeTables {
        self.type_names.insert(cpp_name.to_string(), hlsl_name.to_string());
        self
    }

    pub fn with_semantic_alias(mut self, semantic: &str, alias: &str) -> TypeTables {
        self.semantic_aliases.insert(semantic.to_string(), alias.to_string());
        self
    }

    /// HLSL name of a C++ type name
    pub fn hlsl_type<'a>(&'a self, cpp_name: &'a str) -> &'a str {
        match self.type_names.get(cpp_name) {
            Some(hlsl_name) => hlsl_name,
            None => cpp_name,
        }
    }

    pub fn semantic<'a>(&'a self, semantic: &'a str) -> &'a str {
        match self.semantic_aliases.get(semantic) {
            Some(alias) => alias,
            None => semantic,
        }
    }

    /// If a name is a key of the type table
    pub fn is_built_in(&self, cpp_name: &str) -> bool {
        self.type_names.contains_key(cpp_name)
    }
}

impl Default for TypeTables {
    fn default() -> TypeTables {
        TypeTables::empty()
            .with_type("Float2", "float2")
            .with_type("Float3", "float3")
            .with_type("Float4", "float4")
            .with_type("Float4x4", "float4x4")
            .with_type("unsigned int", "uint")
            .with_semantic_alias("POSITION", "SV_POSITION")
    }
}

#[test]
fn test_default_tables() {
    let tables = TypeTables::default();
    assert_eq!(tables.hlsl_type("Float4x4"), "float4x4");
    assert_eq!(tables.hlsl_type("unsigned int"), "uint");
    assert_eq!(tables.hlsl_type("float4"), "float4");
    assert_eq!(tables.hlsl_type("MyStruct"), "MyStruct");
    assert_eq!(tables.semantic("POSITION"), "SV_POSITION");
    assert_eq!(tables.semantic("TEXCOORD0"), "TEXCOORD0");
    assert!(tables.is_built_in("Float2"));
    assert!(!tables.is_built_in("float2"));
}

#[test]
fn test_extended_tables() {
    let tables = TypeTables::default().with_type("Matrix", "float4x4").with_semantic_alias("COLOR", "COLOR0");
    assert_eq!(tables.hlsl_type("Matrix"), "float4x4");
    assert_eq!(tables.semantic("COLOR"), "COLOR0");
    assert_eq!(tables.hlsl_type("Float2"), "float2");
}
