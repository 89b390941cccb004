//! Declaration model consumed by the endpoint extractor and the type describer.
//!
//! The model is a read-only view over declared Java classes, their methods,
//! parameters, annotations and documentation comments. It can be built from
//! Java sources (see [`crate::parser`] and [`crate::type_resolver`]) or
//! deserialized from JSON by an external host (see [`load_model`]).
//!
//! Types reference each other by qualified name, so the graph may contain
//! cycles (a class whose accessor returns the class itself, directly or
//! through other classes). Consumers must not assume the graph is a tree.

use anyhow::{Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;

/// Reference to a type as it appears in a declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeRef {
    /// Simple name (last segment), e.g. `List` or `long`
    pub name: String,
    /// Fully-qualified name, e.g. `java.util.List`. Equal to the written name
    /// when the type could not be resolved.
    pub qualified_name: String,
    /// Whether this is a Java primitive (including `void`)
    #[serde(default)]
    pub primitive: bool,
    /// Type arguments of a parameterized type
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub arguments: Vec<TypeRef>,
    /// Number of array dimensions (`String[][]` has 2)
    #[serde(default, skip_serializing_if = "is_zero")]
    pub dimensions: usize,
}

fn is_zero(n: &usize) -> bool {
    *n == 0
}

impl TypeRef {
    /// Create a primitive type reference (`int`, `boolean`, `void`, ...)
    pub fn primitive(name: &str) -> Self {
        Self {
            name: name.to_string(),
            qualified_name: name.to_string(),
            primitive: true,
            arguments: Vec::new(),
            dimensions: 0,
        }
    }

    /// Create a reference to a named (class, interface, enum) type.
    ///
    /// `written` may be simple (`Item`) or qualified (`com.acme.Item`); the
    /// simple name is its last segment.
    pub fn named(written: &str) -> Self {
        let name = written.rsplit('.').next().unwrap_or(written).to_string();
        Self {
            name,
            qualified_name: written.to_string(),
            primitive: false,
            arguments: Vec::new(),
            dimensions: 0,
        }
    }

    /// Attach type arguments
    pub fn with_arguments(mut self, arguments: Vec<TypeRef>) -> Self {
        self.arguments = arguments;
        self
    }

    /// Add array dimensions
    pub fn with_dimensions(mut self, dimensions: usize) -> Self {
        self.dimensions += dimensions;
        self
    }

    pub fn is_void(&self) -> bool {
        self.primitive && self.name == "void" && self.dimensions == 0
    }

    pub fn is_array(&self) -> bool {
        self.dimensions > 0
    }

    pub fn is_parameterized(&self) -> bool {
        !self.arguments.is_empty()
    }

    /// The same type with one array dimension removed
    pub fn component_type(&self) -> TypeRef {
        let mut component = self.clone();
        component.dimensions = component.dimensions.saturating_sub(1);
        component
    }

    /// Rendering with fully-qualified names, e.g. `java.util.List<com.acme.Item>`
    pub fn qualified_display(&self) -> String {
        self.render(true)
    }

    fn render(&self, qualified: bool) -> String {
        let mut out = if qualified {
            self.qualified_name.clone()
        } else {
            self.name.clone()
        };
        if !self.arguments.is_empty() {
            let args: Vec<String> = self.arguments.iter().map(|a| a.render(qualified)).collect();
            out.push('<');
            out.push_str(&args.join(","));
            out.push('>');
        }
        for _ in 0..self.dimensions {
            out.push_str("[]");
        }
        out
    }
}

/// Simple-name rendering, e.g. `List<Item>` or `long[]`
impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(false))
    }
}

/// Anything that looks like an annotation: a simple type name plus
/// name/value attribute pairs.
pub trait AnnotationLike {
    /// Simple name of the annotation type, e.g. `RequestMapping`
    fn simple_name(&self) -> &str;

    /// Text of the named attribute with double quotes removed, or `None`
    /// when the attribute is not present.
    fn attribute_value(&self, name: &str) -> Option<String>;
}

/// A single `name = value` pair of an annotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationAttribute {
    pub name: String,
    /// Source text of the element value, e.g. `"/items"` or `RequestMethod.GET`
    pub value: String,
}

/// An annotation applied to a class, method or parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationDecl {
    pub name: String,
    #[serde(default)]
    pub attributes: Vec<AnnotationAttribute>,
}

impl AnnotationDecl {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            attributes: Vec::new(),
        }
    }

    /// Builder-style attribute helper, mostly useful for hosts and tests
    pub fn with_attribute(mut self, name: &str, value: &str) -> Self {
        self.attributes.push(AnnotationAttribute {
            name: name.to_string(),
            value: value.to_string(),
        });
        self
    }
}

impl AnnotationLike for AnnotationDecl {
    fn simple_name(&self) -> &str {
        &self.name
    }

    fn attribute_value(&self, name: &str) -> Option<String> {
        self.attributes
            .iter()
            .find(|attr| attr.name == name)
            .map(|attr| attr.value.replace('"', ""))
    }
}

/// Elements that carry annotations.
pub trait Annotated {
    fn annotations(&self) -> &[AnnotationDecl];

    /// First annotation with the given simple name
    fn annotation(&self, name: &str) -> Option<&AnnotationDecl> {
        self.annotations().iter().find(|a| a.simple_name() == name)
    }

    fn is_annotated_with(&self, name: &str) -> bool {
        self.annotation(name).is_some()
    }
}

/// A `@param` block tag of a documentation comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamTag {
    pub name: String,
    pub comment: String,
}

/// A formal parameter of a method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamDecl {
    pub name: String,
    #[serde(rename = "type")]
    pub type_ref: TypeRef,
    #[serde(default)]
    pub annotations: Vec<AnnotationDecl>,
}

impl Annotated for ParamDecl {
    fn annotations(&self) -> &[AnnotationDecl] {
        &self.annotations
    }
}

/// A method declared in a class body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDecl {
    pub name: String,
    /// Keyword modifiers such as `public` or `static`
    #[serde(default)]
    pub modifiers: Vec<String>,
    pub return_type: TypeRef,
    #[serde(default)]
    pub parameters: Vec<ParamDecl>,
    #[serde(default)]
    pub annotations: Vec<AnnotationDecl>,
    /// Main text of the documentation comment, block tags removed
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub param_tags: Vec<ParamTag>,
}

impl MethodDecl {
    pub fn has_modifier(&self, modifier: &str) -> bool {
        self.modifiers.iter().any(|m| m == modifier)
    }

    pub fn is_static(&self) -> bool {
        self.has_modifier("static")
    }

    pub fn is_private(&self) -> bool {
        self.has_modifier("private")
    }

    /// Comment of the `@param` tag documenting `name`, if any
    pub fn param_tag(&self, name: &str) -> Option<&ParamTag> {
        self.param_tags.iter().find(|tag| tag.name == name)
    }
}

impl Annotated for MethodDecl {
    fn annotations(&self) -> &[AnnotationDecl] {
        &self.annotations
    }
}

/// What kind of type declaration a [`ClassDecl`] is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassKind {
    #[default]
    Class,
    Interface,
    Enum,
    Record,
    Annotation,
}

/// A declared class, interface, enum, record or annotation type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassDecl {
    /// Simple name; nested classes are `Outer.Inner`
    pub name: String,
    pub qualified_name: String,
    #[serde(default)]
    pub kind: ClassKind,
    #[serde(default)]
    pub superclass: Option<TypeRef>,
    #[serde(default)]
    pub interfaces: Vec<TypeRef>,
    #[serde(default)]
    pub annotations: Vec<AnnotationDecl>,
    #[serde(default)]
    pub methods: Vec<MethodDecl>,
    /// Enum constant names in declaration order
    #[serde(default)]
    pub enum_constants: Vec<String>,
    #[serde(default)]
    pub comment: String,
}

impl ClassDecl {
    pub fn new(name: &str, qualified_name: &str, kind: ClassKind) -> Self {
        Self {
            name: name.to_string(),
            qualified_name: qualified_name.to_string(),
            kind,
            superclass: None,
            interfaces: Vec::new(),
            annotations: Vec::new(),
            methods: Vec::new(),
            enum_constants: Vec::new(),
            comment: String::new(),
        }
    }

    pub fn is_enum(&self) -> bool {
        self.kind == ClassKind::Enum
    }

    /// Last segment of the name: `Line` for a nested `Order.Line`
    pub fn simple_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }
}

impl Annotated for ClassDecl {
    fn annotations(&self) -> &[AnnotationDecl] {
        &self.annotations
    }
}

/// All declared classes of one extraction run, in supply order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "ModelRepr", into = "ModelRepr")]
pub struct DeclarationModel {
    classes: Vec<ClassDecl>,
    index: HashMap<String, usize>,
}

#[derive(Serialize, Deserialize)]
struct ModelRepr {
    classes: Vec<ClassDecl>,
}

impl From<ModelRepr> for DeclarationModel {
    fn from(repr: ModelRepr) -> Self {
        DeclarationModel::new(repr.classes)
    }
}

impl From<DeclarationModel> for ModelRepr {
    fn from(model: DeclarationModel) -> Self {
        ModelRepr {
            classes: model.classes,
        }
    }
}

impl DeclarationModel {
    /// Build a model, indexing classes by qualified name. When two classes
    /// share a qualified name the first one wins the index slot.
    pub fn new(classes: Vec<ClassDecl>) -> Self {
        let mut index = HashMap::with_capacity(classes.len());
        for (position, class) in classes.iter().enumerate() {
            index.entry(class.qualified_name.clone()).or_insert(position);
        }
        Self { classes, index }
    }

    pub fn classes(&self) -> &[ClassDecl] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Class declared under `qualified_name`
    pub fn find(&self, qualified_name: &str) -> Option<&ClassDecl> {
        self.index.get(qualified_name).map(|&i| &self.classes[i])
    }

    /// The declaring class of a type reference. Primitives, arrays and types
    /// outside the model resolve to `None`.
    pub fn resolve(&self, type_ref: &TypeRef) -> Option<&ClassDecl> {
        if type_ref.primitive || type_ref.is_array() {
            return None;
        }
        self.find(&type_ref.qualified_name)
    }
}

/// Load a declaration model serialized as JSON by an external host.
pub fn load_model(path: &Path) -> Result<DeclarationModel> {
    debug!("Loading declaration model from {}", path.display());
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read model file: {}", path.display()))?;
    let model: DeclarationModel = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse declaration model: {}", path.display()))?;
    debug!("Loaded {} classes", model.len());
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_type_ref_display() {
        let list = TypeRef {
            name: "List".to_string(),
            qualified_name: "java.util.List".to_string(),
            primitive: false,
            arguments: vec![TypeRef {
                name: "Item".to_string(),
                qualified_name: "com.acme.Item".to_string(),
                primitive: false,
                arguments: vec![],
                dimensions: 0,
            }],
            dimensions: 0,
        };

        assert_eq!(list.to_string(), "List<Item>");
        assert_eq!(list.qualified_display(), "java.util.List<com.acme.Item>");

        let matrix = TypeRef::primitive("int").with_dimensions(2);
        assert_eq!(matrix.to_string(), "int[][]");
        assert!(matrix.is_array());
        assert_eq!(matrix.component_type().to_string(), "int[]");
    }

    #[test]
    fn test_class_simple_name() {
        assert_eq!(ClassDecl::new("Item", "com.acme.Item", ClassKind::Class).simple_name(), "Item");
        assert_eq!(
            ClassDecl::new("Order.Line", "com.acme.Order.Line", ClassKind::Class).simple_name(),
            "Line"
        );
    }

    #[test]
    fn test_named_type_takes_last_segment() {
        let t = TypeRef::named("java.time.Instant");
        assert_eq!(t.name, "Instant");
        assert_eq!(t.qualified_name, "java.time.Instant");
        assert!(!t.primitive);
    }

    #[test]
    fn test_void_detection() {
        assert!(TypeRef::primitive("void").is_void());
        assert!(!TypeRef::primitive("int").is_void());
        assert!(!TypeRef::named("Void").is_void());
    }

    #[test]
    fn test_attribute_value_strips_quotes() {
        let mapping = AnnotationDecl::new("RequestMapping")
            .with_attribute("value", "\"/items\"")
            .with_attribute("method", "RequestMethod.GET");

        assert_eq!(mapping.attribute_value("value"), Some("/items".to_string()));
        assert_eq!(
            mapping.attribute_value("method"),
            Some("RequestMethod.GET".to_string())
        );
        assert_eq!(mapping.attribute_value("produces"), None);
    }

    #[test]
    fn test_annotation_lookup_by_simple_name() {
        let mut method = MethodDecl {
            name: "get".to_string(),
            modifiers: vec!["public".to_string()],
            return_type: TypeRef::primitive("void"),
            parameters: vec![],
            annotations: vec![],
            comment: String::new(),
            param_tags: vec![],
        };
        assert!(!method.is_annotated_with("RequestMapping"));

        method.annotations.push(AnnotationDecl::new("Deprecated"));
        method.annotations.push(AnnotationDecl::new("RequestMapping"));
        assert!(method.is_annotated_with("RequestMapping"));
        assert_eq!(method.annotation("Deprecated").unwrap().name, "Deprecated");
    }

    #[test]
    fn test_model_index_and_resolve() {
        let item = ClassDecl::new("Item", "com.acme.Item", ClassKind::Class);
        let status = ClassDecl::new("Status", "com.acme.Status", ClassKind::Enum);
        let model = DeclarationModel::new(vec![item, status]);

        assert_eq!(model.len(), 2);
        assert!(model.find("com.acme.Status").unwrap().is_enum());

        let mut reference = TypeRef::named("Item");
        reference.qualified_name = "com.acme.Item".to_string();
        assert_eq!(model.resolve(&reference).unwrap().name, "Item");

        assert!(model.resolve(&reference.clone().with_dimensions(1)).is_none());
        assert!(model.resolve(&TypeRef::primitive("long")).is_none());
        assert!(model.resolve(&TypeRef::named("java.lang.String")).is_none());
    }

    #[test]
    fn test_load_model_from_json() {
        let json = r#"{
            "classes": [
                {
                    "name": "ItemController",
                    "qualified_name": "com.acme.ItemController",
                    "annotations": [
                        { "name": "Controller" },
                        { "name": "RequestMapping", "attributes": [ { "name": "value", "value": "\"/api\"" } ] }
                    ],
                    "methods": [
                        {
                            "name": "find",
                            "return_type": { "name": "Item", "qualified_name": "com.acme.Item" },
                            "parameters": [
                                { "name": "id", "type": { "name": "long", "qualified_name": "long", "primitive": true } }
                            ]
                        }
                    ]
                }
            ]
        }"#;

        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("model.json");
        fs::write(&path, json).unwrap();

        let model = load_model(&path).unwrap();
        let controller = model.find("com.acme.ItemController").unwrap();
        assert_eq!(controller.kind, ClassKind::Class);
        assert!(controller.is_annotated_with("Controller"));
        assert_eq!(controller.methods[0].parameters[0].type_ref.to_string(), "long");
    }

    #[test]
    fn test_load_model_rejects_invalid_json() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();

        assert!(load_model(&path).is_err());
    }
}
