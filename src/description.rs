//! Structural descriptions of declared types.
//!
//! A request body type is described by walking its bean accessors: every
//! `getX()`/`isX()` method becomes a field whose value is the description of
//! the accessor's return type. The result serializes to a JSON sample of the
//! payload shape:
//!
//! ```text
//! {
//!   "name": "String",
//!   "status": "OPEN|CLOSED",
//!   "tags": [ "String" ]
//! }
//! ```

use crate::model::{ClassDecl, DeclarationModel, MethodDecl, TypeRef};
use crate::type_resolver;
use log::{debug, error};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use std::collections::{BTreeMap, HashSet};

/// Deepest object nesting a description reaches. Declared types below it are
/// named instead of expanded, so densely connected models stay small.
pub const MAX_DEPTH: usize = 4;

/// Qualified-name prefixes of the types worth describing.
///
/// An empty filter accepts every type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeFilter {
    prefixes: Vec<String>,
}

impl TypeFilter {
    pub fn new(prefixes: Vec<String>) -> Self {
        Self { prefixes }
    }

    /// Build a filter from a comma separated option value such as
    /// `com.acme.api,com.acme.model`. Entries are trimmed and empty entries
    /// are ignored.
    pub fn from_option(value: &str) -> Self {
        let prefixes = value
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect();
        Self { prefixes }
    }

    pub fn prefixes(&self) -> &[String] {
        &self.prefixes
    }

    /// Whether a type with this qualified name should be described
    pub fn allows(&self, qualified_name: &str) -> bool {
        self.prefixes.is_empty()
            || self
                .prefixes
                .iter()
                .any(|prefix| qualified_name.starts_with(prefix.as_str()))
    }
}

/// Description of a type's shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeDescription {
    /// Primitive, opaque or excluded type, named by its simple name
    Scalar(String),
    /// One entry per accessor
    Object(BTreeMap<String, TypeDescription>),
    /// Collection of the element type
    Collection(Box<TypeDescription>),
    /// Enum constants joined by `|`
    Enum(String),
}

impl TypeDescription {
    pub fn scalar(name: &str) -> Self {
        TypeDescription::Scalar(name.to_string())
    }

    pub fn collection(element: TypeDescription) -> Self {
        TypeDescription::Collection(Box::new(element))
    }
}

impl Serialize for TypeDescription {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            TypeDescription::Scalar(name) | TypeDescription::Enum(name) => {
                serializer.serialize_str(name)
            }
            TypeDescription::Object(fields) => {
                let mut map = serializer.serialize_map(Some(fields.len()))?;
                for (name, field) in fields {
                    map.serialize_entry(name, field)?;
                }
                map.end()
            }
            TypeDescription::Collection(element) => {
                let mut seq = serializer.serialize_seq(Some(1))?;
                seq.serialize_element(element.as_ref())?;
                seq.end()
            }
        }
    }
}

/// Describes declared types against a declaration model.
pub struct TypeDescriber<'a> {
    model: &'a DeclarationModel,
    filter: &'a TypeFilter,
}

impl<'a> TypeDescriber<'a> {
    pub fn new(model: &'a DeclarationModel, filter: &'a TypeFilter) -> Self {
        Self { model, filter }
    }

    /// Describe a type. An absent type yields an empty scalar.
    ///
    /// A top-level array or parameterized collection is described as a
    /// collection of its element even though the collection type itself is
    /// never in the filter, so a `List<Item>` body shows the item shape.
    pub fn describe(&self, type_ref: Option<&TypeRef>) -> TypeDescription {
        match type_ref {
            Some(type_ref) => {
                let mut path = HashSet::new();
                self.describe_ref(type_ref, &mut path)
            }
            None => TypeDescription::scalar(""),
        }
    }

    /// Describe a type and render it as pretty-printed JSON.
    ///
    /// Serialization failures are logged and produce `None`; they never
    /// abort the extraction.
    pub fn render_structure(&self, type_ref: &TypeRef) -> Option<String> {
        let description = self.describe(Some(type_ref));
        match serde_json::to_string_pretty(&description) {
            Ok(json) => Some(json),
            Err(e) => {
                error!("Failed to serialize description of {}: {}", type_ref, e);
                None
            }
        }
    }

    /// `path` holds the qualified names of the classes currently being
    /// described; its size is the current object depth.
    fn describe_ref(&self, type_ref: &TypeRef, path: &mut HashSet<String>) -> TypeDescription {
        if type_ref.is_array() {
            let element = self.describe_ref(&type_ref.component_type(), path);
            return TypeDescription::collection(element);
        }
        if type_ref.primitive {
            return TypeDescription::scalar(&type_ref.name);
        }
        if type_ref.is_parameterized() && type_resolver::is_collection(self.model, type_ref) {
            let element = self.describe_ref(&type_ref.arguments[0], path);
            return TypeDescription::collection(element);
        }

        match self.model.resolve(type_ref) {
            Some(class) => self.describe_declared(class, path),
            None => TypeDescription::scalar(&type_ref.name),
        }
    }

    fn describe_declared(&self, class: &ClassDecl, path: &mut HashSet<String>) -> TypeDescription {
        if !self.filter.allows(&class.qualified_name) {
            return TypeDescription::scalar(class.simple_name());
        }
        if path.contains(&class.qualified_name) {
            debug!("Cycle through {}, describing it as a scalar", class.qualified_name);
            return TypeDescription::scalar(class.simple_name());
        }
        if class.is_enum() {
            return TypeDescription::Enum(class.enum_constants.join("|"));
        }
        if path.len() >= MAX_DEPTH {
            debug!("Depth limit reached at {}, describing it as a scalar", class.qualified_name);
            return TypeDescription::scalar(class.simple_name());
        }

        path.insert(class.qualified_name.clone());
        let mut fields = BTreeMap::new();
        for accessor in self.accessors(class) {
            let field = self.describe_ref(&accessor.return_type, path);
            fields.insert(field_name(&accessor.name), field);
        }
        path.remove(&class.qualified_name);

        TypeDescription::Object(fields)
    }

    /// Accessors of `class` and of its superclasses found in the model,
    /// base classes first so that overriding accessors replace inherited ones.
    fn accessors<'c>(&'c self, class: &'c ClassDecl) -> Vec<&'c MethodDecl> {
        let mut chain = vec![class];
        let mut seen = HashSet::from([class.qualified_name.as_str()]);
        let mut current = class;
        while let Some(parent) = current
            .superclass
            .as_ref()
            .and_then(|superclass| self.model.resolve(superclass))
        {
            if !seen.insert(parent.qualified_name.as_str()) {
                break;
            }
            chain.push(parent);
            current = parent;
        }

        chain
            .into_iter()
            .rev()
            .flat_map(|c| c.methods.iter())
            .filter(|m| is_accessor(m))
            .collect()
    }
}

/// Bean accessor: visible instance method without parameters, non-void
/// result and a `get`/`is` prefix.
fn is_accessor(method: &MethodDecl) -> bool {
    (method.name.starts_with("get") || method.name.starts_with("is"))
        && method.parameters.is_empty()
        && !method.return_type.is_void()
        && !method.is_static()
        && !method.is_private()
}

/// Derives a field name from an accessor name.
///
/// Skips the leading lower-case characters, lower-cases the first character
/// after them and keeps the rest verbatim: `getName` gives `name`,
/// `getURLPath` gives `uRLPath`. A name made only of lower-case characters is
/// returned unchanged.
pub fn field_name(method_name: &str) -> String {
    match method_name.char_indices().find(|(_, c)| !c.is_lowercase()) {
        Some((index, first)) => {
            let mut name: String = first.to_lowercase().collect();
            name.push_str(&method_name[index + first.len_utf8()..]);
            name
        }
        None => method_name.to_string(),
    }
}
