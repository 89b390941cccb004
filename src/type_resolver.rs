use crate::model::{ClassDecl, DeclarationModel, TypeRef};
use crate::parser::{CompilationUnit, ParsedFile};
use log::{debug, trace};
use std::collections::{HashMap, HashSet};

/// Types implicitly visible in every compilation unit.
const JAVA_LANG: &[&str] = &[
    "Boolean",
    "Byte",
    "Character",
    "CharSequence",
    "Class",
    "Comparable",
    "Double",
    "Enum",
    "Exception",
    "Float",
    "Integer",
    "Iterable",
    "Long",
    "Number",
    "Object",
    "Runnable",
    "RuntimeException",
    "Short",
    "String",
    "StringBuilder",
    "Throwable",
    "Void",
];

/// JDK types that implement `java.util.Collection`.
const JDK_COLLECTIONS: &[&str] = &[
    "java.util.Collection",
    "java.util.AbstractCollection",
    "java.util.AbstractList",
    "java.util.AbstractSet",
    "java.util.ArrayDeque",
    "java.util.ArrayList",
    "java.util.Deque",
    "java.util.EnumSet",
    "java.util.HashSet",
    "java.util.LinkedHashSet",
    "java.util.LinkedList",
    "java.util.List",
    "java.util.NavigableSet",
    "java.util.PriorityQueue",
    "java.util.Queue",
    "java.util.Set",
    "java.util.SortedSet",
    "java.util.Stack",
    "java.util.TreeSet",
    "java.util.Vector",
    "java.util.concurrent.BlockingQueue",
    "java.util.concurrent.ConcurrentLinkedQueue",
    "java.util.concurrent.CopyOnWriteArrayList",
    "java.util.concurrent.CopyOnWriteArraySet",
    "java.util.concurrent.LinkedBlockingQueue",
];

/// Other JDK types commonly reached through on-demand imports.
const JDK_TYPES: &[&str] = &[
    "java.math.BigDecimal",
    "java.math.BigInteger",
    "java.time.Duration",
    "java.time.Instant",
    "java.time.LocalDate",
    "java.time.LocalDateTime",
    "java.time.LocalTime",
    "java.time.OffsetDateTime",
    "java.time.ZonedDateTime",
    "java.util.Date",
    "java.util.HashMap",
    "java.util.LinkedHashMap",
    "java.util.Map",
    "java.util.Optional",
    "java.util.SortedMap",
    "java.util.TreeMap",
    "java.util.UUID",
];

/// Whether the type is `java.util.Collection` or a subtype of it.
///
/// JDK collection types are recognised by name. Classes declared in the
/// model are followed through their superclass and interfaces; the walk keeps
/// a visited set so cyclic hierarchies in a hand-written model terminate.
pub fn is_collection(model: &DeclarationModel, type_ref: &TypeRef) -> bool {
    if type_ref.primitive {
        return false;
    }
    let mut visited = HashSet::new();
    extends_collection(model, &type_ref.qualified_name, &mut visited)
}

fn extends_collection(
    model: &DeclarationModel,
    qualified_name: &str,
    visited: &mut HashSet<String>,
) -> bool {
    if JDK_COLLECTIONS.contains(&qualified_name) {
        return true;
    }
    if !visited.insert(qualified_name.to_string()) {
        return false;
    }
    let Some(class) = model.find(qualified_name) else {
        return false;
    };
    class
        .superclass
        .iter()
        .chain(class.interfaces.iter())
        .any(|parent| extends_collection(model, &parent.qualified_name, visited))
}

/// Type resolver - qualifies the type names written in Java sources.
///
/// Each compilation unit is resolved against the classes declared across the
/// whole project, so a controller can refer to a DTO in another file or
/// package. Lookup follows Java scoping: nested types of the enclosing
/// classes, single-type imports, the unit's own package, on-demand imports
/// and finally `java.lang`. Names that match none of these keep the text
/// they were written with.
pub struct TypeResolver {
    units: Vec<CompilationUnit>,
    /// Qualified names of every declared class
    declared: HashSet<String>,
}

/// Name lookup context of one compilation unit.
struct Scope<'u> {
    package: &'u str,
    /// Simple name to qualified name of single-type imports
    imports: HashMap<&'u str, &'u str>,
    on_demand: Vec<&'u str>,
}

impl TypeResolver {
    /// Create a new TypeResolver over the given compilation units
    pub fn new(units: Vec<CompilationUnit>) -> Self {
        let declared: HashSet<String> = units
            .iter()
            .flat_map(|unit| unit.classes.iter().map(|c| c.qualified_name.clone()))
            .collect();
        debug!(
            "Initializing TypeResolver with {} units declaring {} classes",
            units.len(),
            declared.len()
        );
        Self { units, declared }
    }

    pub fn from_parsed_files(files: Vec<ParsedFile>) -> Self {
        Self::new(files.into_iter().map(|f| f.unit).collect())
    }

    /// Resolve every type reference and build the declaration model.
    ///
    /// Classes appear in the model in unit order, each unit's classes in
    /// source order.
    pub fn resolve(self) -> DeclarationModel {
        let mut classes = Vec::with_capacity(self.declared.len());

        for unit in &self.units {
            let scope = Scope::new(unit);
            for class in &unit.classes {
                classes.push(self.resolve_class(&scope, class));
            }
        }

        DeclarationModel::new(classes)
    }

    fn resolve_class(&self, scope: &Scope, class: &ClassDecl) -> ClassDecl {
        let context = class.qualified_name.as_str();
        let mut resolved = class.clone();

        resolved.superclass = class
            .superclass
            .as_ref()
            .map(|t| self.resolve_type(scope, context, t));
        resolved.interfaces = class
            .interfaces
            .iter()
            .map(|t| self.resolve_type(scope, context, t))
            .collect();

        for method in &mut resolved.methods {
            method.return_type = self.resolve_type(scope, context, &method.return_type);
            for parameter in &mut method.parameters {
                parameter.type_ref = self.resolve_type(scope, context, &parameter.type_ref);
            }
        }

        resolved
    }

    fn resolve_type(&self, scope: &Scope, context: &str, type_ref: &TypeRef) -> TypeRef {
        let arguments = type_ref
            .arguments
            .iter()
            .map(|argument| self.resolve_type(scope, context, argument))
            .collect();

        if type_ref.primitive {
            return TypeRef {
                arguments,
                ..type_ref.clone()
            };
        }

        let qualified_name = self.qualify(scope, context, &type_ref.qualified_name);
        trace!("Resolved {} to {}", type_ref.qualified_name, qualified_name);

        TypeRef {
            qualified_name,
            arguments,
            ..type_ref.clone()
        }
    }

    /// Qualify a written (possibly dotted) name. Only the first segment is
    /// looked up; the rest names nested types below it.
    fn qualify(&self, scope: &Scope, context: &str, written: &str) -> String {
        let (head, tail) = match written.split_once('.') {
            Some((head, tail)) => (head, Some(tail)),
            None => (written, None),
        };

        match self.qualify_simple(scope, context, head) {
            Some(qualified) => match tail {
                Some(tail) => format!("{}.{}", qualified, tail),
                None => qualified,
            },
            None => written.to_string(),
        }
    }

    fn qualify_simple(&self, scope: &Scope, context: &str, name: &str) -> Option<String> {
        // Nested types of the enclosing classes, innermost first
        let mut enclosing = Some(context);
        while let Some(class_name) = enclosing {
            if !self.declared.contains(class_name) {
                break;
            }
            let candidate = format!("{}.{}", class_name, name);
            if self.declared.contains(&candidate) {
                return Some(candidate);
            }
            enclosing = class_name.rsplit_once('.').map(|(parent, _)| parent);
        }

        if let Some(imported) = scope.imports.get(name) {
            return Some(imported.to_string());
        }

        let same_package = if scope.package.is_empty() {
            name.to_string()
        } else {
            format!("{}.{}", scope.package, name)
        };
        if self.declared.contains(&same_package) {
            return Some(same_package);
        }

        for package in &scope.on_demand {
            let candidate = format!("{}.{}", package, name);
            if self.declared.contains(&candidate)
                || JDK_COLLECTIONS.contains(&candidate.as_str())
                || JDK_TYPES.contains(&candidate.as_str())
            {
                return Some(candidate);
            }
        }

        if JAVA_LANG.contains(&name) {
            return Some(format!("java.lang.{}", name));
        }

        None
    }
}

impl<'u> Scope<'u> {
    fn new(unit: &'u CompilationUnit) -> Self {
        let mut imports = HashMap::new();
        let mut on_demand = Vec::new();

        for import in &unit.imports {
            if import.on_demand {
                on_demand.push(import.path.as_str());
            } else if !import.is_static {
                let simple = import.path.rsplit('.').next().unwrap_or(&import.path);
                imports.insert(simple, import.path.as_str());
            }
        }

        Self {
            package: &unit.package,
            imports,
            on_demand,
        }
    }
}
