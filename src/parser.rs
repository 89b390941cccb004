use crate::error::Error;
use crate::model::{AnnotationAttribute, AnnotationDecl, ClassDecl, ClassKind, MethodDecl, ParamDecl, ParamTag, TypeRef};
use anyhow::{Context, Result};
use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};
use tree_sitter::{Node, Parser};

/// Java source parser.
///
/// The `JavaParser` uses tree-sitter to parse Java source code and lowers the
/// syntax tree into the declarations the extractor works on: classes with
/// their annotations, methods, parameters and javadoc comments. Type names are
/// kept as written; [`crate::type_resolver::TypeResolver`] qualifies them once
/// every file of the project is known.
///
/// # Example
///
/// ```no_run
/// use restdoc_from_source::parser::JavaParser;
/// use std::path::Path;
///
/// let parsed = JavaParser::parse_file(Path::new("src/main/java/Api.java")).unwrap();
/// println!("Parsed {} classes", parsed.unit.classes.len());
/// ```
pub struct JavaParser;

/// A parsed Java file.
#[derive(Debug)]
pub struct ParsedFile {
    /// Path to the source file
    pub path: PathBuf,
    /// Declarations found in the file
    pub unit: CompilationUnit,
}

/// Declarations of a single Java file with unresolved type names.
#[derive(Debug, Clone, Default)]
pub struct CompilationUnit {
    /// Package name, empty for the default package
    pub package: String,
    pub imports: Vec<Import>,
    /// Classes in source order; nested classes follow their enclosing class
    pub classes: Vec<ClassDecl>,
}

/// An `import` declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import {
    /// Imported name without the trailing `.*`
    pub path: String,
    /// `import a.b.*;`
    pub on_demand: bool,
    /// `import static ...;`
    pub is_static: bool,
}

/// Main text and `@param` tags of a javadoc comment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocComment {
    pub text: String,
    pub param_tags: Vec<ParamTag>,
}

impl JavaParser {
    /// Parses a single Java source file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the parser cannot be
    /// initialised. Syntax errors are not fatal: tree-sitter recovers and the
    /// declarations it could make sense of are kept.
    pub fn parse_file(path: &Path) -> Result<ParsedFile> {
        debug!("Parsing file: {}", path.display());

        let source = fs::read_to_string(path)
            .with_context(|| format!("Failed to read file: {}", path.display()))?;

        Self::parse_source(&source, path)
    }

    /// Parses Java source code held in memory.
    pub fn parse_source(source: &str, path: &Path) -> Result<ParsedFile> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_java::LANGUAGE.into())
            .context("Failed to set Java language")?;

        let tree = parser.parse(source, None).ok_or_else(|| Error::Parse {
            file: path.to_path_buf(),
            message: "parser returned no syntax tree".to_string(),
        })?;

        let root = tree.root_node();
        if root.has_error() {
            warn!(
                "Syntax errors in {}, keeping the declarations that could be recovered",
                path.display()
            );
        }

        let unit = Lowering::new(source.as_bytes()).unit(root);
        debug!(
            "Successfully parsed file: {} ({} classes)",
            path.display(),
            unit.classes.len()
        );

        Ok(ParsedFile {
            path: path.to_path_buf(),
            unit,
        })
    }

    /// Parses multiple Java files, continuing even if some fail.
    ///
    /// Failures are logged as warnings and returned in place, so the caller
    /// can document the files that did parse.
    pub fn parse_files(paths: &[PathBuf]) -> Vec<Result<ParsedFile>> {
        debug!("Parsing {} files", paths.len());

        let results: Vec<Result<ParsedFile>> = paths
            .iter()
            .map(|path| {
                Self::parse_file(path).inspect_err(|e| {
                    warn!("Failed to parse {}: {}", path.display(), e);
                })
            })
            .collect();

        let success_count = results.iter().filter(|r| r.is_ok()).count();
        debug!(
            "Parsing complete: {} succeeded, {} failed",
            success_count,
            results.len() - success_count
        );

        results
    }
}

/// Splits a raw `/** ... */` comment into its main text and `@param` tags.
///
/// Leading whitespace and asterisks are removed from every line. Block tags
/// are only recognised at the start of a line; text up to the first block
/// tag is the main description.
pub fn parse_doc_comment(raw: &str) -> DocComment {
    let body = raw.trim();
    let body = body.strip_prefix("/**").unwrap_or(body);
    let body = body.strip_suffix("*/").unwrap_or(body);

    let mut text_lines: Vec<&str> = Vec::new();
    let mut tags: Vec<(String, Vec<String>)> = Vec::new();

    for line in body.lines() {
        let line = line.trim_start().trim_start_matches('*');
        let line = line.strip_prefix(' ').unwrap_or(line);

        let trimmed = line.trim_start();
        if let Some(tag) = block_tag_name(trimmed) {
            let rest = trimmed[tag.len() + 1..].trim_start();
            tags.push((tag.to_string(), vec![rest.to_string()]));
        } else if let Some((_, lines)) = tags.last_mut() {
            lines.push(trimmed.to_string());
        } else {
            text_lines.push(line);
        }
    }

    let param_tags = tags
        .into_iter()
        .filter(|(tag, _)| tag == "param")
        .filter_map(|(_, lines)| {
            let joined = lines.join("\n");
            let joined = joined.trim();
            let (name, comment) = match joined.find(char::is_whitespace) {
                Some(split) => (&joined[..split], joined[split..].trim()),
                None => (joined, ""),
            };
            if name.is_empty() {
                return None;
            }
            Some(ParamTag {
                name: name.to_string(),
                comment: comment.to_string(),
            })
        })
        .collect();

    DocComment {
        text: text_lines.join("\n").trim().to_string(),
        param_tags,
    }
}

/// `param` for a line starting with `@param`
fn block_tag_name(line: &str) -> Option<&str> {
    let rest = line.strip_prefix('@')?;
    let end = rest
        .find(|c: char| !c.is_alphanumeric())
        .unwrap_or(rest.len());
    if end == 0 {
        return None;
    }
    Some(&rest[..end])
}

/// Walks a tree-sitter syntax tree and collects declarations.
struct Lowering<'s> {
    source: &'s [u8],
    package: String,
    classes: Vec<ClassDecl>,
}

impl<'s> Lowering<'s> {
    fn new(source: &'s [u8]) -> Self {
        Self {
            source,
            package: String::new(),
            classes: Vec::new(),
        }
    }

    fn text(&self, node: Node) -> &'s str {
        node.utf8_text(self.source).unwrap_or("")
    }

    fn unit(mut self, root: Node) -> CompilationUnit {
        let mut imports = Vec::new();

        let mut cursor = root.walk();
        for child in root.named_children(&mut cursor) {
            match child.kind() {
                "package_declaration" => {
                    if let Some(name) = self.qualified_identifier(child) {
                        self.package = name;
                    }
                }
                "import_declaration" => {
                    if let Some(import) = self.import(child) {
                        imports.push(import);
                    }
                }
                kind if class_kind(kind).is_some() => self.type_declaration(child, None),
                _ => {}
            }
        }

        CompilationUnit {
            package: self.package,
            imports,
            classes: self.classes,
        }
    }

    /// Text of the first identifier / scoped_identifier child
    fn qualified_identifier(&self, node: Node) -> Option<String> {
        let mut cursor = node.walk();
        let found = node
            .named_children(&mut cursor)
            .find(|c| matches!(c.kind(), "identifier" | "scoped_identifier"));
        found.map(|n| strip_whitespace(self.text(n)))
    }

    fn import(&self, node: Node) -> Option<Import> {
        let mut path = None;
        let mut on_demand = false;
        let mut is_static = false;

        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            match child.kind() {
                "static" => is_static = true,
                "asterisk" => on_demand = true,
                "identifier" | "scoped_identifier" => path = Some(strip_whitespace(self.text(child))),
                _ => {}
            }
        }

        path.map(|path| Import {
            path,
            on_demand,
            is_static,
        })
    }

    /// Lowers a class/interface/enum/record declaration, then its nested types.
    fn type_declaration(&mut self, node: Node, enclosing: Option<(&str, &str)>) {
        let Some(kind) = class_kind(node.kind()) else {
            return;
        };
        let Some(name_node) = node.child_by_field_name("name") else {
            return;
        };
        let name = self.text(name_node);

        let (simple_name, qualified_name) = match enclosing {
            Some((outer_simple, outer_qualified)) => (
                format!("{}.{}", outer_simple, name),
                format!("{}.{}", outer_qualified, name),
            ),
            None if self.package.is_empty() => (name.to_string(), name.to_string()),
            None => (name.to_string(), format!("{}.{}", self.package, name)),
        };
        debug!("Found {:?} {}", kind, qualified_name);

        let mut class = ClassDecl::new(&simple_name, &qualified_name, kind);
        let (_, annotations) = self.modifiers(node);
        class.annotations = annotations;
        class.comment = self.doc_comment(node).text;

        if let Some(superclass) = node.child_by_field_name("superclass") {
            class.superclass = self.first_type_child(superclass);
        }
        if let Some(interfaces) = node.child_by_field_name("interfaces") {
            class.interfaces = self.type_list(interfaces);
        }
        let mut cursor = node.walk();
        let extends_interfaces = node
            .named_children(&mut cursor)
            .find(|c| c.kind() == "extends_interfaces");
        if let Some(extends) = extends_interfaces {
            class.interfaces.extend(self.type_list(extends));
        }

        let members = node
            .child_by_field_name("body")
            .map(body_members)
            .unwrap_or_default();

        for member in &members {
            match member.kind() {
                "method_declaration" => {
                    if let Some(method) = self.method(*member) {
                        class.methods.push(method);
                    }
                }
                "enum_constant" => {
                    if let Some(constant) = member.child_by_field_name("name") {
                        class.enum_constants.push(self.text(constant).to_string());
                    }
                }
                _ => {}
            }
        }

        self.classes.push(class);

        for member in &members {
            if class_kind(member.kind()).is_some() {
                self.type_declaration(*member, Some((&simple_name, &qualified_name)));
            }
        }
    }

    fn method(&self, node: Node) -> Option<MethodDecl> {
        let name = self.text(node.child_by_field_name("name")?).to_string();

        let mut return_type = node
            .child_by_field_name("type")
            .map(|t| self.type_ref(t))
            .unwrap_or_else(|| TypeRef::primitive("void"));
        if let Some(dimensions) = node.child_by_field_name("dimensions") {
            return_type = return_type.with_dimensions(count_dimensions(dimensions));
        }

        let parameters = node
            .child_by_field_name("parameters")
            .map(|p| self.parameters(p))
            .unwrap_or_default();

        let (modifiers, annotations) = self.modifiers(node);
        let doc = self.doc_comment(node);

        Some(MethodDecl {
            name,
            modifiers,
            return_type,
            parameters,
            annotations,
            comment: doc.text,
            param_tags: doc.param_tags,
        })
    }

    fn parameters(&self, node: Node) -> Vec<ParamDecl> {
        let mut parameters = Vec::new();

        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            match child.kind() {
                "formal_parameter" => {
                    let (Some(type_node), Some(name_node)) =
                        (child.child_by_field_name("type"), child.child_by_field_name("name"))
                    else {
                        continue;
                    };
                    let mut type_ref = self.type_ref(type_node);
                    if let Some(dimensions) = child.child_by_field_name("dimensions") {
                        type_ref = type_ref.with_dimensions(count_dimensions(dimensions));
                    }
                    let (_, annotations) = self.modifiers(child);
                    parameters.push(ParamDecl {
                        name: self.text(name_node).to_string(),
                        type_ref,
                        annotations,
                    });
                }
                "spread_parameter" => {
                    if let Some(parameter) = self.spread_parameter(child) {
                        parameters.push(parameter);
                    }
                }
                _ => {}
            }
        }

        parameters
    }

    /// `String... names` is an array parameter
    fn spread_parameter(&self, node: Node) -> Option<ParamDecl> {
        let mut type_ref = None;
        let mut name = None;

        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            match child.kind() {
                "modifiers" | "block_comment" | "line_comment" => {}
                "variable_declarator" => {
                    name = child
                        .child_by_field_name("name")
                        .map(|n| self.text(n).to_string());
                }
                _ if type_ref.is_none() => type_ref = Some(self.type_ref(child)),
                _ => {}
            }
        }

        let (_, annotations) = self.modifiers(node);
        Some(ParamDecl {
            name: name?,
            type_ref: type_ref?.with_dimensions(1),
            annotations,
        })
    }

    /// Keyword modifiers and annotations of a declaration
    fn modifiers(&self, node: Node) -> (Vec<String>, Vec<AnnotationDecl>) {
        let mut keywords = Vec::new();
        let mut annotations = Vec::new();

        let mut cursor = node.walk();
        let modifiers = node.children(&mut cursor).find(|c| c.kind() == "modifiers");
        if let Some(modifiers) = modifiers {
            let mut cursor = modifiers.walk();
            for child in modifiers.children(&mut cursor) {
                match child.kind() {
                    "marker_annotation" | "annotation" => annotations.push(self.annotation(child)),
                    kind if !child.is_named() => keywords.push(kind.to_string()),
                    _ => {}
                }
            }
        }

        (keywords, annotations)
    }

    fn annotation(&self, node: Node) -> AnnotationDecl {
        let written = node
            .child_by_field_name("name")
            .map(|n| strip_whitespace(self.text(n)))
            .unwrap_or_default();
        let name = written.rsplit('.').next().unwrap_or(&written);
        let mut annotation = AnnotationDecl::new(name);

        if let Some(arguments) = node.child_by_field_name("arguments") {
            let mut cursor = arguments.walk();
            for argument in arguments.named_children(&mut cursor) {
                match argument.kind() {
                    "block_comment" | "line_comment" => {}
                    "element_value_pair" => {
                        let key = argument.child_by_field_name("key");
                        let value = argument.child_by_field_name("value");
                        if let (Some(key), Some(value)) = (key, value) {
                            annotation.attributes.push(AnnotationAttribute {
                                name: self.text(key).to_string(),
                                value: self.element_value(value),
                            });
                        }
                    }
                    // A lone element value is the `value` attribute
                    _ => annotation.attributes.push(AnnotationAttribute {
                        name: "value".to_string(),
                        value: self.element_value(argument),
                    }),
                }
            }
        }

        annotation
    }

    /// Source text of an annotation element value.
    ///
    /// Single-element arrays are unwrapped, longer arrays render as
    /// `{a, b}`, and concatenations of string literals are folded into one
    /// literal.
    fn element_value(&self, node: Node) -> String {
        if node.kind() == "element_value_array_initializer" {
            let mut cursor = node.walk();
            let elements: Vec<String> = node
                .named_children(&mut cursor)
                .filter(|c| !is_comment(c.kind()))
                .map(|c| self.element_value(c))
                .collect();
            return match elements.as_slice() {
                [single] => single.clone(),
                _ => format!("{{{}}}", elements.join(", ")),
            };
        }

        match self.constant_string(node) {
            Some(folded) => format!("\"{}\"", folded),
            None => collapse_whitespace(self.text(node)),
        }
    }

    fn constant_string(&self, node: Node) -> Option<String> {
        match node.kind() {
            "string_literal" => {
                let text = self.text(node);
                Some(text.trim_matches('"').to_string())
            }
            "parenthesized_expression" => self.constant_string(node.named_child(0)?),
            "binary_expression" => {
                let operator = node.child_by_field_name("operator")?;
                if self.text(operator) != "+" {
                    return None;
                }
                let left = self.constant_string(node.child_by_field_name("left")?)?;
                let right = self.constant_string(node.child_by_field_name("right")?)?;
                Some(left + &right)
            }
            _ => None,
        }
    }

    fn type_list(&self, node: Node) -> Vec<TypeRef> {
        let mut cursor = node.walk();
        let list = node.named_children(&mut cursor).find(|c| c.kind() == "type_list");
        let Some(list) = list else {
            return Vec::new();
        };

        let mut cursor = list.walk();
        list.named_children(&mut cursor)
            .filter(|c| !is_comment(c.kind()))
            .map(|c| self.type_ref(c))
            .collect()
    }

    fn first_type_child(&self, node: Node) -> Option<TypeRef> {
        let mut cursor = node.walk();
        let found = node
            .named_children(&mut cursor)
            .find(|c| !is_comment(c.kind()));
        found.map(|c| self.type_ref(c))
    }

    fn type_ref(&self, node: Node) -> TypeRef {
        match node.kind() {
            "void_type" | "integral_type" | "floating_point_type" | "boolean_type" => {
                TypeRef::primitive(self.text(node))
            }
            "type_identifier" => TypeRef::named(self.text(node)),
            "scoped_type_identifier" => TypeRef::named(&self.scoped_name(node)),
            "generic_type" => {
                let mut base = None;
                let mut arguments = Vec::new();
                let mut cursor = node.walk();
                for child in node.named_children(&mut cursor) {
                    match child.kind() {
                        "type_arguments" => arguments = self.type_arguments(child),
                        kind if is_comment(kind) => {}
                        _ if base.is_none() => base = Some(self.type_ref(child)),
                        _ => {}
                    }
                }
                base.unwrap_or_else(|| TypeRef::named("Object"))
                    .with_arguments(arguments)
            }
            "array_type" => {
                let element = node
                    .child_by_field_name("element")
                    .map(|e| self.type_ref(e))
                    .unwrap_or_else(|| TypeRef::named("Object"));
                let dimensions = node
                    .child_by_field_name("dimensions")
                    .map(count_dimensions)
                    .unwrap_or(1);
                element.with_dimensions(dimensions)
            }
            "annotated_type" => {
                let mut cursor = node.walk();
                let inner = node
                    .named_children(&mut cursor)
                    .filter(|c| !matches!(c.kind(), "marker_annotation" | "annotation"))
                    .last();
                inner
                    .map(|c| self.type_ref(c))
                    .unwrap_or_else(|| TypeRef::named("Object"))
            }
            "wildcard" => self.wildcard_bound(node),
            _ => TypeRef::named(&strip_whitespace(self.text(node))),
        }
    }

    fn type_arguments(&self, node: Node) -> Vec<TypeRef> {
        let mut cursor = node.walk();
        node.named_children(&mut cursor)
            .filter(|c| !is_comment(c.kind()))
            .map(|c| self.type_ref(c))
            .collect()
    }

    /// `? extends Item` stands for `Item`, a bare `?` for `Object`
    fn wildcard_bound(&self, node: Node) -> TypeRef {
        let mut cursor = node.walk();
        let bound = node
            .named_children(&mut cursor)
            .filter(|c| !matches!(c.kind(), "marker_annotation" | "annotation" | "super") && !is_comment(c.kind()))
            .last();
        bound
            .map(|b| self.type_ref(b))
            .unwrap_or_else(|| TypeRef::named("Object"))
    }

    /// `java.util.Map.Entry` from a scoped type identifier, dropping
    /// annotations and type arguments of the qualifying parts
    fn scoped_name(&self, node: Node) -> String {
        let mut segments = Vec::new();
        self.collect_segments(node, &mut segments);
        segments.join(".")
    }

    fn collect_segments(&self, node: Node, segments: &mut Vec<String>) {
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            match child.kind() {
                "type_identifier" | "identifier" => segments.push(self.text(child).to_string()),
                "scoped_type_identifier" | "generic_type" | "scoped_identifier" => {
                    self.collect_segments(child, segments)
                }
                _ => {}
            }
        }
    }

    /// Javadoc comment attached to a declaration.
    ///
    /// The comment is either the nearest preceding `/** */` sibling (line
    /// comments and plain block comments in between are skipped) or, when
    /// annotations come first, a `/** */` inside the modifiers.
    fn doc_comment(&self, node: Node) -> DocComment {
        let mut sibling = node.prev_sibling();
        while let Some(current) = sibling {
            match current.kind() {
                "block_comment" => {
                    let text = self.text(current);
                    if text.starts_with("/**") {
                        return parse_doc_comment(text);
                    }
                }
                "line_comment" => {}
                _ => break,
            }
            sibling = current.prev_sibling();
        }

        let mut cursor = node.walk();
        let modifiers = node.children(&mut cursor).find(|c| c.kind() == "modifiers");
        if let Some(modifiers) = modifiers {
            let mut cursor = modifiers.walk();
            let doc = modifiers
                .children(&mut cursor)
                .find(|c| c.kind() == "block_comment" && self.text(*c).starts_with("/**"));
            if let Some(doc) = doc {
                return parse_doc_comment(self.text(doc));
            }
        }

        DocComment::default()
    }
}

fn class_kind(node_kind: &str) -> Option<ClassKind> {
    match node_kind {
        "class_declaration" => Some(ClassKind::Class),
        "interface_declaration" => Some(ClassKind::Interface),
        "enum_declaration" => Some(ClassKind::Enum),
        "record_declaration" => Some(ClassKind::Record),
        "annotation_type_declaration" => Some(ClassKind::Annotation),
        _ => None,
    }
}

fn is_comment(kind: &str) -> bool {
    matches!(kind, "block_comment" | "line_comment")
}

/// Members of a class, interface, enum or annotation body. Enum bodies keep
/// their constants first, followed by the declarations after the `;`.
fn body_members(body: Node) -> Vec<Node> {
    let mut members = Vec::new();
    let mut cursor = body.walk();
    for child in body.named_children(&mut cursor) {
        if child.kind() == "enum_body_declarations" {
            let mut inner = child.walk();
            members.extend(child.named_children(&mut inner));
        } else {
            members.push(child);
        }
    }
    members
}

fn count_dimensions(node: Node) -> usize {
    let mut cursor = node.walk();
    let count = node.children(&mut cursor).filter(|c| c.kind() == "[").count();
    count.max(1)
}

fn strip_whitespace(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
