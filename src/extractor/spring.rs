use crate::description::{TypeDescriber, TypeFilter};
use crate::extractor::{EndpointExtractor, RestApiDetails, RestApiParameter, RestApiRequestBody};
use crate::model::{Annotated, AnnotationDecl, AnnotationLike, ClassDecl, DeclarationModel, MethodDecl, ParamDecl};
use crate::sanitizer::sanitize_comment;
use log::{debug, info, warn};

/// Class annotations marking a Spring controller
const CONTROLLER_ANNOTATIONS: &[&str] = &["Controller", "RestController"];

/// Method annotations mapping a request, with the verb a shortcut implies
const MAPPING_ANNOTATIONS: &[(&str, Option<&str>)] = &[
    ("RequestMapping", None),
    ("GetMapping", Some("GET")),
    ("PostMapping", Some("POST")),
    ("PutMapping", Some("PUT")),
    ("DeleteMapping", Some("DELETE")),
    ("PatchMapping", Some("PATCH")),
];

/// Spring MVC endpoint extractor.
///
/// Controllers are classes annotated `@Controller` or `@RestController`.
/// Each of their methods carrying `@RequestMapping` or a composed shortcut
/// such as `@GetMapping` becomes an endpoint. Request bodies are described
/// recursively for the types the filter accepts.
pub struct SpringExtractor {
    filter: TypeFilter,
}

/// A method's request mapping annotation
struct Mapping<'m> {
    annotation: &'m AnnotationDecl,
    /// Verb implied by a shortcut such as `@GetMapping`
    implied_verb: Option<&'static str>,
}

impl SpringExtractor {
    pub fn new(filter: TypeFilter) -> Self {
        Self { filter }
    }

    fn controller_annotation<'c>(&self, class: &'c ClassDecl) -> Option<&'c AnnotationDecl> {
        CONTROLLER_ANNOTATIONS
            .iter()
            .find_map(|name| class.annotation(name))
    }

    fn find_mapping<'m>(&self, annotated: &'m impl Annotated) -> Option<Mapping<'m>> {
        annotated.annotations().iter().find_map(|annotation| {
            MAPPING_ANNOTATIONS
                .iter()
                .find(|(name, _)| annotation.simple_name() == *name)
                .map(|(_, implied_verb)| Mapping {
                    annotation,
                    implied_verb: *implied_verb,
                })
        })
    }

    /// URL fragment contributed by the class: its `@RequestMapping`, else the
    /// value of the controller annotation itself.
    fn class_fragment(&self, class: &ClassDecl, controller: &AnnotationDecl) -> String {
        match class.annotation("RequestMapping") {
            Some(mapping) => mapping_fragment(mapping),
            None => controller.attribute_value("value").unwrap_or_default(),
        }
    }

    fn extract_endpoint(
        &self,
        describer: &TypeDescriber,
        class_fragment: &str,
        method: &MethodDecl,
        mapping: &Mapping,
    ) -> RestApiDetails {
        let url = format!("{}{}", class_fragment, mapping_fragment(mapping.annotation));
        let verb = http_verb(mapping);

        let endpoint = RestApiDetails {
            url,
            method: verb,
            produces: mapping.annotation.attribute_value("produces").unwrap_or_default(),
            consumes: mapping.annotation.attribute_value("consumes").unwrap_or_default(),
            path_variables: self.annotated_parameters(method, "PathVariable"),
            request_params: self.annotated_parameters(method, "RequestParam"),
            request_body: self.request_body(describer, method),
            description: sanitize_comment(&method.comment),
        };

        debug!(
            "Found endpoint: {} {} -> {}",
            endpoint.method, endpoint.url, method.name
        );
        endpoint
    }

    /// Parameters carrying `annotation_name`, named after the annotation's
    /// alias when it has one.
    fn annotated_parameters(&self, method: &MethodDecl, annotation_name: &str) -> Vec<RestApiParameter> {
        method
            .parameters
            .iter()
            .filter_map(|parameter| {
                let annotation = parameter.annotation(annotation_name)?;
                let name = parameter_alias(annotation).unwrap_or_else(|| parameter.name.clone());
                Some(RestApiParameter {
                    name,
                    type_name: parameter.type_ref.to_string(),
                    description: parameter_description(method, parameter),
                })
            })
            .collect()
    }

    fn request_body(&self, describer: &TypeDescriber, method: &MethodDecl) -> Option<RestApiRequestBody> {
        let mut bodies = method
            .parameters
            .iter()
            .filter(|p| p.is_annotated_with("RequestBody"));
        let body = bodies.next()?;
        if bodies.next().is_some() {
            warn!(
                "Method {} has more than one @RequestBody parameter, documenting only {}",
                method.name, body.name
            );
        }

        Some(RestApiRequestBody {
            parameter: RestApiParameter {
                name: body.name.clone(),
                type_name: body.type_ref.qualified_display(),
                description: parameter_description(method, body),
            },
            structure: describer.render_structure(&body.type_ref),
        })
    }
}

impl EndpointExtractor for SpringExtractor {
    fn extract_endpoints(&self, model: &DeclarationModel) -> Vec<RestApiDetails> {
        let describer = TypeDescriber::new(model, &self.filter);
        let mut endpoints = Vec::new();

        for class in model.classes() {
            let Some(controller) = self.controller_annotation(class) else {
                continue;
            };
            debug!("Processing controller {}", class.qualified_name);
            let class_fragment = self.class_fragment(class, controller);

            for method in &class.methods {
                if let Some(mapping) = self.find_mapping(method) {
                    endpoints.push(self.extract_endpoint(&describer, &class_fragment, method, &mapping));
                }
            }
        }

        info!("Extracted {} endpoints", endpoints.len());
        endpoints
    }
}

/// `value` of a mapping, falling back to its `path` alias
fn mapping_fragment(mapping: &AnnotationDecl) -> String {
    mapping
        .attribute_value("value")
        .filter(|v| !v.is_empty())
        .or_else(|| mapping.attribute_value("path"))
        .unwrap_or_default()
}

/// Verbs named by the `method` attribute, e.g. `RequestMethod.GET` or
/// `{RequestMethod.GET, RequestMethod.POST}`, reduced to `GET` / `GET, POST`.
fn http_verb(mapping: &Mapping) -> String {
    let verbs: Vec<String> = mapping
        .annotation
        .attribute_value("method")
        .map(|raw| {
            raw.trim()
                .trim_start_matches('{')
                .trim_end_matches('}')
                .split(',')
                .map(str::trim)
                .filter(|element| !element.is_empty())
                .map(|element| element.rsplit('.').next().unwrap_or(element).to_string())
                .collect()
        })
        .unwrap_or_default();

    if !verbs.is_empty() {
        return verbs.join(", ");
    }
    mapping.implied_verb.unwrap_or("unknown").to_string()
}

/// Name given by `@PathVariable("id")` / `@RequestParam(name = "q")`
fn parameter_alias(annotation: &AnnotationDecl) -> Option<String> {
    ["value", "name"]
        .iter()
        .filter_map(|attribute| annotation.attribute_value(attribute))
        .find(|alias| !alias.is_empty())
}

/// Sanitized `@param` text for the parameter's declared name
fn parameter_description(method: &MethodDecl, parameter: &ParamDecl) -> String {
    method
        .param_tag(&parameter.name)
        .map(|tag| sanitize_comment(&tag.comment))
        .unwrap_or_default()
}
