//! Endpoint extraction from a declaration model.
//!
//! An extractor walks the declared classes, recognises the controllers of a
//! web framework and derives one [`RestApiDetails`] record per mapped method.
//! The records are what the HTML template renders.
//!
//! # Supported Frameworks
//!
//! - **Spring MVC**: See [`spring::SpringExtractor`]
//!
//! # Example
//!
//! ```no_run
//! use restdoc_from_source::description::TypeFilter;
//! use restdoc_from_source::extractor::{EndpointExtractor, spring::SpringExtractor};
//! use restdoc_from_source::model::load_model;
//! use std::path::Path;
//!
//! let model = load_model(Path::new("model.json")).unwrap();
//! let extractor = SpringExtractor::new(TypeFilter::from_option("com.acme"));
//! let endpoints = extractor.extract_endpoints(&model);
//! println!("Found {} endpoints", endpoints.len());
//! ```

pub mod spring;

use crate::model::DeclarationModel;
use serde::Serialize;

/// Trait for extracting endpoints from a declaration model.
///
/// Implementations know the annotations of one web framework. Classes that
/// are not controllers of that framework contribute nothing.
pub trait EndpointExtractor {
    /// Extracts every endpoint of the model, in class order then method
    /// order.
    fn extract_endpoints(&self, model: &DeclarationModel) -> Vec<RestApiDetails>;
}

/// Everything the reference page shows about one endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RestApiDetails {
    /// Class fragment followed by the method fragment, e.g. `/api/items/{id}`
    pub url: String,
    /// HTTP verb(s), e.g. `GET` or `GET, POST`; `unknown` when unmapped
    pub method: String,
    pub produces: String,
    pub consumes: String,
    pub path_variables: Vec<RestApiParameter>,
    pub request_params: Vec<RestApiParameter>,
    pub request_body: Option<RestApiRequestBody>,
    /// Method comment with inline markup removed
    pub description: String,
}

/// A documented method parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RestApiParameter {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub description: String,
}

impl RestApiParameter {
    pub fn new(name: &str, type_name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            type_name: type_name.to_string(),
            description: description.to_string(),
        }
    }
}

/// The request body parameter together with a JSON sample of its shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RestApiRequestBody {
    #[serde(flatten)]
    pub parameter: RestApiParameter,
    /// Pretty-printed description of the body type, `None` when it could not
    /// be serialized
    pub structure: Option<String>,
}
