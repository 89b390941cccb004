use pretty_assertions::assert_eq;
use restdoc_from_source::{
    description::TypeFilter,
    doclet::{self, DocletOptions, LogReporter},
    extractor::{spring::SpringExtractor, EndpointExtractor, RestApiDetails, RestApiParameter},
    model::DeclarationModel,
    parser::JavaParser,
    scanner::FileScanner,
    type_resolver::TypeResolver,
};
use serde_json::{json, Value};
use tempfile::TempDir;

/// Helper function to create a temporary Maven-style project
fn create_test_project(files: Vec<(&str, &str)>) -> TempDir {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");

    for (path, content) in files {
        let file_path = temp_dir.path().join(path);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        std::fs::write(&file_path, content).expect("Failed to write test file");
    }

    temp_dir
}

fn spring_project() -> TempDir {
    create_test_project(vec![
        (
            "src/main/java/com/acme/api/ItemController.java",
            include_str!("fixtures/spring/ItemController.java"),
        ),
        (
            "src/main/java/com/acme/api/StatusController.java",
            include_str!("fixtures/spring/StatusController.java"),
        ),
        (
            "src/main/java/com/acme/model/Category.java",
            include_str!("fixtures/spring/Category.java"),
        ),
        (
            "src/main/java/com/acme/model/Entity.java",
            include_str!("fixtures/spring/Entity.java"),
        ),
        (
            "src/main/java/com/acme/model/Item.java",
            include_str!("fixtures/spring/Item.java"),
        ),
        (
            "src/main/java/com/acme/model/Status.java",
            include_str!("fixtures/spring/Status.java"),
        ),
        (
            "src/main/java/com/acme/service/LegacyService.java",
            include_str!("fixtures/spring/LegacyService.java"),
        ),
        ("pom.xml", "<project/>"),
    ])
}

/// Scan, parse and resolve a project directory
fn build_model(project: &TempDir) -> DeclarationModel {
    let scanner = FileScanner::new(project.path().to_path_buf());
    let scan_result = scanner.scan().expect("Failed to scan directory");
    assert_eq!(scan_result.java_files.len(), 7);

    let parsed_files: Vec<_> = JavaParser::parse_files(&scan_result.java_files)
        .into_iter()
        .filter_map(Result::ok)
        .collect();
    assert_eq!(parsed_files.len(), 7);

    TypeResolver::from_parsed_files(parsed_files).resolve()
}

fn extract(model: &DeclarationModel, types: &str) -> Vec<RestApiDetails> {
    SpringExtractor::new(TypeFilter::from_option(types)).extract_endpoints(model)
}

fn structure(endpoint: &RestApiDetails) -> Value {
    let body = endpoint.request_body.as_ref().expect("endpoint has a request body");
    let text = body.structure.as_ref().expect("structure was rendered");
    serde_json::from_str(text).expect("structure is valid JSON")
}

#[test]
fn test_spring_end_to_end_extraction() {
    let project = spring_project();
    let model = build_model(&project);

    let endpoints = extract(&model, "com.acme");

    let summary: Vec<(&str, &str)> = endpoints
        .iter()
        .map(|e| (e.method.as_str(), e.url.as_str()))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("GET", "/api/items/{id}"),
            ("GET", "/api/items"),
            ("POST, PUT", "/api/items"),
            ("POST", "/api/categories"),
            ("DELETE", "/status/{messageId}"),
        ]
    );
}

#[test]
fn test_fetch_item_endpoint() {
    let project = spring_project();
    let model = build_model(&project);

    let endpoints = extract(&model, "");
    let find = &endpoints[0];

    assert_eq!(find.url, "/api/items/{id}");
    assert_eq!(find.method, "GET");
    assert_eq!(find.produces, "application/json");
    assert_eq!(find.consumes, "");
    assert_eq!(find.path_variables, vec![RestApiParameter::new("id", "long", "the item id")]);
    assert!(find.request_params.is_empty());
    assert!(find.request_body.is_none());
    assert_eq!(find.description, "Fetch an item.");
}

#[test]
fn test_request_params_use_aliases() {
    let project = spring_project();
    let model = build_model(&project);

    let endpoints = extract(&model, "");
    let search = &endpoints[1];

    assert_eq!(search.description, "Search items by name.");
    assert_eq!(
        search.request_params,
        vec![
            RestApiParameter::new("q", "String", "part of the item name"),
            RestApiParameter::new("limit", "int", "maximum number of results"),
        ]
    );

    let remove = &endpoints[4];
    assert_eq!(remove.path_variables, vec![RestApiParameter::new("messageId", "String", "")]);
    assert_eq!(remove.description, "Remove a status message.");
}

#[test]
fn test_request_body_structure() {
    let project = spring_project();
    let model = build_model(&project);

    let endpoints = extract(&model, "com.acme");
    let save = &endpoints[2];

    assert_eq!(save.consumes, "application/json");
    assert_eq!(save.description, "Store a new Item.");

    let body = save.request_body.as_ref().unwrap();
    assert_eq!(body.parameter, RestApiParameter::new("item", "com.acme.model.Item", "the item to store"));
    assert_eq!(
        structure(save),
        json!({
            "active": "boolean",
            "created": "Instant",
            "id": "long",
            "name": "String",
            "scores": ["int"],
            "status": "DRAFT|PUBLISHED|ARCHIVED",
            "tags": ["String"]
        })
    );
}

#[test]
fn test_self_referencing_body_terminates() {
    let project = spring_project();
    let model = build_model(&project);

    let endpoints = extract(&model, "com.acme.model");
    let create = &endpoints[3];

    assert_eq!(
        structure(create),
        json!({
            "children": ["Category"],
            "name": "String",
            "parent": "Category"
        })
    );
}

#[test]
fn test_filter_outside_model_packages() {
    let project = spring_project();
    let model = build_model(&project);

    let endpoints = extract(&model, "org.example");

    assert_eq!(structure(&endpoints[2]), json!("Item"));
    assert_eq!(structure(&endpoints[3]), json!("Category"));
}

#[test]
fn test_non_controller_contributes_nothing() {
    let project = create_test_project(vec![(
        "LegacyService.java",
        include_str!("fixtures/spring/LegacyService.java"),
    )]);
    let scan_result = FileScanner::new(project.path().to_path_buf()).scan().unwrap();
    let parsed_files: Vec<_> = JavaParser::parse_files(&scan_result.java_files)
        .into_iter()
        .filter_map(Result::ok)
        .collect();
    let model = TypeResolver::from_parsed_files(parsed_files).resolve();

    assert_eq!(model.len(), 1);
    assert!(extract(&model, "").is_empty());
}

#[test]
fn test_doclet_writes_html_page() {
    let project = spring_project();
    let model = build_model(&project);
    let output = project.path().join("target/site/api.html");

    let options = DocletOptions::from_host_options(&[
        vec!["-heading".to_string(), "Item API".to_string()],
        vec!["-types".to_string(), "com.acme".to_string()],
        vec!["-output".to_string(), output.to_string_lossy().to_string()],
    ])
    .unwrap();

    assert!(doclet::start(&model, &options, &LogReporter));

    let html = std::fs::read_to_string(&output).expect("page was written");
    assert!(html.contains("<title>Item API</title>"));
    assert!(html.contains("/api/items/{id}"));
    assert!(html.contains("/status/{messageId}"));
    assert!(html.contains("Fetch an item."));
    assert!(html.contains("<td>q</td><td>String</td><td>part of the item name</td>"));
    assert!(html.contains("&quot;status&quot;: &quot;DRAFT|PUBLISHED|ARCHIVED&quot;"));
    assert!(!html.contains("/legacy"));
}

#[test]
fn test_doclet_fails_on_unknown_template() {
    let project = spring_project();
    let model = build_model(&project);

    let options = DocletOptions {
        output: project.path().join("index.html"),
        template: "velocity/missing.vm".to_string(),
        ..DocletOptions::default()
    };

    assert!(!doclet::start(&model, &options, &LogReporter));
    assert!(!options.output.exists());
}

#[test]
fn test_model_round_trips_through_json() {
    let project = spring_project();
    let model = build_model(&project);

    let json_path = project.path().join("model.json");
    std::fs::write(&json_path, serde_json::to_string_pretty(&model).unwrap()).unwrap();
    let loaded = restdoc_from_source::model::load_model(&json_path).unwrap();

    assert_eq!(extract(&loaded, "com.acme"), extract(&model, "com.acme"));
}
