#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use crate::config::GeneratorConfig;
use crate::diagnostics::Severity;
use crate::metadata::{
    DataType, FieldMeta, Parameter, RecordType, Route, DESCRIPTION_KEY, ENUM_KEY, JSON_KEY,
    STORAGE_KEY, VALIDATE_KEY,
};
use http::Method;
use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_dir() -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let dir = std::env::temp_dir().join(format!("gen_test_{}_{}", std::process::id(), nanos));
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn team() -> RecordType {
    RecordType::new("Team")
        .with_doc("A team")
        .field(FieldMeta::new("name", "String").annotate(VALIDATE_KEY, "required"))
        .field(FieldMeta::new("lead", "Option<Box<Member>>").nested(member))
}

fn member() -> RecordType {
    RecordType::new("Member")
        .field(FieldMeta::new("login", "String"))
        .field(FieldMeta::new("team", "Team").nested(team))
}

fn count(haystack: &str, needle: &str) -> usize {
    haystack.matches(needle).count()
}

#[test]
fn test_resolution_is_idempotent() {
    let config = GeneratorConfig::default();
    let builtins = BuiltinTypes::default();
    let mut resolver = TypeResolver::new(&config, &builtins);
    assert_eq!(resolver.resolve(&member()), "Member");
    let first = resolver.descriptor("Member").cloned().unwrap();
    assert_eq!(resolver.resolve(&member()), "Member");
    assert_eq!(resolver.descriptor("Member"), Some(&first));

    let mut generator = Generator::new(config.clone());
    generator.register_type(member()).register_type(member());
    let output = generator.generate().unwrap();
    assert_eq!(count(&output.declarations, "type Member = {"), 1);
}

#[test]
fn test_cycle_through_two_records_terminates() {
    let mut generator = Generator::new(GeneratorConfig::default());
    generator.register_type(team());
    let output = generator.generate().unwrap();
    let decl = &output.declarations;
    assert_eq!(count(decl, "type Team = {"), 1);
    assert_eq!(count(decl, "type Member = {"), 1);
    assert!(decl.contains("  lead?: Member;\n"));
    assert!(decl.contains("  team?: Team;\n"));
    assert!(!decl.contains("= any;"));
}

#[test]
fn test_enum_synthesis_keeps_declared_order() {
    let mut generator = Generator::new(GeneratorConfig::default());
    generator.register_type(
        RecordType::new("Role").field(
            FieldMeta::new("role", "String")
                .annotate(ENUM_KEY, "admin|view|edit|none")
                .annotate(DESCRIPTION_KEY, "role kind"),
        ),
    );
    let (schema, _) = generator.resolve();
    let constant = &schema.enums["RoleRole"];
    assert_eq!(constant.kind, EnumKind::Text);
    let raw: Vec<String> = constant.values.iter().map(EnumLiteral::raw).collect();
    assert_eq!(raw, vec!["admin", "view", "edit", "none"]);

    let output = generator.generate().unwrap();
    assert!(output
        .declarations
        .starts_with("// role kind\ntype RoleRole = 'admin'|'view'|'edit'|'none';\n"));
    assert!(output.declarations.contains("  // values: admin;view;edit;none\n"));
    assert!(output.declarations.contains("  role?: RoleRole;\n"));
}

#[test]
fn test_suppressed_field_is_omitted() {
    let mut generator = Generator::new(GeneratorConfig::default());
    generator.register_type(
        RecordType::new("User")
            .field(FieldMeta::new("login", "String"))
            .field(
                FieldMeta::new("password", "String")
                    .annotate(JSON_KEY, "-")
                    .annotate(VALIDATE_KEY, "required")
                    .annotate(DESCRIPTION_KEY, "secret")
                    .annotate(ENUM_KEY, "a|b"),
            ),
    );
    let output = generator.generate().unwrap();
    assert!(!output.declarations.contains("password"));
    assert!(!output.declarations.contains("secret"));
    assert!(!output.declarations.contains("UserPassword"));
}

#[test]
fn test_optional_and_required_markers() {
    let mut generator = Generator::new(GeneratorConfig::default());
    generator.register_type(
        RecordType::new("Item")
            .field(FieldMeta::new("id", "u64").annotate(VALIDATE_KEY, "required"))
            .field(FieldMeta::new("note", "String"))
            .field(FieldMeta::new("skipped", "String").annotate(VALIDATE_KEY, "-")),
    );
    let output = generator.generate().unwrap();
    assert!(output.declarations.contains("  id: number;\n"));
    assert!(output.declarations.contains("  note?: string;\n"));
    assert!(output.declarations.contains("  skipped?: string;\n"));
}

#[test]
fn test_leftover_alias_emitted_once() {
    let mut generator = Generator::new(GeneratorConfig::default());
    generator.register_type(
        RecordType::new("Pod")
            .field(FieldMeta::new("spec", "k8s::PodSpec"))
            .field(FieldMeta::new("template_spec", "Option<k8s::PodSpec>")),
    );
    let output = generator.generate().unwrap();
    assert_eq!(count(&output.declarations, "type PodSpec = any;"), 1);
    assert!(output.declarations.ends_with("type PodSpec = any;\n"));
}

#[test]
fn test_storage_comments() {
    let mut generator = Generator::new(GeneratorConfig::default());
    generator.register_type(
        RecordType::new("Profile").field(
            FieldMeta::new("bio", "String")
                .annotate(STORAGE_KEY, "type:varchar(255);default:none")
                .annotate(DESCRIPTION_KEY, "about me"),
        ),
    );
    let output = generator.generate().unwrap();
    assert!(output.declarations.contains(
        "  // about me\n  // default: none\n  // max length: 255\n  bio?: string;\n"
    ));
}

#[test]
fn test_definitions_only_emitted_when_referenced() {
    let mut generator = Generator::new(GeneratorConfig::default());
    generator
        .define_type(RecordType::new("Address").field(FieldMeta::new("city", "String")))
        .define_type(RecordType::new("Unused"))
        .register_type(RecordType::new("Customer").field(FieldMeta::new("home", "Address")));
    let output = generator.generate().unwrap();
    assert!(output.declarations.contains("type Address = {"));
    assert!(output.declarations.contains("  home?: Address;\n"));
    assert!(!output.declarations.contains("Unused"));
}

#[test]
fn test_route_payloads_are_registered() {
    let mut generator = Generator::new(GeneratorConfig::default());
    generator.register_route(
        Route::new(Method::POST, "/teams")
            .operation("createTeam")
            .tag("team")
            .reads_type(team())
            .returns(201, "Created", Some(RecordType::new("TeamCreated")))
            .returns(
                409,
                "Conflict",
                Some(RecordType::new("Conflict").field(
                    FieldMeta::new("reason", "String").annotate(DESCRIPTION_KEY, "why"),
                )),
            ),
    );
    let output = generator.generate().unwrap();
    assert!(output.declarations.contains("type Team = {"));
    assert!(output.declarations.contains("type TeamCreated = {"));
    assert!(!output.declarations.contains("type Conflict"));

    let api = &output.apis["team"];
    assert!(api.contains("// response 201: TeamCreated\n"));
    assert!(api.contains("// response 409: {\"reason\":\"why\"}\n"));
    assert!(api.contains("export const postCreateTeam = async (params?: any) => {"));
    assert!(api.contains("{ method: 'post', body: rest }"));
}

#[test]
fn test_duplicate_routes_keep_last_registration() {
    let mut generator = Generator::new(GeneratorConfig::default());
    generator
        .register_route(Route::new(Method::GET, "/status").operation("first").doc("old"))
        .register_route(Route::new(Method::GET, "/status").operation("second").doc("new"));
    let output = generator.generate().unwrap();
    let api = &output.apis["api"];
    assert!(api.contains("export const getSecond"));
    assert!(!api.contains("getFirst"));
    assert_eq!(count(api, "export const"), 1);
}

#[test]
fn test_routes_sorted_within_group() {
    let mut generator = Generator::new(GeneratorConfig::default());
    generator
        .register_route(Route::new(Method::POST, "/b").operation("b"))
        .register_route(Route::new(Method::GET, "/z").operation("z"))
        .register_route(Route::new(Method::GET, "/a").operation("a"));
    let output = generator.generate().unwrap();
    let api = &output.apis["api"];
    let a = api.find("getA").unwrap();
    let z = api.find("getZ").unwrap();
    let b = api.find("postB").unwrap();
    assert!(a < z && z < b);
}

#[test]
fn test_failing_route_template_isolated() {
    let dir = temp_dir();
    let template = dir.join("stub.ts.j2");
    fs::write(
        &template,
        concat!(
            "{% if function_name == 'getBroken' %}{{ missing_variable }}{% endif %}",
            "export const {{ function_name }} = 1;\n",
        ),
    )
    .unwrap();
    let config = GeneratorConfig {
        route_template: Some(template),
        ..GeneratorConfig::default()
    };
    let mut generator = Generator::new(config);
    generator
        .register_route(Route::new(Method::GET, "/ok").operation("ok"))
        .register_route(Route::new(Method::GET, "/broken").operation("broken"));
    let output = generator.generate().unwrap();

    let api = &output.apis["api"];
    assert!(api.contains("export const getOk = 1;"));
    assert!(!api.contains("getBroken"));
    assert_eq!(output.diagnostics.len(), 1);
    assert_eq!(output.diagnostics[0].severity, Severity::Error);
    assert_eq!(output.diagnostics[0].kind, "route_render");
    assert_eq!(output.diagnostics[0].location, "route:GET /broken");
    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_custom_template_syntax_error_propagates() {
    let dir = temp_dir();
    let template = dir.join("bad.ts.j2");
    fs::write(&template, "{% for %}").unwrap();
    let config = GeneratorConfig {
        route_template: Some(template),
        ..GeneratorConfig::default()
    };
    let mut generator = Generator::new(config);
    generator.register_route(Route::new(Method::GET, "/ok").operation("ok"));
    assert!(generator.generate().is_err());
    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_missing_template_file_is_an_error() {
    let config = GeneratorConfig {
        route_template: Some(PathBuf::from("/nonexistent/stub.ts.j2")),
        ..GeneratorConfig::default()
    };
    assert!(Generator::new(config).generate().is_err());
}

#[test]
fn test_generate_with_scope_and_dry_run() {
    let dir = temp_dir();
    let config = GeneratorConfig {
        date_prefix: false,
        ..GeneratorConfig::default()
    };
    let mut generator = Generator::new(config);
    generator
        .register_type(RecordType::new("Ping").field(FieldMeta::new("at", "u64")))
        .register_route(
            Route::new(Method::GET, "/ping")
                .operation("ping")
                .tag("health-check")
                .param(Parameter::query("verbose", DataType::Boolean)),
        );

    let only_types = GenerationScope {
        types: true,
        apis: false,
    };
    let report = generator
        .generate_with_options(&dir, &only_types, false)
        .unwrap();
    assert_eq!(report.written, vec![dir.join("types.d.ts")]);
    assert!(dir.join("types.d.ts").exists());
    assert!(!dir.join("health_check.api.ts").exists());

    let dry = generator
        .generate_with_options(&dir, &GenerationScope::all(), true)
        .unwrap();
    assert_eq!(dry.written.len(), 2);
    assert!(!dir.join("health_check.api.ts").exists());

    generator.generate_to_dir(&dir).unwrap();
    let api = fs::read_to_string(dir.join("health_check.api.ts")).unwrap();
    assert!(api.contains("// param verbose type: boolean in: query required: no description:\n"));
    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_empty_generator_writes_nothing() {
    let dir = temp_dir().join("out");
    let report = Generator::new(GeneratorConfig::default())
        .generate_to_dir(&dir)
        .unwrap();
    assert!(report.written.is_empty());
    assert!(!dir.exists());
}

#[test]
fn test_enum_alias_name_clash_is_reported() {
    let mut generator = Generator::new(GeneratorConfig::default());
    generator
        .register_type(
            RecordType::new("Account")
                .field(FieldMeta::new("role", "String").annotate(ENUM_KEY, "admin|view")),
        )
        .register_type(RecordType::new("AccountRole").field(FieldMeta::new("id", "u32")));
    let output = generator.generate().unwrap();

    assert_eq!(count(&output.declarations, "type AccountRole = "), 2);
    let clash: Vec<_> = output
        .diagnostics
        .iter()
        .filter(|d| d.kind == "name_clash")
        .collect();
    assert_eq!(clash.len(), 1);
    assert_eq!(clash[0].severity, Severity::Error);
}
