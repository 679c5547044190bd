//! Slice file-set generation and regeneration.
//!
//! Derives template variables from a contract, renders every file role, and
//! on regeneration re-splices previously preserved regions. All structural
//! text always reflects the latest contract; all preserved text is always
//! carried forward verbatim.

use std::collections::HashMap;

use tracing::debug;

use slicewright_spec::{Contract, FieldType};

use crate::engine::{SkeletonTemplateEngine, TemplateContext};
use crate::error::SkeletonError;
use crate::markers::{extract_preserved, merge_preserved, MarkerStyle};

/// The fixed file roles every slice is made of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileRole {
    /// Transport wiring (route registration).
    Handler,
    /// Business logic entry point.
    Service,
    /// Data access.
    Repository,
    /// Request/response models and error types.
    Schema,
    /// Slice test module.
    Test,
}

impl FileRole {
    /// Every role, in generation order.
    pub const ALL: [FileRole; 5] = [
        FileRole::Handler,
        FileRole::Service,
        FileRole::Repository,
        FileRole::Schema,
        FileRole::Test,
    ];

    /// Stable lower-case name; doubles as the template name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Handler => "handler",
            Self::Service => "service",
            Self::Repository => "repository",
            Self::Schema => "schema",
            Self::Test => "test",
        }
    }

    /// File name within the slice directory.
    pub fn file_name(&self, slice: &str) -> String {
        match self {
            Self::Handler => "handler.py".to_string(),
            Self::Service => "service.py".to_string(),
            Self::Repository => "repository.py".to_string(),
            Self::Schema => "schemas.py".to_string(),
            Self::Test => format!("test_{}.py", slice),
        }
    }

    /// Whether files of this role carry a preserved region. Schemas are
    /// fully structural: they are a pure projection of the contract.
    pub fn has_preserved(&self) -> bool {
        !matches!(self, Self::Schema)
    }
}

/// One generated file, not yet written anywhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    /// Role within the slice.
    pub role: FileRole,
    /// File name within the slice directory.
    pub file_name: String,
    /// Full file content.
    pub content: String,
}

/// Previously existing slice files, keyed by role.
pub type ExistingFiles = HashMap<FileRole, String>;

/// Generates and regenerates slice file sets from contracts.
pub struct SkeletonGenerator {
    engine: SkeletonTemplateEngine,
    style: MarkerStyle,
}

impl SkeletonGenerator {
    pub fn new() -> Self {
        Self {
            engine: SkeletonTemplateEngine::new(),
            style: MarkerStyle::PYTHON,
        }
    }

    /// The marker style of the generated target language.
    pub fn marker_style(&self) -> MarkerStyle {
        self.style
    }

    /// First generation: every role rendered fresh, preserved regions
    /// holding their not-implemented placeholders.
    pub fn generate(&self, contract: &Contract) -> Result<Vec<GeneratedFile>, SkeletonError> {
        debug!(slice = %contract.slice, domain = %contract.domain, "generating slice file set");
        FileRole::ALL
            .iter()
            .map(|role| {
                Ok(GeneratedFile {
                    role: *role,
                    file_name: role.file_name(&contract.slice),
                    content: self.render_role(contract, *role)?,
                })
            })
            .collect()
    }

    /// Regeneration: structural regions rebuilt from the new contract,
    /// preserved regions carried over from the existing files.
    ///
    /// Any marker corruption aborts the whole slice before a single file is
    /// produced; the caller commits nothing.
    pub fn regenerate(
        &self,
        contract: &Contract,
        existing: &ExistingFiles,
    ) -> Result<Vec<GeneratedFile>, SkeletonError> {
        debug!(slice = %contract.slice, domain = %contract.domain, "regenerating slice file set");

        // Capture every preserved region up front so corruption anywhere
        // keeps the old files intact.
        let mut preserved: HashMap<FileRole, String> = HashMap::new();
        for role in FileRole::ALL {
            if !role.has_preserved() {
                continue;
            }
            if let Some(content) = existing.get(&role) {
                let text = extract_preserved(content, self.style).map_err(|source| {
                    SkeletonError::MarkerIntegrity {
                        file: role.file_name(&contract.slice),
                        source,
                    }
                })?;
                preserved.insert(role, text);
            }
        }

        FileRole::ALL
            .iter()
            .map(|role| {
                let skeleton = self.render_role(contract, *role)?;
                let content = match preserved.get(role) {
                    Some(text) => merge_preserved(&skeleton, text, self.style).map_err(
                        |source| SkeletonError::MarkerIntegrity {
                            file: role.file_name(&contract.slice),
                            source,
                        },
                    )?,
                    None => skeleton,
                };
                Ok(GeneratedFile {
                    role: *role,
                    file_name: role.file_name(&contract.slice),
                    content,
                })
            })
            .collect()
    }

    /// The `generate-or-regenerate` operation.
    pub fn generate_or_regenerate(
        &self,
        contract: &Contract,
        existing: Option<&ExistingFiles>,
    ) -> Result<Vec<GeneratedFile>, SkeletonError> {
        match existing {
            Some(files) if !files.is_empty() => self.regenerate(contract, files),
            _ => self.generate(contract),
        }
    }

    /// Render one role's fresh skeleton from the contract.
    pub fn render_role(
        &self,
        contract: &Contract,
        role: FileRole,
    ) -> Result<String, SkeletonError> {
        let context = build_context(contract);
        self.engine.render(role.as_str(), &context)
    }
}

impl Default for SkeletonGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Derive every template variable from the contract.
fn build_context(contract: &Contract) -> TemplateContext {
    let pascal = pascal_case(&contract.slice);

    TemplateContext::new()
        .set("slice_name", contract.slice.clone())
        .set("domain", contract.domain.clone())
        .set("request_class", format!("{}Request", pascal))
        .set("response_class", format!("{}Response", pascal))
        .set("service_class", format!("{}Service", pascal))
        .set("repository_class", format!("{}Repository", pascal))
        .set("request_fields", field_block(&contract.inputs))
        .set("response_fields", field_block(&contract.outputs))
        .set("schema_imports", schema_imports(contract))
        .set("error_classes", error_classes(contract))
        .set("behaviour_comment", behaviour_comment(contract))
        .set("request_field_list", field_list(&contract.inputs))
        .set("response_field_list", field_list(&contract.outputs))
}

/// Map a declared type to its Python annotation.
pub fn python_annotation(ty: &FieldType) -> String {
    match ty {
        FieldType::String => "str".to_string(),
        FieldType::Int => "int".to_string(),
        FieldType::Float => "float".to_string(),
        FieldType::Boolean => "bool".to_string(),
        FieldType::DateTime => "datetime".to_string(),
        FieldType::Date => "date".to_string(),
        FieldType::Dict => "dict".to_string(),
        FieldType::List(inner) => format!("list[{}]", python_annotation(inner)),
        FieldType::Optional(inner) => format!("{} | None", python_annotation(inner)),
    }
}

fn field_block(fields: &indexmap::IndexMap<String, FieldType>) -> String {
    if fields.is_empty() {
        return "    pass".to_string();
    }
    fields
        .iter()
        .map(|(name, ty)| format!("    {}: {}", name, python_annotation(ty)))
        .collect::<Vec<_>>()
        .join("\n")
}

fn field_list(fields: &indexmap::IndexMap<String, FieldType>) -> String {
    let mut names: Vec<&str> = fields.keys().map(|k| k.as_str()).collect();
    names.sort_unstable();
    format!(
        "[{}]",
        names
            .iter()
            .map(|n| format!("'{}'", n))
            .collect::<Vec<_>>()
            .join(", ")
    )
}

fn schema_imports(contract: &Contract) -> String {
    let mut names = Vec::new();
    for ty in contract.inputs.values().chain(contract.outputs.values()) {
        uses_temporal(ty, &mut names);
    }
    names.sort_unstable();
    names.dedup();
    if names.is_empty() {
        String::new()
    } else {
        format!("from datetime import {}\n", names.join(", "))
    }
}

fn uses_temporal(ty: &FieldType, out: &mut Vec<&'static str>) {
    match ty {
        FieldType::Date => out.push("date"),
        FieldType::DateTime => out.push("datetime"),
        FieldType::List(inner) | FieldType::Optional(inner) => uses_temporal(inner, out),
        _ => {}
    }
}

fn error_classes(contract: &Contract) -> String {
    contract
        .errors
        .iter()
        .map(|e| {
            format!(
                "\n\n\nclass {}(Exception):\n    \"\"\"{}: {}\"\"\"",
                exception_name(&e.code),
                e.code,
                e.message
            )
        })
        .collect()
}

/// `INVALID_CREDENTIALS` -> `InvalidCredentialsError`.
pub fn exception_name(code: &str) -> String {
    let mut name = pascal_case(&code.to_ascii_lowercase());
    if !name.ends_with("Error") {
        name.push_str("Error");
    }
    name
}

fn behaviour_comment(contract: &Contract) -> String {
    if contract.behaviour.is_empty() {
        return String::new();
    }
    let mut block = String::from("    # Behaviour:\n");
    for (index, step) in contract.behaviour.iter().enumerate() {
        block.push_str(&format!("    # {}. {}\n", index + 1, step));
    }
    block
}

fn pascal_case(name: &str) -> String {
    name.split(|c| c == '_' || c == '-')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use slicewright_spec::compile_spec;

    const LOGIN_SPEC: &str = r#"## Purpose
Authenticate a user and issue a session token.

## Inputs
- email: string
- password: string

## Outputs
- jwt_token: string
- expires_in: int

## Behaviour
- look up the user by email
- verify the password against the stored hash

## Errors
- INVALID_CREDENTIALS: supplied credentials do not match
- USER_NOT_FOUND: no account exists for that email
- ACCOUNT_LOCKED: the account is disabled

## SideEffects
none

## Dependencies
none
"#;

    fn login_contract() -> Contract {
        compile_spec(LOGIN_SPEC, "auth", "login").unwrap()
    }

    fn as_existing(files: &[GeneratedFile]) -> ExistingFiles {
        files
            .iter()
            .map(|f| (f.role, f.content.clone()))
            .collect()
    }

    #[test]
    fn test_generate_emits_all_roles() {
        let files = SkeletonGenerator::new().generate(&login_contract()).unwrap();
        let names: Vec<&str> = files.iter().map(|f| f.file_name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "handler.py",
                "service.py",
                "repository.py",
                "schemas.py",
                "test_login.py"
            ]
        );
    }

    #[test]
    fn test_schema_content_reflects_contract() {
        let files = SkeletonGenerator::new().generate(&login_contract()).unwrap();
        let schema = &files.iter().find(|f| f.role == FileRole::Schema).unwrap().content;

        assert!(schema.contains("class LoginRequest(BaseModel):"));
        assert!(schema.contains("    email: str\n    password: str"));
        assert!(schema.contains("class LoginResponse(BaseModel):"));
        assert!(schema.contains("    jwt_token: str\n    expires_in: int"));
        assert!(schema.contains("class InvalidCredentialsError(Exception):"));
        assert!(schema.contains("class UserNotFoundError(Exception):"));
        assert!(schema.contains("class AccountLockedError(Exception):"));
        // No temporal fields, no datetime import.
        assert!(!schema.contains("from datetime import"));
    }

    #[test]
    fn test_service_lists_behaviour_steps() {
        let files = SkeletonGenerator::new().generate(&login_contract()).unwrap();
        let service = &files.iter().find(|f| f.role == FileRole::Service).unwrap().content;

        assert!(service.contains("# 1. look up the user by email"));
        assert!(service.contains("# 2. verify the password against the stored hash"));
        assert!(service.contains("raise NotImplementedError()"));
    }

    #[test]
    fn test_datetime_import_when_needed() {
        let spec = LOGIN_SPEC.replace("- expires_in: int", "- expires_at: datetime");
        let contract = compile_spec(&spec, "auth", "login").unwrap();
        let files = SkeletonGenerator::new().generate(&contract).unwrap();
        let schema = &files.iter().find(|f| f.role == FileRole::Schema).unwrap().content;

        assert!(schema.contains("from datetime import datetime\n"));
        assert!(schema.contains("    expires_at: datetime"));
    }

    #[test]
    fn test_nested_type_annotation() {
        assert_eq!(
            python_annotation(&FieldType::parse("list<optional<string>>").unwrap()),
            "list[str | None]"
        );
        assert_eq!(
            python_annotation(&FieldType::parse("optional<list<int>>").unwrap()),
            "list[int] | None"
        );
    }

    #[test]
    fn test_regeneration_is_idempotent() {
        let generator = SkeletonGenerator::new();
        let contract = login_contract();

        let first = generator.generate(&contract).unwrap();
        let second = generator
            .regenerate(&contract, &as_existing(&first))
            .unwrap();
        let third = generator
            .regenerate(&contract, &as_existing(&second))
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(second, third);
    }

    #[test]
    fn test_preserved_code_survives_contract_change() {
        let generator = SkeletonGenerator::new();
        let contract = login_contract();
        let files = generator.generate(&contract).unwrap();

        // Implementer fills in the service logic.
        let mut existing = as_existing(&files);
        let service = existing.get_mut(&FileRole::Service).unwrap();
        *service = service.replace(
            "        raise NotImplementedError()",
            "        user = self.repo.fetch()\n        return build_response(user)",
        );

        // Spec gains a field; regenerate.
        let extended = LOGIN_SPEC.replace(
            "- password: string",
            "- password: string\n- remember_me: boolean",
        );
        let new_contract = compile_spec(&extended, "auth", "login").unwrap();
        let regenerated = generator.regenerate(&new_contract, &existing).unwrap();

        let schema = &regenerated
            .iter()
            .find(|f| f.role == FileRole::Schema)
            .unwrap()
            .content;
        assert!(schema.contains("    remember_me: bool"));

        let service = &regenerated
            .iter()
            .find(|f| f.role == FileRole::Service)
            .unwrap()
            .content;
        assert!(service.contains("        user = self.repo.fetch()"));
        assert!(service.contains("        return build_response(user)"));
        assert!(!service.contains("raise NotImplementedError()"));
    }

    #[test]
    fn test_marker_corruption_aborts_regeneration() {
        let generator = SkeletonGenerator::new();
        let contract = login_contract();
        let files = generator.generate(&contract).unwrap();

        let mut existing = as_existing(&files);
        let service = existing.get_mut(&FileRole::Service).unwrap();
        *service = service.replace("    # === END USER CODE ===\n", "");

        let err = generator.regenerate(&contract, &existing).unwrap_err();
        match err {
            SkeletonError::MarkerIntegrity { file, .. } => assert_eq!(file, "service.py"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_missing_file_is_recreated_fresh() {
        let generator = SkeletonGenerator::new();
        let contract = login_contract();
        let files = generator.generate(&contract).unwrap();

        let mut existing = as_existing(&files);
        existing.remove(&FileRole::Repository);

        let regenerated = generator.regenerate(&contract, &existing).unwrap();
        let repository = regenerated
            .iter()
            .find(|f| f.role == FileRole::Repository)
            .unwrap();
        assert!(repository.content.contains("raise NotImplementedError()"));
    }

    #[test]
    fn test_empty_fields_render_pass() {
        let spec = "\
## Purpose

## Inputs

## Outputs

## Behaviour

## Errors

## SideEffects

## Dependencies
";
        let contract = compile_spec(spec, "ops", "ping").unwrap();
        let files = SkeletonGenerator::new().generate(&contract).unwrap();
        let schema = &files.iter().find(|f| f.role == FileRole::Schema).unwrap().content;
        assert!(schema.contains("class PingRequest(BaseModel):\n    pass"));
    }

    #[test]
    fn test_exception_name_mapping() {
        assert_eq!(exception_name("INVALID_CREDENTIALS"), "InvalidCredentialsError");
        assert_eq!(exception_name("TIMEOUT_ERROR"), "TimeoutError");
    }
}
