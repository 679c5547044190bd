//! Skeleton template engine.
//!
//! Registered named templates with `{{var}}` substitution. The built-in set
//! covers the five file roles of a slice; the bodies are Python, the target
//! language of the generated tree. Structural text lives in the templates;
//! everything between the markers is the implementer's.

use std::collections::HashMap;

use regex::Regex;

use crate::error::SkeletonError;

/// A skeleton template.
#[derive(Debug, Clone)]
pub struct SkeletonTemplate {
    /// Template name.
    pub name: String,
    /// Template body with `{{var}}` placeholders.
    pub body: String,
    /// Variables that must be present in the render context.
    pub required_vars: Vec<String>,
}

/// Context for template rendering.
#[derive(Debug, Clone, Default)]
pub struct TemplateContext {
    vars: HashMap<String, String>,
}

impl TemplateContext {
    /// Create a new context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a variable.
    pub fn set(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }

    /// Get a variable.
    pub fn get(&self, key: &str) -> Option<&String> {
        self.vars.get(key)
    }
}

/// Template engine producing structural source text from a contract-derived
/// context.
pub struct SkeletonTemplateEngine {
    templates: HashMap<String, SkeletonTemplate>,
    var_pattern: Regex,
}

impl SkeletonTemplateEngine {
    /// Create an engine with the built-in role templates registered.
    pub fn new() -> Self {
        let mut engine = Self {
            templates: HashMap::new(),
            var_pattern: Regex::new(r"\{\{(\w+)\}\}").unwrap(),
        };
        engine.register_builtin_templates();
        engine
    }

    fn register_builtin_templates(&mut self) {
        self.register(SkeletonTemplate {
            name: "handler".to_string(),
            body: r#"# Generated by slicewright; structural regions are rewritten on regeneration.
from fastapi import APIRouter

from .schemas import {{request_class}}, {{response_class}}
from .service import {{service_class}}

router = APIRouter()

# === BEGIN USER CODE ===
@router.post("")
def handle_{{slice_name}}(request: {{request_class}}) -> {{response_class}}:
    raise NotImplementedError()
# === END USER CODE ===
"#
            .to_string(),
            required_vars: vec![
                "slice_name".to_string(),
                "request_class".to_string(),
                "response_class".to_string(),
                "service_class".to_string(),
            ],
        });

        self.register(SkeletonTemplate {
            name: "service".to_string(),
            body: r#"# Generated by slicewright; structural regions are rewritten on regeneration.
from .repository import {{repository_class}}
from .schemas import {{request_class}}, {{response_class}}


class {{service_class}}:
    def __init__(self) -> None:
        self.repo = {{repository_class}}()

{{behaviour_comment}}    # === BEGIN USER CODE ===
    def execute(self, request: {{request_class}}) -> {{response_class}}:
        raise NotImplementedError()
    # === END USER CODE ===
"#
            .to_string(),
            required_vars: vec![
                "request_class".to_string(),
                "response_class".to_string(),
                "service_class".to_string(),
                "repository_class".to_string(),
                "behaviour_comment".to_string(),
            ],
        });

        self.register(SkeletonTemplate {
            name: "repository".to_string(),
            body: r#"# Generated by slicewright; structural regions are rewritten on regeneration.


class {{repository_class}}:
    # === BEGIN USER CODE ===
    def fetch(self) -> None:
        raise NotImplementedError()
    # === END USER CODE ===
"#
            .to_string(),
            required_vars: vec!["repository_class".to_string()],
        });

        self.register(SkeletonTemplate {
            name: "schema".to_string(),
            body: r#"# Generated by slicewright; this file is fully structural and owned by the generator.
{{schema_imports}}from pydantic import BaseModel


class {{request_class}}(BaseModel):
{{request_fields}}


class {{response_class}}(BaseModel):
{{response_fields}}{{error_classes}}
"#
            .to_string(),
            required_vars: vec![
                "request_class".to_string(),
                "response_class".to_string(),
                "request_fields".to_string(),
                "response_fields".to_string(),
                "schema_imports".to_string(),
                "error_classes".to_string(),
            ],
        });

        self.register(SkeletonTemplate {
            name: "test".to_string(),
            body: r#"# Generated by slicewright; structural regions are rewritten on regeneration.
import pytest

from .schemas import {{request_class}}, {{response_class}}
from .service import {{service_class}}


def test_request_fields() -> None:
    assert sorted({{request_class}}.model_fields) == {{request_field_list}}


def test_response_fields() -> None:
    assert sorted({{response_class}}.model_fields) == {{response_field_list}}


# === BEGIN USER CODE ===
def test_execute() -> None:
    pytest.skip("not implemented")
# === END USER CODE ===
"#
            .to_string(),
            required_vars: vec![
                "request_class".to_string(),
                "response_class".to_string(),
                "service_class".to_string(),
                "request_field_list".to_string(),
                "response_field_list".to_string(),
            ],
        });
    }

    /// Render a template with context.
    pub fn render(&self, name: &str, context: &TemplateContext) -> Result<String, SkeletonError> {
        let template = self
            .templates
            .get(name)
            .ok_or_else(|| SkeletonError::UnknownTemplate(name.to_string()))?;

        for var in &template.required_vars {
            if context.get(var).is_none() {
                return Err(SkeletonError::MissingVariable {
                    template: name.to_string(),
                    var: var.clone(),
                });
            }
        }

        let rendered = self
            .var_pattern
            .replace_all(&template.body, |caps: &regex::Captures| {
                let var = &caps[1];
                context.get(var).cloned().unwrap_or_default()
            });
        Ok(rendered.into_owned())
    }

    /// Get a template by name.
    pub fn get(&self, name: &str) -> Option<&SkeletonTemplate> {
        self.templates.get(name)
    }

    /// Register a template, replacing any existing one with the same name.
    pub fn register(&mut self, template: SkeletonTemplate) {
        self.templates.insert(template.name.clone(), template);
    }
}

impl Default for SkeletonTemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}
