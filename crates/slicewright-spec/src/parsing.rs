//! Spec document parsing.
//!
//! A spec is a structured text document with exactly seven sections, in a
//! fixed order: Purpose, Inputs, Outputs, Behaviour, Errors, SideEffects,
//! Dependencies. The parser produces a typed IR and rejects anything that
//! strays from the grammar with the offending line number.

use std::collections::HashSet;

use regex::Regex;

use crate::error::SpecError;
use crate::types::FieldType;

/// The seven required sections, in the only order they may appear.
pub const SECTION_ORDER: [&str; 7] = [
    "Purpose",
    "Inputs",
    "Outputs",
    "Behaviour",
    "Errors",
    "SideEffects",
    "Dependencies",
];

/// A declared input or output field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Field name, a valid identifier.
    pub name: String,
    /// Declared type.
    pub ty: FieldType,
}

/// A declared error: `CODE: message`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorDecl {
    /// Upper-case error code, unique within one spec.
    pub code: String,
    /// Human-readable message.
    pub message: String,
}

/// Typed intermediate representation of a parsed spec document.
///
/// All lists keep declaration order; order is semantically significant for
/// behaviour steps (it documents execution order for implementers) and feeds
/// straight into the contract's canonical serialization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpecIr {
    /// Single-sentence purpose (may be empty).
    pub purpose: String,
    /// Ordered input fields.
    pub inputs: Vec<Field>,
    /// Ordered output fields.
    pub outputs: Vec<Field>,
    /// Ordered behaviour steps, stored verbatim.
    pub behaviour: Vec<String>,
    /// Ordered error declarations.
    pub errors: Vec<ErrorDecl>,
    /// Side-effect items; empty when the spec declared `none`.
    pub side_effects: Vec<String>,
    /// Dependency items; empty when the spec declared `none`.
    pub dependencies: Vec<String>,
}

/// Spec document parser.
pub struct SpecParser {
    patterns: ParserPatterns,
}

struct ParserPatterns {
    heading: Regex,
    field: Regex,
    bullet: Regex,
    identifier: Regex,
    error_line: Regex,
    error_code: Regex,
}

/// Which sections a field line belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Purpose,
    Inputs,
    Outputs,
    Behaviour,
    Errors,
    SideEffects,
    Dependencies,
}

impl Section {
    fn from_index(index: usize) -> Self {
        match index {
            0 => Self::Purpose,
            1 => Self::Inputs,
            2 => Self::Outputs,
            3 => Self::Behaviour,
            4 => Self::Errors,
            5 => Self::SideEffects,
            _ => Self::Dependencies,
        }
    }
}

#[derive(Default)]
struct ParseState {
    /// Index into [`SECTION_ORDER`] of the section being filled.
    current: Option<usize>,
    title_allowed: bool,
    purpose: Option<String>,
    inputs: Vec<Field>,
    outputs: Vec<Field>,
    behaviour: Vec<String>,
    errors: Vec<ErrorDecl>,
    side_effects: Vec<String>,
    dependencies: Vec<String>,
    side_effects_none: bool,
    dependencies_none: bool,
    error_codes: HashSet<String>,
}

impl SpecParser {
    pub fn new() -> Self {
        Self {
            patterns: ParserPatterns {
                heading: Regex::new(r"^##\s+(.+?)\s*$").unwrap(),
                field: Regex::new(r"^-\s+([^:]+?)\s*:\s*(.+?)\s*$").unwrap(),
                bullet: Regex::new(r"^-\s+(.+?)\s*$").unwrap(),
                identifier: Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap(),
                error_line: Regex::new(r"^(?:-\s+)?([^\s:]+)\s*:\s*(.*?)\s*$").unwrap(),
                error_code: Regex::new(r"^[A-Z][A-Z0-9_]*$").unwrap(),
            },
        }
    }

    /// Parse a spec document into its IR.
    pub fn parse(&self, content: &str) -> Result<SpecIr, SpecError> {
        let mut state = ParseState {
            title_allowed: true,
            ..ParseState::default()
        };

        let mut last_line = 0;
        for (index, line) in content.lines().enumerate() {
            let line_num = index + 1;
            last_line = line_num;
            self.parse_line(&mut state, line, line_num)?;
        }

        // Every section must be present, even if empty.
        let parsed_count = state.current.map(|c| c + 1).unwrap_or(0);
        if parsed_count < SECTION_ORDER.len() {
            return Err(SpecError::format(
                last_line,
                format!("missing section '{}'", SECTION_ORDER[parsed_count]),
            ));
        }

        Ok(SpecIr {
            purpose: state.purpose.unwrap_or_default(),
            inputs: state.inputs,
            outputs: state.outputs,
            behaviour: state.behaviour,
            errors: state.errors,
            side_effects: state.side_effects,
            dependencies: state.dependencies,
        })
    }

    fn parse_line(
        &self,
        state: &mut ParseState,
        line: &str,
        line_num: usize,
    ) -> Result<(), SpecError> {
        let trimmed = line.trim_end();

        if let Some(caps) = self.patterns.heading.captures(trimmed) {
            let name = caps.get(1).unwrap().as_str();
            return self.enter_section(state, name, line_num);
        }

        if trimmed.trim().is_empty() {
            return Ok(());
        }

        let Some(current) = state.current else {
            // An optional document title may precede the first section.
            if state.title_allowed && trimmed.starts_with("# ") {
                state.title_allowed = false;
                return Ok(());
            }
            return Err(SpecError::format(
                line_num,
                "content before the 'Purpose' section",
            ));
        };

        match Section::from_index(current) {
            Section::Purpose => self.parse_purpose_line(state, trimmed, line_num),
            Section::Inputs => {
                let field = self.parse_field_line(trimmed, line_num, &state.inputs, "input")?;
                state.inputs.push(field);
                Ok(())
            }
            Section::Outputs => {
                let field = self.parse_field_line(trimmed, line_num, &state.outputs, "output")?;
                state.outputs.push(field);
                Ok(())
            }
            Section::Behaviour => self.parse_behaviour_line(state, trimmed, line_num),
            Section::Errors => self.parse_error_line(state, trimmed, line_num),
            Section::SideEffects => {
                let (items, none_seen) = (&mut state.side_effects, &mut state.side_effects_none);
                self.parse_free_text_line(items, none_seen, trimmed, line_num, "SideEffects")
            }
            Section::Dependencies => {
                let (items, none_seen) = (&mut state.dependencies, &mut state.dependencies_none);
                self.parse_free_text_line(items, none_seen, trimmed, line_num, "Dependencies")
            }
        }
    }

    fn enter_section(
        &self,
        state: &mut ParseState,
        name: &str,
        line_num: usize,
    ) -> Result<(), SpecError> {
        state.title_allowed = false;
        let expected = state.current.map(|c| c + 1).unwrap_or(0);

        match SECTION_ORDER.iter().position(|s| *s == name) {
            Some(index) if index == expected => {
                state.current = Some(index);
                Ok(())
            }
            Some(index) if index < expected => Err(SpecError::format(
                line_num,
                format!("duplicate section '{}'", name),
            )),
            Some(_) => Err(SpecError::format(
                line_num,
                format!(
                    "section '{}' out of order, expected '{}'",
                    name,
                    SECTION_ORDER
                        .get(expected)
                        .copied()
                        .unwrap_or("end of document")
                ),
            )),
            None => Err(SpecError::format(
                line_num,
                format!("unknown section '{}'", name),
            )),
        }
    }

    fn parse_purpose_line(
        &self,
        state: &mut ParseState,
        line: &str,
        line_num: usize,
    ) -> Result<(), SpecError> {
        if state.purpose.is_some() {
            return Err(SpecError::format(
                line_num,
                "Purpose must be a single sentence on a single line",
            ));
        }
        state.purpose = Some(line.trim().to_string());
        Ok(())
    }

    fn parse_field_line(
        &self,
        line: &str,
        line_num: usize,
        existing: &[Field],
        kind: &str,
    ) -> Result<Field, SpecError> {
        let caps = self.patterns.field.captures(line).ok_or_else(|| {
            SpecError::format(line_num, format!("expected '- name: type', got '{}'", line))
        })?;

        let name = caps.get(1).unwrap().as_str();
        let type_expr = caps.get(2).unwrap().as_str();

        if !self.patterns.identifier.is_match(name) {
            return Err(SpecError::format(
                line_num,
                format!("invalid {} name '{}': must be a bare identifier", kind, name),
            ));
        }

        if existing.iter().any(|f| f.name == name) {
            return Err(SpecError::format(
                line_num,
                format!("duplicate {} field '{}'", kind, name),
            ));
        }

        let ty = FieldType::parse(type_expr).map_err(|e| SpecError::UnknownType {
            line: line_num,
            expr: type_expr.to_string(),
            reason: e.reason,
        })?;

        Ok(Field {
            name: name.to_string(),
            ty,
        })
    }

    fn parse_behaviour_line(
        &self,
        state: &mut ParseState,
        line: &str,
        line_num: usize,
    ) -> Result<(), SpecError> {
        let caps = self.patterns.bullet.captures(line).ok_or_else(|| {
            SpecError::format(line_num, "Behaviour entries must be '- <step>' bullets")
        })?;
        // Stored verbatim; behaviour text is opaque to the pipeline.
        state.behaviour.push(caps.get(1).unwrap().as_str().to_string());
        Ok(())
    }

    fn parse_error_line(
        &self,
        state: &mut ParseState,
        line: &str,
        line_num: usize,
    ) -> Result<(), SpecError> {
        let caps = self.patterns.error_line.captures(line).ok_or_else(|| {
            SpecError::format(line_num, format!("expected 'CODE: message', got '{}'", line))
        })?;

        let code = caps.get(1).unwrap().as_str();
        let message = caps.get(2).unwrap().as_str();

        if !self.patterns.error_code.is_match(code) {
            return Err(SpecError::format(
                line_num,
                format!("invalid error code '{}': must match [A-Z][A-Z0-9_]*", code),
            ));
        }

        if message.is_empty() {
            return Err(SpecError::format(
                line_num,
                format!("error '{}' is missing a message", code),
            ));
        }

        if !state.error_codes.insert(code.to_string()) {
            return Err(SpecError::DuplicateErrorCode {
                line: line_num,
                code: code.to_string(),
            });
        }

        state.errors.push(ErrorDecl {
            code: code.to_string(),
            message: message.to_string(),
        });
        Ok(())
    }

    fn parse_free_text_line(
        &self,
        items: &mut Vec<String>,
        none_seen: &mut bool,
        line: &str,
        line_num: usize,
        section: &str,
    ) -> Result<(), SpecError> {
        // `none` (bare or bulleted, any case) declares an explicitly empty
        // list and must stand alone.
        let bullet_text = self
            .patterns
            .bullet
            .captures(line)
            .map(|caps| caps.get(1).unwrap().as_str().to_string());
        let effective = bullet_text.clone().unwrap_or_else(|| line.trim().to_string());

        if effective.eq_ignore_ascii_case("none") {
            if !items.is_empty() {
                return Err(SpecError::format(
                    line_num,
                    format!("'{}': 'none' cannot follow list items", section),
                ));
            }
            *none_seen = true;
            return Ok(());
        }

        if *none_seen {
            return Err(SpecError::format(
                line_num,
                format!("'{}': list items cannot follow 'none'", section),
            ));
        }

        match bullet_text {
            Some(text) => {
                items.push(text);
                Ok(())
            }
            None => Err(SpecError::format(
                line_num,
                format!("'{}' entries must be '- <item>' bullets or 'none'", section),
            )),
        }
    }
}

impl Default for SpecParser {
    fn default() -> Self {
        Self::new()
    }
}
