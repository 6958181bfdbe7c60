// SPDX-License-Identifier: Apache-2.0

use rolemesh_conditions::{parse_size_expression, Condition};
use rolemesh_model::{
    AllocateSize, DetailedRestriction, Limit, RoleDocument, RoleName, RESTRICTION_CONDITION_KEY,
};
use serde_json::{Map, Value};

use crate::context::ReleaseContext;
use crate::errors::{FieldError, ValidationErrorKind, ValidationErrors};
use crate::validated::ValidatedRole;

pub const REQUIRED_FIELDS: [&str; 3] = ["name", "meta", "volumes_roles_mapping"];
pub const VOLUMES_FIELD: &str = "volumes_roles_mapping";

/// Validates a submitted role document.
///
/// Categories run in order (structure, volumes, references, conditions and
/// limits). Errors accumulate within a category; the first category that
/// reports anything stops validation.
pub fn validate_role(doc: &Value, ctx: &ReleaseContext) -> Result<ValidatedRole, ValidationErrors> {
    let document = check_structure(doc)?;
    finish(check_volumes(&document, ctx))?;
    finish(check_references(&document, ctx))?;
    let (limit_conditions, restriction_conditions) = check_conditions(&document)?;
    Ok(ValidatedRole::new(
        document,
        limit_conditions,
        restriction_conditions,
    ))
}

fn finish(errors: Vec<FieldError>) -> Result<(), ValidationErrors> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationErrors(errors))
    }
}

fn check_structure(doc: &Value) -> Result<RoleDocument, ValidationErrors> {
    let Some(root) = doc.as_object() else {
        return Err(ValidationErrors(vec![FieldError::new(
            "$",
            ValidationErrorKind::InvalidDocument,
            "Failed validating role: document must be an object".to_string(),
        )]));
    };

    let mut errors = Vec::new();
    for field in REQUIRED_FIELDS {
        if !root.contains_key(field) {
            errors.push(FieldError::new(
                field,
                ValidationErrorKind::MissingField,
                format!("Failed validating 'required': '{field}' is a required property"),
            ));
        }
    }
    if !errors.is_empty() {
        return Err(ValidationErrors(errors));
    }

    match root.get("name") {
        Some(Value::String(name)) => {
            if let Err(err) = RoleName::parse(name) {
                errors.push(FieldError::new(
                    "name",
                    ValidationErrorKind::InvalidRoleName,
                    format!("Failed validating 'pattern' in name: {err}"),
                ));
            }
        }
        _ => errors.push(FieldError::new(
            "name",
            ValidationErrorKind::InvalidRoleName,
            "Failed validating 'type' in name: role name must be a string".to_string(),
        )),
    }

    errors.extend(restriction_shape_errors(root));
    if errors.iter().any(|e| e.kind == ValidationErrorKind::InvalidDocument) {
        return Err(ValidationErrors(errors));
    }

    let decoded = serde_json::from_value::<RoleDocument>(doc.clone());
    match decoded {
        Ok(document) if errors.is_empty() => Ok(document),
        Ok(_) => Err(ValidationErrors(errors)),
        Err(err) => {
            errors.push(FieldError::new(
                "$",
                ValidationErrorKind::InvalidDocument,
                format!("Failed validating role document: {err}"),
            ));
            Err(ValidationErrors(errors))
        }
    }
}

/// Detailed restrictions are checked on the raw document so a bad `action`
/// or an unknown key is reported at the restriction it belongs to.
fn restriction_shape_errors(root: &Map<String, Value>) -> Vec<FieldError> {
    let Some(items) = root
        .get("meta")
        .and_then(|meta| meta.get("restrictions"))
        .and_then(Value::as_array)
    else {
        return Vec::new();
    };
    items
        .iter()
        .enumerate()
        .filter(|(_, item)| {
            item.as_object()
                .is_some_and(|map| map.contains_key(RESTRICTION_CONDITION_KEY))
        })
        .filter_map(|(i, item)| {
            let err = serde_json::from_value::<DetailedRestriction>(item.clone()).err()?;
            Some(FieldError::new(
                format!("meta.restrictions[{i}]"),
                ValidationErrorKind::InvalidDocument,
                format!("Failed validating restriction: {err}"),
            ))
        })
        .collect()
}

fn check_volumes(document: &RoleDocument, ctx: &ReleaseContext) -> Vec<FieldError> {
    let mut errors = Vec::new();
    if document.volumes_roles_mapping.is_empty() {
        errors.push(FieldError::new(
            VOLUMES_FIELD,
            ValidationErrorKind::EmptyVolumesMapping,
            "Failed validating 'minItems' in volumes_roles_mapping: at least one volume mapping is required"
                .to_string(),
        ));
        return errors;
    }

    for (i, mapping) in document.volumes_roles_mapping.iter().enumerate() {
        if !ctx.known_volume_ids.contains(&mapping.id) {
            errors.push(FieldError::new(
                format!("{VOLUMES_FIELD}[{i}].id"),
                ValidationErrorKind::UnknownVolumeId,
                format!(
                    "Wrong data in volumes_roles_mapping. Release does not have volumes with ids {}",
                    mapping.id
                ),
            ));
        }
        if let Some(reason) = allocate_size_problem(&mapping.allocate_size) {
            errors.push(FieldError::new(
                format!("{VOLUMES_FIELD}[{i}].allocate_size"),
                ValidationErrorKind::InvalidAllocateSize,
                format!("Failed validating allocate_size in volumes_roles_mapping[{i}]: {reason}"),
            ));
        }
    }
    errors
}

fn allocate_size_problem(size: &AllocateSize) -> Option<String> {
    match size {
        AllocateSize::Bytes(_) => None,
        AllocateSize::Text(_) if size.is_all() => None,
        AllocateSize::Text(text) => match parse_size_expression(text) {
            Ok(_) => None,
            Err(err) => Some(format!(
                "'{text}' is neither 'all' nor a size expression ({err})"
            )),
        },
        AllocateSize::Other(value) => Some(format!(
            "{value} is neither 'all' nor a size expression"
        )),
        _ => Some("unsupported allocate_size value".to_string()),
    }
}

fn check_references(document: &RoleDocument, ctx: &ReleaseContext) -> Vec<FieldError> {
    let own = document.name.as_str();
    let lists = [
        ("conflicts", document.meta.conflicts()),
        ("update_required", document.meta.update_required()),
    ];
    let mut errors = Vec::new();
    for (field, names) in lists {
        for (i, reference) in names.iter().enumerate() {
            if !ctx.resolves(reference, own) {
                errors.push(FieldError::new(
                    format!("meta.{field}[{i}]"),
                    ValidationErrorKind::UnknownRoleReference,
                    format!(
                        "Failed validating {field}: role '{reference}' is not defined for the release"
                    ),
                ));
            }
        }
    }
    errors
}

type CompiledConditions = (Vec<Condition>, Vec<Condition>);

fn check_conditions(document: &RoleDocument) -> Result<CompiledConditions, ValidationErrors> {
    let mut errors = Vec::new();
    let mut limit_conditions = Vec::new();
    let mut restriction_conditions = Vec::new();

    if let Some(limit) = &document.meta.limits {
        for (i, item) in limit.overrides().iter().enumerate() {
            match Condition::compile(&item.condition) {
                Ok(cond) => limit_conditions.push(cond),
                Err(err) => errors.push(FieldError::new(
                    format!("meta.limits.overrides[{i}].condition"),
                    ValidationErrorKind::ConditionSyntaxError,
                    format!("Failed validating condition: {err}"),
                )),
            }
        }
        errors.extend(limit_bound_errors(limit));
    }

    for (i, restriction) in document.meta.restrictions().iter().enumerate() {
        match Condition::compile(restriction.condition()) {
            Ok(cond) => restriction_conditions.push(cond),
            Err(err) => errors.push(FieldError::new(
                format!("meta.restrictions[{i}]"),
                ValidationErrorKind::ConditionSyntaxError,
                format!("Failed validating restriction condition: {err}"),
            )),
        }
    }

    if errors.is_empty() {
        Ok((limit_conditions, restriction_conditions))
    } else {
        Err(ValidationErrors(errors))
    }
}

fn limit_bound_errors(limit: &Limit) -> Vec<FieldError> {
    let mut errors = Vec::new();
    if let (Some(min), Some(max)) = (limit.min, limit.max) {
        if min > max {
            errors.push(FieldError::new(
                "meta.limits",
                ValidationErrorKind::InvalidLimit,
                format!("Failed validating limits: min {min} is greater than max {max}"),
            ));
        }
    }
    for (i, item) in limit.overrides().iter().enumerate() {
        let min = item.min.or(limit.min);
        let max = item.max.or(limit.max);
        if let (Some(min), Some(max)) = (min, max) {
            if min > max {
                errors.push(FieldError::new(
                    format!("meta.limits.overrides[{i}]"),
                    ValidationErrorKind::InvalidLimit,
                    format!(
                        "Failed validating limits override: resolved min {min} is greater than max {max}"
                    ),
                ));
            }
        }
    }
    errors
}
