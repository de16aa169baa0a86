//! Vehicle schema validation.
//!
//! [`validate`] turns a [`VehicleInput`] into a [`VehicleDraft`] or a
//! [`ValidationFailed`] listing every violated field. Partial updates go
//! through [`validate_update`], which checks the merged record rather than
//! the patch alone.

use std::borrow::Cow;
use std::fmt;

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::vehicle::{Vehicle, VehicleDraft, VehicleInput, VehicleStatus};

/// A single field-level rule violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

/// A rejected write, carrying every violated constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationFailed {
    pub violations: Vec<FieldViolation>,
}

impl ValidationFailed {
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            violations: vec![FieldViolation {
                field: field.into(),
                message: message.into(),
            }],
        }
    }
}

impl fmt::Display for ValidationFailed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Validation failed: ")?;
        for (i, v) in self.violations.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", v.field, v.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationFailed {}

impl From<ValidationErrors> for ValidationFailed {
    fn from(errors: ValidationErrors) -> Self {
        let mut violations: Vec<FieldViolation> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                let field = camel_case(&field);
                errs.iter()
                    .map(move |e| FieldViolation {
                        field: field.clone(),
                        message: e
                            .message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| format!("{field} is invalid ({})", e.code)),
                    })
                    .collect::<Vec<_>>()
            })
            .collect();
        violations.sort_by(|a, b| a.field.cmp(&b.field).then(a.message.cmp(&b.message)));
        Self { violations }
    }
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Validate a full create payload.
pub fn validate(input: &VehicleInput) -> Result<VehicleDraft, ValidationFailed> {
    input.validate()?;
    into_draft(input)
}

/// Validate a partial update against the record it would modify.
pub fn validate_update(
    current: &Vehicle,
    patch: &VehicleInput,
) -> Result<VehicleDraft, ValidationFailed> {
    validate(&patch.merged_over(current))
}

/// Parse a `safetyDue` value: a calendar date or an RFC 3339 timestamp.
pub fn parse_safety_due(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(value).ok().map(|dt| dt.date_naive()))
}

fn into_draft(input: &VehicleInput) -> Result<VehicleDraft, ValidationFailed> {
    fn required<T>(value: Option<T>, field: &str) -> Result<T, ValidationFailed> {
        value.ok_or_else(|| ValidationFailed::single(field, format!("{field} is required")))
    }

    let status = required(input.status.as_deref(), "status")?;
    let status = status
        .parse::<VehicleStatus>()
        .map_err(|e| ValidationFailed::single("status", e.to_string()))?;

    let safety_due = required(input.safety_due.as_deref(), "safetyDue")?;
    let safety_due = parse_safety_due(safety_due)
        .ok_or_else(|| ValidationFailed::single("safetyDue", "safetyDue must be a date"))?;

    Ok(VehicleDraft {
        name: required(input.name.clone(), "name")?,
        status,
        km: required(input.km, "km")?,
        oil_change_due: required(input.oil_change_due, "oilChangeDue")?,
        safety_due,
        drivers: required(input.drivers.clone(), "drivers")?,
        comment: input.comment.clone().unwrap_or_default(),
    })
}

// ---------------------------------------------------------------------------
// Field rules (referenced from the `Validate` derive on `VehicleInput`)
// ---------------------------------------------------------------------------

fn violation(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(message));
    err
}

pub(crate) fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(violation("blank", "name must not be blank"));
    }
    Ok(())
}

pub(crate) fn is_known_status(value: &str) -> Result<(), ValidationError> {
    value
        .parse::<VehicleStatus>()
        .map(|_| ())
        .map_err(|_| violation("status", "status must be one of on-road, in-shop, out-of-service"))
}

pub(crate) fn is_safety_due_date(value: &str) -> Result<(), ValidationError> {
    match parse_safety_due(value) {
        Some(_) => Ok(()),
        None => Err(violation("date", "safetyDue must be a date (YYYY-MM-DD)")),
    }
}

pub(crate) fn no_blank_drivers(drivers: &[String]) -> Result<(), ValidationError> {
    if drivers.iter().any(|d| d.trim().is_empty()) {
        return Err(violation("blank", "driver names must not be blank"));
    }
    Ok(())
}

fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::Utc;

    use super::*;

    fn bus_101() -> VehicleInput {
        VehicleInput {
            name: Some("Bus 101".into()),
            status: Some("on-road".into()),
            km: Some(125_000.0),
            oil_change_due: Some(130_000.0),
            safety_due: Some("2024-12-31".into()),
            drivers: Some(vec!["John Smith".into()]),
            comment: None,
        }
    }

    fn fields(err: &ValidationFailed) -> Vec<&str> {
        err.violations.iter().map(|v| v.field.as_str()).collect()
    }

    #[test]
    fn valid_payload_becomes_draft() {
        let draft = validate(&bus_101()).unwrap();
        assert_eq!(draft.name, "Bus 101");
        assert_eq!(draft.status, VehicleStatus::OnRoad);
        assert_eq!(draft.safety_due, NaiveDate::from_ymd_opt(2024, 12, 31).unwrap());
        assert_eq!(draft.comment, "");
    }

    #[test]
    fn surrounding_whitespace_is_kept() {
        let input = VehicleInput {
            name: Some(" Bus 101 ".into()),
            drivers: Some(vec![" John ".into(), "Ana Diaz".into()]),
            ..bus_101()
        };
        let draft = validate(&input).unwrap();
        assert_eq!(draft.name, " Bus 101 ");
        assert_eq!(draft.drivers, vec![" John ".to_string(), "Ana Diaz".to_string()]);
    }

    #[test]
    fn whitespace_only_name_rejected() {
        let input = VehicleInput {
            name: Some("   ".into()),
            ..bus_101()
        };
        assert_eq!(fields(&validate(&input).unwrap_err()), vec!["name"]);
    }

    #[test]
    fn empty_payload_reports_every_required_field() {
        let err = validate(&VehicleInput::default()).unwrap_err();
        assert_eq!(
            fields(&err),
            vec!["drivers", "km", "name", "oilChangeDue", "safetyDue", "status"]
        );
    }

    #[test]
    fn empty_drivers_rejected() {
        let input = VehicleInput {
            drivers: Some(vec![]),
            ..bus_101()
        };
        let err = validate(&input).unwrap_err();
        assert_eq!(fields(&err), vec!["drivers"]);
        assert_eq!(err.violations[0].message, "at least one driver is required");
    }

    #[test]
    fn blank_driver_rejected() {
        let input = VehicleInput {
            drivers: Some(vec!["Ann".into(), "  ".into()]),
            ..bus_101()
        };
        assert_matches!(validate(&input), Err(e) if fields(&e) == vec!["drivers"]);
    }

    #[test]
    fn negative_numbers_rejected() {
        let input = VehicleInput {
            km: Some(-1.0),
            oil_change_due: Some(-5.0),
            ..bus_101()
        };
        let err = validate(&input).unwrap_err();
        assert_eq!(fields(&err), vec!["km", "oilChangeDue"]);
    }

    #[test]
    fn unknown_status_rejected() {
        let input = VehicleInput {
            status: Some("parked".into()),
            ..bus_101()
        };
        let err = validate(&input).unwrap_err();
        assert_eq!(fields(&err), vec!["status"]);
    }

    #[test]
    fn safety_due_accepts_timestamp_and_rejects_text() {
        let ts = VehicleInput {
            safety_due: Some("2024-12-31T00:00:00Z".into()),
            ..bus_101()
        };
        assert_eq!(
            validate(&ts).unwrap().safety_due,
            NaiveDate::from_ymd_opt(2024, 12, 31).unwrap()
        );

        let text = VehicleInput {
            safety_due: Some("end of year".into()),
            ..bus_101()
        };
        assert_eq!(fields(&validate(&text).unwrap_err()), vec!["safetyDue"]);
    }

    #[test]
    fn update_validates_merged_record() {
        let draft = validate(&bus_101()).unwrap();
        let current = Vehicle::from_draft(1, draft, Utc::now());

        let ok = validate_update(
            &current,
            &VehicleInput {
                km: Some(126_000.0),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(ok.km, 126_000.0);
        assert_eq!(ok.drivers, vec!["John Smith".to_string()]);

        let err = validate_update(
            &current,
            &VehicleInput {
                drivers: Some(vec![]),
                ..Default::default()
            },
        )
        .unwrap_err();
        assert_eq!(fields(&err), vec!["drivers"]);
    }

    #[test]
    fn display_lists_violations() {
        let err = ValidationFailed::single("km", "km must not be negative");
        assert_eq!(err.to_string(), "Validation failed: km: km must not be negative");
    }

    #[test]
    fn camel_case_conversion() {
        assert_eq!(camel_case("oil_change_due"), "oilChangeDue");
        assert_eq!(camel_case("km"), "km");
    }
}
