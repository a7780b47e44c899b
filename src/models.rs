use crate::errors::ValidationError;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// ============ Database Models ============

/// A stored customer record.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    /// Storage-assigned identifier, never changes.
    pub id: Uuid,
    pub name: String,
    pub date_of_birth: DateTime<Utc>,
    /// Unique across all customers, at least 1.
    pub member_number: i64,
    pub interests: String,
    /// Set by storage on insert.
    pub created_at: DateTime<Utc>,
    /// Set by storage on insert and refreshed on every update.
    pub updated_at: DateTime<Utc>,
}

/// Validated, normalized customer fields ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomerFields {
    pub name: String,
    pub date_of_birth: DateTime<Utc>,
    pub member_number: i64,
    pub interests: String,
}

// ============ Request/Response Models ============

/// Raw create/update body as sent by clients.
///
/// Fields stay untyped so that presence and coercion are decided by
/// [`validate`] rather than by the JSON deserializer.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomerCandidate {
    #[schema(value_type = Option<String>, example = "Ada")]
    pub name: Option<Value>,
    #[schema(value_type = Option<String>, example = "1990-01-01")]
    pub date_of_birth: Option<Value>,
    #[schema(value_type = Option<i64>, example = 1)]
    pub member_number: Option<Value>,
    #[schema(value_type = Option<String>, example = "math")]
    pub interests: Option<Value>,
}

/// Body returned by a successful delete.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeleteResponse {
    pub ok: bool,
}

// ============ Validation ============

/// Validates and normalizes a candidate record.
///
/// Fields are checked in order `name`, `dateOfBirth`, `memberNumber`,
/// `interests`; the first failure is returned.
pub fn validate(candidate: &CustomerCandidate) -> Result<CustomerFields, ValidationError> {
    let name = required_text("name", candidate.name.as_ref())?;
    let date_of_birth = required_date("dateOfBirth", candidate.date_of_birth.as_ref())?;
    let member_number = required_member_number("memberNumber", candidate.member_number.as_ref())?;
    let interests = required_text("interests", candidate.interests.as_ref())?;

    Ok(CustomerFields {
        name,
        date_of_birth,
        member_number,
        interests,
    })
}

fn required_text(field: &'static str, value: Option<&Value>) -> Result<String, ValidationError> {
    let text = match value {
        None | Some(Value::Null) => return Err(ValidationError::Missing(field)),
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(_) => {
            return Err(ValidationError::Invalid {
                field,
                reason: "expected text".to_string(),
            })
        }
    };

    if text.is_empty() {
        return Err(ValidationError::Missing(field));
    }
    Ok(text)
}

fn required_date(
    field: &'static str,
    value: Option<&Value>,
) -> Result<DateTime<Utc>, ValidationError> {
    let invalid = |reason: &str| ValidationError::Invalid {
        field,
        reason: reason.to_string(),
    };

    match value {
        None | Some(Value::Null) => Err(ValidationError::Missing(field)),
        Some(Value::String(s)) if s.trim().is_empty() => Err(ValidationError::Missing(field)),
        Some(Value::String(s)) => parse_date(s.trim()).ok_or_else(|| invalid("not a valid date")),
        Some(Value::Number(n)) => n
            .as_i64()
            .and_then(DateTime::<Utc>::from_timestamp_millis)
            .ok_or_else(|| invalid("not a valid timestamp")),
        Some(_) => Err(invalid("expected a date string")),
    }
}

/// Parses the date formats browsers and API clients commonly send.
///
/// Timestamps without an offset are read as UTC.
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date.and_time(NaiveTime::MIN).and_utc());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|dt| dt.and_utc())
}

fn required_member_number(
    field: &'static str,
    value: Option<&Value>,
) -> Result<i64, ValidationError> {
    let invalid = |reason: &str| ValidationError::Invalid {
        field,
        reason: reason.to_string(),
    };

    let number = match value {
        None | Some(Value::Null) => return Err(ValidationError::Missing(field)),
        Some(Value::String(s)) if s.trim().is_empty() => {
            return Err(ValidationError::Missing(field))
        }
        Some(Value::String(s)) => parse_integer(s.trim()),
        Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().and_then(integral)),
        Some(_) => return Err(invalid("expected a number")),
    }
    .ok_or_else(|| invalid("must be a whole number"))?;

    if number < 1 {
        return Err(invalid("must be at least 1"));
    }
    Ok(number)
}

fn parse_integer(raw: &str) -> Option<i64> {
    raw.parse::<i64>()
        .ok()
        .or_else(|| raw.parse::<f64>().ok().and_then(integral))
}

fn integral(f: f64) -> Option<i64> {
    // 2^63 is exactly representable; anything at or past it overflows i64
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 9_223_372_036_854_775_808.0 {
        Some(f as i64)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn candidate(body: Value) -> CustomerCandidate {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn test_valid_candidate_is_normalized() {
        let fields = validate(&candidate(json!({
            "name": "  Ada  ",
            "dateOfBirth": "1990-01-01",
            "memberNumber": "42",
            "interests": " math ",
        })))
        .unwrap();

        assert_eq!(fields.name, "Ada");
        assert_eq!(fields.interests, "math");
        assert_eq!(fields.member_number, 42);
        assert_eq!(
            fields.date_of_birth,
            Utc.with_ymd_and_hms(1990, 1, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_first_failure_wins() {
        let err = validate(&CustomerCandidate::default()).unwrap_err();
        assert_eq!(err, ValidationError::Missing("name"));

        let err = validate(&candidate(json!({ "name": "Ada", "memberNumber": 0 }))).unwrap_err();
        assert_eq!(err, ValidationError::Missing("dateOfBirth"));
    }

    #[test]
    fn test_whitespace_only_text_is_missing() {
        let err = validate(&candidate(json!({
            "name": "   ",
            "dateOfBirth": "1990-01-01",
            "memberNumber": 1,
            "interests": "math",
        })))
        .unwrap_err();
        assert_eq!(err, ValidationError::Missing("name"));

        let err = validate(&candidate(json!({
            "name": "Ada",
            "dateOfBirth": "1990-01-01",
            "memberNumber": 1,
            "interests": "\t",
        })))
        .unwrap_err();
        assert_eq!(err, ValidationError::Missing("interests"));
    }

    #[test]
    fn test_member_number_rules() {
        let base = |n: Value| {
            candidate(json!({
                "name": "Ada",
                "dateOfBirth": "1990-01-01",
                "memberNumber": n,
                "interests": "math",
            }))
        };

        assert_eq!(validate(&base(json!(3.0))).unwrap().member_number, 3);
        assert_eq!(validate(&base(json!(" 7 "))).unwrap().member_number, 7);
        assert_eq!(validate(&base(json!(null))).unwrap_err().field(), "memberNumber");
        assert!(matches!(
            validate(&base(json!(0))).unwrap_err(),
            ValidationError::Invalid { field: "memberNumber", .. }
        ));
        assert!(matches!(
            validate(&base(json!(-4))).unwrap_err(),
            ValidationError::Invalid { .. }
        ));
        assert!(matches!(
            validate(&base(json!(1.5))).unwrap_err(),
            ValidationError::Invalid { .. }
        ));
        assert!(matches!(
            validate(&base(json!("seven"))).unwrap_err(),
            ValidationError::Invalid { .. }
        ));
    }

    #[test]
    fn test_date_formats() {
        let expected = Utc.with_ymd_and_hms(1990, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(parse_date("1990-01-01"), Some(expected));
        assert_eq!(parse_date("1990-01-01T00:00:00.000Z"), Some(expected));
        assert_eq!(parse_date("1990-01-01T02:00:00+02:00"), Some(expected));
        assert_eq!(parse_date("1990-01-01T00:00"), Some(expected));
        assert_eq!(parse_date("01/01/1990"), None);
        assert_eq!(parse_date("1990-13-01"), None);

        let from_millis = required_date("dateOfBirth", Some(&json!(631152000000i64))).unwrap();
        assert_eq!(from_millis, expected);
    }

    #[test]
    fn test_customer_serializes_camel_case() {
        let now = Utc::now();
        let customer = Customer {
            id: Uuid::new_v4(),
            name: "Ada".into(),
            date_of_birth: now,
            member_number: 1,
            interests: "math".into(),
            created_at: now,
            updated_at: now,
        };
        let value = serde_json::to_value(&customer).unwrap();
        assert!(value.get("dateOfBirth").is_some());
        assert!(value.get("memberNumber").is_some());
        assert!(value.get("createdAt").is_some());
        assert!(value.get("updatedAt").is_some());
        assert_eq!(value["id"], json!(customer.id.to_string()));
    }

    #[test]
    fn test_fields_round_trip_through_candidate() {
        let fields = CustomerFields {
            name: "Grace".into(),
            date_of_birth: Utc.with_ymd_and_hms(1906, 12, 9, 0, 0, 0).unwrap(),
            member_number: 12,
            interests: "compilers".into(),
        };
        let candidate = CustomerCandidate {
            name: Some(json!(fields.name)),
            date_of_birth: Some(json!(fields.date_of_birth.to_rfc3339())),
            member_number: Some(json!(fields.member_number)),
            interests: Some(json!(fields.interests)),
        };
        assert_eq!(validate(&candidate).unwrap(), fields);
    }
}
