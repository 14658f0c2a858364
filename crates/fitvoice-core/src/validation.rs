// ABOUTME: Coerces loosely-typed model output into strict workout and diet plan shapes
// ABOUTME: Numeric fields fall back to fixed defaults; missing containers yield ShapeError
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Plan Schema Validation
//!
//! Language models are told to emit plain integers for `sets`, `reps` and
//! `dailyCalories` but regularly answer with `"3"`, `"8-12"` or `"ten"`.
//! The functions here are the last step before persistence:
//!
//! - numbers are kept (fractions truncated)
//! - strings are parsed like a leading-integer parse (`"12 reps"` is 12)
//! - anything else, or a result below 1, becomes the documented default
//!
//! Structural problems (a missing `exercises` array, a routine without a
//! name) are not guessed at and surface as [`ShapeError`].

use serde_json::{Map, Value};

use crate::constants::plan_defaults::{DEFAULT_DAILY_CALORIES, DEFAULT_REPS, DEFAULT_SETS};
use crate::errors::ShapeError;
use crate::models::{DietPlan, Meal, Routine, WorkoutDay, WorkoutPlan};

/// Validate a raw workout plan.
///
/// # Errors
///
/// Returns [`ShapeError`] when `schedule`, `exercises` or a day's `routines`
/// array is missing, or a `day`/`name` field is absent or not text-like.
pub fn validate_workout_plan(raw: &Value) -> Result<WorkoutPlan, ShapeError> {
    let root = as_object(raw, "")?;

    let schedule = required_array(root, "", "schedule")?
        .iter()
        .enumerate()
        .map(|(i, day)| text_value(day, &format!("schedule[{i}]")))
        .collect::<Result<Vec<_>, _>>()?;

    let exercises = required_array(root, "", "exercises")?
        .iter()
        .enumerate()
        .map(|(i, entry)| validate_workout_day(entry, &format!("exercises[{i}]")))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(WorkoutPlan {
        schedule,
        exercises,
    })
}

/// Validate a raw diet plan.
///
/// # Errors
///
/// Returns [`ShapeError`] when `meals` or a meal's `foods` array is missing,
/// or a meal `name` is absent or not text-like.
pub fn validate_diet_plan(raw: &Value) -> Result<DietPlan, ShapeError> {
    let root = as_object(raw, "")?;

    let daily_calories = coerce_count(root.get("dailyCalories"), DEFAULT_DAILY_CALORIES);

    let meals = required_array(root, "", "meals")?
        .iter()
        .enumerate()
        .map(|(i, meal)| {
            let path = format!("meals[{i}]");
            let obj = as_object(meal, &path)?;
            let name = required_text(obj, &path, "name")?;
            let foods = required_array(obj, &path, "foods")?
                .iter()
                .enumerate()
                .map(|(j, food)| text_value(food, &format!("{path}.foods[{j}]")))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Meal { name, foods })
        })
        .collect::<Result<Vec<_>, ShapeError>>()?;

    Ok(DietPlan {
        daily_calories,
        meals,
    })
}

fn validate_workout_day(raw: &Value, path: &str) -> Result<WorkoutDay, ShapeError> {
    let obj = as_object(raw, path)?;
    let day = required_text(obj, path, "day")?;
    let routines = required_array(obj, path, "routines")?
        .iter()
        .enumerate()
        .map(|(i, routine)| {
            let routine_path = format!("{path}.routines[{i}]");
            let fields = as_object(routine, &routine_path)?;
            Ok(Routine {
                name: required_text(fields, &routine_path, "name")?,
                sets: coerce_count(fields.get("sets"), DEFAULT_SETS),
                reps: coerce_count(fields.get("reps"), DEFAULT_REPS),
            })
        })
        .collect::<Result<Vec<_>, ShapeError>>()?;

    Ok(WorkoutDay { day, routines })
}

/// Coerce a numeric-ish JSON value to a positive count, or return `default`.
#[must_use]
pub fn coerce_count(value: Option<&Value>, default: u32) -> u32 {
    let parsed = match value {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(truncate_to_i64)),
        Some(Value::String(s)) => parse_leading_integer(s),
        _ => None,
    };

    parsed
        .and_then(|n| u32::try_from(n).ok())
        .filter(|n| *n >= 1)
        .unwrap_or(default)
}

#[allow(clippy::cast_possible_truncation)]
fn truncate_to_i64(f: f64) -> i64 {
    // Saturating float-to-int cast; out-of-range values are rejected by the u32 conversion
    f.trunc() as i64
}

/// Parse an optional sign followed by decimal digits at the start of `s`,
/// ignoring leading whitespace and anything after the digits.
fn parse_leading_integer(s: &str) -> Option<i64> {
    let trimmed = s.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let digits_end = rest
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map_or(rest.len(), |(i, _)| i);
    if digits_end == 0 {
        return None;
    }

    let magnitude: i64 = rest[..digits_end].parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

fn as_object<'a>(value: &'a Value, path: &str) -> Result<&'a Map<String, Value>, ShapeError> {
    value.as_object().ok_or_else(|| ShapeError::NotAnObject {
        path: display_path(path),
    })
}

fn required_array<'a>(
    obj: &'a Map<String, Value>,
    parent: &str,
    key: &str,
) -> Result<&'a Vec<Value>, ShapeError> {
    obj.get(key)
        .and_then(Value::as_array)
        .ok_or_else(|| ShapeError::MissingArray {
            path: join_path(parent, key),
        })
}

fn required_text(
    obj: &Map<String, Value>,
    parent: &str,
    key: &str,
) -> Result<String, ShapeError> {
    let path = join_path(parent, key);
    match obj.get(key) {
        None | Some(Value::Null) => Err(ShapeError::MissingField { path }),
        Some(value) => text_value(value, &path),
    }
}

fn text_value(value: &Value, path: &str) -> Result<String, ShapeError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        _ => Err(ShapeError::InvalidType {
            path: path.to_owned(),
            expected: "text",
        }),
    }
}

fn join_path(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_owned()
    } else {
        format!("{parent}.{key}")
    }
}

fn display_path(path: &str) -> String {
    if path.is_empty() {
        "$".to_owned()
    } else {
        path.to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_string_sets_and_word_reps() {
        let raw = json!({
            "schedule": ["Monday"],
            "exercises": [{
                "day": "Monday",
                "routines": [{"name": "Squat", "sets": "3", "reps": "ten"}]
            }]
        });

        let plan = validate_workout_plan(&raw).unwrap();
        let routine = &plan.exercises[0].routines[0];
        assert_eq!(routine.name, "Squat");
        assert_eq!(routine.sets, 3);
        assert_eq!(routine.reps, 10);
    }

    #[test]
    fn test_coerce_count_policy() {
        assert_eq!(coerce_count(Some(&json!(4)), 1), 4);
        assert_eq!(coerce_count(Some(&json!(4.9)), 1), 4);
        assert_eq!(coerce_count(Some(&json!("12")), 1), 12);
        assert_eq!(coerce_count(Some(&json!("  8-12 reps")), 1), 8);
        assert_eq!(coerce_count(Some(&json!("+5")), 1), 5);
        assert_eq!(coerce_count(Some(&json!("as many as possible")), 10), 10);
        assert_eq!(coerce_count(Some(&json!("")), 10), 10);
        assert_eq!(coerce_count(Some(&json!(0)), 1), 1);
        assert_eq!(coerce_count(Some(&json!("-3")), 1), 1);
        assert_eq!(coerce_count(Some(&json!(null)), 10), 10);
        assert_eq!(coerce_count(Some(&json!(true)), 10), 10);
        assert_eq!(coerce_count(Some(&json!([3])), 10), 10);
        assert_eq!(coerce_count(None, 2000), 2000);
        assert_eq!(coerce_count(Some(&json!(1e20)), 2000), 2000);
    }

    #[test]
    fn test_diet_plan_calorie_defaults() {
        let raw = json!({
            "dailyCalories": "about two thousand",
            "meals": [{"name": "Breakfast", "foods": ["Oatmeal", "Banana"]}]
        });
        let plan = validate_diet_plan(&raw).unwrap();
        assert_eq!(plan.daily_calories, 2000);
        assert_eq!(plan.meals[0].foods, vec!["Oatmeal", "Banana"]);

        let raw = json!({"dailyCalories": "2400 kcal", "meals": []});
        assert_eq!(validate_diet_plan(&raw).unwrap().daily_calories, 2400);
    }

    #[test]
    fn test_extra_fields_dropped() {
        let raw = json!({
            "schedule": ["Monday"],
            "exercises": [{
                "day": "Monday",
                "routines": [{"name": "Row", "sets": 3, "reps": 8, "duration": "20 min", "notes": "slow"}]
            }],
            "notes": "have fun"
        });
        let plan = validate_workout_plan(&raw).unwrap();
        let back = serde_json::to_value(&plan).unwrap();
        assert!(back.get("notes").is_none());
        assert!(back["exercises"][0]["routines"][0].get("duration").is_none());
    }

    #[test]
    fn test_missing_exercises_is_shape_error() {
        let err = validate_workout_plan(&json!({"schedule": ["Monday"]})).unwrap_err();
        assert_eq!(
            err,
            ShapeError::MissingArray {
                path: "exercises".to_owned()
            }
        );
    }

    #[test]
    fn test_missing_routines_reports_path() {
        let raw = json!({
            "schedule": [],
            "exercises": [{"day": "Monday", "routines": []}, {"day": "Tuesday"}]
        });
        let err = validate_workout_plan(&raw).unwrap_err();
        assert_eq!(err.path(), "exercises[1].routines");
    }

    #[test]
    fn test_missing_meals_and_foods() {
        assert!(matches!(
            validate_diet_plan(&json!({"dailyCalories": 1800})),
            Err(ShapeError::MissingArray { .. })
        ));
        let err = validate_diet_plan(&json!({"meals": [{"name": "Lunch"}]})).unwrap_err();
        assert_eq!(err.path(), "meals[0].foods");
    }

    #[test]
    fn test_empty_object_fails() {
        assert!(validate_workout_plan(&json!({})).is_err());
        assert!(validate_diet_plan(&json!({})).is_err());
        assert!(matches!(
            validate_workout_plan(&json!([])),
            Err(ShapeError::NotAnObject { .. })
        ));
    }

    #[test]
    fn test_routine_without_name() {
        let raw = json!({
            "schedule": ["Monday"],
            "exercises": [{"day": "Monday", "routines": [{"sets": 3, "reps": 10}]}]
        });
        let err = validate_workout_plan(&raw).unwrap_err();
        assert_eq!(
            err,
            ShapeError::MissingField {
                path: "exercises[0].routines[0].name".to_owned()
            }
        );
    }

    #[test]
    fn test_validation_is_idempotent() {
        let raw = json!({
            "schedule": ["Monday", "Wednesday"],
            "exercises": [{
                "day": "Monday",
                "routines": [{"name": "Push-ups", "sets": "3", "reps": "max"}]
            }]
        });
        let first = validate_workout_plan(&raw).unwrap();
        let second = validate_workout_plan(&serde_json::to_value(&first).unwrap()).unwrap();
        assert_eq!(first, second);

        let diet = validate_diet_plan(&json!({"dailyCalories": 2200.5, "meals": []})).unwrap();
        let again = validate_diet_plan(&serde_json::to_value(&diet).unwrap()).unwrap();
        assert_eq!(diet, again);
    }
}
