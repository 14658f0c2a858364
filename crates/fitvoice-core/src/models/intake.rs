// ABOUTME: Intake data collected by the voice conversation before plan generation
// ABOUTME: Accepts loosely-typed JSON scalars and the legacy dietary restrictions spelling
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// The eight free-text data points gathered during intake.
///
/// Values stay as text; numeric interpretation happens later in the
/// plan prompts. Deserialization requires every key, accepts numbers and
/// booleans in place of strings, and reads `dietetary_restrictions` as an
/// alias so both legacy call sites decode to one shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectedUserData {
    /// Age
    #[serde(deserialize_with = "scalar_text")]
    pub age: String,
    /// Height in any unit
    #[serde(deserialize_with = "scalar_text")]
    pub height: String,
    /// Weight in any unit
    #[serde(deserialize_with = "scalar_text")]
    pub weight: String,
    /// Injuries or limitations
    #[serde(deserialize_with = "scalar_text")]
    pub injuries: String,
    /// Primary goal
    #[serde(deserialize_with = "scalar_text")]
    pub fitness_goal: String,
    /// Beginner / intermediate / advanced, or free text
    #[serde(deserialize_with = "scalar_text")]
    pub fitness_level: String,
    /// Days per week available for training
    #[serde(deserialize_with = "scalar_text")]
    pub workout_days: String,
    /// Dietary restrictions or preferences
    #[serde(alias = "dietetary_restrictions", deserialize_with = "scalar_text")]
    pub dietary_restrictions: String,
}

fn scalar_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(de::Error::custom(format!(
            "expected text, number or boolean, found {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Value {
        json!({
            "age": "30",
            "height": "180cm",
            "weight": "80kg",
            "injuries": "none",
            "fitness_goal": "muscle gain",
            "fitness_level": "intermediate",
            "workout_days": "4",
            "dietary_restrictions": "none"
        })
    }

    #[test]
    fn test_accepts_numbers_as_text() {
        let mut raw = sample();
        raw["age"] = json!(30);
        raw["workout_days"] = json!(4);

        let data: CollectedUserData = serde_json::from_value(raw).unwrap();
        assert_eq!(data.age, "30");
        assert_eq!(data.workout_days, "4");
    }

    #[test]
    fn test_legacy_dietary_spelling() {
        let mut raw = sample();
        let obj = raw.as_object_mut().unwrap();
        obj.remove("dietary_restrictions");
        obj.insert("dietetary_restrictions".to_owned(), json!("vegan"));

        let data: CollectedUserData = serde_json::from_value(raw).unwrap();
        assert_eq!(data.dietary_restrictions, "vegan");

        let out = serde_json::to_value(&data).unwrap();
        assert_eq!(out["dietary_restrictions"], "vegan");
        assert!(out.get("dietetary_restrictions").is_none());
    }

    #[test]
    fn test_missing_key_rejected() {
        let mut raw = sample();
        raw.as_object_mut().unwrap().remove("injuries");
        assert!(serde_json::from_value::<CollectedUserData>(raw).is_err());
    }

    #[test]
    fn test_null_value_rejected() {
        let mut raw = sample();
        raw["height"] = Value::Null;
        assert!(serde_json::from_value::<CollectedUserData>(raw).is_err());
    }
}
