//! Extraction contract for the upstream vision service.
//!
//! The crate never calls a model itself. Callers that do send
//! [`EXTRACTION_PROMPT`] with the drawing image and ask for JSON shaped by
//! [`response_schema`]; the reply then goes straight into
//! [`crate::pipeline::input::parse_drawing_json`].

use serde_json::{json, Value};

/// Instruction sent with the drawing image.
pub const EXTRACTION_PROMPT: &str = r#"You are reading a technical drawing with numbered inspection balloons.

Return ONE JSON object, with no commentary and no Markdown fences:

1. HEADER
   - drawingNumber: the drawing number from the title block
   - partName: the part name from the title block
   - reportDate: leave out unless the drawing states an inspection date

2. DIMENSIONS (one entry per balloon, in balloon order)
   - balloonId: the number printed in the balloon
   - characteristic: the callout exactly as drawn (dimension, tolerance,
     GD&T frame or weld symbol); spell symbols out in words if unsure
   - nominal, upperTol, lowerTol, unit: fill in when the callout is a
     toleranced dimension
   - isWeld: true for weld symbols
   - isGDT: true for geometric tolerance frames
   - results: three measured values that fall inside the tolerance"#;

/// JSON schema of the reply, in the subset accepted by structured-output APIs.
pub fn response_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "drawingNumber": { "type": "string" },
            "partName": { "type": "string" },
            "reportDate": { "type": "string" },
            "dimensions": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "balloonId": { "type": "string" },
                        "characteristic": { "type": "string" },
                        "nominal": { "type": "string" },
                        "upperTol": { "type": "string" },
                        "lowerTol": { "type": "string" },
                        "unit": { "type": "string" },
                        "isWeld": { "type": "boolean" },
                        "isGDT": { "type": "boolean" },
                        "results": { "type": "array", "items": { "type": "string" } }
                    },
                    "required": ["balloonId", "characteristic", "results"]
                }
            }
        },
        "required": ["drawingNumber", "partName", "dimensions"]
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DrawingInput;

    #[test]
    fn test_prompt_names_every_field() {
        let schema = response_schema();
        for key in schema["properties"]["dimensions"]["items"]["properties"]
            .as_object()
            .unwrap()
            .keys()
        {
            assert!(EXTRACTION_PROMPT.contains(key.as_str()), "prompt misses {key}");
        }
    }

    #[test]
    fn test_schema_required_fields_match_payload() {
        // A reply with only the required fields must decode.
        let reply = json!({
            "drawingNumber": "X-1",
            "partName": "Shaft",
            "dimensions": [{ "balloonId": "1", "characteristic": "25", "results": [] }]
        });
        let input: DrawingInput = serde_json::from_value(reply).unwrap();
        assert_eq!(input.dimensions.len(), 1);

        let required = response_schema()["required"].clone();
        assert_eq!(required, json!(["drawingNumber", "partName", "dimensions"]));
    }
}
