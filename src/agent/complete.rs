//! complete_test tool - the agent's explicit verdict for the current step

use serde_json::Value;

use super::CompletionSignal;
use crate::domain::Status;
use crate::llm::ToolDefinition;

pub const COMPLETE_TOOL_NAME: &str = "complete_test";

pub fn complete_tool_definition() -> ToolDefinition {
    ToolDefinition::new(
        COMPLETE_TOOL_NAME,
        "Report the outcome of the current step. Call exactly once per step, after the instruction \
         has been carried out or found impossible.",
        serde_json::json!({
            "type": "object",
            "properties": {
                "status": {
                    "type": "string",
                    "enum": ["SUCCESS", "FAILED", "ERROR"],
                    "description": "SUCCESS if the step held, FAILED if a check did not hold, ERROR if it could not be performed"
                },
                "message": {
                    "type": "string",
                    "description": "Short explanation of the outcome"
                }
            },
            "required": ["status", "message"]
        }),
    )
}

/// Read a completion signal from tool input. Malformed input is itself an
/// ERROR verdict, so the step still ends.
pub fn parse_completion(input: &Value) -> CompletionSignal {
    let message = input["message"].as_str().unwrap_or_default().to_string();

    match input["status"].as_str().map(str::parse::<Status>) {
        Some(Ok(status)) => CompletionSignal { status, message },
        Some(Err(e)) => CompletionSignal {
            status: Status::Error,
            message: format!("invalid completion signal: {}", e),
        },
        None => CompletionSignal {
            status: Status::Error,
            message: "invalid completion signal: status is required".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_definition_schema() {
        let def = complete_tool_definition();
        assert_eq!(def.name, "complete_test");
        assert_eq!(def.input_schema["required"], json!(["status", "message"]));
    }

    #[test]
    fn test_parse_completion() {
        let signal = parse_completion(&json!({"status": "FAILED", "message": "wrong title"}));
        assert_eq!(signal.status, Status::Failed);
        assert_eq!(signal.message, "wrong title");

        let lower = parse_completion(&json!({"status": "success"}));
        assert_eq!(lower.status, Status::Success);
        assert_eq!(lower.message, "");
    }

    #[test]
    fn test_parse_completion_bad_input() {
        let unknown = parse_completion(&json!({"status": "MAYBE", "message": "?"}));
        assert_eq!(unknown.status, Status::Error);
        assert!(unknown.message.contains("MAYBE"));

        let missing = parse_completion(&json!({}));
        assert_eq!(missing.status, Status::Error);
        assert!(missing.message.contains("status is required"));
    }
}
