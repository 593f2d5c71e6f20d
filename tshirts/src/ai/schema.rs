//! JSON schemas passed to the LLM for structured output
//!
//! One schema per task. The model is constrained to these shapes; the
//! decoders in [`super::tasks`] still validate everything that comes back.

use serde_json::{json, Value};

use crate::size::Size;

fn size_enum() -> Value {
    json!({
        "type": "string",
        "enum": Size::ALL.iter().map(|s| s.as_str()).collect::<Vec<_>>()
    })
}

pub fn estimate() -> Value {
    json!({
        "type": "object",
        "properties": {
            "size": size_enum(),
            "rationale": {"type": "string"}
        },
        "required": ["size", "rationale"]
    })
}

pub fn breakdown() -> Value {
    json!({
        "type": "object",
        "properties": {
            "subtasks": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "title": {"type": "string"},
                        "body": {"type": "string"},
                        "size": size_enum()
                    },
                    "required": ["title", "body", "size"]
                }
            }
        },
        "required": ["subtasks"]
    })
}

/// Conversation turn for drafting new issues
pub fn draft() -> Value {
    json!({
        "type": "object",
        "properties": {
            "ready": {"type": "boolean"},
            "question": {"type": "string"},
            "issues": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "title": {"type": "string"},
                        "description": {"type": "string"},
                        "size": size_enum(),
                        "tasks": {"type": "array", "items": {"type": "string"}}
                    },
                    "required": ["title", "description"]
                }
            }
        },
        "required": ["ready"]
    })
}

/// Conversation turn for refining an existing issue
pub fn refine() -> Value {
    json!({
        "type": "object",
        "properties": {
            "ready": {"type": "boolean"},
            "question": {"type": "string"},
            "refined_description": {"type": "string"},
            "suggestions": {"type": "array", "items": {"type": "string"}}
        },
        "required": ["ready"]
    })
}

pub fn similar() -> Value {
    json!({
        "type": "object",
        "properties": {
            "similar_issues": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "issue_number": {"type": "integer"},
                        "relationship": {
                            "type": "string",
                            "enum": ["duplicate", "parent", "related", "distinct"]
                        },
                        "reasoning": {"type": "string"}
                    },
                    "required": ["issue_number", "relationship", "reasoning"]
                }
            }
        },
        "required": ["similar_issues"]
    })
}

pub fn closing_comment() -> Value {
    json!({
        "type": "object",
        "properties": {
            "comment": {"type": "string"}
        },
        "required": ["comment"]
    })
}
