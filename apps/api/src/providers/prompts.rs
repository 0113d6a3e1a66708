// Shared prompt fragments used by every provider adapter.
// Feature-specific prompts live alongside the feature (see recommendation::prompts).

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Description attached to the structured-output schema / forced tool.
pub const SCHEMA_DESCRIPTION: &str =
    "Submit the complete program recommendation. Every field is required.";
