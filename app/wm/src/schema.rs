//! JSON Schema of the configuration file.

use crate::config::Config;

/// Generates the JSON Schema for [`Config`].
#[must_use]
pub fn generate_schema() -> schemars::Schema {
    let mut schema = schemars::schema_for!(Config);

    if let Some(obj) = schema.as_object_mut() {
        obj.insert(
            "$id".to_string(),
            serde_json::json!(
                "https://raw.githubusercontent.com/tessellate-wm/tessellate/main/tessellate.schema.json"
            ),
        );
    }

    schema
}

/// Pretty-printed [`generate_schema`].
#[must_use]
pub fn generate_schema_json() -> String {
    serde_json::to_string_pretty(&generate_schema()).unwrap_or_default()
}
