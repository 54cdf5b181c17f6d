use serde_json::Value;

pub const ACCESS_KEY_ID_FIELD: &str = "aws_access_key_id";
pub const SECRET_ACCESS_KEY_FIELD: &str = "aws_secret_access_key";
pub const DEFAULT_SECRET_PREFIX: &str = "dev";

pub fn secret_id(prefix: &str, field: &str) -> String {
    let trimmed = prefix.trim_matches('/');
    if trimmed.is_empty() {
        field.to_string()
    } else {
        format!("{trimmed}/{field}")
    }
}

pub fn secret_field(secret_string: &str, field: &str) -> Result<String, String> {
    let value: Value = serde_json::from_str(secret_string)
        .map_err(|error| format!("secret value is not valid JSON: {error}"))?;

    match value.get(field) {
        Some(Value::String(text)) if !text.is_empty() => Ok(text.clone()),
        Some(_) => Err(format!("secret field '{field}' must be a non-empty string")),
        None => Err(format!("secret field '{field}' is missing")),
    }
}
