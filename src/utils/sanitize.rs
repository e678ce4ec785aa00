use serde_json::Value;

/// Sanitizes sensitive fields in JSON payloads for logging. PINs in
/// particular must never reach a log line in any form.
pub fn sanitize_json(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut sanitized = serde_json::Map::new();
            for (key, val) in map {
                let sanitized_val = if is_sensitive_field(key) {
                    Value::String("****".to_string())
                } else {
                    sanitize_json(val)
                };
                sanitized.insert(key.clone(), sanitized_val);
            }
            Value::Object(sanitized)
        }
        Value::Array(arr) => Value::Array(arr.iter().map(sanitize_json).collect()),
        _ => value.clone(),
    }
}

fn is_sensitive_field(key: &str) -> bool {
    matches!(
        key.to_lowercase().as_str(),
        "pin" | "password" | "secret" | "token" | "api_key" | "authorization"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sanitize_pin() {
        let input = json!({
            "bandId": "NKM-A1B2C3D",
            "pin": "1234",
            "amount": 200
        });

        let sanitized = sanitize_json(&input);

        assert_eq!(sanitized["pin"], "****");
        assert_eq!(sanitized["bandId"], "NKM-A1B2C3D");
        assert_eq!(sanitized["amount"], 200);
    }

    #[test]
    fn test_sanitize_nested() {
        let input = json!({
            "seller": {
                "pin": "0000",
                "name": "Chai Point"
            }
        });

        let sanitized = sanitize_json(&input);
        assert_eq!(sanitized["seller"]["pin"], "****");
        assert_eq!(sanitized["seller"]["name"], "Chai Point");
    }
}
