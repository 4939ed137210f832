//! Helpers for decoding raw `redis::Value` replies.
//!
//! Replies are inspected loosely: anything that does not have the expected
//! shape decodes to `None` and the caller skips it.

use redis::{ErrorKind, RedisError, Value};

/// Decodes a bulk string or status reply as UTF-8 text
pub fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::Data(bytes) => String::from_utf8(bytes.clone()).ok(),
        Value::Status(status) => Some(status.clone()),
        Value::Okay => Some("OK".to_string()),
        _ => None,
    }
}

/// Decodes an array reply, keeping only its textual elements
pub fn as_text_list(value: &Value) -> Option<Vec<String>> {
    match value {
        Value::Bulk(items) => Some(items.iter().filter_map(as_text).collect()),
        _ => None,
    }
}

/// Splits a flat `field, value, field, value, ...` array into pairs
///
/// Non-text field names are skipped along with their value. A trailing field
/// without a value is ignored.
pub fn field_pairs(value: &Value) -> Vec<(String, &Value)> {
    let Value::Bulk(items) = value else {
        return Vec::new();
    };

    items
        .chunks_exact(2)
        .filter_map(|pair| as_text(&pair[0]).map(|name| (name, &pair[1])))
        .collect()
}

/// Returns true if the server reported an unknown ACL user
pub fn is_user_not_found(err: &RedisError) -> bool {
    if err.kind() != ErrorKind::ResponseError && err.kind() != ErrorKind::ExtensionError {
        return false;
    }
    let matches = |text: &str| text.to_ascii_lowercase().contains("user not found");
    err.detail().is_some_and(matches) || matches(&err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data(s: &str) -> Value {
        Value::Data(s.as_bytes().to_vec())
    }

    #[test]
    fn test_as_text() {
        assert_eq!(as_text(&data("hello")), Some("hello".to_string()));
        assert_eq!(as_text(&Value::Status("on".into())), Some("on".to_string()));
        assert_eq!(as_text(&Value::Int(1)), None);
        assert_eq!(as_text(&Value::Nil), None);
    }

    #[test]
    fn test_as_text_list_skips_non_text() {
        let value = Value::Bulk(vec![data("a"), Value::Int(3), data("b")]);
        assert_eq!(as_text_list(&value), Some(vec!["a".to_string(), "b".to_string()]));
        assert_eq!(as_text_list(&data("a")), None);
    }

    #[test]
    fn test_field_pairs() {
        let value = Value::Bulk(vec![
            data("flags"),
            Value::Bulk(vec![data("on")]),
            Value::Int(7),
            data("ignored"),
            data("commands"),
            data("+@all"),
            data("dangling"),
        ]);

        let pairs = field_pairs(&value);
        let names: Vec<&str> = pairs.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["flags", "commands"]);
        assert_eq!(pairs[1].1, &data("+@all"));
    }

    #[test]
    fn test_is_user_not_found() {
        let err = RedisError::from((
            ErrorKind::ResponseError,
            "An error was signalled by the server",
            "User not found".to_string(),
        ));
        assert!(is_user_not_found(&err));

        let other = RedisError::from((
            ErrorKind::ResponseError,
            "An error was signalled by the server",
            "Syntax error".to_string(),
        ));
        assert!(!is_user_not_found(&other));

        let io = RedisError::from(std::io::Error::new(
            std::io::ErrorKind::Other,
            "user not found",
        ));
        assert!(!is_user_not_found(&io));
    }
}
