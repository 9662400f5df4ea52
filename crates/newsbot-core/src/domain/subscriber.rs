//! 구독자 식별자.

use serde::{Deserialize, Serialize};
use std::fmt;

/// 메시징 플랫폼의 수신자 식별자 (Telegram chat id 등).
///
/// 정수 id도 문자열로 보관하여 JSON 맵 키로 그대로 쓸 수 있습니다.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubscriberId(String);

impl SubscriberId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<i64> for SubscriberId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

impl From<&str> for SubscriberId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for SubscriberId {
    fn from(id: String) -> Self {
        Self::new(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_and_string_ids_match() {
        assert_eq!(SubscriberId::from(-100123_i64), SubscriberId::from("-100123"));
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let id = SubscriberId::from(42_i64);
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"42\"");
        let back: SubscriberId = serde_json::from_str("\"42\"").unwrap();
        assert_eq!(back, id);
    }
}
