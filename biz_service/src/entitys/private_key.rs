use serde::{Deserialize, Serialize};
use std::fmt;
use subtle::ConstantTimeEq;

/// 私钥字节长度（256 bit）
pub const PRIVATE_KEY_BYTES: usize = 32;

/// 组队记录的私钥，小写十六进制字符串
#[derive(Clone, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrivateKey(String);

impl PrivateKey {
    pub fn from_bytes(bytes: &[u8; PRIVATE_KEY_BYTES]) -> Self {
        Self(hex::encode(bytes))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 常量时间比较调用方提供的私钥
    pub fn matches(&self, candidate: &str) -> bool {
        bool::from(self.0.as_bytes().ct_eq(candidate.as_bytes()))
    }
}

impl PartialEq for PrivateKey {
    fn eq(&self, other: &Self) -> bool {
        self.matches(&other.0)
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PrivateKey").field(&"***").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_encoding_is_lowercase_64_chars() {
        let key = PrivateKey::from_bytes(&[0xab; PRIVATE_KEY_BYTES]);
        assert_eq!(key.as_str().len(), 64);
        assert!(key.as_str().chars().all(|c| matches!(c, '0'..='9' | 'a'..='f')));
    }

    #[test]
    fn matches_exactly() {
        let key = PrivateKey::from_bytes(&[0x5c; PRIVATE_KEY_BYTES]);
        assert!(key.matches(key.as_str()));
        assert!(!key.matches(&key.as_str().to_uppercase()));
        assert!(!key.matches(&key.as_str()[..63]));
        assert!(!key.matches(""));
    }

    #[test]
    fn debug_is_redacted() {
        let key = PrivateKey::from_bytes(&[1; PRIVATE_KEY_BYTES]);
        assert!(!format!("{:?}", key).contains(key.as_str()));
    }
}
