use crate::entitys::private_key::{PRIVATE_KEY_BYTES, PrivateKey};
use common::errors::AppError;
use log::error;
use rand::TryRngCore;
use rand::rngs::OsRng;

/// 私钥来源，创建时调用一次
pub trait SecretSource: Send + Sync {
    fn issue(&self) -> Result<PrivateKey, AppError>;
}

/// 操作系统 CSPRNG
#[derive(Debug, Default, Clone, Copy)]
pub struct OsSecretSource;

impl SecretSource for OsSecretSource {
    fn issue(&self) -> Result<PrivateKey, AppError> {
        let mut bytes = [0u8; PRIVATE_KEY_BYTES];
        OsRng.try_fill_bytes(&mut bytes).map_err(|e| {
            error!("❌ 系统随机源不可用: {}", e);
            AppError::Internal(format!("os rng: {}", e))
        })?;
        Ok(PrivateKey::from_bytes(&bytes))
    }
}
