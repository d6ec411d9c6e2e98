//! Defines the custom error type for the `evp-kit` crate and the
//! normalization of OpenSSL's thread-local error queue.
//!
//! libcrypto 的错误模型是“哨兵返回值 + 线程本地错误队列”。本模块把它
//! 规范化为一个结构化的 `Error` 枚举：每一次可失败的原生调用都必须在
//! 下一次原生调用之前经过 [`checked`]，以免错误队列被跨调用污染。

use openssl::error::ErrorStack;
use thiserror::Error;

/// The main error type for the `evp-kit` crate.
#[derive(Debug, Error)]
pub enum Error {
    /// The native library reported a sentinel failure. Carries the drained
    /// error-queue messages joined with `", "`, or a generic fallback when
    /// the queue was empty.
    #[error("crypto operation failed: {0}")]
    CryptoOperationFailed(String),

    /// A key's declared algorithm family matches none of RSA/DSA/DH/EC.
    #[error("unsupported key type: {0}")]
    UnsupportedKeyType(String),

    /// A caller-supplied structural precondition was violated before any
    /// native call was made.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// 规范化包装器：原生调用之后立刻套上。
///
/// 失败时把已抽干的错误队列（`ErrorStack`）压成一条
/// [`Error::CryptoOperationFailed`]；成功时清空残留队列后原样返回，
/// 避免前一次无关调用的残余消息泄漏进后续的失败里。
pub(crate) fn checked<T>(ret: std::result::Result<T, ErrorStack>) -> Result<T> {
    match ret {
        Ok(value) => {
            clear_error_queue();
            Ok(value)
        }
        Err(stack) => Err(normalize(stack)),
    }
}

/// Drain and discard whatever is left on the calling thread's error queue.
pub(crate) fn clear_error_queue() {
    let _ = ErrorStack::get();
}

/// Collapse a drained error stack into a single structured failure.
pub(crate) fn normalize(stack: ErrorStack) -> Error {
    let messages: Vec<String> = stack
        .errors()
        .iter()
        .map(|e| match e.reason() {
            Some(reason) => reason.to_string(),
            None => e.to_string(),
        })
        .collect();

    if messages.is_empty() {
        Error::CryptoOperationFailed("an unknown error occurred".to_string())
    } else {
        Error::CryptoOperationFailed(messages.join(", "))
    }
}

impl Error {
    /// True when the failure came from the native library itself.
    pub fn is_crypto_failure(&self) -> bool {
        matches!(self, Error::CryptoOperationFailed(_))
    }
}
