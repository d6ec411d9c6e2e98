//! 方法名查询：把文本形式的算法标识符解析为原生密码器/摘要句柄，
//! 并提供与之配套的枚举查询（可用方法列表、IV 长度、证书搜索路径）。
//!
//! 密码方法名原样交给原生 `EVP_CIPHER_fetch` 解析，摘要名交给
//! `EVP_get_digestbyname`；本层不维护自己的算法白名单。原生查不到的
//! 名字表现为 [`Error::CryptoOperationFailed`]。唯一的例外是 AEAD
//! 模式：通用加解密接口没有 tag 参数，这类方法在任何原生调用之前
//! 以 [`Error::InvalidArgument`] 拒绝。

use std::path::PathBuf;

use openssl::cipher::Cipher;
use openssl::hash::MessageDigest;

use crate::error::{Error, Result, checked, clear_error_queue};

/// 枚举查询用的候选密码方法名。原生绑定没有提供 `EVP_CIPHER_do_all`
/// 一类的遍历接口，枚举改为拿候选表逐一向原生查证，查不到的静默
/// 跳过（例如被移入 legacy provider 的老算法）。解析本身不查这张表。
const CIPHER_CANDIDATES: &[&str] = &[
    "aes-128-cbc",
    "aes-128-cfb",
    "aes-128-ctr",
    "aes-128-ecb",
    "aes-128-ofb",
    "aes-192-cbc",
    "aes-192-cfb",
    "aes-192-ctr",
    "aes-192-ecb",
    "aes-192-ofb",
    "aes-256-cbc",
    "aes-256-cfb",
    "aes-256-ctr",
    "aes-256-ecb",
    "aes-256-ofb",
    "aria-128-cbc",
    "aria-192-cbc",
    "aria-256-cbc",
    "bf-cbc",
    "camellia-128-cbc",
    "camellia-192-cbc",
    "camellia-256-cbc",
    "cast5-cbc",
    "chacha20",
    "des-cbc",
    "des-ede3-cbc",
    "rc4",
    "sm4-cbc",
];

/// 候选摘要名，同样逐一经原生查询过滤后对外枚举。
const MD_CANDIDATES: &[&str] = &[
    "md5", "sha1", "sha224", "sha256", "sha384", "sha512", "ripemd160", "sm3",
];

/// AEAD 模式需要调用方处理认证 tag，通用接口不提供这个通道。
const AEAD_MARKERS: &[&str] = &["-gcm", "-ccm", "-ocb", "-siv", "poly1305"];

fn is_aead(method: &str) -> bool {
    let lower = method.to_ascii_lowercase();
    AEAD_MARKERS.iter().any(|marker| lower.contains(marker))
}

/// Resolve a textual cipher method identifier, e.g. `"aes-128-cbc"`,
/// through the native algorithm registry. Matching is case-insensitive
/// on the native side.
pub(crate) fn cipher_by_name(method: &str) -> Result<Cipher> {
    if method.contains('\0') {
        return Err(Error::InvalidArgument(
            "cipher method name contains a NUL byte".to_string(),
        ));
    }
    if is_aead(method) {
        return Err(Error::InvalidArgument(format!(
            "AEAD cipher method requires tag handling and is not supported: {method}"
        )));
    }
    match checked(Cipher::fetch(None, method, None)) {
        Ok(cipher) => Ok(cipher),
        Err(_) => Err(Error::CryptoOperationFailed(format!(
            "unknown cipher method: {method}"
        ))),
    }
}

/// Resolve a textual digest identifier through the native lookup,
/// e.g. `"sha256"` or `"SHA256"`.
pub(crate) fn digest_by_name(algo: &str) -> Result<MessageDigest> {
    let lower = algo.to_ascii_lowercase();
    MessageDigest::from_name(&lower)
        .ok_or_else(|| Error::CryptoOperationFailed(format!("unknown digest method: {algo}")))
}

/// 可用的对称密码方法名，按字典序。候选表中原生库不认识的项被静默
/// 跳过，因此在精简编译的 libcrypto 上结果可能少于候选表。
pub fn cipher_methods() -> Vec<&'static str> {
    CIPHER_CANDIDATES
        .iter()
        .copied()
        .filter(|name| {
            let known = Cipher::fetch(None, name, None).is_ok();
            clear_error_queue();
            known
        })
        .collect()
}

/// 可用的摘要方法名，过滤规则与 [`cipher_methods`] 相同。
pub fn md_methods() -> Vec<&'static str> {
    MD_CANDIDATES
        .iter()
        .copied()
        .filter(|name| MessageDigest::from_name(name).is_some())
        .collect()
}

/// IV length in bytes for the given cipher method; zero for methods that
/// take no IV.
pub fn cipher_iv_length(method: &str) -> Result<usize> {
    Ok(cipher_by_name(method)?.iv_length())
}

/// 原生库默认的证书搜索路径（证书文件与证书目录），找不到时为空。
pub fn cert_locations() -> Vec<PathBuf> {
    let probe = openssl_probe::probe();
    probe.cert_file.into_iter().chain(probe.cert_dir).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cipher_lookup_is_case_insensitive() {
        assert!(cipher_by_name("AES-128-CBC").is_ok());
        assert!(cipher_by_name("aes-128-cbc").is_ok());
    }

    #[test]
    fn test_unknown_cipher_method_fails() {
        let err = cipher_by_name("rot13").map(|_| ()).unwrap_err();
        assert!(err.to_string().contains("unknown cipher method"));
    }

    #[test]
    fn test_cipher_name_outside_candidate_table_still_resolves() {
        // 解析走原生注册表，不受枚举候选表限制。
        assert!(cipher_by_name("camellia-128-cfb").is_ok());
    }

    #[test]
    fn test_aead_methods_are_rejected_as_arguments() {
        let err = cipher_by_name("aes-256-gcm").map(|_| ()).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
        assert!(
            cipher_by_name("chacha20-poly1305")
                .map(|_| ())
                .is_err()
        );
    }

    #[test]
    fn test_cipher_methods_listed_are_resolvable() {
        let methods = cipher_methods();
        assert!(!methods.is_empty());
        for method in methods {
            assert!(cipher_by_name(method).is_ok());
        }
    }

    #[test]
    fn test_iv_lengths() {
        assert_eq!(cipher_iv_length("aes-128-cbc").unwrap(), 16);
        assert_eq!(cipher_iv_length("aes-256-ecb").unwrap(), 0);
        assert!(cipher_iv_length("nonsense").is_err());
    }

    #[test]
    fn test_md_methods_contains_sha256() {
        assert!(md_methods().contains(&"sha256"));
    }
}
