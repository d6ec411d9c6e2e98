//! 非对称密钥句柄。
//!
//! [`AsymmetricKey`] 持有一个原生 EVP 密钥对象（私钥材料、公钥材料或
//! 两者兼有），生命周期由所有权管理：原生对象是引用计数的，随句柄
//! 析构释放，不需要也不提供显式的 free。句柄一经构造即有效，不存在
//! 包着空指针的实例。

use openssl::bn::BigNum;
use openssl::dh::Dh;
use openssl::dsa::Dsa;
use openssl::ec::{EcGroup, EcKey};
use openssl::pkey::{PKey, PKeyRef, Private, Public};
use openssl::rsa::Rsa;
use openssl::x509::X509;

use crate::curves;
use crate::error::{Error, Result, checked};
use crate::methods;

pub mod details;
pub mod params;

use details::KeyDetails;
use params::{DhParams, KeyParams};

/// 带口令导出私钥时使用的默认 PEM 加密算法。
pub const DEFAULT_EXPORT_CIPHER: &str = "aes-256-cbc";

pub(crate) enum Material {
    Private(PKey<Private>),
    Public(PKey<Public>),
}

/// Handle to a native asymmetric key (RSA, DSA, DH or EC).
pub struct AsymmetricKey {
    pub(crate) material: Material,
}

impl AsymmetricKey {
    /// Generate fresh key material from an algorithm-parameter record.
    pub fn generate(params: &KeyParams) -> Result<Self> {
        let pkey = match params {
            KeyParams::Rsa { bits } => {
                let rsa = checked(Rsa::generate(*bits))?;
                checked(PKey::from_rsa(rsa))?
            }
            KeyParams::Dsa { bits } => {
                let dsa = checked(Dsa::generate(*bits))?;
                checked(PKey::from_dsa(dsa))?
            }
            KeyParams::Dh(DhParams::Bits { bits }) => {
                let params = checked(Dh::generate_params(*bits, 2))?;
                let dh = checked(params.generate_key())?;
                checked(PKey::from_dh(dh))?
            }
            KeyParams::Dh(DhParams::Pg { p, g }) => {
                let p = checked(BigNum::from_slice(p))?;
                let g = checked(BigNum::from_slice(g))?;
                let params = checked(Dh::from_pqg(p, None, g))?;
                let dh = checked(params.generate_key())?;
                checked(PKey::from_dh(dh))?
            }
            KeyParams::Ec { curve } => {
                let curve = curves::find(curve).ok_or_else(|| {
                    Error::CryptoOperationFailed(format!("unknown curve name: {curve}"))
                })?;
                let group = checked(EcGroup::from_curve_name(curve.nid))?;
                let ec = checked(EcKey::generate(&group))?;
                checked(PKey::from_ec_key(ec))?
            }
        };

        Ok(Self {
            material: Material::Private(pkey),
        })
    }

    /// Parse PEM private-key text, optionally decrypting it with a
    /// passphrase.
    ///
    /// 原生库不区分“格式损坏”、“算法不支持”与“口令错误”，三者都以
    /// [`Error::CryptoOperationFailed`] 报告，消息来自错误队列。
    pub fn from_private_pem(pem: &str, passphrase: Option<&str>) -> Result<Self> {
        let pkey = match passphrase {
            Some(phrase) => checked(PKey::private_key_from_pem_passphrase(
                pem.as_bytes(),
                phrase.as_bytes(),
            ))?,
            None => checked(PKey::private_key_from_pem(pem.as_bytes()))?,
        };

        Ok(Self {
            material: Material::Private(pkey),
        })
    }

    /// Parse PEM public-key text into a public-only handle. An X.509
    /// certificate PEM is also accepted; only its public key is extracted.
    pub fn from_public_pem(pem: &str) -> Result<Self> {
        let bytes = pem.as_bytes();
        let pkey = match PKey::public_key_from_pem(bytes) {
            Ok(pkey) => {
                crate::error::clear_error_queue();
                pkey
            }
            Err(first) => match X509::from_pem(bytes).and_then(|cert| cert.public_key()) {
                Ok(pkey) => {
                    crate::error::clear_error_queue();
                    pkey
                }
                Err(_) => return Err(crate::error::normalize(first)),
            },
        };

        Ok(Self {
            material: Material::Public(pkey),
        })
    }

    /// True when the handle carries private key material.
    pub fn is_private(&self) -> bool {
        matches!(self.material, Material::Private(_))
    }

    /// Retrieve the raw detail record and classify it into the
    /// algorithm-specific variant.
    pub fn details(&self) -> Result<KeyDetails> {
        let pem = self.public_key_pem()?;
        match &self.material {
            Material::Private(pkey) => KeyDetails::from_private(pkey, pem),
            Material::Public(pkey) => KeyDetails::from_public(pkey, pem),
        }
    }

    /// PEM-encoded public key text.
    pub fn public_key_pem(&self) -> Result<String> {
        let pem = match &self.material {
            Material::Private(pkey) => checked(pkey.public_key_to_pem())?,
            Material::Public(pkey) => checked(pkey.public_key_to_pem())?,
        };
        Ok(String::from_utf8_lossy(&pem).into_owned())
    }

    /// Re-derive a handle that carries only the public material.
    pub fn derive_public(&self) -> Result<Self> {
        Self::from_public_pem(&self.public_key_pem()?)
    }

    /// Serialize the private key to PKCS#8 PEM text, encrypted with
    /// [`DEFAULT_EXPORT_CIPHER`] when a passphrase is given.
    pub fn export(&self, passphrase: Option<&str>) -> Result<String> {
        match passphrase {
            Some(phrase) => self.export_with(phrase, DEFAULT_EXPORT_CIPHER),
            None => {
                let pem = checked(self.private()?.private_key_to_pem_pkcs8())?;
                Ok(String::from_utf8_lossy(&pem).into_owned())
            }
        }
    }

    /// Like [`export`](Self::export) with an explicit PEM encryption cipher.
    pub fn export_with(&self, passphrase: &str, cipher_method: &str) -> Result<String> {
        // PEM 序列化接口走的是旧式 EVP_CIPHER 常量，按 NID 转接过去
        let nid = methods::cipher_by_name(cipher_method)?.nid();
        let cipher = openssl::symm::Cipher::from_nid(nid).ok_or_else(|| {
            Error::CryptoOperationFailed(format!("unknown cipher method: {cipher_method}"))
        })?;
        let pem = checked(
            self.private()?
                .private_key_to_pem_pkcs8_passphrase(cipher, passphrase.as_bytes()),
        )?;
        Ok(String::from_utf8_lossy(&pem).into_owned())
    }

    /// 私钥视图；公钥-only 句柄上的私钥操作在任何原生调用之前失败。
    pub(crate) fn private(&self) -> Result<&PKeyRef<Private>> {
        match &self.material {
            Material::Private(pkey) => Ok(pkey),
            Material::Public(_) => Err(Error::CryptoOperationFailed(
                "key has no private material".to_string(),
            )),
        }
    }

    /// 统一的公钥对象视图，私钥句柄经公钥 PEM 往返得到。
    pub(crate) fn public_pkey(&self) -> Result<PKey<Public>> {
        let pem = self.public_key_pem()?;
        checked(PKey::public_key_from_pem(pem.as_bytes()))
    }
}

impl std::fmt::Debug for AsymmetricKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match &self.material {
            Material::Private(_) => "private",
            Material::Public(_) => "public",
        };
        f.debug_struct("AsymmetricKey").field("kind", &kind).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_default_is_private() {
        let key = AsymmetricKey::generate(&KeyParams::default()).unwrap();
        assert!(key.is_private());
        assert!(!key.derive_public().unwrap().is_private());
    }

    #[test]
    fn test_generate_unknown_curve_fails() {
        let err = AsymmetricKey::generate(&KeyParams::ec("curve9000")).unwrap_err();
        assert!(err.is_crypto_failure());
    }

    #[test]
    fn test_public_pem_header() {
        let key = AsymmetricKey::generate(&KeyParams::Rsa { bits: 2048 }).unwrap();
        let pem = key.public_key_pem().unwrap();
        assert!(pem.starts_with("-----BEGIN PUBLIC KEY-----"));
    }
}
