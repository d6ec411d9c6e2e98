//! 密钥详情变体集：把原生库的无类型 key-details 结果归类为封闭的
//! RSA | DSA | DH | EC 标签联合。
//!
//! 分类只看声明的密钥类型判别式：命中即构造对应变体，未命中返回
//! [`Error::UnsupportedKeyType`]，绝不产生填了一半的变体。公钥-only
//! 的句柄缺少私有字段时一律给空字节串，而不是报错。

use openssl::bn::{BigNum, BigNumContext, BigNumRef};
use openssl::ec::{EcGroupRef, EcPointRef};
use openssl::nid::Nid;
use openssl::pkey::{Id, PKeyRef, Private, Public};
use serde::{Deserialize, Serialize};

use crate::curves;
use crate::error::{Error, Result, checked, clear_error_queue};
use crate::secret::SecretBytes;

/// Algorithm-specific detail record for an asymmetric key.
///
/// All integer fields are big-endian unsigned byte strings; a field that is
/// absent from the key (public-only material, missing CRT parts) is empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum KeyDetails {
    Rsa(RsaDetails),
    Dsa(DsaDetails),
    Dh(DhDetails),
    Ec(EcDetails),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RsaDetails {
    /// 密钥位数。
    pub bits: u32,
    /// PEM 编码的公钥文本。
    pub public_key_pem: String,
    /// 模数。
    #[serde(with = "serde_bytes")]
    pub n: Vec<u8>,
    /// 公开指数。
    #[serde(with = "serde_bytes")]
    pub e: Vec<u8>,
    /// 私有指数。
    pub d: SecretBytes,
    /// 素数因子 p。
    pub p: SecretBytes,
    /// 素数因子 q。
    pub q: SecretBytes,
    /// CRT 系数 d mod (p-1)。
    pub dmp1: SecretBytes,
    /// CRT 系数 d mod (q-1)。
    pub dmq1: SecretBytes,
    /// CRT 系数 q^-1 mod p。
    pub iqmp: SecretBytes,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DsaDetails {
    pub bits: u32,
    pub public_key_pem: String,
    #[serde(with = "serde_bytes")]
    pub p: Vec<u8>,
    #[serde(with = "serde_bytes")]
    pub q: Vec<u8>,
    #[serde(with = "serde_bytes")]
    pub g: Vec<u8>,
    pub priv_key: SecretBytes,
    #[serde(with = "serde_bytes")]
    pub pub_key: Vec<u8>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DhDetails {
    pub bits: u32,
    pub public_key_pem: String,
    #[serde(with = "serde_bytes")]
    pub p: Vec<u8>,
    #[serde(with = "serde_bytes")]
    pub g: Vec<u8>,
    pub priv_key: SecretBytes,
    #[serde(with = "serde_bytes")]
    pub pub_key: Vec<u8>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EcDetails {
    pub bits: u32,
    pub public_key_pem: String,
    /// 曲线名，例如 `prime256v1`。
    pub curve_name: String,
    /// 曲线的点分十进制 OID，例如 `1.2.840.10045.3.1.7`。
    pub curve_oid: String,
    /// 仿射坐标 x。
    #[serde(with = "serde_bytes")]
    pub x: Vec<u8>,
    /// 仿射坐标 y。
    #[serde(with = "serde_bytes")]
    pub y: Vec<u8>,
    /// 私有标量。
    pub d: SecretBytes,
}

impl KeyDetails {
    /// Key size in bits.
    pub fn bits(&self) -> u32 {
        match self {
            KeyDetails::Rsa(d) => d.bits,
            KeyDetails::Dsa(d) => d.bits,
            KeyDetails::Dh(d) => d.bits,
            KeyDetails::Ec(d) => d.bits,
        }
    }

    /// PEM-encoded public key text.
    pub fn public_key_pem(&self) -> &str {
        match self {
            KeyDetails::Rsa(d) => &d.public_key_pem,
            KeyDetails::Dsa(d) => &d.public_key_pem,
            KeyDetails::Dh(d) => &d.public_key_pem,
            KeyDetails::Ec(d) => &d.public_key_pem,
        }
    }

    /// Lowercase family name of the selected variant.
    pub fn type_name(&self) -> &'static str {
        match self {
            KeyDetails::Rsa(_) => "rsa",
            KeyDetails::Dsa(_) => "dsa",
            KeyDetails::Dh(_) => "dh",
            KeyDetails::Ec(_) => "ec",
        }
    }

    /// 对私钥句柄做分类与字段提取。
    pub(crate) fn from_private(pkey: &PKeyRef<Private>, public_key_pem: String) -> Result<Self> {
        let bits = pkey.bits();
        match pkey.id() {
            Id::RSA => {
                let rsa = checked(pkey.rsa())?;
                Ok(KeyDetails::Rsa(RsaDetails {
                    bits,
                    public_key_pem,
                    n: bn(rsa.n()),
                    e: bn(rsa.e()),
                    d: bn(rsa.d()).into(),
                    p: opt_bn(rsa.p()).into(),
                    q: opt_bn(rsa.q()).into(),
                    dmp1: opt_bn(rsa.dmp1()).into(),
                    dmq1: opt_bn(rsa.dmq1()).into(),
                    iqmp: opt_bn(rsa.iqmp()).into(),
                }))
            }
            Id::DSA => {
                let dsa = checked(pkey.dsa())?;
                Ok(KeyDetails::Dsa(DsaDetails {
                    bits,
                    public_key_pem,
                    p: bn(dsa.p()),
                    q: bn(dsa.q()),
                    g: bn(dsa.g()),
                    priv_key: bn(dsa.priv_key()).into(),
                    pub_key: bn(dsa.pub_key()),
                }))
            }
            Id::DH => {
                let dh = checked(pkey.dh())?;
                Ok(KeyDetails::Dh(DhDetails {
                    bits,
                    public_key_pem,
                    p: bn(dh.prime_p()),
                    g: bn(dh.generator()),
                    priv_key: bn(dh.private_key()).into(),
                    pub_key: bn(dh.public_key()),
                }))
            }
            Id::EC => {
                let ec = checked(pkey.ec_key())?;
                let (curve_name, curve_oid) = curve_idents(ec.group())?;
                let (x, y) = affine_coordinates(ec.group(), ec.public_key())?;
                Ok(KeyDetails::Ec(EcDetails {
                    bits,
                    public_key_pem,
                    curve_name,
                    curve_oid,
                    x,
                    y,
                    d: bn(ec.private_key()).into(),
                }))
            }
            other => Err(unsupported(other)),
        }
    }

    /// 对公钥句柄做分类与字段提取；私有字段保持为空。
    pub(crate) fn from_public(pkey: &PKeyRef<Public>, public_key_pem: String) -> Result<Self> {
        let bits = pkey.bits();
        match pkey.id() {
            Id::RSA => {
                let rsa = checked(pkey.rsa())?;
                Ok(KeyDetails::Rsa(RsaDetails {
                    bits,
                    public_key_pem,
                    n: bn(rsa.n()),
                    e: bn(rsa.e()),
                    ..Default::default()
                }))
            }
            Id::DSA => {
                let dsa = checked(pkey.dsa())?;
                Ok(KeyDetails::Dsa(DsaDetails {
                    bits,
                    public_key_pem,
                    p: bn(dsa.p()),
                    q: bn(dsa.q()),
                    g: bn(dsa.g()),
                    pub_key: bn(dsa.pub_key()),
                    ..Default::default()
                }))
            }
            Id::DH => {
                let dh = checked(pkey.dh())?;
                Ok(KeyDetails::Dh(DhDetails {
                    bits,
                    public_key_pem,
                    p: bn(dh.prime_p()),
                    g: bn(dh.generator()),
                    pub_key: bn(dh.public_key()),
                    ..Default::default()
                }))
            }
            Id::EC => {
                let ec = checked(pkey.ec_key())?;
                let (curve_name, curve_oid) = curve_idents(ec.group())?;
                let (x, y) = affine_coordinates(ec.group(), ec.public_key())?;
                Ok(KeyDetails::Ec(EcDetails {
                    bits,
                    public_key_pem,
                    curve_name,
                    curve_oid,
                    x,
                    y,
                    ..Default::default()
                }))
            }
            other => Err(unsupported(other)),
        }
    }
}

/// 把原生算法 id 译成可读的算法名再报错；查不到名字时退回原始
/// 判别值，避免把错误吞掉。
fn unsupported(id: Id) -> Error {
    match Nid::from_raw(id.as_raw()).long_name() {
        Ok(name) => Error::UnsupportedKeyType(name.to_string()),
        Err(_) => {
            clear_error_queue();
            Error::UnsupportedKeyType(format!("{id:?}"))
        }
    }
}

fn bn(value: &BigNumRef) -> Vec<u8> {
    value.to_vec()
}

fn opt_bn(value: Option<&BigNumRef>) -> Vec<u8> {
    value.map(BigNumRef::to_vec).unwrap_or_default()
}

fn curve_idents(group: &EcGroupRef) -> Result<(String, String)> {
    let Some(nid) = group.curve_name() else {
        // 显式参数曲线没有注册名
        return Ok((String::new(), String::new()));
    };

    match curves::find_by_nid(nid) {
        Some(curve) => Ok((curve.name.to_string(), curve.oid.to_string())),
        None => {
            let name = checked(nid.short_name())?;
            Ok((name.to_string(), String::new()))
        }
    }
}

fn affine_coordinates(group: &EcGroupRef, point: &EcPointRef) -> Result<(Vec<u8>, Vec<u8>)> {
    let mut ctx = checked(BigNumContext::new())?;
    let mut x = checked(BigNum::new())?;
    let mut y = checked(BigNum::new())?;
    checked(point.affine_coordinates_gfp(group, &mut x, &mut y, &mut ctx))?;
    Ok((x.to_vec(), y.to_vec()))
}
