//! 密钥生成参数记录。
//!
//! 封闭的算法选择器枚举：不在 RSA/DSA/DH/EC 之内的选择器在类型上就
//! 无法表达；从配置文本反序列化时，未知的 `type` 标签直接在 serde
//! 边界上失败。

use serde::{Deserialize, Serialize};

/// Algorithm selector plus algorithm-specific sub-parameters for key
/// generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum KeyParams {
    /// RSA 密钥，按模数位数生成。
    Rsa { bits: u32 },
    /// DSA 密钥，按素数位数生成。
    Dsa { bits: u32 },
    /// DH 密钥，按素数位数或显式 (p, g) 域参数生成。
    Dh(DhParams),
    /// EC 密钥，按曲线名生成（见 [`crate::curves::curve_names`]）。
    Ec { curve: String },
}

/// DH sub-parameters: either a prime length to generate fresh domain
/// parameters, or an explicit big-endian (p, g) pair both parties share.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DhParams {
    Bits {
        bits: u32,
    },
    Pg {
        #[serde(with = "serde_bytes")]
        p: Vec<u8>,
        #[serde(with = "serde_bytes")]
        g: Vec<u8>,
    },
}

impl Default for KeyParams {
    fn default() -> Self {
        KeyParams::Rsa { bits: 2048 }
    }
}

impl KeyParams {
    /// 便捷构造：共享 (p, g) 域参数上的 DH 密钥。
    pub fn dh_from_pg(p: impl Into<Vec<u8>>, g: impl Into<Vec<u8>>) -> Self {
        KeyParams::Dh(DhParams::Pg {
            p: p.into(),
            g: g.into(),
        })
    }

    pub fn ec(curve: impl Into<String>) -> Self {
        KeyParams::Ec {
            curve: curve.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_rsa_2048() {
        assert_eq!(KeyParams::default(), KeyParams::Rsa { bits: 2048 });
    }

    #[test]
    fn test_params_serde_roundtrip() {
        let params = KeyParams::ec("prime256v1");
        let json = serde_json::to_string(&params).unwrap();
        assert!(json.contains("\"type\":\"ec\""));
        let back: KeyParams = serde_json::from_str(&json).unwrap();
        assert_eq!(params, back);
    }

    #[test]
    fn test_unknown_selector_is_rejected_at_the_boundary() {
        let json = r#"{"type":"ed25519","bits":256}"#;
        assert!(serde_json::from_str::<KeyParams>(json).is_err());
    }

    #[test]
    fn test_dh_pg_roundtrip() {
        let params = KeyParams::dh_from_pg(vec![0xdc, 0xf9], vec![0x02]);
        let json = serde_json::to_string(&params).unwrap();
        let back: KeyParams = serde_json::from_str(&json).unwrap();
        assert_eq!(params, back);
    }
}
