//! 椭圆曲线名查询表：曲线名 → NID 与点分十进制 OID。
//!
//! 该表同时服务于三个消费方：按名生成 EC 密钥、`EcDetails` 的
//! `curve_name`/`curve_oid` 字段、以及曲线枚举查询。

use openssl::nid::Nid;

pub(crate) struct Curve {
    pub name: &'static str,
    pub oid: &'static str,
    pub nid: Nid,
}

const CURVES: &[Curve] = &[
    Curve {
        name: "prime192v1",
        oid: "1.2.840.10045.3.1.1",
        nid: Nid::X9_62_PRIME192V1,
    },
    Curve {
        name: "prime256v1",
        oid: "1.2.840.10045.3.1.7",
        nid: Nid::X9_62_PRIME256V1,
    },
    Curve {
        name: "secp224r1",
        oid: "1.3.132.0.33",
        nid: Nid::SECP224R1,
    },
    Curve {
        name: "secp256k1",
        oid: "1.3.132.0.10",
        nid: Nid::SECP256K1,
    },
    Curve {
        name: "secp384r1",
        oid: "1.3.132.0.34",
        nid: Nid::SECP384R1,
    },
    Curve {
        name: "secp521r1",
        oid: "1.3.132.0.35",
        nid: Nid::SECP521R1,
    },
];

/// 可用的曲线名，与生成时接受的名字一致。
pub fn curve_names() -> Vec<&'static str> {
    CURVES.iter().map(|c| c.name).collect()
}

pub(crate) fn find(name: &str) -> Option<&'static Curve> {
    let lower = name.to_ascii_lowercase();
    CURVES.iter().find(|c| c.name == lower)
}

pub(crate) fn find_by_nid(nid: Nid) -> Option<&'static Curve> {
    CURVES.iter().find(|c| c.nid == nid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use openssl::ec::EcGroup;

    #[test]
    fn test_curve_lookup() {
        let curve = find("prime256v1").unwrap();
        assert_eq!(curve.oid, "1.2.840.10045.3.1.7");
        assert_eq!(find_by_nid(Nid::SECP256K1).unwrap().name, "secp256k1");
        assert!(find("curve25519").is_none());
    }

    #[test]
    fn test_listed_curves_are_constructible() {
        for name in curve_names() {
            let curve = find(name).unwrap();
            assert!(EcGroup::from_curve_name(curve.nid).is_ok(), "{name}");
        }
    }
}
