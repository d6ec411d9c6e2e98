//! 无状态原语门面：对称加解密、摘要、签名/验签、信封加密
//! (seal/open)、DH 共享密钥、随机字节，以及直接的 RSA 运算。
//!
//! 每个操作都是一次同步的原生调用，结果立刻经
//! [`checked`](crate::error) 规范化后返回；没有重试、没有静默恢复。

use openssl::bn::BigNum;
use openssl::cipher::CipherRef;
use openssl::cipher_ctx::CipherCtx;
use openssl::hash::hash;
use openssl::pkey::{HasPublic, PKeyRef};
use openssl::rand::rand_bytes;
use openssl::rsa::Padding;
use openssl::sign::{Signer, Verifier};

use crate::error::{Error, Result, checked};
use crate::key::{AsymmetricKey, Material};
use crate::methods;
use crate::secret::SecretBytes;

/// seal/open 在调用方未指定时使用的密码方法。
pub const DEFAULT_SEAL_METHOD: &str = "aes-256-cbc";

/// Symmetric cipher option flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Options {
    /// Disable the cipher's block padding; the caller must then supply
    /// block-aligned input.
    pub no_padding: bool,
}

/// Tri-state outcome of [`verify`]: a signature that does not verify is a
/// legitimate result, not a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verification {
    Valid,
    Invalid,
}

impl Verification {
    pub fn is_valid(self) -> bool {
        self == Verification::Valid
    }
}

/// Result of [`seal`]: the ciphertext, one wrapped symmetric key per
/// recipient (parallel to the input list), and the method/IV actually used.
#[derive(Debug, Clone)]
pub struct Sealed {
    pub ciphertext: Vec<u8>,
    pub keys: Vec<Vec<u8>>,
    pub iv: Vec<u8>,
    pub method: String,
}

/// Encrypt `data` under the named symmetric cipher method.
///
/// 与原生封装一致：`key` 会被零填充或截断到该方法的密钥长度，输入
/// 输出始终是原始字节。需要 IV 的方法必须给出长度正确的 IV。
pub fn encrypt(
    data: &[u8],
    method: &str,
    key: &[u8],
    iv: Option<&[u8]>,
    options: Options,
) -> Result<Vec<u8>> {
    let cipher = methods::cipher_by_name(method)?;
    let key = normalize_key(&cipher, key);
    let iv = check_iv(&cipher, iv)?;
    run_cipher(&cipher, true, &key, iv, data, options)
}

/// Decrypt `data` produced by [`encrypt`] with the same method, key and IV.
pub fn decrypt(
    data: &[u8],
    method: &str,
    key: &[u8],
    iv: Option<&[u8]>,
    options: Options,
) -> Result<Vec<u8>> {
    let cipher = methods::cipher_by_name(method)?;
    let key = normalize_key(&cipher, key);
    let iv = check_iv(&cipher, iv)?;
    run_cipher(&cipher, false, &key, iv, data, options)
}

/// Hash `data` under the named digest algorithm, returning lowercase hex.
pub fn digest(data: &[u8], algo: &str) -> Result<String> {
    Ok(hex::encode(digest_raw(data, algo)?))
}

/// Hash `data` under the named digest algorithm, returning raw bytes.
pub fn digest_raw(data: &[u8], algo: &str) -> Result<Vec<u8>> {
    let md = methods::digest_by_name(algo)?;
    Ok(checked(hash(md, data))?.to_vec())
}

/// Produce a detached signature over `data` with the handle's private key
/// and the named digest algorithm.
pub fn sign(data: &[u8], key: &AsymmetricKey, digest_algo: &str) -> Result<Vec<u8>> {
    let md = methods::digest_by_name(digest_algo)?;
    let pkey = key.private()?;
    let mut signer = checked(Signer::new(md, pkey))?;
    checked(signer.update(data))?;
    checked(signer.sign_to_vec())
}

/// Check a detached signature over `data`.
///
/// 返回 [`Verification::Invalid`] 表示“签名不匹配”；只有畸形输入或
/// 内部错误才会落到 `Err`。
pub fn verify(
    data: &[u8],
    signature: &[u8],
    key: &AsymmetricKey,
    digest_algo: &str,
) -> Result<Verification> {
    let md = methods::digest_by_name(digest_algo)?;
    match &key.material {
        Material::Private(pkey) => verify_with(md, pkey, data, signature),
        Material::Public(pkey) => verify_with(md, pkey, data, signature),
    }
}

fn verify_with<T: HasPublic>(
    md: openssl::hash::MessageDigest,
    pkey: &PKeyRef<T>,
    data: &[u8],
    signature: &[u8],
) -> Result<Verification> {
    let mut verifier = checked(Verifier::new(md, pkey))?;
    checked(verifier.update(data))?;
    let valid = checked(verifier.verify(signature))?;
    Ok(if valid {
        Verification::Valid
    } else {
        Verification::Invalid
    })
}

/// Envelope-encrypt `data` once with a random symmetric key, wrapping that
/// key separately for every recipient public key, in input order.
///
/// IV 未指定时自动生成。空的接收者列表在任何原生调用之前以
/// [`Error::InvalidArgument`] 拒绝。
pub fn seal(
    data: &[u8],
    recipients: &[&AsymmetricKey],
    method: &str,
    iv: Option<&[u8]>,
) -> Result<Sealed> {
    if recipients.is_empty() {
        return Err(Error::InvalidArgument(
            "seal requires at least one recipient key".to_string(),
        ));
    }

    let cipher = methods::cipher_by_name(method)?;
    let iv = match iv {
        Some(iv) => check_iv(&cipher, Some(iv))?.map(|iv| iv.to_vec()),
        None => match cipher.iv_length() {
            0 => None,
            len => Some(random_pseudo_bytes(len)?),
        },
    };

    let mut sym_key = SecretBytes(vec![0; cipher.key_length()]);
    checked(rand_bytes(&mut sym_key.0))?;

    let ciphertext = run_cipher(
        &cipher,
        true,
        &sym_key,
        iv.as_deref(),
        data,
        Options::default(),
    )?;

    let mut keys = Vec::with_capacity(recipients.len());
    for recipient in recipients {
        let pkey = recipient.public_pkey()?;
        let rsa = checked(pkey.rsa())?;
        let mut wrapped = vec![0; rsa.size() as usize];
        let written = checked(rsa.public_encrypt(&sym_key, &mut wrapped, Padding::PKCS1))?;
        wrapped.truncate(written);
        keys.push(wrapped);
    }

    Ok(Sealed {
        ciphertext,
        keys,
        iv: iv.unwrap_or_default(),
        method: method.to_string(),
    })
}

/// Reverse of [`seal`] for one recipient: unwrap the symmetric key with the
/// recipient's private key, then decrypt the ciphertext.
pub fn open(
    ciphertext: &[u8],
    wrapped_key: &[u8],
    key: &AsymmetricKey,
    method: &str,
    iv: Option<&[u8]>,
) -> Result<Vec<u8>> {
    let cipher = methods::cipher_by_name(method)?;
    let iv = check_iv(&cipher, iv)?;

    let rsa = checked(key.private()?.rsa())?;
    let mut sym_key = SecretBytes(vec![0; rsa.size() as usize]);
    let written = checked(rsa.private_decrypt(wrapped_key, &mut sym_key.0, Padding::PKCS1))?;
    sym_key.0.truncate(written);
    if sym_key.len() < cipher.key_length() {
        return Err(Error::CryptoOperationFailed(
            "unwrapped envelope key is shorter than the cipher key length".to_string(),
        ));
    }

    run_cipher(&cipher, false, &sym_key, iv, ciphertext, Options::default())
}

/// Compute the Diffie-Hellman shared secret from a peer's big-endian public
/// key bytes and the caller's own DH key handle.
pub fn dh_compute_key(peer_public: &[u8], key: &AsymmetricKey) -> Result<Vec<u8>> {
    let dh = checked(key.private()?.dh())?;
    let peer = checked(BigNum::from_slice(peer_public))?;
    checked(dh.compute_key(&peer))
}

/// `len` non-deterministic bytes from the native generator.
pub fn random_pseudo_bytes(len: usize) -> Result<Vec<u8>> {
    let mut buf = vec![0; len];
    checked(rand_bytes(&mut buf))?;
    Ok(buf)
}

/// RSA PKCS#1 v1.5 encryption under the handle's public key.
pub fn public_encrypt(data: &[u8], key: &AsymmetricKey) -> Result<Vec<u8>> {
    let pkey = key.public_pkey()?;
    let rsa = checked(pkey.rsa())?;
    let mut out = vec![0; rsa.size() as usize];
    let written = checked(rsa.public_encrypt(data, &mut out, Padding::PKCS1))?;
    out.truncate(written);
    Ok(out)
}

/// Reverse of [`public_encrypt`] with the handle's private key.
pub fn private_decrypt(data: &[u8], key: &AsymmetricKey) -> Result<Vec<u8>> {
    let rsa = checked(key.private()?.rsa())?;
    let mut out = vec![0; rsa.size() as usize];
    let written = checked(rsa.private_decrypt(data, &mut out, Padding::PKCS1))?;
    out.truncate(written);
    Ok(out)
}

/// RSA PKCS#1 v1.5 "signature-style" encryption under the private key.
pub fn private_encrypt(data: &[u8], key: &AsymmetricKey) -> Result<Vec<u8>> {
    let rsa = checked(key.private()?.rsa())?;
    let mut out = vec![0; rsa.size() as usize];
    let written = checked(rsa.private_encrypt(data, &mut out, Padding::PKCS1))?;
    out.truncate(written);
    Ok(out)
}

/// Reverse of [`private_encrypt`] with the public key.
pub fn public_decrypt(data: &[u8], key: &AsymmetricKey) -> Result<Vec<u8>> {
    let pkey = key.public_pkey()?;
    let rsa = checked(pkey.rsa())?;
    let mut out = vec![0; rsa.size() as usize];
    let written = checked(rsa.public_decrypt(data, &mut out, Padding::PKCS1))?;
    out.truncate(written);
    Ok(out)
}

/// 把口令零填充或截断到密码方法的密钥长度，与原生封装的行为一致。
fn normalize_key(cipher: &CipherRef, key: &[u8]) -> SecretBytes {
    let mut normalized = vec![0u8; cipher.key_length()];
    let take = key.len().min(normalized.len());
    normalized[..take].copy_from_slice(&key[..take]);
    SecretBytes(normalized)
}

fn check_iv<'a>(cipher: &CipherRef, iv: Option<&'a [u8]>) -> Result<Option<&'a [u8]>> {
    match cipher.iv_length() {
        0 => Ok(None),
        needed => match iv {
            Some(iv) if iv.len() == needed => Ok(Some(iv)),
            Some(iv) => Err(Error::CryptoOperationFailed(format!(
                "IV length mismatch: expected {needed} bytes, got {}",
                iv.len()
            ))),
            None => Err(Error::CryptoOperationFailed(format!(
                "cipher method requires a {needed} byte IV"
            ))),
        },
    }
}

fn run_cipher(
    cipher: &CipherRef,
    encrypting: bool,
    key: &[u8],
    iv: Option<&[u8]>,
    data: &[u8],
    options: Options,
) -> Result<Vec<u8>> {
    let mut ctx = checked(CipherCtx::new())?;
    if encrypting {
        checked(ctx.encrypt_init(Some(cipher), Some(key), iv))?;
    } else {
        checked(ctx.decrypt_init(Some(cipher), Some(key), iv))?;
    }
    ctx.set_padding(!options.no_padding);

    let mut out = Vec::with_capacity(data.len() + cipher.block_size());
    checked(ctx.cipher_update_vec(data, &mut out))?;
    checked(ctx.cipher_final_vec(&mut out))?;
    Ok(out)
}
