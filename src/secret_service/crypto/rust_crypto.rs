//! # Rust Crypto
//!
//! Module dedicated to the `dh-ietf1024-sha256-aes128-cbc-pkcs7`
//! session algorithm, using the Rust Crypto crates.
//!
//! Both ends exchange Diffie-Hellman public keys over the 1024-bit
//! MODP group of RFC 2409 while opening the session. The common
//! secret, left-padded to the size of the prime, goes through
//! HKDF-SHA256 to produce the AES-128 key secrets are encrypted with.

use aes::cipher::{block_padding::Pkcs7, generic_array::GenericArray, BlockEncryptMut, KeyIvInit};
use cbc::Encryptor;
use hkdf::{Hkdf, InvalidLength};
use num::BigUint;
use once_cell::sync::Lazy;
use rand::{rngs::OsRng, Rng};
use sha2::Sha256;

/// The size in bytes of the group prime, which is also the size of
/// the random private key.
const GROUP_SIZE: usize = 128;

static GENERATOR: Lazy<BigUint> = Lazy::new(|| BigUint::from(2u32));
static PRIME: Lazy<BigUint> = Lazy::new(|| {
    BigUint::from_bytes_be(&[
        0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xC9, 0x0F, 0xDA, 0xA2, 0x21, 0x68, 0xC2,
        0x34, 0xC4, 0xC6, 0x62, 0x8B, 0x80, 0xDC, 0x1C, 0xD1, 0x29, 0x02, 0x4E, 0x08, 0x8A, 0x67,
        0xCC, 0x74, 0x02, 0x0B, 0xBE, 0xA6, 0x3B, 0x13, 0x9B, 0x22, 0x51, 0x4A, 0x08, 0x79, 0x8E,
        0x34, 0x04, 0xDD, 0xEF, 0x95, 0x19, 0xB3, 0xCD, 0x3A, 0x43, 0x1B, 0x30, 0x2B, 0x0A, 0x6D,
        0xF2, 0x5F, 0x14, 0x37, 0x4F, 0xE1, 0x35, 0x6D, 0x6D, 0x51, 0xC2, 0x45, 0xE4, 0x85, 0xB5,
        0x76, 0x62, 0x5E, 0x7E, 0xC6, 0xF4, 0x4C, 0x42, 0xE9, 0xA6, 0x37, 0xED, 0x6B, 0x0B, 0xFF,
        0x5C, 0xB6, 0xF4, 0x06, 0xB7, 0xED, 0xEE, 0x38, 0x6B, 0xFB, 0x5A, 0x89, 0x9F, 0xA5, 0xAE,
        0x9F, 0x24, 0x11, 0x7C, 0x4B, 0x1F, 0xE6, 0x49, 0x28, 0x66, 0x51, 0xEC, 0xE6, 0x53, 0x81,
        0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    ])
});

/// The AES-128 key shared with the Secret Service.
pub type AesKey = [u8; 16];

/// A Diffie-Hellman keypair generated for one session.
pub struct Keypair {
    private: BigUint,
    public: BigUint,
}

impl Keypair {
    pub fn generate() -> Self {
        let mut bytes = [0; GROUP_SIZE];
        OsRng.fill(&mut bytes);

        let private = BigUint::from_bytes_be(&bytes);
        let public = GENERATOR.modpow(&private, &PRIME);

        Self { private, public }
    }

    /// Returns the big-endian public key, as sent to the other end.
    pub fn public_key(&self) -> Vec<u8> {
        self.public.to_bytes_be()
    }

    /// Derives the AES key from the big-endian public key of the
    /// other end.
    pub fn derive_aes_key(&self, pubkey: &[u8]) -> Result<AesKey, InvalidLength> {
        let pubkey = BigUint::from_bytes_be(pubkey);
        let common = pubkey.modpow(&self.private, &PRIME).to_bytes_be();

        let mut ikm = vec![0; GROUP_SIZE.saturating_sub(common.len())];
        ikm.extend(common);

        let mut key = AesKey::default();
        Hkdf::<Sha256>::new(None, &ikm).expand(&[], &mut key)?;
        Ok(key)
    }
}

impl std::fmt::Debug for Keypair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Keypair").finish_non_exhaustive()
    }
}

/// Encrypts the given data with a fresh random IV.
///
/// Returns the IV, which the Secret Service expects as secret
/// parameters, and the encrypted data.
pub fn encrypt(data: &[u8], key: &AesKey) -> (Vec<u8>, Vec<u8>) {
    let mut iv = [0; 16];
    OsRng.fill(&mut iv);

    let encryptor =
        Encryptor::<aes::Aes128>::new(GenericArray::from_slice(key), GenericArray::from_slice(&iv));
    let cypher = encryptor.encrypt_padded_vec_mut::<Pkcs7>(data);

    (iv.to_vec(), cypher)
}
