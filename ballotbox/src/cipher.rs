use crate::{EncryptionKey, Error};

use aes_gcm::aead::{Aead, NewAead};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use rand::rngs::OsRng;
use rand::RngCore;

pub const KEY_LENGTH: usize = 32;
pub const NONCE_LENGTH: usize = 12;
pub const TAG_LENGTH: usize = 16;

/// AES-256-GCM output split into its three parts.
///
/// The tag is detached from the ciphertext so each part can be stored as its
/// own hex field on the ballot row.
#[derive(Debug, Clone)]
pub struct EncryptedBallot {
    pub ciphertext: Vec<u8>,
    pub nonce: Vec<u8>,
    pub tag: Vec<u8>,
}

/// Encrypt a ballot plaintext under the server key.
///
/// The 96-bit nonce is drawn fresh from the OS CSPRNG on every call. Nonce
/// reuse under the same key breaks GCM, so no counter or other shared state
/// is ever involved.
pub fn encrypt_ballot(key: &EncryptionKey, plaintext: &[u8]) -> EncryptedBallot {
    let cipher = Aes256Gcm::new(Key::from_slice(key.as_bytes()));

    let mut nonce = [0u8; NONCE_LENGTH];
    OsRng.fill_bytes(&mut nonce);

    let mut sealed = cipher
        .encrypt(Nonce::from_slice(&nonce), plaintext)
        .expect("ballotbox: AES-GCM encryption failure");
    let tag = sealed.split_off(sealed.len() - TAG_LENGTH);

    EncryptedBallot {
        ciphertext: sealed,
        nonce: nonce.to_vec(),
        tag,
    }
}

/// Decrypt a ballot, authenticating it in the process.
///
/// Fails closed: any altered byte of ciphertext, nonce or tag yields
/// `Error::AuthenticationFailure`, never partial plaintext.
pub fn decrypt_ballot(key: &EncryptionKey, ballot: &EncryptedBallot) -> Result<Vec<u8>, Error> {
    if ballot.nonce.len() != NONCE_LENGTH || ballot.tag.len() != TAG_LENGTH {
        return Err(Error::AuthenticationFailure);
    }

    let cipher = Aes256Gcm::new(Key::from_slice(key.as_bytes()));

    let mut sealed = Vec::with_capacity(ballot.ciphertext.len() + TAG_LENGTH);
    sealed.extend_from_slice(&ballot.ciphertext);
    sealed.extend_from_slice(&ballot.tag);

    cipher
        .decrypt(Nonce::from_slice(&ballot.nonce), sealed.as_slice())
        .map_err(|_| Error::AuthenticationFailure)
}
