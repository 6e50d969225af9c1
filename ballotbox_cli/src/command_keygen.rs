use ballotbox::KEY_LENGTH;
use rand::rngs::OsRng;
use rand::RngCore;

/// Print a fresh key suitable for `BALLOTBOX_ENCRYPTION_KEY`.
pub fn run() {
    let mut key = [0u8; KEY_LENGTH];
    OsRng.fill_bytes(&mut key);
    println!("{}", hex::encode(&key[..]));
}
