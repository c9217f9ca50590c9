use sha2::{Digest, Sha256};
use ulid::Ulid;

pub fn run_id_ulid() -> String {
    format!("run_{}", Ulid::new())
}

pub fn call_id_ulid() -> String {
    format!("call_{}", Ulid::new())
}

pub fn case_id_ulid() -> String {
    format!("case_{}", Ulid::new())
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut h = Sha256::new();
    h.update(bytes);
    hex::encode(h.finalize())
}
