pub fn u8s_from_str(input: &str) -> [u8; 32] {
    blake3::hash(input.as_bytes()).into()
}

/// XORs `value` (little endian) into the first eight bytes of `seed`.
pub fn mix_seed(seed: &[u8; 32], value: u64) -> [u8; 32] {
    let mut output = *seed;
    for (byte, mask) in output.iter_mut().zip(value.to_le_bytes()) {
        *byte ^= mask;
    }
    output
}

pub fn rehash_seed(seed: &[u8; 32], salt: u32) -> [u8; 32] {
    let mut hasher = blake3::Hasher::new();
    hasher.update(seed);
    hasher.update(&salt.to_le_bytes());
    hasher.finalize().into()
}
