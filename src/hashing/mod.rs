use blake3::Hasher;

/// Computes a 64-bit hash of the input data using BLAKE3, truncated from 256 bits.
///
/// Used for feature hashing in the lexical encoder, where a collision only merges
/// two vocabulary buckets. Use [`corpus_fingerprint`] where collisions matter.
#[inline]
pub fn hash_to_u64(data: &[u8]) -> u64 {
    let hash = blake3::hash(data);
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&hash.as_bytes()[0..8]);
    u64::from_le_bytes(bytes)
}

/// Full BLAKE3 fingerprint of an ordered job-id sequence.
///
/// The vector index stores this next to its rows. Two corpora hash equal only if
/// they hold the same ids in the same order, so any append, reorder or removal
/// that happened without a rebuild is detected on load.
pub fn corpus_fingerprint<'a, I>(job_ids: I) -> [u8; 32]
where
    I: IntoIterator<Item = &'a str>,
{
    let mut hasher = Hasher::new();
    let mut count: u64 = 0;
    for id in job_ids {
        hasher.update(&(id.len() as u64).to_le_bytes());
        hasher.update(id.as_bytes());
        count += 1;
    }
    hasher.update(&count.to_le_bytes());
    *hasher.finalize().as_bytes()
}

/// Short hex prefix of a fingerprint, for log lines.
pub fn fingerprint_hex(fingerprint: &[u8; 32]) -> String {
    fingerprint[..6].iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_to_u64_determinism() {
        let a = hash_to_u64(b"python");
        let b = hash_to_u64(b"python");
        assert_eq!(a, b);
        assert_ne!(a, hash_to_u64(b"pythons"));
    }

    #[test]
    fn test_fingerprint_order_sensitive() {
        let ab = corpus_fingerprint(["a", "b"]);
        let ba = corpus_fingerprint(["b", "a"]);
        assert_ne!(ab, ba);
    }

    #[test]
    fn test_fingerprint_detects_append() {
        let before = corpus_fingerprint(["job-1", "job-2"]);
        let after = corpus_fingerprint(["job-1", "job-2", "job-3"]);
        assert_ne!(before, after);
    }

    #[test]
    fn test_fingerprint_length_prefix_prevents_concat_collision() {
        let split = corpus_fingerprint(["ab", "c"]);
        let joined = corpus_fingerprint(["a", "bc"]);
        assert_ne!(split, joined);
    }

    #[test]
    fn test_fingerprint_empty_is_stable() {
        let empty: [&str; 0] = [];
        assert_eq!(corpus_fingerprint(empty), corpus_fingerprint(Vec::<&str>::new()));
    }

    #[test]
    fn test_fingerprint_hex_prefix() {
        let hex = fingerprint_hex(&[0xab; 32]);
        assert_eq!(hex, "abababababab");
    }
}
