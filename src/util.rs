// partition hash: 32-bit FNV-1a masked into the non-negative i32 range

const FNV32_OFFSET: u32 = 0x811c_9dc5;
const FNV32_PRIME: u32 = 0x0100_0193;

pub(crate) fn ihash(key: &str) -> u32 {
    let mut h = FNV32_OFFSET;
    for b in key.bytes() {
        h ^= b as u32;
        h = h.wrapping_mul(FNV32_PRIME);
    }
    h & 0x7fff_ffff
}

#[cfg(test)]
mod tests {
    use super::ihash;

    #[test]
    fn ihash_matches_fnv1a_32() {
        assert_eq!(ihash(""), 0x811c_9dc5 & 0x7fff_ffff);
        assert_eq!(ihash("a"), 0xe40c_292c & 0x7fff_ffff);
        assert_eq!(ihash("hello"), 0x4f9f_2cab);
        assert_eq!(ihash("a") % 10, 2);
        assert_eq!(ihash("hello") % 10, 3);
    }

    #[test]
    fn ihash_is_stable_and_non_negative() {
        assert_eq!(ihash("hello"), ihash("hello"));
        for key in ["", "a", "b", "the quick brown fox", "ünïcödé"] {
            assert!(ihash(key) <= i32::MAX as u32);
        }
    }
}
