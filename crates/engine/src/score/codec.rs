//! Leaderboard score packing.
//!
//! The bit layout is shared with scores that were already submitted to the
//! ranking service, so it must never change: elapsed seconds in bits 16..32,
//! kill count in bits 0..16, sign bit unused.

pub const FIELD_MAX: i64 = 0xFFFF;
const TIME_SHIFT: u32 = 16;

pub fn encode(time_seconds: i64, kills: i64) -> i64 {
    (clamp_field(time_seconds) << TIME_SHIFT) | clamp_field(kills)
}

pub fn decode_time(encoded: i64) -> i64 {
    clamp_field((encoded >> TIME_SHIFT) & FIELD_MAX)
}

pub fn decode_kills(encoded: i64) -> i64 {
    clamp_field(encoded & FIELD_MAX)
}

pub fn decode(encoded: i64) -> (i64, i64) {
    (decode_time(encoded), decode_kills(encoded))
}

fn clamp_field(value: i64) -> i64 {
    value.clamp(0, FIELD_MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_packs_time_above_kills() {
        assert_eq!(encode(125, 42), 8_192_042);
        assert_eq!(encode(125, 42), (125 << 16) | 42);
        assert_eq!(decode_time(8_192_042), 125);
        assert_eq!(decode_kills(8_192_042), 42);
    }

    #[test]
    fn encode_clamps_out_of_range_inputs() {
        assert_eq!(encode(100_000, -5), encode(65_535, 0));
        assert_eq!(encode(-1, 70_000), encode(0, 65_535));
    }

    #[test]
    fn decode_inverts_encode_across_field_edges() {
        for time in [0, 1, 255, 256, 32_767, 65_534, 65_535] {
            for kills in [0, 1, 4_096, 65_535] {
                assert_eq!(decode(encode(time, kills)), (time, kills));
            }
        }
    }

    #[test]
    fn decode_inverts_encode_across_full_range() {
        for time in (0..=FIELD_MAX).step_by(257) {
            for kills in (0..=FIELD_MAX).step_by(251) {
                let encoded = encode(time, kills);
                assert!(encoded >= 0);
                assert_eq!(decode(encoded), (time, kills), "encoded {encoded}");
            }
        }
    }

    #[test]
    fn decode_ignores_foreign_high_bits() {
        let foreign = (0x7F_i64 << 40) | encode(300, 7);
        assert_eq!(decode(foreign), (300, 7));

        let negative = -1_i64;
        assert_eq!(decode(negative), (FIELD_MAX, FIELD_MAX));
    }

    #[test]
    fn maximum_encoding_leaves_sign_bit_clear() {
        assert!(encode(i64::MAX, i64::MAX) > 0);
        assert_eq!(encode(i64::MAX, i64::MAX), 0xFFFF_FFFF);
    }
}
