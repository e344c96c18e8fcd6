/// Widest value a signal can carry
pub const MAX_BITS: u8 = 64;

/// Mask covering the lowest `bits` bits
pub fn mask(bits: u8) -> u64 {
    if bits >= MAX_BITS {
        u64::MAX
    } else {
        (1u64 << bits) - 1
    }
}

/// Mask of the sign bit of a `bits` wide value
pub fn signed_flag(bits: u8) -> u64 {
    match bits {
        0 => 0,
        b if b >= MAX_BITS => 1u64 << (MAX_BITS - 1),
        b => 1u64 << (b - 1),
    }
}

/// Interpret the lowest `bits` bits of `value` as two's complement
pub fn sign_extend(value: u64, bits: u8) -> i64 {
    if bits >= MAX_BITS || value & signed_flag(bits) == 0 {
        value as i64
    } else {
        (value | !mask(bits)) as i64
    }
}

/// Number of bits needed to address `count` entries
pub fn address_bits(count: usize) -> u8 {
    let mut bits = 0u8;
    while (1usize << bits) < count {
        bits += 1;
    }
    bits
}

/// Render a partially floating value, most significant bit first
pub fn z_mask_string(value: u64, high_z: u64, bits: u8) -> String {
    (0..bits)
        .rev()
        .map(|bit| {
            let m = 1u64 << bit;
            if high_z & m != 0 {
                'z'
            } else if value & m != 0 {
                '1'
            } else {
                '0'
            }
        })
        .collect()
}
