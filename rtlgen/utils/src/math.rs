use std::cmp;

fn bits_helper(n: u64, i: u64) -> u64 {
    if n == 0 {
        i
    } else {
        bits_helper(n / 2, i + 1)
    }
}

/// Number of bits needed to represent `n` distinct values.
pub fn bits_needed_for(n: u64) -> u64 {
    cmp::max(bits_helper(n.saturating_sub(1), 0), 1)
}

/// Render the low `width` bits of `value`, most-significant bit first.
/// Bits above 64 are zero.
pub fn binary_literal(value: u64, width: u64) -> String {
    (0..width)
        .rev()
        .map(|bit| {
            if bit < 64 && (value >> bit) & 1 == 1 {
                '1'
            } else {
                '0'
            }
        })
        .collect()
}

/// A one-hot pattern of `width` bits with bit `position` set, MSB first.
pub fn one_hot_literal(position: u64, width: u64) -> String {
    (0..width)
        .rev()
        .map(|bit| if bit == position { '1' } else { '0' })
        .collect()
}
