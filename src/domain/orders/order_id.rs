use jiff::Timestamp;
use rand_core::{OsRng, RngCore};

const BASE36: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const RANDOM_SUFFIX_LEN: usize = 6;

fn to_base36(mut value: u64) -> String {
    if value == 0 {
        return "0".to_owned();
    }
    let mut digits = Vec::new();
    while value > 0 {
        digits.push(BASE36[(value % 36) as usize]);
        value /= 36;
    }
    digits.reverse();
    String::from_utf8_lossy(&digits).into_owned()
}

/// Human readable order reference, e.g. `ORD-M5Z2K1QX-7GQ2ZB`.
///
/// Collisions are unlikely but not checked.
pub fn generate_order_id() -> String {
    let millis = u64::try_from(Timestamp::now().as_millisecond()).unwrap_or_default();
    let mut rng = OsRng;
    let suffix: String = (0..RANDOM_SUFFIX_LEN)
        .map(|_| char::from(BASE36[(rng.next_u32() % 36) as usize]))
        .collect();
    format!("ORD-{}-{suffix}", to_base36(millis))
}
