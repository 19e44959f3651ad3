use super::*;

#[test]
fn q16_rounds_half_up_and_saturates() {
    assert_eq!(q16_to_u8(0), 0);
    assert_eq!(q16_to_u8(1 << 16), 1);
    assert_eq!(q16_to_u8((1 << 16) + 32768), 2);
    assert_eq!(q16_to_u8((1 << 16) + 32767), 1);
    assert_eq!(q16_to_u8(300u64 << 16), 255);
}

#[test]
fn luma_of_grays_is_identity() {
    for v in [0u8, 1, 17, 128, 254, 255] {
        assert_eq!(luma_u8(v, v, v), v);
    }
}

#[test]
fn luma_weights_green_heaviest() {
    assert!(luma_u8(0, 255, 0) > luma_u8(255, 0, 0));
    assert!(luma_u8(255, 0, 0) > luma_u8(0, 0, 255));
}
