#![allow(dead_code)]

use chip_tlv::tlv::TagType;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub const FABRIC_ID: u64 = 0x7885_a14c_693b_f1cb;

pub fn fixture_tag() -> TagType {
    TagType::FullQual {
        vendor_id: 0,
        profile: 5,
        tag: 1,
    }
}

pub fn epoch_key(seed: u8, len: usize) -> Vec<u8> {
    (0..len).map(|i| seed.wrapping_add(i as u8)).collect()
}

// Structure 0000:0005:1 {
//   1: u64 FABRIC_ID,
//   2: [ { 0: u64 0xfff1, 1: u64 0x8000, 2: 16 octets, 3: 20 octets, 4: u8 0, 5: u8 0 } ]
// }
pub fn fixture_bytes() -> Vec<u8> {
    let mut b = vec![
        0xd5, 0x00, 0x00, 0x05, 0x00, 0x01, 0x00, // Structure, fully qualified tag
        0x27, 0x01, 0xcb, 0xf1, 0x3b, 0x69, 0x4c, 0xa1, 0x85, 0x78, // 1: u64
        0x36, 0x02, // 2: Array
        0x15, // Anonymous structure
        0x27, 0x00, 0xf1, 0xff, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // 0: u64
        0x27, 0x01, 0x00, 0x80, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // 1: u64
        0x30, 0x02, 0x10, // 2: octets, len 16
    ];
    b.extend(epoch_key(0xa0, 16));
    b.extend([0x30, 0x03, 0x14]); // 3: octets, len 20
    b.extend(epoch_key(0x10, 20));
    b.extend([
        0x24, 0x04, 0x00, // 4: u8
        0x24, 0x05, 0x00, // 5: u8
        0x18, 0x18, 0x18,
    ]);
    b
}
