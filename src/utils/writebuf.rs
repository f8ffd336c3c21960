use byteorder::{ByteOrder, LittleEndian};

/// Growable little-endian append buffer.
#[derive(Debug, Default, Clone)]
pub struct WriteBuf {
    buf: Vec<u8>,
}

impl WriteBuf {
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.buf
    }

    pub fn get_tail(&self) -> usize {
        self.buf.len()
    }

    pub fn rewind_tail_to(&mut self, anchor: usize) {
        self.buf.truncate(anchor);
    }

    pub fn le_u8(&mut self, data: u8) {
        self.buf.push(data);
    }

    pub fn le_u16(&mut self, data: u16) {
        self.le_uint(2, data as u64);
    }

    pub fn le_u32(&mut self, data: u32) {
        self.le_uint(4, data as u64);
    }

    pub fn le_u64(&mut self, data: u64) {
        self.le_uint(8, data);
    }

    /// Appends the low `size` bytes of `data`, `size` in 1..=8.
    pub fn le_uint(&mut self, size: usize, data: u64) {
        let mut scratch = [0_u8; 8];
        LittleEndian::write_u64(&mut scratch, data);
        self.buf.extend_from_slice(&scratch[..size]);
    }

    pub fn copy_from_slice(&mut self, src: &[u8]) {
        self.buf.extend_from_slice(src);
    }
}

#[cfg(test)]
mod tests {
    use super::WriteBuf;

    #[test]
    fn test_append_little_endian() {
        let mut buf = WriteBuf::new();
        buf.le_u8(1);
        buf.le_u16(0x6543);
        buf.le_u32(0xcafe_beef);
        buf.le_uint(3, 0x0a0b0c);
        assert_eq!(
            buf.as_slice(),
            [1, 0x43, 0x65, 0xef, 0xbe, 0xfe, 0xca, 0x0c, 0x0b, 0x0a]
        );
    }

    #[test]
    fn test_rewind() {
        let mut buf = WriteBuf::new();
        buf.le_u8(1);
        let anchor = buf.get_tail();
        buf.le_u64(u64::MAX);
        buf.rewind_tail_to(anchor);
        assert_eq!(buf.as_slice(), [1]);
    }
}
