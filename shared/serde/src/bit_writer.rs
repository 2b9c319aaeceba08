pub trait BitWrite {
    fn write_bit(&mut self, bit: bool);
    fn write_byte(&mut self, byte: u8);

    /// Writes the lowest `count` bits of `value`, least significant bit first.
    /// Used for sub-byte fields such as event tags.
    fn write_bits(&mut self, value: u32, count: u8) {
        debug_assert!(count <= 32, "can't write more than 32 bits at once");
        let mut temp = value;
        for _ in 0..count {
            self.write_bit(temp & 1 != 0);
            temp >>= 1;
        }
    }

    fn write_bytes(&mut self, bytes: &[u8]) {
        for byte in bytes {
            self.write_byte(*byte);
        }
    }
}

/// Growable output buffer for replication messages.
///
/// Bit `n` of the stream lands in bit `n % 8` of byte `n / 8`, which is the
/// order `BitReader` consumes them in.
pub struct BitWriter {
    /// Byte under construction, filled from bit 0 upwards
    scratch: u8,
    /// Number of bits already placed in `scratch`
    scratch_index: u8,
    buffer: Vec<u8>,
    bits_written: u32,
}

impl BitWriter {
    pub fn new() -> Self {
        Self::with_capacity(64)
    }

    pub fn with_capacity(bytes: usize) -> Self {
        Self {
            scratch: 0,
            scratch_index: 0,
            buffer: Vec::with_capacity(bytes),
            bits_written: 0,
        }
    }

    fn push_scratch(&mut self) {
        self.buffer.push(self.scratch);
        self.scratch = 0;
        self.scratch_index = 0;
    }

    /// Finishes the message. Unused high bits of the last byte are zero.
    pub fn to_bytes(mut self) -> Vec<u8> {
        if self.scratch_index > 0 {
            self.push_scratch();
        }
        self.buffer
    }

    pub fn bits_written(&self) -> u32 {
        self.bits_written
    }

    pub fn bytes_written(&self) -> usize {
        (self.bits_written as usize).div_ceil(8)
    }
}

impl Default for BitWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl BitWrite for BitWriter {
    fn write_bit(&mut self, bit: bool) {
        self.scratch |= u8::from(bit) << self.scratch_index;
        self.scratch_index += 1;
        self.bits_written += 1;

        if self.scratch_index == 8 {
            self.push_scratch();
        }
    }

    fn write_byte(&mut self, byte: u8) {
        if self.scratch_index == 0 {
            // aligned, so the byte goes out unchanged
            self.buffer.push(byte);
            self.bits_written += 8;
            return;
        }
        // low bits finish the current byte, high bits start the next one
        let shift = self.scratch_index;
        self.scratch |= byte << shift;
        self.push_scratch();
        self.scratch = byte >> (8 - shift);
        self.scratch_index = shift;
        self.bits_written += 8;
    }
}

/// Counts bits instead of storing them
pub struct BitCounter {
    bits: u32,
}

impl BitCounter {
    pub fn new() -> Self {
        Self { bits: 0 }
    }

    pub fn bits_needed(&self) -> u32 {
        self.bits
    }
}

impl Default for BitCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl BitWrite for BitCounter {
    fn write_bit(&mut self, _bit: bool) {
        self.bits += 1;
    }

    fn write_byte(&mut self, _byte: u8) {
        self.bits += 8;
    }

    fn write_bits(&mut self, _value: u32, count: u8) {
        self.bits += count as u32;
    }
}
