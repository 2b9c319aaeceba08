use crate::error::SerdeErr;

/// Reads bits out of a byte buffer in the order `BitWriter` wrote them
pub struct BitReader<'b> {
    buffer: &'b [u8],
    byte_index: usize,
    bit_index: u8,
}

impl<'b> BitReader<'b> {
    pub fn new(buffer: &'b [u8]) -> Self {
        Self {
            buffer,
            byte_index: 0,
            bit_index: 0,
        }
    }

    pub fn read_bit(&mut self) -> Result<bool, SerdeErr> {
        let Some(byte) = self.buffer.get(self.byte_index) else {
            return Err(SerdeErr::UnexpectedEnd {
                bits_needed: 1,
                bits_remaining: 0,
            });
        };

        let bit = (byte >> self.bit_index) & 1 != 0;

        self.bit_index += 1;
        if self.bit_index >= 8 {
            self.bit_index = 0;
            self.byte_index += 1;
        }

        Ok(bit)
    }

    pub fn read_byte(&mut self) -> Result<u8, SerdeErr> {
        Ok(self.read_bits(8)? as u8)
    }

    /// Reads `count` bits written by `BitWrite::write_bits`
    pub fn read_bits(&mut self, count: u8) -> Result<u32, SerdeErr> {
        debug_assert!(count <= 32, "can't read more than 32 bits at once");
        if (count as usize) > self.bits_remaining() {
            return Err(SerdeErr::UnexpectedEnd {
                bits_needed: count as usize,
                bits_remaining: self.bits_remaining(),
            });
        }

        let mut output: u32 = 0;
        for index in 0..count {
            if self.read_bit()? {
                output |= 1 << index;
            }
        }
        Ok(output)
    }

    pub fn read_bytes(&mut self, count: usize) -> Result<Vec<u8>, SerdeErr> {
        let bits_remaining = self.bits_remaining();
        match count.checked_mul(8) {
            Some(bits_needed) if bits_needed <= bits_remaining => {}
            bits_needed => {
                return Err(SerdeErr::UnexpectedEnd {
                    bits_needed: bits_needed.unwrap_or(usize::MAX),
                    bits_remaining,
                });
            }
        }

        let mut output = Vec::with_capacity(count);
        for _ in 0..count {
            output.push(self.read_byte()?);
        }
        Ok(output)
    }

    pub fn bits_remaining(&self) -> usize {
        (self.buffer.len() - self.byte_index.min(self.buffer.len())) * 8
            - self.bit_index as usize
    }
}
