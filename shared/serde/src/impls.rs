use crate::{
    bit_reader::BitReader,
    bit_writer::BitWrite,
    error::SerdeErr,
    packed::{read_i64_packed, read_u64_packed, write_i64_packed, write_u64_packed},
    serde::{ConstBitLength, Serde},
};

// Unit

impl Serde for () {
    fn ser(&self, _: &mut dyn BitWrite) {}

    fn de(_: &mut BitReader) -> Result<Self, SerdeErr> {
        Ok(())
    }
}

impl ConstBitLength for () {
    fn const_bit_length() -> u32 {
        0
    }
}

// Boolean

impl Serde for bool {
    fn ser(&self, writer: &mut dyn BitWrite) {
        writer.write_bit(*self);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        reader.read_bit()
    }

    fn bit_length(&self) -> u32 {
        1
    }
}

impl ConstBitLength for bool {
    fn const_bit_length() -> u32 {
        1
    }
}

// Bytes

impl Serde for u8 {
    fn ser(&self, writer: &mut dyn BitWrite) {
        writer.write_byte(*self);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        reader.read_byte()
    }

    fn bit_length(&self) -> u32 {
        8
    }
}

impl Serde for i8 {
    fn ser(&self, writer: &mut dyn BitWrite) {
        writer.write_byte(*self as u8);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        Ok(reader.read_byte()? as i8)
    }

    fn bit_length(&self) -> u32 {
        8
    }
}

impl ConstBitLength for u8 {
    fn const_bit_length() -> u32 {
        8
    }
}

impl ConstBitLength for i8 {
    fn const_bit_length() -> u32 {
        8
    }
}

// Wider integers are always packed

macro_rules! impl_serde_unsigned_packed {
    ($($ty:ty),*) => {$(
        impl Serde for $ty {
            fn ser(&self, writer: &mut dyn BitWrite) {
                write_u64_packed(writer, *self as u64);
            }

            fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
                let value = read_u64_packed(reader)?;
                <$ty>::try_from(value).map_err(|_| SerdeErr::InvalidValue {
                    type_name: stringify!($ty),
                    value,
                })
            }
        }
    )*};
}

macro_rules! impl_serde_signed_packed {
    ($($ty:ty),*) => {$(
        impl Serde for $ty {
            fn ser(&self, writer: &mut dyn BitWrite) {
                write_i64_packed(writer, *self as i64);
            }

            fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
                let value = read_i64_packed(reader)?;
                <$ty>::try_from(value).map_err(|_| SerdeErr::InvalidValue {
                    type_name: stringify!($ty),
                    value: value as u64,
                })
            }
        }
    )*};
}

impl_serde_unsigned_packed!(u16, u32, u64, usize);
impl_serde_signed_packed!(i16, i32, i64, isize);

// Floats travel as their raw bit patterns

impl Serde for f32 {
    fn ser(&self, writer: &mut dyn BitWrite) {
        writer.write_bytes(&self.to_le_bytes());
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        let mut bytes = [0u8; 4];
        for byte in bytes.iter_mut() {
            *byte = reader.read_byte()?;
        }
        Ok(f32::from_le_bytes(bytes))
    }

    fn bit_length(&self) -> u32 {
        32
    }
}

impl Serde for f64 {
    fn ser(&self, writer: &mut dyn BitWrite) {
        writer.write_bytes(&self.to_le_bytes());
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        let mut bytes = [0u8; 8];
        for byte in bytes.iter_mut() {
            *byte = reader.read_byte()?;
        }
        Ok(f64::from_le_bytes(bytes))
    }

    fn bit_length(&self) -> u32 {
        64
    }
}

impl ConstBitLength for f32 {
    fn const_bit_length() -> u32 {
        32
    }
}

impl ConstBitLength for f64 {
    fn const_bit_length() -> u32 {
        64
    }
}

// Text

impl Serde for char {
    fn ser(&self, writer: &mut dyn BitWrite) {
        write_u64_packed(writer, *self as u64);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        let value = read_u64_packed(reader)?;
        u32::try_from(value)
            .ok()
            .and_then(char::from_u32)
            .ok_or(SerdeErr::InvalidValue {
                type_name: "char",
                value,
            })
    }
}

impl Serde for String {
    fn ser(&self, writer: &mut dyn BitWrite) {
        write_u64_packed(writer, self.len() as u64);
        writer.write_bytes(self.as_bytes());
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        let length = read_u64_packed(reader)?;
        let bytes_remaining = (reader.bits_remaining() / 8) as u64;
        if length > bytes_remaining {
            return Err(SerdeErr::UnexpectedEnd {
                bits_needed: usize::try_from(length.saturating_mul(8)).unwrap_or(usize::MAX),
                bits_remaining: reader.bits_remaining(),
            });
        }
        let bytes = reader.read_bytes(length as usize)?;
        String::from_utf8(bytes).map_err(|_| SerdeErr::InvalidUtf8)
    }
}

// Containers

impl<T: Serde> Serde for Option<T> {
    fn ser(&self, writer: &mut dyn BitWrite) {
        match self {
            Some(value) => {
                writer.write_bit(true);
                value.ser(writer);
            }
            None => writer.write_bit(false),
        }
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        if reader.read_bit()? {
            Ok(Some(T::de(reader)?))
        } else {
            Ok(None)
        }
    }
}

impl<T: Serde> Serde for Box<T> {
    fn ser(&self, writer: &mut dyn BitWrite) {
        self.as_ref().ser(writer);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        Ok(Box::new(T::de(reader)?))
    }
}

impl<T: Serde> Serde for Vec<T> {
    fn ser(&self, writer: &mut dyn BitWrite) {
        write_u64_packed(writer, self.len() as u64);
        for item in self {
            item.ser(writer);
        }
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        let length = read_u64_packed(reader)? as usize;
        // a corrupt length must not turn into a huge up-front allocation
        let mut output = Vec::with_capacity(length.min(reader.bits_remaining()));
        for _ in 0..length {
            output.push(T::de(reader)?);
        }
        Ok(output)
    }
}

impl<A: Serde, B: Serde> Serde for (A, B) {
    fn ser(&self, writer: &mut dyn BitWrite) {
        self.0.ser(writer);
        self.1.ser(writer);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        Ok((A::de(reader)?, B::de(reader)?))
    }
}

impl<A: Serde, B: Serde, C: Serde> Serde for (A, B, C) {
    fn ser(&self, writer: &mut dyn BitWrite) {
        self.0.ser(writer);
        self.1.ser(writer);
        self.2.ser(writer);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        Ok((A::de(reader)?, B::de(reader)?, C::de(reader)?))
    }
}
