//! Variable-length ("packed") integers.
//!
//! Small values cost a single byte:
//!
//! | value range        | encoding                                   |
//! |--------------------|--------------------------------------------|
//! | `0..=240`          | the value itself                           |
//! | `241..=2287`       | `241 + ((v - 240) >> 8)`, `(v - 240) & 0xFF`|
//! | `2288..=67823`     | `249`, then `v - 2288` as two bytes, high first |
//! | larger             | `247 + n`, then `n` little-endian bytes    |
//!
//! Signed values are zig-zag encoded first so that small negative numbers
//! stay small.

use crate::{bit_reader::BitReader, bit_writer::BitWrite, error::SerdeErr};

pub fn write_u64_packed(writer: &mut dyn BitWrite, value: u64) {
    if value <= 240 {
        writer.write_byte(value as u8);
    } else if value <= 2287 {
        let offset = value - 240;
        writer.write_byte(((offset >> 8) + 241) as u8);
        writer.write_byte(offset as u8);
    } else if value <= 67823 {
        let offset = value - 2288;
        writer.write_byte(249);
        writer.write_byte((offset >> 8) as u8);
        writer.write_byte(offset as u8);
    } else {
        let mut header: u8 = 255;
        let mut limit: u64 = 0x00FF_FFFF_FFFF_FFFF;
        while value <= limit {
            header -= 1;
            limit >>= 8;
        }

        writer.write_byte(header);
        let byte_count = header - 247;
        for index in 0..byte_count {
            writer.write_byte((value >> (index * 8)) as u8);
        }
    }
}

pub fn read_u64_packed(reader: &mut BitReader) -> Result<u64, SerdeErr> {
    let header = reader.read_byte()?;
    match header {
        0..=240 => Ok(header as u64),
        241..=248 => {
            let low = reader.read_byte()? as u64;
            Ok(240 + (((header - 241) as u64) << 8) + low)
        }
        249 => {
            let high = reader.read_byte()? as u64;
            let low = reader.read_byte()? as u64;
            Ok(2288 + (high << 8) + low)
        }
        250..=255 => {
            let byte_count = header - 247;
            let mut output: u64 = 0;
            for index in 0..byte_count {
                output |= (reader.read_byte()? as u64) << (index * 8);
            }
            Ok(output)
        }
    }
}

pub fn zig_zag_encode(value: i64) -> u64 {
    ((value << 1) ^ (value >> 63)) as u64
}

pub fn zig_zag_decode(value: u64) -> i64 {
    ((value >> 1) as i64) ^ -((value & 1) as i64)
}

pub fn write_i64_packed(writer: &mut dyn BitWrite, value: i64) {
    write_u64_packed(writer, zig_zag_encode(value));
}

pub fn read_i64_packed(reader: &mut BitReader) -> Result<i64, SerdeErr> {
    Ok(zig_zag_decode(read_u64_packed(reader)?))
}

pub fn write_u16_packed(writer: &mut dyn BitWrite, value: u16) {
    write_u64_packed(writer, value as u64);
}

pub fn read_u16_packed(reader: &mut BitReader) -> Result<u16, SerdeErr> {
    let value = read_u64_packed(reader)?;
    u16::try_from(value).map_err(|_| SerdeErr::InvalidValue {
        type_name: "u16",
        value,
    })
}

pub fn write_u32_packed(writer: &mut dyn BitWrite, value: u32) {
    write_u64_packed(writer, value as u64);
}

pub fn read_u32_packed(reader: &mut BitReader) -> Result<u32, SerdeErr> {
    let value = read_u64_packed(reader)?;
    u32::try_from(value).map_err(|_| SerdeErr::InvalidValue {
        type_name: "u32",
        value,
    })
}

pub fn write_i32_packed(writer: &mut dyn BitWrite, value: i32) {
    write_i64_packed(writer, value as i64);
}

pub fn read_i32_packed(reader: &mut BitReader) -> Result<i32, SerdeErr> {
    let raw = read_u64_packed(reader)?;
    i32::try_from(zig_zag_decode(raw)).map_err(|_| SerdeErr::InvalidValue {
        type_name: "i32",
        value: raw,
    })
}
