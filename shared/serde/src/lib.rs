//! # Netcoll Serde
//! Bit-level serialization for replicated collections: a growable bit writer,
//! a bit reader, packed integers and the `Serde` trait element types implement.

#![deny(unstable_features, unused_import_braces)]

mod bit_reader;
mod bit_writer;
mod error;
mod impls;
mod packed;
mod serde;

pub use bit_reader::BitReader;
pub use bit_writer::{BitCounter, BitWrite, BitWriter};
pub use error::SerdeErr;
pub use packed::{
    read_i32_packed, read_i64_packed, read_u16_packed, read_u32_packed, read_u64_packed,
    write_i32_packed, write_i64_packed, write_u16_packed, write_u32_packed, write_u64_packed,
    zig_zag_decode, zig_zag_encode,
};
pub use serde::{ConstBitLength, Serde};
