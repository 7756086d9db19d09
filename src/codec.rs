//! Binary serialization for [`crate::trie::ImmutableTrie`]: a 16-byte
//! header, the 16-bit index array, then the data array at its native
//! width, per the layout fixed by the format.
//!
//! Byte order is read from the signature itself: a reader that decodes
//! the four signature bytes as `0x33697254` (the byte-swap of `"Tri3"`)
//! knows every remaining multi-byte field is the opposite endianness from
//! what it assumed.

use crate::constants::*;
use crate::error::{Result, TrieError};
use crate::trie::{Fast, ImmutableTrie, Small, TrieKind};
use crate::value::{ValueArray, Width};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    Big,
    Little,
}

fn invalid(reason: impl Into<String>) -> TrieError {
    TrieError::InvalidBinary {
        reason: reason.into(),
    }
}

struct Writer {
    out: Vec<u8>,
    order: ByteOrder,
}

impl Writer {
    fn with_capacity(order: ByteOrder, capacity: usize) -> Self {
        Writer {
            out: Vec::with_capacity(capacity),
            order,
        }
    }

    fn put_u8(&mut self, v: u8) {
        self.out.push(v);
    }

    fn put_u16(&mut self, v: u16) {
        match self.order {
            ByteOrder::Big => self.out.extend_from_slice(&v.to_be_bytes()),
            ByteOrder::Little => self.out.extend_from_slice(&v.to_le_bytes()),
        }
    }

    fn put_u32(&mut self, v: u32) {
        match self.order {
            ByteOrder::Big => self.out.extend_from_slice(&v.to_be_bytes()),
            ByteOrder::Little => self.out.extend_from_slice(&v.to_le_bytes()),
        }
    }
}

/// Encodes `trie` as a self-describing byte buffer.
pub fn encode<K: TrieKind>(trie: &ImmutableTrie<K>, order: ByteOrder) -> Vec<u8> {
    let index_length = trie.index.len() as u32;
    let data_length = trie.data.len() as u32;
    let width_tag: u8 = trie.data.width().into();

    let mut options: u16 = width_tag as u16 & 0x7;
    options |= ((K::TAG as u16) & 0x3) << 6;
    options |= ((data_length >> 16) as u16 & 0xf) << 12;
    options |= ((trie.data_null_offset >> 16) as u16 & 0xf) << 8;

    let mut out = Writer::with_capacity(order, 16 + index_length as usize * 2 + data_length as usize * 4);
    out.put_u32(SIGNATURE);
    out.put_u16(options);
    out.put_u16(index_length as u16);
    out.put_u16(data_length as u16);
    out.put_u16(trie.index3_null_offset as u16);
    out.put_u16(trie.data_null_offset as u16);
    out.put_u16((trie.high_start >> 9) as u16);

    for &word in &trie.index {
        out.put_u16(word);
    }
    for i in 0..trie.data.len() {
        let v = trie.data.get(i);
        match trie.data.width() {
            Width::W8 => out.put_u8(v as u8),
            Width::W16 => out.put_u16(v as u16),
            Width::W32 => out.put_u32(v),
        }
    }
    while out.out.len() % 4 != 0 {
        out.put_u8(0);
    }
    out.out
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
    order: ByteOrder,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8], order: ByteOrder) -> Self {
        Reader { bytes, pos: 0, order }
    }

    fn u16(&mut self) -> Result<u16> {
        let b = self
            .bytes
            .get(self.pos..self.pos + 2)
            .ok_or_else(|| invalid("unexpected end of input reading a 16-bit field"))?;
        self.pos += 2;
        Ok(match self.order {
            ByteOrder::Big => u16::from_be_bytes([b[0], b[1]]),
            ByteOrder::Little => u16::from_le_bytes([b[0], b[1]]),
        })
    }

    fn u32(&mut self) -> Result<u32> {
        let b = self
            .bytes
            .get(self.pos..self.pos + 4)
            .ok_or_else(|| invalid("unexpected end of input reading a 32-bit field"))?;
        self.pos += 4;
        Ok(match self.order {
            ByteOrder::Big => u32::from_be_bytes([b[0], b[1], b[2], b[3]]),
            ByteOrder::Little => u32::from_le_bytes([b[0], b[1], b[2], b[3]]),
        })
    }

    fn u8(&mut self) -> Result<u8> {
        let b = *self
            .bytes
            .get(self.pos)
            .ok_or_else(|| invalid("unexpected end of input reading a byte"))?;
        self.pos += 1;
        Ok(b)
    }
}

/// Decodes a trie previously written by [`encode`]. `expected_width`, when
/// given, must match the header's own width field or decoding fails;
/// omitting it does not relax how the header itself is parsed, only
/// whether the caller's own expectation is additionally checked.
pub fn decode<K: TrieKind>(bytes: &[u8], expected_width: Option<Width>) -> Result<ImmutableTrie<K>> {
    let order = detect_order(bytes)?;
    let mut r = Reader::new(bytes, order);
    let _signature = r.u32()?;
    let options = r.u16()?;
    let index_length_low = r.u16()? as u32;
    let data_length_low = r.u16()? as u32;
    let index3_null_offset = r.u16()? as u32;
    let data_null_offset_low = r.u16()? as u32;
    let shifted_high_start = r.u16()? as u32;

    let reserved = (options >> 3) & 0x7;
    if reserved != 0 {
        return Err(invalid("reserved options bits are set"));
    }

    let width_tag = (options & 0x7) as u8;
    let width = Width::try_from(width_tag).map_err(|_| invalid("unrecognized value width tag"))?;
    if let Some(expected) = expected_width {
        if expected != width {
            return Err(invalid("decoded width does not match the caller's expectation"));
        }
    }

    let kind_tag = ((options >> 6) & 0x3) as u8;
    if kind_tag != K::TAG {
        return Err(invalid("decoded trie kind does not match the requested kind"));
    }

    let index_length = index_length_low;
    let data_length = data_length_low | (((options >> 12) as u32 & 0xf) << 16);
    let data_null_offset = data_null_offset_low | (((options >> 8) as u32 & 0xf) << 16);
    let high_start = shifted_high_start << 9;

    let mut index = Vec::with_capacity(index_length as usize);
    for _ in 0..index_length {
        index.push(r.u16()?);
    }

    let mut data = Vec::with_capacity(data_length as usize);
    for _ in 0..data_length {
        let v = match width {
            Width::W8 => r.u8()? as u32,
            Width::W16 => r.u16()? as u32,
            Width::W32 => r.u32()?,
        };
        data.push(v);
    }
    if data.len() < 2 {
        return Err(invalid("data array too short to hold highValue/errorValue"));
    }
    let values = ValueArray::from_u32_slice(width, &data);
    let high_value = values.get(values.len() - HIGH_VALUE_NEG_OFFSET as usize);
    let error_value = values.get(values.len() - ERROR_VALUE_NEG_OFFSET as usize);
    let _ = high_value;

    let index1_start = fast_index_len::<K>();
    let null_value = if data_null_offset != NO_DATA_NULL_OFFSET {
        values.get(data_null_offset as usize)
    } else {
        error_value
    };

    Ok(ImmutableTrie::from_parts(
        index,
        values,
        high_start,
        index3_null_offset,
        data_null_offset,
        null_value,
        error_value,
        index1_start,
    ))
}

fn fast_index_len<K: TrieKind>() -> usize {
    (K::FAST_LIMIT >> FAST_SHIFT) as usize
}

/// Either trie shape, as produced by [`decode_any`] once the shape has been
/// read from the header rather than asserted by the caller.
#[derive(Debug, Clone)]
pub enum AnyKindTrie {
    Fast(ImmutableTrie<Fast>),
    Small(ImmutableTrie<Small>),
}

impl AnyKindTrie {
    pub fn kind_tag(&self) -> u8 {
        match self {
            AnyKindTrie::Fast(_) => Fast::TAG,
            AnyKindTrie::Small(_) => Small::TAG,
        }
    }
}

fn peek_kind_tag(bytes: &[u8]) -> Result<u8> {
    let order = detect_order(bytes)?;
    let mut r = Reader::new(bytes, order);
    let _signature = r.u32()?;
    let options = r.u16()?;
    Ok(((options >> 6) & 0x3) as u8)
}

/// Decodes a trie previously written by [`encode`] without the caller
/// needing to already know its shape: the kind tag is read from the header
/// and used to pick which concrete `ImmutableTrie` to build. `expected_width`
/// is still enforced when given, exactly as in [`decode`].
pub fn decode_any(bytes: &[u8], expected_width: Option<Width>) -> Result<AnyKindTrie> {
    match peek_kind_tag(bytes)? {
        tag if tag == Fast::TAG => Ok(AnyKindTrie::Fast(decode::<Fast>(bytes, expected_width)?)),
        tag if tag == Small::TAG => Ok(AnyKindTrie::Small(decode::<Small>(bytes, expected_width)?)),
        other => Err(invalid(format!("unrecognized trie kind tag {other}"))),
    }
}

fn detect_order(bytes: &[u8]) -> Result<ByteOrder> {
    let raw = bytes
        .get(0..4)
        .ok_or_else(|| invalid("input too short to contain a header"))?;
    let be = u32::from_be_bytes([raw[0], raw[1], raw[2], raw[3]]);
    if be == SIGNATURE {
        Ok(ByteOrder::Big)
    } else if be == SIGNATURE_SWAPPED {
        Ok(ByteOrder::Little)
    } else {
        Err(invalid("signature does not match \"Tri3\" in either byte order"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::Builder;
    use crate::trie::Fast;

    #[test]
    fn round_trip_big_and_little_endian() {
        let mut b = Builder::new(0, 0);
        b.set_range(0x41, 0x5A, 1);
        b.set_range(0x10000, 0x10100, 2);
        let trie: ImmutableTrie<Fast> = b.build_immutable(Width::W32).unwrap();

        for order in [ByteOrder::Big, ByteOrder::Little] {
            let bytes = encode(&trie, order);
            let back: ImmutableTrie<Fast> = decode(&bytes, Some(Width::W32)).unwrap();
            for cp in [0x0, 0x40, 0x41, 0x5A, 0x5B, 0x10000, 0x10100, 0x10101] {
                use crate::map::CodePointMap;
                assert_eq!(trie.get(cp), back.get(cp), "cp={cp:#x} order={order:?}");
            }
        }
    }

    #[test]
    fn rejects_bad_signature() {
        let bytes = vec![0u8; 32];
        assert!(decode::<Fast>(&bytes, None).is_err());
    }

    #[test]
    fn rejects_width_mismatch() {
        let b = Builder::new(0, 0);
        let trie: ImmutableTrie<Fast> = b.build_immutable(Width::W16).unwrap();
        let bytes = encode(&trie, ByteOrder::Big);
        assert!(decode::<Fast>(&bytes, Some(Width::W32)).is_err());
    }

    #[test]
    fn decode_any_picks_the_shape_the_header_names() {
        use crate::trie::Small;

        let mut b = Builder::new(0, 0);
        b.set_range(0x41, 0x5A, 1);
        let fast: ImmutableTrie<Fast> = b.clone().build_immutable(Width::W32).unwrap();
        let small: ImmutableTrie<Small> = b.build_immutable(Width::W32).unwrap();

        match decode_any(&encode(&fast, ByteOrder::Little), None).unwrap() {
            AnyKindTrie::Fast(_) => {}
            AnyKindTrie::Small(_) => panic!("expected Fast"),
        }
        match decode_any(&encode(&small, ByteOrder::Big), None).unwrap() {
            AnyKindTrie::Small(_) => {}
            AnyKindTrie::Fast(_) => panic!("expected Small"),
        }
    }
}
