//! The positional byte stream codec at the heart of this crate.
//!
//! A [`ByteStream`] owns a byte buffer, a cursor, and a resolved byte
//! order, and can decode or encode any value representation from the
//! type code table in [`typedef`](crate::typedef). Decoding past the
//! end of the buffer yields `None` rather than an error, so that
//! sequential field parsing can detect the end of data. Recoverable
//! oddities (such as unknown type codes) accumulate as diagnostics
//! instead of interrupting the pass.

use crate::typedef::ValueType;
use crate::util::sign_correct;
use byteordered::{Endian, Endianness};

/// A value decoded from, or encodable into, a NIfTI-1 byte stream.
///
/// Scalar variants mirror the value representation table; `List` holds
/// an ordered sequence decoded from a multi-element run.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// unsigned byte
    U8(u8),
    /// unsigned short
    U16(u16),
    /// signed short
    I16(i16),
    /// unsigned long
    U32(u32),
    /// signed long
    I32(i32),
    /// 32 bit float
    F32(f32),
    /// 64 bit float
    F64(f64),
    /// ASCII string, already stripped of trailing whitespace and NULs
    Str(String),
    /// raw bytes rendered as a lowercase hex string
    Hex(String),
    /// an ordered sequence of scalar values
    List(Vec<Value>),
}

impl Value {
    /// The value as an unsigned byte, if it is one.
    pub fn as_u8(&self) -> Option<u8> {
        match *self {
            Value::U8(v) => Some(v),
            _ => None,
        }
    }

    /// The value as an unsigned short, if it is one.
    pub fn as_u16(&self) -> Option<u16> {
        match *self {
            Value::U16(v) => Some(v),
            _ => None,
        }
    }

    /// The value as a signed short, if it is one.
    pub fn as_i16(&self) -> Option<i16> {
        match *self {
            Value::I16(v) => Some(v),
            _ => None,
        }
    }

    /// The value as a signed long, if it is one.
    pub fn as_i32(&self) -> Option<i32> {
        match *self {
            Value::I32(v) => Some(v),
            _ => None,
        }
    }

    /// The value as a 32 bit float, if it is one.
    pub fn as_f32(&self) -> Option<f32> {
        match *self {
            Value::F32(v) => Some(v),
            _ => None,
        }
    }

    /// The value as a string slice, if it is a string.
    pub fn as_str(&self) -> Option<&str> {
        match *self {
            Value::Str(ref v) => Some(v),
            _ => None,
        }
    }

    /// A lossy widening of any numeric scalar to `f64`.
    pub fn to_f64(&self) -> Option<f64> {
        match *self {
            Value::U8(v) => Some(v.into()),
            Value::U16(v) => Some(v.into()),
            Value::I16(v) => Some(v.into()),
            Value::U32(v) => Some(v.into()),
            Value::I32(v) => Some(v.into()),
            Value::F32(v) => Some(v.into()),
            Value::F64(v) => Some(v),
            _ => None,
        }
    }

    fn to_i64(&self) -> Option<i64> {
        match *self {
            Value::U8(v) => Some(v.into()),
            Value::U16(v) => Some(v.into()),
            Value::I16(v) => Some(v.into()),
            Value::U32(v) => Some(v.into()),
            Value::I32(v) => Some(v.into()),
            Value::F32(v) => Some(v as i64),
            Value::F64(v) => Some(v as i64),
            _ => None,
        }
    }
}

/// A positional buffer with endian-aware encode/decode primitives.
#[derive(Debug, Clone, PartialEq)]
pub struct ByteStream {
    buf: Vec<u8>,
    cursor: usize,
    endianness: Endianness,
    diagnostics: Vec<String>,
}

impl ByteStream {
    /// Create a stream over the given buffer with a resolved byte
    /// order, cursor at the start.
    pub fn new(buf: Vec<u8>, endianness: Endianness) -> Self {
        ByteStream {
            buf,
            cursor: 0,
            endianness,
            diagnostics: Vec::new(),
        }
    }

    /// Create an empty stream in the system's native byte order,
    /// for assembling output.
    pub fn empty(endianness: Endianness) -> Self {
        ByteStream::new(Vec::new(), endianness)
    }

    /// The stream's resolved byte order.
    pub fn endianness(&self) -> Endianness {
        self.endianness
    }

    /// The current cursor position, in bytes from the buffer start.
    pub fn position(&self) -> usize {
        self.cursor
    }

    /// Total buffer length in bytes.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether the buffer holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Consume this stream into one over the same buffer with the
    /// given byte order, cursor back at the start. Reconfiguration
    /// produces a new stream rather than mutating format state in
    /// place.
    pub fn into_endianness(self, endianness: Endianness) -> Self {
        ByteStream {
            buf: self.buf,
            cursor: 0,
            endianness,
            diagnostics: self.diagnostics,
        }
    }

    /// Advance the cursor by `n` bytes without decoding, clamped to
    /// the end of the buffer.
    pub fn skip(&mut self, n: usize) {
        self.cursor = self.cursor.saturating_add(n).min(self.buf.len());
    }

    /// Move the cursor back to the buffer start.
    pub fn rewind(&mut self) {
        self.cursor = 0;
    }

    /// Drop the buffer contents and reset the cursor.
    pub fn clear(&mut self) {
        self.buf.clear();
        self.cursor = 0;
    }

    /// Replace the buffer contents, resetting the cursor.
    pub fn replace_buffer(&mut self, buf: Vec<u8>) {
        self.buf = buf;
        self.cursor = 0;
    }

    /// Append raw bytes at the end of the buffer. The cursor is left
    /// untouched.
    pub fn append(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Take the buffer out of the stream.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// The ordered diagnostics accumulated so far.
    pub fn diagnostics(&self) -> &[String] {
        &self.diagnostics
    }

    /// Move the accumulated diagnostics out of the stream.
    pub fn take_diagnostics(&mut self) -> Vec<String> {
        std::mem::take(&mut self.diagnostics)
    }

    fn resolve(&mut self, code: &str) -> ValueType {
        match ValueType::from_code(code) {
            Some(vt) => vt,
            None => {
                self.diagnostics.push(format!(
                    "unsupported type code `{}`, falling back to hex",
                    code
                ));
                ValueType::Hex
            }
        }
    }

    /// Decode `len` bytes at the cursor under the given type code.
    ///
    /// Returns `None` if fewer than `len` bytes remain (the end-of-data
    /// sentinel); the cursor is then left where it was. Otherwise the
    /// cursor advances by `len` and the unpacked result is returned: a
    /// scalar when the run holds a single element, a [`Value::List`]
    /// when it holds several.
    ///
    /// An unknown type code is reported once in the diagnostics and
    /// decoded as hex; it never fails the pass.
    pub fn decode(&mut self, len: usize, code: &str) -> Option<Value> {
        let end = self.cursor.checked_add(len)?;
        if end > self.buf.len() {
            return None;
        }
        let vt = self.resolve(code);
        let bytes = &self.buf[self.cursor..end];
        let value = match vt {
            ValueType::Str => Value::Str(
                String::from_utf8_lossy(bytes)
                    .trim_end_matches(|c: char| c == '\0' || c.is_whitespace())
                    .to_string(),
            ),
            ValueType::Hex => {
                let hex: String = bytes.iter().map(|b| format!("{:02x}", b)).collect();
                Value::Hex(hex)
            }
            _ => {
                let width = vt.width().unwrap_or(1);
                let mut elements = Vec::with_capacity(len / width);
                for mut chunk in bytes.chunks_exact(width) {
                    elements.push(self.decode_element(vt, &mut chunk)?);
                }
                if elements.len() == 1 {
                    elements.remove(0)
                } else {
                    Value::List(elements)
                }
            }
        };
        self.cursor += len;
        Some(value)
    }

    /// Unpack a single fixed-width element from an exact-size chunk.
    ///
    /// Signed 16 and 32 bit integers in non-native order are unpacked
    /// through their unsigned form and then sign-corrected, since that
    /// byte order only provides unsigned unpack primitives in the
    /// reference codec.
    fn decode_element(&self, vt: ValueType, chunk: &mut &[u8]) -> Option<Value> {
        let e = self.endianness;
        let equal_endian = e == Endianness::native();
        let v = match vt {
            ValueType::By => Value::U8(chunk.first().copied()?),
            ValueType::Us => Value::U16(e.read_u16(chunk).ok()?),
            ValueType::Ss => {
                if equal_endian {
                    Value::I16(e.read_i16(chunk).ok()?)
                } else {
                    let raw = e.read_u16(chunk).ok()?;
                    Value::I16(sign_correct(raw.into(), 16) as i16)
                }
            }
            ValueType::Ul => Value::U32(e.read_u32(chunk).ok()?),
            ValueType::Sl => {
                if equal_endian {
                    Value::I32(e.read_i32(chunk).ok()?)
                } else {
                    let raw = e.read_u32(chunk).ok()?;
                    Value::I32(sign_correct(raw.into(), 32) as i32)
                }
            }
            ValueType::Fl => Value::F32(e.read_f32(chunk).ok()?),
            ValueType::Fd => Value::F64(e.read_f64(chunk).ok()?),
            ValueType::Hex | ValueType::Str => unreachable!(),
        };
        Some(v)
    }

    /// Encode a value under the given type code, yielding the packed
    /// bytes in this stream's byte order. The internal buffer is not
    /// touched; use [`append`](ByteStream::append) or
    /// [`write`](ByteStream::write) to grow it.
    ///
    /// A value which cannot be represented under the resolved type
    /// (e.g. a string under a numeric code) is reported in the
    /// diagnostics and contributes no bytes.
    pub fn encode(&mut self, value: &Value, code: &str) -> Vec<u8> {
        let vt = self.resolve(code);
        let mut out = Vec::new();
        self.encode_into(value, vt, &mut out);
        out
    }

    /// Encode a value under the given type code and append the packed
    /// bytes at the end of the buffer.
    pub fn write(&mut self, value: &Value, code: &str) {
        let bytes = self.encode(value, code);
        self.append(&bytes);
    }

    fn encode_into(&mut self, value: &Value, vt: ValueType, out: &mut Vec<u8>) {
        if let Value::List(ref elements) = *value {
            for v in elements {
                self.encode_into(v, vt, out);
            }
            return;
        }
        let e = self.endianness;
        // packing into a Vec cannot fail
        let done = match vt {
            ValueType::By => value.to_i64().map(|v| out.push(v as u8)),
            ValueType::Us => value
                .to_i64()
                .and_then(|v| e.write_u16(&mut *out, v as u16).ok()),
            ValueType::Ss => value
                .to_i64()
                .and_then(|v| e.write_i16(&mut *out, v as i16).ok()),
            ValueType::Ul => value
                .to_i64()
                .and_then(|v| e.write_u32(&mut *out, v as u32).ok()),
            ValueType::Sl => value
                .to_i64()
                .and_then(|v| e.write_i32(&mut *out, v as i32).ok()),
            ValueType::Fl => value
                .to_f64()
                .and_then(|v| e.write_f32(&mut *out, v as f32).ok()),
            ValueType::Fd => value
                .to_f64()
                .and_then(|v| e.write_f64(&mut *out, v).ok()),
            ValueType::Str => value.as_str().map(|s| out.extend_from_slice(s.as_bytes())),
            ValueType::Hex => match *value {
                Value::Hex(ref hex) => decode_hex_into(hex, out),
                _ => None,
            },
        };
        if done.is_none() {
            self.diagnostics
                .push(format!("cannot encode {:?} as {:?}", value, vt));
        }
    }
}

fn decode_hex_into(hex: &str, out: &mut Vec<u8>) -> Option<()> {
    let digits = hex.as_bytes();
    if digits.len() % 2 != 0 {
        return None;
    }
    for pair in digits.chunks_exact(2) {
        let s = std::str::from_utf8(pair).ok()?;
        out.push(u8::from_str_radix(s, 16).ok()?);
    }
    Some(())
}

#[cfg(test)]
mod tests {
    use super::{ByteStream, Value};
    use byteordered::Endianness;

    #[test]
    fn decode_scalars_both_orders() {
        let mut le = ByteStream::new(vec![0x5C, 0x01, 0x00, 0x00], Endianness::Little);
        assert_eq!(le.decode(4, "SL"), Some(Value::I32(348)));

        let mut be = ByteStream::new(vec![0x00, 0x00, 0x01, 0x5C], Endianness::Big);
        assert_eq!(be.decode(4, "SL"), Some(Value::I32(348)));
    }

    #[test]
    fn decode_signed_non_native() {
        // -2 as a big-endian i16; decoding must sign-correct on a
        // little-endian host and read directly on a big-endian one
        let mut s = ByteStream::new(vec![0xFF, 0xFE], Endianness::Big);
        assert_eq!(s.decode(2, "SS"), Some(Value::I16(-2)));

        let mut s = ByteStream::new(vec![0xFE, 0xFF], Endianness::Little);
        assert_eq!(s.decode(2, "SS"), Some(Value::I16(-2)));

        let mut s = ByteStream::new(vec![0xFF, 0xFF, 0xFF, 0xFE], Endianness::Big);
        assert_eq!(s.decode(4, "SL"), Some(Value::I32(-2)));
    }

    #[test]
    fn decode_sequences() {
        let mut s = ByteStream::new(vec![1, 0, 2, 0, 3, 0], Endianness::Little);
        assert_eq!(
            s.decode(6, "US"),
            Some(Value::List(vec![
                Value::U16(1),
                Value::U16(2),
                Value::U16(3)
            ]))
        );
        assert_eq!(s.position(), 6);
    }

    #[test]
    fn decode_strings_trimmed() {
        let mut s = ByteStream::new(b"ni1\0".to_vec(), Endianness::Little);
        assert_eq!(s.decode(4, "STR"), Some(Value::Str("ni1".into())));

        let mut s = ByteStream::new(b"FSL3.2beta  \0\0".to_vec(), Endianness::Big);
        assert_eq!(s.decode(14, "STR"), Some(Value::Str("FSL3.2beta".into())));
    }

    #[test]
    fn decode_past_end_is_none() {
        let mut s = ByteStream::new(vec![1, 2], Endianness::Little);
        assert_eq!(s.decode(4, "UL"), None);
        // cursor untouched, a shorter decode still works
        assert_eq!(s.decode(2, "US"), Some(Value::U16(0x0201)));
        assert_eq!(s.decode(1, "BY"), None);
        assert!(s.diagnostics().is_empty());
    }

    #[test]
    fn unknown_code_falls_back_to_hex() {
        let mut s = ByteStream::new(vec![0xDE, 0xAD], Endianness::Little);
        assert_eq!(s.decode(2, "ZZ"), Some(Value::Hex("dead".into())));
        assert_eq!(s.diagnostics().len(), 1);
    }

    #[test]
    fn encode_decode_round_trip() {
        for endianness in &[Endianness::Little, Endianness::Big] {
            let mut s = ByteStream::empty(*endianness);
            for (value, code, len) in vec![
                (Value::U8(200), "BY", 1),
                (Value::U16(0xBEEF), "US", 2),
                (Value::I16(-12345), "SS", 2),
                (Value::U32(0xDEAD_BEEF), "UL", 4),
                (Value::I32(-123_456_789), "SL", 4),
                (Value::F32(1.5), "FL", 4),
                (Value::F64(-2.25e100), "FD", 8),
            ] {
                let bytes = s.encode(&value, code);
                assert_eq!(bytes.len(), len);
                let mut back = ByteStream::new(bytes, *endianness);
                assert_eq!(back.decode(len, code), Some(value));
            }
            assert!(s.diagnostics().is_empty());
        }
    }

    #[test]
    fn encode_hex_round_trip() {
        let mut s = ByteStream::empty(Endianness::Little);
        let bytes = s.encode(&Value::Hex("0aff10".into()), "HEX");
        assert_eq!(bytes, vec![0x0A, 0xFF, 0x10]);
    }

    #[test]
    fn write_appends() {
        let mut s = ByteStream::empty(Endianness::Little);
        s.write(&Value::U16(1), "US");
        s.write(&Value::Str("ni1".into()), "STR");
        s.append(&[0]);
        assert_eq!(s.into_bytes(), vec![1, 0, b'n', b'i', b'1', 0]);
    }

    #[test]
    fn skip_clamps_to_buffer_end() {
        let mut s = ByteStream::new(vec![1, 2, 3], Endianness::Little);
        s.skip(usize::MAX);
        assert_eq!(s.position(), 3);
        assert_eq!(s.decode(1, "BY"), None);
        s.rewind();
        assert_eq!(s.decode(1, "BY"), Some(Value::U8(1)));
        assert_eq!(s.decode(usize::MAX, "BY"), None);
        assert_eq!(s.position(), 1);
    }

    #[test]
    fn cursor_ops() {
        let mut s = ByteStream::new(vec![9, 1, 0], Endianness::Little);
        s.skip(1);
        assert_eq!(s.decode(2, "US"), Some(Value::U16(1)));
        s.rewind();
        assert_eq!(s.decode(1, "BY"), Some(Value::U8(9)));
        s.replace_buffer(vec![7]);
        assert_eq!(s.decode(1, "BY"), Some(Value::U8(7)));
        s.clear();
        assert!(s.is_empty());
        assert_eq!(s.position(), 0);
    }
}
