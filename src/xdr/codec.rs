//! XDR cursor primitives — big-endian, 4-byte-aligned reads and writes.
//!
//! Every encoded value occupies a multiple of 4 bytes. Variable-length
//! fields carry a `u32` length prefix and are zero-padded to the next
//! 4-byte boundary; decoders validate that padding is zero rather than
//! silently skipping it.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;

use crate::error::XdrError;

/// A monotonically advancing read cursor over an XDR byte buffer.
pub struct XdrReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> XdrReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Fail unless the entire input was consumed.
    pub fn finish(&self) -> Result<(), XdrError> {
        match self.remaining() {
            0 => Ok(()),
            remaining => Err(XdrError::TrailingBytes { remaining }),
        }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], XdrError> {
        if self.remaining() < n {
            return Err(XdrError::UnexpectedEof {
                needed: n,
                remaining: self.remaining(),
            });
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn skip_padding(&mut self, data_len: usize) -> Result<(), XdrError> {
        let pad = (4 - data_len % 4) % 4;
        for &b in self.take(pad)? {
            if b != 0 {
                return Err(XdrError::NonZeroPadding);
            }
        }
        Ok(())
    }

    pub fn read_u32(&mut self) -> Result<u32, XdrError> {
        let b = self.take(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    pub fn read_i32(&mut self) -> Result<i32, XdrError> {
        Ok(self.read_u32()? as i32)
    }

    pub fn read_u64(&mut self) -> Result<u64, XdrError> {
        let b = self.take(8)?;
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(b);
        Ok(u64::from_be_bytes(bytes))
    }

    pub fn read_i64(&mut self) -> Result<i64, XdrError> {
        Ok(self.read_u64()? as i64)
    }

    pub fn read_bool(&mut self) -> Result<bool, XdrError> {
        match self.read_u32()? {
            0 => Ok(false),
            1 => Ok(true),
            v => Err(XdrError::InvalidBool(v)),
        }
    }

    /// Fixed-length opaque data, padded to a 4-byte boundary.
    pub fn read_fixed<const N: usize>(&mut self) -> Result<[u8; N], XdrError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        self.skip_padding(N)?;
        Ok(out)
    }

    /// Variable-length opaque data with a declared maximum.
    pub fn read_var_opaque(&mut self, max: u32) -> Result<Vec<u8>, XdrError> {
        let len = self.read_u32()?;
        if len > max {
            return Err(XdrError::LengthExceedsMax { len, max });
        }
        let data = self.take(len as usize)?.to_vec();
        self.skip_padding(len as usize)?;
        Ok(data)
    }

    /// Variable-length UTF-8 string with a declared maximum byte length.
    pub fn read_string(&mut self, max: u32) -> Result<String, XdrError> {
        let bytes = self.read_var_opaque(max)?;
        String::from_utf8(bytes).map_err(|_| XdrError::InvalidUtf8)
    }

    /// Optional value: a `u32` presence flag followed by the value.
    pub fn read_option<T: ReadXdr>(&mut self) -> Result<Option<T>, XdrError> {
        match self.read_u32()? {
            0 => Ok(None),
            1 => Ok(Some(T::read_xdr(self)?)),
            v => Err(XdrError::InvalidPresenceFlag(v)),
        }
    }

    /// Variable-size array with a declared maximum element count.
    pub fn read_vec<T: ReadXdr>(&mut self, max: u32) -> Result<Vec<T>, XdrError> {
        let len = self.read_u32()?;
        if len > max {
            return Err(XdrError::LengthExceedsMax { len, max });
        }
        let mut out = Vec::with_capacity(len as usize);
        for _ in 0..len {
            out.push(T::read_xdr(self)?);
        }
        Ok(out)
    }
}

/// Write cursor accumulating XDR bytes.
#[derive(Default)]
pub struct XdrWriter {
    buf: Vec<u8>,
}

impl XdrWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    fn write_padding(&mut self, data_len: usize) {
        let pad = (4 - data_len % 4) % 4;
        self.buf.extend(std::iter::repeat(0u8).take(pad));
    }

    pub fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    pub fn write_i32(&mut self, v: i32) {
        self.write_u32(v as u32);
    }

    pub fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    pub fn write_i64(&mut self, v: i64) {
        self.write_u64(v as u64);
    }

    pub fn write_bool(&mut self, v: bool) {
        self.write_u32(v as u32);
    }

    pub fn write_fixed(&mut self, data: &[u8]) {
        self.buf.extend_from_slice(data);
        self.write_padding(data.len());
    }

    pub fn write_var_opaque(&mut self, max: u32, data: &[u8]) -> Result<(), XdrError> {
        if data.len() as u32 > max {
            return Err(XdrError::LengthExceedsMax {
                len: data.len() as u32,
                max,
            });
        }
        self.write_u32(data.len() as u32);
        self.buf.extend_from_slice(data);
        self.write_padding(data.len());
        Ok(())
    }

    pub fn write_string(&mut self, max: u32, s: &str) -> Result<(), XdrError> {
        self.write_var_opaque(max, s.as_bytes())
    }

    pub fn write_option<T: WriteXdr>(&mut self, v: &Option<T>) -> Result<(), XdrError> {
        match v {
            None => {
                self.write_u32(0);
                Ok(())
            }
            Some(inner) => {
                self.write_u32(1);
                inner.write_xdr(self)
            }
        }
    }

    pub fn write_vec<T: WriteXdr>(&mut self, max: u32, items: &[T]) -> Result<(), XdrError> {
        if items.len() as u32 > max {
            return Err(XdrError::LengthExceedsMax {
                len: items.len() as u32,
                max,
            });
        }
        self.write_u32(items.len() as u32);
        for item in items {
            item.write_xdr(self)?;
        }
        Ok(())
    }
}

/// Serialize to the XDR wire format.
pub trait WriteXdr {
    fn write_xdr(&self, w: &mut XdrWriter) -> Result<(), XdrError>;

    fn to_xdr(&self) -> Result<Vec<u8>, XdrError> {
        let mut w = XdrWriter::new();
        self.write_xdr(&mut w)?;
        Ok(w.into_bytes())
    }

    fn to_xdr_base64(&self) -> Result<String, XdrError> {
        Ok(BASE64.encode(self.to_xdr()?))
    }
}

/// Deserialize from the XDR wire format.
///
/// `from_xdr` rejects trailing bytes: a top-level decode must consume the
/// whole buffer.
pub trait ReadXdr: Sized {
    fn read_xdr(r: &mut XdrReader<'_>) -> Result<Self, XdrError>;

    fn from_xdr(bytes: &[u8]) -> Result<Self, XdrError> {
        let mut r = XdrReader::new(bytes);
        let v = Self::read_xdr(&mut r)?;
        r.finish()?;
        Ok(v)
    }

    fn from_xdr_base64(s: &str) -> Result<Self, XdrError> {
        let bytes = BASE64.decode(s.trim())?;
        Self::from_xdr(&bytes)
    }
}
