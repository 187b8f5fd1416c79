use std::io::{self, Read};

use crate::parse::ParseError;

const SECTION_BOUND_EXCEEDED: &str = "section bound exceeded";

/// Wraps any [`Read`] with the primitive decoders the binary format is built
/// out of: LEB128 integers (via the `leb128` crate), little-endian IEEE-754
/// floats, length-prefixed vectors, and UTF-8 strings.
///
/// [`ByteReader`] itself implements [`Read`], so [`ByteReader::bounded`] can
/// hand out a sub-reader that the `leb128` crate (or anything else that wants
/// a plain byte stream) can read from directly, while still enforcing that a
/// section's declared size is a hard boundary.
pub struct ByteReader<R> {
	inner: R,
	consumed: u64,
	limit: Option<u64>,
}

impl<R: Read> Read for ByteReader<R> {
	fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
		let buf = match self.limit {
			Some(limit) if self.consumed >= limit => {
				return Err(io::Error::new(io::ErrorKind::Other, SECTION_BOUND_EXCEEDED))
			}
			Some(limit) => {
				let remaining = (limit - self.consumed).min(buf.len() as u64) as usize;
				&mut buf[..remaining]
			}
			None => buf,
		};
		let n = self.inner.read(buf)?;
		self.consumed += n as u64;
		Ok(n)
	}
}

impl<R: Read> ByteReader<R> {
	pub fn new(inner: R) -> Self {
		Self { inner, consumed: 0, limit: None }
	}

	fn with_limit(inner: R, limit: u64) -> Self {
		Self { inner, consumed: 0, limit: Some(limit) }
	}

	/// Returns a sub-reader that fails with an unexpected-EOF the moment a
	/// read would need more than `limit` bytes, bounding a section's body
	/// the way its declared size promises. Converted to
	/// [`ParseError::MalformedSection`] by callers.
	pub fn bounded(&mut self, limit: u64) -> ByteReader<&mut R> {
		ByteReader::with_limit(&mut self.inner, limit)
	}

	pub fn bytes_consumed(&self) -> u64 {
		self.consumed
	}

	pub fn read_u8(&mut self) -> Result<u8, ParseError> {
		let mut buf = [0u8; 1];
		self.read_exact(&mut buf).map_err(ParseError::from)?;
		Ok(buf[0])
	}

	pub fn read_bytes(&mut self, len: usize) -> Result<Vec<u8>, ParseError> {
		let mut buf = vec![0u8; len];
		self.read_exact(&mut buf).map_err(ParseError::from)?;
		Ok(buf)
	}

	pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], ParseError> {
		let mut buf = [0u8; N];
		self.read_exact(&mut buf).map_err(ParseError::from)?;
		Ok(buf)
	}

	pub fn read_u32_leb(&mut self) -> Result<u32, ParseError> {
		let value = leb128::read::unsigned(self)?;
		u32::try_from(value).map_err(|_| ParseError::Leb128Overflow { width: 32 })
	}

	pub fn read_u64_leb(&mut self) -> Result<u64, ParseError> {
		Ok(leb128::read::unsigned(self)?)
	}

	pub fn read_i32_leb(&mut self) -> Result<i32, ParseError> {
		let value = leb128::read::signed(self)?;
		i32::try_from(value).map_err(|_| ParseError::Leb128Overflow { width: 32 })
	}

	pub fn read_i64_leb(&mut self) -> Result<i64, ParseError> {
		Ok(leb128::read::signed(self)?)
	}

	pub fn read_f32(&mut self) -> Result<f32, ParseError> {
		Ok(f32::from_le_bytes(self.read_array::<4>()?))
	}

	pub fn read_f64(&mut self) -> Result<f64, ParseError> {
		Ok(f64::from_le_bytes(self.read_array::<8>()?))
	}

	/// Reads a length-prefixed UTF-8 string.
	pub fn read_name(&mut self) -> Result<String, ParseError> {
		let len = self.read_u32_leb()? as usize;
		let bytes = self.read_bytes(len)?;
		String::from_utf8(bytes).map_err(|e| ParseError::InvalidUtf8(e.utf8_error()))
	}

	/// Reads a length-prefixed vector, calling `read_elem` once per element.
	pub fn read_vec<T>(
		&mut self,
		mut read_elem: impl FnMut(&mut Self) -> Result<T, ParseError>,
	) -> Result<Vec<T>, ParseError> {
		let len = self.read_u32_leb()? as usize;
		let mut items = Vec::with_capacity(len.min(1 << 16));
		for _ in 0..len {
			items.push(read_elem(self)?);
		}
		Ok(items)
	}

	/// True once every byte up to `limit` has been consumed (only meaningful
	/// on a bounded sub-reader).
	pub fn at_limit(&self) -> bool {
		matches!(self.limit, Some(limit) if self.consumed >= limit)
	}
}

impl From<io::Error> for ParseError {
	fn from(err: io::Error) -> Self {
		if err.to_string() == SECTION_BOUND_EXCEEDED {
			ParseError::MalformedSection
		} else if err.kind() == io::ErrorKind::UnexpectedEof {
			ParseError::UnexpectedEof
		} else {
			ParseError::Io(err.to_string())
		}
	}
}

impl From<leb128::read::Error> for ParseError {
	fn from(err: leb128::read::Error) -> Self {
		match err {
			leb128::read::Error::IoError(io_err) => ParseError::from(io_err),
			leb128::read::Error::Overflow => ParseError::Leb128Overflow { width: 64 },
		}
	}
}
