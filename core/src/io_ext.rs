use std::io::{
	Read,
	Result,
	Write
};

pub trait ReadBinExt: Read {
	/// Reads exactly `length` bytes into a new buffer
	#[inline]
	fn read_region(&mut self, length: usize) -> Result<Vec<u8>> {
		let mut region = vec![0; length];
		self.read_exact(&mut region)?;

		Ok(region)
	}

	/// Reads and discards exactly `length` bytes
	#[inline]
	fn skip_region(&mut self, length: usize) -> Result<()> {
		self.read_region(length).map(|_| ())
	}
}

impl<R> ReadBinExt for R
where
	R: Read + ?Sized,
{
}

pub trait WriteBinExt: Write {
	/// Writes `length` zero bytes
	#[inline]
	fn write_zeroes(&mut self, length: usize) -> Result<()> {
		self.write_all(&vec![0u8; length])
	}

	/// Writes `data` and zero-fills up to `length`. Longer data is written whole.
	#[inline]
	fn write_padded(&mut self, data: &[u8], length: usize) -> Result<()> {
		self.write_all(data)?;

		if data.len() < length {
			self.write_zeroes(length - data.len())?;
		}

		Ok(())
	}
}

impl<W> WriteBinExt for W
where
	W: Write + ?Sized,
{
}
