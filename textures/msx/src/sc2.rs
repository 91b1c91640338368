//! `.sc2` container: a `BSAVE` dump of the Screen 2 VRAM area 0x0000-0x37FF.
//!
//! | Region            | Size                   |
//! |-------------------|------------------------|
//! | Header            | 7                      |
//! | Pattern generator | 3 x 2048               |
//! | Name tables       | 3 x 256                |
//! | Sprites, palette  | 1280, skipped          |
//! | Color tables      | 3 x 2048               |
//!
//! Pattern generator and color tables share the same bank-major, tile-major, pattern-minor
//! traversal, see [`slot`].

use byteorder::{
	LE,
	ReadBytesExt,
	WriteBytesExt
};

use log::{
	debug,
	warn
};

use std::{
	borrow::Cow,
	fmt,
	io::{
		self,
		Read,
		Write
	}
};

use thiserror::Error;

use msxkit_core::{
	format::ImageConfig,
	io_ext::{
		ReadBinExt,
		WriteBinExt
	},
	texture::Texture
};

use crate::convert::{
	convert,
	ConvertOpt
};

use crate::screen2::*;

/// Position of a pattern's byte within a bank's pattern generator or color table
pub const fn slot(tile: usize, pattern: usize) -> usize {
	tile * TILE_PATTERNS + pattern
}

/// Lays out one byte per pattern for a whole bank. Tiles past [`TABLE_TILES`] are dropped and
/// missing tiles are left zeroed.
#[cfg(feature = "export")]
fn acquire_bytes<F>(tiles: &[Tile], getter: F) -> Vec<u8>
where
	F: Fn(&Pattern) -> u8,
{
	let mut bytes = vec![0; TABLE_PATTERNS];

	for (tn, tile) in tiles.iter().take(TABLE_TILES).enumerate() {
		for (pn, pattern) in tile.iter().enumerate() {
			bytes[slot(tn, pn)] = getter(pattern);
		}
	}

	bytes
}

/// Inverse of [`acquire_bytes`]
#[cfg(feature = "import")]
fn scatter_bytes<F>(bytes: &[u8], tiles: &mut [Tile], setter: F)
where
	F: Fn(&mut Pattern, u8),
{
	for (tn, tile) in tiles.iter_mut().enumerate() {
		for (pn, pattern) in tile.iter_mut().enumerate() {
			setter(pattern, bytes[slot(tn, pn)]);
		}
	}
}

/// Part of the container being read when the data ran out
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Region {
	Signature,
	PatternGenerator(usize),
	NameTable(usize),
	Reserved,
	ColorTable(usize),
}

impl fmt::Display for Region {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Region::Signature => write!(f, "signature"),
			Region::PatternGenerator(bank) => write!(f, "pattern generator table {}", bank),
			Region::NameTable(bank) => write!(f, "pattern name table {}", bank),
			Region::Reserved => write!(f, "sprite attribute and palette area"),
			Region::ColorTable(bank) => write!(f, "color table {}", bank),
		}
	}
}

#[cfg(feature = "import")]
#[derive(Debug, Error)]
pub enum SC2ImportError {
	#[error("I/O error")]
	IO {
		#[from]
		source: io::Error,
	},
	#[error("Invalid signature: {0:02X?}")]
	InvalidSignature([u8; 7]),
	#[error("File is too short ({length} bytes, min length: {min_length})")]
	MalformedContainer {
		length: usize,
		min_length: usize,
	},
	#[error("Unexpected end of data in {0}")]
	TruncatedContainer(Region),
}

/// Maps running out of data to a truncation error naming `region`
#[cfg(feature = "import")]
fn truncated(err: io::Error, region: Region) -> SC2ImportError {
	if err.kind() == io::ErrorKind::UnexpectedEof {
		SC2ImportError::TruncatedContainer(region)
	} else {
		SC2ImportError::IO {
			source: err,
		}
	}
}

#[cfg(feature = "import")]
fn read_region<R>(buf: &mut R, length: usize, region: Region) -> Result<Vec<u8>, SC2ImportError>
where
	R: ReadBytesExt,
{
	buf.read_region(length).map_err(|e| truncated(e, region))
}

/// `BSAVE` header
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Header {
	pub id: u8,
	pub start: u16,
	pub end: u16,
	pub exec: u16,
}

impl Header {
	pub const SCREEN2: Header = Header {
		id: 0xFE,
		start: ADDR_PATTERN_GENERATOR as u16,
		end: (ADDR_END - 1) as u16,
		exec: 0x0000,
	};

	#[cfg(feature = "import")]
	fn read<R>(buf: &mut R) -> Result<Header, SC2ImportError>
	where
		R: ReadBytesExt,
	{
		let mut raw = [0; 7];
		buf.read_exact(&mut raw).map_err(|e| truncated(e, Region::Signature))?;
		if raw != SIGNATURE {
			return Err(SC2ImportError::InvalidSignature(raw));
		}

		let mut fields = &raw[1..];

		Ok(Header {
			id: raw[0],
			start: fields.read_u16::<LE>()?,
			end: fields.read_u16::<LE>()?,
			exec: fields.read_u16::<LE>()?,
		})
	}

	#[cfg(feature = "export")]
	fn write<W>(&self, buf: &mut W) -> io::Result<()>
	where
		W: WriteBytesExt,
	{
		buf.write_u8(self.id)?;
		buf.write_u16::<LE>(self.start)?;
		buf.write_u16::<LE>(self.end)?;
		buf.write_u16::<LE>(self.exec)
	}
}

impl TileImage {
	/// Reads a whole container from a stream. Bytes after the color tables are left unread.
	#[cfg(feature = "import")]
	pub fn read<R>(buf: &mut R) -> Result<TileImage, SC2ImportError>
	where
		R: ReadBytesExt,
	{
		Header::read(buf)?;

		let mut img = TileImage {
			table: Default::default(),
			names: Default::default(),
		};

		for (bank, tiles) in img.table.iter_mut().enumerate() {
			let bytes = read_region(buf, TABLE_PATTERNS, Region::PatternGenerator(bank))?;
			*tiles = vec![[Pattern::default(); TILE_PATTERNS]; TABLE_TILES];
			scatter_bytes(&bytes, tiles, |p, b| p.bitmap = b);
		}

		for (bank, names) in img.names.iter_mut().enumerate() {
			*names = read_region(buf, TABLE_TILES, Region::NameTable(bank))?;
		}

		buf.skip_region(RESERVED_SIZE).map_err(|e| truncated(e, Region::Reserved))?;

		for (bank, tiles) in img.table.iter_mut().enumerate() {
			let bytes = read_region(buf, TABLE_PATTERNS, Region::ColorTable(bank))?;
			scatter_bytes(&bytes, tiles, |p, b| p.color = b);
		}

		Ok(img)
	}

	/// Writes the full container. The output is always [`MIN_FILE_LENGTH`] bytes long: tables are
	/// zero-filled, tiles past 256 per bank are dropped and the sprite/palette area is zeroed.
	///
	/// Name tables longer than 256 entries are rejected with [`io::ErrorKind::InvalidInput`]
	/// before anything is written.
	#[cfg(feature = "export")]
	pub fn write<W>(&self, buf: &mut W) -> io::Result<()>
	where
		W: WriteBytesExt,
	{
		self.check_names()?;

		Header::SCREEN2.write(buf)?;

		for (bank, tiles) in self.table.iter().enumerate() {
			if tiles.len() > TABLE_TILES {
				warn!("Bank {} holds {} tiles, dropping the last {}", bank, tiles.len(),
					tiles.len() - TABLE_TILES);
			}

			buf.write_all(&acquire_bytes(tiles, |p| p.bitmap))?;
		}

		for names in self.names.iter() {
			buf.write_padded(names, TABLE_TILES)?;
		}

		buf.write_zeroes(RESERVED_SIZE)?;

		for tiles in self.table.iter() {
			buf.write_all(&acquire_bytes(tiles, |p| p.color))?;
		}

		Ok(())
	}

	/// Encodes into a new buffer
	#[cfg(feature = "export")]
	pub fn to_bytes(&self) -> io::Result<Vec<u8>> {
		let mut out = Vec::with_capacity(MIN_FILE_LENGTH);
		self.write(&mut out)?;

		Ok(out)
	}

	#[cfg(feature = "export")]
	fn check_names(&self) -> io::Result<()> {
		for (bank, names) in self.names.iter().enumerate() {
			if names.len() > TABLE_TILES {
				return Err(io::Error::new(io::ErrorKind::InvalidInput,
					format!("name table {} holds {} entries, max {}", bank, names.len(), TABLE_TILES)));
			}
		}

		Ok(())
	}
}

/// Decodes a complete container held in memory
#[cfg(feature = "import")]
pub fn decode(data: &[u8]) -> Result<TileImage, SC2ImportError> {
	if data.len() < MIN_FILE_LENGTH {
		return Err(SC2ImportError::MalformedContainer {
			length: data.len(),
			min_length: MIN_FILE_LENGTH,
		});
	}

	if data.len() > MIN_FILE_LENGTH {
		debug!("Ignoring {} trailing bytes", data.len() - MIN_FILE_LENGTH);
	}

	let mut buf = data;
	let img = TileImage::read(&mut buf)?;
	debug!("Decoded Screen 2 image, {} tiles", img.table.iter().map(|t| t.len()).sum::<usize>());

	Ok(img)
}

/// Every container decodes to a 256x192 image in the Screen 2 palette
pub fn decode_config() -> ImageConfig {
	ImageConfig {
		palette: palette(),
		width: WIDTH,
		height: HEIGHT,
	}
}

/// Anything that can be turned into a [`TileImage`] for encoding
pub trait ToTileImage {
	fn to_tile_image(&self, opt: ConvertOpt) -> Cow<'_, TileImage>;
}

impl ToTileImage for TileImage {
	fn to_tile_image(&self, _: ConvertOpt) -> Cow<'_, TileImage> {
		Cow::Borrowed(self)
	}
}

impl ToTileImage for Texture {
	fn to_tile_image(&self, opt: ConvertOpt) -> Cow<'_, TileImage> {
		Cow::Owned(convert(self, opt))
	}
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Encoder {
	/// How images other than [`TileImage`] are fitted to the screen
	pub opt: ConvertOpt,
}

impl Encoder {
	pub fn new(opt: ConvertOpt) -> Encoder {
		Encoder {
			opt: opt,
		}
	}

	#[cfg(feature = "export")]
	pub fn encode<W, I>(&self, buf: &mut W, image: &I) -> io::Result<()>
	where
		W: WriteBytesExt,
		I: ToTileImage + ?Sized,
	{
		image.to_tile_image(self.opt).write(buf)
	}
}

/// Encodes with [`ConvertOpt::KeepAspect`]
#[cfg(feature = "export")]
pub fn encode<W, I>(buf: &mut W, image: &I) -> io::Result<()>
where
	W: WriteBytesExt,
	I: ToTileImage + ?Sized,
{
	Encoder::default().encode(buf, image)
}
