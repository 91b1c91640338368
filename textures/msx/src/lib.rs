pub mod convert;
pub mod sc2;
pub mod screen2;

use std::{
	fs,
	io
};

use msxkit_core::{
	format::{
		DecodeFn,
		EncodeFn,
		Format,
		FormatError,
		FormatRegistry,
		ImageConfig
	},
	texture::Texture
};

use convert::{
	convert,
	ConvertOpt
};

use sc2::*;
use screen2::{
	SIGNATURE,
	TileImage
};

#[cfg(feature = "import")]
pub fn read_sc2(filepath: &str) -> Result<Texture, SC2ImportError> {
	Ok(read_sc2_tiles(filepath)?.to_texture())
}

#[cfg(feature = "import")]
pub fn read_sc2_tiles(filepath: &str) -> Result<TileImage, SC2ImportError> {
	let input = fs::read(filepath)?;
	decode(&input)
}

/// Encodes in memory first so that a failed encode never leaves a partial file behind
#[cfg(feature = "export")]
pub fn write_sc2(filepath: &str, image: &TileImage) -> io::Result<()> {
	let output = image.to_bytes()?;
	fs::write(filepath, output)
}

#[cfg(feature = "export")]
pub fn write_sc2_texture(filepath: &str, texture: &Texture, opt: ConvertOpt) -> io::Result<()> {
	write_sc2(filepath, &convert(texture, opt))
}

#[cfg(feature = "import")]
fn decode_texture(data: &[u8]) -> Result<Texture, FormatError> {
	decode(data)
		.map(|img| img.to_texture())
		.map_err(|e| FormatError::Codec(Box::new(e)))
}

#[cfg(feature = "export")]
fn encode_texture(texture: &Texture) -> Result<Vec<u8>, FormatError> {
	let mut output: Vec<u8> = vec![];
	encode(&mut output, texture)?;

	Ok(output)
}

fn config(_: &[u8]) -> Result<ImageConfig, FormatError> {
	Ok(decode_config())
}

#[cfg(feature = "import")]
const DECODE: Option<DecodeFn> = Some(decode_texture);
#[cfg(not(feature = "import"))]
const DECODE: Option<DecodeFn> = None;

#[cfg(feature = "export")]
const ENCODE: Option<EncodeFn> = Some(encode_texture);
#[cfg(not(feature = "export"))]
const ENCODE: Option<EncodeFn> = None;

/// Descriptor of the `.sc2` container
pub fn format() -> Format {
	Format {
		name: "sc2",
		magic: &SIGNATURE,
		decode: DECODE,
		encode: ENCODE,
		config: config,
	}
}

/// Makes `.sc2` data recognizable by `registry`
pub fn register(registry: &mut FormatRegistry) {
	registry.register(format());
}

#[cfg(all(test, feature = "import", feature = "export"))]
mod tests {
	use std::env::temp_dir;

	use msxkit_core::{
		format::Capabilities,
		texture::Color
	};

	use super::*;
	use crate::screen2::{
		Pattern,
		MIN_FILE_LENGTH,
		TILE_PATTERNS
	};

	fn sample() -> TileImage {
		let mut img = TileImage::new();
		img.table[0].push([Pattern::default(); TILE_PATTERNS]);
		img.table[0].push([Pattern { bitmap: 0x3C, color: 0xF4 }; TILE_PATTERNS]);
		img.names[0][5] = 1;

		img
	}

	#[test]
	fn test_file_round_trip() {
		let path = temp_dir().join("msxkit_test_file_round_trip.sc2");
		let path = path.to_str().unwrap();

		let img = sample();
		write_sc2(path, &img).unwrap();
		assert_eq!(fs::metadata(path).unwrap().len(), MIN_FILE_LENGTH as u64);

		let decoded = read_sc2_tiles(path).unwrap();
		assert_eq!(decoded.table[0][1], img.table[0][1]);
		assert_eq!(read_sc2(path).unwrap().indices, img.to_texture().indices);

		fs::remove_file(path).unwrap();
	}

	#[test]
	fn test_write_texture() {
		let path = temp_dir().join("msxkit_test_write_texture.sc2");
		let path = path.to_str().unwrap();

		let tex = Texture::from_pixels(1, 1, &[Color::from_rgb888(0xFFFFFF)]);
		write_sc2_texture(path, &tex, ConvertOpt::Stretch).unwrap();

		let decoded = read_sc2(path).unwrap();
		assert!(decoded.indices.iter().all(|i| *i == 15));

		fs::remove_file(path).unwrap();
	}

	#[test]
	fn test_missing_file() {
		assert!(matches!(read_sc2("/nonexistent/picture.sc2"), Err(SC2ImportError::IO { .. })));
	}

	#[test]
	fn test_registry() {
		let mut registry = FormatRegistry::new();
		register(&mut registry);

		let format = registry.find("SC2").unwrap();
		assert_eq!(format.capabilities(), Capabilities::IMPORT | Capabilities::EXPORT);

		let data = sample().to_bytes().unwrap();
		assert_eq!(registry.sniff(&data).map(|f| f.name), Some("sc2"));
		assert_eq!(registry.config(&data).unwrap().width, 256);

		let tex = registry.decode(&data).unwrap();
		assert_eq!(tex.indices, sample().to_texture().indices);

		let encoded = registry.encode("sc2", &tex).unwrap();
		assert_eq!(encoded.len(), MIN_FILE_LENGTH);
	}

	#[test]
	fn test_registry_codec_error() {
		let mut registry = FormatRegistry::new();
		register(&mut registry);

		// correct magic, missing everything else
		let err = registry.decode(&SIGNATURE).unwrap_err();
		assert!(matches!(err, FormatError::Codec(_)));
		assert!(err.to_string().contains("too short"));
	}
}
