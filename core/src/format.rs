//! Explicit registry of image container formats.
//!
//! Format crates expose a [`Format`] descriptor and the application registers the ones it wants,
//! after which data can be identified by its magic prefix and decoded into a [`Texture`].

use bitflags::bitflags;
use log::debug;

use std::error::Error as StdError;
use std::{
	fmt,
	io
};
use thiserror::Error;

use crate::texture::{
	Color,
	Texture
};

bitflags! {
	pub struct Capabilities: u8 {
		const IMPORT = 1;
		const EXPORT = 2;
	}
}

pub type DecodeFn = fn(&[u8]) -> Result<Texture, FormatError>;
pub type EncodeFn = fn(&Texture) -> Result<Vec<u8>, FormatError>;
pub type ConfigFn = fn(&[u8]) -> Result<ImageConfig, FormatError>;

/// Dimensions and color model of an image, obtainable without decoding pixel data
#[derive(Clone, Debug, PartialEq)]
pub struct ImageConfig {
	pub palette: Vec<Color>,
	pub width: usize,
	pub height: usize,
}

#[derive(Clone, Copy)]
pub struct Format {
	pub name: &'static str,
	pub magic: &'static [u8],
	pub decode: Option<DecodeFn>,
	pub encode: Option<EncodeFn>,
	pub config: ConfigFn,
}

impl Format {
	pub fn capabilities(&self) -> Capabilities {
		let mut caps = Capabilities::empty();

		if self.decode.is_some() {
			caps |= Capabilities::IMPORT;
		}

		if self.encode.is_some() {
			caps |= Capabilities::EXPORT;
		}

		caps
	}

	/// Whether `data` starts with this format's magic bytes
	pub fn matches(&self, data: &[u8]) -> bool {
		data.starts_with(self.magic)
	}
}

impl fmt::Debug for Format {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Format")
			.field("name", &self.name)
			.field("magic", &self.magic)
			.field("capabilities", &self.capabilities())
			.finish()
	}
}

#[derive(Clone, Debug, Default)]
pub struct FormatRegistry {
	formats: Vec<Format>,
}

impl FormatRegistry {
	pub fn new() -> FormatRegistry {
		FormatRegistry {
			formats: vec![],
		}
	}

	/// Adds a format, replacing any previously registered format of the same name
	pub fn register(&mut self, format: Format) {
		debug!("Registering image format {} ({:?})", format.name, format.capabilities());

		if let Some(existing) = self.formats.iter_mut().find(|f| f.name == format.name) {
			*existing = format;
		} else {
			self.formats.push(format);
		}
	}

	pub fn formats(&self) -> &[Format] {
		&self.formats
	}

	/// Looks up a format by name, ignoring case
	pub fn find(&self, name: &str) -> Option<&Format> {
		self.formats.iter().find(|f| f.name.eq_ignore_ascii_case(name))
	}

	/// Returns the first registered format whose magic prefixes `data`
	pub fn sniff(&self, data: &[u8]) -> Option<&Format> {
		let format = self.formats.iter().find(|f| f.matches(data));

		if let Some(f) = format {
			debug!("Identified {} bytes as {}", data.len(), f.name);
		}

		format
	}

	pub fn decode(&self, data: &[u8]) -> Result<Texture, FormatError> {
		let format = self.sniff(data).ok_or(FormatError::Unknown)?;
		let decode = format.decode.ok_or(FormatError::Unsupported {
			name: format.name,
			capability: Capabilities::IMPORT,
		})?;

		decode(data)
	}

	pub fn config(&self, data: &[u8]) -> Result<ImageConfig, FormatError> {
		let format = self.sniff(data).ok_or(FormatError::Unknown)?;
		(format.config)(data)
	}

	pub fn encode(&self, name: &str, texture: &Texture) -> Result<Vec<u8>, FormatError> {
		let format = self.find(name).ok_or_else(|| FormatError::NotRegistered(name.to_string()))?;
		let encode = format.encode.ok_or(FormatError::Unsupported {
			name: format.name,
			capability: Capabilities::EXPORT,
		})?;

		encode(texture)
	}
}

#[derive(Debug, Error)]
pub enum FormatError {
	#[error("{0}")]
	Codec(Box<dyn StdError + Send + Sync>),
	#[error("I/O error")]
	IO {
		#[from]
		source: io::Error,
	},
	#[error("No format registered under the name {0}")]
	NotRegistered(String),
	#[error("{name} does not support {capability:?}")]
	Unsupported {
		name: &'static str,
		capability: Capabilities,
	},
	#[error("Unknown image format")]
	Unknown,
}
