//! Fits an arbitrary [`Texture`] onto the Screen 2 grid.
//!
//! The source is resampled to 256x192 with nearest-neighbour sampling and reduced to the
//! TMS9918 palette. Every 8 pixel tile row keeps its two most frequent colors, the most frequent
//! one becoming the background.

use log::{
	debug,
	warn
};

use std::{
	fmt,
	str::FromStr
};

use thiserror::Error;

use msxkit_core::texture::{
	Color,
	Texture
};

use crate::screen2::*;

/// How a source image is fitted to the 256x192 screen
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConvertOpt {
	/// Scale uniformly to cover the screen, cropping what overflows
	Crop,
	/// Scale each axis independently
	Stretch,
	/// Scale uniformly to fit the screen, filling the borders with black
	KeepAspect,
}

impl Default for ConvertOpt {
	fn default() -> ConvertOpt {
		ConvertOpt::KeepAspect
	}
}

impl fmt::Display for ConvertOpt {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ConvertOpt::Crop => write!(f, "crop"),
			ConvertOpt::Stretch => write!(f, "stretch"),
			ConvertOpt::KeepAspect => write!(f, "keepaspect"),
		}
	}
}

impl FromStr for ConvertOpt {
	type Err = ParseConvertOptError;

	fn from_str(s: &str) -> Result<ConvertOpt, ParseConvertOptError> {
		match s.to_ascii_lowercase().as_str() {
			"crop" => Ok(ConvertOpt::Crop),
			"stretch" => Ok(ConvertOpt::Stretch),
			"keepaspect" | "keep-aspect" => Ok(ConvertOpt::KeepAspect),
			_ => Err(ParseConvertOptError(s.to_string())),
		}
	}
}

#[derive(Clone, Debug, Error, PartialEq)]
#[error("Unknown conversion option: {0}")]
pub struct ParseConvertOptError(pub String);

/// Maps screen pixels back onto source pixels
struct Sampler {
	width: usize,
	height: usize,
	scale_x: f32,
	scale_y: f32,
	offset_x: f32,
	offset_y: f32,
}

impl Sampler {
	fn new(width: usize, height: usize, opt: ConvertOpt) -> Sampler {
		let sx = WIDTH as f32 / width as f32;
		let sy = HEIGHT as f32 / height as f32;

		let (scale_x, scale_y) = match opt {
			ConvertOpt::Stretch => (sx, sy),
			ConvertOpt::Crop => (sx.max(sy), sx.max(sy)),
			ConvertOpt::KeepAspect => (sx.min(sy), sx.min(sy)),
		};

		Sampler {
			width: width,
			height: height,
			scale_x: scale_x,
			scale_y: scale_y,
			offset_x: (WIDTH as f32 - width as f32 * scale_x) / 2.0,
			offset_y: (HEIGHT as f32 - height as f32 * scale_y) / 2.0,
		}
	}

	/// Source pixel under the centre of screen pixel (X, Y), `None` for borders
	fn source(&self, x: usize, y: usize) -> Option<(usize, usize)> {
		let sx = ((x as f32 + 0.5 - self.offset_x) / self.scale_x).floor();
		let sy = ((y as f32 + 0.5 - self.offset_y) / self.scale_y).floor();

		if sx < 0.0 || sy < 0.0 {
			return None;
		}

		let (sx, sy) = (sx as usize, sy as usize);
		if sx >= self.width || sy >= self.height {
			None
		} else {
			Some((sx, sy))
		}
	}
}

/// Resamples the texture into a 256x192 grid of Screen 2 palette indices
fn resample(texture: &Texture, opt: ConvertOpt) -> Vec<usize> {
	if texture.width == 0 || texture.height == 0 {
		warn!("Converting an empty {}x{} texture", texture.width, texture.height);
		return vec![BLACK; WIDTH * HEIGHT];
	}

	// one classification per source palette entry
	let classes: Vec<usize> = texture.palette.iter().map(classify).collect();
	let sampler = Sampler::new(texture.width, texture.height, opt);
	let mut screen = Vec::with_capacity(WIDTH * HEIGHT);

	for y in 0..HEIGHT {
		for x in 0..WIDTH {
			let index = sampler.source(x, y)
				.and_then(|(sx, sy)| texture.indices.get(sy * texture.width + sx))
				.and_then(|i| classes.get(*i))
				.copied()
				.unwrap_or(BLACK);

			screen.push(index);
		}
	}

	screen
}

/// Most frequent palette index other than `exclude`. Ties go to the lower index.
fn most_frequent(counts: &[usize; 16], exclude: Option<usize>) -> Option<usize> {
	let mut best: Option<usize> = None;

	for (i, count) in counts.iter().enumerate() {
		if *count == 0 || Some(i) == exclude {
			continue;
		}

		match best {
			Some(b) if counts[b] >= *count => {},
			_ => best = Some(i),
		}
	}

	best
}

/// Reduces one row of 8 palette indices to a two color pattern
fn encode_row(row: &[usize], palette: &[Color]) -> Pattern {
	let mut counts = [0; 16];
	for i in row.iter() {
		counts[*i] += 1;
	}

	let bg = most_frequent(&counts, None).unwrap_or(BLACK);
	let fg = most_frequent(&counts, Some(bg)).unwrap_or(bg);

	let mut bitmap = 0;
	for (x, i) in row.iter().enumerate() {
		let set = if *i == bg {
			false
		} else if *i == fg {
			true
		} else {
			palette[*i].distance_sq(&palette[fg]) < palette[*i].distance_sq(&palette[bg])
		};

		if set {
			bitmap |= 0x80 >> x;
		}
	}

	Pattern {
		bitmap: bitmap,
		color: (fg << 4 | bg) as u8,
	}
}

/// Converts a texture into a Screen 2 image. Identical tiles within a bank share one
/// pattern, so a bank's table may hold fewer than 256 tiles.
pub fn convert(texture: &Texture, opt: ConvertOpt) -> TileImage {
	let screen = resample(texture, opt);
	let pal = palette();
	let mut img = TileImage::new();

	for bank in 0..BANKS {
		for cell in 0..TABLE_TILES {
			let left = (cell % ROW_TILES) * TILE_SIZE;
			let top = bank * BANK_HEIGHT + (cell / ROW_TILES) * TILE_SIZE;

			let mut tile = [Pattern::default(); TILE_PATTERNS];
			for (row, pattern) in tile.iter_mut().enumerate() {
				let start = (top + row) * WIDTH + left;
				*pattern = encode_row(&screen[start..start + TILE_SIZE], &pal);
			}

			let name = match img.table[bank].iter().position(|t| *t == tile) {
				Some(i) => i,
				None => {
					img.table[bank].push(tile);
					img.table[bank].len() - 1
				},
			};

			img.names[bank][cell] = name as u8;
		}
	}

	debug!("Converted {}x{} texture ({}), {:?} unique tiles per bank", texture.width, texture.height,
		opt, img.table.iter().map(|t| t.len()).collect::<Vec<_>>());

	img
}
