//! MSX Screen 2 (TMS9918 Graphic II) memory layout, tile model and color model.

use msxkit_core::texture::{
	Color,
	Texture
};

/// `BSAVE` header of a VRAM dump: id byte, start address 0x0000, end address 0x37FF, exec address 0x0000
pub const SIGNATURE: [u8; 7] = [0xFE, 0x00, 0x00, 0xFF, 0x37, 0x00, 0x00];

pub const ADDR_PATTERN_GENERATOR: usize = 0x0000;
pub const ADDR_NAME_TABLE: usize = 0x1800;
pub const ADDR_SPRITE_ATTRS: usize = 0x1B00;
pub const ADDR_COLOR_TABLE: usize = 0x2000;
pub const ADDR_END: usize = 0x3800;

pub const BANKS: usize = 3;
pub const TABLE_TILES: usize = 256;
pub const TILE_PATTERNS: usize = 8;
pub const TABLE_PATTERNS: usize = TABLE_TILES * TILE_PATTERNS;

/// Sprite attributes and palette, sitting between the name tables and the color tables
pub const RESERVED_SIZE: usize = ADDR_COLOR_TABLE - ADDR_SPRITE_ATTRS;

pub const MIN_FILE_LENGTH: usize = SIGNATURE.len() + BANKS * TABLE_PATTERNS + BANKS * TABLE_TILES +
	RESERVED_SIZE + BANKS * TABLE_PATTERNS;

pub const WIDTH: usize = 256;
pub const HEIGHT: usize = 192;
pub const TILE_SIZE: usize = 8;
pub const ROW_TILES: usize = WIDTH / TILE_SIZE;
pub const BANK_HEIGHT: usize = HEIGHT / BANKS;

pub const TRANSPARENT: usize = 0;
pub const BLACK: usize = 1;

/// TMS9918 colors as `0xRRGGBB`. Entry 0 is transparent.
pub const PALETTE: [u32; 16] = [
	0x000000, // transparent
	0x000000, // black
	0x21C842, // medium green
	0x5EDC78, // light green
	0x5455ED, // dark blue
	0x7D76FC, // light blue
	0xD4524D, // dark red
	0x42EBF5, // cyan
	0xFC5554, // medium red
	0xFF7978, // light red
	0xD4C154, // dark yellow
	0xE6CE80, // light yellow
	0x21B03B, // dark green
	0xC95BBA, // magenta
	0xCCCCCC, // gray
	0xFFFFFF, // white
];

/// Returns the Screen 2 palette, indexed by color number
pub fn palette() -> Vec<Color> {
	PALETTE.iter()
		.enumerate()
		.map(|(i, c)| if i == TRANSPARENT { Color::TRANSPARENT } else { Color::from_rgb888(*c) })
		.collect()
}

/// Maps a color to the nearest palette entry. Mostly transparent colors map to entry 0.
pub fn classify(color: &Color) -> usize {
	if color.alpha < 0.5 {
		return TRANSPARENT;
	}

	let mut best = BLACK;
	let mut best_dist = f32::MAX;

	for (i, c) in PALETTE.iter().enumerate().skip(BLACK) {
		let dist = color.distance_sq(&Color::from_rgb888(*c));
		if dist < best_dist {
			best = i;
			best_dist = dist;
		}
	}

	best
}

/// One 8 pixel row of a tile and its two colors
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Pattern {
	pub bitmap: u8,
	pub color: u8,
}

impl Pattern {
	/// Palette index used for set bits
	pub fn foreground(&self) -> usize {
		(self.color >> 4) as usize
	}

	/// Palette index used for clear bits
	pub fn background(&self) -> usize {
		(self.color & 0x0F) as usize
	}

	/// Palette index of pixel `x`, 0 being the leftmost
	pub fn pixel(&self, x: usize) -> usize {
		if self.bitmap & (0x80 >> (x % TILE_SIZE)) != 0 {
			self.foreground()
		} else {
			self.background()
		}
	}
}

pub type Tile = [Pattern; TILE_PATTERNS];

/// A Screen 2 picture: per bank, a pattern table and a name table pointing into it
#[derive(Clone, Debug, PartialEq)]
pub struct TileImage {
	pub table: [Vec<Tile>; BANKS],
	pub names: [Vec<u8>; BANKS],
}

impl Default for TileImage {
	fn default() -> TileImage {
		TileImage::new()
	}
}

impl TileImage {
	/// An image with no tiles and all names zeroed
	pub fn new() -> TileImage {
		TileImage {
			table: Default::default(),
			names: [vec![0; TABLE_TILES], vec![0; TABLE_TILES], vec![0; TABLE_TILES]],
		}
	}

	/// Returns the tile shown at screen cell `cell` of `bank`, if both the name and the tile exist
	pub fn tile_at(&self, bank: usize, cell: usize) -> Option<&Tile> {
		let name = *self.names.get(bank)?.get(cell)?;
		self.table[bank].get(name as usize)
	}

	/// Palette index of the pixel at (X, Y)
	pub fn palette_index(&self, x: usize, y: usize) -> usize {
		let bank = y / BANK_HEIGHT;
		let cell = ((y % BANK_HEIGHT) / TILE_SIZE) * ROW_TILES + x / TILE_SIZE;

		match self.tile_at(bank, cell) {
			Some(tile) => tile[y % TILE_SIZE].pixel(x),
			None => Pattern::default().pixel(x),
		}
	}

	/// Renders the image into a 256x192 indexed texture using the Screen 2 palette
	pub fn to_texture(&self) -> Texture {
		let mut texture = Texture::new(WIDTH, HEIGHT);
		texture.palette = palette();
		texture.indices = Vec::with_capacity(WIDTH * HEIGHT);

		for y in 0..HEIGHT {
			for x in 0..WIDTH {
				texture.indices.push(self.palette_index(x, y));
			}
		}

		texture
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_layout() {
		assert_eq!(MIN_FILE_LENGTH, 14343);
		assert_eq!(MIN_FILE_LENGTH, SIGNATURE.len() + ADDR_END);
		assert_eq!(RESERVED_SIZE, 1280);
		assert_eq!(ADDR_NAME_TABLE, ADDR_PATTERN_GENERATOR + BANKS * TABLE_PATTERNS);
		assert_eq!(ADDR_SPRITE_ATTRS, ADDR_NAME_TABLE + BANKS * TABLE_TILES);
	}

	#[test]
	fn test_classify() {
		assert_eq!(classify(&Color::from_rgb888(0x000000)), BLACK);
		assert_eq!(classify(&Color::from_rgb888(0xFFFFFF)), 15);
		assert_eq!(classify(&Color::from_rgb888(0xFD5655)), 8);
		assert_eq!(classify(&Color::TRANSPARENT), TRANSPARENT);

		let pal = palette();
		for i in BLACK..pal.len() {
			assert_eq!(classify(&pal[i]), i);
		}
	}

	#[test]
	fn test_pattern_pixel() {
		let p = Pattern {
			bitmap: 0b1000_0001,
			color: 0xF4,
		};

		assert_eq!(p.pixel(0), 15);
		assert_eq!(p.pixel(1), 4);
		assert_eq!(p.pixel(7), 15);
	}

	#[test]
	fn test_to_texture() {
		let mut img = TileImage::new();
		let mut tile = [Pattern::default(); TILE_PATTERNS];
		tile[2] = Pattern {
			bitmap: 0xF0,
			color: 0x21,
		};
		img.table[1].push([Pattern::default(); TILE_PATTERNS]);
		img.table[1].push(tile);
		img.names[1][ROW_TILES + 3] = 1;

		let tex = img.to_texture();
		assert_eq!((tex.width, tex.height), (WIDTH, HEIGHT));
		assert_eq!(tex.palette.len(), 16);

		// bank 1, second tile row, fourth tile column, pattern row 2
		let y = BANK_HEIGHT + TILE_SIZE + 2;
		let x = 3 * TILE_SIZE;
		assert_eq!(tex.indices[y * WIDTH + x], 2);
		assert_eq!(tex.indices[y * WIDTH + x + 4], BLACK);
		assert_eq!(tex.indices[0], TRANSPARENT);

		// bank 0 names point at tiles that do not exist
		assert!(img.tile_at(0, 0).is_none());
		assert!(img.tile_at(1, 0).is_some());
	}
}
