#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
	pub red: f32,
	pub green: f32,
	pub blue: f32,
	pub alpha: f32,
}

impl Color {
	pub const TRANSPARENT: Color = Color {
		red: 0.0,
		green: 0.0,
		blue: 0.0,
		alpha: 0.0,
	};

	/// Builds an opaque color from a `0xRRGGBB` value
	pub fn from_rgb888(color: u32) -> Color {
		Color {
			red: (((color >> 16) & 0xFF) as f32) / 255.0,
			green: (((color >> 8) & 0xFF) as f32) / 255.0,
			blue: ((color & 0xFF) as f32) / 255.0,
			alpha: 1.0,
		}
	}

	pub fn to_rgb888(&self) -> u32 {
		((self.red * 255.0).round() as u32) << 16 | ((self.green * 255.0).round() as u32) << 8 |
			(self.blue * 255.0).round() as u32
	}

	/// Squared euclidean distance between the RGB components, alpha is ignored
	pub fn distance_sq(&self, other: &Color) -> f32 {
		let r = self.red - other.red;
		let g = self.green - other.green;
		let b = self.blue - other.blue;

		r * r + g * g + b * b
	}

	/// Returns a textual hex representation in the form of `#rrggbb`
	pub fn hex_rgb(&self) -> String {
		let r = (self.red * 255.0).round() as u8;
		let g = (self.green * 255.0).round() as u8;
		let b = (self.blue * 255.0).round() as u8;

		format!("#{:02x}{:02x}{:02x}", r, g, b)
	}
}

#[derive(Clone, Debug)]
pub struct Texture {
	pub palette: Vec<Color>,
	pub indices: Vec<usize>,
	pub width: usize,
	pub height: usize,
}

impl Texture {
	pub fn new(width: usize, height: usize) -> Texture {
		Texture {
			palette: vec![],
			indices: vec![],
			width: width,
			height: height,
		}
	}

	/// Builds an indexed texture out of direct color values, one per pixel in row-major order
	pub fn from_pixels(width: usize, height: usize, pixels: &[Color]) -> Texture {
		let mut texture = Texture::new(width, height);

		for c in pixels.iter() {
			if let Some(i) = find_palette_index(&texture.palette, c) {
				texture.indices.push(i);
			} else {
				let i = texture.palette.len();
				texture.palette.push(*c);
				texture.indices.push(i);
			}
		}

		texture
	}

	/// Returns the color at (X, Y), or `None` when out of bounds
	pub fn pixel(&self, x: usize, y: usize) -> Option<Color> {
		if x >= self.width || y >= self.height {
			return None;
		}

		self.indices
			.get((y * self.width) + x)
			.and_then(|i| self.palette.get(*i))
			.copied()
	}

	/// Uses the palette and indices to build a pixel array
	pub fn pixels(&self) -> Vec<Color> {
		self.indices.iter().map(|i| self.palette[*i]).collect()
	}
}

/// Returns the index of the specified color, if present
pub fn find_palette_index<'a, 'b>(palette: &'a [Color], color: &'b Color) -> Option<usize> {
	for i in 0..palette.len() {
		if *color == palette[i] {
			return Some(i);
		}
	}

	None
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_rgb888() {
		let c = Color::from_rgb888(0x21C842);
		assert_eq!(c.to_rgb888(), 0x21C842);
		assert_eq!(c.hex_rgb(), "#21c842");
		assert_eq!(c.alpha, 1.0);
	}

	#[test]
	fn test_from_pixels() {
		let red = Color::from_rgb888(0xFF0000);
		let blue = Color::from_rgb888(0x0000FF);
		let tex = Texture::from_pixels(2, 2, &[red, blue, blue, red]);

		assert_eq!(tex.palette.len(), 2);
		assert_eq!(tex.indices, vec![0, 1, 1, 0]);
		assert_eq!(tex.pixel(1, 0), Some(blue));
		assert_eq!(tex.pixel(2, 0), None);
		assert_eq!(tex.pixels(), vec![red, blue, blue, red]);
	}

	#[test]
	fn test_distance() {
		let black = Color::from_rgb888(0);
		let white = Color::from_rgb888(0xFFFFFF);
		assert_eq!(black.distance_sq(&black), 0.0);
		assert_eq!(black.distance_sq(&white), 3.0);
	}
}
