//! Binary PPM (`P6`) texture loading
use std::fs;
use std::path::Path;

use nalgebra::Vector2;
use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{char, digit1, multispace1, not_line_ending},
    combinator::{map_res, value},
    multi::many0_count,
    sequence::{pair, preceded},
    IResult,
};

use crate::error::{LoadError, Result};

/// RGB8 image with row 0 at the bottom
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Texture {
    width: u32,
    height: u32,
    pixels: Vec<[u8; 3]>,
    placeholder: bool,
}

impl Texture {
    /// 1x1 white image standing in for "no texture"
    pub fn placeholder() -> Self {
        Self {
            width: 1,
            height: 1,
            pixels: vec![[255, 255, 255]],
            placeholder: true,
        }
    }

    /// True only for [`Texture::placeholder`], never for a decoded file
    pub fn is_placeholder(&self) -> bool {
        self.placeholder
    }

    /// Load a PPM file. An empty path gives the placeholder.
    pub fn load(path: &Path) -> Result<Self> {
        if path.as_os_str().is_empty() {
            return Ok(Self::placeholder());
        }
        let data = fs::read(path).map_err(|e| LoadError::not_found(path, e))?;
        log::info!("Loading texture: {}", path.display());
        Self::parse(&data, path)
    }

    /// Decode PPM bytes. `path` is only used in error reports.
    pub fn parse(data: &[u8], path: &Path) -> Result<Self> {
        if !data.starts_with(b"P6") {
            return Err(LoadError::header(path, "missing P6 magic"));
        }

        let (payload, (width, height, max_value)) =
            header(data).map_err(|_| LoadError::header(path, "unreadable size or max value"))?;

        if width == 0 || height == 0 {
            return Err(LoadError::header(path, format!("empty image {}x{}", width, height)));
        }
        if max_value != 255 {
            return Err(LoadError::header(path, format!("max value {} is not 255", max_value)));
        }

        let (w, h) = (width as usize, height as usize);
        let expected = w
            .checked_mul(h)
            .and_then(|n| n.checked_mul(3))
            .ok_or_else(|| LoadError::header(path, "image size overflows"))?;
        if payload.len() != expected {
            return Err(LoadError::header(
                path,
                format!(
                    "payload is {} bytes but {}x{} needs {}",
                    payload.len(),
                    width,
                    height,
                    expected
                ),
            ));
        }

        // the file stores the top row first
        let mut pixels = vec![[0u8; 3]; w * h];
        for (row, bytes) in payload.chunks_exact(w * 3).enumerate() {
            let y = h - 1 - row;
            for (x, rgb) in bytes.chunks_exact(3).enumerate() {
                pixels[y * w + x] = [rgb[0], rgb[1], rgb[2]];
            }
        }

        Ok(Self {
            width,
            height,
            pixels,
            placeholder: false,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Pixel at column `x`, row `y` counted from the bottom
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    /// Nearest-texel lookup with wrapping; v = 0 is the bottom row
    pub fn sample(&self, uv: &Vector2<f32>) -> [u8; 3] {
        let wrap = |t: f32, n: u32| {
            let t = if t.is_finite() { t - t.floor() } else { 0.0 };
            ((t * n as f32) as u32).min(n - 1)
        };
        let x = wrap(uv.x, self.width);
        let y = wrap(uv.y, self.height);
        self.pixels[y as usize * self.width as usize + x as usize]
    }
}

impl Default for Texture {
    fn default() -> Self {
        Self::placeholder()
    }
}

/// Whitespace and `#` comments between header fields
fn separator(input: &[u8]) -> IResult<&[u8], usize> {
    many0_count(alt((
        value((), multispace1),
        value((), pair(char('#'), not_line_ending)),
    )))(input)
}

fn decimal(input: &[u8]) -> IResult<&[u8], u32> {
    map_res(
        map_res(digit1, std::str::from_utf8),
        |digits: &str| digits.parse::<u32>(),
    )(input)
}

/// Magic, width, height, max value and the single newline before the data
fn header(input: &[u8]) -> IResult<&[u8], (u32, u32, u32)> {
    let (input, _) = tag("P6")(input)?;
    let (input, width) = preceded(separator, decimal)(input)?;
    let (input, height) = preceded(separator, decimal)(input)?;
    let (input, max_value) = preceded(separator, decimal)(input)?;
    let (input, _) = char('\n')(input)?;
    Ok((input, (width, height, max_value)))
}
