//! Whitespace token helpers shared by the OBJ and MTL parsers
use std::path::Path;
use std::str::SplitWhitespace;

use nalgebra::{Vector2, Vector3};
use nom::{
    character::complete::{char, digit1},
    combinator::{all_consuming, map_res, opt},
    number::complete::float,
    sequence::preceded,
    IResult,
};

use crate::error::{LoadError, Result};

/// One face corner, 0-based
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FaceCorner {
    pub position: usize,
    pub uv: Option<usize>,
    pub normal: Option<usize>,
}

/// The tokens following a keyword on one line, with enough context to
/// report which token failed
pub(crate) struct LineTokens<'a> {
    path: &'a Path,
    line: usize,
    keyword: &'a str,
    rest: SplitWhitespace<'a>,
}

impl<'a> LineTokens<'a> {
    pub(crate) fn new(path: &'a Path, line: usize, keyword: &'a str, rest: SplitWhitespace<'a>) -> Self {
        Self {
            path,
            line,
            keyword,
            rest,
        }
    }

    pub(crate) fn error(&self, token: impl Into<String>) -> LoadError {
        LoadError::parse(self.path, self.line, token)
    }

    fn missing(&self) -> LoadError {
        self.error(format!("{} (missing value)", self.keyword))
    }

    pub(crate) fn next_token(&mut self) -> Option<&'a str> {
        self.rest.next()
    }

    pub(crate) fn remaining(&mut self) -> Vec<&'a str> {
        self.rest.by_ref().collect()
    }

    pub(crate) fn next_float(&mut self) -> Result<f32> {
        let token = self.rest.next().ok_or_else(|| self.missing())?;
        parse_float(token).ok_or_else(|| self.error(token))
    }

    pub(crate) fn vector2(&mut self) -> Result<Vector2<f32>> {
        Ok(Vector2::new(self.next_float()?, self.next_float()?))
    }

    pub(crate) fn vector3(&mut self) -> Result<Vector3<f32>> {
        Ok(Vector3::new(
            self.next_float()?,
            self.next_float()?,
            self.next_float()?,
        ))
    }

    /// Exactly three face corners, converted to 0-based
    pub(crate) fn triangle(&mut self) -> Result<[FaceCorner; 3]> {
        let mut corners = [FaceCorner::default(); 3];
        for corner in &mut corners {
            let token = self.rest.next().ok_or_else(|| self.missing())?;
            *corner = parse_corner(token).ok_or_else(|| self.error(token))?;
        }

        // polygons are not triangulated
        if let Some(extra) = self.rest.next() {
            return Err(self.error(extra));
        }

        Ok(corners)
    }
}

/// A complete float token such as `1`, `-0.5` or `2.5e-3`
pub(crate) fn parse_float(token: &str) -> Option<f32> {
    let parsed: IResult<&str, f32> = all_consuming(float)(token);
    parsed.ok().map(|(_, value)| value)
}

fn index(input: &str) -> IResult<&str, usize> {
    map_res(digit1, |digits: &str| digits.parse::<usize>())(input)
}

/// `pos`, `pos/uv`, `pos/uv/normal` or `pos//normal`, 1-based as written
fn corner(input: &str) -> IResult<&str, (usize, Option<usize>, Option<usize>)> {
    let (input, position) = index(input)?;
    let (input, uv) = opt(preceded(char('/'), opt(index)))(input)?;
    let (input, normal) = match uv {
        Some(_) => opt(preceded(char('/'), index))(input)?,
        None => (input, None),
    };
    Ok((input, (position, uv.flatten(), normal)))
}

pub(crate) fn parse_corner(token: &str) -> Option<FaceCorner> {
    let (_, (position, uv, normal)) = all_consuming(corner)(token).ok()?;

    // 0 is not a valid 1-based index
    let zero_based = |i: usize| i.checked_sub(1);
    Some(FaceCorner {
        position: zero_based(position)?,
        uv: match uv {
            Some(i) => Some(zero_based(i)?),
            None => None,
        },
        normal: match normal {
            Some(i) => Some(zero_based(i)?),
            None => None,
        },
    })
}
