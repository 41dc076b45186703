/// Line tokenizer shared by the OBJ and MTL parsers
use nom::{
    bytes::complete::take_while,
    character::complete::{i64 as integer, multispace0},
    number::complete::float,
    sequence::{preceded, terminated},
    IResult,
};

/// One non-empty, non-comment line split into its keyword and arguments
#[derive(Debug, Clone, PartialEq)]
pub struct Directive<'a> {
    /// 1-based line number
    pub line: usize,
    pub keyword: &'a str,
    /// Everything after the keyword and the spaces that follow it
    pub unparsed: &'a str,
    /// Whitespace-separated tokens after the keyword
    pub parts: Vec<&'a str>,
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn keyword(input: &str) -> IResult<&str, &str> {
    terminated(take_while(is_word_char), take_while(|c| c == ' '))(input)
}

/// Iterate over the directives of a line-oriented text document.
pub fn directives(text: &str) -> impl Iterator<Item = Directive<'_>> {
    text.split('\n').enumerate().filter_map(|(index, raw)| {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }

        let (unparsed, keyword) = keyword(line).unwrap_or((line, ""));
        let parts = line.split_whitespace().skip(1).collect();

        Some(Directive {
            line: index + 1,
            keyword,
            unparsed,
            parts,
        })
    })
}

/// Read the longest leading float of a token, NaN when there is none.
pub fn leading_float(token: &str) -> f32 {
    let parsed: IResult<&str, f32> = preceded(multispace0, float)(token);
    parsed.map(|(_, value)| value).unwrap_or(f32::NAN)
}

/// Read the longest leading integer of a token.
pub fn leading_int(token: &str) -> Option<i64> {
    let parsed: IResult<&str, i64> = preceded(multispace0, integer)(token);
    parsed.ok().map(|(_, value)| value)
}

/// Read a fixed number of floats from the parts, padding with NaN.
pub fn floats<const N: usize>(parts: &[&str]) -> [f32; N] {
    let mut out = [f32::NAN; N];
    for (slot, token) in out.iter_mut().zip(parts) {
        *slot = leading_float(token);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skips_blank_and_comment_lines() {
        let text = "# header\n\n   \nv 1 2 3\n  # indented comment\n";
        let lines: Vec<_> = directives(text).collect();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].line, 4);
        assert_eq!(lines[0].keyword, "v");
        assert_eq!(lines[0].parts, vec!["1", "2", "3"]);
    }

    #[test]
    fn test_unparsed_keeps_inner_spacing() {
        let line = directives("mtllib my  materials.mtl\r").next().unwrap();
        assert_eq!(line.keyword, "mtllib");
        assert_eq!(line.unparsed, "my  materials.mtl");
        assert_eq!(line.parts, vec!["my", "materials.mtl"]);
    }

    #[test]
    fn test_keyword_with_underscore() {
        let line = directives("map_Kd textures/wall.png").next().unwrap();
        assert_eq!(line.keyword, "map_Kd");
        assert_eq!(line.unparsed, "textures/wall.png");
    }

    #[test]
    fn test_leading_float() {
        assert_eq!(leading_float("1.5"), 1.5);
        assert_eq!(leading_float("-2e1"), -20.0);
        assert_eq!(leading_float("1.5abc"), 1.5);
        assert!(leading_float("abc").is_nan());
    }

    #[test]
    fn test_leading_int() {
        assert_eq!(leading_int("12"), Some(12));
        assert_eq!(leading_int("-3"), Some(-3));
        assert_eq!(leading_int("7x"), Some(7));
        assert_eq!(leading_int("x7"), None);
        assert_eq!(leading_int(""), None);
    }

    #[test]
    fn test_floats_pads_with_nan() {
        let values: [f32; 3] = floats(&["1", "2"]);
        assert_eq!(values[0], 1.0);
        assert_eq!(values[1], 2.0);
        assert!(values[2].is_nan());
    }
}
