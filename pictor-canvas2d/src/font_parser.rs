//! CSS font string parsing for Canvas 2D.
//!
//! Parses CSS font strings like "12px Arial" or "bold italic 14pt 'Times
//! New Roman'" into components usable with cosmic-text.

use crate::error::{CanvasError, CanvasResult};
use crate::style::{FontStretch, FontVariantCaps};
use cosmic_text::{Style, Weight};

/// Parsed font specification from a CSS font string.
#[derive(Debug, Clone)]
pub struct ParsedFont {
    /// Font style (normal, italic, oblique).
    pub style: Style,
    /// Font weight (100-900 or keywords like bold).
    pub weight: Weight,
    /// Font stretch (width) keyword.
    pub stretch: FontStretch,
    /// Font variant caps (only small-caps can appear in the shorthand).
    pub variant_caps: FontVariantCaps,
    /// Font size in pixels.
    pub size_px: f32,
    /// Font families in order of preference.
    pub families: Vec<String>,
}

impl Default for ParsedFont {
    fn default() -> Self {
        Self {
            style: Style::Normal,
            weight: Weight::NORMAL,
            stretch: FontStretch::Normal,
            variant_caps: FontVariantCaps::Normal,
            size_px: 10.0,
            families: vec!["sans-serif".to_string()],
        }
    }
}

/// Parse a CSS font string into components.
///
/// Supports format: `[style] [variant] [weight] [stretch] size[/line-height] family[, family]*`
///
/// Examples:
/// - "12px Arial"
/// - "bold 14px sans-serif"
/// - "italic bold 12pt 'Times New Roman', serif"
/// - "condensed 700 16px/20px Helvetica"
pub fn parse_font(font_str: &str) -> CanvasResult<ParsedFont> {
    let font_str = font_str.trim();
    if font_str.is_empty() {
        return Ok(ParsedFont::default());
    }

    let mut result = ParsedFont::default();
    let mut remaining = font_str;

    // Parse optional style, variant, weight, and stretch (in any order)
    loop {
        let trimmed = remaining.trim_start();
        if trimmed.is_empty() {
            break;
        }

        let Some((word, rest)) = take_word(trimmed) else {
            break;
        };

        match word {
            "italic" => {
                result.style = Style::Italic;
                remaining = rest;
                continue;
            }
            "oblique" => {
                result.style = Style::Oblique;
                remaining = rest;
                continue;
            }
            // normal can be style, variant, weight, or stretch - just
            // consume it
            "normal" => {
                remaining = rest;
                continue;
            }
            "small-caps" => {
                result.variant_caps = FontVariantCaps::SmallCaps;
                remaining = rest;
                continue;
            }
            "bold" => {
                result.weight = Weight::BOLD;
                remaining = rest;
                continue;
            }
            "bolder" => {
                result.weight = Weight::EXTRA_BOLD;
                remaining = rest;
                continue;
            }
            "lighter" => {
                result.weight = Weight::LIGHT;
                remaining = rest;
                continue;
            }
            _ => {}
        }

        if let Some(stretch) = FontStretch::parse(word) {
            result.stretch = stretch;
            remaining = rest;
            continue;
        }

        if let Some(weight) = parse_numeric_weight(word) {
            result.weight = weight;
            remaining = rest;
            continue;
        }

        // No more style/weight to parse
        break;
    }

    // Parse required size
    remaining = remaining.trim_start();
    let (size, rest) = parse_font_size(remaining)?;
    result.size_px = size;
    remaining = rest;

    // Skip optional line-height
    remaining = remaining.trim_start();
    if let Some(rest) = remaining.strip_prefix('/') {
        remaining = skip_line_height(rest);
    }

    // Parse font families
    remaining = remaining.trim_start();
    if !remaining.is_empty() {
        result.families = parse_font_families(remaining);
    }

    Ok(result)
}

/// Split the leading whitespace-delimited word off a string.
fn take_word(s: &str) -> Option<(&str, &str)> {
    let end = s
        .char_indices()
        .find(|(_, c)| c.is_whitespace())
        .map(|(i, _)| i)
        .unwrap_or(s.len());
    if end == 0 {
        None
    } else {
        Some((&s[..end], &s[end..]))
    }
}

/// Parse a numeric weight word (100-900 in steps of 100).
fn parse_numeric_weight(word: &str) -> Option<Weight> {
    if !word.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let weight: u16 = word.parse().ok()?;
    if !(100..=900).contains(&weight) || weight % 100 != 0 {
        return None;
    }
    Some(Weight(weight))
}

/// Parse font size from string.
fn parse_font_size(s: &str) -> CanvasResult<(f32, &str)> {
    // Find the numeric part
    let num_end = s
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit() && *c != '.')
        .map(|(i, _)| i)
        .unwrap_or(s.len());

    if num_end == 0 {
        return Err(CanvasError::FontParseError(format!(
            "Expected font size, got: {}",
            s
        )));
    }

    let num_str = &s[..num_end];
    let rest = &s[num_end..];

    let size: f32 = num_str
        .parse()
        .map_err(|_| CanvasError::FontParseError(format!("Invalid font size number: {}", num_str)))?;

    // Parse unit
    let (multiplier, unit_len) = if rest.starts_with("px") {
        (1.0, 2)
    } else if rest.starts_with("pt") {
        (4.0 / 3.0, 2) // 1pt = 4/3 px
    } else if rest.starts_with("rem") {
        (16.0, 3)
    } else if rest.starts_with("em") {
        (16.0, 2) // Assume 1em = 16px
    } else if rest.starts_with('%') {
        (16.0 / 100.0, 1) // Percentage of default 16px
    } else {
        // Assume pixels if no unit
        (1.0, 0)
    };

    Ok((size * multiplier, &rest[unit_len..]))
}

/// Skip line-height specification after '/'.
fn skip_line_height(s: &str) -> &str {
    let end = s
        .char_indices()
        .find(|(_, c)| c.is_whitespace())
        .map(|(i, _)| i)
        .unwrap_or(s.len());
    &s[end..]
}

/// Parse font family list.
fn parse_font_families(s: &str) -> Vec<String> {
    let mut families = Vec::new();
    let mut remaining = s.trim();

    while !remaining.is_empty() {
        let (family, rest) = parse_single_family(remaining);
        if !family.is_empty() {
            families.push(family);
        }
        remaining = rest.trim_start();
        if let Some(rest) = remaining.strip_prefix(',') {
            remaining = rest.trim_start();
        } else {
            break;
        }
    }

    if families.is_empty() {
        families.push("sans-serif".to_string());
    }

    families
}

/// Parse a single font family name.
fn parse_single_family(s: &str) -> (String, &str) {
    let s = s.trim_start();

    // Check for quoted family name
    if s.starts_with('"') || s.starts_with('\'') {
        let quote = s.chars().next().expect("non-empty");
        let end = s[1..].find(quote).map(|i| i + 1).unwrap_or(s.len() - 1);
        let family = s[1..end].to_string();
        let rest = if end + 1 < s.len() { &s[end + 1..] } else { "" };
        return (family, rest);
    }

    // Unquoted family name - ends at comma or end of string
    let end = s.find(',').unwrap_or(s.len());
    let family = s[..end].trim().to_string();
    let rest = &s[end..];
    (family, rest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_font() {
        let font = parse_font("12px Arial").unwrap();
        assert_eq!(font.size_px, 12.0);
        assert_eq!(font.families, vec!["Arial"]);
        assert_eq!(font.weight, Weight::NORMAL);
        assert_eq!(font.style, Style::Normal);
        assert_eq!(font.stretch, FontStretch::Normal);
    }

    #[test]
    fn test_bold_font() {
        let font = parse_font("bold 14px sans-serif").unwrap();
        assert_eq!(font.size_px, 14.0);
        assert_eq!(font.weight, Weight::BOLD);
    }

    #[test]
    fn test_italic_font() {
        let font = parse_font("italic 16pt 'Times New Roman'").unwrap();
        assert!((font.size_px - 16.0 * 4.0 / 3.0).abs() < 0.01);
        assert_eq!(font.style, Style::Italic);
        assert_eq!(font.families, vec!["Times New Roman"]);
    }

    #[test]
    fn test_numeric_weight() {
        let font = parse_font("600 12px Helvetica").unwrap();
        assert_eq!(font.weight, Weight(600));
    }

    #[test]
    fn test_stretch_keyword() {
        let font = parse_font("condensed 12px Arial").unwrap();
        assert_eq!(font.stretch, FontStretch::Condensed);

        // Setting font without stretch resets to Normal
        let font = parse_font("12px Arial").unwrap();
        assert_eq!(font.stretch, FontStretch::Normal);
    }

    #[test]
    fn test_small_caps_variant() {
        let font = parse_font("small-caps 12px Arial").unwrap();
        assert_eq!(font.variant_caps, FontVariantCaps::SmallCaps);
    }

    #[test]
    fn test_multiple_families() {
        let font = parse_font("12px Arial, Helvetica, sans-serif").unwrap();
        assert_eq!(font.families, vec!["Arial", "Helvetica", "sans-serif"]);
    }

    #[test]
    fn test_line_height() {
        let font = parse_font("16px/20px Arial").unwrap();
        assert_eq!(font.size_px, 16.0);
        assert_eq!(font.families, vec!["Arial"]);
    }

    #[test]
    fn test_missing_size_is_error() {
        assert!(parse_font("Arial").is_err());
    }
}
