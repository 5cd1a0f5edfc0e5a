use crate::foundation::error::{SkyscrollError, SkyscrollResult};
use serde::{Deserialize, Serialize};

/// Straight-alpha color with normalized `0..=1` components.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rgba {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Rgba {
    pub const fn rgba(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// Parse a CSS color: `#rgb`, `#rrggbb`, `#rrggbbaa`, `rgb()`, `rgba()`, `hsl()`, `hsla()`,
    /// or one of `white`, `black`, `transparent`.
    pub fn parse(s: &str) -> SkyscrollResult<Self> {
        let s = s.trim();
        if let Some(hex) = s.strip_prefix('#') {
            return parse_hex(hex);
        }
        let lower = s.to_ascii_lowercase();
        match lower.as_str() {
            "white" => return Ok(Self::rgba(1.0, 1.0, 1.0, 1.0)),
            "black" => return Ok(Self::rgba(0.0, 0.0, 0.0, 1.0)),
            "transparent" => return Ok(Self::rgba(0.0, 0.0, 0.0, 0.0)),
            _ => {}
        }

        let (func, args) = split_func(&lower)
            .ok_or_else(|| SkyscrollError::parse(format!("unrecognized color \"{s}\"")))?;
        match func {
            "rgb" | "rgba" => {
                let [r, g, b, a] = four_args(&args, s)?;
                Ok(Self::rgba(
                    channel_255(r, s)?,
                    channel_255(g, s)?,
                    channel_255(b, s)?,
                    a.map(|a| unit(Some(a), s)).transpose()?.unwrap_or(1.0),
                ))
            }
            "hsl" | "hsla" => {
                let [h, sat, l, a] = four_args(&args, s)?;
                let h = number(h, s)?;
                Ok(hsla_to_rgba(
                    h,
                    unit(sat, s)?,
                    unit(l, s)?,
                    a.map(|a| unit(Some(a), s)).transpose()?.unwrap_or(1.0),
                ))
            }
            _ => Err(SkyscrollError::parse(format!(
                "unsupported color function \"{func}\""
            ))),
        }
    }

    /// 8-bit straight-alpha channels.
    pub fn to_rgba8(self) -> [u8; 4] {
        fn to_u8(x: f64) -> u8 {
            (x.clamp(0.0, 1.0) * 255.0).round() as u8
        }

        [to_u8(self.r), to_u8(self.g), to_u8(self.b), to_u8(self.a)]
    }

    /// Serialize as `#rrggbb` when opaque, `rgba(...)` otherwise.
    pub fn to_css(self) -> String {
        let [r, g, b, _] = self.to_rgba8();
        if self.a >= 1.0 {
            format!("#{r:02x}{g:02x}{b:02x}")
        } else {
            format!(
                "rgba({r}, {g}, {b}, {})",
                crate::foundation::core::fmt_num(self.a.clamp(0.0, 1.0))
            )
        }
    }
}

impl std::str::FromStr for Rgba {
    type Err = SkyscrollError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl<'de> Deserialize<'de> for Rgba {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

fn parse_hex(s: &str) -> SkyscrollResult<Rgba> {
    fn hex_byte(pair: &str) -> SkyscrollResult<u8> {
        u8::from_str_radix(pair, 16)
            .map_err(|_| SkyscrollError::parse(format!("invalid hex byte \"{pair}\"")))
    }

    if !s.is_ascii() {
        return Err(SkyscrollError::parse("hex color must be ASCII"));
    }

    let (r, g, b, a) = match s.len() {
        3 => {
            let r = hex_byte(&s[0..1].repeat(2))?;
            let g = hex_byte(&s[1..2].repeat(2))?;
            let b = hex_byte(&s[2..3].repeat(2))?;
            (r, g, b, 255)
        }
        6 => (
            hex_byte(&s[0..2])?,
            hex_byte(&s[2..4])?,
            hex_byte(&s[4..6])?,
            255,
        ),
        8 => (
            hex_byte(&s[0..2])?,
            hex_byte(&s[2..4])?,
            hex_byte(&s[4..6])?,
            hex_byte(&s[6..8])?,
        ),
        _ => {
            return Err(SkyscrollError::parse(
                "hex color must be #RGB, #RRGGBB or #RRGGBBAA",
            ));
        }
    };

    Ok(Rgba::rgba(
        f64::from(r) / 255.0,
        f64::from(g) / 255.0,
        f64::from(b) / 255.0,
        f64::from(a) / 255.0,
    ))
}

fn split_func(s: &str) -> Option<(&str, Vec<&str>)> {
    let open = s.find('(')?;
    let inner = s[open + 1..].strip_suffix(')')?;
    let args = inner
        .split([',', ' ', '/'])
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .collect();
    Some((s[..open].trim(), args))
}

fn four_args<'a>(args: &[&'a str], src: &str) -> SkyscrollResult<[Option<&'a str>; 4]> {
    match args.len() {
        3 => Ok([Some(args[0]), Some(args[1]), Some(args[2]), None]),
        4 => Ok([Some(args[0]), Some(args[1]), Some(args[2]), Some(args[3])]),
        _ => Err(SkyscrollError::parse(format!(
            "color \"{src}\" needs 3 or 4 components"
        ))),
    }
}

fn number(arg: Option<&str>, src: &str) -> SkyscrollResult<f64> {
    let arg = arg.ok_or_else(|| SkyscrollError::parse(format!("color \"{src}\" is incomplete")))?;
    let trimmed = arg.trim_end_matches("deg");
    trimmed
        .parse::<f64>()
        .map_err(|_| SkyscrollError::parse(format!("invalid color component \"{arg}\"")))
}

fn channel_255(arg: Option<&str>, src: &str) -> SkyscrollResult<f64> {
    match arg.and_then(|a| a.strip_suffix('%')) {
        Some(pct) => Ok(number(Some(pct), src)? / 100.0),
        None => Ok((number(arg, src)? / 255.0).clamp(0.0, 1.0)),
    }
}

fn unit(arg: Option<&str>, src: &str) -> SkyscrollResult<f64> {
    match arg.and_then(|a| a.strip_suffix('%')) {
        Some(pct) => Ok((number(Some(pct), src)? / 100.0).clamp(0.0, 1.0)),
        None => Ok(number(arg, src)?.clamp(0.0, 1.0)),
    }
}

fn hsla_to_rgba(h: f64, s: f64, l: f64, a: f64) -> Rgba {
    let h = (h % 360.0 + 360.0) % 360.0 / 360.0;
    let s = s.clamp(0.0, 1.0);
    let l = l.clamp(0.0, 1.0);

    if s == 0.0 {
        return Rgba::rgba(l, l, l, a);
    }

    fn hue_to_rgb(p: f64, q: f64, mut t: f64) -> f64 {
        if t < 0.0 {
            t += 1.0;
        }
        if t > 1.0 {
            t -= 1.0;
        }
        if t < 1.0 / 6.0 {
            return p + (q - p) * 6.0 * t;
        }
        if t < 1.0 / 2.0 {
            return q;
        }
        if t < 2.0 / 3.0 {
            return p + (q - p) * (2.0 / 3.0 - t) * 6.0;
        }
        p
    }

    let q = if l < 0.5 {
        l * (1.0 + s)
    } else {
        l + s - l * s
    };
    let p = 2.0 * l - q;

    Rgba::rgba(
        hue_to_rgb(p, q, h + 1.0 / 3.0),
        hue_to_rgb(p, q, h),
        hue_to_rgb(p, q, h - 1.0 / 3.0),
        a,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn parses_hex_forms() {
        assert_eq!(Rgba::parse("#ff0000").unwrap(), Rgba::rgba(1.0, 0.0, 0.0, 1.0));
        assert_eq!(Rgba::parse("#fff").unwrap(), Rgba::rgba(1.0, 1.0, 1.0, 1.0));

        let c = Rgba::parse("#0000ff80").unwrap();
        assert!(close(c.b, 1.0));
        assert!(close(c.a, 128.0 / 255.0));

        assert!(Rgba::parse("#12345").is_err());
        assert!(Rgba::parse("#gg0000").is_err());
    }

    #[test]
    fn parses_functional_forms() {
        let c = Rgba::parse("rgb(255, 0, 0)").unwrap();
        assert_eq!(c, Rgba::rgba(1.0, 0.0, 0.0, 1.0));

        let c = Rgba::parse("rgba(0, 0, 255, 0.5)").unwrap();
        assert!(close(c.a, 0.5));

        // Pure red.
        let c = Rgba::parse("hsla(0, 100%, 50%, 1)").unwrap();
        assert!(close(c.r, 1.0) && close(c.g, 0.0) && close(c.b, 0.0));

        assert!(Rgba::parse("cmyk(1, 2, 3, 4)").is_err());
        assert!(Rgba::parse("rgb(1, 2)").is_err());
    }

    #[test]
    fn alpha_component_is_optional_and_accepts_percent() {
        let c = Rgba::parse("hsla(240, 33%, 17%, 1)").unwrap();
        assert!(close(c.a, 1.0));
        assert!(c.b > c.r && c.b > c.g);

        let c = Rgba::parse("hsl(0, 0%, 50%)").unwrap();
        assert!(close(c.r, 0.5) && close(c.a, 1.0));

        let c = Rgba::parse("rgba(10, 20, 30, 40%)").unwrap();
        assert!(close(c.a, 0.4));
        assert!(Rgba::parse("rgba(10, 20, 30, x)").is_err());
    }

    #[test]
    fn css_output_round_trips_opaque_hex() {
        assert_eq!(Rgba::parse("#FF9171").unwrap().to_css(), "#ff9171");
        assert_eq!(
            Rgba::rgba(1.0, 1.0, 1.0, 0.5).to_css(),
            "rgba(255, 255, 255, 0.5)"
        );
    }
}
