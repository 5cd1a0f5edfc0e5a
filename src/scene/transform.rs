use crate::foundation::core::Affine;
use crate::foundation::error::{SkyscrollError, SkyscrollResult};

/// Parse an SVG `transform` attribute into a single affine (functions compose left to right).
pub fn parse_transform(s: &str) -> SkyscrollResult<Affine> {
    let mut out = Affine::IDENTITY;
    let mut rest = s.trim();
    while !rest.is_empty() {
        let open = rest
            .find('(')
            .ok_or_else(|| SkyscrollError::parse(format!("invalid transform \"{s}\"")))?;
        let close = rest[open..]
            .find(')')
            .map(|i| i + open)
            .ok_or_else(|| SkyscrollError::parse(format!("unclosed transform \"{s}\"")))?;
        let name = rest[..open].trim().trim_start_matches(',').trim();
        let args = parse_numbers(&rest[open + 1..close])?;
        out = out * transform_fn(name, &args)?;
        rest = rest[close + 1..].trim_start_matches([',', ' ', '\t', '\n']);
    }
    Ok(out)
}

/// Parse a whitespace/comma separated number list (`points`, transform arguments).
pub fn parse_numbers(s: &str) -> SkyscrollResult<Vec<f64>> {
    s.split([',', ' ', '\t', '\n'])
        .filter(|t| !t.is_empty())
        .map(|t| {
            t.parse::<f64>()
                .map_err(|_| SkyscrollError::parse(format!("invalid number \"{t}\"")))
        })
        .collect()
}

fn transform_fn(name: &str, args: &[f64]) -> SkyscrollResult<Affine> {
    let arity = |ok: &[usize]| -> SkyscrollResult<()> {
        if ok.contains(&args.len()) {
            Ok(())
        } else {
            Err(SkyscrollError::parse(format!(
                "{name}() takes {ok:?} arguments, got {}",
                args.len()
            )))
        }
    };

    match name {
        "translate" => {
            arity(&[1, 2])?;
            Ok(Affine::translate((args[0], args.get(1).copied().unwrap_or(0.0))))
        }
        "scale" => {
            arity(&[1, 2])?;
            Ok(Affine::scale_non_uniform(
                args[0],
                args.get(1).copied().unwrap_or(args[0]),
            ))
        }
        "rotate" => {
            arity(&[1, 3])?;
            let r = Affine::rotate(args[0].to_radians());
            if args.len() == 3 {
                Ok(Affine::translate((args[1], args[2]))
                    * r
                    * Affine::translate((-args[1], -args[2])))
            } else {
                Ok(r)
            }
        }
        "skewX" => {
            arity(&[1])?;
            Ok(Affine::new([1.0, 0.0, args[0].to_radians().tan(), 1.0, 0.0, 0.0]))
        }
        "skewY" => {
            arity(&[1])?;
            Ok(Affine::new([1.0, args[0].to_radians().tan(), 0.0, 1.0, 0.0, 0.0]))
        }
        "matrix" => {
            arity(&[6])?;
            Ok(Affine::new([args[0], args[1], args[2], args[3], args[4], args[5]]))
        }
        other => Err(SkyscrollError::parse(format!(
            "unsupported transform function \"{other}\""
        ))),
    }
}

/// Split `a` into its translation and the remaining linear part, so that
/// `a == translate(tx, ty) * linear`.
pub fn split_translation(a: Affine) -> ((f64, f64), Affine) {
    let [xx, yx, xy, yy, tx, ty] = a.as_coeffs();
    ((tx, ty), Affine::new([xx, yx, xy, yy, 0.0, 0.0]))
}
