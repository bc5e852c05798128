//! Query tokenizer and value parsers.

use std::str::FromStr;

use super::ParseWarning;
use super::request::Request;

/// Parse a query string into a Request + warnings.
pub(crate) fn parse_query(query: &str) -> (Request, Vec<ParseWarning>) {
    parse_pairs(split_query(query).map(|pair| {
        let (raw_key, raw_value) = split_pair(pair);
        (percent_decode(raw_key), percent_decode(raw_value))
    }))
}

pub(crate) fn parse_pairs<K, V, I>(pairs: I) -> (Request, Vec<ParseWarning>)
where
    K: AsRef<str>,
    V: AsRef<str>,
    I: IntoIterator<Item = (K, V)>,
{
    let mut req = Request::default();
    let mut warnings = Vec::new();
    for (key, value) in pairs {
        let key_lower = key.as_ref().trim().to_ascii_lowercase();
        dispatch_key(&key_lower, value.as_ref(), &mut req, &mut warnings);
    }
    (req, warnings)
}

fn dispatch_key(key: &str, value: &str, req: &mut Request, warnings: &mut Vec<ParseWarning>) {
    let mut w = Field {
        key,
        value,
        warnings,
    };
    match key {
        "bg_color" | "bgcolor" => w.set(&mut req.bg_color, Some(value.to_string()), ""),

        "face_scale" => w.set(&mut req.face_scale, parse_positive(value), "expected a positive number"),
        "brightness" => w.set(&mut req.brightness, parse_factor(value), "expected a non-negative number"),
        "contrast" => w.set(&mut req.contrast, parse_factor(value), "expected a non-negative number"),
        "enhance_quality" => w.set(&mut req.enhance_quality, parse_bool(value), "expected true|false"),

        "crop_x" => w.set(&mut req.crop_x, parse_num(value), "expected an integer"),
        "crop_y" => w.set(&mut req.crop_y, parse_num(value), "expected an integer"),
        "crop_width" => w.set(&mut req.crop_width, parse_num(value), "expected a positive integer"),
        "crop_height" => w.set(&mut req.crop_height, parse_num(value), "expected a positive integer"),
        "crop_rotation" => w.set(&mut req.crop_rotation, parse_finite(value), "expected degrees"),

        "make_a4" => w.set(&mut req.make_a4, parse_bool(value), "expected true|false"),
        "copies" => w.set(&mut req.copies, parse_num(value), "expected a non-negative integer"),
        "margin" => w.set(&mut req.margin, parse_num(value), "expected pixels"),
        "spacing" => w.set(&mut req.spacing, parse_num(value), "expected pixels"),
        "cut_lines" | "add_cut_lines" => w.set(&mut req.cut_lines, parse_bool(value), "expected true|false"),

        _ => w.warnings.push(ParseWarning::KeyNotRecognized {
            key: String::from(key),
            value: String::from(value),
        }),
    }
}

/// One key/value being applied.
struct Field<'a> {
    key: &'a str,
    value: &'a str,
    warnings: &'a mut Vec<ParseWarning>,
}

impl Field<'_> {
    /// Store `parsed`, warning on duplicates (last wins) or on a parse failure.
    fn set<T>(&mut self, field: &mut Option<T>, parsed: Option<T>, reason: &'static str) {
        let Some(v) = parsed else {
            self.warnings.push(ParseWarning::ValueInvalid {
                key: canonical_key(self.key),
                value: String::from(self.value),
                reason,
            });
            return;
        };
        if field.is_some() {
            self.warnings.push(ParseWarning::DuplicateKey {
                key: String::from(self.key),
                value: String::from(self.value),
            });
        }
        *field = Some(v);
    }
}

fn parse_num<T: FromStr>(s: &str) -> Option<T> {
    s.trim().parse().ok()
}

fn parse_finite<T: FromStr + Into<f64> + Copy>(s: &str) -> Option<T> {
    parse_num::<T>(s).filter(|v| (*v).into().is_finite())
}

fn parse_positive(s: &str) -> Option<f64> {
    parse_finite::<f64>(s).filter(|v| *v > 0.0)
}

fn parse_factor(s: &str) -> Option<f32> {
    parse_finite::<f32>(s).filter(|v| *v >= 0.0)
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn split_query(query: &str) -> impl Iterator<Item = &str> {
    let query = query.strip_prefix('?').unwrap_or(query);
    query.split('&').filter(|s| !s.is_empty())
}

fn split_pair(pair: &str) -> (&str, &str) {
    pair.split_once('=').unwrap_or((pair, ""))
}

/// Decode `%XX` escapes and `+` as space. Invalid escapes pass through;
/// invalid UTF-8 is replaced.
fn percent_decode(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b'%' if i + 2 < bytes.len() => {
                if let (Some(hi), Some(lo)) = (hex_digit(bytes[i + 1]), hex_digit(bytes[i + 2])) {
                    out.push(hi << 4 | lo);
                    i += 3;
                } else {
                    out.push(b'%');
                    i += 1;
                }
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_digit(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

/// Static name for a recognized key, for warnings.
fn canonical_key(key: &str) -> &'static str {
    match key {
        "bg_color" | "bgcolor" => "bg_color",
        "face_scale" => "face_scale",
        "brightness" => "brightness",
        "contrast" => "contrast",
        "enhance_quality" => "enhance_quality",
        "crop_x" => "crop_x",
        "crop_y" => "crop_y",
        "crop_width" => "crop_width",
        "crop_height" => "crop_height",
        "crop_rotation" => "crop_rotation",
        "make_a4" => "make_a4",
        "copies" => "copies",
        "margin" => "margin",
        "spacing" => "spacing",
        "cut_lines" | "add_cut_lines" => "cut_lines",
        _ => "unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── tokenizer ───────────────────────────────────────────────────────

    #[test]
    fn decode_escapes() {
        assert_eq!(percent_decode("light%5Fblue"), "light_blue");
        assert_eq!(percent_decode("%23FF5733"), "#FF5733");
        assert_eq!(percent_decode("a+b"), "a b");
        assert_eq!(percent_decode("%C3%A9"), "é");
    }

    #[test]
    fn decode_trailing_escape() {
        assert_eq!(percent_decode("ab%2"), "ab%2");
        assert_eq!(percent_decode("ab%41"), "abA");
        assert_eq!(percent_decode("%zz"), "%zz");
    }

    #[test]
    fn pair_splitting() {
        assert_eq!(split_pair("a=b=c"), ("a", "b=c"));
        assert_eq!(split_pair("flag"), ("flag", ""));
        assert_eq!(split_query("?a=1&&b=2").count(), 2);
    }

    // ── dispatch ────────────────────────────────────────────────────────

    #[test]
    fn keys_case_insensitive() {
        let (req, warnings) = parse_query("BG_Color=red&Face_Scale=3");
        assert!(warnings.is_empty());
        assert_eq!(req.bg_color.as_deref(), Some("red"));
        assert_eq!(req.face_scale, Some(3.0));
    }

    #[test]
    fn duplicate_last_wins() {
        let (req, warnings) = parse_query("copies=4&copies=6");
        assert_eq!(req.copies, Some(6));
        assert_eq!(
            warnings,
            vec![ParseWarning::DuplicateKey {
                key: "copies".into(),
                value: "6".into()
            }]
        );
    }

    #[test]
    fn invalid_values_warn_and_keep_default() {
        let (req, warnings) = parse_query("face_scale=-2&crop_width=-10&make_a4=maybe&brightness=nan");
        assert_eq!(req.face_scale, None);
        assert_eq!(req.crop_width, None);
        assert_eq!(req.make_a4, None);
        assert_eq!(req.brightness, None);
        assert_eq!(warnings.len(), 4);
        assert!(matches!(
            warnings[0],
            ParseWarning::ValueInvalid {
                key: "face_scale",
                ..
            }
        ));
    }

    #[test]
    fn unknown_key_warns() {
        let (_, warnings) = parse_query("file=x.jpg");
        assert_eq!(
            warnings,
            vec![ParseWarning::KeyNotRecognized {
                key: "file".into(),
                value: "x.jpg".into()
            }]
        );
    }

    #[test]
    fn form_fields_not_decoded() {
        let (req, warnings) = parse_pairs([("bg_color", "#00FF00"), ("cut_lines", "off")]);
        assert!(warnings.is_empty());
        assert_eq!(req.bg_color.as_deref(), Some("#00FF00"));
        assert_eq!(req.cut_lines, Some(false));
    }

    #[test]
    fn canonical_keys_cover_dispatch() {
        for key in [
            "bg_color",
            "face_scale",
            "brightness",
            "contrast",
            "enhance_quality",
            "crop_x",
            "crop_y",
            "crop_width",
            "crop_height",
            "crop_rotation",
            "make_a4",
            "copies",
            "margin",
            "spacing",
            "cut_lines",
        ] {
            assert_eq!(canonical_key(key), key);
        }
    }
}
