// SPDX-License-Identifier: MIT OR Apache-2.0

//! printf-style message templates.
//!
//! A template mixes literal text with `%` placeholders of the form
//!
//! ```text
//! %[argument][+][0|'c][-][width][.precision]type
//! ```
//!
//! where `argument` is either a position (`2$`, counting params from 1) or a named
//! lookup into the first param (`(user.name)`), `+` forces a sign on numbers, `0` or
//! `'c` chooses the pad character, `-` left-aligns, and `type` is one of
//!
//! | type      | renders                                        |
//! |-----------|------------------------------------------------|
//! | `s`       | the param as a string                          |
//! | `d` / `i` | integer                                        |
//! | `f`       | float, fixed to `precision` digits if given    |
//! | `e`       | exponential notation                           |
//! | `g`       | `precision` significant digits                 |
//! | `b` `o` `x` `X` `u` | unsigned 32-bit binary, octal, hex, decimal |
//! | `c`       | the character with that code                   |
//! | `j`       | JSON, indented by `width` spaces               |
//! | `t`       | `true`/`false` by truthiness                   |
//! | `T`       | lowercase type name                            |
//! | `v`       | primitive value                                |
//!
//! `%%` is a literal percent sign. Formatting never fails: placeholders that do not
//! parse, or that have no param to consume, are copied to the output as written.
//! Non-numeric input to a numeric type renders `NaN`. Extra params are ignored.

use crate::classify::LogArg;
use crate::error_info::ErrorInfo;
use crate::value::{Value, js_number, number_string};
use serde::Serialize;

/**
Fills `template` with `params`.

With no params the template is returned verbatim, so a plain message containing `%`
is never interpreted.

```rust
use logshim::{format::compose, LogArg};

assert_eq!(compose("id=%s", &[LogArg::from(5)]), "id=5");
assert_eq!(compose("100% done", &[]), "100% done");
```
*/
pub fn compose(template: &str, params: &[LogArg]) -> String {
    if params.is_empty() {
        return template.to_string();
    }
    sprintf(template, params)
}

/// Formats `template` with `params`, always interpreting placeholders.
pub fn sprintf(template: &str, params: &[LogArg]) -> String {
    let mut output = String::with_capacity(template.len());
    let mut cursor = 0;
    for piece in parse(template) {
        match piece {
            Piece::Literal(text) => output.push_str(&text),
            Piece::Placeholder(placeholder) => {
                let arg = match &placeholder.arg {
                    ArgRef::Next => {
                        let arg = params.get(cursor).map(Arg::from_log_arg);
                        cursor += 1;
                        arg
                    }
                    ArgRef::Position(n) => params.get(n - 1).map(Arg::from_log_arg),
                    ArgRef::Named(path) => named(params, path),
                };
                match arg {
                    Some(arg) => output.push_str(&placeholder.render(arg)),
                    None => output.push_str(&placeholder.source),
                }
            }
        }
    }
    output
}

fn named<'a>(params: &'a [LogArg], path: &str) -> Option<Arg<'a>> {
    match params.first()? {
        LogArg::Value(Value::Object(meta)) => meta.get_path(path).map(Arg::Value),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ArgRef {
    Next,
    /// 1-based
    Position(usize),
    Named(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Placeholder {
    /// The placeholder as written, emitted when no param is available.
    source: String,
    arg: ArgRef,
    sign: bool,
    pad: Option<char>,
    left_align: bool,
    width: Option<usize>,
    precision: Option<usize>,
    kind: char,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Piece {
    Literal(String),
    Placeholder(Placeholder),
}

const KINDS: &str = "bcdefgijostTuvxX";
/// Largest precision honored, as for `toFixed`.
const MAX_PRECISION: usize = 100;
/// Largest field width honored.
const MAX_WIDTH: usize = 4096;

fn digits(chars: &[char], pos: &mut usize) -> Option<usize> {
    let start = *pos;
    while *pos < chars.len() && chars[*pos].is_ascii_digit() {
        *pos += 1;
    }
    if *pos == start {
        return None;
    }
    // only overflow can fail here; saturate and let callers clamp
    Some(
        chars[start..*pos]
            .iter()
            .collect::<String>()
            .parse()
            .unwrap_or(usize::MAX),
    )
}

/// Parses the placeholder starting at `chars[start] == '%'`. Returns it and the index after it.
fn parse_placeholder(chars: &[char], start: usize) -> Option<(Placeholder, usize)> {
    let mut pos = start + 1;
    let mut arg = ArgRef::Next;

    // position: digits followed by '$', not starting with 0
    if chars.get(pos).is_some_and(|c| ('1'..='9').contains(c)) {
        let mut probe = pos;
        let n = digits(chars, &mut probe);
        if chars.get(probe) == Some(&'$') {
            arg = ArgRef::Position(n?);
            pos = probe + 1;
        }
    } else if chars.get(pos) == Some(&'(') {
        let close = chars[pos + 1..].iter().position(|c| *c == ')')? + pos + 1;
        if close == pos + 1 {
            return None;
        }
        arg = ArgRef::Named(chars[pos + 1..close].iter().collect());
        pos = close + 1;
    }

    let sign = chars.get(pos) == Some(&'+');
    if sign {
        pos += 1;
    }

    let mut pad = None;
    match chars.get(pos) {
        Some('0') => {
            pad = Some('0');
            pos += 1;
        }
        Some('\'') => match chars.get(pos + 1) {
            Some(c) if *c != '$' => {
                pad = Some(*c);
                pos += 2;
            }
            _ => return None,
        },
        _ => {}
    }

    let left_align = chars.get(pos) == Some(&'-');
    if left_align {
        pos += 1;
    }

    let width = digits(chars, &mut pos).map(|w| w.min(MAX_WIDTH));
    let mut precision = None;
    if chars.get(pos) == Some(&'.') {
        let mut probe = pos + 1;
        if let Some(p) = digits(chars, &mut probe) {
            precision = Some(p.min(MAX_PRECISION));
            pos = probe;
        }
    }

    let kind = *chars.get(pos)?;
    if !KINDS.contains(kind) {
        return None;
    }
    pos += 1;

    Some((
        Placeholder {
            source: chars[start..pos].iter().collect(),
            arg,
            sign,
            pad,
            left_align,
            width,
            precision,
            kind,
        },
        pos,
    ))
}

fn parse(template: &str) -> Vec<Piece> {
    let chars: Vec<char> = template.chars().collect();
    let mut pieces = Vec::new();
    let mut literal = String::new();
    let mut pos = 0;
    while pos < chars.len() {
        let c = chars[pos];
        if c != '%' {
            literal.push(c);
            pos += 1;
            continue;
        }
        if chars.get(pos + 1) == Some(&'%') {
            literal.push('%');
            pos += 2;
            continue;
        }
        match parse_placeholder(&chars, pos) {
            Some((placeholder, next)) => {
                if !literal.is_empty() {
                    pieces.push(Piece::Literal(std::mem::take(&mut literal)));
                }
                pieces.push(Piece::Placeholder(placeholder));
                pos = next;
            }
            None => {
                literal.push('%');
                pos += 1;
            }
        }
    }
    if !literal.is_empty() {
        pieces.push(Piece::Literal(literal));
    }
    pieces
}

/// A param as seen by a placeholder.
#[derive(Debug, Clone, Copy)]
enum Arg<'a> {
    Value(&'a Value),
    Error(&'a ErrorInfo),
    Function,
}

impl<'a> Arg<'a> {
    fn from_log_arg(arg: &'a LogArg) -> Self {
        match arg {
            LogArg::Value(Value::Rewriter(_)) | LogArg::Callback(_) => Arg::Function,
            LogArg::Value(v) => Arg::Value(v),
            LogArg::Error(e) => Arg::Error(e),
        }
    }

    fn string(&self) -> String {
        match self {
            Arg::Value(v) => v.js_string(),
            Arg::Error(e) => e.to_string(),
            Arg::Function => "[Function]".to_string(),
        }
    }

    fn truthy(&self) -> bool {
        match self {
            Arg::Value(Value::Null) => false,
            Arg::Value(Value::Bool(b)) => *b,
            Arg::Value(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
            Arg::Value(Value::String(s)) => !s.is_empty(),
            _ => true,
        }
    }

    fn type_name(&self) -> String {
        match self {
            Arg::Value(v) => v.category().name().to_lowercase(),
            Arg::Error(_) => "error".to_string(),
            Arg::Function => "function".to_string(),
        }
    }

    fn value_of(&self) -> String {
        match self {
            Arg::Value(Value::Date(d)) => d.timestamp_millis().to_string(),
            other => other.string(),
        }
    }

    fn int(&self) -> f64 {
        match self {
            Arg::Value(Value::Number(n)) => n.as_f64().map_or(f64::NAN, f64::trunc),
            other => parse_int_prefix(&other.string()),
        }
    }

    fn float(&self) -> f64 {
        match self {
            Arg::Value(Value::Number(n)) => n.as_f64().unwrap_or(f64::NAN),
            other => parse_float_prefix(&other.string()),
        }
    }

    fn json(&self, indent: usize) -> String {
        let value = match self {
            Arg::Value(v) => v.to_json(),
            Arg::Error(e) => e.to_json(),
            Arg::Function => return "undefined".to_string(),
        };
        if indent == 0 {
            return value.to_string();
        }
        let indent = " ".repeat(indent.min(10));
        let formatter = serde_json::ser::PrettyFormatter::with_indent(indent.as_bytes());
        let mut out = Vec::new();
        let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
        match value.serialize(&mut serializer) {
            Ok(()) => String::from_utf8(out).unwrap_or_default(),
            Err(_) => value.to_string(),
        }
    }
}

fn parse_int_prefix(s: &str) -> f64 {
    let t = s.trim_start();
    let (negative, rest) = match t.as_bytes().first() {
        Some(b'-') => (true, &t[1..]),
        Some(b'+') => (false, &t[1..]),
        _ => (false, t),
    };
    let end = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
    match rest[..end].parse::<f64>() {
        Ok(n) if end > 0 => {
            if negative {
                -n
            } else {
                n
            }
        }
        _ => f64::NAN,
    }
}

fn parse_float_prefix(s: &str) -> f64 {
    let t = s.trim_start();
    for (prefix, value) in [
        ("Infinity", f64::INFINITY),
        ("+Infinity", f64::INFINITY),
        ("-Infinity", f64::NEG_INFINITY),
    ] {
        if t.starts_with(prefix) {
            return value;
        }
    }
    let end = t
        .find(|c: char| !(c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E')))
        .unwrap_or(t.len());
    // longest prefix that parses
    (1..=end)
        .rev()
        .find_map(|i| t.get(..i)?.parse::<f64>().ok())
        .unwrap_or(f64::NAN)
}

fn to_uint32(n: f64) -> u32 {
    if !n.is_finite() {
        return 0;
    }
    let m = n.trunc().rem_euclid(4_294_967_296.0);
    m as u32
}

/// Exponential notation with an explicit exponent sign: `1.5e+2`.
fn exponential(n: f64, precision: Option<usize>) -> String {
    if !n.is_finite() {
        return js_number(n);
    }
    let raw = match precision {
        Some(p) => format!("{:.*e}", p, n),
        None => format!("{:e}", n),
    };
    match raw.split_once('e') {
        Some((mantissa, exp)) if exp.starts_with('-') => format!("{mantissa}e{exp}"),
        Some((mantissa, exp)) => format!("{mantissa}e+{exp}"),
        None => raw,
    }
}

fn significant(n: f64, precision: usize) -> String {
    if !n.is_finite() || precision == 0 {
        return js_number(n);
    }
    let rounded = format!("{:.*e}", precision - 1, n);
    rounded.parse::<f64>().map_or_else(|_| js_number(n), js_number)
}

impl Placeholder {
    fn truncate(&self, s: String) -> String {
        match self.precision {
            Some(p) => s.chars().take(p).collect(),
            None => s,
        }
    }

    fn render(&self, arg: Arg<'_>) -> String {
        let mut numeric = None;
        let body = match self.kind {
            'b' => format!("{:b}", to_uint32(arg.int())),
            'c' => {
                let code = arg.int();
                if code.is_finite() {
                    char::from_u32(to_uint32(code) & 0xFFFF)
                        .map(String::from)
                        .unwrap_or_default()
                } else {
                    "\0".to_string()
                }
            }
            'd' | 'i' => {
                let n = arg.int();
                numeric = Some(n);
                js_number(n)
            }
            'j' => return arg.json(self.width.unwrap_or(0)),
            'e' => {
                let n = arg.float();
                numeric = Some(n);
                exponential(n, self.precision)
            }
            'f' => {
                let n = arg.float();
                numeric = Some(n);
                match self.precision {
                    Some(p) if n.is_finite() => format!("{:.*}", p, n),
                    _ => js_number(n),
                }
            }
            'g' => {
                let n = arg.float();
                numeric = Some(n);
                match self.precision {
                    Some(p) => significant(n, p),
                    None => js_number(n),
                }
            }
            'o' => format!("{:o}", to_uint32(arg.int())),
            's' => self.truncate(arg.string()),
            't' => self.truncate(arg.truthy().to_string()),
            'T' => self.truncate(arg.type_name()),
            'u' => to_uint32(arg.int()).to_string(),
            'v' => self.truncate(arg.value_of()),
            'x' => format!("{:x}", to_uint32(arg.int())),
            'X' => format!("{:X}", to_uint32(arg.int())),
            _ => return self.source.clone(),
        };

        let mut sign = "";
        let mut body = body;
        if let Some(n) = numeric {
            if n < 0.0 {
                sign = "-";
                body = body.trim_start_matches('-').to_string();
            } else if self.sign {
                sign = "+";
            }
        }

        let pad_char = self.pad.unwrap_or(' ');
        let used = sign.chars().count() + body.chars().count();
        let padding = match self.width {
            Some(w) if w > used => pad_char.to_string().repeat(w - used),
            _ => String::new(),
        };
        if self.left_align {
            format!("{sign}{body}{padding}")
        } else if pad_char == '0' {
            format!("{sign}{padding}{body}")
        } else {
            format!("{padding}{sign}{body}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta;

    fn f(template: &str, params: Vec<LogArg>) -> String {
        sprintf(template, &params)
    }

    #[test]
    fn strings_and_integers() {
        assert_eq!(f("id=%s", vec![5.into()]), "id=5");
        assert_eq!(f("%s-%s", vec!["a".into(), "b".into()]), "a-b");
        assert_eq!(f("%d items", vec![3.9.into()]), "3 items");
        assert_eq!(f("%i", vec!["42abc".into()]), "42");
        assert_eq!(f("%d", vec!["abc".into()]), "NaN");
    }

    #[test]
    fn percent_escape_and_verbatim_template() {
        assert_eq!(f("100%% of %s", vec!["it".into()]), "100% of it");
        assert_eq!(compose("50% off %s", &[]), "50% off %s");
    }

    #[test]
    fn unknown_placeholders_are_copied() {
        assert_eq!(f("%q %s", vec!["x".into()]), "%q x");
        assert_eq!(f("trailing %", vec!["x".into()]), "trailing %");
    }

    #[test]
    fn missing_params_leave_placeholder() {
        assert_eq!(f("%s and %s", vec!["one".into()]), "one and %s");
        assert_eq!(f("%3$s", vec!["one".into()]), "%3$s");
    }

    #[test]
    fn extra_params_are_ignored() {
        assert_eq!(f("%s", vec!["a".into(), "b".into()]), "a");
    }

    #[test]
    fn positional_and_named_arguments() {
        assert_eq!(f("%2$s %1$s", vec!["world".into(), "hello".into()]), "hello world");
        let params = vec![LogArg::from(meta! { "user" => meta! { "name" => "alice" } })];
        assert_eq!(f("hi %(user.name)s", params), "hi alice");
    }

    #[test]
    fn floats_and_precision() {
        assert_eq!(f("%.2f", vec![3.14159.into()]), "3.14");
        assert_eq!(f("%f", vec!["2.5kg".into()]), "2.5");
        assert_eq!(f("%e", vec![150.into()]), "1.5e+2");
        assert_eq!(f("%.1e", vec![0.000123.into()]), "1.2e-4");
        assert_eq!(f("%.3g", vec![3.14159.into()]), "3.14");
    }

    #[test]
    fn oversized_precision_and_width_are_clamped() {
        let fixed = f("v=%.70000f", vec![1.5.into()]);
        assert_eq!(fixed.len(), "v=1.".len() + MAX_PRECISION);
        assert!(fixed.starts_with("v=1.50"));
        assert!(f("%.70000e", vec![1.5.into()]).ends_with("e+0"));
        assert_eq!(f("%.70000g", vec![1.5.into()]), "1.5");
        assert_eq!(f("%.70000s", vec!["abc".into()]), "abc");
        assert_eq!(f("%4000000000s", vec!["x".into()]).len(), MAX_WIDTH);
        assert_eq!(f("%99999999999999999999999d", vec![1.into()]).len(), MAX_WIDTH);
    }

    #[test]
    fn signs_and_padding() {
        assert_eq!(f("%+d", vec![5.into()]), "+5");
        assert_eq!(f("%+d", vec![(-5).into()]), "-5");
        assert_eq!(f("%05d", vec![(-42).into()]), "-0042");
        assert_eq!(f("%5s|", vec!["ab".into()]), "   ab|");
        assert_eq!(f("%-5s|", vec!["ab".into()]), "ab   |");
        assert_eq!(f("%'*6s", vec!["ab".into()]), "****ab");
        assert_eq!(f("%.2s", vec!["abcdef".into()]), "ab");
    }

    #[test]
    fn radix_conversions() {
        assert_eq!(f("%b", vec![5.into()]), "101");
        assert_eq!(f("%o", vec![8.into()]), "10");
        assert_eq!(f("%x %X", vec![255.into(), 255.into()]), "ff FF");
        assert_eq!(f("%u", vec![(-1).into()]), "4294967295");
        assert_eq!(f("%c", vec![65.into()]), "A");
    }

    #[test]
    fn json_and_introspection() {
        assert_eq!(f("%j", vec![meta! { "a" => 1 }.into()]), r#"{"a":1}"#);
        assert_eq!(f("%2j", vec![vec![1].into()]), "[\n  1\n]");
        assert_eq!(f("%t %t", vec!["".into(), 1.into()]), "false true");
        assert_eq!(f("%T %T", vec!["s".into(), Value::Null.into()]), "string null");
    }

    #[test]
    fn errors_render_as_name_and_message() {
        let err = ErrorInfo::new("TypeError", "bad");
        assert_eq!(f("failed: %s", vec![err.into()]), "failed: TypeError: bad");
    }
}
