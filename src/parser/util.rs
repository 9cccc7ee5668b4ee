//! Lexical helpers shared by the AST builder.

/// Decodes the escape sequences of a string or template literal body.
///
/// Unknown escapes yield the escaped character itself and a backslash
/// followed by a line terminator is a line continuation.
pub fn unescape_string(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    let mut pending_high: Option<u32> = None;
    while let Some(c) = chars.next() {
        if c != '\\' {
            flush_surrogate(&mut out, &mut pending_high);
            out.push(c);
            continue;
        }
        let escaped = match chars.next() {
            Some(e) => e,
            None => break,
        };
        let code_unit = match escaped {
            'u' => read_unicode_escape(&mut chars),
            'x' => read_hex(&mut chars, 2),
            _ => None,
        };
        if let Some(unit) = code_unit {
            push_code_unit(&mut out, &mut pending_high, unit);
            continue;
        }
        flush_surrogate(&mut out, &mut pending_high);
        match escaped {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            'b' => out.push('\u{08}'),
            'f' => out.push('\u{0C}'),
            'v' => out.push('\u{0B}'),
            '0' if !chars.peek().map_or(false, |d| d.is_ascii_digit()) => out.push('\0'),
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
            }
            '\n' | '\u{2028}' | '\u{2029}' => {}
            other => out.push(other),
        }
    }
    flush_surrogate(&mut out, &mut pending_high);
    out
}

fn read_hex<I: Iterator<Item = char>>(chars: &mut std::iter::Peekable<I>, count: usize) -> Option<u32> {
    let mut value = 0u32;
    for _ in 0..count {
        let digit = chars.peek()?.to_digit(16)?;
        chars.next();
        value = value * 16 + digit;
    }
    Some(value)
}

fn read_unicode_escape<I: Iterator<Item = char>>(chars: &mut std::iter::Peekable<I>) -> Option<u32> {
    if chars.peek() == Some(&'{') {
        chars.next();
        let mut value = 0u32;
        while let Some(&c) = chars.peek() {
            chars.next();
            if c == '}' {
                return Some(value);
            }
            value = value.saturating_mul(16).saturating_add(c.to_digit(16)?);
        }
        None
    } else {
        read_hex(chars, 4)
    }
}

fn push_code_unit(out: &mut String, pending_high: &mut Option<u32>, unit: u32) {
    if (0xD800..0xDC00).contains(&unit) {
        flush_surrogate(out, pending_high);
        *pending_high = Some(unit);
        return;
    }
    if (0xDC00..0xE000).contains(&unit) {
        if let Some(high) = pending_high.take() {
            let combined = 0x10000 + ((high - 0xD800) << 10) + (unit - 0xDC00);
            out.push(char::from_u32(combined).unwrap_or('\u{FFFD}'));
        } else {
            out.push('\u{FFFD}');
        }
        return;
    }
    flush_surrogate(out, pending_high);
    out.push(char::from_u32(unit).unwrap_or('\u{FFFD}'));
}

fn flush_surrogate(out: &mut String, pending_high: &mut Option<u32>) {
    if pending_high.take().is_some() {
        out.push('\u{FFFD}');
    }
}

/// Parsed form of a numeric literal token.
pub enum NumericToken {
    Integer(i64),
    Float(f64),
}

pub fn parse_numeric_token(token: &str) -> Option<NumericToken> {
    if let Some(hex) = token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
    {
        return match i64::from_str_radix(hex, 16) {
            Ok(i) => Some(NumericToken::Integer(i)),
            Err(_) => u128::from_str_radix(hex, 16)
                .ok()
                .map(|u| NumericToken::Float(u as f64)),
        };
    }
    if token.contains(|c| c == '.' || c == 'e' || c == 'E') {
        return token.parse::<f64>().ok().map(NumericToken::Float);
    }
    match token.parse::<i64>() {
        Ok(i) => Some(NumericToken::Integer(i)),
        Err(_) => token.parse::<f64>().ok().map(NumericToken::Float),
    }
}

/// The property key a numeric literal denotes in an object literal.
pub fn numeric_property_key(token: &str) -> String {
    match parse_numeric_token(token) {
        Some(NumericToken::Integer(i)) => i.to_string(),
        Some(NumericToken::Float(f)) if f.fract() == 0.0 && f.abs() < 1e21 => {
            format!("{}", f as i64)
        }
        Some(NumericToken::Float(f)) => format!("{}", f),
        None => token.to_string(),
    }
}
