//! Constant literals.

use std::fmt::Display;

use super::Translator;
use crate::hoist::HoistedValue;
use crate::ir::Value;

/// `"text"`, or a verbatim `@"text"` when escapes would be needed.
fn string_literal(text: &str) -> String {
    let needs_verbatim = text
        .chars()
        .any(|c| c == '\\' || c == '"' || c.is_control());
    if needs_verbatim {
        format!("@\"{}\"", text.replace('"', "\"\""))
    } else {
        format!("\"{text}\"")
    }
}

fn char_literal(c: char) -> String {
    match c {
        '\\' => r"'\\'".to_string(),
        '\'' => r"'\''".to_string(),
        '\0' => r"'\0'".to_string(),
        '\n' => r"'\n'".to_string(),
        '\r' => r"'\r'".to_string(),
        '\t' => r"'\t'".to_string(),
        c if c.is_control() => format!("'\\u{:04X}'", c as u32),
        c => format!("'{c}'"),
    }
}

/// Floating-point literal with `suffix`, or the named constant of `keyword`
/// for values without one.
fn float_literal<T: Into<f64> + Display + Copy>(value: T, keyword: &str, suffix: &str) -> String {
    let wide: f64 = value.into();
    if wide.is_nan() {
        format!("{keyword}.NaN")
    } else if wide == f64::INFINITY {
        format!("{keyword}.PositiveInfinity")
    } else if wide == f64::NEG_INFINITY {
        format!("{keyword}.NegativeInfinity")
    } else {
        format!("{value}{suffix}")
    }
}

impl Translator<'_> {
    pub(super) fn write_value(&mut self, value: &Value) {
        let text = match value {
            Value::Null => "null".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Char(c) => char_literal(*c),
            Value::String(s) => string_literal(s),
            Value::Int(v) => v.to_string(),
            Value::UInt(v) => format!("{v}u"),
            Value::Long(v) => format!("{v}L"),
            Value::ULong(v) => format!("{v}UL"),
            // No literal suffix exists for these.
            Value::SByte(v) => self.cast_literal(value, v),
            Value::Byte(v) => self.cast_literal(value, v),
            Value::Short(v) => self.cast_literal(value, v),
            Value::UShort(v) => self.cast_literal(value, v),
            Value::Float(v) => float_literal(*v, "float", "f"),
            Value::Double(v) => float_literal(*v, "double", "d"),
            Value::Decimal(digits) => format!("{digits}m"),
            Value::Enum { ty, member, raw } => {
                let name = self.types.translate(ty);
                match member {
                    Some(member) => format!("{name}.{member}"),
                    // `(Color)-1` would parse as a subtraction.
                    None if *raw < 0 => format!("({name})({raw})"),
                    None => format!("({name}){raw}"),
                }
            }
            Value::Type(ty) => format!("typeof({})", self.types.translate(ty)),
            Value::Object(object) => self.hoister.field_for(
                HoistedValue::Object(object.clone()),
                object.ty().clone(),
                &object.ty().runtime_name(),
                &mut self.names,
            ),
        };
        self.write(&text);
    }

    fn cast_literal(&mut self, value: &Value, raw: impl Display) -> String {
        format!("({}){raw}", self.types.translate(&value.ty()))
    }
}
