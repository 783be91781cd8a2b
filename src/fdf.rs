//! FDF (Forms Data Format) writer.
//!
//! Produces the side-file pdftk reads with `fill_form`. Names and values are
//! always written as hex UTF-16BE strings with a byte-order mark, so the output
//! never depends on PDF literal-string escaping.

use crate::utf16::hex_utf16_bom;
use serde::de::{self, Deserializer, Visitor};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Form field mapping: field name -> value.
pub type Form = BTreeMap<String, FieldValue>;

/// Value of a single form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// Checkbox state, written through a [`CheckboxLexicon`]
    Boolean(bool),
    /// Anything else, already rendered as text
    Text(String),
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Boolean(b)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl<'de> Deserialize<'de> for FieldValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct FieldValueVisitor;

        impl<'de> Visitor<'de> for FieldValueVisitor {
            type Value = FieldValue;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a boolean, number, string or null")
            }

            fn visit_bool<E: de::Error>(self, v: bool) -> Result<FieldValue, E> {
                Ok(FieldValue::Boolean(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<FieldValue, E> {
                Ok(FieldValue::Text(v.to_string()))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<FieldValue, E> {
                Ok(FieldValue::Text(v.to_string()))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<FieldValue, E> {
                Ok(FieldValue::Text(v.to_string()))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<FieldValue, E> {
                Ok(FieldValue::Text(v.to_string()))
            }

            fn visit_string<E: de::Error>(self, v: String) -> Result<FieldValue, E> {
                Ok(FieldValue::Text(v))
            }

            fn visit_unit<E: de::Error>(self) -> Result<FieldValue, E> {
                Ok(FieldValue::Text(String::new()))
            }

            fn visit_none<E: de::Error>(self) -> Result<FieldValue, E> {
                Ok(FieldValue::Text(String::new()))
            }
        }

        deserializer.deserialize_any(FieldValueVisitor)
    }
}

/// Export strings substituted for checkbox values.
///
/// Checkbox "on" values are not standardized (`Yes`, `On`, `1`, ...), so the
/// caller supplies whatever the target PDF expects.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckboxLexicon {
    pub checked: String,
    pub unchecked: String,
}

impl CheckboxLexicon {
    pub fn new(checked: impl Into<String>, unchecked: impl Into<String>) -> Self {
        Self {
            checked: checked.into(),
            unchecked: unchecked.into(),
        }
    }

    /// Text written for a field value.
    pub fn resolve<'a>(&'a self, value: &'a FieldValue) -> &'a str {
        match value {
            FieldValue::Boolean(true) => &self.checked,
            FieldValue::Boolean(false) => &self.unchecked,
            FieldValue::Text(s) => s,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FdfError {
    /// The output sink could not be written
    #[error("failed to write FDF data: {0}")]
    Io(#[from] std::io::Error),
}

const HEADER: &[&[u8]] = &[
    b"%FDF-1.2\n",
    b"\xE2\xE3\xCF\xD3\n",
    b"1 0 obj \n",
    b"<<\n",
    b"/FDF \n",
    b"<<\n",
    b"/Fields [\n",
];

const TRAILER: &[&[u8]] = &[
    b"]\n",
    b">>\n",
    b">>\n",
    b"endobj \n",
    b"trailer\n",
    b"\n",
    b"<<\n",
    b"/Root 1 0 R\n",
    b">>\n",
    b"%%EOF\n",
];

/// Write `form` as an FDF document to `sink`.
pub fn encode<W: Write>(
    form: &Form,
    lexicon: &CheckboxLexicon,
    sink: W,
) -> Result<(), FdfError> {
    let mut out = BufWriter::new(sink);

    for line in HEADER {
        out.write_all(line)?;
    }

    for (name, value) in form {
        write_field(&mut out, name, lexicon.resolve(value))?;
    }

    for line in TRAILER {
        out.write_all(line)?;
    }

    out.flush()?;
    Ok(())
}

fn write_field<W: Write>(out: &mut W, name: &str, value: &str) -> std::io::Result<()> {
    out.write_all(b"<<\n")?;
    writeln!(out, "/T <{}>", hex_utf16_bom(name))?;
    writeln!(out, "/V <{}>", hex_utf16_bom(value))?;
    out.write_all(b">>\n")
}

/// Encode into an in-memory buffer.
pub fn to_bytes(form: &Form, lexicon: &CheckboxLexicon) -> Result<Vec<u8>, FdfError> {
    let mut buf = Vec::new();
    encode(form, lexicon, &mut buf)?;
    Ok(buf)
}

/// Create (or truncate) `path` and write the FDF document into it.
pub fn write_to_file(
    form: &Form,
    lexicon: &CheckboxLexicon,
    path: impl AsRef<Path>,
) -> Result<(), FdfError> {
    let file = std::fs::File::create(path.as_ref())?;
    encode(form, lexicon, file)
}
