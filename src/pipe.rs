use serde_json::{Map, Value};
use std::fmt::{Arguments, Display, Result, Write};

/// Controls how text is written to output.
///
/// Escaping applies to rendered expression values only, raw template
/// text is always written through untouched.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Escape {
    /// Values are written as-is.
    #[default]
    None,
    /// The characters `&`, `<`, `>`, `"` and `'` within string values
    /// are replaced with HTML entities.
    Html,
}

/// Wraps some underlying buffer by providing methods that write to it
/// in different formats.
pub struct Pipe<'buffer> {
    buffer: &'buffer mut (dyn Write + 'buffer),
}

impl<'buffer> Pipe<'buffer> {
    /// Create a new Pipe that writes to the given buffer.
    pub fn new(buffer: &'buffer mut String) -> Self {
        Self { buffer }
    }

    /// Write the given Value to the Pipe buffer.
    ///
    /// The Pipe will handle formatting the value. String content is
    /// escaped according to the given [`Escape`].
    ///
    /// # Errors
    ///
    /// The Pipe supports all Value types, so the only error that will
    /// be returned is propagated from the [write!] macro itself.
    pub fn write_value(&mut self, value: &Value, escape: Escape) -> Result {
        match value {
            Value::Null => self.write_null(),
            Value::String(string) => match escape {
                Escape::None => self.write_str(string),
                Escape::Html => self.write_escaped(string),
            },
            Value::Array(array) => self.write_array(array, escape),
            Value::Object(object) => self.write_object(object, escape),
            _ => self.write_display(value),
        }
    }

    /// Write the value to the buffer using the Display implementation.
    fn write_display(&mut self, value: impl Display) -> Result {
        write!(self.buffer, "{}", value)
    }

    /// Write the literal text "null" to the buffer.
    fn write_null(&mut self) -> Result {
        write!(self.buffer, "null")
    }

    /// Write the text to the buffer, replacing HTML-significant
    /// characters with entities.
    fn write_escaped(&mut self, text: &str) -> Result {
        for character in text.chars() {
            match character {
                '&' => self.buffer.write_str("&amp;")?,
                '<' => self.buffer.write_str("&lt;")?,
                '>' => self.buffer.write_str("&gt;")?,
                '"' => self.buffer.write_str("&quot;")?,
                '\'' => self.buffer.write_str("&#39;")?,
                character => self.buffer.write_char(character)?,
            }
        }

        Ok(())
    }

    /// Write the value to the buffer as a comma separated list
    /// surrounded by brackets.
    fn write_array(&mut self, value: &[Value], escape: Escape) -> Result {
        write!(self.buffer, "[")?;
        for (index, item) in value.iter().enumerate() {
            if index > 0 {
                write!(self.buffer, ", ")?;
            }
            self.write_value(item, escape)?;
        }
        write!(self.buffer, "]")
    }

    /// Write the value to the buffer as key/value pairs surrounded
    /// by curly braces.
    fn write_object(&mut self, value: &Map<String, Value>, escape: Escape) -> Result {
        write!(self.buffer, "{{")?;
        for (index, (key, value)) in value.iter().enumerate() {
            if index > 0 {
                write!(self.buffer, ", ")?;
            }
            write!(self.buffer, "{}: ", key)?;
            self.write_value(value, escape)?;
        }
        write!(self.buffer, "}}")
    }
}

impl Write for Pipe<'_> {
    #[inline]
    fn write_str(&mut self, s: &str) -> Result {
        Write::write_str(self.buffer, s)
    }

    #[inline]
    fn write_char(&mut self, c: char) -> Result {
        Write::write_char(self.buffer, c)
    }

    #[inline]
    fn write_fmt(&mut self, args: Arguments<'_>) -> Result {
        Write::write_fmt(self.buffer, args)
    }
}

#[cfg(test)]
mod tests {
    use super::{Escape, Pipe};
    use serde_json::json;

    #[test]
    fn test_write_array() {
        let mut buffer = String::new();
        let mut pipe = Pipe::new(&mut buffer);
        pipe.write_value(&json!(["one", 2, null]), Escape::None)
            .unwrap();

        assert_eq!(buffer, "[one, 2, null]");
    }

    #[test]
    fn test_write_object() {
        let mut buffer = String::new();
        let mut pipe = Pipe::new(&mut buffer);
        pipe.write_value(&json!({"one": 1}), Escape::None).unwrap();

        assert_eq!(buffer, "{one: 1}");
    }

    #[test]
    fn test_write_escaped() {
        let mut buffer = String::new();
        let mut pipe = Pipe::new(&mut buffer);
        pipe.write_value(&json!("<b>\"hi\" & 'bye'</b>"), Escape::Html)
            .unwrap();

        assert_eq!(buffer, "&lt;b&gt;&quot;hi&quot; &amp; &#39;bye&#39;&lt;/b&gt;");
    }

    #[test]
    fn test_write_unescaped() {
        let mut buffer = String::new();
        let mut pipe = Pipe::new(&mut buffer);
        pipe.write_value(&json!("<b>hi</b>"), Escape::None).unwrap();

        assert_eq!(buffer, "<b>hi</b>");
    }
}
