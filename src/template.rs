//! `{n}` placeholder templates used by the `FORMAT` stage.

use crate::error::RowError;
use crate::row::Row;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Part {
    Text(String),
    Field(usize),
}

/// A parsed template such as `{0} (pop: {2})`.
///
/// `{{` and `}}` produce literal braces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    source: String,
    parts: Vec<Part>,
}

impl Template {
    pub fn parse(source: &str) -> Result<Self, String> {
        let mut parts = Vec::new();
        let mut text = String::new();
        let mut chars = source.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    text.push('{');
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    text.push('}');
                }
                '{' => {
                    let mut digits = String::new();
                    loop {
                        match chars.next() {
                            Some('}') => break,
                            Some(d) => digits.push(d),
                            None => return Err(format!("unclosed '{{' in template '{source}'")),
                        }
                    }
                    let index: usize = digits.trim().parse().map_err(|_| {
                        format!("placeholder '{{{digits}}}' is not a field index")
                    })?;
                    if !text.is_empty() {
                        parts.push(Part::Text(std::mem::take(&mut text)));
                    }
                    parts.push(Part::Field(index));
                }
                '}' => return Err(format!("unmatched '}}' in template '{source}'")),
                other => text.push(other),
            }
        }
        if !text.is_empty() {
            parts.push(Part::Text(text));
        }

        Ok(Self {
            source: source.to_string(),
            parts,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Render `row`; a placeholder past the end of the row is an error.
    pub fn render(&self, row: &Row) -> Result<String, RowError> {
        let mut out = String::new();
        for part in &self.parts {
            match part {
                Part::Text(t) => out.push_str(t),
                Part::Field(i) => out.push_str(row.require(*i)?),
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_fields_and_text() {
        let t = Template::parse("{0} (pop: {2})").unwrap();
        let row = Row::from(vec!["Warsaw", "Poland", "1790658"]);
        assert_eq!(t.render(&row).unwrap(), "Warsaw (pop: 1790658)");
    }

    #[test]
    fn test_escaped_braces() {
        let t = Template::parse("{{{0}}}").unwrap();
        assert_eq!(t.render(&Row::from(vec!["x"])).unwrap(), "{x}");
    }

    #[test]
    fn test_missing_field_fails() {
        let t = Template::parse("{3}").unwrap();
        assert_eq!(
            t.render(&Row::from(vec!["a"])),
            Err(RowError::MissingField { index: 3, len: 1 })
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(Template::parse("{0").is_err());
        assert!(Template::parse("a}").is_err());
        assert!(Template::parse("{name}").is_err());
        assert!(Template::parse("{-1}").is_err());
    }

    #[test]
    fn test_plain_text() {
        let t = Template::parse("constant").unwrap();
        assert_eq!(t.render(&Row::default()).unwrap(), "constant");
        assert_eq!(t.as_str(), "constant");
    }
}
