use std::fmt;

use crate::reader::{ReaderError, ReaderResult};

/// Represents the strand of a genomic feature.
///
/// Strand is carried through the conversion untouched, so any token other
/// than `+`, `-` or `.` is kept verbatim in [`Strand::Other`].
///
/// # Example
///
/// ```
/// use refgene2gtf::strand::Strand;
///
/// let strand = Strand::Forward;
/// assert_eq!(strand.to_string(), "+");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Strand {
    /// Positive strand (`+`).
    Forward,
    /// Negative strand (`-`).
    Reverse,
    /// Unknown strand (`.`).
    Unknown,
    /// Any other source encoding, rendered back exactly as read.
    Other(String),
}

impl Strand {
    /// Parses a string into a `Strand`.
    ///
    /// # Errors
    ///
    /// This function returns an error if the string is empty.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use refgene2gtf::strand::Strand;
    ///
    /// fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let strand = Strand::parse("+", 1)?;
    ///     assert_eq!(strand, Strand::Forward);
    ///
    ///     Ok(())
    /// }
    /// ```
    pub(crate) fn parse(raw: &str, line: usize) -> ReaderResult<Self> {
        match raw {
            "+" => Ok(Strand::Forward),
            "-" => Ok(Strand::Reverse),
            "." => Ok(Strand::Unknown),
            "" => Err(ReaderError::invalid_field(
                line,
                "strand",
                format!("ERROR: expected a strand token, got an empty value in {line}:strand"),
            )),
            other => Ok(Strand::Other(other.to_string())),
        }
    }

    /// Returns the textual form of the strand.
    pub fn as_str(&self) -> &str {
        match self {
            Strand::Forward => "+",
            Strand::Reverse => "-",
            Strand::Unknown => ".",
            Strand::Other(token) => token,
        }
    }
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
