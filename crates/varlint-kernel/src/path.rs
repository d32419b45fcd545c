//! Path expressions: `apps.*.address`.
//!
//! A path expression is a dot-separated list of segments. Each segment is
//! either a literal key or the wildcard `*`, which stands for every key
//! present at that level of the tree.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// The segment text that denotes a wildcard.
pub const WILDCARD: &str = "*";

/// One step of a path expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// A literal key: `apps`
    Key(String),
    /// Any key at this level: `*`
    Wildcard,
}

impl Segment {
    /// The text this segment was written as.
    pub fn as_str(&self) -> &str {
        match self {
            Segment::Key(key) => key,
            Segment::Wildcard => WILDCARD,
        }
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self, Segment::Wildcard)
    }
}

impl From<&str> for Segment {
    fn from(s: &str) -> Self {
        if s == WILDCARD {
            Segment::Wildcard
        } else {
            Segment::Key(s.to_string())
        }
    }
}

/// A parsed path expression.
///
/// Parsing never fails. The empty string is the empty expression, which
/// resolves to the whole tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct PathExpr {
    segments: Vec<Segment>,
}

impl PathExpr {
    /// Parse a dotted expression like `secrets.jfrog.*`.
    pub fn parse(source: &str) -> Self {
        if source.is_empty() {
            return Self::default();
        }
        Self {
            segments: source.split('.').map(Segment::from).collect(),
        }
    }

    pub fn from_segments(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn wildcard_count(&self) -> usize {
        self.segments.iter().filter(|s| s.is_wildcard()).count()
    }
}

impl FromStr for PathExpr {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(PathExpr::parse(s))
    }
}

impl From<&str> for PathExpr {
    fn from(s: &str) -> Self {
        PathExpr::parse(s)
    }
}

impl fmt::Display for PathExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            f.write_str(segment.as_str())?;
        }
        Ok(())
    }
}
