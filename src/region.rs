use std::{
    cmp::{max, min},
    ops::{Index, Range},
};

/// A half-open span of positions within template source text.
///
/// Tokens and tree nodes refer to their text through a [`Region`] instead of
/// owning a copy of it.
#[derive(Debug, PartialEq, Copy, Clone)]
pub struct Region {
    /// First byte of the span, inclusive.
    pub begin: usize,
    /// End of the span, exclusive.
    pub end: usize,
}

impl Region {
    /// Create a new [`Region`] from the given range.
    pub fn new(position: Range<usize>) -> Self {
        Self {
            begin: position.start,
            end: position.end,
        }
    }

    /// Return true if this [`Region`] ends where the given `Region` begins,
    /// or begins where the given `Region` ends.
    pub fn is_neighbor(&self, other: Self) -> bool {
        self.end == other.begin || other.end == self.begin
    }

    /// Merge two [`Region`] instances into one span covering both.
    pub fn combine(self, other: Self) -> Self {
        Self {
            begin: min(self.begin, other.begin),
            end: max(self.end, other.end),
        }
    }

    /// Access the literal text addressed by this [`Region`].
    ///
    /// # Panics
    ///
    /// Panics when the `Region` is out of bounds in the given source text,
    /// which means the `Region` was derived from different source.
    pub fn literal<'source>(&self, source: &'source str) -> &'source str {
        source
            .get(self.begin..self.end)
            .expect("window over source should never fail")
    }
}

impl Index<Region> for str {
    type Output = str;

    fn index(&self, region: Region) -> &Self::Output {
        let Region { begin, end } = region;

        &self[begin..end]
    }
}

impl From<Range<usize>> for Region {
    fn from(value: Range<usize>) -> Self {
        Self {
            begin: value.start,
            end: value.end,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_neighbor() {
        assert!(Region::new(2..4).is_neighbor(Region::new(4..8)));
        assert!(!Region::new(4..8).is_neighbor(Region::new(9..12)));
    }

    #[test]
    fn test_combine() {
        let combined = Region::new(3..7).combine(Region::new(5..12));

        assert_eq!(combined.begin, 3);
        assert_eq!(combined.end, 12);
    }

    #[test]
    fn test_literal() {
        let source = "{{ greeting }}";
        let region = Region::new(3..11);

        assert_eq!(region.literal(source), "greeting");
    }

    #[test]
    #[should_panic]
    fn test_out_of_bounds_literal() {
        let source = "{{ greeting }}";
        let region = Region::new(3..20);

        region.literal(source);
    }
}
