//! Source map between assembled addresses and source lines
//!
//! Addresses are offsets within the bank of the program's origin.

/// Bidirectional mapping between binary and source locations
#[derive(Debug, Clone, Default)]
pub struct SourceMap {
    /// Instruction start offset → source location, sorted by offset
    address_to_source: Vec<(u16, SourceLocation)>,

    /// Source line → emitted bytes, sorted by line
    source_to_address: Vec<(usize, AddressRange)>,
}

/// A location in source code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    /// Line number (1-indexed)
    pub line: usize,

    /// Column where the mnemonic starts (0-indexed)
    pub column: usize,

    /// Length of the instruction text, excluding comments
    pub length: usize,
}

/// A range of instruction offsets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressRange {
    /// Starting offset (inclusive)
    pub start: u16,

    /// Ending offset (exclusive)
    pub end: u16,
}

impl AddressRange {
    pub fn contains(&self, offset: u16) -> bool {
        offset.wrapping_sub(self.start) < self.end.wrapping_sub(self.start)
    }
}

impl SourceMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one assembled instruction
    pub fn add_instruction(&mut self, location: SourceLocation, range: AddressRange) {
        self.address_to_source.push((range.start, location));
        self.source_to_address.push((location.line, range));
    }

    /// Source location of the instruction starting at `offset`
    pub fn get_source_location(&self, offset: u16) -> Option<SourceLocation> {
        self.address_to_source
            .binary_search_by_key(&offset, |(start, _)| *start)
            .ok()
            .map(|idx| self.address_to_source[idx].1)
    }

    /// Address range emitted for a source line
    pub fn get_address_range(&self, line: usize) -> Option<AddressRange> {
        self.source_to_address
            .binary_search_by_key(&line, |(l, _)| *l)
            .ok()
            .map(|idx| self.source_to_address[idx].1)
    }

    /// Source line of the instruction covering `offset`, if any.
    pub fn line_for_offset(&self, offset: u16) -> Option<usize> {
        self.source_to_address
            .iter()
            .find(|(_, range)| range.contains(offset))
            .map(|(line, _)| *line)
    }

    /// Number of mapped instructions
    pub fn len(&self) -> usize {
        self.source_to_address.len()
    }

    pub fn is_empty(&self) -> bool {
        self.source_to_address.is_empty()
    }

    /// Sort both tables for binary search
    pub fn finalize(&mut self) {
        self.address_to_source.sort_by_key(|(start, _)| *start);
        self.source_to_address.sort_by_key(|(line, _)| *line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location(line: usize) -> SourceLocation {
        SourceLocation {
            line,
            column: 0,
            length: 3,
        }
    }

    #[test]
    fn test_source_map_add_lookup() {
        let mut map = SourceMap::new();
        map.add_instruction(location(3), AddressRange { start: 0x1004, end: 0x1007 });
        map.add_instruction(location(1), AddressRange { start: 0x1000, end: 0x1004 });
        map.finalize();

        assert_eq!(map.get_source_location(0x1000).unwrap().line, 1);
        assert_eq!(map.get_source_location(0x1004).unwrap().line, 3);
        assert!(map.get_source_location(0x1002).is_none());
        assert_eq!(map.get_address_range(3).unwrap().end, 0x1007);
        assert!(map.get_address_range(2).is_none());
        assert_eq!(map.line_for_offset(0x1006), Some(3));
        assert_eq!(map.line_for_offset(0x1007), None);
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_range_wraps_at_bank_end() {
        let range = AddressRange { start: 0xFFFE, end: 0x0001 };
        assert!(range.contains(0xFFFF));
        assert!(range.contains(0x0000));
        assert!(!range.contains(0x0001));
    }
}
