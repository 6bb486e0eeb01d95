//! Common types used throughout uniseq

use crate::formats::FormatId;
use regex::{Regex, RegexBuilder};

/// Molecule type declared by a record's format or guessed from its residues
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoleculeType {
    /// DNA/RNA
    Nucleotide,
    /// Amino-acid sequence
    Protein,
    /// Format carried no type information and the guess was inconclusive
    Unknown,
}

impl MoleculeType {
    /// Guess the molecule type from residue composition.
    ///
    /// A sequence whose residues are at least 85% `ACGTUN` (case-insensitive,
    /// gaps ignored) is taken to be nucleotide; anything else is protein.
    /// Empty sequences are `Unknown`.
    pub fn guess(sequence: &[u8]) -> Self {
        let mut total = 0usize;
        let mut nucleic = 0usize;
        for &b in sequence {
            match b {
                b'-' | b'.' | b'*' | b' ' => continue,
                _ => {}
            }
            total += 1;
            if matches!(
                b.to_ascii_uppercase(),
                b'A' | b'C' | b'G' | b'T' | b'U' | b'N'
            ) {
                nucleic += 1;
            }
        }
        if total == 0 {
            MoleculeType::Unknown
        } else if nucleic * 100 >= total * 85 {
            MoleculeType::Nucleotide
        } else {
            MoleculeType::Protein
        }
    }

    /// Whether a record of type `found` satisfies this constraint
    pub fn accepts(self, found: MoleculeType) -> bool {
        self == MoleculeType::Unknown || found == MoleculeType::Unknown || self == found
    }
}

/// One parsed biological sequence plus its header metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeqRecord {
    /// Primary sequence name (entry identifier)
    pub name: String,
    /// Accession numbers, first is primary
    pub accessions: Vec<String>,
    /// Free-text description
    pub description: String,
    /// Residues, gaps included, no whitespace
    pub sequence: Vec<u8>,
    /// Declared or guessed molecule type
    pub molecule: MoleculeType,
    /// 1-based inclusive start requested by the address, may be negative
    pub begin: Option<i64>,
    /// 1-based inclusive end requested by the address, may be negative
    pub end: Option<i64>,
    /// Whether the address requested the reverse strand
    pub reverse: bool,
    /// Raw feature-table lines carried through from flat formats
    pub features: Vec<String>,
    /// Format the record was actually read in
    pub format: Option<FormatId>,
}

impl SeqRecord {
    /// Create a record with just a name and residues
    pub fn new(name: impl Into<String>, sequence: Vec<u8>) -> Self {
        let molecule = MoleculeType::guess(&sequence);
        Self {
            name: name.into(),
            accessions: Vec::new(),
            description: String::new(),
            sequence,
            molecule,
            begin: None,
            end: None,
            reverse: false,
            features: Vec::new(),
            format: None,
        }
    }

    /// Sequence length in residues
    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    /// Whether the record has an empty sequence
    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    /// Primary accession, if any
    pub fn accession(&self) -> Option<&str> {
        self.accessions.first().map(|s| s.as_str())
    }

    /// Resolve the requested `begin`/`end` against the actual sequence length.
    ///
    /// Negative bounds count from the end of the sequence (`-1` is the last
    /// residue). The result is clamped so that `1 <= begin <= end <= len`;
    /// returns `None` when no range was requested or the sequence is empty.
    pub fn resolved_range(&self) -> Option<(usize, usize)> {
        if self.begin.is_none() && self.end.is_none() {
            return None;
        }
        let len = self.sequence.len() as i64;
        if len == 0 {
            return None;
        }
        let resolve = |v: i64| -> i64 {
            if v < 0 {
                len + v + 1
            } else {
                v
            }
        };
        let begin = resolve(self.begin.unwrap_or(1)).clamp(1, len);
        let end = resolve(self.end.unwrap_or(len)).clamp(1, len);
        if begin > end {
            return None;
        }
        Some((begin as usize, end as usize))
    }

    /// The residues selected by the requested range, or the whole sequence
    pub fn ranged_sequence(&self) -> &[u8] {
        match self.resolved_range() {
            Some((b, e)) => &self.sequence[b - 1..e],
            None => &self.sequence,
        }
    }
}

/// Which record fields a database query filters on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryLevel {
    /// Entry name only (`db-id:PATTERN`)
    Id,
    /// Accessions only (`db-acc:PATTERN`)
    Acc,
    /// Entry name or accession (default)
    Both,
}

/// Wildcard filters applied to records drawn from one address.
///
/// Patterns use `*` (any run) and `?` (any single character) and match
/// case-insensitively against the whole field. The filter persists for the
/// lifetime of the stream session so repeated reads re-apply it.
#[derive(Debug, Clone, Default)]
pub struct Query {
    id: Option<Regex>,
    acc: Option<Regex>,
    des: Option<Regex>,
}

impl Query {
    /// A query that matches every record
    pub fn any() -> Self {
        Self::default()
    }

    /// Build a query from a database-address pattern at the given level
    pub fn from_pattern(pattern: &str, level: QueryLevel) -> Self {
        let re = compile_wildcard(pattern);
        let mut query = Self::default();
        match level {
            QueryLevel::Id => query.id = re,
            QueryLevel::Acc => query.acc = re,
            QueryLevel::Both => {
                query.id = re.clone();
                query.acc = re;
            }
        }
        query
    }

    /// Filter on the entry name
    pub fn with_id(mut self, pattern: &str) -> Self {
        self.id = compile_wildcard(pattern);
        self
    }

    /// Filter on accessions
    pub fn with_acc(mut self, pattern: &str) -> Self {
        self.acc = compile_wildcard(pattern);
        self
    }

    /// Filter on the description
    pub fn with_des(mut self, pattern: &str) -> Self {
        self.des = compile_wildcard(pattern);
        self
    }

    /// Whether this query accepts every record
    pub fn is_empty(&self) -> bool {
        self.id.is_none() && self.acc.is_none() && self.des.is_none()
    }

    /// Apply the filter to a record.
    ///
    /// When both an id and an acc pattern are present (the default query
    /// level), a record passes if either field matches.
    pub fn matches(&self, record: &SeqRecord) -> bool {
        if self.is_empty() {
            return true;
        }
        let id_hit = self
            .id
            .as_ref()
            .map(|re| re.is_match(&record.name));
        let acc_hit = self.acc.as_ref().map(|re| {
            record.accessions.iter().any(|a| re.is_match(a))
        });
        let des_hit = self
            .des
            .as_ref()
            .map(|re| re.is_match(&record.description));

        // id/acc are alternatives for the same pattern; des is conjunctive
        let id_acc_ok = match (id_hit, acc_hit) {
            (None, None) => true,
            (Some(i), None) => i,
            (None, Some(a)) => a,
            (Some(i), Some(a)) => i || a,
        };
        id_acc_ok && des_hit.unwrap_or(true)
    }
}

/// Compile a `*`/`?` wildcard into an anchored case-insensitive regex.
///
/// Returns `None` for patterns that match everything, so empty filters
/// cost nothing per record.
fn compile_wildcard(pattern: &str) -> Option<Regex> {
    if pattern.is_empty() || pattern == "*" {
        return None;
    }
    let mut expr = String::with_capacity(pattern.len() + 8);
    expr.push('^');
    for ch in pattern.chars() {
        match ch {
            '*' => expr.push_str(".*"),
            '?' => expr.push('.'),
            c => expr.push_str(&regex::escape(&c.to_string())),
        }
    }
    expr.push('$');
    RegexBuilder::new(&expr)
        .case_insensitive(true)
        .build()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guess_nucleotide() {
        assert_eq!(MoleculeType::guess(b"ACGTACGTNN"), MoleculeType::Nucleotide);
        assert_eq!(MoleculeType::guess(b"acgu-acgu"), MoleculeType::Nucleotide);
    }

    #[test]
    fn test_guess_protein() {
        assert_eq!(
            MoleculeType::guess(b"MKVLWAALLVTFLAGCQA"),
            MoleculeType::Protein
        );
    }

    #[test]
    fn test_guess_empty() {
        assert_eq!(MoleculeType::guess(b""), MoleculeType::Unknown);
        assert_eq!(MoleculeType::guess(b"---"), MoleculeType::Unknown);
    }

    #[test]
    fn test_accepts() {
        assert!(MoleculeType::Unknown.accepts(MoleculeType::Protein));
        assert!(MoleculeType::Protein.accepts(MoleculeType::Unknown));
        assert!(MoleculeType::Protein.accepts(MoleculeType::Protein));
        assert!(!MoleculeType::Protein.accepts(MoleculeType::Nucleotide));
    }

    #[test]
    fn test_resolved_range_positive() {
        let mut rec = SeqRecord::new("s", b"ACGTACGTAC".to_vec());
        rec.begin = Some(3);
        rec.end = Some(7);
        assert_eq!(rec.resolved_range(), Some((3, 7)));
        assert_eq!(rec.ranged_sequence(), b"GTACG");
    }

    #[test]
    fn test_resolved_range_negative() {
        let mut rec = SeqRecord::new("s", b"ACGTACGTAC".to_vec());
        rec.begin = Some(-4);
        rec.end = Some(-1);
        assert_eq!(rec.resolved_range(), Some((7, 10)));
        assert_eq!(rec.ranged_sequence(), b"GTAC");
    }

    #[test]
    fn test_resolved_range_clamped() {
        let mut rec = SeqRecord::new("s", b"ACGT".to_vec());
        rec.begin = Some(1);
        rec.end = Some(100);
        assert_eq!(rec.resolved_range(), Some((1, 4)));
    }

    #[test]
    fn test_resolved_range_unset() {
        let rec = SeqRecord::new("s", b"ACGT".to_vec());
        assert_eq!(rec.resolved_range(), None);
        assert_eq!(rec.ranged_sequence(), b"ACGT");
    }

    #[test]
    fn test_query_id_wildcard() {
        let q = Query::any().with_id("FOO*");
        assert!(q.matches(&SeqRecord::new("FOOBAR", b"ACGT".to_vec())));
        assert!(q.matches(&SeqRecord::new("foo", b"ACGT".to_vec())));
        assert!(!q.matches(&SeqRecord::new("BAZ", b"ACGT".to_vec())));
    }

    #[test]
    fn test_query_default_level_matches_either_field() {
        let q = Query::from_pattern("P1234?", QueryLevel::Both);
        let mut rec = SeqRecord::new("HBA_HUMAN", b"MKV".to_vec());
        rec.accessions.push("P12345".to_string());
        assert!(q.matches(&rec));
    }

    #[test]
    fn test_query_acc_level_ignores_name() {
        let q = Query::from_pattern("HBA*", QueryLevel::Acc);
        let rec = SeqRecord::new("HBA_HUMAN", b"MKV".to_vec());
        assert!(!q.matches(&rec));
    }

    #[test]
    fn test_query_question_mark() {
        let q = Query::any().with_id("SEQ?");
        assert!(q.matches(&SeqRecord::new("SEQ1", b"A".to_vec())));
        assert!(!q.matches(&SeqRecord::new("SEQ10", b"A".to_vec())));
    }

    #[test]
    fn test_empty_query_matches_all() {
        let q = Query::any();
        assert!(q.is_empty());
        assert!(q.matches(&SeqRecord::new("anything", b"A".to_vec())));
    }

    // Property-based tests
    use proptest::prelude::*;

    proptest! {
        /// A literal pattern (no wildcards) matches exactly itself
        #[test]
        fn test_literal_pattern_exact(name in "[A-Za-z0-9_]{1,20}") {
            let q = Query::any().with_id(&name);
            prop_assert!(q.matches(&SeqRecord::new(name.clone(), vec![b'A'])));
            let other = format!("{}x", name);
            prop_assert!(!q.matches(&SeqRecord::new(other, vec![b'A'])));
        }

        /// A prefix wildcard matches any extension of the prefix
        #[test]
        fn test_prefix_wildcard(
            prefix in "[A-Za-z]{1,10}",
            suffix in "[A-Za-z0-9]{0,10}",
        ) {
            let q = Query::any().with_id(&format!("{}*", prefix));
            let name = format!("{}{}", prefix, suffix);
            prop_assert!(q.matches(&SeqRecord::new(name, vec![b'A'])));
        }

        /// Range resolution always lands inside the sequence
        #[test]
        fn test_range_resolution_in_bounds(
            len in 1..200usize,
            begin in -250..250i64,
            end in -250..250i64,
        ) {
            let mut rec = SeqRecord::new("s", vec![b'A'; len]);
            rec.begin = Some(begin);
            rec.end = Some(end);
            if let Some((b, e)) = rec.resolved_range() {
                prop_assert!(b >= 1);
                prop_assert!(b <= e);
                prop_assert!(e <= len);
            }
        }
    }
}
