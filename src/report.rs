//! # Run Reports
//!
//! Summarizes a tally run: which structure ran, how much work it did, and
//! the words ranked by frequency. The report renders to any [`Write`] sink,
//! so the same path serves stdout and an output file.

use std::io::{self, Write};
use std::time::Duration;

use crate::traits::InstrumentedMap;

/// Outcome of tallying one input with one counter structure.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Human-readable structure label, e.g. `"avl"`.
    pub structure: String,
    /// Word occurrences counted, repeats included.
    pub occurrences: u64,
    /// Distinct words stored.
    pub distinct_words: usize,
    /// Key comparisons performed by the structure.
    pub comparisons: u64,
    /// Rotations (trees) or rehashes (hash tables).
    pub structural_ops: u64,
    /// Wall-clock time spent ingesting and tallying.
    pub elapsed: Duration,
    /// Words with their counts, most frequent first.
    pub ranking: Vec<(String, i64)>,
}

impl RunReport {
    /// Collects counters and ranking out of a finished map.
    pub fn from_map<M>(structure: &str, occurrences: u64, elapsed: Duration, map: &M) -> Self
    where
        M: InstrumentedMap<String>,
    {
        Self {
            structure: structure.to_string(),
            occurrences,
            distinct_words: map.len(),
            comparisons: map.comparisons(),
            structural_ops: map.structural_ops(),
            elapsed,
            ranking: map.by_frequency(),
        }
    }

    /// Renders the summary block followed by the full ranking table.
    ///
    /// # Errors
    ///
    /// Propagates any I/O error from the sink.
    pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "word frequency report")?;
        writeln!(out, "structure:      {}", self.structure)?;
        writeln!(out, "words counted:  {}", self.occurrences)?;
        writeln!(out, "distinct words: {}", self.distinct_words)?;
        writeln!(out, "comparisons:    {}", self.comparisons)?;
        writeln!(out, "structural ops: {}", self.structural_ops)?;
        writeln!(out, "elapsed:        {:?}", self.elapsed)?;
        writeln!(out)?;
        writeln!(out, "{:>6}  {:>10}  word", "rank", "count")?;
        for (rank, (word, count)) in self.ranking.iter().enumerate() {
            writeln!(out, "{:>6}  {:>10}  {}", rank + 1, count, word)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::ChainedCounterMap;
    use crate::traits::CounterMap;

    #[test]
    fn report_collects_map_state() {
        let mut map = ChainedCounterMap::new();
        for word in ["a", "b", "a"] {
            *map.counter(word.to_string()) += 1;
        }
        let report = RunReport::from_map("cht", 3, Duration::from_millis(5), &map);
        assert_eq!(report.distinct_words, 2);
        assert_eq!(report.occurrences, 3);
        assert_eq!(report.ranking[0], ("a".to_string(), 2));
    }

    #[test]
    fn rendered_report_lists_ranking_in_order() {
        let report = RunReport {
            structure: "avl".to_string(),
            occurrences: 6,
            distinct_words: 3,
            comparisons: 12,
            structural_ops: 1,
            elapsed: Duration::from_micros(420),
            ranking: vec![
                ("a".to_string(), 3),
                ("b".to_string(), 2),
                ("c".to_string(), 1),
            ],
        };
        let mut buf = Vec::new();
        report.write_to(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("structure:      avl"));
        assert!(text.contains("distinct words: 3"));
        let a_pos = text.find("  a").unwrap();
        let c_pos = text.find("  c").unwrap();
        assert!(a_pos < c_pos);
    }
}
