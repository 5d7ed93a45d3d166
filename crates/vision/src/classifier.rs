//! Symbol classifier - maps one sampled color to a [`Symbol`]
//!
//! A [`ClassifierTable`] is an ordered list of reference colors. A sample
//! classifies as the symbol of the closest reference within `tolerance`; the
//! boundary is inclusive, and equally close references resolve to the one
//! declared first. Nothing within tolerance gives [`Symbol::Unknown`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{Color, Symbol};

/// Manhattan tolerance of the default table
///
/// Bombs are drawn in dark tints close to the background; at twice this value
/// the yellow bomb and the empty cell are still apart.
pub const DEFAULT_TOLERANCE: u32 = 18;

/// The game palette at 1920x1080, plus the references for cells the game
/// draws without a solid block color
pub const PALETTE_1920X1080: [(Symbol, Color); 13] = [
    (Symbol::Empty, Color::new(20, 21, 31)),
    (Symbol::Yellow, Color::new(235, 163, 24)),
    (Symbol::Green, Color::new(18, 186, 156)),
    (Symbol::Red, Color::new(220, 23, 49)),
    (Symbol::Pink, Color::new(251, 23, 184)),
    (Symbol::Blue, Color::new(32, 57, 130)),
    (Symbol::Obstacle, Color::new(96, 96, 96)),
    (Symbol::Wildcard, Color::new(236, 236, 236)),
    (Symbol::YellowBomb, Color::new(29, 27, 8)),
    (Symbol::GreenBomb, Color::new(3, 40, 45)),
    (Symbol::RedBomb, Color::new(66, 9, 15)),
    (Symbol::PinkBomb, Color::new(60, 0, 50)),
    (Symbol::BlueBomb, Color::new(9, 4, 51)),
];

/// Slightly darker block colors rendered at 1920x1200
pub const PALETTE_1920X1200: [(Symbol, Color); 10] = [
    (Symbol::Yellow, Color::new(232, 161, 23)),
    (Symbol::Green, Color::new(18, 183, 153)),
    (Symbol::Red, Color::new(217, 22, 48)),
    (Symbol::Pink, Color::new(247, 22, 182)),
    (Symbol::Blue, Color::new(32, 56, 128)),
    (Symbol::YellowBomb, Color::new(29, 26, 7)),
    (Symbol::GreenBomb, Color::new(3, 39, 44)),
    (Symbol::RedBomb, Color::new(65, 8, 14)),
    (Symbol::PinkBomb, Color::new(59, 0, 50)),
    (Symbol::BlueBomb, Color::new(8, 4, 51)),
];

/// Green drifts by one unit at 1600x900 and 1366x768; its bomb does not
pub const PALETTE_LOW_RES: [(Symbol, Color); 2] = [
    (Symbol::Green, Color::new(18, 186, 155)),
    (Symbol::GreenBomb, Color::new(3, 40, 45)),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    /// Sum of per-channel absolute differences
    #[default]
    Manhattan,
    /// Straight-line distance in RGB space
    Euclidean,
}

impl Metric {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "manhattan" => Some(Metric::Manhattan),
            "euclidean" => Some(Metric::Euclidean),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Manhattan => "manhattan",
            Metric::Euclidean => "euclidean",
        }
    }

    /// Distance in comparable units (squared for Euclidean)
    fn distance(&self, a: &Color, b: &Color) -> u32 {
        match self {
            Metric::Manhattan => a.manhattan(b),
            Metric::Euclidean => a.euclidean_sq(b),
        }
    }

    /// `tolerance` expressed in the units of [`Metric::distance`]
    fn radius(&self, tolerance: u32) -> u32 {
        match self {
            Metric::Manhattan => tolerance,
            Metric::Euclidean => tolerance.saturating_mul(tolerance),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    #[error("classifier table has no entries")]
    Empty,
    #[error("entry {0} maps to unknown")]
    UnknownEntry(usize),
    #[error("references for {first} ({a}) and {second} ({b}) overlap within tolerance {tolerance}")]
    Overlap {
        first: Symbol,
        a: Color,
        second: Symbol,
        b: Color,
        tolerance: u32,
    },
}

/// One (symbol, reference color) row of a table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassEntry {
    pub symbol: Symbol,
    pub reference: Color,
}

/// Reference colors, tolerance and metric, passed explicitly to every caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifierTable {
    entries: Vec<ClassEntry>,
    tolerance: u32,
    metric: Metric,
}

impl ClassifierTable {
    /// Build a table; entries keep their order for tie-breaks
    pub fn new(entries: Vec<ClassEntry>, tolerance: u32, metric: Metric) -> Self {
        Self {
            entries,
            tolerance,
            metric,
        }
    }

    /// Build from `(symbol, color)` pairs
    pub fn from_pairs(pairs: &[(Symbol, Color)], tolerance: u32, metric: Metric) -> Self {
        let entries = pairs
            .iter()
            .map(|&(symbol, reference)| ClassEntry { symbol, reference })
            .collect();
        Self::new(entries, tolerance, metric)
    }

    pub fn entries(&self) -> &[ClassEntry] {
        &self.entries
    }

    pub fn tolerance(&self) -> u32 {
        self.tolerance
    }

    pub fn metric(&self) -> Metric {
        self.metric
    }

    /// First reference declared for `symbol`
    pub fn reference(&self, symbol: Symbol) -> Option<Color> {
        self.entries
            .iter()
            .find(|e| e.symbol == symbol)
            .map(|e| e.reference)
    }

    /// Classify one sample
    pub fn classify(&self, sample: Color) -> Symbol {
        let radius = self.metric.radius(self.tolerance);
        let mut best: Option<(u32, Symbol)> = None;
        for entry in &self.entries {
            let d = self.metric.distance(&sample, &entry.reference);
            if d > radius {
                continue;
            }
            // Strictly closer only: earlier entries win ties.
            if best.map_or(true, |(best_d, _)| d < best_d) {
                best = Some((d, entry.symbol));
            }
        }
        best.map(|(_, symbol)| symbol).unwrap_or(Symbol::Unknown)
    }

    /// Reject tables that could classify one sample as two different symbols
    ///
    /// Aliases of the same symbol may overlap freely.
    pub fn validate(&self) -> Result<(), TableError> {
        if self.entries.is_empty() {
            return Err(TableError::Empty);
        }
        if let Some(i) = self.entries.iter().position(|e| e.symbol == Symbol::Unknown) {
            return Err(TableError::UnknownEntry(i));
        }
        let reach = self.metric.radius(self.tolerance.saturating_mul(2));
        for (i, a) in self.entries.iter().enumerate() {
            for b in &self.entries[i + 1..] {
                if a.symbol != b.symbol && self.metric.distance(&a.reference, &b.reference) <= reach {
                    return Err(TableError::Overlap {
                        first: a.symbol,
                        a: a.reference,
                        second: b.symbol,
                        b: b.reference,
                        tolerance: self.tolerance,
                    });
                }
            }
        }
        Ok(())
    }
}

impl Default for ClassifierTable {
    /// The 1920x1080 palette followed by the other resolutions' aliases
    fn default() -> Self {
        let pairs: Vec<(Symbol, Color)> = PALETTE_1920X1080
            .iter()
            .chain(PALETTE_1920X1200.iter())
            .chain(PALETTE_LOW_RES.iter())
            .copied()
            .collect();
        Self::from_pairs(&pairs, DEFAULT_TOLERANCE, Metric::Manhattan)
    }
}

/// [`ClassifierTable::classify`] as a free function
pub fn classify(sample: Color, table: &ClassifierTable) -> Symbol {
    table.classify(sample)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_references_classify_exactly() {
        let table = ClassifierTable::default();
        for entry in table.entries() {
            assert_eq!(table.classify(entry.reference), entry.symbol);
        }
    }

    #[test]
    fn test_default_table_is_valid() {
        assert_eq!(ClassifierTable::default().validate(), Ok(()));
    }

    #[test]
    fn test_manhattan_boundary_is_inclusive() {
        let table = ClassifierTable::from_pairs(
            &[(Symbol::Red, Color::new(100, 100, 100))],
            10,
            Metric::Manhattan,
        );
        // distance 10
        assert_eq!(table.classify(Color::new(104, 97, 103)), Symbol::Red);
        // distance 11
        assert_eq!(table.classify(Color::new(104, 97, 104)), Symbol::Unknown);
    }

    #[test]
    fn test_euclidean_boundary_is_inclusive() {
        let table = ClassifierTable::from_pairs(
            &[(Symbol::Blue, Color::new(50, 50, 50))],
            5,
            Metric::Euclidean,
        );
        // 3-4-5 triangle: distance exactly 5
        assert_eq!(table.classify(Color::new(53, 54, 50)), Symbol::Blue);
        // sqrt(26) > 5
        assert_eq!(table.classify(Color::new(55, 51, 50)), Symbol::Unknown);
    }

    #[test]
    fn test_closest_reference_wins() {
        let table = ClassifierTable::from_pairs(
            &[
                (Symbol::Red, Color::new(100, 0, 0)),
                (Symbol::Pink, Color::new(120, 0, 0)),
            ],
            30,
            Metric::Manhattan,
        );
        assert_eq!(table.classify(Color::new(115, 0, 0)), Symbol::Pink);
        assert_eq!(table.classify(Color::new(105, 0, 0)), Symbol::Red);
    }

    #[test]
    fn test_ties_follow_declaration_order() {
        let a = ClassifierTable::from_pairs(
            &[
                (Symbol::Red, Color::new(100, 0, 0)),
                (Symbol::Pink, Color::new(120, 0, 0)),
            ],
            30,
            Metric::Manhattan,
        );
        assert_eq!(a.classify(Color::new(110, 0, 0)), Symbol::Red);

        let b = ClassifierTable::from_pairs(
            &[
                (Symbol::Pink, Color::new(120, 0, 0)),
                (Symbol::Red, Color::new(100, 0, 0)),
            ],
            30,
            Metric::Manhattan,
        );
        assert_eq!(b.classify(Color::new(110, 0, 0)), Symbol::Pink);
    }

    #[test]
    fn test_alias_palettes() {
        let table = ClassifierTable::default();
        assert_eq!(table.classify(Color::new(232, 161, 23)), Symbol::Yellow);
        assert_eq!(table.classify(Color::new(18, 186, 155)), Symbol::Green);
        assert_eq!(table.reference(Symbol::Yellow), Some(Color::new(235, 163, 24)));
        assert_eq!(table.classify(Color::new(128, 0, 255)), Symbol::Unknown);
    }

    #[test]
    fn test_bomb_samples() {
        let table = ClassifierTable::default();
        assert_eq!(table.classify(Color::new(29, 27, 8)), Symbol::YellowBomb);
        assert_eq!(table.classify(Color::new(8, 4, 51)), Symbol::BlueBomb);
        assert_eq!(table.classify(Color::new(65, 8, 14)), Symbol::RedBomb);
        // A slightly brighter background is still empty, not a bomb.
        assert_eq!(table.classify(Color::new(24, 24, 33)), Symbol::Empty);
        for bomb in Symbol::BOMBS {
            assert!(table.reference(bomb).is_some(), "{bomb:?} has no reference");
        }
    }

    #[test]
    fn test_validate_rejects_bad_tables() {
        let empty = ClassifierTable::new(Vec::new(), 10, Metric::Manhattan);
        assert_eq!(empty.validate(), Err(TableError::Empty));

        let unknown = ClassifierTable::from_pairs(
            &[(Symbol::Unknown, Color::new(0, 0, 0))],
            10,
            Metric::Manhattan,
        );
        assert_eq!(unknown.validate(), Err(TableError::UnknownEntry(0)));

        let overlap = ClassifierTable::from_pairs(
            &[
                (Symbol::Red, Color::new(100, 0, 0)),
                (Symbol::Pink, Color::new(120, 0, 0)),
            ],
            10,
            Metric::Manhattan,
        );
        assert!(matches!(overlap.validate(), Err(TableError::Overlap { .. })));

        let aliases = ClassifierTable::from_pairs(
            &[
                (Symbol::Red, Color::new(100, 0, 0)),
                (Symbol::Red, Color::new(102, 0, 0)),
            ],
            10,
            Metric::Manhattan,
        );
        assert_eq!(aliases.validate(), Ok(()));
    }

    #[test]
    fn test_metric_names() {
        for metric in [Metric::Manhattan, Metric::Euclidean] {
            assert_eq!(Metric::parse(metric.as_str()), Some(metric));
        }
        assert_eq!(Metric::parse("cosine"), None);
    }
}
