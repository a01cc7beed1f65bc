//! First-match classification of pixels against predefined color buckets.

use agro_common::ColorDefinition;

use crate::raster::PixelSample;

/// Per-bucket counts from one classification pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationTally {
    /// One count per definition, in definition order.
    pub counts: Vec<u64>,
    /// Opaque pixels seen, matched or not.
    pub analyzed: u64,
    /// Pixels that landed in some bucket.
    pub matched: u64,
}

impl ClassificationTally {
    fn new(buckets: usize) -> Self {
        Self {
            counts: vec![0; buckets],
            analyzed: 0,
            matched: 0,
        }
    }

    /// Share of analyzed pixels that matched, in percent. 0 when nothing was analyzed.
    pub fn match_percentage(&self) -> f64 {
        if self.analyzed == 0 {
            0.0
        } else {
            self.matched as f64 / self.analyzed as f64 * 100.0
        }
    }

    /// True when the match rate is strictly below `threshold_percent`.
    ///
    /// Integer arithmetic, so a rate of exactly the threshold is not below it.
    /// An empty tally is never below: there is nothing to fall back on.
    pub fn below_threshold(&self, threshold_percent: u8) -> bool {
        self.analyzed > 0
            && (self.matched as u128) * 100 < (self.analyzed as u128) * threshold_percent as u128
    }
}

/// Tests pixels against an ordered list of definitions.
pub struct Classifier<'a> {
    definitions: &'a [ColorDefinition],
}

impl<'a> Classifier<'a> {
    pub fn new(definitions: &'a [ColorDefinition]) -> Self {
        Self { definitions }
    }

    /// Index of the first definition matching `sample`, if any.
    #[inline]
    pub fn classify(&self, sample: &PixelSample) -> Option<usize> {
        self.definitions
            .iter()
            .position(|def| def.matches(sample.r, sample.g, sample.b))
    }

    /// Classify every sample. Unmatched samples count toward `analyzed` only.
    pub fn run<I>(&self, samples: I) -> ClassificationTally
    where
        I: IntoIterator<Item = PixelSample>,
    {
        let mut tally = ClassificationTally::new(self.definitions.len());

        for sample in samples {
            tally.analyzed += 1;
            if let Some(idx) = self.classify(&sample) {
                tally.counts[idx] += 1;
                tally.matched += 1;
            }
        }

        tally
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agro_common::Rgb;

    fn opaque(r: u8, g: u8, b: u8) -> PixelSample {
        PixelSample::new(r, g, b, 255)
    }

    #[test]
    fn test_tolerance_boundary() {
        let defs = vec![ColorDefinition::new("Veg", Rgb::new(100, 100, 100), 10)];
        let classifier = Classifier::new(&defs);

        assert_eq!(classifier.classify(&opaque(110, 90, 110)), Some(0));
        assert_eq!(classifier.classify(&opaque(90, 110, 90)), Some(0));
        assert_eq!(classifier.classify(&opaque(111, 100, 100)), None);
        assert_eq!(classifier.classify(&opaque(100, 100, 89)), None);
    }

    #[test]
    fn test_first_match_wins() {
        let defs = vec![
            ColorDefinition::new("Wide", Rgb::new(100, 100, 100), 50),
            ColorDefinition::new("Narrow", Rgb::new(100, 100, 100), 5),
        ];
        let tally = Classifier::new(&defs).run(vec![opaque(100, 100, 100); 3]);

        assert_eq!(tally.counts, vec![3, 0]);
        assert_eq!(tally.matched, 3);
    }

    #[test]
    fn test_unmatched_counted_as_analyzed() {
        let defs = vec![ColorDefinition::new("Black", Rgb::new(0, 0, 0), 0)];
        let tally = Classifier::new(&defs).run(vec![opaque(0, 0, 0), opaque(255, 255, 255)]);

        assert_eq!(tally.analyzed, 2);
        assert_eq!(tally.matched, 1);
        assert_eq!(tally.counts, vec![1]);
    }

    #[test]
    fn test_below_threshold_is_exact() {
        let at = ClassificationTally {
            counts: vec![3],
            analyzed: 10,
            matched: 3,
        };
        assert!(!at.below_threshold(30));

        let under = ClassificationTally {
            counts: vec![29],
            analyzed: 100,
            matched: 29,
        };
        assert!(under.below_threshold(30));
    }

    #[test]
    fn test_empty_tally_never_below() {
        let tally = Classifier::new(&[]).run(Vec::new());
        assert_eq!(tally.match_percentage(), 0.0);
        assert!(!tally.below_threshold(30));
    }
}
