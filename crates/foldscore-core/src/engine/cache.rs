use super::error::EngineError;
use crate::core::forcefield::term::EnergyTerm;

/// Cached local terms (everything except compactness) for every residue.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreCache {
    entries: Vec<EnergyTerm>,
}

impl ScoreCache {
    pub fn new(entries: Vec<EnergyTerm>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, res_idx: usize) -> Option<&EnergyTerm> {
        self.entries.get(res_idx)
    }

    /// Stores a residue's terms and returns the previous value.
    pub fn replace(&mut self, res_idx: usize, terms: EnergyTerm) -> Result<EnergyTerm, EngineError> {
        let len = self.entries.len();
        let slot = self.entries.get_mut(res_idx).ok_or_else(|| {
            EngineError::CacheInconsistency(format!(
                "residue {res_idx} has no cache entry (cache holds {len})"
            ))
        })?;
        Ok(std::mem::replace(slot, terms))
    }

    pub fn entries(&self) -> &[EnergyTerm] {
        &self.entries
    }

    pub fn ensure_len(&self, residue_count: usize) -> Result<(), EngineError> {
        if self.entries.len() == residue_count {
            Ok(())
        } else {
            Err(EngineError::CacheInconsistency(format!(
                "cache holds {} entries for {residue_count} residues",
                self.entries.len()
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replace_returns_previous_entry() {
        let mut cache = ScoreCache::new(vec![EnergyTerm::default(); 2]);
        let new = EnergyTerm {
            clash: 2.0,
            ..EnergyTerm::default()
        };
        let old = cache.replace(1, new).unwrap();
        assert_eq!(old, EnergyTerm::default());
        assert_eq!(cache.get(1), Some(&new));
    }

    #[test]
    fn out_of_range_replace_is_an_inconsistency() {
        let mut cache = ScoreCache::new(vec![EnergyTerm::default(); 2]);
        assert!(matches!(
            cache.replace(5, EnergyTerm::default()),
            Err(EngineError::CacheInconsistency(_))
        ));
    }

    #[test]
    fn length_mismatch_is_detected() {
        let cache = ScoreCache::new(vec![EnergyTerm::default(); 3]);
        assert!(cache.ensure_len(3).is_ok());
        assert!(matches!(
            cache.ensure_len(4),
            Err(EngineError::CacheInconsistency(_))
        ));
    }
}
