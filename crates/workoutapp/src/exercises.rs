//! User-defined exercise names offered when building a workout.
//!
//! Names are trimmed and compared case-insensitively; the catalog never holds
//! two names that differ only by case or surrounding whitespace.

use crate::error::Result;
use crate::store::backend::StorageBackend;
use crate::store::Persistence;
use tracing::debug;

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExerciseCatalog {
    names: Vec<String>,
}

impl ExerciseCatalog {
    /// Cleans arbitrary input: blanks dropped, first spelling of a duplicate kept.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut catalog = Self::default();
        for name in names {
            catalog.add(name.as_ref());
        }
        catalog
    }

    pub fn load<B: StorageBackend>(persistence: &Persistence<B>) -> Self {
        Self::from_names(persistence.load_exercise_names())
    }

    pub fn save<B: StorageBackend>(&self, persistence: &Persistence<B>) -> Result<()> {
        persistence.save_exercise_names(&self.names)?;
        debug!(count = self.names.len(), "saved exercise catalog");
        Ok(())
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    fn position(&self, name: &str) -> Option<usize> {
        let wanted = normalize(name);
        self.names.iter().position(|n| normalize(n) == wanted)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Returns false for blank names and names already present.
    pub fn add(&mut self, name: &str) -> bool {
        let trimmed = name.trim();
        if trimmed.is_empty() || self.contains(trimmed) {
            return false;
        }
        self.names.push(trimmed.to_string());
        true
    }

    pub fn remove(&mut self, index: usize) -> Option<String> {
        (index < self.names.len()).then(|| self.names.remove(index))
    }

    /// Returns false if `old` is unknown, `new` is blank, or `new` collides
    /// with another entry. Changing only the case of `old` is allowed.
    pub fn rename(&mut self, old: &str, new: &str) -> bool {
        let new = new.trim();
        if new.is_empty() {
            return false;
        }
        let Some(index) = self.position(old) else {
            return false;
        };
        let wanted = normalize(new);
        let collides = self
            .names
            .iter()
            .enumerate()
            .any(|(i, n)| i != index && normalize(n) == wanted);
        if collides {
            return false;
        }
        self.names[index] = new.to_string();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::mem_backend::MemBackend;

    #[test]
    fn test_from_names_cleans_input() {
        let catalog = ExerciseCatalog::from_names([" Squat ", "", "squat", "Bench", "  "]);
        assert_eq!(catalog.names(), &["Squat".to_string(), "Bench".to_string()]);
    }

    #[test]
    fn test_add_is_case_insensitive() {
        let mut catalog = ExerciseCatalog::default();
        assert!(catalog.add("Pull-up"));
        assert!(!catalog.add("PULL-UP "));
        assert!(!catalog.add(" "));
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn test_remove_by_index() {
        let mut catalog = ExerciseCatalog::from_names(["A", "B", "C"]);
        assert_eq!(catalog.remove(1), Some("B".to_string()));
        assert_eq!(catalog.remove(5), None);
        assert_eq!(catalog.names(), &["A".to_string(), "C".to_string()]);
    }

    #[test]
    fn test_rename() {
        let mut catalog = ExerciseCatalog::from_names(["Squat", "Bench"]);
        assert!(catalog.rename("squat", "Back squat"));
        assert!(catalog.contains("BACK SQUAT"));
        assert!(!catalog.contains("Squat"));

        // collisions and unknown names are refused
        assert!(!catalog.rename("Back squat", "bench"));
        assert!(!catalog.rename("Deadlift", "Hinge"));
        assert!(!catalog.rename("Bench", "  "));

        // re-casing the same entry is fine
        assert!(catalog.rename("bench", "BENCH"));
        assert_eq!(catalog.names()[1], "BENCH");
    }

    #[test]
    fn test_persists_through_gateway() {
        let persistence = Persistence::new(MemBackend::new());
        let catalog = ExerciseCatalog::from_names(["Row", "Curl"]);
        catalog.save(&persistence).unwrap();

        assert_eq!(ExerciseCatalog::load(&persistence), catalog);
    }
}
