use std::collections::HashMap;

use crate::parser::analyzer::ColumnMetadata;

/// Hands out names that were not handed out before: `count`, `count_2`, `count_3`.
///
/// A generated candidate that collides with an earlier name is suffixed again
/// (`count_2_2`), so the output never repeats.
#[derive(Debug, Default)]
pub struct UniqueNameGenerator {
    seen: HashMap<String, usize>,
}

impl UniqueNameGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unique_name(&mut self, name: &str) -> String {
        let mut candidate = name.to_string();
        loop {
            let count = self.seen.entry(candidate.clone()).or_insert(0);
            *count += 1;
            if *count == 1 {
                return candidate;
            }
            let n = *count;
            candidate = format!("{candidate}_{n}");
        }
    }
}

pub struct NameDedup;

impl NameDedup {
    /// Rename columns so every `name` is distinct; first occurrences keep their name.
    pub fn dedupe(columns: Vec<ColumnMetadata>) -> Vec<ColumnMetadata> {
        let mut names = UniqueNameGenerator::new();
        columns
            .into_iter()
            .map(|mut col| {
                col.name = names.unique_name(&col.name);
                col
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::BaseType;
    use std::collections::HashSet;

    fn cols(names: &[&str]) -> Vec<ColumnMetadata> {
        names.iter().map(|n| ColumnMetadata::new(n, n, BaseType::Integer)).collect()
    }

    fn names(cols: &[ColumnMetadata]) -> Vec<&str> {
        cols.iter().map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn suffixes_later_collisions() {
        let out = NameDedup::dedupe(cols(&["count", "sum", "count", "count"]));
        assert_eq!(names(&out), vec!["count", "sum", "count_2", "count_3"]);
    }

    #[test]
    fn generated_names_do_not_collide_with_real_ones() {
        let out = NameDedup::dedupe(cols(&["a", "a", "a_2"]));
        assert_eq!(names(&out), vec!["a", "a_2", "a_2_2"]);
        let distinct: HashSet<_> = names(&out).into_iter().collect();
        assert_eq!(distinct.len(), 3);
    }

    #[test]
    fn idempotent() {
        let once = NameDedup::dedupe(cols(&["x", "x", "y", "x_2", "x"]));
        let twice = NameDedup::dedupe(once.clone());
        assert_eq!(names(&once), names(&twice));
    }
}
