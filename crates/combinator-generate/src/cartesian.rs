use serde_json::Value;

use combinator_core::Variation;

/// Validated candidates per field, in field order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationMatrix {
    fields: Vec<(String, Vec<Value>)>,
}

impl ValidationMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field; a repeated name replaces the earlier candidates in place.
    pub fn push(&mut self, field: impl Into<String>, candidates: Vec<Value>) {
        let field = field.into();
        match self.fields.iter_mut().find(|(name, _)| *name == field) {
            Some((_, existing)) => *existing = candidates,
            None => self.fields.push((field, candidates)),
        }
    }

    pub fn with_field(mut self, field: impl Into<String>, candidates: Vec<Value>) -> Self {
        self.push(field, candidates);
        self
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Number of combinations the matrix yields; 0 when there are no fields.
    pub fn combination_count(&self) -> u128 {
        if self.fields.is_empty() {
            return 0;
        }
        self.fields
            .iter()
            .fold(1_u128, |acc, (_, candidates)| {
                acc.saturating_mul(candidates.len() as u128)
            })
    }

    /// Lazily enumerate combinations, last field varying fastest.
    pub fn combinations(&self) -> Combinations<'_> {
        let exhausted =
            self.fields.is_empty() || self.fields.iter().any(|(_, candidates)| candidates.is_empty());
        Combinations {
            matrix: self,
            indices: vec![0; self.fields.len()],
            exhausted,
        }
    }
}

/// Odometer iterator over a [`ValidationMatrix`].
#[derive(Debug, Clone)]
pub struct Combinations<'a> {
    matrix: &'a ValidationMatrix,
    indices: Vec<usize>,
    exhausted: bool,
}

impl Iterator for Combinations<'_> {
    type Item = Variation;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }

        let variation: Variation = self
            .matrix
            .fields
            .iter()
            .zip(&self.indices)
            .map(|((name, candidates), &idx)| (name.clone(), candidates[idx].clone()))
            .collect();

        self.exhausted = true;
        for (position, (_, candidates)) in self.matrix.fields.iter().enumerate().rev() {
            self.indices[position] += 1;
            if self.indices[position] < candidates.len() {
                self.exhausted = false;
                break;
            }
            self.indices[position] = 0;
        }

        Some(variation)
    }
}

/// Every combination of one candidate per field.
///
/// No fields, or any field without candidates, yields no combinations.
pub fn cartesian_product(matrix: &ValidationMatrix) -> Vec<Variation> {
    matrix.combinations().collect()
}
