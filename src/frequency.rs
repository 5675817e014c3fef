use std::collections::HashMap;

use serde::Serialize;

use crate::data::CellValue;

const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub value: String,
    pub count: usize,
    pub percentage: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoricalStats {
    pub unique_value_count: usize,
    pub most_common_value: String,
    pub most_common_count: usize,
    /// Every distinct value, most frequent first; ties keep first-seen order.
    pub top_categories: Vec<CategoryCount>,
}

impl CategoricalStats {
    /// The first `n` categories, or all of them when `n` is 0.
    pub fn top(&self, n: usize) -> &[CategoryCount] {
        if n == 0 || n >= self.top_categories.len() {
            &self.top_categories
        } else {
            &self.top_categories[..n]
        }
    }
}

pub fn categorical_stats(values: &[CellValue]) -> CategoricalStats {
    let mut accumulator = FrequencyAccumulator::default();
    for value in values.iter().filter(|value| !value.is_empty()) {
        accumulator.record(value.display());
    }
    accumulator.finalize()
}

#[derive(Default)]
struct FrequencyAccumulator {
    total: usize,
    positions: HashMap<String, usize>,
    counts: Vec<(String, usize)>,
}

impl FrequencyAccumulator {
    fn record(&mut self, value: String) {
        self.total += 1;
        if let Some(&position) = self.positions.get(&value) {
            self.counts[position].1 += 1;
            return;
        }
        self.positions.insert(value.clone(), self.counts.len());
        self.counts.push((value, 1));
    }

    fn finalize(self) -> CategoricalStats {
        if self.total == 0 {
            return CategoricalStats {
                unique_value_count: 0,
                most_common_value: NOT_AVAILABLE.to_string(),
                most_common_count: 0,
                top_categories: Vec::new(),
            };
        }

        let mut most_common: Option<&(String, usize)> = None;
        for entry in &self.counts {
            if most_common.is_none_or(|best| entry.1 > best.1) {
                most_common = Some(entry);
            }
        }
        let (most_common_value, most_common_count) = most_common
            .map(|(value, count)| (value.clone(), *count))
            .unwrap_or_else(|| (NOT_AVAILABLE.to_string(), 0));

        let total = self.total;
        let unique_value_count = self.counts.len();
        let mut items = self.counts;
        items.sort_by(|a, b| b.1.cmp(&a.1));
        let top_categories = items
            .into_iter()
            .map(|(value, count)| CategoryCount {
                value,
                count,
                percentage: percentage(count, total),
            })
            .collect();

        CategoricalStats {
            unique_value_count,
            most_common_value,
            most_common_count,
            top_categories,
        }
    }
}

fn percentage(count: usize, total: usize) -> u32 {
    ((count as f64 / total as f64) * 100.0).round() as u32
}
