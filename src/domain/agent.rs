// Agent summary domain model
use std::collections::BTreeMap;

/// Trims surrounding whitespace and title-cases every alphabetic run
///
/// "  jOHN o'neil " becomes "John O'Neil". Applying it twice changes nothing.
pub fn normalize_name(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut in_word = false;
    for c in raw.trim().chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                // Only the first char of a multi-char uppercase form ("ß" -> "SS") stays upper
                let mut upper = c.to_uppercase();
                out.extend(upper.next());
                out.extend(upper.flat_map(char::to_lowercase));
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}

/// One chart row: a normalized agent name and a count per tracked category
#[derive(Debug, Clone, PartialEq)]
pub struct AgentSummary {
    pub name: String,
    pub counts: Vec<u32>,
}

impl AgentSummary {
    pub fn count(&self, category: usize) -> u32 {
        self.counts.get(category).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u32 {
        self.counts.iter().sum()
    }
}

/// Outer-joins per-category counts on agent name
///
/// Every name present in any category appears once; categories that never saw
/// the name contribute zero. Rows come out ordered by name.
pub fn outer_join(per_category: &[BTreeMap<String, u32>]) -> Vec<AgentSummary> {
    let mut joined: BTreeMap<&str, Vec<u32>> = BTreeMap::new();
    for (category, counts) in per_category.iter().enumerate() {
        for (name, count) in counts {
            let slot = joined
                .entry(name.as_str())
                .or_insert_with(|| vec![0; per_category.len()]);
            slot[category] = *count;
        }
    }
    joined
        .into_iter()
        .map(|(name, counts)| AgentSummary {
            name: name.to_string(),
            counts,
        })
        .collect()
}
