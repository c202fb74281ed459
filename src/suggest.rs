//! Autocomplete over catalog presets

use crate::model::CatalogItem;

/// Get catalog suggestions for a given input, best matches first.
///
/// Ties keep catalog order.
pub fn get_suggestions<'a>(items: &'a [CatalogItem], input: &str) -> Vec<&'a CatalogItem> {
  let input_lower = input.trim().to_lowercase();

  if input_lower.is_empty() {
    return items.iter().collect();
  }

  let mut matches: Vec<(&CatalogItem, u32)> = Vec::new();

  for item in items {
    let name = item.name.to_lowercase();

    // Exact match on name
    if name == input_lower {
      matches.push((item, 0));
      continue;
    }

    if name.starts_with(&input_lower) {
      matches.push((item, 1));
      continue;
    }

    // Start of a later word ("PVC" in "Folie PVC")
    if name
      .split_whitespace()
      .skip(1)
      .any(|word| word.starts_with(&input_lower))
    {
      matches.push((item, 2));
      continue;
    }

    if name.contains(&input_lower) {
      matches.push((item, 3));
    }
  }

  // Stable sort keeps catalog order within a priority
  matches.sort_by_key(|(_, priority)| *priority);

  matches.into_iter().map(|(item, _)| item).collect()
}

/// Whether an item with this name already exists (case-insensitive).
pub fn contains_name(items: &[CatalogItem], name: &str) -> bool {
  let wanted = name.trim().to_lowercase();
  items.iter().any(|item| item.name.to_lowercase() == wanted)
}
