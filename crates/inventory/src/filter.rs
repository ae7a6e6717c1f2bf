use crate::item::{Condition, InventoryItem};

/// Conjunction of optional predicates used when listing records.
///
/// An empty filter matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InventoryFilter {
    pub product_id: Option<i64>,
    pub condition: Option<Condition>,
    /// Case-sensitive substring of `description`.
    pub description: Option<String>,
}

impl InventoryFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn product_id(mut self, product_id: i64) -> Self {
        self.product_id = Some(product_id);
        self
    }

    pub fn condition(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    pub fn description_contains(mut self, needle: impl Into<String>) -> Self {
        self.description = Some(needle.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn matches(&self, item: &InventoryItem) -> bool {
        if self.product_id.is_some_and(|p| p != item.product_id) {
            return false;
        }
        if self.condition.is_some_and(|c| c != item.condition) {
            return false;
        }
        if let Some(needle) = &self.description {
            if !item.description.contains(needle.as_str()) {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::ItemFields;
    use stocktrack_core::ItemId;

    fn sample() -> Vec<InventoryItem> {
        vec![
            ItemFields::new(11111, Condition::New, 10)
                .with_description("red widget")
                .into_item(ItemId::new(1)),
            ItemFields::new(22222, Condition::Used, 4)
                .with_description("blue widget")
                .into_item(ItemId::new(2)),
            ItemFields::new(33333, Condition::OpenBox, 0).into_item(ItemId::new(3)),
        ]
    }

    fn ids(filter: &InventoryFilter) -> Vec<i64> {
        sample()
            .iter()
            .filter(|i| filter.matches(i))
            .map(|i| i.id.get())
            .collect()
    }

    #[test]
    fn empty_filter_matches_everything() {
        assert!(InventoryFilter::all().is_empty());
        assert_eq!(ids(&InventoryFilter::all()), vec![1, 2, 3]);
    }

    #[test]
    fn condition_filter_is_exact() {
        assert_eq!(ids(&InventoryFilter::all().condition(Condition::New)), vec![1]);
        assert_eq!(ids(&InventoryFilter::all().condition(Condition::OpenBox)), vec![3]);
    }

    #[test]
    fn description_filter_is_substring() {
        assert_eq!(ids(&InventoryFilter::all().description_contains("widget")), vec![1, 2]);
        assert_eq!(ids(&InventoryFilter::all().description_contains("Widget")), Vec::<i64>::new());
    }

    #[test]
    fn predicates_are_conjunctive() {
        let f = InventoryFilter::all()
            .product_id(22222)
            .condition(Condition::New);
        assert!(ids(&f).is_empty());

        let f = InventoryFilter::all()
            .product_id(22222)
            .condition(Condition::Used)
            .description_contains("blue");
        assert_eq!(ids(&f), vec![2]);
    }
}
