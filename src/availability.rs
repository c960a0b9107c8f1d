use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

// Data structures for the availability service JSON response
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available: Option<Inventory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pricing: Option<PricingInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl AvailabilityResult {
    /// Categories with at least one vehicle, only when the lookup succeeded.
    pub fn offered(&self) -> Vec<&CategoryCount> {
        if !self.success {
            return Vec::new();
        }
        self.available
            .as_ref()
            .map(|inventory| inventory.in_stock().collect())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingInfo {
    pub rental_fee: i64,
    pub rental_days: i64,
    #[serde(default)]
    pub breakdown: Vec<BreakdownItem>,
    pub fuel_policy: String,
    #[serde(default)]
    pub has_one_way_bonus: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub one_way_bonus_message: Option<String>,
}

impl PricingInfo {
    pub fn one_way_bonus(&self) -> Option<&str> {
        if self.has_one_way_bonus {
            self.one_way_bonus_message.as_deref()
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct BreakdownItem {
    pub item: String,
    pub amount: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryCount {
    pub category: String,
    pub count: i64,
}

// Vehicle counts keyed by category name, kept in the order the service sent them
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Inventory(Vec<CategoryCount>);

impl Inventory {
    pub fn new(entries: Vec<CategoryCount>) -> Self {
        Inventory(entries)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CategoryCount> {
        self.0.iter()
    }

    pub fn in_stock(&self) -> impl Iterator<Item = &CategoryCount> {
        self.0.iter().filter(|entry| entry.count > 0)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, i64)> for Inventory {
    fn from_iter<I: IntoIterator<Item = (S, i64)>>(iter: I) -> Self {
        Inventory(
            iter.into_iter()
                .map(|(category, count)| CategoryCount {
                    category: category.into(),
                    count,
                })
                .collect(),
        )
    }
}

struct InventoryVisitor;

impl<'de> Visitor<'de> for InventoryVisitor {
    type Value = Inventory;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map of vehicle category to integer count")
    }

    fn visit_map<M>(self, mut access: M) -> Result<Self::Value, M::Error>
    where
        M: MapAccess<'de>,
    {
        let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
        while let Some((category, count)) = access.next_entry::<String, i64>()? {
            // Later duplicates replace earlier ones but keep the first position
            match entries
                .iter_mut()
                .find(|entry: &&mut CategoryCount| entry.category == category)
            {
                Some(existing) => existing.count = count,
                None => entries.push(CategoryCount { category, count }),
            }
        }
        Ok(Inventory(entries))
    }
}

impl<'de> Deserialize<'de> for Inventory {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(InventoryVisitor)
    }
}

impl Serialize for Inventory {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_map(self.0.iter().map(|entry| (&entry.category, entry.count)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inventory_keeps_service_order() {
        let json = r#"{"success":true,"available":{"一般乗用車":1,"軽自動車":3,"ワゴン":0}}"#;
        let result: AvailabilityResult = serde_json::from_str(json).unwrap();
        let names: Vec<&str> = result
            .available
            .as_ref()
            .unwrap()
            .iter()
            .map(|entry| entry.category.as_str())
            .collect();
        assert_eq!(names, vec!["一般乗用車", "軽自動車", "ワゴン"]);
    }

    #[test]
    fn test_offered_skips_empty_categories() {
        let json = r#"{"success":true,"available":{"軽自動車":2,"一般乗用車":0}}"#;
        let result: AvailabilityResult = serde_json::from_str(json).unwrap();
        let offered = result.offered();
        assert_eq!(offered.len(), 1);
        assert_eq!(offered[0].category, "軽自動車");
        assert_eq!(offered[0].count, 2);
    }

    #[test]
    fn test_offered_empty_when_unsuccessful() {
        let result = AvailabilityResult {
            success: false,
            available: Some([("軽自動車", 4)].into_iter().collect()),
            pricing: None,
            message: None,
        };
        assert!(result.offered().is_empty());
    }

    #[test]
    fn test_full_pricing_payload() {
        let json = r#"{
            "success": true,
            "available": {"軽自動車": 1},
            "pricing": {
                "rentalFee": 15400,
                "rentalDays": 3,
                "breakdown": [{"item": "基本料金", "amount": 12000}, {"item": "乗り捨て料金", "amount": 3400}],
                "fuelPolicy": "満タン返し不要",
                "hasOneWayBonus": true,
                "oneWayBonusMessage": "乗り捨て特典あり"
            }
        }"#;
        let result: AvailabilityResult = serde_json::from_str(json).unwrap();
        let pricing = result.pricing.unwrap();
        assert_eq!(pricing.rental_fee, 15400);
        assert_eq!(pricing.breakdown[1].item, "乗り捨て料金");
        assert_eq!(pricing.one_way_bonus(), Some("乗り捨て特典あり"));
    }

    #[test]
    fn test_bonus_hidden_without_flag() {
        let json = r#"{"rentalFee":5000,"rentalDays":1,"fuelPolicy":"x","oneWayBonusMessage":"bonus"}"#;
        let pricing: PricingInfo = serde_json::from_str(json).unwrap();
        assert!(pricing.breakdown.is_empty());
        assert_eq!(pricing.one_way_bonus(), None);
    }

    #[test]
    fn test_non_integer_count_is_rejected() {
        let json = r#"{"success":true,"available":{"軽自動車":"many"}}"#;
        assert!(serde_json::from_str::<AvailabilityResult>(json).is_err());
    }

    #[test]
    fn test_success_is_required() {
        assert!(serde_json::from_str::<AvailabilityResult>(r#"{"message":"x"}"#).is_err());
    }
}
