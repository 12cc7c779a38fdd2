//! 物料短缺表

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 單一物料的短缺
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortageEntry {
    pub material_name: String,
    pub missing: u32,
}

/// 短缺表（物料名稱 → 短缺數量）
///
/// 只保存嚴格為正的短缺，依物料名稱排序迭代。序列化為 `{物料名稱: 數量}`，
/// 反序列化時同樣經過 [`ShortageMap::add`]，0 會被捨棄。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, u32>", into = "BTreeMap<String, u32>")]
pub struct ShortageMap {
    entries: BTreeMap<String, u32>,
}

impl ShortageMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// 比較需求與可用量，有缺口時記錄 `required - available`
    pub fn record_gap(&mut self, material_name: &str, required: u32, available: u32) {
        self.add(material_name, required.saturating_sub(available));
    }

    /// 累加短缺數量；0 會被忽略
    pub fn add(&mut self, material_name: &str, missing: u32) {
        if missing == 0 {
            return;
        }
        let total = self.entries.entry(material_name.to_string()).or_insert(0);
        *total = total.saturating_add(missing);
    }

    pub fn get(&self, material_name: &str) -> Option<u32> {
        self.entries.get(material_name).copied()
    }

    pub fn contains(&self, material_name: &str) -> bool {
        self.entries.contains_key(material_name)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 依物料名稱順序迭代
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.entries.iter().map(|(name, qty)| (name.as_str(), *qty))
    }

    /// 轉為短缺條目列表
    pub fn entries(&self) -> Vec<ShortageEntry> {
        self.iter()
            .map(|(material_name, missing)| ShortageEntry {
                material_name: material_name.to_string(),
                missing,
            })
            .collect()
    }

    /// 所有物料的短缺總數
    pub fn total(&self) -> u32 {
        self.entries.values().fold(0u32, |acc, qty| acc.saturating_add(*qty))
    }
}

impl FromIterator<(String, u32)> for ShortageMap {
    fn from_iter<I: IntoIterator<Item = (String, u32)>>(iter: I) -> Self {
        let mut map = ShortageMap::new();
        for (name, missing) in iter {
            map.add(&name, missing);
        }
        map
    }
}

impl From<BTreeMap<String, u32>> for ShortageMap {
    fn from(entries: BTreeMap<String, u32>) -> Self {
        entries.into_iter().collect()
    }
}

impl From<ShortageMap> for BTreeMap<String, u32> {
    fn from(map: ShortageMap) -> Self {
        map.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(40, 25, Some(15))]
    #[case(25, 25, None)]
    #[case(10, 25, None)]
    fn test_record_gap(#[case] required: u32, #[case] available: u32, #[case] expected: Option<u32>) {
        let mut map = ShortageMap::new();
        map.record_gap("Zipper", required, available);

        assert_eq!(map.get("Zipper"), expected);
        assert_eq!(map.is_empty(), expected.is_none());
    }

    #[test]
    fn test_entries_sorted_and_positive() {
        let map: ShortageMap = vec![
            ("Zipper".to_string(), 15),
            ("Canvas".to_string(), 2),
            ("Buckle".to_string(), 0),
        ]
        .into_iter()
        .collect();

        let entries = map.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].material_name, "Canvas");
        assert_eq!(entries[1].missing, 15);
        assert_eq!(map.total(), 17);
        assert!(!map.contains("Buckle"));
    }

    #[test]
    fn test_deserialize_drops_zero_entries() {
        let map: ShortageMap = serde_json::from_str(r#"{"Zipper":15,"Button":0}"#).unwrap();

        assert_eq!(map.len(), 1);
        assert_eq!(map.get("Zipper"), Some(15));
        // 0 不能出現在短缺表中
        assert!(!map.contains("Button"));
        assert_eq!(serde_json::to_string(&map).unwrap(), r#"{"Zipper":15}"#);
    }

    #[test]
    fn test_add_saturates() {
        let mut map = ShortageMap::new();
        map.add("Zipper", u32::MAX);
        map.add("Zipper", 5);
        map.add("Canvas", 1);

        assert_eq!(map.get("Zipper"), Some(u32::MAX));
        assert_eq!(map.total(), u32::MAX);
    }
}
