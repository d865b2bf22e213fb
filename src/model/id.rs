use serde::{Deserialize, Serialize};

/// Identity of a budget item node.
///
/// A node is either `Temp` (exists only in this editing session, numbered
/// from a per-tree counter) or `Persisted` (has a stable store-assigned id).
/// The two are never interchangeable: only `Persisted` ids may be sent to
/// update/delete calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemId {
    Temp(u64),
    Persisted(i64),
}

impl ItemId {
    /// The store id, if this node has been persisted.
    pub fn persisted(self) -> Option<i64> {
        match self {
            ItemId::Temp(_) => None,
            ItemId::Persisted(n) => Some(n),
        }
    }

    pub fn is_temp(self) -> bool {
        matches!(self, ItemId::Temp(_))
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ItemId::Temp(n) => write!(f, "t{}", n),
            ItemId::Persisted(n) => write!(f, "#{}", n),
        }
    }
}

/// How often a leaf's unit amount recurs within the budget period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrequencyUnit {
    Daily,
    Weekly,
    Monthly,
    Quarterly,
    Yearly,
    Once,
}

impl FrequencyUnit {
    pub fn as_str(self) -> &'static str {
        match self {
            FrequencyUnit::Daily => "daily",
            FrequencyUnit::Weekly => "weekly",
            FrequencyUnit::Monthly => "monthly",
            FrequencyUnit::Quarterly => "quarterly",
            FrequencyUnit::Yearly => "yearly",
            FrequencyUnit::Once => "once",
        }
    }
}

impl std::str::FromStr for FrequencyUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "daily" => Ok(FrequencyUnit::Daily),
            "weekly" => Ok(FrequencyUnit::Weekly),
            "monthly" => Ok(FrequencyUnit::Monthly),
            "quarterly" => Ok(FrequencyUnit::Quarterly),
            "yearly" => Ok(FrequencyUnit::Yearly),
            "once" => Ok(FrequencyUnit::Once),
            _ => Err(format!("unknown frequency unit: {}", s)),
        }
    }
}

impl std::fmt::Display for FrequencyUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn persisted_accessor() {
        assert_eq!(ItemId::Persisted(7).persisted(), Some(7));
        assert_eq!(ItemId::Temp(3).persisted(), None);
        assert!(ItemId::Temp(3).is_temp());
        assert!(!ItemId::Persisted(7).is_temp());
    }

    #[test]
    fn display_forms() {
        assert_eq!(ItemId::Temp(12).to_string(), "t12");
        assert_eq!(ItemId::Persisted(40).to_string(), "#40");
    }

    #[test]
    fn frequency_unit_round_trip() {
        for s in ["daily", "weekly", "monthly", "quarterly", "yearly", "once"] {
            let unit: FrequencyUnit = s.parse().unwrap();
            assert_eq!(unit.as_str(), s);
        }
        assert!("fortnightly".parse::<FrequencyUnit>().is_err());
    }

    #[test]
    fn item_id_serde() {
        let json = serde_json::to_string(&ItemId::Temp(2)).unwrap();
        assert_eq!(json, r#"{"temp":2}"#);
        let back: ItemId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ItemId::Temp(2));
    }
}
