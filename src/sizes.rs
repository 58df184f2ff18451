use serde::de::Deserializer;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::config::SIZES;
use crate::error::LedgerError;

/// One of the fixed shoe sizes `#2`..`#10`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SizeLabel {
    S2,
    S3,
    S4,
    S5,
    S6,
    S7,
    S8,
    S9,
    S10,
}

impl SizeLabel {
    pub const ALL: [SizeLabel; 9] = [
        SizeLabel::S2,
        SizeLabel::S3,
        SizeLabel::S4,
        SizeLabel::S5,
        SizeLabel::S6,
        SizeLabel::S7,
        SizeLabel::S8,
        SizeLabel::S9,
        SizeLabel::S10,
    ];

    fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        SIZES[self.index()]
    }
}

impl fmt::Display for SizeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SizeLabel {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let wanted = if s.starts_with('#') { s.to_string() } else { format!("#{s}") };
        SizeLabel::ALL
            .into_iter()
            .find(|label| label.as_str() == wanted)
            .ok_or_else(|| LedgerError::UnknownOption {
                field: "size",
                value: s.to_string(),
            })
    }
}

/// Quantity per size, always covering every configured size (missing ones are 0).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SizeQuantities {
    counts: [u32; 9],
}

impl SizeQuantities {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, size: SizeLabel) -> u32 {
        self.counts[size.index()]
    }

    pub fn set(&mut self, size: SizeLabel, quantity: u32) {
        self.counts[size.index()] = quantity;
    }

    /// Applies raw text from a size input; negatives and garbage become 0.
    pub fn set_from_input(&mut self, size: SizeLabel, input: &str) {
        self.set(size, crate::parse::lenient_quantity(input));
    }

    pub fn iter(&self) -> impl Iterator<Item = (SizeLabel, u32)> + '_ {
        SizeLabel::ALL.into_iter().map(move |s| (s, self.get(s)))
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().map(|&c| u64::from(c)).sum()
    }
}

impl FromIterator<(SizeLabel, u32)> for SizeQuantities {
    fn from_iter<I: IntoIterator<Item = (SizeLabel, u32)>>(iter: I) -> Self {
        let mut sizes = SizeQuantities::new();
        for (label, qty) in iter {
            sizes.set(label, qty);
        }
        sizes
    }
}

impl Serialize for SizeQuantities {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(SIZES.len()))?;
        for (label, qty) in self.iter() {
            map.serialize_entry(label.as_str(), &qty)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for SizeQuantities {
    // Stored maps may carry stray keys or non-numeric values; only known
    // sizes with non-negative integer values are kept.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw: HashMap<String, serde_json::Value> = HashMap::deserialize(deserializer)?;
        let mut sizes = SizeQuantities::new();
        for (key, value) in raw {
            let Ok(label) = key.parse::<SizeLabel>() else {
                log::debug!("ignoring unknown size key {key:?}");
                continue;
            };
            let qty = value
                .as_u64()
                .or_else(|| value.as_f64().filter(|f| *f > 0.0).map(|f| f as u64))
                .unwrap_or(0);
            sizes.set(label, u32::try_from(qty).unwrap_or(u32::MAX));
        }
        Ok(sizes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_follow_configured_order() {
        let labels: Vec<&str> = SizeLabel::ALL.iter().map(|l| l.as_str()).collect();
        assert_eq!(labels, SIZES.to_vec());
        assert_eq!("#10".parse::<SizeLabel>().unwrap(), SizeLabel::S10);
        assert_eq!("7".parse::<SizeLabel>().unwrap(), SizeLabel::S7);
        assert!("#11".parse::<SizeLabel>().is_err());
    }

    #[test]
    fn input_is_clamped() {
        let mut sizes = SizeQuantities::new();
        sizes.set_from_input(SizeLabel::S5, "-4");
        sizes.set_from_input(SizeLabel::S6, "12");
        assert_eq!(sizes.get(SizeLabel::S5), 0);
        assert_eq!(sizes.get(SizeLabel::S6), 12);
        assert_eq!(sizes.total(), 12);
    }

    #[test]
    fn serializes_every_size_in_order() {
        let sizes: SizeQuantities = [(SizeLabel::S7, 5)].into_iter().collect();
        let json = serde_json::to_string(&sizes).unwrap();
        assert_eq!(
            json,
            r##"{"#2":0,"#3":0,"#4":0,"#5":0,"#6":0,"#7":5,"#8":0,"#9":0,"#10":0}"##
        );
    }

    #[test]
    fn load_ignores_unknown_keys_and_fills_missing() {
        let sizes: SizeQuantities =
            serde_json::from_str(r##"{"#7":5,"#8":"x","#42":9,"#9":-2}"##).unwrap();
        assert_eq!(sizes.get(SizeLabel::S7), 5);
        assert_eq!(sizes.get(SizeLabel::S8), 0);
        assert_eq!(sizes.get(SizeLabel::S9), 0);
        assert_eq!(sizes.get(SizeLabel::S2), 0);
        assert_eq!(sizes.total(), 5);
    }
}
