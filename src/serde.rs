//! Serialization and Deserialization implementation

use ::serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::*;

impl<P: BitPrefix + Serialize, T: Serialize> Serialize for BinTrie<P, T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        // the sequence of added entries, in trie order; values stay optional
        let entries: Vec<(&P, Option<&T>)> = self.iter().collect();
        entries.serialize(serializer)
    }
}

impl<'de, P: BitPrefix + Deserialize<'de>, T: Deserialize<'de>> Deserialize<'de> for BinTrie<P, T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let entries: Vec<(P, Option<T>)> = Vec::deserialize(deserializer)?;
        Ok(Self::from_iter(entries))
    }
}
