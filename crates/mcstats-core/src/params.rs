//! Ordered request parameter bag.
//!
//! Keys keep their first-arrival position; values for a repeated key are kept
//! in arrival order. Single-valued lookups see the last value, which matches
//! how form decoders resolve repeated fields.

/// Ordered multimap of request parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    entries: Vec<(String, Vec<String>)>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(key, value)` pairs in arrival order.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut params = Self::new();
        params.extend(pairs);
        params
    }

    /// Append pairs, merging repeated keys.
    pub fn extend<I, K, V>(&mut self, pairs: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (k, v) in pairs {
            self.push(k, v);
        }
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, values)) => values.push(value),
            None => self.entries.push((key, vec![value])),
        }
    }

    /// Last value received for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.get_all(key).last().map(String::as_str)
    }

    /// All values received for `key`, in arrival order.
    pub fn get_all(&self, key: &str) -> &[String] {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_slice())
            .unwrap_or(&[])
    }

    /// Iterate `(key, values)` in first-arrival key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_keys_keep_position_and_last_wins() {
        let p = Params::from_pairs([("t", "c"), ("_a", "1"), ("t", "g"), ("_a", "2")]);
        assert_eq!(p.len(), 2);
        assert_eq!(p.get("t"), Some("g"));
        assert_eq!(p.get_all("_a"), ["1", "2"]);

        let keys: Vec<&str> = p.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["t", "_a"]);
    }

    #[test]
    fn missing_key() {
        let p = Params::new();
        assert!(p.is_empty());
        assert_eq!(p.get("v"), None);
        assert!(p.get_all("v").is_empty());
    }
}
