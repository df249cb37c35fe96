//! Ordered multi-valued string map used for headers, parameters, and cookies.
//!
//! A [`StringsMap`] keeps keys in first-insertion order and the values of
//! each key in append order, so repeated entries such as several
//! `Set-Cookie` headers survive intact. Header maps fold keys to lowercase;
//! parameter and cookie maps compare keys exactly.

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StringsMap {
    entries: Vec<(String, Vec<String>)>,
    fold_case: bool,
}

impl StringsMap {
    /// A case-sensitive map, used for parameters and cookies.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
            fold_case: false,
        }
    }

    /// A map whose keys compare case-insensitively, used for headers.
    /// Keys are stored lowercased.
    #[must_use]
    pub const fn headers() -> Self {
        Self {
            entries: Vec::new(),
            fold_case: true,
        }
    }

    fn normalize(&self, key: &str) -> String {
        if self.fold_case {
            key.to_ascii_lowercase()
        } else {
            key.to_string()
        }
    }

    fn position(&self, key: &str) -> Option<usize> {
        if self.fold_case {
            self.entries
                .iter()
                .position(|(k, _)| k.eq_ignore_ascii_case(key))
        } else {
            self.entries.iter().position(|(k, _)| k == key)
        }
    }

    /// First value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.position(key)
            .and_then(|i| self.entries[i].1.first())
            .map(String::as_str)
    }

    #[must_use]
    pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get(key).unwrap_or(default)
    }

    #[must_use]
    pub fn get_all(&self, key: &str) -> &[String] {
        match self.position(key) {
            Some(i) => &self.entries[i].1,
            None => &[],
        }
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    /// Replace every value under `key` with `value`.
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        match self.position(key) {
            Some(i) => self.entries[i].1 = vec![value],
            None => {
                let key = self.normalize(key);
                self.entries.push((key, vec![value]));
            }
        }
    }

    /// Add `value` after any existing values under `key`.
    pub fn append(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        match self.position(key) {
            Some(i) => self.entries[i].1.push(value),
            None => {
                let key = self.normalize(key);
                self.entries.push((key, vec![value]));
            }
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<Vec<String>> {
        self.position(key).map(|i| self.entries.remove(i).1)
    }

    /// Append every value of `other` to this map.
    pub fn extend(&mut self, other: Self) {
        for (key, values) in other.entries {
            for value in values {
                self.append(&key, value);
            }
        }
    }

    /// Iterate `(key, value)` pairs, one per stored value.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .flat_map(|(k, vs)| vs.iter().map(move |v| (k.as_str(), v.as_str())))
    }

    /// Number of distinct keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
