use anyhow::{bail, Context, Result};
use std::path::Path;

/// Product genre codes and their display names, in file order.
///
/// Several codes may share a display name, so the reverse lookup returns a
/// set of codes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenreMap {
    entries: Vec<(String, String)>,
}

impl GenreMap {
    pub fn from_pairs<I, C, N>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (C, N)>,
        C: Into<String>,
        N: Into<String>,
    {
        let mut map = GenreMap::default();
        for (code, name) in pairs {
            map.insert(code.into(), name.into());
        }
        map
    }

    /// Parse a JSON object of `"code": "display name"` pairs. Key order in
    /// the document is kept.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let object: serde_json::Map<String, serde_json::Value> =
            serde_json::from_str(json).context("Genre mapping must be a JSON object")?;

        let mut map = GenreMap::default();
        for (code, value) in object {
            match value {
                serde_json::Value::String(name) => map.insert(code, name),
                other => bail!("Genre code {code:?} maps to a non-string value: {other}"),
            }
        }
        Ok(map)
    }

    /// Load the mapping file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read genre mapping: {}", path.display()))?;
        Self::from_json_str(&content)
            .with_context(|| format!("Failed to parse genre mapping: {}", path.display()))
    }

    fn insert(&mut self, code: String, name: String) {
        match self.entries.iter_mut().find(|(c, _)| *c == code) {
            Some(entry) => entry.1 = name,
            None => self.entries.push((code, name)),
        }
    }

    /// Display name for a code. Unknown codes give `None`.
    pub fn name_of(&self, code: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(c, _)| c == code)
            .map(|(_, n)| n.as_str())
    }

    /// Every code whose display name is `name`, in file order. Empty when
    /// the name is unknown.
    pub fn codes_for(&self, name: &str) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(_, n)| n == name)
            .map(|(c, _)| c.as_str())
            .collect()
    }

    /// Distinct display names in file order, for choosing a genre.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for (_, n) in &self.entries {
            if !names.contains(&n.as_str()) {
                names.push(n.as_str());
            }
        }
        names
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(c, n)| (c.as_str(), n.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
