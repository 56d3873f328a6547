use std::collections::BTreeMap;

/// Process-environment lookup consulted by the interpolation engine before
/// it falls back to entries parsed earlier in the same file.
///
/// The default source reads the real process environment. Tests substitute
/// [`EnvSource::from_memory`] to stay hermetic; the parser never mutates
/// environment state through either kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvSource {
    kind: EnvSourceKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum EnvSourceKind {
    /// Read through [`std::env::var_os`].
    Process,
    /// Read from an in-memory map.
    Memory(BTreeMap<String, String>),
}

impl Default for EnvSource {
    fn default() -> Self {
        Self::process()
    }
}

impl EnvSource {
    /// Create a source backed by the current process environment.
    pub fn process() -> Self {
        Self {
            kind: EnvSourceKind::Process,
        }
    }

    /// Create an empty in-memory source.
    pub fn memory() -> Self {
        Self::from_memory(BTreeMap::new())
    }

    /// Create an in-memory source from an existing map.
    pub fn from_memory(map: BTreeMap<String, String>) -> Self {
        Self {
            kind: EnvSourceKind::Memory(map),
        }
    }

    pub fn as_memory(&self) -> Option<&BTreeMap<String, String>> {
        match &self.kind {
            EnvSourceKind::Memory(map) => Some(map),
            EnvSourceKind::Process => None,
        }
    }

    pub(crate) fn get(&self, name: &str) -> Option<String> {
        match &self.kind {
            EnvSourceKind::Process => {
                std::env::var_os(name).map(|value| value.to_string_lossy().into_owned())
            }
            EnvSourceKind::Memory(map) => map.get(name).cloned(),
        }
    }
}
