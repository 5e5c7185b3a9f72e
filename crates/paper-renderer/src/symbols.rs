use hashbrown::HashMap;
use paper_scene::{Scope, SymbolId};

/// Symbol definitions already imported into the scope, keyed by `id` or `name`.
///
/// Entries are never evicted; the cache lives exactly as long as the renderer
/// bound to one scope.
#[derive(Debug, Default)]
pub struct SymbolCache {
    definitions: HashMap<String, SymbolId>,
}

impl SymbolCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached definition for `key`, importing `svg` on a miss.
    pub fn resolve(&mut self, scope: &mut Scope, key: &str, svg: &str) -> SymbolId {
        if let Some(id) = self.definitions.get(key) {
            if scope.symbol(*id).is_some() {
                return *id;
            }
        }
        let id = scope.define_symbol(svg);
        log::debug!("defined symbol `{key}` as {id:?}");
        self.definitions.insert(key.to_owned(), id);
        id
    }

    pub fn get(&self, key: &str) -> Option<SymbolId> {
        self.definitions.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}
