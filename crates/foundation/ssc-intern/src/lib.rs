//! String interning for variable names

pub use lasso::Spur as Symbol;
use lasso::Rodeo;

/// Single-compilation string interner
///
/// Owned by one compilation; symbols from different interners must not be mixed.
#[derive(Debug, Default)]
pub struct Interner {
    inner: Rodeo,
}

impl Interner {
    /// Create an empty interner
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern `text`, returning the existing symbol if it was seen before
    pub fn intern(&mut self, text: &str) -> Symbol {
        self.inner.get_or_intern(text)
    }

    /// Resolve a symbol produced by this interner
    pub fn resolve(&self, sym: Symbol) -> &str {
        self.inner.resolve(&sym)
    }

    /// Number of distinct strings interned so far
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Whether nothing has been interned yet
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
