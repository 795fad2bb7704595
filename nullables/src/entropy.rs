//! Nullable entropy — deterministic "random" bytes for testing.

use std::sync::Mutex;
use vigil_types::EntropySource;

/// A deterministic entropy source.
///
/// Each `fill` call consumes the next configured script entry, repeating
/// its bytes cyclically to cover the requested buffer; the script itself
/// also cycles, so any number of fills is served.
pub struct NullEntropy {
    scripts: Vec<Vec<u8>>,
    index: Mutex<usize>,
}

impl NullEntropy {
    /// Create with a script of byte patterns, one per `fill` call.
    ///
    /// Empty patterns are not allowed (there would be nothing to repeat).
    pub fn new(scripts: Vec<Vec<u8>>) -> Self {
        assert!(
            !scripts.is_empty() && scripts.iter().all(|s| !s.is_empty()),
            "null entropy requires at least one non-empty pattern"
        );
        Self {
            scripts,
            index: Mutex::new(0),
        }
    }

    /// Create with a single pattern used for every call.
    pub fn constant(pattern: Vec<u8>) -> Self {
        Self::new(vec![pattern])
    }
}

impl EntropySource for NullEntropy {
    fn fill(&self, buf: &mut [u8]) {
        let mut index = self.index.lock().expect("null entropy lock poisoned");
        let script = &self.scripts[*index % self.scripts.len()];
        *index += 1;
        for (i, byte) in buf.iter_mut().enumerate() {
            *byte = script[i % script.len()];
        }
    }
}
