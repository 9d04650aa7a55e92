use smol_str::SmolStr;
use std::collections::HashMap;

/// Generates unique jump labels within a subroutine.
///
/// Each prefix has its own counter. Labels only need to be unique
/// per function in the target VM, so the generator is reset at
/// every subroutine entry.
#[derive(Debug, Default)]
pub struct LabelGen {
    counters: HashMap<&'static str, u32>,
}

impl LabelGen {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the next number for the given prefix.
    pub fn next_id(&mut self, prefix: &'static str) -> u32 {
        let counter = self.counters.entry(prefix).or_insert(0);
        let id = *counter;
        *counter += 1;
        id
    }

    /// Label made of the prefix and an explicit number, so
    /// related labels can share one.
    #[inline]
    pub fn label(prefix: &str, id: u32) -> SmolStr {
        SmolStr::from(format!("{prefix}{id}"))
    }

    pub fn reset(&mut self) {
        self.counters.clear();
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_counters_per_prefix() {
        let mut labels = LabelGen::new();
        assert_eq!(labels.next_id("IF"), 0);
        assert_eq!(labels.next_id("IF"), 1);
        assert_eq!(labels.next_id("WHILE"), 0);
        assert_eq!(LabelGen::label("IF_END", 1), "IF_END1");

        labels.reset();
        assert_eq!(labels.next_id("IF"), 0);
    }
}
