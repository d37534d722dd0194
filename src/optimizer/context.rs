// Shared state threaded through optimizer steps: the dialect and a
// dispenser for fresh identifiers.

use crate::ast::{Block, Identifier, Object};
use crate::dialect::Dialect;
use std::collections::HashSet;

use super::passes::collect_names;

/// Source of fresh identifiers. Never hands out a dialect builtin, a
/// reserved name, or a name already present when it was seeded.
#[derive(Debug, Clone)]
pub struct NameDispenser {
    used: HashSet<String>,
}

impl NameDispenser {
    pub fn new(dialect: &Dialect, reserved: &HashSet<String>) -> Self {
        let mut used: HashSet<String> = dialect.builtin_names().map(str::to_string).collect();
        used.extend(reserved.iter().cloned());
        NameDispenser { used }
    }

    /// Marks every name occurring in the block as taken.
    pub fn mark_used_in(&mut self, block: &Block) {
        self.used.extend(collect_names(block));
    }

    pub fn mark_used(&mut self, name: &str) {
        self.used.insert(name.to_string());
    }

    pub fn is_used(&self, name: &str) -> bool {
        self.used.contains(name)
    }

    /// Fresh identifier derived from `prefix`: the lowest free of
    /// `prefix_1`, `prefix_2`, ... Existing numeric suffixes are stripped
    /// first so renaming a renamed name does not stack suffixes.
    pub fn fresh(&mut self, prefix: &str) -> Identifier {
        let base = strip_numeric_suffixes(prefix);
        let base = if base.is_empty() { "v" } else { base };
        let mut index = 1usize;
        loop {
            let candidate = format!("{}_{}", base, index);
            if !self.used.contains(&candidate) {
                self.used.insert(candidate.clone());
                return Identifier(candidate);
            }
            index += 1;
        }
    }
}

/// `x_12_34` -> `x`. Leaves names without a numeric suffix alone.
pub fn strip_numeric_suffixes(name: &str) -> &str {
    let mut result = name;
    loop {
        let Some((head, tail)) = result.rsplit_once('_') else {
            return result;
        };
        if head.is_empty() || tail.is_empty() || !tail.bytes().all(|b| b.is_ascii_digit()) {
            return result;
        }
        result = head;
    }
}

/// Per-step optimizer context. The session rebuilds it after every step so
/// generated names restart from a clean dispenser.
pub struct OptimizerContext<'a> {
    pub dialect: &'a Dialect,
    pub dispenser: NameDispenser,
}

impl<'a> OptimizerContext<'a> {
    /// Context seeded with every name used anywhere in the object tree.
    pub fn for_object(dialect: &'a Dialect, object: &Object) -> Self {
        let mut dispenser = NameDispenser::new(dialect, &HashSet::new());
        seed_from_object(&mut dispenser, object);
        OptimizerContext { dialect, dispenser }
    }

    pub fn for_block(dialect: &'a Dialect, block: &Block) -> Self {
        let mut dispenser = NameDispenser::new(dialect, &HashSet::new());
        dispenser.mark_used_in(block);
        OptimizerContext { dialect, dispenser }
    }
}

fn seed_from_object(dispenser: &mut NameDispenser, object: &Object) {
    dispenser.mark_used_in(&object.code);
    for sub in object.sub_objects() {
        seed_from_object(dispenser, sub);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_names_avoid_used_and_builtins() {
        let dialect = Dialect::evm();
        let mut reserved = HashSet::new();
        reserved.insert("x_1".to_string());
        let mut dispenser = NameDispenser::new(&dialect, &reserved);

        let first = dispenser.fresh("x");
        assert_ne!(first.as_str(), "x_1");
        let second = dispenser.fresh("x");
        assert_ne!(first, second);
    }

    #[test]
    fn suffix_stripping() {
        assert_eq!(strip_numeric_suffixes("x_12_34"), "x");
        assert_eq!(strip_numeric_suffixes("usr$a"), "usr$a");
        assert_eq!(strip_numeric_suffixes("_1"), "_1");
        assert_eq!(strip_numeric_suffixes("tmp"), "tmp");
    }
}
