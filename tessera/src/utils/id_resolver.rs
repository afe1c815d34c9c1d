use std::collections::HashMap;
use std::collections::hash_map::Entry;

use tracing::warn;

/// Hands out unique source IDs for tile files given on the command line.
#[derive(Debug, Default, Clone)]
pub struct IdResolver {
    /// name -> locator it was given to
    names: HashMap<String, String>,
}

impl IdResolver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `name`, or `name.1`, `name.2`, etc. if `name` already belongs to another locator.
    /// Only alphanumeric characters plus dashes/dots/underscores are kept, others become dashes.
    /// Resolving the same locator twice returns the same ID.
    pub fn resolve(&mut self, name: &str, locator: &str) -> String {
        let new_name = self.resolve_int(name, locator);
        if name != new_name {
            warn!(
                "Source `{name}` ({locator}) was renamed to `{new_name}`. Source IDs must be unique and must contain alpha-numeric characters or `._-`"
            );
        }
        new_name
    }

    fn resolve_int(&mut self, name: &str, locator: &str) -> String {
        let name = name.replace(
            |c: char| !c.is_ascii_alphanumeric() && c != '_' && c != '.' && c != '-',
            "-",
        );

        let mut candidate = name.clone();
        let mut index: u32 = 0;
        loop {
            match self.names.entry(candidate) {
                Entry::Vacant(e) => {
                    let id = e.key().clone();
                    e.insert(locator.to_string());
                    return id;
                }
                Entry::Occupied(e) if e.get() == locator => return e.key().clone(),
                Entry::Occupied(_) => {
                    index += 1;
                    candidate = format!("{name}.{index}");
                }
            }
        }
    }
}
