use std::collections::{HashMap, HashSet};

/// Concrete and abstract types that satisfy each abstract type, computed once at bake time.
#[derive(Debug, Default)]
pub struct PossibleTypes {
    map: HashMap<String, HashSet<String>>,
}

impl PossibleTypes {
    /// `implementations` yields `(implementor, interface)` pairs, `unions` yields
    /// `(union, member)` pairs.
    pub(crate) fn new<'a>(
        implementations: impl Iterator<Item = (&'a str, &'a str)>,
        unions: impl Iterator<Item = (&'a str, &'a str)>,
    ) -> Self {
        let mut first_possible_types: HashMap<&str, Vec<&str>> = HashMap::new();

        for (implementor, interface) in implementations {
            first_possible_types
                .entry(interface)
                .or_default()
                .push(implementor);
        }
        for (union_name, member) in unions {
            first_possible_types
                .entry(union_name)
                .or_default()
                .push(member);
        }

        let mut map: HashMap<String, HashSet<String>> = HashMap::new();
        for (abstract_type, direct_types) in &first_possible_types {
            let mut possible: HashSet<String> = HashSet::new();
            let mut pending: Vec<&str> = direct_types.clone();

            // Interfaces implementing interfaces: follow the chain to its concrete types.
            while let Some(type_name) = pending.pop() {
                if !possible.insert(type_name.to_string()) {
                    continue;
                }
                if let Some(nested) = first_possible_types.get(type_name) {
                    pending.extend(nested.iter().copied());
                }
            }

            map.insert(abstract_type.to_string(), possible);
        }

        PossibleTypes { map }
    }

    pub fn entity_satisfies_type_condition(&self, type_name: &str, type_condition: &str) -> bool {
        if type_name == type_condition {
            true
        } else if let Some(possible_types_of_type) = self.map.get(type_condition) {
            possible_types_of_type.contains(type_name)
        } else {
            false
        }
    }

    pub fn get_possible_types_sorted<'a>(&'a self, type_name: &'a str) -> Vec<&'a str> {
        let mut list: Vec<&'a str> = self
            .map
            .get(type_name)
            .into_iter()
            .flatten()
            .map(String::as_str)
            .chain(std::iter::once(type_name))
            .collect();

        list.sort_unstable();

        list
    }
}
