//! Visibility and alias lookups over an owner's method table.

use crate::reflect::MethodTable;
use crate::types::{ImplId, Visibility};
use std::collections::BTreeSet;

/// First section (private, protected, public) declaring `name`.
///
/// Owners without sections, and names found in none of them, are public.
pub fn visibility_of(table: &dyn MethodTable, name: &str) -> Visibility {
    if !table.classifies_visibility() {
        return Visibility::Public;
    }
    Visibility::PRIORITY
        .into_iter()
        .find(|visibility| table.declared_with(*visibility, name))
        .unwrap_or(Visibility::Public)
}

/// Other names on the owner bound to `implementation`, across all sections.
pub fn aliases_of(table: &dyn MethodTable, name: &str, implementation: &ImplId) -> BTreeSet<String> {
    table
        .bound_names()
        .into_iter()
        .filter(|candidate| *candidate != name)
        .filter(|candidate| table.implementation(candidate).as_ref() == Some(implementation))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reflect::{BoundMethod, OwnerTable};
    use crate::types::OwnerKind;

    fn bind(table: &mut OwnerTable, name: &str, visibility: Visibility, implementation: &str) {
        table.bind(BoundMethod {
            name: name.to_string(),
            visibility,
            implementation: ImplId::new(implementation),
            locator: None,
        });
    }

    fn array_table() -> OwnerTable {
        let mut table = OwnerTable::new(OwnerKind::Class);
        bind(&mut table, "map", Visibility::Public, "map_impl");
        bind(&mut table, "collect", Visibility::Public, "map_impl");
        bind(&mut table, "each", Visibility::Public, "each_impl");
        bind(&mut table, "initialize_copy", Visibility::Private, "copy_impl");
        bind(&mut table, "replace", Visibility::Public, "copy_impl");
        bind(&mut table, "compare", Visibility::Protected, "cmp_impl");
        table
    }

    #[test]
    fn test_visibility_sections() {
        let table = array_table();
        assert_eq!(visibility_of(&table, "map"), Visibility::Public);
        assert_eq!(visibility_of(&table, "initialize_copy"), Visibility::Private);
        assert_eq!(visibility_of(&table, "compare"), Visibility::Protected);
        assert_eq!(visibility_of(&table, "unbound"), Visibility::Public);
    }

    #[test]
    fn test_bare_scope_defaults_public() {
        let mut table = OwnerTable::new(OwnerKind::Scope);
        bind(&mut table, "helper", Visibility::Private, "helper_impl");
        assert_eq!(visibility_of(&table, "helper"), Visibility::Public);
    }

    #[test]
    fn test_aliases_by_identity() {
        let table = array_table();
        let aliases = aliases_of(&table, "map", &ImplId::new("map_impl"));
        assert_eq!(aliases, BTreeSet::from(["collect".to_string()]));

        let none = aliases_of(&table, "each", &ImplId::new("each_impl"));
        assert!(none.is_empty());
    }

    #[test]
    fn test_aliases_cross_visibility_sections() {
        let table = array_table();
        let aliases = aliases_of(&table, "replace", &ImplId::new("copy_impl"));
        assert_eq!(aliases, BTreeSet::from(["initialize_copy".to_string()]));
    }

    #[test]
    fn test_aliases_never_include_queried_name() {
        let table = array_table();
        for name in table.bound_names() {
            let implementation = table.implementation(name).unwrap();
            assert!(!aliases_of(&table, name, &implementation).contains(name));
        }
    }
}
