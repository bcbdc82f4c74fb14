pub mod fixtures;

use fixtures::text;
use proptest::prelude::*;
use strata_registry::RegistryNode;
use strata_registry::names::{is_valid_property_name, is_valid_region, simplify};

proptest! {
    #[test]
    fn namespace_joins_regions_with_dots(regions in proptest::collection::vec("[a-z_][a-z0-9_]{0,8}", 1..6)) {
        let root = RegistryNode::root();
        let mut node = root.clone();
        for region in &regions {
            node = match node.child(region) {
                Some(existing) => existing,
                None => RegistryNode::with_parent(region.as_str(), &node).unwrap(),
            };
        }
        let expected: String = regions.iter().map(|r| format!(".{r}")).collect();
        prop_assert_eq!(node.namespace(), expected);
    }

    #[test]
    fn lowercase_regions_are_valid(region in "[a-z_$][a-zA-Z0-9_$]{0,16}") {
        prop_assert!(is_valid_region(&region));
        prop_assert!(!is_valid_property_name(&region));
    }

    #[test]
    fn qualified_names_reduce_to_last_segment(
        prefix in "(\\.[a-z][a-z0-9]{0,6}){0,4}",
        name in "[A-Z][A-Za-z0-9_]{0,12}",
    ) {
        let qualified = format!("{prefix}.{name}");
        let (simple, found) = simplify(&qualified);
        prop_assert_eq!(simple, name.as_str());
        prop_assert_eq!(found, Some(prefix.as_str()));
    }

    #[test]
    fn registered_names_round_trip_through_qualified_name(name in "[A-Z][A-Za-z0-9]{0,12}") {
        let root = RegistryNode::root();
        let node = RegistryNode::with_parent("prop", &root).unwrap();
        let definition = node.add_definition(name.as_str(), text()).unwrap();
        prop_assert_eq!(definition.qualified_name(), format!(".prop.{name}"));
        prop_assert!(node.definition(&definition.qualified_name()).is_some());
    }
}
