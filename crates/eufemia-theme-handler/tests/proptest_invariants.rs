//! Property tests for registry validity, chunk classification and head
//! deduplication.

use eufemia_theme_handler::head::dedupe;
use eufemia_theme_handler::{
    ChunkClassifier, HeadElement, ThemeConfig, ThemeDiscovery, ThemeHandlerOptions, ThemeRegistry,
};
use proptest::prelude::*;
use std::collections::HashSet;

fn key_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9]{0,7}"
}

fn registry(keys: &[String]) -> ThemeRegistry {
    let options = ThemeHandlerOptions::new(
        keys.iter().map(|k| (k.clone(), ThemeConfig::default())),
        keys[0].clone(),
    );
    ThemeRegistry::load(&options).unwrap()
}

proptest! {
    #[test]
    fn is_valid_matches_configured_keys(
        keys in prop::collection::vec(key_strategy(), 1..6),
        probe in key_strategy(),
    ) {
        let registry = registry(&keys);
        prop_assert_eq!(registry.is_valid(&probe), keys.contains(&probe));
        for key in &keys {
            prop_assert!(registry.is_valid(key));
        }
    }

    #[test]
    fn classification_is_deterministic(
        key in key_strategy(),
        prefix in "(/[a-z]{1,6}){0,3}",
    ) {
        let classifier = ChunkClassifier::new(["**/style/themes/**/*.css"]).unwrap();
        let path = format!("{}/style/themes/theme-{}", prefix, key);

        let mut discovery = ThemeDiscovery::new();
        let first = classifier.classify(&path, &mut discovery);
        let second = classifier.classify(&path, &mut discovery);

        prop_assert_eq!(&first, &key);
        prop_assert_eq!(first, second);
        prop_assert_eq!(discovery.keys(), &[key][..]);
    }

    #[test]
    fn paths_outside_globs_use_fallback(path in "(/[a-z]{1,6}){1,4}") {
        prop_assume!(!path.contains("/style/"));
        let classifier = ChunkClassifier::new(["**/style/themes/**/*.css"]).unwrap();
        let mut discovery = ThemeDiscovery::new();
        prop_assert_eq!(classifier.classify(&path, &mut discovery), "commons");
        prop_assert!(discovery.is_empty());
    }

    #[test]
    fn dedupe_keeps_first_of_each_href(
        hrefs in prop::collection::vec("/[a-c]\\.css", 0..12),
        plain in 0usize..4,
    ) {
        let mut elements: Vec<HeadElement> = hrefs
            .iter()
            .enumerate()
            .map(|(i, href)| HeadElement::inline_style(href.clone(), format!("/*{}*/", i)))
            .collect();
        elements.extend((0..plain).map(|_| HeadElement::new("meta")));

        let result = dedupe(elements);

        let with_href: Vec<&str> = result.iter().filter_map(|e| e.data_href()).collect();
        let unique: HashSet<&str> = with_href.iter().copied().collect();
        prop_assert_eq!(with_href.len(), unique.len());
        prop_assert_eq!(unique.len(), hrefs.iter().collect::<HashSet<_>>().len());
        prop_assert_eq!(result.len() - with_href.len(), plain);

        // the survivor of each href is its first occurrence
        for element in result.iter().filter(|e| e.data_href().is_some()) {
            let href = element.data_href().unwrap();
            let first = hrefs.iter().position(|h| h == href).unwrap();
            let expected = format!("/*{}*/", first);
            prop_assert_eq!(element.inner_html(), Some(expected.as_str()));
        }
    }
}
