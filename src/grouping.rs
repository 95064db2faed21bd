//! Measure filtering and presentation grouping.
//!
//! Filtering is four independent pass-through-when-empty membership tests
//! combined by AND; grouping partitions the surviving measures by category,
//! category+location, or an arbitrary caller-supplied key. Both operate on
//! borrowed measures and never mutate the input graph.

use serde::Deserialize;
use tracing::debug;

use crate::config::CategoryCatalog;
use crate::measure::Measure;

/// Category sentinel for narrative-only entries that carry no simulation.
pub const DESCRIPTION_CATEGORY: &str = "description";

/// Legacy display labels that map to a different internal application key.
/// Remapped before comparison so saved report specs written against either
/// spelling keep matching.
const LEGACY_APPLICATION_ALIASES: &[(&str, &str)] = &[
    ("heating, ventilation & air conditioning", "hvac"),
    ("domestic hot water", "water heating"),
    ("lighting & electrical", "lighting"),
];

/// Declarative measure filter. An empty list passes everything; a non-empty
/// list is a case-insensitive membership test. The four filters AND.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MeasureFilter {
    #[serde(rename = "type")]
    pub types: Vec<String>,
    #[serde(rename = "category")]
    pub categories: Vec<String>,
    #[serde(rename = "application")]
    pub applications: Vec<String>,
    #[serde(rename = "technology")]
    pub technologies: Vec<String>,
}

fn canonical_application(value: &str) -> String {
    let lowered = value.to_lowercase();
    for (label, key) in LEGACY_APPLICATION_ALIASES {
        if lowered == *label {
            return (*key).to_string();
        }
    }
    lowered
}

fn passes(list: &[String], value: &str) -> bool {
    list.is_empty() || list.iter().any(|item| item.eq_ignore_ascii_case(value))
}

fn passes_application(list: &[String], value: &str) -> bool {
    if list.is_empty() {
        return true;
    }
    let value = canonical_application(value);
    list.iter().any(|item| canonical_application(item) == value)
}

/// Applies the filter to a measure list.
///
/// Measures in the `"description"` sentinel category are dropped unless
/// `include_description_only` is set.
pub fn filter_measures<'a>(
    measures: &'a [Measure],
    filter: &MeasureFilter,
    include_description_only: bool,
) -> Vec<&'a Measure> {
    let kept: Vec<&Measure> = measures
        .iter()
        .filter(|m| include_description_only || !m.category.eq_ignore_ascii_case(DESCRIPTION_CATEGORY))
        .filter(|m| passes(&filter.types, &m.measure_type))
        .filter(|m| passes(&filter.categories, &m.category))
        .filter(|m| passes_application(&filter.applications, &m.application))
        .filter(|m| passes(&filter.technologies, &m.technology))
        .collect();
    debug!(total = measures.len(), kept = kept.len(), "filtered measures");
    kept
}

/// One presentation bucket of measures sharing a grouping key.
#[derive(Debug, Clone)]
pub struct MeasureGroup<'a> {
    /// Display key: the category name, measure name, or caller-chosen key.
    pub key: String,
    /// Configured category description, when grouping by category.
    pub description: Option<String>,
    /// Location label, when the grouping key includes location.
    pub location: Option<String>,
    pub measures: Vec<&'a Measure>,
}

/// Location label for grouping and the location report column.
///
/// Legacy measures carry resolved display names in `locations`; those win
/// over the structured id list. Names are sorted so the same site set always
/// produces the same label.
pub fn location_label(measure: &Measure) -> Option<String> {
    let names = if !measure.locations.is_empty() {
        &measure.locations
    } else if !measure.location_ids.is_empty() {
        &measure.location_ids
    } else {
        return None;
    };
    let mut sorted = names.clone();
    sorted.sort();
    Some(sorted.join(", "))
}

/// Groups measures by an arbitrary 1- or 2-part key, preserving the
/// encounter order of each key's first occurrence.
pub fn group_by_key<'a, F>(measures: &[&'a Measure], key_fn: F) -> Vec<MeasureGroup<'a>>
where
    F: Fn(&Measure) -> (String, Option<String>),
{
    let mut groups: Vec<MeasureGroup<'a>> = Vec::new();
    for measure in measures {
        let (key, location) = key_fn(measure);
        match groups
            .iter_mut()
            .find(|g| g.key == key && g.location == location)
        {
            Some(group) => group.measures.push(measure),
            None => groups.push(MeasureGroup {
                key,
                description: None,
                location,
                measures: vec![measure],
            }),
        }
    }
    groups
}

/// Partitions measures into one bucket per category, ordered by the
/// catalog's display order (or the built-in default order). Categories
/// absent from the order table sort last, ties by first encounter.
pub fn group_by_category<'a>(
    measures: &[&'a Measure],
    catalog: &CategoryCatalog,
) -> Vec<MeasureGroup<'a>> {
    let mut groups = group_by_key(measures, |m| (m.category.clone(), None));
    for group in &mut groups {
        group.description = catalog.description(&group.key).map(str::to_string);
    }
    sort_by_catalog_order(&mut groups, catalog);
    groups
}

/// Partitions measures by `(category, location label)`, ordered like
/// [`group_by_category`].
pub fn group_by_category_and_location<'a>(
    measures: &[&'a Measure],
    catalog: &CategoryCatalog,
) -> Vec<MeasureGroup<'a>> {
    let mut groups = group_by_key(measures, |m| (m.category.clone(), location_label(m)));
    for group in &mut groups {
        group.description = catalog.description(&group.key).map(str::to_string);
    }
    sort_by_catalog_order(&mut groups, catalog);
    groups
}

fn sort_by_catalog_order(groups: &mut [MeasureGroup<'_>], catalog: &CategoryCatalog) {
    // Stable sort keeps encounter order for categories the table omits.
    groups.sort_by_key(|g| catalog.position(&g.key).unwrap_or(usize::MAX));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn measure(name: &str, category: &str, application: &str) -> Measure {
        Measure {
            display_name: name.into(),
            measure_type: "measure".into(),
            category: category.into(),
            application: application.into(),
            technology: "general".into(),
            ..Measure::default()
        }
    }

    #[test]
    fn empty_filter_passes_everything() {
        let measures = vec![
            measure("a", "Lighting", "lighting"),
            measure("b", "Controls", "hvac"),
        ];
        let kept = filter_measures(&measures, &MeasureFilter::default(), false);
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn filters_and_together_case_insensitive() {
        let measures = vec![
            measure("a", "Lighting", "lighting"),
            measure("b", "Lighting", "hvac"),
            measure("c", "Controls", "lighting"),
        ];
        let filter = MeasureFilter {
            categories: vec!["LIGHTING".into()],
            applications: vec!["Lighting".into()],
            ..MeasureFilter::default()
        };
        let kept = filter_measures(&measures, &filter, false);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].display_name, "a");
    }

    #[test]
    fn legacy_application_label_remaps() {
        let measures = vec![measure("a", "HVAC Systems", "hvac")];
        let filter = MeasureFilter {
            applications: vec!["Heating, Ventilation & Air Conditioning".into()],
            ..MeasureFilter::default()
        };
        assert_eq!(filter_measures(&measures, &filter, false).len(), 1);
    }

    #[test]
    fn description_sentinel_dropped_unless_included() {
        let measures = vec![
            measure("a", "Lighting", "lighting"),
            measure("note", "description", ""),
        ];
        assert_eq!(
            filter_measures(&measures, &MeasureFilter::default(), false).len(),
            1
        );
        assert_eq!(
            filter_measures(&measures, &MeasureFilter::default(), true).len(),
            2
        );
    }

    #[test]
    fn categories_follow_default_order_not_alphabetics() {
        let measures = vec![
            measure("a", "Lighting", "lighting"),
            measure("b", "Controls", "hvac"),
        ];
        let refs: Vec<&Measure> = measures.iter().collect();
        let groups = group_by_category(&refs, &CategoryCatalog::default());
        assert_eq!(groups[0].key, "Controls");
        assert_eq!(groups[1].key, "Lighting");
    }

    #[test]
    fn unknown_categories_sort_last_in_encounter_order() {
        let measures = vec![
            measure("a", "Custom Z", ""),
            measure("b", "Custom A", ""),
            measure("c", "Lighting", ""),
        ];
        let refs: Vec<&Measure> = measures.iter().collect();
        let groups = group_by_category(&refs, &CategoryCatalog::default());
        let keys: Vec<&str> = groups.iter().map(|g| g.key.as_str()).collect();
        assert_eq!(keys, vec!["Lighting", "Custom Z", "Custom A"]);
    }

    #[test]
    fn location_label_prefers_legacy_names_and_sorts() {
        let mut m = measure("a", "Lighting", "");
        m.location_ids = vec!["loc-9".into()];
        m.locations = vec!["West Wing".into(), "East Wing".into()];
        assert_eq!(location_label(&m), Some("East Wing, West Wing".into()));

        let mut ids_only = measure("b", "Lighting", "");
        ids_only.location_ids = vec!["loc-2".into(), "loc-1".into()];
        assert_eq!(location_label(&ids_only), Some("loc-1, loc-2".into()));

        assert_eq!(location_label(&measure("c", "Lighting", "")), None);
    }

    #[test]
    fn category_and_location_split_buckets() {
        let mut a = measure("a", "Lighting", "");
        a.locations = vec!["East Wing".into()];
        let mut b = measure("b", "Lighting", "");
        b.locations = vec!["West Wing".into()];
        let measures = vec![a, b];
        let refs: Vec<&Measure> = measures.iter().collect();
        let groups = group_by_category_and_location(&refs, &CategoryCatalog::default());
        assert_eq!(groups.len(), 2);
        assert!(groups.iter().all(|g| g.key == "Lighting"));
    }

    #[test]
    fn group_by_key_preserves_first_occurrence_order() {
        let measures = vec![
            measure("boiler", "Heating Plant", ""),
            measure("vfd", "HVAC Systems", ""),
            measure("boiler", "Heating Plant", ""),
        ];
        let refs: Vec<&Measure> = measures.iter().collect();
        let groups = group_by_key(&refs, |m| (m.display_name.clone(), None));
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].key, "boiler");
        assert_eq!(groups[0].measures.len(), 2);
        assert_eq!(groups[1].key, "vfd");
    }
}
