/// Case- and whitespace-insensitive form of a catalog facet such as a country or field.
pub(crate) fn normalize_facet(value: &str) -> String {
    let cleaned = value.replace(['\u{feff}', '\u{200b}'], "");
    let collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.to_lowercase()
}
