// thytom-core/src/domain/substitution.rs

use std::collections::BTreeMap;

/// Placeholder used when the substitution file has no header row.
pub const DEFAULT_PLACEHOLDER: &str = "{PARAM}";

/// Placeholder token (braces included) -> literal replacement text.
///
/// Ordered so that replacement order is stable for a given mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Substitutions(BTreeMap<String, String>);

impl Substitutions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, placeholder: impl Into<String>, value: impl Into<String>) {
        self.0.insert(placeholder.into(), value.into());
    }

    pub fn get(&self, placeholder: &str) -> Option<&str> {
        self.0.get(placeholder).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Replaces every occurrence of every placeholder, literally.
    pub fn apply(&self, template: &str) -> String {
        self.iter()
            .fold(template.to_string(), |acc, (placeholder, value)| {
                acc.replace(placeholder, value)
            })
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Substitutions {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// One non-empty line of the substitution file, ready to be applied to a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubstitutionRow {
    pub substitutions: Substitutions,
    /// 1-based, counting only lines that survived the empty-line filter.
    pub row_number: u64,
    /// Trimmed first field of the line.
    pub unique_record: String,
}

impl SubstitutionRow {
    pub fn row_id(&self) -> String {
        row_id(self.row_number, &self.unique_record)
    }
}

pub fn row_id(row_number: u64, unique_record: &str) -> String {
    format!("{}_{}", row_number, unique_record)
}

/// Wraps a header name in braces, the form used inside templates.
pub fn placeholder(name: &str) -> String {
    format!("{{{}}}", name)
}

/// Splits `line` the way a character-set tokenizer does: every character of
/// `delimiters` separates fields, runs of delimiters collapse and no empty
/// field is ever produced. An empty delimiter set yields the whole line.
pub fn tokenize<'a>(line: &'a str, delimiters: &'a str) -> impl Iterator<Item = &'a str> + 'a {
    line.split(move |c: char| delimiters.contains(c))
        .filter(|token| !token.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_is_literal() {
        let subs: Substitutions = [("{PARAM}", "a.b*"), ("$1", "x")].into_iter().collect();
        let sql = "select * from t where k = '{PARAM}' or k like '{PARAM}%' and c = $1";
        assert_eq!(
            subs.apply(sql),
            "select * from t where k = 'a.b*' or k like 'a.b*%' and c = x"
        );
    }

    #[test]
    fn test_apply_empty_mapping_is_identity() {
        assert_eq!(Substitutions::new().apply("select {PARAM}"), "select {PARAM}");
    }

    #[test]
    fn test_apply_missing_placeholder_leaves_text() {
        let subs: Substitutions = [("{HEAD1}", "1")].into_iter().collect();
        assert_eq!(subs.apply("{HEAD1},{HEAD2}"), "1,{HEAD2}");
    }

    #[test]
    fn test_row_id() {
        let row = SubstitutionRow {
            substitutions: Substitutions::new(),
            row_number: 3,
            unique_record: "some text".into(),
        };
        assert_eq!(row.row_id(), "3_some text");
        assert_eq!(row_id(6, ""), "6_");
    }

    #[test]
    fn test_tokenize_collapses_delimiters() {
        let tokens: Vec<_> = tokenize("a;;b;", ";").collect();
        assert_eq!(tokens, vec!["a", "b"]);

        let tokens: Vec<_> = tokenize("only one with delimiter;", ";").collect();
        assert_eq!(tokens, vec!["only one with delimiter"]);
    }

    #[test]
    fn test_tokenize_treats_delimiter_as_char_set() {
        let tokens: Vec<_> = tokenize("a,b|c", ",|").collect();
        assert_eq!(tokens, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_tokenize_empty_delimiter() {
        let tokens: Vec<_> = tokenize("a;b", "").collect();
        assert_eq!(tokens, vec!["a;b"]);
        assert_eq!(tokenize(";;", ";").count(), 0);
    }

    #[test]
    fn test_placeholder() {
        assert_eq!(placeholder("col1"), "{col1}");
    }
}
