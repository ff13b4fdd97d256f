//! Search form view model.
//!
//! [`SearchForm`] flattens a resolved [`Query`] into plain serializable
//! data: one control per search field, one per filter group (with a
//! toggle link per scope), and the sort options. Templates render it
//! without touching the query API.

use serde::Serialize;
use sift_query::{Collection, Dir, Query};

use super::toggle::{clear_link, filter_link, sort_link, Link};

/// A free-form search input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldControl {
    pub name: String,
    pub label: String,
    /// The submitted string, kept even when it failed coercion so the
    /// input can be redisplayed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Name of the coercion kind, if any (e.g. `"date"`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    pub active: bool,
}

/// One selectable scope of a filter group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterOption {
    pub scope: String,
    pub label: String,
    pub active: bool,
    pub link: Link,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterControl {
    pub name: String,
    pub label: String,
    pub options: Vec<FilterOption>,
}

impl FilterControl {
    pub fn active(&self) -> Option<&FilterOption> {
        self.options.iter().find(|o| o.active)
    }
}

/// One sort scope and the link that toggles it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SortOption {
    pub scope: String,
    pub label: String,
    pub active: bool,
    /// Current direction, set only on the active option.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<Dir>,
    pub link: Link,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SortControl {
    pub direction: Dir,
    pub options: Vec<SortOption>,
}

/// Everything a list screen needs to render its search controls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchForm {
    pub fields: Vec<FieldControl>,
    pub filters: Vec<FilterControl>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sorting: Option<SortControl>,
    /// Resets search, filters, sorting and paging.
    pub clear: Link,
    pub filtered: bool,
}

impl SearchForm {
    pub fn from_query<C: Collection>(query: &Query<C>) -> Self {
        let fields = query
            .search_fields()
            .into_iter()
            .map(|field| FieldControl {
                name: field.name().to_string(),
                label: humanize(field.name()),
                value: field.raw().map(str::to_string),
                kind: field.coercion().map(|kind| kind.name().to_string()),
                active: field.is_present(),
            })
            .collect();

        let filters = query
            .filter_groups()
            .into_iter()
            .map(|group| FilterControl {
                name: group.name().to_string(),
                label: humanize(group.name()),
                options: group
                    .scopes()
                    .iter()
                    .map(|scope| FilterOption {
                        scope: scope.clone(),
                        label: humanize(scope),
                        active: group.is_active(scope),
                        link: filter_link(query, group.name(), scope),
                    })
                    .collect(),
            })
            .collect();

        let sorting = query.sorting().map(|sorting| SortControl {
            direction: sorting.direction(),
            options: sorting
                .scopes()
                .iter()
                .map(|scope| SortOption {
                    scope: scope.clone(),
                    label: humanize(scope.strip_prefix("by_").unwrap_or(scope)),
                    active: sorting.is_active(scope),
                    direction: sorting.direction_of(scope),
                    link: sort_link(query, scope),
                })
                .collect(),
        });

        SearchForm {
            fields,
            filters,
            sorting,
            clear: clear_link(query),
            filtered: query.is_filtered(),
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldControl> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn filter(&self, name: &str) -> Option<&FilterControl> {
        self.filters.iter().find(|f| f.name == name)
    }
}

/// Describes the active search fields and filters, e.g.
/// `"title_matches=ASAP, status=pending"`. `None` when unfiltered.
pub fn filter_summary<C: Collection>(query: &Query<C>) -> Option<String> {
    let mut parts: Vec<String> = query
        .search_fields()
        .into_iter()
        .filter_map(|field| field.value().map(|value| format!("{}={}", field.name(), value)))
        .collect();
    parts.extend(
        query
            .filter_groups()
            .into_iter()
            .filter_map(|group| group.active().map(|scope| format!("{}={}", group.name(), scope))),
    );

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(", "))
    }
}

/// `"due_date_from"` -> `"Due date from"`.
pub fn humanize(name: &str) -> String {
    let spaced = name.replace('_', " ");
    let trimmed = spaced.trim();
    let mut chars = trimmed.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sift_query::{CoercionKind, Params, QuerySpec, Sorting, Value};

    #[derive(Debug)]
    struct Noop;

    impl Collection for Noop {
        type Error = std::convert::Infallible;

        fn apply_scope(self, _scope: &str, _args: &[Value]) -> Result<Self, Self::Error> {
            Ok(self)
        }
    }

    fn query(params: Params) -> Query<Noop> {
        let spec = QuerySpec::builder()
            .search_field("title_matches")
            .search_field_as("due_date_from", CoercionKind::Date)
            .filter_group("status", ["completed", "pending"])
            .sorting(Sorting::new(["by_due_date", "by_title"]).default_scope("by_due_date"))
            .build()
            .unwrap();
        Query::new(spec, params)
    }

    #[test]
    fn humanize_names() {
        assert_eq!(humanize("due_date_from"), "Due date from");
        assert_eq!(humanize("pending"), "Pending");
        assert_eq!(humanize(""), "");
    }

    #[test]
    fn fields_keep_raw_input() {
        let form = SearchForm::from_query(&query(
            Params::new()
                .with_query("title_matches", "ASAP")
                .with_query("due_date_from", "soon"),
        ));

        let title = form.field("title_matches").unwrap();
        assert!(title.active);
        assert_eq!(title.value.as_deref(), Some("ASAP"));
        assert_eq!(title.kind, None);

        let due = form.field("due_date_from").unwrap();
        assert!(!due.active);
        assert_eq!(due.value.as_deref(), Some("soon"));
        assert_eq!(due.kind.as_deref(), Some("date"));
        assert!(form.filtered);
    }

    #[test]
    fn filter_options_carry_toggle_links() {
        let form = SearchForm::from_query(&query(Params::new().with_query("status", "pending")));
        let status = form.filter("status").unwrap();

        assert_eq!(status.label, "Status");
        assert_eq!(status.active().map(|o| o.scope.as_str()), Some("pending"));
        let completed = &status.options[0];
        assert!(!completed.active);
        assert_eq!(completed.link.params.query_value("status"), Some("completed"));
        let pending = &status.options[1];
        assert!(pending.link.params.query_value("status").is_none());
    }

    #[test]
    fn sort_options_report_default_scope() {
        let form = SearchForm::from_query(&query(Params::new()));
        let sorting = form.sorting.unwrap();

        assert_eq!(sorting.direction, Dir::Asc);
        assert_eq!(sorting.options[0].label, "Due date");
        assert!(sorting.options[0].active);
        assert_eq!(sorting.options[0].direction, Some(Dir::Asc));
        assert_eq!(sorting.options[0].link.params.get_str("sort_order"), Some("desc"));
        assert_eq!(sorting.options[1].direction, None);
        assert!(!form.filtered);
        assert!(form.clear.active);
    }

    #[test]
    fn summary_lists_active_parts() {
        let q = query(
            Params::new()
                .with_query("title_matches", "ASAP")
                .with_query("due_date_from", "2020-01-15")
                .with_query("status", "pending"),
        );
        assert_eq!(
            filter_summary(&q).as_deref(),
            Some("title_matches=ASAP, due_date_from=2020-01-15, status=pending")
        );
        assert_eq!(filter_summary(&query(Params::new())), None);
    }
}
