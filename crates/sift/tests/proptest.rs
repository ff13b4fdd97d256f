//! Property-based tests for toggle links using proptest.

use proptest::prelude::*;
use sift::query::{Collection, Dir, Params, Query, QuerySpec, Sorting, Value};
use sift::views::{filter_link, sort_link};

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
        .filter_group("status", ["completed", "pending", "archived"])
        .sorting(Sorting::new(["by_title", "by_due_date"]))
        .build()
        .unwrap();
    Query::new(spec, params)
}

fn scope_strategy() -> impl Strategy<Value = &'static str> {
    prop_oneof![Just("completed"), Just("pending"), Just("archived")]
}

proptest! {
    /// Following a filter link activates exactly that scope; following the
    /// link again clears the group and keeps everything else.
    #[test]
    fn filter_link_toggles(
        scope in scope_strategy(),
        current in "[a-z]{0,10}",
        title in "[a-zA-Z]{1,10}",
    ) {
        prop_assume!(current != scope);
        let start = query(
            Params::new()
                .with_query("status", current)
                .with_query("title_matches", title.clone())
                .with("page", "3"),
        );

        let on = query(filter_link(&start, "status", scope).params);
        prop_assert_eq!(on.active_filter("status"), Some(scope));
        prop_assert!(on.page().is_none());

        let off = filter_link(&on, "status", scope);
        prop_assert!(off.active);
        prop_assert_eq!(off.params.query_value("status"), None);
        prop_assert_eq!(off.params.query_value("title_matches"), Some(title.as_str()));
    }

    /// A sort link activates its scope; following it twice flips the
    /// direction there and back.
    #[test]
    fn sort_link_flips_direction(
        scope in prop_oneof![Just("by_title"), Just("by_due_date")],
        order in prop_oneof![Just("asc"), Just("desc"), Just("")],
    ) {
        let start = query(Params::new().with("sorting", "by_title").with("sort_order", order));

        let first = query(sort_link(&start, scope).params);
        let sorting = first.sorting().unwrap();
        prop_assert_eq!(sorting.active(), Some(scope));

        let second = query(sort_link(&first, scope).params);
        let again = second.sorting().unwrap();
        prop_assert_eq!(again.active(), Some(scope));
        prop_assert_eq!(again.direction(), sorting.direction().reverse());
        if scope == "by_due_date" {
            prop_assert_eq!(sorting.direction(), Dir::Asc);
        }
    }

    /// Hrefs parse back to the link's parameters.
    #[test]
    fn href_round_trips(scope in scope_strategy(), title in "[a-zA-Z &=]{1,12}") {
        let start = query(Params::new().with_query("title_matches", title));
        let link = filter_link(&start, "status", scope);
        prop_assert_eq!(Params::from_query_string(&link.href), link.params);
    }
}
