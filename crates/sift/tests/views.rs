//! End-to-end list screen rendering over the in-memory backend.

use std::sync::Arc;

use once_cell::sync::Lazy;
use serde::Serialize;
use sift::query::memory::{Relation, Scopes};
use sift::query::{CoercionKind, Declared, Dir, Params, QuerySpec, Sorting, Value};
use sift::views::{clear_link, list_view, sort_link, Column, SearchForm, TableSpec};
use sift::ViewError;

#[derive(Debug, Clone, Serialize)]
struct Owner {
    name: String,
}

#[derive(Debug, Clone, Serialize)]
struct Ticket {
    subject: String,
    priority: i64,
    open: bool,
    owner: Option<Owner>,
}

fn ticket(subject: &str, priority: i64, open: bool, owner: Option<&str>) -> Ticket {
    Ticket {
        subject: subject.to_string(),
        priority,
        open,
        owner: owner.map(|name| Owner {
            name: name.to_string(),
        }),
    }
}

static TICKETS: Lazy<Relation<Ticket>> = Lazy::new(|| {
    let rows = vec![
        ticket("Login broken", 5, true, Some("ana")),
        ticket("Typo on pricing", 1, true, None),
        ticket("Export slow", 3, false, Some("bo")),
        ticket("Login audit", 2, true, Some("bo")),
    ];
    let scopes = Scopes::new()
        .search("subject_matches", |t: &Ticket, v: &Value| {
            v.as_str().is_some_and(|s| t.subject.contains(s))
        })
        .search("min_priority", |t: &Ticket, v: &Value| {
            v.as_i64().is_some_and(|min| t.priority >= min)
        })
        .filter("open", |t: &Ticket| t.open)
        .filter("closed", |t: &Ticket| !t.open)
        .sort("by_priority", |a: &Ticket, b: &Ticket| a.priority.cmp(&b.priority))
        .sort("by_subject", |a: &Ticket, b: &Ticket| a.subject.cmp(&b.subject));
    Relation::new(rows, scopes)
});

static TICKET_QUERY: Lazy<Arc<QuerySpec<Relation<Ticket>>>> = Lazy::new(|| {
    let spec = QuerySpec::builder()
        .starting_scope(|| TICKETS.clone())
        .search_field("subject_matches")
        .search_field_as("min_priority", CoercionKind::Integer)
        .filter_group("state", ["open", "closed"])
        .sorting(
            Sorting::new(["by_priority", "by_subject"])
                .default_scope("by_priority")
                .default_direction(Dir::Desc),
        )
        .ending_scope(|rel: Relation<Ticket>, query| Ok(rel.paginate(query.page().unwrap_or(1), 2)))
        .build()
        .unwrap();
    Arc::new(spec)
});

struct TicketQuery;

impl Declared for TicketQuery {
    type Collection = Relation<Ticket>;

    fn query_spec() -> Arc<QuerySpec<Relation<Ticket>>> {
        Arc::clone(&TICKET_QUERY)
    }
}

fn table() -> TableSpec {
    TableSpec::builder()
        .column(Column::new("subject").sortable("by_subject"))
        .column(Column::new("priority").sortable("by_priority"))
        .column(Column::new("owner.name").header("Owner").null_repr("unassigned"))
        .build()
}

// ============================================================================
// Full list screen
// ============================================================================

#[test]
fn default_screen_sorts_by_priority_desc_and_pages() {
    let query = TicketQuery::query(Params::new());
    let page = query.scoped().unwrap();

    let view = list_view(page.load())
        .query(&query)
        .table(table())
        .total_count(page.total_count())
        .build()
        .unwrap();

    let table = view.table.as_ref().unwrap();
    assert_eq!(table.header_texts(), vec!["Subject", "Priority", "Owner"]);
    assert_eq!(
        table.rows,
        vec![vec!["Login broken", "5", "ana"], vec!["Export slow", "3", "bo"]]
    );
    assert_eq!(table.headers[1].direction, Some(Dir::Desc));
    assert_eq!(table.headers[0].direction, None);
    assert!(view.is_partial());
    assert_eq!(view.filter_summary, None);
}

#[test]
fn filtered_screen_reports_summary_and_form_state() {
    let query = TicketQuery::query(Params::from_query_string(
        "query[subject_matches]=Login&query[state]=open&query[min_priority]=high&page=1",
    ));
    let page = query.scoped().unwrap();

    let view = list_view(page.load())
        .query(&query)
        .table(table())
        .build()
        .unwrap();

    assert_eq!(view.len(), 2);
    assert_eq!(
        view.filter_summary.as_deref(),
        Some("subject_matches=Login, state=open")
    );

    let form = view.form.as_ref().unwrap();
    let priority = form.field("min_priority").unwrap();
    assert!(!priority.active);
    assert_eq!(priority.value.as_deref(), Some("high"));
    assert_eq!(priority.kind.as_deref(), Some("integer"));

    let state = form.filter("state").unwrap();
    let closed = &state.options[1];
    assert!(!closed.active);
    assert_eq!(closed.link.params.query_value("state"), Some("closed"));
    assert_eq!(closed.link.params.query_value("subject_matches"), Some("Login"));
    assert!(!closed.link.params.contains_key("page"));
}

#[test]
fn second_page_follows_links() {
    let first = TicketQuery::query(Params::new());
    let next = first.params().clone().with("page", "2");
    let second = TicketQuery::query(next);

    let subjects: Vec<_> = second
        .scoped()
        .unwrap()
        .load()
        .into_iter()
        .map(|t| t.subject)
        .collect();
    assert_eq!(subjects, vec!["Login audit", "Typo on pricing"]);

    // toggling the sort drops the page
    let link = sort_link(&second, "by_priority");
    assert!(link.active);
    assert_eq!(link.params.get_str("sort_order"), Some("asc"));
    assert_eq!(link.params.get("page"), None);
}

#[test]
fn clear_link_returns_to_defaults() {
    let query = TicketQuery::query(
        Params::new()
            .with_query("state", "closed")
            .with("sorting", "by_subject"),
    );
    let link = clear_link(&query);
    assert!(!link.active);
    assert_eq!(link.href, "?");

    let reset = TicketQuery::query(link.params);
    assert!(!reset.is_filtered());
    assert_eq!(reset.sorting().unwrap().active(), Some("by_priority"));
}

#[test]
fn form_round_trips_through_json() {
    let query = TicketQuery::query(Params::new().with_query("state", "open"));
    let form = SearchForm::from_query(&query);
    let json = serde_json::to_value(&form).unwrap();

    assert_eq!(json["filters"][0]["name"], "state");
    assert_eq!(json["filters"][0]["options"][0]["active"], true);
    assert_eq!(json["sorting"]["direction"], "desc");
    assert_eq!(json["filtered"], true);
}

#[test]
fn column_with_undeclared_sort_scope_fails() {
    let query = TicketQuery::query(Params::new());
    let spec = TableSpec::builder()
        .column(Column::new("subject").sortable("by_owner"))
        .build();

    let err = list_view(query.scoped().unwrap().load())
        .query(&query)
        .table(spec)
        .build()
        .unwrap_err();
    assert!(matches!(err, ViewError::UnknownSortScope { .. }));
    assert_eq!(
        err.to_string(),
        "column 'subject' sorts by undeclared scope 'by_owner'"
    );
}
