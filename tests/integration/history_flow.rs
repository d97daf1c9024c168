use chrono::NaiveDate;
use std::sync::atomic::Ordering;

use rental_desk::{
    models::report::ReturnCondition,
    services::history::{FilterCriteria, NotesCell},
};

use crate::fakes::harness;

fn june_first() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
}

#[tokio::test]
async fn load_and_page_through_history() {
    let h = harness();
    let mut view = h.services.history_view();

    assert!(view.load(h.data.as_ref()).await);
    assert_eq!(view.all().len(), 45);
    assert_eq!(view.filtered_len(), 45);

    let stats = view.analytics();
    assert_eq!(stats.total, 45);
    assert_eq!((stats.good, stats.damaged, stats.missing), (24, 12, 9));
    assert_eq!(stats.good_percentage, "53.3%");

    assert_eq!(view.total_pages(), 3);
    let first = view.render_table();
    assert_eq!(first.rows.len(), 20);
    assert_eq!(first.pagination.label().as_deref(), Some("Page 1 of 3"));
    assert!(first.pagination.prev_disabled);

    assert!(view.next_page());
    assert!(view.next_page());
    assert!(!view.next_page());
    let last = view.render_table();
    assert_eq!(last.rows.len(), 5);
    assert!(last.pagination.next_disabled);
    assert_eq!(last.pagination.label().as_deref(), Some("Page 3 of 3"));
}

#[tokio::test]
async fn filters_narrow_and_reset_restores() {
    let h = harness();
    let mut view = h.services.history_view();
    assert!(view.load(h.data.as_ref()).await);
    let everything: Vec<_> = view.filtered().into_iter().cloned().collect();

    view.apply_filters(FilterCriteria {
        date_from: NaiveDate::from_ymd_opt(2024, 5, 10),
        date_to: NaiveDate::from_ymd_opt(2024, 5, 12),
        ..Default::default()
    });
    // Days 10-12 come from i = 9..=11 and i = 39..=41
    assert_eq!(view.filtered_len(), 6);

    view.apply_filters(FilterCriteria {
        condition: Some(ReturnCondition::Damaged),
        search: Some("jane".to_string()),
        ..Default::default()
    });
    assert!(view.filtered().iter().all(|r| {
        r.renter_name() == Some("Jane Smith") && r.return_condition == Some(ReturnCondition::Damaged)
    }));
    let stats = view.analytics();
    assert_eq!(stats.total, stats.damaged);

    let table = view.render_table();
    assert!(table.rows.iter().all(|row| matches!(row.notes, NotesCell::Damage(_))));
    assert!(!table.pagination.visible);

    view.reset_filters();
    let restored: Vec<_> = view.filtered().into_iter().cloned().collect();
    assert_eq!(restored, everything);
}

#[tokio::test]
async fn export_writes_filtered_rows() {
    let h = harness();
    let mut view = h.services.history_view();
    assert!(view.load(h.data.as_ref()).await);

    view.apply_filters(FilterCriteria {
        condition: Some(ReturnCondition::Missing),
        ..Default::default()
    });

    let export = view.export_csv(june_first()).unwrap();
    assert_eq!(export.rows, 9);

    let dir = tempfile::tempdir().unwrap();
    let path = export.write_to(dir.path()).unwrap();
    assert!(path.ends_with("return-history-2024-06-01.csv"));

    let written = std::fs::read_to_string(path).unwrap();
    let mut lines = written.lines();
    assert_eq!(
        lines.next(),
        Some("Date,Client,Item,Quantity,Condition,Type,Notes,Damage Notes")
    );
    for line in lines {
        assert!(line.contains(",missing,missing,"));
        // "Return N, checked" keeps its place in a single quoted cell
        assert!(line.contains("\"Return ") && line.contains("; checked\""));
    }
}

#[tokio::test]
async fn failed_reload_keeps_previous_rows() {
    let h = harness();
    let mut view = h.services.history_view();
    assert!(view.load(h.data.as_ref()).await);
    view.next_page();

    h.data.failing.store(true, Ordering::SeqCst);
    assert!(!view.load(h.data.as_ref()).await);

    assert_eq!(view.all().len(), 45);
    assert_eq!(view.current_page(), 2);
    let shown = h.services.notifications.snapshot();
    assert_eq!(shown.last().unwrap().message, "Error loading return history: Service unavailable");
}

#[tokio::test]
async fn nothing_to_export() {
    let h = harness();
    let view = h.services.history_view();

    assert!(view.export_csv(june_first()).is_none());
    assert_eq!(h.services.notifications.snapshot()[0].message, "No data to export");
}
