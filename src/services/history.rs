//! Returns history view: fetch, filter, paginate, render, export

use chrono::NaiveDate;

use crate::{
    models::report::{ReturnCondition, ReturnRecord},
    repository::DataBackend,
    security::escape_html,
};

use super::{
    export::{self, CsvExport},
    notifications::NotificationCenter,
};

pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Filters chosen by the user; the default matches everything
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub condition: Option<ReturnCondition>,
    pub search: Option<String>,
}

impl FilterCriteria {
    pub fn is_empty(&self) -> bool {
        *self == FilterCriteria::default()
    }

    pub fn matches(&self, record: &ReturnRecord) -> bool {
        let date = record.created_date();
        if self.date_from.is_some_and(|from| date < from) {
            return false;
        }
        if self.date_to.is_some_and(|to| date > to) {
            return false;
        }

        if let Some(condition) = &self.condition {
            if !record.is_condition(condition) {
                return false;
            }
        }

        if let Some(term) = self.search.as_deref().filter(|t| !t.is_empty()) {
            let term = term.to_lowercase();
            let client = record.renter_name().unwrap_or("").to_lowercase();
            let item = record.item_name().unwrap_or("").to_lowercase();
            if !client.contains(&term) && !item.contains(&term) {
                return false;
            }
        }

        true
    }
}

/// Summary counters over the filtered set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Analytics {
    pub total: usize,
    pub good: usize,
    pub damaged: usize,
    pub missing: usize,
    /// e.g. "33.3%", or "0%" when there is nothing to count
    pub good_percentage: String,
}

/// Notes column content
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotesCell {
    /// Damage notes of a damaged return, highlighted
    Damage(String),
    Plain(String),
    Empty,
}

impl NotesCell {
    pub fn text(&self) -> &str {
        match self {
            NotesCell::Damage(text) | NotesCell::Plain(text) => text,
            NotesCell::Empty => "-",
        }
    }

    pub fn to_html(&self) -> String {
        match self {
            NotesCell::Damage(text) => format!(
                r#"<span style="color: #FF9800; font-weight: 500;">{}</span>"#,
                escape_html(text)
            ),
            other => escape_html(other.text()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    pub date: String,
    pub client: String,
    pub item: String,
    pub quantity: i64,
    pub condition: String,
    pub notes: NotesCell,
}

impl TableRow {
    fn from_record(record: &ReturnRecord, date_format: &str) -> Self {
        let notes = match (&record.return_condition, record.damage_notes.as_deref()) {
            (Some(ReturnCondition::Damaged), Some(damage)) if !damage.is_empty() => {
                NotesCell::Damage(damage.to_string())
            }
            _ => match record.notes.as_deref() {
                Some(notes) if !notes.is_empty() => NotesCell::Plain(notes.to_string()),
                _ => NotesCell::Empty,
            },
        };

        Self {
            date: record.created_at.format(date_format).to_string(),
            client: record.renter_name().unwrap_or("Unknown").to_string(),
            item: record.item_name().unwrap_or("Unknown Item").to_string(),
            quantity: record.quantity.unwrap_or(0),
            condition: record.condition_label().to_string(),
            notes,
        }
    }

    pub fn row_class(&self) -> String {
        format!("row-{}", self.condition)
    }

    pub fn badge_class(&self) -> String {
        format!("badge-{}", self.condition)
    }

    pub fn to_html(&self) -> String {
        let condition = escape_html(&self.condition);
        format!(
            concat!(
                r#"<tr class="row-{}">"#,
                "<td>{}</td><td><strong>{}</strong></td><td>{}</td><td>{}</td>",
                r#"<td><span class="badge badge-{}">{}</span></td><td>{}</td>"#,
                "</tr>"
            ),
            condition,
            escape_html(&self.date),
            escape_html(&self.client),
            escape_html(&self.item),
            self.quantity,
            condition,
            condition,
            self.notes.to_html()
        )
    }
}

/// State of the pagination controls
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationView {
    pub visible: bool,
    pub current_page: usize,
    pub total_pages: usize,
    pub prev_disabled: bool,
    pub next_disabled: bool,
}

impl PaginationView {
    fn hidden(current_page: usize, total_pages: usize) -> Self {
        Self {
            visible: false,
            current_page,
            total_pages,
            prev_disabled: true,
            next_disabled: true,
        }
    }

    /// "Page X of Y", only when the controls are shown
    pub fn label(&self) -> Option<String> {
        self.visible
            .then(|| format!("Page {} of {}", self.current_page, self.total_pages))
    }
}

/// What the table area should show for the current page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableView {
    pub rows: Vec<TableRow>,
    pub empty_state: bool,
    pub pagination: PaginationView,
}

impl TableView {
    pub fn body_html(&self) -> String {
        self.rows.iter().map(TableRow::to_html).collect()
    }
}

/// Return history screen state.
///
/// Holds the fetched records plus the filter and page the user is on. The
/// fetched records are never modified; filtering only changes which of them
/// are visible.
pub struct ReturnHistoryView {
    all: Vec<ReturnRecord>,
    /// Indices into `all`, in fetch order
    filtered: Vec<usize>,
    criteria: FilterCriteria,
    current_page: usize,
    page_size: usize,
    date_format: String,
    notifications: NotificationCenter,
}

impl ReturnHistoryView {
    pub fn new(notifications: NotificationCenter, page_size: usize, date_format: impl Into<String>) -> Self {
        Self {
            all: Vec::new(),
            filtered: Vec::new(),
            criteria: FilterCriteria::default(),
            current_page: 1,
            page_size: page_size.max(1),
            date_format: date_format.into(),
            notifications,
        }
    }

    /// Replace the fetched set; filters and page start over
    pub fn set_records(&mut self, records: Vec<ReturnRecord>) {
        self.filtered = (0..records.len()).collect();
        self.all = records;
        self.criteria = FilterCriteria::default();
        self.current_page = 1;
    }

    /// Fetch the history from the backend.
    ///
    /// On failure the user is told and the view keeps what it had.
    pub async fn load(&mut self, backend: &dyn DataBackend) -> bool {
        match backend.return_history().await {
            Ok(records) => {
                tracing::info!("Loaded {} return history records", records.len());
                self.set_records(records);
                true
            }
            Err(e) => {
                tracing::error!("Error loading return history: {}", e);
                self.notifications
                    .error(format!("Error loading return history: {}", e.user_message()));
                false
            }
        }
    }

    pub fn all(&self) -> &[ReturnRecord] {
        &self.all
    }

    pub fn filtered(&self) -> Vec<&ReturnRecord> {
        self.filtered.iter().map(|&i| &self.all[i]).collect()
    }

    pub fn filtered_len(&self) -> usize {
        self.filtered.len()
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn analytics(&self) -> Analytics {
        let mut stats = Analytics {
            total: self.filtered.len(),
            good: 0,
            damaged: 0,
            missing: 0,
            good_percentage: "0%".to_string(),
        };

        for record in self.filtered() {
            match record.return_condition {
                Some(ReturnCondition::Good) => stats.good += 1,
                Some(ReturnCondition::Damaged) => stats.damaged += 1,
                Some(ReturnCondition::Missing) => stats.missing += 1,
                _ => {}
            }
        }

        if stats.total > 0 {
            let percent = stats.good as f64 / stats.total as f64 * 100.0;
            stats.good_percentage = format!("{:.1}%", percent);
        }
        stats
    }

    /// Narrow the fetched set down to `criteria` and go back to page 1
    pub fn apply_filters(&mut self, criteria: FilterCriteria) {
        self.filtered = self
            .all
            .iter()
            .enumerate()
            .filter(|(_, record)| criteria.matches(record))
            .map(|(i, _)| i)
            .collect();
        tracing::debug!("Filters {:?} kept {} of {} records", criteria, self.filtered.len(), self.all.len());
        self.criteria = criteria;
        self.current_page = 1;
    }

    pub fn reset_filters(&mut self) {
        self.criteria = FilterCriteria::default();
        self.filtered = (0..self.all.len()).collect();
        self.current_page = 1;
    }

    pub fn total_pages(&self) -> usize {
        self.filtered.len().div_ceil(self.page_size)
    }

    pub fn pagination(&self) -> PaginationView {
        let total_pages = self.total_pages();
        if total_pages <= 1 {
            return PaginationView::hidden(self.current_page, total_pages);
        }

        PaginationView {
            visible: true,
            current_page: self.current_page,
            total_pages,
            prev_disabled: self.current_page == 1,
            next_disabled: self.current_page == total_pages,
        }
    }

    pub fn render_table(&self) -> TableView {
        let start = (self.current_page - 1) * self.page_size;
        let rows: Vec<TableRow> = self
            .filtered
            .iter()
            .skip(start)
            .take(self.page_size)
            .map(|&i| TableRow::from_record(&self.all[i], &self.date_format))
            .collect();

        if rows.is_empty() {
            return TableView {
                rows,
                empty_state: true,
                pagination: PaginationView::hidden(self.current_page, self.total_pages()),
            };
        }

        TableView {
            rows,
            empty_state: false,
            pagination: self.pagination(),
        }
    }

    /// Move to the next page if there is one
    pub fn next_page(&mut self) -> bool {
        if self.current_page < self.total_pages() {
            self.current_page += 1;
            true
        } else {
            false
        }
    }

    pub fn prev_page(&mut self) -> bool {
        if self.current_page > 1 {
            self.current_page -= 1;
            true
        } else {
            false
        }
    }

    /// Jump to `page`, clamped to the existing pages
    pub fn go_to_page(&mut self, page: usize) {
        self.current_page = page.clamp(1, self.total_pages().max(1));
    }

    /// CSV of every filtered record, not only the visible page
    pub fn export_csv(&self, today: NaiveDate) -> Option<CsvExport> {
        if self.filtered.is_empty() {
            self.notifications.info("No data to export");
            return None;
        }
        Some(export::export(self.filtered(), &self.date_format, today))
    }
}
