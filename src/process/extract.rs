use std::collections::{BTreeSet, HashSet};
use tracing::trace;

use crate::process::raw_table::{AvailabilityRow, Columns, RawTable};
use crate::process::text::{fragment_month, show_date};
use crate::schedule::{Show, ShowKey, Venue};

/// Parsed view of the availability sheet. Names are title-cased on the way
/// in; every query below works off the parsed rows.
#[derive(Debug, Clone, Default)]
pub struct Availability {
    columns: Columns,
    rows: Vec<AvailabilityRow>,
    has_rows: bool,
}

/// A show together with everyone whose fragments list it.
#[derive(Debug, Clone)]
pub struct ShowAvailability<'a> {
    pub show: Show,
    pub available: Vec<&'a AvailabilityRow>,
}

impl<'a> ShowAvailability<'a> {
    pub fn key(&self) -> ShowKey {
        self.show.key()
    }

    /// Available people who said they can host.
    pub fn host_options(&self) -> Vec<&'a AvailabilityRow> {
        self.available.iter().copied().filter(|p| p.can_host).collect()
    }

    /// Available people other than the current host.
    pub fn door_options(&self, current_host: &str) -> Vec<&'a AvailabilityRow> {
        self.available
            .iter()
            .copied()
            .filter(|p| p.name != current_host)
            .collect()
    }
}

impl Availability {
    pub fn from_table(table: &RawTable) -> Self {
        let normalized = table.normalize_names();
        let columns = normalized.columns();
        let rows = normalized
            .data_rows()
            .iter()
            .map(|row| AvailabilityRow::parse(row, &columns))
            .collect();
        Self {
            columns,
            rows,
            has_rows: !table.is_empty(),
        }
    }

    /// True when the source table had no rows at all, header included.
    pub fn is_empty(&self) -> bool {
        !self.has_rows
    }

    pub fn columns(&self) -> &Columns {
        &self.columns
    }

    /// Every parsed data row, named or not.
    pub fn rows(&self) -> &[AvailabilityRow] {
        &self.rows
    }

    /// Rows with a name. Empty when the sheet has no name column.
    pub fn people(&self) -> impl Iterator<Item = &AvailabilityRow> {
        self.rows.iter().filter(|r| !r.name.is_empty())
    }

    /// Distinct month labels across both venue columns, in string order.
    pub fn months(&self) -> Vec<String> {
        let mut months = BTreeSet::new();
        for row in &self.rows {
            for venue in Venue::ALL {
                for fragment in row.fragments(venue) {
                    match fragment_month(fragment) {
                        Some(label) => {
                            months.insert(label);
                        }
                        None => trace!(%fragment, "no date in fragment"),
                    }
                }
            }
        }
        months.into_iter().collect()
    }

    /// Distinct shows falling in `month`, earliest first. Shows on the same
    /// day keep the order they were first seen in.
    pub fn shows_for_month(&self, month: &str) -> Vec<Show> {
        let mut seen: HashSet<ShowKey> = HashSet::new();
        let mut shows = Vec::new();

        for row in &self.rows {
            for venue in Venue::ALL {
                for fragment in row.fragments(venue) {
                    if fragment_month(fragment).as_deref() != Some(month) {
                        continue;
                    }
                    let show = Show::new(fragment.clone(), venue);
                    if seen.insert(show.key()) {
                        shows.push(show);
                    }
                }
            }
        }

        shows.sort_by_cached_key(|s| show_date(&s.date));
        shows
    }

    /// Named people whose `venue` fragments contain `show.date` verbatim.
    pub fn available_for(&self, show: &Show) -> Vec<&AvailabilityRow> {
        self.people()
            .filter(|p| p.is_available(&show.date, show.venue))
            .collect()
    }

    /// The dated show behind `key`, if any row lists it.
    pub fn find_show(&self, key: &ShowKey) -> Option<Show> {
        self.rows.iter().find_map(|row| {
            Venue::ALL.into_iter().find_map(|venue| {
                row.fragments(venue)
                    .iter()
                    .map(|fragment| Show::new(fragment.clone(), venue))
                    .find(|show| show.key() == *key && show_date(&show.date).is_some())
            })
        })
    }

    pub fn month_view(&self, month: &str) -> Vec<ShowAvailability<'_>> {
        self.shows_for_month(month)
            .into_iter()
            .map(|show| {
                let available = self.available_for(&show);
                ShowAvailability { show, available }
            })
            .collect()
    }
}

/// Month labels present anywhere in `table`.
pub fn extract_months(table: &RawTable) -> Vec<String> {
    Availability::from_table(table).months()
}

/// Shows of `month` in `table`, earliest first.
pub fn shows_for_month(table: &RawTable, month: &str) -> Vec<Show> {
    Availability::from_table(table).shows_for_month(month)
}
