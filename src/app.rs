//! Application state owned by whichever front end is driving it.

use tracing::{error, info, warn};

use crate::persist::{BlobStore, ASSIGNMENTS_KEY, SELECTED_MONTH_KEY};
use crate::process::{Availability, RawTable, ShowAvailability};
use crate::schedule::{Assignment, AssignmentStore, ShowKey};
use crate::stats::{self, MonthReport};

/// Table, derived availability, assignments and the selected month, plus
/// the blob store they are saved to. Commands save after every change;
/// save failures are logged and the in-memory state is kept.
pub struct App<S: BlobStore> {
    table: RawTable,
    availability: Availability,
    months: Vec<String>,
    store: AssignmentStore,
    selected_month: Option<String>,
    blobs: S,
}

impl<S: BlobStore> App<S> {
    /// Build from a fetched table and restore whatever was saved.
    /// A missing or unreadable blob starts that piece of state empty.
    pub fn load(table: RawTable, blobs: S) -> Self {
        let availability = Availability::from_table(&table);
        let months = availability.months();

        let store = match blobs.get(ASSIGNMENTS_KEY) {
            Ok(Some(json)) => AssignmentStore::from_json(&json).unwrap_or_else(|e| {
                error!(error = %e, "saved assignments are unreadable; starting empty");
                AssignmentStore::new()
            }),
            Ok(None) => AssignmentStore::new(),
            Err(e) => {
                error!(error = %e, "loading assignments failed; starting empty");
                AssignmentStore::new()
            }
        };

        let selected_month = match blobs.get(SELECTED_MONTH_KEY) {
            Ok(month) => month.filter(|m| !m.is_empty()),
            Err(e) => {
                error!(error = %e, "loading selected month failed");
                None
            }
        };

        info!(
            rows = table.data_rows().len(),
            months = months.len(),
            assignments = store.len(),
            selected = ?selected_month,
            "state loaded"
        );

        Self {
            table,
            availability,
            months,
            store,
            selected_month,
            blobs,
        }
    }

    pub fn table(&self) -> &RawTable {
        &self.table
    }

    pub fn availability(&self) -> &Availability {
        &self.availability
    }

    /// Month labels found in the table, in string order.
    pub fn months(&self) -> &[String] {
        &self.months
    }

    pub fn store(&self) -> &AssignmentStore {
        &self.store
    }

    pub fn selected_month(&self) -> Option<&str> {
        self.selected_month.as_deref()
    }

    pub fn blobs(&self) -> &S {
        &self.blobs
    }

    /// Pick one of [`Self::months`], or clear the selection with `""`.
    /// Unknown labels are refused. Returns whether the selection changed.
    pub fn select_month(&mut self, month: &str) -> bool {
        let next = if month.is_empty() {
            None
        } else if self.months.iter().any(|m| m == month) {
            Some(month.to_string())
        } else {
            warn!(month, "not a month in the availability table");
            return false;
        };

        if next == self.selected_month {
            return false;
        }
        self.selected_month = next;

        let value = self.selected_month.clone().unwrap_or_default();
        if let Err(e) = self.blobs.set(SELECTED_MONTH_KEY, &value) {
            error!(error = %e, "saving selected month failed");
        }
        true
    }

    pub fn set_host(&mut self, key: &ShowKey, name: &str) -> Assignment {
        if self.store.set_host(key, name) {
            info!(show = %key, host = name, "host set");
            self.save_assignments();
        }
        self.store.assignment(key)
    }

    pub fn set_door(&mut self, key: &ShowKey, name: &str, included: bool) -> Assignment {
        if self.store.set_door(key, name, included) {
            info!(show = %key, person = name, included, "door updated");
            self.save_assignments();
        }
        self.store.assignment(key)
    }

    /// Shows of the selected month with who can work them.
    pub fn month_view(&self) -> Vec<ShowAvailability<'_>> {
        match self.selected_month() {
            Some(month) => self.availability.month_view(month),
            None => Vec::new(),
        }
    }

    pub fn report(&self) -> MonthReport {
        stats::month_report(&self.availability, self.selected_month(), &self.store)
    }

    fn save_assignments(&mut self) {
        let json = match self.store.to_json() {
            Ok(json) => json,
            Err(e) => {
                error!(error = %e, "serializing assignments failed");
                return;
            }
        };
        if let Err(e) = self.blobs.set(ASSIGNMENTS_KEY, &json) {
            error!(error = %e, "saving assignments failed");
        }
    }
}
