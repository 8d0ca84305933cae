//! Read-only reports over one month's shows and the assignment store.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::process::{Availability, ShowAvailability};
use crate::schedule::{Assignment, AssignmentStore, Role, ShowKey};

/// A show still missing a host, a door person, or both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnderstaffedShow {
    pub show_key: ShowKey,
    pub assignment: Assignment,
    pub missing_host: bool,
    pub missing_door: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Shift {
    pub show_key: ShowKey,
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PersonShifts {
    pub name: String,
    pub shifts: Vec<Shift>,
    pub host_count: usize,
    pub door_count: usize,
    pub total_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MonthReport {
    pub unassigned_people: Vec<String>,
    pub understaffed_shows: Vec<UnderstaffedShow>,
    pub shift_summary: Vec<PersonShifts>,
}

/// People available for at least one show in `view` who hold no role on
/// any of those shows.
pub fn unassigned_people(view: &[ShowAvailability<'_>], store: &AssignmentStore) -> Vec<String> {
    let assignments: Vec<Assignment> = view.iter().map(|s| store.assignment(&s.key())).collect();

    let available: BTreeSet<&str> = view
        .iter()
        .flat_map(|s| s.available.iter().map(|p| p.name.as_str()))
        .collect();

    available
        .into_iter()
        .filter(|name| !assignments.iter().any(|a| a.involves(name)))
        .map(str::to_string)
        .collect()
}

/// Shows of `view`, in order, lacking a host or a door person.
pub fn understaffed_shows(
    view: &[ShowAvailability<'_>],
    store: &AssignmentStore,
) -> Vec<UnderstaffedShow> {
    view.iter()
        .filter_map(|slot| {
            let show_key = slot.key();
            let assignment = store.assignment(&show_key);
            let missing_host = !assignment.has_host();
            let missing_door = !assignment.has_door();
            (missing_host || missing_door).then(|| UnderstaffedShow {
                show_key,
                assignment,
                missing_host,
                missing_door,
            })
        })
        .collect()
}

/// Every person holding any role in the store, across all months, with
/// their shifts ordered by show key.
pub fn shift_summary(store: &AssignmentStore) -> Vec<PersonShifts> {
    let mut by_person: BTreeMap<&str, Vec<Shift>> = BTreeMap::new();

    for (key, assignment) in store.iter() {
        if !assignment.host.is_empty() {
            by_person.entry(assignment.host.as_str()).or_default().push(Shift {
                show_key: key.clone(),
                role: Role::Host,
            });
        }
        for person in &assignment.door {
            by_person.entry(person.as_str()).or_default().push(Shift {
                show_key: key.clone(),
                role: Role::Door,
            });
        }
    }

    by_person
        .into_iter()
        .map(|(name, mut shifts)| {
            shifts.sort_by(|a, b| a.show_key.cmp(&b.show_key));
            let host_count = shifts.iter().filter(|s| s.role == Role::Host).count();
            let door_count = shifts.iter().filter(|s| s.role == Role::Door).count();
            PersonShifts {
                name: name.to_string(),
                total_count: shifts.len(),
                shifts,
                host_count,
                door_count,
            }
        })
        .collect()
}

/// All three reports for `month`. With no month selected, or a table without
/// even a header row, every report is empty.
pub fn month_report(
    availability: &Availability,
    month: Option<&str>,
    store: &AssignmentStore,
) -> MonthReport {
    let Some(month) = month.filter(|m| !m.is_empty()) else {
        return MonthReport::default();
    };
    if availability.is_empty() {
        return MonthReport::default();
    }

    let view = availability.month_view(month);
    MonthReport {
        unassigned_people: unassigned_people(&view, store),
        understaffed_shows: understaffed_shows(&view, store),
        shift_summary: shift_summary(store),
    }
}
