use serde::{Deserialize, Serialize};

use crate::process::text::title_case;
use crate::schedule::Venue;

/// The availability sheet as fetched: row 0 is the header, every other row
/// is one person's form response. Rows may be shorter than the header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawTable {
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn header(&self) -> &[String] {
        self.rows.first().map(Vec::as_slice).unwrap_or(&[])
    }

    /// Everything after the header row.
    pub fn data_rows(&self) -> &[Vec<String>] {
        self.rows.get(1..).unwrap_or(&[])
    }

    pub fn columns(&self) -> Columns {
        Columns::locate(self.header())
    }

    /// Title-case the name column of every data row. Without a name column
    /// the table is returned as is.
    pub fn normalize_names(&self) -> RawTable {
        let Some(name_idx) = self.columns().name else {
            return self.clone();
        };

        let rows = self
            .rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                if i == 0 {
                    return row.clone();
                }
                row.iter()
                    .enumerate()
                    .map(|(j, cell)| {
                        if j == name_idx && !cell.is_empty() {
                            title_case(cell)
                        } else {
                            cell.clone()
                        }
                    })
                    .collect()
            })
            .collect();

        RawTable { rows }
    }
}

impl From<Vec<Vec<String>>> for RawTable {
    fn from(rows: Vec<Vec<String>>) -> Self {
        Self::new(rows)
    }
}

/// Positions of the columns we care about, found by substring match on the
/// header. The first matching header wins.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Columns {
    pub name: Option<usize>,
    pub host: Option<usize>,
    pub stowaway: Option<usize>,
    pub citizen: Option<usize>,
}

impl Columns {
    pub fn locate(header: &[String]) -> Self {
        let find = |needle: &str| header.iter().position(|h| h.contains(needle));
        Self {
            name: find("Your name"),
            host: find("host"),
            stowaway: find("Stowaway"),
            citizen: find("Citizen"),
        }
    }

    pub fn venue(&self, venue: Venue) -> Option<usize> {
        match venue {
            Venue::Stowaway => self.stowaway,
            Venue::Citizen => self.citizen,
        }
    }
}

/// One data row parsed against [`Columns`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AvailabilityRow {
    /// Trimmed name; empty when the row has none.
    pub name: String,
    pub can_host: bool,
    /// Trimmed, non-empty comma fragments of the Stowaway cell.
    pub stowaway: Vec<String>,
    pub citizen: Vec<String>,
}

impl AvailabilityRow {
    pub fn parse(row: &[String], columns: &Columns) -> Self {
        let cell = |idx: Option<usize>| idx.and_then(|i| row.get(i)).map_or("", String::as_str);

        Self {
            name: cell(columns.name).trim().to_string(),
            can_host: cell(columns.host).trim().eq_ignore_ascii_case("yes"),
            stowaway: split_fragments(cell(columns.stowaway)),
            citizen: split_fragments(cell(columns.citizen)),
        }
    }

    pub fn fragments(&self, venue: Venue) -> &[String] {
        match venue {
            Venue::Stowaway => &self.stowaway,
            Venue::Citizen => &self.citizen,
        }
    }

    /// Exact membership of `date` among this row's fragments for `venue`.
    pub fn is_available(&self, date: &str, venue: Venue) -> bool {
        self.fragments(venue).iter().any(|d| d == date)
    }
}

fn split_fragments(cell: &str) -> Vec<String> {
    cell.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(rows: &[&[&str]]) -> RawTable {
        RawTable::new(
            rows.iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        )
    }

    #[test]
    fn locates_columns_by_substring() {
        let t = table(&[&[
            "Timestamp",
            "Your name (first and last)",
            "Can you host?",
            "Stowaway dates",
            "Citizen dates",
        ]]);
        let cols = t.columns();
        assert_eq!(cols.name, Some(1));
        assert_eq!(cols.host, Some(2));
        assert_eq!(cols.stowaway, Some(3));
        assert_eq!(cols.citizen, Some(4));
        assert_eq!(cols.venue(Venue::Citizen), Some(4));
    }

    #[test]
    fn host_header_match_is_case_sensitive() {
        let t = table(&[&["Your name", "Host?"]]);
        assert_eq!(t.columns().host, None);
    }

    #[test]
    fn normalizes_names_but_not_header() {
        let t = table(&[
            &["Your name", "Can host"],
            &["alice SMITH", "yes"],
            &["", "no"],
        ]);
        let n = t.normalize_names();
        assert_eq!(n.rows[0], vec!["Your name", "Can host"]);
        assert_eq!(n.rows[1][0], "Alice Smith");
        assert_eq!(n.rows[2][0], "");
    }

    #[test]
    fn missing_name_column_leaves_table_untouched() {
        let t = table(&[&["Who", "Stowaway"], &["alice smith", "Wed October 2 2025"]]);
        assert_eq!(t.normalize_names(), t);
    }

    #[test]
    fn parses_ragged_rows() {
        let t = table(&[
            &["Your name", "Can host", "Stowaway", "Citizen"],
            &["  Bob Jones ", "YES", " Wed October 2 2025 ,, Fri October 4 2025"],
        ]);
        let row = AvailabilityRow::parse(&t.data_rows()[0], &t.columns());
        assert_eq!(row.name, "Bob Jones");
        assert!(row.can_host);
        assert_eq!(row.stowaway, vec!["Wed October 2 2025", "Fri October 4 2025"]);
        assert!(row.citizen.is_empty());
        assert!(row.is_available("Fri October 4 2025", Venue::Stowaway));
        assert!(!row.is_available("Fri October 4 2025", Venue::Citizen));
        assert!(!row.is_available("Friday October 4 2025", Venue::Stowaway));
    }

    #[test]
    fn empty_table_has_no_header() {
        let t = RawTable::default();
        assert!(t.header().is_empty());
        assert!(t.data_rows().is_empty());
        assert_eq!(t.columns(), Columns::default());
    }
}
