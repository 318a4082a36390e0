//! Physical inventory override: row validation, diff preview and wizard state

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{
    BulkOverrideRequest, OverrideRow, PhysicalInventoryBaseRow, SessionUser, StatusCounts,
    StockStatus,
};
use crate::types::EntityId;
use crate::validation::validate_required_text;

/// What is wrong with one uploaded row
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RowErrorKind {
    /// A cell could not be read
    Parse { column: String, message: String },
    /// Serialized row lists a different number of serials than its quantity
    SerialCountMismatch {
        status: StockStatus,
        quantity: i64,
        listed: usize,
    },
    /// The same serial appears under more than one status
    DuplicateSerial {
        serial: String,
        statuses: Vec<StockStatus>,
    },
    /// The product/location pair appears more than once in the upload
    DuplicateRow { first_row: usize },
    /// The product/location pair is not part of the current inventory
    UnknownRow,
}

/// A row-level validation error
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RowError {
    pub row_number: usize,
    pub product_id: Option<EntityId>,
    pub location_id: Option<EntityId>,
    pub kind: RowErrorKind,
}

impl std::fmt::Display for RowError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Row {}: ", self.row_number)?;
        match &self.kind {
            RowErrorKind::Parse { column, message } => write!(f, "{} ({})", message, column),
            RowErrorKind::SerialCountMismatch {
                status,
                quantity,
                listed,
            } => write!(
                f,
                "{} quantity is {} but {} serial numbers are listed",
                status, quantity, listed
            ),
            RowErrorKind::DuplicateSerial { serial, statuses } => {
                let names: Vec<String> = statuses.iter().map(|s| s.to_string()).collect();
                write!(f, "serial {} appears in {}", serial, names.join(" and "))
            }
            RowErrorKind::DuplicateRow { first_row } => {
                write!(f, "duplicates row {}", first_row)
            }
            RowErrorKind::UnknownRow => write!(f, "product/location pair is not in the inventory"),
        }
    }
}

fn row_error(row: &OverrideRow, kind: RowErrorKind) -> RowError {
    RowError {
        row_number: row.row_number,
        product_id: Some(row.product_id),
        location_id: Some(row.location_id),
        kind,
    }
}

/// Validate parsed rows against each other and the current base
pub fn validate_rows(rows: &[OverrideRow], base: &[PhysicalInventoryBaseRow]) -> Vec<RowError> {
    let known: HashSet<(EntityId, EntityId)> = base.iter().map(|b| b.key()).collect();
    let mut seen: HashMap<(EntityId, EntityId), usize> = HashMap::new();
    let mut errors = Vec::new();

    for row in rows {
        if let Some(first_row) = seen.get(&row.key()) {
            errors.push(row_error(
                row,
                RowErrorKind::DuplicateRow {
                    first_row: *first_row,
                },
            ));
            continue;
        }
        seen.insert(row.key(), row.row_number);

        if !known.contains(&row.key()) {
            errors.push(row_error(row, RowErrorKind::UnknownRow));
            continue;
        }

        if !row.has_serial {
            continue;
        }

        for status in StockStatus::ALL {
            let listed = row.serials(status).len();
            let quantity = row.quantity(status);
            if listed as i64 != quantity {
                errors.push(row_error(
                    row,
                    RowErrorKind::SerialCountMismatch {
                        status,
                        quantity,
                        listed,
                    },
                ));
            }
        }

        let mut placements: BTreeMap<&str, Vec<StockStatus>> = BTreeMap::new();
        for status in StockStatus::ALL {
            for serial in row.serials(status) {
                let entry = placements.entry(serial.as_str()).or_default();
                if !entry.contains(&status) {
                    entry.push(status);
                }
            }
        }
        for (serial, statuses) in placements {
            if statuses.len() > 1 {
                errors.push(row_error(
                    row,
                    RowErrorKind::DuplicateSerial {
                        serial: serial.to_string(),
                        statuses,
                    },
                ));
            }
        }
    }

    errors
}

/// Old → new preview of one row
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RowDiff {
    pub row_number: usize,
    pub product_id: EntityId,
    pub location_id: EntityId,
    pub product_name: String,
    pub location_name: String,
    pub old: StatusCounts,
    pub new: StatusCounts,
    pub serials_changed: bool,
    pub changed: bool,
}

fn same_serials(a: &[String], b: &[String]) -> bool {
    let left: HashSet<&String> = a.iter().collect();
    let right: HashSet<&String> = b.iter().collect();
    left == right
}

/// Diff every row that exists in the base
pub fn diff_rows(rows: &[OverrideRow], base: &[PhysicalInventoryBaseRow]) -> Vec<RowDiff> {
    let by_key: HashMap<(EntityId, EntityId), &PhysicalInventoryBaseRow> =
        base.iter().map(|b| (b.key(), b)).collect();

    rows.iter()
        .filter_map(|row| {
            let current = by_key.get(&row.key())?;
            let old = current.counts();
            let new = row.counts();
            let serials_changed = row.has_serial
                && StockStatus::ALL
                    .iter()
                    .any(|s| !same_serials(row.serials(*s), current.serials(*s)));
            Some(RowDiff {
                row_number: row.row_number,
                product_id: row.product_id,
                location_id: row.location_id,
                product_name: current.product_name.clone(),
                location_name: current.location_name.clone(),
                old,
                new,
                serials_changed,
                changed: old != new || serials_changed,
            })
        })
        .collect()
}

/// Steps of the override wizard
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    Upload,
    Review,
    Confirm,
    Closed,
}

/// Wizard operations refused in the current state
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WizardError {
    #[error("Expected the {expected:?} step, wizard is at {actual:?}")]
    WrongStep {
        expected: WizardStep,
        actual: WizardStep,
    },

    #[error("Fix {0} row error(s) before continuing")]
    HasErrors(usize),

    #[error("The upload contains no rows")]
    NoRows,

    #[error("An audit note is required")]
    NoteRequired,

    #[error("A reference date is required")]
    ReferenceDateRequired,
}

/// State of the upload → review → confirm flow
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OverrideWizard {
    pub step: WizardStep,
    pub rows: Vec<OverrideRow>,
    pub errors: Vec<RowError>,
    pub diff: Vec<RowDiff>,
    pub server_error: Option<String>,
}

impl Default for OverrideWizard {
    fn default() -> Self {
        Self {
            step: WizardStep::Upload,
            rows: Vec::new(),
            errors: Vec::new(),
            diff: Vec::new(),
            server_error: None,
        }
    }
}

impl OverrideWizard {
    pub fn new() -> Self {
        Self::default()
    }

    fn expect_step(&self, expected: WizardStep) -> Result<(), WizardError> {
        if self.step != expected {
            return Err(WizardError::WrongStep {
                expected,
                actual: self.step,
            });
        }
        Ok(())
    }

    /// Load a parsed upload; always lands on Review so errors can be shown
    pub fn load(
        &mut self,
        rows: Vec<OverrideRow>,
        parse_errors: Vec<RowError>,
        base: &[PhysicalInventoryBaseRow],
    ) {
        let mut errors = parse_errors;
        errors.extend(validate_rows(&rows, base));
        errors.sort_by_key(|e| e.row_number);

        self.diff = diff_rows(&rows, base);
        self.rows = rows;
        self.errors = errors;
        self.server_error = None;
        self.step = WizardStep::Review;
    }

    /// Back to an empty Upload step
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn changed_rows(&self) -> usize {
        self.diff.iter().filter(|d| d.changed).count()
    }

    /// Review → Confirm, blocked while errors exist
    pub fn advance(&mut self) -> Result<(), WizardError> {
        self.expect_step(WizardStep::Review)?;
        if !self.errors.is_empty() {
            return Err(WizardError::HasErrors(self.errors.len()));
        }
        if self.rows.is_empty() {
            return Err(WizardError::NoRows);
        }
        self.step = WizardStep::Confirm;
        Ok(())
    }

    /// Confirm → Review
    pub fn back(&mut self) -> Result<(), WizardError> {
        self.expect_step(WizardStep::Confirm)?;
        self.server_error = None;
        self.step = WizardStep::Review;
        Ok(())
    }

    /// Build the commit request from the Confirm step
    pub fn commit_request(
        &self,
        note: &str,
        reference_date: Option<DateTime<Utc>>,
        user: &SessionUser,
    ) -> Result<BulkOverrideRequest, WizardError> {
        self.expect_step(WizardStep::Confirm)?;
        validate_required_text(note).map_err(|_| WizardError::NoteRequired)?;
        let reference_date = reference_date.ok_or(WizardError::ReferenceDateRequired)?;

        Ok(BulkOverrideRequest {
            reference_date,
            note: note.trim().to_string(),
            user_id: user.user_id,
            user_name: user.name.clone(),
            rows: self.rows.clone(),
        })
    }

    pub fn record_success(&mut self) {
        self.step = WizardStep::Closed;
        self.server_error = None;
    }

    /// Failed commits stay on Confirm with the server's message
    pub fn record_failure(&mut self, message: impl Into<String>) {
        self.server_error = Some(message.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn s(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn base() -> Vec<PhysicalInventoryBaseRow> {
        vec![
            PhysicalInventoryBaseRow {
                product_id: 10,
                product_name: "Paper Bags".to_string(),
                location_id: 1,
                location_name: "Main Warehouse".to_string(),
                has_serial: false,
                good_quantity: 40,
                sold_quantity: 5,
                bad_quantity: 1,
                good_serials: vec![],
                sold_serials: vec![],
                bad_serials: vec![],
            },
            PhysicalInventoryBaseRow {
                product_id: 20,
                product_name: "Handheld Scanner".to_string(),
                location_id: 1,
                location_name: "Main Warehouse".to_string(),
                has_serial: true,
                good_quantity: 2,
                sold_quantity: 1,
                bad_quantity: 0,
                good_serials: s(&["SC-1", "SC-2"]),
                sold_serials: s(&["SC-3"]),
                bad_serials: vec![],
            },
        ]
    }

    fn unchanged_rows() -> Vec<OverrideRow> {
        base()
            .iter()
            .enumerate()
            .map(|(i, b)| OverrideRow::from_base(i + 1, b))
            .collect()
    }

    fn user() -> SessionUser {
        SessionUser {
            user_id: 12,
            name: "Dana".to_string(),
            role_id: 1,
            location_id: None,
            location_name: None,
        }
    }

    #[test]
    fn test_unmodified_rows_have_no_errors_and_no_changes() {
        let rows = unchanged_rows();
        assert!(validate_rows(&rows, &base()).is_empty());
        let diff = diff_rows(&rows, &base());
        assert_eq!(diff.len(), 2);
        assert!(diff.iter().all(|d| !d.changed));
    }

    #[test]
    fn test_serial_count_must_match_quantity() {
        let mut rows = unchanged_rows();
        rows[1].good_quantity = 3;
        let errors = validate_rows(&rows, &base());
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].kind,
            RowErrorKind::SerialCountMismatch {
                status: StockStatus::Good,
                quantity: 3,
                listed: 2
            }
        );
        assert_eq!(
            errors[0].to_string(),
            "Row 2: Good quantity is 3 but 2 serial numbers are listed"
        );
    }

    #[test]
    fn test_serial_in_two_columns_is_flagged() {
        let mut rows = unchanged_rows();
        rows[1].bad_serials = s(&["SC-2"]);
        rows[1].bad_quantity = 1;
        let errors = validate_rows(&rows, &base());
        assert_eq!(
            errors,
            vec![RowError {
                row_number: 2,
                product_id: Some(20),
                location_id: Some(1),
                kind: RowErrorKind::DuplicateSerial {
                    serial: "SC-2".to_string(),
                    statuses: vec![StockStatus::Good, StockStatus::Bad],
                },
            }]
        );
    }

    #[test]
    fn test_unknown_and_duplicate_rows() {
        let mut rows = unchanged_rows();
        let mut again = rows[0].clone();
        again.row_number = 3;
        rows.push(again);
        let mut stranger = rows[0].clone();
        stranger.row_number = 4;
        stranger.location_id = 99;
        rows.push(stranger);

        let kinds: Vec<RowErrorKind> =
            validate_rows(&rows, &base()).into_iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![RowErrorKind::DuplicateRow { first_row: 1 }, RowErrorKind::UnknownRow]
        );
    }

    #[test]
    fn test_non_serialized_rows_ignore_serial_columns() {
        let mut rows = unchanged_rows();
        rows[0].good_quantity = 38;
        assert!(validate_rows(&rows, &base()).is_empty());
        let diff = diff_rows(&rows, &base());
        assert!(diff[0].changed);
        assert_eq!(diff[0].old.good, 40);
        assert_eq!(diff[0].new.good, 38);
    }

    #[test]
    fn test_serial_reshuffle_counts_as_change() {
        let mut rows = unchanged_rows();
        rows[1].good_serials = s(&["SC-1", "SC-9"]);
        let diff = diff_rows(&rows, &base());
        assert!(diff[1].serials_changed);
        assert!(diff[1].changed);
        assert_eq!(diff[1].old, diff[1].new);
    }

    #[test]
    fn test_wizard_blocks_advance_with_errors() {
        let mut rows = unchanged_rows();
        rows[1].sold_quantity = 0;
        let mut wizard = OverrideWizard::new();
        wizard.load(rows, vec![], &base());
        assert_eq!(wizard.step, WizardStep::Review);
        assert_eq!(wizard.advance(), Err(WizardError::HasErrors(1)));
        assert_eq!(wizard.step, WizardStep::Review);
    }

    #[test]
    fn test_wizard_happy_path_and_failure_stays_in_confirm() {
        let mut wizard = OverrideWizard::new();
        wizard.load(unchanged_rows(), vec![], &base());
        wizard.advance().unwrap();
        assert_eq!(wizard.step, WizardStep::Confirm);

        assert_eq!(
            wizard.commit_request("  ", Some(Utc::now()), &user()),
            Err(WizardError::NoteRequired)
        );
        assert_eq!(
            wizard.commit_request("Cycle count", None, &user()),
            Err(WizardError::ReferenceDateRequired)
        );

        let when = Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap();
        let request = wizard.commit_request("Cycle count", Some(when), &user()).unwrap();
        assert_eq!(request.rows.len(), 2);
        assert_eq!(request.user_id, 12);

        wizard.record_failure("Batch date already used");
        assert_eq!(wizard.step, WizardStep::Confirm);
        assert_eq!(wizard.server_error.as_deref(), Some("Batch date already used"));

        wizard.record_success();
        assert_eq!(wizard.step, WizardStep::Closed);
    }

    #[test]
    fn test_commit_only_from_confirm() {
        let wizard = OverrideWizard::new();
        assert!(matches!(
            wizard.commit_request("note", Some(Utc::now()), &user()),
            Err(WizardError::WrongStep { .. })
        ));
    }
}
