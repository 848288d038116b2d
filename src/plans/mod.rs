mod companies;
mod contacts;
mod recurring_events;

use crate::error::SchemaPatchError;
use crate::migrator::{Backfill, ColumnSpec};

use companies::{COMPANY_COLUMNS, COMPANY_LOGO_DIR};
use contacts::CONTACT_COLUMNS;
use recurring_events::{RECURRENCE_TYPE_BACKFILL, RECURRING_EVENT_COLUMNS};

/// A named, hardcoded set of columns to ensure on one table.
///
/// - columns: ensured in order by the migrator
/// - backfill: data fix-up run after the columns, in the same transaction
/// - asset_dir: directory (relative to the assets root) the plan's feature
///   stores files in; created after the columns are in place
pub struct MigrationPlan {
    pub name: &'static str,
    pub description: &'static str,
    pub table: &'static str,
    pub columns: &'static [(&'static str, &'static str)],
    pub backfill: Option<Backfill>,
    pub asset_dir: Option<&'static str>,
}

impl MigrationPlan {
    pub fn column_specs(&self) -> Vec<ColumnSpec> {
        self.columns
            .iter()
            .map(|(name, col_type)| ColumnSpec::new(*name, *col_type))
            .collect()
    }

    pub fn find(name: &str) -> Result<&'static MigrationPlan, SchemaPatchError> {
        let name = name.trim();
        PLANS
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| SchemaPatchError::UnknownPlan(name.to_owned()))
    }
}

pub const CONTACTS: MigrationPlan = MigrationPlan {
    name: "contacts",
    description: "Address, phone, social and personal fields for contacts",
    table: "contacts",
    columns: CONTACT_COLUMNS,
    backfill: None,
    asset_dir: None,
};

pub const COMPANIES: MigrationPlan = MigrationPlan {
    name: "companies",
    description: "Logo, industry, size, address and social fields for companies",
    table: "companies",
    columns: COMPANY_COLUMNS,
    backfill: None,
    asset_dir: Some(COMPANY_LOGO_DIR),
};

pub const RECURRING_EVENTS: MigrationPlan = MigrationPlan {
    name: "recurring_events",
    description: "Daily, weekly, monthly and yearly recurrence rules",
    table: "recurring_events",
    columns: RECURRING_EVENT_COLUMNS,
    backfill: Some(RECURRENCE_TYPE_BACKFILL),
    asset_dir: None,
};

pub const PLANS: &[MigrationPlan] = &[CONTACTS, COMPANIES, RECURRING_EVENTS];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migrator::{is_identifier, Migrator};
    use rusqlite::Connection;

    #[test]
    fn test_find_plan() {
        assert_eq!(MigrationPlan::find("contacts").unwrap().table, "contacts");
        assert_eq!(MigrationPlan::find(" Companies ").unwrap().table, "companies");
        assert!(matches!(
            MigrationPlan::find("ghost"),
            Err(SchemaPatchError::UnknownPlan(_))
        ));
    }

    #[test]
    fn test_plan_columns_are_valid_and_unique() {
        for plan in PLANS {
            assert!(is_identifier(plan.table), "{}", plan.name);
            for (i, (name, col_type)) in plan.columns.iter().enumerate() {
                assert!(is_identifier(name), "{}.{}", plan.name, name);
                assert!(!col_type.trim().is_empty(), "{}.{}", plan.name, name);
                assert!(
                    !plan.columns[..i].iter().any(|(n, _)| n == name),
                    "duplicate column {}.{}",
                    plan.name,
                    name
                );
            }
        }
    }

    #[test]
    fn test_contact_plan_size() {
        assert_eq!(CONTACTS.column_specs().len(), 22);
        assert_eq!(COMPANIES.column_specs().len(), 6);
        assert_eq!(RECURRING_EVENTS.column_specs().len(), 10);
    }

    #[test]
    fn test_recurring_events_plan_applies_to_populated_table() {
        let mut conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE recurring_events (
                id INTEGER PRIMARY KEY,
                title VARCHAR(200) NOT NULL,
                day_of_week INTEGER
            );
            INSERT INTO recurring_events (title, day_of_week) VALUES ('Team sync', 1);",
        )
        .unwrap();

        let report = Migrator::ensure_columns_then(
            &mut conn,
            RECURRING_EVENTS.table,
            &RECURRING_EVENTS.column_specs(),
            RECURRING_EVENTS.backfill.as_ref(),
        )
        .unwrap();

        assert!(!report.has_failures(), "{:?}", report);
        assert_eq!(report.added.len(), 10);
        assert_eq!(report.column_count, 13);

        let (recurrence, interval): (String, i64) = conn
            .query_row(
                "SELECT recurrence_type, daily_interval FROM recurring_events",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .unwrap();
        assert_eq!(recurrence, "weekly");
        assert_eq!(interval, 1);
    }
}
