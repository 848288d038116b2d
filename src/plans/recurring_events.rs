use crate::migrator::Backfill;

/// Recurrence rule fields for `recurring_events`.
///
/// Defaults here are constants; SQLite refuses a non-constant default such
/// as `CURRENT_TIMESTAMP` in `ADD COLUMN` once the table has rows, so
/// `created_at` is added bare.
pub const RECURRING_EVENT_COLUMNS: &[(&str, &str)] = &[
    ("recurrence_type", "VARCHAR(20) DEFAULT 'weekly'"),
    ("daily_interval", "INTEGER DEFAULT 1"),
    ("weekly_interval", "INTEGER DEFAULT 1"),
    ("monthly_date", "INTEGER"),
    ("monthly_interval", "INTEGER DEFAULT 1"),
    ("monthly_week", "INTEGER"),
    ("monthly_weekday", "INTEGER"),
    ("yearly_month", "INTEGER"),
    ("yearly_day", "INTEGER"),
    ("created_at", "TIMESTAMP"),
];

/// Rows that predate the recurrence columns are weekly events.
pub const RECURRENCE_TYPE_BACKFILL: Backfill = Backfill {
    label: "default recurrence_type to 'weekly'",
    sql: "UPDATE recurring_events SET recurrence_type = 'weekly' WHERE recurrence_type IS NULL",
};
