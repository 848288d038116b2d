pub const COMPANY_COLUMNS: &[(&str, &str)] = &[
    ("logo", "VARCHAR(255)"),
    ("industry", "VARCHAR(100)"),
    ("size", "VARCHAR(50)"),
    ("address", "VARCHAR(255)"),
    ("linkedin", "VARCHAR(255)"),
    ("twitter", "VARCHAR(255)"),
];

/// Uploaded logos are stored here, relative to the assets root.
pub const COMPANY_LOGO_DIR: &str = "static/company_logos";
