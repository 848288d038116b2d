/// Contact card fields: physical address, extra contact methods, social
/// profiles, important dates and personal details.
pub const CONTACT_COLUMNS: &[(&str, &str)] = &[
    // Physical address
    ("street_address", "VARCHAR(255)"),
    ("address_line_2", "VARCHAR(255)"),
    ("city", "VARCHAR(100)"),
    ("state", "VARCHAR(50)"),
    ("zip_code", "VARCHAR(20)"),
    ("country", "VARCHAR(100)"),
    // Additional contact methods
    ("mobile_phone", "VARCHAR(64)"),
    ("work_phone", "VARCHAR(64)"),
    ("home_phone", "VARCHAR(64)"),
    ("personal_email", "VARCHAR(255)"),
    ("website", "VARCHAR(255)"),
    // Social
    ("linkedin_url", "VARCHAR(255)"),
    ("twitter_url", "VARCHAR(255)"),
    ("facebook_url", "VARCHAR(255)"),
    ("instagram_url", "VARCHAR(255)"),
    ("github_url", "VARCHAR(255)"),
    // Important dates
    ("birthday", "DATE"),
    ("anniversary", "DATE"),
    // Personal details
    ("spouse_name", "VARCHAR(120)"),
    ("children_names", "TEXT"), // free-form, may hold several names
    ("assistant_name", "VARCHAR(120)"),
    ("business_card_photo", "VARCHAR(255)"),
];
