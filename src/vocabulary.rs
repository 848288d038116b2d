use strum::{AsRefStr, Display, EnumIter, EnumString};

const PROJECT_CATEGORIES: &[&str] = &[
    "Marketing",
    "DC Work",
    "Coding",
    "Managerial",
    "Sales",
    "Client Health",
    "Operations",
    "Research",
    "Development",
    "General",
];

const PROJECT_STATUSES: &[&str] = &["planning", "active", "on_hold", "completed", "cancelled"];

const PRIORITY_LEVELS: &[&str] = &["low", "medium", "high", "critical"];

// For organizing tasks within projects
const TASK_CATEGORIES: &[&str] = &[
    "Development",
    "Design",
    "Testing",
    "Documentation",
    "Research",
    "Meeting",
    "Review",
    "Deployment",
    "Communication",
    "Other",
];

/// The fixed vocabularies the planner application validates against.
#[derive(AsRefStr, EnumIter, EnumString, Debug, Display, PartialEq, Eq, Copy, Clone)]
#[strum(serialize_all = "kebab-case")]
pub enum Vocabulary {
    ProjectCategories,
    ProjectStatuses,
    PriorityLevels,
    TaskCategories,
}

impl Vocabulary {
    pub fn entries(&self) -> &'static [&'static str] {
        match self {
            Vocabulary::ProjectCategories => PROJECT_CATEGORIES,
            Vocabulary::ProjectStatuses => PROJECT_STATUSES,
            Vocabulary::PriorityLevels => PRIORITY_LEVELS,
            Vocabulary::TaskCategories => TASK_CATEGORIES,
        }
    }

    pub fn contains(&self, value: &str) -> bool {
        self.entries().contains(&value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_vocabulary_names() {
        assert_eq!(Vocabulary::ProjectCategories.as_ref(), "project-categories");
        assert_eq!(Vocabulary::PriorityLevels.to_string(), "priority-levels");
        assert_eq!(
            "task-categories".parse::<Vocabulary>().unwrap(),
            Vocabulary::TaskCategories
        );
        assert!("statuses".parse::<Vocabulary>().is_err());
    }

    #[test]
    fn test_vocabulary_entries() {
        assert_eq!(Vocabulary::ProjectCategories.entries().len(), 10);
        assert_eq!(
            Vocabulary::PriorityLevels.entries(),
            &["low", "medium", "high", "critical"]
        );
        assert!(Vocabulary::ProjectStatuses.contains("on_hold"));
        assert!(!Vocabulary::ProjectStatuses.contains("On Hold"));
    }

    #[test]
    fn test_vocabulary_iter() {
        let all: Vec<Vocabulary> = Vocabulary::iter().collect();
        assert_eq!(all.len(), 4);
        assert!(all.iter().all(|v| !v.entries().is_empty()));
    }
}
