//! Search specifications
//!
//! One composable SQL fragment per search criterion. Fragments are rendered
//! against the outer query aliases `b` (business) and `u` (owning user).
//! Every fragment renders the always-true predicate when its criterion is
//! absent, so composing an unset filter never excludes a business.

use crate::domain::specification::{
    BindValue, OrSpecification, SqlPredicate, SqlSpecification, TrueSpec, all_of,
};

use super::entity::{SearchCriteria, fold_case, normalize_labels, normalize_text};

/// Uppercase Spanish letters that SQLite's `LOWER` leaves untouched
const ACCENT_FOLDS: [(&str, &str); 7] = [
    ("Á", "á"),
    ("É", "é"),
    ("Í", "í"),
    ("Ó", "ó"),
    ("Ú", "ú"),
    ("Ü", "ü"),
    ("Ñ", "ñ"),
];

/// SQL expression lower-casing `column`, accented capitals included, so it
/// compares against text folded with [`fold_case`]
pub(crate) fn folded_column(column: &str) -> String {
    ACCENT_FOLDS
        .iter()
        .fold(format!("LOWER({})", column), |sql, (upper, lower)| {
            format!("REPLACE({}, '{}', '{}')", sql, upper, lower)
        })
}

/// Only active businesses are ever listed
#[derive(Debug, Clone, Copy, Default)]
pub struct ActiveSpec;

impl SqlSpecification for ActiveSpec {
    fn to_predicate(&self) -> SqlPredicate {
        SqlPredicate::new("b.is_active = 1", Vec::new())
    }
}

/// Case-insensitive substring match on the owning user's display name
#[derive(Debug, Clone, Default)]
pub struct NameSpec {
    fragment: Option<String>,
}

impl NameSpec {
    pub fn new(fragment: Option<&str>) -> Self {
        Self {
            fragment: normalize_text(fragment).map(|f| fold_case(&f)),
        }
    }
}

impl SqlSpecification for NameSpec {
    fn to_predicate(&self) -> SqlPredicate {
        match &self.fragment {
            // instr() rather than LIKE: '%' and '_' in user text stay literal
            Some(fragment) => SqlPredicate::new(
                format!("instr({}, ?) > 0", folded_column("u.name")),
                vec![BindValue::Text(fragment.clone())],
            ),
            None => SqlPredicate::always_true(),
        }
    }
}

/// Some dish of the business sits in a category whose label contains the fragment
#[derive(Debug, Clone, Default)]
pub struct CategoryLabelContainsSpec {
    fragment: Option<String>,
}

impl CategoryLabelContainsSpec {
    pub fn new(fragment: Option<&str>) -> Self {
        Self {
            fragment: normalize_text(fragment).map(|f| fold_case(&f)),
        }
    }
}

impl SqlSpecification for CategoryLabelContainsSpec {
    fn to_predicate(&self) -> SqlPredicate {
        match &self.fragment {
            Some(fragment) => SqlPredicate::new(
                format!(
                    r#"EXISTS (
                    SELECT 1 FROM dishes d
                    JOIN menu_categories mc ON mc.category_id = d.category_id
                    WHERE d.business_id = b.business_id
                      AND instr({}, ?) > 0
                )"#,
                    folded_column("mc.category_name")
                ),
                vec![BindValue::Text(fragment.clone())],
            ),
            None => SqlPredicate::always_true(),
        }
    }
}

/// Free-text criterion: the display name matches, or the menu carries a
/// matching category
pub fn text_spec(fragment: Option<&str>) -> OrSpecification {
    NameSpec::new(fragment).or(CategoryLabelContainsSpec::new(fragment))
}

/// The business's address resolves, through the postal catalog, to the
/// given administrative area
#[derive(Debug, Clone, Default)]
pub struct AreaSpec {
    area: Option<String>,
}

impl AreaSpec {
    pub fn new(area: Option<&str>) -> Self {
        Self {
            area: normalize_text(area).map(|a| fold_case(&a)),
        }
    }
}

impl SqlSpecification for AreaSpec {
    fn to_predicate(&self) -> SqlPredicate {
        match &self.area {
            // The address is keyed by the owning user, which shares the business id
            Some(area) => SqlPredicate::new(
                format!(
                    r#"EXISTS (
                    SELECT 1 FROM users_address ua
                    JOIN postal_code_catalog pc
                      ON pc.postal_code = ua.postal_code AND pc.colonia = ua.colonia
                    WHERE ua.user_id = b.business_id
                      AND {} = ?
                )"#,
                    folded_column("pc.alcaldia")
                ),
                vec![BindValue::Text(area.clone())],
            ),
            None => SqlPredicate::always_true(),
        }
    }
}

/// ANY-match: at least one dish falls in at least one requested category
#[derive(Debug, Clone, Default)]
pub struct CategoryAnySpec {
    labels: Vec<String>,
}

impl CategoryAnySpec {
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            labels: normalize_labels(labels),
        }
    }
}

impl SqlSpecification for CategoryAnySpec {
    fn to_predicate(&self) -> SqlPredicate {
        if self.labels.is_empty() {
            return SqlPredicate::always_true();
        }

        let placeholders = vec!["?"; self.labels.len()].join(", ");
        let binds = self
            .labels
            .iter()
            .cloned()
            .map(BindValue::Text)
            .collect();

        SqlPredicate::new(
            format!(
                r#"EXISTS (
                    SELECT 1 FROM dishes d
                    JOIN menu_categories mc ON mc.category_id = d.category_id
                    WHERE d.business_id = b.business_id
                      AND {} IN ({})
                )"#,
                folded_column("mc.category_name"),
                placeholders
            ),
            binds,
        )
    }
}

/// Builder for composing the business search predicate
pub struct BusinessSpecBuilder {
    text: Option<String>,
    area: Option<String>,
    categories: Vec<String>,
}

impl BusinessSpecBuilder {
    /// Create a new builder (active businesses only, no other filter)
    pub fn new() -> Self {
        Self {
            text: None,
            area: None,
            categories: Vec::new(),
        }
    }

    /// Builder carrying every criterion of a search request
    pub fn from_criteria(criteria: &SearchCriteria) -> Self {
        Self {
            text: criteria.text.clone(),
            area: criteria.area.clone(),
            categories: criteria.categories.clone(),
        }
    }

    /// Add free-text filter
    pub fn with_text(mut self, text: &str) -> Self {
        self.text = normalize_text(Some(text));
        self
    }

    /// Add area filter
    pub fn with_area(mut self, area: &str) -> Self {
        self.area = normalize_text(Some(area));
        self
    }

    /// Add category filter
    pub fn with_categories<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.categories = normalize_labels(labels);
        self
    }

    /// Fragments in evaluation order, the active filter first as the cheap reject
    fn fragments(&self) -> Vec<Box<dyn SqlSpecification>> {
        let text: Box<dyn SqlSpecification> = match self.text.as_deref() {
            Some(text) => Box::new(text_spec(Some(text))),
            None => Box::new(TrueSpec),
        };

        vec![
            Box::new(ActiveSpec),
            text,
            Box::new(AreaSpec::new(self.area.as_deref())),
            Box::new(CategoryAnySpec::new(&self.categories)),
        ]
    }

    /// Conjunction of all fragments
    pub fn build(&self) -> SqlPredicate {
        all_of(&self.fragments())
    }
}

impl Default for BusinessSpecBuilder {
    fn default() -> Self {
        Self::new()
    }
}
