//! Projection of business rows into public search results

use super::entity::SearchResult;

/// A business row as selected by the search queries: the business id, the
/// owning user's denormalized fields, and the review aggregate if one exists
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct BusinessRecord {
    pub business_id: i64,
    pub owner_name: Option<String>,
    pub avatar_url: Option<String>,
    pub review_count: Option<i64>,
    pub avg_rating: Option<f64>,
}

impl BusinessRecord {
    pub fn into_search_result(self) -> SearchResult {
        let name = self
            .owner_name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| fallback_name(self.business_id));

        SearchResult {
            id: self.business_id,
            name,
            avatar_url: self.avatar_url.filter(|a| !a.trim().is_empty()),
            review_count: self.review_count.unwrap_or(0),
            rating: self.avg_rating.unwrap_or(0.0),
        }
    }
}

impl From<BusinessRecord> for SearchResult {
    fn from(record: BusinessRecord) -> Self {
        record.into_search_result()
    }
}

/// Label shown for a business whose owner has no display name
pub fn fallback_name(business_id: i64) -> String {
    format!("Business #{}", business_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: Option<&str>, avatar: Option<&str>) -> BusinessRecord {
        BusinessRecord {
            business_id: 7,
            owner_name: name.map(str::to_string),
            avatar_url: avatar.map(str::to_string),
            review_count: None,
            avg_rating: None,
        }
    }

    #[test]
    fn test_maps_owner_fields() {
        let result = BusinessRecord {
            business_id: 3,
            owner_name: Some("Café Luna".to_string()),
            avatar_url: Some("https://cdn.example/luna.png".to_string()),
            review_count: Some(4),
            avg_rating: Some(4.25),
        }
        .into_search_result();

        assert_eq!(result.id, 3);
        assert_eq!(result.name, "Café Luna");
        assert_eq!(result.avatar_url.as_deref(), Some("https://cdn.example/luna.png"));
        assert_eq!(result.review_count, 4);
        assert_eq!(result.rating, 4.25);
    }

    #[test]
    fn test_missing_name_falls_back_to_id_label() {
        assert_eq!(record(None, None).into_search_result().name, "Business #7");
        assert_eq!(record(Some("  "), None).into_search_result().name, "Business #7");
    }

    #[test]
    fn test_missing_avatar_and_aggregate_default() {
        let result = SearchResult::from(record(Some("Fonda"), Some("")));
        assert!(result.avatar_url.is_none());
        assert_eq!(result.review_count, 0);
        assert_eq!(result.rating, 0.0);
    }
}
