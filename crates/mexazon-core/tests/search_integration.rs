//! Search engine integration tests against a file-backed database

use mexazon_core::domain::search::{Page, SearchCriteria, SearchResult, SearchService};
use mexazon_core::storage::{Database, DatabaseConfig};
use tempfile::TempDir;

const AREAS: [(&str, &str, &str); 3] = [
    ("04000", "Villa Coyoacán", "Coyoacán"),
    ("09000", "Santa Cruz Meyehualco", "Iztapalapa"),
    ("14000", "Tlalpan Centro", "Tlalpan"),
];

const CATEGORIES: [&str; 4] = ["Tacos", "Café", "Mariscos", "Postres"];

/// Twenty-four businesses: every seventh inactive, every fifth without an
/// address, categories and ratings assigned round-robin
async fn seeded_database(dir: &TempDir) -> Database {
    let db = Database::new(DatabaseConfig::with_path(dir.path().join("search.db")))
        .await
        .unwrap();
    let pool = db.pool();

    for (postal_code, colonia, alcaldia) in AREAS {
        sqlx::query("INSERT INTO postal_code_catalog (postal_code, colonia, alcaldia) VALUES (?, ?, ?)")
            .bind(postal_code)
            .bind(colonia)
            .bind(alcaldia)
            .execute(pool)
            .await
            .unwrap();
    }
    for name in CATEGORIES {
        sqlx::query("INSERT INTO menu_categories (category_name) VALUES (?)")
            .bind(name)
            .execute(pool)
            .await
            .unwrap();
    }

    // Reviewers 1001..=1005; each reviews a business at most once
    for reviewer in 1..=5_i64 {
        let id = 1000 + reviewer;
        sqlx::query("INSERT INTO users (user_id, email, phone, name) VALUES (?, ?, ?, ?)")
            .bind(id)
            .bind(format!("reviewer{}@example.com", reviewer))
            .bind(format!("r{}", reviewer))
            .bind(format!("Reviewer {}", reviewer))
            .execute(pool)
            .await
            .unwrap();
    }

    let prefixes = ["Taquería", "Cafetería", "Marisquería", "Pastelería"];
    for id in 1..=24_i64 {
        let idx = (id as usize) % 4;
        let name = format!("{} Número {:02}", prefixes[idx], id);
        sqlx::query(
            "INSERT INTO users (user_id, user_type, email, phone, name) VALUES (?, 'business', ?, ?, ?)",
        )
        .bind(id)
        .bind(format!("b{}@example.com", id))
        .bind(format!("b{}", id))
        .bind(&name)
        .execute(pool)
        .await
        .unwrap();

        sqlx::query("INSERT INTO business (business_id, is_active) VALUES (?, ?)")
            .bind(id)
            .bind(id % 7 != 0)
            .execute(pool)
            .await
            .unwrap();

        if id % 5 != 0 {
            let (postal_code, colonia, _) = AREAS[(id as usize) % 3];
            sqlx::query("INSERT INTO users_address (user_id, postal_code, colonia) VALUES (?, ?, ?)")
                .bind(id)
                .bind(postal_code)
                .bind(colonia)
                .execute(pool)
                .await
                .unwrap();
        }

        sqlx::query(
            "INSERT INTO dishes (business_id, category_id, dish_name, price) VALUES (?, ?, 'Especial', 50.0)",
        )
        .bind(id)
        .bind((idx as i64) + 1)
        .execute(pool)
        .await
        .unwrap();

        for reviewer in 1..=(id % 3) {
            sqlx::query(
                "INSERT INTO posts (author_user_id, reviewed_business_id, rating, description) VALUES (?, ?, ?, 'ok')",
            )
            .bind(1000 + reviewer)
            .bind(id)
            .bind((id % 5) + 1)
            .execute(pool)
            .await
            .unwrap();
        }
    }

    // Customer with an address in Tlalpan, customer without one
    sqlx::query("INSERT INTO users (user_id, email, phone, name) VALUES (500, 'c@example.com', 'c500', 'Cliente')")
        .execute(pool)
        .await
        .unwrap();
    sqlx::query("INSERT INTO users_address (user_id, postal_code, colonia) VALUES (500, '14000', 'Tlalpan Centro')")
        .execute(pool)
        .await
        .unwrap();
    sqlx::query("INSERT INTO users (user_id, email, phone, name) VALUES (501, 'd@example.com', 'c501', 'Sin Casa')")
        .execute(pool)
        .await
        .unwrap();

    db
}

fn ids(page: &Page<SearchResult>) -> Vec<i64> {
    page.content.iter().map(|r| r.id).collect()
}

/// Walk every page of `criteria` at `size` and stitch the content
async fn stitched(service: &SearchService, criteria: &SearchCriteria, size: i64) -> Vec<SearchResult> {
    let first = service
        .search(&criteria.clone().with_page(Some(0), Some(size)))
        .await
        .unwrap();
    let mut all = first.content.clone();
    for page in 1..first.total_pages() as i64 {
        let next = service
            .search(&criteria.clone().with_page(Some(page), Some(size)))
            .await
            .unwrap();
        assert_eq!(next.total_elements, first.total_elements);
        all.extend(next.content);
    }
    all
}

#[tokio::test]
async fn test_pages_stitch_to_the_full_result() {
    let dir = TempDir::new().unwrap();
    let db = seeded_database(&dir).await;
    let service = SearchService::new(db.pool().clone());

    let cases = [
        SearchCriteria::new(),
        SearchCriteria::new().with_sort(Some("rating,desc")),
        SearchCriteria::new().with_sort(Some("reviews,desc")),
        SearchCriteria::new().with_area("Coyoacán"),
        SearchCriteria::new().with_categories(["tacos", "café"]),
        SearchCriteria::new().with_text("ería").with_sort(Some("id,desc")),
    ];

    for criteria in cases {
        let full = service
            .search(&criteria.clone().with_page(Some(0), Some(50)))
            .await
            .unwrap();
        assert_eq!(full.total_elements as usize, full.content.len());

        for size in [1, 4, 7] {
            assert_eq!(stitched(&service, &criteria, size).await, full.content);
        }
    }
}

#[tokio::test]
async fn test_inactive_businesses_never_returned() {
    let dir = TempDir::new().unwrap();
    let db = seeded_database(&dir).await;
    let service = SearchService::new(db.pool().clone());

    let page = service
        .search(&SearchCriteria::new().with_page(Some(0), Some(50)))
        .await
        .unwrap();

    assert_eq!(page.total_elements, 21);
    assert!(ids(&page).iter().all(|id| id % 7 != 0));
}

#[tokio::test]
async fn test_area_excludes_businesses_without_address() {
    let dir = TempDir::new().unwrap();
    let db = seeded_database(&dir).await;
    let service = SearchService::new(db.pool().clone());

    let mut seen = 0;
    for (_, _, alcaldia) in AREAS {
        let page = service
            .search(&SearchCriteria::new().with_area(alcaldia).with_page(Some(0), Some(50)))
            .await
            .unwrap();
        assert!(ids(&page).iter().all(|id| id % 5 != 0));
        seen += page.total_elements;
    }

    let addressed_active = (1..=24).filter(|id| id % 7 != 0 && id % 5 != 0).count();
    assert_eq!(seen as usize, addressed_active);
}

#[tokio::test]
async fn test_category_filter_is_a_union() {
    let dir = TempDir::new().unwrap();
    let db = seeded_database(&dir).await;
    let service = SearchService::new(db.pool().clone());

    let tacos = service
        .search(&SearchCriteria::new().with_categories(["Tacos"]).with_page(Some(0), Some(50)))
        .await
        .unwrap();
    let cafe = service
        .search(&SearchCriteria::new().with_categories(["Café"]).with_page(Some(0), Some(50)))
        .await
        .unwrap();
    let both = service
        .search(
            &SearchCriteria::new()
                .with_categories(["Tacos", "Café", "tacos"])
                .with_page(Some(0), Some(50)),
        )
        .await
        .unwrap();

    assert_eq!(tacos.total_elements, 6);
    assert_eq!(cafe.total_elements, 5);
    assert_eq!(
        both.total_elements,
        tacos.total_elements + cafe.total_elements
    );
}

#[tokio::test]
async fn test_filters_intersect() {
    let dir = TempDir::new().unwrap();
    let db = seeded_database(&dir).await;
    let service = SearchService::new(db.pool().clone());

    let criteria = SearchCriteria::new()
        .with_text("número 1")
        .with_area("Iztapalapa")
        .with_categories(["Postres"])
        .with_page(Some(0), Some(50));
    let page = service.search(&criteria).await.unwrap();

    // "Número 1x", Postres (id % 4 == 3), address in Iztapalapa (id % 3 == 1)
    let expected: Vec<i64> = (10..=19)
        .filter(|id| id % 4 == 3 && id % 3 == 1 && id % 5 != 0 && id % 7 != 0)
        .collect();
    assert_eq!(expected, vec![19]);
    assert_eq!(ids(&page), expected);
}

#[tokio::test]
async fn test_top_in_area_orders_by_rating() {
    let dir = TempDir::new().unwrap();
    let db = seeded_database(&dir).await;
    let service = SearchService::new(db.pool().clone());

    let page = service.top_in_area(500, None, Some(50)).await.unwrap();
    assert!(!page.is_empty());
    assert!(
        page.content
            .windows(2)
            .all(|pair| pair[0].rating >= pair[1].rating)
    );

    let by_area = service
        .search(&SearchCriteria::new().with_area("Tlalpan").with_page(Some(0), Some(50)))
        .await
        .unwrap();
    assert_eq!(page.total_elements, by_area.total_elements);

    let nowhere = service.top_in_area(501, None, None).await.unwrap();
    assert_eq!(nowhere, Page::empty());
}

#[tokio::test]
async fn test_uppercase_accented_input_matches_like_lowercase() {
    let dir = TempDir::new().unwrap();
    let db = seeded_database(&dir).await;
    let service = SearchService::new(db.pool().clone());

    let pairs = [
        (
            SearchCriteria::new().with_area("COYOACÁN"),
            SearchCriteria::new().with_area("coyoacán"),
        ),
        (
            SearchCriteria::new().with_text("TAQUERÍA NÚMERO"),
            SearchCriteria::new().with_text("taquería número"),
        ),
        (
            SearchCriteria::new().with_text("CAFÉ"),
            SearchCriteria::new().with_text("café"),
        ),
    ];

    for (upper, lower) in pairs {
        let upper = service.search(&upper.with_page(Some(0), Some(50))).await.unwrap();
        let lower = service.search(&lower.with_page(Some(0), Some(50))).await.unwrap();
        assert!(!lower.is_empty());
        assert_eq!(ids(&upper), ids(&lower));
    }
}
