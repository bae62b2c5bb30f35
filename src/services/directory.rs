use sqlx::{QueryBuilder, Row, Sqlite};

use crate::database::DbPool;
use crate::models::server::{ServerRecord, ServerRow};
use crate::utils::error::{AppError, AppResult};

// Everything one directory request asked for, resolved to typed values.
// The handler builds it once and the functions below thread it through a
// single composed query; no state is accumulated between requests.
#[derive(Debug, Clone, Default)]
pub struct ServerSelection {
    pub category: Option<String>,
    pub quantity: Option<i64>,
    pub member_user_id: Option<i64>,
    pub server_id: Option<i64>,
    pub with_num_members: bool,
}

pub async fn select_servers(
    pool: &DbPool,
    selection: &ServerSelection,
) -> AppResult<Vec<ServerRecord>> {
    // An id lookup bypasses every other predicate, so a quantity limit can
    // never hide an existing server. Only the annotation carries over.
    if let Some(server_id) = selection.server_id {
        let rows = fetch_rows(
            pool,
            &ServerSelection {
                server_id: Some(server_id),
                with_num_members: selection.with_num_members,
                ..ServerSelection::default()
            },
        )
        .await?;

        if rows.is_empty() {
            return Err(AppError::Validation(format!(
                "Server with id {} not found",
                server_id
            )));
        }

        return attach_members(pool, rows).await;
    }

    let rows = fetch_rows(pool, selection).await?;
    attach_members(pool, rows).await
}

async fn fetch_rows(pool: &DbPool, selection: &ServerSelection) -> AppResult<Vec<ServerRow>> {
    let mut query: QueryBuilder<Sqlite> =
        QueryBuilder::new("SELECT s.id, s.name, s.description, s.owner_id, c.name AS category");

    if selection.with_num_members {
        query.push(
            ", (SELECT COUNT(*) FROM server_members sm WHERE sm.server_id = s.id) AS num_members",
        );
    }

    query.push(" FROM servers s JOIN categories c ON c.id = s.category_id");

    if let Some(user_id) = selection.member_user_id {
        query.push(" JOIN server_members m ON m.server_id = s.id AND m.user_id = ");
        query.push_bind(user_id);
    }

    if let Some(server_id) = selection.server_id {
        query.push(" WHERE s.id = ");
        query.push_bind(server_id);
    } else if let Some(category) = &selection.category {
        query.push(" WHERE c.name = ");
        query.push_bind(category.clone());
    }

    query.push(" ORDER BY s.id");

    if let Some(quantity) = selection.quantity {
        query.push(" LIMIT ");
        query.push_bind(quantity);
    }

    let rows = query
        .build_query_as::<ServerRow>()
        .fetch_all(pool.as_ref())
        .await?;

    Ok(rows)
}

async fn attach_members(pool: &DbPool, rows: Vec<ServerRow>) -> AppResult<Vec<ServerRecord>> {
    let mut records = Vec::with_capacity(rows.len());

    for row in rows {
        let members = sqlx::query(
            "SELECT user_id FROM server_members WHERE server_id = ? ORDER BY user_id",
        )
        .bind(row.id)
        .fetch_all(pool.as_ref())
        .await?
        .iter()
        .map(|member| member.get::<i64, _>("user_id"))
        .collect();

        records.push(row.into_record(members));
    }

    Ok(records)
}

#[cfg(test)]
pub(crate) async fn seed_directory(pool: &DbPool) {
    let statements = [
        "INSERT INTO users (id, username, password_hash, created_at, is_admin) VALUES
            (1, 'alice', 'unused', '2025-06-01T00:00:00Z', 0),
            (2, 'bob', 'unused', '2025-06-01T00:00:00Z', 0),
            (3, 'carol', 'unused', '2025-06-01T00:00:00Z', 0)",
        "INSERT INTO categories (id, name, description, created_at) VALUES
            (1, 'gaming', 'Games and tournaments', '2025-06-01T00:00:00Z'),
            (2, 'music', NULL, '2025-06-01T00:00:00Z'),
            (3, 'coding', 'Programming talk', '2025-06-01T00:00:00Z')",
        "INSERT INTO servers (id, name, description, owner_id, category_id, created_at) VALUES
            (1, 'Rustaceans Hangout', 'All things crab', 1, 1, '2025-06-02T00:00:00Z'),
            (2, 'Synthwave Lounge', NULL, 2, 2, '2025-06-03T00:00:00Z'),
            (3, 'Dungeon Crawlers', 'Weekly raids', 1, 1, '2025-06-04T00:00:00Z'),
            (4, 'Compiler Club', NULL, 3, 3, '2025-06-05T00:00:00Z')",
        "INSERT INTO server_members (server_id, user_id, joined_at) VALUES
            (1, 1, '2025-06-02T00:00:00Z'),
            (1, 2, '2025-06-02T00:00:00Z'),
            (2, 2, '2025-06-03T00:00:00Z'),
            (3, 1, '2025-06-04T00:00:00Z'),
            (3, 2, '2025-06-04T00:00:00Z'),
            (3, 3, '2025-06-04T00:00:00Z'),
            (4, 3, '2025-06-05T00:00:00Z')",
    ];

    for statement in statements {
        sqlx::query(statement)
            .execute(pool.as_ref())
            .await
            .unwrap();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::create_test_pool;

    async fn seeded_pool() -> DbPool {
        let pool = create_test_pool().await;
        seed_directory(&pool).await;
        pool
    }

    fn ids(records: &[ServerRecord]) -> Vec<i64> {
        records.iter().map(|record| record.id).collect()
    }

    #[tokio::test]
    async fn test_select_all_in_natural_order() {
        let pool = seeded_pool().await;

        let records = select_servers(&pool, &ServerSelection::default())
            .await
            .unwrap();

        assert_eq!(ids(&records), vec![1, 2, 3, 4]);
        assert!(records.iter().all(|record| record.num_members.is_none()));
        assert_eq!(records[0].members, vec![1, 2]);
        assert_eq!(records[0].category, "gaming");
        assert_eq!(records[0].owner, 1);
    }

    #[tokio::test]
    async fn test_category_filter() {
        let pool = seeded_pool().await;

        let selection = ServerSelection {
            category: Some("gaming".to_string()),
            ..ServerSelection::default()
        };
        let records = select_servers(&pool, &selection).await.unwrap();

        assert_eq!(ids(&records), vec![1, 3]);
        assert!(records.iter().all(|record| record.category == "gaming"));
    }

    #[tokio::test]
    async fn test_unknown_category_is_empty() {
        let pool = seeded_pool().await;

        let selection = ServerSelection {
            category: Some("knitting".to_string()),
            ..ServerSelection::default()
        };
        let records = select_servers(&pool, &selection).await.unwrap();

        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_quantity_truncates_in_order() {
        let pool = seeded_pool().await;

        let selection = ServerSelection {
            quantity: Some(2),
            ..ServerSelection::default()
        };
        let records = select_servers(&pool, &selection).await.unwrap();
        assert_eq!(ids(&records), vec![1, 2]);

        let selection = ServerSelection {
            quantity: Some(0),
            ..ServerSelection::default()
        };
        assert!(select_servers(&pool, &selection).await.unwrap().is_empty());

        let selection = ServerSelection {
            quantity: Some(50),
            ..ServerSelection::default()
        };
        assert_eq!(select_servers(&pool, &selection).await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_membership_filter() {
        let pool = seeded_pool().await;

        let selection = ServerSelection {
            member_user_id: Some(1),
            ..ServerSelection::default()
        };
        assert_eq!(ids(&select_servers(&pool, &selection).await.unwrap()), vec![1, 3]);

        let selection = ServerSelection {
            member_user_id: Some(3),
            ..ServerSelection::default()
        };
        assert_eq!(ids(&select_servers(&pool, &selection).await.unwrap()), vec![3, 4]);
    }

    #[tokio::test]
    async fn test_num_members_annotation() {
        let pool = seeded_pool().await;

        let selection = ServerSelection {
            with_num_members: true,
            ..ServerSelection::default()
        };
        let records = select_servers(&pool, &selection).await.unwrap();

        let counts: Vec<Option<i64>> = records.iter().map(|record| record.num_members).collect();
        assert_eq!(counts, vec![Some(2), Some(1), Some(3), Some(1)]);
    }

    #[tokio::test]
    async fn test_num_members_reflects_live_count() {
        let pool = seeded_pool().await;

        let selection = ServerSelection {
            server_id: Some(2),
            with_num_members: true,
            ..ServerSelection::default()
        };
        let before = select_servers(&pool, &selection).await.unwrap();
        assert_eq!(before[0].num_members, Some(1));

        sqlx::query(
            "INSERT INTO server_members (server_id, user_id, joined_at) VALUES (2, 3, '2025-06-06T00:00:00Z')",
        )
        .execute(pool.as_ref())
        .await
        .unwrap();

        let after = select_servers(&pool, &selection).await.unwrap();
        assert_eq!(after[0].num_members, Some(2));
        assert_eq!(after[0].members, vec![2, 3]);
    }

    #[tokio::test]
    async fn test_id_lookup() {
        let pool = seeded_pool().await;

        let selection = ServerSelection {
            server_id: Some(3),
            ..ServerSelection::default()
        };
        let records = select_servers(&pool, &selection).await.unwrap();

        assert_eq!(ids(&records), vec![3]);
        assert_eq!(records[0].name, "Dungeon Crawlers");
        assert_eq!(records[0].members, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_id_lookup_missing_names_the_id() {
        let pool = seeded_pool().await;

        let selection = ServerSelection {
            server_id: Some(99),
            ..ServerSelection::default()
        };
        let err = select_servers(&pool, &selection).await.unwrap_err();

        match err {
            AppError::Validation(msg) => assert!(msg.contains("99")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_id_lookup_bypasses_other_predicates() {
        let pool = seeded_pool().await;

        // Server 2 is music, user 1 is not a member, and the quantity would
        // otherwise truncate the listing to nothing.
        let selection = ServerSelection {
            category: Some("gaming".to_string()),
            quantity: Some(0),
            member_user_id: Some(1),
            server_id: Some(2),
            with_num_members: false,
        };
        let records = select_servers(&pool, &selection).await.unwrap();

        assert_eq!(ids(&records), vec![2]);
    }

    #[tokio::test]
    async fn test_category_and_quantity_compose() {
        let pool = seeded_pool().await;

        let selection = ServerSelection {
            category: Some("gaming".to_string()),
            quantity: Some(1),
            ..ServerSelection::default()
        };
        let records = select_servers(&pool, &selection).await.unwrap();

        assert_eq!(ids(&records), vec![1]);
        assert_eq!(records[0].category, "gaming");
    }
}
