//! SQLite store (sqlx)

use std::str::FromStr;

use async_trait::async_trait;
use shared::models::{Department, Menu, Role, User};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use super::{AdminStore, AuthzStore, RepoError, RepoResult};
use crate::authz::RowFilter;
use crate::authz::hierarchy::{AncestorsUpdate, plan_reparent};

const USER_COLUMNS: &str = "id, dept_id, user_name, nick_name, is_active";
const ROLE_COLUMNS: &str = "id, role_name, role_key, role_sort, data_scope, menu_check_strictly, dept_check_strictly, is_active";
const DEPT_COLUMNS: &str = "id, parent_id, ancestors, dept_name, order_num, is_active";
const MENU_COLUMNS: &str = "id, parent_id, menu_name, order_num, path, component, query, is_frame, is_cache, menu_type, visible, is_active, perms, icon";

/// Store backed by a SQLite connection pool
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Opens (creating if missing) the database at `url` and applies migrations
    pub async fn connect(url: &str) -> RepoResult<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| RepoError::Database(format!("Invalid database url: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .pragma("foreign_keys", "ON")
            .busy_timeout(std::time::Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        tracing::info!("Database connection established (SQLite WAL)");
        Self::from_pool(pool).await
    }

    /// Wraps an existing pool and applies migrations
    pub async fn from_pool(pool: SqlitePool) -> RepoResult<Self> {
        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Database migrations applied");
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

/// `SELECT DISTINCT <column> FROM <table> WHERE role_id IN (...)`
async fn grants_of_roles(
    pool: &SqlitePool,
    table: &str,
    column: &str,
    role_ids: &[i64],
) -> RepoResult<Vec<i64>> {
    if role_ids.is_empty() {
        return Ok(Vec::new());
    }
    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
        "SELECT DISTINCT {column} FROM {table} WHERE role_id IN ("
    ));
    let mut separated = qb.separated(", ");
    for id in role_ids {
        separated.push_bind(*id);
    }
    separated.push_unseparated(format!(") ORDER BY {column}"));

    let ids = qb.build_query_scalar::<i64>().fetch_all(pool).await?;
    Ok(ids)
}

#[async_trait]
impl AuthzStore for SqliteStore {
    async fn find_user(&self, user_id: i64) -> RepoResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM sys_user WHERE id = ?"
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_users(&self, filter: &RowFilter<User>) -> RepoResult<Vec<User>> {
        let condition = filter
            .sql_condition("dept_id", "id")
            .unwrap_or_else(|| "1 = 1".to_string());
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM sys_user WHERE {condition} ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    async fn find_role(&self, role_id: i64) -> RepoResult<Option<Role>> {
        let role = sqlx::query_as::<_, Role>(&format!(
            "SELECT {ROLE_COLUMNS} FROM sys_role WHERE id = ?"
        ))
        .bind(role_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(role)
    }

    async fn roles_of_user(&self, user_id: i64) -> RepoResult<Vec<Role>> {
        let roles = sqlx::query_as::<_, Role>(
            "SELECT r.id, r.role_name, r.role_key, r.role_sort, r.data_scope, r.menu_check_strictly, r.dept_check_strictly, r.is_active \
             FROM sys_role r JOIN sys_user_role ur ON ur.role_id = r.id \
             WHERE ur.user_id = ? ORDER BY r.role_sort, r.id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(roles)
    }

    async fn user_ids_with_role(&self, role_id: i64) -> RepoResult<Vec<i64>> {
        let ids = sqlx::query_scalar::<_, i64>(
            "SELECT user_id FROM sys_user_role WHERE role_id = ? ORDER BY user_id",
        )
        .bind(role_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(ids)
    }

    async fn list_departments(&self) -> RepoResult<Vec<Department>> {
        let depts = sqlx::query_as::<_, Department>(&format!(
            "SELECT {DEPT_COLUMNS} FROM sys_dept ORDER BY parent_id, order_num, id"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(depts)
    }

    async fn role_dept_ids(&self, role_ids: &[i64]) -> RepoResult<Vec<i64>> {
        grants_of_roles(&self.pool, "sys_role_dept", "dept_id", role_ids).await
    }

    async fn list_menus(&self) -> RepoResult<Vec<Menu>> {
        let menus = sqlx::query_as::<_, Menu>(&format!(
            "SELECT {MENU_COLUMNS} FROM sys_menu ORDER BY parent_id, order_num, id"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(menus)
    }

    async fn role_menu_ids(&self, role_ids: &[i64]) -> RepoResult<Vec<i64>> {
        grants_of_roles(&self.pool, "sys_role_menu", "menu_id", role_ids).await
    }
}

#[async_trait]
impl AdminStore for SqliteStore {
    async fn replace_role_menus(&self, role_id: i64, menu_ids: &[i64]) -> RepoResult<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM sys_role_menu WHERE role_id = ?")
            .bind(role_id)
            .execute(&mut *tx)
            .await?;
        for menu_id in menu_ids {
            sqlx::query("INSERT OR IGNORE INTO sys_role_menu (role_id, menu_id) VALUES (?, ?)")
                .bind(role_id)
                .bind(menu_id)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn replace_role_depts(&self, role_id: i64, dept_ids: &[i64]) -> RepoResult<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM sys_role_dept WHERE role_id = ?")
            .bind(role_id)
            .execute(&mut *tx)
            .await?;
        for dept_id in dept_ids {
            sqlx::query("INSERT OR IGNORE INTO sys_role_dept (role_id, dept_id) VALUES (?, ?)")
                .bind(role_id)
                .bind(dept_id)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn replace_user_roles(&self, user_id: i64, role_ids: &[i64]) -> RepoResult<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM sys_user_role WHERE user_id = ?")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        for role_id in role_ids {
            sqlx::query("INSERT OR IGNORE INTO sys_user_role (user_id, role_id) VALUES (?, ?)")
                .bind(user_id)
                .bind(role_id)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn set_role_active(&self, role_id: i64, is_active: bool) -> RepoResult<()> {
        let rows = sqlx::query("UPDATE sys_role SET is_active = ? WHERE id = ?")
            .bind(is_active)
            .bind(role_id)
            .execute(&self.pool)
            .await?;
        if rows.rows_affected() == 0 {
            return Err(RepoError::NotFound(format!("Role {role_id} not found")));
        }
        Ok(())
    }

    async fn reparent_department(
        &self,
        dept_id: i64,
        new_parent_id: i64,
    ) -> RepoResult<Vec<AncestorsUpdate>> {
        let mut tx = self.pool.begin().await?;

        // A write as the first statement takes the write lock (waiting on
        // busy_timeout) before the tree is read.
        sqlx::query("UPDATE sys_dept SET parent_id = parent_id WHERE id = ?")
            .bind(dept_id)
            .execute(&mut *tx)
            .await?;

        let departments = sqlx::query_as::<_, Department>(&format!(
            "SELECT {DEPT_COLUMNS} FROM sys_dept ORDER BY parent_id, order_num, id"
        ))
        .fetch_all(&mut *tx)
        .await?;
        let updates = plan_reparent(&departments, dept_id, new_parent_id)?;

        for update in &updates {
            sqlx::query(
                "UPDATE sys_dept SET parent_id = COALESCE(?, parent_id), ancestors = ? WHERE id = ?",
            )
            .bind(update.parent_id)
            .bind(&update.ancestors)
            .bind(update.id)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(updates)
    }
}
