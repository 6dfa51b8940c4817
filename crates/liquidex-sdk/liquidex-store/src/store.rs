use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};

use liquidex_sdk::{MarketRecord, MarketRegistry, MarketUpdate};

use crate::error::StoreError;
use crate::models::{MarketRow, NewMarketRow};
use crate::schema::markets;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// SQL expression for SQLite's `datetime('now')`.
const DATETIME_NOW: &str = "datetime('now')";

/// SQLite-backed registry of market wallets.
pub struct MarketStore {
    conn: SqliteConnection,
}

impl MarketStore {
    /// Open (or create) a store at `path` and run pending migrations.
    pub fn open(path: &str) -> crate::Result<Self> {
        let mut conn = SqliteConnection::establish(path)?;
        conn.run_pending_migrations(MIGRATIONS)
            .map_err(|e| StoreError::Migration(e.to_string()))?;
        Ok(MarketStore { conn })
    }

    /// Open an in-memory store for tests.
    pub fn open_in_memory() -> crate::Result<Self> {
        Self::open(":memory:")
    }

    /// Register a market for `address`. If it already exists, the existing
    /// record is returned unchanged.
    pub fn create_market(
        &mut self,
        address: &str,
        fee_basis_points: u32,
    ) -> crate::Result<MarketRecord> {
        let exists: bool = diesel::select(diesel::dsl::exists(
            markets::table.filter(markets::wallet_address.eq(address)),
        ))
        .get_result(&mut self.conn)?;

        if !exists {
            let fee = i32::try_from(fee_basis_points).map_err(|_| {
                StoreError::InvalidData(format!("fee {fee_basis_points} too large"))
            })?;
            diesel::insert_into(markets::table)
                .values(&NewMarketRow {
                    wallet_address: address,
                    fee_basis_points: fee,
                })
                .execute(&mut self.conn)?;
        }

        self.get_market(address)?.ok_or_else(|| {
            StoreError::InvalidData(format!("market {address} missing after insert"))
        })
    }

    pub fn get_market(&mut self, address: &str) -> crate::Result<Option<MarketRecord>> {
        let row: Option<MarketRow> = markets::table
            .filter(markets::wallet_address.eq(address))
            .select(MarketRow::as_select())
            .first(&mut self.conn)
            .optional()?;
        row.map(row_to_record).transpose()
    }

    /// All markets, oldest first.
    pub fn list_markets(&mut self) -> crate::Result<Vec<MarketRecord>> {
        let rows: Vec<MarketRow> = markets::table
            .order((markets::created_at.asc(), markets::id.asc()))
            .select(MarketRow::as_select())
            .load(&mut self.conn)?;
        rows.into_iter().map(row_to_record).collect()
    }

    /// Apply a funding update. Returns `false` if no market has `address`.
    pub fn update_market(&mut self, address: &str, update: &MarketUpdate) -> crate::Result<bool> {
        let fee = i32::try_from(update.fee)
            .map_err(|_| StoreError::InvalidData(format!("fee {} too large", update.fee)))?;
        let changed = diesel::update(markets::table.filter(markets::wallet_address.eq(address)))
            .set((
                markets::base_asset.eq(&update.base_asset),
                markets::quote_asset.eq(&update.quote_asset),
                markets::base_funding_tx.eq(&update.base_funding_tx),
                markets::quote_funding_tx.eq(&update.quote_funding_tx),
                markets::fee_basis_points.eq(fee),
                markets::tradable.eq(update.tradable),
                markets::updated_at.eq(diesel::dsl::sql::<diesel::sql_types::Text>(DATETIME_NOW)),
            ))
            .execute(&mut self.conn)?;
        Ok(changed > 0)
    }
}

fn row_to_record(row: MarketRow) -> crate::Result<MarketRecord> {
    let fee = u32::try_from(row.fee_basis_points).map_err(|_| {
        StoreError::InvalidData(format!("negative fee on market {}", row.wallet_address))
    })?;
    Ok(MarketRecord {
        address: row.wallet_address,
        base_asset: row.base_asset,
        quote_asset: row.quote_asset,
        base_funding_tx: row.base_funding_tx,
        quote_funding_tx: row.quote_funding_tx,
        fee,
        tradable: row.tradable,
        created_at: row.created_at,
    })
}

// ==================== MarketRegistry impl ====================

impl MarketRegistry for MarketStore {
    fn create_market(&mut self, address: &str) -> Result<(), String> {
        self.create_market(address, 0)
            .map(|_| ())
            .map_err(|e| format!("{e}"))
    }

    fn find_markets_sorted_by_timestamp(&mut self) -> Result<Vec<MarketRecord>, String> {
        self.list_markets().map_err(|e| format!("{e}"))
    }

    fn update_by_address(&mut self, address: &str, update: &MarketUpdate) -> Result<bool, String> {
        self.update_market(address, update)
            .map_err(|e| format!("{e}"))
    }
}
