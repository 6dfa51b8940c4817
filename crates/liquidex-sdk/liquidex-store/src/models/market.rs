use diesel::prelude::*;

use crate::schema::markets;

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = markets)]
pub struct MarketRow {
    pub id: i32,
    pub wallet_address: String,
    pub base_asset: Option<String>,
    pub quote_asset: Option<String>,
    pub base_funding_tx: Option<String>,
    pub quote_funding_tx: Option<String>,
    pub fee_basis_points: i32,
    pub tradable: bool,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = markets)]
pub struct NewMarketRow<'a> {
    pub wallet_address: &'a str,
    pub fee_basis_points: i32,
}
