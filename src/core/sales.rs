//! Sales fact table access - imports, listings and lookups.
//!
//! Sales enter the system only through this module. Dates are parsed from
//! `DD.MM.YYYY` once here, and revenue is fixed at write time.

use crate::{
    core::{
        aggregate::{ProductTotals, product_totals},
        dates::parse_sale_date,
    },
    entities::{Sale, sale},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::Deserialize;
use std::{collections::BTreeSet, io::Read};
use tracing::{debug, info};

/// Rows per INSERT statement during imports.
const IMPORT_BATCH_SIZE: usize = 500;

/// A sale to be written, with its date already parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSale {
    /// Product code
    pub product_code: String,
    /// Product name
    pub product_name: String,
    /// Quantity sold
    pub quantity: f64,
    /// Unit price
    pub unit_price: f64,
    /// Sale date
    pub sale_date: NaiveDate,
    /// Recorded revenue; `None` means quantity × unit price
    pub revenue: Option<f64>,
}

impl NewSale {
    fn validate(&self) -> std::result::Result<(), String> {
        if self.product_code.trim().is_empty() {
            return Err("product code cannot be empty".to_string());
        }
        if !self.quantity.is_finite() {
            return Err(format!("invalid quantity {}", self.quantity));
        }
        if !self.unit_price.is_finite() || self.unit_price < 0.0 {
            return Err(format!("invalid unit price {}", self.unit_price));
        }
        if let Some(revenue) = self.revenue {
            if !revenue.is_finite() {
                return Err(format!("invalid revenue {revenue}"));
            }
        }
        Ok(())
    }

    fn into_active_model(self, import_id: &str, imported_at: chrono::NaiveDateTime) -> sale::ActiveModel {
        let revenue = self
            .revenue
            .unwrap_or(self.quantity * self.unit_price);

        sale::ActiveModel {
            import_id: Set(import_id.to_string()),
            imported_at: Set(imported_at),
            product_code: Set(self.product_code.trim().to_string()),
            product_name: Set(self.product_name.trim().to_string()),
            quantity: Set(self.quantity),
            unit_price: Set(self.unit_price),
            sale_date: Set(self.sale_date),
            revenue: Set(revenue),
            ..Default::default()
        }
    }
}

/// Outcome of a CSV import.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportSummary {
    /// Identifier written to every imported row
    pub import_id: String,
    /// Number of rows written
    pub rows_imported: usize,
    /// Number of distinct product codes in the file
    pub products: usize,
    /// Earliest sale date in the file
    pub first_date: Option<NaiveDate>,
    /// Latest sale date in the file
    pub last_date: Option<NaiveDate>,
}

/// One CSV line as exported by the point-of-sale system.
#[derive(Debug, Deserialize)]
struct CsvSaleRow {
    product_code: String,
    product_name: String,
    quantity: f64,
    unit_price: f64,
    date: String,
    #[serde(default)]
    revenue: Option<f64>,
}

fn new_import_id(now: chrono::NaiveDateTime) -> String {
    format!("import-{}", now.format("%Y%m%d%H%M%S%3f"))
}

/// Writes a single sale.
///
/// # Errors
/// Returns [`Error::InvalidParameter`] for an empty code or non-finite amounts,
/// or a database error if the insert fails.
pub async fn insert_sale<C>(db: &C, new_sale: NewSale) -> Result<sale::Model>
where
    C: ConnectionTrait,
{
    new_sale
        .validate()
        .map_err(|reason| Error::invalid_parameter("sale", reason))?;

    let now = chrono::Utc::now().naive_utc();
    new_sale
        .into_active_model(&new_import_id(now), now)
        .insert(db)
        .await
        .map_err(Into::into)
}

/// Imports sales from CSV with the header
/// `product_code,product_name,quantity,unit_price,date[,revenue]`.
///
/// All rows share one fresh import id and are written in a single database
/// transaction: a malformed row aborts the import and nothing is written.
///
/// # Arguments
/// * `db` - The database connection; the import opens its own transaction
/// * `reader` - CSV source, e.g. a downloaded attachment or an open file
///
/// # Returns
/// An [`ImportSummary`] with the import id, row and product counts, and the
/// date span of the file.
///
/// # Errors
/// Returns [`Error::Import`] naming the first bad data row (1-based), or a
/// database error if the write fails.
pub async fn import_sales_csv<R: Read>(db: &DatabaseConnection, reader: R) -> Result<ImportSummary> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let now = chrono::Utc::now().naive_utc();
    let import_id = new_import_id(now);

    let mut models = Vec::new();
    let mut codes = BTreeSet::new();
    let mut first_date: Option<NaiveDate> = None;
    let mut last_date: Option<NaiveDate> = None;

    for (index, record) in csv_reader.deserialize::<CsvSaleRow>().enumerate() {
        let row = index + 1;
        let record = record.map_err(|e| Error::Import {
            row,
            message: e.to_string(),
        })?;

        let sale_date = parse_sale_date(&record.date).map_err(|e| Error::Import {
            row,
            message: e.to_string(),
        })?;

        let new_sale = NewSale {
            product_code: record.product_code,
            product_name: record.product_name,
            quantity: record.quantity,
            unit_price: record.unit_price,
            sale_date,
            revenue: record.revenue,
        };
        new_sale
            .validate()
            .map_err(|message| Error::Import { row, message })?;

        codes.insert(new_sale.product_code.trim().to_string());
        first_date = Some(first_date.map_or(sale_date, |d| d.min(sale_date)));
        last_date = Some(last_date.map_or(sale_date, |d| d.max(sale_date)));
        models.push(new_sale.into_active_model(&import_id, now));
    }

    let rows_imported = models.len();
    if rows_imported > 0 {
        let txn = db.begin().await?;
        let mut remaining = models;
        while !remaining.is_empty() {
            let rest = remaining.split_off(remaining.len().min(IMPORT_BATCH_SIZE));
            Sale::insert_many(remaining).exec(&txn).await?;
            remaining = rest;
        }
        txn.commit().await?;
    }

    info!(%import_id, rows = rows_imported, products = codes.len(), "Imported sales");

    Ok(ImportSummary {
        import_id,
        rows_imported,
        products: codes.len(),
        first_date,
        last_date,
    })
}

/// Returns the most recent sales, newest first.
pub async fn recent_sales<C>(db: &C, limit: u64) -> Result<Vec<sale::Model>>
where
    C: ConnectionTrait,
{
    Sale::find()
        .order_by_desc(sale::Column::SaleDate)
        .order_by_desc(sale::Column::Id)
        .limit(limit)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Returns the best-selling products of a single day by quantity.
pub async fn top_items_for_date<C>(db: &C, date: NaiveDate, limit: usize) -> Result<Vec<ProductTotals>>
where
    C: ConnectionTrait,
{
    let mut items = product_totals(db, Condition::all().add(sale::Column::SaleDate.eq(date))).await?;
    items.sort_by(|a, b| b.total_quantity.total_cmp(&a.total_quantity));
    items.truncate(limit);

    debug!(%date, items = items.len(), "Loaded top items");
    Ok(items)
}

/// Finds products whose code or name contains `partial`, as `(code, name)`
/// pairs ordered by code. Each code appears once.
pub async fn search_product_codes<C>(
    db: &C,
    partial: &str,
    limit: usize,
) -> Result<Vec<(String, String)>>
where
    C: ConnectionTrait,
{
    if limit == 0 {
        return Ok(Vec::new());
    }

    let partial = partial.trim();
    let mut query = Sale::find()
        .select_only()
        .column(sale::Column::ProductCode)
        .column(sale::Column::ProductName)
        .group_by(sale::Column::ProductCode)
        .group_by(sale::Column::ProductName)
        .order_by_asc(sale::Column::ProductCode)
        .order_by_asc(sale::Column::ProductName);

    if !partial.is_empty() {
        query = query.filter(
            Condition::any()
                .add(sale::Column::ProductCode.contains(partial))
                .add(sale::Column::ProductName.contains(partial)),
        );
    }

    let pairs: Vec<(String, String)> = query.into_tuple().all(db).await?;

    let mut matches: Vec<(String, String)> = Vec::new();
    for (code, name) in pairs {
        if matches.last().is_some_and(|(last, _)| *last == code) {
            continue;
        }
        matches.push((code, name));
        if matches.len() >= limit {
            break;
        }
    }
    Ok(matches)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;
    use sea_orm::PaginatorTrait;

    #[tokio::test]
    async fn test_insert_sale_computes_revenue() -> Result<()> {
        let db = setup_test_db().await?;
        let sale = insert_test_sale(&db, "A1", "Apple", 4.0, 2.5, "01.03.2024").await?;

        assert_eq!(sale.revenue, 10.0);
        assert_eq!(sale.sale_date, date(2024, 3, 1));
        assert!(sale.import_id.starts_with("import-"));
        Ok(())
    }

    #[tokio::test]
    async fn test_insert_sale_keeps_recorded_revenue() -> Result<()> {
        let db = setup_test_db().await?;
        let sale = insert_sale(
            &db,
            NewSale {
                product_code: "A1".to_string(),
                product_name: "Apple".to_string(),
                quantity: 4.0,
                unit_price: 2.5,
                sale_date: date(2024, 3, 1),
                revenue: Some(9.0),
            },
        )
        .await?;

        assert_eq!(sale.revenue, 9.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_insert_sale_validation() -> Result<()> {
        let db = setup_test_db().await?;
        let result = insert_sale(
            &db,
            NewSale {
                product_code: "  ".to_string(),
                product_name: "Nothing".to_string(),
                quantity: 1.0,
                unit_price: 1.0,
                sale_date: date(2024, 3, 1),
                revenue: None,
            },
        )
        .await;
        assert!(matches!(result, Err(Error::InvalidParameter { .. })));

        let result = insert_sale(
            &db,
            NewSale {
                product_code: "A1".to_string(),
                product_name: "Apple".to_string(),
                quantity: f64::NAN,
                unit_price: 1.0,
                sale_date: date(2024, 3, 1),
                revenue: None,
            },
        )
        .await;
        assert!(matches!(result, Err(Error::InvalidParameter { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_import_sales_csv() -> Result<()> {
        let db = setup_test_db().await?;
        let csv = "product_code,product_name,quantity,unit_price,date,revenue\n\
                   A1,Apple,2,1.5,29.10.2024,\n\
                   A1,Apple,1,1.5,30.10.2024,1.4\n\
                   B2, Bread ,3,2,01.01.2023,6\n";

        let summary = import_sales_csv(&db, csv.as_bytes()).await?;

        assert_eq!(summary.rows_imported, 3);
        assert_eq!(summary.products, 2);
        assert_eq!(summary.first_date, Some(date(2023, 1, 1)));
        assert_eq!(summary.last_date, Some(date(2024, 10, 30)));

        let rows = Sale::find()
            .order_by_asc(sale::Column::Id)
            .all(&db)
            .await?;
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].revenue, 3.0);
        assert_eq!(rows[1].revenue, 1.4);
        assert_eq!(rows[2].product_name, "Bread");
        assert!(rows.iter().all(|r| r.import_id == summary.import_id));
        Ok(())
    }

    #[tokio::test]
    async fn test_import_without_revenue_column() -> Result<()> {
        let db = setup_test_db().await?;
        let csv = "product_code,product_name,quantity,unit_price,date\n\
                   A1,Apple,2,1.5,29.10.2024\n";

        let summary = import_sales_csv(&db, csv.as_bytes()).await?;
        assert_eq!(summary.rows_imported, 1);

        let row = Sale::find().one(&db).await?.unwrap();
        assert_eq!(row.revenue, 3.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_import_bad_date_aborts_whole_file() -> Result<()> {
        let db = setup_test_db().await?;
        let csv = "product_code,product_name,quantity,unit_price,date\n\
                   A1,Apple,2,1.5,29.10.2024\n\
                   A1,Apple,2,1.5,2024-10-30\n";

        let result = import_sales_csv(&db, csv.as_bytes()).await;
        assert!(matches!(result, Err(Error::Import { row: 2, .. })));
        assert_eq!(Sale::find().count(&db).await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_import_bad_number_reports_row() -> Result<()> {
        let db = setup_test_db().await?;
        let csv = "product_code,product_name,quantity,unit_price,date\n\
                   A1,Apple,two,1.5,29.10.2024\n";

        let result = import_sales_csv(&db, csv.as_bytes()).await;
        assert!(matches!(result, Err(Error::Import { row: 1, .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_import_empty_file() -> Result<()> {
        let db = setup_test_db().await?;
        let summary =
            import_sales_csv(&db, "product_code,product_name,quantity,unit_price,date\n".as_bytes())
                .await?;

        assert_eq!(summary.rows_imported, 0);
        assert_eq!(summary.first_date, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_import_spans_multiple_batches() -> Result<()> {
        let db = setup_test_db().await?;
        let mut csv = String::from("product_code,product_name,quantity,unit_price,date\n");
        for i in 0..1_205 {
            csv.push_str(&format!("P{},Product,1,1,01.01.2024\n", i % 7));
        }

        let summary = import_sales_csv(&db, csv.as_bytes()).await?;
        assert_eq!(summary.rows_imported, 1_205);
        assert_eq!(summary.products, 7);
        assert_eq!(Sale::find().count(&db).await?, 1_205);
        Ok(())
    }

    #[tokio::test]
    async fn test_recent_sales_newest_first() -> Result<()> {
        let db = setup_test_db().await?;
        insert_test_sale(&db, "A1", "Apple", 1.0, 1.0, "01.03.2024").await?;
        insert_test_sale(&db, "B2", "Bread", 1.0, 1.0, "05.03.2024").await?;
        insert_test_sale(&db, "C3", "Cheese", 1.0, 1.0, "03.03.2024").await?;

        let recent = recent_sales(&db, 2).await?;
        let codes: Vec<&str> = recent.iter().map(|s| s.product_code.as_str()).collect();
        assert_eq!(codes, vec!["B2", "C3"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_top_items_for_date() -> Result<()> {
        let db = setup_test_db().await?;
        insert_test_sale(&db, "A1", "Apple", 1.0, 1.0, "01.03.2024").await?;
        insert_test_sale(&db, "B2", "Bread", 5.0, 1.0, "01.03.2024").await?;
        insert_test_sale(&db, "B2", "Bread", 2.0, 1.0, "01.03.2024").await?;
        insert_test_sale(&db, "C3", "Cheese", 3.0, 1.0, "01.03.2024").await?;
        insert_test_sale(&db, "D4", "Dates", 50.0, 1.0, "02.03.2024").await?;

        let items = top_items_for_date(&db, date(2024, 3, 1), 2).await?;

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].product_code, "B2");
        assert_eq!(items[0].total_quantity, 7.0);
        assert_eq!(items[0].sale_count, 2);
        assert_eq!(items[1].product_code, "C3");
        Ok(())
    }

    #[tokio::test]
    async fn test_search_product_codes() -> Result<()> {
        let db = setup_test_db().await?;
        insert_test_sale(&db, "A1", "Apple", 1.0, 1.0, "01.03.2024").await?;
        insert_test_sale(&db, "A1", "apple", 1.0, 1.0, "02.03.2024").await?;
        insert_test_sale(&db, "A2", "Apricot", 1.0, 1.0, "01.03.2024").await?;
        insert_test_sale(&db, "B2", "Bread", 1.0, 1.0, "01.03.2024").await?;

        let matches = search_product_codes(&db, "A", 25).await?;
        let codes: Vec<&str> = matches.iter().map(|(code, _)| code.as_str()).collect();
        // SQLite LIKE is case-insensitive, so "Bread" matches on its name
        assert_eq!(codes, vec!["A1", "A2", "B2"]);

        let limited = search_product_codes(&db, "", 1).await?;
        assert_eq!(limited, vec![("A1".to_string(), "Apple".to_string())]);
        Ok(())
    }

    #[tokio::test]
    async fn test_search_product_codes_zero_limit_is_empty() -> Result<()> {
        let db = setup_test_db().await?;
        insert_test_sale(&db, "A1", "Apple", 1.0, 1.0, "01.03.2024").await?;
        insert_test_sale(&db, "B2", "Bread", 1.0, 1.0, "01.03.2024").await?;

        assert!(search_product_codes(&db, "", 0).await?.is_empty());
        Ok(())
    }
}
