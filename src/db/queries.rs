use chrono::NaiveDate;
use sqlx::PgPool;

use crate::models::{OrderLine, PriceRow, SalesRow, StockLevelRow};

/// Order lines delivered inside the analysis window, restricted by the merged
/// product-code set and the pharmacy scope (NULL filter = no restriction)
pub async fn fetch_order_lines(
    pool: &PgPool,
    start: NaiveDate,
    end: NaiveDate,
    product_codes: Option<&[String]>,
    pharmacy_ids: Option<&[String]>,
) -> Result<Vec<OrderLine>, sqlx::Error> {
    sqlx::query_as::<_, OrderLine>(
        r#"
        SELECT po.id as line_id,
               o.id as order_id,
               o.supplier_id,
               o.pharmacy_id::text as pharmacy_id,
               ip.code_13_ref as product_code,
               po.qte as ordered_qty,
               po.qte_r as received_qty,
               o.delivery_date
        FROM data_productorder po
        INNER JOIN data_order o ON o.id = po.order_id
        INNER JOIN data_internalproduct ip ON ip.id = po.product_id
        WHERE o.delivery_date BETWEEN $1 AND $2
          AND ($3::text[] IS NULL OR ip.code_13_ref = ANY($3))
          AND ($4::text[] IS NULL OR o.pharmacy_id::text = ANY($4))
        "#,
    )
    .bind(start)
    .bind(end)
    .bind(product_codes)
    .bind(pharmacy_ids)
    .fetch_all(pool)
    .await
}

/// Per-day stock level per product, summed across the pharmacies in scope
pub async fn fetch_stock_levels(
    pool: &PgPool,
    from: NaiveDate,
    to: NaiveDate,
    product_codes: &[String],
    pharmacy_ids: Option<&[String]>,
) -> Result<Vec<StockLevelRow>, sqlx::Error> {
    sqlx::query_as::<_, StockLevelRow>(
        r#"
        SELECT ip.code_13_ref as product_code,
               s.date as day,
               sum(s.stock)::bigint as stock_qty
        FROM data_inventorysnapshot s
        INNER JOIN data_internalproduct ip ON ip.id = s.product_id
        WHERE s.date BETWEEN $1 AND $2
          AND ip.code_13_ref = ANY($3)
          AND ($4::text[] IS NULL OR ip.pharmacy_id::text = ANY($4))
        GROUP BY ip.code_13_ref, s.date
        ORDER BY ip.code_13_ref, s.date
        "#,
    )
    .bind(from)
    .bind(to)
    .bind(product_codes)
    .bind(pharmacy_ids)
    .fetch_all(pool)
    .await
}

/// Per-day units sold per product, summed across the pharmacies in scope
pub async fn fetch_sales(
    pool: &PgPool,
    from: NaiveDate,
    to: NaiveDate,
    product_codes: &[String],
    pharmacy_ids: Option<&[String]>,
) -> Result<Vec<SalesRow>, sqlx::Error> {
    sqlx::query_as::<_, SalesRow>(
        r#"
        SELECT ip.code_13_ref as product_code,
               sa.date as day,
               sum(sa.quantity)::bigint as sold_qty
        FROM data_sales sa
        INNER JOIN data_internalproduct ip ON ip.id = sa.product_id
        WHERE sa.date BETWEEN $1 AND $2
          AND ip.code_13_ref = ANY($3)
          AND ($4::text[] IS NULL OR ip.pharmacy_id::text = ANY($4))
        GROUP BY ip.code_13_ref, sa.date
        ORDER BY ip.code_13_ref, sa.date
        "#,
    )
    .bind(from)
    .bind(to)
    .bind(product_codes)
    .bind(pharmacy_ids)
    .fetch_all(pool)
    .await
}

/// Latest known weighted-average purchase price (HT) per product
pub async fn fetch_latest_prices(
    pool: &PgPool,
    product_codes: &[String],
) -> Result<Vec<PriceRow>, sqlx::Error> {
    sqlx::query_as::<_, PriceRow>(
        r#"
        SELECT DISTINCT ON (ip.code_13_ref)
               ip.code_13_ref as product_code,
               s.weighted_average_price as avg_price_ht
        FROM data_inventorysnapshot s
        INNER JOIN data_internalproduct ip ON ip.id = s.product_id
        WHERE ip.code_13_ref = ANY($1)
          AND s.weighted_average_price IS NOT NULL
        ORDER BY ip.code_13_ref, s.date DESC
        "#,
    )
    .bind(product_codes)
    .fetch_all(pool)
    .await
}
