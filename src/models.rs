//! Request and response value objects.
//!
//! Requests arrive already authenticated: the buyer id comes from the session, not
//! from the payload. Views are assembled by [`crate::core::query`] and serialize to
//! the shape handed back to clients.

use serde::{Deserialize, Serialize};

/// Default page size when a caller asks for a non-positive limit.
pub const DEFAULT_PAGE_LIMIT: u64 = 10;

/// A checkout request.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PlaceOrderRequest {
    /// Payment method label, e.g. `"COD"`
    pub payment_method: String,
    /// Delivery address, must belong to the buyer
    pub address_id: i64,
    /// Products and quantities to buy
    pub line_items: Vec<LineItemRequest>,
}

/// One requested product line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct LineItemRequest {
    /// Product to buy
    pub product_id: i64,
    /// Units to buy, must be positive
    pub quantity: i32,
}

/// Query parameters for listing a buyer's transactions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TransactionFilter {
    /// Case-insensitive substring of a snapshotted product name
    #[serde(default)]
    pub search: Option<String>,
    /// 1-based page number; values below 1 mean the first page
    #[serde(default)]
    pub page: i64,
    /// Page size; non-positive values fall back to [`DEFAULT_PAGE_LIMIT`]
    #[serde(default)]
    pub limit: i64,
}

impl TransactionFilter {
    /// Resolves `(limit, offset)` for the query.
    #[must_use]
    pub fn limit_offset(&self) -> (u64, u64) {
        let limit = u64::try_from(self.limit)
            .ok()
            .filter(|limit| *limit > 0)
            .unwrap_or(DEFAULT_PAGE_LIMIT);
        let offset =
            u64::try_from(self.page.saturating_sub(1)).map_or(0, |pages| pages.saturating_mul(limit));
        (limit, offset)
    }

    /// The search term, if it has any non-whitespace content.
    #[must_use]
    pub fn search_term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
    }
}

/// A page of results together with the resolved paging parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    /// Items on this page
    pub data: Vec<T>,
    /// 1-based page number
    pub page: u64,
    /// Page size used
    pub limit: u64,
}

/// A placed order as shown to its buyer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionView {
    /// Transaction id
    pub id: i64,
    /// Grand total in integer currency units
    pub total_price: i64,
    /// Human-facing order label
    pub invoice_code: String,
    /// Payment method label
    pub payment_method: String,
    /// Current state of the delivery address, `None` if it was removed
    pub address: Option<AddressView>,
    /// Order lines
    pub line_items: Vec<LineItemView>,
}

/// One line of a [`TransactionView`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineItemView {
    /// Product facts as they were at purchase time
    pub product: SnapshotView,
    /// Selling shop
    pub shop: Option<ShopInfo>,
    /// Units bought
    pub quantity: i32,
    /// Line total in integer currency units
    pub total_price: i64,
}

/// Product facts taken from a price snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnapshotView {
    /// Original product id
    pub product_id: i64,
    /// Product name at purchase time
    pub name: String,
    /// Slug at purchase time
    pub slug: String,
    /// Reseller price at purchase time
    pub reseller_price: String,
    /// Consumer price at purchase time
    pub consumer_price: String,
    /// Description at purchase time
    pub description: String,
    /// Shop the product was bought from
    pub shop: Option<ShopInfo>,
    /// Category at purchase time
    pub category: Option<CategoryInfo>,
    /// Current product images
    pub images: Vec<ProductImageView>,
}

/// Public shop details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShopInfo {
    /// Shop name
    pub name: String,
    /// Shop photo
    pub photo_url: Option<String>,
}

/// Category details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryInfo {
    /// Category id
    pub id: i64,
    /// Category name
    pub name: String,
}

/// A product image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductImageView {
    /// Image id
    pub id: i64,
    /// Product the image belongs to
    pub product_id: i64,
    /// Image location
    pub url: String,
}

/// A delivery address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddressView {
    /// Address id
    pub id: i64,
    /// Short label
    pub title: String,
    /// Recipient name
    pub recipient_name: String,
    /// Recipient phone number
    pub phone_number: String,
    /// Full postal address
    pub full_address: String,
}

/// Fields to change on a product. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProductPatch {
    /// New display name
    pub name: Option<String>,
    /// New slug
    pub slug: Option<String>,
    /// New reseller price
    pub reseller_price: Option<String>,
    /// New consumer price
    pub consumer_price: Option<String>,
    /// New absolute stock level
    pub stock: Option<i32>,
    /// New description
    pub description: Option<String>,
    /// New category; `Some(None)` clears it
    pub category_id: Option<Option<i64>>,
}

/// Fields to change on an address. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AddressPatch {
    /// New label
    pub title: Option<String>,
    /// New recipient
    pub recipient_name: Option<String>,
    /// New phone number
    pub phone_number: Option<String>,
    /// New postal address
    pub full_address: Option<String>,
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_limit_offset_defaults() {
        let filter = TransactionFilter::default();
        assert_eq!(filter.limit_offset(), (10, 0));

        let filter = TransactionFilter {
            limit: -3,
            page: -1,
            ..Default::default()
        };
        assert_eq!(filter.limit_offset(), (10, 0));
    }

    #[test]
    fn test_limit_offset_pages() {
        let filter = TransactionFilter {
            limit: 5,
            page: 3,
            ..Default::default()
        };
        assert_eq!(filter.limit_offset(), (5, 10));

        let filter = TransactionFilter {
            limit: 5,
            page: 1,
            ..Default::default()
        };
        assert_eq!(filter.limit_offset(), (5, 0));
    }

    #[test]
    fn test_search_term_ignores_blank() {
        let filter = TransactionFilter {
            search: Some("   ".to_string()),
            ..Default::default()
        };
        assert_eq!(filter.search_term(), None);

        let filter = TransactionFilter {
            search: Some(" Kopi ".to_string()),
            ..Default::default()
        };
        assert_eq!(filter.search_term(), Some("Kopi"));
    }

    #[test]
    fn test_place_order_request_deserializes() {
        let request: PlaceOrderRequest = toml::from_str(
            r#"
            payment_method = "COD"
            address_id = 7

            [[line_items]]
            product_id = 3
            quantity = 2
            "#,
        )
        .unwrap();
        assert_eq!(request.address_id, 7);
        assert_eq!(
            request.line_items,
            vec![LineItemRequest {
                product_id: 3,
                quantity: 2
            }]
        );
    }
}
