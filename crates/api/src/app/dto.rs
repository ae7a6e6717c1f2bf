use serde::{Deserialize, Serialize};

use chrono::{DateTime, Utc};
use stocktrack_core::DomainResult;
use stocktrack_inventory::{validate, Condition, InventoryFilter, ItemChanges, ItemFields};

// -------------------------
// Request DTOs
// -------------------------

/// Body of `POST /inventory` and `PUT /inventory/{id}`.
///
/// Every field is optional at the wire level so that missing or out-of-range
/// values produce a validation message instead of a deserializer error. An `id`
/// in the body is ignored.
#[derive(Debug, Default, Deserialize)]
pub struct InventoryItemRequest {
    pub product_id: Option<i64>,
    pub condition: Option<String>,
    pub quantity: Option<i64>,
    pub restock_level: Option<i64>,
    pub restock_amount: Option<i64>,
    pub description: Option<String>,
}

impl InventoryItemRequest {
    /// Validate a create request: `product_id`, `condition` and `quantity` are required.
    pub fn into_fields(self) -> DomainResult<ItemFields> {
        let product_id = validate::product_id(validate::required(self.product_id, "product_id")?)?;
        let condition: Condition = validate::required(self.condition, "condition")?.parse()?;
        let quantity = validate::count("quantity", validate::required(self.quantity, "quantity")?)?;
        let restock_level = validate::count("restock_level", self.restock_level.unwrap_or(0))?;
        let restock_amount = validate::count("restock_amount", self.restock_amount.unwrap_or(0))?;

        Ok(ItemFields::new(product_id, condition, quantity)
            .with_restock(restock_level, restock_amount)
            .with_description(self.description.unwrap_or_default()))
    }

    /// Validate an update request: only supplied fields are checked and changed.
    pub fn into_changes(self) -> DomainResult<ItemChanges> {
        Ok(ItemChanges {
            product_id: self.product_id.map(validate::product_id).transpose()?,
            condition: self.condition.map(|c| c.parse::<Condition>()).transpose()?,
            quantity: self.quantity.map(|v| validate::count("quantity", v)).transpose()?,
            restock_level: self
                .restock_level
                .map(|v| validate::count("restock_level", v))
                .transpose()?,
            restock_amount: self
                .restock_amount
                .map(|v| validate::count("restock_amount", v))
                .transpose()?,
            description: self.description,
        })
    }
}

/// Query string of `GET /inventory`. Unknown parameters are ignored.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub product_id: Option<String>,
    pub condition: Option<String>,
    /// Substring of the description.
    pub query: Option<String>,
}

impl ListQuery {
    pub fn into_filter(self) -> DomainResult<InventoryFilter> {
        let mut filter = InventoryFilter::all();
        if let Some(raw) = self.product_id {
            let product_id = raw.trim().parse::<i64>().map_err(|_| {
                stocktrack_core::DomainError::validation(format!(
                    "Invalid query: product_id '{raw}' is not an integer"
                ))
            })?;
            filter = filter.product_id(product_id);
        }
        if let Some(raw) = self.condition {
            filter = filter.condition(raw.trim().parse()?);
        }
        if let Some(text) = self.query {
            filter = filter.description_contains(text);
        }
        Ok(filter)
    }
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct ServiceInfo {
    pub name: &'static str,
    pub version: &'static str,
    pub status: &'static str,
    pub started_at: DateTime<Utc>,
    pub paths: ServicePaths,
}

#[derive(Debug, Serialize)]
pub struct ServicePaths {
    pub inventory: &'static str,
    pub item: &'static str,
    pub restock: &'static str,
}

impl ServiceInfo {
    pub fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            name: "Inventory REST API Service",
            version: env!("CARGO_PKG_VERSION"),
            status: "OK",
            started_at,
            paths: ServicePaths {
                inventory: "/inventory",
                item: "/inventory/{id}",
                restock: "/inventory/{id}/restock",
            },
        }
    }
}
