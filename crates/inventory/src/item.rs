use core::str::FromStr;

use serde::{Deserialize, Serialize};

use stocktrack_core::{DomainError, DomainResult, ItemId};

/// Physical condition of the stocked units.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Condition {
    New,
    Used,
    OpenBox,
}

impl Condition {
    pub const ALL: [Condition; 3] = [Condition::New, Condition::Used, Condition::OpenBox];

    pub fn as_str(&self) -> &'static str {
        match self {
            Condition::New => "NEW",
            Condition::Used => "USED",
            Condition::OpenBox => "OPEN_BOX",
        }
    }
}

impl core::fmt::Display for Condition {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Condition {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Condition::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| {
                DomainError::validation(format!(
                    "Invalid attribute: condition '{s}' must be one of: NEW, USED, OPEN_BOX"
                ))
            })
    }
}

/// One inventory record, exactly as stored and as returned over the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: ItemId,
    pub product_id: i64,
    pub condition: Condition,
    pub quantity: u32,
    pub restock_level: u32,
    pub restock_amount: u32,
    pub description: String,
}

/// Validated field set for a new record (defaults already applied).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemFields {
    pub product_id: i64,
    pub condition: Condition,
    pub quantity: u32,
    pub restock_level: u32,
    pub restock_amount: u32,
    pub description: String,
}

impl ItemFields {
    /// Required fields only; restock settings default to 0 and description to "".
    pub fn new(product_id: i64, condition: Condition, quantity: u32) -> Self {
        Self {
            product_id,
            condition,
            quantity,
            restock_level: 0,
            restock_amount: 0,
            description: String::new(),
        }
    }

    pub fn with_restock(mut self, level: u32, amount: u32) -> Self {
        self.restock_level = level;
        self.restock_amount = amount;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn into_item(self, id: ItemId) -> InventoryItem {
        InventoryItem {
            id,
            product_id: self.product_id,
            condition: self.condition,
            quantity: self.quantity,
            restock_level: self.restock_level,
            restock_amount: self.restock_amount,
            description: self.description,
        }
    }
}

/// Validated replacement values for an existing record.
///
/// `None` leaves the stored value as it is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemChanges {
    pub product_id: Option<i64>,
    pub condition: Option<Condition>,
    pub quantity: Option<u32>,
    pub restock_level: Option<u32>,
    pub restock_amount: Option<u32>,
    pub description: Option<String>,
}

impl ItemChanges {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn quantity(mut self, quantity: u32) -> Self {
        self.quantity = Some(quantity);
        self
    }

    pub fn condition(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl InventoryItem {
    /// Overwrite every field present in `changes`. The id never changes.
    pub fn apply_changes(&mut self, changes: ItemChanges) {
        if let Some(v) = changes.product_id {
            self.product_id = v;
        }
        if let Some(v) = changes.condition {
            self.condition = v;
        }
        if let Some(v) = changes.quantity {
            self.quantity = v;
        }
        if let Some(v) = changes.restock_level {
            self.restock_level = v;
        }
        if let Some(v) = changes.restock_amount {
            self.restock_amount = v;
        }
        if let Some(v) = changes.description {
            self.description = v;
        }
    }

    /// Whether the restock rule would fire for the current quantity.
    pub fn needs_restock(&self) -> bool {
        self.quantity <= self.restock_level
    }

    /// Apply the restock rule in place. Returns `true` if quantity changed.
    pub fn restock(&mut self) -> DomainResult<bool> {
        let next = restocked_quantity(self.quantity, self.restock_level, self.restock_amount)?;
        let changed = next != self.quantity;
        self.quantity = next;
        Ok(changed)
    }
}

/// Restock rule: top up by `amount` when `quantity <= level`, otherwise keep `quantity`.
pub fn restocked_quantity(quantity: u32, level: u32, amount: u32) -> DomainResult<u32> {
    if quantity > level {
        return Ok(quantity);
    }
    quantity.checked_add(amount).ok_or_else(|| {
        DomainError::validation(format!(
            "restock would overflow quantity ({quantity} + {amount})"
        ))
    })
}
