//! Per-entity field-visibility tables.
//!
//! The worker-facing redaction policy is data, not code: each entity has one
//! [`RedactionRule`] listing the fields that are masked (replaced by the
//! shared sentinel) and the fields that are dropped outright. A single
//! generic [`apply`] consults a rule, so the policy cannot drift between
//! entities and can be audited by reading the tables below.

use serde_json::Value;

use super::REDACTED;

/// One entity's worker-view rule: `masked` fields are replaced with the
/// [`REDACTED`] sentinel (and inserted even when absent, so clients always
/// see the uniform marker); `dropped` fields are removed from the record.
pub struct RedactionRule {
    pub masked: &'static [&'static str],
    pub dropped: &'static [&'static str],
}

/// ServiceRequest as seen by a worker: customer identity and money are
/// masked. Nested collections are handled by the filter layer, except
/// parts_used and payments which the policy replaces wholesale.
pub const SERVICE_REQUEST_WORKER: RedactionRule = RedactionRule {
    masked: &[
        "customer_name",
        "estimated_amount",
        "billed_amount",
        "parts_used",
        "payments",
    ],
    dropped: &[],
};

/// Customer records as seen by a worker: contact PII masked, the id and
/// bookkeeping fields stay.
pub const CUSTOMER_WORKER: RedactionRule = RedactionRule {
    masked: &["name", "company_name", "phone", "email", "address", "city"],
    dropped: &[],
};

/// Inventory as seen by a worker: stock levels visible, money and the
/// supplier relationship masked.
pub const INVENTORY_WORKER: RedactionRule = RedactionRule {
    masked: &["cost_price", "selling_price", "supplier_id"],
    dropped: &[],
};

/// Work logs as seen by a worker: assignment and sub-status visible,
/// timing and free-form notes removed.
pub const WORK_LOG_WORKER: RedactionRule = RedactionRule {
    masked: &[],
    dropped: &["start_time", "end_time", "notes"],
};

/// Parts usage as seen by a worker: what and how much, never at what cost.
pub const PARTS_USED_WORKER: RedactionRule = RedactionRule {
    masked: &[],
    dropped: &["unit_cost", "total_cost"],
};

/// Documents as seen by a worker: metadata visible, embedded content masked.
pub const DOCUMENT_WORKER: RedactionRule = RedactionRule {
    masked: &["embed_tag"],
    dropped: &[],
};

/// Produce a new record with the rule applied. The input is never mutated;
/// non-object values pass through unchanged.
pub fn apply(record: &Value, rule: &RedactionRule) -> Value {
    let Value::Object(map) = record else {
        return record.clone();
    };

    let mut shaped = map.clone();
    for field in rule.dropped {
        shaped.remove(*field);
    }
    for field in rule.masked {
        shaped.insert((*field).to_string(), Value::String(REDACTED.to_string()));
    }
    Value::Object(shaped)
}
