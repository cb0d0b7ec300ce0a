//! Entity filter functions.
//!
//! Each filter is a pure mapping from `(raw record, role, hide flag)` to a
//! reshaped record. `hide = false` is the identity transform for every role;
//! Admin and Owner always pass through. Workers get the visibility-table
//! view, and for entities a customer never fetches directly the Customer
//! role falls back to the worker view rather than failing open.

use serde_json::{json, Value};

use super::list::filter_list;
use super::visibility::{
    self, CUSTOMER_WORKER, DOCUMENT_WORKER, INVENTORY_WORKER, PARTS_USED_WORKER,
    SERVICE_REQUEST_WORKER, WORK_LOG_WORKER,
};
use super::{winding_visible, Role, WINDING_STAGE_MESSAGE};

fn worker_view(record: &Value, role: Role, hide: bool, rule: &visibility::RedactionRule) -> Value {
    if !hide || role.is_privileged() {
        return record.clone();
    }
    visibility::apply(record, rule)
}

/// Filter a service request (job) record, including its nested collections.
///
/// Worker view: customer identity and money masked, parts/payments replaced
/// wholesale, work logs / winding details / documents recursively filtered.
/// The winding stage gate takes its context from this job's own status.
/// A customer only ever reaches their own job (ownership is enforced before
/// filtering) and sees it in full.
pub fn filter_service_request(record: &Value, role: Role, hide: bool) -> Value {
    if !hide || role != Role::Worker {
        return record.clone();
    }

    let mut shaped = visibility::apply(record, &SERVICE_REQUEST_WORKER);

    if let Value::Object(map) = &mut shaped {
        let job_status = record
            .get("status")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        if let Some(items) = record.get("work_logs") {
            let filtered = filter_list(Some(items), |r| filter_work_log(r, role, hide));
            map.insert("work_logs".to_string(), filtered);
        }
        if let Some(items) = record.get("winding_details") {
            let filtered = filter_list(Some(items), |r| {
                filter_winding_details(r, role, hide, &job_status)
            });
            map.insert("winding_details".to_string(), filtered);
        }
        if let Some(items) = record.get("documents") {
            let filtered = filter_list(Some(items), |r| filter_document(r, role, hide));
            map.insert("documents".to_string(), filtered);
        }
    }

    shaped
}

/// Filter a customer record: contact PII masked for non-privileged roles.
pub fn filter_customer(record: &Value, role: Role, hide: bool) -> Value {
    worker_view(record, role, hide, &CUSTOMER_WORKER)
}

/// Filter a winding-details record. `job_status` is the parent job's
/// workflow status and must be supplied per record: outside the
/// winding-visible stages a worker gets only a minimal stub.
pub fn filter_winding_details(record: &Value, role: Role, hide: bool, job_status: &str) -> Value {
    if !hide || role.is_privileged() {
        return record.clone();
    }
    if winding_visible(job_status) {
        return record.clone();
    }
    json!({
        "winding_id": record.get("winding_id").cloned().unwrap_or(Value::Null),
        "job_number": record.get("job_number").cloned().unwrap_or(Value::Null),
        "message": WINDING_STAGE_MESSAGE,
    })
}

/// Filter an inventory record: pricing and supplier masked.
pub fn filter_inventory(record: &Value, role: Role, hide: bool) -> Value {
    worker_view(record, role, hide, &INVENTORY_WORKER)
}

/// Filter a work-log record: timing and notes removed.
pub fn filter_work_log(record: &Value, role: Role, hide: bool) -> Value {
    worker_view(record, role, hide, &WORK_LOG_WORKER)
}

/// Filter a parts-used record: cost fields removed.
pub fn filter_parts_used(record: &Value, role: Role, hide: bool) -> Value {
    worker_view(record, role, hide, &PARTS_USED_WORKER)
}

/// Filter a document record: embedded content masked.
pub fn filter_document(record: &Value, role: Role, hide: bool) -> Value {
    worker_view(record, role, hide, &DOCUMENT_WORKER)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::{ANY_ROLE, REDACTED};

    fn job_record() -> Value {
        json!({
            "job_number": "J-2025-0001",
            "customer_id": 7,
            "customer_name": "Acme Pumps",
            "motor_type": "Induction",
            "motor_make": "Crompton",
            "hp": 7.5,
            "status": "Estimation in Progress",
            "date_received": "2025-08-01",
            "estimated_amount": 4200.00,
            "billed_amount": null,
            "notes": "starter burnt",
            "work_logs": [
                {"work_log_id": 1, "job_number": "J-2025-0001", "sub_status": "Dismantled",
                 "assigned_worker": 3, "worker_name": "Ravi",
                 "start_time": "2025-08-02T09:00:00Z", "end_time": null, "notes": "rotor ok"}
            ],
            "parts_used": [
                {"part_used_id": 4, "job_number": "J-2025-0001", "part_name": "bearing 6204",
                 "qty": 2, "unit": "pcs", "unit_cost": 110.0, "total_cost": 220.0}
            ],
            "payments": [
                {"payment_id": 9, "amount": 2000.0, "mode": "UPI"}
            ],
            "winding_details": [
                {"winding_id": 11, "job_number": "J-2025-0001", "hp": 7.5, "kw": 5.5,
                 "phase": 3, "connection_type": "star", "turns_per_slot": 38,
                 "notes": "double layer"}
            ],
            "documents": [
                {"document_id": 21, "job_number": "J-2025-0001", "document_type": "photo",
                 "embed_tag": "<img src=\"...\">", "created_at": "2025-08-01T10:00:00Z"}
            ]
        })
    }

    #[test]
    fn hide_false_is_the_identity_for_every_role() {
        let job = job_record();
        let customer = json!({"customer_id": 7, "name": "Acme", "phone": "555-0101"});
        let inv = json!({"inventory_id": 1, "part_name": "wire", "cost_price": 9.5});
        for role in ANY_ROLE {
            assert_eq!(filter_service_request(&job, *role, false), job);
            assert_eq!(filter_customer(&customer, *role, false), customer);
            assert_eq!(filter_inventory(&inv, *role, false), inv);
        }
    }

    #[test]
    fn privileged_roles_pass_through_even_under_hide() {
        let job = job_record();
        for role in [Role::Admin, Role::Owner] {
            assert_eq!(filter_service_request(&job, role, true), job);
            assert_eq!(
                filter_winding_details(&job["winding_details"][0], role, true, "Received"),
                job["winding_details"][0]
            );
        }
    }

    #[test]
    fn worker_view_of_a_job_masks_money_and_recurses() {
        let job = job_record();
        let shaped = filter_service_request(&job, Role::Worker, true);

        // visible operational fields
        assert_eq!(shaped["job_number"], "J-2025-0001");
        assert_eq!(shaped["motor_type"], "Induction");
        assert_eq!(shaped["status"], "Estimation in Progress");
        assert_eq!(shaped["date_received"], "2025-08-01");
        assert_eq!(shaped["notes"], "starter burnt");

        // masked financial / identity fields, all with the same sentinel
        assert_eq!(shaped["customer_name"], REDACTED);
        assert_eq!(shaped["estimated_amount"], REDACTED);
        assert_eq!(shaped["billed_amount"], REDACTED);
        assert_eq!(shaped["parts_used"], REDACTED);
        assert_eq!(shaped["payments"], REDACTED);

        // nested work logs lose timing and notes but keep assignment
        let wl = &shaped["work_logs"][0];
        assert_eq!(wl["sub_status"], "Dismantled");
        assert_eq!(wl["worker_name"], "Ravi");
        assert!(wl.get("start_time").is_none());
        assert!(wl.get("notes").is_none());

        // job is still in estimation, so winding collapses to the stub
        let wd = &shaped["winding_details"][0];
        assert_eq!(wd["winding_id"], 11);
        assert_eq!(wd["job_number"], "J-2025-0001");
        assert_eq!(wd["message"], WINDING_STAGE_MESSAGE);
        assert!(wd.get("turns_per_slot").is_none());

        // documents keep metadata, lose content
        let doc = &shaped["documents"][0];
        assert_eq!(doc["document_type"], "photo");
        assert_eq!(doc["embed_tag"], REDACTED);

        // input record untouched
        assert_eq!(job["estimated_amount"], 4200.00);
    }

    #[test]
    fn worker_sees_winding_internals_once_work_is_approved() {
        let mut job = job_record();
        job["status"] = json!("Work In Progress");
        let shaped = filter_service_request(&job, Role::Worker, true);

        let wd = &shaped["winding_details"][0];
        assert_eq!(wd["turns_per_slot"], 38);
        assert_eq!(wd["connection_type"], "star");
        assert!(wd.get("message").is_none());
    }

    #[test]
    fn winding_gate_on_the_standalone_filter() {
        let record = json!({"winding_id": 11, "job_number": "J-1", "hp": 5, "turns_per_slot": 40});

        let open = filter_winding_details(&record, Role::Worker, true, "Approved By Customer");
        assert_eq!(open, record);

        let closed = filter_winding_details(&record, Role::Worker, true, "Estimation in Progress");
        assert_eq!(
            closed,
            json!({"winding_id": 11, "job_number": "J-1", "message": WINDING_STAGE_MESSAGE})
        );
    }

    #[test]
    fn customer_sees_their_own_job_in_full() {
        let job = job_record();
        let shaped = filter_service_request(&job, Role::Customer, true);
        assert_eq!(shaped["estimated_amount"], 4200.00);
        assert_eq!(shaped["billed_amount"], Value::Null);
        assert_eq!(shaped, job);
    }

    #[test]
    fn worker_view_of_customers_masks_pii() {
        let record = json!({
            "customer_id": 7, "name": "Acme Pumps", "company_name": "Acme Pumps Pvt Ltd",
            "phone": "555-0101", "email": "ops@acme.example", "address": "14 Mill Rd",
            "city": "Coimbatore", "created_at": "2024-01-01T00:00:00Z"
        });
        let shaped = filter_customer(&record, Role::Worker, true);

        assert_eq!(shaped["customer_id"], 7);
        assert_eq!(shaped["created_at"], "2024-01-01T00:00:00Z");
        for field in ["name", "company_name", "phone", "email", "address", "city"] {
            assert_eq!(shaped[field], REDACTED, "{} must be masked", field);
        }
    }

    #[test]
    fn customer_role_falls_closed_on_entities_it_never_fetches() {
        let inv = json!({"inventory_id": 1, "part_name": "wire", "cost_price": 9.5});
        let shaped = filter_inventory(&inv, Role::Customer, true);
        assert_eq!(shaped["cost_price"], REDACTED);
    }

    #[test]
    fn worker_view_of_inventory_keeps_stock_masks_money() {
        let record = json!({
            "inventory_id": 3, "part_name": "copper wire 24swg", "quantity": 42,
            "unit": "kg", "reorder_threshold": 10,
            "cost_price": 780.0, "selling_price": 900.0, "supplier_id": 5
        });
        let shaped = filter_inventory(&record, Role::Worker, true);

        assert_eq!(shaped["quantity"], 42);
        assert_eq!(shaped["reorder_threshold"], 10);
        assert_eq!(shaped["unit"], "kg");
        assert_eq!(shaped["cost_price"], REDACTED);
        assert_eq!(shaped["selling_price"], REDACTED);
        assert_eq!(shaped["supplier_id"], REDACTED);
    }

    #[test]
    fn worker_view_of_parts_drops_cost_fields() {
        let record = json!({
            "part_used_id": 4, "job_number": "J-1", "part_name": "bearing 6204",
            "qty": 2, "unit": "pcs", "unit_cost": 110.0, "total_cost": 220.0
        });
        let shaped = filter_parts_used(&record, Role::Worker, true);

        assert_eq!(shaped["part_name"], "bearing 6204");
        assert_eq!(shaped["qty"], 2);
        assert!(shaped.get("unit_cost").is_none());
        assert!(shaped.get("total_cost").is_none());
    }

    #[test]
    fn filters_are_idempotent() {
        let job = job_record();
        let once = filter_service_request(&job, Role::Worker, true);
        let twice = filter_service_request(&once, Role::Worker, true);
        assert_eq!(once, twice);

        let customer = json!({"customer_id": 7, "name": "Acme"});
        let once = filter_customer(&customer, Role::Worker, true);
        assert_eq!(filter_customer(&once, Role::Worker, true), once);

        let wd = json!({"winding_id": 1, "job_number": "J-1", "turns_per_slot": 40});
        let once = filter_winding_details(&wd, Role::Worker, true, "Received");
        assert_eq!(
            filter_winding_details(&once, Role::Worker, true, "Received"),
            once
        );
    }
}
