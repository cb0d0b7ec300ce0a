// Route handlers, grouped by resource. Authorization runs in the extractor
// (AnyUser / Staff / Managers), the hide flag arrives as the Visibility
// extension, and every record passes through the policy filters before it
// leaves a handler.
pub mod auth;
pub mod customers;
pub mod documents;
pub mod inventory;
pub mod jobs;
pub mod winding;
