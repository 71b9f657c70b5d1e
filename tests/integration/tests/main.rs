//! End-to-end export and import runs against a mock management API.

mod export_flow;
mod import_flow;
