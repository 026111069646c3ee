//! Shared data model layer (structs/constants only).
//!
//! ## Files
//! - `models.rs` — check results, readiness verdict, report structs.
//! - `constants.rs` — default targets and fixed output strings.
//! - `kube.rs` — typed views over `kubectl -o json` lists.
//!
//! ## Rule of thumb
//! Domain types should be data-only: no network or process side effects.
//!
//! ## Compatibility note
//! These structs are the `--json` output schema. Keep changes synchronized with
//! `docs/contracts/verify-report.schema.json`.

pub mod constants;
pub mod kube;
pub mod models;
