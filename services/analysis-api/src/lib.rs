//! Zonal statistics HTTP service.
//!
//! Exposes the geoprocessing engine over HTTP: a raw `POST /analysis`
//! endpoint taking a full request body, plus named `GET` endpoints that
//! resolve a geostore id and translate query parameters into core
//! requests. Geometries above the configured area limit are refused; the
//! direct in-process path is the only execution path.

pub mod geostore_client;
pub mod handlers;
pub mod state;
