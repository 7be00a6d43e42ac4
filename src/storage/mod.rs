// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod shared;

pub use shared::{
    annotated_name, public_url, sanitize_filename, url_basename, SharedStorage, StorageError,
    ANNOTATED_PREFIX, UPLOADS_ROUTE,
};
