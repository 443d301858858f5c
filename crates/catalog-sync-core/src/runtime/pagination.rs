// catalog-sync-core/src/runtime/pagination.rs
// ============================================================================
// Module: Product UUID Pagination
// Description: Page size limits, opaque cursors, and UUID pages.
// Purpose: Serve deterministic search-after pages over matching products.
// Dependencies: crate::{core, interfaces}, base64, uuid
// ============================================================================

//! ## Overview
//! Pages are ordered by product UUID. The cursor is the last UUID of the
//! previous page, hyphenated and encoded as URL-safe base64 without padding,
//! and the next page holds UUIDs strictly greater than it. A page of `limit`
//! items is fetched as `limit + 1` candidates so the next cursor is only
//! issued when more items exist.

// ============================================================================
// SECTION: Imports
// ============================================================================

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

use crate::core::ProductPredicate;
use crate::core::ProductUuid;
use crate::core::violation::Violation;
use crate::interfaces::ProductQuery;
use crate::interfaces::StoreError;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Default page size.
pub const DEFAULT_PAGE_LIMIT: usize = 100;

/// Default maximum page size.
pub const DEFAULT_MAX_PAGE_LIMIT: usize = 1000;

/// Page size bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationLimits {
    /// Page size when `limit` is omitted.
    pub default_limit: usize,
    /// Largest accepted `limit`.
    pub max_limit: usize,
}

impl Default for PaginationLimits {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_PAGE_LIMIT,
            max_limit: DEFAULT_MAX_PAGE_LIMIT,
        }
    }
}

// ============================================================================
// SECTION: Cursors
// ============================================================================

/// Encodes a search-after cursor.
#[must_use]
pub fn encode_cursor(uuid: &ProductUuid) -> String {
    URL_SAFE_NO_PAD.encode(uuid.to_string())
}

/// Decodes a search-after cursor.
#[must_use]
pub fn decode_cursor(cursor: &str) -> Option<ProductUuid> {
    let bytes = URL_SAFE_NO_PAD.decode(cursor).ok()?;
    let text = String::from_utf8(bytes).ok()?;
    text.parse().ok()
}

// ============================================================================
// SECTION: Requests
// ============================================================================

/// Validated pagination parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// Page size.
    pub limit: usize,
    /// Exclusive lower bound.
    pub search_after: Option<ProductUuid>,
}

impl PageRequest {
    /// Parses raw query parameters.
    ///
    /// # Errors
    ///
    /// Returns violations for a non-integer or out-of-range `limit` and for a
    /// malformed `search_after` cursor.
    pub fn parse(
        limit: Option<&str>,
        search_after: Option<&str>,
        limits: PaginationLimits,
    ) -> Result<Self, Vec<Violation>> {
        let mut violations = Vec::new();
        let limit = match limit {
            None => Some(limits.default_limit),
            Some(raw) => match raw.trim().parse::<i64>() {
                Ok(value) if value < 1 => {
                    violations.push(Violation::new("[limit]", LIMIT_TOO_SMALL));
                    None
                }
                Ok(value) => match usize::try_from(value) {
                    Ok(value) if value <= limits.max_limit => Some(value),
                    _ => {
                        violations.push(Violation::new(
                            "[limit]",
                            &format!(
                                "This value should be less than or equal to {}.",
                                limits.max_limit
                            ),
                        ));
                        None
                    }
                },
                Err(_) => {
                    violations.push(Violation::new("[limit]", LIMIT_NOT_INTEGER));
                    None
                }
            },
        };
        let search_after = match search_after {
            None => None,
            Some(raw) => {
                let decoded = decode_cursor(raw);
                if decoded.is_none() {
                    violations.push(Violation::new("[search_after]", CURSOR_INVALID));
                }
                decoded
            }
        };
        match limit {
            Some(limit) if violations.is_empty() => Ok(Self {
                limit,
                search_after,
            }),
            _ => Err(violations),
        }
    }
}

/// Limit below one.
const LIMIT_TOO_SMALL: &str = "This value should be greater than or equal to 1.";
/// Limit not an integer.
const LIMIT_NOT_INTEGER: &str = "This value should be of type integer.";
/// Cursor not decodable.
const CURSOR_INVALID: &str = "This value is not a valid search_after cursor.";

// ============================================================================
// SECTION: Pages
// ============================================================================

/// One page of product UUIDs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UuidPage {
    /// UUIDs in ascending order.
    pub items: Vec<ProductUuid>,
    /// Cursor for the next page, absent on the last page.
    pub next: Option<String>,
}

/// Fetches one page of matching product UUIDs.
///
/// # Errors
///
/// Returns [`StoreError`] when the product query fails.
pub fn fetch_page<Q: ProductQuery + ?Sized>(
    query: &Q,
    predicate: &ProductPredicate,
    request: &PageRequest,
) -> Result<UuidPage, StoreError> {
    let mut items =
        query.query_uuids(predicate, request.search_after.as_ref(), request.limit.saturating_add(1))?;
    let next = if items.len() > request.limit {
        items.truncate(request.limit);
        items.last().map(encode_cursor)
    } else {
        None
    };
    Ok(UuidPage {
        items,
        next,
    })
}
