#![forbid(unsafe_code)]

//! Assertion policy checks: assertion count and the `Conditions` window.
//!
//! Both checks are structural and run on the whole document. A response
//! must carry exactly one `Assertion` element at any depth, and every
//! `Conditions` element must admit `now`.
//!
//! `NotBefore` and `NotOnOrAfter` are optional. An absent attribute imposes
//! no constraint, so an assertion with no `Conditions` at all passes the
//! window check. Callers that require a bounded window must enforce it
//! themselves.

use chrono::{DateTime, NaiveDateTime, Utc};
use samlvakt_core::{ns, RejectReason, Rejection};
use samlvakt_xml::select;

/// Run the assertion-count and validity-window checks, in that order.
pub fn check_policy(doc: &roxmltree::Document<'_>, now: DateTime<Utc>) -> Result<(), Rejection> {
    single_assertion(doc)?;
    timestamps_valid(doc, now)
}

/// Exactly one element with local name `Assertion`, in any namespace and
/// at any depth.
pub fn single_assertion(doc: &roxmltree::Document<'_>) -> Result<(), Rejection> {
    let count = select::elements_by_local_name(doc, ns::node::ASSERTION).len();
    if count == 1 {
        Ok(())
    } else {
        Err(Rejection::new(
            RejectReason::MultipleOrZeroAssertions,
            format!("found {count} Assertion elements"),
        ))
    }
}

/// Every `Conditions` element admits `now`: `NotBefore <= now < NotOnOrAfter`.
pub fn timestamps_valid(
    doc: &roxmltree::Document<'_>,
    now: DateTime<Utc>,
) -> Result<(), Rejection> {
    for conditions in select::elements_by_local_name(doc, ns::node::CONDITIONS) {
        if let Some(value) = conditions.attribute(ns::attr::NOT_BEFORE) {
            let not_before = parse_timestamp(ns::attr::NOT_BEFORE, value)?;
            if not_before > now {
                return Err(Rejection::new(
                    RejectReason::TimestampOutOfWindow,
                    format!("NotBefore {value} is after {}", now.to_rfc3339()),
                ));
            }
        }
        if let Some(value) = conditions.attribute(ns::attr::NOT_ON_OR_AFTER) {
            let not_on_or_after = parse_timestamp(ns::attr::NOT_ON_OR_AFTER, value)?;
            if not_on_or_after <= now {
                return Err(Rejection::new(
                    RejectReason::TimestampOutOfWindow,
                    format!("NotOnOrAfter {value} is not after {}", now.to_rfc3339()),
                ));
            }
        }
    }
    Ok(())
}

/// Parse an `xs:dateTime`. Values without an offset are read as UTC.
fn parse_timestamp(attr: &str, value: &str) -> Result<DateTime<Utc>, Rejection> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|_| {
            Rejection::new(
                RejectReason::TimestampOutOfWindow,
                format!("unparseable {attr} timestamp: {value}"),
            )
        })
}
