#![forbid(unsafe_code)]

//! Service-provider metadata.

use crate::settings::TrustSettings;
use chrono::{DateTime, Duration, Utc};
use samlvakt_c14n::escape::{escape_attr, escape_text};
use samlvakt_core::{algorithm, ns};

/// How long published metadata stays valid: one week.
pub const VALIDITY_SECONDS: i64 = 604_800;

/// `validUntil` for metadata generated at `now`, as `YYYY-MM-DDTHH:MM:SSZ`.
pub fn valid_until(now: DateTime<Utc>) -> String {
    (now + Duration::seconds(VALIDITY_SECONDS))
        .format("%Y-%m-%dT%H:%M:%SZ")
        .to_string()
}

/// Render the SP `md:EntityDescriptor` for `settings`, valid from `now`.
pub fn sp_metadata(settings: &TrustSettings, now: DateTime<Utc>) -> String {
    format!(
        r#"<?xml version="1.0"?>
<md:EntityDescriptor xmlns:md="{md}"
                     validUntil="{valid_until}"
                     entityID="{entity_id}">
    <md:SPSSODescriptor protocolSupportEnumeration="{protocol}">
        <md:NameIDFormat>{name_id_format}</md:NameIDFormat>
        <md:AssertionConsumerService Binding="{binding}"
                                     Location="{acs_url}"
                                     index="1"/>
    </md:SPSSODescriptor>
</md:EntityDescriptor>
"#,
        md = ns::SAML_METADATA,
        valid_until = valid_until(now),
        entity_id = escape_attr(&settings.sp_entity_id),
        protocol = algorithm::PROTOCOL_SUPPORT,
        name_id_format = escape_text(&settings.name_id_format),
        binding = algorithm::BINDING_HTTP_POST,
        acs_url = escape_attr(&settings.acs_url),
    )
}
