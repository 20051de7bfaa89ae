//! Escaping of paths and names embedded in OData string literals,
//! e.g. `getFolderByServerRelativeUrl('...')`.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Everything except alphanumerics and `/ - _ . ~` is percent-encoded.
const ODATA_LITERAL: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'/')
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Escape `value` for use inside a single-quoted OData literal in a URL.
///
/// Quotes are doubled first (OData literal syntax), then the result is
/// percent-encoded, so the service decodes back to the original text.
pub fn odata_literal(value: &str) -> String {
    let quoted = value.replace('\'', "''");
    utf8_percent_encode(&quoted, ODATA_LITERAL).to_string()
}

// ═══════════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════════
