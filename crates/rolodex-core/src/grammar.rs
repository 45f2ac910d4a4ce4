//! Format grammars for contact fields.

use once_cell::sync::Lazy;
use regex::Regex;

const EMAIL_MAX_LEN: usize = 254;
const EMAIL_LOCAL_MAX_LEN: usize = 64;

static EMAIL_LOCAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+(\.[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+)*$")
        .expect("email local-part pattern")
});

// ASCII only: UTF-8 local parts and unencoded IDN domains are rejected.
// Internationalised TLDs pass in their punycode (`xn--`) form.
static EMAIL_DOMAIN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Za-z0-9]([A-Za-z0-9-]{0,61}[A-Za-z0-9])?\.)+([A-Za-z]{2,63}|xn--[A-Za-z0-9-]{1,59})$")
        .expect("email domain pattern")
});

// Indonesian mobile numbering: national (0) or country (62 / +62) prefix,
// an operator code starting with 8, then the subscriber number. Digits and
// whitespace are ASCII only; `\d` and `\s` would admit any Unicode digit.
static ID_MOBILE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\+?62|0)8(1[1-9]|2[1238]|3[1238]|5[12356789]|7[78]|9[56789]|8[1-9])[ \t\n\r\x0B\x0C0-9]{5,11}$")
        .expect("id-ID mobile pattern")
});

/// Returns true when `value` has the shape `local@domain.tld`.
pub fn is_email(value: &str) -> bool {
    if value.len() > EMAIL_MAX_LEN {
        return false;
    }
    let Some((local, domain)) = value.rsplit_once('@') else {
        return false;
    };
    local.len() <= EMAIL_LOCAL_MAX_LEN && EMAIL_LOCAL.is_match(local) && EMAIL_DOMAIN.is_match(domain)
}

/// Returns true when `value` is an Indonesian (`id-ID`) mobile number.
pub fn is_id_mobile_phone(value: &str) -> bool {
    ID_MOBILE.is_match(value)
}
