//! Naming and addressing helpers shared by provider mappers.

use std::net::IpAddr;

/// Recover the group encoded into a node name.
///
/// Names follow `<group>-<hex suffix>`; the suffix is everything after the
/// last hyphen and must be a non-empty run of hex digits.
pub fn parse_group_from_name(name: &str) -> Option<String> {
    let (group, suffix) = name.rsplit_once('-')?;
    if group.is_empty() || suffix.is_empty() {
        return None;
    }
    if !suffix.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    Some(group.to_string())
}

/// Whether an address belongs to a private range.
///
/// Strings that are not IP literals (hostnames, for instance) are public.
pub fn is_private_address(address: &str) -> bool {
    match address.trim().parse::<IpAddr>() {
        Ok(IpAddr::V4(v4)) => v4.is_private(),
        // fc00::/7 unique local
        Ok(IpAddr::V6(v6)) => (v6.segments()[0] & 0xfe00) == 0xfc00,
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_group_from_name() {
        assert_eq!(parse_group_from_name("web-1").as_deref(), Some("web"));
        assert_eq!(parse_group_from_name("web-prod-a3f").as_deref(), Some("web-prod"));
        assert_eq!(parse_group_from_name("db-00ff").as_deref(), Some("db"));
        assert_eq!(parse_group_from_name("standalone"), None);
        assert_eq!(parse_group_from_name("web-"), None);
        assert_eq!(parse_group_from_name("-1"), None);
        assert_eq!(parse_group_from_name("web-node"), None);
    }

    #[test]
    fn test_private_ranges() {
        assert!(is_private_address("10.1.2.3"));
        assert!(is_private_address("172.16.0.1"));
        assert!(is_private_address("172.31.255.254"));
        assert!(is_private_address("192.168.0.10"));
        assert!(is_private_address("fd12:3456::1"));

        assert!(!is_private_address("172.32.0.1"));
        assert!(!is_private_address("8.8.8.8"));
        assert!(!is_private_address("2001:db8::1"));
        assert!(!is_private_address("node.example.com"));
    }
}
