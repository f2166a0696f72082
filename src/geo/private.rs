//! Private / non-routable address classification.

use std::net::{IpAddr, Ipv4Addr};

use ipnet::Ipv4Net;

/// Decide whether a textual address is non-routable (loopback or a private
/// range), meaning no geolocation lookup can ever succeed for it.
///
/// Matches 10.0.0.0/8, 172.16.0.0/12, 192.168.0.0/16, 127.0.0.0/8, the IPv6
/// loopback, unique-local (fc00::/7) and link-local (fe80::/10) ranges. An
/// IPv6-mapped-IPv4 prefix (`::ffff:`) is stripped before classification.
///
/// Empty input is treated as private (fail safe toward "Local"). Strings
/// that parse as neither address family are not private; they fall through
/// to the provider chain, which degrades to "Unknown".
pub fn is_private_address(address: &str) -> bool {
    let address = address.trim();
    if address.is_empty() {
        return true;
    }

    let address = address.strip_prefix("::ffff:").unwrap_or(address);

    match address.parse::<IpAddr>() {
        Ok(IpAddr::V4(v4)) => is_private_v4(v4),
        Ok(IpAddr::V6(v6)) => {
            if v6.is_loopback() {
                return true;
            }
            let segments = v6.segments();
            // fc00::/7 unique-local, fe80::/10 link-local
            (segments[0] & 0xfe00) == 0xfc00 || (segments[0] & 0xffc0) == 0xfe80
        }
        Err(_) => false,
    }
}

fn is_private_v4(addr: Ipv4Addr) -> bool {
    private_v4_ranges().iter().any(|net| net.contains(&addr))
}

fn private_v4_ranges() -> [Ipv4Net; 4] {
    [
        Ipv4Net::new(Ipv4Addr::new(10, 0, 0, 0), 8).expect("valid CIDR"),
        Ipv4Net::new(Ipv4Addr::new(172, 16, 0, 0), 12).expect("valid CIDR"),
        Ipv4Net::new(Ipv4Addr::new(192, 168, 0, 0), 16).expect("valid CIDR"),
        Ipv4Net::new(Ipv4Addr::new(127, 0, 0, 0), 8).expect("valid CIDR"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loopback_and_private_ranges_are_private() {
        for addr in [
            "127.0.0.1",
            "127.255.0.3",
            "10.1.2.3",
            "192.168.0.1",
            "192.168.255.254",
            "172.16.0.1",
            "172.31.255.255",
            "::1",
            "fc00::1",
            "fdab::22",
            "fe80::1234",
        ] {
            assert!(is_private_address(addr), "{addr} should be private");
        }
    }

    #[test]
    fn public_addresses_are_not_private() {
        for addr in [
            "203.0.113.5",
            "8.8.8.8",
            "172.32.0.1",
            "172.15.255.255",
            "11.0.0.1",
            "2001:db8::1",
        ] {
            assert!(!is_private_address(addr), "{addr} should be public");
        }
    }

    #[test]
    fn mapped_ipv4_prefix_is_stripped() {
        assert!(is_private_address("::ffff:192.168.1.1"));
        assert!(!is_private_address("::ffff:203.0.113.5"));
    }

    #[test]
    fn empty_input_fails_safe_toward_private() {
        assert!(is_private_address(""));
        assert!(is_private_address("   "));
    }

    #[test]
    fn garbage_is_not_private() {
        assert!(!is_private_address("not-an-address"));
        assert!(!is_private_address("999.999.999.999"));
    }
}
