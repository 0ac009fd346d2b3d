//! Address range overlap checks shared by route and rule matching.

use ipnet::IpNet;
use tracing::debug;

use crate::errors::{CidrError, CidrResult};

pub fn parse(cidr: &str) -> CidrResult<IpNet> {
    cidr.trim()
        .parse::<IpNet>()
        .map_err(|e| CidrError::invalid(cidr, e))
}

/// True when the two ranges share at least one address.
///
/// Two CIDR blocks intersect exactly when one contains the other, so the
/// check is a subset test in both directions. Ranges of different address
/// families never overlap.
pub fn overlaps(a: &str, b: &str) -> CidrResult<bool> {
    let a = parse(a)?;
    let b = parse(b)?;
    Ok(a.contains(&b) || b.contains(&a))
}

/// Pair-local variant of [`overlaps`]: a malformed range only costs this one
/// comparison.
pub fn overlaps_or_false(a: &str, b: &str) -> bool {
    match overlaps(a, b) {
        Ok(result) => result,
        Err(e) => {
            debug!("Treating comparison {} / {} as disjoint: {}", a, b, e);
            false
        }
    }
}

/// Ranges that denote "any address" (`0.0.0.0/0`, `::/0`).
pub fn is_universal(cidr: &str) -> bool {
    parse(cidr).map(|net| net.prefix_len() == 0).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLES: [&str; 8] = [
        "10.0.0.0/8",
        "10.0.0.0/16",
        "10.1.0.0/16",
        "10.1.2.0/24",
        "192.168.0.0/16",
        "0.0.0.0/0",
        "fd00::/8",
        "fd00:1::/32",
    ];

    #[test]
    fn test_overlaps_is_symmetric() {
        for a in SAMPLES {
            for b in SAMPLES {
                assert_eq!(
                    overlaps(a, b).unwrap(),
                    overlaps(b, a).unwrap(),
                    "{} vs {}",
                    a,
                    b
                );
            }
        }
    }

    #[test]
    fn test_overlaps_is_reflexive() {
        for a in SAMPLES {
            assert!(overlaps(a, a).unwrap(), "{}", a);
        }
    }

    #[test]
    fn test_subset_overlaps() {
        assert!(overlaps("10.0.0.0/8", "10.1.2.0/24").unwrap());
        assert!(overlaps("10.1.2.0/24", "10.0.0.0/8").unwrap());
    }

    #[test]
    fn test_disjoint_ranges() {
        assert!(!overlaps("10.0.0.0/16", "10.1.0.0/16").unwrap());
        assert!(!overlaps("10.0.0.0/16", "192.168.0.0/16").unwrap());
    }

    #[test]
    fn test_host_bits_are_ignored() {
        assert!(overlaps("10.0.0.5/16", "10.0.200.0/24").unwrap());
    }

    #[test]
    fn test_mixed_families_never_overlap() {
        assert!(!overlaps("0.0.0.0/0", "fd00::/8").unwrap());
    }

    #[test]
    fn test_malformed_input_is_an_error() {
        let err = overlaps("10.0.0.0/33", "10.0.0.0/8").unwrap_err();
        assert!(matches!(err, CidrError::Invalid { ref cidr, .. } if cidr == "10.0.0.0/33"));
        assert!(overlaps("10.0.0.0/8", "local").is_err());
    }

    #[test]
    fn test_malformed_input_is_disjoint_when_pair_local() {
        assert!(!overlaps_or_false("not-a-cidr", "10.0.0.0/8"));
        assert!(overlaps_or_false("10.0.0.0/8", "10.0.0.0/8"));
    }

    #[test]
    fn test_is_universal() {
        assert!(is_universal("0.0.0.0/0"));
        assert!(is_universal("::/0"));
        assert!(!is_universal("10.0.0.0/8"));
        assert!(!is_universal("garbage"));
    }
}
