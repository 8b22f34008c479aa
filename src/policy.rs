/// Which probing strategy a table scans metadata with.
///
/// The C++ original this crate reimplements resolves this as a
/// compile-time template parameter (`LPHashSetPolicy`). Rust's `target_feature`
/// story makes AVX2 support a runtime fact rather than a build-time one on
/// most distributed binaries, so the policy here is a runtime value chosen
/// once at construction and never touched again per call — `HashSet`
/// matches on it exactly once per public operation, never inside the
/// per-byte scan loop, so the three strategies still cost the same as if
/// the choice had been made at compile time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Policy {
    /// Byte-at-a-time linear scan. Always available.
    Scalar,
    /// 16 metadata bytes per comparison (SSE2).
    Simd16,
    /// 32 metadata bytes per comparison (AVX2).
    Simd32,
}

impl Policy {
    /// The widest strategy the running CPU actually supports.
    pub fn best_available() -> Policy {
        if simd32_supported() {
            Policy::Simd32
        } else if simd16_supported() {
            Policy::Simd16
        } else {
            Policy::Scalar
        }
    }

    /// Resolve a requested policy against what this CPU supports,
    /// downgrading `Simd32` -> `Simd16` -> `Scalar` as needed.
    ///
    /// A table remembers the *resolved* policy, not the one requested —
    /// `HashSet::policy()` reports what actually runs.
    pub(crate) fn resolve(self) -> Policy {
        match self {
            Policy::Simd32 if simd32_supported() => Policy::Simd32,
            Policy::Simd32 => Policy::Simd16.resolve(),
            Policy::Simd16 if simd16_supported() => Policy::Simd16,
            Policy::Simd16 => Policy::Scalar,
            Policy::Scalar => Policy::Scalar,
        }
    }
}

#[cfg(target_arch = "x86_64")]
#[inline]
fn simd16_supported() -> bool {
    // SSE2 is part of the x86-64 baseline; no runtime check needed.
    true
}

#[cfg(not(target_arch = "x86_64"))]
#[inline]
fn simd16_supported() -> bool {
    false
}

#[cfg(target_arch = "x86_64")]
#[inline]
fn simd32_supported() -> bool {
    is_x86_feature_detected!("avx2")
}

#[cfg(not(target_arch = "x86_64"))]
#[inline]
fn simd32_supported() -> bool {
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_never_upgrades() {
        // Whatever this host supports, resolving must not claim a wider
        // policy than what `best_available` would pick.
        let best = Policy::best_available();
        for requested in [Policy::Scalar, Policy::Simd16, Policy::Simd32] {
            let resolved = requested.resolve();
            let rank = |p: Policy| match p {
                Policy::Scalar => 0,
                Policy::Simd16 => 1,
                Policy::Simd32 => 2,
            };
            assert!(rank(resolved) <= rank(best));
        }
    }

    #[test]
    fn scalar_always_resolves_to_scalar() {
        assert_eq!(Policy::Scalar.resolve(), Policy::Scalar);
    }
}
