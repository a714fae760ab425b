use semver::Version;

/// Controllers at or above this version accept replace-style writes on the
/// per-record `rest/user/{id}` endpoint. A fixed protocol-compatibility
/// fact, not a tunable.
pub(crate) const REST_USER_WRITE_FLOOR: Version = Version::new(6, 0, 43);

/// Which of the two incompatible update wire protocols to use for modifying
/// a user record.
///
/// Selected once per update from the controller's self-reported version;
/// this is a pure comparison against a fixed floor, not a negotiation with
/// the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateStrategy {
    /// Write through the general-purpose `group/user` endpoint (the same
    /// protocol create uses) and trust its echoed record.
    LegacyGroupWrite,
    /// `PUT` the record to `rest/user/{id}`, then issue a fresh read of the
    /// same record and return the read's result. Update endpoints on these
    /// controllers can echo a partial or stale representation, so the
    /// read-after-write wins.
    RestWriteThenRead,
}

impl UpdateStrategy {
    /// Selects the update protocol for a controller version string.
    ///
    /// An absent or unparseable version falls back to
    /// [`UpdateStrategy::LegacyGroupWrite`]: both endpoints exist on newer
    /// controllers, so the legacy path is the safe deterministic choice when
    /// the version is unknown.
    pub fn for_version(version: Option<&str>) -> Self {
        match version.and_then(|raw| Version::parse(raw).ok()) {
            Some(v) if v >= REST_USER_WRITE_FLOOR => UpdateStrategy::RestWriteThenRead,
            _ => UpdateStrategy::LegacyGroupWrite,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn versions_at_or_above_floor_use_rest_write() {
        for v in ["6.0.43", "6.0.44", "6.1.0", "7.3.83", "8.0.7"] {
            assert_eq!(
                UpdateStrategy::for_version(Some(v)),
                UpdateStrategy::RestWriteThenRead,
                "version {v}"
            );
        }
    }

    #[test]
    fn versions_below_floor_use_legacy_write() {
        for v in ["6.0.42", "5.14.23", "4.8.0"] {
            assert_eq!(
                UpdateStrategy::for_version(Some(v)),
                UpdateStrategy::LegacyGroupWrite,
                "version {v}"
            );
        }
    }

    #[test]
    fn unknown_version_falls_back_to_legacy() {
        assert_eq!(
            UpdateStrategy::for_version(None),
            UpdateStrategy::LegacyGroupWrite
        );
        for v in ["", "6.0", "not-a-version", "v6.0.43"] {
            assert_eq!(
                UpdateStrategy::for_version(Some(v)),
                UpdateStrategy::LegacyGroupWrite,
                "version {v:?}"
            );
        }
    }
}
