use semver::Version;

pub const VALID_VERSIONS_REFERENCE: &[Version] = &[Version::new(0, 1, 0)];
