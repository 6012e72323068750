use std::net::IpAddr;
use std::path::Path;

use linkhub_core::errors::{LinkHubError, Result};
use maxminddb::geoip2;
use tracing::info;

/// Offline IP-to-country resolver backed by a MaxMind dataset.
///
/// An unresolvable address is not an error; it yields `None` and LOCATION
/// conditions fail closed downstream.
#[derive(Debug)]
pub struct GeoResolver {
    reader: Option<maxminddb::Reader<Vec<u8>>>,
}

impl GeoResolver {
    /// Resolver without a dataset: every lookup yields `None`.
    pub fn disabled() -> Self {
        Self { reader: None }
    }

    /// Opens the dataset at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let reader = maxminddb::Reader::open_readfile(path).map_err(|err| {
            LinkHubError::ConfigError(format!(
                "failed to open geoip dataset {}: {err}",
                path.display()
            ))
        })?;
        info!(path = %path.display(), "geoip dataset loaded");
        Ok(Self {
            reader: Some(reader),
        })
    }

    /// Maps a textual IP to an upper-case ISO country code, or `None` when
    /// the address is malformed, private or absent from the dataset.
    pub fn resolve(&self, ip: &str) -> Option<String> {
        let reader = self.reader.as_ref()?;
        let addr: IpAddr = ip.parse().ok()?;
        let country: geoip2::Country = reader.lookup(addr).ok()?;
        country
            .country
            .and_then(|c| c.iso_code)
            .map(|code| code.to_ascii_uppercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_resolver_yields_none() {
        let resolver = GeoResolver::disabled();
        assert_eq!(resolver.resolve("8.8.8.8"), None);
        assert_eq!(resolver.resolve("not-an-ip"), None);
    }

    #[test]
    fn missing_dataset_is_a_config_error() {
        let err = GeoResolver::open("/does/not/exist.mmdb").expect_err("no dataset there");
        assert!(matches!(err, LinkHubError::ConfigError(_)));
    }
}
