use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, StatusCode};
use tracing::debug;
use url::Url;

use crate::error::SourceError;
use crate::package::{INDEX_FILE, PackageIndex, PackageSource, RemotePackage, file_segments};

/// Package source served over HTTP(S).
///
/// ```text
/// GET {base}/{name}/{version}/index.json  -> {"files": ["lib/Foo.dll", ...]}
/// GET {base}/{name}/{version}/{file}      -> file bytes
/// ```
pub struct HttpPackageSource {
  client: Client,
  base: Url,
}

impl HttpPackageSource {
  pub fn new(base: &str) -> Result<Self, SourceError> {
    let mut base = Url::parse(base).map_err(|e| SourceError::InvalidLocation {
      location: base.to_string(),
      message: e.to_string(),
    })?;

    if base.cannot_be_a_base() {
      return Err(SourceError::InvalidLocation {
        location: base.to_string(),
        message: "URL cannot be used as a base".to_string(),
      });
    }
    if !base.path().ends_with('/') {
      let path = format!("{}/", base.path());
      base.set_path(&path);
    }

    Ok(Self {
      client: Client::new(),
      base,
    })
  }

  /// `{base}/{name}/{version}/{file}`, each segment percent-encoded.
  fn package_url(&self, name: &str, version: &str, file: &str) -> Result<Url, SourceError> {
    let segments = file_segments(file)?;
    let mut url = self.base.clone();
    url
      .path_segments_mut()
      .map_err(|_| SourceError::InvalidLocation {
        location: self.base.to_string(),
        message: "URL cannot be used as a base".to_string(),
      })?
      .pop_if_empty()
      .push(name)
      .push(version)
      .extend(segments);
    Ok(url)
  }
}

#[async_trait]
impl PackageSource for HttpPackageSource {
  fn location(&self) -> &str {
    self.base.as_str()
  }

  async fn find_package(
    &self,
    name: &str,
    version: &str,
  ) -> Result<Option<RemotePackage>, SourceError> {
    let url = self.package_url(name, version, INDEX_FILE)?;
    debug!(%url, "fetching package index");

    let response = self.client.get(url.clone()).send().await?;
    if response.status() == StatusCode::NOT_FOUND {
      return Ok(None);
    }
    if !response.status().is_success() {
      return Err(SourceError::Status {
        url: url.to_string(),
        status: response.status().as_u16(),
      });
    }

    let index: PackageIndex = response
      .json()
      .await
      .map_err(|e| SourceError::InvalidIndex {
        location: url.to_string(),
        message: e.to_string(),
      })?;

    Ok(Some(RemotePackage {
      name: name.to_string(),
      version: version.to_string(),
      files: index.files,
    }))
  }

  async fn fetch_file(&self, package: &RemotePackage, file: &str) -> Result<Bytes, SourceError> {
    let url = self.package_url(&package.name, &package.version, file)?;
    debug!(%url, "fetching package file");

    let response = self.client.get(url.clone()).send().await?;
    if !response.status().is_success() {
      return Err(SourceError::Status {
        url: url.to_string(),
        status: response.status().as_u16(),
      });
    }

    Ok(response.bytes().await?)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_package_url_escapes_segments() {
    let source = HttpPackageSource::new("https://example.com/feed").unwrap();
    let url = source
      .package_url("Acme Core", "1.0.0.0", "lib/net45/Acme Core.dll")
      .unwrap();
    assert_eq!(
      url.as_str(),
      "https://example.com/feed/Acme%20Core/1.0.0.0/lib/net45/Acme%20Core.dll"
    );
  }

  #[test]
  fn test_package_url_stays_inside_package() {
    let source = HttpPackageSource::new("https://example.com/feed").unwrap();
    assert!(matches!(
      source.package_url("Acme.Core", "1.0.0.0", "../../other/Acme.Core.dll"),
      Err(SourceError::InvalidFile { .. })
    ));
  }

  #[test]
  fn test_invalid_base() {
    assert!(matches!(
      HttpPackageSource::new("not a url"),
      Err(SourceError::InvalidLocation { .. })
    ));
  }
}
