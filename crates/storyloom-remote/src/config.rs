//! Story service connection settings.

use std::time::Duration;

use storyloom_core::Settings;
use url::Url;

use crate::error::RemoteResult;

/// Where the story service lives and how to talk to it.
///
/// Endpoint paths are relative to `base_url`, so a service mounted under a
/// prefix (`https://host/api/`) works as well as one at the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteConfig {
    pub base_url: Url,
    /// Connect timeout for every request, and total timeout for the
    /// non-streaming ones. Generation streams are not time-limited once
    /// connected.
    pub timeout: Duration,
    pub generate_path: String,
    pub continue_path: String,
    pub speech_path: String,
    pub story_path: String,
}

impl RemoteConfig {
    /// Config with the default endpoint layout.
    pub fn new(mut base_url: Url, timeout: Duration) -> Self {
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Self {
            base_url,
            timeout,
            generate_path: "generate-story-stream/".to_string(),
            continue_path: "continue-story/".to_string(),
            speech_path: "text-to-speech/".to_string(),
            story_path: "get-story/".to_string(),
        }
    }

    pub fn from_settings(settings: &Settings) -> RemoteResult<Self> {
        let base_url = Url::parse(settings.effective_server_url())?;
        Ok(Self::new(
            base_url,
            Duration::from_secs(settings.effective_request_timeout_secs()),
        ))
    }

    pub(crate) fn endpoint(&self, path: &str) -> RemoteResult<Url> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints_join_under_base_path() {
        let config = RemoteConfig::new(
            Url::parse("https://stories.example.com/api").unwrap(),
            Duration::from_secs(5),
        );
        assert_eq!(
            config.endpoint(&config.speech_path).unwrap().as_str(),
            "https://stories.example.com/api/text-to-speech/"
        );
        assert_eq!(
            config.endpoint("/get-story/").unwrap().as_str(),
            "https://stories.example.com/api/get-story/"
        );
    }

    #[test]
    fn test_from_default_settings() {
        let config = RemoteConfig::from_settings(&Settings::default()).unwrap();
        assert_eq!(config.base_url.as_str(), "http://localhost:8000/");
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_from_invalid_settings() {
        let settings = Settings {
            server_url: Some("::nope".to_string()),
            ..Default::default()
        };
        assert!(RemoteConfig::from_settings(&settings).is_err());
    }
}
