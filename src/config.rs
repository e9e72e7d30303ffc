use anyhow::Context;
use ini::Ini;
use ini::Properties;
use std::fmt::Debug;
use std::fmt::Formatter;
use std::path::Path;

const TWITTER_SECTION: &str = "Twitter Configs";

/// Credentials of a Twitter developer app.
#[derive(PartialEq, Eq, Clone, Default)]
pub struct TwitterCredentials {
    pub consumer_key: String,
    pub consumer_secret: String,
    pub access_token: String,
    pub secret_token: String,
    pub bearer_token: String,
}

impl TwitterCredentials {
    pub async fn load(path: &Path) -> anyhow::Result<Self> {
        let ini_text = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::parse(&ini_text).with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn parse(ini_text: &str) -> anyhow::Result<Self> {
        let ini = Ini::load_from_str(ini_text)?;
        let section = ini
            .section(Some(TWITTER_SECTION))
            .with_context(|| format!("Section [{}] not found", TWITTER_SECTION))?;
        let result = Self {
            consumer_key: get(section, "consumer_key")?,
            consumer_secret: get(section, "consumer_secret")?,
            access_token: get(section, "access_token")?,
            secret_token: get(section, "secret_token")?,
            bearer_token: get(section, "bearer_token")?,
        };
        Ok(result)
    }
}

impl Debug for TwitterCredentials {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwitterCredentials")
            .field("consumer_key", &redact(&self.consumer_key))
            .field("consumer_secret", &redact(&self.consumer_secret))
            .field("access_token", &redact(&self.access_token))
            .field("secret_token", &redact(&self.secret_token))
            .field("bearer_token", &redact(&self.bearer_token))
            .finish()
    }
}

fn redact(secret: &str) -> &'static str {
    if secret.is_empty() {
        "<empty>"
    } else {
        "<redacted>"
    }
}

fn get(section: &Properties, key: &str) -> anyhow::Result<String> {
    section
        .get(key)
        .map(ToString::to_string)
        .with_context(|| format!("Key `{}` not found in section [{}]", key, TWITTER_SECTION))
}

#[cfg(test)]
mod test {
    use super::*;
    use tempfile::tempdir;

    const SAMPLE_INI: &str = r#"
[Twitter Configs]
consumer_key = ck
consumer_secret = cs
access_token = at
secret_token = st
bearer_token = bt

[Other]
foo = bar
"#;

    #[test]
    fn parse() -> anyhow::Result<()> {
        // Given
        let expected_credentials = TwitterCredentials {
            consumer_key: "ck".into(),
            consumer_secret: "cs".into(),
            access_token: "at".into(),
            secret_token: "st".into(),
            bearer_token: "bt".into(),
        };

        // When
        let actual_credentials = TwitterCredentials::parse(SAMPLE_INI)?;

        // Then
        assert_eq!(expected_credentials, actual_credentials);
        Ok(())
    }

    #[test]
    fn parse_missing_section() {
        let error = TwitterCredentials::parse("[Other]\nfoo = bar\n").unwrap_err();
        assert!(error.to_string().contains("Twitter Configs"));
    }

    #[test]
    fn parse_missing_key() {
        // Given
        let ini_text = SAMPLE_INI.replace("bearer_token = bt", "");

        // When
        let error = TwitterCredentials::parse(&ini_text).unwrap_err();

        // Then
        assert!(error.to_string().contains("bearer_token"));
    }

    #[test]
    fn debug_hides_secrets() -> anyhow::Result<()> {
        // Given
        let credentials = TwitterCredentials {
            bearer_token: String::new(),
            ..TwitterCredentials::parse(SAMPLE_INI)?
        };

        // When
        let debug = format!("{:?}", credentials);

        // Then
        for secret in ["ck", "cs", "at", "st"] {
            assert!(!debug.contains(&format!("\"{}\"", secret)));
        }
        assert!(debug.contains(r#"consumer_key: "<redacted>""#));
        assert!(debug.contains(r#"bearer_token: "<empty>""#));
        Ok(())
    }

    #[tokio::test]
    async fn load() -> anyhow::Result<()> {
        // Given
        let dir = tempdir()?;
        let path = dir.path().join("palmtree.ini");
        tokio::fs::write(&path, SAMPLE_INI).await?;

        // When
        let credentials = TwitterCredentials::load(&path).await?;

        // Then
        assert_eq!("bt", credentials.bearer_token);
        Ok(())
    }

    #[tokio::test]
    async fn load_missing_file() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("palmtree.ini");
        assert!(TwitterCredentials::load(&path).await.is_err());
        Ok(())
    }
}
