use crate::config::TwitterCredentials;
use crate::job::FieldMap;
use crate::job::ResultMap;
use crate::twitter_client::TwitterUser;
use log::error;
use log::info;

#[mockall_double::double]
use crate::twitter_client::TwitterClient;

pub struct SocialLookup {
    twitter_client: TwitterClient,
}

impl SocialLookup {
    pub fn new(twitter_client: TwitterClient) -> Self {
        Self { twitter_client }
    }

    pub fn authenticated(credentials: &TwitterCredentials) -> Self {
        let mut twitter_client = TwitterClient::default();
        twitter_client.authenticate(credentials);
        Self::new(twitter_client)
    }

    /// Accounts that fail to resolve are logged and left out of the result.
    pub async fn lookup(&self, accounts: &[String]) -> ResultMap {
        let mut results = ResultMap::default();
        for account in accounts {
            info!("Looking up Twitter account {}", account);
            match self.twitter_client.user(account).await {
                Ok(user) => {
                    info!("Resolved {} to @{} ({})", account, &user.username, &user.id);
                    let profile = SocialProfile::from(user);
                    results.insert(profile.name.clone(), profile.into_fields());
                }
                Err(e) => error!("Failed to look up Twitter account {}: {:#}", account, e),
            }
        }
        results
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct SocialProfile {
    pub followers_count: u64,
    pub name: String,
    pub verified: bool,
    pub friends_count: u64,
}

impl SocialProfile {
    fn into_fields(self) -> FieldMap {
        let mut fields = FieldMap::new();
        fields.insert("followers_count".into(), self.followers_count.into());
        fields.insert("name".into(), self.name.into());
        fields.insert("verified".into(), self.verified.into());
        fields.insert("friends_count".into(), self.friends_count.into());
        fields
    }
}

impl From<TwitterUser> for SocialProfile {
    fn from(user: TwitterUser) -> Self {
        Self {
            followers_count: user.public_metrics.followers_count,
            name: user.name,
            verified: user.verified,
            friends_count: user.public_metrics.following_count,
        }
    }
}
