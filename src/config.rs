//! Runtime configuration, gathered from flags and the environment by
//! [crate::cmd::Cli]. A `.env` file is loaded into the environment first.

use crate::{
    error::Error,
    slack::{api::SlackClient, auth::SlackAccessToken},
};

pub struct Config {
    pub token: SlackAccessToken,
    pub api_base: String,
}

impl Config {
    pub fn new(token: Option<String>, api_base: String) -> Result<Self, Error> {
        let token = token
            .map(|t| t.trim().to_owned())
            .filter(|t| !t.is_empty())
            .ok_or(Error::MissingToken)?;

        Ok(Config {
            token: SlackAccessToken(token),
            api_base,
        })
    }

    pub fn client(&self) -> SlackClient {
        SlackClient::new(self.api_base.clone(), self.token.clone())
    }
}
